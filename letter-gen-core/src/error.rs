use thiserror::Error;

/// Errors raised by the generation core.
///
/// Codec and formatting helpers never return these for routine bad input,
/// they return an empty result instead. Selectors and the generator return
/// them when the model itself is inconsistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
	/// Wrong shape or value of an argument.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// A selector was given an empty context.
	#[error("invalid context: context must contain at least one id")]
	InvalidContext,

	/// Unknown letter or id.
	#[error("not found: {0}")]
	NotFound(String),

	/// Operation on a storage that holds no letter.
	#[error("letter storage is empty")]
	Empty,

	/// Every order was exhausted without finding a single n-gram.
	#[error("no candidate n-gram for context {context:?}")]
	NoCandidate { context: Vec<usize> },
}

/// Errors raised while building, loading or saving a language profile.
#[derive(Error, Debug)]
pub enum ProfileError {
	#[error("i/o error: {0}")]
	Io(#[from] std::io::Error),

	#[error("binary profile error: {0}")]
	Binary(#[from] postcard::Error),

	#[error("public profile parse error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("profile format error: {0}")]
	Format(String),

	#[error(transparent)]
	Gen(#[from] GenError),
}
