use std::str::FromStr;

use rand::SeedableRng;
use rand::prelude::IteratorRandom;
use rand::rngs::StdRng;

use super::language_profile::LanguageProfile;
use super::selector::Strategy;
use crate::error::GenError;
use crate::storage::WORD_BOUNDARY;

/// Longest word generated when the caller does not choose.
pub const DEFAULT_WORD_MAX_LENGTH: usize = 15;

/// Upper bound of the word length accepted for one word.
pub const MAX_WORD_LENGTH: usize = 256;

/// Upper bound of the number of words accepted for one sentence.
pub const MAX_WORD_COUNT: usize = 1_000;

/// Rejects a word length outside `1..=MAX_WORD_LENGTH`.
pub(crate) fn check_max_word_length(max_word_length: usize) -> Result<(), GenError> {
	if !(1..=MAX_WORD_LENGTH).contains(&max_word_length) {
		return Err(GenError::InvalidArgument(format!(
			"max word length must be between 1 and {MAX_WORD_LENGTH}, got {max_word_length}"
		)));
	}
	Ok(())
}

/// Rejects a word count above `MAX_WORD_COUNT`.
pub(crate) fn check_word_count(word_count: usize) -> Result<(), GenError> {
	if word_count > MAX_WORD_COUNT {
		return Err(GenError::InvalidArgument(format!(
			"word count must be at most {MAX_WORD_COUNT}, got {word_count}"
		)));
	}
	Ok(())
}

/// Strategy used to build the context of the first word.
///
/// # Variants
/// - `Boundary`: start from the word boundary alone.
/// - `Custom(String)`: start from the given letters, prefixed by the word
///   boundary if they do not already start with it.
/// - `Random { order, seed }`: start from an n-gram of the given order,
///   drawn with a generator seeded by `seed` (same seed, same context).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StartSeed {
	#[default]
	Boundary,
	Custom(String),
	Random { order: usize, seed: u64 },
}

impl StartSeed {
	/// Turns the seed into an id context for `profile`.
	///
	/// # Errors
	/// - `GenError::NotFound` for unknown letters or a missing trie order.
	/// - `GenError::InvalidArgument` for an empty custom seed or order 0.
	pub fn resolve(&self, profile: &LanguageProfile) -> Result<Vec<usize>, GenError> {
		let storage = profile.storage();
		match self {
			StartSeed::Boundary => Ok(vec![storage.special_token_id()?]),
			StartSeed::Custom(letters) => {
				if letters.is_empty() {
					return Err(GenError::InvalidArgument("custom seed cannot be empty".to_owned()));
				}
				let mut context = Vec::with_capacity(letters.chars().count() + 1);
				if !letters.starts_with(WORD_BOUNDARY) {
					context.push(storage.special_token_id()?);
				}
				for letter in letters.chars() {
					context.push(storage.id_of(letter)?);
				}
				Ok(context)
			}
			StartSeed::Random { order, seed } => {
				if *order == 0 {
					return Err(GenError::InvalidArgument("random seed order must be >= 1".to_owned()));
				}
				let trie = profile
					.trie(*order)
					.ok_or_else(|| GenError::NotFound(format!("order {order} trie")))?;
				let mut rng = StdRng::seed_from_u64(*seed);
				trie.iter()
					.map(|(key, _)| key.to_vec())
					.choose(&mut rng)
					.ok_or_else(|| GenError::NoCandidate { context: Vec::new() })
			}
		}
	}
}

/// Parses `"none"`, `"custom:<letters>"` or `"random:<order>[:<seed>]"`.
impl FromStr for StartSeed {
	type Err = GenError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let lower = s.to_lowercase();
		if lower == "none" || lower == "boundary" {
			return Ok(StartSeed::Boundary);
		}
		if let Some(value) = lower.strip_prefix("custom:") {
			if value.is_empty() {
				return Err(GenError::InvalidArgument("custom seed cannot be empty".into()));
			}
			return Ok(StartSeed::Custom(value.to_owned()));
		}
		if let Some(value) = lower.strip_prefix("random:") {
			let mut parts = value.splitn(2, ':');
			let order = parts
				.next()
				.and_then(|order| order.parse::<usize>().ok())
				.ok_or_else(|| GenError::InvalidArgument("random seed order must be an integer".into()))?;
			let seed = match parts.next() {
				Some(seed) => seed
					.parse::<u64>()
					.map_err(|_| GenError::InvalidArgument("random seed must be an integer".into()))?,
				None => 0,
			};
			return Ok(StartSeed::Random { order, seed });
		}
		Err(GenError::InvalidArgument(
			"seed must start with 'custom:' or 'random:' or be 'none'".into(),
		))
	}
}

/// Parameters of one generation run.
///
/// # Invariants
/// - `1 <= max_word_length <= MAX_WORD_LENGTH`
/// - `word_count <= MAX_WORD_COUNT`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationInput {
	/// Letter selection policy.
	pub strategy: Strategy,

	/// Context of the first word.
	pub start_seed: StartSeed,

	/// Number of words in the sentence.
	word_count: usize,

	/// Maximum number of ids in one word, seed context included.
	max_word_length: usize,
}

impl Default for GenerationInput {
	fn default() -> Self {
		Self {
			strategy: Strategy::default(),
			word_count: 1,
			start_seed: StartSeed::default(),
			max_word_length: DEFAULT_WORD_MAX_LENGTH,
		}
	}
}

impl GenerationInput {
	/// Returns the number of words per sentence.
	pub fn word_count(&self) -> usize {
		self.word_count
	}

	/// Sets the number of words per sentence.
	///
	/// # Errors
	/// Returns an error if `word_count > MAX_WORD_COUNT`.
	pub fn set_word_count(&mut self, word_count: usize) -> Result<(), GenError> {
		check_word_count(word_count)?;
		self.word_count = word_count;
		Ok(())
	}

	/// Returns the maximum word length.
	pub fn max_word_length(&self) -> usize {
		self.max_word_length
	}

	/// Sets the maximum word length.
	///
	/// # Errors
	/// Returns an error if `max_word_length` is 0 or above `MAX_WORD_LENGTH`.
	pub fn set_max_word_length(&mut self, max_word_length: usize) -> Result<(), GenError> {
		check_max_word_length(max_word_length)?;
		self.max_word_length = max_word_length;
		Ok(())
	}
}
