//! Letter-level n-gram text generation library.
//!
//! This crate provides a deterministic character-level generation system including:
//! - Corpus tokenization and a bidirectional letter/id storage
//! - Corpus encoding and decoding
//! - Per-order n-gram frequency tries grouped in a language profile
//! - Interchangeable letter selectors (greedy, likelihood, back-off)
//! - Word and sentence generation with plain-text formatting
//!
//! Low-level helpers (file I/O) are kept internal; only `list_files` is
//! re-exported for front ends that browse a data folder.

/// Error types shared by the whole crate.
pub mod error;

/// Text cleaning and letter tokenization.
pub mod tokenizer;

/// Bidirectional letter <-> id storage.
pub mod storage;

/// Corpus encoding/decoding through a `LetterStorage`.
pub mod codec;

/// N-gram tries, language profiles, selectors and the generator.
pub mod model;

/// I/O utilities (file loading, path helpers).
/// Not exposed.
mod io;

pub use error::{GenError, ProfileError};
pub use io::list_files;
