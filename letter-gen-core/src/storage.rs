use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GenError;

/// Marker placed at the start and the end of every word.
///
/// Its id doubles as the special token that stops word generation.
pub const WORD_BOUNDARY: char = '_';

/// Bidirectional mapping between letters and dense ids.
///
/// Ids are assigned in first-seen order starting at 0. The mapping only
/// grows: a registered letter keeps its id for the lifetime of the storage.
///
/// # Invariants
/// - `letters[ids[c]] == c` for every registered letter `c`
/// - ids form the contiguous range `0..letters.len()`
/// - letters are stored lowercase
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LetterStorage {
	/// Letters indexed by their id.
	letters: Vec<char>,
	/// Reverse index.
	ids: HashMap<char, usize>,
}

/// Lowercases a letter, keeping the first char of multi-char foldings.
fn fold(letter: char) -> char {
	letter.to_lowercase().next().unwrap_or(letter)
}

impl LetterStorage {
	/// Creates an empty storage.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a letter and returns its id.
	///
	/// Already known letters keep their id.
	pub fn register(&mut self, letter: char) -> usize {
		let letter = fold(letter);
		if let Some(id) = self.ids.get(&letter) {
			return *id;
		}
		let id = self.letters.len();
		self.letters.push(letter);
		self.ids.insert(letter, id);
		id
	}

	/// Registers every letter of every word of a corpus.
	pub fn register_corpus(&mut self, corpus: &[Vec<char>]) {
		for word in corpus {
			for letter in word {
				self.register(*letter);
			}
		}
	}

	/// Returns the id of a registered letter.
	pub fn id_of(&self, letter: char) -> Result<usize, GenError> {
		self.ids
			.get(&fold(letter))
			.copied()
			.ok_or_else(|| GenError::NotFound(format!("letter {letter:?}")))
	}

	/// Returns the letter registered under `id`.
	pub fn letter_of(&self, id: usize) -> Result<char, GenError> {
		self.letters
			.get(id)
			.copied()
			.ok_or_else(|| GenError::NotFound(format!("id {id}")))
	}

	/// Number of registered letters.
	///
	/// # Errors
	/// `GenError::Empty` if nothing has been registered yet.
	pub fn count(&self) -> Result<usize, GenError> {
		if self.letters.is_empty() {
			return Err(GenError::Empty);
		}
		Ok(self.letters.len())
	}

	/// Id of the word boundary, used as the end-of-word token.
	pub fn special_token_id(&self) -> Result<usize, GenError> {
		self.id_of(WORD_BOUNDARY)
	}

	/// Iterates over `(id, letter)` pairs in id order.
	pub fn iter(&self) -> impl Iterator<Item = (usize, char)> + '_ {
		self.letters.iter().copied().enumerate()
	}
}
