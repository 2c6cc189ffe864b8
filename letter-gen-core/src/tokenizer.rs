use crate::storage::WORD_BOUNDARY;

/// Splits a raw text into words of letters.
///
/// - Keeps alphabetic characters and whitespace only
/// - Lowercases everything
/// - Wraps every word with `WORD_BOUNDARY`: `"Hi"` → `['_', 'h', 'i', '_']`
///
/// A text without any letter yields an empty corpus.
pub fn tokenize_by_letters(text: &str) -> Vec<Vec<char>> {
	let cleaned: String = text
		.chars()
		.filter(|c| c.is_alphabetic() || c.is_whitespace())
		.flat_map(char::to_lowercase)
		.collect();

	cleaned
		.split_whitespace()
		.map(|word| {
			let mut letters = Vec::with_capacity(word.chars().count() + 2);
			letters.push(WORD_BOUNDARY);
			letters.extend(word.chars());
			letters.push(WORD_BOUNDARY);
			letters
		})
		.collect()
}
