use crate::error::GenError;
use crate::storage::LetterStorage;

/// Encodes a corpus by replacing letters with their ids.
///
/// Unknown letters are registered on the way, so `storage` grows as needed.
/// An empty corpus is a no-op and yields an empty result.
pub fn encode_corpus(storage: &mut LetterStorage, corpus: &[Vec<char>]) -> Vec<Vec<usize>> {
	if corpus.is_empty() {
		return Vec::new();
	}
	corpus
		.iter()
		.map(|word| word.iter().map(|letter| storage.register(*letter)).collect())
		.collect()
}

/// Decodes a sequence of encoded words back to letters.
///
/// # Errors
/// `GenError::NotFound` on the first id unknown to `storage`.
pub fn decode_sentence(storage: &LetterStorage, sentence: &[Vec<usize>]) -> Result<Vec<Vec<char>>, GenError> {
	sentence
		.iter()
		.map(|word| word.iter().map(|id| storage.letter_of(*id)).collect())
		.collect()
}
