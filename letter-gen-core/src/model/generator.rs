use log::debug;

use super::generation_input::{
	check_max_word_length, check_word_count, GenerationInput, DEFAULT_WORD_MAX_LENGTH,
};
use super::language_profile::LanguageProfile;
use super::selector::{LetterSelector, Strategy};
use crate::codec::decode_sentence;
use crate::error::GenError;
use crate::storage::WORD_BOUNDARY;

/// Drives a `LetterSelector` to produce words and sentences.
///
/// # Responsibilities
/// - Grow words letter by letter until the special token or the length limit
/// - Chain words into sentences, each word seeding the next
/// - Decode and format sentences as plain text
///
/// The profile is only borrowed. The selector, and therefore its memory of
/// emitted n-grams, belongs to this generator alone.
pub struct TextGenerator<'a, S: LetterSelector> {
	profile: &'a LanguageProfile,
	selector: S,
	max_word_length: usize,
}

impl<'a> TextGenerator<'a, Box<dyn LetterSelector + 'a>> {
	/// Creates a generator using a fresh selector of `strategy`.
	pub fn with_strategy(profile: &'a LanguageProfile, strategy: Strategy) -> Self {
		Self::new(profile, strategy.selector(profile))
	}
}

impl<'a, S: LetterSelector> TextGenerator<'a, S> {
	pub fn new(profile: &'a LanguageProfile, selector: S) -> Self {
		Self { profile, selector, max_word_length: DEFAULT_WORD_MAX_LENGTH }
	}

	/// Sets the length limit used by `generate_sentence`.
	///
	/// # Errors
	/// Returns an error if `max_word_length` is 0 or above `MAX_WORD_LENGTH`.
	pub fn with_max_word_length(mut self, max_word_length: usize) -> Result<Self, GenError> {
		check_max_word_length(max_word_length)?;
		self.max_word_length = max_word_length;
		Ok(self)
	}

	/// Forgets the n-grams emitted so far.
	pub fn reset(&mut self) {
		self.selector.reset();
	}

	/// Generates one word continuing `context`.
	///
	/// The returned word starts with `context`. Letters are appended until the
	/// selector yields the special token (which is kept) or the word holds
	/// `max_length` ids. With `max_length == 1` only the special token is
	/// appended. After each letter the context becomes the last
	/// `context.len()` ids of the word.
	///
	/// # Errors
	/// `GenError::InvalidArgument` if `max_length` is 0 or above `MAX_WORD_LENGTH`.
	pub fn generate_word(&mut self, context: &[usize], max_length: usize) -> Result<Vec<usize>, GenError> {
		check_max_word_length(max_length)?;
		if context.is_empty() {
			return Err(GenError::InvalidContext);
		}
		let special = self.profile.storage().special_token_id()?;

		let mut word = context.to_vec();
		if max_length == 1 {
			word.push(special);
			return Ok(word);
		}

		let window = context.len();
		while word.len() < max_length {
			let letter = self.selector.select_next(&word[word.len() - window..])?;
			word.push(letter);
			if letter == special {
				break;
			}
		}
		Ok(word)
	}

	/// Generates exactly `word_count` words.
	///
	/// The first word continues `context`, every next word continues the last
	/// id of the previous one.
	///
	/// # Errors
	/// `GenError::InvalidArgument` if `word_count > MAX_WORD_COUNT`.
	pub fn generate_sentence(&mut self, context: &[usize], word_count: usize) -> Result<Vec<Vec<usize>>, GenError> {
		check_word_count(word_count)?;
		let mut sentence = Vec::new();
		let mut context = context.to_vec();

		while sentence.len() < word_count {
			let word = self.generate_word(&context, self.max_word_length)?;
			context = word.last().map(|id| vec![*id]).ok_or(GenError::InvalidContext)?;
			debug!("word {} generated: {:?}", sentence.len() + 1, word);
			sentence.push(word);
		}
		Ok(sentence)
	}

	/// Generates a sentence and formats it as plain text.
	///
	/// Zero words give the bare period `"."`.
	pub fn generate_decoded_sentence(&mut self, context: &[usize], word_count: usize) -> Result<String, GenError> {
		let sentence = self.generate_sentence(context, word_count)?;
		let decoded = decode_sentence(self.profile.storage(), &sentence)?;
		Ok(format_sentence(&decoded))
	}
}

/// Formats a decoded corpus as a sentence.
///
/// Boundary pairs become spaces, remaining boundaries are dropped, the first
/// letter is capitalized and a period is appended. An empty corpus gives an
/// empty string.
pub fn translate_to_plain_text(decoded: &[Vec<char>]) -> String {
	if decoded.is_empty() {
		return String::new();
	}
	format_sentence(decoded)
}

/// Collapses boundaries, capitalizes and appends the period.
fn format_sentence(decoded: &[Vec<char>]) -> String {
	let raw: String = decoded.iter().flatten().collect();
	let pair: String = [WORD_BOUNDARY, WORD_BOUNDARY].iter().collect();
	let text = raw.replace(&pair, " ").replace(WORD_BOUNDARY, "");

	let mut chars = text.chars();
	let mut result: String = match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	};
	result.push('.');
	result
}

/// Runs one full generation with a fresh selector.
pub fn generate(profile: &LanguageProfile, input: &GenerationInput) -> Result<String, GenError> {
	let context = input.start_seed.resolve(profile)?;
	let mut generator = TextGenerator::with_strategy(profile, input.strategy)
		.with_max_word_length(input.max_word_length())?;
	generator.generate_decoded_sentence(&context, input.word_count())
}
