use log::debug;

use super::{last_id, LetterSelector, UsedNGrams};
use crate::error::GenError;
use crate::model::language_profile::LanguageProfile;

/// Picks the most frequent continuation of the context.
///
/// Only the trie of order `context.len() + 1` is consulted. When no n-gram
/// of that trie starts with the context, the most frequent n-gram of the
/// whole trie is used instead.
#[derive(Debug)]
pub struct GreedySelector<'a> {
	profile: &'a LanguageProfile,
	used: UsedNGrams,
}

impl<'a> GreedySelector<'a> {
	pub fn new(profile: &'a LanguageProfile) -> Self {
		Self { profile, used: UsedNGrams::default() }
	}
}

impl LetterSelector for GreedySelector<'_> {
	fn select_next(&mut self, context: &[usize]) -> Result<usize, GenError> {
		if context.is_empty() {
			return Err(GenError::InvalidContext);
		}
		let order = context.len() + 1;
		let no_candidate = || GenError::NoCandidate { context: context.to_vec() };
		let trie = self.profile.trie(order).ok_or_else(no_candidate)?;

		let candidates: Vec<(&[usize], usize)> = trie.continuations(context).collect();
		if candidates.is_empty() {
			debug!("greedy: no order {order} n-gram continues {context:?}, using the most frequent one");
			let (key, _) = trie.most_frequent().ok_or_else(no_candidate)?;
			return last_id(key, context);
		}

		let key = self.used.pick(order, &candidates).ok_or_else(no_candidate)?;
		last_id(key, context)
	}

	fn reset(&mut self) {
		self.used.clear();
	}
}
