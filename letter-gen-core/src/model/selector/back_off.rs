use log::debug;

use super::{last_id, LetterSelector, UsedNGrams};
use crate::error::GenError;
use crate::model::language_profile::LanguageProfile;

/// Greedy selection with recursive context shrinking.
///
/// Tries the trie of order `context.len() + 1` first. If that order is
/// missing, or no n-gram continues the context, the oldest id is dropped and
/// the next lower order is tried, down to the unigram trie where every key
/// is a candidate. At most `context.len() + 1` orders are visited.
#[derive(Debug)]
pub struct BackOffSelector<'a> {
	profile: &'a LanguageProfile,
	used: UsedNGrams,
}

impl<'a> BackOffSelector<'a> {
	pub fn new(profile: &'a LanguageProfile) -> Self {
		Self { profile, used: UsedNGrams::default() }
	}
}

impl LetterSelector for BackOffSelector<'_> {
	fn select_next(&mut self, context: &[usize]) -> Result<usize, GenError> {
		if context.is_empty() {
			return Err(GenError::InvalidContext);
		}

		for start in 0..=context.len() {
			let shrunk = &context[start..];
			let order = shrunk.len() + 1;
			let Some(trie) = self.profile.trie(order) else {
				debug!("back-off: no order {order} trie, shrinking {shrunk:?}");
				continue;
			};

			let candidates: Vec<(&[usize], usize)> = trie.continuations(shrunk).collect();
			if let Some(key) = self.used.pick(order, &candidates) {
				return last_id(key, context);
			}
			debug!("back-off: {shrunk:?} unseen at order {order}, shrinking");
		}

		Err(GenError::NoCandidate { context: context.to_vec() })
	}

	fn reset(&mut self) {
		self.used.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::selector::test_support::profile_with;

	#[test]
	fn uses_full_context_when_observed() {
		let profile = profile_with(vec![
			(1, vec![(vec![4], 10)]),
			(2, vec![(vec![2, 4], 10)]),
			(3, vec![(vec![1, 2, 3], 1)]),
		]);
		let mut selector = BackOffSelector::new(&profile);
		assert_eq!(selector.select_next(&[1, 2]), Ok(3));
	}

	#[test]
	fn shrinks_unseen_context() {
		let profile = profile_with(vec![
			(1, vec![(vec![4], 10)]),
			(2, vec![(vec![2, 3], 2), (vec![2, 1], 1)]),
			(3, vec![(vec![1, 1, 1], 1)]),
		]);
		let mut selector = BackOffSelector::new(&profile);
		assert_eq!(selector.select_next(&[4, 2]), Ok(3));
	}

	#[test]
	fn skips_missing_orders() {
		let profile = profile_with(vec![(1, vec![(vec![1], 1)]), (2, vec![(vec![3, 2], 1)])]);
		let mut selector = BackOffSelector::new(&profile);
		assert_eq!(selector.select_next(&[1, 1, 3]), Ok(2));
	}

	#[test]
	fn unigram_only_profile_always_answers() {
		let profile = profile_with(vec![(1, vec![(vec![2], 5), (vec![3], 1)])]);
		let mut selector = BackOffSelector::new(&profile);
		let context = [1, 4, 0, 1, 3];
		for _ in 0..4 {
			let id = selector.select_next(&context).unwrap();
			assert!(profile.trie(1).unwrap().frequency(&[id]) > 0);
		}
		selector.reset();
		assert_eq!(selector.select_next(&context), Ok(2));
	}

	#[test]
	fn empty_profile_has_no_candidate() {
		let profile = profile_with(vec![]);
		let mut selector = BackOffSelector::new(&profile);
		assert_eq!(selector.select_next(&[1]), Err(GenError::NoCandidate { context: vec![1] }));
		assert_eq!(selector.select_next(&[]), Err(GenError::InvalidContext));
	}
}
