use log::debug;

use super::{last_id, LetterSelector, UsedNGrams};
use crate::error::GenError;
use crate::model::language_profile::LanguageProfile;
use crate::model::ngram_trie::NGramTrie;

/// Picks the continuation with the highest maximum-likelihood estimate.
///
/// `ML(l, c) = count(c·l) / Σ count(c·l')` over the continuations of `c` in
/// the trie of order `c.len() + 1`. When the context has no continuation at
/// all, the most frequent unigram is returned.
#[derive(Debug)]
pub struct LikelihoodSelector<'a> {
	profile: &'a LanguageProfile,
	used: UsedNGrams,
}

impl<'a> LikelihoodSelector<'a> {
	pub fn new(profile: &'a LanguageProfile) -> Self {
		Self { profile, used: UsedNGrams::default() }
	}

	/// Maximum-likelihood estimate of `letter` following `context`.
	///
	/// Returns 0.0 when the context was never observed.
	pub fn maximum_likelihood(&self, letter: usize, context: &[usize]) -> Result<f64, GenError> {
		if context.is_empty() {
			return Err(GenError::InvalidContext);
		}
		let Some(trie) = self.profile.trie(context.len() + 1) else {
			return Ok(0.0);
		};

		let mut letter_frequency = 0usize;
		let mut total = 0usize;
		for (key, count) in trie.continuations(context) {
			total += count;
			if key.last() == Some(&letter) {
				letter_frequency += count;
			}
		}
		if total == 0 {
			return Ok(0.0);
		}
		Ok(letter_frequency as f64 / total as f64)
	}

	/// Scores every continuation of `context` with its likelihood.
	fn scored<'t>(trie: &'t NGramTrie, context: &'t [usize]) -> Vec<(&'t [usize], f64)> {
		let total: usize = trie.continuations(context).map(|(_, count)| count).sum();
		if total == 0 {
			return Vec::new();
		}
		trie.continuations(context)
			.map(|(key, count)| (key, count as f64 / total as f64))
			.collect()
	}
}

impl LetterSelector for LikelihoodSelector<'_> {
	fn select_next(&mut self, context: &[usize]) -> Result<usize, GenError> {
		if context.is_empty() {
			return Err(GenError::InvalidContext);
		}
		let order = context.len() + 1;
		let no_candidate = || GenError::NoCandidate { context: context.to_vec() };

		let candidates = match self.profile.trie(order) {
			Some(trie) => Self::scored(trie, context),
			None => Vec::new(),
		};
		if candidates.is_empty() {
			debug!("likelihood: {context:?} never observed, using the most frequent unigram");
			let unigrams = self.profile.trie(1).ok_or_else(no_candidate)?;
			let (key, _) = unigrams.most_frequent().ok_or_else(no_candidate)?;
			return last_id(key, context);
		}

		let key = self.used.pick(order, &candidates).ok_or_else(no_candidate)?;
		last_id(key, context)
	}

	fn reset(&mut self) {
		self.used.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::selector::GreedySelector;
	use crate::model::selector::test_support::profile_with;

	#[test]
	fn likelihood_is_count_over_context_total() {
		let profile = profile_with(vec![(3, vec![
			(vec![1, 2, 3], 3),
			(vec![1, 2, 4], 5),
			(vec![1, 2, 0], 2),
			(vec![2, 2, 3], 8),
		])]);
		let selector = LikelihoodSelector::new(&profile);
		let ml = selector.maximum_likelihood(3, &[1, 2]).unwrap();
		assert!((ml - 0.3).abs() < 1e-12);
		assert_eq!(selector.maximum_likelihood(3, &[4, 4]), Ok(0.0));
		assert_eq!(selector.maximum_likelihood(3, &[1, 2, 3]), Ok(0.0));
		assert_eq!(selector.maximum_likelihood(3, &[]), Err(GenError::InvalidContext));
	}

	#[test]
	fn picks_highest_likelihood() {
		let profile = profile_with(vec![(2, vec![(vec![1, 2], 1), (vec![1, 3], 6), (vec![1, 4], 3)])]);
		let mut selector = LikelihoodSelector::new(&profile);
		assert_eq!(selector.select_next(&[1]), Ok(3));
		assert_eq!(selector.select_next(&[1]), Ok(4));
	}

	#[test]
	fn agrees_with_greedy_on_unambiguous_context() {
		let profile = profile_with(vec![(3, vec![(vec![1, 2, 3], 5)])]);
		let mut likelihood = LikelihoodSelector::new(&profile);
		let mut greedy = GreedySelector::new(&profile);
		assert_eq!(likelihood.select_next(&[1, 2]), Ok(3));
		assert_eq!(greedy.select_next(&[1, 2]), Ok(3));
	}

	#[test]
	fn unseen_context_falls_back_to_most_frequent_unigram() {
		let profile = profile_with(vec![
			(1, vec![(vec![0], 4), (vec![2], 9), (vec![3], 9)]),
			(2, vec![(vec![1, 2], 1)]),
		]);
		let mut selector = LikelihoodSelector::new(&profile);
		assert_eq!(selector.select_next(&[3]), Ok(2));
		assert_eq!(selector.select_next(&[3, 3]), Ok(2));
	}

	#[test]
	fn no_unigram_fallback_is_an_error() {
		let profile = profile_with(vec![(2, vec![(vec![1, 2], 1)])]);
		let mut selector = LikelihoodSelector::new(&profile);
		assert_eq!(selector.select_next(&[4]), Err(GenError::NoCandidate { context: vec![4] }));
	}
}
