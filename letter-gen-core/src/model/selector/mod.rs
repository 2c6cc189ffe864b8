//! Letter selection policies.
//!
//! A selector receives the ids generated so far (the context) and returns the
//! next id. Every policy is deterministic: the highest score wins and ties go
//! to the lowest n-gram key.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::language_profile::LanguageProfile;
use super::ngram_trie::best_of;
use crate::error::GenError;

mod back_off;
mod greedy;
mod likelihood;

pub use back_off::BackOffSelector;
pub use greedy::GreedySelector;
pub use likelihood::LikelihoodSelector;

/// Picks the next letter id for a context.
pub trait LetterSelector {
	/// Returns the id that follows `context`.
	///
	/// # Errors
	/// - `GenError::InvalidContext` if `context` is empty.
	/// - `GenError::NoCandidate` if the profile has nothing to offer.
	fn select_next(&mut self, context: &[usize]) -> Result<usize, GenError>;

	/// Forgets every n-gram emitted so far.
	fn reset(&mut self);
}

impl<S: LetterSelector + ?Sized> LetterSelector for Box<S> {
	fn select_next(&mut self, context: &[usize]) -> Result<usize, GenError> {
		(**self).select_next(context)
	}

	fn reset(&mut self) {
		(**self).reset()
	}
}

/// Available selection policies.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
	/// Highest raw count at order `context + 1`.
	#[default]
	Greedy,
	/// Highest maximum-likelihood estimate at order `context + 1`.
	Likelihood,
	/// Greedy, shrinking the context until some order matches.
	BackOff,
}

impl Strategy {
	/// Builds a fresh selector of this policy over `profile`.
	pub fn selector<'a>(self, profile: &'a LanguageProfile) -> Box<dyn LetterSelector + 'a> {
		match self {
			Strategy::Greedy => Box::new(GreedySelector::new(profile)),
			Strategy::Likelihood => Box::new(LikelihoodSelector::new(profile)),
			Strategy::BackOff => Box::new(BackOffSelector::new(profile)),
		}
	}
}

impl FromStr for Strategy {
	type Err = GenError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"greedy" => Ok(Strategy::Greedy),
			"likelihood" | "ml" => Ok(Strategy::Likelihood),
			"backoff" | "back-off" => Ok(Strategy::BackOff),
			other => Err(GenError::InvalidArgument(format!(
				"unknown strategy '{other}', expected greedy, likelihood or backoff"
			))),
		}
	}
}

impl fmt::Display for Strategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Strategy::Greedy => "greedy",
			Strategy::Likelihood => "likelihood",
			Strategy::BackOff => "backoff",
		};
		f.write_str(name)
	}
}

/// N-grams already emitted during the current run, per trie order.
///
/// A candidate list whose keys are all used is exhausted: the memory of that
/// order is cleared and every candidate becomes eligible again.
#[derive(Debug, Default, Clone)]
pub(crate) struct UsedNGrams {
	used: HashMap<usize, HashSet<Vec<usize>>>,
}

impl UsedNGrams {
	/// Picks the best fresh candidate of a key-ordered list and marks it used.
	///
	/// Returns `None` only for an empty candidate list.
	pub(crate) fn pick<'a, S>(&mut self, order: usize, candidates: &[(&'a [usize], S)]) -> Option<&'a [usize]>
	where
		S: PartialOrd + Copy,
	{
		if candidates.is_empty() {
			return None;
		}
		let used = self.used.entry(order).or_default();
		let mut fresh: Vec<(&'a [usize], S)> = candidates
			.iter()
			.filter(|(key, _)| !used.contains(*key))
			.copied()
			.collect();

		if fresh.is_empty() {
			debug!("order {order}: {} candidates exhausted, forgetting used n-grams", candidates.len());
			used.clear();
			fresh = candidates.to_vec();
		}

		let (key, _) = best_of(fresh)?;
		used.insert(key.to_vec());
		Some(key)
	}

	pub(crate) fn clear(&mut self) {
		self.used.clear();
	}
}

/// Continuation letter of a winning n-gram.
pub(crate) fn last_id(key: &[usize], context: &[usize]) -> Result<usize, GenError> {
	key.last()
		.copied()
		.ok_or_else(|| GenError::NoCandidate { context: context.to_vec() })
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strategy_parses_known_names() {
		assert_eq!("greedy".parse::<Strategy>(), Ok(Strategy::Greedy));
		assert_eq!("Likelihood".parse::<Strategy>(), Ok(Strategy::Likelihood));
		assert_eq!("back-off".parse::<Strategy>(), Ok(Strategy::BackOff));
		assert!("random".parse::<Strategy>().is_err());
		assert_eq!(Strategy::BackOff.to_string(), "backoff");
	}

	#[test]
	fn used_ngrams_skip_then_reset() {
		let mut used = UsedNGrams::default();
		let (ab, ac): (&[usize], &[usize]) = (&[1, 2], &[1, 3]);
		let candidates = [(ab, 3usize), (ac, 1usize)];

		assert_eq!(used.pick(2, &candidates), Some(ab));
		assert_eq!(used.pick(2, &candidates), Some(ac));
		assert_eq!(used.pick(2, &candidates), Some(ab));
		assert_eq!(used.pick(2, &[] as &[(&[usize], usize)]), None);
	}

	#[test]
	fn used_ngrams_are_kept_per_order() {
		let mut used = UsedNGrams::default();
		let a: &[usize] = &[1];
		let ab: &[usize] = &[1, 2];
		assert_eq!(used.pick(1, &[(a, 1usize)]), Some(a));
		assert_eq!(used.pick(2, &[(ab, 1usize)]), Some(ab));
		assert_eq!(used.pick(1, &[(a, 1usize)]), Some(a));
	}

	#[test]
	fn boxed_selectors_are_interchangeable() {
		let profile = test_support::profile_with(vec![(2, vec![(vec![1, 2], 1)])]);
		for strategy in [Strategy::Greedy, Strategy::Likelihood, Strategy::BackOff] {
			let mut selector = strategy.selector(&profile);
			assert_eq!(selector.select_next(&[1]), Ok(2), "{strategy}");
		}
	}
}
