use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GenError;

/// Frequency table of every observed n-gram of a fixed order.
///
/// Keys are id tuples of exactly `order` ids, values are the number of times
/// the tuple was observed. The map is ordered, so every scan visits keys in
/// lexicographic order and ties can always be broken towards the lowest key.
///
/// # Invariants
/// - `order >= 1`
/// - every key has length `order`
/// - every count is `>= 1`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NGramTrie {
	/// Number of ids per n-gram.
	order: usize,
	/// Observed n-grams and their counts.
	frequencies: BTreeMap<Vec<usize>, usize>,
}

impl NGramTrie {
	/// Creates an empty trie of order `order`.
	///
	/// # Errors
	/// Returns an error if `order == 0`.
	pub fn new(order: usize) -> Result<Self, GenError> {
		if order == 0 {
			return Err(GenError::InvalidArgument("n-gram order must be >= 1".to_owned()));
		}
		Ok(Self { order, frequencies: BTreeMap::new() })
	}

	/// Builds a trie from precomputed `(n-gram, count)` pairs.
	///
	/// Pairs with a zero count or a key of the wrong length are dropped,
	/// counts of repeated keys are summed.
	pub fn from_frequencies<I>(order: usize, pairs: I) -> Result<Self, GenError>
	where
		I: IntoIterator<Item = (Vec<usize>, usize)>,
	{
		let mut trie = Self::new(order)?;
		for (key, count) in pairs {
			if count == 0 || key.len() != order {
				continue;
			}
			*trie.frequencies.entry(key).or_insert(0) += count;
		}
		Ok(trie)
	}

	/// Order of the trie.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of distinct n-grams.
	pub fn len(&self) -> usize {
		self.frequencies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.frequencies.is_empty()
	}

	/// Counts every n-gram of an encoded word.
	///
	/// Words shorter than the order contribute nothing.
	pub fn add_word(&mut self, word: &[usize]) {
		for window in word.windows(self.order) {
			*self.frequencies.entry(window.to_vec()).or_insert(0) += 1;
		}
	}

	/// Count of `key`, 0 if never observed.
	pub fn frequency(&self, key: &[usize]) -> usize {
		self.frequencies.get(key).copied().unwrap_or(0)
	}

	/// Iterates over `(n-gram, count)` pairs in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&[usize], usize)> + '_ {
		self.frequencies.iter().map(|(key, count)| (key.as_slice(), *count))
	}

	/// Iterates over the n-grams whose prefix equals `context`, in key order.
	///
	/// Nothing matches when `context` is not shorter than the order.
	pub fn continuations<'a>(&'a self, context: &'a [usize]) -> impl Iterator<Item = (&'a [usize], usize)> + 'a {
		let usable = context.len() < self.order;
		self.frequencies
			.range(context.to_vec()..)
			.take_while(move |(key, _)| usable && key.starts_with(context))
			.map(|(key, count)| (key.as_slice(), *count))
	}

	/// Most frequent n-gram, the lowest key winning ties.
	pub fn most_frequent(&self) -> Option<(&[usize], usize)> {
		best_of(self.iter())
	}

	/// Merges another trie of the same order into this one.
	///
	/// # Errors
	/// Returns an error if the orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), GenError> {
		if self.order != other.order {
			return Err(GenError::InvalidArgument(format!(
				"order mismatch: {} vs {}",
				self.order, other.order
			)));
		}
		for (key, count) in &other.frequencies {
			*self.frequencies.entry(key.clone()).or_insert(0) += *count;
		}
		Ok(())
	}
}

/// Highest-scoring entry of a key-ordered scan.
///
/// Only a strictly greater score replaces the current best, so the first
/// (lowest) key wins ties.
pub(crate) fn best_of<'a, S, I>(entries: I) -> Option<(&'a [usize], S)>
where
	S: PartialOrd + Copy,
	I: IntoIterator<Item = (&'a [usize], S)>,
{
	let mut best: Option<(&'a [usize], S)> = None;
	for (key, score) in entries {
		match best {
			Some((_, best_score)) if score <= best_score => {}
			_ => best = Some((key, score)),
		}
	}
	best
}
