use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::ngram_trie::NGramTrie;
use crate::codec::encode_corpus;
use crate::error::{GenError, ProfileError};
use crate::io::{build_output_path, get_filename, read_text};
use crate::storage::{LetterStorage, WORD_BOUNDARY};
use crate::tokenizer::tokenize_by_letters;

/// Orders built when the caller does not ask for specific ones.
pub const DEFAULT_ORDERS: [usize; 3] = [1, 2, 3];

/// A trained language profile: the letter storage plus one n-gram trie per
/// observed order.
///
/// The profile is built once and then only read. Selectors and generators
/// borrow it immutably, so several generation runs can share one profile.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LanguageProfile {
	name: String,
	storage: LetterStorage,
	tries: BTreeMap<usize, NGramTrie>,
	/// Every order counted so far, including orders that yielded no n-gram.
	counted_orders: BTreeSet<usize>,
}

/// On-disk layout of a public (externally built) profile.
#[derive(Deserialize)]
struct PublicProfile {
	name: String,
	freq: BTreeMap<String, usize>,
}

impl LanguageProfile {
	/// Creates a profile without any trie.
	pub fn new(name: &str, storage: LetterStorage) -> Self {
		Self { name: name.to_owned(), storage, tries: BTreeMap::new(), counted_orders: BTreeSet::new() }
	}

	/// Tokenizes and encodes `text`, then counts every order in `orders`.
	pub fn from_text(name: &str, text: &str, orders: &[usize]) -> Result<Self, GenError> {
		let mut storage = LetterStorage::new();
		let encoded = encode_corpus(&mut storage, &tokenize_by_letters(text));
		let mut profile = Self::new(name, storage);
		profile.create_from_tokens(&encoded, orders)?;
		Ok(profile)
	}

	/// Profile name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Letter storage used to encode the training corpus.
	pub fn storage(&self) -> &LetterStorage {
		&self.storage
	}

	/// Trie of the given order, if that order was observed.
	pub fn trie(&self, order: usize) -> Option<&NGramTrie> {
		self.tries.get(&order)
	}

	/// Iterates over the tries by increasing order.
	pub fn tries(&self) -> impl Iterator<Item = &NGramTrie> {
		self.tries.values()
	}

	/// Observed orders, increasing.
	pub fn orders(&self) -> Vec<usize> {
		self.tries.keys().copied().collect()
	}

	/// Whether every order of `orders` has been counted.
	pub fn covers(&self, orders: &[usize]) -> bool {
		orders.iter().all(|order| self.counted_orders.contains(order))
	}

	/// Adds a trie, merging it with an existing one of the same order.
	pub fn insert_trie(&mut self, trie: NGramTrie) -> Result<(), GenError> {
		self.counted_orders.insert(trie.order());
		match self.tries.get_mut(&trie.order()) {
			Some(existing) => existing.merge(&trie),
			None => {
				self.tries.insert(trie.order(), trie);
				Ok(())
			}
		}
	}

	/// Counts every requested order over an encoded corpus.
	///
	/// # Behavior
	/// - Splits the words into chunks (based on CPU cores * factor).
	/// - Spawns threads that count each chunk into partial tries.
	/// - Merges all partial tries into the profile.
	///
	/// Orders with no n-gram at all (every word too short) are not stored.
	///
	/// # Errors
	/// Returns an error if `orders` is empty or contains 0.
	pub fn create_from_tokens(&mut self, encoded: &[Vec<usize>], orders: &[usize]) -> Result<(), GenError> {
		if orders.is_empty() || orders.contains(&0) {
			return Err(GenError::InvalidArgument(format!("invalid n-gram orders {orders:?}")));
		}
		self.counted_orders.extend(orders.iter().copied());
		if encoded.is_empty() {
			return Ok(());
		}

		let chunks = num_cpus::get() * 8;
		let chunk_size = encoded.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		for chunk in encoded.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<Vec<usize>> = chunk.to_vec();
			let orders: Vec<usize> = orders.to_vec();

			thread::spawn(move || {
				let partial: Result<Vec<NGramTrie>, GenError> = orders
					.iter()
					.map(|order| -> Result<NGramTrie, GenError> {
						let mut trie = NGramTrie::new(*order)?;
						for word in &chunk {
							trie.add_word(word);
						}
						Ok(trie)
					})
					.collect();
				// The receiver outlives every sender.
				let _ = tx.send(partial);
			});
		}
		drop(tx);

		for partial in rx.iter() {
			for trie in partial? {
				if !trie.is_empty() {
					self.insert_trie(trie)?;
				}
			}
		}

		info!(
			"profile '{}': {} words counted, orders {:?}",
			self.name,
			encoded.len(),
			self.orders()
		);
		Ok(())
	}

	/// Loads a profile from a corpus text file.
	///
	/// - Uses the binary file (`<stem>.bin`) when it exists and already
	///   counted every requested order.
	/// - Otherwise tokenizes the text, counts `orders` (plus the orders of an
	///   outdated cache) and rewrites the binary.
	pub fn load<P: AsRef<Path>>(filepath: P, orders: &[usize]) -> Result<Self, ProfileError> {
		let binary_data_path = build_output_path(&filepath, "bin")?;
		let mut wanted: BTreeSet<usize> = orders.iter().copied().collect();
		if binary_data_path.exists() {
			match Self::open(&binary_data_path) {
				Ok(cached) if cached.covers(orders) => {
					info!("loading cached profile {}", binary_data_path.display());
					return Ok(cached);
				}
				Ok(cached) => {
					info!(
						"cached profile {} lacks orders {:?}, rebuilding",
						binary_data_path.display(),
						wanted.difference(&cached.counted_orders).collect::<Vec<_>>()
					);
					wanted.extend(cached.counted_orders);
				}
				Err(e) => warn!("unreadable cached profile {}: {e}, rebuilding", binary_data_path.display()),
			}
		}

		let name = get_filename(&filepath)?;
		let text = read_text(&filepath)?;
		let orders: Vec<usize> = wanted.into_iter().collect();
		let profile = Self::from_text(&name, &text, &orders)?;
		profile.save(&binary_data_path)?;
		Ok(profile)
	}

	/// Serializes the profile with postcard.
	pub fn save<P: AsRef<Path>>(&self, filepath: P) -> Result<(), ProfileError> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(&filepath, bytes)?;
		debug!("profile '{}' saved to {}", self.name, filepath.as_ref().display());
		Ok(())
	}

	/// Reads a profile written by `save`.
	pub fn open<P: AsRef<Path>>(filepath: P) -> Result<Self, ProfileError> {
		let bytes = std::fs::read(filepath)?;
		Ok(postcard::from_bytes(&bytes)?)
	}

	/// Opens a public JSON profile and adapts it.
	///
	/// The file holds `{"name": .., "freq": {"<ngram>": count, ..}}`; other keys
	/// are ignored.
	/// Spaces inside n-grams mark word boundaries. N-grams with any other
	/// non-letter symbol are skipped.
	pub fn open_public<P: AsRef<Path>>(filepath: P) -> Result<Self, ProfileError> {
		let public: PublicProfile = serde_json::from_str(&read_text(filepath)?)?;
		Self::from_public(public)
	}

	fn from_public(public: PublicProfile) -> Result<Self, ProfileError> {
		let mut storage = LetterStorage::new();
		let mut grouped: BTreeMap<usize, Vec<(Vec<usize>, usize)>> = BTreeMap::new();
		let mut skipped = 0usize;

		for (ngram, count) in &public.freq {
			let letters: Option<Vec<char>> = ngram
				.chars()
				.map(|c| match c {
					' ' | WORD_BOUNDARY => Some(WORD_BOUNDARY),
					c if c.is_alphabetic() => Some(c),
					_ => None,
				})
				.collect();
			let Some(letters) = letters.filter(|letters| !letters.is_empty()) else {
				skipped += 1;
				continue;
			};
			let key: Vec<usize> = letters.iter().map(|letter| storage.register(*letter)).collect();
			grouped.entry(key.len()).or_default().push((key, *count));
		}

		if skipped > 0 {
			warn!("public profile '{}': {} n-grams skipped", public.name, skipped);
		}
		if grouped.is_empty() {
			return Err(ProfileError::Format(format!("public profile '{}' holds no usable n-gram", public.name)));
		}

		let mut profile = Self::new(&public.name, storage);
		for (order, pairs) in grouped {
			let trie = NGramTrie::from_frequencies(order, pairs)?;
			if !trie.is_empty() {
				profile.insert_trie(trie)?;
			}
		}
		info!("public profile '{}' adapted, orders {:?}", profile.name, profile.orders());
		Ok(profile)
	}
}
