//! Top-level module for the letter generation system.
//!
//! This module provides:
//! - Fixed-order n-gram frequency tries (`NGramTrie`)
//! - Language profiles grouping a storage and its tries (`LanguageProfile`)
//! - Letter selection policies (`selector`)
//! - Generation parameters (`GenerationInput`)
//! - Word and sentence generation (`TextGenerator`)

/// Word/sentence generation and plain-text formatting.
pub mod generator;

/// Generation parameters and start seeds.
pub mod generation_input;

/// Letter storage plus per-order tries, with binary and public loaders.
pub mod language_profile;

/// Fixed-order n-gram frequency table.
pub mod ngram_trie;

/// Greedy, likelihood and back-off letter selectors.
pub mod selector;
