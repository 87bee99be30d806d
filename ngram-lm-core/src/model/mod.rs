//! Top-level module for the n-gram estimation system.
//!
//! This module provides:
//! - Sparse count containers (`Counter`, `CounterMap`)
//! - The training pass shared by every estimator (`NGramCounts`)
//! - Four smoothing strategies behind the `LanguageModel` trait
//! - Perplexity evaluation and validation-driven selection
//! - A sentence `Generator`

/// Sparse key → count map with frequency-of-frequency views.
pub mod counter;

/// Context → `Counter` table.
pub mod counter_map;

/// Good-Turing bucket tables and discounted counts.
///
/// Not exposed
mod good_turing;

/// Boundary padding and the counting pass over training sentences.
pub mod counts;

/// Hyperparameters of every estimator, with validation.
pub mod config;

/// The contract shared by every estimator.
pub mod language_model;

/// Linear blend of bigram and unigram counts.
pub mod stupid_backoff;

/// Fixed-weight trigram/bigram/unigram interpolation.
pub mod interpolated;

/// Good-Turing discounting with Katz backoff.
pub mod katz;

/// Absolute discounting with continuation probabilities.
pub mod kneser_ney;

/// Sentence sampling over any `LanguageModel`.
pub mod generator;

/// Perplexity over held-out sentences.
pub mod evaluation;

/// Hyperparameter selection on a validation collection.
pub mod tuning;

pub use config::{
	CountScaling, GenerationConfig, InterpolatedConfig, KatzConfig, KatzQuery, KneserNeyConfig,
	StupidBackoffConfig,
};
pub use counter::Counter;
pub use counter_map::CounterMap;
pub use counts::{pad_sentence, NGramCounts, PairContext};
pub use evaluation::perplexity;
pub use generator::Generator;
pub use interpolated::InterpolatedModel;
pub use katz::{KatzBigramModel, KatzTrigramModel};
pub use kneser_ney::{ContinuationTable, KneserNeyBigramModel, KneserNeyTrigramModel};
pub use language_model::LanguageModel;
pub use stupid_backoff::StupidBackoffModel;
pub use tuning::{select_by_perplexity, Selection};
