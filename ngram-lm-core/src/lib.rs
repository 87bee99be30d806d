//! N-gram language models with classic smoothing strategies.
//!
//! This crate provides word-level bigram and trigram models including:
//! - Sparse count containers (`Counter`, `CounterMap`)
//! - Stupid backoff, linear interpolation, Katz/Good-Turing and Kneser-Ney estimators
//! - Sentence probability, perplexity and validation-driven hyperparameter selection
//! - Sentence generation by sampling the learned distributions
//!
//! Every estimator implements [`model::LanguageModel`], which is the contract
//! consumed by corpus loaders and reporting front-ends.

/// Reserved tokens and default hyperparameters.
pub mod constants;

/// Error and diagnostic types shared by every estimator.
pub mod error;

/// Count containers, estimators and the sentence generator.
pub mod model;

/// Corpus file helpers (one whitespace-tokenised sentence per line).
pub mod io;

pub use constants::{START, STOP, UNKNOWN};
pub use error::{Diagnostic, Error};
pub use model::LanguageModel;
