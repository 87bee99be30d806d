use std::fmt;

use log::Level;
use thiserror::Error;

/// Errors surfaced to callers of the estimators.
#[derive(Debug, Error)]
pub enum Error {
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("training collection contains no sentences")]
	EmptyCorpus,

	/// A probability or weight evaluated to NaN, an infinity or a negative value.
	#[error("invalid estimate for {what}: {value}")]
	NonFiniteResult { what: String, value: f64 },

	/// A denominator of the estimate is zero, so the value does not exist.
	#[error("estimate for {what} is undefined (zero denominator)")]
	UndefinedEstimate { what: String },

	#[error("no {stop} after {max_length} sampled tokens", stop = crate::STOP)]
	IncompleteSampling { max_length: usize },

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Recoverable conditions met while smoothing.
///
/// The estimator applies the documented fallback, records the diagnostic on
/// the model and logs it with [`Diagnostic::severity`].
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
	/// `N(count)` or `N(count + 1)` is zero; the raw count was kept.
	UndefinedDiscount { count: usize },

	/// All probability mass of the context is already spent at the higher
	/// order; its backoff weight is zero.
	DegenerateBackoff { context: String },

	/// A computed value was NaN, infinite or negative and got replaced.
	ClampedEstimate { what: String, value: f64, replacement: f64 },
}

impl Diagnostic {
	pub fn severity(&self) -> Level {
		match self {
			Diagnostic::UndefinedDiscount { .. } => Level::Warn,
			Diagnostic::DegenerateBackoff { .. } => Level::Debug,
			Diagnostic::ClampedEstimate { .. } => Level::Warn,
		}
	}

	/// Logs the diagnostic at its severity and hands it back.
	pub fn report(self) -> Self {
		log::log!(self.severity(), "{}", self);
		self
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Diagnostic::UndefinedDiscount { count } => {
				write!(f, "Good-Turing discount undefined for count {}, keeping raw count", count)
			}
			Diagnostic::DegenerateBackoff { context } => {
				write!(f, "no residual mass for context {}, backoff weight set to 0", context)
			}
			Diagnostic::ClampedEstimate { what, value, replacement } => {
				write!(f, "invalid {} ({}), replaced by {}", what, value, replacement)
			}
		}
	}
}

/// Passes `value` through if it is a usable probability or weight.
pub(crate) fn checked(what: impl FnOnce() -> String, value: f64) -> Result<f64, Error> {
	if value.is_finite() && value >= 0.0 {
		Ok(value)
	} else {
		Err(Error::NonFiniteResult { what: what(), value })
	}
}

/// Replaces an invalid value by `replacement`, recording why.
pub(crate) fn clamped(
	what: impl FnOnce() -> String,
	value: f64,
	replacement: f64,
	diagnostics: &mut Vec<Diagnostic>,
) -> f64 {
	if value.is_finite() && value >= 0.0 {
		return value;
	}
	diagnostics.push(Diagnostic::ClampedEstimate { what: what(), value, replacement }.report());
	replacement
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_checked_rejects_nan_infinite_and_negative() {
		assert!(checked(|| "p".into(), 0.25).is_ok());
		assert!(checked(|| "p".into(), 0.0).is_ok());
		for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -0.1] {
			match checked(|| "p".into(), bad) {
				Err(Error::NonFiniteResult { what, .. }) => assert_eq!(what, "p"),
				other => panic!("expected NonFiniteResult, got {:?}", other),
			}
		}
	}

	#[test]
	fn test_clamped_records_diagnostic() {
		let mut diagnostics = Vec::new();
		assert_eq!(clamped(|| "w".into(), 0.5, 0.0, &mut diagnostics), 0.5);
		assert!(diagnostics.is_empty());

		assert_eq!(clamped(|| "w".into(), -2.0, 0.0, &mut diagnostics), 0.0);
		assert_eq!(diagnostics.len(), 1);
		assert_eq!(diagnostics[0].severity(), Level::Warn);
	}
}
