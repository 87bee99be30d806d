use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Diagnostic, Error};
use super::counter::Counter;
use super::counter_map::CounterMap;

/// How the blending models pre-scale their count tables after training.
///
/// # Variants
/// - `Raw`: blend raw counts (the classic, unnormalized formulation)
/// - `Relative`: divide each table (per context) by its total
/// - `GoodTuring { cutoff }`: Good-Turing discount counts up to `cutoff`,
///   then divide by the total
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum CountScaling {
	Raw,
	Relative,
	GoodTuring { cutoff: usize },
}

impl CountScaling {
	pub(crate) fn apply_to_counter(&self, counter: &mut Counter<String>) -> Vec<Diagnostic> {
		match self {
			CountScaling::Raw => Vec::new(),
			CountScaling::Relative => {
				counter.normalize();
				Vec::new()
			}
			CountScaling::GoodTuring { cutoff } => counter.good_turing_normalize(*cutoff),
		}
	}

	pub(crate) fn apply_to_map<C: Ord + Clone>(&self, table: &mut CounterMap<C, String>) -> Vec<Diagnostic> {
		match self {
			CountScaling::Raw => Vec::new(),
			CountScaling::Relative => {
				table.normalize();
				Vec::new()
			}
			CountScaling::GoodTuring { cutoff } => table.good_turing_normalize(*cutoff),
		}
	}

	fn validate(&self) -> Result<(), Error> {
		match self {
			CountScaling::GoodTuring { cutoff } => check_cutoff(*cutoff),
			_ => Ok(()),
		}
	}
}

/// Hyperparameters of the stupid backoff bigram model.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct StupidBackoffConfig {
	/// Weight of the bigram count; the unigram count gets `1 - lambda`.
	pub lambda: f64,

	pub scaling: CountScaling,
}

impl Default for StupidBackoffConfig {
	fn default() -> Self {
		Self { lambda: DEFAULT_STUPID_BACKOFF_LAMBDA, scaling: CountScaling::Raw }
	}
}

impl StupidBackoffConfig {
	pub fn validate(&self) -> Result<(), Error> {
		check_weight("lambda", self.lambda)?;
		self.scaling.validate()
	}
}

/// Hyperparameters of the interpolated trigram model.
///
/// The unigram weight is `1 - lambda1 - lambda2`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct InterpolatedConfig {
	pub lambda1: f64,
	pub lambda2: f64,
	pub scaling: CountScaling,
}

impl Default for InterpolatedConfig {
	fn default() -> Self {
		Self {
			lambda1: DEFAULT_INTERPOLATION_LAMBDA1,
			lambda2: DEFAULT_INTERPOLATION_LAMBDA2,
			scaling: CountScaling::Raw,
		}
	}
}

impl InterpolatedConfig {
	pub fn validate(&self) -> Result<(), Error> {
		check_weight("lambda1", self.lambda1)?;
		check_weight("lambda2", self.lambda2)?;
		if self.lambda1 + self.lambda2 > 1.0 {
			return Err(Error::InvalidConfig(format!(
				"lambda1 + lambda2 must be <= 1.0, got {}",
				self.lambda1 + self.lambda2
			)));
		}
		self.scaling.validate()
	}
}

/// Query path used by the Katz models to score sentences.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum KatzQuery {
	/// Discounted probability, or backoff weight × lower order.
	Backoff,
	/// Kneser-Ney estimate over the same counts.
	KneserNey,
}

/// Hyperparameters of the Katz (Good-Turing) models.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct KatzConfig {
	/// Counts above the cutoff are not discounted.
	pub cutoff: usize,

	pub query: KatzQuery,

	/// Discount of the Kneser-Ney query path.
	pub discount: f64,
}

impl Default for KatzConfig {
	fn default() -> Self {
		Self {
			cutoff: DEFAULT_GOOD_TURING_CUTOFF,
			query: KatzQuery::Backoff,
			discount: DEFAULT_KATZ_KNESER_NEY_DISCOUNT,
		}
	}
}

impl KatzConfig {
	pub fn validate(&self) -> Result<(), Error> {
		check_cutoff(self.cutoff)?;
		check_discount(self.discount)
	}
}

/// Hyperparameters of the Kneser-Ney models.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct KneserNeyConfig {
	/// Absolute discount subtracted from every observed count.
	pub discount: f64,
}

impl KneserNeyConfig {
	pub fn bigram() -> Self {
		Self { discount: DEFAULT_KNESER_NEY_BIGRAM_DISCOUNT }
	}

	pub fn trigram() -> Self {
		Self { discount: DEFAULT_KNESER_NEY_TRIGRAM_DISCOUNT }
	}

	pub fn validate(&self) -> Result<(), Error> {
		check_discount(self.discount)
	}
}

/// Sentence generation settings.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GenerationConfig {
	/// Tokens sampled before giving up on reaching `STOP`.
	pub max_length: usize,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self { max_length: DEFAULT_MAX_SENTENCE_LENGTH }
	}
}

impl GenerationConfig {
	pub fn validate(&self) -> Result<(), Error> {
		if self.max_length == 0 {
			return Err(Error::InvalidConfig("max_length must be >= 1".to_owned()));
		}
		Ok(())
	}
}

fn check_weight(name: &str, value: f64) -> Result<(), Error> {
	if !(0.0..=1.0).contains(&value) {
		return Err(Error::InvalidConfig(format!("{} must be between 0.0 and 1.0, got {}", name, value)));
	}
	Ok(())
}

fn check_cutoff(cutoff: usize) -> Result<(), Error> {
	if !(1..=MAX_GOOD_TURING_CUTOFF).contains(&cutoff) {
		return Err(Error::InvalidConfig(format!(
			"Good-Turing cutoff must be between 1 and {}, got {}",
			MAX_GOOD_TURING_CUTOFF, cutoff
		)));
	}
	Ok(())
}

fn check_discount(discount: f64) -> Result<(), Error> {
	if !discount.is_finite() || discount <= 0.0 {
		return Err(Error::InvalidConfig(format!("discount must be > 0, got {}", discount)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_are_valid() {
		assert!(StupidBackoffConfig::default().validate().is_ok());
		assert!(InterpolatedConfig::default().validate().is_ok());
		assert!(KatzConfig::default().validate().is_ok());
		assert!(KneserNeyConfig::bigram().validate().is_ok());
		assert!(KneserNeyConfig::trigram().validate().is_ok());
		assert!(GenerationConfig::default().validate().is_ok());
	}

	#[test]
	fn test_out_of_range_values_are_rejected() {
		let config = StupidBackoffConfig { lambda: 1.5, ..Default::default() };
		assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

		let config = InterpolatedConfig { lambda1: 0.7, lambda2: 0.5, ..Default::default() };
		assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

		let config = KatzConfig { cutoff: 0, ..Default::default() };
		assert!(config.validate().is_err());

		assert!(KneserNeyConfig { discount: 0.0 }.validate().is_err());
		assert!(KneserNeyConfig { discount: f64::NAN }.validate().is_err());
		assert!(GenerationConfig { max_length: 0 }.validate().is_err());

		let config = StupidBackoffConfig { scaling: CountScaling::GoodTuring { cutoff: 0 }, ..Default::default() };
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_oversized_cutoff_is_rejected() {
		for cutoff in [MAX_GOOD_TURING_CUTOFF + 1, usize::MAX] {
			let config = KatzConfig { cutoff, ..Default::default() };
			assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

			let config = InterpolatedConfig { scaling: CountScaling::GoodTuring { cutoff }, ..Default::default() };
			assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
		}
		assert!(KatzConfig { cutoff: MAX_GOOD_TURING_CUTOFF, ..Default::default() }.validate().is_ok());
	}

	#[test]
	fn test_oversized_cutoff_from_json_is_rejected() {
		let json = format!(r#"{{ "cutoff": {}, "query": "Backoff", "discount": 1.0 }}"#, usize::MAX);
		let config: KatzConfig = serde_json::from_str(&json).unwrap();
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_config_from_json() {
		let config: StupidBackoffConfig =
			serde_json::from_str(r#"{ "lambda": 0.8, "scaling": { "GoodTuring": { "cutoff": 3 } } }"#).unwrap();
		assert_eq!(config.lambda, 0.8);
		assert_eq!(config.scaling, CountScaling::GoodTuring { cutoff: 3 });

		let config: KatzConfig =
			serde_json::from_str(r#"{ "cutoff": 4, "query": "KneserNey", "discount": 0.75 }"#).unwrap();
		assert_eq!(config.query, KatzQuery::KneserNey);
		assert!(config.validate().is_ok());
	}
}
