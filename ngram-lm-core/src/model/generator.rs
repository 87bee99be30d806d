use rand::Rng;

use crate::constants::{START, STOP, UNKNOWN};
use crate::error::Error;
use super::config::GenerationConfig;
use super::counter::Counter;
use super::language_model::LanguageModel;

/// Samples sentences from any [`LanguageModel`].
///
/// # Responsibilities
/// - Keep the sliding history of the last `order - 1` tokens
/// - Draw each word from the model's next-word distribution
/// - Stop at `STOP`, or fail once `max_length` tokens were drawn
///
/// The generator holds no state between calls; randomness comes from the
/// thread-local generator or from the `Rng` passed to [`Generator::generate_with`].
pub struct Generator<'a, M: LanguageModel + ?Sized> {
	model: &'a M,
	config: GenerationConfig,
}

impl<'a, M: LanguageModel + ?Sized> Generator<'a, M> {
	/// Creates a generator over `model`.
	///
	/// # Errors
	/// Returns an error if the configuration is invalid.
	pub fn new(model: &'a M, config: GenerationConfig) -> Result<Self, Error> {
		config.validate()?;
		Ok(Self { model, config })
	}

	/// Samples a sentence with the thread-local random generator.
	pub fn generate(&self) -> Result<Vec<String>, Error> {
		self.generate_with(&mut rand::rng())
	}

	/// Samples a sentence using `rng`.
	///
	/// The returned words exclude the boundary markers. A word drawn from
	/// a distribution that does not cover the sample is `UNKNOWN`.
	///
	/// # Errors
	/// Returns `IncompleteSampling` if `STOP` is not drawn within
	/// `max_length` tokens.
	pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<String>, Error> {
		let mut history = vec![START.to_owned(); self.model.order() - 1];
		let mut sentence = Vec::new();

		for _ in 0..self.config.max_length {
			let distribution = self.model.next_word_distribution(&history);
			let word = sample(&distribution, rng);
			if word == STOP {
				return Ok(sentence);
			}

			// Slide the history window by one token
			history.remove(0);
			history.push(word.clone());
			sentence.push(word);
		}

		log::warn!("generation stopped after {} tokens: {:?}", self.config.max_length, sentence);
		Err(Error::IncompleteSampling { max_length: self.config.max_length })
	}
}

/// Walks `distribution` in key order and returns the first word whose
/// cumulative mass exceeds a uniform draw in `[0, 1)`.
///
/// Returns `UNKNOWN` when the mass never exceeds the draw.
pub fn sample<R: Rng + ?Sized>(distribution: &Counter<String>, rng: &mut R) -> String {
	let draw: f64 = rng.random();
	let mut cumulative = 0.0;
	for (word, mass) in distribution {
		cumulative += mass;
		if cumulative > draw {
			return word.clone();
		}
	}
	UNKNOWN.to_owned()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::borrow::Cow;
	use rand::SeedableRng;
	use rand::rngs::StdRng;
	use crate::error::Diagnostic;

	/// Model that always predicts the same distribution.
	struct Fixed {
		distribution: Counter<String>,
	}

	impl Fixed {
		fn new(pairs: &[(&str, f64)]) -> Self {
			Self { distribution: pairs.iter().map(|(w, p)| (w.to_string(), *p)).collect() }
		}
	}

	impl LanguageModel for Fixed {
		fn order(&self) -> usize {
			2
		}

		fn word_probability(&self, _history: &[String], word: &str) -> Result<f64, Error> {
			Ok(self.distribution.get_count(&word.to_owned()))
		}

		fn next_word_distribution(&self, _history: &[String]) -> Cow<'_, Counter<String>> {
			Cow::Borrowed(&self.distribution)
		}

		fn diagnostics(&self) -> &[Diagnostic] {
			&[]
		}
	}

	#[test]
	fn test_sample_certain_word() {
		let mut rng = StdRng::seed_from_u64(3);
		let distribution: Counter<String> = [("a".to_string(), 1.0)].into_iter().collect();
		for _ in 0..20 {
			assert_eq!(sample(&distribution, &mut rng), "a");
		}
	}

	#[test]
	fn test_sample_empty_distribution_is_unknown() {
		let mut rng = StdRng::seed_from_u64(3);
		assert_eq!(sample(&Counter::new(), &mut rng), UNKNOWN);
	}

	#[test]
	fn test_sample_missing_mass_is_unknown() {
		let mut rng = StdRng::seed_from_u64(11);
		let distribution: Counter<String> = [("a".to_string(), 0.5)].into_iter().collect();
		let draws: Vec<String> = (0..200).map(|_| sample(&distribution, &mut rng)).collect();
		assert!(draws.iter().any(|w| w == "a"));
		assert!(draws.iter().any(|w| w == UNKNOWN));
	}

	#[test]
	fn test_generation_stops_at_stop() {
		let model = Fixed::new(&[(STOP, 1.0)]);
		let generator = Generator::new(&model, GenerationConfig::default()).unwrap();
		assert_eq!(generator.generate().unwrap(), Vec::<String>::new());
	}

	#[test]
	fn test_generation_without_stop_hits_bound() {
		let model = Fixed::new(&[("a", 1.0)]);
		let generator = Generator::new(&model, GenerationConfig { max_length: 5 }).unwrap();
		match generator.generate_with(&mut StdRng::seed_from_u64(1)) {
			Err(Error::IncompleteSampling { max_length }) => assert_eq!(max_length, 5),
			other => panic!("expected IncompleteSampling, got {:?}", other),
		}
	}

	#[test]
	fn test_generator_rejects_zero_bound() {
		let model = Fixed::new(&[(STOP, 1.0)]);
		assert!(Generator::new(&model, GenerationConfig { max_length: 0 }).is_err());
	}

	#[test]
	fn test_generation_through_trait_object() {
		let model = Fixed::new(&[(STOP, 1.0)]);
		let model: &dyn LanguageModel = &model;
		assert!(model.generate_sentence().unwrap().is_empty());
	}
}
