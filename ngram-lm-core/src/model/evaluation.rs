use crate::error::Error;
use super::counts::pad_sentence;
use super::language_model::LanguageModel;

/// Perplexity of `model` over `sentences`.
///
/// Every word of a sentence plus its `STOP` counts as one predicted token.
/// Token log-probabilities are summed, so long sentences neither underflow
/// nor overflow. A token with zero probability makes the perplexity infinite.
///
/// # Errors
/// Returns an error if `sentences` is empty or a probability is invalid.
pub fn perplexity<M: LanguageModel + ?Sized>(model: &M, sentences: &[Vec<String>]) -> Result<f64, Error> {
	if sentences.is_empty() {
		return Err(Error::EmptyCorpus);
	}

	let history = model.order() - 1;
	let mut log_probability = 0.0;
	let mut tokens = 0usize;
	for sentence in sentences {
		let padded = pad_sentence(sentence, model.order());
		for i in history..padded.len() {
			let probability = model.word_probability(&padded[i - history..i], &padded[i])?;
			if probability == 0.0 {
				log::debug!("zero probability for {} in {:?}", padded[i], sentence);
				return Ok(f64::INFINITY);
			}
			log_probability += probability.ln();
			tokens += 1;
		}
	}

	Ok((-log_probability / tokens as f64).exp())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::borrow::Cow;
	use crate::error::Diagnostic;
	use crate::model::counter::Counter;

	/// Model giving every word the same probability.
	struct Uniform(f64);

	impl LanguageModel for Uniform {
		fn order(&self) -> usize {
			2
		}

		fn word_probability(&self, _history: &[String], _word: &str) -> Result<f64, Error> {
			Ok(self.0)
		}

		fn next_word_distribution(&self, _history: &[String]) -> Cow<'_, Counter<String>> {
			Cow::Owned(Counter::new())
		}

		fn diagnostics(&self) -> &[Diagnostic] {
			&[]
		}
	}

	fn long_sentence(length: usize) -> Vec<String> {
		(0..length).map(|i| format!("w{}", i % 7)).collect()
	}

	#[test]
	fn test_uniform_model_perplexity() {
		let sentences = vec![long_sentence(3)];
		let score = perplexity(&Uniform(0.25), &sentences).unwrap();
		assert!((score - 4.0).abs() < 1e-9, "perplexity = {}", score);
	}

	#[test]
	fn test_long_sentence_does_not_underflow() {
		// 0.1^1001 is 0 as a product of f64 values
		let model = Uniform(0.1);
		let sentences = vec![long_sentence(1000)];
		assert_eq!(model.sentence_probability(&sentences[0]).unwrap(), 0.0);
		let score = perplexity(&model, &sentences).unwrap();
		assert!((score - 10.0).abs() < 1e-6, "perplexity = {}", score);
	}

	#[test]
	fn test_long_sentence_does_not_overflow() {
		// Blended raw counts above 1 overflow as a product
		let model = Uniform(3.0);
		let sentences = vec![long_sentence(1000)];
		assert!(model.sentence_probability(&sentences[0]).is_err());
		let score = perplexity(&model, &sentences).unwrap();
		assert!((score - 1.0 / 3.0).abs() < 1e-9, "perplexity = {}", score);
	}

	#[test]
	fn test_zero_probability_token_is_infinite() {
		let sentences = vec![long_sentence(2)];
		assert_eq!(perplexity(&Uniform(0.0), &sentences).unwrap(), f64::INFINITY);
	}
}
