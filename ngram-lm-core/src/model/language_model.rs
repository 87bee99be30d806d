use std::borrow::Cow;

use crate::error::{checked, Diagnostic, Error};
use super::config::GenerationConfig;
use super::counter::Counter;
use super::counts::pad_sentence;
use super::generator::Generator;

/// Contract shared by every estimator.
///
/// A model is trained once at construction and read-only afterwards, so
/// trained models can be shared across threads without locking.
///
/// # Provided methods
/// - `sentence_probability`: product of `word_probability` over the padded sentence
/// - `generate_sentence`: sampling with the default [`GenerationConfig`]
pub trait LanguageModel {
	/// Number of tokens in the model's n-grams (2 or 3).
	fn order(&self) -> usize;

	/// Probability of `word` after `history`.
	///
	/// `history` holds at least the last `order - 1` tokens (padding
	/// included); only its tail is read. Unknown words never fail the query.
	fn word_probability(&self, history: &[String], word: &str) -> Result<f64, Error>;

	/// Distribution walked by the sampler to pick the word after `history`.
	///
	/// It may sum to less than 1; the missing mass produces `UNKNOWN`.
	fn next_word_distribution(&self, history: &[String]) -> Cow<'_, Counter<String>>;

	/// Recoverable conditions met while smoothing.
	fn diagnostics(&self) -> &[Diagnostic];

	/// Probability of the boundary-padded sentence.
	///
	/// A product above 1 is logged as a smoothing defect, not rejected.
	fn sentence_probability(&self, sentence: &[String]) -> Result<f64, Error> {
		let padded = pad_sentence(sentence, self.order());
		let history = self.order() - 1;
		let mut probability = 1.0;
		for i in history..padded.len() {
			probability *= self.word_probability(&padded[i - history..i], &padded[i])?;
		}

		if probability > 1.0 {
			log::warn!("sentence probability {} > 1 for {:?}", probability, sentence);
		} else if probability == 0.0 {
			log::debug!("zero probability for {:?}", sentence);
		}
		checked(|| format!("sentence probability of {:?}", sentence), probability)
	}

	/// Samples one sentence, boundary markers excluded.
	fn generate_sentence(&self) -> Result<Vec<String>, Error> {
		Generator::new(self, GenerationConfig::default())?.generate()
	}
}

/// Last token of `history`, `START` if it is empty.
pub(crate) fn previous(history: &[String]) -> &str {
	history.last().map_or(crate::START, String::as_str)
}

/// Last two tokens of `history`, padded with `START` on the left.
pub(crate) fn previous_two(history: &[String]) -> (&str, &str) {
	match history {
		[.., pre_previous, previous] => (pre_previous.as_str(), previous.as_str()),
		[previous] => (crate::START, previous.as_str()),
		[] => (crate::START, crate::START),
	}
}
