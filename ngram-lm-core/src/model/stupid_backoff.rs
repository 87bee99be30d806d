use std::borrow::Cow;

use crate::constants::{START, UNKNOWN};
use crate::error::{checked, Diagnostic, Error};
use super::config::StupidBackoffConfig;
use super::counter::Counter;
use super::counter_map::CounterMap;
use super::counts::NGramCounts;
use super::language_model::{previous, LanguageModel};
use super::tuning::select_by_perplexity;

/// Bigram model blending bigram and unigram counts with a fixed weight.
///
/// `P(w|p) = λ·count(p, w) + (1 - λ)·count(w)`, with `count(w)` replaced by
/// `count(UNKNOWN)` for words never seen. Counts are blended as they are
/// (raw by default), so the values do not form a normalized distribution
/// and sentence probabilities can exceed 1.
#[derive(Clone, Debug)]
pub struct StupidBackoffModel {
	config: StupidBackoffConfig,

	/// Unigram counts, one fictitious `UNKNOWN` included, after scaling.
	words: Counter<String>,

	/// Bigram counts after scaling.
	bigrams: CounterMap<String, String>,

	/// Relative bigram frequencies walked by the sampler.
	transitions: CounterMap<String, String>,

	/// Relative unigram frequencies for contexts never seen.
	unigrams: Counter<String>,

	diagnostics: Vec<Diagnostic>,
}

impl StupidBackoffModel {
	/// Trains the model on `training`.
	///
	/// # Errors
	/// Returns an error if the configuration is invalid or `training` is empty.
	pub fn new<S: AsRef<str>>(training: &[Vec<S>], config: StupidBackoffConfig) -> Result<Self, Error> {
		config.validate()?;
		if training.is_empty() {
			return Err(Error::EmptyCorpus);
		}

		let counts = NGramCounts::bigram(training);
		let mut words = counts.words;
		let mut bigrams = counts.bigrams;
		words.increment(UNKNOWN.to_owned(), 1.0);

		let mut transitions = bigrams.clone();
		transitions.normalize();
		let mut unigrams = words.clone();
		unigrams.set_count(START.to_owned(), 0.0);
		unigrams.normalize();

		let mut diagnostics = config.scaling.apply_to_counter(&mut words);
		diagnostics.extend(config.scaling.apply_to_map(&mut bigrams));

		log::debug!(
			"stupid backoff trained: {} word types, {} bigram types",
			words.size(),
			bigrams.total_mod_count()
		);

		Ok(Self { config, words, bigrams, transitions, unigrams, diagnostics })
	}

	/// Trains one model per candidate and keeps the one with the lowest
	/// perplexity on `validation`.
	pub fn with_validation<S: AsRef<str>>(
		training: &[Vec<S>],
		validation: &[Vec<String>],
		candidates: &[StupidBackoffConfig],
	) -> Result<Self, Error> {
		select_by_perplexity(candidates, validation, |config| Self::new(training, *config))
			.map(|selection| selection.model)
	}

	pub fn config(&self) -> &StupidBackoffConfig {
		&self.config
	}

	/// Scaled unigram count of `word`.
	pub fn unigram_count(&self, word: &str) -> f64 {
		self.words.get_count(&word.to_owned())
	}

	/// Scaled bigram count of `(previous, word)`.
	pub fn bigram_count(&self, previous: &str, word: &str) -> f64 {
		self.bigrams.get_count(&previous.to_owned(), &word.to_owned())
	}

	/// Blended score of `word` after `previous`.
	pub fn bigram_probability(&self, previous: &str, word: &str) -> f64 {
		let bigram = self.bigram_count(previous, word);
		let mut unigram = self.unigram_count(word);
		if unigram == 0.0 {
			unigram = self.unigram_count(UNKNOWN);
		}
		if bigram == 0.0 {
			log::trace!("unseen bigram <{}, {}>, unigram {}", previous, word, unigram);
		}
		self.config.lambda * bigram + (1.0 - self.config.lambda) * unigram
	}
}

impl LanguageModel for StupidBackoffModel {
	fn order(&self) -> usize {
		2
	}

	fn word_probability(&self, history: &[String], word: &str) -> Result<f64, Error> {
		let previous = previous(history);
		checked(
			|| format!("stupid backoff P({}|{})", word, previous),
			self.bigram_probability(previous, word),
		)
	}

	fn next_word_distribution(&self, history: &[String]) -> Cow<'_, Counter<String>> {
		let previous = previous(history).to_owned();
		if self.transitions.contains_context(&previous) {
			Cow::Borrowed(self.transitions.get_counter(&previous))
		} else {
			Cow::Borrowed(&self.unigrams)
		}
	}

	fn diagnostics(&self) -> &[Diagnostic] {
		&self.diagnostics
	}
}
