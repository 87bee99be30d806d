use std::borrow::Cow;

use crate::constants::{START, UNKNOWN};
use crate::error::{checked, Diagnostic, Error};
use super::config::InterpolatedConfig;
use super::counter::Counter;
use super::counter_map::CounterMap;
use super::counts::{NGramCounts, PairContext};
use super::language_model::{previous_two, LanguageModel};
use super::tuning::select_by_perplexity;

/// Trigram model mixing trigram, bigram and unigram counts with fixed weights.
///
/// `P(w|pp, p) = λ1·tri + λ2·bi + (1 - λ1 - λ2)·uni`, the unigram count
/// falling back to `count(UNKNOWN)`. Like stupid backoff, raw counts are
/// blended by default and nothing is renormalized.
#[derive(Clone, Debug)]
pub struct InterpolatedModel {
	config: InterpolatedConfig,
	words: Counter<String>,
	bigrams: CounterMap<String, String>,
	trigrams: CounterMap<PairContext, String>,

	// Relative frequencies walked by the sampler, highest order first
	trigram_transitions: CounterMap<PairContext, String>,
	bigram_transitions: CounterMap<String, String>,
	unigrams: Counter<String>,

	diagnostics: Vec<Diagnostic>,
}

impl InterpolatedModel {
	/// Trains the model on `training`.
	///
	/// # Errors
	/// Returns an error if the configuration is invalid or `training` is empty.
	pub fn new<S: AsRef<str>>(training: &[Vec<S>], config: InterpolatedConfig) -> Result<Self, Error> {
		config.validate()?;
		if training.is_empty() {
			return Err(Error::EmptyCorpus);
		}

		let counts = NGramCounts::trigram(training);
		let mut words = counts.words;
		let mut bigrams = counts.bigrams;
		let mut trigrams = counts.trigrams;
		words.increment(UNKNOWN.to_owned(), 1.0);

		let mut trigram_transitions = trigrams.clone();
		trigram_transitions.normalize();
		let mut bigram_transitions = bigrams.clone();
		bigram_transitions.normalize();
		let mut unigrams = words.clone();
		unigrams.set_count(START.to_owned(), 0.0);
		unigrams.normalize();

		let mut diagnostics = config.scaling.apply_to_counter(&mut words);
		diagnostics.extend(config.scaling.apply_to_map(&mut bigrams));
		diagnostics.extend(config.scaling.apply_to_map(&mut trigrams));

		log::debug!(
			"interpolated model trained: {} word types, {} trigram types",
			words.size(),
			trigrams.total_mod_count()
		);

		Ok(Self {
			config,
			words,
			bigrams,
			trigrams,
			trigram_transitions,
			bigram_transitions,
			unigrams,
			diagnostics,
		})
	}

	/// Trains one model per candidate and keeps the one with the lowest
	/// perplexity on `validation`.
	pub fn with_validation<S: AsRef<str>>(
		training: &[Vec<S>],
		validation: &[Vec<String>],
		candidates: &[InterpolatedConfig],
	) -> Result<Self, Error> {
		select_by_perplexity(candidates, validation, |config| Self::new(training, *config))
			.map(|selection| selection.model)
	}

	pub fn config(&self) -> &InterpolatedConfig {
		&self.config
	}

	pub fn unigram_count(&self, word: &str) -> f64 {
		self.words.get_count(&word.to_owned())
	}

	/// Blended score of `word` after `(pre_previous, previous)`.
	pub fn trigram_probability(&self, pre_previous: &str, previous: &str, word: &str) -> f64 {
		let word_key = word.to_owned();
		let trigram = self
			.trigrams
			.get_count(&(pre_previous.to_owned(), previous.to_owned()), &word_key);
		let bigram = self.bigrams.get_count(&previous.to_owned(), &word_key);
		let mut unigram = self.words.get_count(&word_key);
		if unigram == 0.0 {
			unigram = self.unigram_count(UNKNOWN);
		}
		if trigram == 0.0 && bigram == 0.0 {
			log::trace!("unseen sequence <{}, {}, {}>", pre_previous, previous, word);
		}

		let InterpolatedConfig { lambda1, lambda2, .. } = self.config;
		lambda1 * trigram + lambda2 * bigram + (1.0 - lambda1 - lambda2) * unigram
	}
}

impl LanguageModel for InterpolatedModel {
	fn order(&self) -> usize {
		3
	}

	fn word_probability(&self, history: &[String], word: &str) -> Result<f64, Error> {
		let (pre_previous, previous) = previous_two(history);
		checked(
			|| format!("interpolated P({}|{}, {})", word, pre_previous, previous),
			self.trigram_probability(pre_previous, previous, word),
		)
	}

	fn next_word_distribution(&self, history: &[String]) -> Cow<'_, Counter<String>> {
		let (pre_previous, previous) = previous_two(history);
		let context = (pre_previous.to_owned(), previous.to_owned());
		if self.trigram_transitions.contains_context(&context) {
			return Cow::Borrowed(self.trigram_transitions.get_counter(&context));
		}
		let previous = context.1;
		if self.bigram_transitions.contains_context(&previous) {
			return Cow::Borrowed(self.bigram_transitions.get_counter(&previous));
		}
		Cow::Borrowed(&self.unigrams)
	}

	fn diagnostics(&self) -> &[Diagnostic] {
		&self.diagnostics
	}
}
