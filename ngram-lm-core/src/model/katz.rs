use std::borrow::Cow;
use std::fmt::Debug;

use crate::constants::{BACKOFF_EPSILON, START, UNKNOWN};
use crate::error::{checked, clamped, Diagnostic, Error};
use super::config::{KatzConfig, KatzQuery};
use super::counter::Counter;
use super::counter_map::CounterMap;
use super::counts::{NGramCounts, PairContext};
use super::good_turing::GoodTuringTable;
use super::kneser_ney::{bigram_estimate, trigram_estimate, ContinuationTable};
use super::language_model::{previous, previous_two, LanguageModel};
use super::tuning::select_by_perplexity;

/// Backoff weight of a context:
/// `(1 - Σ seen discounted) / (1 - Σ lower order of the same words)`.
///
/// A vanishing denominator yields 0 (`DegenerateBackoff`); a negative or
/// non-finite ratio is clamped to 0.
pub(crate) fn backoff_weight(context: &str, seen: f64, lower_seen: f64, diagnostics: &mut Vec<Diagnostic>) -> f64 {
	let denominator = 1.0 - lower_seen;
	if denominator <= BACKOFF_EPSILON {
		diagnostics.push(Diagnostic::DegenerateBackoff { context: context.to_owned() }.report());
		return 0.0;
	}
	clamped(|| format!("backoff weight of {}", context), (1.0 - seen) / denominator, 0.0, diagnostics)
}

/// Good-Turing discounted unigram probabilities.
///
/// `UNKNOWN` receives `N(1)·normalizer/|V|`, the singleton mass spread over
/// the vocabulary.
fn unigram_probabilities(words: &Counter<String>, cutoff: usize, diagnostics: &mut Vec<Diagnostic>) -> Counter<String> {
	let table = GoodTuringTable::new(words.iter().map(|(_, count)| *count), cutoff, diagnostics);
	let normalizer = 1.0 / words.total();
	let mut probabilities = Counter::new();
	for (word, count) in words {
		probabilities.set_count(word.clone(), table.probability(*count, normalizer, diagnostics));
	}
	let unknown = table.bucket(1) as f64 * normalizer / words.size() as f64;
	probabilities.set_count(UNKNOWN.to_owned(), unknown);
	probabilities
}

/// `P(word)`, with `P(UNKNOWN)` for words never seen.
fn unigram_probability(unigrams: &Counter<String>, word: &str) -> f64 {
	match unigrams.get(&word.to_owned()) {
		Some(probability) if probability != 0.0 => probability,
		_ => unigrams.get_count(&UNKNOWN.to_owned()),
	}
}

/// Discounted probabilities and backoff weights of one n-gram order.
#[derive(Clone, Debug, PartialEq)]
struct KatzLayer<C: Ord> {
	probabilities: CounterMap<C, String>,
	backoffs: Counter<C>,
}

impl<C: Ord + Clone + Debug> KatzLayer<C> {
	/// Discounts `table` and derives the backoff weight of every context.
	///
	/// `lower` gives the lower-order probability of a word in a context.
	fn new<F>(table: &CounterMap<C, String>, cutoff: usize, lower: F, diagnostics: &mut Vec<Diagnostic>) -> Self
	where
		F: Fn(&C, &str) -> f64,
	{
		let counts = table.iter().flat_map(|(_, followers)| followers.iter().map(|(_, count)| *count));
		let good_turing = GoodTuringTable::new(counts, cutoff, diagnostics);

		let mut probabilities = CounterMap::new();
		let mut backoffs = Counter::new();
		for (context, followers) in table.iter() {
			let normalizer = 1.0 / followers.total();
			let mut seen = 0.0;
			let mut lower_seen = 0.0;
			for (word, count) in followers {
				let probability = good_turing.probability(*count, normalizer, diagnostics);
				probabilities.set_count(context.clone(), word.clone(), probability);
				seen += probability;
				lower_seen += lower(context, word);
			}
			let weight = backoff_weight(&format!("{:?}", context), seen, lower_seen, diagnostics);
			backoffs.set_count(context.clone(), weight);
		}

		Self { probabilities, backoffs }
	}

	/// Stored probability of an observed pair, else backoff × lower order.
	///
	/// Contexts never seen back off with weight 1.
	fn probability<F: FnOnce() -> f64>(&self, context: &C, word: &str, lower: F) -> f64 {
		if let Some(probability) = self.probabilities.get_counter(context).get(&word.to_owned()) {
			return probability;
		}
		lower() * self.backoff(context)
	}

	fn backoff(&self, context: &C) -> f64 {
		self.backoffs.get(context).unwrap_or(1.0)
	}
}

/// Unigram distribution used to sample after an unknown context.
fn sampling_unigrams(unigrams: &Counter<String>) -> Counter<String> {
	let mut sampling = unigrams.clone();
	sampling.set_count(START.to_owned(), 0.0);
	sampling
}

/// Katz backoff bigram model over Good-Turing discounted counts.
///
/// # Responsibilities
/// - Discount unigrams and bigrams with Good-Turing below the cutoff
/// - Reserve singleton mass for `UNKNOWN`
/// - Weight the unigram fallback of each context so its mass is preserved
/// - Optionally score with Kneser-Ney over the same counts
#[derive(Clone, Debug)]
pub struct KatzBigramModel {
	config: KatzConfig,
	counts: NGramCounts,
	continuation: ContinuationTable,
	unigrams: Counter<String>,
	bigram: KatzLayer<String>,
	sampling_unigrams: Counter<String>,
	diagnostics: Vec<Diagnostic>,
}

impl KatzBigramModel {
	/// Trains the model on `training`.
	///
	/// # Errors
	/// Returns an error if the configuration is invalid or `training` is empty.
	pub fn new<S: AsRef<str>>(training: &[Vec<S>], config: KatzConfig) -> Result<Self, Error> {
		config.validate()?;
		if training.is_empty() {
			return Err(Error::EmptyCorpus);
		}

		let counts = NGramCounts::bigram(training);
		let continuation = ContinuationTable::new(&counts);
		let mut diagnostics = Vec::new();
		let unigrams = unigram_probabilities(&counts.words, config.cutoff, &mut diagnostics);
		let bigram = KatzLayer::new(
			&counts.bigrams,
			config.cutoff,
			|_, word| unigram_probability(&unigrams, word),
			&mut diagnostics,
		);
		let sampling_unigrams = sampling_unigrams(&unigrams);

		log::debug!(
			"Katz bigram trained: {} contexts, {} diagnostics",
			bigram.backoffs.size(),
			diagnostics.len()
		);

		Ok(Self { config, counts, continuation, unigrams, bigram, sampling_unigrams, diagnostics })
	}

	/// Trains one model per candidate and keeps the one with the lowest
	/// perplexity on `validation`.
	pub fn with_validation<S: AsRef<str>>(
		training: &[Vec<S>],
		validation: &[Vec<String>],
		candidates: &[KatzConfig],
	) -> Result<Self, Error> {
		select_by_perplexity(candidates, validation, |config| Self::new(training, *config))
			.map(|selection| selection.model)
	}

	pub fn config(&self) -> &KatzConfig {
		&self.config
	}

	/// Discounted unigram probability, `P(UNKNOWN)` for unknown words.
	pub fn unigram_probability(&self, word: &str) -> f64 {
		unigram_probability(&self.unigrams, word)
	}

	/// Backoff weight of `previous`, 1 for contexts never seen.
	pub fn backoff(&self, previous: &str) -> f64 {
		self.bigram.backoff(&previous.to_owned())
	}

	/// Discounted probabilities of every observed bigram.
	pub fn bigram_probabilities(&self) -> &CounterMap<String, String> {
		&self.bigram.probabilities
	}

	/// Katz estimate of `word` after `previous`.
	pub fn bigram_probability(&self, previous: &str, word: &str) -> f64 {
		self.bigram
			.probability(&previous.to_owned(), word, || self.unigram_probability(word))
	}

	/// Kneser-Ney estimate over the same counts.
	pub fn kneser_ney_probability(&self, previous: &str, word: &str) -> Result<f64, Error> {
		bigram_estimate(&self.counts, &self.continuation, self.config.discount, previous, word)
	}
}

impl LanguageModel for KatzBigramModel {
	fn order(&self) -> usize {
		2
	}

	fn word_probability(&self, history: &[String], word: &str) -> Result<f64, Error> {
		let previous = previous(history);
		let probability = match self.config.query {
			KatzQuery::Backoff => self.bigram_probability(previous, word),
			KatzQuery::KneserNey => self.kneser_ney_probability(previous, word)?,
		};
		checked(|| format!("Katz P({}|{})", word, previous), probability)
	}

	fn next_word_distribution(&self, history: &[String]) -> Cow<'_, Counter<String>> {
		let previous = previous(history).to_owned();
		if self.bigram.probabilities.contains_context(&previous) {
			Cow::Borrowed(self.bigram.probabilities.get_counter(&previous))
		} else {
			Cow::Borrowed(&self.sampling_unigrams)
		}
	}

	fn diagnostics(&self) -> &[Diagnostic] {
		&self.diagnostics
	}
}

/// Katz backoff trigram model: a discounted trigram layer backing off to
/// the Katz bigram layer, which backs off to discounted unigrams.
#[derive(Clone, Debug)]
pub struct KatzTrigramModel {
	config: KatzConfig,
	counts: NGramCounts,
	continuation: ContinuationTable,
	unigrams: Counter<String>,
	bigram: KatzLayer<String>,
	trigram: KatzLayer<PairContext>,
	sampling_unigrams: Counter<String>,
	diagnostics: Vec<Diagnostic>,
}

impl KatzTrigramModel {
	/// Trains the model on `training`.
	///
	/// # Errors
	/// Returns an error if the configuration is invalid or `training` is empty.
	pub fn new<S: AsRef<str>>(training: &[Vec<S>], config: KatzConfig) -> Result<Self, Error> {
		config.validate()?;
		if training.is_empty() {
			return Err(Error::EmptyCorpus);
		}

		let counts = NGramCounts::trigram(training);
		let continuation = ContinuationTable::new(&counts);
		let mut diagnostics = Vec::new();
		let unigrams = unigram_probabilities(&counts.words, config.cutoff, &mut diagnostics);
		let bigram = KatzLayer::new(
			&counts.bigrams,
			config.cutoff,
			|_, word| unigram_probability(&unigrams, word),
			&mut diagnostics,
		);
		let trigram = KatzLayer::new(
			&counts.trigrams,
			config.cutoff,
			|(_, previous), word| {
				bigram.probability(previous, word, || unigram_probability(&unigrams, word))
			},
			&mut diagnostics,
		);
		let sampling_unigrams = sampling_unigrams(&unigrams);

		log::debug!(
			"Katz trigram trained: {} contexts, {} diagnostics",
			trigram.backoffs.size(),
			diagnostics.len()
		);

		Ok(Self { config, counts, continuation, unigrams, bigram, trigram, sampling_unigrams, diagnostics })
	}

	/// Trains one model per candidate and keeps the one with the lowest
	/// perplexity on `validation`.
	pub fn with_validation<S: AsRef<str>>(
		training: &[Vec<S>],
		validation: &[Vec<String>],
		candidates: &[KatzConfig],
	) -> Result<Self, Error> {
		select_by_perplexity(candidates, validation, |config| Self::new(training, *config))
			.map(|selection| selection.model)
	}

	pub fn config(&self) -> &KatzConfig {
		&self.config
	}

	pub fn unigram_probability(&self, word: &str) -> f64 {
		unigram_probability(&self.unigrams, word)
	}

	/// Backoff weight of the `(pre_previous, previous)` context.
	pub fn backoff(&self, pre_previous: &str, previous: &str) -> f64 {
		self.trigram.backoff(&(pre_previous.to_owned(), previous.to_owned()))
	}

	pub fn trigram_probabilities(&self) -> &CounterMap<PairContext, String> {
		&self.trigram.probabilities
	}

	pub fn bigram_probability(&self, previous: &str, word: &str) -> f64 {
		self.bigram
			.probability(&previous.to_owned(), word, || self.unigram_probability(word))
	}

	/// Katz estimate of `word` after `(pre_previous, previous)`.
	pub fn trigram_probability(&self, pre_previous: &str, previous: &str, word: &str) -> f64 {
		let context = (pre_previous.to_owned(), previous.to_owned());
		self.trigram
			.probability(&context, word, || self.bigram_probability(previous, word))
	}

	/// Kneser-Ney estimate over the same counts, bigram level for contexts
	/// never seen.
	pub fn kneser_ney_probability(&self, pre_previous: &str, previous: &str, word: &str) -> Result<f64, Error> {
		let discount = self.config.discount;
		match trigram_estimate(&self.counts, &self.continuation, discount, pre_previous, previous, word) {
			Err(Error::UndefinedEstimate { what }) => {
				log::trace!("{}, using the bigram estimate", what);
				bigram_estimate(&self.counts, &self.continuation, discount, previous, word)
			}
			result => result,
		}
	}
}

impl LanguageModel for KatzTrigramModel {
	fn order(&self) -> usize {
		3
	}

	fn word_probability(&self, history: &[String], word: &str) -> Result<f64, Error> {
		let (pre_previous, previous) = previous_two(history);
		let probability = match self.config.query {
			KatzQuery::Backoff => self.trigram_probability(pre_previous, previous, word),
			KatzQuery::KneserNey => self.kneser_ney_probability(pre_previous, previous, word)?,
		};
		checked(|| format!("Katz P({}|{}, {})", word, pre_previous, previous), probability)
	}

	fn next_word_distribution(&self, history: &[String]) -> Cow<'_, Counter<String>> {
		let (pre_previous, previous) = previous_two(history);
		let context = (pre_previous.to_owned(), previous.to_owned());
		if self.trigram.probabilities.contains_context(&context) {
			return Cow::Borrowed(self.trigram.probabilities.get_counter(&context));
		}
		let previous = context.1;
		if self.bigram.probabilities.contains_context(&previous) {
			return Cow::Borrowed(self.bigram.probabilities.get_counter(&previous));
		}
		Cow::Borrowed(&self.sampling_unigrams)
	}

	fn diagnostics(&self) -> &[Diagnostic] {
		&self.diagnostics
	}
}
