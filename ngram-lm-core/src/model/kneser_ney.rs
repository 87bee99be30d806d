use std::borrow::Cow;

use crate::error::{checked, Diagnostic, Error};
use super::config::KneserNeyConfig;
use super::counter::Counter;
use super::counts::NGramCounts;
use super::language_model::{previous, previous_two, LanguageModel};
use super::tuning::select_by_perplexity;

/// Cached continuation probabilities.
///
/// `P_cont(w) = |{p : count(p, w) > 0}| / |{(p, w) : count(p, w) > 0}|`,
/// the share of distinct bigram types that end in `w`. Computed once over
/// every word seen as a continuation, so the values sum to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct ContinuationTable {
	probabilities: Counter<String>,
}

impl ContinuationTable {
	pub fn new(counts: &NGramCounts) -> Self {
		let bigram_types = counts.bigrams.total_mod_count() as f64;
		let mut probabilities = Counter::new();
		if bigram_types > 0.0 {
			for (word, preceding) in counts.continuations.iter() {
				probabilities.set_count(word.clone(), preceding.mod_count() as f64 / bigram_types);
			}
		}
		Self { probabilities }
	}

	/// `P_cont(word)`, 0 for words never seen as a continuation.
	pub fn probability(&self, word: &str) -> f64 {
		self.probabilities.get_count(&word.to_owned())
	}

	pub fn distribution(&self) -> &Counter<String> {
		&self.probabilities
	}
}

/// Interpolated Kneser-Ney bigram estimate.
///
/// `max(c(p, w) - D, 0)/(1 + c(p)) + D·|types(p)|/(1 + c(p))·P_cont(w)`
///
/// # Errors
/// `UndefinedEstimate` if the denominator is not positive.
pub(crate) fn bigram_estimate(
	counts: &NGramCounts,
	continuation: &ContinuationTable,
	discount: f64,
	previous: &str,
	word: &str,
) -> Result<f64, Error> {
	let previous_key = previous.to_owned();
	let followers = counts.bigrams.get_counter(&previous_key);
	let denominator = 1.0 + counts.words.get_count(&previous_key);
	if denominator <= 0.0 {
		return Err(Error::UndefinedEstimate { what: format!("Kneser-Ney P({}|{})", word, previous) });
	}

	let discounted = (followers.get_count(&word.to_owned()) - discount).max(0.0) / denominator;
	let normalizing = discount * followers.mod_count() as f64 / denominator;
	Ok(discounted + normalizing * continuation.probability(word))
}

/// Kneser-Ney trigram estimate, backing off to [`bigram_estimate`].
///
/// `max(c(pp, p, w) - D, 0)/Σ c(pp, p, ·) + (D/c(pp, p))·|types(pp, p)|·P_KN(w|p)`
///
/// # Errors
/// `UndefinedEstimate` if the trigram context or the `(pp, p)` bigram was
/// never observed.
pub(crate) fn trigram_estimate(
	counts: &NGramCounts,
	continuation: &ContinuationTable,
	discount: f64,
	pre_previous: &str,
	previous: &str,
	word: &str,
) -> Result<f64, Error> {
	let context = (pre_previous.to_owned(), previous.to_owned());
	let followers = counts.trigrams.get_counter(&context);
	let context_total = followers.total();
	let context_count = counts.bigrams.get_count(&context.0, &context.1);
	if context_total <= 0.0 || context_count <= 0.0 {
		return Err(Error::UndefinedEstimate {
			what: format!("Kneser-Ney P({}|{}, {})", word, pre_previous, previous),
		});
	}

	let higher = (followers.get_count(&word.to_owned()) - discount).max(0.0) / context_total;
	let normalizing = discount / context_count * followers.mod_count() as f64;
	let lower = bigram_estimate(counts, continuation, discount, previous, word)?;
	Ok(higher + normalizing * lower)
}

/// Kneser-Ney distribution over the observed followers of `previous`, or
/// the continuation distribution for a context never seen.
fn bigram_distribution<'a>(
	counts: &NGramCounts,
	continuation: &'a ContinuationTable,
	discount: f64,
	previous: &str,
) -> Cow<'a, Counter<String>> {
	let followers = counts.bigrams.get_counter(&previous.to_owned());
	if followers.is_empty() {
		return Cow::Borrowed(continuation.distribution());
	}
	let distribution = followers
		.keys()
		.filter_map(|word| {
			bigram_estimate(counts, continuation, discount, previous, word)
				.ok()
				.map(|p| (word.clone(), p))
		})
		.collect();
	Cow::Owned(distribution)
}

/// Kneser-Ney bigram model.
#[derive(Clone, Debug)]
pub struct KneserNeyBigramModel {
	config: KneserNeyConfig,
	counts: NGramCounts,
	continuation: ContinuationTable,
}

impl KneserNeyBigramModel {
	/// Trains the model on `training`.
	///
	/// # Errors
	/// Returns an error if the configuration is invalid or `training` is empty.
	pub fn new<S: AsRef<str>>(training: &[Vec<S>], config: KneserNeyConfig) -> Result<Self, Error> {
		config.validate()?;
		if training.is_empty() {
			return Err(Error::EmptyCorpus);
		}
		let counts = NGramCounts::bigram(training);
		let continuation = ContinuationTable::new(&counts);
		log::debug!(
			"Kneser-Ney bigram trained: D = {}, {} bigram types",
			config.discount,
			counts.bigrams.total_mod_count()
		);
		Ok(Self { config, counts, continuation })
	}

	/// Trains one model per candidate discount and keeps the one with the
	/// lowest perplexity on `validation`.
	pub fn with_validation<S: AsRef<str>>(
		training: &[Vec<S>],
		validation: &[Vec<String>],
		candidates: &[KneserNeyConfig],
	) -> Result<Self, Error> {
		select_by_perplexity(candidates, validation, |config| Self::new(training, *config))
			.map(|selection| selection.model)
	}

	pub fn config(&self) -> &KneserNeyConfig {
		&self.config
	}

	pub fn continuation(&self) -> &ContinuationTable {
		&self.continuation
	}

	pub fn bigram_probability(&self, previous: &str, word: &str) -> Result<f64, Error> {
		bigram_estimate(&self.counts, &self.continuation, self.config.discount, previous, word)
	}
}

impl LanguageModel for KneserNeyBigramModel {
	fn order(&self) -> usize {
		2
	}

	fn word_probability(&self, history: &[String], word: &str) -> Result<f64, Error> {
		let previous = previous(history);
		checked(
			|| format!("Kneser-Ney P({}|{})", word, previous),
			self.bigram_probability(previous, word)?,
		)
	}

	fn next_word_distribution(&self, history: &[String]) -> Cow<'_, Counter<String>> {
		bigram_distribution(&self.counts, &self.continuation, self.config.discount, previous(history))
	}

	fn diagnostics(&self) -> &[Diagnostic] {
		&[]
	}
}

/// Kneser-Ney trigram model.
///
/// Contexts never seen at the trigram level are scored with the bigram
/// estimate alone.
#[derive(Clone, Debug)]
pub struct KneserNeyTrigramModel {
	config: KneserNeyConfig,
	counts: NGramCounts,
	continuation: ContinuationTable,
}

impl KneserNeyTrigramModel {
	/// Trains the model on `training`.
	///
	/// # Errors
	/// Returns an error if the configuration is invalid or `training` is empty.
	pub fn new<S: AsRef<str>>(training: &[Vec<S>], config: KneserNeyConfig) -> Result<Self, Error> {
		config.validate()?;
		if training.is_empty() {
			return Err(Error::EmptyCorpus);
		}
		let counts = NGramCounts::trigram(training);
		let continuation = ContinuationTable::new(&counts);
		log::debug!(
			"Kneser-Ney trigram trained: D = {}, {} trigram types",
			config.discount,
			counts.trigrams.total_mod_count()
		);
		Ok(Self { config, counts, continuation })
	}

	/// Trains one model per candidate discount and keeps the one with the
	/// lowest perplexity on `validation`.
	pub fn with_validation<S: AsRef<str>>(
		training: &[Vec<S>],
		validation: &[Vec<String>],
		candidates: &[KneserNeyConfig],
	) -> Result<Self, Error> {
		select_by_perplexity(candidates, validation, |config| Self::new(training, *config))
			.map(|selection| selection.model)
	}

	pub fn config(&self) -> &KneserNeyConfig {
		&self.config
	}

	pub fn continuation(&self) -> &ContinuationTable {
		&self.continuation
	}

	/// Full trigram estimate; fails on contexts never seen.
	pub fn trigram_probability(&self, pre_previous: &str, previous: &str, word: &str) -> Result<f64, Error> {
		trigram_estimate(&self.counts, &self.continuation, self.config.discount, pre_previous, previous, word)
	}

	pub fn bigram_probability(&self, previous: &str, word: &str) -> Result<f64, Error> {
		bigram_estimate(&self.counts, &self.continuation, self.config.discount, previous, word)
	}
}

impl LanguageModel for KneserNeyTrigramModel {
	fn order(&self) -> usize {
		3
	}

	fn word_probability(&self, history: &[String], word: &str) -> Result<f64, Error> {
		let (pre_previous, previous) = previous_two(history);
		let probability = match self.trigram_probability(pre_previous, previous, word) {
			Err(Error::UndefinedEstimate { what }) => {
				log::trace!("{}, using the bigram estimate", what);
				self.bigram_probability(previous, word)?
			}
			result => result?,
		};
		checked(|| format!("Kneser-Ney P({}|{}, {})", word, pre_previous, previous), probability)
	}

	fn next_word_distribution(&self, history: &[String]) -> Cow<'_, Counter<String>> {
		let (pre_previous, previous) = previous_two(history);
		let context = (pre_previous.to_owned(), previous.to_owned());
		let followers = self.counts.trigrams.get_counter(&context);
		if followers.is_empty() {
			return bigram_distribution(&self.counts, &self.continuation, self.config.discount, previous);
		}
		let distribution = followers
			.keys()
			.filter_map(|word| {
				self.trigram_probability(pre_previous, previous, word)
					.ok()
					.map(|p| (word.clone(), p))
			})
			.collect();
		Cow::Owned(distribution)
	}

	fn diagnostics(&self) -> &[Diagnostic] {
		&[]
	}
}
