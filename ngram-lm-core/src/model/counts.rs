use crate::constants::{START, STOP};
use super::counter::Counter;
use super::counter_map::CounterMap;

/// Trigram context: the two words preceding the predicted one.
pub type PairContext = (String, String);

/// Surrounds a sentence with `order - 1` start markers and one stop marker.
pub fn pad_sentence<S: AsRef<str>>(sentence: &[S], order: usize) -> Vec<String> {
	let starts = order.saturating_sub(1);
	let mut padded = Vec::with_capacity(sentence.len() + starts + 1);
	padded.extend(std::iter::repeat_n(START.to_owned(), starts));
	padded.extend(sentence.iter().map(|word| word.as_ref().to_owned()));
	padded.push(STOP.to_owned());
	padded
}

/// Raw n-gram statistics gathered in one pass over a training collection.
///
/// # Responsibilities
/// - Pad each sentence with boundary markers
/// - Count unigrams, bigrams and (for order 3) trigrams
/// - Count, for every word, the distinct contexts preceding it
///
/// # Invariants
/// - `order` is 2 or 3
/// - `trigrams` is empty for bigram statistics
/// - `continuations[w][p] == bigrams[p][w]` for every observed pair
#[derive(Clone, Debug, PartialEq)]
pub struct NGramCounts {
	order: usize,

	/// Unigram counts, boundary markers included.
	pub(crate) words: Counter<String>,

	/// previous word → next word.
	pub(crate) bigrams: CounterMap<String, String>,

	/// (pre-previous, previous) → next word.
	pub(crate) trigrams: CounterMap<PairContext, String>,

	/// word → words observed right before it.
	pub(crate) continuations: CounterMap<String, String>,
}

impl NGramCounts {
	/// Bigram statistics.
	///
	/// `START` is counted once per sentence.
	pub fn bigram<S: AsRef<str>>(sentences: &[Vec<S>]) -> Self {
		let mut counts = Self::empty(2);
		for sentence in sentences {
			let padded = pad_sentence(sentence, 2);
			counts.words.increment(padded[0].clone(), 1.0);
			for pair in padded.windows(2) {
				counts.add_bigram(&pair[0], &pair[1]);
			}
		}
		counts
	}

	/// Trigram statistics.
	///
	/// `START` is counted twice per sentence and the `(START, START)`
	/// bigram once, so every trigram context also exists as a bigram.
	pub fn trigram<S: AsRef<str>>(sentences: &[Vec<S>]) -> Self {
		let mut counts = Self::empty(3);
		for sentence in sentences {
			let padded = pad_sentence(sentence, 3);
			counts.words.increment(padded[0].clone(), 1.0);
			counts.words.increment(padded[1].clone(), 1.0);
			counts.bigrams.increment(padded[0].clone(), padded[1].clone(), 1.0);
			counts.continuations.increment(padded[1].clone(), padded[0].clone(), 1.0);
			for triple in padded.windows(3) {
				counts.add_bigram(&triple[1], &triple[2]);
				counts.trigrams.increment(
					(triple[0].clone(), triple[1].clone()),
					triple[2].clone(),
					1.0,
				);
			}
		}
		counts
	}

	fn empty(order: usize) -> Self {
		Self {
			order,
			words: Counter::new(),
			bigrams: CounterMap::new(),
			trigrams: CounterMap::new(),
			continuations: CounterMap::new(),
		}
	}

	fn add_bigram(&mut self, previous: &str, word: &str) {
		self.words.increment(word.to_owned(), 1.0);
		self.bigrams.increment(previous.to_owned(), word.to_owned(), 1.0);
		self.continuations.increment(word.to_owned(), previous.to_owned(), 1.0);
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn words(&self) -> &Counter<String> {
		&self.words
	}

	pub fn bigrams(&self) -> &CounterMap<String, String> {
		&self.bigrams
	}

	pub fn trigrams(&self) -> &CounterMap<PairContext, String> {
		&self.trigrams
	}

	pub fn continuations(&self) -> &CounterMap<String, String> {
		&self.continuations
	}
}
