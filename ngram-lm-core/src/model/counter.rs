use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::error::Diagnostic;
use super::good_turing::discounted_count;

/// Sparse mapping from a key to an accumulated non-negative count.
///
/// Iteration follows key order, so every pass over a counter (totals,
/// normalization, sampling) is reproducible from one run to the next.
///
/// # Invariants
/// - Every stored value is >= 0 as long as callers increment by
///   non-negative deltas
/// - Absent keys read as 0
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Counter<K: Ord> {
	counts: BTreeMap<K, f64>,
}

impl<K: Ord + Clone> Counter<K> {
	/// Creates an empty counter.
	pub fn new() -> Self {
		Self { counts: BTreeMap::new() }
	}

	/// Adds `delta` to the count of `key`, creating it at 0 first.
	pub fn increment(&mut self, key: K, delta: f64) {
		*self.counts.entry(key).or_insert(0.0) += delta;
	}

	/// Overwrites the count of `key`.
	pub fn set_count(&mut self, key: K, value: f64) {
		self.counts.insert(key, value);
	}

	/// Returns the count of `key`, 0 if the key was never seen.
	pub fn get_count(&self, key: &K) -> f64 {
		self.counts.get(key).copied().unwrap_or(0.0)
	}

	/// Returns the stored count, distinguishing absent keys from zero counts.
	pub fn get(&self, key: &K) -> Option<f64> {
		self.counts.get(key).copied()
	}

	pub fn contains(&self, key: &K) -> bool {
		self.counts.contains_key(key)
	}

	/// Sum of all stored counts.
	pub fn total(&self) -> f64 {
		self.counts.values().sum()
	}

	/// Number of distinct keys.
	pub fn size(&self) -> usize {
		self.counts.len()
	}

	/// Number of distinct types, the name the Good-Turing formulas use for `size`.
	pub fn mod_count(&self) -> usize {
		self.size()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &K> {
		self.counts.keys()
	}

	pub fn iter(&self) -> btree_map::Iter<'_, K, f64> {
		self.counts.iter()
	}

	/// Number of keys whose count is exactly `n`.
	pub fn frequency_of_frequency(&self, n: usize) -> usize {
		let n = n as f64;
		self.counts.values().filter(|&&count| count == n).count()
	}

	/// Frequency-of-frequency table `N(0..=max)` in one pass.
	///
	/// Only whole counts in `1..=max` are bucketed; `N(0)` stays 0.
	pub fn frequency_buckets(&self, max: usize) -> Vec<usize> {
		let mut buckets = vec![0; max + 1];
		for &count in self.counts.values() {
			if let Some(bucket) = whole_count(count).filter(|c| *c <= max) {
				buckets[bucket] += 1;
			}
		}
		buckets
	}

	/// Divides every count by the total so the values sum to 1.
	///
	/// An empty or all-zero counter is left untouched.
	pub fn normalize(&mut self) {
		let total = self.total();
		if total <= 0.0 {
			return;
		}
		for count in self.counts.values_mut() {
			*count /= total;
		}
	}

	/// Replaces every count `c <= cutoff` by `c* = (c+1)·N(c+1)/N(c)`, then
	/// divides everything by the original total.
	///
	/// The mass removed from low counts is left unassigned, so the result
	/// sums to at most 1. A bucket whose discount is undefined keeps its raw
	/// count; one diagnostic is returned per such bucket. Counts that are not
	/// whole numbers are only rescaled.
	pub fn good_turing_normalize(&mut self, cutoff: usize) -> Vec<Diagnostic> {
		let total = self.total();
		if total <= 0.0 {
			return Vec::new();
		}

		// Buckets past the largest whole count are all empty
		let largest = self.counts.values().filter_map(|&count| whole_count(count)).max().unwrap_or(0);
		let buckets = self.frequency_buckets(cutoff.min(largest).saturating_add(1));
		let mut undefined: Vec<usize> = Vec::new();

		for count in self.counts.values_mut() {
			let mut adjusted = *count;
			// Fractional counts are not Good-Turing buckets and stay as they are
			if let Some(bucket) = whole_count(*count).filter(|c| *c <= cutoff) {
				match discounted_count(&buckets, bucket) {
					Some(discounted) => adjusted = discounted,
					None if !undefined.contains(&bucket) => undefined.push(bucket),
					None => {}
				}
			}
			*count = adjusted / total;
		}

		undefined.sort_unstable();
		undefined
			.into_iter()
			.map(|count| Diagnostic::UndefinedDiscount { count }.report())
			.collect()
	}
}

impl<K: Ord> Default for Counter<K> {
	fn default() -> Self {
		Self { counts: BTreeMap::new() }
	}
}

impl<'a, K: Ord> IntoIterator for &'a Counter<K> {
	type Item = (&'a K, &'a f64);
	type IntoIter = btree_map::Iter<'a, K, f64>;

	fn into_iter(self) -> Self::IntoIter {
		self.counts.iter()
	}
}

impl<K: Ord> FromIterator<(K, f64)> for Counter<K> {
	fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
		let mut counts = BTreeMap::new();
		for (key, delta) in iter {
			*counts.entry(key).or_insert(0.0) += delta;
		}
		Self { counts }
	}
}

/// Returns `count` as a bucket index if it is a positive whole number.
fn whole_count(count: f64) -> Option<usize> {
	if count >= 1.0 && count.fract() == 0.0 {
		Some(count as usize)
	} else {
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn counter(pairs: &[(&str, f64)]) -> Counter<String> {
		pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
	}

	#[test]
	fn test_unseen_key_reads_zero() {
		let counter = counter(&[("a", 2.0)]);
		assert_eq!(counter.get_count(&"missing".to_string()), 0.0);
		assert_eq!(counter.get(&"missing".to_string()), None);
	}

	#[test]
	fn test_increment_creates_and_accumulates() {
		let mut counter = Counter::new();
		counter.increment("a".to_string(), 1.0);
		counter.increment("a".to_string(), 2.5);
		counter.increment("b".to_string(), 1.0);
		assert_eq!(counter.get_count(&"a".to_string()), 3.5);
		assert_eq!(counter.total(), 4.5);
		assert_eq!(counter.size(), 2);
		assert_eq!(counter.mod_count(), 2);
	}

	#[test]
	fn test_set_count_overwrites() {
		let mut counter = counter(&[("a", 4.0)]);
		counter.set_count("a".to_string(), 1.0);
		assert_eq!(counter.get_count(&"a".to_string()), 1.0);
	}

	#[test]
	fn test_frequency_of_frequency_weighted_sum_matches_total() {
		let counter = counter(&[("a", 1.0), ("b", 1.0), ("c", 2.0), ("d", 3.0), ("e", 3.0), ("f", 7.0)]);
		assert_eq!(counter.frequency_of_frequency(1), 2);
		assert_eq!(counter.frequency_of_frequency(3), 2);
		assert_eq!(counter.frequency_of_frequency(4), 0);

		let weighted: f64 = (1..=7).map(|n| (n * counter.frequency_of_frequency(n)) as f64).sum();
		assert_eq!(weighted, counter.total());
	}

	#[test]
	fn test_frequency_buckets_ignore_large_and_fractional_counts() {
		let counter = counter(&[("a", 1.0), ("b", 2.0), ("c", 0.5), ("d", 9.0)]);
		assert_eq!(counter.frequency_buckets(3), vec![0, 1, 1, 0]);
	}

	#[test]
	fn test_normalize_sums_to_one() {
		let mut counter = counter(&[("a", 1.0), ("b", 3.0)]);
		counter.normalize();
		assert_eq!(counter.get_count(&"a".to_string()), 0.25);
		assert_eq!(counter.get_count(&"b".to_string()), 0.75);
	}

	#[test]
	fn test_normalize_empty_is_noop() {
		let mut counter: Counter<String> = Counter::new();
		counter.normalize();
		assert!(counter.is_empty());
	}

	#[test]
	fn test_good_turing_normalize_discounts_low_counts() {
		// N(1) = 2, N(2) = 1: c*(1) = 2 * 1 / 2 = 1
		let mut counter = counter(&[("a", 1.0), ("b", 1.0), ("c", 2.0), ("d", 3.0)]);
		let diagnostics = counter.good_turing_normalize(1);
		assert!(diagnostics.is_empty());
		assert_eq!(counter.get_count(&"a".to_string()), 1.0 / 7.0);
		assert_eq!(counter.get_count(&"c".to_string()), 2.0 / 7.0);
		assert_eq!(counter.get_count(&"d".to_string()), 3.0 / 7.0);
	}

	#[test]
	fn test_good_turing_normalize_reports_undefined_discount() {
		// N(2) = 0, so the discount for count 1 is undefined
		let mut counter = counter(&[("a", 1.0), ("b", 3.0)]);
		let diagnostics = counter.good_turing_normalize(2);
		assert_eq!(diagnostics, vec![Diagnostic::UndefinedDiscount { count: 1 }]);
		assert_eq!(counter.get_count(&"a".to_string()), 0.25);
		assert_eq!(counter.get_count(&"b".to_string()), 0.75);
	}

	#[test]
	fn test_good_turing_normalize_keeps_fractional_counts_silently() {
		// N(1) = 2, N(2) = 1: c*(1) = 1; 0.5 is not a bucket
		let mut counter = counter(&[("a", 0.5), ("b", 1.0), ("c", 1.0), ("d", 2.0)]);
		let diagnostics = counter.good_turing_normalize(1);
		assert!(diagnostics.is_empty());
		assert_eq!(counter.get_count(&"a".to_string()), 0.5 / 4.5);
		assert_eq!(counter.get_count(&"b".to_string()), 1.0 / 4.5);
	}

	#[test]
	fn test_good_turing_normalize_huge_cutoff() {
		// Same table as a cutoff of 2: c*(1) = 1, c*(2) undefined since N(3) = 0
		let mut counter = counter(&[("a", 1.0), ("b", 1.0), ("c", 2.0)]);
		let diagnostics = counter.good_turing_normalize(usize::MAX);
		assert_eq!(diagnostics, vec![Diagnostic::UndefinedDiscount { count: 2 }]);
		assert_eq!(counter.get_count(&"a".to_string()), 0.25);
		assert_eq!(counter.get_count(&"c".to_string()), 0.5);
	}

	#[test]
	fn test_trained_unigrams_weighted_sum_matches_total() {
		let corpus = vec![
			vec!["the", "cat", "sat", "on", "the", "mat"],
			vec!["the", "dog", "sat"],
			vec!["a", "cat", "ran"],
		];
		let words = crate::model::counts::NGramCounts::bigram(&corpus).words().clone();
		let largest = words.iter().map(|(_, count)| *count as usize).max().unwrap();
		let weighted: usize = (1..=largest).map(|n| n * words.frequency_of_frequency(n)).sum();
		// 12 words, plus START and STOP per sentence
		assert_eq!(words.total(), 18.0);
		assert_eq!(weighted as f64, words.total());
		assert_eq!(words.frequency_buckets(largest).iter().enumerate().map(|(n, k)| n * k).sum::<usize>(), weighted);
	}
}
