use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Diagnostic;
use super::counter::Counter;

/// Sparse two-dimensional count table: context → `Counter` of continuations.
///
/// Reads go through [`CounterMap::get_counter`], which never fails and hands
/// out a shared reference. Writes go through [`CounterMap::increment`] or the
/// explicit [`CounterMap::get_counter_mut`] view.
///
/// # Invariants
/// - Every stored context has at least one continuation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CounterMap<C: Ord, K: Ord> {
	counters: BTreeMap<C, Counter<K>>,

	/// Returned for contexts that were never seen.
	#[serde(skip)]
	empty: Counter<K>,
}

impl<C: Ord + Clone, K: Ord + Clone> CounterMap<C, K> {
	pub fn new() -> Self {
		Self { counters: BTreeMap::new(), empty: Counter::new() }
	}

	/// Adds `delta` to the count of `key` under `context`.
	pub fn increment(&mut self, context: C, key: K, delta: f64) {
		self.counters.entry(context).or_default().increment(key, delta);
	}

	/// Overwrites the count of `key` under `context`.
	pub fn set_count(&mut self, context: C, key: K, value: f64) {
		self.counters.entry(context).or_default().set_count(key, value);
	}

	/// Count of `key` under `context`, 0 when either was never seen.
	pub fn get_count(&self, context: &C, key: &K) -> f64 {
		self.counters.get(context).map_or(0.0, |counter| counter.get_count(key))
	}

	/// Read-only view of the continuations of `context`.
	///
	/// Unknown contexts yield an empty counter.
	pub fn get_counter(&self, context: &C) -> &Counter<K> {
		self.counters.get(context).unwrap_or(&self.empty)
	}

	/// Mutable view of a known context's continuations.
	pub fn get_counter_mut(&mut self, context: &C) -> Option<&mut Counter<K>> {
		self.counters.get_mut(context)
	}

	pub fn contains_context(&self, context: &C) -> bool {
		self.counters.contains_key(context)
	}

	/// Lazily iterates over the known contexts. Call again to restart.
	pub fn contexts(&self) -> impl Iterator<Item = &C> {
		self.counters.keys()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&C, &Counter<K>)> {
		self.counters.iter()
	}

	/// Number of known contexts.
	pub fn size(&self) -> usize {
		self.counters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counters.is_empty()
	}

	/// Sum of every count in the table.
	pub fn total_count(&self) -> f64 {
		self.counters.values().map(Counter::total).sum()
	}

	/// Number of distinct (context, key) pairs.
	pub fn total_mod_count(&self) -> usize {
		self.counters.values().map(Counter::mod_count).sum()
	}

	/// Normalizes every context's counter independently.
	pub fn normalize(&mut self) {
		for counter in self.counters.values_mut() {
			counter.normalize();
		}
	}

	/// Applies Good-Turing discounting independently per context.
	///
	/// Diagnostics of all contexts are merged, one per undefined bucket.
	pub fn good_turing_normalize(&mut self, cutoff: usize) -> Vec<Diagnostic> {
		let mut diagnostics: Vec<Diagnostic> = Vec::new();
		for counter in self.counters.values_mut() {
			for diagnostic in counter.good_turing_normalize(cutoff) {
				if !diagnostics.contains(&diagnostic) {
					diagnostics.push(diagnostic);
				}
			}
		}
		diagnostics
	}
}

impl<C: Ord, K: Ord> Default for CounterMap<C, K> {
	fn default() -> Self {
		Self { counters: BTreeMap::new(), empty: Counter::default() }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table() -> CounterMap<String, String> {
		let mut table = CounterMap::new();
		for (context, key, delta) in [("a", "b", 2.0), ("a", "c", 1.0), ("b", "c", 1.0)] {
			table.increment(context.to_string(), key.to_string(), delta);
		}
		table
	}

	#[test]
	fn test_unseen_pairs_read_zero() {
		let table = table();
		assert_eq!(table.get_count(&"a".to_string(), &"z".to_string()), 0.0);
		assert_eq!(table.get_count(&"z".to_string(), &"b".to_string()), 0.0);
		assert!(table.get_counter(&"z".to_string()).is_empty());
	}

	#[test]
	fn test_counts_and_totals() {
		let table = table();
		assert_eq!(table.get_count(&"a".to_string(), &"b".to_string()), 2.0);
		assert_eq!(table.get_counter(&"a".to_string()).total(), 3.0);
		assert_eq!(table.total_count(), 4.0);
		assert_eq!(table.total_mod_count(), 3);
		assert_eq!(table.size(), 2);
	}

	#[test]
	fn test_contexts_are_restartable() {
		let table = table();
		let first: Vec<_> = table.contexts().cloned().collect();
		let second: Vec<_> = table.contexts().cloned().collect();
		assert_eq!(first, vec!["a".to_string(), "b".to_string()]);
		assert_eq!(first, second);
	}

	#[test]
	fn test_normalize_is_per_context() {
		let mut table = table();
		table.normalize();
		assert_eq!(table.get_counter(&"a".to_string()).get_count(&"c".to_string()), 1.0 / 3.0);
		assert_eq!(table.get_count(&"b".to_string(), &"c".to_string()), 1.0);
	}

	#[test]
	fn test_mutable_view_only_for_known_contexts() {
		let mut table = table();
		assert!(table.get_counter_mut(&"z".to_string()).is_none());
		if let Some(counter) = table.get_counter_mut(&"b".to_string()) {
			counter.set_count("c".to_string(), 5.0);
		}
		assert_eq!(table.get_count(&"b".to_string(), &"c".to_string()), 5.0);
	}

	#[test]
	fn test_pair_contexts_do_not_collide() {
		let mut table: CounterMap<(String, String), String> = CounterMap::new();
		table.increment(("ab".to_string(), "c".to_string()), "x".to_string(), 1.0);
		table.increment(("a".to_string(), "bc".to_string()), "x".to_string(), 1.0);
		assert_eq!(table.size(), 2);
		assert_eq!(table.get_count(&("ab".to_string(), "c".to_string()), &"x".to_string()), 1.0);
	}
}
