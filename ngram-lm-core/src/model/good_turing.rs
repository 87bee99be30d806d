use crate::error::{clamped, Diagnostic};

/// Good-Turing estimate `c* = (c+1)·N(c+1)/N(c)`.
///
/// Returns `None` when either bucket is empty (or out of the table), in
/// which case the discount is undefined.
pub(crate) fn discounted_count(buckets: &[usize], count: usize) -> Option<f64> {
	let n_c = *buckets.get(count)?;
	let n_next = *buckets.get(count + 1)?;
	if n_c == 0 || n_next == 0 {
		return None;
	}
	Some((count + 1) as f64 * n_next as f64 / n_c as f64)
}

/// Frequency-of-frequency table with the Katz correction ratio.
///
/// # Invariants
/// - `buckets` has `cutoff + 2` entries: `N(0..=cutoff+1)`
/// - `ratio` (`A`) is in `[0, 1)`
#[derive(Clone, Debug)]
pub(crate) struct GoodTuringTable {
	buckets: Vec<usize>,
	cutoff: usize,
	ratio: f64,
}

impl GoodTuringTable {
	/// Buckets `counts` and derives `A = (cutoff+1)·N(cutoff+1)/N(1)`.
	///
	/// An undefined or out-of-range ratio is replaced by 0, which turns the
	/// Katz correction into plain Good-Turing.
	pub(crate) fn new<I>(counts: I, cutoff: usize, diagnostics: &mut Vec<Diagnostic>) -> Self
	where
		I: IntoIterator<Item = f64>,
	{
		let mut buckets = vec![0usize; cutoff + 2];
		for count in counts {
			if count >= 1.0 && count.fract() == 0.0 && count <= (cutoff + 1) as f64 {
				buckets[count as usize] += 1;
			}
		}

		let ratio = if buckets[1] == 0 {
			diagnostics.push(Diagnostic::UndefinedDiscount { count: 1 }.report());
			0.0
		} else {
			let ratio = (cutoff + 1) as f64 * buckets[cutoff + 1] as f64 / buckets[1] as f64;
			if ratio < 1.0 {
				ratio
			} else {
				diagnostics.push(
					Diagnostic::ClampedEstimate {
						what: "Good-Turing ratio".to_owned(),
						value: ratio,
						replacement: 0.0,
					}
					.report(),
				);
				0.0
			}
		};

		Self { buckets, cutoff, ratio }
	}

	/// `N(n)`, 0 outside the table.
	pub(crate) fn bucket(&self, n: usize) -> usize {
		self.buckets.get(n).copied().unwrap_or(0)
	}

	/// Discounted probability of an event seen `count` times out of
	/// `1 / normalizer`.
	///
	/// Counts above the cutoff get their relative frequency. Lower counts
	/// get `count·normalizer·(c*/count - A)/(1 - A)`, falling back to the
	/// relative frequency when `c*` is undefined or the result is invalid.
	/// Fractional counts get their relative frequency without a diagnostic.
	pub(crate) fn probability(&self, count: f64, normalizer: f64, diagnostics: &mut Vec<Diagnostic>) -> f64 {
		let relative = count * normalizer;
		if count > self.cutoff as f64 {
			return relative;
		}

		// Fractional counts are not Good-Turing buckets
		if count < 1.0 || count.fract() != 0.0 {
			return relative;
		}
		let bucket = count as usize;
		let Some(discounted) = discounted_count(&self.buckets, bucket) else {
			let diagnostic = Diagnostic::UndefinedDiscount { count: bucket };
			if !diagnostics.contains(&diagnostic) {
				diagnostics.push(diagnostic.report());
			}
			return relative;
		};

		let probability = relative * (discounted / count - self.ratio) / (1.0 - self.ratio);
		clamped(|| format!("discounted probability of count {}", count), probability, relative, diagnostics)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_discounted_count() {
		// N(1) = 4, N(2) = 2, N(3) = 0
		let buckets = [0, 4, 2, 0];
		assert_eq!(discounted_count(&buckets, 1), Some(1.0));
		assert_eq!(discounted_count(&buckets, 2), None);
		assert_eq!(discounted_count(&buckets, 3), None);
	}

	#[test]
	fn test_table_ratio_and_buckets() {
		let mut diagnostics = Vec::new();
		let counts = [1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 9.0];
		let table = GoodTuringTable::new(counts, 2, &mut diagnostics);
		assert_eq!(table.bucket(1), 4);
		assert_eq!(table.bucket(2), 2);
		assert_eq!(table.bucket(3), 1);
		assert_eq!(table.bucket(9), 0);
		// A = 3 * N(3) / N(1) = 3 / 4
		assert_eq!(table.ratio, 0.75);
		assert!(diagnostics.is_empty());
	}

	#[test]
	fn test_probability_above_cutoff_is_relative_frequency() {
		let mut diagnostics = Vec::new();
		let table = GoodTuringTable::new([1.0, 2.0, 6.0], 1, &mut diagnostics);
		assert_eq!(table.probability(6.0, 0.125, &mut diagnostics), 0.75);
	}

	#[test]
	fn test_probability_applies_katz_correction() {
		let mut diagnostics = Vec::new();
		// N(1) = 2, N(2) = 2, N(3) = 0: A = 0, c*(1) = 2
		let table = GoodTuringTable::new([1.0, 1.0, 2.0, 2.0], 2, &mut diagnostics);
		let p = table.probability(1.0, 1.0 / 6.0, &mut diagnostics);
		assert_eq!(p, (1.0 / 6.0) * (2.0 / 1.0 - 0.0) / (1.0 - 0.0));
	}

	#[test]
	fn test_missing_singletons_disable_ratio() {
		let mut diagnostics = Vec::new();
		let table = GoodTuringTable::new([2.0, 3.0], 2, &mut diagnostics);
		assert_eq!(table.ratio, 0.0);
		assert_eq!(diagnostics, vec![Diagnostic::UndefinedDiscount { count: 1 }]);
	}

	#[test]
	fn test_undefined_discount_falls_back_once_per_bucket() {
		let mut diagnostics = Vec::new();
		// N(2) = 0 makes c*(1) undefined
		let table = GoodTuringTable::new([1.0, 3.0], 3, &mut diagnostics);
		assert_eq!(table.probability(1.0, 0.25, &mut diagnostics), 0.25);
		assert_eq!(table.probability(1.0, 0.5, &mut diagnostics), 0.5);
		assert_eq!(diagnostics, vec![Diagnostic::UndefinedDiscount { count: 1 }]);
	}

	#[test]
	fn test_fractional_count_is_relative_frequency() {
		let mut diagnostics = Vec::new();
		let table = GoodTuringTable::new([1.0, 1.0, 2.0, 2.0], 2, &mut diagnostics);
		assert_eq!(table.probability(0.5, 0.5, &mut diagnostics), 0.25);
		assert_eq!(table.probability(1.5, 0.5, &mut diagnostics), 0.75);
		assert!(diagnostics.is_empty());
	}
}
