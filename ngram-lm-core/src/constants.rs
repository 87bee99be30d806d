/// Sentence start marker. Prepended once for bigram models, twice for trigram models.
pub const START: &str = "<S>";

/// Sentence end marker.
pub const STOP: &str = "</S>";

/// Stand-in for any word never seen in training.
pub const UNKNOWN: &str = "*UNKNOWN*";

/// Weight of the bigram count in stupid backoff.
pub const DEFAULT_STUPID_BACKOFF_LAMBDA: f64 = 0.9;

/// Trigram weight of the interpolated model.
pub const DEFAULT_INTERPOLATION_LAMBDA1: f64 = 0.6;

/// Bigram weight of the interpolated model. The unigram gets what is left.
pub const DEFAULT_INTERPOLATION_LAMBDA2: f64 = 0.3;

/// Counts above this value are trusted as-is by Good-Turing discounting.
pub const DEFAULT_GOOD_TURING_CUTOFF: usize = 5;

/// Largest accepted Good-Turing cutoff; the bucket tables hold `cutoff + 2` entries.
pub const MAX_GOOD_TURING_CUTOFF: usize = 1024;

pub const DEFAULT_KNESER_NEY_BIGRAM_DISCOUNT: f64 = 0.5;

pub const DEFAULT_KNESER_NEY_TRIGRAM_DISCOUNT: f64 = 10.0;

/// Discount used by the Kneser-Ney query path of the Katz models.
pub const DEFAULT_KATZ_KNESER_NEY_DISCOUNT: f64 = 1.0;

/// Generation gives up after this many tokens without reaching `STOP`.
pub const DEFAULT_MAX_SENTENCE_LENGTH: usize = 100;

/// Backoff denominators at or below this value count as vanished.
pub const BACKOFF_EPSILON: f64 = 1e-12;
