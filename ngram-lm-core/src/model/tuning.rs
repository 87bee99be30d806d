use crate::error::Error;
use super::evaluation::perplexity;
use super::language_model::LanguageModel;

/// Outcome of a validation-driven selection.
#[derive(Debug)]
pub struct Selection<C, M> {
	pub config: C,
	pub model: M,
	pub perplexity: f64,
}

/// Builds one model per candidate configuration and keeps the one with the
/// lowest perplexity on `validation`.
///
/// Ties keep the earliest candidate.
///
/// # Errors
/// - `InvalidConfig` if `candidates` is empty
/// - any error raised while building or scoring a candidate
pub fn select_by_perplexity<C, M, F>(
	candidates: &[C],
	validation: &[Vec<String>],
	build: F,
) -> Result<Selection<C, M>, Error>
where
	C: Clone + std::fmt::Debug,
	M: LanguageModel,
	F: Fn(&C) -> Result<M, Error>,
{
	let mut best: Option<Selection<C, M>> = None;
	for config in candidates {
		let model = build(config)?;
		let score = perplexity(&model, validation)?;
		log::debug!("candidate {:?}: validation perplexity {}", config, score);

		let better = match &best {
			Some(current) => score < current.perplexity,
			None => true,
		};
		if better {
			best = Some(Selection { config: config.clone(), model, perplexity: score });
		}
	}

	let best = best.ok_or_else(|| Error::InvalidConfig("no candidate configuration".to_owned()))?;
	log::info!("selected {:?} (perplexity {})", best.config, best.perplexity);
	Ok(best)
}
