use ngram_lm_core::io::{get_filename, read_sentences};
use ngram_lm_core::model::*;

fn report(name: &str, model: &dyn LanguageModel, test: &[Vec<String>]) -> Result<(), Box<dyn std::error::Error>> {
    println!("== {} ==", name);

    // Perplexity over the held-out sentences (or the training ones)
    match perplexity(model, test) {
        Ok(score) => println!("perplexity: {:.3}", score),
        Err(e) => println!("perplexity unavailable: {}", e),
    }

    // Numerical trouble met while training
    for diagnostic in model.diagnostics() {
        println!("diagnostic: {}", diagnostic);
    }

    // Generate 3 sentences, giving up after 30 tokens each
    let generator = Generator::new(model, GenerationConfig { max_length: 30 })?;
    for i in 0..3 {
        match generator.generate() {
            Ok(sentence) => println!("sentence {}: {}", i + 1, sentence.join(" ")),
            Err(e) => println!("sentence {}: {}", i + 1, e),
        }
    }
    println!();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Usage: ngram-lm-exemple <training file> [validation file]
    let mut args = std::env::args().skip(1);
    let training_path = args.next().unwrap_or_else(|| "./data/train.txt".to_owned());
    let validation_path = args.next();

    let training = read_sentences(&training_path)?;
    log::info!("{}: {} training sentences", get_filename(&training_path)?, training.len());

    let validation = match &validation_path {
        Some(path) => read_sentences(path)?,
        None => training.clone(),
    };

    // Without a validation file the defaults are used as they are
    let stupid_backoff = match validation_path {
        Some(_) => {
            let candidates: Vec<StupidBackoffConfig> = [0.5, 0.7, 0.9]
                .into_iter()
                .map(|lambda| StupidBackoffConfig { lambda, ..Default::default() })
                .collect();
            StupidBackoffModel::with_validation(&training, &validation, &candidates)?
        }
        None => StupidBackoffModel::new(&training, StupidBackoffConfig::default())?,
    };
    println!("stupid backoff lambda: {}", stupid_backoff.config().lambda);
    report("stupid backoff", &stupid_backoff, &validation)?;

    let interpolated = InterpolatedModel::new(&training, InterpolatedConfig::default())?;
    report("linear interpolation", &interpolated, &validation)?;

    let katz_bigram = KatzBigramModel::new(&training, KatzConfig::default())?;
    report("Katz bigram", &katz_bigram, &validation)?;

    let katz_trigram = KatzTrigramModel::new(&training, KatzConfig::default())?;
    report("Katz trigram", &katz_trigram, &validation)?;

    let candidates = [0.25, 0.5, 0.75, 0.9].map(|discount| KneserNeyConfig { discount });
    let kneser_ney_bigram = KneserNeyBigramModel::with_validation(&training, &validation, &candidates)?;
    println!("Kneser-Ney bigram discount: {}", kneser_ney_bigram.config().discount);
    report("Kneser-Ney bigram", &kneser_ney_bigram, &validation)?;

    let kneser_ney_trigram = KneserNeyTrigramModel::new(&training, KneserNeyConfig::trigram())?;
    report("Kneser-Ney trigram", &kneser_ney_trigram, &validation)?;

    // Invalid hyperparameters are rejected before training
    match KneserNeyBigramModel::new(&training, KneserNeyConfig { discount: -1.0 }) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    Ok(())
}
