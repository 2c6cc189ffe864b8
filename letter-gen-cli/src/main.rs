use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use log::info;

use letter_gen_core::model::generation_input::StartSeed;
use letter_gen_core::model::generator::TextGenerator;
use letter_gen_core::model::language_profile::LanguageProfile;
use letter_gen_core::model::selector::Strategy;

/// Generates sentences letter by letter from a language profile.
#[derive(Parser, Debug)]
#[command(name = "letter-gen")]
#[command(version)]
#[command(about = "Letter-level n-gram text generator", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["corpus", "public"])))]
struct Cli {
    /// Plain text corpus (a `<stem>.bin` cache is written next to it)
    #[arg(long, value_name = "FILE")]
    corpus: Option<PathBuf>,

    /// Public JSON profile
    #[arg(long, value_name = "FILE")]
    public: Option<PathBuf>,

    /// N-gram orders counted from the corpus
    #[arg(long, value_delimiter = ',', default_values_t = [1, 2, 3])]
    orders: Vec<usize>,

    /// Letter selection policy: greedy, likelihood or backoff
    #[arg(short, long, default_value = "greedy")]
    strategy: Strategy,

    /// Words per sentence
    #[arg(short, long, default_value_t = 5)]
    words: usize,

    /// Maximum number of letters per word, seed included
    #[arg(short = 'l', long, default_value_t = 15)]
    max_length: usize,

    /// Start seed: none, custom:<letters> or random:<order>[:<seed>]
    #[arg(long, default_value = "none")]
    seed: StartSeed,

    /// Number of sentences to print
    #[arg(short = 'n', long, default_value_t = 1)]
    sentences: usize,

    /// Write the loaded profile as a binary file
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // Load the profile, from the corpus (or its binary cache) or from a public file
    let profile = match (&cli.corpus, &cli.public) {
        (Some(corpus), _) => LanguageProfile::load(corpus, &cli.orders)?,
        (None, Some(public)) => LanguageProfile::open_public(public)?,
        (None, None) => return Err("either --corpus or --public is required".into()),
    };
    info!("profile '{}' ready, orders {:?}", profile.name(), profile.orders());

    if let Some(path) = &cli.save {
        profile.save(path)?;
        info!("profile written to {}", path.display());
    }

    // One generator for every sentence: already used n-grams keep being avoided
    let mut generator = TextGenerator::with_strategy(&profile, cli.strategy).with_max_word_length(cli.max_length)?;

    for i in 0..cli.sentences {
        // Random seeds move forward so each sentence gets its own start
        let seed = match &cli.seed {
            StartSeed::Random { order, seed } => StartSeed::Random { order: *order, seed: seed.wrapping_add(i as u64) },
            other => other.clone(),
        };
        let context = seed.resolve(&profile)?;
        println!("{}", generator.generate_decoded_sentence(&context, cli.words)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generation_flags() {
        let cli = Cli::parse_from([
            "letter-gen", "--corpus", "data/en.txt", "--orders", "2,3", "-s", "backoff", "--seed", "random:2:9",
        ]);
        assert_eq!(cli.orders, vec![2, 3]);
        assert_eq!(cli.strategy, Strategy::BackOff);
        assert_eq!(cli.seed, StartSeed::Random { order: 2, seed: 9 });
        assert_eq!(cli.words, 5);
    }

    #[test]
    fn requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["letter-gen"]).is_err());
        assert!(Cli::try_parse_from(["letter-gen", "--corpus", "a.txt", "--public", "b.json"]).is_err());
    }
}
