use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use missing_words_engine::engine::config::{merge, validate, ConfigUpdate};
use missing_words_engine::engine::machine::MissingWordsGame;
use missing_words_engine::engine::models::{GameMode, Language};
use missing_words_engine::engine::notifier::TracingNotifier;
use missing_words_engine::engine::settings::{load_default_settings, load_settings, EngineSettings};
use missing_words_engine::engine::simulator::simulate_rounds;
use missing_words_engine::games::missing_words::round::WordFilter;
use missing_words_engine::words::local::LocalWordSource;
use missing_words_engine::words::source::{WordQuery, WordSource};

#[derive(Parser)]
#[command(name = "missing-words-engine", about = "Missing Words game engine tools")]
struct Cli {
    /// Path to missing_words.toml (default: auto-discover)
    #[arg(long, env = "MISSING_WORDS_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show or change the persisted game config
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Draw words from the local pool
    Words {
        #[arg(long, default_value = "6")]
        count: usize,
        #[arg(long)]
        language: Option<LanguageArg>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Play rounds headlessly with a scripted player
    Simulate {
        #[arg(long, default_value = "10")]
        rounds: usize,
        /// Overrides the persisted game mode
        #[arg(long)]
        mode: Option<ModeArg>,
        /// Chance the scripted player remembers each hidden word
        #[arg(long, default_value = "0.8")]
        skill: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    Set {
        #[arg(long)]
        mode: Option<ModeArg>,
        #[arg(long)]
        word_count: Option<u32>,
        #[arg(long)]
        hidden_count: Option<u32>,
        #[arg(long)]
        observation_time: Option<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Casual,
    Challenge,
}

impl From<ModeArg> for GameMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Casual => GameMode::Casual,
            ModeArg::Challenge => GameMode::Challenge,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LanguageArg {
    Chinese,
    English,
}

impl From<LanguageArg> for Language {
    fn from(l: LanguageArg) -> Self {
        match l {
            LanguageArg::Chinese => Language::Chinese,
            LanguageArg::English => Language::English,
        }
    }
}

fn word_source(settings: &EngineSettings) -> Result<LocalWordSource, String> {
    match &settings.words.pool {
        Some(path) => LocalWordSource::load(path),
        None => Ok(LocalWordSource::builtin()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => load_settings(path).map_err(|e| format!("Failed to load settings: {}", e))?,
        None => load_default_settings(),
    };
    let store = settings.config_store();

    match cli.command {
        Command::Config { action: ConfigAction::Show } => {
            let config = store.load();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Config {
            action: ConfigAction::Set { mode, word_count, hidden_count, observation_time },
        } => {
            let current = store.load();
            let update = ConfigUpdate {
                game_mode: mode.map(Into::into),
                word_count,
                hidden_count,
                observation_time,
            };
            let merged = merge(&current, update);
            if merged == current && !update.is_empty() {
                tracing::warn!("config unchanged");
            }
            if !store.save(&merged) {
                return Err(format!("Failed to save config: {:?}", validate(&merged).errors).into());
            }
            tracing::info!(path = %store.path().display(), "config saved");
            println!("{}", serde_json::to_string_pretty(&merged)?);
        }
        Command::Words { count, language, category, seed } => {
            let source = word_source(&settings)?;
            let query = WordQuery {
                count,
                language: language.map(Into::into).or(settings.words.language),
                difficulty: None,
                category: category.or_else(|| settings.words.category.clone()),
            };
            let mut rng = match seed.or(settings.seed) {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let words = source.get_words(&query, &mut rng).await?;
            for word in words {
                println!("{}\t{}", word.id, word.text);
            }
        }
        Command::Simulate { rounds, mode, skill, seed } => {
            let source = word_source(&settings)?;
            let mut config = store.load();
            if let Some(mode) = mode {
                config.game_mode = mode.into();
            }
            let seed = seed.or(settings.seed).unwrap_or(42);
            let filter = WordFilter {
                language: settings.words.language,
                difficulty: None,
                category: settings.words.category.clone(),
            };
            let mut game = MissingWordsGame::new(config)
                .with_seed(seed)
                .with_stage(settings.stage_size())
                .with_filter(filter)
                .with_notifier(Box::new(TracingNotifier));
            tracing::info!(rounds, ?config, "starting simulation");
            let summary = simulate_rounds(&mut game, &source, rounds, skill, seed).await;
            println!("{}", summary.summary());
        }
    }

    Ok(())
}
