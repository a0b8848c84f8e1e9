mod config;
mod input;
mod parser;
mod remote;
mod speech;
mod study;
mod word;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use crate::config::{Config, ConfigOverrides};
use crate::input::WordSource;
use crate::remote::WordListClient;
use crate::speech::{CommandSynthesizer, SpeechSynthesizer};
use crate::study::{StudyContext, StudyOptions};
use crate::word::WordItem;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Study vocabulary lists from the terminal, with spoken pronunciation"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Optional path to a configuration TOML file overriding defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Language tag used for pronunciation, e.g. en-US
    #[arg(long)]
    lang: Option<String>,

    /// Speech rate, 1.0 is normal speed
    #[arg(long)]
    rate: Option<f32>,

    /// Text-to-speech program to use instead of auto-detecting one
    #[arg(long = "voice-command")]
    voice_command: Option<String>,

    /// Never pronounce words
    #[arg(long)]
    no_speech: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a word list and print its entries
    Show(ShowArgs),
    /// Pronounce a piece of text once
    Speak(SpeakArgs),
    /// Run an interactive study session over a word list
    Study(StudyArgs),
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Path or http(s) URL of a .txt (word=meaning) or .csv (word,meaning) list
    source: String,

    /// Print entries as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct SpeakArgs {
    /// Text to pronounce
    #[arg(name = "TEXT", required = true)]
    text: Vec<String>,
}

#[derive(Debug, Args)]
struct StudyArgs {
    /// Path or URL of the list; defaults to the list studied last
    source: Option<String>,

    /// Ask words in random order
    #[arg(long)]
    shuffle: bool,

    /// Ask at most this many words
    #[arg(long)]
    limit: Option<usize>,

    /// Write the progress report to this file instead of stdout
    #[arg(long = "progress-out")]
    progress_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    let overrides = ConfigOverrides {
        speech_lang: cli.lang.clone(),
        speech_rate: cli.rate,
        speech_command: cli.voice_command.clone(),
        disable_speech: cli.no_speech,
    };

    let config = Config::load(cli.config.clone(), overrides)?;

    match cli.command {
        Command::Show(args) => run_show(args).await?,
        Command::Speak(args) => run_speak(args, &config)?,
        Command::Study(args) => run_study(args, &config).await?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| anyhow::anyhow!("Failed to set tracing subscriber: {err}"))
}

fn build_synthesizer(config: &Config) -> Option<CommandSynthesizer> {
    if !config.speech_enabled {
        return None;
    }

    let synth = match &config.speech_command {
        Some(program) => Some(CommandSynthesizer::new(program)),
        None => CommandSynthesizer::detect(),
    };
    if let Some(synth) = &synth {
        tracing::debug!("Using speech program {}", synth.program().display());
    }
    synth
}

async fn load_words(source: &WordSource) -> Result<Vec<WordItem>> {
    let client = WordListClient::new()?;
    let words = source
        .load(&client)
        .await
        .with_context(|| format!("failed to load word list from {source}"))?;
    tracing::info!("Loaded {} words from {}", words.len(), source);
    Ok(words)
}

async fn run_show(args: ShowArgs) -> Result<()> {
    let source = WordSource::from_arg(&args.source);
    let words = load_words(&source).await?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&words).context("failed to serialize word list")?;
        println!("{json}");
        return Ok(());
    }

    let width = words
        .iter()
        .map(|item| item.word.chars().count())
        .max()
        .unwrap_or(0);
    for item in &words {
        println!("{:<width$}  {}", item.word, item.meaning);
    }

    Ok(())
}

fn run_speak(args: SpeakArgs, config: &Config) -> Result<()> {
    let text = args.text.join(" ");

    let Some(synth) = build_synthesizer(config).filter(|s| s.is_available()) else {
        tracing::warn!("No speech program available; nothing to pronounce.");
        return Ok(());
    };

    speech::speak(
        Some(&synth),
        &text,
        &config.speech_lang,
        config.speech_rate,
    )
    .with_context(|| format!("failed to pronounce '{text}'"))?;
    synth.wait()?;

    Ok(())
}

async fn run_study(args: StudyArgs, config: &Config) -> Result<()> {
    let raw_source = match args.source.or_else(|| config.last_source.clone()) {
        Some(source) => source,
        None => anyhow::bail!("no word list given; pass a path or URL to study"),
    };
    let source = WordSource::from_arg(&raw_source);

    let mut words = load_words(&source).await?;
    if words.is_empty() {
        anyhow::bail!("no words found in {source}; expected word=meaning or word,meaning lines");
    }

    let synth = build_synthesizer(config);
    if config.speech_enabled && synth.is_none() {
        tracing::warn!("No speech program found; words will not be pronounced.");
    }

    let ctx = StudyContext {
        config,
        speech: synth.as_ref().map(|s| s as &dyn SpeechSynthesizer),
    };
    let options = StudyOptions {
        shuffle: args.shuffle,
        limit: args.limit,
    };

    let report = study::run_study_session(&mut words, options, &ctx)?;
    study::print_summary(&report);

    let json = serde_json::to_string_pretty(&report).context("failed to serialize progress")?;
    match args.progress_out {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("failed to write progress to {}", path.display()))?;
            tracing::info!("Wrote progress report to {}", path.display());
        }
        None => println!("{json}"),
    }

    if let Err(e) = config.save_last_source(&raw_source) {
        tracing::warn!("Failed to save last source to config: {}", e);
    }

    Ok(())
}
