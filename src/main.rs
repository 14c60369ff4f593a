use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use indic_translate::config::Config;
use indic_translate::i18n::{LanguageRegistry, ENGLISH_CODE};
use indic_translate::inference::CommandEngine;
use indic_translate::models::{ModelDownloader, ModelStore};
use indic_translate::translation::{TranslationMode, TranslationRequest, Translator};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "indic-translate", version)]
#[command(about = "Translate text into Indian languages using IndicTrans2 models")]
struct Cli {
    /// Text to translate
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Input file path (one text per line)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Target language code (e.g., 'hin_Deva')
    #[arg(long, alias = "target_lang")]
    target_lang: Option<String>,

    /// Source language code
    #[arg(long, alias = "source_lang", default_value = ENGLISH_CODE)]
    source_lang: String,

    /// Output file path (for file translation)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Translation mode
    #[arg(long, value_enum, default_value_t = Mode::Auto)]
    mode: Mode,

    /// Download the models
    #[arg(long)]
    download: bool,

    /// Check if models are available
    #[arg(long)]
    check: bool,

    /// List supported languages
    #[arg(long, alias = "list_languages")]
    list_languages: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Use the models when any is installed, placeholder output otherwise
    Auto,
    /// Always use the models
    Model,
    /// Always produce placeholder output
    Simulate,
}

impl Mode {
    fn resolve(self, store: &ModelStore) -> TranslationMode {
        match self {
            Mode::Model => TranslationMode::ModelBacked,
            Mode::Simulate => TranslationMode::Placeholder,
            Mode::Auto if store.availability().available => TranslationMode::ModelBacked,
            Mode::Auto => {
                info!("No translation models installed, using placeholder translations");
                TranslationMode::Placeholder
            }
        }
    }
}

/// Print an argument error plus help and exit with status 1.
fn usage_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    let _ = Cli::command().print_help();
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries only translation output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("indic_translate=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_languages {
        let languages = LanguageRegistry::get().list_all();
        println!("{}", serde_json::to_string_pretty(languages)?);
        return Ok(());
    }

    let config = Config::from_env()?;
    let store = ModelStore::new(&config.models_dir);

    if cli.check {
        println!("{}", serde_json::to_string_pretty(&store.availability())?);
        return Ok(());
    }

    if cli.download {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        ModelDownloader::new(client, config.model_base_url.as_str())
            .download_all(&store)
            .await?;
        return Ok(());
    }

    if let Some(target_lang) = &cli.target_lang {
        if !LanguageRegistry::get().is_supported(target_lang) {
            warn!("Unknown target language code '{}'", target_lang);
        }
    }

    let mode = cli.mode.resolve(&store);
    let translator = Translator::new(store, CommandEngine::from_config(&config)?);

    if let Some(text) = &cli.text {
        let Some(target_lang) = &cli.target_lang else {
            usage_error("--target-lang is required when translating text");
        };

        let request = TranslationRequest::new(text, target_lang)
            .with_source(&cli.source_lang)
            .with_mode(mode);
        match translator.translate(&request).await {
            Ok(translated) => println!("{}", translated),
            Err(e) => {
                println!("ERROR: {}", e);
                std::process::exit(1);
            }
        }
    } else if let Some(file) = &cli.file {
        let (Some(target_lang), Some(output)) = (&cli.target_lang, &cli.output) else {
            usage_error("--target-lang and --output are required when translating a file");
        };

        if let Err(e) = translator
            .translate_file(file, output, &cli.source_lang, target_lang, mode)
            .await
        {
            println!("ERROR: {:#}", e);
            std::process::exit(1);
        }
    } else {
        Cli::command().print_help()?;
    }

    Ok(())
}
