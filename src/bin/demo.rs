//! Demo binary - runs the indic-translate CLI for a handful of languages
//!
//! Usage:
//!   cargo run --bin translation-demo
//!
//! Optional:
//! - INDIC_TRANSLATE_BIN (path to the indic-translate binary; defaults to the
//!   binary next to this one)

use anyhow::{Context, Result};
use indic_translate::models::ModelAvailability;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

const SAMPLE_NOTICE: &str = "PRIVACY NOTICE\n\n\
This privacy notice explains how we collect, use, store, and protect your personal data \
when you use our services. We are committed to ensuring your privacy rights are respected \
in accordance with applicable data protection laws.\n\n\
Data Collection: We collect information you provide directly to us, such as when you \
create an account, make a request, or contact us for support.\n\n\
Data Usage: We use your personal data to provide and improve our services, respond to \
your inquiries, and comply with legal obligations.\n\n\
Data Protection: We implement appropriate technical and organizational measures to \
protect your personal data against unauthorized access, alteration, disclosure, or destruction.";

const DEMO_LANGUAGES: &[(&str, &str)] = &[
    ("hin_Deva", "Hindi"),
    ("tam_Taml", "Tamil"),
    ("ben_Beng", "Bengali"),
    ("mal_Mlym", "Malayalam"),
    ("guj_Gujr", "Gujarati"),
    ("tel_Telu", "Telugu"),
];

const TRANSLATION_TIMEOUT: Duration = Duration::from_secs(30);

/// First `n` characters of `text`.
fn head(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

fn cli_binary() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("INDIC_TRANSLATE_BIN") {
        return Ok(PathBuf::from(path));
    }

    let exe = std::env::current_exe().context("Failed to locate demo executable")?;
    let dir = exe
        .parent()
        .context("Demo executable has no parent directory")?;
    Ok(dir.join(format!("indic-translate{}", std::env::consts::EXE_SUFFIX)))
}

/// Run the CLI; `Ok(None)` means it did not finish within the timeout.
async fn run_cli(binary: &Path, args: &[&str]) -> Result<Option<Output>> {
    debug!("Running {} {:?}", binary.display(), args);
    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    match timeout(TRANSLATION_TIMEOUT, output).await {
        Ok(result) => Ok(Some(result.with_context(|| {
            format!("Failed to run {}", binary.display())
        })?)),
        Err(_) => Ok(None),
    }
}

async fn print_model_status(binary: &Path) -> Result<()> {
    let output = run_cli(binary, &["--check"])
        .await?
        .context("Model check timed out")?;
    if !output.status.success() {
        anyhow::bail!("Model check exited with {}", output.status);
    }

    let status: ModelAvailability =
        serde_json::from_slice(&output.stdout).context("Failed to parse model status")?;

    println!("\n🔧 Model Status:");
    println!(
        "   Models Ready: {}",
        if status.available {
            "✅"
        } else {
            "⚠️ Simulation Mode"
        }
    );
    for (model_type, available) in &status.models {
        let label = if *available {
            "✅ Ready"
        } else {
            "📥 Download Required"
        };
        println!("   {}: {}", model_type, label);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_demo=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let binary = cli_binary()?;

    println!("🌟 IndicTrans2 Translation System Demo");
    println!("{}", "=".repeat(50));

    println!("\n📋 Original Notice (English):");
    println!("{}", "-".repeat(30));
    println!("{}...", head(SAMPLE_NOTICE, 200));

    println!(
        "\n🔄 Translating to {} Indian Languages:",
        DEMO_LANGUAGES.len()
    );
    println!("{}", "-".repeat(50));

    let input = head(SAMPLE_NOTICE, 300);
    for &(code, name) in DEMO_LANGUAGES {
        let args = ["--text", input.as_str(), "--target-lang", code];
        match run_cli(&binary, &args).await {
            Ok(Some(output)) if output.status.success() => {
                let translated = String::from_utf8_lossy(&output.stdout);
                println!("\n🌐 {} ({}):", name, code);
                println!("   {}...", head(translated.trim(), 150));
            }
            Ok(Some(_)) => println!("\n❌ {}: Translation failed", name),
            Ok(None) => println!("\n⏰ {}: Translation timeout", name),
            Err(e) => println!("\n❌ {}: Error - {:#}", name, e),
        }
    }

    println!("\n{}", "=".repeat(50));
    println!("✅ Translation Demo Complete!");
    println!("\n📊 System Capabilities:");
    println!("   • 22 Indian languages supported");
    println!("   • Model-backed translation via IndicTrans2");
    println!("   • Model downloads with progress tracking");
    println!("   • Both simulation and actual model modes");

    if let Err(e) = print_model_status(&binary).await {
        debug!("Model status check failed: {:#}", e);
        println!("\n🔧 Model Status: Unable to check");
    }

    Ok(())
}
