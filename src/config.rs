use crate::inference::DeviceConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Model storage
    pub models_dir: PathBuf,
    pub model_base_url: String,

    // Inference
    pub inference_command: String,
    pub max_length: u32,
    pub device: DeviceConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let inference_command = std::env::var("INFERENCE_COMMAND")
            .unwrap_or_else(|_| "indictrans2-generate".to_string());
        if inference_command.trim().is_empty() {
            anyhow::bail!("INFERENCE_COMMAND must not be empty");
        }

        let model_base_url = std::env::var("MODEL_BASE_URL")
            .unwrap_or_else(|_| "https://huggingface.co/ai4bharat".to_string());
        reqwest::Url::parse(&model_base_url)
            .with_context(|| format!("MODEL_BASE_URL is not a valid URL: {}", model_base_url))?;

        Ok(Self {
            // Model storage
            models_dir: std::env::var("TRANSLATION_MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models/translation")),
            model_base_url: model_base_url.trim_end_matches('/').to_string(),

            // Inference
            inference_command,
            max_length: std::env::var("INFERENCE_MAX_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(512),
            device: DeviceConfig {
                // Empty string means "leave device visibility to the engine"
                visible_devices: match std::env::var("TRANSLATION_GPU_DEVICES") {
                    Ok(v) if v.trim().is_empty() => None,
                    Ok(v) => Some(v),
                    Err(_) => Some("0".to_string()),
                },
                allow_growth: std::env::var("TRANSLATION_GPU_ALLOW_GROWTH")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(true),
            },
        })
    }
}
