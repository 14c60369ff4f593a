//! Inference engine boundary.
//!
//! Model loading, tokenization, generation and device placement all belong to
//! an external engine. This module only defines the seam (`InferenceEngine`)
//! and a subprocess-backed implementation that feeds the prepared input on
//! stdin and reads the translation from stdout.

use crate::config::Config;
use crate::router::ModelCategory;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Something that can run a seq2seq model over one input.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Generate a translation for `input` with the model stored in `model_dir`.
    ///
    /// `input` is already prepared (target tag applied where the category
    /// needs one).
    async fn generate(
        &self,
        category: ModelCategory,
        model_dir: &Path,
        input: &str,
    ) -> Result<String>;
}

/// GPU placement for the engine process.
///
/// Applied to the child environment only; the current process environment
/// is never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Value for `CUDA_VISIBLE_DEVICES`; `None` leaves it to the engine
    pub visible_devices: Option<String>,
    /// Value for `TF_FORCE_GPU_ALLOW_GROWTH`
    pub allow_growth: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            visible_devices: Some("0".to_string()),
            allow_growth: true,
        }
    }
}

impl DeviceConfig {
    fn apply(&self, command: &mut Command) {
        if let Some(devices) = &self.visible_devices {
            command.env("CUDA_VISIBLE_DEVICES", devices);
        }
        command.env(
            "TF_FORCE_GPU_ALLOW_GROWTH",
            if self.allow_growth { "true" } else { "false" },
        );
    }
}

/// Runs an external program once per translation.
///
/// Invocation: `<program> <args...> --model <dir> --max-length <n>`, prepared
/// input on stdin, translation on stdout.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    max_length: u32,
    device: DeviceConfig,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            max_length: 512,
            device: DeviceConfig::default(),
        }
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Build from config; `INFERENCE_COMMAND` is split on whitespace into
    /// program and leading arguments.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut parts = config.inference_command.split_whitespace().map(String::from);
        let program = parts.next().context("Inference command is empty")?;

        Ok(Self::new(program, parts.collect())
            .with_max_length(config.max_length)
            .with_device(config.device.clone()))
    }
}

#[async_trait]
impl InferenceEngine for CommandEngine {
    async fn generate(
        &self,
        category: ModelCategory,
        model_dir: &Path,
        input: &str,
    ) -> Result<String> {
        if !model_dir.exists() {
            bail!("Model directory not found: {}", model_dir.display());
        }

        info!("Loading {} model from {}", category, model_dir.display());

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--model")
            .arg(model_dir)
            .arg("--max-length")
            .arg(self.max_length.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        self.device.apply(&mut command);

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to start inference command '{}'", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .context("Failed to write input to inference command")?;
            // stdin dropped here so the engine sees EOF
        }

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for inference command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Inference command exited with {}: {}",
                output.status,
                stderr.trim()
            );
        }

        let translated = String::from_utf8(output.stdout)
            .context("Inference command produced non-UTF-8 output")?;
        debug!("Inference produced {} bytes", translated.len());

        Ok(translated.trim().to_string())
    }
}
