//! On-disk IndicTrans2 models: availability checks and downloads.
//!
//! Layout: one directory per `ModelCategory` under the models root, e.g.
//! `models/translation/en-indic/config.json`.

use crate::retry::{with_retry_if, RetryConfig};
use crate::router::ModelCategory;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Files that must be present for a model to count as installed.
pub const REQUIRED_FILES: &[&str] = &["config.json", "pytorch_model.bin"];

/// Tokenizer and generation files fetched when the repository has them.
pub const OPTIONAL_FILES: &[&str] = &[
    "generation_config.json",
    "tokenizer_config.json",
    "special_tokens_map.json",
    "dict.SRC.json",
    "dict.TGT.json",
    "model.SRC",
    "model.TGT",
];

const MANIFEST_FILE: &str = ".download.json";

/// Availability report, keyed by category directory name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAvailability {
    pub available: bool,
    pub models: BTreeMap<String, bool>,
    pub models_dir: PathBuf,
}

impl ModelAvailability {
    pub fn is_available(&self, category: ModelCategory) -> bool {
        self.models
            .get(category.dir_name())
            .copied()
            .unwrap_or(false)
    }
}

/// Record written next to a model once all of its files are in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadManifest {
    pub category: ModelCategory,
    pub repository: String,
    pub files: Vec<String>,
    pub downloaded_at: DateTime<Utc>,
}

/// The models root directory.
#[derive(Debug, Clone)]
pub struct ModelStore {
    models_dir: PathBuf,
}

impl ModelStore {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn model_dir(&self, category: ModelCategory) -> PathBuf {
        self.models_dir.join(category.dir_name())
    }

    /// A model is installed when its directory holds every required file.
    pub fn is_installed(&self, category: ModelCategory) -> bool {
        let dir = self.model_dir(category);
        REQUIRED_FILES.iter().all(|file| dir.join(file).is_file())
    }

    /// Where a download of `category` is assembled before it is moved into place.
    fn staging_dir(&self, category: ModelCategory) -> PathBuf {
        self.models_dir.join(format!(".{}.partial", category.dir_name()))
    }

    pub fn availability(&self) -> ModelAvailability {
        if !self.models_dir.is_dir() {
            return ModelAvailability {
                available: false,
                models: BTreeMap::new(),
                models_dir: self.models_dir.clone(),
            };
        }

        let models: BTreeMap<String, bool> = ModelCategory::ALL
            .iter()
            .map(|category| (category.dir_name().to_string(), self.is_installed(*category)))
            .collect();

        ModelAvailability {
            available: models.values().any(|present| *present),
            models,
            models_dir: self.models_dir.clone(),
        }
    }

    pub fn read_manifest(&self, category: ModelCategory) -> Result<DownloadManifest> {
        let path = self.model_dir(category).join(MANIFEST_FILE);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Invalid manifest {}", path.display()))
    }
}

/// Outcome of downloading one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    AlreadyInstalled,
    Downloaded,
}

/// Error from a single file fetch, classified for retry decisions.
#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("file not found (404)")]
    NotFound,
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Retry network errors, 429 and 5xx; other 4xx and local I/O errors are final.
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::NotFound | FetchError::Io(_) => false,
            FetchError::Status(status) => {
                *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            FetchError::Transport(_) => true,
        }
    }
}

/// Downloads model repositories file by file.
pub struct ModelDownloader {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
    show_progress: bool,
}

impl ModelDownloader {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryConfig::model_download(),
            show_progress: true,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn file_url(&self, category: ModelCategory, file: &str) -> String {
        format!(
            "{}/{}/resolve/main/{}",
            self.base_url,
            category.repo_name(),
            file
        )
    }

    /// Download every category that is not installed yet.
    pub async fn download_all(
        &self,
        store: &ModelStore,
    ) -> Result<Vec<(ModelCategory, DownloadStatus)>> {
        tokio::fs::create_dir_all(store.models_dir())
            .await
            .with_context(|| {
                format!(
                    "Failed to create models directory {}",
                    store.models_dir().display()
                )
            })?;

        let mut outcomes = Vec::with_capacity(ModelCategory::ALL.len());
        for category in ModelCategory::ALL {
            let status = self.download(store, category).await?;
            outcomes.push((category, status));
        }

        info!("All models downloaded successfully");
        Ok(outcomes)
    }

    /// Download one category's model unless it is already installed.
    ///
    /// Files are fetched into a staging directory next to the model directory
    /// and moved into place only after every file and the manifest are written,
    /// so a failed download never counts as installed.
    pub async fn download(
        &self,
        store: &ModelStore,
        category: ModelCategory,
    ) -> Result<DownloadStatus> {
        let model_dir = store.model_dir(category);
        if store.is_installed(category) {
            match store.read_manifest(category) {
                Ok(manifest) => info!(
                    "Model '{}' already exists at {} (downloaded {})",
                    category,
                    model_dir.display(),
                    manifest.downloaded_at.format("%Y-%m-%d %H:%M UTC")
                ),
                Err(_) => info!(
                    "Model '{}' already exists at {}",
                    category,
                    model_dir.display()
                ),
            }
            return Ok(DownloadStatus::AlreadyInstalled);
        }

        info!("Downloading {} model from {}", category, category.repo_name());
        let staging = store.staging_dir(category);
        if tokio::fs::try_exists(&staging).await.unwrap_or(false) {
            debug!("Removing stale staging directory {}", staging.display());
            tokio::fs::remove_dir_all(&staging)
                .await
                .with_context(|| format!("Failed to remove {}", staging.display()))?;
        }
        tokio::fs::create_dir_all(&staging)
            .await
            .with_context(|| format!("Failed to create {}", staging.display()))?;

        if let Err(e) = self.fetch_all(category, &staging).await {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&staging).await {
                warn!("Failed to remove {}: {}", staging.display(), cleanup);
            }
            return Err(e);
        }

        // An incomplete directory left behind by hand or by an older run
        if tokio::fs::try_exists(&model_dir).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&model_dir)
                .await
                .with_context(|| format!("Failed to replace {}", model_dir.display()))?;
        }
        tokio::fs::rename(&staging, &model_dir)
            .await
            .with_context(|| format!("Failed to move model into {}", model_dir.display()))?;

        info!(
            "Model '{}' downloaded to {}",
            category,
            model_dir.display()
        );
        Ok(DownloadStatus::Downloaded)
    }

    /// Fetch every file of `category` into `dir`, then write the manifest.
    async fn fetch_all(&self, category: ModelCategory, dir: &Path) -> Result<()> {
        let mut fetched = Vec::new();

        for file in REQUIRED_FILES {
            self.fetch_with_retry(category, file, dir)
                .await
                .with_context(|| format!("Failed to download {} for {}", file, category))?;
            fetched.push(file.to_string());
        }

        for file in OPTIONAL_FILES {
            match self.fetch_with_retry(category, file, dir).await {
                Ok(()) => fetched.push(file.to_string()),
                Err(FetchError::NotFound) => {
                    debug!("Skipped optional {} for {} (not in repository)", file, category)
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to download {} for {}", file, category))
                }
            }
        }

        let manifest = DownloadManifest {
            category,
            repository: category.repo_name().to_string(),
            files: fetched,
            downloaded_at: Utc::now(),
        };
        let manifest_path = dir.join(MANIFEST_FILE);
        tokio::fs::write(&manifest_path, serde_json::to_vec_pretty(&manifest)?)
            .await
            .with_context(|| format!("Failed to write {}", manifest_path.display()))?;
        Ok(())
    }

    async fn fetch_with_retry(
        &self,
        category: ModelCategory,
        file: &str,
        model_dir: &Path,
    ) -> std::result::Result<(), FetchError> {
        let url = self.file_url(category, file);
        let dest = model_dir.join(file);

        with_retry_if(
            &self.retry,
            &format!("Download {}/{}", category, file),
            || self.fetch(&url, file, &dest),
            FetchError::is_retryable,
        )
        .await
    }

    /// Stream one file to `<dest>.part`, then rename it into place.
    ///
    /// The `.part` file is removed if streaming or the rename fails.
    async fn fetch(
        &self,
        url: &str,
        file: &str,
        dest: &Path,
    ) -> std::result::Result<(), FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let progress = self.progress_bar(file, response.content_length());
        let part = dest.with_file_name(format!("{}.part", file));

        let mut result = Self::write_part(response, &part, &progress).await;
        if result.is_ok() {
            result = tokio::fs::rename(&part, dest).await.map_err(FetchError::from);
        }
        progress.finish_and_clear();

        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&part).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove {}: {}", part.display(), e);
                }
            }
        }
        result
    }

    async fn write_part(
        response: reqwest::Response,
        part: &Path,
        progress: &ProgressBar,
    ) -> std::result::Result<(), FetchError> {
        let mut out = tokio::fs::File::create(part).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            out.write_all(&chunk).await?;
            progress.inc(chunk.len() as u64);
        }
        out.flush().await?;
        Ok(())
    }

    fn progress_bar(&self, file: &str, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = match total {
            Some(total) => {
                let style = ProgressStyle::default_bar()
                    .template("{msg} [{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec})")
                    .unwrap_or_else(|e| {
                        warn!("Invalid progress template: {}", e);
                        ProgressStyle::default_bar()
                    })
                    .progress_chars("=>-");
                ProgressBar::new(total).with_style(style)
            }
            None => ProgressBar::new_spinner(),
        };
        bar.set_message(file.to_string());
        bar
    }
}
