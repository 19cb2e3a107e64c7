//! Model management for local Whisper transcription.
//!
//! Handles locating and downloading the quantized ggml model files. The
//! q8 variants are the int8-style quantization the daemon defaults to.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use voxd_core::models_dir;

/// Base URL for downloading Whisper models from Hugging Face.
const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Available Whisper model variants, all with Q8 quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhisperModel {
    /// Tiny model (~44 MB)
    TinyQ8,
    /// Tiny English-only model (~44 MB)
    TinyEnQ8,
    /// Base model (~82 MB)
    BaseQ8,
    /// Base English-only model (~82 MB)
    BaseEnQ8,
    /// Small model (~264 MB) - default
    #[default]
    SmallQ8,
    /// Small English-only model (~264 MB)
    SmallEnQ8,
    /// Medium model (~823 MB)
    MediumQ8,
    /// Medium English-only model (~823 MB)
    MediumEnQ8,
}

impl WhisperModel {
    /// Returns the filename for this model.
    pub fn filename(&self) -> &'static str {
        match self {
            Self::TinyQ8 => "ggml-tiny-q8_0.bin",
            Self::TinyEnQ8 => "ggml-tiny.en-q8_0.bin",
            Self::BaseQ8 => "ggml-base-q8_0.bin",
            Self::BaseEnQ8 => "ggml-base.en-q8_0.bin",
            Self::SmallQ8 => "ggml-small-q8_0.bin",
            Self::SmallEnQ8 => "ggml-small.en-q8_0.bin",
            Self::MediumQ8 => "ggml-medium-q8_0.bin",
            Self::MediumEnQ8 => "ggml-medium.en-q8_0.bin",
        }
    }

    /// Returns the download URL for this model.
    pub fn url(&self) -> String {
        format!("{}/{}", MODEL_BASE_URL, self.filename())
    }

    /// Returns the approximate size of this model in bytes.
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::TinyQ8 | Self::TinyEnQ8 => 43_600_000,
            Self::BaseQ8 | Self::BaseEnQ8 => 81_800_000,
            Self::SmallQ8 | Self::SmallEnQ8 => 264_000_000,
            Self::MediumQ8 | Self::MediumEnQ8 => 823_000_000,
        }
    }

    /// Parses a model name string, e.g. "small", "tiny.en", "base-q8".
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "tiny-q8" | "tiny" => Some(Self::TinyQ8),
            "tiny-en-q8" | "tiny-en" | "tiny.en" => Some(Self::TinyEnQ8),
            "base-q8" | "base" => Some(Self::BaseQ8),
            "base-en-q8" | "base-en" | "base.en" => Some(Self::BaseEnQ8),
            "small-q8" | "small" => Some(Self::SmallQ8),
            "small-en-q8" | "small-en" | "small.en" => Some(Self::SmallEnQ8),
            "medium-q8" | "medium" => Some(Self::MediumQ8),
            "medium-en-q8" | "medium-en" | "medium.en" => Some(Self::MediumEnQ8),
            _ => None,
        }
    }
}

/// Returns the path where a model should be stored.
pub fn model_path(model: WhisperModel) -> Result<PathBuf> {
    Ok(models_dir()?.join(model.filename()))
}

/// Checks if a model exists locally.
pub fn model_exists(model: WhisperModel) -> Result<bool> {
    let path = model_path(model)?;
    Ok(path.exists())
}

/// Downloads a model to the local models directory.
pub async fn download_model(model: WhisperModel) -> Result<PathBuf> {
    let path = model_path(model)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create models directory: {:?}", parent))?;
    }

    let url = model.url();
    info!(model = ?model, url = %url, "Downloading Whisper model");

    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("Failed to start download from {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Failed to download model: HTTP {}", response.status());
    }

    let total_size = response.content_length().unwrap_or(model.size_bytes());

    // Download to a temporary file first, then rename
    let temp_path = path.with_extension("bin.tmp");
    let mut file = File::create(&temp_path)
        .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;

    let mut downloaded: u64 = 0;
    let mut last_logged_pct: u64 = 0;
    let mut stream = response.bytes_stream();

    use futures_util::StreamExt;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Failed to read chunk during download")?;
        file.write_all(&chunk)
            .context("Failed to write chunk to file")?;
        downloaded += chunk.len() as u64;

        let pct = downloaded * 100 / total_size.max(1);
        if pct >= last_logged_pct + 10 {
            last_logged_pct = pct;
            debug!(downloaded, total_size, pct, "Download progress");
        }
    }

    file.flush().context("Failed to flush file")?;
    drop(file);

    fs::rename(&temp_path, &path)
        .with_context(|| format!("Failed to rename {:?} to {:?}", temp_path, path))?;

    info!(path = ?path, "Model download complete");
    Ok(path)
}

/// Ensures a model is available locally, downloading it if necessary.
///
/// Returns the path to the model file.
pub async fn ensure_model(model: WhisperModel) -> Result<PathBuf> {
    if model_exists(model)? {
        debug!(model = ?model, "Model already exists locally");
        return model_path(model);
    }

    warn!(
        model = ?model,
        size_bytes = model.size_bytes(),
        "Model not found locally, downloading..."
    );

    download_model(model).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_from_name() {
        assert_eq!(
            WhisperModel::from_name("small"),
            Some(WhisperModel::SmallQ8)
        );
        assert_eq!(
            WhisperModel::from_name("SMALL-Q8"),
            Some(WhisperModel::SmallQ8)
        );
        assert_eq!(
            WhisperModel::from_name("tiny.en"),
            Some(WhisperModel::TinyEnQ8)
        );
        assert_eq!(WhisperModel::from_name("gigantic"), None);
    }

    #[test]
    fn test_default_model() {
        assert_eq!(WhisperModel::default(), WhisperModel::SmallQ8);
    }

    #[test]
    fn test_model_url() {
        let url = WhisperModel::BaseQ8.url();
        assert!(url.starts_with("https://"));
        assert!(url.ends_with("ggml-base-q8_0.bin"));
    }
}
