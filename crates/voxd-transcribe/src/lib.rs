//! Transcription backend library for voxd.
//!
//! This crate provides a trait-based abstraction for audio transcription,
//! with a local Whisper implementation via whisper-rs.

mod model;
mod whisper;

use async_trait::async_trait;
pub use model::{WhisperModel, download_model, ensure_model, model_exists, model_path};
use thiserror::Error;
pub use whisper::{WhisperConfig, WhisperTranscriber};

/// Errors that can occur during transcription.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("model not available: {0}")]
    ModelNotAvailable(String),

    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
}

/// Result type for transcription operations.
pub type Result<T> = std::result::Result<T, TranscribeError>;

/// One decoded segment of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
}

impl Segment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Capability boundary for transcription backends.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a buffer of 16 kHz mono f32 samples to text segments.
    ///
    /// # Arguments
    /// * `samples` - Concatenated audio samples of one recording
    /// * `beam_size` - Search beam width for the decoder
    /// * `language` - Optional language hint (ISO 639-1 code, e.g. "en")
    async fn transcribe(
        &self,
        samples: &[f32],
        beam_size: u32,
        language: Option<&str>,
    ) -> Result<Vec<Segment>>;

    /// Returns the name of this transcriber for logging/debugging.
    fn name(&self) -> &str;
}
