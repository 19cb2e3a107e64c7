//! Local Whisper transcription using whisper-rs.
//!
//! Wraps the whisper.cpp library behind the [`Transcriber`] trait. The
//! context is loaded once and reused for every recording.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::model::{WhisperModel, model_path};
use crate::{Result, Segment, TranscribeError, Transcriber};

/// Configuration for the local Whisper transcriber.
#[derive(Debug, Clone, Default)]
pub struct WhisperConfig {
    /// The model to use.
    pub model: WhisperModel,
    /// Optional override path to the model file.
    pub model_path: Option<PathBuf>,
}

impl WhisperConfig {
    /// Create a new config with the specified model.
    pub fn new(model: WhisperModel) -> Self {
        Self {
            model,
            model_path: None,
        }
    }

    /// Create a config with a custom model path.
    pub fn with_model_path(mut self, path: PathBuf) -> Self {
        self.model_path = Some(path);
        self
    }
}

/// Local Whisper transcriber using whisper.cpp on the CPU.
pub struct WhisperTranscriber {
    config: WhisperConfig,
    /// Lazily initialized whisper context.
    context: Mutex<Option<WhisperContext>>,
}

impl WhisperTranscriber {
    /// Create a new transcriber. The model is not loaded until the first
    /// transcription or a call to [`preload`](Self::preload).
    pub fn new(config: WhisperConfig) -> Self {
        Self {
            config,
            context: Mutex::new(None),
        }
    }

    /// Loads the model eagerly so the first toggle does not pay the cost.
    pub fn preload(&self) -> Result<()> {
        self.ensure_context().map(|_| ())
    }

    /// Get or initialize the whisper context, returning a guard.
    fn ensure_context(&self) -> Result<std::sync::MutexGuard<'_, Option<WhisperContext>>> {
        let mut guard = self.context.lock().map_err(|e| {
            TranscribeError::TranscriptionFailed(format!("Failed to lock context: {}", e))
        })?;
        if guard.is_none() {
            let path = match &self.config.model_path {
                Some(p) => p.clone(),
                None => model_path(self.config.model)
                    .map_err(|e| TranscribeError::ModelNotAvailable(e.to_string()))?,
            };

            info!(model = ?self.config.model, path = ?path, "Loading Whisper model");

            let ctx = WhisperContext::new_with_params(
                path.to_str().ok_or_else(|| {
                    TranscribeError::ModelNotAvailable("Invalid model path".to_string())
                })?,
                WhisperContextParameters::default(),
            )
            .map_err(|e| {
                TranscribeError::ModelNotAvailable(format!("Failed to load model: {}", e))
            })?;

            info!("Whisper model loaded");
            *guard = Some(ctx);
        }
        Ok(guard)
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(
        &self,
        samples: &[f32],
        beam_size: u32,
        language: Option<&str>,
    ) -> Result<Vec<Segment>> {
        debug!(
            samples = samples.len(),
            beam_size,
            language = ?language,
            "Transcribing recording"
        );

        // Get the context (ensures model is loaded)
        let context = self.ensure_context()?;
        let ctx = context.as_ref().expect("context should be initialized");

        // Create a new state for this transcription
        let mut state = ctx.create_state().map_err(|e| {
            TranscribeError::TranscriptionFailed(format!("Failed to create state: {}", e))
        })?;

        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: beam_size as i32,
            patience: -1.0,
        });

        // None means auto-detect
        params.set_language(language);

        // Disable printing to stdout
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state.full(params, samples).map_err(|e| {
            TranscribeError::TranscriptionFailed(format!("Transcription failed: {}", e))
        })?;

        let num_segments = state.full_n_segments().map_err(|e| {
            TranscribeError::TranscriptionFailed(format!("Failed to get segments: {}", e))
        })?;

        let mut segments = Vec::with_capacity(num_segments as usize);
        for i in 0..num_segments {
            let text = state.full_get_segment_text(i).map_err(|e| {
                TranscribeError::TranscriptionFailed(format!("Failed to get segment {}: {}", i, e))
            })?;
            segments.push(Segment { text });
        }

        Ok(segments)
    }

    fn name(&self) -> &str {
        "whisper"
    }
}
