//! The recording session: owns the toggle state machine and the audio
//! captured between a start toggle and the matching stop.
//!
//! The session is only ever driven from the command loop, one toggle at a
//! time. The capture callback appends chunks concurrently while recording,
//! but the session reads them only after the stream has been synchronously
//! stopped, so the handoff needs no coordination beyond the sink lock.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::{info, warn};
use voxd_audio::{AudioCapture, ChunkSink, chunk_sink, write_wav};
use voxd_core::{Response, SessionState};
use voxd_transcribe::Transcriber;

/// Fixed parameters applied to every recording.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Beam width passed to the transcriber
    pub beam_size: u32,
    /// Language hint passed to the transcriber
    pub language: Option<String>,
    /// Dump finished recordings here as WAV files when set
    pub save_recordings_dir: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            beam_size: 5,
            language: Some("en".to_string()),
            save_recordings_dir: None,
        }
    }
}

/// A single recording session, alternating between idle and recording on
/// each toggle.
pub struct RecordingSession {
    state: SessionState,
    chunks: ChunkSink,
    capture: Box<dyn AudioCapture>,
    transcriber: Arc<dyn Transcriber>,
    options: SessionOptions,
}

impl RecordingSession {
    pub fn new(
        capture: Box<dyn AudioCapture>,
        transcriber: Arc<dyn Transcriber>,
        options: SessionOptions,
    ) -> Self {
        Self {
            state: SessionState::Idle,
            chunks: chunk_sink(),
            capture,
            transcriber,
            options,
        }
    }

    /// The current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Starts recording if idle, otherwise stops and transcribes.
    pub async fn toggle(&mut self) -> Result<Response> {
        match self.state {
            SessionState::Idle => self.start_recording(),
            SessionState::Recording => self.stop_and_transcribe().await,
        }
    }

    fn start_recording(&mut self) -> Result<Response> {
        self.chunks.lock().clear();
        self.capture
            .start(self.chunks.clone())
            .context("Failed to start audio capture")?;
        self.state = SessionState::Recording;
        info!("Recording...");
        Ok(Response::recording())
    }

    async fn stop_and_transcribe(&mut self) -> Result<Response> {
        // Transition before inspecting the stop result: even a failed stop
        // must leave the session idle with the capture handle released.
        self.state = SessionState::Idle;
        let stopped = self.capture.stop();
        let chunks = std::mem::take(&mut *self.chunks.lock());
        stopped.context("Failed to stop audio capture")?;
        info!(chunks = chunks.len(), "Recording stopped. Transcribing...");

        if chunks.is_empty() {
            info!("No audio captured.");
            return Ok(Response::done(""));
        }

        let samples = chunks.concat();
        self.dump_recording(&samples);

        let segments = self
            .transcriber
            .transcribe(
                &samples,
                self.options.beam_size,
                self.options.language.as_deref(),
            )
            .await
            .context("Transcription failed")?;

        let text = segments
            .iter()
            .map(|segment| segment.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        info!("Transcribed: {}", text);
        Ok(Response::done(text))
    }

    /// Stops any active capture stream. Idempotent; called on every server
    /// exit path.
    pub fn shutdown(&mut self) {
        if self.state == SessionState::Recording {
            if let Err(e) = self.capture.stop() {
                warn!("Failed to stop capture during shutdown: {}", e);
            }
            self.state = SessionState::Idle;
        }
    }

    fn dump_recording(&self, samples: &[f32]) {
        let Some(dir) = &self.options.save_recordings_dir else {
            return;
        };
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = dir.join(format!("recording-{stamp}.wav"));
        match write_wav(&path, samples) {
            Ok(()) => info!(path = ?path, "Saved recording"),
            Err(e) => warn!("Failed to save recording: {:#}", e),
        }
    }

    #[cfg(test)]
    fn pending_chunks(&self) -> usize {
        self.chunks.lock().len()
    }
}
