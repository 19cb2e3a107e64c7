//! Microphone capture via cpal.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Host, SampleRate, StreamConfig};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{error, info, warn};
use voxd_core::{CHANNELS, SAMPLE_RATE};

#[derive(Debug, Error)]
pub enum CaptureError {
    /// No recording device available
    #[error("no input device available")]
    NoInputDevice,
    /// A capture stream is already running
    #[error("capture stream already active")]
    AlreadyActive,
    /// Build stream error
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),
    /// Stream refused to start
    #[error(transparent)]
    Play(#[from] cpal::PlayStreamError),
}

/// One batch of samples delivered by a single capture callback invocation.
pub type Chunk = Vec<f32>;

/// Accumulated chunks of the recording in progress. The capture callback is
/// the only writer; the owner must not read until after [`AudioCapture::stop`]
/// has returned.
pub type ChunkSink = Arc<Mutex<Vec<Chunk>>>;

/// Creates an empty chunk sink.
pub fn chunk_sink() -> ChunkSink {
    Arc::new(Mutex::new(Vec::new()))
}

/// Capability boundary for audio capture.
///
/// `start` begins delivering chunks into `sink` from the capture subsystem's
/// own delivery context; `stop` synchronously releases the stream, after
/// which no further chunks are appended.
pub trait AudioCapture {
    fn start(&mut self, sink: ChunkSink) -> Result<(), CaptureError>;
    fn stop(&mut self) -> Result<(), CaptureError>;
}

/// Capture backed by the default cpal input device, configured for 16 kHz
/// mono f32 as the transcriber expects.
pub struct CpalCapture {
    host: Host,
    stream: Option<cpal::Stream>,
}

impl CpalCapture {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
            stream: None,
        }
    }
}

impl Default for CpalCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCapture for CpalCapture {
    fn start(&mut self, sink: ChunkSink) -> Result<(), CaptureError> {
        if self.stream.is_some() {
            return Err(CaptureError::AlreadyActive);
        }

        let device = self
            .host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;

        info!(
            device_name = %device.name().unwrap_or_else(|_| "<unknown>".into()),
            sample_rate = SAMPLE_RATE,
            channels = CHANNELS,
            "Recording from device"
        );

        let config = StreamConfig {
            channels: CHANNELS,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: BufferSize::Default,
        };

        // Stream errors are diagnostic only; they must never surface as a
        // command response.
        let err_fn = |err| {
            error!("an error occurred on stream: {}", err);
        };

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| append_chunk(data, &sink),
            err_fn,
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        if let Some(stream) = self.stream.take() {
            // Dropping the stream releases the device; a failed pause is
            // not worth surfacing to the client.
            stream.pause().ok();
            drop(stream);
        }
        Ok(())
    }
}

/// Runs in the capture delivery context: append only, never block. The sink
/// lock is uncontended while recording, so a failed try_lock can only mean
/// the stream is being torn down.
fn append_chunk(data: &[f32], sink: &ChunkSink) {
    if let Some(mut chunks) = sink.try_lock() {
        chunks.push(data.to_vec());
    } else {
        warn!(samples = data.len(), "chunk sink busy, dropping chunk");
    }
}
