// Re-export from sub-crates
pub use voxd_audio::{AudioCapture, CaptureError, Chunk, ChunkSink, CpalCapture, chunk_sink, write_wav};
pub use voxd_core::{
    APP_NAME, CHANNELS, Command, Config, ConfigManager, DEFAULT_LOG_LEVEL, DEFAULT_SOCKET_PATH,
    MAX_COMMAND_BYTES, Reply, Response, SAMPLE_RATE, SessionState,
};
pub use voxd_transcribe::{
    Segment, TranscribeError, Transcriber, WhisperConfig, WhisperModel, WhisperTranscriber,
    ensure_model,
};

// App-specific modules
pub mod server;
pub mod session;

// Version from this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
