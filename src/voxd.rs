use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voxd::server::ServerContext;
use voxd::session::{RecordingSession, SessionOptions};
use voxd::{
    ConfigManager, CpalCapture, DEFAULT_LOG_LEVEL, VERSION, WhisperConfig, WhisperModel,
    WhisperTranscriber, ensure_model,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize the logger. All diagnostics go to stderr; the socket only
    // ever carries JSON responses.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("VOXD_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(version = VERSION, "voxd starting");

    // Load config
    let config_manager = ConfigManager::new()?;
    let config = config_manager.load()?;
    // save back the config to create the file if it doesn't exist
    config_manager.save(&config)?;

    // Set up the transcriber, fetching the model on first run
    let model = match config.model() {
        Some(name) => {
            WhisperModel::from_name(name).with_context(|| format!("Unknown model name: {name}"))?
        }
        None => WhisperModel::default(),
    };
    ensure_model(model).await?;

    let transcriber = WhisperTranscriber::new(WhisperConfig::new(model));
    transcriber
        .preload()
        .context("Failed to load whisper model")?;

    let session = RecordingSession::new(
        Box::new(CpalCapture::new()),
        Arc::new(transcriber),
        SessionOptions {
            beam_size: config.beam_size,
            language: Some(config.language().to_string()),
            save_recordings_dir: config.save_recordings_dir.clone(),
        },
    );

    // A bind failure is fatal: the daemon cannot serve without its socket.
    let mut server = ServerContext::bind(config.socket_path(), session)?;
    server.serve().await
}
