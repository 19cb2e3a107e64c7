//! Unix socket command server and process lifecycle.
//!
//! One connection is handled to completion before the next is accepted, so
//! the session is never mutated concurrently. A bad command or a failed
//! capability call is reported to that one client and never terminates the
//! accept loop.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info, warn};
use voxd_core::{Command, MAX_COMMAND_BYTES, Response};

use crate::session::RecordingSession;

/// Owns all process-wide state: the recording session and the rendezvous
/// socket. Passed around explicitly instead of living in module-level
/// singletons.
pub struct ServerContext {
    session: RecordingSession,
    listener: Option<UnixListener>,
    socket_path: PathBuf,
}

impl ServerContext {
    /// Binds the rendezvous socket, replacing any stale artifact from a
    /// previous run, and opens it up to other local processes.
    pub fn bind(socket_path: impl Into<PathBuf>, session: RecordingSession) -> Result<Self> {
        let socket_path = socket_path.into();

        if socket_path.exists() {
            fs::remove_file(&socket_path)
                .with_context(|| format!("Failed to remove stale socket {:?}", socket_path))?;
        }

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind {:?}", socket_path))?;
        fs::set_permissions(&socket_path, fs::Permissions::from_mode(0o666))
            .with_context(|| format!("Failed to set permissions on {:?}", socket_path))?;

        info!(path = ?socket_path, "Listening");

        Ok(Self {
            session,
            listener: Some(listener),
            socket_path,
        })
    }

    /// The path of the bound socket.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Runs the accept loop until SIGINT or SIGTERM, then cleans up.
    pub async fn serve(&mut self) -> Result<()> {
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

        loop {
            let Some(listener) = self.listener.as_ref() else {
                break;
            };

            let accepted = tokio::select! {
                res = listener.accept() => Some(res),
                _ = sigint.recv() => {
                    info!("SIGINT received; shutting down");
                    None
                }
                _ = sigterm.recv() => {
                    info!("SIGTERM received; shutting down");
                    None
                }
            };

            match accepted {
                Some(Ok((stream, _addr))) => {
                    if let Err(e) = self.handle_connection(stream).await {
                        warn!("Error handling connection: {:#}", e);
                    }
                }
                Some(Err(e)) => warn!("Failed to accept connection: {}", e),
                None => break,
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Reads one command, writes one JSON response, closes the connection.
    async fn handle_connection(&mut self, mut stream: UnixStream) -> Result<()> {
        let mut buf = [0u8; MAX_COMMAND_BYTES];
        let n = stream
            .read(&mut buf)
            .await
            .context("Failed to read command")?;

        let response = match std::str::from_utf8(&buf[..n]) {
            Ok(raw) => {
                let raw = raw.trim();
                match Command::parse(raw) {
                    Some(Command::Toggle) => match self.session.toggle().await {
                        Ok(response) => response,
                        Err(e) => {
                            error!("Toggle failed: {:#}", e);
                            Response::error(format!("{:#}", e))
                        }
                    },
                    None => Response::unknown_command(raw),
                }
            }
            Err(e) => Response::error(format!("invalid utf-8 in command: {}", e)),
        };

        let payload = serde_json::to_vec(&response).context("Failed to encode response")?;
        stream
            .write_all(&payload)
            .await
            .context("Failed to write response")?;
        stream.shutdown().await.ok();

        Ok(())
    }

    /// Idempotent cleanup: stops any active capture, closes the listener
    /// and unlinks the socket so a subsequent instance can rebind.
    pub fn shutdown(&mut self) {
        self.session.shutdown();
        if self.listener.take().is_some() {
            if let Err(e) = fs::remove_file(&self.socket_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove socket {:?}: {}", self.socket_path, e);
                }
            }
            info!("Shutdown complete");
        }
    }
}

impl Drop for ServerContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}
