//! End-to-end tests of the command server over a real Unix socket, with
//! fake capture and transcription capabilities behind the session.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use voxd::server::ServerContext;
use voxd::session::{RecordingSession, SessionOptions};
use voxd::{
    AudioCapture, CaptureError, Chunk, ChunkSink, Response, Segment, TranscribeError, Transcriber,
};

/// Capture that "delivers" a preset batch of chunks as soon as it starts.
struct FakeCapture {
    deliver: Vec<Chunk>,
    active: Arc<AtomicBool>,
}

impl AudioCapture for FakeCapture {
    fn start(&mut self, sink: ChunkSink) -> Result<(), CaptureError> {
        let mut chunks = sink.lock();
        for chunk in self.deliver.drain(..) {
            chunks.push(chunk);
        }
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeTranscriber {
    segments: Vec<&'static str>,
}

#[async_trait::async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(
        &self,
        _samples: &[f32],
        _beam_size: u32,
        _language: Option<&str>,
    ) -> Result<Vec<Segment>, TranscribeError> {
        Ok(self.segments.iter().map(|s| Segment::new(*s)).collect())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn make_server(
    socket_path: PathBuf,
    deliver: Vec<Chunk>,
    segments: Vec<&'static str>,
) -> (ServerContext, Arc<AtomicBool>) {
    let active = Arc::new(AtomicBool::new(false));
    let capture = FakeCapture {
        deliver,
        active: active.clone(),
    };
    let session = RecordingSession::new(
        Box::new(capture),
        Arc::new(FakeTranscriber { segments }),
        SessionOptions::default(),
    );
    let ctx = ServerContext::bind(socket_path, session).expect("bind");
    (ctx, active)
}

/// One client round trip: connect, send the raw bytes, read the response.
async fn send(socket: &Path, payload: &[u8]) -> Response {
    let mut stream = UnixStream::connect(socket).await.expect("connect");
    stream.write_all(payload).await.expect("write");
    stream.shutdown().await.expect("shutdown");
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.expect("read");
    serde_json::from_slice(&buf).expect("decode response")
}

#[tokio::test]
async fn test_toggle_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, _active) = make_server(
        dir.path().join("voxd.sock"),
        vec![vec![0.1; 160], vec![0.2; 160]],
        vec!["hello", "world"],
    );
    let socket = ctx.socket_path().to_path_buf();

    let client = async {
        assert_eq!(send(&socket, b"toggle").await, Response::recording());
        assert_eq!(send(&socket, b"toggle").await, Response::done("hello world"));
    };

    tokio::select! {
        _ = ctx.serve() => panic!("server exited early"),
        _ = client => {}
    }
}

#[tokio::test]
async fn test_empty_recording_yields_empty_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, _active) = make_server(dir.path().join("voxd.sock"), vec![], vec!["never"]);
    let socket = ctx.socket_path().to_path_buf();

    let client = async {
        assert_eq!(send(&socket, b"toggle").await, Response::recording());
        assert_eq!(send(&socket, b"toggle").await, Response::done(""));
    };

    tokio::select! {
        _ = ctx.serve() => panic!("server exited early"),
        _ = client => {}
    }
}

#[tokio::test]
async fn test_unknown_command_does_not_kill_server() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, _active) = make_server(dir.path().join("voxd.sock"), vec![], vec![]);
    let socket = ctx.socket_path().to_path_buf();

    let client = async {
        assert_eq!(
            send(&socket, b"status\n").await,
            Response::error("unknown command: status"),
        );
        // The accept loop must keep serving after a bad command.
        assert_eq!(send(&socket, b"toggle").await, Response::recording());
    };

    tokio::select! {
        _ = ctx.serve() => panic!("server exited early"),
        _ = client => {}
    }
}

#[tokio::test]
async fn test_malformed_bytes_are_reported_and_survived() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, _active) = make_server(dir.path().join("voxd.sock"), vec![], vec![]);
    let socket = ctx.socket_path().to_path_buf();

    let client = async {
        match send(&socket, &[0xff, 0xfe, 0xfd]).await {
            Response::Error { error } => assert!(error.contains("utf-8")),
            other => panic!("expected error response, got {:?}", other),
        }
        assert_eq!(send(&socket, b"toggle").await, Response::recording());
    };

    tokio::select! {
        _ = ctx.serve() => panic!("server exited early"),
        _ = client => {}
    }
}

#[tokio::test]
async fn test_shutdown_stops_capture_and_removes_socket() {
    let dir = tempfile::tempdir().unwrap();
    let (mut ctx, active) = make_server(dir.path().join("voxd.sock"), vec![], vec![]);
    let socket = ctx.socket_path().to_path_buf();

    let client = async {
        assert_eq!(send(&socket, b"toggle").await, Response::recording());
    };

    tokio::select! {
        _ = ctx.serve() => panic!("server exited early"),
        _ = client => {}
    }

    assert!(active.load(Ordering::SeqCst));
    ctx.shutdown();
    ctx.shutdown();
    assert!(!active.load(Ordering::SeqCst));
    assert!(!socket.exists());
}

#[tokio::test]
async fn test_bind_replaces_stale_socket() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("voxd.sock");

    // Simulate an artifact left behind by a crashed instance.
    std::fs::write(&socket, b"").unwrap();

    let (mut ctx, _active) = make_server(socket.clone(), vec![], vec![]);

    let client = async {
        assert_eq!(send(&socket, b"toggle").await, Response::recording());
    };

    tokio::select! {
        _ = ctx.serve() => panic!("server exited early"),
        _ = client => {}
    }
}
