//! Audio capture for voxd. There can only be one active capture stream at
//! a time and the captured chunks are handed off to the owner of the sink,
//! which must only read them after the stream has been stopped.

mod capture;
mod wav;

pub use capture::{AudioCapture, CaptureError, Chunk, ChunkSink, CpalCapture, chunk_sink};
pub use wav::write_wav;
