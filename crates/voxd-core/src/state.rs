//! Recording session state types.

/// The current state of the recording session.
///
/// Transitions strictly alternate: `Idle -> Recording -> Idle -> ...`,
/// driven only by toggle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Idle, not recording
    Idle,
    /// Actively recording audio
    Recording,
}
