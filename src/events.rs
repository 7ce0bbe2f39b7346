//! Event types for lipsonic

use crate::session::PlaybackHandle;

/// Events delivered through
/// [`PlaybackController::poll_events`](crate::controller::PlaybackController::poll_events).
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A session started producing audio.
    SourceStarted { handle: PlaybackHandle },
    /// A session reached its natural end. Emitted exactly once per session
    /// and never for an explicit stop.
    SourceCompleted { handle: PlaybackHandle },
    /// The asset for a session could not be fetched or decoded.
    PlaybackFailed { handle: PlaybackHandle, error: String },
}

impl PlaybackEvent {
    pub fn handle(&self) -> PlaybackHandle {
        match self {
            Self::SourceStarted { handle }
            | Self::SourceCompleted { handle }
            | Self::PlaybackFailed { handle, .. } => *handle,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::PlaybackFailed { .. })
    }
}
