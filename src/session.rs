//! Playback sessions: at most one active decoded-audio source.

use crate::audio_data::AudioData;
use std::sync::Arc;
use uuid::Uuid;

/// Handle identifying one `play()` request.
///
/// Also serves as the stale-decode guard: a decode result whose handle no
/// longer matches the controller's current handle belongs to a superseded
/// session and is discarded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(Uuid);

impl PlaybackHandle {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PlaybackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PlaybackHandle({})", self.0)
    }
}

/// Controller-visible playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    /// An asset is being decoded for this handle.
    Decoding(PlaybackHandle),
    Playing(PlaybackHandle),
}

/// One active audio playback: a decoded mono buffer plus a cursor.
///
/// Created by the controller on session start, destroyed on `stop()` or
/// natural end. The render path pulls samples through [`pull`](Self::pull).
#[derive(Debug)]
pub struct PlaybackSession {
    handle: PlaybackHandle,
    audio: Arc<AudioData>,
    cursor: usize,
    finished: bool,
}

impl PlaybackSession {
    /// `audio` must be mono at the engine sample rate; the controller
    /// prepares it before constructing the session.
    pub fn new(handle: PlaybackHandle, audio: Arc<AudioData>) -> Self {
        debug_assert_eq!(audio.channels(), 1);
        Self {
            handle,
            audio,
            cursor: 0,
            finished: false,
        }
    }

    pub fn handle(&self) -> PlaybackHandle {
        self.handle
    }

    /// Pull up to `out.len()` mono frames; returns the number written.
    /// Marks the session finished when the buffer is exhausted.
    pub fn pull(&mut self, out: &mut [f32]) -> usize {
        if self.finished {
            return 0;
        }
        let samples = self.audio.samples();
        let n = out.len().min(samples.len() - self.cursor);
        out[..n].copy_from_slice(&samples[self.cursor..self.cursor + n]);
        self.cursor += n;
        if self.cursor >= samples.len() {
            self.finished = true;
            log::debug!("Session {} reached end of audio data", self.handle);
        }
        n
    }

    /// True once the buffer has been fully consumed.
    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn position_frames(&self) -> usize {
        self.cursor
    }

    pub fn total_frames(&self) -> usize {
        self.audio.total_frames()
    }
}
