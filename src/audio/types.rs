//! Audio-related small types.
//!
//! This module defines the repeat mode, the playback state owned by the
//! coordinator and the events an endpoint reports back to it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// End-of-track policy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatMode {
    /// Stop at the end of the track unless autoplay is on.
    #[default]
    #[serde(alias = "none", alias = "no-loop", alias = "no_loop")]
    Off,
    /// Wrap around to the start of the playlist.
    #[serde(alias = "repeat-all", alias = "loop-all", alias = "loop_all", alias = "playlist")]
    All,
    /// Restart the current track when it ends.
    #[serde(alias = "repeat-one", alias = "loop-one", alias = "loop_one", alias = "track")]
    One,
}

impl RepeatMode {
    /// Next mode in the `Off -> All -> One -> Off` cycle.
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }
}

/// Snapshot of everything the UI needs to render the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Index of the current track in the coordinator's sequence.
    pub index: usize,
    pub playing: bool,
    pub current_time: Duration,
    /// Zero until the endpoint reports metadata for the loaded source.
    pub duration: Duration,
    /// Volume level, always within `[0, 100]`.
    pub volume: u8,
    pub muted: bool,
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            index: 0,
            playing: false,
            current_time: Duration::ZERO,
            duration: Duration::ZERO,
            volume: 70,
            muted: false,
            shuffle: false,
            repeat: RepeatMode::Off,
        }
    }
}

impl PlaybackState {
    /// Elapsed time as a percentage of the duration; 0 while the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        let pct = self.current_time.as_secs_f64() / self.duration.as_secs_f64() * 100.0;
        pct.clamp(0.0, 100.0)
    }
}

/// Lifecycle notifications emitted by an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointEvent {
    /// The loaded source's duration became known.
    LoadedMetadata { duration: Duration },
    /// Playback position moved.
    TimeUpdate { position: Duration },
    /// Playback started by something other than the coordinator.
    Play,
    /// Playback paused by something other than the coordinator.
    Pause,
    /// The loaded source played to its end.
    Ended,
    /// A play request was refused after it had been accepted.
    PlayRejected { reason: String },
}

/// State of the audio-routing graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GraphState {
    Running,
    /// Not processing until resumed.
    Suspended,
    Closed,
}
