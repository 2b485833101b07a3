//! Error types shared by the audio and library modules.

use std::path::PathBuf;

use thiserror::Error;

use crate::library::TrackId;

/// Failures reported by a playback endpoint.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The default output device could not be opened.
    #[error("no audio output device: {0}")]
    Stream(#[from] rodio::StreamError),

    /// `play` was requested before any source was loaded.
    #[error("no source loaded")]
    NoSource,

    /// Only `file://` URLs and plain paths can be played.
    #[error("unsupported source url: {0}")]
    UnsupportedUrl(String),

    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("seek failed: {0}")]
    Seek(#[from] rodio::source::SeekError),

    /// The platform refused to start playback.
    #[error("playback rejected: {0}")]
    Rejected(String),
}

/// Failures of the audio-routing graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The analyser window must be a power of two in `[32, 32768]`.
    #[error("invalid fft size {0}: expected a power of two between 32 and 32768")]
    InvalidFftSize(usize),

    #[error("audio graph is closed")]
    Closed,

    #[error("audio graph unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the playlist collaborator.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("track {0} not found")]
    NotFound(TrackId),

    #[error("not an audio file: {0:?}")]
    UnsupportedFile(PathBuf),

    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
