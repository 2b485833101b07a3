use std::time::Duration;

/// Unique, never-reused playlist identifier.
pub type TrackId = u32;

/// A track as held by the playlist. Immutable once added.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Source URL handed to the endpoint (`file://...` for local files).
    pub url: String,
    pub cover_url: Option<String>,
    pub duration: Option<Duration>,
}

/// A track that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub url: String,
    pub cover_url: Option<String>,
    pub duration: Option<Duration>,
}

impl NewTrack {
    pub(super) fn with_id(self, id: TrackId) -> Track {
        Track {
            id,
            title: self.title,
            artist: self.artist,
            album: self.album,
            url: self.url,
            cover_url: self.cover_url,
            duration: self.duration,
        }
    }
}
