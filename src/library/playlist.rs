//! In-memory playlist: ordered tracks with unique ids.
//!
//! Ids are handed out on `add` and never reused, so a removed track's id
//! cannot later point at a different track.

use crate::error::LibraryError;

use super::model::{NewTrack, Track, TrackId};

#[derive(Debug, Clone)]
pub struct Playlist {
    tracks: Vec<Track>,
    next_id: TrackId,
}

impl Default for Playlist {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 1,
        }
    }
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a playlist from imported tracks, keeping their order.
    pub fn from_new_tracks(tracks: impl IntoIterator<Item = NewTrack>) -> Self {
        let mut playlist = Self::new();
        playlist.extend(tracks);
        playlist
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Position of `id` in playback order.
    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Append a track and return its new id.
    pub fn add(&mut self, track: NewTrack) -> TrackId {
        let id = self.next_id;
        self.next_id += 1;
        self.tracks.push(track.with_id(id));
        id
    }

    pub fn extend(&mut self, tracks: impl IntoIterator<Item = NewTrack>) {
        for track in tracks {
            self.add(track);
        }
    }

    pub fn remove(&mut self, id: TrackId) -> Result<Track, LibraryError> {
        let pos = self.position(id).ok_or(LibraryError::NotFound(id))?;
        Ok(self.tracks.remove(pos))
    }

    /// Remove every listed track that exists; unknown ids are skipped.
    pub fn bulk_remove(&mut self, ids: &[TrackId]) -> Vec<Track> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.tracks.len());
        for track in self.tracks.drain(..) {
            if ids.contains(&track.id) {
                removed.push(track);
            } else {
                kept.push(track);
            }
        }
        self.tracks = kept;
        removed
    }
}
