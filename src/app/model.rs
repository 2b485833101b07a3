//! Application model types: `App` and `DeleteTarget`.
//!
//! `App` owns the playlist and everything the list view needs that is not
//! transport state: the cursor, marked tracks and open popups.

use std::collections::BTreeSet;

use log::{info, warn};

use crate::library::{Playlist, Track, TrackId};

/// What a pending delete confirmation will remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Single(TrackId),
    Bulk(Vec<TrackId>),
}

/// The main application model.
pub struct App {
    pub playlist: Playlist,
    /// Cursor position in the playlist.
    pub selected: usize,

    /// Selection mode shows checkboxes; marks persist until cleared.
    pub selection_mode: bool,
    marked: BTreeSet<TrackId>,

    pub follow_playback: bool,
    pub metadata_window: bool,
    pub pending_delete: Option<DeleteTarget>,
}

impl App {
    /// Create a new `App` over `playlist`.
    pub fn new(playlist: Playlist) -> Self {
        Self {
            playlist,
            selected: 0,
            selection_mode: false,
            marked: BTreeSet::new(),
            follow_playback: true,
            metadata_window: false,
            pending_delete: None,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        self.playlist.tracks()
    }

    /// Return true if the playlist contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.playlist.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.playlist.tracks().get(self.selected)
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        let len = self.playlist.len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        let len = self.playlist.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.playlist.len().saturating_sub(1);
    }

    /// Set the cursor, clamped to the playlist.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx.min(self.playlist.len().saturating_sub(1));
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Move the cursor to the playing track when following playback.
    pub fn follow(&mut self, playing_index: usize) {
        if self.follow_playback {
            self.set_selected(playing_index);
        }
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Enter or leave selection mode. Leaving drops every mark.
    pub fn toggle_selection_mode(&mut self) {
        self.selection_mode = !self.selection_mode;
        if !self.selection_mode {
            self.clear_marks();
        }
    }

    pub fn is_marked(&self, id: TrackId) -> bool {
        self.marked.contains(&id)
    }

    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    /// Flip the mark on the track under the cursor.
    pub fn toggle_mark(&mut self) {
        let Some(id) = self.selected_track().map(|t| t.id) else {
            return;
        };
        if !self.marked.remove(&id) {
            self.marked.insert(id);
        }
        self.selection_mode = true;
    }

    /// Mark everything, or nothing if everything is already marked.
    pub fn toggle_mark_all(&mut self) {
        let all: BTreeSet<TrackId> = self.playlist.tracks().iter().map(|t| t.id).collect();
        if !all.is_empty() && self.marked == all {
            self.marked.clear();
        } else {
            self.marked = all;
            self.selection_mode = true;
        }
    }

    pub fn clear_marks(&mut self) {
        self.marked.clear();
    }

    /// Back out one level: close the metadata popup, then drop the marks,
    /// then leave selection mode.
    pub fn dismiss(&mut self) {
        if self.metadata_window {
            self.metadata_window = false;
        } else if !self.marked.is_empty() {
            self.clear_marks();
        } else if self.selection_mode {
            self.selection_mode = false;
        }
    }

    /// Open the delete confirmation: marked tracks when there are any,
    /// otherwise the track under the cursor. Returns false when there is
    /// nothing to delete.
    pub fn request_delete(&mut self) -> bool {
        let target = if !self.marked.is_empty() {
            Some(DeleteTarget::Bulk(self.marked.iter().copied().collect()))
        } else {
            self.selected_track().map(|t| DeleteTarget::Single(t.id))
        };
        let requested = target.is_some();
        self.pending_delete = target;
        requested
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Remove the pending target from the playlist and return the removed ids.
    pub fn confirm_delete(&mut self) -> Vec<TrackId> {
        let Some(target) = self.pending_delete.take() else {
            return Vec::new();
        };

        let removed: Vec<TrackId> = match target {
            DeleteTarget::Single(id) => match self.playlist.remove(id) {
                Ok(track) => vec![track.id],
                Err(e) => {
                    warn!("delete skipped: {e}");
                    Vec::new()
                }
            },
            DeleteTarget::Bulk(ids) => self
                .playlist
                .bulk_remove(&ids)
                .into_iter()
                .map(|t| t.id)
                .collect(),
        };

        for id in &removed {
            self.marked.remove(id);
        }
        if self.marked.is_empty() {
            self.selection_mode = false;
        }
        self.set_selected(self.selected);
        info!("removed {} track(s) from the playlist", removed.len());
        removed
    }
}
