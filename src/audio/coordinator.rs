//! Playback coordinator: the single writer of `PlaybackState`.
//!
//! The coordinator owns one endpoint for the lifetime of a session. Transport
//! operations mutate the state synchronously and then bind the selected
//! track to the endpoint; endpoint outcomes arrive as events and are applied
//! by `tick` through the same path. Nothing here returns an error to the
//! caller: refused playback and a missing analyser both degrade to a quieter
//! state and a log line.

use std::sync::mpsc::TryRecvError;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::library::Track;

use super::analyser::{Analyser, DEFAULT_FFT_SIZE};
use super::endpoint::{Endpoint, RoutingGraph, Subscription};
use super::types::{EndpointEvent, GraphState, PlaybackState, RepeatMode};

/// Initial coordinator settings.
#[derive(Debug, Clone)]
pub struct PlayerOptions {
    pub autoplay: bool,
    pub volume: u8,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub fft_size: usize,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            autoplay: true,
            volume: 70,
            repeat: RepeatMode::Off,
            shuffle: false,
            fft_size: DEFAULT_FFT_SIZE,
        }
    }
}

pub struct PlaybackCoordinator<E: Endpoint> {
    endpoint: E,
    subscription: Subscription,
    graph: Option<Box<dyn RoutingGraph>>,
    tracks: Vec<Track>,
    state: PlaybackState,
    previous_volume: u8,
    autoplay: bool,
}

impl<E: Endpoint> PlaybackCoordinator<E> {
    /// Take ownership of `endpoint`, subscribe to its events and route it
    /// through an analyser. A graph that cannot be built leaves the
    /// coordinator without analysis data but otherwise fully usable.
    pub fn new(mut endpoint: E, options: PlayerOptions) -> Self {
        let subscription = endpoint.subscribe();

        let graph = match endpoint.connect_analyser(options.fft_size) {
            Ok(graph) => Some(graph),
            Err(e) => {
                error!("audio graph unavailable, continuing without analysis: {e}");
                None
            }
        };

        let volume = options.volume.min(100);
        let state = PlaybackState {
            volume,
            shuffle: options.shuffle,
            repeat: options.repeat,
            ..PlaybackState::default()
        };

        let mut coordinator = Self {
            endpoint,
            subscription,
            graph,
            tracks: Vec::new(),
            state,
            previous_volume: volume,
            autoplay: options.autoplay,
        };
        coordinator.sync_volume();
        coordinator
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.state.index)
    }

    /// Analysis node for visualisation consumers, when the graph came up.
    pub fn analyser(&self) -> Option<&Analyser> {
        self.graph.as_ref().map(|g| g.analyser())
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.autoplay = autoplay;
    }

    #[cfg(test)]
    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Replace the track sequence, clamping the index into the new bounds.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.set_tracks_at(tracks, self.state.index);
    }

    /// Replace the track sequence and move to `index` (clamped) in one step,
    /// so an edit that shifts the current track does not reload it.
    pub fn set_tracks_at(&mut self, tracks: Vec<Track>, index: usize) {
        self.tracks = tracks;
        self.state.index = index.min(self.tracks.len().saturating_sub(1));
        self.bind_source();
    }

    /// Resume playback, waking a suspended routing graph first.
    pub fn play(&mut self) {
        if let Some(graph) = self.graph.as_mut() {
            if graph.state() == GraphState::Suspended {
                if let Err(e) = graph.resume() {
                    warn!("could not resume audio graph: {e}");
                    self.transition(self.state.index, false);
                    return;
                }
            }
        }
        self.transition(self.state.index, true);
    }

    pub fn pause(&mut self) {
        self.transition(self.state.index, false);
    }

    pub fn toggle_play(&mut self) {
        if self.state.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn next(&mut self) {
        let len = self.tracks.len();
        if len == 0 {
            return;
        }
        self.transition((self.state.index + 1) % len, true);
    }

    pub fn prev(&mut self) {
        let len = self.tracks.len();
        if len == 0 {
            return;
        }
        self.transition((self.state.index + len - 1) % len, true);
    }

    /// Jump to `index`; out-of-range indices are ignored.
    pub fn select_song(&mut self, index: usize) {
        if index >= self.tracks.len() {
            debug!("ignoring selection of index {index} (len {})", self.tracks.len());
            return;
        }
        self.transition(index, true);
    }

    /// Seek to `percent` of the loaded track. Ignored until the endpoint
    /// knows a finite duration, and while it still holds a different track
    /// than the selected one (a failed load).
    pub fn seek(&mut self, percent: f64) {
        if !percent.is_finite() || !self.selected_is_loaded() {
            return;
        }
        let Some(duration) = self.endpoint.duration() else {
            return;
        };

        let target = duration.mul_f64(percent.clamp(0.0, 100.0) / 100.0);
        match self.endpoint.set_current_time(target) {
            Ok(()) => self.state.current_time = target,
            Err(e) => warn!("seek to {target:?} failed: {e}"),
        }
    }

    /// Live endpoint position, including after the track has ended.
    pub fn position(&self) -> Duration {
        if self.selected_is_loaded() {
            self.endpoint.current_time()
        } else {
            Duration::ZERO
        }
    }

    fn selected_is_loaded(&self) -> bool {
        match (self.current_track(), self.endpoint.source()) {
            (Some(track), Some(source)) => track.url == source,
            _ => false,
        }
    }

    /// Clamp to `[0, 100]`; any audible level clears the mute flag.
    pub fn set_volume(&mut self, volume: i32) {
        let v = volume.clamp(0, 100) as u8;
        self.state.volume = v;
        if v > 0 {
            self.state.muted = false;
        }
        self.sync_volume();
    }

    pub fn toggle_mute(&mut self) {
        if self.state.muted {
            self.set_volume(i32::from(self.previous_volume));
            self.state.muted = false;
        } else {
            self.previous_volume = self.state.volume;
            self.set_volume(0);
            self.state.muted = true;
        }
    }

    /// Flip the shuffle flag. Traversal order is not affected.
    pub fn toggle_shuffle(&mut self) {
        self.state.shuffle = !self.state.shuffle;
    }

    pub fn toggle_repeat(&mut self) {
        self.state.repeat = self.state.repeat.cycled();
    }

    /// Let the endpoint report progress, then apply every pending event.
    pub fn tick(&mut self) {
        self.endpoint.poll();
        loop {
            match self.subscription.events.try_recv() {
                Ok(event) => self.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("endpoint event channel closed");
                    break;
                }
            }
        }
    }

    fn handle_event(&mut self, event: EndpointEvent) {
        match event {
            EndpointEvent::LoadedMetadata { duration } => self.state.duration = duration,
            EndpointEvent::TimeUpdate { position } => self.state.current_time = position,
            EndpointEvent::Play => self.transition(self.state.index, true),
            EndpointEvent::Pause => self.transition(self.state.index, false),
            EndpointEvent::Ended => self.on_ended(),
            EndpointEvent::PlayRejected { reason } => self.on_play_rejected(&reason),
        }
    }

    fn on_ended(&mut self) {
        let len = self.tracks.len();
        let repeat = self.state.repeat;

        if repeat == RepeatMode::One {
            self.state.current_time = Duration::ZERO;
            if let Err(e) = self.endpoint.set_current_time(Duration::ZERO) {
                warn!("could not rewind track: {e}");
            }
            self.state.playing = true;
            self.start_endpoint();
        } else if self.autoplay || repeat == RepeatMode::All {
            if len > 1 || (repeat == RepeatMode::All && len > 0) {
                self.state.index = (self.state.index + 1) % len;
                self.state.playing = true;
                // A single-track playlist keeps its source; the endpoint restarts it.
                self.bind_source();
            } else {
                self.transition(self.state.index, false);
            }
        } else {
            self.transition(self.state.index, false);
        }
    }

    fn on_play_rejected(&mut self, reason: &str) {
        warn!("playback prevented: {reason}");
        self.state.playing = false;
        self.endpoint.pause();
    }

    /// Apply a new index/playing pair and rebind only if either changed.
    fn transition(&mut self, index: usize, playing: bool) {
        if index == self.state.index && playing == self.state.playing {
            return;
        }
        self.state.index = index;
        self.state.playing = playing;
        self.bind_source();
    }

    /// Load the selected track if the endpoint holds a different source,
    /// then honor the playing flag.
    fn bind_source(&mut self) {
        let Some(track) = self.tracks.get(self.state.index) else {
            // Nothing left to play: drop whatever the endpoint still holds.
            self.state.playing = false;
            self.state.current_time = Duration::ZERO;
            self.state.duration = Duration::ZERO;
            if self.endpoint.source().is_some() {
                self.endpoint.pause();
                self.endpoint.clear_source();
            }
            return;
        };

        if self.endpoint.source() != Some(track.url.as_str()) {
            debug!("loading track {} ({})", track.id, track.url);
            let url = track.url.clone();
            self.state.current_time = Duration::ZERO;
            self.state.duration = Duration::ZERO;
            if let Err(e) = self.endpoint.load(&url) {
                if self.state.playing {
                    self.on_play_rejected(&e.to_string());
                } else {
                    warn!("could not load {url}: {e}");
                }
                return;
            }
            info!("now on track {}: {}", self.state.index, url);
        }

        if self.state.playing {
            self.start_endpoint();
        } else {
            self.endpoint.pause();
        }
    }

    fn start_endpoint(&mut self) {
        if let Err(e) = self.endpoint.play() {
            self.on_play_rejected(&e.to_string());
        }
    }

    fn sync_volume(&mut self) {
        self.endpoint.set_volume(f32::from(self.state.volume) / 100.0);
    }
}

impl<E: Endpoint> Drop for PlaybackCoordinator<E> {
    fn drop(&mut self) {
        self.endpoint.pause();
        self.endpoint.clear_source();
        self.endpoint.unsubscribe(self.subscription.id);
        if let Some(graph) = self.graph.as_mut() {
            if graph.state() != GraphState::Closed {
                if let Err(e) = graph.close() {
                    warn!("closing audio graph failed: {e}");
                }
            }
        }
        debug!("playback session released");
    }
}
