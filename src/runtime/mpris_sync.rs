use crate::audio::{Endpoint, PlaybackCoordinator, RepeatMode};
use crate::library::TrackId;
use crate::mpris::MprisHandle;

/// What MPRIS last saw, so unchanged state is not re-published every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct MprisSnapshot {
    track: Option<TrackId>,
    playing: bool,
    repeat: RepeatMode,
    shuffle: bool,
    volume: u8,
    muted: bool,
}

impl MprisSnapshot {
    pub fn of<E: Endpoint>(coordinator: &PlaybackCoordinator<E>) -> Self {
        let state = coordinator.state();
        Self {
            track: coordinator.current_track().map(|t| t.id),
            playing: state.playing,
            repeat: state.repeat,
            shuffle: state.shuffle,
            volume: state.volume,
            muted: state.muted,
        }
    }
}

pub fn update_mpris<E: Endpoint>(
    mpris: &MprisHandle,
    coordinator: &PlaybackCoordinator<E>,
    last: &mut Option<MprisSnapshot>,
) {
    mpris.set_position(coordinator.position());

    let now = MprisSnapshot::of(coordinator);
    if last.as_ref() == Some(&now) {
        return;
    }

    let track = coordinator.current_track();
    if last.as_ref().map(|l| l.track) != Some(now.track) {
        mpris.set_track_metadata(track);
    }
    mpris.set_playback(coordinator.state(), track.is_some());
    *last = Some(now);
}
