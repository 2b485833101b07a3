use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, info};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{Endpoint, PlaybackCoordinator, PlaybackState};
use crate::config;
use crate::library::{Playlist, TrackId};
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::keys::{Action, PendingKeys, map_key};
use crate::runtime::mpris_sync::{MprisSnapshot, update_mpris};
use crate::ui::{self, NowPlaying};

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Two-key prefixes (`gg`, `zz`).
    pub pending: PendingKeys,
    /// Last state published to MPRIS.
    pub last_mpris: Option<MprisSnapshot>,
}

/// Main terminal event loop: handles input, drives the coordinator's
/// `tick`, redraws and keeps MPRIS in sync. Returns `Ok(())` on quit.
pub fn run<E: Endpoint>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    coordinator: &mut PlaybackCoordinator<E>,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = Duration::from_millis(settings.audio.tick_ms);

    loop {
        coordinator.tick();
        if app.has_tracks() {
            app.follow(coordinator.state().index);
        }
        update_mpris(mpris, coordinator, &mut state.last_mpris);

        let analysis = if settings.ui.show_spectrum {
            coordinator
                .analyser()
                .map(|a| (a.frequency_data(), a.time_domain_data()))
        } else {
            None
        };
        let (spectrum, waveform) = analysis.unzip();
        let now = NowPlaying {
            state: coordinator.state(),
            track: coordinator.current_track(),
            autoplay: coordinator.autoplay(),
            spectrum,
            waveform,
        };
        terminal.draw(|f| ui::draw(f, app, &now, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            debug!("mpris command {cmd:?}");
            if apply(Action::from(cmd), settings, app, coordinator) {
                return Ok(());
            }
        }

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = map_key(key, app, &mut state.pending) {
                    if apply(action, settings, app, coordinator) {
                        break;
                    }
                }
            }
        }
    }

    info!("quit requested");
    Ok(())
}

/// Apply one action. Returns true when the player should shut down.
fn apply<E: Endpoint>(
    action: Action,
    settings: &config::Settings,
    app: &mut App,
    coordinator: &mut PlaybackCoordinator<E>,
) -> bool {
    let step = i32::from(settings.controls.volume_step);
    let scrub = i64::try_from(settings.controls.scrub_seconds).unwrap_or(i64::MAX);

    match action {
        Action::Quit => return true,
        Action::TogglePlay => {
            app.follow_playback_on();
            coordinator.toggle_play();
        }
        Action::Play => {
            app.follow_playback_on();
            coordinator.play();
        }
        Action::Pause => coordinator.pause(),
        Action::Stop => {
            coordinator.pause();
            coordinator.seek(0.0);
        }
        Action::Next => {
            app.follow_playback_on();
            coordinator.next();
        }
        Action::Prev => {
            app.follow_playback_on();
            coordinator.prev();
        }
        Action::PlaySelected => {
            let state = coordinator.state();
            if !(state.playing && state.index == app.selected) {
                app.follow_playback_on();
                coordinator.select_song(app.selected);
            }
        }
        Action::CursorDown => {
            app.follow_playback_off();
            app.next();
        }
        Action::CursorUp => {
            app.follow_playback_off();
            app.prev();
        }
        Action::CursorTop => {
            app.follow_playback_off();
            app.select_first();
        }
        Action::CursorBottom => {
            app.follow_playback_off();
            app.select_last();
        }
        Action::JumpToPlaying => app.set_selected(coordinator.state().index),
        Action::ScrubForward => {
            if let Some(p) = scrub_percent(coordinator.state(), scrub) {
                coordinator.seek(p);
            }
        }
        Action::ScrubBack => {
            if let Some(p) = scrub_percent(coordinator.state(), -scrub) {
                coordinator.seek(p);
            }
        }
        Action::VolumeUp => coordinator.set_volume(i32::from(coordinator.state().volume) + step),
        Action::VolumeDown => coordinator.set_volume(i32::from(coordinator.state().volume) - step),
        Action::ToggleMute => coordinator.toggle_mute(),
        Action::ToggleShuffle => coordinator.toggle_shuffle(),
        Action::CycleRepeat => coordinator.toggle_repeat(),
        Action::ToggleAutoplay => coordinator.set_autoplay(!coordinator.autoplay()),
        Action::ToggleMetadata => app.toggle_metadata_window(),
        Action::ToggleSelectionMode => app.toggle_selection_mode(),
        Action::ToggleMark => app.toggle_mark(),
        Action::ToggleMarkAll => app.toggle_mark_all(),
        Action::RequestDelete => {
            if !app.request_delete() {
                debug!("delete requested on an empty playlist");
            }
        }
        Action::CancelDelete => app.cancel_delete(),
        Action::ConfirmDelete => {
            let playing_id = coordinator.current_track().map(|t| t.id);
            let old_index = coordinator.state().index;
            let removed = app.confirm_delete();
            if !removed.is_empty() {
                let index = index_after_removal(playing_id, old_index, &app.playlist);
                coordinator.set_tracks_at(app.tracks().to_vec(), index);
            }
        }
        Action::Escape => app.dismiss(),
    }
    false
}

/// Percentage to seek to after moving `delta_secs` from the current time.
/// `None` until the duration is known.
pub(super) fn scrub_percent(state: &PlaybackState, delta_secs: i64) -> Option<f64> {
    if state.duration.is_zero() {
        return None;
    }
    let total = state.duration.as_secs_f64();
    let target = (state.current_time.as_secs_f64() + delta_secs as f64).clamp(0.0, total);
    Some(target / total * 100.0)
}

/// Where playback should sit once tracks were removed: on the same track
/// if it survived, otherwise on whatever slid into its old position.
pub(super) fn index_after_removal(
    playing_id: Option<TrackId>,
    old_index: usize,
    playlist: &Playlist,
) -> usize {
    playing_id
        .and_then(|id| playlist.position(id))
        .unwrap_or(old_index)
}
