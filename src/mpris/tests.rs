use super::*;
use std::sync::mpsc;
use std::time::Duration;

fn make_track() -> Track {
    Track {
        id: 7,
        title: "Test Title".to_string(),
        artist: "Test Artist".to_string(),
        album: Some("Test Album".to_string()),
        url: "file:///tmp/music/test.mp3".to_string(),
        cover_url: Some("file:///tmp/music/cover.jpg".to_string()),
        duration: Some(Duration::from_micros(1_234_567)),
    }
}

fn handle() -> (MprisHandle, Arc<Mutex<SharedState>>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    (
        MprisHandle {
            state: state.clone(),
        },
        state,
    )
}

fn iface(state: &Arc<Mutex<SharedState>>) -> PlayerIface {
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    PlayerIface {
        tx,
        state: state.clone(),
    }
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state) = handle();

    let track = make_track();
    handle.set_track_metadata(Some(&track));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(s.album.as_deref(), Some("Test Album"));
        assert_eq!(s.url.as_deref(), Some("file:///tmp/music/test.mp3"));
        assert_eq!(s.art_url.as_deref(), Some("file:///tmp/music/cover.jpg"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/7")
        );
    }

    handle.set_track_metadata(None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.album, None);
        assert_eq!(s.url, None);
        assert_eq!(s.art_url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn playback_status_follows_coordinator_state() {
    let (handle, state) = handle();
    let iface = iface(&state);
    let mut playback = PlaybackState::default();

    handle.set_playback(&playback, false);
    assert_eq!(iface.playback_status(), "Stopped");

    playback.playing = true;
    handle.set_playback(&playback, true);
    assert_eq!(iface.playback_status(), "Playing");

    playback.playing = false;
    handle.set_playback(&playback, true);
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn loop_shuffle_and_volume_are_published() {
    let (handle, state) = handle();
    let iface = iface(&state);
    let mut playback = PlaybackState {
        volume: 40,
        shuffle: true,
        repeat: RepeatMode::One,
        ..PlaybackState::default()
    };

    handle.set_playback(&playback, true);
    assert_eq!(iface.loop_status(), "Track");
    assert!(iface.shuffle());
    assert!((iface.volume() - 0.4).abs() < 1e-9);

    playback.repeat = RepeatMode::All;
    playback.muted = true;
    handle.set_playback(&playback, true);
    assert_eq!(iface.loop_status(), "Playlist");
    assert_eq!(iface.volume(), 0.0);

    playback.repeat = RepeatMode::Off;
    handle.set_playback(&playback, true);
    assert_eq!(iface.loop_status(), "None");
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (handle, state) = handle();
    handle.set_track_metadata(Some(&make_track()));

    let map = iface(&state).metadata();
    for k in [
        "mpris:trackid",
        "mpris:length",
        "mpris:artUrl",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "xesam:url",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn metadata_is_empty_without_a_track() {
    let (_handle, state) = handle();
    assert!(iface(&state).metadata().is_empty());
}

#[test]
fn position_is_published_in_microseconds() {
    let (handle, state) = handle();
    let iface = iface(&state);
    assert_eq!(iface.position(), 0);

    handle.set_position(Duration::from_millis(1_500));
    assert_eq!(iface.position(), 1_500_000);
}
