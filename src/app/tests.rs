use super::*;
use crate::library::{NewTrack, Playlist};

fn nt(title: &str) -> NewTrack {
    NewTrack {
        title: title.into(),
        artist: String::new(),
        album: None,
        url: format!("file:///music/{title}.mp3"),
        cover_url: None,
        duration: None,
    }
}

fn app(titles: &[&str]) -> App {
    App::new(Playlist::from_new_tracks(titles.iter().map(|t| nt(t))))
}

fn titles(app: &App) -> Vec<String> {
    app.tracks().iter().map(|t| t.title.clone()).collect()
}

#[test]
fn cursor_wraps_both_ways() {
    let mut app = app(&["a", "b", "c"]);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.select_last();
    assert_eq!(app.selected, 2);
    app.select_first();
    assert_eq!(app.selected, 0);
}

#[test]
fn cursor_on_empty_playlist_stays_at_zero() {
    let mut app = app(&[]);
    app.next();
    app.prev();
    app.select_last();
    assert_eq!(app.selected, 0);
    assert!(!app.has_tracks());
    assert!(app.selected_track().is_none());
}

#[test]
fn follow_only_moves_cursor_when_enabled() {
    let mut app = app(&["a", "b", "c"]);
    app.follow(2);
    assert_eq!(app.selected, 2);

    app.follow_playback_off();
    app.follow(0);
    assert_eq!(app.selected, 2);

    app.follow_playback_on();
    app.follow(10);
    assert_eq!(app.selected, 2);
}

#[test]
fn toggle_mark_all_switches_between_all_and_none() {
    let mut app = app(&["a", "b", "c"]);
    app.toggle_mark_all();
    assert_eq!(app.marked_count(), 3);
    assert!(app.selection_mode);
    app.toggle_mark_all();
    assert_eq!(app.marked_count(), 0);

    app.set_selected(1);
    app.toggle_mark();
    app.toggle_mark_all();
    assert_eq!(app.marked_count(), 3);
}

#[test]
fn leaving_selection_mode_clears_marks() {
    let mut app = app(&["a", "b"]);
    app.toggle_mark();
    assert!(app.is_marked(1));
    app.toggle_selection_mode();
    assert!(!app.selection_mode);
    assert_eq!(app.marked_count(), 0);
}

#[test]
fn dismiss_backs_out_one_level_at_a_time() {
    let mut app = app(&["a", "b"]);
    app.toggle_mark_all();
    app.toggle_metadata_window();

    app.dismiss();
    assert!(!app.metadata_window);
    assert_eq!(app.marked_count(), 2);

    app.dismiss();
    assert_eq!(app.marked_count(), 0);
    assert!(app.selection_mode);

    app.dismiss();
    assert!(!app.selection_mode);
}

#[test]
fn request_delete_targets_cursor_without_marks() {
    let mut app = app(&["a", "b", "c"]);
    app.set_selected(1);
    assert!(app.request_delete());
    assert_eq!(app.pending_delete, Some(DeleteTarget::Single(2)));

    app.cancel_delete();
    assert!(app.pending_delete.is_none());
    assert_eq!(titles(&app), vec!["a", "b", "c"]);
}

#[test]
fn request_delete_on_empty_playlist_does_nothing() {
    let mut app = app(&[]);
    assert!(!app.request_delete());
    assert!(app.pending_delete.is_none());
    assert!(app.confirm_delete().is_empty());
}

#[test]
fn confirm_single_delete_clamps_cursor() {
    let mut app = app(&["a", "b", "c"]);
    app.select_last();
    app.request_delete();
    assert_eq!(app.confirm_delete(), vec![3]);
    assert_eq!(titles(&app), vec!["a", "b"]);
    assert_eq!(app.selected, 1);
}

#[test]
fn confirm_bulk_delete_removes_marked_and_leaves_selection_mode() {
    let mut app = app(&["a", "b", "c", "d"]);
    app.toggle_mark();
    app.set_selected(2);
    app.toggle_mark();

    assert!(app.request_delete());
    assert_eq!(app.pending_delete, Some(DeleteTarget::Bulk(vec![1, 3])));
    assert_eq!(app.confirm_delete(), vec![1, 3]);
    assert_eq!(titles(&app), vec!["b", "d"]);
    assert_eq!(app.marked_count(), 0);
    assert!(!app.selection_mode);
    assert_eq!(app.selected, 1);
}

#[test]
fn metadata_window_toggles() {
    let mut app = app(&["a"]);
    app.toggle_metadata_window();
    assert!(app.metadata_window);
    app.toggle_metadata_window();
    assert!(!app.metadata_window);
}
