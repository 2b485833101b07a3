//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Sparkline, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, DeleteTarget};
use crate::audio::PlaybackState;
use crate::config::{ControlsSettings, UiSettings};
use crate::library::{Track, format_clock, format_duration};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("zz", "jump to playing");
    map.insert("enter", "play selected");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next");
    // H/L is filled dynamically from config.
    map.insert("+/-", "volume");
    map.insert("m", "mute");
    map.insert("s", "shuffle");
    map.insert("r", "repeat");
    map.insert("a", "autoplay");
    map.insert("v/x/A", "select/mark/all");
    map.insert("d", "delete");
    map.insert("K", "metadata");
    map.insert("q", "quit");
    map
});

/// What the transport looks like right now.
pub struct NowPlaying<'a> {
    pub state: &'a PlaybackState,
    pub track: Option<&'a Track>,
    pub autoplay: bool,
    /// Analyser frequency bins, when the spectrum is enabled and available.
    pub spectrum: Option<Vec<u8>>,
    /// Latest analysis window, for the peak meter.
    pub waveform: Option<Vec<f32>>,
}

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "gg/G", "zz", "+/-", "m", "s", "r", "a",
        "v/x/A", "d", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn status_text(app: &App, now: &NowPlaying<'_>) -> String {
    let state = now.state;
    let mut parts: Vec<String> = Vec::new();

    match now.track {
        Some(track) => {
            let transport = if state.playing { "Playing" } else { "Paused" };
            parts.push(format!("{transport}: {}", track.display()));
        }
        None => parts.push("Stopped".to_string()),
    }

    if state.muted {
        parts.push("VOL: muted".to_string());
    } else {
        parts.push(format!("VOL: {}%", state.volume));
    }
    parts.push(format!("REPEAT: {}", state.repeat.label()));
    parts.push(format!("SHUFFLE: {}", if state.shuffle { "on" } else { "off" }));
    parts.push(format!("AUTOPLAY: {}", if now.autoplay { "on" } else { "off" }));
    if app.follow_playback {
        parts.push("CURSOR: follow".to_string());
    } else {
        parts.push("CURSOR: free".to_string());
    }
    if app.selection_mode {
        parts.push(format!("MARKED: {}", app.marked_count()));
    }

    parts.join(" • ")
}

/// Squash analyser bins into at most `width` bars by averaging neighbours.
fn spectrum_bars(data: &[u8], width: usize) -> Vec<u64> {
    if data.is_empty() || width == 0 {
        return Vec::new();
    }
    let per_bar = data.len().div_ceil(width);
    data.chunks(per_bar)
        .map(|c| c.iter().map(|&v| u64::from(v)).sum::<u64>() / c.len() as u64)
        .collect()
}

/// Peak absolute amplitude of `samples` as a percentage of full scale.
fn peak_percent(samples: &[f32]) -> u8 {
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    (peak.min(1.0) * 100.0).round() as u8
}

fn track_row(app: &App, track: &Track, active: Option<u32>) -> String {
    let marker = if active == Some(track.id) { "▶ " } else { "  " };
    let check = if !app.selection_mode {
        ""
    } else if app.is_marked(track.id) {
        "[x] "
    } else {
        "[ ] "
    };
    format!(
        "{marker}{check}{}  {}",
        track.display(),
        format_duration(track.duration)
    )
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn padded_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    now: &NowPlaying<'_>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let spectrum_height = if now.spectrum.is_some() { 6 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(spectrum_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" playdeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status_par = Paragraph::new(status_text(app, now))
        .block(padded_block(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Progress
    let state = now.state;
    let label = if state.duration.is_zero() {
        format!("{} / --:--", format_clock(state.current_time))
    } else {
        format!(
            "{} / {}",
            format_clock(state.current_time),
            format_clock(state.duration)
        )
    };
    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio((state.progress() / 100.0).clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(progress, chunks[2]);

    // Main list
    {
        // Center the selected item when possible by creating a visible window.
        // Only build ListItems for the visible window.
        let tracks = app.tracks();
        let total = tracks.len();
        let list_height = chunks[3].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let active = now.track.map(|t| t.id);
        let visible_items: Vec<ListItem> = tracks[start..end]
            .iter()
            .map(|t| ListItem::new(track_row(app, t, active)))
            .collect();

        let title = format!(" playlist ({}) ", total);
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state = ratatui::widgets::ListState::default();
        if total > 0 {
            list_state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[3], &mut list_state);
    }

    // Spectrum
    if let Some(bins) = &now.spectrum {
        let area = chunks[4];
        let bars = spectrum_bars(bins, area.width.saturating_sub(2) as usize);
        let title = match now.waveform.as_deref() {
            Some(w) => format!(" spectrum · peak {}% ", peak_percent(w)),
            None => " spectrum ".to_string(),
        };
        let sparkline = Sparkline::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .data(bars)
            .max(255);
        frame.render_widget(sparkline, area);
    }

    // Overlay metadata popup (keeps list visible under it)
    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 10, chunks[3]);
        frame.render_widget(Clear, popup_area);

        let meta = match app.selected_track() {
            Some(track) => format!(
                "Title: {}\nArtist: {}\nAlbum: {}\nDuration: {}\nURL: {}\nCover: {}",
                track.title,
                if track.artist.trim().is_empty() { "-" } else { track.artist.as_str() },
                track.album.as_deref().unwrap_or("-"),
                format_duration(track.duration),
                track.url,
                track.cover_url.as_deref().unwrap_or("-"),
            ),
            None => "No track selected".to_string(),
        };
        let meta_paragraph = Paragraph::new(meta)
            .block(padded_block(" metadata (K closes) "))
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    // Delete confirmation
    if let Some(target) = &app.pending_delete {
        let popup_area = centered_rect_sized(56, 5, frame.area());
        frame.render_widget(Clear, popup_area);

        let question = match target {
            DeleteTarget::Single(id) => {
                let name = app
                    .playlist
                    .get(*id)
                    .map(|t| t.display())
                    .unwrap_or_else(|| "this track".to_string());
                format!("Remove \"{name}\" from the playlist?")
            }
            DeleteTarget::Bulk(ids) => format!("Remove {} tracks from the playlist?", ids.len()),
        };
        let modal = Paragraph::new(format!("{question}\n[y] yes   [n] no"))
            .alignment(Alignment::Center)
            .bold()
            .block(padded_block(" confirm "))
            .wrap(Wrap { trim: true });
        frame.render_widget(modal, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(padded_block(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}
