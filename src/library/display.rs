use std::time::Duration;

use super::model::Track;

/// "Artist - Title", or just the title when the artist is blank.
pub fn display_name(title: &str, artist: &str) -> String {
    let artist = artist.trim();
    if artist.is_empty() {
        title.trim().to_string()
    } else {
        format!("{} - {}", artist, title.trim())
    }
}

impl Track {
    pub fn display(&self) -> String {
        display_name(&self.title, &self.artist)
    }
}

/// Playlist duration column: `m:ss`, or `--:--` when unknown.
pub fn format_duration(d: Option<Duration>) -> String {
    match d {
        Some(d) if !d.is_zero() => {
            let secs = d.as_secs();
            format!("{}:{:02}", secs / 60, secs % 60)
        }
        _ => "--:--".to_string(),
    }
}

/// Transport clock: `MM:SS`.
pub fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
