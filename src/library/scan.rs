use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::LibraryError;

use super::display::display_name;
use super::model::NewTrack;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn file_url(path: &Path) -> String {
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", abs.display())
}

/// First configured cover image sitting next to `path`.
fn find_cover(path: &Path, settings: &LibrarySettings) -> Option<String> {
    let dir = path.parent()?;
    settings
        .cover_names
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
        .map(|cover| file_url(&cover))
}

fn non_blank(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Import a single audio file, reading whatever tags it carries.
pub fn import_file(path: &Path, settings: &LibrarySettings) -> Result<NewTrack, LibraryError> {
    let meta = fs::metadata(path).map_err(|source| LibraryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_file() || !is_audio_file(path, settings) {
        return Err(LibraryError::UnsupportedFile(path.to_path_buf()));
    }

    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist = String::new();
    let mut album: Option<String> = None;
    let mut duration: Option<Duration> = None;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            duration = Some(tagged.properties().duration()).filter(|d| !d.is_zero());

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = non_blank(tag.title()) {
                    title = v;
                }
                if let Some(v) = non_blank(tag.artist()) {
                    artist = v;
                }
                album = non_blank(tag.album());
            }
        }
        Err(e) => debug!("no tags for {path:?}: {e}"),
    }

    Ok(NewTrack {
        title,
        artist,
        album,
        url: file_url(path),
        cover_url: find_cover(path, settings),
        duration,
    })
}

/// Walk `dir` and import every audio file, sorted by display name.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<NewTrack> {
    let mut tracks: Vec<NewTrack> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }
        match import_file(path, settings) {
            Ok(track) => tracks.push(track),
            Err(e) => warn!("skipping {path:?}: {e}"),
        }
    }

    tracks.sort_by_key(|t| display_name(&t.title, &t.artist).to_lowercase());
    tracks
}

/// Import a mix of files and directories in argument order.
pub fn import_paths(paths: &[PathBuf], settings: &LibrarySettings) -> Vec<NewTrack> {
    let mut tracks = Vec::new();
    for path in paths {
        if path.is_dir() {
            tracks.extend(scan(path, settings));
        } else {
            match import_file(path, settings) {
                Ok(track) => tracks.push(track),
                Err(e) => warn!("cannot add {path:?}: {e}"),
            }
        }
    }
    tracks
}
