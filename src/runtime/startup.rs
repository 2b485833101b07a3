use std::ffi::OsString;
use std::path::PathBuf;

use log::info;

use crate::audio::PlayerOptions;
use crate::config::{LibrarySettings, Settings};
use crate::library::{Playlist, import_paths};

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Cli {
    pub print_config: bool,
    pub paths: Vec<PathBuf>,
}

/// `playdeck [--print-config] [PATH...]`. No paths means the current directory.
pub fn parse_args(args: impl IntoIterator<Item = OsString>) -> Cli {
    let mut cli = Cli::default();
    for arg in args {
        if arg == "--print-config" {
            cli.print_config = true;
        } else {
            cli.paths.push(PathBuf::from(arg));
        }
    }
    if cli.paths.is_empty() {
        cli.paths.push(PathBuf::from("."));
    }
    cli
}

pub fn build_playlist(paths: &[PathBuf], library: &LibrarySettings) -> Playlist {
    let playlist = Playlist::from_new_tracks(import_paths(paths, library));
    info!("playlist built with {} track(s)", playlist.len());
    playlist
}

pub fn player_options(settings: &Settings) -> PlayerOptions {
    PlayerOptions {
        autoplay: settings.playback.autoplay,
        volume: settings.playback.volume,
        repeat: settings.playback.repeat,
        shuffle: settings.playback.shuffle,
        fft_size: settings.audio.fft_size,
    }
}
