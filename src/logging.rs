//! Log setup.
//!
//! The terminal is in raw mode while the player runs, so records go to a
//! file instead of stderr.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};

use crate::config::{LoggingSettings, default_log_path};

/// Log file chosen by `settings`, falling back to the XDG state directory.
pub fn log_path(settings: &LoggingSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(default_log_path)
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global logger. Returns the file being written to, if any.
///
/// `RUST_LOG` overrides `settings.level`.
pub fn init(settings: &LoggingSettings) -> io::Result<Option<PathBuf>> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(settings.level.as_str()));

    let path = log_path(settings);
    match &path {
        Some(p) => builder.target(Target::Pipe(Box::new(open_log(p)?))),
        None => builder.target(Target::Pipe(Box::new(io::sink()))),
    };
    builder.format_timestamp_millis();

    // A second init (tests, embedders) keeps the first logger.
    let _ = builder.try_init();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_file_wins_over_default() {
        let settings = LoggingSettings {
            level: "info".into(),
            file: Some(PathBuf::from("/tmp/custom.log")),
        };
        assert_eq!(log_path(&settings), Some(PathBuf::from("/tmp/custom.log")));
    }

    #[test]
    fn init_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested").join("playdeck.log");
        let settings = LoggingSettings {
            level: "debug".into(),
            file: Some(file.clone()),
        };

        let path = init(&settings).unwrap();
        assert_eq!(path, Some(file.clone()));
        assert!(file.exists());
    }
}
