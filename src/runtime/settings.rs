use crate::config::Settings;

/// Settings to run with, plus a note when they had to fall back to defaults.
///
/// Config is optional; a broken file never prevents startup. The note is
/// returned rather than logged because the logger is configured from the
/// settings themselves.
pub fn load_settings() -> (Settings, Option<String>) {
    match Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        Err(e) => (
            Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}
