use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use crate::audio::RepeatMode;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_playdeck_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("PLAYDECK_CONFIG_PATH", "/tmp/playdeck-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/playdeck-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("playdeck")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("playdeck")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_uses_xdg_state_home_then_local_state() {
    let _lock = env_lock();
    {
        let _g1 = EnvGuard::set("XDG_STATE_HOME", "/tmp/xdg-state");
        assert_eq!(
            default_log_path().unwrap(),
            std::path::PathBuf::from("/tmp/xdg-state/playdeck/playdeck.log")
        );
    }
    let _g1 = EnvGuard::remove("XDG_STATE_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/playdeck/playdeck.log")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_repeat_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
autoplay = false
volume = 40
repeat = "repeat-one"
shuffle = true

[audio]
fft_size = 1024
tick_ms = 20

[controls]
scrub_seconds = 9
volume_step = 10

[ui]
header_text = "hello"
follow_playback = false
show_spectrum = false

[library]
extensions = ["mp3"]
recursive = false
include_hidden = false
follow_links = false
cover_names = ["art.png"]

[logging]
level = "debug"
file = "/tmp/playdeck.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PLAYDECK_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("PLAYDECK__PLAYBACK__VOLUME");

    let s = Settings::load().unwrap();
    assert!(!s.playback.autoplay);
    assert_eq!(s.playback.volume, 40);
    assert_eq!(s.playback.repeat, RepeatMode::One);
    assert!(s.playback.shuffle);
    assert_eq!(s.audio.fft_size, 1024);
    assert_eq!(s.audio.tick_ms, 20);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.controls.volume_step, 10);
    assert_eq!(s.ui.header_text, "hello");
    assert!(!s.ui.follow_playback);
    assert!(!s.ui.show_spectrum);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.cover_names, vec!["art.png".to_string()]);
    assert_eq!(s.logging.level, "debug");
    assert_eq!(
        s.logging.file,
        Some(std::path::PathBuf::from("/tmp/playdeck.log"))
    );
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
volume = 90
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PLAYDECK_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("PLAYDECK__PLAYBACK__VOLUME", "25");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.volume, 25);
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "PLAYDECK_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );

    let s = Settings::load().unwrap();
    assert!(s.playback.autoplay);
    assert_eq!(s.playback.volume, 70);
    assert_eq!(s.playback.repeat, RepeatMode::Off);
    assert_eq!(s.audio.fft_size, 256);
    assert_eq!(s.audio.tick_ms, 50);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.playback.volume = 101;
    assert!(s.validate().is_err());
    s.playback.volume = 100;

    s.audio.tick_ms = 0;
    assert!(s.validate().is_err());
    s.audio.tick_ms = 1;

    s.controls.volume_step = 0;
    assert!(s.validate().is_err());
}

#[test]
fn default_settings_render_as_toml() {
    let text = Settings::default().to_toml().unwrap();
    assert!(text.contains("[playback]"));
    assert!(text.contains("repeat = \"off\""));
    assert!(text.contains("fft_size = 256"));
    assert!(text.contains("[logging]"));
}
