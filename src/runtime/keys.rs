//! Key bindings.
//!
//! Keys and MPRIS commands both resolve to an `Action`; the event loop is
//! the only place actions are applied.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;
use crate::mpris::ControlCmd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePlay,
    Play,
    Pause,
    Stop,
    Next,
    Prev,
    PlaySelected,
    CursorDown,
    CursorUp,
    CursorTop,
    CursorBottom,
    JumpToPlaying,
    ScrubForward,
    ScrubBack,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    ToggleShuffle,
    CycleRepeat,
    ToggleAutoplay,
    ToggleMetadata,
    ToggleSelectionMode,
    ToggleMark,
    ToggleMarkAll,
    RequestDelete,
    ConfirmDelete,
    CancelDelete,
    Escape,
}

impl From<ControlCmd> for Action {
    fn from(cmd: ControlCmd) -> Self {
        match cmd {
            ControlCmd::Quit => Self::Quit,
            ControlCmd::Play => Self::Play,
            ControlCmd::Pause => Self::Pause,
            ControlCmd::PlayPause => Self::TogglePlay,
            ControlCmd::Stop => Self::Stop,
            ControlCmd::Next => Self::Next,
            ControlCmd::Prev => Self::Prev,
        }
    }
}

/// Two-key prefixes (`gg`, `zz`) waiting for their second key.
#[derive(Debug, Default)]
pub struct PendingKeys {
    g: bool,
    z: bool,
}

impl PendingKeys {
    fn clear(&mut self) {
        self.g = false;
        self.z = false;
    }
}

/// Resolve a key press against the current view.
pub fn map_key(key: KeyEvent, app: &App, pending: &mut PendingKeys) -> Option<Action> {
    // The delete confirmation swallows everything else.
    if app.pending_delete.is_some() {
        pending.clear();
        return match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(Action::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => Some(Action::CancelDelete),
            _ => None,
        };
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        pending.clear();
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('n') => Some(Action::CursorDown),
            KeyCode::Char('p') => Some(Action::CursorUp),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('g') => {
            let second = pending.g;
            pending.clear();
            if second {
                return Some(Action::CursorTop);
            }
            pending.g = true;
            return None;
        }
        KeyCode::Char('z') => {
            let second = pending.z;
            pending.clear();
            if second {
                return Some(Action::JumpToPlaying);
            }
            pending.z = true;
            return None;
        }
        _ => pending.clear(),
    }

    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char(' ') | KeyCode::Char('p') => Action::TogglePlay,
        KeyCode::Char('l') => Action::Next,
        KeyCode::Char('h') => Action::Prev,
        KeyCode::Char('L') | KeyCode::Right => Action::ScrubForward,
        KeyCode::Char('H') | KeyCode::Left => Action::ScrubBack,
        KeyCode::Char('j') | KeyCode::Down => Action::CursorDown,
        KeyCode::Char('k') | KeyCode::Up => Action::CursorUp,
        KeyCode::Char('G') | KeyCode::End => Action::CursorBottom,
        KeyCode::Home => Action::CursorTop,
        KeyCode::Enter => Action::PlaySelected,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::VolumeUp,
        KeyCode::Char('-') => Action::VolumeDown,
        KeyCode::Char('m') => Action::ToggleMute,
        KeyCode::Char('s') => Action::ToggleShuffle,
        KeyCode::Char('r') => Action::CycleRepeat,
        KeyCode::Char('a') => Action::ToggleAutoplay,
        KeyCode::Char('K') => Action::ToggleMetadata,
        KeyCode::Char('v') => Action::ToggleSelectionMode,
        KeyCode::Char('x') | KeyCode::Tab => Action::ToggleMark,
        KeyCode::Char('A') => Action::ToggleMarkAll,
        KeyCode::Char('d') | KeyCode::Delete => Action::RequestDelete,
        KeyCode::Esc => Action::Escape,
        _ => return None,
    };
    Some(action)
}
