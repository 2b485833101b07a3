use std::env;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{PlaybackCoordinator, RodioEndpoint};
use crate::config::Settings;
use crate::logging;
use crate::mpris::ControlCmd;

mod event_loop;
mod keys;
mod mpris_sync;
mod settings;
mod startup;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = startup::parse_args(env::args_os().skip(1));

    if cli.print_config {
        print!("{}", Settings::default().to_toml()?);
        return Ok(());
    }

    let (settings, config_note) = settings::load_settings();
    if let Some(note) = &config_note {
        eprintln!("playdeck: {note}");
    }
    match logging::init(&settings.logging) {
        Ok(Some(path)) => info!("logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => eprintln!("playdeck: could not open log file, logging disabled: {e}"),
    }
    if let Some(note) = config_note {
        warn!("{note}");
    }

    let playlist = startup::build_playlist(&cli.paths, &settings.library);
    if playlist.is_empty() {
        warn!("no playable files found in {:?}", cli.paths);
    }

    let endpoint = RodioEndpoint::open()?;
    let mut coordinator = PlaybackCoordinator::new(endpoint, startup::player_options(&settings));
    coordinator.set_tracks(playlist.tracks().to_vec());

    let mut app = App::new(playlist);
    app.follow_playback = settings.ui.follow_playback;

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut coordinator,
            &mpris,
            &control_rx,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Stops the sink and releases the output stream.
    drop(coordinator);
    run_result
}
