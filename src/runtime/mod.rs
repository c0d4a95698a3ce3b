use std::env;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};

use anyhow::Context;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::{PlaybackEngine, RodioBackend, SystemClock};
use crate::logging;
use crate::mpris::ControlCmd;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;
mod workers;

pub fn run() -> anyhow::Result<()> {
    let (settings, config_problem) = settings::load_settings();

    match logging::init(&settings.logging) {
        Ok(path) => info!(log = %path.display(), "casanova starting"),
        Err(e) => eprintln!("casanova: logging disabled: {e}"),
    }
    if let Some(msg) = config_problem {
        warn!("{msg}");
    }
    settings::write_template();

    let cli_paths: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();

    let backend = RodioBackend::new(settings.audio.default_volume);
    let engine = PlaybackEngine::new(Box::new(backend), Arc::new(SystemClock));
    let mut app = App::new(engine, settings);
    startup::populate_playlist(&mut app, &cli_paths);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    let (worker_tx, worker_rx) = mpsc::channel();
    let channels = event_loop::Channels {
        control_rx,
        worker_tx,
        worker_rx,
    };

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let run_result = event_loop::run(&mut terminal, &mut app, &mpris, &channels);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("casanova exiting");
    run_result
}
