use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::{App, SearchFocus, WorkerMsg};
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::MprisSync;
use crate::runtime::workers;
use crate::ui;

const INPUT_POLL: Duration = Duration::from_millis(50);

/// Channels the event loop reads from and hands to workers.
pub struct Channels {
    pub control_rx: mpsc::Receiver<ControlCmd>,
    pub worker_tx: mpsc::Sender<WorkerMsg>,
    pub worker_rx: mpsc::Receiver<WorkerMsg>,
}

/// Main terminal event loop: handles input, UI drawing, worker results and
/// MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    mpris: &MprisHandle,
    channels: &Channels,
) -> anyhow::Result<()> {
    let tick_every = Duration::from_millis(app.settings.audio.update_interval_ms);
    let mut last_tick = Instant::now();
    let mut sync = MprisSync::default();

    loop {
        for job in app.take_jobs() {
            workers::spawn_job(job, &app.settings, channels.worker_tx.clone());
        }

        let now = Instant::now();
        while let Ok(msg) = channels.worker_rx.try_recv() {
            app.apply_worker_msg(msg, now);
        }
        if now.duration_since(last_tick) >= tick_every {
            app.tick(now);
            last_tick = now;
        }

        sync.update(mpris, app);
        terminal.draw(|f| ui::draw(f, app))?;

        while let Ok(cmd) = channels.control_rx.try_recv() {
            if handle_control_cmd(cmd, app) {
                return Ok(());
            }
        }

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply a desktop media command. Returns `true` on quit.
fn handle_control_cmd(cmd: ControlCmd, app: &mut App) -> bool {
    match cmd {
        ControlCmd::Quit => {
            info!("quit requested over MPRIS");
            app.engine.stop();
            return true;
        }
        ControlCmd::Play => {
            if !app.engine.is_playing() {
                app.play_pause_toggle();
            }
        }
        ControlCmd::Pause => app.engine.pause(),
        ControlCmd::PlayPause => app.play_pause_toggle(),
        ControlCmd::Stop => app.engine.stop(),
        ControlCmd::Next => app.next_track(),
        ControlCmd::Prev => app.prev_track(),
    }
    false
}

/// Route a key press to whichever layer has focus. Returns `true` on quit.
fn handle_key_event(key: KeyEvent, app: &mut App) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.engine.stop();
        return true;
    }

    if app.notice.is_some() {
        app.dismiss_notice();
        return false;
    }

    if app.prompt.is_some() {
        match key.code {
            KeyCode::Esc => app.cancel_prompt(),
            KeyCode::Enter => app.submit_prompt(),
            KeyCode::Backspace => app.prompt_pop(),
            KeyCode::Char(c) if !c.is_control() => app.prompt_push(c),
            _ => {}
        }
        return false;
    }

    if app.search.open {
        handle_search_key(key, app);
        return false;
    }

    let seek_step = app.settings.audio.seek_step as i64;
    let volume_step = app.settings.audio.volume_step;
    match key.code {
        KeyCode::Char('q') => {
            app.engine.stop();
            return true;
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => app.play_pause_toggle(),
        KeyCode::Char('l') => app.next_track(),
        KeyCode::Char('h') => app.prev_track(),
        KeyCode::Right | KeyCode::Char('L') => app.seek_relative(seek_step),
        KeyCode::Left | KeyCode::Char('H') => app.seek_relative(-seek_step),
        KeyCode::Char(c @ '0'..='9') => {
            let tenths = c.to_digit(10).unwrap_or(0);
            app.seek_percent(f64::from(tenths) * 10.0);
        }
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter => app.play_selected(),
        KeyCode::Char('J') => app.move_selected_down(),
        KeyCode::Char('K') => app.move_selected_up(),
        KeyCode::Char('s') => app.shuffle(),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_selected(),
        KeyCode::Char('C') => app.clear_playlist(),
        KeyCode::Char('o') => app.load_default_folder(),
        KeyCode::Char('a') => app.open_prompt(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_volume(volume_step),
        KeyCode::Char('-') => app.change_volume(-volume_step),
        KeyCode::Char('m') => app.toggle_mute(),
        KeyCode::Char('/') => app.open_search(),
        _ => {}
    }

    false
}

fn handle_search_key(key: KeyEvent, app: &mut App) {
    match (key.code, app.search.focus) {
        (KeyCode::Esc, _) => app.close_search(),
        (KeyCode::Tab, _) => app.toggle_search_focus(),
        (KeyCode::Enter, SearchFocus::Query) => app.submit_search(),
        (KeyCode::Backspace, SearchFocus::Query) => app.search_pop_char(),
        (KeyCode::Down, SearchFocus::Query) => app.toggle_search_focus(),
        (KeyCode::Char(c), SearchFocus::Query) if !c.is_control() => app.search_push_char(c),
        (KeyCode::Enter, SearchFocus::Results) => app.download_selected(),
        (KeyCode::Char('j') | KeyCode::Down, SearchFocus::Results) => app.search_select_next(),
        (KeyCode::Char('k') | KeyCode::Up, SearchFocus::Results) => app.search_select_prev(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app::{Job, Notice};
    use crate::audio::PlaybackState;
    use crate::config::Settings;
    use crate::test_util::fake_engine;

    fn app() -> App {
        let (engine, _, _) = fake_engine();
        let mut app = App::new(engine, Settings::default());
        app.add_paths(vec![PathBuf::from("/m/a.mp3"), PathBuf::from("/m/b.mp3")]);
        app
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn quit_keys_stop_the_loop() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(handle_key_event(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut app
        ));
        assert!(!press(&mut app, KeyCode::Char('x')));
    }

    #[test]
    fn playback_keys_drive_the_engine() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.engine.state(), PlaybackState::Playing);
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.engine.state(), PlaybackState::Paused);

        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.playing_index(), Some(1));
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.playing_index(), Some(0));

        press(&mut app, KeyCode::Char('m'));
        assert!(app.engine.is_muted());
        press(&mut app, KeyCode::Char('+'));
        assert!(!app.engine.is_muted());
    }

    #[test]
    fn selection_keys_move_and_reorder() {
        let mut app = app();
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected, 1);
        press(&mut app, KeyCode::Char('K'));
        assert_eq!(app.selected, 0);
        assert_eq!(app.playlist.display_names(), vec!["b.mp3", "a.mp3"]);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.playlist.len(), 1);
        press(&mut app, KeyCode::Char('C'));
        assert!(app.playlist.is_empty());
    }

    #[test]
    fn notice_swallows_the_next_key() {
        let mut app = app();
        app.notice = Some(Notice::info("Hi", "there"));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(app.notice.is_none());
    }

    #[test]
    fn prompt_captures_text() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "q/x");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.prompt.as_deref(), Some("q/"));
        press(&mut app, KeyCode::Esc);
        assert!(app.prompt.is_none());
        assert_eq!(app.playlist.len(), 2);
    }

    #[test]
    fn search_overlay_takes_typing_and_submits() {
        let mut app = app();
        app.take_jobs();
        press(&mut app, KeyCode::Char('/'));
        assert!(app.search.open);

        type_text(&mut app, "jazz q");
        assert_eq!(app.search.query, "jazz q");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.take_jobs(), vec![Job::Search("jazz q".to_string())]);

        press(&mut app, KeyCode::Esc);
        assert!(!app.search.open);
    }

    #[test]
    fn control_commands_map_to_actions() {
        let mut app = app();
        assert!(!handle_control_cmd(ControlCmd::Play, &mut app));
        assert!(app.engine.is_playing());
        handle_control_cmd(ControlCmd::Pause, &mut app);
        assert!(app.engine.is_paused());
        handle_control_cmd(ControlCmd::PlayPause, &mut app);
        assert!(app.engine.is_playing());
        handle_control_cmd(ControlCmd::Next, &mut app);
        assert_eq!(app.playing_index(), Some(1));
        handle_control_cmd(ControlCmd::Stop, &mut app);
        assert_eq!(app.engine.state(), PlaybackState::Stopped);
        assert!(handle_control_cmd(ControlCmd::Quit, &mut app));
    }
}
