//! UI rendering helpers for the terminal user interface.
//!
//! Everything here reads the `App` model and draws it with `ratatui`; no
//! state is changed while drawing.

use std::time::Duration;

use image::RgbImage;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, LineGauge, List, ListItem, ListState, Padding,
        Paragraph, Wrap,
        canvas::{Canvas, Line as CanvasLine},
    },
};

use crate::app::{App, NoticeLevel, SEARCH_THUMB_WIDTH, SearchFocus};
use crate::audio::PlaybackState;

const PLAYED_COLOR: Color = Color::Rgb(170, 0, 170);
const UNPLAYED_COLOR: Color = Color::DarkGray;
const WAVEFORM_ROWS: u16 = 6;

const CONTROLS: &[(&str, &str)] = &[
    ("space/p", "play/pause"),
    ("h/l", "prev/next"),
    ("←/→", "seek"),
    ("0-9", "jump"),
    ("j/k", "select"),
    ("enter", "play selected"),
    ("J/K", "move"),
    ("s", "shuffle"),
    ("d", "remove"),
    ("C", "clear"),
    ("o", "load folder"),
    ("a", "add path"),
    ("+/-", "volume"),
    ("m", "mute"),
    ("/", "youtube"),
    ("q", "quit"),
];

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Format a `Duration` as `M:SS`.
fn format_mss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Two pixel rows per terminal row: the upper half block takes the top
/// pixel as foreground and the bottom pixel as background.
fn art_lines(art: &RgbImage) -> Vec<Line<'static>> {
    let (w, h) = art.dimensions();
    (0..h)
        .step_by(2)
        .map(|y| {
            let spans: Vec<Span> = (0..w)
                .map(|x| {
                    let [tr, tg, tb] = art.get_pixel(x, y).0;
                    let bottom = if y + 1 < h { art.get_pixel(x, y + 1).0 } else { [0, 0, 0] };
                    Span::styled(
                        "▀",
                        Style::default()
                            .fg(Color::Rgb(tr, tg, tb))
                            .bg(Color::Rgb(bottom[0], bottom[1], bottom[2])),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Terminal cells needed for `pixels`, saturating at the terminal's limit.
fn cells(pixels: u32) -> u16 {
    u16::try_from(pixels).unwrap_or(u16::MAX)
}

fn volume_text(app: &App) -> String {
    if app.engine.is_muted() {
        "Muted".to_string()
    } else {
        format!("Vol {:.0}%", app.engine.volume() * 100.0)
    }
}

fn state_color(state: PlaybackState) -> Color {
    match state {
        PlaybackState::Playing => Color::Green,
        PlaybackState::Paused => Color::Yellow,
        PlaybackState::Stopped => Color::DarkGray,
    }
}

/// Render the entire UI into the provided `frame` from `app`.
pub fn draw(frame: &mut Frame, app: &App) {
    let ui = &app.settings.ui;
    let art_rows = if ui.show_art { cells(ui.art_height).div_ceil(2) } else { 0 };
    let panel_height = art_rows.max(5) + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(panel_height),
            Constraint::Length(WAVEFORM_ROWS + 2),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" casanova ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    draw_now_playing(frame, app, chunks[1]);
    draw_waveform(frame, app, chunks[2]);
    draw_playlist(frame, app, chunks[3]);

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);

    if app.search.open {
        draw_search(frame, app, frame.area());
    }
    if let Some(input) = &app.prompt {
        draw_prompt(frame, input, frame.area());
    }
    if app.notice.is_some() {
        draw_notice(frame, app, frame.area());
    }
}

fn draw_now_playing(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::bordered().title(" now playing ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let ui = &app.settings.ui;
    let info_area = if ui.show_art {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(cells(ui.art_width).saturating_add(1)), Constraint::Min(10)])
            .split(inner);
        let art = match &app.now_playing.art {
            Some(art) => art_lines(art),
            None => art_lines(&crate::media::art::placeholder(ui.art_width, ui.art_height)),
        };
        frame.render_widget(Paragraph::new(art), cols[0]);
        cols[1]
    } else {
        inner
    };

    let state = app.engine.state();
    let np = &app.now_playing;
    let lines = vec![
        Line::from(np.title.clone().bold()),
        Line::from(np.subtitle.clone().fg(Color::Gray)),
        Line::from(""),
        Line::from(vec![
            Span::styled(state.label(), Style::default().fg(state_color(state))),
            Span::raw("  "),
            Span::raw(format!(
                "{} / {}",
                format_mss(app.engine.elapsed()),
                format_mss(app.engine.duration())
            )),
        ]),
        Line::from(volume_text(app).fg(Color::Gray)),
    ];
    let info = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .wrap(Wrap { trim: true });
    frame.render_widget(info, info_area);
}

fn draw_waveform(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::bordered().title(" waveform ");
    let heights = &app.now_playing.waveform;
    if heights.is_empty() {
        let empty = Paragraph::new("No waveform")
            .alignment(Alignment::Center)
            .fg(UNPLAYED_COLOR)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let half = f64::from(app.settings.ui.waveform_height.max(2)) / 2.0;
    let len = heights.len();
    let progress = app.engine.progress_percent() / 100.0;

    let canvas = Canvas::default()
        .block(block)
        .x_bounds([0.0, len as f64])
        .y_bounds([-half, half])
        .paint(|ctx| {
            for (idx, amp) in heights.iter().enumerate() {
                let hgt = f64::from(*amp).min(half);
                let color = if (idx as f64 / len as f64) < progress {
                    PLAYED_COLOR
                } else {
                    UNPLAYED_COLOR
                };
                ctx.draw(&CanvasLine {
                    x1: idx as f64,
                    y1: -hgt,
                    x2: idx as f64,
                    y2: hgt,
                    color,
                });
            }
        });
    frame.render_widget(canvas, area);
}

fn draw_playlist(frame: &mut Frame, app: &App, area: Rect) {
    let playing = app.playing_index();
    let items: Vec<ListItem> = app
        .playlist
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if Some(i) == playing { "♪ " } else { "  " };
            let dur = track.duration.map(format_mss).unwrap_or_default();
            let line = Line::from(vec![
                Span::raw(marker),
                Span::raw(track.name.clone()),
                Span::raw("  "),
                Span::styled(dur, Style::default().fg(Color::DarkGray)),
            ]);
            let item = ListItem::new(line);
            if Some(i) == playing {
                item.fg(PLAYED_COLOR)
            } else {
                item
            }
        })
        .collect();

    let title = format!(" playlist ({}) ", app.playlist.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if app.has_tracks() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_search(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect_sized(90, 24, area);
    frame.render_widget(Clear, popup);

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .title(" YouTube search ")
        .title_bottom(" tab focus | enter search/download | esc close ")
        .title_alignment(Alignment::Center);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(inner);

    let search = &app.search;
    let query_style = if search.focus == SearchFocus::Query {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let query = Paragraph::new(format!("{}_", search.query))
        .block(Block::bordered().title(" query ").border_style(query_style));
    frame.render_widget(query, rows[0]);

    frame.render_widget(
        Paragraph::new(search.status.as_str()).fg(Color::Gray),
        rows[1],
    );

    let items: Vec<ListItem> = search
        .results
        .iter()
        .map(|r| {
            ListItem::new(Line::from(vec![
                Span::raw(r.title.clone()).bold(),
                Span::raw("  "),
                Span::styled(r.channel.clone(), Style::default().fg(Color::Gray)),
                Span::raw("  "),
                Span::styled(r.duration_text.clone(), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();
    let results_style = if search.focus == SearchFocus::Results {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(Block::bordered().title(" results ").border_style(results_style))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !search.results.is_empty() {
        state.select(Some(search.selected));
    }
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(20),
            Constraint::Length(cells(SEARCH_THUMB_WIDTH) + 2),
        ])
        .split(rows[2]);
    frame.render_stateful_widget(list, cols[0], &mut state);

    let preview = Block::bordered().title(" preview ");
    let preview_body = match search.thumbnails.get(&search.selected) {
        Some(thumb) if !search.results.is_empty() => Paragraph::new(art_lines(thumb)),
        _ => Paragraph::new("no preview")
            .alignment(Alignment::Center)
            .fg(UNPLAYED_COLOR),
    };
    frame.render_widget(preview_body.block(preview), cols[1]);

    let dl = &search.download;
    if dl.active || !dl.text.is_empty() {
        let ratio = f64::from(dl.percent / 100.0).clamp(0.0, 1.0);
        let gauge = LineGauge::default()
            .filled_style(Style::default().fg(PLAYED_COLOR))
            .unfilled_style(Style::default().fg(UNPLAYED_COLOR))
            .label(format!("{} {:.0}%", dl.text, dl.percent))
            .ratio(ratio);
        frame.render_widget(gauge, rows[3]);
    }
}

fn draw_prompt(frame: &mut Frame, input: &str, area: Rect) {
    let popup = centered_rect_sized(70, 3, area);
    frame.render_widget(Clear, popup);
    let prompt = Paragraph::new(format!("{input}_")).block(
        Block::bordered()
            .title(" add file or folder (enter adds, esc cancels) ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(prompt, popup);
}

fn draw_notice(frame: &mut Frame, app: &App, area: Rect) {
    let Some(notice) = &app.notice else {
        return;
    };
    let lines = notice.message.lines().count() as u16;
    let popup = centered_rect_sized(64, lines + 4, area);
    frame.render_widget(Clear, popup);

    let color = match notice.level {
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::LightRed,
    };
    let body = Paragraph::new(notice.message.as_str())
        .wrap(Wrap { trim: true })
        .centered()
        .block(
            Block::bordered()
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", notice.title))
                .title_bottom(" press any key ")
                .title_alignment(Alignment::Center)
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(body, popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use ratatui::{Terminal, backend::TestBackend};

    use crate::config::Settings;
    use crate::test_util::fake_engine;

    #[test]
    fn mss_has_unpadded_minutes() {
        assert_eq!(format_mss(Duration::from_secs(0)), "0:00");
        assert_eq!(format_mss(Duration::from_secs(185)), "3:05");
    }

    #[test]
    fn art_uses_half_blocks_per_two_rows() {
        let mut img = RgbImage::from_pixel(3, 4, Rgb([1, 2, 3]));
        img.put_pixel(0, 1, Rgb([9, 9, 9]));
        let lines = art_lines(&img);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 3);
        let style = lines[0].spans[0].style;
        assert_eq!(style.fg, Some(Color::Rgb(1, 2, 3)));
        assert_eq!(style.bg, Some(Color::Rgb(9, 9, 9)));
    }

    #[test]
    fn centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 40, 10);
        let r = centered_rect_sized(100, 100, outer);
        assert!(r.width <= 38 && r.height <= 8);
        assert_eq!(r.x, 1);
    }

    #[test]
    fn draws_every_overlay_without_panicking() {
        let (engine, _, _) = fake_engine();
        let mut app = App::new(engine, Settings::default());
        app.add_paths(vec!["/music/a.mp3".into(), "/music/b.mp3".into()]);
        app.now_playing.waveform = vec![1.0, 4.0, 8.0, 2.0];
        app.open_search();
        app.open_prompt();
        app.notice = Some(crate::app::Notice::info("Loaded", "two\nlines"));

        let mut terminal = Terminal::new(TestBackend::new(120, 60)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("casanova"));
        assert!(text.contains("Loaded"));
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 60)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn search_overlay_shows_selected_thumbnail() {
        let (engine, _, _) = fake_engine();
        let mut settings = Settings::default();
        settings.ui.show_art = false;
        let mut app = App::new(engine, settings);
        app.open_search();
        app.search.results = vec![crate::download::SearchResult {
            id: "a".to_string(),
            title: "Song".to_string(),
            duration_secs: 5,
            duration_text: "0:05".to_string(),
            channel: "Chan".to_string(),
            url: "https://www.youtube.com/watch?v=a".to_string(),
            thumbnail: String::new(),
        }];
        assert!(screen_text(&app).contains("no preview"));

        app.search
            .thumbnails
            .insert(0, RgbImage::from_pixel(SEARCH_THUMB_WIDTH, 4, Rgb([200, 0, 0])));
        let text = screen_text(&app);
        assert!(!text.contains("no preview"));
        assert!(text.contains("▀"));
    }

    #[test]
    fn oversized_art_settings_do_not_overflow() {
        let (engine, _, _) = fake_engine();
        let mut settings = Settings::default();
        settings.ui.art_width = 70_000;
        settings.ui.art_height = 4;
        let app = App::new(engine, settings);
        assert_eq!(cells(70_000), u16::MAX);
        assert!(screen_text(&app).contains("casanova"));
    }
}
