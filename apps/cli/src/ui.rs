use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Sparkline},
};

use kara_lyrics_sync::{DisplayMode, LyricLine, ScrollMode};

use crate::app::{App, FrameView};
use crate::layout::RowLayout;

const ENERGY_HEIGHT: u16 = 4;

fn areas(area: Rect) -> [Rect; 5] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(ENERGY_HEIGHT),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area)
}

/// The rectangle the lyric list is drawn into for a terminal of `area`.
pub fn lyrics_viewport(area: Rect) -> Rect {
    areas(area)[1]
}

pub fn render(frame: &mut Frame, app: &App) {
    let [header_area, lyrics_area, energy_area, timeline_area, hint_area] = areas(frame.area());

    render_header(frame, app, header_area);
    render_lyrics(frame, app, lyrics_area);
    render_energy(frame, app, energy_area);
    render_timeline(frame, app, timeline_area);
    render_hints(frame, hint_area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.is_playing() {
        "▶ PLAYING"
    } else {
        "⏸ PAUSED"
    };
    let scroll = match app.scroll_mode() {
        ScrollMode::Auto => "AUTO",
        ScrollMode::Manual => "MANUAL",
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.title),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "| {} | {:.1}s | offset {:+.2}s | {} ",
                status,
                app.position(),
                app.offset(),
                scroll
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if app.reduced_motion() {
        spans.push(Span::styled(
            "| reduced motion ",
            Style::default().fg(Color::Yellow),
        ));
    }
    if app.live_energy() {
        let pitch = app
            .pitch()
            .and_then(|reading| reading.frequency_hz)
            .map_or_else(|| "–".to_string(), |hz| format!("{hz:.0} Hz"));
        spans.push(Span::styled(
            format!("| live {pitch} "),
            Style::default().fg(Color::Cyan),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_lyrics(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();
    let mut rows: Vec<Line> = Vec::with_capacity(app.lines().len() * RowLayout::SPACING as usize);

    for (index, line) in app.lines().iter().enumerate() {
        let row = match view.line {
            Some(active) if active == index => active_line(line, view),
            Some(active) if index < active => {
                Line::styled(line.text.clone(), Style::default().fg(Color::DarkGray))
            }
            _ => Line::styled(line.text.clone(), Style::default().fg(Color::Gray)),
        };
        rows.push(row.centered());
        for _ in 1..RowLayout::SPACING {
            rows.push(Line::raw(""));
        }
    }

    if rows.is_empty() {
        rows.push(
            Line::styled("no lyrics", Style::default().fg(Color::DarkGray)).centered(),
        );
    }

    let top = app.scroll_top().round().clamp(0.0, f64::from(u16::MAX)) as u16;
    frame.render_widget(
        Paragraph::new(rows).block(Block::default()).scroll((top, 0)),
        area,
    );
}

fn sung() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn unsung() -> Style {
    Style::default().fg(Color::White)
}

/// `text` split at `progress` of its characters.
fn split_at_progress(text: &str, progress: f64) -> (&str, &str) {
    let count = text.chars().count();
    let filled = (count as f64 * progress.clamp(0.0, 1.0)).round() as usize;
    let byte = text
        .char_indices()
        .nth(filled)
        .map_or(text.len(), |(i, _)| i);
    text.split_at(byte)
}

fn active_line(line: &LyricLine, view: &FrameView) -> Line<'static> {
    match view.display_mode {
        DisplayMode::Karaoke => {
            let mut spans = Vec::with_capacity(line.words.len() * 2);
            for (index, word) in line.words.iter().enumerate() {
                if index > 0 {
                    spans.push(Span::raw(" "));
                }
                match view.word {
                    Some(current) if index < current => {
                        spans.push(Span::styled(word.text.clone(), sung()));
                    }
                    Some(current) if index == current => {
                        let (done, rest) = split_at_progress(&word.text, view.word_progress);
                        spans.push(Span::styled(done.to_string(), sung()));
                        spans.push(Span::styled(rest.to_string(), unsung()));
                    }
                    _ => spans.push(Span::styled(word.text.clone(), unsung())),
                }
            }
            Line::from(spans)
        }
        DisplayMode::Line => {
            let (done, rest) = split_at_progress(&line.text, view.line_progress);
            Line::from(vec![
                Span::styled(done.to_string(), sung()),
                Span::styled(rest.to_string(), unsung()),
            ])
        }
    }
}

fn render_energy(frame: &mut Frame, app: &App, area: Rect) {
    let readout = app.energy();
    let title = if readout.idle {
        " energy (idle) ".to_string()
    } else {
        format!(" energy {:.2} ", readout.smoothed)
    };
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(title, Style::default().fg(Color::DarkGray)));

    let data: Vec<u64> = app
        .energy_history()
        .map(|value| (value.clamp(0.0, 1.0) * 100.0).round() as u64)
        .collect();
    frame.render_widget(
        Sparkline::default()
            .block(block)
            .data(data)
            .max(100)
            .style(Style::default().fg(Color::Magenta)),
        area,
    );
}

fn render_timeline(frame: &mut Frame, app: &App, area: Rect) {
    let duration = app.duration();
    let ratio = if duration > 0.0 {
        (app.position() / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let label = match app.view().line {
        Some(line) => format!("line {}/{}", line + 1, app.lines().len()),
        None if app.view().before_start => "intro".to_string(),
        None => String::new(),
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::White).bg(Color::DarkGray))
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, area);
}

fn render_hints(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(
            " [Space] play/pause  [←/→] seek  [[/]] offset  [0] reset offset  [↑/↓] scroll  [m] motion  [e] live energy  [q] quit ",
        )
        .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
