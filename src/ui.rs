use std::io;

use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, BorderType, Borders, Paragraph,
    },
    Frame, Terminal,
};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::{
    app::App,
    error::Result,
    push::PushState,
    status::{StatusField, StatusUpdate},
    util::{format_rate, format_total},
    window::WindowSnapshot,
};

pub async fn run(
    app: App,
    snapshots: watch::Receiver<WindowSnapshot>,
    push_state: watch::Receiver<PushState>,
    status: mpsc::Receiver<StatusUpdate>,
    cancel: CancellationToken,
) -> Result<()> {
    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app_loop(&mut terminal, app, snapshots, push_state, status, cancel).await;

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    mut snapshots: watch::Receiver<WindowSnapshot>,
    mut push_state: watch::Receiver<PushState>,
    mut status: mpsc::Receiver<StatusUpdate>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut events = EventStream::new();
    let (mut snapshots_open, mut push_open, mut status_open) = (true, true, true);
    app.on_push_state(*push_state.borrow_and_update());

    loop {
        terminal.draw(|f| draw(f, &app))?;

        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            changed = snapshots.changed(), if snapshots_open => match changed {
                Ok(()) => {
                    let snapshot = snapshots.borrow_and_update().clone();
                    app.on_snapshot(snapshot);
                }
                Err(_) => snapshots_open = false,
            },
            changed = push_state.changed(), if push_open => match changed {
                Ok(()) => app.on_push_state(*push_state.borrow_and_update()),
                Err(_) => push_open = false,
            },
            update = status.recv(), if status_open => match update {
                Some(update) => {
                    app.on_status(update);
                }
                None => status_open = false,
            },
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
                    if ctrl_c || key.code == KeyCode::Char('q') || key.code == KeyCode::Esc {
                        return Ok(());
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => return Ok(()),
            },
        }
    }
}

fn draw(f: &mut Frame, app: &App) {
    // ============= whole screen layout ============
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Chart box
            Constraint::Length(7), // Status fields
            Constraint::Length(1), // Bottom bar
        ].as_ref())
        .split(f.size());

    // ============= Top Events Box ============
    let events_block = Block::default()
        .borders(Borders::ALL)
        .title(" Events ")
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(events_block.clone(), main_chunks[0]);

    let inner_area = events_block.inner(main_chunks[0]);
    let graph_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)].as_ref())
        .split(inner_area);

    let samples = &app.snapshot.samples;
    let (y_min, y_max) = app.snapshot.value_bounds();
    let x_limit = samples.len().saturating_sub(1).max(1) as f64;

    // Join neighbouring observed samples; placeholders leave a gap
    let chart = Canvas::default()
        .block(Block::default().title(" events / tick ").title_style(Style::default().fg(Color::Green)))
        .marker(Marker::Braille)
        .x_bounds([0.0, x_limit])
        .y_bounds([y_min, y_max * 1.1])
        .paint(|ctx| {
            for (i, pair) in samples.windows(2).enumerate() {
                if let (Some(a), Some(b)) = (pair[0].value, pair[1].value) {
                    ctx.draw(&CanvasLine {
                        x1: i as f64,
                        y1: a as f64,
                        x2: (i + 1) as f64,
                        y2: b as f64,
                        color: Color::Green,
                    });
                }
            }
        });
    f.render_widget(chart, graph_chunks[0]);

    // textual stats on the right
    let rate_text = vec![
        Line::from(vec![Span::raw("● "), Span::styled(format_rate(app.current_rate()), Style::default().fg(Color::White).add_modifier(Modifier::BOLD))]),
        Line::from(vec![Span::styled("  Peak: ", Style::default().fg(Color::DarkGray)), Span::raw(format_rate(app.peak_rate()))]),
        Line::from(vec![Span::styled("  At:   ", Style::default().fg(Color::DarkGray)), Span::raw(app.peak_record.1.format("%H:%M:%S").to_string())]),
        Line::from(vec![Span::styled("  Tot:  ", Style::default().fg(Color::DarkGray)), Span::raw(format_total(app.total_events))]),
    ];
    f.render_widget(Paragraph::new(rate_text).block(Block::default().style(Style::default().fg(Color::Green))), graph_chunks[1]);

    // ============= Status Fields ============
    let status_lines: Vec<Line> = StatusField::ALL
        .iter()
        .map(|&field| {
            Line::from(vec![
                Span::styled(format!(" {:<12}", field.label()), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::raw(app.status.get(field).to_string()),
            ])
        })
        .collect();
    let status_panel = Paragraph::new(status_lines)
        .block(Block::default().title(" Status ").borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(status_panel, main_chunks[1]);

    // ============ Bottom Status Bar ============
    let link_color = match app.push_state {
        PushState::Connected => Color::Green,
        PushState::Connecting => Color::Yellow,
        PushState::Reconnecting => Color::Red,
    };
    let status_content = Line::from(vec![
        Span::styled(" PUSH ", Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(app.push_state.label(), Style::default().fg(link_color).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::styled("SCALE: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("{} ", app.snapshot.scale)),
        Span::raw(" | "),
        Span::styled("TICK: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("{} ", app.snapshot.tick)),
        Span::raw(" | Press 'q' to quit"),
    ]);

    let status_bar = Paragraph::new(status_content)
        .style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(status_bar, main_chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    use crate::{
        status::StatusReport,
        window::{Sample, SlidingWindow},
    };

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn draws_status_fields_and_bar() {
        let now = Local::now();
        let mut window = SlidingWindow::new_at(20, Duration::from_millis(250), 4, now);
        window.append(Sample::observed(now, 3));
        window.append(Sample::observed(now, 9));
        let mut app = App::new(window.snapshot(2), Duration::from_millis(250));
        app.on_push_state(PushState::Connected);
        app.on_status(StatusUpdate {
            seq: 10,
            report: StatusReport {
                health_text: Some("OK".into()),
                ..StatusReport::default()
            },
        });

        let screen = rendered(&app);
        assert!(screen.contains("Health"));
        assert!(screen.contains("OK"));
        assert!(screen.contains("live"));
        assert!(screen.contains("SCALE: 1"));
        assert!(screen.contains("36.0 /s"));
    }
}
