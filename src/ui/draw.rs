use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Points},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};

use crate::session::{Phase, PatternPreset};

use super::app::App;
use super::presenter::VisualState;

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let visual = app.visual();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Breathing circle
            Constraint::Length(3), // Readouts
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_header(f, &visual, chunks[0]);
    draw_circle(f, app, &visual, chunks[1]);
    draw_readouts(f, app, &visual, chunks[2]);
    draw_footer(f, chunks[3]);

    if app.show_help {
        draw_help_overlay(f);
    }
}

fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Idle => Color::DarkGray,
        Phase::Inhale => Color::Cyan,
        Phase::Hold => Color::Yellow,
        Phase::Exhale => Color::Blue,
    }
}

fn draw_header(f: &mut Frame, visual: &VisualState, area: Rect) {
    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(" breathflow ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" - "),
        Span::styled(
            visual.phase.instruction(),
            Style::default().fg(phase_color(visual.phase)),
        ),
    ])])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn draw_circle(f: &mut Frame, app: &App, visual: &VisualState, area: Rect) {
    let radius = 16.0 * visual.circle_scale();
    let color = phase_color(visual.phase);
    let inhaling = visual.phase == Phase::Inhale;

    let faint: Vec<(f64, f64)> = app
        .particles
        .iter()
        .filter(|p| p.size < 4.5)
        .map(|p| (p.x, p.y))
        .collect();
    let bright: Vec<(f64, f64)> = app
        .particles
        .iter()
        .filter(|p| p.size >= 4.5)
        .map(|p| (p.x, p.y))
        .collect();

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL))
        .marker(Marker::Braille)
        .x_bounds([0.0, 100.0])
        .y_bounds([0.0, 100.0])
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &faint,
                color: Color::DarkGray,
            });
            ctx.draw(&Points {
                coords: &bright,
                color: Color::Gray,
            });
            ctx.layer();

            // Outer ring stands in for the source page's wave effect while
            // breathing in.
            if inhaling {
                ctx.draw(&Circle {
                    x: 50.0,
                    y: 50.0,
                    radius: radius + 4.0,
                    color: Color::DarkGray,
                });
            }
            ctx.draw(&Circle {
                x: 50.0,
                y: 50.0,
                radius,
                color,
            });
        });

    f.render_widget(canvas, area);
}

fn draw_readouts(f: &mut Frame, app: &App, visual: &VisualState, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let pattern_label = match app.preset {
        Some(preset) => preset.label().to_string(),
        None => app.settings.pattern().label(),
    };

    let panels = [
        ("Time", visual.elapsed.clone()),
        ("Cycles", visual.cycles.to_string()),
        ("Pattern", pattern_label),
    ];

    for ((title, value), col) in panels.into_iter().zip(cols.iter()) {
        let panel = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(Color::White).bold(),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Blue)),
        );
        f.render_widget(panel, *col);
    }
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        " space start/stop · esc stop · 1-3 pattern · h help · q quit",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(footer, area);
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(44, 12, f.area());
    f.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("Keys", Style::default().fg(Color::Cyan).bold())),
        Line::from("  space  start or stop a session"),
        Line::from("  esc    stop the session"),
        Line::from("  h / ?  toggle this help"),
        Line::from("  q      quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Patterns",
            Style::default().fg(Color::Cyan).bold(),
        )),
    ];
    for (i, preset) in PatternPreset::ALL.iter().enumerate() {
        lines.push(Line::from(format!("  {}      {}", i + 1, preset.label())));
    }

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(help, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
