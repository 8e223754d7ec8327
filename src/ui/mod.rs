mod app;
mod draw;
mod presenter;

pub use app::App;
pub use presenter::{TerminalPresenter, VisualState};

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::session::PatternPreset;

/// Animation cadence for the circle and particles.
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|f| draw::draw(f, app))?;

        let timeout = FRAME_INTERVAL.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.quit(),
                        KeyCode::Char(' ') => app.toggle_session(),
                        KeyCode::Esc => app.stop_session(),
                        KeyCode::Char('1') => app.select_preset(PatternPreset::Box),
                        KeyCode::Char('2') => app.select_preset(PatternPreset::Relax),
                        KeyCode::Char('3') => app.select_preset(PatternPreset::Coherent),
                        KeyCode::Char('h') | KeyCode::Char('?') => app.toggle_help(),
                        _ => {}
                    }
                }
            }
        }

        if last_frame.elapsed() >= FRAME_INTERVAL {
            app.on_tick();
            last_frame = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
