//! Terminal User Interface for the knowledge explorer
//!
//! Sources pane (Quivr root and connected providers) on the left, the
//! dispatcher's view of the current folder on the right.

mod app;
pub mod knowledge_view;
mod ui;

pub use app::{App, BackgroundResult, Focus};

use crate::api::Services;
use crate::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::runtime::Handle;

/// Run the TUI application
pub fn run(services: Services, runtime: Handle, studio_path: &str, poll_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(services, runtime, studio_path);
    app.start();

    let res = run_app(&mut terminal, &mut app, poll_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "TUI exited with error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    poll_interval: Duration,
) -> io::Result<()> {
    loop {
        app.poll_results();
        if app.take_redraw() {
            terminal.draw(|f| ui::draw(f, app))?;
        }

        if !event::poll(poll_interval)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            app.request_redraw();
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        app.request_redraw();

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(());
        }

        match app.focus {
            Focus::Modal => match key.code {
                KeyCode::Char('j') | KeyCode::Down => app.modal_next(),
                KeyCode::Char('k') | KeyCode::Up => app.modal_previous(),
                KeyCode::Char(' ') => app.modal_toggle(),
                KeyCode::Enter => app.modal_submit(),
                KeyCode::Esc => app.close_association_modal(),
                _ => {}
            },
            Focus::Sources => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Tab => app.focus = Focus::Listing,
                KeyCode::Char('j') | KeyCode::Down => app.next_source(),
                KeyCode::Char('k') | KeyCode::Up => app.previous_source(),
                KeyCode::Enter => app.activate_source(),
                _ => {}
            },
            Focus::Listing => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Tab => app.focus = Focus::Sources,
                KeyCode::Char('j') | KeyCode::Down => app.next(),
                KeyCode::Char('k') | KeyCode::Up => app.previous(),
                KeyCode::Enter | KeyCode::Char('l') => app.open_selected(),
                KeyCode::Backspace | KeyCode::Char('h') => app.go_up(),
                KeyCode::Char('r') => app.refresh(),
                KeyCode::Char('a') => app.open_association_modal(),
                KeyCode::Char('g') => app.go_to_connected_brain(),
                KeyCode::Esc => app.clear_status(),
                _ => {}
            },
        }
    }
}
