//! TUI rendering

use super::app::{App, Focus};
use super::knowledge_view;
use crate::explorer::ExplorerView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Sources + listing
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    draw_title(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(chunks[1]);

    draw_sources(f, app, body[0]);
    match app.view() {
        ExplorerView::ViewingInternalRoot => draw_listing(f, app, body[1], "Quivr"),
        ExplorerView::ViewingExternalProvider => {
            let name = app
                .store
                .state()
                .explored_provider
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Providers".to_string());
            draw_listing(f, app, body[1], &name)
        }
    }
    draw_help(f, app, chunks[2]);

    if app.focus == Focus::Modal {
        draw_modal(f, app);
    }
}

fn draw_title(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "Knowledge Explorer",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if app.is_loading() {
        spans.push(Span::styled("  (Loading...)", Style::default().fg(Color::DarkGray)));
    }
    if let Some(ref message) = app.status_message {
        spans.push(Span::styled(format!("  {}", message), Style::default().fg(Color::Yellow)));
    }
    let title = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    }
}

fn draw_sources(f: &mut Frame, app: &App, area: Rect) {
    let ctx = app.store.state();
    let arrow = if app.root_selector.is_folded() { "▸" } else { "▾" };

    let root_style = if ctx.is_quivr_root_active() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mut items = vec![ListItem::new(Line::from(vec![
        Span::raw(format!("{} ", arrow)),
        Span::styled("Quivr", root_style),
    ]))];

    for provider in &app.providers {
        let active = ctx
            .explored_provider
            .as_ref()
            .is_some_and(|p| p.id == provider.id);
        let style = if active {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let mut spans = vec![
            Span::raw("  "),
            Span::styled(provider.name.clone(), style),
            Span::styled(
                format!(" ({})", provider.kind.display_name()),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if let Some(ref email) = provider.email {
            spans.push(Span::styled(format!(" {}", email), Style::default().fg(Color::DarkGray)));
        }
        items.push(ListItem::new(Line::from(spans)));
    }

    let mut state = ListState::default();
    state.select(Some(app.source_index));

    let list = List::new(items)
        .block(
            Block::default()
                .title("Sources")
                .borders(Borders::ALL)
                .border_style(border_style(app.focus == Focus::Sources)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, area, &mut state);
}

fn breadcrumb(app: &App, root_name: &str) -> String {
    let mut parts = vec![root_name.to_string()];
    parts.extend(app.navigator.path().iter().map(|f| f.name.clone()));
    parts.join(" / ")
}

fn draw_listing(f: &mut Frame, app: &mut App, area: Rect, root_name: &str) {
    let title = format!("{} ({})", breadcrumb(app, root_name), app.listing().len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Listing));

    if app.listing().is_empty() {
        let empty = Paragraph::new("Nothing here yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items = knowledge_view::item_list(app.listing(), &app.brains);
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_help(f: &mut Frame, app: &App, area: Rect) {
    let keys: &[(&str, &str)] = match app.focus {
        Focus::Sources => &[("j/k", "Move"), ("Enter", "Open"), ("Tab", "Listing"), ("q", "Quit")],
        Focus::Listing => &[
            ("Enter", "Open"),
            ("h", "Up"),
            ("r", "Refresh"),
            ("a", "Add to brains"),
            ("g", "Go to brain"),
            ("Tab", "Sources"),
            ("q", "Quit"),
        ],
        Focus::Modal => &[("j/k", "Move"), ("Space", "Select"), ("Enter", "Link"), ("Esc", "Cancel")],
    };

    let mut spans = Vec::new();
    for (key, action) in keys {
        spans.push(Span::styled(format!("{}: ", key), Style::default().add_modifier(Modifier::BOLD)));
        spans.push(Span::raw(format!("{}  ", action)));
    }
    let help = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn draw_modal(f: &mut Frame, app: &App) {
    let Some((item, manager)) = app.open_modal() else {
        return;
    };
    let Some(modal) = manager.modal() else {
        return;
    };

    let area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let brains = app.modal_brains();
    let items: Vec<ListItem> = if brains.is_empty() {
        vec![ListItem::new(Span::styled(
            "Already linked to every brain",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        brains
            .iter()
            .map(|brain| {
                let mark = if modal.is_selected(&brain.id) { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} {} {}", mark, brain.snippet_emoji, brain.name))
            })
            .collect()
    };

    let mut state = ListState::default();
    if !brains.is_empty() {
        state.select(Some(app.modal_index));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Add {} to brains", item.file_name))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, chunks[0], &mut state);

    let (footer, style) = match (&modal.error, modal.submitting) {
        (_, true) => ("Linking...".to_string(), Style::default().fg(Color::DarkGray)),
        (Some(error), false) => (format!("Error: {}", error), Style::default().fg(Color::Red)),
        (None, false) => (
            format!("{} selected", modal.selected().len()),
            Style::default().fg(Color::White),
        ),
    };
    let footer = Paragraph::new(footer)
        .style(style)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[1]);
}
