//! Knowledge row rendering
//!
//! A row shows the folder/file glyph, the name, where it was synced from,
//! its modification date, the status indicator and the badges of connected
//! brains. Badges are dimmed while the item is waiting or failed.

use crate::explorer::{AssociationManager, BrainBadge, Indicator};
use crate::knowledge::{Brain, KMSElement, StatusClass};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};

pub fn status_style(class: StatusClass) -> Style {
    match class {
        StatusClass::Waiting => Style::default().fg(Color::Yellow),
        StatusClass::Error => Style::default().fg(Color::Red),
        StatusClass::Settled => Style::default(),
    }
}

fn badge_span(badge: &BrainBadge<'_>) -> Span<'static> {
    let emoji = match badge.brain.snippet_emoji.as_str() {
        "" => "🧠",
        emoji => emoji,
    };
    let mut text = format!(" {} {}", emoji, badge.brain.name);
    match badge.indicator {
        Some(Indicator::Waiting) => text.push_str(" ⟳"),
        Some(Indicator::Error) => text.push_str(" ⚠"),
        None => {}
    }

    let style = if badge.dimmed() {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Span::styled(text, style)
}

/// Spans for one row
pub fn item_line(item: &KMSElement, brains: &[Brain]) -> Line<'static> {
    let class = item.status_class();
    let icon = if item.is_folder { "📁 " } else { "📄 " };

    let mut spans = vec![
        Span::raw(icon),
        Span::styled(
            item.file_name.clone(),
            if item.is_folder {
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            },
        ),
    ];

    if let Some(source) = item.source.as_deref().filter(|_| !item.is_local()) {
        spans.push(Span::styled(
            format!("  [{}]", source),
            Style::default().fg(Color::Magenta),
        ));
    }

    if let Some(modified) = item.last_modified_at {
        spans.push(Span::styled(
            format!("  {}", modified.format("%Y-%m-%d")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if class != StatusClass::Settled {
        spans.push(Span::styled(
            format!("  {} {}", class.glyph(), class.label()),
            status_style(class),
        ));
    }

    for badge in AssociationManager::badges(item, brains) {
        spans.push(badge_span(&badge));
    }

    Line::from(spans)
}

pub fn item_list(items: &[KMSElement], brains: &[Brain]) -> Vec<ListItem<'static>> {
    items
        .iter()
        .map(|item| ListItem::new(item_line(item, brains)))
        .collect()
}
