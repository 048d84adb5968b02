//! Lobby list
//!
//! Displays the peers that can be challenged, with the cursor on the current
//! selection. The placeholder appears only while the roster itself is empty;
//! a roster holding just the local player renders an empty list.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::App;

const EMPTY_TEXT: &str = "No players connected";
const HIGHLIGHT_SYMBOL: &str = "> ";

/// Render the lobby.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Players ");

    if app.view().roster.is_empty() {
        let paragraph =
            Paragraph::new(EMPTY_TEXT).style(Style::default().fg(Color::DarkGray)).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .challengeable()
        .iter()
        .map(|player| ListItem::new(Line::from(player.to_string())))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_symbol(HIGHLIGHT_SYMBOL)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let selected = (!app.challengeable().is_empty()).then(|| app.selected_index());
    let mut state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut state);
}
