//! Header bar
//!
//! Displays the endpoint and the local player name once welcomed.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Paragraph,
};

use crate::App;

/// Header line for the current state.
pub fn header_text(app: &App) -> String {
    let player = match &app.view().player_id {
        Some(id) => format!("playing as {id}"),
        None => "not joined".to_string(),
    };
    format!("Rally | {} | {player}", app.server_url())
}

/// Render the header bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let paragraph = Paragraph::new(format!(" {}", header_text(app)))
        .style(Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD));

    frame.render_widget(paragraph, area);
}
