//! Status bar
//!
//! Displays the session phase, the keys that do something right now and the
//! last status message.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
};
use rally_client::SessionPhase;

use crate::App;

/// Status line for the current state.
pub fn status_text(app: &App) -> String {
    let phase = match app.phase() {
        SessionPhase::Connecting => "Connecting... | q quit".to_string(),
        SessionPhase::Lobby => "Lobby | up/down select  enter challenge  q quit".to_string(),
        SessionPhase::InMatch => "In match | up/down move  q quit".to_string(),
        SessionPhase::Reconnecting { attempt } => {
            format!("Reconnecting (attempt {attempt}) | r retry now  q quit")
        },
        SessionPhase::Disconnected { .. } => "Disconnected | r retry  q quit".to_string(),
        SessionPhase::Ended => "Ended".to_string(),
    };

    match app.status_message() {
        Some(message) => format!("{phase} | {message}"),
        None => phase,
    }
}

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let color = match app.phase() {
        SessionPhase::Lobby | SessionPhase::InMatch => Color::Green,
        SessionPhase::Connecting | SessionPhase::Reconnecting { .. } => Color::Yellow,
        SessionPhase::Disconnected { .. } | SessionPhase::Ended => Color::Red,
    };

    let paragraph = Paragraph::new(format!(" {}", status_text(app)))
        .style(Style::default().bg(Color::DarkGray).fg(color));

    frame.render_widget(paragraph, area);
}
