//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod court;
mod header;
mod lobby;
mod status;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use rally_client::SessionPhase;

pub use court::CanvasSurface;
pub use header::header_text;
pub use status::status_text;

use crate::App;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const HEADER_HEIGHT: u16 = 1;
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [header_area, main_area, status_area] = chunks.as_ref() else {
        return;
    };

    header::render(frame, app, *header_area);
    render_main_area(frame, app, *main_area);
    status::render(frame, app, *status_area);
}

/// Lobby list, court, or a notice while there is no session to show.
fn render_main_area(frame: &mut Frame, app: &App, area: Rect) {
    match app.phase() {
        SessionPhase::Lobby => lobby::render(frame, app, area),
        SessionPhase::InMatch => court::render(frame, app, area),
        SessionPhase::Connecting => {
            notice(frame, area, &format!("Connecting to {}...", app.server_url()));
        },
        SessionPhase::Reconnecting { attempt } => {
            notice(frame, area, &format!("Connection lost. Reconnecting (attempt {attempt})..."));
        },
        SessionPhase::Disconnected { reason } => {
            notice(frame, area, &format!("Disconnected: {reason}\nPress r to retry."));
        },
        SessionPhase::Ended => notice(frame, area, "Session ended."),
    }
}

fn notice(frame: &mut Frame, area: Rect, text: &str) {
    let paragraph = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}
