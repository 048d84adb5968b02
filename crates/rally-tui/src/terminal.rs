//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The channel is the WebSocket
//! transport from `rally-client`.

use std::{
    collections::VecDeque,
    io::{self, Stdout, stdout},
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use rally_app::{App, AppEvent, ChannelEvent, Driver, KeyInput};
use rally_client::transport::{self, ConnectedClient, TransportError, TransportEvent};
use rally_proto::Envelope;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::ui;

/// Longest time `poll_event` waits for input.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// No channel to send on.
    #[error("not connected")]
    NotConnected,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), and the server
/// channel (WebSocket).
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    connection: Option<ConnectedClient>,
    /// Channel events received while waiting for input.
    inbound: VecDeque<TransportEvent>,
}

impl TerminalDriver {
    /// Take over the terminal: raw mode and the alternate screen.
    pub fn new() -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            connection: None,
            inbound: VecDeque::new(),
        })
    }

    /// Convert a crossterm key event to `KeyInput`.
    ///
    /// Raw mode delivers Ctrl-C as a plain key, so it is mapped to Esc.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(KeyInput::Esc);
        }

        match key.code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            _ => None,
        }
    }

    fn terminal_event(event: Option<io::Result<Event>>) -> Result<Option<AppEvent>, TerminalError> {
        match event {
            // Repeats and releases are dropped: one key-down is one intent
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                Ok(Self::convert_key(key).map(AppEvent::Key))
            },
            Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
            Some(Err(e)) => Err(TerminalError::Io(e)),
            _ => Ok(None),
        }
    }
}

fn channel_event(event: TransportEvent) -> ChannelEvent {
    match event {
        TransportEvent::Frame(bytes) => ChannelEvent::Frame(bytes),
        TransportEvent::Closed { reason } => ChannelEvent::Closed { reason },
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        let connection = self.connection.as_mut();
        let channel = async move {
            match connection {
                Some(connection) => connection.recv().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;

            maybe_event = self.event_stream.next() => Self::terminal_event(maybe_event),

            // Wake early for server traffic; the runtime drains it via recv
            Some(event) = channel => {
                self.inbound.push_back(event);
                Ok(None)
            },

            () = tokio::time::sleep(POLL_INTERVAL) => Ok(None),
        }
    }

    fn send(&mut self, envelope: Envelope) -> Result<(), Self::Error> {
        let connection = self.connection.as_ref().ok_or(TerminalError::NotConnected)?;
        connection.send(&envelope)?;
        Ok(())
    }

    fn recv(&mut self) -> Option<ChannelEvent> {
        let event = match self.inbound.pop_front() {
            Some(event) => event,
            None => self.connection.as_mut()?.try_recv()?,
        };

        if matches!(event, TransportEvent::Closed { .. }) {
            self.connection = None;
        }
        Some(channel_event(event))
    }

    async fn connect(&mut self, url: &str) -> Result<(), Self::Error> {
        self.disconnect();
        let client = transport::connect(url).await?;
        self.connection = Some(client);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close();
        }
        self.inbound.clear();
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn stop(&mut self) {
        self.disconnect();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
