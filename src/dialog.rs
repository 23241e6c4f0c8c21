//! Modal dialogs and the bridge that turns their results into bus traffic.
//!
//! The query dialog captures free text verbatim. The text is interpolated
//! into the wildcard template unescaped, `?` and `*` included, exactly as
//! the wire format has always been sent; `dquery_payload` pins that down.

use crate::bus::{BusError, Event, PortId, SignalBus, StationId};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    widgets::{Block, Clear, List, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

/// Group identifier for broadcast queries.
pub const DQUERY_GROUP: &str = "CQCQCQ";

const MODAL_WIDTH: u16 = 40;

/// Builds the wildcard query payload. No trimming, no escaping.
pub fn dquery_payload(text: &str) -> String {
    format!("?D*{text}?")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Confirmed(String),
    Canceled,
}

/// Packages a query-dialog outcome into an outbound chat request. Confirmed
/// text fetches the active chat port synchronously, then fires a broadcast
/// `UserSendChat`. Cancel emits nothing.
pub fn submit_dquery(outcome: &DialogOutcome, bus: &SignalBus) -> Result<(), BusError> {
    let DialogOutcome::Confirmed(text) = outcome else {
        return Ok(());
    };

    let port = bus.chat_port()?;
    bus.publish(&Event::UserSendChat {
        group: DQUERY_GROUP.to_string(),
        port,
        text: dquery_payload(text),
        broadcast: true,
    });
    Ok(())
}

/// The modal free-text field for sending a query.
#[derive(Debug, Default)]
pub struct DQueryDialog {
    input: Input,
}

impl DQueryDialog {
    /// Feeds one key press; returns the outcome once the user confirms or
    /// cancels.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<DialogOutcome> {
        match key.code {
            KeyCode::Enter => Some(DialogOutcome::Confirmed(self.input.value().to_string())),
            KeyCode::Esc => Some(DialogOutcome::Canceled),
            _ => {
                self.input
                    .handle_event(&crossterm::event::Event::Key(key));
                None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let area = centered(area, MODAL_WIDTH + 2, 3);
        frame.render_widget(Clear, area);
        let content = Paragraph::new(self.input.value())
            .block(Block::bordered().title(" Send Query "));
        frame.render_widget(content, area);
    }
}

/// Modal preferences editor. The shell only exposes the callsign field; a
/// save is reported upstream so the config change reaches every tab.
#[derive(Debug)]
pub struct PrefsDialog {
    input: Input,
}

impl PrefsDialog {
    pub fn new(callsign: &str) -> Self {
        Self {
            input: Input::new(callsign.to_string()),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<DialogOutcome> {
        match key.code {
            KeyCode::Enter => Some(DialogOutcome::Confirmed(self.input.value().to_string())),
            KeyCode::Esc => Some(DialogOutcome::Canceled),
            _ => {
                self.input
                    .handle_event(&crossterm::event::Event::Key(key));
                None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let area = centered(area, MODAL_WIDTH + 2, 3);
        frame.render_widget(Clear, area);
        let content = Paragraph::new(self.input.value())
            .block(Block::bordered().title(" Preferences: Callsign "));
        frame.render_widget(content, area);
    }
}

/// Yes/no modal used for exit confirmation.
#[derive(Debug)]
pub struct ConfirmDialog {
    message: String,
}

impl ConfirmDialog {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn handle_key(key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(true),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(false),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let area = centered(area, MODAL_WIDTH + 2, 4);
        frame.render_widget(Clear, area);
        let content = Paragraph::new(format!("{}\n[y]es / [n]o", self.message))
            .block(Block::bordered().title(" Confirm "));
        frame.render_widget(content, area);
    }
}

/// Blocking informational modal, dismissed with any key.
#[derive(Debug)]
pub struct InfoDialog {
    message: String,
}

impl InfoDialog {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let area = centered(area, MODAL_WIDTH + 2, 3);
        frame.render_widget(Clear, area);
        let content =
            Paragraph::new(self.message.as_str()).block(Block::bordered().title(" Info "));
        frame.render_widget(content, area);
    }
}

/// Modal list for picking a station to ping from the flattened heard list.
#[derive(Debug)]
pub struct StationPicker {
    choices: Vec<(StationId, PortId)>,
    selected: usize,
}

impl StationPicker {
    pub fn new(choices: Vec<(StationId, PortId)>) -> Self {
        Self {
            choices,
            selected: 0,
        }
    }

    /// Returns `Some(None)` on cancel, `Some(Some(..))` on selection.
    #[expect(clippy::option_option)]
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Option<(StationId, PortId)>> {
        match key.code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.selected + 1 < self.choices.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter => Some(self.choices.get(self.selected).cloned()),
            KeyCode::Esc => Some(None),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let height = u16::try_from(self.choices.len()).unwrap_or(u16::MAX);
        let area = centered(area, MODAL_WIDTH + 2, height.saturating_add(2));
        frame.render_widget(Clear, area);

        let items = self.choices.iter().enumerate().map(|(idx, (call, port))| {
            let marker = if idx == self.selected { ">" } else { " " };
            format!("{marker} {call} [{port}]")
        });
        frame.render_widget(
            List::new(items).block(Block::bordered().title(" Ping Station ")),
            area,
        );
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let layout = Layout::vertical(vec![
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .split(area);
    let layout = Layout::horizontal(vec![
        Constraint::Fill(1),
        Constraint::Length(width),
        Constraint::Fill(1),
    ])
    .split(layout[1]);
    layout[1]
}
