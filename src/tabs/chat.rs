use super::{NoticeQueue, Tab, TabKey};
use crate::config::Config;
use ratatui::{
    layout::Rect,
    widgets::{Block, Paragraph},
    Frame,
};

/// The chat panel. Message formatting and transport live elsewhere; this
/// holds the visible transcript and raises notices for incoming traffic.
#[derive(Debug, Default)]
pub struct ChatTab {
    notices: NoticeQueue,
    lines: Vec<String>,
    callsign: String,
}

impl ChatTab {
    pub fn new(notices: NoticeQueue, config: &Config) -> Self {
        Self {
            notices,
            lines: Vec::new(),
            callsign: config.callsign().to_string(),
        }
    }

    /// Appends an informational line to the transcript without raising a
    /// notice. Used for the startup banner.
    pub fn display_info(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    pub fn incoming_message(&mut self, text: &str) {
        self.lines.push(text.to_string());
        self.notices.push(TabKey::Chat);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Tab for ChatTab {
    fn reconfigure(&mut self, config: &Config) {
        self.callsign = config.callsign().to_string();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let transcript = self.lines.join("\n");
        let content = Paragraph::new(transcript)
            .block(Block::bordered().title(format!(" Chat ({}) ", self.callsign)));
        frame.render_widget(content, area);
    }
}
