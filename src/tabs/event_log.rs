use super::{NoticeQueue, Tab, TabKey};
use ratatui::{
    layout::Rect,
    widgets::{Block, Paragraph},
    Frame,
};

/// The event-log panel. Entries still raise notices so the window can blink,
/// but the notification router never plays a sound for this key.
#[derive(Debug, Default)]
pub struct EventTab {
    notices: NoticeQueue,
    entries: Vec<String>,
}

impl EventTab {
    pub fn new(notices: NoticeQueue) -> Self {
        Self {
            notices,
            entries: Vec::new(),
        }
    }

    pub fn log_event(&mut self, text: &str) {
        self.entries.push(text.to_string());
        self.notices.push(TabKey::Event);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Tab for EventTab {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content = Paragraph::new(self.entries.join("\n"))
            .block(Block::bordered().title(" Event Log "));
        frame.render_widget(content, area);
    }
}
