use super::{NoticeQueue, Tab, TabKey};
use ratatui::{
    layout::Rect,
    widgets::{Block, Paragraph},
    Frame,
};

/// The file-transfer panel. Transfer logic is external; the tab shows the
/// most recent per-transfer status lines it has been handed.
#[derive(Debug, Default)]
pub struct FilesTab {
    notices: NoticeQueue,
    transfers: Vec<String>,
}

impl FilesTab {
    pub fn new(notices: NoticeQueue) -> Self {
        Self {
            notices,
            transfers: Vec::new(),
        }
    }

    pub fn transfer_updated(&mut self, status: &str) {
        self.transfers.push(status.to_string());
        self.notices.push(TabKey::Files);
    }
}

impl Tab for FilesTab {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content = Paragraph::new(self.transfers.join("\n"))
            .block(Block::bordered().title(" Files "));
        frame.render_widget(content, area);
    }
}
