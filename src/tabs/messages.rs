use super::{NoticeQueue, Tab, TabKey};
use ratatui::{
    layout::Rect,
    widgets::{Block, Paragraph},
    Frame,
};

/// The message-forms panel. Storage and form handling are external; the tab
/// tracks an unread count that clears when the panel is brought forward.
#[derive(Debug, Default)]
pub struct MessagesTab {
    notices: NoticeQueue,
    unread: usize,
}

impl MessagesTab {
    pub fn new(notices: NoticeQueue) -> Self {
        Self { notices, unread: 0 }
    }

    pub fn message_arrived(&mut self) {
        self.unread += 1;
        self.notices.push(TabKey::Messages);
    }

    pub const fn unread(&self) -> usize {
        self.unread
    }
}

impl Tab for MessagesTab {
    fn selected(&mut self) {
        self.unread = 0;
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.unread > 0 {
            format!(" Messages ({} unread) ", self.unread)
        } else {
            " Messages ".to_string()
        };
        frame.render_widget(Paragraph::new("").block(Block::bordered().title(title)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_clears_the_unread_count() {
        let notices = NoticeQueue::default();
        let mut tab = MessagesTab::new(notices.clone());

        tab.message_arrived();
        tab.message_arrived();
        assert_eq!(tab.unread(), 2);
        assert_eq!(notices.pop(), Some(TabKey::Messages));

        tab.selected();
        assert_eq!(tab.unread(), 0);
    }
}
