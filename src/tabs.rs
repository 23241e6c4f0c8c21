//! The panels of the main window and the lifecycle rules that govern them.
//!
//! Exactly one tab is current at any moment. Switching pages calls
//! `deselected` on the outgoing tab strictly before `selected` on the
//! incoming one, and a page activation that resolves to the already-current
//! key is skipped entirely so lifecycle hooks never double-fire.

use crate::config::Config;
use ratatui::{layout::Rect, Frame};
use std::{cell::RefCell, collections::VecDeque, rc::Rc};

pub mod chat;
pub mod event_log;
pub mod files;
pub mod messages;
pub mod stations;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum TabKey {
    Chat,
    Messages,
    Event,
    Files,
    Stations,
}

/// Notebook page order. Stations lives in the side pane, not the notebook,
/// so it has no page index.
pub const PAGE_ORDER: [TabKey; 4] = [TabKey::Messages, TabKey::Chat, TabKey::Files, TabKey::Event];

/// Queue a tab pushes its own key into when a collaborator hands it something
/// worth the user's attention. The mediator drains it into the notification
/// router once per loop iteration.
#[derive(Debug, Clone, Default)]
pub struct NoticeQueue {
    queue: Rc<RefCell<VecDeque<TabKey>>>,
}

impl NoticeQueue {
    pub fn push(&self, key: TabKey) {
        self.queue.borrow_mut().push_back(key);
    }

    pub fn pop(&self) -> Option<TabKey> {
        self.queue.borrow_mut().pop_front()
    }
}

pub trait Tab {
    fn selected(&mut self) {}

    fn deselected(&mut self) {}

    fn reconfigure(&mut self, _config: &Config) {}

    fn render(&mut self, _frame: &mut Frame, _area: Rect) {}
}

/// Owns every tab for the life of the window. Insertion order is display
/// order.
pub struct TabRegistry {
    tabs: Vec<(TabKey, Box<dyn Tab>)>,
    current: TabKey,
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self {
            tabs: Vec::new(),
            current: TabKey::Messages,
        }
    }
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: TabKey, tab: Box<dyn Tab>) {
        debug_assert!(
            !self.tabs.iter().any(|(k, _)| *k == key),
            "tab {key} registered twice"
        );
        self.tabs.push((key, tab));
    }

    pub const fn current(&self) -> TabKey {
        self.current
    }

    pub fn keys(&self) -> impl Iterator<Item = TabKey> + '_ {
        self.tabs.iter().map(|(key, _)| *key)
    }

    pub fn get_mut(&mut self, key: TabKey) -> Option<&mut Box<dyn Tab>> {
        self.tabs
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, tab)| tab)
    }

    /// Resolves a notebook page index to a key and switches to it.
    /// Out-of-range indices are ignored.
    pub fn activate_page(&mut self, page: usize) {
        if let Some(key) = PAGE_ORDER.get(page) {
            self.activate(*key);
        } else {
            tracing::warn!(page, "page index outside the notebook, ignoring");
        }
    }

    pub fn activate(&mut self, key: TabKey) {
        if key == self.current {
            return;
        }
        if !self.tabs.iter().any(|(k, _)| *k == key) {
            tracing::warn!(%key, "activation of unregistered tab, ignoring");
            return;
        }

        let old = self.current;
        if let Some(tab) = self.get_mut(old) {
            tab.deselected();
        }
        self.current = key;
        if let Some(tab) = self.get_mut(key) {
            tab.selected();
        }
        tracing::debug!(from = %old, to = %key, "tab switched");
    }

    /// Broadcasts a config change to every tab in display order.
    pub fn reconfigure_all(&mut self, config: &Config) {
        for (_, tab) in &mut self.tabs {
            tab.reconfigure(config);
        }
    }
}

impl std::fmt::Debug for TabRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabRegistry")
            .field("tabs", &self.tabs.iter().map(|(k, _)| *k).collect::<Vec<_>>())
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ProbeTab;
    use std::{cell::RefCell, rc::Rc};

    fn registry_with_probes() -> (TabRegistry, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = TabRegistry::new();
        for key in [
            TabKey::Chat,
            TabKey::Messages,
            TabKey::Event,
            TabKey::Files,
            TabKey::Stations,
        ] {
            registry.register(key, Box::new(ProbeTab::new(key, log.clone())));
        }
        (registry, log)
    }

    #[test]
    fn initial_tab_is_messages() {
        let (registry, _) = registry_with_probes();
        assert_eq!(registry.current(), TabKey::Messages);
    }

    #[test]
    fn deselect_runs_before_select() {
        let (mut registry, log) = registry_with_probes();

        registry.activate_page(1);

        assert_eq!(registry.current(), TabKey::Chat);
        assert_eq!(
            *log.borrow(),
            vec!["deselected:messages", "selected:chat"]
        );
    }

    #[test]
    fn self_transition_makes_no_lifecycle_calls() {
        let (mut registry, log) = registry_with_probes();

        // page 0 resolves to messages, the current tab
        registry.activate_page(0);

        assert_eq!(registry.current(), TabKey::Messages);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn every_switch_pairs_deselect_with_select() {
        let (mut registry, log) = registry_with_probes();

        for page in [1, 3, 3, 2, 0] {
            registry.activate_page(page);
        }

        assert_eq!(
            *log.borrow(),
            vec![
                "deselected:messages",
                "selected:chat",
                "deselected:chat",
                "selected:event",
                "deselected:event",
                "selected:files",
                "deselected:files",
                "selected:messages",
            ]
        );
    }

    #[test]
    fn out_of_range_page_is_ignored() {
        let (mut registry, log) = registry_with_probes();

        registry.activate_page(17);

        assert_eq!(registry.current(), TabKey::Messages);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn notebook_covers_every_tab_except_stations() {
        use strum::IntoEnumIterator;

        for key in TabKey::iter() {
            let pages = PAGE_ORDER.iter().filter(|k| **k == key).count();
            let expected = usize::from(key != TabKey::Stations);
            assert_eq!(pages, expected, "{key}");
        }
    }

    #[test]
    fn reconfigure_reaches_every_tab() {
        let (mut registry, log) = registry_with_probes();

        registry.reconfigure_all(&Config::default());

        assert_eq!(log.borrow().len(), 5);
        assert!(log.borrow().iter().all(|l| l.starts_with("reconfigured:")));
    }
}
