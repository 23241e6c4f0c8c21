//! Shared test doubles.

use crate::{
    bus::{Event, SignalBus},
    config::Config,
    platform::PlatformServices,
    status::Clock,
    tabs::{Tab, TabKey},
};
use std::{
    cell::{Cell, RefCell},
    io,
    path::{Path, PathBuf},
    rc::Rc,
    time::{Duration, Instant},
};

/// Clock that only moves when a test says so.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Platform services that record instead of spawning anything.
#[derive(Debug, Default)]
pub struct MockPlatform {
    played: RefCell<Vec<String>>,
    opened: RefCell<Vec<PathBuf>>,
}

impl MockPlatform {
    pub fn played(&self) -> Vec<String> {
        self.played.borrow().clone()
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.borrow().clone()
    }
}

impl PlatformServices for MockPlatform {
    fn play_sound(&self, resource: &str) {
        self.played.borrow_mut().push(resource.to_string());
    }

    fn open_text_file(&self, path: &Path) -> io::Result<()> {
        self.opened.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

/// Tab that logs its lifecycle calls into a shared vec.
#[derive(Debug)]
pub struct ProbeTab {
    key: TabKey,
    log: Rc<RefCell<Vec<String>>>,
}

impl ProbeTab {
    pub fn new(key: TabKey, log: Rc<RefCell<Vec<String>>>) -> Self {
        Self { key, log }
    }
}

impl Tab for ProbeTab {
    fn selected(&mut self) {
        self.log.borrow_mut().push(format!("selected:{}", self.key));
    }

    fn deselected(&mut self) {
        self.log
            .borrow_mut()
            .push(format!("deselected:{}", self.key));
    }

    fn reconfigure(&mut self, _config: &Config) {
        self.log
            .borrow_mut()
            .push(format!("reconfigured:{}", self.key));
    }
}

/// Subscribes a recording handler and returns the shared event log.
pub fn recorded_events(bus: &SignalBus) -> Rc<RefCell<Vec<Event>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    bus.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}
