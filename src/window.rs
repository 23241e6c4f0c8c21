//! The main-window mediator: composes the tab registry, notification router,
//! status bar, and signal bus, and owns window-level lifecycle.

use crate::{
    bus::{BusError, Event, PortId, SignalBus, StationId},
    config::{Config, Section},
    dialog::{
        submit_dquery, ConfirmDialog, DQueryDialog, DialogOutcome, InfoDialog, PrefsDialog,
        StationPicker,
    },
    launcher,
    notify::{NotificationRouter, WindowAttention},
    platform::PlatformServices,
    status::{StatusBar, SystemClock, STATUS_TICK},
    tabs::{
        chat::ChatTab, event_log::EventTab, files::FilesTab, messages::MessagesTab,
        stations::StationsTab, NoticeQueue, TabKey, TabRegistry, PAGE_ORDER,
    },
    PRODUCT_NAME,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    prelude::Backend,
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use std::{path::PathBuf, rc::Rc, time::Instant};
use strum::IntoEnumIterator;

const COPYRIGHT: &str = "Copyright 2009-2026 the HamDeck authors";
const EXIT_PROMPT: &str = "Really exit HamDeck?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Running,
    ConfirmingExit,
    Destroyed,
}

/// Result of a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseFlow {
    /// Geometry persisted; the application should quit.
    Quit,
    /// The user declined; back to running.
    Veto,
    /// `prefs.confirm_exit` is set; the caller must show the prompt and feed
    /// the answer to `confirm_close`.
    AwaitingConfirmation,
}

/// Window geometry persisted under the `state` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub width: i64,
    pub height: i64,
    pub maximized: bool,
}

impl WindowGeometry {
    pub fn read(config: &Config) -> Self {
        Self {
            width: config.getint(Section::State, "main_size_x").unwrap_or(600),
            height: config.getint(Section::State, "main_size_y").unwrap_or(430),
            maximized: config
                .getboolean(Section::State, "main_maximized")
                .unwrap_or(false),
        }
    }

    pub fn write(&self, config: &mut Config) {
        config.set(Section::State, "main_size_x", self.width.to_string());
        config.set(Section::State, "main_size_y", self.height.to_string());
        config.set(Section::State, "main_maximized", self.maximized.to_string());
    }
}

/// What the run loop is currently showing on top of the tabs.
enum Mode {
    Normal,
    DQuery(DQueryDialog),
    Prefs(PrefsDialog),
    ConfirmExit(ConfirmDialog),
    Info(InfoDialog),
    PickStation(StationPicker),
}

pub struct MainWindow {
    config: Config,
    config_path: PathBuf,
    data_dir: PathBuf,
    bus: Rc<SignalBus>,
    platform: Rc<dyn PlatformServices>,

    tabs: TabRegistry,
    notices: NoticeQueue,
    router: NotificationRouter,
    attention: WindowAttention,
    status: StatusBar<SystemClock>,

    state: WindowState,
    geometry: WindowGeometry,
    sidepane_visible: bool,
    connected_inet: bool,
    mode: Mode,
}

impl MainWindow {
    pub fn new(
        config: Config,
        config_path: PathBuf,
        data_dir: PathBuf,
        bus: Rc<SignalBus>,
        platform: Rc<dyn PlatformServices>,
    ) -> Self {
        let notices = NoticeQueue::default();

        let mut chat = ChatTab::new(notices.clone(), &config);
        chat.display_info(&format!(
            "{PRODUCT_NAME} v{}",
            env!("CARGO_PKG_VERSION")
        ));
        chat.display_info(COPYRIGHT);
        chat.display_info("");

        let mut tabs = TabRegistry::new();
        tabs.register(TabKey::Chat, Box::new(chat));
        tabs.register(TabKey::Messages, Box::new(MessagesTab::new(notices.clone())));
        tabs.register(TabKey::Event, Box::new(EventTab::new(notices.clone())));
        tabs.register(TabKey::Files, Box::new(FilesTab::new(notices.clone())));
        tabs.register(TabKey::Stations, Box::new(StationsTab::new(notices.clone())));
        debug_assert!(
            TabKey::iter().all(|key| tabs.keys().any(|k| k == key)),
            "every tab key has a registered tab"
        );

        let geometry = WindowGeometry::read(&config);
        tracing::debug!(?geometry, "restored window geometry");

        let sidepane_visible = config
            .getboolean(Section::State, "sidepane_visible")
            .unwrap_or(true);
        let connected_inet = config
            .getboolean(Section::State, "connected_inet")
            .unwrap_or(false);

        if cfg!(target_os = "macos") {
            // optional integration, never surfaced to the user
            tracing::info!("native menubar integration unavailable; skipping");
        }

        Self {
            config,
            config_path,
            data_dir,
            bus,
            platform,
            tabs,
            notices,
            router: NotificationRouter,
            attention: WindowAttention::default(),
            status: StatusBar::default(),
            state: WindowState::Running,
            geometry,
            sidepane_visible,
            connected_inet,
            mode: Mode::Normal,
        }
    }

    pub const fn state(&self) -> WindowState {
        self.state
    }

    pub const fn current_tab(&self) -> TabKey {
        self.tabs.current()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub const fn attention(&self) -> &WindowAttention {
        &self.attention
    }

    pub fn focus_gained(&mut self) {
        self.attention.focus_gained();
    }

    pub fn focus_lost(&mut self) {
        self.attention.focus_lost();
    }

    pub fn activate_page(&mut self, page: usize) {
        self.tabs.activate_page(page);
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status.set_status(msg, &self.config);
    }

    pub fn tick_status(&mut self) {
        self.status.tick();
    }

    /// Drains pending tab notices into the notification router. After the
    /// window is destroyed collaborators may be gone, so notices are only
    /// logged.
    pub fn process_notices(&mut self) {
        while let Some(key) = self.notices.pop() {
            if self.state == WindowState::Destroyed {
                tracing::debug!(%key, "notice after destroy, dropping");
                continue;
            }
            self.router
                .on_notice(key, &self.config, &mut self.attention, self.platform.as_ref());
        }
    }

    /// Starts the close sequence in response to a close request.
    pub fn begin_close(&mut self) -> CloseFlow {
        tracing::info!("close requested");
        if self
            .config
            .getboolean(Section::Prefs, "confirm_exit")
            .unwrap_or(true)
        {
            self.state = WindowState::ConfirmingExit;
            return CloseFlow::AwaitingConfirmation;
        }
        self.finish_close();
        CloseFlow::Quit
    }

    /// Feeds the user's answer to the exit prompt.
    pub fn confirm_close(&mut self, accepted: bool) -> CloseFlow {
        if accepted {
            self.finish_close();
            CloseFlow::Quit
        } else {
            self.state = WindowState::Running;
            CloseFlow::Veto
        }
    }

    fn finish_close(&mut self) {
        self.geometry.write(&mut self.config);
        if let Err(err) = self.config.save(&self.config_path) {
            tracing::warn!(%err, "could not persist config at shutdown");
        }
    }

    /// One-way transition; everything after this point is log-only.
    pub fn destroy(&mut self) {
        self.state = WindowState::Destroyed;
        tracing::info!("main window destroyed");
    }

    /// Preferences were shown; if they were saved, tell the world and every
    /// tab.
    pub fn prefs_closed(&mut self, saved: bool) {
        if saved {
            self.bus.publish(&Event::ConfigChanged);
            let config = self.config.clone();
            self.tabs.reconfigure_all(&config);
        }
    }

    /// Centers the map on our own callsign.
    pub fn show_map(&self) {
        let station = self.config.callsign().to_string();
        self.bus.publish(&Event::ShowMapStation { station });
    }

    /// The flattened heard-station list for the ping prompt.
    pub fn ping_choices(&self) -> Result<Vec<(StationId, PortId)>, BusError> {
        let stations = self.bus.station_list()?;
        Ok(stations
            .into_iter()
            .flat_map(|(port, calls)| {
                calls.into_iter().map(move |call| (call, port.clone()))
            })
            .collect())
    }

    pub fn ping_station(&self, station: StationId, port: PortId) {
        self.bus.publish(&Event::PingStation { station, port });
    }

    /// Opens the debug log if it exists. Returns false when it is missing so
    /// the caller can show the informational dialog.
    pub fn open_debug_log(&self) -> Result<bool, crate::Error> {
        let path = self.data_dir.join("debug.log");
        if path.exists() {
            self.platform.open_text_file(&path)?;
            Ok(true)
        } else {
            tracing::info!(path = %path.display(), "debug log not available");
            Ok(false)
        }
    }

    pub const fn connected_inet(&self) -> bool {
        self.connected_inet
    }

    /// Flips the internet-link toggle and persists the new state.
    pub fn toggle_connected_inet(&mut self) {
        self.connected_inet = !self.connected_inet;
        self.config.set(
            Section::State,
            "connected_inet",
            self.connected_inet.to_string(),
        );
        tracing::info!(active = self.connected_inet, "internet connection state changed");
    }

    pub fn toggle_sidepane(&mut self) {
        self.sidepane_visible = !self.sidepane_visible;
        self.config.set(
            Section::State,
            "sidepane_visible",
            self.sidepane_visible.to_string(),
        );
    }

    pub fn resized(&mut self, width: u16, height: u16) {
        self.geometry.width = i64::from(width);
        self.geometry.height = i64::from(height);
    }

    /// The terminal event loop. Modal dialogs block everything but the loop
    /// itself until answered.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|frame| self.draw(frame))?;

            if crossterm::event::poll(STATUS_TICK.saturating_sub(last_tick.elapsed()))? {
                match crossterm::event::read()? {
                    crossterm::event::Event::Key(key) => {
                        if self.handle_key(key) {
                            self.destroy();
                            return Ok(());
                        }
                    }
                    crossterm::event::Event::FocusGained => self.focus_gained(),
                    crossterm::event::Event::FocusLost => self.focus_lost(),
                    crossterm::event::Event::Resize(w, h) => self.resized(w, h),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= STATUS_TICK {
                self.tick_status();
                last_tick = Instant::now();
            }

            self.process_notices();
        }
    }

    /// Returns true when the application should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match &mut self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::DQuery(dialog) => {
                if let Some(outcome) = dialog.handle_key(key) {
                    self.mode = Mode::Normal;
                    if let Err(err) = submit_dquery(&outcome, &self.bus) {
                        tracing::error!(%err, "query dispatch failed");
                    } else if let DialogOutcome::Confirmed(_) = outcome {
                        self.set_status("Query sent");
                    }
                }
                false
            }
            Mode::Prefs(dialog) => {
                if let Some(outcome) = dialog.handle_key(key) {
                    self.mode = Mode::Normal;
                    match outcome {
                        DialogOutcome::Confirmed(callsign) => {
                            self.config.set(Section::User, "callsign", callsign);
                            self.prefs_closed(true);
                            self.set_status("Preferences saved");
                        }
                        DialogOutcome::Canceled => self.prefs_closed(false),
                    }
                }
                false
            }
            Mode::ConfirmExit(_) => {
                if let Some(accepted) = ConfirmDialog::handle_key(key) {
                    self.mode = Mode::Normal;
                    return self.confirm_close(accepted) == CloseFlow::Quit;
                }
                false
            }
            Mode::Info(_) => {
                self.mode = Mode::Normal;
                false
            }
            Mode::PickStation(picker) => {
                if let Some(choice) = picker.handle_key(key) {
                    self.mode = Mode::Normal;
                    if let Some((station, port)) = choice {
                        self.set_status(&format!("Pinging {station}"));
                        self.ping_station(station, port);
                    }
                }
                false
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.request_close_via_prompt();
            }
            KeyCode::Char('q') => return self.request_close_via_prompt(),
            KeyCode::Char(c @ '1'..='4') => {
                let page = c as usize - '1' as usize;
                self.activate_page(page);
            }
            KeyCode::Char('d') => self.mode = Mode::DQuery(DQueryDialog::default()),
            KeyCode::Char('e') => {
                self.mode = Mode::Prefs(PrefsDialog::new(self.config.callsign()));
            }
            KeyCode::Char('i') => self.toggle_connected_inet(),
            KeyCode::Char('p') => match self.ping_choices() {
                Ok(choices) if choices.is_empty() => {
                    self.mode = Mode::Info(InfoDialog::new("No stations heard"));
                }
                Ok(choices) => self.mode = Mode::PickStation(StationPicker::new(choices)),
                Err(err) => tracing::error!(%err, "station list unavailable"),
            },
            KeyCode::Char('m') => self.show_map(),
            KeyCode::Char('l') => match self.open_debug_log() {
                Ok(true) => {}
                Ok(false) => {
                    self.mode = Mode::Info(InfoDialog::new("Debug log not available"));
                }
                Err(err) => tracing::warn!(%err, "could not open debug log"),
            },
            KeyCode::Char('x') => launcher::launch_proxy(),
            KeyCode::Char('s') => self.toggle_sidepane(),
            _ => {}
        }
        false
    }

    fn request_close_via_prompt(&mut self) -> bool {
        match self.begin_close() {
            CloseFlow::Quit => true,
            CloseFlow::AwaitingConfirmation => {
                self.mode = Mode::ConfirmExit(ConfirmDialog::new(EXIT_PROMPT));
                false
            }
            CloseFlow::Veto => false,
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let full = frame.area();
        let outer = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(full);

        let titles = PAGE_ORDER.iter().map(|key| format!(" {key} "));
        let current_page = PAGE_ORDER
            .iter()
            .position(|key| *key == self.tabs.current())
            .unwrap_or(0);
        frame.render_widget(Tabs::new(titles).select(current_page), outer[0]);

        let main = if self.sidepane_visible {
            let split =
                Layout::horizontal([Constraint::Fill(3), Constraint::Fill(1)]).split(outer[1]);
            if let Some(tab) = self.tabs.get_mut(TabKey::Stations) {
                tab.render(frame, split[1]);
            }
            split[0]
        } else {
            outer[1]
        };

        let current = self.tabs.current();
        if let Some(tab) = self.tabs.get_mut(current) {
            tab.render(frame, main);
        }

        let status_line = self.status.status_text().unwrap_or("");
        frame.render_widget(Paragraph::new(status_line), outer[2]);

        let banner = format!("{}  {}", self.status.title(), self.status.callsign());
        frame.render_widget(Paragraph::new(banner), outer[3]);

        match &self.mode {
            Mode::Normal => {}
            Mode::DQuery(dialog) => dialog.render(frame, full),
            Mode::Prefs(dialog) => dialog.render(frame, full),
            Mode::ConfirmExit(dialog) => dialog.render(frame, full),
            Mode::Info(dialog) => dialog.render(frame, full),
            Mode::PickStation(picker) => picker.render(frame, full),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bus::{Reply, RequestKind},
        testing::{recorded_events, MockPlatform},
    };
    use std::collections::BTreeMap;

    fn test_window(config: Config) -> (MainWindow, Rc<SignalBus>) {
        let bus = Rc::new(SignalBus::new());
        let config_path = std::env::temp_dir().join(format!(
            "hamdeck-test-{}-{}.toml",
            std::process::id(),
            rand_suffix()
        ));
        let window = MainWindow::new(
            config,
            config_path,
            std::env::temp_dir(),
            bus.clone(),
            Rc::new(MockPlatform::default()),
        );
        (window, bus)
    }

    fn rand_suffix() -> u128 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default()
    }

    fn config_with(entries: &[(Section, &str, &str)]) -> Config {
        let mut config = Config::default();
        for (section, key, value) in entries {
            config.set(*section, key, *value);
        }
        config
    }

    #[test]
    fn initial_tab_is_messages_and_state_is_running() {
        let (window, _) = test_window(Config::default());
        assert_eq!(window.current_tab(), TabKey::Messages);
        assert_eq!(window.state(), WindowState::Running);
    }

    #[test]
    fn close_without_confirm_pref_quits_and_persists_geometry() {
        let config = config_with(&[(Section::Prefs, "confirm_exit", "false")]);
        let (mut window, _) = test_window(config);
        window.resized(800, 500);

        assert_eq!(window.begin_close(), CloseFlow::Quit);
        assert_eq!(
            window.config().getint(Section::State, "main_size_x"),
            Ok(800)
        );
        assert_eq!(
            window.config().getint(Section::State, "main_size_y"),
            Ok(500)
        );
    }

    #[test]
    fn declined_confirmation_vetoes_the_close() {
        let config = config_with(&[(Section::Prefs, "confirm_exit", "true")]);
        let (mut window, _) = test_window(config);

        assert_eq!(window.begin_close(), CloseFlow::AwaitingConfirmation);
        assert_eq!(window.state(), WindowState::ConfirmingExit);

        assert_eq!(window.confirm_close(false), CloseFlow::Veto);
        assert_eq!(window.state(), WindowState::Running);
    }

    #[test]
    fn accepted_confirmation_quits() {
        let config = config_with(&[(Section::Prefs, "confirm_exit", "true")]);
        let (mut window, _) = test_window(config);

        window.begin_close();
        assert_eq!(window.confirm_close(true), CloseFlow::Quit);
    }

    #[test]
    fn missing_confirm_pref_defaults_to_asking() {
        let (mut window, _) = test_window(Config::default());
        assert_eq!(window.begin_close(), CloseFlow::AwaitingConfirmation);
    }

    #[test]
    fn saved_prefs_broadcast_config_changed() {
        let (mut window, bus) = test_window(Config::default());
        let events = recorded_events(&bus);

        window.prefs_closed(true);
        assert!(matches!(events.borrow()[0], Event::ConfigChanged));

        // a cancelled prefs dialog stays quiet
        window.prefs_closed(false);
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn show_map_sends_our_callsign() {
        let config = config_with(&[(Section::User, "callsign", "KD7RYY")]);
        let (window, bus) = test_window(config);
        let events = recorded_events(&bus);

        window.show_map();
        assert!(matches!(
            &events.borrow()[0],
            Event::ShowMapStation { station } if station == "KD7RYY"
        ));
    }

    #[test]
    fn ping_choices_flatten_the_station_list() {
        let (window, bus) = test_window(Config::default());
        bus.respond(RequestKind::StationList, |_| {
            let mut map = BTreeMap::new();
            map.insert("0".to_string(), vec!["KD7RYY".to_string()]);
            map.insert("1".to_string(), vec!["W1AW".to_string(), "K6LRG".to_string()]);
            Reply::StationList(map)
        })
        .expect("registering responder on a fresh bus");

        let choices = window.ping_choices().expect("responder is registered");
        assert_eq!(
            choices,
            vec![
                ("KD7RYY".to_string(), "0".to_string()),
                ("W1AW".to_string(), "1".to_string()),
                ("K6LRG".to_string(), "1".to_string()),
            ]
        );
    }

    fn press(window: &mut MainWindow, code: KeyCode) {
        window.handle_key(KeyEvent::new(code, KeyModifiers::empty()));
    }

    #[test]
    fn connected_inet_restores_stored_state_and_toggle_persists() {
        let config = config_with(&[(Section::State, "connected_inet", "true")]);
        let (mut window, _) = test_window(config);
        assert!(window.connected_inet());

        press(&mut window, KeyCode::Char('i'));
        assert!(!window.connected_inet());
        assert_eq!(
            window.config().getboolean(Section::State, "connected_inet"),
            Ok(false)
        );

        press(&mut window, KeyCode::Char('i'));
        assert!(window.connected_inet());
    }

    #[test]
    fn prefs_editor_saves_callsign_and_broadcasts() {
        let (mut window, bus) = test_window(Config::default());
        let events = recorded_events(&bus);

        press(&mut window, KeyCode::Char('e'));
        // the field comes prefilled with the current callsign
        for _ in 0.."NOCALL".len() {
            press(&mut window, KeyCode::Backspace);
        }
        for c in "KD7RYY".chars() {
            press(&mut window, KeyCode::Char(c));
        }
        press(&mut window, KeyCode::Enter);

        assert_eq!(window.config().callsign(), "KD7RYY");
        assert!(matches!(events.borrow()[0], Event::ConfigChanged));
    }

    #[test]
    fn cancelled_prefs_editor_changes_nothing() {
        let (mut window, bus) = test_window(Config::default());
        let events = recorded_events(&bus);

        press(&mut window, KeyCode::Char('e'));
        press(&mut window, KeyCode::Char('X'));
        press(&mut window, KeyCode::Esc);

        assert_eq!(window.config().callsign(), "NOCALL");
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn existing_debug_log_opens_via_platform_services() {
        let data_dir = std::env::temp_dir().join(format!(
            "hamdeck-test-data-{}-{}",
            std::process::id(),
            rand_suffix()
        ));
        std::fs::create_dir_all(&data_dir).expect("temp data dir");
        let log_path = data_dir.join("debug.log");
        std::fs::write(&log_path, "started\n").expect("seed debug log");

        let platform = Rc::new(MockPlatform::default());
        let window = MainWindow::new(
            Config::default(),
            data_dir.join("config.toml"),
            data_dir.clone(),
            Rc::new(SignalBus::new()),
            platform.clone(),
        );

        let opened = window.open_debug_log().expect("opening an existing log succeeds");
        assert!(opened);
        assert_eq!(platform.opened(), vec![log_path]);

        let _ = std::fs::remove_dir_all(&data_dir);
    }

    #[test]
    fn missing_debug_log_is_reported_not_fatal() {
        let (window, _) = test_window(Config::default());
        // temp dir has no debug.log
        let opened = window.open_debug_log().expect("missing file is not an error");
        assert!(!opened);
    }

    #[test]
    fn destroy_is_one_way_and_notices_become_log_only() {
        let config = config_with(&[
            (Section::Prefs, "blink_chat", "true"),
            (Section::Sounds, "chat_enabled", "true"),
            (Section::Sounds, "chat", "ding.wav"),
        ]);
        let (mut window, _) = test_window(config);
        window.focus_lost();
        window.destroy();
        assert_eq!(window.state(), WindowState::Destroyed);

        window.notices.push(TabKey::Chat);
        window.process_notices();
        assert!(!window.attention().is_urgent());
    }
}
