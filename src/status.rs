//! The status region and identity banner at the bottom of the window.
//!
//! Transient status text goes stale: a recurring tick clears it once it has
//! been up for longer than the staleness threshold. The tick interval and
//! the threshold are independent constants.

use crate::{config::Config, PRODUCT_NAME};
use std::time::{Duration, Instant};

/// How often the staleness check runs.
pub const STATUS_TICK: Duration = Duration::from_secs(3);

/// How long a status message stays up before a tick clears it.
pub const STATUS_STALE: Duration = Duration::from_secs(30);

/// Time source for the staleness check, injectable so tests can move time
/// forward without sleeping.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
pub struct StatusBar<C: Clock = SystemClock> {
    clock: C,
    visible: Option<String>,
    last_status: Option<Instant>,
    callsign: String,
    title: String,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> StatusBar<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            visible: None,
            last_status: None,
            callsign: String::new(),
            title: PRODUCT_NAME.to_string(),
        }
    }

    /// Replaces the visible status text (at most one message is ever
    /// visible) and refreshes the identity banner from the current callsign.
    pub fn set_status(&mut self, msg: &str, config: &Config) {
        self.last_status = Some(self.clock.now());

        // clear before push: exactly one message visible
        self.visible = None;
        self.visible = Some(msg.to_string());

        let call = config.callsign();
        self.title = format!("{PRODUCT_NAME}: {call}");
        self.callsign = call.to_string();
    }

    /// The recurring staleness check. Does not reset the timestamp, so once
    /// the text has been cleared further ticks are no-ops.
    pub fn tick(&mut self) {
        if let Some(last) = self.last_status {
            if self.clock.now().duration_since(last) > STATUS_STALE {
                self.visible = None;
            }
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        self.visible.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }
}
