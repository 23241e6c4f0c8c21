//! Turns tab notices into user-visible attention: the window urgency hint
//! and a per-tab sound. The two effects are independent.

use crate::{
    config::{Config, Section},
    platform::PlatformServices,
    tabs::TabKey,
};

/// Window-level focus and attention state. The urgency hint is only ever set
/// while the window is unfocused and clears unconditionally when focus comes
/// back.
#[derive(Debug, Clone, Copy)]
pub struct WindowAttention {
    focused: bool,
    urgent: bool,
}

impl Default for WindowAttention {
    fn default() -> Self {
        Self {
            focused: true,
            urgent: false,
        }
    }
}

impl WindowAttention {
    pub fn focus_gained(&mut self) {
        self.focused = true;
        self.urgent = false;
    }

    pub fn focus_lost(&mut self) {
        self.focused = false;
    }

    pub const fn has_focus(&self) -> bool {
        self.focused
    }

    pub const fn is_urgent(&self) -> bool {
        self.urgent
    }

    fn set_urgent(&mut self) {
        self.urgent = true;
    }
}

/// What a notice from a given tab is allowed to do, resolved from config at
/// the moment of the notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPolicy {
    pub blink: bool,
    pub sound: Option<String>,
}

impl NotificationPolicy {
    pub fn for_key(config: &Config, key: TabKey) -> Self {
        let blink = config
            .getboolean(Section::Prefs, &format!("blink_{key}"))
            .unwrap_or(false);

        // the event log never sounds, no matter what the config says
        let sound = if key == TabKey::Event {
            None
        } else {
            let enabled = config
                .getboolean(Section::Sounds, &format!("{key}_enabled"))
                .unwrap_or(false);
            if enabled {
                config
                    .get(Section::Sounds, &key.to_string())
                    .filter(|f| !f.is_empty())
                    .map(ToString::to_string)
            } else {
                None
            }
        };

        Self { blink, sound }
    }
}

#[derive(Debug, Default)]
pub struct NotificationRouter;

impl NotificationRouter {
    /// Applies the tab's attention policy to one notice.
    pub fn on_notice(
        &self,
        key: TabKey,
        config: &Config,
        attention: &mut WindowAttention,
        platform: &dyn PlatformServices,
    ) {
        let policy = NotificationPolicy::for_key(config, key);

        if policy.blink && !attention.has_focus() {
            attention.set_urgent();
        }

        if let Some(sound) = policy.sound {
            platform.play_sound(&sound);
        }
    }
}
