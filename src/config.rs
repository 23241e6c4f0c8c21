use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

const APP_DIR_NAME: &str = "hamdeck";
const CONFIG_FILE_NAME: &str = "config.toml";

// NOTE: stole this from `gitui`
pub fn get_app_config_path() -> Result<PathBuf> {
    let mut path = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join(".config"))
    } else {
        dirs::config_dir()
    }
    .ok_or_else(|| anyhow!("failed to find os config dir."))?;

    path.push(APP_DIR_NAME);
    fs::create_dir_all(&path)?;
    Ok(path)
}

pub fn get_app_data_path() -> Result<PathBuf> {
    let mut path = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join(".local").join("share"))
    } else {
        dirs::data_local_dir()
    }
    .ok_or_else(|| anyhow!("failed to find os local data dir."))?;

    path.push(APP_DIR_NAME);
    fs::create_dir_all(&path)?;
    Ok(path)
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing config key [{section}] {key}")]
    Missing { section: Section, key: String },

    #[error("config key [{section}] {key} has unusable value {value:?}")]
    Invalid {
        section: Section,
        key: String,
        value: String,
    },
}

/// The four namespaces of the key/value store. Everything the shell persists
/// or reads lives under one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Section {
    State,
    Prefs,
    Sounds,
    User,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RawConfig {
    #[serde(default)]
    pub state: HashMap<String, String>,

    #[serde(default)]
    pub prefs: HashMap<String, String>,

    #[serde(default)]
    pub sounds: HashMap<String, String>,

    #[serde(default)]
    pub user: HashMap<String, String>,
}

impl TryFrom<&str> for RawConfig {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        let config = toml::from_str(value)?;
        Ok(config)
    }
}

/// Sectioned key/value store backing every tunable in the shell.
///
/// Values are stored as strings; `getint` and `getboolean` parse on read, so
/// a malformed value surfaces as `ConfigError::Invalid` at the use site
/// rather than at load time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    raw: RawConfig,
}

impl Config {
    pub fn read_from_string(file: &str) -> Result<Self> {
        let raw = RawConfig::try_from(file)?;
        Ok(Self { raw })
    }

    /// Reads the config file under the app config dir, seeding it with the
    /// shipped defaults if it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            fs::write(path, include_str!("../assets/default-config.toml"))?;
        }

        let file = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::read_from_string(&file)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = toml::to_string_pretty(&self.raw)?;
        fs::write(path, file)
            .with_context(|| format!("writing config to {}", path.display()))
    }

    fn section(&self, section: Section) -> &HashMap<String, String> {
        match section {
            Section::State => &self.raw.state,
            Section::Prefs => &self.raw.prefs,
            Section::Sounds => &self.raw.sounds,
            Section::User => &self.raw.user,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut HashMap<String, String> {
        match section {
            Section::State => &mut self.raw.state,
            Section::Prefs => &mut self.raw.prefs,
            Section::Sounds => &mut self.raw.sounds,
            Section::User => &mut self.raw.user,
        }
    }

    pub fn get(&self, section: Section, key: &str) -> Option<&str> {
        self.section(section).get(key).map(String::as_str)
    }

    pub fn getint(&self, section: Section, key: &str) -> Result<i64, ConfigError> {
        let value = self
            .get(section, key)
            .ok_or_else(|| ConfigError::Missing {
                section,
                key: key.to_string(),
            })?;
        value.parse().map_err(|_| ConfigError::Invalid {
            section,
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn getboolean(&self, section: Section, key: &str) -> Result<bool, ConfigError> {
        let value = self
            .get(section, key)
            .ok_or_else(|| ConfigError::Missing {
                section,
                key: key.to_string(),
            })?;
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ConfigError::Invalid {
                section,
                key: key.to_string(),
                value: value.to_string(),
            })
        }
    }

    pub fn set(&mut self, section: Section, key: &str, value: impl Into<String>) {
        self.section_mut(section).insert(key.to_string(), value.into());
    }

    /// The operator's callsign, as shown in the identity banner.
    pub fn callsign(&self) -> &str {
        self.get(Section::User, "callsign").unwrap_or("NOCALL")
    }
}
