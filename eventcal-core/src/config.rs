//! eventcal configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{EventCalError, EventCalResult};
use crate::permission::PersonalManage;

static DEFAULT_DATA_FILE: &str = "~/.eventcal/store.json";
const DEFAULT_PORT: u16 = 4096;

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Plugin-wide settings consulted by the participation registry.
///
/// Boolean flags accept `yes`/`no` as well as `true`/`false`, since that is
/// how existing installations store them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enforce each event's `spots` limit on join
    pub spots_display: bool,
    /// Reject joins that overlap another event on the user's calendar
    pub no_collisions: bool,
    /// Region codes are translation handles rather than display text
    pub region_list_handles: bool,
    /// Event type codes are translation handles rather than display text
    pub type_list_handles: bool,
    pub personal_manage: PersonalManage,
}

/// Configuration at ~/.config/eventcal/config.toml
///
/// Every key can be overridden from the environment, e.g.
/// `EVENTCAL_PORT=8080` or `EVENTCAL_SETTINGS__SPOTS_DISPLAY=yes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCalConfig {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Optional TOML file with a `[messages]` table overriding the built-in texts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_file: Option<PathBuf>,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for EventCalConfig {
    fn default() -> Self {
        EventCalConfig {
            settings: Settings::default(),
            data_file: default_data_file(),
            language_file: None,
            port: DEFAULT_PORT,
        }
    }
}

impl EventCalConfig {
    pub fn config_path() -> EventCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventCalError::Config("Could not determine config directory".into()))?
            .join("eventcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented template on first run.
    pub fn load() -> EventCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> EventCalResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("EVENTCAL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| EventCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EventCalError::Config(e.to_string()))
    }

    /// The store location with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        expand(&self.data_file)
    }

    pub fn language_path(&self) -> Option<PathBuf> {
        self.language_file.as_deref().map(expand)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventCalResult<()> {
        let contents = format!(
            "\
# eventcal configuration

# Where participation data is stored:
# data_file = \"{}\"

# Port the action server listens on:
# port = {}

# Extra translations ([messages] table):
# language_file = \"~/.eventcal/messages.toml\"

[settings]
# Enforce event capacity (spots):
# spots_display = \"no\"

# Reject joining events that overlap one already on the calendar:
# no_collisions = \"no\"

# Treat region and type codes as translation handles:
# region_list_handles = \"no\"
# type_list_handles = \"no\"

# Who may manage events on personal calendars (open, closed, by_event):
# personal_manage = \"open\"
",
            DEFAULT_DATA_FILE, DEFAULT_PORT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EventCalConfig::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config.port, 4096);
        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(config.settings, Settings::default());
    }

    #[test]
    fn default_template_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        EventCalConfig::create_default_config(&path).unwrap();
        let config = EventCalConfig::load_from(&path).unwrap();

        assert_eq!(config.settings, Settings::default());
        assert!(config.language_file.is_none());
    }

    #[test]
    fn reads_legacy_yes_no_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
data_file = "/var/lib/eventcal/store.json"

[settings]
spots_display = "yes"
no_collisions = true
region_list_handles = "no"
personal_manage = "by_event"
"#,
        )
        .unwrap();

        let config = EventCalConfig::load_from(&path).unwrap();

        assert!(config.settings.spots_display);
        assert!(config.settings.no_collisions);
        assert!(!config.settings.region_list_handles);
        assert!(!config.settings.type_list_handles);
        assert_eq!(config.settings.personal_manage, PersonalManage::ByEvent);
        assert_eq!(config.data_path(), PathBuf::from("/var/lib/eventcal/store.json"));
    }

    #[test]
    fn unknown_policy_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\npersonal_manage = \"sometimes\"\n").unwrap();

        let err = EventCalConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, EventCalError::Config(_)));
    }
}
