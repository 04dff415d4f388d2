//! showup configuration at ~/.config/showup/config.toml

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::error::{ShowUpError, ShowUpResult};
use crate::scheduler::DEFAULT_NAMESPACE;

static DEFAULT_LINK_BASE: &str = "https://imentos.github.io/ShowUpBooster/";
static DEFAULT_DATA_DIR: &str = "~/.local/share/showup";

fn default_link_base() -> String {
    DEFAULT_LINK_BASE.to_string()
}

fn is_default_link_base(s: &String) -> bool {
    s == DEFAULT_LINK_BASE
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn is_default_namespace(s: &String) -> bool {
    s == DEFAULT_NAMESPACE
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn is_default_data_dir(p: &PathBuf) -> bool {
    *p == default_data_dir()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShowUpConfig {
    /// Page that event links point at
    #[serde(default = "default_link_base", skip_serializing_if = "is_default_link_base")]
    pub link_base: String,

    /// Prefix of notification identifiers
    #[serde(default = "default_namespace", skip_serializing_if = "is_default_namespace")]
    pub namespace: String,

    /// Where pending reminders are stored
    #[serde(default = "default_data_dir", skip_serializing_if = "is_default_data_dir")]
    pub data_dir: PathBuf,

    /// IANA zone for times in reminder text; defaults to the system zone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Answer to the notification permission prompt; unset until asked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders_allowed: Option<bool>,

    #[serde(skip)]
    source: Option<PathBuf>,
}

impl Default for ShowUpConfig {
    fn default() -> Self {
        ShowUpConfig {
            link_base: default_link_base(),
            namespace: default_namespace(),
            data_dir: default_data_dir(),
            timezone: None,
            reminders_allowed: None,
            source: None,
        }
    }
}

impl ShowUpConfig {
    pub fn config_path() -> ShowUpResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ShowUpError::Config("Could not determine config directory".into()))?
            .join("showup");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/showup/config.toml, creating it on first run.
    pub fn load() -> ShowUpResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`, overlaid with `SHOWUP_*` environment variables.
    pub fn load_from(path: &Path) -> ShowUpResult<Self> {
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let mut config: ShowUpConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("SHOWUP"))
            .build()
            .map_err(|e| ShowUpError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ShowUpError::Config(e.to_string()))?;

        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Save back to the file this config was loaded from.
    pub fn save(&self) -> ShowUpResult<()> {
        let config_path = match &self.source {
            Some(path) => path.clone(),
            None => Self::config_path()?,
        };

        let content =
            toml::to_string_pretty(self).map_err(|e| ShowUpError::Config(e.to_string()))?;

        std::fs::write(&config_path, content)
            .map_err(|e| ShowUpError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ShowUpResult<()> {
        let contents = format!(
            "\
# showup configuration

# Page that shared event links open:
# link_base = \"{}\"

# Prefix for notification identifiers:
# namespace = \"{}\"

# Where pending reminders are kept:
# data_dir = \"{}\"

# Time zone for reminder text (defaults to the system zone):
# timezone = \"America/Los_Angeles\"
",
            DEFAULT_LINK_BASE, DEFAULT_NAMESPACE, DEFAULT_DATA_DIR
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ShowUpError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ShowUpError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn link_base_url(&self) -> ShowUpResult<Url> {
        Url::parse(&self.link_base)
            .map_err(|e| ShowUpError::Config(format!("Invalid link_base '{}': {e}", self.link_base)))
    }

    /// Configured zone, else the system zone, else UTC.
    ///
    /// An unknown configured zone goes straight to UTC.
    pub fn time_zone(&self) -> Tz {
        let name = self
            .timezone
            .clone()
            .or_else(|| iana_time_zone::get_timezone().ok());

        match name {
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!(timezone = %name, "Unknown time zone, using UTC");
                Tz::UTC
            }),
            None => Tz::UTC,
        }
    }

    /// Record the answer to the notification permission prompt.
    pub fn set_reminders_allowed(&mut self, allowed: bool) -> ShowUpResult<()> {
        self.reminders_allowed = Some(allowed);
        self.save()
    }
}
