//! Persistent defaults

use std::path::PathBuf;

use bearcat_protocol::BAUD_RATE;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Defaults read from `settings.json` in the user's config directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Port used when none is given on the command line
    #[serde(default)]
    pub port: Option<String>,
    /// Baud rate used when `--baud` is not given
    #[serde(default = "default_baud")]
    pub baud_rate: u32,
}

fn default_baud() -> u32 {
    BAUD_RATE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: BAUD_RATE,
        }
    }
}

impl Settings {
    /// `<config dir>/bearcat/settings.json`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bearcat").join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };

        match Self::from_json(&text) {
            Ok(settings) => {
                debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
