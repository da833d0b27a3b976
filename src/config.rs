//! Configuration loading and management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::button::{ButtonConfig, ButtonConfigFile};

/// Environment variable overriding the socket path
pub const SOCKET_ENV: &str = "HOLD_BUTTON_SOCKET";

/// Name of the optional button settings file inside the data directory
pub const BUTTON_FILE: &str = "button.json";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Settings for the served button
    pub button: ButtonConfig,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("hold-button");

        let mut config = Self::load_from(&data_dir)?;
        if let Ok(socket) = std::env::var(SOCKET_ENV) {
            config.socket_path = PathBuf::from(socket);
        }
        Ok(config)
    }

    /// Load configuration rooted at `data_dir`, reading `button.json` if present
    pub fn load_from(data_dir: &Path) -> Result<Self> {
        let button_path = data_dir.join(BUTTON_FILE);
        let button = if button_path.exists() {
            let raw = std::fs::read_to_string(&button_path)
                .with_context(|| format!("failed to read {}", button_path.display()))?;
            let file: ButtonConfigFile = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse {}", button_path.display()))?;
            ButtonConfig::try_from(file).context("invalid button configuration")?
        } else {
            debug!(?button_path, "no button file, using defaults");
            ButtonConfig::default()
        };

        Ok(Self {
            socket_path: data_dir.join("daemon.sock"),
            data_dir: data_dir.to_owned(),
            button,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
