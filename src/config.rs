use crate::capture::keyboard::parse_function_key;
use color_eyre::eyre::{eyre, Result};
use rdev::Key;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

const CONFIG_DIR: &str = ".config/inputscribe";
const CONFIG_FILE: &str = "config.toml";

/// Tracker configuration, loaded from `~/.config/inputscribe/config.toml`.
/// Every field has a default so a partial (or absent) file still yields
/// a working setup.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct TrackerConfig {
    /// Where the event database lives.
    pub database_path: PathBuf,
    /// Function key that ends the session (`f1`..`f12`).
    pub ender_key: String,
    /// Gamepad poll interval in milliseconds.
    pub input_delay_ms: u64,
    /// Cooldown per debounced analog channel in milliseconds.
    pub cooldown_ms: u64,
    /// Re-probe interval while no gamepad is attached, in milliseconds.
    pub gamepad_retry_ms: u64,
    /// Optional sound played when the session starts.
    pub start_sound: Option<PathBuf>,
    /// Optional sound played when the session stops.
    pub end_sound: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("input_data.db"),
            ender_key: "f12".to_string(),
            input_delay_ms: 100,
            cooldown_ms: 1000,
            gamepad_retry_ms: 2000,
            start_sound: None,
            end_sound: None,
        }
    }
}

impl TrackerConfig {
    /// Loads the config file, writing one with defaults on first run.
    pub fn load() -> Result<Self> {
        let mut path = get_home_dir();
        path.push(CONFIG_DIR);

        if !path.exists() {
            fs::create_dir_all(&path)
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
        path.push(CONFIG_FILE);

        if !path.exists() {
            info!("Writing default configuration to {}", path.display());
            let config = Self::default();
            let content = toml::to_string_pretty(&config)
                .map_err(|e| eyre!("Failed to serialize default config: {}", e))?;
            fs::write(&path, content)
                .map_err(|e| eyre!("Failed to write default config file: {}", e))?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| eyre!("Failed to read config file: {}", e))?;
        toml::from_str(&content).map_err(|e| eyre!("Failed to parse config file: {}", e))
    }

    pub fn input_delay(&self) -> Duration {
        Duration::from_millis(self.input_delay_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn gamepad_retry(&self) -> Duration {
        Duration::from_millis(self.gamepad_retry_ms)
    }

    pub fn ender(&self) -> Key {
        parse_function_key(&self.ender_key).unwrap_or_else(|| {
            warn!(
                "Unrecognized ender key '{}', falling back to F12",
                self.ender_key
            );
            Key::F12
        })
    }
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}
