//! Daemon configuration
//!
//! Stored as TOML, by default at `~/.config/itgio/itgio.toml`. A missing file
//! means defaults; every key is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use itgio_device::{ItgioDriver, RoleOverride, RoleOverrides, Variant, MODE_WORLD_RW};
use serde::{Deserialize, Serialize};

/// Where LED endpoints are published unless configured otherwise
pub const DEFAULT_LED_DIR: &str = "/run/itgio/leds";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItgioConfig {
    /// Board variant (`basic` or `refined`)
    pub variant: Variant,
    /// Base directory for the per-LED brightness endpoints
    pub led_dir: PathBuf,
    /// Access mode of each `brightness` file
    pub led_mode: u32,
    /// How often brightness files are checked for writes
    pub poll_interval_ms: u64,
    /// Forward buttons to a virtual gamepad
    pub gamepad: bool,
    /// Name of the virtual gamepad
    pub gamepad_name: String,
    /// Calibrated interface roles
    pub interfaces: Vec<RoleOverride>,
}

impl Default for ItgioConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            led_dir: PathBuf::from(DEFAULT_LED_DIR),
            led_mode: MODE_WORLD_RW,
            poll_interval_ms: 20,
            gamepad: true,
            gamepad_name: "ITG-IO Gamepad".to_string(),
            interfaces: Vec::new(),
        }
    }
}

impl ItgioConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("itgio")
            .join("itgio.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.led_mode > 0o777 {
            bail!("led_mode {:#o} is not a permission mode", self.led_mode);
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be at least 1");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn role_overrides(&self) -> RoleOverrides {
        RoleOverrides(self.interfaces.clone())
    }

    /// Driver configured from this file
    pub fn driver(&self) -> ItgioDriver {
        ItgioDriver::new(self.variant)
            .with_overrides(self.role_overrides())
            .with_led_mode(self.led_mode)
    }
}
