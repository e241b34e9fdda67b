//! User-level configuration for gitpulse
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/gitpulse/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::analysis::WalkLimits;

/// Environment variables that override walk limits
pub const ENV_AHEAD_LIMIT: &str = "GITPULSE_AHEAD_LIMIT";
pub const ENV_SHARED_LIMIT: &str = "GITPULSE_SHARED_LIMIT";
pub const ENV_HISTORY_LIMIT: &str = "GITPULSE_HISTORY_LIMIT";

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub walk: WalkLimits,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    /// Redraw interval while waiting for input or results
    pub tick_rate_ms: u64,

    /// Color for headers, the selection marker and ref names
    pub accent: String,

    /// Color for secondary text (dates, hashes, footer)
    pub muted: String,

    /// Background of the selected row
    pub highlight: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            accent: "cyan".to_string(),
            muted: "darkgray".to_string(),
            highlight: "blue".to_string(),
        }
    }
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/gitpulse/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = match Self::user_config_path().filter(|p| p.exists()) {
            Some(path) => {
                let content = std::fs::read_to_string(&path)?;
                Self::parse_or_default(&content, &path.display().to_string())
            }
            None => UserConfig::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file, falling back to defaults when it is malformed.
    fn parse_or_default(content: &str, origin: &str) -> Self {
        match toml::from_str::<UserConfig>(content) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring invalid config at {}: {}", origin, e);
                UserConfig::default()
            }
        }
    }

    /// Apply environment overrides. Unparseable values are ignored.
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides: [(&str, &mut usize); 3] = [
            (ENV_AHEAD_LIMIT, &mut self.walk.ahead_limit),
            (ENV_SHARED_LIMIT, &mut self.walk.shared_limit),
            (ENV_HISTORY_LIMIT, &mut self.walk.history_limit),
        ];
        for (key, slot) in overrides {
            let Some(raw) = lookup(key) else { continue };
            match raw.trim().parse::<usize>() {
                Ok(value) => *slot = value,
                Err(_) => warn!("Ignoring {}={:?}: not a number", key, raw),
            }
        }
    }

    /// Get the user config directory path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gitpulse").join("config.toml"))
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::write_example(&config_path)?;
        Ok(config_path)
    }

    /// Write the example config to `config_path` unless a file is already there.
    fn write_example(config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !config_path.exists() {
            std::fs::write(config_path, EXAMPLE_CONFIG)?;
        }
        Ok(())
    }
}

const EXAMPLE_CONFIG: &str = r##"# gitpulse User Configuration

[walk]
# Commits listed per side of a comparison
# ahead_limit = 100
# Shared-history preview behind the merge base
# shared_limit = 20
# Commits scanned for frequency statistics
# history_limit = 100000
# Commits kept for the timeline view
# timeline_limit = 500

[ui]
# tick_rate_ms = 250
# Any ratatui color name ("cyan", "light-blue") or hex ("#89b4fa")
# accent = "cyan"
# muted = "darkgray"
# highlight = "blue"
"##;
