//! Application configuration.
//!
//! Values are layered: built-in defaults, then `~/.config/village/config.toml`,
//! then `VILLAGE_*` environment variables (nested keys joined with `__`, e.g.
//! `VILLAGE_SIMULATION__TICK_INTERVAL_MS=1000`).

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::{Locale, ResourceAmounts};

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "village";

const DEFAULT_CONFIG: &str = r#"# Village configuration.
# Display language: "en" or "ar".
locale = "en"

[simulation]
# Milliseconds between production ticks.
tick_interval_ms = 3000
# Milliseconds a status message stays visible.
message_duration_ms = 3000
# Population gained per completed construction.
population_per_build = 10
initial_population = 50

[simulation.initial_resources]
wood = 500
clay = 500
iron = 500
crop = 500
"#;

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A timer interval was configured as zero.
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

/// Tunable parameters of the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Milliseconds between production ticks.
    pub tick_interval_ms: u64,
    /// Milliseconds before a status message is cleared.
    pub message_duration_ms: u64,
    /// Population added per successful construction.
    pub population_per_build: u64,
    /// Population of a fresh village.
    pub initial_population: u64,
    /// Resources of a fresh village.
    pub initial_resources: ResourceAmounts,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 3_000,
            message_duration_ms: 3_000,
            population_per_build: 10,
            initial_population: 50,
            initial_resources: ResourceAmounts::uniform(500),
        }
    }
}

impl SimulationConfig {
    /// Interval between production ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// How long a status message stays visible.
    pub fn message_duration(&self) -> Duration {
        Duration::from_millis(self.message_duration_ms)
    }

    /// Reject values the timers cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("tick_interval_ms"));
        }
        if self.message_duration_ms == 0 {
            return Err(ConfigError::ZeroInterval("message_duration_ms"));
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Display language.
    pub locale: Locale,
    /// Simulation parameters.
    pub simulation: SimulationConfig,
}

impl AppConfig {
    /// Load from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from `path` (optional on disk) plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("VILLAGE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("failed to parse configuration")?;
        config
            .simulation
            .validate()
            .context("invalid simulation configuration")?;
        Ok(config)
    }
}

/// Path of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write the default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = default_config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.simulation.tick_interval(), Duration::from_secs(3));
        assert_eq!(config.simulation.message_duration(), Duration::from_secs(3));
        Ok(())
    }

    #[test]
    fn written_default_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("village").join("config.toml");
        write_default_config(&path)?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn file_overrides_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
locale = "ar"

[simulation]
tick_interval_ms = 1000
population_per_build = 5

[simulation.initial_resources]
wood = 20
"#,
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.locale, Locale::Arabic);
        assert_eq!(config.simulation.tick_interval_ms, 1000);
        assert_eq!(config.simulation.population_per_build, 5);
        assert_eq!(config.simulation.message_duration_ms, 3000);
        assert_eq!(config.simulation.initial_resources.wood, 20);
        assert_eq!(config.simulation.initial_resources.clay, 500);
        Ok(())
    }

    #[test]
    fn zero_interval_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "[simulation]\ntick_interval_ms = 0\n")?;
        assert!(AppConfig::load_from(&path).is_err());

        let config = SimulationConfig {
            message_duration_ms: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroInterval("message_duration_ms"))
        );
        Ok(())
    }
}
