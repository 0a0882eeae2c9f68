use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::Priority;

/// Location of the engine config relative to a project root.
pub const ENGINE_CONFIG_PATH: &str = ".rinna/engine.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Edge weights used by critical-path relaxation.
///
/// An item's weight is `base + bonus(priority)`, scaled by
/// `completed_factor` once the item is done or released. The defaults keep
/// the historical arithmetic (`1 + {1,2,3,4}`, halved when complete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default = "default_base")]
    pub base: f64,
    #[serde(default = "default_low")]
    pub low: f64,
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_critical")]
    pub critical: f64,
    #[serde(default = "default_completed_factor")]
    pub completed_factor: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            low: default_low(),
            medium: default_medium(),
            high: default_high(),
            critical: default_critical(),
            completed_factor: default_completed_factor(),
        }
    }
}

impl WeightConfig {
    #[must_use]
    pub const fn bonus(&self, priority: Priority) -> f64 {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
            Priority::Critical => self.critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Days assumed for an item without a usable `estimated_days` value.
    #[serde(default = "default_estimated_days")]
    pub default_estimated_days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_estimated_days: default_estimated_days(),
        }
    }
}

const fn default_base() -> f64 {
    1.0
}

const fn default_low() -> f64 {
    1.0
}

const fn default_medium() -> f64 {
    2.0
}

const fn default_high() -> f64 {
    3.0
}

const fn default_critical() -> f64 {
    4.0
}

const fn default_completed_factor() -> f64 {
    0.5
}

const fn default_estimated_days() -> u32 {
    1
}

/// Parse an engine config from TOML text.
///
/// # Errors
///
/// Returns an error if the text is not valid TOML for [`EngineConfig`].
pub fn parse_engine_config(content: &str) -> Result<EngineConfig> {
    toml::from_str::<EngineConfig>(content).context("Failed to parse engine config")
}

/// Load `<project_root>/.rinna/engine.toml`, falling back to defaults when
/// the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_engine_config(project_root: &Path) -> Result<EngineConfig> {
    let path = project_root.join(ENGINE_CONFIG_PATH);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no engine config, using defaults");
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<EngineConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}
