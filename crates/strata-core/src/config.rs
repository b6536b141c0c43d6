//! Analysis configuration.
//!
//! Project settings live in `strata.toml` (in the working directory, or passed
//! with `--config`); per-user preferences live in `<config_dir>/strata/config.toml`.
//! Missing files fall back to defaults; unparsable files are errors.
//!
//! ```toml
//! [chain]
//! epsilon = 0.01
//! max_iter = 10000
//!
//! [class]
//! epsilon = 1e-6
//! max_iter = 10000
//!
//! [check]
//! row_tolerance = 0.01
//! mass_tolerance = 1e-3
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the project configuration.
pub const PROJECT_CONFIG_FILE: &str = "strata.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub class: ClassConfig,
    #[serde(default)]
    pub check: CheckConfig,
}

/// Stopping rule for powers of the full transition matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_chain_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            epsilon: default_chain_epsilon(),
            max_iter: default_max_iter(),
        }
    }
}

/// Stopping rule for per-class limiting distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassConfig {
    #[serde(default = "default_class_epsilon")]
    pub epsilon: f64,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            epsilon: default_class_epsilon(),
            max_iter: default_max_iter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Allowed `|row sum - 1|` before a row is reported.
    #[serde(default = "default_row_tolerance")]
    pub row_tolerance: f64,
    /// Allowed `|mass - 1|` for a persistent class's limiting distribution.
    #[serde(default = "default_mass_tolerance")]
    pub mass_tolerance: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            row_tolerance: default_row_tolerance(),
            mass_tolerance: default_mass_tolerance(),
        }
    }
}

impl AnalysisConfig {
    /// Reject settings that would make the iterative computations meaningless.
    ///
    /// # Errors
    ///
    /// Fails if an epsilon or tolerance is not a positive finite number, or a
    /// `max_iter` is zero.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("chain.epsilon", self.chain.epsilon),
            ("class.epsilon", self.class.epsilon),
            ("check.row_tolerance", self.check.row_tolerance),
            ("check.mass_tolerance", self.check.mass_tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                bail!("{name} must be a positive number, got {value}");
            }
        }
        if self.chain.max_iter == 0 {
            bail!("chain.max_iter must be at least 1");
        }
        if self.class.max_iter == 0 {
            bail!("class.max_iter must be at least 1");
        }
        Ok(())
    }
}

/// Per-user preferences.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Preferred output mode: `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

/// Load and validate the analysis configuration at `path`.
///
/// Returns the defaults if the file does not exist.
///
/// # Errors
///
/// Fails if the file cannot be read, does not parse, or does not validate.
pub fn load_analysis_config(path: &Path) -> Result<AnalysisConfig> {
    if !path.exists() {
        return Ok(AnalysisConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<AnalysisConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    Ok(config)
}

/// Load the per-user configuration, if any.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("strata/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Map a user-supplied output mode name to its canonical form.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

const fn default_chain_epsilon() -> f64 {
    0.01
}

const fn default_class_epsilon() -> f64 {
    1e-6
}

const fn default_max_iter() -> usize {
    10_000
}

const fn default_row_tolerance() -> f64 {
    crate::check::DEFAULT_ROW_TOLERANCE
}

const fn default_mass_tolerance() -> f64 {
    1e-3
}
