//! # Config
//!
//! Format configuration read by transpilers, and engine configuration loaded from TOML

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::inventory::Inventory;

/// Registry identity used when none is configured
pub const DEFAULT_REGISTRY_ID: &str = "com.github.datehook.DateFormat";

/// Supplies the date format that replaces hard-coded ones
///
/// The engine never writes through this trait and reads it once per patch application.
pub trait FormatSource {
    /// Current replacement format, e.g. `yyyy/MM/dd`
    fn date_format(&self) -> String;
}
impl FormatSource for str {
    fn date_format(&self) -> String {
        self.to_owned()
    }
}
impl FormatSource for String {
    fn date_format(&self) -> String {
        self.clone()
    }
}
impl<F: Fn() -> String> FormatSource for F {
    fn date_format(&self) -> String {
        self()
    }
}

/// Order of the day, month and year components
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// year, month, day
    #[default]
    Ymd,
    /// day, month, year
    Dmy,
    /// month, day, year
    Mdy,
}

/// User-facing date format settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormatConfig {
    /// Component order
    pub order: DateOrder,
    /// Text placed between components
    pub separator: String,
    /// Pad day and month to two digits
    pub leading_zeros: bool,
    /// Show the year with four digits instead of two
    pub four_digit_year: bool,
}
impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            order: DateOrder::Ymd,
            separator: "/".into(),
            leading_zeros: true,
            four_digit_year: true,
        }
    }
}
impl DateFormatConfig {
    /// Builds the .NET-style format string for these settings
    pub fn build_date_format_string(&self) -> String {
        let (day, month) = if self.leading_zeros {
            ("dd", "MM")
        } else {
            ("d", "M")
        };
        let year = if self.four_digit_year { "yyyy" } else { "yy" };
        let parts = match self.order {
            DateOrder::Ymd => [year, month, day],
            DateOrder::Dmy => [day, month, year],
            DateOrder::Mdy => [month, day, year],
        };
        parts.join(&self.separator)
    }
}
impl FormatSource for DateFormatConfig {
    fn date_format(&self) -> String {
        self.build_date_format_string()
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Identity all patches are recorded under
    pub registry_id: String,
    /// Methods to patch
    pub inventory: Inventory,
}
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            registry_id: DEFAULT_REGISTRY_ID.into(),
            inventory: Inventory::builtin(),
        }
    }
}
impl EngineConfig {
    /// Parses and validates a TOML document. Missing keys fall back to the defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks that the config can drive a patch pass
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry_id.trim().is_empty() {
            return Err(ConfigError::Invalid("registry_id must not be empty".into()));
        }
        if self.inventory.mandatory.is_empty() {
            return Err(ConfigError::Invalid(
                "inventory must list at least one mandatory target".into(),
            ));
        }
        for companion in &self.inventory.companions {
            if companion.module_ids.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "companion {} has no module ids",
                    companion.name
                )));
            }
        }
        Ok(())
    }
}
