/// Converter configuration, loaded from an optional JSON file
use crate::error::{ConvertError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default rule for where the next meeting pattern of a cell begins: a line
/// starting with the four-digit year of a `YYYY-MM-DD` date.
pub const DEFAULT_PATTERN_BOUNDARY: &str = r"\d{4}";

/// Location text used for patterns that carry no location segment.
pub const DEFAULT_LOCATION: &str = "Online";

/// What the calendar LOCATION property carries for each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationProperty {
    /// The resolved postal address block
    #[default]
    Address,
    /// The location text exactly as it appeared in the meeting pattern
    Raw,
}

/// Top-level converter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Regex matched at the start of a line to detect the next meeting pattern
    pub pattern_boundary: String,
    /// Location used when a pattern has only date, day and time segments
    pub default_location: String,
    pub location_property: LocationProperty,
    /// Optional display name for the generated calendar
    pub calendar_name: Option<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            pattern_boundary: DEFAULT_PATTERN_BOUNDARY.to_string(),
            default_location: DEFAULT_LOCATION.to_string(),
            location_property: LocationProperty::default(),
            calendar_name: None,
        }
    }
}

impl ConverterConfig {
    /// Loads a configuration from a JSON file
    ///
    /// Keys missing from the file keep their default values. The boundary
    /// pattern is validated so a bad regex fails before any conversion work.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON config file
    ///
    /// # Returns
    /// * `Ok(ConverterConfig)` - Parsed configuration
    /// * `Err` - If the file can't be read, parsed, or has an invalid boundary
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConvertError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        let config: ConverterConfig = serde_json::from_str(&content)?;
        config.boundary_regex()?;
        Ok(config)
    }

    /// Compiles the boundary pattern, anchored to the start of a line.
    pub fn boundary_regex(&self) -> Result<Regex> {
        Regex::new(&format!("^(?:{})", self.pattern_boundary)).map_err(|e| ConvertError::Config {
            message: format!("invalid pattern_boundary '{}': {e}", self.pattern_boundary),
        })
    }
}
