//! Built-in schema for ITAC assessment reports.

use crate::config::CompareConfig;
use crate::error::CompareError;

/// TOML source of the built-in schema.
pub const ITAC_SCHEMA_TOML: &str = include_str!("../schemas/itac.toml");

/// Parse and validate the built-in schema.
pub fn default_config() -> Result<CompareConfig, CompareError> {
    CompareConfig::from_toml(ITAC_SCHEMA_TOML)
}
