use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CompareError;
use crate::model::{FieldRole, Section, ValueKind};

pub const DEFAULT_TOLERANCE: f64 = 0.01;

pub const DEFAULT_UNITS: &[&str] = &[
    "kWh", "kW", "MWh", "MW", "MMBtu", "kBtu", "Btu", "therm", "therms", "Mcf", "CCF", "gal",
    "lb", "lbs", "ton", "tons", "hp",
];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    pub name: String,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_units")]
    pub units: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_units() -> Vec<String> {
    DEFAULT_UNITS.iter().map(|u| u.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// One logical field and where to find it on each side.
///
/// `docx_keys` and `excel_keys` are tried in order; the first key holding a
/// present value wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub section: Section,
    pub kind: ValueKind,
    #[serde(default)]
    pub role: FieldRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub docx_keys: Vec<String>,
    pub excel_keys: Vec<String>,
}

impl FieldSpec {
    pub fn new(name: &str, section: Section, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            section,
            kind,
            role: FieldRole::Plain,
            label: None,
            docx_keys: vec![name.to_string()],
            excel_keys: vec![name.to_string()],
        }
    }

    pub fn role(mut self, role: FieldRole) -> Self {
        self.role = role;
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn docx_keys(mut self, keys: &[&str]) -> Self {
        self.docx_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn excel_keys(mut self, keys: &[&str]) -> Self {
        self.excel_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }
}

impl CompareConfig {
    pub fn new(name: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.to_string(),
            tolerance: DEFAULT_TOLERANCE,
            units: default_units(),
            fields,
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, CompareError> {
        let config: CompareConfig =
            toml::from_str(input).map_err(|e| CompareError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, CompareError> {
        toml::to_string_pretty(self).map_err(|e| CompareError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), CompareError> {
        validate_tolerance(self.tolerance)?;
        self.validate_fields()
    }

    /// Everything `validate` checks except the schema's own tolerance, for
    /// callers that supply the tolerance separately.
    pub fn validate_fields(&self) -> Result<(), CompareError> {
        if self.fields.is_empty() {
            return Err(CompareError::EmptySchema);
        }

        for unit in &self.units {
            if unit.trim().is_empty() {
                return Err(CompareError::ConfigValidation(
                    "unit whitelist contains a blank entry".into(),
                ));
            }
        }

        let mut seen = HashSet::new();
        let mut total_field: Option<&str> = None;

        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(CompareError::ConfigValidation(
                    "field with blank name".into(),
                ));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(CompareError::DuplicateField(field.name.clone()));
            }

            for (side, keys) in [("docx", &field.docx_keys), ("excel", &field.excel_keys)] {
                if keys.is_empty() {
                    return Err(CompareError::MissingKeys { field: field.name.clone(), side });
                }
                if keys.iter().any(|k| k.trim().is_empty()) {
                    return Err(CompareError::ConfigValidation(format!(
                        "field '{}': blank {side} lookup key",
                        field.name
                    )));
                }
            }

            if field.role != FieldRole::Plain && !field.kind.is_numeric() {
                return Err(CompareError::ConfigValidation(format!(
                    "field '{}': role {:?} requires a numeric kind, got {}",
                    field.name, field.role, field.kind
                )));
            }

            if field.role == FieldRole::Total {
                if let Some(existing) = total_field {
                    return Err(CompareError::ConfigValidation(format!(
                        "fields '{existing}' and '{}' are both declared as total",
                        field.name
                    )));
                }
                total_field = Some(field.name.as_str());
            }
        }

        Ok(())
    }

    pub fn total_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.role == FieldRole::Total)
    }

    pub fn line_items(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.role == FieldRole::LineItem)
    }
}

pub fn validate_tolerance(tolerance: f64) -> Result<(), CompareError> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(CompareError::InvalidTolerance(tolerance));
    }
    Ok(())
}
