use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single value as produced by an extractor, before any coercion.
///
/// JSON `null` is `Absent`, numbers are `Number`, strings are `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Absent,
}

impl RawValue {
    /// Absent, or text that is empty after trimming.
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }
}

impl Default for RawValue {
    fn default() -> Self {
        Self::Absent
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Absent)
    }
}

/// Key/value data extracted from one source document, grouped by section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawExtraction {
    sections: BTreeMap<String, BTreeMap<String, RawValue>>,
}

impl RawExtraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self, crate::CompareError> {
        serde_json::from_str(input).map_err(|e| crate::CompareError::InputParse(e.to_string()))
    }

    pub fn insert(&mut self, section: &str, key: &str, value: impl Into<RawValue>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, section: &str, key: &str, value: impl Into<RawValue>) -> Self {
        self.insert(section, key, value);
        self
    }

    pub fn section(&self, name: &str) -> Option<&BTreeMap<String, RawValue>> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(|s| s.as_str())
    }
}

/// The two extractions compared in one run.
#[derive(Debug, Clone, Default)]
pub struct CompareInput {
    pub docx: RawExtraction,
    pub excel: RawExtraction,
}

// ---------------------------------------------------------------------------
// Schema vocabulary
// ---------------------------------------------------------------------------

/// Report sections. Declaration order is output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    GeneralInfo,
    EnergyUsage,
    CarbonFootprint,
    Recommendations,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::GeneralInfo,
        Section::EnergyUsage,
        Section::CarbonFootprint,
        Section::Recommendations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneralInfo => "general_info",
            Self::EnergyUsage => "energy_usage",
            Self::CarbonFootprint => "carbon_footprint",
            Self::Recommendations => "recommendations",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Numeric,
    Text,
    Currency,
    UnitTaggedNumeric,
}

impl ValueKind {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Text)
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Text => write!(f, "text"),
            Self::Currency => write!(f, "currency"),
            Self::UnitTaggedNumeric => write!(f, "unit_tagged_numeric"),
        }
    }
}

/// Part a field plays in the energy-cost cross-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    #[default]
    Plain,
    LineItem,
    Total,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    Absent,
    Unparseable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NormalizedValue {
    Number(f64),
    Text(String),
    Missing(MissingReason),
}

impl NormalizedValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Normalizer output: the comparable value plus any recognized unit label.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub value: NormalizedValue,
    pub unit: Option<String>,
}

impl Normalized {
    pub fn absent() -> Self {
        Self { value: NormalizedValue::Missing(MissingReason::Absent), unit: None }
    }

    pub fn unparseable() -> Self {
        Self { value: NormalizedValue::Missing(MissingReason::Unparseable), unit: None }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Match,
    Mismatch,
    MissingInDocx,
    MissingInExcel,
    MissingInBoth,
    TypeMismatch,
}

impl std::fmt::Display for ComparisonOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Mismatch => write!(f, "mismatch"),
            Self::MissingInDocx => write!(f, "missing_in_docx"),
            Self::MissingInExcel => write!(f, "missing_in_excel"),
            Self::MissingInBoth => write!(f, "missing_in_both"),
            Self::TypeMismatch => write!(f, "type_mismatch"),
        }
    }
}

/// Numeric difference between the two sides. `absolute` is docx minus excel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Delta {
    pub absolute: f64,
    pub relative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideValue {
    /// Alias that supplied the value, if any did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub raw: RawValue,
    pub normalized: NormalizedValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldComparisonRecord {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub section: Section,
    pub kind: ValueKind,
    pub docx: SideValue,
    pub excel: SideValue,
    pub outcome: ComparisonOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
    /// Both sides carry a unit label and the labels differ. Informational only.
    pub unit_mismatch: bool,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutcomeCounts {
    pub total: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub missing_in_docx: usize,
    pub missing_in_excel: usize,
    pub missing_in_both: usize,
    pub type_mismatches: usize,
    pub missing: usize,
    pub match_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub fields: Vec<FieldComparisonRecord>,
    pub counts: OutcomeCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalBasis {
    Declared,
    Computed,
}

/// One side's line items checked against its own declared total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideTotals {
    pub line_item_sum: f64,
    pub line_items_counted: usize,
    pub declared_total: Option<f64>,
    /// `None` when there is nothing to check (no declared total or no line items).
    pub reconciles: Option<bool>,
    /// Computed sum minus declared total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsComparison {
    pub docx_total: f64,
    pub excel_total: f64,
    pub docx_basis: TotalBasis,
    pub excel_basis: TotalBasis,
    pub within_tolerance: bool,
    pub delta: Delta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossCheck {
    pub docx: SideTotals,
    pub excel: SideTotals,
    pub cross_side: Option<TotalsComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallReport {
    pub counts: OutcomeCounts,
    pub totals_reconcile: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_check: Option<CrossCheck>,
}

/// Extraction keys that no field lists as an alias, per side and section.
/// Reported so unchecked rows are visible; never compared.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnclaimedKeys {
    pub docx: BTreeMap<String, Vec<String>>,
    pub excel: BTreeMap<String, Vec<String>>,
}

impl UnclaimedKeys {
    pub fn is_empty(&self) -> bool {
        self.docx.is_empty() && self.excel.is_empty()
    }

    pub fn count(&self) -> usize {
        self.docx.values().chain(self.excel.values()).map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareMeta {
    pub schema_name: String,
    pub tolerance: f64,
    pub engine_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub meta: CompareMeta,
    pub sections: BTreeMap<Section, SectionReport>,
    pub overall: OverallReport,
    pub unclaimed: UnclaimedKeys,
}

impl ComparisonSummary {
    /// All records in section order, then declaration order.
    pub fn records(&self) -> impl Iterator<Item = &FieldComparisonRecord> {
        self.sections.values().flat_map(|s| s.fields.iter())
    }

    pub fn record(&self, field: &str) -> Option<&FieldComparisonRecord> {
        self.records().find(|r| r.field == field)
    }
}
