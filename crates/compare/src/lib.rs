//! `itacv-compare`: field-by-field comparison of assessment report extractions.
//!
//! Pure engine crate: receives two already-extracted documents (the narrative
//! report and the spreadsheet template) plus a field schema, returns a
//! classified comparison. No CLI or IO dependencies.

pub mod classify;
pub mod config;
pub mod crosscheck;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod schema;
pub mod summary;

pub use config::{CompareConfig, FieldSpec, DEFAULT_TOLERANCE};
pub use engine::{compare_reports, run};
pub use error::CompareError;
pub use model::{
    CompareInput, ComparisonOutcome, ComparisonSummary, FieldComparisonRecord, NormalizedValue,
    RawExtraction, RawValue, Section, ValueKind,
};
