use log::{debug, info, warn};

use crate::classify::classify;
use crate::config::{validate_tolerance, CompareConfig, FieldSpec};
use crate::crosscheck::cross_check;
use crate::error::CompareError;
use crate::matcher::{find_unclaimed, resolve, Lookup};
use crate::model::{
    CompareInput, CompareMeta, ComparisonOutcome, ComparisonSummary, FieldComparisonRecord,
    OverallReport, RawExtraction, SideValue,
};
use crate::normalize::normalize;
use crate::summary::{compute_counts, group_by_section};

/// Run a comparison with the tolerance declared in the config.
pub fn run(config: &CompareConfig, input: &CompareInput) -> Result<ComparisonSummary, CompareError> {
    compare_reports(&input.docx, &input.excel, config, config.tolerance)
}

/// Compare two extractions field by field.
///
/// The schema's fields and the given tolerance are validated before either
/// extraction is read; those are the only failures. `config.tolerance` is not
/// consulted. Bad values stay inside their own record.
pub fn compare_reports(
    docx: &RawExtraction,
    excel: &RawExtraction,
    config: &CompareConfig,
    tolerance: f64,
) -> Result<ComparisonSummary, CompareError> {
    config.validate_fields()?;
    validate_tolerance(tolerance)?;

    let records: Vec<FieldComparisonRecord> = config
        .fields
        .iter()
        .map(|field| compare_field(field, docx, excel, &config.units, tolerance))
        .collect();

    let cross_check = cross_check(config, &records, tolerance);
    let totals_reconcile = cross_check.as_ref().map_or(true, |c| c.reconciles());
    if !totals_reconcile {
        warn!("schema '{}': energy cost totals do not reconcile", config.name);
    }

    let unclaimed = find_unclaimed(&config.fields, docx, excel);
    if !unclaimed.is_empty() {
        info!(
            "schema '{}': {} extracted keys not claimed by any field",
            config.name,
            unclaimed.count()
        );
    }

    let counts = compute_counts(&records);
    info!(
        "schema '{}': {} fields, {} matched, {} mismatched, {} missing, {} type mismatches",
        config.name,
        counts.total,
        counts.matches,
        counts.mismatches,
        counts.missing,
        counts.type_mismatches,
    );

    Ok(ComparisonSummary {
        meta: CompareMeta {
            schema_name: config.name.clone(),
            tolerance,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        sections: group_by_section(records),
        overall: OverallReport { counts, totals_reconcile, cross_check },
        unclaimed,
    })
}

fn compare_field(
    field: &FieldSpec,
    docx: &RawExtraction,
    excel: &RawExtraction,
    units: &[String],
    tolerance: f64,
) -> FieldComparisonRecord {
    let resolved = resolve(field, docx, excel);
    let docx_side = side_value(resolved.docx, field, units);
    let excel_side = side_value(resolved.excel, field, units);

    let (outcome, delta) = classify(&docx_side.normalized, &excel_side.normalized, tolerance);
    let unit_mismatch = match (&docx_side.unit, &excel_side.unit) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    };

    if outcome != ComparisonOutcome::Match {
        debug!(
            "{}/{}: {} (docx {:?}, excel {:?})",
            field.section, field.name, outcome, docx_side.raw, excel_side.raw
        );
    }

    FieldComparisonRecord {
        field: field.name.clone(),
        label: field.label.clone(),
        section: field.section,
        kind: field.kind,
        docx: docx_side,
        excel: excel_side,
        outcome,
        delta,
        unit_mismatch,
    }
}

fn side_value(lookup: Lookup, field: &FieldSpec, units: &[String]) -> SideValue {
    let normalized = normalize(&lookup.raw, field.kind, units);
    SideValue {
        key: lookup.key,
        raw: lookup.raw,
        normalized: normalized.value,
        unit: normalized.unit,
    }
}
