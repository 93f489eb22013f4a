use std::collections::BTreeMap;

use crate::model::{ComparisonOutcome, FieldComparisonRecord, OutcomeCounts, Section, SectionReport};

/// Count outcomes over a set of records.
pub fn compute_counts<'a>(records: impl IntoIterator<Item = &'a FieldComparisonRecord>) -> OutcomeCounts {
    let mut counts = OutcomeCounts::default();

    for r in records {
        counts.total += 1;
        match r.outcome {
            ComparisonOutcome::Match => counts.matches += 1,
            ComparisonOutcome::Mismatch => counts.mismatches += 1,
            ComparisonOutcome::MissingInDocx => counts.missing_in_docx += 1,
            ComparisonOutcome::MissingInExcel => counts.missing_in_excel += 1,
            ComparisonOutcome::MissingInBoth => counts.missing_in_both += 1,
            ComparisonOutcome::TypeMismatch => counts.type_mismatches += 1,
        }
    }

    counts.missing = counts.missing_in_docx + counts.missing_in_excel + counts.missing_in_both;
    let compared = counts.matches + counts.mismatches;
    counts.match_rate_percent = if compared > 0 {
        counts.matches as f64 / compared as f64 * 100.0
    } else {
        0.0
    };

    counts
}

/// Group records by section, keeping declaration order within a section.
/// Sections with no declared fields are left out.
pub fn group_by_section(records: Vec<FieldComparisonRecord>) -> BTreeMap<Section, SectionReport> {
    let mut grouped: BTreeMap<Section, Vec<FieldComparisonRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.section).or_default().push(record);
    }

    grouped
        .into_iter()
        .map(|(section, fields)| {
            let counts = compute_counts(&fields);
            (section, SectionReport { fields, counts })
        })
        .collect()
}
