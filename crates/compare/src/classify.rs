use crate::model::{ComparisonOutcome, Delta, MissingReason, NormalizedValue};

/// Scale floor so that zero against zero compares as equal.
pub const SCALE_FLOOR: f64 = 1e-9;

/// Relative tolerance check, inclusive at the boundary.
///
/// `|a - b| <= tolerance * max(|a|, |b|, SCALE_FLOOR)`, with a few ULPs of
/// slack so values that are exactly on the boundary in decimal (100 vs 101
/// at 1%) don't flip on float representation.
pub fn within_tolerance(a: f64, b: f64, tolerance: f64) -> bool {
    let diff = (a - b).abs();
    let scale = scale(a, b);
    let eps = f64::EPSILON * 16.0 * scale;
    diff <= tolerance * scale + eps
}

/// Difference of `a` relative to `b` using the same scale as the tolerance check.
pub fn delta(a: f64, b: f64) -> Delta {
    let absolute = a - b;
    Delta { absolute, relative: absolute.abs() / scale(a, b) }
}

fn scale(a: f64, b: f64) -> f64 {
    a.abs().max(b.abs()).max(SCALE_FLOOR)
}

/// Classify a docx/excel pair. A delta is attached to numeric mismatches only.
pub fn classify(
    docx: &NormalizedValue,
    excel: &NormalizedValue,
    tolerance: f64,
) -> (ComparisonOutcome, Option<Delta>) {
    use NormalizedValue::{Missing, Number, Text};

    match (docx, excel) {
        (Missing(MissingReason::Absent), Missing(MissingReason::Absent)) => {
            (ComparisonOutcome::MissingInBoth, None)
        }
        (Missing(MissingReason::Absent), _) => (ComparisonOutcome::MissingInDocx, None),
        (_, Missing(MissingReason::Absent)) => (ComparisonOutcome::MissingInExcel, None),
        (Missing(MissingReason::Unparseable), _) | (_, Missing(MissingReason::Unparseable)) => {
            (ComparisonOutcome::TypeMismatch, None)
        }
        (Number(a), Number(b)) => {
            if within_tolerance(*a, *b, tolerance) {
                (ComparisonOutcome::Match, None)
            } else {
                (ComparisonOutcome::Mismatch, Some(delta(*a, *b)))
            }
        }
        (Text(a), Text(b)) => {
            if a == b {
                (ComparisonOutcome::Match, None)
            } else {
                (ComparisonOutcome::Mismatch, None)
            }
        }
        (Number(_), Text(_)) | (Text(_), Number(_)) => (ComparisonOutcome::TypeMismatch, None),
    }
}
