//! Energy-cost cross-check: line items against the declared total, per side
//! and across sides. Results are reported, never fatal.

use crate::classify::{delta, within_tolerance};
use crate::config::CompareConfig;
use crate::model::{
    CrossCheck, FieldComparisonRecord, NormalizedValue, SideTotals, TotalBasis,
    TotalsComparison,
};

#[derive(Clone, Copy)]
enum Side {
    Docx,
    Excel,
}

fn side_value(record: &FieldComparisonRecord, side: Side) -> &NormalizedValue {
    match side {
        Side::Docx => &record.docx.normalized,
        Side::Excel => &record.excel.normalized,
    }
}

/// Run the cross-check over finished records. `None` when the schema has
/// neither line items nor a total.
pub fn cross_check(
    config: &CompareConfig,
    records: &[FieldComparisonRecord],
    tolerance: f64,
) -> Option<CrossCheck> {
    if config.total_field().is_none() && config.line_items().next().is_none() {
        return None;
    }

    let line_items: Vec<&FieldComparisonRecord> = config
        .line_items()
        .filter_map(|field| records.iter().find(|r| r.field == field.name))
        .collect();
    let total = config
        .total_field()
        .and_then(|field| records.iter().find(|r| r.field == field.name));

    let docx = side_totals(&line_items, total, Side::Docx, tolerance);
    let excel = side_totals(&line_items, total, Side::Excel, tolerance);
    let cross_side = compare_sides(&docx, &excel, tolerance);

    Some(CrossCheck { docx, excel, cross_side })
}

fn side_totals(
    line_items: &[&FieldComparisonRecord],
    total: Option<&FieldComparisonRecord>,
    side: Side,
    tolerance: f64,
) -> SideTotals {
    let mut line_item_sum = 0.0;
    let mut line_items_counted = 0;
    for record in line_items {
        if let Some(n) = side_value(record, side).as_number() {
            line_item_sum += n;
            line_items_counted += 1;
        }
    }

    let declared_total = total.and_then(|r| side_value(r, side).as_number());

    let (reconciles, delta) = match declared_total {
        Some(declared) if line_items_counted > 0 => (
            Some(within_tolerance(line_item_sum, declared, tolerance)),
            Some(delta(line_item_sum, declared)),
        ),
        _ => (None, None),
    };

    SideTotals {
        line_item_sum,
        line_items_counted,
        declared_total,
        reconciles,
        delta,
    }
}

/// Declared totals where available, computed sums otherwise.
fn compare_sides(docx: &SideTotals, excel: &SideTotals, tolerance: f64) -> Option<TotalsComparison> {
    let (docx_total, docx_basis) = basis(docx)?;
    let (excel_total, excel_basis) = basis(excel)?;
    Some(TotalsComparison {
        docx_total,
        excel_total,
        docx_basis,
        excel_basis,
        within_tolerance: within_tolerance(docx_total, excel_total, tolerance),
        delta: delta(docx_total, excel_total),
    })
}

fn basis(totals: &SideTotals) -> Option<(f64, TotalBasis)> {
    match totals.declared_total {
        Some(t) => Some((t, TotalBasis::Declared)),
        None if totals.line_items_counted > 0 => Some((totals.line_item_sum, TotalBasis::Computed)),
        None => None,
    }
}

impl CrossCheck {
    /// False only when a check that could be computed failed.
    pub fn reconciles(&self) -> bool {
        self.docx.reconciles != Some(false)
            && self.excel.reconciles != Some(false)
            && self.cross_side.as_ref().map_or(true, |c| c.within_tolerance)
    }
}
