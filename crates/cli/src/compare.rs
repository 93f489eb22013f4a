//! `itacv compare` and `itacv schema`: schema-driven report/template comparison.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use tracing::debug;

use itacv_compare::config::validate_tolerance;
use itacv_compare::model::{
    ComparisonOutcome, ComparisonSummary, CrossCheck, FieldComparisonRecord, OutcomeCounts,
    RawValue, SideTotals, TotalBasis,
};
use itacv_compare::{schema, CompareConfig, RawExtraction};

use crate::exit_codes::{
    compare_exit_code, EXIT_COMPARE_MISMATCH, EXIT_COMPARE_MISSING, EXIT_ERROR,
    EXIT_INPUT_INVALID, EXIT_SCHEMA_INVALID, EXIT_USAGE,
};
use crate::CliError;

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Validate a comparison schema without running
    #[command(after_help = "\
Examples:
  itacv schema validate itac.toml")]
    Validate {
        /// Path to the schema .toml file
        schema: PathBuf,
    },

    /// Print the built-in ITAC assessment schema
    #[command(after_help = "\
Examples:
  itacv schema show > my-schema.toml
  itacv schema show --json | jq '.fields[].name'")]
    Show {
        /// Output JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

pub struct CompareArgs {
    pub docx: PathBuf,
    pub excel: PathBuf,
    pub schema: Option<PathBuf>,
    pub tolerance: Option<f64>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub strict: bool,
}

fn compare_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

// ============================================================================
// compare
// ============================================================================

pub fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    let config = load_schema(args.schema.as_deref())?;

    let tolerance = args.tolerance.unwrap_or(config.tolerance);
    validate_tolerance(tolerance).map_err(|e| {
        compare_err(EXIT_USAGE, e.to_string())
            .with_hint("tolerance is relative: 0.01 means 1% of the larger value")
    })?;

    let docx = load_extraction(&args.docx)?;
    let excel = load_extraction(&args.excel)?;

    let summary = itacv_compare::compare_reports(&docx, &excel, &config, tolerance)
        .map_err(|e| compare_err(compare_exit_code(&e), e.to_string()))?;

    // Output
    let json_str = serde_json::to_string_pretty(&summary)
        .map_err(|e| compare_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| compare_err(EXIT_ERROR, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    print_summary(&summary);

    let c = &summary.overall.counts;
    if c.mismatches > 0 || c.type_mismatches > 0 {
        return Err(compare_err(EXIT_COMPARE_MISMATCH, "mismatches found"));
    }
    if !summary.overall.totals_reconcile {
        return Err(compare_err(EXIT_COMPARE_MISMATCH, "energy cost totals do not reconcile"));
    }
    if args.strict && c.missing > 0 {
        return Err(compare_err(EXIT_COMPARE_MISSING, "missing fields found (--strict)"));
    }

    Ok(())
}

/// Schema file when given, built-in schema otherwise.
fn load_schema(path: Option<&Path>) -> Result<CompareConfig, CliError> {
    let Some(path) = path else {
        debug!("using built-in schema");
        return schema::default_config()
            .map_err(|e| compare_err(EXIT_SCHEMA_INVALID, format!("built-in schema: {e}")));
    };

    let schema_str = std::fs::read_to_string(path).map_err(|e| {
        compare_err(EXIT_USAGE, format!("cannot read schema {}: {e}", path.display()))
    })?;
    let config = CompareConfig::from_toml(&schema_str)
        .map_err(|e| compare_err(EXIT_SCHEMA_INVALID, e.to_string()))?;
    debug!(path = %path.display(), fields = config.fields.len(), "loaded schema");
    Ok(config)
}

fn load_extraction(path: &Path) -> Result<RawExtraction, CliError> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        compare_err(EXIT_INPUT_INVALID, format!("cannot read {}: {e}", path.display()))
    })?;
    RawExtraction::from_json(&data).map_err(|e| {
        compare_err(EXIT_INPUT_INVALID, format!("{}: {e}", path.display()))
            .with_hint("expected an object of sections, each mapping keys to strings, numbers or null")
    })
}

// ============================================================================
// Human summary (stderr)
// ============================================================================

fn print_summary(summary: &ComparisonSummary) {
    eprintln!(
        "schema '{}' at {}% tolerance",
        summary.meta.schema_name,
        summary.meta.tolerance * 100.0,
    );

    for (section, report) in &summary.sections {
        eprintln!("{section}: {}", counts_line(&report.counts));
        for record in report.fields.iter().filter(|r| r.outcome != ComparisonOutcome::Match) {
            eprintln!("  {}", record_line(record));
        }
    }

    eprintln!("overall: {}", counts_line(&summary.overall.counts));

    if let Some(ref check) = summary.overall.cross_check {
        print_cross_check(check);
    }

    print_unclaimed("docx", &summary.unclaimed.docx);
    print_unclaimed("excel", &summary.unclaimed.excel);
}

fn print_unclaimed(side: &str, sections: &BTreeMap<String, Vec<String>>) {
    for (section, keys) in sections {
        eprintln!("unclaimed {side} keys in {section}: {}", keys.join(", "));
    }
}

fn counts_line(c: &OutcomeCounts) -> String {
    format!(
        "{} fields, {} matched, {} mismatched, {} type mismatches, {} missing ({:.1}% match rate)",
        c.total, c.matches, c.mismatches, c.type_mismatches, c.missing, c.match_rate_percent,
    )
}

fn record_line(r: &FieldComparisonRecord) -> String {
    let mut line = format!(
        "{}: {} (docx {}, excel {})",
        r.field,
        r.outcome,
        show_raw(&r.docx.raw),
        show_raw(&r.excel.raw),
    );
    if let Some(d) = r.delta {
        line.push_str(&format!(", delta {} ({:.2}%)", show_number(d.absolute), d.relative * 100.0));
    }
    if r.unit_mismatch {
        line.push_str(", units differ");
    }
    line
}

fn print_cross_check(check: &CrossCheck) {
    eprintln!("totals: docx {}", side_line(&check.docx));
    eprintln!("totals: excel {}", side_line(&check.excel));
    if let Some(ref cross) = check.cross_side {
        eprintln!(
            "totals: docx {} ({}) vs excel {} ({}): {}",
            show_number(cross.docx_total),
            basis_name(cross.docx_basis),
            show_number(cross.excel_total),
            basis_name(cross.excel_basis),
            if cross.within_tolerance { "within tolerance" } else { "outside tolerance" },
        );
    }
}

fn side_line(totals: &SideTotals) -> String {
    let sum = format!(
        "{} line item(s) sum to {}",
        totals.line_items_counted,
        show_number(totals.line_item_sum),
    );
    match (totals.declared_total, totals.reconciles) {
        (Some(declared), Some(true)) => format!("{sum}, declared {}: reconciles", show_number(declared)),
        (Some(declared), Some(false)) => {
            format!("{sum}, declared {}: does not reconcile", show_number(declared))
        }
        (Some(declared), None) => format!("declared {}, no line items", show_number(declared)),
        (None, _) => format!("{sum}, no declared total"),
    }
}

fn basis_name(basis: TotalBasis) -> &'static str {
    match basis {
        TotalBasis::Declared => "declared",
        TotalBasis::Computed => "computed",
    }
}

fn show_raw(raw: &RawValue) -> String {
    match raw {
        RawValue::Number(n) => show_number(*n),
        RawValue::Text(s) => format!("{s:?}"),
        RawValue::Absent => "-".to_string(),
    }
}

fn show_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ============================================================================
// schema
// ============================================================================

pub fn cmd_schema(cmd: SchemaCommands) -> Result<(), CliError> {
    match cmd {
        SchemaCommands::Validate { schema } => cmd_schema_validate(schema),
        SchemaCommands::Show { json } => cmd_schema_show(json),
    }
}

fn cmd_schema_validate(path: PathBuf) -> Result<(), CliError> {
    let config = load_schema(Some(&path))?;
    let line_items = config.line_items().count();
    eprintln!(
        "valid: schema '{}' with {} field(s), {} line item(s), total: {}, tolerance {}",
        config.name,
        config.fields.len(),
        line_items,
        config.total_field().map_or("none", |f| f.name.as_str()),
        config.tolerance,
    );
    Ok(())
}

fn cmd_schema_show(json: bool) -> Result<(), CliError> {
    if !json {
        print!("{}", schema::ITAC_SCHEMA_TOML);
        return Ok(());
    }

    let config = schema::default_config()
        .map_err(|e| compare_err(EXIT_SCHEMA_INVALID, format!("built-in schema: {e}")))?;
    let json_str = serde_json::to_string_pretty(&config)
        .map_err(|e| compare_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    println!("{json_str}");
    Ok(())
}
