//! Value normalization: the single place where raw extractor output is
//! coerced into something comparable.
//!
//! Never fails. Input that cannot be read as the declared kind becomes
//! `Missing(Unparseable)`, which the classifier reports as a type mismatch.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{MissingReason, Normalized, NormalizedValue, RawValue, ValueKind};

static NUMBER_RE: OnceLock<Regex> = OnceLock::new();

/// Leading sign, optional currency symbol, a number with well-formed
/// thousands grouping, optional exponent, then whatever follows.
fn number_re() -> &'static Regex {
    NUMBER_RE.get_or_init(|| {
        Regex::new(
            r"(?s)^(?P<sign>[-+])?\s*[$€£¥]?\s*(?P<sign2>[-+])?(?P<num>(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?|\.\d+)(?P<exp>[eE][-+]?\d+)?(?P<rest>.*)$",
        )
        .unwrap()
    })
}

const SCALE_WORDS: &[(&str, f64)] = &[
    ("thousand", 1_000.0),
    ("million", 1_000_000.0),
    ("billion", 1_000_000_000.0),
];

/// Case-sensitive, whole token only: `M` scales, `MW` and `MMBtu` do not.
const SCALE_ABBREVIATIONS: &[(&str, f64)] = &[
    ("K", 1_000.0),
    ("M", 1_000_000.0),
    ("MM", 1_000_000.0),
    ("B", 1_000_000_000.0),
];

/// A number read out of free text, plus the unit-ish text that followed it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNumber {
    pub value: f64,
    pub suffix: String,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Normalize one raw value according to its declared kind.
///
/// `units` is the whitelist consulted for `UnitTaggedNumeric` fields.
pub fn normalize(raw: &RawValue, kind: ValueKind, units: &[String]) -> Normalized {
    if raw.is_absent() {
        return Normalized::absent();
    }

    match kind {
        ValueKind::Text => match raw {
            RawValue::Text(s) => text(normalize_text(s)),
            RawValue::Number(n) if n.is_finite() => text(normalize_text(&number_to_text(*n))),
            _ => Normalized::unparseable(),
        },
        ValueKind::Numeric | ValueKind::Currency => match raw {
            RawValue::Number(n) => number(*n, None),
            RawValue::Text(s) => match parse_number(s) {
                Some(parsed) => number(parsed.value, None),
                None => Normalized::unparseable(),
            },
            RawValue::Absent => Normalized::absent(),
        },
        ValueKind::UnitTaggedNumeric => match raw {
            RawValue::Number(n) => number(*n, None),
            RawValue::Text(s) => match parse_number(s) {
                Some(parsed) => {
                    let unit = match_unit(&parsed.suffix, units);
                    number(parsed.value, unit)
                }
                None => Normalized::unparseable(),
            },
            RawValue::Absent => Normalized::absent(),
        },
    }
}

fn number(n: f64, unit: Option<String>) -> Normalized {
    if !n.is_finite() {
        return Normalized::unparseable();
    }
    Normalized { value: NormalizedValue::Number(n), unit }
}

fn text(normalized: Option<String>) -> Normalized {
    match normalized {
        Some(s) => Normalized { value: NormalizedValue::Text(s), unit: None },
        None => Normalized { value: NormalizedValue::Missing(MissingReason::Absent), unit: None },
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Trim, collapse internal whitespace, lowercase. `None` when nothing is left.
pub fn normalize_text(s: &str) -> Option<String> {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.to_lowercase())
}

/// Integral values render without a fractional part (`3411.0` → `"3411"`).
fn number_to_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Parse a number out of an extracted cell:
/// - Strip `$ € £ ¥`, thousands separators, whitespace
/// - `(1,234.50)` → `-1234.5` when nothing follows the number
/// - `(2,217 MMBtu/yr)` → `2217` with suffix `MMBtu/yr` (grouping, not a negative)
/// - Trailing `thousand` / `million` / `billion` or `K` / `M` / `MM` / `B` scales the value
/// - Any other trailing text must start like a unit label or be a parenthesized note
pub fn parse_number(s: &str) -> Option<ParsedNumber> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.len() >= 2 && trimmed.starts_with('(') && trimmed.ends_with(')') {
        let inner = &trimmed[1..trimmed.len() - 1];
        let parsed = parse_unwrapped(inner)?;
        if parsed.suffix.is_empty() {
            return Some(ParsedNumber { value: -parsed.value, suffix: parsed.suffix });
        }
        return Some(parsed);
    }

    parse_unwrapped(trimmed)
}

fn parse_unwrapped(s: &str) -> Option<ParsedNumber> {
    let caps = number_re().captures(s.trim())?;

    let negative = match (caps.name("sign"), caps.name("sign2")) {
        (Some(_), Some(_)) => return None,
        (Some(m), None) | (None, Some(m)) => m.as_str() == "-",
        (None, None) => false,
    };

    let mut digits: String = caps["num"].chars().filter(|c| *c != ',').collect();
    if let Some(exp) = caps.name("exp") {
        digits.push_str(exp.as_str());
    }
    let mut value: f64 = digits.parse().ok()?;

    let (scale, suffix) = split_scale(caps.name("rest").map(|m| m.as_str()).unwrap_or(""));
    if !is_trailing_text(suffix) {
        return None;
    }
    value *= scale;
    if negative {
        value = -value;
    }
    if !value.is_finite() {
        return None;
    }

    Some(ParsedNumber { value, suffix: suffix.to_string() })
}

fn split_scale(rest: &str) -> (f64, &str) {
    let rest = rest.trim();
    let token_end = rest.find(|c: char| !c.is_alphanumeric()).unwrap_or(rest.len());
    let token = &rest[..token_end];

    let scale = SCALE_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == token)
        .or_else(|| SCALE_WORDS.iter().find(|(word, _)| word.eq_ignore_ascii_case(token)))
        .map(|(_, scale)| *scale);

    match scale {
        Some(scale) => (scale, rest[token_end..].trim()),
        None => (1.0, rest),
    }
}

/// Unit labels (`tons CO2e`, `ft2`, `kWh/yr (2023)`, `45%`) and parenthesized
/// notes. A second number or a range (`10 - 20`) is not.
fn is_trailing_text(suffix: &str) -> bool {
    match suffix.chars().next() {
        None => true,
        Some('(') => suffix.ends_with(')'),
        Some(c) => c.is_alphabetic() || matches!(c, '/' | '%' | '²' | '°'),
    }
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// First token of the suffix, when it starts with a letter, matched
/// case-insensitively against the whitelist. Returns the whitelist spelling.
pub fn match_unit(suffix: &str, units: &[String]) -> Option<String> {
    let token = suffix
        .split(|c: char| c.is_whitespace() || matches!(c, '/' | '(' | ')'))
        .map(|t| t.trim_matches('.'))
        .find(|t| !t.is_empty())
        .filter(|t| t.chars().next().is_some_and(char::is_alphabetic))?;
    units
        .iter()
        .find(|u| u.eq_ignore_ascii_case(token))
        .cloned()
}
