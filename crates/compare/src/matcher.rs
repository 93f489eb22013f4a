use std::collections::{BTreeMap, HashSet};

use crate::config::FieldSpec;
use crate::model::{RawExtraction, RawValue, UnclaimedKeys};

/// The value found on one side, and which alias supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub key: Option<String>,
    pub raw: RawValue,
}

impl Lookup {
    fn absent() -> Self {
        Self { key: None, raw: RawValue::Absent }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub docx: Lookup,
    pub excel: Lookup,
}

/// Locate one logical field in both extractions.
pub fn resolve(field: &FieldSpec, docx: &RawExtraction, excel: &RawExtraction) -> Resolved {
    let section = field.section.as_str();
    Resolved {
        docx: lookup(docx, section, &field.docx_keys),
        excel: lookup(excel, section, &field.excel_keys),
    }
}

/// Try each alias in order; the first one holding a present value wins.
/// Exact key equality only. A missing section is simply absent.
pub fn lookup(extraction: &RawExtraction, section: &str, keys: &[String]) -> Lookup {
    let Some(values) = extraction.section(section) else {
        return Lookup::absent();
    };

    keys.iter()
        .find_map(|key| {
            values
                .get(key)
                .filter(|v| !v.is_absent())
                .map(|v| Lookup { key: Some(key.clone()), raw: v.clone() })
        })
        .unwrap_or_else(Lookup::absent)
}

/// Present keys on each side that no field lists among that side's aliases.
/// Sections the schema does not know are reported whole.
pub fn find_unclaimed(fields: &[FieldSpec], docx: &RawExtraction, excel: &RawExtraction) -> UnclaimedKeys {
    UnclaimedKeys {
        docx: unclaimed_in(docx, fields, docx_keys),
        excel: unclaimed_in(excel, fields, excel_keys),
    }
}

fn docx_keys(field: &FieldSpec) -> &[String] {
    &field.docx_keys
}

fn excel_keys(field: &FieldSpec) -> &[String] {
    &field.excel_keys
}

fn unclaimed_in(
    extraction: &RawExtraction,
    fields: &[FieldSpec],
    keys_of: fn(&FieldSpec) -> &[String],
) -> BTreeMap<String, Vec<String>> {
    let mut unclaimed = BTreeMap::new();

    for section in extraction.section_names() {
        let Some(values) = extraction.section(section) else {
            continue;
        };
        let claimed: HashSet<&str> = fields
            .iter()
            .filter(|f| f.section.as_str() == section)
            .flat_map(|f| keys_of(f).iter().map(String::as_str))
            .collect();

        let keys: Vec<String> = values
            .iter()
            .filter(|(key, value)| !value.is_absent() && !claimed.contains(key.as_str()))
            .map(|(key, _)| key.clone())
            .collect();
        if !keys.is_empty() {
            unclaimed.insert(section.to_string(), keys);
        }
    }

    unclaimed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Section, ValueKind};

    fn sic_field() -> FieldSpec {
        FieldSpec::new("sic_no", Section::GeneralInfo, ValueKind::Numeric)
            .docx_keys(&["sic_no", "SIC. No."])
            .excel_keys(&["SIC No.", "SIC No", "sic_no"])
    }

    #[test]
    fn first_present_alias_wins() {
        let docx = RawExtraction::new().with("general_info", "sic_no", "3411");
        let excel = RawExtraction::new()
            .with("general_info", "SIC No", 3411.0)
            .with("general_info", "sic_no", 9999.0);
        let r = resolve(&sic_field(), &docx, &excel);
        assert_eq!(r.docx.key.as_deref(), Some("sic_no"));
        assert_eq!(r.docx.raw, RawValue::Text("3411".into()));
        assert_eq!(r.excel.key.as_deref(), Some("SIC No"));
        assert_eq!(r.excel.raw, RawValue::Number(3411.0));
    }

    #[test]
    fn null_and_blank_aliases_are_skipped() {
        let excel = RawExtraction::new()
            .with("general_info", "SIC No.", RawValue::Absent)
            .with("general_info", "SIC No", "  ")
            .with("general_info", "sic_no", 3411.0);
        let r = resolve(&sic_field(), &RawExtraction::new(), &excel);
        assert_eq!(r.excel.key.as_deref(), Some("sic_no"));
    }

    #[test]
    fn missing_section_is_absent() {
        let docx = RawExtraction::new().with("energy_usage", "sic_no", "3411");
        let r = resolve(&sic_field(), &docx, &RawExtraction::new());
        assert_eq!(r.docx, Lookup::absent());
        assert_eq!(r.excel, Lookup::absent());
    }

    #[test]
    fn unclaimed_keys_are_reported_per_side() {
        let docx = RawExtraction::new()
            .with("general_info", "sic_no", "3411")
            .with("general_info", "assessment_date", "2023-06-14")
            .with("general_info", "plant_manager", RawValue::Absent)
            .with("site_notes", "access", "badge at gate");
        let excel = RawExtraction::new()
            .with("general_info", "SIC No.", 3411.0)
            // a docx-only alias is not claimed on the excel side
            .with("general_info", "SIC. No.", 3411.0);

        let unclaimed = find_unclaimed(&[sic_field()], &docx, &excel);
        assert_eq!(unclaimed.docx["general_info"], vec!["assessment_date".to_string()]);
        assert_eq!(unclaimed.docx["site_notes"], vec!["access".to_string()]);
        assert_eq!(unclaimed.excel["general_info"], vec!["SIC. No.".to_string()]);
        assert_eq!(unclaimed.count(), 3);
    }

    #[test]
    fn fully_claimed_extractions_report_nothing() {
        let docx = RawExtraction::new().with("general_info", "SIC. No.", "3411");
        let excel = RawExtraction::new().with("general_info", "sic_no", 3411.0);
        assert!(find_unclaimed(&[sic_field()], &docx, &excel).is_empty());
    }

    #[test]
    fn no_fuzzy_matching() {
        let docx = RawExtraction::new()
            .with("general_info", "SIC No. ", "3411")
            .with("general_info", "sic no", "3411")
            .with("general_info", "SIC_NO", "3411");
        let r = resolve(&sic_field(), &docx, &RawExtraction::new());
        assert_eq!(r.docx.raw, RawValue::Absent);
    }
}
