//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract. Scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Domain    | Description                                        |
//! |------|-----------|----------------------------------------------------|
//! | 0    | Universal | Success (every compared field matched)             |
//! | 1    | Universal | General error (unspecified)                        |
//! | 2    | Universal | CLI usage error (bad args, unreadable schema file) |
//! | 3    | compare   | Mismatches found, or totals do not reconcile       |
//! | 4    | compare   | Only missing fields, and `--strict` was given      |
//! | 5    | schema    | Schema failed to parse or validate                 |
//! | 6    | input     | Extraction file unreadable or not valid JSON       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use itacv_compare::CompareError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing schema file, invalid tolerance.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Compare (3-4)
// =============================================================================

/// At least one field mismatched (value or type), or the energy cost
/// totals failed a cross-check.
pub const EXIT_COMPARE_MISMATCH: u8 = 3;

/// Nothing mismatched but some fields were missing on one or both sides.
/// Only raised with `--strict`; otherwise missing fields exit 0.
pub const EXIT_COMPARE_MISSING: u8 = 4;

// =============================================================================
// Schema / input (5-6)
// =============================================================================

/// Schema TOML did not parse, or failed validation.
pub const EXIT_SCHEMA_INVALID: u8 = 5;

/// Extraction JSON could not be read or parsed.
pub const EXIT_INPUT_INVALID: u8 = 6;

/// Map an engine error to its exit code.
pub fn compare_exit_code(err: &CompareError) -> u8 {
    match err {
        CompareError::ConfigParse(_)
        | CompareError::ConfigValidation(_)
        | CompareError::EmptySchema
        | CompareError::DuplicateField(_)
        | CompareError::MissingKeys { .. } => EXIT_SCHEMA_INVALID,
        CompareError::InvalidTolerance(_) => EXIT_USAGE,
        CompareError::InputParse(_) => EXIT_INPUT_INVALID,
    }
}
