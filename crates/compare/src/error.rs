use std::fmt;

/// Fatal errors. Only schema and input problems end up here; a bad value in
/// an extraction is reported through its field's outcome instead.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Schema validation error (blank name, bad role, bad unit, etc.).
    ConfigValidation(String),
    /// Schema declares no fields.
    EmptySchema,
    /// Two fields share a canonical name.
    DuplicateField(String),
    /// A field has no lookup key for one side.
    MissingKeys { field: String, side: &'static str },
    /// Tolerance is negative or not finite.
    InvalidTolerance(f64),
    /// Extraction JSON could not be read.
    InputParse(String),
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "schema parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "schema validation error: {msg}"),
            Self::EmptySchema => write!(f, "schema declares no fields"),
            Self::DuplicateField(name) => write!(f, "duplicate field name: '{name}'"),
            Self::MissingKeys { field, side } => {
                write!(f, "field '{field}': no {side} lookup keys")
            }
            Self::InvalidTolerance(t) => {
                write!(f, "tolerance must be a finite non-negative number, got {t}")
            }
            Self::InputParse(msg) => write!(f, "extraction parse error: {msg}"),
        }
    }
}

impl std::error::Error for CompareError {}
