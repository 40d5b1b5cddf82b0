use thiserror::Error;

/// Failure to turn one raw or supplied value into a typed value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("value for type '{type_name}' is missing and no default is declared")]
    Missing { type_name: String },
    #[error("value '{raw}' is not an integer")]
    NotAnInteger { raw: String },
    #[error("value '{raw}' is a decimal; integers only")]
    Decimal { raw: String },
    #[error("value '{raw}' is out of the supported integer range")]
    OutOfRange { raw: String },
    #[error("value {value} is below minimum {min}")]
    BelowMin { value: i64, min: i64 },
    #[error("value {value} exceeds maximum {max}")]
    AboveMax { value: i64, max: i64 },
    #[error("string length {len} is below minimum {min}")]
    TooShort { len: usize, min: usize },
    #[error("string length {len} exceeds maximum {max}")]
    TooLong { len: usize, max: usize },
    #[error("string '{value}' does not start with '{prefix}'")]
    MissingPrefix { value: String, prefix: String },
    #[error("string '{value}' does not end with '{suffix}'")]
    MissingSuffix { value: String, suffix: String },
    #[error("string '{value}' does not contain '{needle}'")]
    MissingSubstring { value: String, needle: String },
    #[error("empty string for type '{type_name}' with no default")]
    EmptyString { type_name: String },
    #[error("expected {expected} value, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

pub type ValueResult<T> = Result<T, ValueError>;

/// Constraint misuse detected while building a type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("constraint '{constraint}' is not supported by type '{type_name}' (supported: {supported})")]
    UnknownConstraint {
        type_name: String,
        constraint: String,
        supported: String,
    },
    #[error("constraint '{constraint}' has invalid value '{value}': {reason}")]
    InvalidConstraintValue {
        constraint: String,
        value: String,
        reason: String,
    },
}

/// Registry lookups and misconfiguration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeSystemError {
    #[error("type '{name}' not found (available: {available})")]
    UnknownType { name: String, available: String },
    #[error("type factory registered without any name")]
    UnnamedFactory,
}
