// Error types for protofif

use bson::spec::ElementType;
use thiserror::Error;

pub type Result<T, E = CodecError> = std::result::Result<T, E>;

/// Errors surfaced by any of the codec boundaries
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML codec error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("BSON codec error: {0}")]
    Bson(#[from] BsonError),
    #[error("SQL scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("dynamic value error: {0}")]
    Value(#[from] ValueError),
    #[error("zone error: {0}")]
    Zone(#[from] ZoneError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Sentinels for validation call sites layered above the conversions.
///
/// The conversions themselves never return these; they are exported so that
/// callers validating messages report failures consistently.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid timestamp")]
    InvalidTimestamp,
    #[error("invalid duration")]
    InvalidDuration,
}

/// Zone lookup and configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ZoneError {
    #[error("unknown time zone: {0:?}")]
    Unknown(String),
    #[error("default zone already installed as {0}")]
    AlreadyInstalled(String),
}

/// Document-database (BSON) decode errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BsonError {
    #[error("expected BSON {expected}, found {actual:?}")]
    UnexpectedType {
        expected: &'static str,
        actual: ElementType,
    },
    #[error("malformed {element_type:?} payload of {len} bytes")]
    Payload { element_type: ElementType, len: usize },
    #[error("BSON double {0} is not an integral nanosecond count")]
    NonIntegral(f64),
    #[error("BSON datetime {0}ms is outside the representable range")]
    DateTimeOutOfRange(i64),
}

/// Relational driver scan errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScanError {
    #[error("column of type {type_name} cannot be scanned into a Timestamp")]
    TypeMismatch { type_name: &'static str },
    #[error("invalid timestamp {input:?}: {source}")]
    InvalidTimestamp {
        input: String,
        source: chrono::ParseError,
    },
}

/// Canonical dynamic value construction errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    #[error("mapping key {0} is not a string")]
    NonStringKey(String),
    #[error("number {0} has no floating-point representation")]
    Number(String),
}
