//! Error types for tjson

use crate::path::JsonPath;
use crate::token::Token;
use std::fmt;
use thiserror::Error;

/// Boxed error used for failures raised by user code (constructors, validators).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a numeric literal is outside the domain of its target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeReason {
    /// Literal carries a leading minus sign.
    Negative,
    /// Literal has a non-zero fractional part.
    Fractional,
    /// Literal exceeds the maximum (or minimum) of the target type.
    Overflow,
}

impl fmt::Display for RangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeReason::Negative => f.write_str("negative"),
            RangeReason::Fractional => f.write_str("not an integer"),
            RangeReason::Overflow => f.write_str("out of range"),
        }
    }
}

/// A number token that cannot be represented by the target type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected {target} but was {detail} ({reason}) at path {path}")]
pub struct RangeError {
    /// The literal as it appeared in the input, e.g. `-1`
    pub detail: String,
    /// Name of the target type, e.g. `u32`
    pub target: String,
    /// Why the literal was rejected
    pub reason: RangeReason,
    /// Location of the literal in the document
    pub path: JsonPath,
}

/// A token whose kind does not match what the target type accepts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected {expected} but was {value}, a {found}, at path {path}")]
pub struct TypeError {
    /// Human readable description of the accepted input
    pub expected: String,
    /// Token kind actually found
    pub found: Token,
    /// Compact rendering of the offending value
    pub value: String,
    /// Location of the value in the document
    pub path: JsonPath,
}

/// A wrapper or record constructor rejected the decoded value.
#[derive(Debug, Error)]
#[error("Could not construct {type_name} from JSON value {value} at path {path}")]
pub struct ConstructionError {
    /// Simple name of the type being constructed
    pub type_name: String,
    /// Compact rendering of the JSON value that was decoded
    pub value: String,
    /// Location of the value in the document
    pub path: JsonPath,
    /// Failure reported by the constructor
    #[source]
    pub source: BoxError,
}

/// tjson error types
#[derive(Debug, Error)]
pub enum JsonError {
    /// Number literal negative, fractional, or out of range for its target.
    #[error(transparent)]
    Range(#[from] RangeError),
    /// Token kind did not match the target type.
    #[error(transparent)]
    Type(#[from] TypeError),
    /// Constructor invocation failed.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    /// A required record field was absent from the input object.
    #[error("Required value '{field}' missing at {path}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Path of the enclosing object
        path: JsonPath,
    },
    /// No entry of the chain and no default adapter handles the type.
    #[error("No JSON adapter for {type_name}")]
    NoAdapter {
        /// Simple name of the requested type
        type_name: String,
    },
    /// A configured limit was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    /// A value could not be represented as JSON.
    #[error("Cannot encode {type_name}: {reason}")]
    Encode {
        /// Simple name of the type being encoded
        type_name: String,
        /// Why encoding failed
        reason: String,
    },
    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Internal invariant was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JsonError {
    /// Location in the document the error refers to, when known.
    pub fn path(&self) -> Option<&JsonPath> {
        match self {
            JsonError::Range(err) => Some(&err.path),
            JsonError::Type(err) => Some(&err.path),
            JsonError::Construction(err) => Some(&err.path),
            JsonError::MissingField { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, JsonError>;
