//! Error types for the plan engine.

use crate::Key;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldErrorKind {
    /// Missing field, wrong JSON type or out-of-range value
    Schema,
    /// `_org` tag differs from the root's
    OrgMismatch,
    /// `objectId` seen twice in one document
    DuplicateId,
    /// Date string is not `MM-DD-YYYY`
    DateFormat,
    /// Date is well-formed but not a real calendar day
    InvalidDate,
}

/// A single validation failure, addressed by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// JSON pointer to the offending field, e.g. `/costShare/_org`
    pub field: String,
    /// Human readable reason
    pub message: String,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind,
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All possible errors from the plan engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("record not found: {0}")]
    NotFound(Key),

    #[error("record already exists: {0}")]
    Conflict(Key),

    #[error("validation failed with {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("invalid claim amount: {0}")]
    InvalidClaimAmount(f64),

    // Internal errors
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
