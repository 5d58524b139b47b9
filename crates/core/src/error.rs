//! Unified error types for the telemetry pipeline.
//!
//! One variant per failure class:
//! - `Validation`: malformed request body/query, surfaced as 400 with issues
//! - `Storage`: durable-store failure during ingestion or query (500)
//! - `StorageUnavailable`: identity persistence inaccessible on the client
//! - `Transport`: network dispatch failure on the capture path
//! - `Sync`: polling request failure, transient and retryable

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// A single field-level problem found while validating a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Wire-format field name (e.g. `tagId`).
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Unified error type for the telemetry pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed request body or query parameters, with itemized issues.
    #[error("validation failed: {}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),

    /// Durable-store failure. Not retried by the server.
    #[error("storage error: {0}")]
    Storage(String),

    /// Identity persistence is inaccessible. Callers treat the stored value
    /// as absent and continue with an in-memory identity.
    #[error("identity storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Network failure while dispatching an envelope. Logged, never
    /// propagated to the capturing caller.
    #[error("transport error: {0}")]
    Transport(String),

    /// Retrieval failure in the polling path. Transient; the next poll cycle
    /// retries.
    #[error("sync error: {0}")]
    Sync(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error from itemized issues.
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        Self::Validation(issues)
    }

    /// Create a validation error for a single field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![ValidationIssue::new(field, message)])
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn sync(msg: impl Into<String>) -> Self {
        Self::Sync(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Serialization(_) => 400,
            Self::Storage(_) => 500,
            Self::StorageUnavailable(_) => 500,
            Self::Transport(_) => 502,
            Self::Sync(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    /// Itemized issues if this is a validation error.
    pub fn issues(&self) -> Option<&[ValidationIssue]> {
        match self {
            Self::Validation(issues) => Some(issues),
            _ => None,
        }
    }
}
