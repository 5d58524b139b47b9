//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use surface_core::{PersistedEvent, ValidationIssue};

/// Success response for ingestion.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventCreatedResponse {
    pub message: String,
    pub event: PersistedEvent,
}

impl EventCreatedResponse {
    pub fn new(event: PersistedEvent) -> Self {
        Self {
            message: "Event recorded successfully".to_string(),
            event,
        }
    }
}

/// Success response for queries, events sorted newest-first.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<PersistedEvent>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_connected: bool,
    pub active_subscribers: u64,
    pub events_persisted: u64,
}

/// Error envelope: `{message, errors}` for validation failures,
/// `{message, error}` for server failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationIssue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// API error with its HTTP status.
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    /// 400 for a malformed or invalid request body.
    pub fn invalid_body(errors: Vec<ValidationIssue>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse {
                message: "Invalid request body".to_string(),
                errors: Some(errors),
                error: None,
            },
        }
    }

    /// 400 for invalid query parameters.
    pub fn invalid_query(errors: Vec<ValidationIssue>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse {
                message: "Invalid query parameters".to_string(),
                errors: Some(errors),
                error: None,
            },
        }
    }

    /// 500 for a persistence failure during ingestion.
    pub fn record_failed(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            response: ErrorResponse {
                message: "Failed to record event".to_string(),
                errors: None,
                error: Some(error.into()),
            },
        }
    }

    /// 500 for a store failure during a query.
    pub fn fetch_failed(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            response: ErrorResponse {
                message: "Failed to fetch events".to_string(),
                errors: None,
                error: Some(error.into()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}
