//! JSON response bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use intake_core::{Error, FieldErrors, ValidationError};
use serde::Serialize;
use std::collections::BTreeMap;

/// Successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub data: SubmissionData,
}

#[derive(Debug, Serialize)]
pub struct SubmissionData {
    pub submission_id: u64,
    pub form_id: Option<String>,
    pub email_sent: bool,
}

impl SubmitResponse {
    pub fn new(message: impl Into<String>, data: SubmissionData) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_healthy: bool,
    pub repository_healthy: bool,
    pub notifier_healthy: bool,
    pub submissions_received: u64,
    pub submissions_accepted: u64,
}

/// Settings a front end needs to submit forms.
#[derive(Debug, Serialize)]
pub struct FormConfigResponse {
    pub api_url: String,
    pub nonce: String,
    pub messages: BTreeMap<&'static str, String>,
}

/// Failed submission.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
            throttled: None,
            retry_after: None,
            remaining_time: None,
            error: None,
        }
    }
}

/// API error with its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(message),
            retry_after: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    /// Per-field validation failure.
    pub fn validation(message: impl Into<String>, errors: FieldErrors) -> Self {
        let mut err = Self::bad_request(message);
        err.response.errors = Some(errors);
        err
    }

    pub fn throttled(message: impl Into<String>, retry_after: u64, minutes: u64) -> Self {
        let mut err = Self::new(StatusCode::TOO_MANY_REQUESTS, message);
        err.response.throttled = Some(true);
        err.response.retry_after = Some(retry_after);
        err.response.remaining_time = Some(minutes);
        err.retry_after = Some(retry_after);
        err
    }

    /// Processing failure; `error` is a generic client-safe description.
    pub fn processing(message: impl Into<String>, error: impl Into<String>) -> Self {
        let mut err = Self::new(StatusCode::INTERNAL_SERVER_ERROR, message);
        err.response.error = Some(error.into());
        err
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(ValidationError::Fields { message, errors }) => {
                Self::validation(message, errors)
            }
            Error::Validation(
                ValidationError::Structure { message, .. } | ValidationError::Rejected { message },
            ) => Self::bad_request(message),
            Error::Throttled {
                message,
                retry_after,
                minutes,
            } => Self::throttled(message, retry_after, minutes),
            Error::Processing { message, error } => Self::processing(message, error),
            // Internal detail stays in the logs.
            other => Self::new(
                StatusCode::from_u16(other.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                other.error_code(),
            ),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Error::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        if let Some(retry_after) = self.retry_after {
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert("Retry-After", value);
            }
        }

        response
    }
}
