//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<padron_core::Error> for ApiError {
  fn from(err: padron_core::Error) -> Self {
    use padron_core::Error;
    match err {
      Error::ExclusionViolation { .. } | Error::TypeAlreadyAssigned(_) => {
        ApiError::Conflict(err.to_string())
      }
      Error::RecordNotFound(_)
      | Error::TypeNotAssigned(_)
      | Error::AlreadyDeactivated(_)
      | Error::TypeMismatch { .. }
      | Error::MissingRelation
      | Error::MissingPersona(_)
      | Error::SelfRelation(_) => ApiError::BadRequest(err.to_string()),
      Error::Serialization(_) => ApiError::Internal(err.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, m.clone())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
