//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::{
  store::StoreError,
  validation::{Rejection, ValidationErrors},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid: {0}")]
  Invalid(ValidationErrors),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a store error, turning a unique-constraint collision into the
  /// same response a failed uniqueness check would have produced.
  pub fn store<E: StoreError>(e: E) -> Self {
    match e.conflict() {
      Some(field) => {
        tracing::warn!(field = field.column(), "write rejected by unique constraint");
        ApiError::Invalid(ValidationErrors::taken(field))
      }
      None => ApiError::Store(Box::new(e)),
    }
  }
}

impl<E: StoreError> From<Rejection<E>> for ApiError {
  fn from(rejection: Rejection<E>) -> Self {
    match rejection {
      Rejection::Invalid(errors) => ApiError::Invalid(errors),
      Rejection::Store(e) => ApiError::store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::Invalid(errors) => {
        let body = json!({ "message": errors.summary(), "errors": errors });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
