//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::{
    FromRequest, FromRequestParts,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::{IntoResponse, Response},
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

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

/// Record validation failures are the caller's to fix.
impl From<gamblefree_core::Error> for ApiError {
  fn from(e: gamblefree_core::Error) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<gamblefree_core::quick_help::FlowError> for ApiError {
  fn from(e: gamblefree_core::quick_help::FlowError) -> Self { Self::BadRequest(e.to_string()) }
}

/// Malformed or out-of-range request bodies.
impl From<JsonRejection> for ApiError {
  fn from(e: JsonRejection) -> Self { Self::BadRequest(e.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(e: QueryRejection) -> Self { Self::BadRequest(e.body_text()) }
}

/// [`axum::Json`] whose rejection is an [`ApiError`], so decode failures
/// share the `{"error": ..}` shape with every other 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// [`axum::extract::Query`] with an [`ApiError`] rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
