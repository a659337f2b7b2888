//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use showcase_core::validate::ValidationErrors;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A body or query string that could not be extracted.
  #[error("rejected request ({status}): {message}")]
  Rejected { status: StatusCode, message: String },

  #[error("unauthorized")]
  Unauthorized,

  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  /// The document store could not be reached. Nothing partial is served.
  #[error("content unavailable: {0}")]
  Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<showcase_core::Error> for ApiError {
  fn from(e: showcase_core::Error) -> Self {
    use showcase_core::Error as E;
    match e {
      E::ContentUnavailable(source) => ApiError::Unavailable(source),
      E::NotFound { collection, id } => ApiError::NotFound(format!("{collection}/{id} not found")),
      E::Validation(fields) => ApiError::Validation(fields),
      E::Serialization(e) => ApiError::Internal(e.to_string()),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { ApiError::Rejected { status: r.status(), message: r.body_text() } }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { ApiError::Rejected { status: r.status(), message: r.body_text() } }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response(),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Rejected { status, message } => (status, Json(json!({ "error": message }))).into_response(),
      ApiError::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" }))).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"showcase\""),
        );
        res
      }
      ApiError::Validation(fields) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": "validation failed", "fields": fields })),
      )
        .into_response(),
      ApiError::Unavailable(e) => {
        tracing::error!(error = %e, "document store unavailable");
        (
          StatusCode::SERVICE_UNAVAILABLE,
          Json(json!({ "error": "content temporarily unavailable" })),
        )
          .into_response()
      }
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "internal error" }))).into_response()
      }
    }
  }
}
