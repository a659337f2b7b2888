//! Error types for `showcase-core`.

use thiserror::Error;

use crate::{store::Collection, validate::ValidationErrors};

#[derive(Debug, Error)]
pub enum Error {
  /// A read or write against the document store failed. Aggregations surface
  /// this once per call; there is no partial-result mode.
  #[error("content unavailable: {0}")]
  ContentUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("document not found: {collection}/{id}")]
  NotFound { collection: Collection, id: String },

  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a backend error as [`Error::ContentUnavailable`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::ContentUnavailable(Box::new(e))
  }
}

impl From<ValidationErrors> for Error {
  fn from(e: ValidationErrors) -> Self { Error::Validation(e) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
