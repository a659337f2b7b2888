//! Error type for `showcase-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A row whose `data_json` is valid JSON but not an object.
  #[error("document {collection}/{id} is not a JSON object")]
  NotAnObject { collection: String, id: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
