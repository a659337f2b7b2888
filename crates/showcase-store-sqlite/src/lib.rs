//! SQLite backend for the showcase document store.
//!
//! Every collection lives in one `documents` table as JSON text. Access goes
//! through [`tokio_rusqlite`] so queries run on a dedicated thread without
//! blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
