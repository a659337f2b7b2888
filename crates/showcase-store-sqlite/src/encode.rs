//! Conversions between documents and the text stored in SQLite columns.
//!
//! Field maps are stored as compact JSON objects. Equality filters on plain
//! scalars are pushed down into SQL with `json_extract`; everything else is
//! evaluated in Rust after decoding.

use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Value};
use showcase_core::store::{Collection, Document, FieldFilter};

use crate::{Error, Result};

// ─── Documents ───────────────────────────────────────────────────────────────

pub fn encode_data(data: &Map<String, Value>) -> Result<String> {
  Ok(serde_json::to_string(data)?)
}

/// Raw strings read directly from a `documents` row.
pub struct RawDocument {
  pub doc_id:    String,
  pub data_json: String,
}

impl RawDocument {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawDocument { doc_id: row.get(0)?, data_json: row.get(1)? })
  }

  pub fn into_document(self, collection: Collection) -> Result<Document> {
    match serde_json::from_str::<Value>(&self.data_json)? {
      Value::Object(data) => Ok(Document::new(self.doc_id, data)),
      _ => Err(Error::NotAnObject {
        collection: collection.as_str().to_owned(),
        id:         self.doc_id,
      }),
    }
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// JSON path for a top-level field, quoted so field names need no escaping
/// beyond double quotes.
pub fn json_path(field: &str) -> String { format!("$.\"{}\"", field.replace('"', "\\\"")) }

/// A SQL condition plus its bound parameters, numbered from `first_param`.
///
/// `None` when the filter value has no exact SQL counterpart; such filters
/// are left to the in-memory pass.
pub fn filter_clause(filter: &FieldFilter, first_param: usize) -> Option<(String, Vec<SqlValue>)> {
  let path = SqlValue::Text(json_path(&filter.field));
  let p = first_param;
  match &filter.value {
    Value::Bool(b) => Some((
      format!("json_type(data_json, ?{p}) = ?{}", p + 1),
      vec![path, SqlValue::Text(if *b { "true" } else { "false" }.to_owned())],
    )),
    Value::String(s) => Some((
      format!("json_type(data_json, ?{p}) = 'text' AND json_extract(data_json, ?{p}) = ?{}", p + 1),
      vec![path, SqlValue::Text(s.clone())],
    )),
    Value::Number(n) => n.as_f64().map(|f| {
      (
        format!(
          "json_type(data_json, ?{p}) IN ('integer', 'real') AND json_extract(data_json, ?{p}) = ?{}",
          p + 1
        ),
        vec![path, SqlValue::Real(f)],
      )
    }),
    _ => None,
  }
}
