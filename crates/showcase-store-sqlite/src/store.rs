//! [`SqliteStore`], the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, types::Value as SqlValue};
use serde_json::{Map, Value};
use uuid::Uuid;

use showcase_core::store::{Collection, Document, DocumentQuery, DocumentStore};

use crate::{
  Result,
  encode::{RawDocument, encode_data, filter_clause, json_path},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT doc_id, data_json` statement and decode the rows.
  async fn select(
    &self,
    collection: Collection,
    sql: String,
    params: Vec<SqlValue>,
  ) -> Result<Vec<Document>> {
    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawDocument::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|raw| raw.into_document(collection)).collect()
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = crate::Error;

  async fn get_all_documents(&self, collection: Collection) -> Result<Vec<Document>> {
    self
      .select(
        collection,
        "SELECT doc_id, data_json FROM documents WHERE collection = ?1 ORDER BY doc_id".to_owned(),
        vec![SqlValue::Text(collection.as_str().to_owned())],
      )
      .await
  }

  async fn query_documents<'a>(
    &'a self,
    collection: Collection,
    query: &'a DocumentQuery,
  ) -> Result<Vec<Document>> {
    let mut sql = String::from("SELECT doc_id, data_json FROM documents WHERE collection = ?1");
    let mut params = vec![SqlValue::Text(collection.as_str().to_owned())];
    let mut all_pushed = true;

    for filter in &query.filters {
      match filter_clause(filter, params.len() + 1) {
        Some((clause, values)) => {
          sql.push_str(" AND ");
          sql.push_str(&clause);
          params.extend(values);
        }
        None => all_pushed = false,
      }
    }
    sql.push_str(" ORDER BY doc_id");

    // Field ordering is decided in Rust, so SQL may only truncate when the
    // id order it produces is already the final order.
    if let (None, Some(limit), true) = (&query.order_by, query.limit, all_pushed) {
      sql.push_str(&format!(" LIMIT {limit}"));
    }

    let docs = self.select(collection, sql, params).await?;
    Ok(query.apply(docs))
  }

  async fn get_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> Result<Option<Document>> {
    let coll = collection.as_str().to_owned();
    let id = id.to_owned();

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT doc_id, data_json FROM documents WHERE collection = ?1 AND doc_id = ?2",
              rusqlite::params![coll, id],
              RawDocument::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|r| r.into_document(collection)).transpose()
  }

  async fn set_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    data: Map<String, Value>,
  ) -> Result<()> {
    let coll = collection.as_str().to_owned();
    let id = id.to_owned();
    let json = encode_data(&data)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, doc_id, data_json) VALUES (?1, ?2, ?3)
           ON CONFLICT (collection, doc_id) DO UPDATE SET data_json = excluded.data_json",
          rusqlite::params![coll, id, json],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_document(&self, collection: Collection, data: Map<String, Value>) -> Result<Document> {
    let id = Uuid::new_v4().simple().to_string();
    let coll = collection.as_str().to_owned();
    let json = encode_data(&data)?;
    let doc_id = id.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, doc_id, data_json) VALUES (?1, ?2, ?3)",
          rusqlite::params![coll, doc_id, json],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(%collection, %id, "inserted document");
    Ok(Document::new(id, data))
  }

  async fn update_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    data: Map<String, Value>,
  ) -> Result<bool> {
    // Top-level merge: each patched field replaces the stored value whole.
    let mut params = vec![
      SqlValue::Text(collection.as_str().to_owned()),
      SqlValue::Text(id.to_owned()),
    ];
    let mut expr = String::from("data_json");
    if !data.is_empty() {
      expr = String::from("json_set(data_json");
      for (field, value) in &data {
        let n = params.len() + 1;
        expr.push_str(&format!(", ?{n}, json(?{})", n + 1));
        params.push(SqlValue::Text(json_path(field)));
        params.push(SqlValue::Text(serde_json::to_string(value)?));
      }
      expr.push(')');
    }
    let sql = format!("UPDATE documents SET data_json = {expr} WHERE collection = ?1 AND doc_id = ?2");

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(params))?))
      .await?;
    Ok(changed > 0)
  }

  async fn delete_document<'a>(&'a self, collection: Collection, id: &'a str) -> Result<bool> {
    let coll = collection.as_str().to_owned();
    let id = id.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![coll, id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}
