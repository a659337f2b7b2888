//! The `DocumentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `showcase-store-sqlite`).
//! Higher layers (`showcase-api`, the resolvers in [`crate::resolve`]) depend
//! on this abstraction, not on any concrete backend.

use std::{cmp::Ordering, fmt, future::Future, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::timestamp::StoredInstant;

// ─── Collections ─────────────────────────────────────────────────────────────

/// The named collections the site stores documents in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
  #[serde(rename = "profile")]
  Profile,
  #[serde(rename = "music")]
  Music,
  #[serde(rename = "videos")]
  Videos,
  #[serde(rename = "events")]
  Events,
  #[serde(rename = "posts")]
  Posts,
  #[serde(rename = "contactMessages")]
  ContactMessages,
  #[serde(rename = "socialLinks")]
  SocialLinks,
  #[serde(rename = "settings")]
  Settings,
}

impl Collection {
  pub const ALL: [Collection; 8] = [
    Collection::Profile,
    Collection::Music,
    Collection::Videos,
    Collection::Events,
    Collection::Posts,
    Collection::ContactMessages,
    Collection::SocialLinks,
    Collection::Settings,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Collection::Profile => "profile",
      Collection::Music => "music",
      Collection::Videos => "videos",
      Collection::Events => "events",
      Collection::Posts => "posts",
      Collection::ContactMessages => "contactMessages",
      Collection::SocialLinks => "socialLinks",
      Collection::Settings => "settings",
    }
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection: {0:?}")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
  type Err = UnknownCollection;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Collection::ALL
      .into_iter()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| UnknownCollection(s.to_owned()))
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// A schemaless document: a store-assigned identifier plus its field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
  pub id:   String,
  pub data: Map<String, Value>,
}

impl Document {
  pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
    Self { id: id.into(), data }
  }

  /// The value of `field`, or `Value::Null` if absent.
  pub fn field(&self, field: &str) -> &Value {
    self.data.get(field).unwrap_or(&Value::Null)
  }

  /// The field map with the identifier merged in under `id`.
  pub fn into_map_with_id(self) -> Map<String, Value> {
    let mut map = self.data;
    map.insert("id".to_owned(), Value::String(self.id));
    map
  }
}

/// Serialise a record into a document field map.
pub fn to_fields<T: Serialize>(value: &T) -> serde_json::Result<Map<String, Value>> {
  match serde_json::to_value(value)? {
    Value::Object(map) => Ok(map),
    other => Err(serde::ser::Error::custom(format!(
      "expected a JSON object, got {other}"
    ))),
  }
}

// ─── Query type ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  #[default]
  Asc,
  Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
  pub field:     String,
  pub direction: Direction,
}

/// An equality constraint: `field == value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
  pub field: String,
  pub value: Value,
}

/// Parameters for [`DocumentStore::query_documents`].
///
/// Semantics every backend must honour:
/// - all `filters` must hold (equality, JSON value comparison);
/// - with `order_by`, documents lacking the field are excluded, the rest are
///   sorted by [`compare_field_values`] with ties broken by ascending id;
/// - without `order_by`, documents come back in ascending id order;
/// - `limit` is applied last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
  pub order_by: Option<OrderBy>,
  pub filters:  Vec<FieldFilter>,
  pub limit:    Option<usize>,
}

impl DocumentQuery {
  pub fn new() -> Self { Self::default() }

  pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
    self.order_by = Some(OrderBy { field: field.into(), direction });
    self
  }

  pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.filters.push(FieldFilter { field: field.into(), value: value.into() });
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  /// Whether `doc` satisfies every filter and carries the ordering field.
  pub fn matches(&self, doc: &Document) -> bool {
    let has_order_field = self
      .order_by
      .as_ref()
      .is_none_or(|o| doc.data.get(&o.field).is_some_and(|v| !v.is_null()));
    has_order_field
      && self
        .filters
        .iter()
        .all(|f| doc.data.get(&f.field).is_some_and(|v| values_equal(v, &f.value)))
  }

  /// Order and truncate documents that have already passed [`Self::matches`].
  pub fn sort_and_limit(&self, mut docs: Vec<Document>) -> Vec<Document> {
    match &self.order_by {
      Some(order) => docs.sort_by(|a, b| {
        let ord = compare_field_values(a.field(&order.field), b.field(&order.field));
        let ord = match order.direction {
          Direction::Asc => ord,
          Direction::Desc => ord.reverse(),
        };
        ord.then_with(|| a.id.cmp(&b.id))
      }),
      None => docs.sort_by(|a, b| a.id.cmp(&b.id)),
    }
    if let Some(limit) = self.limit {
      docs.truncate(limit);
    }
    docs
  }

  /// Evaluate the whole query in memory over a collection snapshot.
  pub fn apply(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
    let matching = docs.into_iter().filter(|d| self.matches(d)).collect();
    self.sort_and_limit(matching)
  }
}

fn values_equal(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
    _ => a == b,
  }
}

// ─── Ordering ────────────────────────────────────────────────────────────────

/// Sort key for a stored field value.
///
/// Types order as null < bool < number < instant < text < other. Any value
/// that is recognisably a date (store timestamp, `$date` wrapper, or a string
/// that parses as one) sorts as an instant, so mixed date representations
/// still order chronologically.
#[derive(Debug, PartialEq, PartialOrd)]
enum FieldKey<'a> {
  Null,
  Bool(bool),
  Number(f64),
  Instant(DateTime<Utc>),
  Text(&'a str),
  Other(String),
}

impl<'a> FieldKey<'a> {
  fn of(value: &'a Value) -> Self {
    match value {
      Value::Null => FieldKey::Null,
      Value::Bool(b) => FieldKey::Bool(*b),
      Value::Number(n) => FieldKey::Number(n.as_f64().unwrap_or(f64::NAN)),
      Value::String(s) => match StoredInstant::from_value(value).to_instant() {
        Ok(Some(dt)) => FieldKey::Instant(dt),
        _ => FieldKey::Text(s),
      },
      Value::Object(_) => match StoredInstant::from_value(value).to_instant() {
        Ok(Some(dt)) => FieldKey::Instant(dt),
        _ => FieldKey::Other(value.to_string()),
      },
      Value::Array(_) => FieldKey::Other(value.to_string()),
    }
  }
}

/// Total order over stored field values used for `order_by`.
pub fn compare_field_values(a: &Value, b: &Value) -> Ordering {
  FieldKey::of(a)
    .partial_cmp(&FieldKey::of(b))
    .unwrap_or(Ordering::Equal)
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a document store backend.
///
/// Each collection is an independent key/value space of JSON documents.
/// Single-document reads are strongly consistent; nothing else is assumed.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Every document in `collection`, in ascending id order.
  fn get_all_documents(
    &self,
    collection: Collection,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + '_;

  /// Documents matching `query`; see [`DocumentQuery`] for the semantics.
  fn query_documents<'a>(
    &'a self,
    collection: Collection,
    query: &'a DocumentQuery,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// Retrieve a document by id. Returns `None` if not found.
  fn get_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Create or fully overwrite the document at `id`.
  fn set_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    data: Map<String, Value>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Persist a new document under a store-assigned id and return it.
  fn add_document(
    &self,
    collection: Collection,
    data: Map<String, Value>,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Merge `data` into the top-level fields of an existing document.
  ///
  /// Returns `false` if the document does not exist.
  fn update_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    data: Map<String, Value>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Hard-delete a document. Returns `false` if it did not exist.
  fn delete_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
