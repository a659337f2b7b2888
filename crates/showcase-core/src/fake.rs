//! In-memory `DocumentStore` used by this crate's unit tests.

use std::{
  collections::{BTreeMap, HashMap},
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::store::{Collection, Document, DocumentQuery, DocumentStore};

#[derive(Debug, thiserror::Error)]
#[error("fake store offline")]
pub struct Offline;

#[derive(Default)]
pub struct FakeStore {
  docs:        Mutex<HashMap<Collection, BTreeMap<String, Map<String, Value>>>>,
  fail_reads:  AtomicBool,
  failing:     Mutex<Option<Collection>>,
  reads:       AtomicUsize,
}

impl FakeStore {
  pub fn insert(&self, collection: Collection, id: &str, data: Value) {
    let Value::Object(map) = data else { panic!("documents must be objects") };
    self
      .docs
      .lock()
      .unwrap()
      .entry(collection)
      .or_default()
      .insert(id.to_owned(), map);
  }

  pub fn raw(&self, collection: Collection, id: &str) -> Option<Value> {
    self
      .docs
      .lock()
      .unwrap()
      .get(&collection)
      .and_then(|c| c.get(id))
      .cloned()
      .map(Value::Object)
  }

  /// Make every read fail.
  pub fn fail_reads(&self, fail: bool) { self.fail_reads.store(fail, Ordering::SeqCst); }

  /// Make reads of one collection fail.
  pub fn fail_collection(&self, collection: Collection) {
    *self.failing.lock().unwrap() = Some(collection);
  }

  pub fn read_count(&self) -> usize { self.reads.load(Ordering::SeqCst) }

  fn check(&self, collection: Collection) -> Result<(), Offline> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    if self.fail_reads.load(Ordering::SeqCst)
      || *self.failing.lock().unwrap() == Some(collection)
    {
      return Err(Offline);
    }
    Ok(())
  }

  fn snapshot(&self, collection: Collection) -> Vec<Document> {
    self
      .docs
      .lock()
      .unwrap()
      .get(&collection)
      .map(|c| c.iter().map(|(id, data)| Document::new(id.clone(), data.clone())).collect())
      .unwrap_or_default()
  }
}

impl DocumentStore for FakeStore {
  type Error = Offline;

  async fn get_all_documents(&self, collection: Collection) -> Result<Vec<Document>, Offline> {
    self.check(collection)?;
    Ok(self.snapshot(collection))
  }

  async fn query_documents<'a>(
    &'a self,
    collection: Collection,
    query: &'a DocumentQuery,
  ) -> Result<Vec<Document>, Offline> {
    self.check(collection)?;
    Ok(query.apply(self.snapshot(collection)))
  }

  async fn get_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> Result<Option<Document>, Offline> {
    self.check(collection)?;
    Ok(
      self
        .raw(collection, id)
        .and_then(|v| v.as_object().cloned())
        .map(|data| Document::new(id, data)),
    )
  }

  async fn set_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    data: Map<String, Value>,
  ) -> Result<(), Offline> {
    self.insert(collection, id, Value::Object(data));
    Ok(())
  }

  async fn add_document(
    &self,
    collection: Collection,
    data: Map<String, Value>,
  ) -> Result<Document, Offline> {
    let id = Uuid::new_v4().simple().to_string();
    self.insert(collection, &id, Value::Object(data.clone()));
    Ok(Document::new(id, data))
  }

  async fn update_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    data: Map<String, Value>,
  ) -> Result<bool, Offline> {
    let mut docs = self.docs.lock().unwrap();
    match docs.get_mut(&collection).and_then(|c| c.get_mut(id)) {
      Some(existing) => {
        existing.extend(data);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn delete_document<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> Result<bool, Offline> {
    Ok(
      self
        .docs
        .lock()
        .unwrap()
        .get_mut(&collection)
        .and_then(|c| c.remove(id))
        .is_some(),
    )
  }
}
