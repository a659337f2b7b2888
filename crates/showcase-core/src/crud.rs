//! Generic create/read/update/delete over one collection.
//!
//! Used by the admin screens. Writes stamp `createdAt` / `updatedAt` with a
//! store timestamp; reads hand documents back with their id merged in.

use serde_json::{Map, Value};

use crate::{
  Error, Result,
  store::{Collection, Document, DocumentStore},
  timestamp::StoreTimestamp,
};

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

/// CRUD handle for a single collection.
pub struct Crud<'s, S> {
  store:      &'s S,
  collection: Collection,
}

impl<'s, S: DocumentStore> Crud<'s, S> {
  pub fn new(store: &'s S, collection: Collection) -> Self { Self { store, collection } }

  /// Store a new document and return its id.
  pub async fn create(&self, mut data: Map<String, Value>) -> Result<String> {
    let now = StoreTimestamp::now().to_value();
    data.remove("id");
    data.insert(CREATED_AT.to_owned(), now.clone());
    data.insert(UPDATED_AT.to_owned(), now);

    let doc = self
      .store
      .add_document(self.collection, data)
      .await
      .map_err(Error::store)?;
    tracing::info!(collection = %self.collection, id = %doc.id, "created document");
    Ok(doc.id)
  }

  /// Merge `data` into an existing document. `false` if it does not exist.
  pub async fn update(&self, id: &str, mut data: Map<String, Value>) -> Result<bool> {
    data.remove("id");
    data.remove(CREATED_AT);
    data.insert(UPDATED_AT.to_owned(), StoreTimestamp::now().to_value());

    let found = self
      .store
      .update_document(self.collection, id, data)
      .await
      .map_err(Error::store)?;
    if found {
      tracing::info!(collection = %self.collection, id, "updated document");
    }
    Ok(found)
  }

  /// Hard-delete a document. `false` if it did not exist.
  pub async fn remove(&self, id: &str) -> Result<bool> {
    let found = self
      .store
      .delete_document(self.collection, id)
      .await
      .map_err(Error::store)?;
    if found {
      tracing::info!(collection = %self.collection, id, "deleted document");
    }
    Ok(found)
  }

  /// Every document in the collection, each with `id` merged into its fields.
  pub async fn get_all(&self) -> Result<Vec<Map<String, Value>>> {
    let docs = self
      .store
      .get_all_documents(self.collection)
      .await
      .map_err(Error::store)?;
    Ok(docs.into_iter().map(Document::into_map_with_id).collect())
  }

  pub async fn get(&self, id: &str) -> Result<Option<Map<String, Value>>> {
    let doc = self
      .store
      .get_document(self.collection, id)
      .await
      .map_err(Error::store)?;
    Ok(doc.map(Document::into_map_with_id))
  }
}
