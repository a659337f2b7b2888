//! Messages left through the public contact form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  Error, Result,
  crud::{CREATED_AT, Crud},
  record::{ContactMessage, coerce_all},
  store::{Collection, Direction, DocumentQuery, DocumentStore, to_fields},
  validate,
};

/// The public form body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactForm {
  pub name:    String,
  pub email:   String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subject: Option<String>,
  pub message: String,
}

/// Validate and store a message. Returns the new message id.
pub async fn submit_contact_message<S: DocumentStore>(
  store: &S,
  form: &ContactForm,
) -> Result<String> {
  let mut data = to_fields(form)?;
  data.insert("isRead".to_owned(), Value::Bool(false));
  let data = validate::prepare_write(Collection::ContactMessages, data, false)?;

  Crud::new(store, Collection::ContactMessages).create(data).await
}

/// Messages newest first, optionally only those not yet read.
pub async fn list_contact_messages<S: DocumentStore>(
  store: &S,
  unread_only: bool,
) -> Result<Vec<ContactMessage>> {
  let mut query = DocumentQuery::new().order_by(CREATED_AT, Direction::Desc);
  if unread_only {
    query = query.where_eq("isRead", false);
  }
  let docs = store
    .query_documents(Collection::ContactMessages, &query)
    .await
    .map_err(Error::store)?;
  Ok(coerce_all(docs))
}

/// Flip a message's read flag. `false` if the message does not exist.
pub async fn set_message_read<S: DocumentStore>(
  store: &S,
  id: &str,
  is_read: bool,
) -> Result<bool> {
  let mut patch = serde_json::Map::new();
  patch.insert("isRead".to_owned(), Value::Bool(is_read));
  Crud::new(store, Collection::ContactMessages).update(id, patch).await
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::fake::FakeStore;

  fn form(message: &str) -> ContactForm {
    ContactForm {
      name:    "Grace".into(),
      email:   "grace@example.com".into(),
      subject: Some("Booking".into()),
      message: message.into(),
    }
  }

  #[tokio::test]
  async fn submitted_messages_start_unread() {
    let store = FakeStore::default();
    let id = submit_contact_message(&store, &form("Are you free in July?"))
      .await
      .unwrap();

    let raw = store.raw(Collection::ContactMessages, &id).unwrap();
    assert_eq!(raw["isRead"], json!(false));
    assert_eq!(raw["subject"], json!("Booking"));
    assert!(raw.get("createdAt").is_some());
  }

  #[tokio::test]
  async fn invalid_forms_are_not_stored() {
    let store = FakeStore::default();
    let err = submit_contact_message(&store, &form("hi")).await.unwrap_err();
    let Error::Validation(fields) = err else { panic!("expected validation error") };
    assert!(fields.for_field("message").is_some());
    assert!(store.get_all_documents(Collection::ContactMessages).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn listing_is_newest_first_and_filters_unread() {
    let store = FakeStore::default();
    store.insert(
      Collection::ContactMessages,
      "old",
      json!({ "name": "A", "email": "a@x.io", "message": "first message", "isRead": true,
              "createdAt": { "seconds": 100, "nanoseconds": 0 } }),
    );
    store.insert(
      Collection::ContactMessages,
      "new",
      json!({ "name": "B", "email": "b@x.io", "message": "second message", "isRead": false,
              "createdAt": { "seconds": 200, "nanoseconds": 0 } }),
    );

    let all = list_contact_messages(&store, false).await.unwrap();
    let ids: Vec<_> = all.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["new", "old"]);

    let unread = list_contact_messages(&store, true).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].id, "new");
  }

  #[tokio::test]
  async fn marking_read() {
    let store = FakeStore::default();
    let id = submit_contact_message(&store, &form("Lovely concert last night."))
      .await
      .unwrap();

    assert!(set_message_read(&store, &id, true).await.unwrap());
    assert_eq!(store.raw(Collection::ContactMessages, &id).unwrap()["isRead"], json!(true));
    assert!(!set_message_read(&store, "missing", true).await.unwrap());
  }
}
