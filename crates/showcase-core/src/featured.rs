//! Featured settings repository.
//!
//! The admin's home-page curation lives in one singleton document,
//! `settings/featured`. Its absence is valid and means "nothing curated".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  store::{Collection, DocumentStore, to_fields},
};

/// Fixed id of the singleton settings document.
pub const FEATURED_DOCUMENT_ID: &str = "featured";

/// How many ids the admin screens allow per list.
pub const MAX_FEATURED_PER_CATEGORY: usize = 3;

/// The admin-curated selection of content ids for the home page.
///
/// Ids are not checked against their collections; a curated id may refer to a
/// document that has since been deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedSettings {
  #[serde(default)]
  pub featured_event_ids: Vec<String>,
  #[serde(default)]
  pub featured_post_ids:  Vec<String>,
  #[serde(default)]
  pub featured_music_ids: Vec<String>,
}

impl FeaturedSettings {
  /// Read settings from a stored document without failing on bad lists.
  ///
  /// A list that is missing, `null` or not an array counts as empty. Entries
  /// that are not strings are dropped.
  pub fn from_fields(mut data: Map<String, Value>) -> Self {
    Self {
      featured_event_ids: id_list(&mut data, "featuredEventIds"),
      featured_post_ids:  id_list(&mut data, "featuredPostIds"),
      featured_music_ids: id_list(&mut data, "featuredMusicIds"),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.featured_event_ids.is_empty()
      && self.featured_post_ids.is_empty()
      && self.featured_music_ids.is_empty()
  }
}

fn id_list(data: &mut Map<String, Value>, field: &str) -> Vec<String> {
  match data.remove(field) {
    None | Some(Value::Null) => Vec::new(),
    Some(Value::Array(items)) => items
      .into_iter()
      .filter_map(|item| match item {
        Value::String(id) => Some(id),
        other => {
          tracing::warn!(field, value = %other, "ignoring non-string featured id");
          None
        }
      })
      .collect(),
    Some(other) => {
      tracing::warn!(field, value = %other, "featured id list is not an array");
      Vec::new()
    }
  }
}

/// Read the singleton settings document. `None` if it has never been saved.
pub async fn load_featured_settings<S: DocumentStore>(
  store: &S,
) -> Result<Option<FeaturedSettings>> {
  let doc = store
    .get_document(Collection::Settings, FEATURED_DOCUMENT_ID)
    .await
    .map_err(Error::store)?;

  Ok(doc.map(|doc| FeaturedSettings::from_fields(doc.data)))
}

/// Overwrite the singleton settings document with `settings`.
pub async fn save_featured_settings<S: DocumentStore>(
  store: &S,
  settings: &FeaturedSettings,
) -> Result<()> {
  let data = to_fields(settings)?;
  store
    .set_document(Collection::Settings, FEATURED_DOCUMENT_ID, data)
    .await
    .map_err(Error::store)?;
  tracing::info!(
    events = settings.featured_event_ids.len(),
    posts = settings.featured_post_ids.len(),
    music = settings.featured_music_ids.len(),
    "saved featured settings"
  );
  Ok(())
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::fake::FakeStore;

  #[tokio::test]
  async fn missing_document_loads_as_none() {
    let store = FakeStore::default();
    assert_eq!(load_featured_settings(&store).await.unwrap(), None);
  }

  #[tokio::test]
  async fn missing_lists_default_to_empty() {
    let store = FakeStore::default();
    store.insert(Collection::Settings, "featured", json!({ "featuredPostIds": ["p1"] }));

    let settings = load_featured_settings(&store).await.unwrap().unwrap();
    assert_eq!(settings.featured_post_ids, ["p1"]);
    assert!(settings.featured_event_ids.is_empty());
    assert!(settings.featured_music_ids.is_empty());
  }

  #[tokio::test]
  async fn null_and_non_array_lists_load_as_empty() {
    let store = FakeStore::default();
    store.insert(
      Collection::Settings,
      "featured",
      json!({ "featuredEventIds": null, "featuredPostIds": "p1", "featuredMusicIds": ["m1"] }),
    );

    let settings = load_featured_settings(&store).await.unwrap().unwrap();
    assert!(settings.featured_event_ids.is_empty());
    assert!(settings.featured_post_ids.is_empty());
    assert_eq!(settings.featured_music_ids, ["m1"]);
  }

  #[tokio::test]
  async fn non_string_ids_are_dropped() {
    let store = FakeStore::default();
    store.insert(
      Collection::Settings,
      "featured",
      json!({ "featuredMusicIds": ["m1", 7, null, { "id": "m2" }, "m3"] }),
    );

    let settings = load_featured_settings(&store).await.unwrap().unwrap();
    assert_eq!(settings.featured_music_ids, ["m1", "m3"]);
  }

  #[tokio::test]
  async fn save_overwrites_rather_than_merges() {
    let store = FakeStore::default();
    store.insert(
      Collection::Settings,
      "featured",
      json!({ "featuredEventIds": ["e1"], "legacy": true }),
    );

    let settings = FeaturedSettings {
      featured_music_ids: vec!["m1".into()],
      ..Default::default()
    };
    save_featured_settings(&store, &settings).await.unwrap();

    let raw = store.raw(Collection::Settings, "featured").unwrap();
    assert_eq!(
      raw,
      json!({ "featuredEventIds": [], "featuredPostIds": [], "featuredMusicIds": ["m1"] })
    );
    assert_eq!(load_featured_settings(&store).await.unwrap(), Some(settings));
  }

  #[tokio::test]
  async fn store_failure_is_content_unavailable() {
    let store = FakeStore::default();
    store.fail_reads(true);
    assert!(matches!(
      load_featured_settings(&store).await,
      Err(Error::ContentUnavailable(_))
    ));
  }
}
