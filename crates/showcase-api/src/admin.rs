//! Admin handlers. Every route here requires [`Authenticated`].
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/settings/featured` | Empty lists when never saved |
//! | `PUT`    | `/admin/settings/featured` | Full overwrite, at most 3 ids per list |
//! | `GET`    | `/admin/messages` | Newest first; `?unreadOnly=true` |
//! | `POST`   | `/admin/messages/{id}/read` | Body: `{"isRead":true}` |
//! | `GET`    | `/admin/{collection}` | Every document, id merged in |
//! | `POST`   | `/admin/{collection}` | Validated create; returns `{"id"}` |
//! | `GET`    | `/admin/{collection}/{id}` | 404 if not found |
//! | `PATCH`  | `/admin/{collection}/{id}` | Validated top-level merge |
//! | `DELETE` | `/admin/{collection}/{id}` | 204, or 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use showcase_core::{
  contact::{list_contact_messages, set_message_read},
  crud::Crud,
  featured::{FeaturedSettings, load_featured_settings, save_featured_settings},
  record::ContactMessage,
  store::{Collection, DocumentStore},
  validate::{prepare_write, validate_featured_settings},
};

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  extract::{JsonBody, QueryParams},
};

/// Parse a content collection name from the path. The settings collection
/// has its own routes.
fn content_collection(name: &str) -> Result<Collection, ApiError> {
  match name.parse::<Collection>() {
    Ok(Collection::Settings) => Err(ApiError::BadRequest(
      "settings are managed at /admin/settings/featured".to_owned(),
    )),
    Ok(c) => Ok(c),
    Err(e) => Err(ApiError::BadRequest(e.to_string())),
  }
}

fn not_found(collection: Collection, id: &str) -> ApiError {
  showcase_core::Error::NotFound { collection, id: id.to_owned() }.into()
}

// ─── Featured settings ───────────────────────────────────────────────────────

/// `GET /admin/settings/featured`
pub async fn get_featured_settings<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Json<FeaturedSettings>, ApiError>
where
  S: DocumentStore,
{
  let settings = load_featured_settings(state.store.as_ref()).await?;
  Ok(Json(settings.unwrap_or_default()))
}

/// `PUT /admin/settings/featured`
pub async fn put_featured_settings<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  JsonBody(settings): JsonBody<FeaturedSettings>,
) -> Result<Json<FeaturedSettings>, ApiError>
where
  S: DocumentStore,
{
  validate_featured_settings(&settings).map_err(ApiError::Validation)?;
  save_featured_settings(state.store.as_ref(), &settings).await?;
  Ok(Json(settings))
}

// ─── Contact messages ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageParams {
  #[serde(default)]
  pub unread_only: bool,
}

/// `GET /admin/messages[?unreadOnly=true]`
pub async fn list_messages<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  QueryParams(params): QueryParams<MessageParams>,
) -> Result<Json<Vec<ContactMessage>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(list_contact_messages(state.store.as_ref(), params.unread_only).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkBody {
  pub is_read: bool,
}

/// `POST /admin/messages/{id}/read`
pub async fn mark_message<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  JsonBody(body): JsonBody<MarkBody>,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore,
{
  if set_message_read(state.store.as_ref(), &id, body.is_read).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found(Collection::ContactMessages, &id))
  }
}

// ─── Generic collection CRUD ─────────────────────────────────────────────────

/// `GET /admin/{collection}`
pub async fn list<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  Path(collection): Path<String>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError>
where
  S: DocumentStore,
{
  let collection = content_collection(&collection)?;
  let docs = Crud::new(state.store.as_ref(), collection).get_all().await?;
  Ok(Json(docs))
}

/// `POST /admin/{collection}`
pub async fn create<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  Path(collection): Path<String>,
  JsonBody(data): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let collection = content_collection(&collection)?;
  let data = prepare_write(collection, data, false).map_err(ApiError::Validation)?;
  let id = Crud::new(state.store.as_ref(), collection).create(data).await?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `GET /admin/{collection}/{id}`
pub async fn get_one<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Map<String, Value>>, ApiError>
where
  S: DocumentStore,
{
  let collection = content_collection(&collection)?;
  Crud::new(state.store.as_ref(), collection)
    .get(&id)
    .await?
    .map(Json)
    .ok_or_else(|| not_found(collection, &id))
}

/// `PATCH /admin/{collection}/{id}`: returns the merged document.
pub async fn update<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  Path((collection, id)): Path<(String, String)>,
  JsonBody(data): JsonBody<Map<String, Value>>,
) -> Result<Json<Map<String, Value>>, ApiError>
where
  S: DocumentStore,
{
  let collection = content_collection(&collection)?;
  let data = prepare_write(collection, data, true).map_err(ApiError::Validation)?;
  let crud = Crud::new(state.store.as_ref(), collection);

  if !crud.update(&id, data).await? {
    return Err(not_found(collection, &id));
  }
  crud
    .get(&id)
    .await?
    .map(Json)
    .ok_or_else(|| not_found(collection, &id))
}

/// `DELETE /admin/{collection}/{id}`
pub async fn remove<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore,
{
  let collection = content_collection(&collection)?;
  if Crud::new(state.store.as_ref(), collection).remove(&id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found(collection, &id))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::{StatusCode, header};
  use serde_json::json;
  use showcase_core::store::{Collection, DocumentStore};

  use crate::test_support::{admin_auth, json_body, make_state, send};

  #[tokio::test]
  async fn admin_routes_require_credentials() {
    let state = make_state().await;
    let resp = send(&state, "GET", "/admin/events", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
      resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
      "Basic realm=\"showcase\""
    );

    let resp = send(&state, "GET", "/admin/events", Some("Basic YWRtaW46bm9wZQ=="), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn featured_settings_round_trip() {
    let state = make_state().await;
    let auth = admin_auth();

    let body = json_body(send(&state, "GET", "/admin/settings/featured", Some(&auth), None).await).await;
    assert_eq!(
      body,
      json!({ "featuredEventIds": [], "featuredPostIds": [], "featuredMusicIds": [] })
    );

    let settings = json!({ "featuredEventIds": ["e1"], "featuredPostIds": [], "featuredMusicIds": ["m1", "m2"] });
    let resp = send(&state, "PUT", "/admin/settings/featured", Some(&auth), Some(settings.clone())).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(send(&state, "GET", "/admin/settings/featured", Some(&auth), None).await).await;
    assert_eq!(body, settings);
  }

  #[tokio::test]
  async fn featured_settings_cap_is_enforced() {
    let state = make_state().await;
    let settings = json!({ "featuredPostIds": ["a", "b", "c", "d"] });
    let resp = send(&state, "PUT", "/admin/settings/featured", Some(&admin_auth()), Some(settings)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(state.store.get_document(Collection::Settings, "featured").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn event_crud_lifecycle() {
    let state = make_state().await;
    let auth = admin_auth();

    let resp = send(
      &state,
      "POST",
      "/admin/events",
      Some(&auth),
      Some(json!({ "title": "Recital", "date": "2999-02-01", "location": "Town Hall" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = json_body(resp).await["id"].as_str().unwrap().to_owned();

    // Stored as a store timestamp.
    let raw = state.store.get_document(Collection::Events, &id).await.unwrap().unwrap();
    assert!(raw.data["date"].get("seconds").is_some());

    let uri = format!("/admin/events/{id}");
    let resp = send(&state, "PATCH", &uri, Some(&auth), Some(json!({ "location": "Opera House" }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc = json_body(resp).await;
    assert_eq!(doc["id"], json!(id));
    assert_eq!(doc["title"], json!("Recital"));
    assert_eq!(doc["location"], json!("Opera House"));

    let public = json_body(send(&state, "GET", "/events/upcoming", None, None).await).await;
    assert_eq!(public[0]["location"], json!("Opera House"));

    let resp = send(&state, "DELETE", &uri, Some(&auth), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&state, "GET", &uri, Some(&auth), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn invalid_create_is_422_with_fields() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/admin/videos",
      Some(&admin_auth()),
      Some(json!({ "title": "", "videoURL": "not a url" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert_eq!(body["fields"][0]["field"], json!("title"));
    assert_eq!(body["fields"][1]["field"], json!("videoURL"));
  }

  #[tokio::test]
  async fn unknown_collection_is_400() {
    let state = make_state().await;
    let resp = send(&state, "GET", "/admin/widgets", Some(&admin_auth()), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&state, "GET", "/admin/settings", Some(&admin_auth()), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn patch_missing_document_is_404() {
    let state = make_state().await;
    let resp = send(
      &state,
      "PATCH",
      "/admin/music/nope",
      Some(&admin_auth()),
      Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn mistyped_body_is_a_json_422() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/admin/messages/any/read",
      Some(&admin_auth()),
      Some(json!({ "isRead": "yes" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn stored_settings_with_null_lists_read_as_empty() {
    let state = make_state().await;
    let serde_json::Value::Object(data) = json!({ "featuredEventIds": null, "featuredPostIds": ["p1", 2] })
    else {
      unreachable!()
    };
    state.store.set_document(Collection::Settings, "featured", data).await.unwrap();

    let resp = send(&state, "GET", "/admin/settings/featured", Some(&admin_auth()), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      json_body(resp).await,
      json!({ "featuredEventIds": [], "featuredPostIds": ["p1"], "featuredMusicIds": [] })
    );
  }

  #[tokio::test]
  async fn messages_can_be_listed_and_marked_read() {
    let state = make_state().await;
    let auth = admin_auth();
    let resp = send(
      &state,
      "POST",
      "/contact",
      None,
      Some(json!({ "name": "Grace", "email": "grace@example.com", "message": "Lovely concert!" })),
    )
    .await;
    let id = json_body(resp).await["id"].as_str().unwrap().to_owned();

    let unread = json_body(send(&state, "GET", "/admin/messages?unreadOnly=true", Some(&auth), None).await).await;
    assert_eq!(unread.as_array().unwrap().len(), 1);
    assert_eq!(unread[0]["isRead"], json!(false));

    let uri = format!("/admin/messages/{id}/read");
    let resp = send(&state, "POST", &uri, Some(&auth), Some(json!({ "isRead": true }))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let unread = json_body(send(&state, "GET", "/admin/messages?unreadOnly=true", Some(&auth), None).await).await;
    assert_eq!(unread, json!([]));

    let resp = send(&state, "POST", "/admin/messages/nope/read", Some(&auth), Some(json!({ "isRead": true }))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
