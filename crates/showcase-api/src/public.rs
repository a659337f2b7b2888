//! Handlers for the public read surface and the contact form.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/featured` | `?eventsLimit&postsLimit&musicLimit`, each defaults to 3 |
//! | `GET`  | `/events/upcoming` | `?limit`, default 10 |
//! | `GET`  | `/events/past` | `?limit`, newest first |
//! | `GET`  | `/posts/recent` | `?limit`, default 10 |
//! | `GET`  | `/posts` | every published post |
//! | `GET`  | `/music/featured` | `?limit`, default 10 |
//! | `GET`  | `/music` | newest release first |
//! | `GET`  | `/profile` | `null` when no profile exists |
//! | `GET`  | `/videos` | newest first |
//! | `GET`  | `/social-links` | by `order` |
//! | `POST` | `/contact` | `{"name","email","subject"?,"message"}` |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use showcase_core::{
  contact::{ContactForm, submit_contact_message},
  record::{Event, Music, Post, Profile, SocialLink, Video},
  resolve::{EventWindow, FeaturedContent, FeaturedLimits},
  store::DocumentStore,
};

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, QueryParams},
};

// ─── Featured ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedParams {
  pub events_limit: Option<usize>,
  pub posts_limit:  Option<usize>,
  pub music_limit:  Option<usize>,
}

/// `GET /featured`
pub async fn featured<S>(
  State(state): State<AppState<S>>,
  QueryParams(params): QueryParams<FeaturedParams>,
) -> Result<Json<FeaturedContent>, ApiError>
where
  S: DocumentStore,
{
  let limits = FeaturedLimits::new(params.events_limit, params.posts_limit, params.music_limit);
  Ok(Json(state.resolver().get_featured_content(limits).await?))
}

// ─── Single categories ───────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
  pub limit: Option<usize>,
}

/// `GET /events/upcoming[?limit=<n>]`
pub async fn upcoming_events<S>(
  State(state): State<AppState<S>>,
  QueryParams(params): QueryParams<LimitParams>,
) -> Result<Json<Vec<Event>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.resolver().get_upcoming_events(params.limit).await?))
}

/// `GET /events/past[?limit=<n>]`
pub async fn past_events<S>(
  State(state): State<AppState<S>>,
  QueryParams(params): QueryParams<LimitParams>,
) -> Result<Json<Vec<Event>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.resolver().list_events(EventWindow::Past, params.limit).await?))
}

/// `GET /posts/recent[?limit=<n>]`
pub async fn recent_posts<S>(
  State(state): State<AppState<S>>,
  QueryParams(params): QueryParams<LimitParams>,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.resolver().get_recent_posts(params.limit).await?))
}

/// `GET /posts`
pub async fn published_posts<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Post>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.resolver().list_published_posts().await?))
}

/// `GET /music/featured[?limit=<n>]`
pub async fn featured_music<S>(
  State(state): State<AppState<S>>,
  QueryParams(params): QueryParams<LimitParams>,
) -> Result<Json<Vec<Music>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.resolver().get_featured_music(params.limit).await?))
}

/// `GET /music`
pub async fn music<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Music>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.resolver().list_music().await?))
}

/// `GET /profile`
pub async fn profile<S>(State(state): State<AppState<S>>) -> Result<Json<Option<Profile>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.resolver().get_profile().await?))
}

/// `GET /videos`
pub async fn videos<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Video>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.resolver().list_videos().await?))
}

/// `GET /social-links`
pub async fn social_links<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<SocialLink>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(state.resolver().list_social_links().await?))
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// `POST /contact`
pub async fn contact<S>(
  State(state): State<AppState<S>>,
  JsonBody(form): JsonBody<ContactForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let id = submit_contact_message(state.store.as_ref(), &form).await?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use serde_json::{Value, json};
  use showcase_core::store::{Collection, DocumentStore};

  use crate::test_support::{json_body, make_state, send};

  async fn seed(state: &crate::AppState<showcase_store_sqlite::SqliteStore>, c: Collection, id: &str, v: Value) {
    let Value::Object(map) = v else { panic!("documents must be objects") };
    state.store.set_document(c, id, map).await.unwrap();
  }

  #[tokio::test]
  async fn featured_falls_back_when_nothing_is_curated() {
    let state = make_state().await;
    seed(&state, Collection::Events, "old", json!({ "title": "Old", "date": "2000-01-01" })).await;
    seed(&state, Collection::Events, "e1", json!({ "title": "Later", "date": "2999-03-01" })).await;
    seed(&state, Collection::Events, "e2", json!({ "title": "Sooner", "date": "2999-01-01" })).await;
    seed(
      &state,
      Collection::Posts,
      "p1",
      json!({ "title": "Hello", "content": "x", "published": true, "publishDate": "2024-06-01T10:00" }),
    )
    .await;
    seed(&state, Collection::Profile, "me", json!({ "name": "Ada" })).await;

    let resp = send(&state, "GET", "/featured", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;

    let titles: Vec<_> = body["upcomingEvents"]
      .as_array()
      .unwrap()
      .iter()
      .map(|e| e["title"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(titles, ["Sooner", "Later"]);
    assert_eq!(body["upcomingEvents"][0]["date"], json!("2999-01-01T00:00:00.000Z"));
    assert_eq!(body["recentPosts"][0]["id"], json!("p1"));
    assert_eq!(body["featuredMusic"], json!([]));
    assert_eq!(body["profile"]["name"], json!("Ada"));
  }

  #[tokio::test]
  async fn featured_limits_come_from_query() {
    let state = make_state().await;
    for (id, date) in [("a", "2999-01-01"), ("b", "2999-01-02"), ("c", "2999-01-03")] {
      seed(&state, Collection::Events, id, json!({ "title": id, "date": date })).await;
    }

    let body = json_body(send(&state, "GET", "/featured?eventsLimit=1", None, None).await).await;
    assert_eq!(body["upcomingEvents"].as_array().unwrap().len(), 1);

    let body = json_body(send(&state, "GET", "/featured?eventsLimit=0", None, None).await).await;
    assert_eq!(body["upcomingEvents"], json!([]));
  }

  #[tokio::test]
  async fn profile_is_null_when_absent() {
    let state = make_state().await;
    let body = json_body(send(&state, "GET", "/profile", None, None).await).await;
    assert_eq!(body, Value::Null);
  }

  #[tokio::test]
  async fn upcoming_and_past_events() {
    let state = make_state().await;
    seed(&state, Collection::Events, "past", json!({ "title": "Past", "date": "2001-05-01" })).await;
    seed(&state, Collection::Events, "next", json!({ "title": "Next", "date": "2999-05-01" })).await;

    let up = json_body(send(&state, "GET", "/events/upcoming", None, None).await).await;
    assert_eq!(up.as_array().unwrap().len(), 1);
    assert_eq!(up[0]["id"], json!("next"));

    let past = json_body(send(&state, "GET", "/events/past?limit=5", None, None).await).await;
    assert_eq!(past[0]["id"], json!("past"));
  }

  #[tokio::test]
  async fn bad_limit_is_rejected() {
    let state = make_state().await;
    let resp = send(&state, "GET", "/posts/recent?limit=-1", None, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn contact_form_missing_field_is_a_json_error() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/contact",
      None,
      Some(json!({ "name": "Grace", "message": "Are you free in July?" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert!(body["error"].as_str().unwrap().contains("email"));
  }

  #[tokio::test]
  async fn contact_form_stores_message() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/contact",
      None,
      Some(json!({ "name": "Grace", "email": "grace@example.com", "message": "Are you free in July?" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = json_body(resp).await["id"].as_str().unwrap().to_owned();

    let doc = state
      .store
      .get_document(Collection::ContactMessages, &id)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(doc.data["isRead"], json!(false));
  }

  #[tokio::test]
  async fn contact_form_validation_errors_are_422() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/contact",
      None,
      Some(json!({ "name": "Grace", "email": "not-an-email", "message": "short" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert_eq!(body["error"], json!("validation failed"));
    let fields: Vec<_> = body["fields"]
      .as_array()
      .unwrap()
      .iter()
      .map(|f| f["field"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(fields, ["email", "message"]);
  }
}
