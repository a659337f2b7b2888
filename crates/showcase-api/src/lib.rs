//! JSON HTTP API for the showcase site.
//!
//! Exposes an axum [`Router`] backed by any [`DocumentStore`]: the public
//! read surface used by the site, the contact form, and a Basic-auth guarded
//! admin area for content and featured-settings writes.

pub mod admin;
pub mod auth;
pub mod error;
pub mod extract;
pub mod public;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use showcase_core::{
  resolve::{CurationOrder, ResolveOptions, Resolver},
  store::DocumentStore,
};

pub use error::ApiError;

use auth::AuthConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  /// Order of curated featured items; `scan` unless configured.
  #[serde(default)]
  pub curation_order:     CurationOrder,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: DocumentStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

impl<S: DocumentStore> AppState<S> {
  /// A resolver anchored at the start of the current local day.
  pub fn resolver(&self) -> Resolver<'_, S> {
    Resolver::new(self.store.as_ref(), ResolveOptions::today(self.config.curation_order))
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full router: public routes at the root, admin under `/admin`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: DocumentStore + Clone + 'static,
{
  Router::new()
    // Public
    .route("/featured", get(public::featured::<S>))
    .route("/events/upcoming", get(public::upcoming_events::<S>))
    .route("/events/past", get(public::past_events::<S>))
    .route("/posts/recent", get(public::recent_posts::<S>))
    .route("/posts", get(public::published_posts::<S>))
    .route("/music/featured", get(public::featured_music::<S>))
    .route("/music", get(public::music::<S>))
    .route("/profile", get(public::profile::<S>))
    .route("/videos", get(public::videos::<S>))
    .route("/social-links", get(public::social_links::<S>))
    .route("/contact", post(public::contact::<S>))
    // Admin
    .route(
      "/admin/settings/featured",
      get(admin::get_featured_settings::<S>).put(admin::put_featured_settings::<S>),
    )
    .route("/admin/messages", get(admin::list_messages::<S>))
    .route("/admin/messages/{id}/read", post(admin::mark_message::<S>))
    .route("/admin/{collection}", get(admin::list::<S>).post(admin::create::<S>))
    .route(
      "/admin/{collection}/{id}",
      get(admin::get_one::<S>)
        .patch(admin::update::<S>)
        .delete(admin::remove::<S>),
    )
    .with_state(state)
}
