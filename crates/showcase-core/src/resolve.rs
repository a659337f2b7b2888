//! Read-side resolvers for the public pages.
//!
//! [`Resolver::get_featured_content`] builds the home-page payload. Each of
//! its three content categories resolves independently through two tiers:
//!
//! 1. **Curated.** If the admin listed ids for the category, the whole
//!    collection is scanned and only those ids are kept. Events must still be
//!    upcoming and posts must still be published; a curated id whose document
//!    no longer exists simply drops out.
//! 2. **Fallback.** Otherwise a default ordering query runs: soonest upcoming
//!    events, newest published posts, the first music documents.
//!
//! Limits are applied last, after all filtering. A resolver holds no state
//! between calls beyond its options; every call re-reads the store.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  featured::{FeaturedSettings, load_featured_settings},
  record::{Event, FromDocument, Music, Post, Profile, SocialLink, Video, coerce_all},
  store::{Collection, Direction, Document, DocumentQuery, DocumentStore},
  timestamp::start_of_local_day,
};

/// Per-category default for the home-page payload.
pub const DEFAULT_FEATURED_LIMIT: usize = 3;

/// Default for the single-category listing queries.
pub const DEFAULT_CATEGORY_LIMIT: usize = 10;

// ─── Options ─────────────────────────────────────────────────────────────────

/// Order in which curated documents are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurationOrder {
  /// The order the collection scan yields them in (ascending id). The admin's
  /// list order is ignored. This is the long-standing behaviour.
  #[default]
  Scan,
  /// The order the admin listed the ids in.
  Curated,
}

/// Per-category result limits for [`Resolver::get_featured_content`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturedLimits {
  pub events: usize,
  pub posts:  usize,
  pub music:  usize,
}

impl Default for FeaturedLimits {
  fn default() -> Self {
    Self {
      events: DEFAULT_FEATURED_LIMIT,
      posts:  DEFAULT_FEATURED_LIMIT,
      music:  DEFAULT_FEATURED_LIMIT,
    }
  }
}

impl FeaturedLimits {
  /// Fill unspecified limits with [`DEFAULT_FEATURED_LIMIT`]. An explicit
  /// zero is honoured.
  pub fn new(events: Option<usize>, posts: Option<usize>, music: Option<usize>) -> Self {
    Self {
      events: events.unwrap_or(DEFAULT_FEATURED_LIMIT),
      posts:  posts.unwrap_or(DEFAULT_FEATURED_LIMIT),
      music:  music.unwrap_or(DEFAULT_FEATURED_LIMIT),
    }
  }
}

/// Request-scoped inputs shared by every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
  /// Events dated before this instant are past.
  pub start_of_today: DateTime<Utc>,
  pub curation_order: CurationOrder,
}

impl ResolveOptions {
  /// Options anchored at the start of the current local day.
  pub fn today(curation_order: CurationOrder) -> Self {
    Self {
      start_of_today: start_of_local_day(Local::now()),
      curation_order,
    }
  }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// The home-page payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedContent {
  pub upcoming_events: Vec<Event>,
  pub recent_posts:    Vec<Post>,
  pub featured_music:  Vec<Music>,
  pub profile:         Option<Profile>,
}

/// Which side of today an events listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventWindow {
  Upcoming,
  Past,
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Read-only query surface over a [`DocumentStore`].
pub struct Resolver<'s, S> {
  store: &'s S,
  opts:  ResolveOptions,
}

impl<'s, S: DocumentStore> Resolver<'s, S> {
  pub fn new(store: &'s S, opts: ResolveOptions) -> Self { Self { store, opts } }

  // ── Home page ─────────────────────────────────────────────────────────

  /// Load the featured settings, then aggregate the home-page payload.
  pub async fn get_featured_content(&self, limits: FeaturedLimits) -> Result<FeaturedContent> {
    let settings = load_featured_settings(self.store).await?;
    self.aggregate(settings.as_ref(), limits).await
  }

  /// Aggregate the home-page payload from an explicit settings snapshot.
  ///
  /// `None` is treated exactly like settings with three empty lists. The
  /// category reads run concurrently; any failing read fails the whole call.
  pub async fn aggregate(
    &self,
    settings: Option<&FeaturedSettings>,
    limits: FeaturedLimits,
  ) -> Result<FeaturedContent> {
    let empty = FeaturedSettings::default();
    let settings = settings.unwrap_or(&empty);

    let (upcoming_events, recent_posts, featured_music, profile) = tokio::try_join!(
      self.featured_events(&settings.featured_event_ids, limits.events),
      self.featured_posts(&settings.featured_post_ids, limits.posts),
      self.featured_music_selection(&settings.featured_music_ids, limits.music),
      self.get_profile(),
    )?;

    tracing::debug!(
      curated = !settings.is_empty(),
      events = upcoming_events.len(),
      posts = recent_posts.len(),
      music = featured_music.len(),
      has_profile = profile.is_some(),
      "aggregated featured content"
    );

    Ok(FeaturedContent { upcoming_events, recent_posts, featured_music, profile })
  }

  async fn featured_events(&self, ids: &[String], limit: usize) -> Result<Vec<Event>> {
    if ids.is_empty() {
      return self.get_upcoming_events(Some(limit)).await;
    }
    let docs = self.curated(Collection::Events, ids).await?;
    Ok(
      coerce_all::<Event>(docs)
        .into_iter()
        .filter(|e| e.is_upcoming(self.opts.start_of_today))
        .take(limit)
        .collect(),
    )
  }

  async fn featured_posts(&self, ids: &[String], limit: usize) -> Result<Vec<Post>> {
    let docs = if ids.is_empty() {
      let query = DocumentQuery::new().order_by("publishDate", Direction::Desc);
      self.query(Collection::Posts, &query).await?
    } else {
      self.curated(Collection::Posts, ids).await?
    };
    Ok(
      coerce_all::<Post>(docs)
        .into_iter()
        .filter(|p| p.published)
        .take(limit)
        .collect(),
    )
  }

  async fn featured_music_selection(&self, ids: &[String], limit: usize) -> Result<Vec<Music>> {
    if ids.is_empty() {
      return self.get_featured_music(Some(limit)).await;
    }
    let docs = self.curated(Collection::Music, ids).await?;
    Ok(coerce_all::<Music>(docs).into_iter().take(limit).collect())
  }

  /// Scan `collection` and keep the documents whose ids are in `ids`.
  async fn curated(&self, collection: Collection, ids: &[String]) -> Result<Vec<Document>> {
    let all = self
      .store
      .get_all_documents(collection)
      .await
      .map_err(Error::store)?;
    Ok(select_curated(collection, all, ids, self.opts.curation_order))
  }

  // ── Single-category queries ───────────────────────────────────────────

  /// Events on or after today, soonest first.
  pub async fn get_upcoming_events(&self, limit: Option<usize>) -> Result<Vec<Event>> {
    let limit = limit.unwrap_or(DEFAULT_CATEGORY_LIMIT);
    let query = DocumentQuery::new().order_by("date", Direction::Asc);
    let docs = self.query(Collection::Events, &query).await?;
    Ok(
      coerce_all::<Event>(docs)
        .into_iter()
        .filter(|e| e.is_upcoming(self.opts.start_of_today))
        .take(limit)
        .collect(),
    )
  }

  /// Events before today, most recent first.
  pub async fn get_past_events(&self, limit: Option<usize>) -> Result<Vec<Event>> {
    let limit = limit.unwrap_or(DEFAULT_CATEGORY_LIMIT);
    let query = DocumentQuery::new().order_by("date", Direction::Desc);
    let docs = self.query(Collection::Events, &query).await?;
    Ok(
      coerce_all::<Event>(docs)
        .into_iter()
        .filter(|e| !e.is_upcoming(self.opts.start_of_today))
        .take(limit)
        .collect(),
    )
  }

  pub async fn list_events(&self, window: EventWindow, limit: Option<usize>) -> Result<Vec<Event>> {
    match window {
      EventWindow::Upcoming => self.get_upcoming_events(limit).await,
      EventWindow::Past => self.get_past_events(limit).await,
    }
  }

  /// Newest published posts. Filter, order and limit all run in the store.
  pub async fn get_recent_posts(&self, limit: Option<usize>) -> Result<Vec<Post>> {
    let query = DocumentQuery::new()
      .where_eq("published", true)
      .order_by("publishDate", Direction::Desc)
      .limit(limit.unwrap_or(DEFAULT_CATEGORY_LIMIT));
    let docs = self.query(Collection::Posts, &query).await?;
    Ok(coerce_all(docs))
  }

  /// Every published post, newest first.
  pub async fn list_published_posts(&self) -> Result<Vec<Post>> {
    let query = DocumentQuery::new()
      .where_eq("published", true)
      .order_by("publishDate", Direction::Desc);
    let docs = self.query(Collection::Posts, &query).await?;
    Ok(coerce_all(docs))
  }

  /// The first music documents in store order; no filtering.
  pub async fn get_featured_music(&self, limit: Option<usize>) -> Result<Vec<Music>> {
    let query = DocumentQuery::new().limit(limit.unwrap_or(DEFAULT_CATEGORY_LIMIT));
    let docs = self.query(Collection::Music, &query).await?;
    Ok(coerce_all(docs))
  }

  /// The music catalogue, newest release first.
  pub async fn list_music(&self) -> Result<Vec<Music>> {
    let query = DocumentQuery::new().order_by("releaseDate", Direction::Desc);
    self.list(Collection::Music, &query).await
  }

  pub async fn list_videos(&self) -> Result<Vec<Video>> {
    let query = DocumentQuery::new().order_by("createdAt", Direction::Desc);
    self.list(Collection::Videos, &query).await
  }

  pub async fn list_social_links(&self) -> Result<Vec<SocialLink>> {
    let query = DocumentQuery::new().order_by("order", Direction::Asc);
    self.list(Collection::SocialLinks, &query).await
  }

  /// The first well-formed document of the profile collection, if any.
  pub async fn get_profile(&self) -> Result<Option<Profile>> {
    let docs = self.query(Collection::Profile, &DocumentQuery::new()).await?;
    Ok(coerce_all(docs).into_iter().next())
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  async fn query(&self, collection: Collection, query: &DocumentQuery) -> Result<Vec<Document>> {
    self
      .store
      .query_documents(collection, query)
      .await
      .map_err(Error::store)
  }

  async fn list<T: FromDocument>(&self, collection: Collection, query: &DocumentQuery) -> Result<Vec<T>> {
    Ok(coerce_all(self.query(collection, query).await?))
  }
}

/// Keep the documents named in `ids`, in the requested order.
fn select_curated(
  collection: Collection,
  docs: Vec<Document>,
  ids: &[String],
  order: CurationOrder,
) -> Vec<Document> {
  let mut kept: Vec<Document> = docs.into_iter().filter(|d| ids.contains(&d.id)).collect();

  if kept.len() < ids.len() {
    let dangling: Vec<&str> = ids
      .iter()
      .filter(|id| !kept.iter().any(|d| &d.id == *id))
      .map(String::as_str)
      .collect();
    tracing::debug!(%collection, ?dangling, "curated ids without documents");
  }

  if order == CurationOrder::Curated {
    kept.sort_by_key(|d| ids.iter().position(|id| *id == d.id));
  }
  kept
}
