//! Typed read models for the documents the site stores.
//!
//! Documents carry no enforced schema, so every read goes through
//! [`FromDocument`]: the raw field map is checked and coerced into a strict
//! record right after it leaves the store. Date fields are resolved to
//! instants here and serialised back out in canonical ISO-8601 form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::{
  store::{Collection, Document},
  timestamp::{iso, parse_instant},
};

// ─── Coercion ────────────────────────────────────────────────────────────────

/// A stored document whose shape does not fit its record type.
#[derive(Debug, Error)]
#[error("malformed {collection} document {id}: {reason}")]
pub struct ShapeError {
  pub collection: Collection,
  pub id:         String,
  pub reason:     String,
}

/// Conversion from a raw stored document into a typed record.
pub trait FromDocument: Sized {
  const COLLECTION: Collection;

  fn from_document(doc: Document) -> Result<Self, ShapeError>;
}

/// Coerce a batch of documents, logging and skipping any that do not fit.
pub fn coerce_all<T: FromDocument>(docs: Vec<Document>) -> Vec<T> {
  docs
    .into_iter()
    .filter_map(|doc| match T::from_document(doc) {
      Ok(record) => Some(record),
      Err(e) => {
        tracing::warn!(error = %e, "skipping document");
        None
      }
    })
    .collect()
}

fn decode_raw<R: DeserializeOwned>(
  collection: Collection,
  doc: &Document,
) -> Result<R, ShapeError> {
  serde_json::from_value(Value::Object(doc.data.clone())).map_err(|e| ShapeError {
    collection,
    id: doc.id.clone(),
    reason: e.to_string(),
  })
}

/// Optional text fields treat the empty string as absent.
fn non_empty(s: Option<String>) -> Option<String> { s.filter(|s| !s.trim().is_empty()) }

// ─── Event ───────────────────────────────────────────────────────────────────

/// A scheduled performance or appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub id:          String,
  pub title:       String,
  #[serde(with = "iso")]
  pub date:        DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub time:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location:    Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(rename = "ticketURL", skip_serializing_if = "Option::is_none")]
  pub ticket_url:  Option<String>,
}

impl Event {
  /// Whether the event falls on or after `start_of_today`.
  pub fn is_upcoming(&self, start_of_today: DateTime<Utc>) -> bool {
    self.date >= start_of_today
  }
}

#[derive(Deserialize)]
struct RawEvent {
  title:       String,
  #[serde(default)]
  date:        Value,
  #[serde(default)]
  time:        Option<String>,
  #[serde(default)]
  location:    Option<String>,
  #[serde(default)]
  description: Option<String>,
  #[serde(default, rename = "ticketURL")]
  ticket_url:  Option<String>,
}

impl FromDocument for Event {
  const COLLECTION: Collection = Collection::Events;

  fn from_document(doc: Document) -> Result<Self, ShapeError> {
    let raw: RawEvent = decode_raw(Self::COLLECTION, &doc)?;
    // Every event filter keys off the date; an event without one is unusable.
    let date = parse_instant(&raw.date).ok_or_else(|| ShapeError {
      collection: Self::COLLECTION,
      id:         doc.id.clone(),
      reason:     "missing or unparseable `date`".to_owned(),
    })?;
    Ok(Event {
      id: doc.id,
      title: raw.title,
      date,
      time: non_empty(raw.time),
      location: non_empty(raw.location),
      description: non_empty(raw.description),
      ticket_url: non_empty(raw.ticket_url),
    })
  }
}

// ─── Post ────────────────────────────────────────────────────────────────────

/// A news/blog post. `content` is HTML and is passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub id:           String,
  pub title:        String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub excerpt:      Option<String>,
  pub content:      String,
  #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
  pub image_url:    Option<String>,
  pub published:    bool,
  /// `null` when the stored value is missing or malformed.
  #[serde(with = "iso::option")]
  pub publish_date: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags:         Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPost {
  title:        String,
  #[serde(default)]
  excerpt:      Option<String>,
  #[serde(default)]
  content:      String,
  #[serde(default, rename = "imageURL")]
  image_url:    Option<String>,
  #[serde(default)]
  published:    bool,
  #[serde(default)]
  publish_date: Value,
  #[serde(default)]
  tags:         Option<Vec<String>>,
}

impl FromDocument for Post {
  const COLLECTION: Collection = Collection::Posts;

  fn from_document(doc: Document) -> Result<Self, ShapeError> {
    let raw: RawPost = decode_raw(Self::COLLECTION, &doc)?;
    Ok(Post {
      id:           doc.id,
      title:        raw.title,
      excerpt:      non_empty(raw.excerpt),
      content:      raw.content,
      image_url:    non_empty(raw.image_url),
      published:    raw.published,
      publish_date: parse_instant(&raw.publish_date),
      tags:         raw.tags,
    })
  }
}

// ─── Music ───────────────────────────────────────────────────────────────────

/// A released track or album with its streaming links.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Music {
  pub id:              String,
  pub title:           String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub artist:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub album:           Option<String>,
  #[serde(with = "iso::option", skip_serializing_if = "Option::is_none")]
  pub release_date:    Option<DateTime<Utc>>,
  #[serde(rename = "coverImageURL", skip_serializing_if = "Option::is_none")]
  pub cover_image_url: Option<String>,
  #[serde(rename = "spotifyURL", skip_serializing_if = "Option::is_none")]
  pub spotify_url:     Option<String>,
  #[serde(rename = "appleMusicURL", skip_serializing_if = "Option::is_none")]
  pub apple_music_url: Option<String>,
  #[serde(rename = "youtubeURL", skip_serializing_if = "Option::is_none")]
  pub youtube_url:     Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMusic {
  title:           String,
  #[serde(default)]
  artist:          Option<String>,
  #[serde(default)]
  album:           Option<String>,
  #[serde(default)]
  release_date:    Value,
  #[serde(default, rename = "coverImageURL")]
  cover_image_url: Option<String>,
  #[serde(default, rename = "spotifyURL")]
  spotify_url:     Option<String>,
  #[serde(default, rename = "appleMusicURL")]
  apple_music_url: Option<String>,
  #[serde(default, rename = "youtubeURL")]
  youtube_url:     Option<String>,
}

impl FromDocument for Music {
  const COLLECTION: Collection = Collection::Music;

  fn from_document(doc: Document) -> Result<Self, ShapeError> {
    let raw: RawMusic = decode_raw(Self::COLLECTION, &doc)?;
    Ok(Music {
      id:              doc.id,
      title:           raw.title,
      artist:          non_empty(raw.artist),
      album:           non_empty(raw.album),
      release_date:    parse_instant(&raw.release_date),
      cover_image_url: non_empty(raw.cover_image_url),
      spotify_url:     non_empty(raw.spotify_url),
      apple_music_url: non_empty(raw.apple_music_url),
      youtube_url:     non_empty(raw.youtube_url),
    })
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// The artist profile shown on the home and about pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  pub id:                String,
  pub name:              String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title:             Option<String>,
  /// HTML.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bio:               Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tagline:           Option<String>,
  #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
  pub photo_url:         Option<String>,
  #[serde(rename = "profileImageURL", skip_serializing_if = "Option::is_none")]
  pub profile_image_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:             Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone:             Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location:          Option<String>,
}

#[derive(Deserialize)]
struct RawProfile {
  #[serde(default)]
  name:              String,
  #[serde(default)]
  title:             Option<String>,
  #[serde(default)]
  bio:               Option<String>,
  #[serde(default)]
  tagline:           Option<String>,
  #[serde(default, rename = "photoURL")]
  photo_url:         Option<String>,
  #[serde(default, rename = "profileImageURL")]
  profile_image_url: Option<String>,
  #[serde(default)]
  email:             Option<String>,
  #[serde(default)]
  phone:             Option<String>,
  #[serde(default)]
  location:          Option<String>,
}

impl FromDocument for Profile {
  const COLLECTION: Collection = Collection::Profile;

  fn from_document(doc: Document) -> Result<Self, ShapeError> {
    let raw: RawProfile = decode_raw(Self::COLLECTION, &doc)?;
    Ok(Profile {
      id:                doc.id,
      name:              raw.name,
      title:             non_empty(raw.title),
      bio:               non_empty(raw.bio),
      tagline:           non_empty(raw.tagline),
      photo_url:         non_empty(raw.photo_url),
      profile_image_url: non_empty(raw.profile_image_url),
      email:             non_empty(raw.email),
      phone:             non_empty(raw.phone),
      location:          non_empty(raw.location),
    })
  }
}

// ─── Video ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
  pub id:            String,
  pub title:         String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description:   Option<String>,
  #[serde(rename = "thumbnailURL", skip_serializing_if = "Option::is_none")]
  pub thumbnail_url: Option<String>,
  #[serde(rename = "videoURL")]
  pub video_url:     String,
  #[serde(with = "iso::option", skip_serializing_if = "Option::is_none")]
  pub publish_date:  Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVideo {
  title:         String,
  #[serde(default)]
  description:   Option<String>,
  #[serde(default, rename = "thumbnailURL")]
  thumbnail_url: Option<String>,
  #[serde(rename = "videoURL")]
  video_url:     String,
  #[serde(default)]
  publish_date:  Value,
}

impl FromDocument for Video {
  const COLLECTION: Collection = Collection::Videos;

  fn from_document(doc: Document) -> Result<Self, ShapeError> {
    let raw: RawVideo = decode_raw(Self::COLLECTION, &doc)?;
    Ok(Video {
      id:            doc.id,
      title:         raw.title,
      description:   non_empty(raw.description),
      thumbnail_url: non_empty(raw.thumbnail_url),
      video_url:     raw.video_url,
      publish_date:  parse_instant(&raw.publish_date),
    })
  }
}

// ─── Social link ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
  pub id:           String,
  pub platform:     String,
  pub url:          String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
  pub order:        i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSocialLink {
  platform:     String,
  url:          String,
  #[serde(default)]
  display_name: Option<String>,
  #[serde(default)]
  order:        i64,
}

impl FromDocument for SocialLink {
  const COLLECTION: Collection = Collection::SocialLinks;

  fn from_document(doc: Document) -> Result<Self, ShapeError> {
    let raw: RawSocialLink = decode_raw(Self::COLLECTION, &doc)?;
    Ok(SocialLink {
      id:           doc.id,
      platform:     raw.platform,
      url:          raw.url,
      display_name: non_empty(raw.display_name),
      order:        raw.order,
    })
  }
}

// ─── Contact message ─────────────────────────────────────────────────────────

/// A message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
  pub id:         String,
  pub name:       String,
  pub email:      String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subject:    Option<String>,
  pub message:    String,
  pub is_read:    bool,
  #[serde(with = "iso::option")]
  pub created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContactMessage {
  name:       String,
  email:      String,
  #[serde(default)]
  subject:    Option<String>,
  message:    String,
  #[serde(default)]
  is_read:    bool,
  #[serde(default)]
  created_at: Value,
}

impl FromDocument for ContactMessage {
  const COLLECTION: Collection = Collection::ContactMessages;

  fn from_document(doc: Document) -> Result<Self, ShapeError> {
    let raw: RawContactMessage = decode_raw(Self::COLLECTION, &doc)?;
    Ok(ContactMessage {
      id:         doc.id,
      name:       raw.name,
      email:      raw.email,
      subject:    non_empty(raw.subject),
      message:    raw.message,
      is_read:    raw.is_read,
      created_at: parse_instant(&raw.created_at),
    })
  }
}
