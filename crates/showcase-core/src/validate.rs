//! Field validation for admin writes and the public contact form.
//!
//! Validation runs before anything reaches the store and reports every
//! failing field at once, so a form can show all of its errors together.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::{
  featured::{FeaturedSettings, MAX_FEATURED_PER_CATEGORY},
  store::Collection,
  timestamp::{StoreTimestamp, StoredInstant},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

/// Every field-level problem found in one write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn for_field(&self, field: &str) -> Option<&str> {
    self.0.iter().find(|e| e.field == field).map(|e| e.message.as_str())
  }

  fn push(&mut self, field: &str, message: impl Into<String>) {
    self.0.push(FieldError { field: field.to_owned(), message: message.into() });
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, e) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{}: {}", e.field, e.message)?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

// ─── Field checks ────────────────────────────────────────────────────────────

/// Platforms a social link may point at.
pub const SOCIAL_PLATFORMS: &[&str] = &[
  "instagram",
  "spotify",
  "apple-music",
  "linkedin",
  "youtube",
  "facebook",
  "twitter",
  "tiktok",
  "bandcamp",
  "other",
];

/// Checks over a document field map.
///
/// In `partial` mode (merge updates) only the fields present are checked and
/// required fields may be omitted.
struct Checker<'a> {
  data:    &'a Map<String, Value>,
  partial: bool,
  errors:  ValidationErrors,
}

impl<'a> Checker<'a> {
  fn new(data: &'a Map<String, Value>, partial: bool) -> Self {
    Self { data, partial, errors: ValidationErrors::default() }
  }

  /// The field's value, treating `null` and absence alike.
  fn present(&self, field: &str) -> Option<&'a Value> {
    self.data.get(field).filter(|v| !v.is_null())
  }

  fn missing(&mut self, field: &str, label: &str) {
    if !self.partial || self.data.contains_key(field) {
      self.errors.push(field, format!("{label} is required"));
    }
  }

  fn text(&mut self, field: &str, label: &str, min: usize, max: usize) {
    match self.present(field) {
      None => {
        if min > 0 {
          self.missing(field, label);
        }
      }
      Some(Value::String(s)) => {
        let len = s.trim().chars().count();
        if min > 0 && len == 0 {
          self.errors.push(field, format!("{label} is required"));
        } else if len < min {
          self.errors.push(field, format!("{label} must be at least {min} characters"));
        } else if s.chars().count() > max {
          self.errors.push(field, format!("{label} is too long"));
        }
      }
      Some(_) => self.errors.push(field, format!("{label} must be text")),
    }
  }

  fn url(&mut self, field: &str, label: &str, required: bool) {
    match self.present(field) {
      Some(Value::String(s)) if s.trim().is_empty() => {
        if required {
          self.errors.push(field, format!("{label} is required"));
        }
      }
      Some(Value::String(s)) => {
        if !is_web_url(s) {
          self.errors.push(field, "Invalid URL format");
        }
      }
      Some(_) => self.errors.push(field, "Invalid URL format"),
      None => {
        if required {
          self.missing(field, label);
        }
      }
    }
  }

  fn date(&mut self, field: &str, label: &str, required: bool) {
    match self.present(field).map(StoredInstant::from_value) {
      None | Some(StoredInstant::Absent) => {
        if required {
          self.missing(field, label);
        }
      }
      Some(instant) => {
        if instant.to_instant().is_err() {
          self.errors.push(field, format!("{label} is not a valid date"));
        }
      }
    }
  }

  fn boolean(&mut self, field: &str, label: &str, required: bool) {
    match self.present(field) {
      Some(Value::Bool(_)) => {}
      Some(_) => self.errors.push(field, format!("{label} must be true or false")),
      None => {
        if required {
          self.missing(field, label);
        }
      }
    }
  }

  fn one_of(&mut self, field: &str, label: &str, allowed: &[&str]) {
    match self.present(field) {
      Some(Value::String(s)) if allowed.contains(&s.as_str()) => {}
      Some(_) => self.errors.push(field, format!("{label} must be one of: {}", allowed.join(", "))),
      None => self.missing(field, label),
    }
  }

  fn integer(&mut self, field: &str, label: &str) {
    match self.present(field) {
      Some(v) if v.is_i64() || v.is_u64() => {}
      Some(_) => self.errors.push(field, format!("{label} must be a whole number")),
      None => {}
    }
  }

  fn email(&mut self, field: &str, label: &str) {
    match self.present(field) {
      Some(Value::String(s)) if is_email(s) => {}
      Some(_) => self.errors.push(field, "Invalid email address"),
      None => self.missing(field, label),
    }
  }

  fn string_list(&mut self, field: &str, label: &str) {
    match self.present(field) {
      Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
      Some(_) => self.errors.push(field, format!("{label} must be a list of text")),
      None => {}
    }
  }

  fn finish(self) -> Result<(), ValidationErrors> {
    if self.errors.is_empty() { Ok(()) } else { Err(self.errors) }
  }
}

/// An absolute `http`/`https` URL.
pub fn is_web_url(s: &str) -> bool {
  Url::parse(s.trim())
    .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
    .unwrap_or(false)
}

fn is_email(s: &str) -> bool {
  let s = s.trim();
  match s.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.contains(char::is_whitespace)
    }
    None => false,
  }
}

// ─── Per-collection rules ────────────────────────────────────────────────────

/// Validate a write to `collection`. `partial` is set for merge updates.
pub fn validate_document(
  collection: Collection,
  data: &Map<String, Value>,
  partial: bool,
) -> Result<(), ValidationErrors> {
  let mut c = Checker::new(data, partial);
  match collection {
    Collection::Events => {
      c.text("title", "Title", 1, 200);
      c.date("date", "Date", true);
      c.text("time", "Time", 0, 20);
      c.text("location", "Location", 0, 200);
      c.text("description", "Description", 0, 1000);
      c.url("ticketURL", "Ticket URL", false);
    }
    Collection::Posts => {
      c.text("title", "Title", 1, 200);
      c.text("excerpt", "Excerpt", 0, 500);
      c.text("content", "Content", 1, 100_000);
      c.url("imageURL", "Image URL", false);
      c.boolean("published", "Published", true);
      c.date("publishDate", "Publish date", true);
      c.string_list("tags", "Tags");
    }
    Collection::Music => {
      c.text("title", "Title", 1, 200);
      c.text("artist", "Artist", 0, 200);
      c.text("album", "Album", 0, 200);
      c.date("releaseDate", "Release date", false);
      for (field, label) in [
        ("coverImageURL", "Cover image URL"),
        ("spotifyURL", "Spotify URL"),
        ("appleMusicURL", "Apple Music URL"),
        ("youtubeURL", "YouTube URL"),
      ] {
        c.url(field, label, false);
      }
    }
    Collection::Videos => {
      c.text("title", "Title", 1, 200);
      c.text("description", "Description", 0, 1000);
      c.url("videoURL", "Video URL", true);
      c.url("thumbnailURL", "Thumbnail URL", false);
      c.date("publishDate", "Publish date", false);
    }
    Collection::SocialLinks => {
      c.one_of("platform", "Platform", SOCIAL_PLATFORMS);
      c.url("url", "URL", true);
      c.text("displayName", "Display name", 0, 100);
      c.integer("order", "Order");
    }
    Collection::Profile => {
      c.text("name", "Name", 1, 100);
      c.text("title", "Title", 0, 200);
      c.text("tagline", "Tagline", 0, 200);
      c.text("bio", "Bio", 0, 5000);
      c.url("photoURL", "Photo URL", false);
      c.url("profileImageURL", "Profile image URL", false);
      c.text("phone", "Phone", 0, 50);
      c.text("location", "Location", 0, 200);
      if c.present("email").is_some_and(|v| v.as_str().is_some_and(|s| !s.trim().is_empty())) {
        c.email("email", "Email");
      }
    }
    Collection::ContactMessages => {
      c.text("name", "Name", 1, 100);
      c.email("email", "Email");
      c.text("subject", "Subject", 0, 200);
      c.text("message", "Message", 10, 2000);
      c.boolean("isRead", "Read flag", false);
    }
    Collection::Settings => {}
  }
  c.finish()
}

/// Enforce the per-category cap the admin screens apply.
pub fn validate_featured_settings(settings: &FeaturedSettings) -> Result<(), ValidationErrors> {
  let mut errors = ValidationErrors::default();
  for (field, ids) in [
    ("featuredEventIds", &settings.featured_event_ids),
    ("featuredPostIds", &settings.featured_post_ids),
    ("featuredMusicIds", &settings.featured_music_ids),
  ] {
    if ids.len() > MAX_FEATURED_PER_CATEGORY {
      errors.push(field, format!("at most {MAX_FEATURED_PER_CATEGORY} items can be featured"));
    }
  }
  if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate a write and bring it into stored form.
///
/// Event dates are stored as store timestamps regardless of how the form
/// submitted them.
pub fn prepare_write(
  collection: Collection,
  mut data: Map<String, Value>,
  partial: bool,
) -> Result<Map<String, Value>, ValidationErrors> {
  validate_document(collection, &data, partial)?;

  if collection == Collection::Events {
    if let Some(dt) = data
      .get("date")
      .and_then(|v| StoredInstant::from_value(v).to_instant().ok().flatten())
    {
      data.insert("date".to_owned(), StoreTimestamp::from_datetime(dt).to_value());
    }
  }
  Ok(data)
}
