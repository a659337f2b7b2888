//! Timestamp normalisation.
//!
//! Date fields arrive from the document store in one of several shapes:
//!
//! | Shape | JSON encoding |
//! |-------|---------------|
//! | store timestamp | `{"seconds": 1714521600, "nanoseconds": 0}` (or `_seconds` / `_nanoseconds`) |
//! | native instant  | `{"$date": "2024-05-01T00:00:00Z"}` or `{"$date": 1714521600000}` |
//! | raw text        | `"2024-05-01T19:30"`, `"2024-05-01"`, RFC 3339 |
//! | raw epoch       | `1714521600000` (milliseconds) |
//!
//! [`StoredInstant::from_value`] classifies a field once at the ingestion
//! boundary; everything downstream works with `DateTime<Utc>` and emits the
//! canonical ISO-8601 form produced by [`to_iso`].

use chrono::{
  DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ─── Store timestamp ─────────────────────────────────────────────────────────

/// The document store's own timestamp object. Write paths stamp
/// `createdAt` / `updatedAt` with this shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTimestamp {
  #[serde(alias = "_seconds")]
  pub seconds:     i64,
  #[serde(default, alias = "_nanoseconds")]
  pub nanoseconds: u32,
}

impl StoreTimestamp {
  pub fn now() -> Self { Self::from_datetime(Utc::now()) }

  pub fn from_datetime(dt: DateTime<Utc>) -> Self {
    Self {
      seconds:     dt.timestamp(),
      nanoseconds: dt.timestamp_subsec_nanos(),
    }
  }

  /// Convert to a native instant. `None` if the value is out of range.
  pub fn to_datetime(self) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(self.seconds, self.nanoseconds)
  }

  /// The JSON value written into documents.
  pub fn to_value(self) -> Value {
    serde_json::json!({ "seconds": self.seconds, "nanoseconds": self.nanoseconds })
  }
}

// ─── Classification ──────────────────────────────────────────────────────────

/// A stored date value, classified by representation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredInstant {
  /// Missing, `null`, or the empty string.
  Absent,
  /// The store's timestamp object; converts directly to an instant.
  Timestamp(StoreTimestamp),
  /// A `{"$date": ...}` wrapper around an instant.
  Native(Value),
  /// A string to be parsed.
  Text(String),
  /// Milliseconds since the Unix epoch.
  EpochMillis(f64),
  /// Any other JSON shape.
  Unrecognized(Value),
}

/// A stored date that could not be interpreted as an instant.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("malformed date value: {0}")]
pub struct MalformedDate(pub String);

impl StoredInstant {
  pub fn from_value(value: &Value) -> Self {
    match value {
      Value::Null => StoredInstant::Absent,
      Value::String(s) if s.trim().is_empty() => StoredInstant::Absent,
      Value::String(s) => StoredInstant::Text(s.clone()),
      Value::Number(n) => match n.as_f64() {
        Some(ms) => StoredInstant::EpochMillis(ms),
        None => StoredInstant::Unrecognized(value.clone()),
      },
      Value::Object(map) => {
        if let Some(inner) = map.get("$date") {
          return StoredInstant::Native(inner.clone());
        }
        if map.contains_key("seconds") || map.contains_key("_seconds") {
          if let Ok(ts) = serde_json::from_value::<StoreTimestamp>(value.clone()) {
            return StoredInstant::Timestamp(ts);
          }
        }
        StoredInstant::Unrecognized(value.clone())
      }
      _ => StoredInstant::Unrecognized(value.clone()),
    }
  }

  /// Resolve to an instant. `Ok(None)` for [`StoredInstant::Absent`].
  pub fn to_instant(&self) -> Result<Option<DateTime<Utc>>, MalformedDate> {
    let malformed = || MalformedDate(self.describe());
    match self {
      StoredInstant::Absent => Ok(None),
      StoredInstant::Timestamp(ts) => ts.to_datetime().map(Some).ok_or_else(malformed),
      StoredInstant::Native(inner) => match inner {
        Value::String(s) => parse_text(s).map(Some).ok_or_else(malformed),
        Value::Number(n) => n
          .as_f64()
          .and_then(from_epoch_millis)
          .map(Some)
          .ok_or_else(malformed),
        _ => Err(malformed()),
      },
      StoredInstant::Text(s) => parse_text(s).map(Some).ok_or_else(malformed),
      StoredInstant::EpochMillis(ms) => {
        from_epoch_millis(*ms).map(Some).ok_or_else(malformed)
      }
      StoredInstant::Unrecognized(_) => Err(malformed()),
    }
  }

  fn describe(&self) -> String {
    match self {
      StoredInstant::Absent => "<absent>".to_owned(),
      StoredInstant::Timestamp(ts) => format!("{ts:?}"),
      StoredInstant::Native(v) | StoredInstant::Unrecognized(v) => v.to_string(),
      StoredInstant::Text(s) => format!("{s:?}"),
      StoredInstant::EpochMillis(ms) => ms.to_string(),
    }
  }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

fn from_epoch_millis(ms: f64) -> Option<DateTime<Utc>> {
  if !ms.is_finite() {
    return None;
  }
  DateTime::from_timestamp_millis(ms.trunc() as i64)
}

const NAIVE_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
];

/// Parse a textual date the way the admin forms wrote them: full RFC 3339,
/// offset-less date-times in local time, and bare dates as UTC midnight.
fn parse_text(s: &str) -> Option<DateTime<Utc>> {
  let s = s.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }

  for fmt in NAIVE_FORMATS {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
      return Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc));
    }
  }

  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Canonical ISO-8601 rendering: UTC, millisecond precision, `Z` suffix.
pub fn to_iso(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse any stored date representation into an instant.
///
/// Malformed values are logged and mapped to `None`.
pub fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
  match StoredInstant::from_value(value).to_instant() {
    Ok(dt) => dt,
    Err(e) => {
      tracing::warn!(error = %e, "ignoring unparseable stored date");
      None
    }
  }
}

/// Normalise any stored date representation to its ISO-8601 string.
///
/// Returns `None` for absent values and for values that cannot be parsed.
pub fn normalize(value: &Value) -> Option<String> { parse_instant(value).map(to_iso) }

/// Start of the current local day, as a UTC instant.
pub fn start_of_local_day(now: DateTime<Local>) -> DateTime<Utc> {
  let midnight = now.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default();
  Local
    .from_local_datetime(&midnight)
    .earliest()
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_else(|| now.with_timezone(&Utc))
}

/// Serde helpers emitting an instant as its canonical ISO-8601 string.
pub mod iso {
  use chrono::{DateTime, Utc};
  use serde::Serializer;

  pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&super::to_iso(*dt))
  }

  pub mod option {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
      dt: &Option<DateTime<Utc>>,
      s: S,
    ) -> Result<S::Ok, S::Error> {
      match dt {
        Some(dt) => s.serialize_str(&crate::timestamp::to_iso(*dt)),
        None => s.serialize_none(),
      }
    }
  }
}
