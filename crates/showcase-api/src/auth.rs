//! HTTP Basic-auth guard for the admin routes.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use showcase_core::store::DocumentStore;

use crate::{AppState, error::ApiError};

/// The single admin account.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Present in a handler's arguments means the request carried admin credentials.
pub struct Authenticated;

/// Split an `Authorization` value into `(username, password)`.
///
/// The scheme name is matched case-insensitively. The password may itself
/// contain `:`.
fn basic_credentials(value: &str) -> Option<(String, String)> {
  let (scheme, encoded) = value.trim().split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("basic") {
    return None;
  }
  let decoded = B64.decode(encoded.trim()).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (username, password) = creds.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

/// Check the admin credentials in `headers` against `config`.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), ApiError> {
  let (username, password) = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(basic_credentials)
    .ok_or(ApiError::Unauthorized)?;

  if username != config.username {
    tracing::warn!(%username, "admin login with unknown username");
    return Err(ApiError::Unauthorized);
  }

  let hash = PasswordHash::new(&config.password_hash).map_err(|e| {
    tracing::error!(error = %e, "configured password hash is not a valid PHC string");
    ApiError::Unauthorized
  })?;

  Argon2::default()
    .verify_password(password.as_bytes(), &hash)
    .map_err(|_| {
      tracing::warn!(%username, "admin login with wrong password");
      ApiError::Unauthorized
    })
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: DocumentStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, &state.auth)?;
    Ok(Authenticated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::HeaderValue;
  use rand_core::OsRng;

  fn config(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig { username: "admin".to_string(), password_hash: hash }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  #[test]
  fn correct_credentials() {
    let cfg = config("secret");
    assert!(verify_auth(&headers(&basic("admin", "secret")), &cfg).is_ok());
  }

  #[test]
  fn password_may_contain_colons() {
    let cfg = config("a:b:c");
    assert!(verify_auth(&headers(&basic("admin", "a:b:c")), &cfg).is_ok());
  }

  #[test]
  fn wrong_password() {
    let cfg = config("secret");
    let res = verify_auth(&headers(&basic("admin", "wrong")), &cfg);
    assert!(matches!(res, Err(ApiError::Unauthorized)));
  }

  #[test]
  fn wrong_username() {
    let cfg = config("secret");
    let res = verify_auth(&headers(&basic("root", "secret")), &cfg);
    assert!(matches!(res, Err(ApiError::Unauthorized)));
  }

  #[test]
  fn missing_header() {
    let cfg = config("secret");
    assert!(matches!(verify_auth(&HeaderMap::new(), &cfg), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    let cfg = config("secret");
    let res = verify_auth(&headers("Basic !!!not-base64!!!"), &cfg);
    assert!(matches!(res, Err(ApiError::Unauthorized)));
  }

  #[test]
  fn scheme_is_case_insensitive() {
    let cfg = config("secret");
    let lower = basic("admin", "secret").replacen("Basic", "basic", 1);
    assert!(verify_auth(&headers(&lower), &cfg).is_ok());
    let upper = basic("admin", "secret").replacen("Basic", "BASIC", 1);
    assert!(verify_auth(&headers(&upper), &cfg).is_ok());
  }

  #[test]
  fn credentials_without_colon_are_rejected() {
    assert_eq!(basic_credentials(&format!("Basic {}", B64.encode("admin"))), None);
    assert_eq!(
      basic_credentials(&format!("Basic {}", B64.encode("admin:"))),
      Some(("admin".to_owned(), String::new()))
    );
  }

  #[test]
  fn bearer_scheme_is_rejected() {
    let cfg = config("secret");
    let res = verify_auth(&headers("Bearer abc"), &cfg);
    assert!(matches!(res, Err(ApiError::Unauthorized)));
  }
}
