//! showcase server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! document store, and serves the JSON API over HTTP.
//!
//! ```toml
//! host               = "127.0.0.1"
//! port               = 8080
//! store_path         = "~/.local/share/showcase/content.db"
//! auth_username      = "admin"
//! auth_password_hash = "$argon2id$v=19$..."
//! curation_order     = "scan"   # or "curated"
//! ```
//!
//! Every key can be overridden with a `SHOWCASE_` environment variable, e.g.
//! `SHOWCASE_PORT=9000`.
//!
//! # Password hash generation
//!
//! ```
//! cargo run -p showcase-server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use showcase_api::{AppState, ServerConfig, auth::AuthConfig};
use showcase_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Portfolio content server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SHOWCASE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create store directory {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::info!(path = %store_path.display(), "opened document store");

  let state = AppState {
    store:  Arc::new(store),
    auth:   Arc::new(AuthConfig {
      username:      server_cfg.auth_username.clone(),
      password_hash: server_cfg.auth_password_hash.clone(),
    }),
    config: Arc::new(server_cfg.clone()),
  };

  let app = showcase_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(
    curation_order = ?server_cfg.curation_order,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']).to_string();
  anyhow::ensure!(!password.is_empty(), "password must not be empty");
  Ok(password)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/x/content.db")), PathBuf::from(home).join("x/content.db"));
  }

  #[test]
  fn other_paths_are_untouched() {
    assert_eq!(expand_tilde(Path::new("/var/lib/content.db")), PathBuf::from("/var/lib/content.db"));
    assert_eq!(expand_tilde(Path::new("content.db")), PathBuf::from("content.db"));
  }

  #[test]
  fn cli_parses_flags() {
    let cli = Cli::parse_from(["showcase", "--config", "site.toml", "--hash-password"]);
    assert_eq!(cli.config, PathBuf::from("site.toml"));
    assert!(cli.hash_password);
  }
}
