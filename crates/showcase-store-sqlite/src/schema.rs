//! SQL schema for the showcase SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document. `data_json` holds the field map as a JSON object;
-- the id is not repeated inside it.
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT NOT NULL,   -- 'events' | 'posts' | 'music' | ...
    doc_id      TEXT NOT NULL,
    data_json   TEXT NOT NULL,
    PRIMARY KEY (collection, doc_id)
);

PRAGMA user_version = 1;
";
