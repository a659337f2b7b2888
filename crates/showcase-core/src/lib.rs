//! Core types and trait definitions for the showcase content backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::DocumentStore`]; the API crate serves
//! the queries in [`resolve`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod crud;
pub mod error;
pub mod featured;
pub mod record;
pub mod resolve;
pub mod store;
pub mod timestamp;
pub mod validate;

pub use error::{Error, Result};

#[cfg(test)]
mod fake;
