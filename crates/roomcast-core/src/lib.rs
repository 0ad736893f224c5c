//! roomcast core: transport-agnostic chat event contracts, data model, and errors.
//!
//! This crate defines the wire-level events exchanged with chat clients, the
//! persisted records (rooms, messages), and the error surface shared by the
//! gateway and its stores. It carries no transport or runtime dependencies so it
//! can be reused by test harnesses and client tooling.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed client input surfaces as `ChatError`, never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;
pub mod protocol;

/// Shared result type.
pub use error::{ChatError, Result};
