//! Domain logic for the training video service.
//!
//! Everything in this crate is pure: no database, no HTTP, no filesystem.
//! The `db`, `api` and `player` crates build on these types.

pub mod error;
pub mod playback;
pub mod progress;
pub mod sequence;
pub mod types;
pub mod upload;
