//! Playback client for the training video service.
//!
//! Loads a video and the viewer's progress, enforces the skip-ahead bound
//! on seeks, and periodically reports the playback position back to the
//! server. The media element itself is abstracted behind
//! [`reporter::PlaybackSource`], so this crate works with any player.

pub mod api;
pub mod config;
pub mod reporter;
pub mod session;

pub use api::{PlayerApi, PlayerApiError, TrainingBackend};
pub use config::PlayerConfig;
pub use reporter::{PlaybackSample, PlaybackSource, ReporterHandle};
pub use session::{LogNotifier, PlaybackSession, SeekNotifier};
