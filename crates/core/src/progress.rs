//! Watch-progress state machine.
//!
//! Each (session, video) pair moves through three states:
//!
//! ```text
//! NotStarted ──report──▶ InProgress ──report ≥ duration──▶ Completed
//!      └──────────────report ≥ duration──────────────────────▲
//! ```
//!
//! `Completed` is terminal for the completion flag, but `last_position`
//! keeps tracking whatever the client reports. The persistence layer stores
//! the resulting [`ProgressSnapshot`]; this module never touches storage.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on the length of a client-supplied session identifier.
pub const MAX_SESSION_ID_LEN: usize = 255;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single playback sample submitted by a client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackReport {
    /// Playback position in seconds.
    pub current_time: f64,
    /// Total duration in seconds, if the client knows it yet.
    pub video_duration: Option<f64>,
}

/// The persisted watch state of one (session, video) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub last_position: f64,
    pub completed: bool,
    pub watched_videos: i32,
    /// Last known duration reported for the video, used for percentages.
    pub video_duration: Option<f64>,
}

impl ProgressSnapshot {
    /// The neutral value returned for a pair that has never been reported.
    pub const NOT_STARTED: Self = Self {
        last_position: 0.0,
        completed: false,
        watched_videos: 0,
        video_duration: None,
    };
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::NOT_STARTED
    }
}

/// Lifecycle state of a (session, video) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressState {
    /// Classify an optional stored record.
    pub fn of(snapshot: Option<&ProgressSnapshot>) -> Self {
        match snapshot {
            None => Self::NotStarted,
            Some(s) if s.completed => Self::Completed,
            Some(_) => Self::InProgress,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a client-supplied session identifier.
///
/// Sessions are not authenticated; the identifier only has to be a
/// non-blank string of reasonable length.
pub fn validate_session_id(session_id: &str) -> Result<(), CoreError> {
    if session_id.trim().is_empty() {
        return Err(CoreError::Validation("sessionId must not be empty".into()));
    }
    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(CoreError::Validation(format!(
            "sessionId exceeds maximum length of {MAX_SESSION_ID_LEN}"
        )));
    }
    Ok(())
}

/// Validate the numeric fields of a report.
///
/// Only `current_time` is constrained. A bad duration is not an error; it
/// just means completion cannot be determined (see [`known_duration`]).
pub fn validate_report(report: &PlaybackReport) -> Result<(), CoreError> {
    if !report.current_time.is_finite() {
        return Err(CoreError::Validation(
            "currentTime must be a finite number".into(),
        ));
    }
    if report.current_time < 0.0 {
        return Err(CoreError::Validation(format!(
            "currentTime must be >= 0, got {}",
            report.current_time
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Filter a reported duration down to one usable as a completion threshold.
///
/// Zero, negative, NaN and infinite durations are all "unknown".
pub fn known_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}

/// Whether `current_time` reaches the completion threshold.
///
/// Short-circuits to `false` when the duration is unknown.
pub fn reaches_completion(current_time: f64, video_duration: Option<f64>) -> bool {
    match known_duration(video_duration) {
        Some(duration) => current_time >= duration,
        None => false,
    }
}

/// Compute the record that results from applying `report` to `previous`.
///
/// - No previous record: create one at `current_time`, completed if the
///   threshold is already reached (`watched_videos` is then 1).
/// - Existing record: overwrite `last_position` unconditionally. The first
///   report reaching the threshold flips `completed` and increments
///   `watched_videos`; once completed, neither field changes again.
pub fn apply_report(
    previous: Option<&ProgressSnapshot>,
    report: &PlaybackReport,
) -> ProgressSnapshot {
    let reached = reaches_completion(report.current_time, report.video_duration);

    match previous {
        None => ProgressSnapshot {
            last_position: report.current_time,
            completed: reached,
            watched_videos: i32::from(reached),
            video_duration: known_duration(report.video_duration),
        },
        Some(prev) => {
            let newly_completed = !prev.completed && reached;
            ProgressSnapshot {
                last_position: report.current_time,
                completed: prev.completed || reached,
                watched_videos: if newly_completed {
                    prev.watched_videos.saturating_add(1)
                } else {
                    prev.watched_videos
                },
                video_duration: known_duration(report.video_duration).or(prev.video_duration),
            }
        }
    }
}

/// Percentage of the video watched, clamped to `0..=100`.
///
/// Returns `None` when the duration is unknown.
pub fn percent_watched(last_position: f64, video_duration: Option<f64>) -> Option<f64> {
    known_duration(video_duration).map(|d| (last_position / d * 100.0).clamp(0.0, 100.0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
