//! Periodic playback progress reporter.
//!
//! While a video plays, a background task samples the playback position on
//! a fixed cadence and submits it with `POST /api/progress`. Reporting is
//! best effort: a failed report is logged and dropped, never retried and
//! never surfaced to the viewer. The task runs until its [`ReporterHandle`]
//! is stopped or dropped.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use trainvid_core::playback::SeekGuard;
use trainvid_core::types::DbId;

use crate::api::{ProgressReport, TrainingBackend};

/// A point-in-time reading of the media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSample {
    /// Current playback position in seconds.
    pub position: f64,
    /// Total duration in seconds, `None` until metadata is loaded.
    pub duration: Option<f64>,
    pub playing: bool,
}

/// Something that can be sampled for the current playback position.
pub trait PlaybackSource: Send + Sync {
    /// Returns `None` when no media is attached.
    fn sample(&self) -> Option<PlaybackSample>;
}

/// What a single reporting tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing attached or playback paused.
    Skipped,
    Reported,
    /// The report failed and was dropped.
    Failed,
}

/// Everything the reporting loop needs, shared with the owning session.
pub(crate) struct ReporterContext {
    pub backend: Arc<dyn TrainingBackend>,
    pub source: Arc<dyn PlaybackSource>,
    pub guard: Arc<Mutex<SeekGuard>>,
    pub session_id: String,
    pub video_id: DbId,
}

impl ReporterContext {
    /// Sample the source and submit one report.
    pub(crate) async fn tick(&self) -> TickOutcome {
        let sample = match self.source.sample() {
            Some(sample) if sample.playing => sample,
            _ => return TickOutcome::Skipped,
        };

        let report = ProgressReport {
            session_id: self.session_id.clone(),
            video_id: self.video_id,
            current_time: sample.position,
            video_duration: sample.duration.filter(|d| d.is_finite()),
        };

        match self.backend.report_progress(&report).await {
            Ok(progress) => {
                let advanced = match self.guard.lock() {
                    Ok(mut guard) => guard.acknowledge(progress.last_position),
                    Err(poisoned) => poisoned.into_inner().acknowledge(progress.last_position),
                };
                tracing::debug!(
                    session_id = %self.session_id,
                    video_id = self.video_id,
                    position = progress.last_position,
                    completed = progress.completed,
                    bound_advanced = advanced,
                    "Progress reported",
                );
                TickOutcome::Reported
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    video_id = self.video_id,
                    error = %e,
                    "Failed to report progress",
                );
                TickOutcome::Failed
            }
        }
    }
}

/// Handle to a running reporter task.
///
/// Dropping the handle cancels the task, so a torn-down session never
/// leaves a timer running.
pub struct ReporterHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ReporterHandle {
    /// Spawn the reporting loop on the current tokio runtime.
    ///
    /// The first report is sent one full `period` after spawning.
    pub(crate) fn spawn(context: ReporterContext, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(context, period, cancel.clone()));
        Self {
            cancel,
            task: Some(task),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the loop and wait for the task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Progress reporter task ended abnormally");
            }
        }
    }
}

impl Drop for ReporterHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(context: ReporterContext, period: Duration, cancel: CancellationToken) {
    tracing::debug!(
        session_id = %context.session_id,
        video_id = context.video_id,
        interval_ms = period.as_millis() as u64,
        "Progress reporter started",
    );

    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(video_id = context.video_id, "Progress reporter stopping");
                break;
            }
            _ = interval.tick() => {
                context.tick().await;
            }
        }
    }
}
