//! One viewer watching one video.
//!
//! [`PlaybackSession::load`] fetches the video and the session's stored
//! progress, seeds the skip-ahead bound from it, and exposes the resume
//! position. Seeks are routed through [`PlaybackSession::on_seek`]; the
//! periodic reporter is started once playback begins.

use std::sync::{Arc, Mutex, MutexGuard};

use trainvid_core::playback::{SeekDecision, SeekGuard, SKIP_AHEAD_MESSAGE};
use trainvid_core::progress::validate_session_id;
use trainvid_core::types::DbId;

use crate::api::{PlayerApiError, TrainingBackend, VideoInfo};
use crate::config::PlayerConfig;
use crate::reporter::{PlaybackSource, ReporterContext, ReporterHandle};

/// Receives rejected seeks so the UI can tell the viewer.
pub trait SeekNotifier: Send + Sync {
    fn skip_rejected(&self, decision: &SeekDecision);
}

/// Notifier that only logs the rejection.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl SeekNotifier for LogNotifier {
    fn skip_rejected(&self, decision: &SeekDecision) {
        if let SeekDecision::Rejected {
            requested,
            position,
        } = *decision
        {
            tracing::info!(requested, position, "{}", SKIP_AHEAD_MESSAGE);
        }
    }
}

pub struct PlaybackSession {
    backend: Arc<dyn TrainingBackend>,
    config: PlayerConfig,
    session_id: String,
    video: VideoInfo,
    resume_position: f64,
    guard: Arc<Mutex<SeekGuard>>,
    notifier: Arc<dyn SeekNotifier>,
    reporter: Option<ReporterHandle>,
}

impl PlaybackSession {
    /// Load a video and the session's progress on it.
    ///
    /// A failure to fetch the video is returned. A failure to fetch
    /// progress is logged and treated as no progress, so the viewer starts
    /// from the beginning.
    pub async fn load(
        backend: Arc<dyn TrainingBackend>,
        config: &PlayerConfig,
        session_id: impl Into<String>,
        video_id: DbId,
    ) -> Result<Self, PlayerApiError> {
        let session_id = session_id.into();
        validate_session_id(&session_id)
            .map_err(|e| PlayerApiError::InvalidSession(e.to_string()))?;

        let video = backend.get_video(video_id).await?;

        let resume_position = match backend.get_progress(&session_id, video_id).await {
            Ok(progress) => progress.last_position,
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    video_id,
                    error = %e,
                    "Failed to load progress, starting from the beginning",
                );
                0.0
            }
        };

        let guard = SeekGuard::new(resume_position, config.bound_policy);
        tracing::info!(
            session_id = %session_id,
            video_id,
            resume_position = guard.last_allowed_time(),
            "Playback session loaded",
        );

        Ok(Self {
            backend,
            config: config.clone(),
            session_id,
            video,
            resume_position: guard.last_allowed_time(),
            guard: Arc::new(Mutex::new(guard)),
            notifier: Arc::new(LogNotifier),
            reporter: None,
        })
    }

    /// Replace the default [`LogNotifier`].
    pub fn with_notifier(mut self, notifier: Arc<dyn SeekNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn video(&self) -> &VideoInfo {
        &self.video
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// URL the media element should load.
    pub fn media_url(&self) -> String {
        self.video.media_url(&self.config.base_url)
    }

    /// Position to start playback from, as acknowledged by the server at
    /// load time.
    pub fn resume_position(&self) -> f64 {
        self.resume_position
    }

    /// Current skip-ahead bound.
    pub fn last_allowed_time(&self) -> f64 {
        self.lock_guard().last_allowed_time()
    }

    /// Handle a seek by the viewer.
    ///
    /// The caller must move playback to [`SeekDecision::position`]. A
    /// rejected seek is passed to the notifier.
    pub fn on_seek(&self, target: f64) -> SeekDecision {
        let decision = self.lock_guard().check_seek(target);
        if decision.is_rejected() {
            self.notifier.skip_rejected(&decision);
        }
        decision
    }

    /// Start periodic progress reporting. Restarts the reporter if it is
    /// already running.
    pub fn start_reporting(&mut self, source: Arc<dyn PlaybackSource>) {
        let context = ReporterContext {
            backend: Arc::clone(&self.backend),
            source,
            guard: Arc::clone(&self.guard),
            session_id: self.session_id.clone(),
            video_id: self.video.id,
        };
        // Replacing the handle drops, and so cancels, any previous reporter.
        self.reporter = Some(ReporterHandle::spawn(context, self.config.report_interval));
    }

    pub fn is_reporting(&self) -> bool {
        self.reporter.as_ref().is_some_and(ReporterHandle::is_running)
    }

    /// Stop reporting and wait for the reporter to exit.
    pub async fn stop(&mut self) {
        if let Some(reporter) = self.reporter.take() {
            reporter.stop().await;
        }
    }

    fn lock_guard(&self) -> MutexGuard<'_, SeekGuard> {
        self.guard.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use trainvid_core::playback::BoundPolicy;

    use super::*;
    use crate::reporter::tests::{FakeBackend, FakeSource};

    #[derive(Default)]
    struct RecordingNotifier(Mutex<Vec<SeekDecision>>);

    impl SeekNotifier for RecordingNotifier {
        fn skip_rejected(&self, decision: &SeekDecision) {
            self.0.lock().unwrap().push(*decision);
        }
    }

    fn backend_at(position: f64) -> Arc<FakeBackend> {
        Arc::new(FakeBackend {
            stored_position: position,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn load_seeds_resume_position_and_bound() {
        let session = PlaybackSession::load(backend_at(30.0), &PlayerConfig::default(), "s1", 3)
            .await
            .unwrap();

        assert_eq!(session.resume_position(), 30.0);
        assert_eq!(session.last_allowed_time(), 30.0);
        assert_eq!(session.video().id, 3);
        assert_eq!(session.media_url(), "http://localhost:5000/uploads/3.mp4");
    }

    #[tokio::test]
    async fn progress_failure_starts_from_zero() {
        let backend = Arc::new(FakeBackend {
            fail_progress: true,
            stored_position: 40.0,
            ..Default::default()
        });
        let session = PlaybackSession::load(backend, &PlayerConfig::default(), "s1", 1)
            .await
            .unwrap();

        assert_eq!(session.resume_position(), 0.0);
        assert!(session.on_seek(1.0).is_rejected());
    }

    #[tokio::test]
    async fn blank_session_id_is_rejected_before_any_request() {
        let backend = backend_at(0.0);
        let result = PlaybackSession::load(backend, &PlayerConfig::default(), "  ", 1).await;
        assert_matches!(result.err(), Some(PlayerApiError::InvalidSession(_)));
    }

    #[tokio::test]
    async fn skip_ahead_is_rejected_and_notified() {
        let notifier = Arc::new(RecordingNotifier::default());
        let session = PlaybackSession::load(backend_at(30.0), &PlayerConfig::default(), "s1", 1)
            .await
            .unwrap()
            .with_notifier(notifier.clone());

        let decision = session.on_seek(45.0);
        assert_eq!(decision.position(), 30.0);

        assert_eq!(session.on_seek(12.0), SeekDecision::Allowed { position: 12.0 });

        let seen = notifier.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_matches!(seen[0], SeekDecision::Rejected { requested, .. } if requested == 45.0);
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_bound_does_not_move_while_reporting() {
        let backend = backend_at(10.0);
        let mut session = PlaybackSession::load(backend.clone(), &PlayerConfig::default(), "s1", 1)
            .await
            .unwrap();

        session.start_reporting(Arc::new(FakeSource::playing_at(25.0)));
        assert!(session.is_reporting());
        tokio::time::sleep(Duration::from_millis(5_100)).await;

        assert_eq!(backend.report_count(), 1);
        assert_eq!(session.last_allowed_time(), 10.0);
        assert!(session.on_seek(20.0).is_rejected());

        session.stop().await;
        assert!(!session.is_reporting());
    }

    #[tokio::test(start_paused = true)]
    async fn follow_policy_raises_bound_after_report() {
        let backend = backend_at(10.0);
        let config = PlayerConfig::default().with_bound_policy(BoundPolicy::FollowReports);
        let mut session = PlaybackSession::load(backend, &config, "s1", 1).await.unwrap();

        session.start_reporting(Arc::new(FakeSource::playing_at(25.0)));
        tokio::time::sleep(Duration::from_millis(5_100)).await;

        assert_eq!(session.last_allowed_time(), 25.0);
        assert!(!session.on_seek(20.0).is_rejected());
        session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_reporting_replaces_previous_reporter() {
        let backend = backend_at(0.0);
        let config = PlayerConfig::default().with_report_interval(Duration::from_secs(5));
        let mut session = PlaybackSession::load(backend.clone(), &config, "s1", 1)
            .await
            .unwrap();

        session.start_reporting(Arc::new(FakeSource::playing_at(1.0)));
        session.start_reporting(Arc::new(FakeSource::playing_at(2.0)));
        tokio::time::sleep(Duration::from_millis(5_100)).await;

        assert_eq!(backend.report_count(), 1, "only one reporter may be active");
        session.stop().await;
    }
}
