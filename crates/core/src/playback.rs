//! Client-side skip-ahead enforcement.
//!
//! A [`SeekGuard`] holds the furthest position the viewer may seek to. It is
//! seeded from the server's `last_position` when a video is loaded; seeking
//! backwards is always allowed, seeking past the bound snaps back to it.

/// How the skip-ahead bound evolves while a video is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundPolicy {
    /// The bound is the position acknowledged at load time and never moves
    /// during the viewing session.
    #[default]
    FixedAtLoad,
    /// The bound is raised to every position the server acknowledges.
    FollowReports,
}

/// Outcome of a seek attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekDecision {
    /// The seek target is within the bound.
    Allowed { position: f64 },
    /// The seek went past the bound; playback must be forced back to
    /// `position`.
    Rejected { requested: f64, position: f64 },
}

impl SeekDecision {
    /// The position playback should end up at.
    pub fn position(&self) -> f64 {
        match *self {
            Self::Allowed { position } | Self::Rejected { position, .. } => position,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Message shown to the viewer when a seek is rejected.
pub const SKIP_AHEAD_MESSAGE: &str =
    "Skipping ahead is not allowed. Please watch the video in order.";

#[derive(Debug, Clone, PartialEq)]
pub struct SeekGuard {
    last_allowed_time: f64,
    policy: BoundPolicy,
}

impl SeekGuard {
    /// Create a guard seeded from the server-acknowledged position.
    ///
    /// Negative or non-finite positions are treated as 0.
    pub fn new(acknowledged_position: f64, policy: BoundPolicy) -> Self {
        Self {
            last_allowed_time: sanitize(acknowledged_position),
            policy,
        }
    }

    pub fn last_allowed_time(&self) -> f64 {
        self.last_allowed_time
    }

    pub fn policy(&self) -> BoundPolicy {
        self.policy
    }

    /// Decide whether a seek to `target` is permitted.
    ///
    /// The bound is never advanced by seeking.
    pub fn check_seek(&self, target: f64) -> SeekDecision {
        if target > self.last_allowed_time {
            SeekDecision::Rejected {
                requested: target,
                position: self.last_allowed_time,
            }
        } else {
            SeekDecision::Allowed { position: target }
        }
    }

    /// Record a position the server has acknowledged.
    ///
    /// Only moves the bound under [`BoundPolicy::FollowReports`], and only
    /// forward. Returns `true` if the bound changed.
    pub fn acknowledge(&mut self, position: f64) -> bool {
        match self.policy {
            BoundPolicy::FixedAtLoad => false,
            BoundPolicy::FollowReports => {
                let position = sanitize(position);
                if position > self.last_allowed_time {
                    self.last_allowed_time = position;
                    true
                } else {
                    false
                }
            }
        }
    }
}

fn sanitize(position: f64) -> f64 {
    if position.is_finite() && position > 0.0 {
        position
    } else {
        0.0
    }
}
