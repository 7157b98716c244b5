use std::time::Duration;

use trainvid_core::playback::BoundPolicy;

/// Default cadence of progress reports while playing.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Default timeout for a single HTTP request to the server.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client configuration.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Server origin, e.g. `http://localhost:5000`. API calls go to
    /// `{base_url}/api/...` and media to `{base_url}/{storage_path}`.
    pub base_url: String,
    pub report_interval: Duration,
    pub request_timeout: Duration,
    pub bound_policy: BoundPolicy,
}

impl PlayerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            report_interval: DEFAULT_REPORT_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            bound_policy: BoundPolicy::default(),
        }
    }

    pub fn with_bound_policy(mut self, policy: BoundPolicy) -> Self {
        self.bound_policy = policy;
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000")
    }
}
