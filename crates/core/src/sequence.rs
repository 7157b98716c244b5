//! Module sequence: the ordered catalog seen through one session's progress.
//!
//! Videos are watched in catalog order (creation time ascending). A module
//! is unlocked when every module before it has been completed; the first
//! module is always unlocked.

use serde::Serialize;

use crate::progress::{percent_watched, ProgressSnapshot, ProgressState};

/// Per-module status derived from an optional progress record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStatus {
    /// 1-based position in the sequence.
    pub position: usize,
    pub last_position: f64,
    pub completed: bool,
    pub percent_watched: Option<f64>,
    pub unlocked: bool,
    pub state: &'static str,
}

/// Build statuses for modules given in catalog order.
///
/// `progress` yields one entry per module; `None` means the session has no
/// record for that module yet.
pub fn build_sequence<I>(progress: I) -> Vec<ModuleStatus>
where
    I: IntoIterator<Item = Option<ProgressSnapshot>>,
{
    let mut prefix_completed = true;

    progress
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let state = ProgressState::of(record.as_ref());
            let snapshot = record.unwrap_or_default();
            let status = ModuleStatus {
                position: index + 1,
                last_position: snapshot.last_position,
                completed: snapshot.completed,
                percent_watched: percent_watched(snapshot.last_position, snapshot.video_duration),
                unlocked: prefix_completed,
                state: state.as_str(),
            };
            prefix_completed &= snapshot.completed;
            status
        })
        .collect()
}

/// Number of completed modules in a sequence.
pub fn completed_count(modules: &[ModuleStatus]) -> usize {
    modules.iter().filter(|m| m.completed).count()
}
