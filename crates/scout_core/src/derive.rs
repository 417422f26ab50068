use crate::model::{RunProgress, RunStatus, SearchJob, SearchRun, WebsetStatus};

/// What the poller should do with a webset, derived from its two status fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedState {
    /// Work is ongoing: fetch items and keep polling.
    Active,
    /// Nothing running and nothing finished yet (e.g. a freshly created or
    /// paused webset). Keep polling status without fetching items.
    Dormant,
    Completed,
    Failed,
    Canceled,
}

impl DerivedState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DerivedState::Completed | DerivedState::Failed | DerivedState::Canceled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStatus {
    pub state: DerivedState,
    pub run_status: RunStatus,
    pub progress: RunProgress,
}

/// Derives the poller state from a job snapshot. The first run is authoritative.
pub fn derive_job(job: &SearchJob) -> DerivedStatus {
    derive_state(job.status, job.primary_run())
}

/// Pure mapping from `(webset status, first run)` to a [`DerivedStatus`].
///
/// A webset reporting `idle` is never read as completed: completion comes from
/// the run, or from a webset-level `completed` when no run exists.
pub fn derive_state(webset: WebsetStatus, run: Option<&SearchRun>) -> DerivedStatus {
    let run_status = run.map_or(RunStatus::Unknown, |run| run.status);
    let progress = run.map(|run| run.progress).unwrap_or_default();

    // Activity wins: a webset still running (e.g. enriching after its run
    // finished) keeps being polled until it settles.
    let state = match (run_status, webset) {
        (RunStatus::Running | RunStatus::Created, _)
        | (_, WebsetStatus::Running | WebsetStatus::Pending) => DerivedState::Active,
        (RunStatus::Failed, _) => DerivedState::Failed,
        (RunStatus::Canceled, _) => DerivedState::Canceled,
        (RunStatus::Completed, _) => DerivedState::Completed,
        (RunStatus::Unknown, WebsetStatus::Completed) => DerivedState::Completed,
        (RunStatus::Unknown, WebsetStatus::Failed) => DerivedState::Failed,
        (
            RunStatus::Unknown,
            WebsetStatus::Idle | WebsetStatus::Paused | WebsetStatus::Unknown,
        ) => DerivedState::Dormant,
    };

    DerivedStatus {
        state,
        run_status,
        progress: RunProgress {
            found: progress.found,
            completion: progress.completion.clamp(0.0, 100.0),
        },
    }
}
