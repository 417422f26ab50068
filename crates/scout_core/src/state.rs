use std::time::Duration;

use crate::model::{JobId, ResultItem, RunStatus, SearchJob};
use crate::validate::ITEMS_PAGE_SIZE;
use crate::view_model::PollView;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub page_size: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            page_size: ITEMS_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Creation request in flight.
    Starting,
    Active,
    Completed,
    /// The upstream run failed.
    Failed,
    /// The upstream run was canceled.
    Canceled,
    /// Transport or decode failure while polling or creating.
    Error,
    /// The caller canceled the search.
    Stopped,
}

/// Identifies the job and the start/resume generation a request was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PollToken {
    pub job_id: JobId,
    pub epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Progress {
    pub found: u32,
    pub completion: f64,
    pub run_status: RunStatus,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PollState {
    settings: PollSettings,
    phase: Phase,
    epoch: u64,
    job_id: Option<JobId>,
    job: Option<SearchJob>,
    items: Vec<ResultItem>,
    is_fetching_items: bool,
    error: Option<String>,
    progress: Progress,
    dirty: bool,
}

impl PollState {
    pub fn new(settings: PollSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn job(&self) -> Option<&SearchJob> {
        self.job.as_ref()
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn is_fetching_items(&self) -> bool {
        self.is_fetching_items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.phase, Phase::Starting | Phase::Active)
    }

    /// Token for requests issued against the currently tracked job.
    pub fn token(&self) -> Option<PollToken> {
        self.job_id.as_ref().map(|job_id| PollToken {
            job_id: job_id.clone(),
            epoch: self.epoch,
        })
    }

    pub fn view(&self) -> PollView {
        PollView {
            phase: self.phase,
            is_searching: self.is_searching(),
            is_fetching_items: self.is_fetching_items,
            job_id: self.job_id.clone(),
            job_status: self.job.as_ref().map(|job| job.status),
            items: self.items.clone(),
            progress: self.progress,
            error: self.error.clone(),
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_current(&self, token: &PollToken) -> bool {
        self.epoch == token.epoch && self.job_id.as_ref() == Some(&token.job_id)
    }

    /// Drops everything tied to the previous search and opens a new generation.
    pub(crate) fn begin_generation(&mut self, phase: Phase, job_id: Option<JobId>) {
        *self = Self {
            settings: self.settings,
            phase,
            epoch: self.epoch.wrapping_add(1),
            job_id,
            ..Self::default()
        };
        self.dirty = true;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.dirty = true;
    }

    /// Ends the current generation so in-flight responses are discarded.
    pub(crate) fn stop(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.phase = Phase::Stopped;
        self.is_fetching_items = false;
        self.dirty = true;
    }

    pub(crate) fn track_job(&mut self, job: SearchJob) {
        self.job_id = Some(job.id.clone());
        self.job = Some(job);
        self.dirty = true;
    }

    pub(crate) fn set_progress(&mut self, progress: Progress) {
        self.progress = progress;
        self.dirty = true;
    }

    pub(crate) fn set_fetching_items(&mut self, fetching: bool) {
        self.is_fetching_items = fetching;
        self.dirty = true;
    }

    pub(crate) fn replace_items(&mut self, items: Vec<ResultItem>) {
        self.items = items;
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, phase: Phase, message: impl Into<String>) {
        self.phase = phase;
        self.error = Some(message.into());
        self.is_fetching_items = false;
        self.dirty = true;
    }
}
