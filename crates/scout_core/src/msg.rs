use crate::{ItemsPage, JobId, PollToken, SearchJob, SearchRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Caller asked for a new search.
    StartSearch(SearchRequest),
    /// Caller attaches to an existing webset, e.g. after a restart.
    ResumeSearch(JobId),
    /// Caller canceled the running search.
    CancelSearch,
    /// Caller discards everything and returns to idle.
    Reset,
    /// Creation request succeeded.
    JobCreated { epoch: u64, job: SearchJob },
    /// Creation request failed.
    CreateFailed { epoch: u64, error: String },
    /// The scheduled poll timer elapsed.
    TimerFired(PollToken),
    /// Status fetch for a poll tick succeeded.
    StatusFetched { token: PollToken, job: SearchJob },
    /// Status fetch for a poll tick failed.
    StatusFailed { token: PollToken, error: String },
    /// Item fetch succeeded.
    ItemsFetched { token: PollToken, page: ItemsPage },
    /// Item fetch failed.
    ItemsFailed { token: PollToken, error: String },
}
