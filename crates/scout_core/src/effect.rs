use std::time::Duration;

use crate::{JobId, PageRequest, PollToken, ResultItem, SearchJob, SearchRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CreateJob { epoch: u64, request: SearchRequest },
    /// Replace any pending timer with one that fires after `delay`.
    SchedulePoll { token: PollToken, delay: Duration },
    CancelTimer,
    FetchStatus { token: PollToken },
    FetchItems { token: PollToken, page: PageRequest },
    /// Best effort; the outcome never feeds back into the state machine.
    CancelJob { job_id: JobId },
    NotifyCreated { job: SearchJob },
    NotifyItems { items: Vec<ResultItem> },
    NotifyComplete { job: SearchJob, items: Vec<ResultItem> },
    NotifyError { message: String },
}
