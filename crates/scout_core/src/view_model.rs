use crate::{JobId, Phase, Progress, ResultItem, WebsetStatus};

/// Read-only snapshot of a poller for presentation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PollView {
    pub phase: Phase,
    pub is_searching: bool,
    pub is_fetching_items: bool,
    pub job_id: Option<JobId>,
    pub job_status: Option<WebsetStatus>,
    pub items: Vec<ResultItem>,
    pub progress: Progress,
    pub error: Option<String>,
}
