use std::time::Duration;

use scout_logging::{scout_debug, scout_warn};

use crate::derive::{derive_job, DerivedState};
use crate::{Effect, Msg, PageRequest, Phase, PollState, PollToken, Progress, SearchJob};

pub const RUN_FAILED_MESSAGE: &str = "Search failed";
pub const RUN_CANCELED_MESSAGE: &str = "Search was canceled";

/// Pure update function: applies a message to state and returns any effects.
///
/// Responses carrying a token from an older generation, or for a job other
/// than the tracked one, leave the state untouched.
pub fn update(mut state: PollState, msg: Msg) -> (PollState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartSearch(request) => {
            state.begin_generation(Phase::Starting, None);
            scout_debug!("starting search epoch={} count={}", state.epoch(), request.count());
            vec![
                Effect::CancelTimer,
                Effect::CreateJob {
                    epoch: state.epoch(),
                    request,
                },
            ]
        }
        Msg::ResumeSearch(job_id) => {
            state.begin_generation(Phase::Active, Some(job_id.clone()));
            scout_debug!("resuming search job={} epoch={}", job_id, state.epoch());
            let token = PollToken {
                job_id,
                epoch: state.epoch(),
            };
            vec![
                Effect::CancelTimer,
                Effect::SchedulePoll {
                    token,
                    delay: Duration::ZERO,
                },
            ]
        }
        Msg::CancelSearch => {
            let mut effects = vec![Effect::CancelTimer];
            if state.is_searching() {
                if let Some(job_id) = state.job_id() {
                    effects.push(Effect::CancelJob {
                        job_id: job_id.clone(),
                    });
                }
                state.stop();
            }
            effects
        }
        Msg::Reset => {
            state.begin_generation(Phase::Idle, None);
            vec![Effect::CancelTimer]
        }
        Msg::JobCreated { epoch, job } => on_job_created(&mut state, epoch, job),
        Msg::CreateFailed { epoch, error } => {
            if epoch != state.epoch() || state.phase() != Phase::Starting {
                return (state, Vec::new());
            }
            state.fail(Phase::Error, error.clone());
            vec![Effect::NotifyError { message: error }]
        }
        Msg::TimerFired(token) => {
            if !state.is_current(&token) || state.phase() != Phase::Active {
                return (state, Vec::new());
            }
            vec![Effect::FetchStatus { token }]
        }
        Msg::StatusFetched { token, job } => {
            if !state.is_current(&token) || job.id != token.job_id || state.phase() != Phase::Active {
                scout_debug!("discarding stale status for job={}", job.id);
                return (state, Vec::new());
            }
            on_status(&mut state, token, job)
        }
        Msg::StatusFailed { token, error } => {
            if !state.is_current(&token) || state.phase() != Phase::Active {
                return (state, Vec::new());
            }
            state.fail(Phase::Error, error.clone());
            vec![Effect::NotifyError { message: error }]
        }
        Msg::ItemsFetched { token, page } => {
            if !state.is_current(&token) || !state.is_fetching_items() {
                return (state, Vec::new());
            }
            state.set_fetching_items(false);
            state.replace_items(page.data);
            let mut effects = vec![Effect::NotifyItems {
                items: state.items().to_vec(),
            }];
            effects.extend(after_items(&state, token));
            effects
        }
        Msg::ItemsFailed { token, error } => {
            if !state.is_current(&token) || !state.is_fetching_items() {
                return (state, Vec::new());
            }
            scout_warn!("item fetch failed for job={}: {}", token.job_id, error);
            state.set_fetching_items(false);
            after_items(&state, token)
        }
    };

    (state, effects)
}

fn on_job_created(state: &mut PollState, epoch: u64, job: SearchJob) -> Vec<Effect> {
    if epoch != state.epoch() || state.phase() != Phase::Starting {
        // The caller moved on while the webset was being created; nobody will poll it.
        scout_debug!("canceling orphaned webset {}", job.id);
        return vec![Effect::CancelJob { job_id: job.id }];
    }

    state.track_job(job.clone());
    state.set_phase(Phase::Active);
    let Some(token) = state.token() else {
        return Vec::new();
    };
    vec![
        Effect::NotifyCreated { job },
        Effect::SchedulePoll {
            token,
            delay: state.settings().interval,
        },
    ]
}

fn on_status(state: &mut PollState, token: PollToken, job: SearchJob) -> Vec<Effect> {
    let derived = derive_job(&job);
    scout_debug!(
        "job={} webset={:?} run={} found={} completion={} -> {:?}",
        job.id,
        job.status,
        derived.run_status,
        derived.progress.found,
        derived.progress.completion,
        derived.state
    );
    state.track_job(job);
    state.set_progress(Progress {
        found: derived.progress.found,
        completion: derived.progress.completion,
        run_status: derived.run_status,
    });

    match derived.state {
        DerivedState::Active => {
            state.set_fetching_items(true);
            vec![fetch_items(state, token)]
        }
        DerivedState::Dormant => vec![Effect::SchedulePoll {
            token,
            delay: state.settings().interval,
        }],
        DerivedState::Completed => {
            state.set_phase(Phase::Completed);
            state.set_progress(Progress {
                completion: 100.0,
                ..state.progress()
            });
            state.set_fetching_items(true);
            vec![fetch_items(state, token)]
        }
        DerivedState::Failed => {
            state.fail(Phase::Failed, RUN_FAILED_MESSAGE);
            vec![Effect::NotifyError {
                message: RUN_FAILED_MESSAGE.to_string(),
            }]
        }
        DerivedState::Canceled => {
            state.fail(Phase::Canceled, RUN_CANCELED_MESSAGE);
            vec![Effect::NotifyError {
                message: RUN_CANCELED_MESSAGE.to_string(),
            }]
        }
    }
}

fn fetch_items(state: &PollState, token: PollToken) -> Effect {
    Effect::FetchItems {
        token,
        page: PageRequest::first(state.settings().page_size),
    }
}

/// Follow-up once an item fetch resolved, whatever its outcome.
fn after_items(state: &PollState, token: PollToken) -> Vec<Effect> {
    match state.phase() {
        Phase::Active => vec![Effect::SchedulePoll {
            token,
            delay: state.settings().interval,
        }],
        Phase::Completed => match state.job() {
            Some(job) => vec![Effect::NotifyComplete {
                job: job.clone(),
                items: state.items().to_vec(),
            }],
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}
