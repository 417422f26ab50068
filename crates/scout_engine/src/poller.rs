use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use scout_core::{
    update, Effect, JobId, Msg, PollSettings, PollState, PollToken, PollView, ResultItem,
    SearchJob, SearchRequest,
};
use scout_logging::{scout_debug, scout_info, scout_trace, scout_warn};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::WebsetsApi;

/// Caller hooks fired as the search progresses. All methods default to no-ops.
pub trait SearchObserver: Send + Sync {
    /// A new webset was created upstream.
    fn on_created(&self, _job: &SearchJob) {}

    fn on_items_update(&self, _items: &[ResultItem]) {}

    /// Fired exactly once per completed search, with the final item list.
    fn on_complete(&self, _job: &SearchJob, _items: &[ResultItem]) {}

    fn on_error(&self, _message: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

struct ArmedTimer {
    seq: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Machine {
    state: PollState,
    timer: Option<ArmedTimer>,
    next_timer_seq: u64,
}

struct Inner {
    machine: Mutex<Machine>,
    api: Arc<dyn WebsetsApi>,
    observer: Arc<dyn SearchObserver>,
    view_tx: watch::Sender<PollView>,
    runtime: Handle,
}

impl Inner {
    fn machine(&self) -> MutexGuard<'_, Machine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drives one search at a time against a [`WebsetsApi`].
///
/// Caller operations apply synchronously; network calls and the poll timer
/// run as tasks on the Tokio runtime the poller was created on. At most one
/// timer is armed at any moment.
pub struct SearchPoller {
    inner: Arc<Inner>,
}

impl SearchPoller {
    /// Must be called from within a Tokio runtime.
    pub fn new(
        api: Arc<dyn WebsetsApi>,
        settings: PollSettings,
        observer: Arc<dyn SearchObserver>,
    ) -> Self {
        Self::with_runtime(Handle::current(), api, settings, observer)
    }

    pub fn with_runtime(
        runtime: Handle,
        api: Arc<dyn WebsetsApi>,
        settings: PollSettings,
        observer: Arc<dyn SearchObserver>,
    ) -> Self {
        let state = PollState::new(settings);
        let (view_tx, _) = watch::channel(state.view());
        let inner = Arc::new(Inner {
            machine: Mutex::new(Machine {
                state,
                ..Machine::default()
            }),
            api,
            observer,
            view_tx,
            runtime,
        });
        Self { inner }
    }

    pub fn start_search(&self, request: SearchRequest) {
        scout_info!("start search: {:?}", request.query());
        dispatch(&self.inner, Msg::StartSearch(request));
    }

    pub fn resume_search(&self, job_id: JobId) {
        scout_info!("resume search {}", job_id);
        dispatch(&self.inner, Msg::ResumeSearch(job_id));
    }

    /// Stops polling immediately; the upstream cancel is best effort.
    pub fn cancel_search(&self) {
        dispatch(&self.inner, Msg::CancelSearch);
    }

    pub fn reset(&self) {
        dispatch(&self.inner, Msg::Reset);
    }

    pub fn view(&self) -> PollView {
        self.inner.view_tx.borrow().clone()
    }

    /// Receives a fresh [`PollView`] after every state change.
    pub fn subscribe(&self) -> watch::Receiver<PollView> {
        self.inner.view_tx.subscribe()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.inner.machine().timer.is_some()
    }
}

impl Drop for SearchPoller {
    fn drop(&mut self) {
        // Disarms the timer and invalidates in-flight responses.
        dispatch(&self.inner, Msg::Reset);
    }
}

fn dispatch(inner: &Arc<Inner>, msg: Msg) {
    scout_trace!("dispatch {:?}", msg);
    let (work, notifications) = {
        let mut machine = inner.machine();
        let state = std::mem::take(&mut machine.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            inner.view_tx.send_replace(state.view());
        }
        machine.state = state;

        // Timer effects apply under the lock that guards the state they came from.
        let mut work = Vec::new();
        let mut notifications = Vec::new();
        for effect in effects {
            match effect {
                Effect::CancelTimer => disarm_timer(&mut machine),
                Effect::SchedulePoll { token, delay } => {
                    arm_timer(inner, &mut machine, token, delay);
                }
                effect if is_notification(&effect) => notifications.push(effect),
                effect => work.push(effect),
            }
        }
        (work, notifications)
    };

    // Observers may call back into the poller.
    for effect in work.into_iter().chain(notifications) {
        execute(inner, effect);
    }
}

fn is_notification(effect: &Effect) -> bool {
    matches!(
        effect,
        Effect::NotifyCreated { .. }
            | Effect::NotifyItems { .. }
            | Effect::NotifyComplete { .. }
            | Effect::NotifyError { .. }
    )
}

fn execute(inner: &Arc<Inner>, effect: Effect) {
    match effect {
        // Applied by `dispatch` while the machine is locked.
        Effect::CancelTimer | Effect::SchedulePoll { .. } => {}
        Effect::CreateJob { epoch, request } => {
            let task = Arc::clone(inner);
            inner.runtime.spawn(async move {
                let msg = match task.api.create_webset(&request).await {
                    Ok(job) => {
                        scout_info!("created webset {}", job.id);
                        Msg::JobCreated { epoch, job }
                    }
                    Err(err) => Msg::CreateFailed {
                        epoch,
                        error: err.to_string(),
                    },
                };
                dispatch(&task, msg);
            });
        }
        Effect::FetchStatus { token } => {
            let task = Arc::clone(inner);
            inner.runtime.spawn(async move {
                let msg = match task.api.get_webset(&token.job_id).await {
                    Ok(job) => Msg::StatusFetched { token, job },
                    Err(err) => Msg::StatusFailed {
                        token,
                        error: err.to_string(),
                    },
                };
                dispatch(&task, msg);
            });
        }
        Effect::FetchItems { token, page } => {
            let task = Arc::clone(inner);
            inner.runtime.spawn(async move {
                let msg = match task.api.list_items(&token.job_id, &page).await {
                    Ok(page) => Msg::ItemsFetched { token, page },
                    Err(err) => Msg::ItemsFailed {
                        token,
                        error: err.to_string(),
                    },
                };
                dispatch(&task, msg);
            });
        }
        Effect::CancelJob { job_id } => {
            let api = Arc::clone(&inner.api);
            inner.runtime.spawn(async move {
                if let Err(err) = api.cancel_webset(&job_id).await {
                    scout_warn!("ignoring failed cancel for webset {}: {}", job_id, err);
                }
            });
        }
        Effect::NotifyCreated { job } => inner.observer.on_created(&job),
        Effect::NotifyItems { items } => inner.observer.on_items_update(&items),
        Effect::NotifyComplete { job, items } => {
            scout_info!("webset {} completed with {} items", job.id, items.len());
            inner.observer.on_complete(&job, &items);
        }
        Effect::NotifyError { message } => {
            scout_warn!("search stopped: {}", message);
            inner.observer.on_error(&message);
        }
    }
}

fn disarm_timer(machine: &mut Machine) {
    if let Some(timer) = machine.timer.take() {
        scout_debug!("disarm poll timer #{}", timer.seq);
        timer.cancel.cancel();
    }
}

fn arm_timer(inner: &Arc<Inner>, machine: &mut Machine, token: PollToken, delay: Duration) {
    disarm_timer(machine);
    machine.next_timer_seq += 1;
    let seq = machine.next_timer_seq;
    let cancel = CancellationToken::new();
    machine.timer = Some(ArmedTimer {
        seq,
        cancel: cancel.clone(),
    });
    scout_debug!("arm poll timer #{} for {} in {:?}", seq, token.job_id, delay);

    let task = Arc::clone(inner);
    inner.runtime.spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {
                let still_armed = {
                    let mut machine = task.machine();
                    if machine.timer.as_ref().is_some_and(|timer| timer.seq == seq) {
                        machine.timer = None;
                        true
                    } else {
                        false
                    }
                };
                if still_armed {
                    dispatch(&task, Msg::TimerFired(token));
                }
            }
        }
    });
}
