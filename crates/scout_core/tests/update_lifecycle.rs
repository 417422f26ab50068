use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use scout_core::{
    update, Effect, ItemsPage, JobId, Msg, PageRequest, Phase, PollSettings, PollState, PollToken,
    ResultItem, RunStatus, SearchJob, SearchRequest, RUN_CANCELED_MESSAGE, RUN_FAILED_MESSAGE,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scout_logging::initialize_for_tests);
}

fn webset(value: serde_json::Value) -> SearchJob {
    serde_json::from_value(value).expect("valid webset json")
}

fn person(id: &str, name: &str) -> ResultItem {
    serde_json::from_value(json!({
        "id": id,
        "properties": {
            "type": "person",
            "url": format!("https://linkedin.com/in/{id}"),
            "description": "Engineer",
            "person": { "name": name, "location": "Berlin" }
        }
    }))
    .expect("valid item json")
}

fn page(items: Vec<ResultItem>) -> ItemsPage {
    ItemsPage {
        data: items,
        has_more: false,
        next_cursor: None,
    }
}

fn running_webset(found: u32, completion: f64) -> SearchJob {
    webset(json!({
        "id": "ws_1",
        "status": "running",
        "searches": [{
            "id": "se_1",
            "status": "running",
            "progress": { "found": found, "completion": completion }
        }]
    }))
}

fn completed_webset() -> SearchJob {
    webset(json!({
        "id": "ws_1",
        "status": "completed",
        "searches": [{
            "id": "se_1",
            "status": "completed",
            "progress": { "found": 20, "completion": 95 }
        }]
    }))
}

fn run_in_state(run_status: &str) -> SearchJob {
    webset(json!({
        "id": "ws_1",
        "status": "idle",
        "searches": [{ "id": "se_1", "status": run_status }]
    }))
}

fn berlin_request() -> SearchRequest {
    SearchRequest::new("software engineers in Berlin", 20, Vec::new(), Vec::new())
        .expect("valid request")
}

/// Drives the machine from idle through a successful creation of `ws_1`.
fn started() -> (PollState, PollToken) {
    let state = PollState::new(PollSettings::default());
    let (state, effects) = update(state, Msg::StartSearch(berlin_request()));
    let epoch = match &effects[1] {
        Effect::CreateJob { epoch, .. } => *epoch,
        other => panic!("expected CreateJob, got {other:?}"),
    };
    let created = webset(json!({ "id": "ws_1", "status": "idle", "searches": [] }));
    let (state, _) = update(state, Msg::JobCreated { epoch, job: created });
    let token = state.token().expect("tracked job");
    (state, token)
}

fn schedule_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::SchedulePoll { .. }))
        .count()
}

#[test]
fn start_search_enters_starting_and_requests_creation() {
    init_logging();
    let state = PollState::new(PollSettings::default());
    let (state, effects) = update(state, Msg::StartSearch(berlin_request()));

    assert_eq!(state.phase(), Phase::Starting);
    assert!(state.is_searching());
    assert_eq!(
        effects,
        vec![
            Effect::CancelTimer,
            Effect::CreateJob {
                epoch: state.epoch(),
                request: berlin_request(),
            },
        ]
    );
}

#[test]
fn creation_activates_and_schedules_exactly_one_poll() {
    init_logging();
    let state = PollState::new(PollSettings::default());
    let (state, effects) = update(state, Msg::StartSearch(berlin_request()));
    let epoch = state.epoch();
    assert_eq!(schedule_count(&effects), 0);

    let created = webset(json!({ "id": "ws_1", "status": "idle", "searches": [] }));
    let (state, effects) = update(
        state,
        Msg::JobCreated {
            epoch,
            job: created.clone(),
        },
    );

    assert_eq!(state.phase(), Phase::Active);
    assert_eq!(state.job_id(), Some(&JobId::from_upstream("ws_1")));
    assert_eq!(
        effects,
        vec![
            Effect::NotifyCreated { job: created },
            Effect::SchedulePoll {
                token: PollToken {
                    job_id: JobId::from_upstream("ws_1"),
                    epoch,
                },
                delay: Duration::from_millis(2000),
            },
        ]
    );
}

#[test]
fn creation_failure_surfaces_error_and_stops_searching() {
    init_logging();
    let state = PollState::new(PollSettings::default());
    let (state, _) = update(state, Msg::StartSearch(berlin_request()));
    let epoch = state.epoch();

    let (state, effects) = update(
        state,
        Msg::CreateFailed {
            epoch,
            error: "upstream error (status 503): overloaded".to_string(),
        },
    );

    assert_eq!(state.phase(), Phase::Error);
    assert!(!state.is_searching());
    assert_eq!(state.error(), Some("upstream error (status 503): overloaded"));
    assert_eq!(
        effects,
        vec![Effect::NotifyError {
            message: "upstream error (status 503): overloaded".to_string()
        }]
    );
}

#[test]
fn running_tick_fetches_items_then_reschedules() {
    init_logging();
    let (state, token) = started();

    let (state, effects) = update(state, Msg::TimerFired(token.clone()));
    assert_eq!(effects, vec![Effect::FetchStatus { token: token.clone() }]);

    let (state, effects) = update(
        state,
        Msg::StatusFetched {
            token: token.clone(),
            job: running_webset(3, 15.0),
        },
    );
    assert_eq!(state.phase(), Phase::Active);
    assert_eq!(state.progress().found, 3);
    assert_eq!(state.progress().completion, 15.0);
    assert_eq!(state.progress().run_status, RunStatus::Running);
    assert!(state.is_fetching_items());
    assert_eq!(
        effects,
        vec![Effect::FetchItems {
            token: token.clone(),
            page: PageRequest::first(100),
        }]
    );

    let items = vec![person("p1", "Ada"), person("p2", "Grace"), person("p3", "Linus")];
    let (state, effects) = update(
        state,
        Msg::ItemsFetched {
            token: token.clone(),
            page: page(items.clone()),
        },
    );
    assert!(!state.is_fetching_items());
    assert_eq!(state.items(), items.as_slice());
    assert_eq!(
        effects,
        vec![
            Effect::NotifyItems { items },
            Effect::SchedulePoll {
                token,
                delay: Duration::from_millis(2000),
            },
        ]
    );
}

#[test]
fn item_fetch_replaces_rather_than_merges() {
    init_logging();
    let (state, token) = started();
    let (state, _) = update(
        state,
        Msg::StatusFetched {
            token: token.clone(),
            job: running_webset(2, 10.0),
        },
    );
    let (state, _) = update(
        state,
        Msg::ItemsFetched {
            token: token.clone(),
            page: page(vec![person("p1", "Ada"), person("p2", "Grace")]),
        },
    );
    let (state, _) = update(
        state,
        Msg::StatusFetched {
            token: token.clone(),
            job: running_webset(1, 20.0),
        },
    );
    let (state, _) = update(
        state,
        Msg::ItemsFetched {
            token,
            page: page(vec![person("p9", "Barbara")]),
        },
    );

    let ids: Vec<_> = state.items().iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["p9"]);
}

#[test]
fn item_fetch_failure_keeps_polling() {
    init_logging();
    let (state, token) = started();
    let (state, _) = update(
        state,
        Msg::StatusFetched {
            token: token.clone(),
            job: running_webset(3, 15.0),
        },
    );

    let (state, effects) = update(
        state,
        Msg::ItemsFailed {
            token: token.clone(),
            error: "timeout".to_string(),
        },
    );

    assert_eq!(state.phase(), Phase::Active);
    assert_eq!(state.error(), None);
    assert!(!state.is_fetching_items());
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            token,
            delay: Duration::from_millis(2000),
        }]
    );
}

#[test]
fn completion_does_one_final_fetch_and_completes_once() {
    init_logging();
    let (state, token) = started();

    let (state, effects) = update(
        state,
        Msg::StatusFetched {
            token: token.clone(),
            job: completed_webset(),
        },
    );
    assert_eq!(state.phase(), Phase::Completed);
    assert!(!state.is_searching());
    assert_eq!(state.progress().completion, 100.0);
    assert_eq!(state.progress().found, 20);
    assert_eq!(
        effects,
        vec![Effect::FetchItems {
            token: token.clone(),
            page: PageRequest::first(100),
        }]
    );

    let items = vec![person("p1", "Ada")];
    let (state, effects) = update(
        state,
        Msg::ItemsFetched {
            token: token.clone(),
            page: page(items.clone()),
        },
    );
    assert_eq!(schedule_count(&effects), 0);
    assert_eq!(
        effects,
        vec![
            Effect::NotifyItems {
                items: items.clone()
            },
            Effect::NotifyComplete {
                job: completed_webset(),
                items,
            },
        ]
    );

    // A duplicate delivery must not complete twice.
    let (_state, effects) = update(
        state,
        Msg::ItemsFetched {
            token,
            page: page(Vec::new()),
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn failed_final_fetch_still_completes_with_held_items() {
    init_logging();
    let (state, token) = started();
    let (state, _) = update(
        state,
        Msg::StatusFetched {
            token: token.clone(),
            job: running_webset(1, 50.0),
        },
    );
    let (state, _) = update(
        state,
        Msg::ItemsFetched {
            token: token.clone(),
            page: page(vec![person("p1", "Ada")]),
        },
    );
    let (state, _) = update(
        state,
        Msg::StatusFetched {
            token: token.clone(),
            job: completed_webset(),
        },
    );

    let (state, effects) = update(
        state,
        Msg::ItemsFailed {
            token,
            error: "boom".to_string(),
        },
    );
    assert_eq!(state.phase(), Phase::Completed);
    assert_eq!(
        effects,
        vec![Effect::NotifyComplete {
            job: completed_webset(),
            items: vec![person("p1", "Ada")],
        }]
    );
}

#[test]
fn failed_and_canceled_runs_stop_with_distinct_messages() {
    init_logging();
    for (run_status, phase, message) in [
        ("failed", Phase::Failed, RUN_FAILED_MESSAGE),
        ("canceled", Phase::Canceled, RUN_CANCELED_MESSAGE),
        ("cancelled", Phase::Canceled, RUN_CANCELED_MESSAGE),
    ] {
        let (state, token) = started();
        let (state, effects) = update(
            state,
            Msg::StatusFetched {
                token,
                job: run_in_state(run_status),
            },
        );

        assert_eq!(state.phase(), phase);
        assert_eq!(state.error(), Some(message));
        assert_eq!(schedule_count(&effects), 0);
        assert_eq!(
            effects,
            vec![Effect::NotifyError {
                message: message.to_string()
            }]
        );
    }
    assert_ne!(RUN_FAILED_MESSAGE, RUN_CANCELED_MESSAGE);
}

#[test]
fn status_failure_moves_to_error() {
    init_logging();
    let (state, token) = started();
    let (state, effects) = update(
        state,
        Msg::StatusFailed {
            token,
            error: "webset not found: ws_1".to_string(),
        },
    );

    assert_eq!(state.phase(), Phase::Error);
    assert_eq!(state.error(), Some("webset not found: ws_1"));
    assert_eq!(
        effects,
        vec![Effect::NotifyError {
            message: "webset not found: ws_1".to_string()
        }]
    );
}

#[test]
fn dormant_webset_keeps_polling_without_items() {
    init_logging();
    let (state, token) = started();
    let idle = webset(json!({ "id": "ws_1", "status": "idle", "searches": [] }));

    let (state, effects) = update(
        state,
        Msg::StatusFetched {
            token: token.clone(),
            job: idle,
        },
    );

    assert_eq!(state.phase(), Phase::Active);
    assert_eq!(state.progress().run_status, RunStatus::Unknown);
    assert!(!state.is_fetching_items());
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            token,
            delay: Duration::from_millis(2000),
        }]
    );
}

#[test]
fn resume_polls_immediately() {
    init_logging();
    let state = PollState::new(PollSettings::default());
    let job_id = JobId::from_upstream("ws_9");

    let (state, effects) = update(state, Msg::ResumeSearch(job_id.clone()));

    assert_eq!(state.phase(), Phase::Active);
    assert_eq!(state.job_id(), Some(&job_id));
    assert_eq!(
        effects,
        vec![
            Effect::CancelTimer,
            Effect::SchedulePoll {
                token: PollToken {
                    job_id,
                    epoch: state.epoch(),
                },
                delay: Duration::ZERO,
            },
        ]
    );
}

#[test]
fn custom_interval_and_page_size_are_used() {
    init_logging();
    let settings = PollSettings {
        interval: Duration::from_millis(500),
        page_size: 25,
    };
    let (state, _) = update(
        PollState::new(settings),
        Msg::ResumeSearch(JobId::from_upstream("ws_1")),
    );
    let token = state.token().unwrap();

    let (state, effects) = update(
        state,
        Msg::StatusFetched {
            token: token.clone(),
            job: running_webset(0, 0.0),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::FetchItems {
            token: token.clone(),
            page: PageRequest::first(25),
        }]
    );

    let (_state, effects) = update(
        state,
        Msg::ItemsFailed {
            token: token.clone(),
            error: "x".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            token,
            delay: Duration::from_millis(500),
        }]
    );
}
