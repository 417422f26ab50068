use scout_core::{
    derive_job, derive_state, DerivedState, RunProgress, RunStatus, SearchJob, SearchRun,
    WebsetStatus,
};

fn run(status: RunStatus, found: u32, completion: f64) -> SearchRun {
    SearchRun {
        id: "se_1".to_string(),
        status,
        progress: RunProgress { found, completion },
        query: None,
    }
}

#[test]
fn missing_run_reports_unknown_with_zero_progress() {
    let derived = derive_state(WebsetStatus::Running, None);
    assert_eq!(derived.state, DerivedState::Active);
    assert_eq!(derived.run_status, RunStatus::Unknown);
    assert_eq!(derived.progress, RunProgress::default());
}

#[test]
fn live_runs_or_websets_are_active() {
    for (webset, status) in [
        (WebsetStatus::Idle, RunStatus::Running),
        (WebsetStatus::Idle, RunStatus::Created),
        (WebsetStatus::Pending, RunStatus::Unknown),
        (WebsetStatus::Running, RunStatus::Completed),
    ] {
        let run = run(status, 1, 10.0);
        let arg = (status != RunStatus::Unknown).then_some(&run);
        assert_eq!(
            derive_state(webset, arg).state,
            DerivedState::Active,
            "{webset:?}/{status:?}"
        );
    }
}

#[test]
fn settled_run_status_decides_terminal_state() {
    let cases = [
        (RunStatus::Completed, DerivedState::Completed),
        (RunStatus::Failed, DerivedState::Failed),
        (RunStatus::Canceled, DerivedState::Canceled),
    ];
    for (status, expected) in cases {
        let run = run(status, 7, 100.0);
        let derived = derive_state(WebsetStatus::Idle, Some(&run));
        assert_eq!(derived.state, expected);
        assert!(derived.state.is_terminal());
        assert_eq!(derived.progress.found, 7);
    }
}

#[test]
fn idle_webset_without_run_is_not_completion() {
    assert_eq!(
        derive_state(WebsetStatus::Idle, None).state,
        DerivedState::Dormant
    );
    assert_eq!(
        derive_state(WebsetStatus::Paused, None).state,
        DerivedState::Dormant
    );
    assert!(!DerivedState::Dormant.is_terminal());
}

#[test]
fn webset_level_terminal_status_without_run() {
    assert_eq!(
        derive_state(WebsetStatus::Completed, None).state,
        DerivedState::Completed
    );
    assert_eq!(
        derive_state(WebsetStatus::Failed, None).state,
        DerivedState::Failed
    );
}

#[test]
fn completion_is_clamped_to_percentage_range() {
    let over = run(RunStatus::Running, 1, 140.0);
    assert_eq!(
        derive_state(WebsetStatus::Running, Some(&over)).progress.completion,
        100.0
    );
    let under = run(RunStatus::Running, 1, -5.0);
    assert_eq!(
        derive_state(WebsetStatus::Running, Some(&under)).progress.completion,
        0.0
    );
}

#[test]
fn first_run_is_authoritative_and_unknown_values_decode() {
    let job: SearchJob = serde_json::from_value(serde_json::json!({
        "id": "ws_3",
        "status": "archived",
        "searches": [
            { "id": "se_a", "status": "failed" },
            { "id": "se_b", "status": "running", "progress": { "found": 9, "completion": 30 } }
        ]
    }))
    .unwrap();

    assert_eq!(job.status, WebsetStatus::Unknown);
    let derived = derive_job(&job);
    assert_eq!(derived.state, DerivedState::Failed);
    assert_eq!(derived.run_status, RunStatus::Failed);
    assert_eq!(derived.progress, RunProgress::default());
}
