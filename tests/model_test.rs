use jobqueue::{DispatchState, QueueRequest, QueueStats};

#[test]
fn generated_requests_have_distinct_ids() {
    let a = QueueRequest::generate();
    let b = QueueRequest::generate();
    assert_ne!(a, b);
    assert_eq!(a.id().len(), 36);
    assert_eq!(a.to_string(), a.id());
}

#[test]
fn dispatch_state_parses_its_own_names() {
    assert_eq!(
        "executing".parse::<DispatchState>(),
        Ok(DispatchState::Executing)
    );
    assert!("running".parse::<DispatchState>().is_err());
    assert!(DispatchState::Stopped.is_terminal());
    assert!(!DispatchState::Idle.is_terminal());
}

#[test]
fn stats_serialize_with_snake_case_fields() {
    let stats = QueueStats {
        enqueued: 5,
        executed: 3,
        succeeded: 3,
        failed: 0,
        superseded: 2,
        last_dispatched: Some("5".to_string()),
    };
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["superseded"], 2);
    assert_eq!(json["last_dispatched"], "5");
    assert_eq!(
        serde_json::to_value(DispatchState::Draining).unwrap(),
        "draining"
    );
}
