//! Lifecycle orchestration behavior against fake collaborators.

mod common;

use std::sync::Arc;

use warden_core::error::WardenError;
use warden_core::record::{ServiceStatus, ServiceUpdate};
use warden_core::store::ServiceStore;
use warden_daemon::MemoryStore;

use common::{orchestrator, spec, FakeGateway};

#[tokio::test]
async fn test_failed_install_persists_nothing() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    gateway.fail("install", "access denied");
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway);

    let err = orch.create(spec("web", Vec::new())).await.unwrap_err();
    match err {
        WardenError::Gateway { message, .. } => assert_eq!(message, "access denied"),
        other => panic!("expected gateway error, got {:?}", other),
    }

    // no partial state survives a failed create
    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_without_auto_start_is_stopped() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway.clone());

    let record = orch.create(spec("web", Vec::new())).await.unwrap();
    assert_eq!(record.status, ServiceStatus::Stopped);
    assert!(gateway.calls().contains(&"install:web".to_string()));
    assert!(!gateway.calls().contains(&"start:web".to_string()));
}

#[tokio::test]
async fn test_auto_start_success_is_running() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway);

    let mut request = spec("web", Vec::new());
    request.auto_start = true;
    let record = orch.create(request).await.unwrap();

    assert_eq!(record.status, ServiceStatus::Running);
    let stored = store.get(&record.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ServiceStatus::Running);
    assert!(stored.last_startup.unwrap().success);
}

#[tokio::test]
async fn test_auto_start_failure_still_persists_as_stopped() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    gateway.fail("start", "missing binary");
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway);

    let mut request = spec("web", Vec::new());
    request.auto_start = true;
    // install succeeded even if start did not
    let record = orch.create(request).await.unwrap();

    assert_eq!(record.status, ServiceStatus::Stopped);
    let stored = store.get(&record.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ServiceStatus::Stopped);
    let startup = stored.last_startup.unwrap();
    assert!(!startup.success);
    assert_eq!(startup.message.unwrap(), "missing binary");
}

#[tokio::test]
async fn test_create_rejects_missing_dependency() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway.clone());

    let missing = warden_core::record::ServiceId::new();
    let err = orch.create(spec("web", vec![missing])).await.unwrap_err();
    match err {
        WardenError::Validation(messages) => {
            assert!(messages[0].contains(&missing.to_string()));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    // rejected before any gateway call
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_security_rejection_short_circuits() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway.clone());

    let mut request = spec("web", Vec::new());
    request.arguments = vec!["8080; rm -rf /".to_string()];
    let err = orch.create(request).await.unwrap_err();
    assert!(matches!(err, WardenError::Security(_)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_start_failure_leaves_status_unchanged() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway.clone());

    let record = orch.create(spec("web", Vec::new())).await.unwrap();
    gateway.fail("start", "boom");

    assert!(orch.start(&record.id).await.is_err());
    let stored = store.get(&record.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ServiceStatus::Stopped);
}

#[tokio::test]
async fn test_start_while_running_is_state_conflict() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway);

    let record = orch.create(spec("web", Vec::new())).await.unwrap();
    orch.start(&record.id).await.unwrap();

    let err = orch.start(&record.id).await.unwrap_err();
    assert!(matches!(err, WardenError::StateConflict { .. }));
}

#[tokio::test]
async fn test_restart_stop_failure_short_circuits() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway.clone());

    let record = orch.create(spec("web", Vec::new())).await.unwrap();
    orch.start(&record.id).await.unwrap();

    gateway.fail("stop", "stop refused");
    let before = gateway.calls().len();
    let err = orch.restart(&record.id).await.unwrap_err();

    match err {
        WardenError::Gateway { message, .. } => assert_eq!(message, "stop refused"),
        other => panic!("expected gateway error, got {:?}", other),
    }
    // exactly one more gateway call happened, and it was the stop
    let calls = gateway.calls();
    assert_eq!(calls.len(), before + 1);
    assert_eq!(calls.last().unwrap(), "stop:web");
    // still running as far as the store is concerned
    let stored = store.get(&record.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ServiceStatus::Running);
}

#[tokio::test]
async fn test_delete_while_running_keeps_record() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway);

    let record = orch.create(spec("web", Vec::new())).await.unwrap();
    orch.start(&record.id).await.unwrap();

    let err = orch.delete(&record.id).await.unwrap_err();
    assert!(matches!(err, WardenError::StateConflict { .. }));
    assert!(store.get(&record.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_proceeds_when_best_effort_uninstall_fails() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway.clone());

    let record = orch.create(spec("web", Vec::new())).await.unwrap();
    gateway.fail("uninstall", "wrapper busy");

    orch.delete(&record.id).await.unwrap();
    assert!(store.get(&record.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_uninstall_running_service_stops_first() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway.clone());

    let record = orch.create(spec("web", Vec::new())).await.unwrap();
    orch.start(&record.id).await.unwrap();

    orch.uninstall(&record.id).await.unwrap();
    let calls = gateway.calls();
    let stop_pos = calls.iter().position(|c| c == "stop:web").unwrap();
    let uninstall_pos = calls.iter().position(|c| c == "uninstall:web").unwrap();
    assert!(stop_pos < uninstall_pos);
    assert!(store.get(&record.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_uninstall_gateway_failure_keeps_record() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway.clone());

    let record = orch.create(spec("web", Vec::new())).await.unwrap();
    gateway.fail("uninstall", "locked");

    assert!(orch.uninstall(&record.id).await.is_err());
    assert!(store.get(&record.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_update_keeps_operational_status() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway);

    let record = orch.create(spec("web", Vec::new())).await.unwrap();
    orch.start(&record.id).await.unwrap();

    let updated = orch
        .update(
            &record.id,
            ServiceUpdate {
                arguments: Some(vec!["--port".to_string(), "9090".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, ServiceStatus::Running);
    assert_eq!(updated.arguments, vec!["--port", "9090"]);
}

#[tokio::test]
async fn test_start_with_dependencies_starts_in_order() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway.clone());

    let db = orch.create(spec("db", Vec::new())).await.unwrap();
    let api = orch.create(spec("api", vec![db.id])).await.unwrap();
    let web = orch.create(spec("web", vec![api.id])).await.unwrap();

    let started = orch.start_with_dependencies(&web.id).await.unwrap();
    assert_eq!(started, vec![db.id, api.id, web.id]);

    let starts: Vec<_> = gateway
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("start:"))
        .collect();
    assert_eq!(starts, vec!["start:db", "start:api", "start:web"]);
}

#[tokio::test]
async fn test_start_with_dependencies_aborts_on_first_failure() {
    let store = MemoryStore::new();
    let gateway = FakeGateway::new();
    let (orch, _dir) = orchestrator(Arc::new(store.clone()), gateway.clone());

    let db = orch.create(spec("db", Vec::new())).await.unwrap();
    let api = orch.create(spec("api", vec![db.id])).await.unwrap();
    let web = orch.create(spec("web", vec![api.id])).await.unwrap();

    // db starts fine, api refuses
    orch.start(&db.id).await.unwrap();
    gateway.fail("start", "api broken");

    assert!(orch.start_with_dependencies(&web.id).await.is_err());

    // db stayed running, web was never attempted
    assert_eq!(
        store.get(&db.id).await.unwrap().unwrap().status,
        ServiceStatus::Running
    );
    assert!(!gateway.calls().contains(&"start:web".to_string()));
    assert_eq!(
        store.get(&web.id).await.unwrap().unwrap().status,
        ServiceStatus::Stopped
    );
}
