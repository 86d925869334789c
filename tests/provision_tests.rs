use std::fs;
use std::sync::Arc;
use std::time::Duration;

use dbdock::domain::{ContainerError, ContainerState, PostgresConfig};
use dbdock::services::Provisioner;
use dbdock::test_support::{MockEngine, NEVER_READY};

fn provisioner(mock: &Arc<MockEngine>) -> Provisioner {
    Provisioner::new(mock.clone()).with_readiness(10, Duration::from_millis(1))
}

/// Config on a non-default port, so tests skip the local port probe.
fn config(name: &str) -> PostgresConfig {
    let mut cfg = PostgresConfig::new(name);
    cfg.port = 5555;
    cfg
}

#[test]
fn empty_name_fails_without_touching_the_engine() {
    let mock = Arc::new(MockEngine::new());
    let mut cfg = config("");

    let result = provisioner(&mock).provision(&mut cfg);

    assert!(matches!(result, Err(ContainerError::InvalidConfig(_))));
    assert!(
        mock.calls().is_empty(),
        "validation failure must not invoke the engine"
    );
}

#[test]
fn missing_engine_fails_before_any_container_query() {
    let mock = Arc::new(MockEngine::new());
    mock.set_available(false);
    let mut cfg = config("mydb");

    let result = provisioner(&mock).provision(&mut cfg);

    assert!(matches!(result, Err(ContainerError::EngineNotFound)));
    assert!(!mock.calls().iter().any(|c| c.starts_with("state:")));
}

#[test]
fn existing_container_name_is_rejected() {
    let mock = Arc::new(MockEngine::new());
    mock.add_container("mydb", ContainerState::Stopped);
    let mut cfg = config("mydb");

    let result = provisioner(&mock).provision(&mut cfg);

    match result {
        Err(ContainerError::AlreadyExists(name)) => assert_eq!(name, "mydb"),
        other => panic!("expected AlreadyExists, got {other:?}"),
    }
    assert!(!mock.calls().iter().any(|c| c.starts_with("run:")));
}

#[test]
fn run_never_precedes_the_existence_query() {
    let mock = Arc::new(MockEngine::new());
    mock.add_image("postgres:15");
    let mut cfg = config("mydb");

    provisioner(&mock).provision(&mut cfg).unwrap();

    let calls = mock.calls();
    let state_idx = calls.iter().position(|c| c == "state:mydb").unwrap();
    let run_idx = calls.iter().position(|c| c == "run:mydb").unwrap();
    assert!(state_idx < run_idx);
}

#[test]
fn image_is_pulled_only_when_missing() {
    let mock = Arc::new(MockEngine::new());
    let mut cfg = config("fresh");
    provisioner(&mock).provision(&mut cfg).unwrap();
    assert!(mock.calls().contains(&"pull:postgres:15".to_string()));

    let mock = Arc::new(MockEngine::new());
    mock.add_image("postgres:15");
    let mut cfg = config("cached");
    provisioner(&mock).provision(&mut cfg).unwrap();
    assert!(!mock.calls().iter().any(|c| c.starts_with("pull:")));
}

#[test]
fn readiness_polling_stops_on_first_success() {
    let mock = Arc::new(MockEngine::new());
    mock.add_image("postgres:15");
    mock.set_failing_probes(3);
    let mut cfg = config("mydb");

    provisioner(&mock).provision(&mut cfg).unwrap();

    assert_eq!(mock.probe_count(), 4, "three failures, then one success");
}

#[test]
fn readiness_timeout_leaves_the_container_running() {
    let mock = Arc::new(MockEngine::new());
    mock.add_image("postgres:15");
    mock.set_failing_probes(NEVER_READY);
    let mut cfg = config("mydb");

    let result = Provisioner::new(mock.clone())
        .with_readiness(3, Duration::from_millis(1))
        .provision(&mut cfg);

    match result {
        Err(ContainerError::ReadinessTimeout { name, attempts }) => {
            assert_eq!(name, "mydb");
            assert_eq!(attempts, 3);
        }
        other => panic!("expected ReadinessTimeout, got {other:?}"),
    }
    assert_eq!(mock.probe_count(), 3, "polling must not retry indefinitely");
    // No automatic rollback: the container stays behind for inspection.
    assert_eq!(mock.get_state("mydb"), Some(ContainerState::Running));
}

#[test]
fn default_port_is_rewritten_to_the_effective_port() {
    let mock = Arc::new(MockEngine::new());
    mock.add_image("postgres:15");
    let mut cfg = PostgresConfig::new("mydb");
    assert_eq!(cfg.port, 5432);

    let details = provisioner(&mock).provision(&mut cfg).unwrap();

    // The probe picks 5432 itself when free, otherwise the next free port
    // in the 100-port window.
    assert!(details.port >= 5432 && details.port < 5532);
    assert_eq!(cfg.port, details.port);
    assert_eq!(mock.run_config("mydb").unwrap().port, details.port);
}

#[test]
fn non_default_port_is_used_verbatim() {
    let mock = Arc::new(MockEngine::new());
    mock.add_image("postgres:15");
    let mut cfg = config("mydb");

    let details = provisioner(&mock).provision(&mut cfg).unwrap();

    assert_eq!(details.port, 5555);
}

#[test]
fn successful_provision_reports_connection_details() {
    let mock = Arc::new(MockEngine::new());
    mock.add_image("postgres:16");
    let mut cfg = config("appdb");
    cfg.version = "16".to_string();
    cfg.user = "admin".to_string();
    cfg.password = "s3cret".to_string();
    cfg.database = "inventory".to_string();
    cfg.volume = Some("/data/pg".to_string());

    let details = provisioner(&mock).provision(&mut cfg).unwrap();

    assert_eq!(details.name, "appdb");
    assert_eq!(details.user, "admin");
    assert_eq!(details.database, "inventory");
    assert_eq!(details.volume.as_deref(), Some("/data/pg"));
    assert!(details.uri().contains(":s3cret@"));
    assert!(details.uri().ends_with("/inventory"));
    assert_eq!(mock.get_state("appdb"), Some(ContainerState::Running));
}

#[test]
fn engine_failure_during_run_aborts_without_cleanup() {
    let mock = Arc::new(MockEngine::new());
    mock.add_image("postgres:15");
    mock.set_fail_on("run");
    let mut cfg = config("mydb");

    let result = provisioner(&mock).provision(&mut cfg);

    assert!(matches!(result, Err(ContainerError::EngineFailure { .. })));
    assert!(!mock.calls().iter().any(|c| c.starts_with("probe:")));
    assert!(!mock.calls().iter().any(|c| c.starts_with("remove:")));
}

#[test]
fn init_script_order_survives_into_the_launch_config() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.sql");
    let second = dir.path().join("b.sql");
    fs::write(&first, "CREATE TABLE a (id int);").unwrap();
    fs::write(&second, "CREATE TABLE b (id int);").unwrap();

    let mock = Arc::new(MockEngine::new());
    mock.add_image("postgres:15");
    let mut cfg = config("mydb");
    cfg.init_scripts = vec![
        first.to_string_lossy().into_owned(),
        second.to_string_lossy().into_owned(),
    ];

    provisioner(&mock).provision(&mut cfg).unwrap();

    let launched = mock.run_config("mydb").unwrap();
    assert_eq!(launched.init_scripts.len(), 2);
    assert!(launched.init_scripts[0].ends_with("a.sql"));
    assert!(launched.init_scripts[1].ends_with("b.sql"));
}
