use std::time::Duration;

use pooler::error::ErrorKind;
use pooler::instance::{PoolerControlInstance, PoolerInstance};
use pooler::pooler_error;
use pooler::retry::Backoff;
use pooler::test_utils::admin::ScriptedAdminConnectionProvider;
use telemetry::tracing::init_test_tracing;

fn create_instance(
    provider: &ScriptedAdminConnectionProvider,
) -> PoolerControlInstance<ScriptedAdminConnectionProvider> {
    PoolerControlInstance::new(provider.clone())
        .with_backoff(Backoff::new(4, Duration::from_millis(10), 5.0))
}

#[tokio::test]
async fn resume_is_never_retried() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    let instance = create_instance(&provider);
    instance.pause().await.unwrap();

    provider.push_failures(ErrorKind::PoolerNotReady, 1);
    let err = instance.resume().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PoolerNotReady);
    assert_eq!(err.detail(), Some("while resuming the pooler"));
    assert_eq!(provider.executed(), vec!["PAUSE", "RESUME"]);
    assert!(instance.is_paused());
}

#[tokio::test]
async fn resume_without_connection_keeps_state() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    let instance = create_instance(&provider);
    instance.pause().await.unwrap();

    provider.fail_connections(pooler_error!(
        ErrorKind::AdminConnectionUnavailable,
        "Admin connection pool is closed"
    ));
    let err = instance.resume().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AdminConnectionUnavailable);
    assert_eq!(
        err.detail(),
        Some("while resuming the pooler, database `pgbouncer`")
    );
    assert_eq!(provider.executed(), vec!["PAUSE"]);
    assert!(instance.is_paused());
}

#[tokio::test]
async fn resume_on_active_instance_stays_active() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    let instance = create_instance(&provider);

    instance.resume().await.unwrap();

    assert!(!instance.is_paused());
    assert_eq!(provider.executed(), vec!["RESUME"]);
}

#[tokio::test(start_paused = true)]
async fn pause_resume_lifecycle_with_startup_race() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    let instance = create_instance(&provider);
    assert!(!instance.is_paused());

    // The pooler is still binding its socket for the first two attempts.
    provider.push_failures(ErrorKind::PoolerNotReady, 2);
    instance.pause().await.unwrap();
    assert!(instance.is_paused());

    instance.resume().await.unwrap();
    assert!(!instance.is_paused());

    provider.push_failures(ErrorKind::PoolerNotReady, 1);
    assert!(instance.resume().await.is_err());
    assert!(!instance.is_paused());

    assert_eq!(
        provider.executed(),
        vec!["PAUSE", "PAUSE", "PAUSE", "RESUME", "RESUME"]
    );
}
