use std::time::Duration;

use config::shared::PauseRetryPolicy;
use pooler::error::ErrorKind;
use pooler::instance::{PoolerControlInstance, PoolerInstance};
use pooler::pooler_error;
use pooler::retry::{Backoff, pause_retry_predicate};
use pooler::test_utils::admin::ScriptedAdminConnectionProvider;
use telemetry::tracing::init_test_tracing;

fn create_instance(
    provider: &ScriptedAdminConnectionProvider,
) -> PoolerControlInstance<ScriptedAdminConnectionProvider> {
    PoolerControlInstance::new(provider.clone())
        .with_backoff(Backoff::new(4, Duration::from_millis(10), 5.0).with_jitter(0.1))
}

#[tokio::test(start_paused = true)]
async fn pause_retries_until_pooler_is_reachable() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    provider.push_failures(ErrorKind::PoolerNotReady, 2);
    let instance = create_instance(&provider);

    instance.pause().await.unwrap();

    assert!(instance.is_paused());
    assert_eq!(provider.executed(), vec!["PAUSE", "PAUSE", "PAUSE"]);
    // A single handle serves every attempt.
    assert_eq!(provider.connection_requests(), vec!["pgbouncer"]);
}

#[tokio::test(start_paused = true)]
async fn pause_returns_last_error_when_budget_is_exhausted() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    provider.push_failures(ErrorKind::PoolerNotReady, 3);
    provider.push_outcome(Err(pooler_error!(
        ErrorKind::PoolerNotReady,
        "Pooler connection closed"
    )));
    let instance = create_instance(&provider);

    let err = instance.pause().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PoolerNotReady);
    assert_eq!(err.description(), "Pooler connection closed");
    assert_eq!(
        err.detail(),
        Some("while pausing the pooler: gave up after 4 attempts")
    );
    assert_eq!(provider.execution_count(), 4);
    assert!(!instance.is_paused());
}

#[tokio::test(start_paused = true)]
async fn failed_pause_keeps_previous_paused_state() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    let instance = create_instance(&provider);
    instance.pause().await.unwrap();
    assert!(instance.is_paused());

    provider.push_failures(ErrorKind::PoolerNotReady, 4);
    assert!(instance.pause().await.is_err());

    assert!(instance.is_paused());
    assert_eq!(provider.execution_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn rejected_pause_is_not_retried_by_default() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    provider.push_failures(ErrorKind::PermissionDenied, 1);
    let instance = create_instance(&provider);

    let err = instance.pause().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert_eq!(provider.execution_count(), 1);
    assert!(!instance.is_paused());
}

#[tokio::test(start_paused = true)]
async fn any_error_policy_retries_rejected_pause() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    provider.push_failures(ErrorKind::AdminCommandRejected, 3);
    let instance = create_instance(&provider)
        .with_retry_predicate(pause_retry_predicate(PauseRetryPolicy::AnyError));

    instance.pause().await.unwrap();

    assert!(instance.is_paused());
    assert_eq!(provider.execution_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn custom_predicate_decides_what_is_retried() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    provider.push_failures(ErrorKind::AuthenticationFailed, 1);
    provider.push_failures(ErrorKind::PoolerNotReady, 1);
    let instance = create_instance(&provider).with_retry_predicate(
        |err: &pooler::error::PoolerError| err.kind() == ErrorKind::AuthenticationFailed,
    );

    let err = instance.pause().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PoolerNotReady);
    assert_eq!(provider.execution_count(), 2);
    assert!(!instance.is_paused());
}

#[tokio::test]
async fn pause_without_connection_executes_nothing() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    provider.fail_connections(pooler_error!(
        ErrorKind::PoolerNotReady,
        "Pooler socket unreachable"
    ));
    let instance = create_instance(&provider);

    let err = instance.pause().await.unwrap_err();

    // Acquisition failures are never retried, whatever their kind.
    assert_eq!(err.kind(), ErrorKind::AdminConnectionUnavailable);
    assert_eq!(provider.connection_requests().len(), 1);
    assert_eq!(provider.execution_count(), 0);
    assert!(!instance.is_paused());
}
