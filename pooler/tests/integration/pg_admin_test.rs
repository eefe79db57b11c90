use config::shared::{AdminConnectionConfig, ControllerConfig};
use pooler::admin::PgAdminConnectionPool;
use pooler::error::ErrorKind;
use pooler::instance::{PoolerControlInstance, PoolerInstance};
use telemetry::tracing::init_test_tracing;

fn unreachable_pool() -> PgAdminConnectionPool {
    PgAdminConnectionPool::new(AdminConnectionConfig {
        socket_dir: "/nonexistent/pooler/run".to_string(),
        connect_timeout_ms: 500,
        ..AdminConnectionConfig::default()
    })
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn pause_against_missing_pooler_exhausts_retries() {
    init_test_tracing();

    let mut config = ControllerConfig::default();
    config.pause_retry.initial_delay_ms = 1;
    let instance = PoolerControlInstance::from_config(unreachable_pool(), &config);

    let err = instance.pause().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PoolerNotReady);
    assert!(err.detail().unwrap().contains("gave up after 4 attempts"));
    assert!(!instance.is_paused());
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn resume_against_missing_pooler_fails_once() {
    init_test_tracing();

    let instance = PoolerControlInstance::new(unreachable_pool());

    let err = instance.resume().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PoolerNotReady);
    assert!(err.detail().unwrap().starts_with("while resuming the pooler"));
    assert!(!instance.is_paused());
}

#[tokio::test]
async fn closed_pool_fails_before_executing() {
    init_test_tracing();

    let pool = unreachable_pool();
    pool.close().await;
    let instance = PoolerControlInstance::new(pool);

    let err = instance.pause().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AdminConnectionUnavailable);
    assert!(!instance.is_paused());
}
