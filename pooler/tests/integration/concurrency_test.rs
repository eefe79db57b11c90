use std::sync::Arc;
use std::time::Duration;

use pooler::error::ErrorKind;
use pooler::instance::{PoolerControlInstance, PoolerInstance};
use pooler::retry::Backoff;
use pooler::test_utils::admin::ScriptedAdminConnectionProvider;
use telemetry::tracing::init_test_tracing;
use tokio::task::JoinSet;

fn create_instance(
    provider: &ScriptedAdminConnectionProvider,
) -> Arc<PoolerControlInstance<ScriptedAdminConnectionProvider>> {
    Arc::new(
        PoolerControlInstance::new(provider.clone())
            .with_backoff(Backoff::new(4, Duration::from_millis(10), 5.0)),
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn is_paused_does_not_wait_for_in_flight_pause() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    provider.push_failures(ErrorKind::PoolerNotReady, 1);
    let release = provider.hold_executions();
    let executed = provider.notify_on_execute();
    let instance = create_instance(&provider);

    let pause = tokio::spawn({
        let instance = instance.clone();
        async move { instance.pause().await }
    });

    // First attempt is held by the provider.
    executed.notified().await;
    assert!(!instance.is_paused());

    // Let it fail; the retry reaches the provider after the backoff and is held again.
    release.notify_one();
    executed.notified().await;
    assert!(!instance.is_paused());
    assert_eq!(provider.execution_count(), 2);

    release.notify_one();
    pause.await.unwrap().unwrap();
    assert!(instance.is_paused());
}

#[tokio::test(flavor = "multi_thread")]
async fn paused_state_is_visible_to_every_task() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    let instance = create_instance(&provider);
    instance.pause().await.unwrap();

    let mut readers = JoinSet::new();
    for _ in 0..16 {
        let instance = instance.clone();
        readers.spawn(async move { instance.is_paused() });
    }

    while let Some(paused) = readers.join_next().await {
        assert!(paused.unwrap());
    }

    instance.resume().await.unwrap();
    assert!(!instance.is_paused());
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_pause_and_resume_both_complete() {
    init_test_tracing();

    let provider = ScriptedAdminConnectionProvider::new();
    let instance = create_instance(&provider);

    let mut operations = JoinSet::new();
    for i in 0..8 {
        let instance = instance.clone();
        operations.spawn(async move {
            if i % 2 == 0 {
                instance.pause().await
            } else {
                instance.resume().await
            }
        });
    }

    while let Some(result) = operations.join_next().await {
        result.unwrap().unwrap();
    }

    let executed = provider.executed();
    assert_eq!(executed.iter().filter(|command| *command == "PAUSE").count(), 4);
    assert_eq!(executed.iter().filter(|command| *command == "RESUME").count(), 4);
}
