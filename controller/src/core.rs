use config::shared::ControllerConfig;
use pooler::admin::{ControlCommand, PgAdminConnectionPool};
use pooler::instance::{PoolerControlInstance, PoolerInstance};
use tracing::info;

/// Sends `command` to the local pooler and waits for it to be acknowledged.
pub async fn run_command(config: ControllerConfig, command: ControlCommand) -> anyhow::Result<()> {
    log_config(&config);

    let pool = PgAdminConnectionPool::new(config.admin.clone());
    let instance = PoolerControlInstance::from_config(pool.clone(), &config);

    let result = match command {
        ControlCommand::Pause => instance.pause().await,
        ControlCommand::Resume => instance.resume().await,
    };
    pool.close().await;
    result?;

    info!(%command, paused = instance.is_paused(), "pooler command completed");

    Ok(())
}

fn log_config(config: &ControllerConfig) {
    info!(
        socket_dir = %config.admin.socket_dir,
        port = config.admin.port,
        username = %config.admin.username,
        database = %config.admin.database,
        "admin console config"
    );
    info!(
        max_attempts = config.pause_retry.max_attempts,
        initial_delay_ms = config.pause_retry.initial_delay_ms,
        backoff_multiplier = config.pause_retry.backoff_multiplier,
        policy = ?config.pause_retry.policy,
        "pause retry config"
    );
}
