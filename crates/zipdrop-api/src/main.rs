use std::time::Duration;
use zipdrop_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    zipdrop_infra::init_telemetry(json_logs)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let config = Config::from_env()?;
    tracing::info!(
        environment = %config.environment,
        store_backend = %config.store_backend,
        storage_backend = %config.storage_backend,
        "Configuration loaded and validated successfully"
    );

    let (state, router) = zipdrop_api::setup::initialize_app(config.clone()).await?;

    let scheduler = if config.sweep_interval_secs > 0 {
        tracing::info!(
            interval_secs = config.sweep_interval_secs,
            "Starting sweep scheduler"
        );
        Some(zipdrop_api::setup::scheduler::start_sweep_scheduler(
            state.service.clone(),
            Duration::from_secs(config.sweep_interval_secs),
        ))
    } else {
        None
    };

    zipdrop_api::setup::server::start_server(&config, router).await?;

    if let Some(handle) = scheduler {
        handle.abort();
    }

    Ok(())
}
