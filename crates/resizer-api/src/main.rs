use anyhow::Context;
use resizer_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env().context("Failed to load configuration")?;

    resizer_infra::init_telemetry(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.log_format,
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let (_state, router) = resizer_api::setup::initialize_app(config.clone()).await?;

    resizer_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
