use anyhow::Result;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use fleet_backoffice::config::EnvironmentConfig;
use fleet_backoffice::{seed, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EnvironmentConfig::from_env()?;
    let state = AppState::from_config(config).await?;
    seed::run(&state).await;
    Ok(())
}
