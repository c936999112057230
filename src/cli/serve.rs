use crate::config::Config;
use crate::manager::FlagService;
use anyhow::{Context, Result};

pub async fn execute(config: &Config) -> Result<()> {
    let service = FlagService::from_config(config)
        .await
        .context("Failed to initialize flag service")?;
    crate::server::serve(&config.server.bind, &service)
        .await
        .with_context(|| format!("HTTP server on {} failed", config.server.bind))
}
