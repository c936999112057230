use crate::config::Config;
use crate::manager::FlagService;
use anyhow::{Context, Result};

pub async fn execute(config: &Config) -> Result<()> {
    let service = FlagService::from_config(config)
        .await
        .context("Failed to initialize flag service")?;

    println!("Warming cache from durable store...");
    let loaded = service.store().warmup().await.context("Warmup failed")?;
    println!("✅ Loaded {} flags into the cache.", loaded);
    Ok(())
}
