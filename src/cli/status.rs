use crate::config::Config;
use crate::health::TierStatus;
use crate::manager::FlagService;
use anyhow::{bail, Context, Result};

pub async fn execute(config: &Config) -> Result<()> {
    let service = FlagService::from_config(config)
        .await
        .context("Failed to initialize flag service")?;
    let report = service.store().health().await;

    println!("=== Flag Service Status ===\n");
    print_tier("Cache", &report.cache);
    print_tier("Store", &report.store);
    println!("\nOverall: {}", report.status());

    if !report.is_healthy() {
        bail!("flag service is degraded");
    }
    Ok(())
}

fn print_tier(name: &str, status: &TierStatus) {
    match status {
        TierStatus::Up => println!("{:<6} ✅ UP", name),
        TierStatus::Down(reason) => println!("{:<6} ❌ DOWN ({})", name, reason),
    }
}
