//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了CLI命令行接口。

use crate::config::Config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::path::PathBuf;

mod flags;
mod serve;
mod status;
mod warmup;

pub use flags::{FlagsArgs, FlagsSubcommand};

#[derive(Parser, Debug)]
#[command(name = "flagcache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, env = "FLAGCACHE_CONFIG", help = "Path to the TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "FLAGCACHE_DATABASE_URL", help = "Durable store URL (overrides config)")]
    pub database_url: Option<String>,

    #[arg(long, env = "FLAGCACHE_REDIS_URL", help = "Redis URL (overrides config)")]
    pub redis_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(name = "serve", about = "Run the HTTP server")]
    Serve,

    #[command(name = "status", about = "Check cache and durable store health")]
    Status,

    #[command(name = "flags", about = "Read or modify flags")]
    Flags(FlagsArgs),

    #[command(name = "warmup", about = "Load every durable flag into the cache")]
    Warmup,
}

impl Cli {
    /// 加载配置文件并应用命令行覆盖项
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(url) = &self.database_url {
            config.store.url = SecretString::from(url.clone());
        }
        if let Some(url) = &self.redis_url {
            config.cache.redis.connection_string = SecretString::from(url.clone());
        }
        Ok(config)
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    crate::telemetry::init_tracing(&config.telemetry);

    let result = match &cli.command {
        Commands::Serve => serve::execute(&config).await,
        Commands::Status => status::execute(&config).await,
        Commands::Flags(args) => flags::execute(&config, args).await,
        Commands::Warmup => warmup::execute(&config).await,
    };

    crate::telemetry::shutdown_tracing();
    result
}
