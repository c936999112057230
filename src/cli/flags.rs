use crate::client::FlagStore;
use crate::config::Config;
use crate::manager::FlagService;
use crate::model::Flag;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
pub struct FlagsArgs {
    #[command(subcommand)]
    pub command: FlagsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum FlagsSubcommand {
    #[command(about = "List all flags")]
    List,

    #[command(about = "Show one flag")]
    Get { key: String },

    #[command(about = "Create or replace a flag")]
    Set {
        key: String,

        #[arg(long, action = ArgAction::Set, help = "Whether the flag is on")]
        enabled: bool,

        #[arg(short, long, help = "Optional description")]
        description: Option<String>,
    },

    #[command(about = "Delete a flag")]
    Delete { key: String },
}

pub async fn execute(config: &Config, args: &FlagsArgs) -> Result<()> {
    let service = FlagService::from_config(config)
        .await
        .context("Failed to initialize flag service")?;
    let store = service.store();

    match &args.command {
        FlagsSubcommand::List => {
            let flags = store.get_all().await?;
            println!("{}", serde_json::to_string_pretty(&flags)?);
        }
        FlagsSubcommand::Get { key } => match store.get(key).await? {
            Some(flag) => println!("{}", serde_json::to_string_pretty(&flag)?),
            None => println!("Flag '{}' not found", key),
        },
        FlagsSubcommand::Set {
            key,
            enabled,
            description,
        } => {
            let mut flag = Flag::new(key.clone(), *enabled);
            flag.description = description.clone();
            store
                .set(&flag)
                .await
                .with_context(|| format!("Failed to save flag '{}'", key))?;
            println!("✅ Flag '{}' saved.", key);
        }
        FlagsSubcommand::Delete { key } => {
            store
                .delete(key)
                .await
                .with_context(|| format!("Failed to delete flag '{}'", key))?;
            println!("✅ Flag '{}' deleted.", key);
        }
    }
    Ok(())
}
