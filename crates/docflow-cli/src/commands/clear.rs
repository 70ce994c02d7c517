//! `docflow clear`: empty the database.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use docflow_core::LoadConfig;
use docflow_graph::GraphStore;

use super::connect;

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Confirm destructive operation
    #[arg(long)]
    pub confirm: bool,
}

pub async fn execute(args: ClearArgs, config: LoadConfig) -> Result<()> {
    if !args.confirm {
        println!("{}", "This will permanently delete from".red().bold());
        println!("  {} {} (database {})", "•".red(), config.store.uri, config.store.database);
        println!("  {} every node and relationship", "•".red());
        println!("  {} every index not backing a constraint", "•".red());
        println!();
        println!("Run with {} to confirm.", "--confirm".bold());
        return Ok(());
    }

    config.validate().context("Invalid configuration")?;
    let client = connect(&config).await?;

    println!("{}", "Clearing database...".red().bold());
    client.clear().await.context("Failed to clear database")?;
    println!("  {} Removed all nodes, relationships and indexes", "✓".green());

    Ok(())
}
