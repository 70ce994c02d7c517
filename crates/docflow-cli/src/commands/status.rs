//! `docflow status`: graph counts.

use anyhow::{Context, Result};

use docflow_core::LoadConfig;

use super::connect;
use crate::output;

pub async fn execute(config: LoadConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let client = connect(&config).await?;
    output::print_counts(&client).await
}
