//! `docflow ocel`: load an OCEL event log.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use docflow_core::LoadConfig;
use docflow_graph::load_ocel;
use docflow_source::read_ocel;

use super::{open_store, LoadArgs};
use crate::output;

#[derive(Args, Debug)]
pub struct OcelArgs {
    /// OCEL log; the format follows the extension (.jsonocel, .xmlocel)
    pub path: PathBuf,

    #[command(flatten)]
    pub load: LoadArgs,
}

impl OcelArgs {
    pub(crate) fn apply(&self, config: &mut LoadConfig) {
        self.load.apply(config);
        config.source = Some(self.path.clone());
    }
}

pub async fn execute(args: OcelArgs, mut config: LoadConfig) -> Result<()> {
    args.apply(&mut config);
    let store = open_store(&config, args.load.dry_run).await?;
    let source = config.require_source()?;

    println!("{} {}", "Reading".bold(), source.display());
    let log = read_ocel(source)
        .with_context(|| format!("Failed to read OCEL log {}", source.display()))?;
    println!(
        "  {} events, {} objects, {} relations",
        log.events.len().to_string().cyan(),
        log.objects.len().to_string().cyan(),
        log.relations.len().to_string().cyan()
    );

    let total = log.events.len() + log.objects.len() + log.relations.len();
    let bar = output::progress_bar(total as u64, "entries")?;
    let result = load_ocel(store.as_ref(), &log, &config, |n| bar.inc(n as u64)).await;
    bar.finish_and_clear();
    let summary = result.context("Failed to load OCEL log")?;

    output::print_summary("OCEL log loaded", &summary);
    if args.load.dry_run {
        output::print_counts(store.as_ref()).await?;
    }
    Ok(())
}
