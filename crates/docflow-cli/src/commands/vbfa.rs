//! `docflow vbfa`: load a VBFA document-flow table.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use docflow_core::{ClientAttribution, EdgePolicy, LoadConfig};
use docflow_graph::load_vbfa;
use docflow_source::read_parquet;

use super::{open_store, LoadArgs};
use crate::output;

#[derive(Args, Debug)]
pub struct VbfaArgs {
    /// Parquet file with VBFA rows
    pub path: PathBuf,

    #[command(flatten)]
    pub load: LoadArgs,

    /// append: one edge per row; merge: identical rows share an edge
    #[arg(long)]
    pub edge_policy: Option<EdgePolicy>,

    /// Client given to a newly created preceding document (current-row|resolved)
    #[arg(long)]
    pub client_attribution: Option<ClientAttribution>,
}

impl VbfaArgs {
    pub(crate) fn apply(&self, config: &mut LoadConfig) {
        self.load.apply(config);
        config.source = Some(self.path.clone());
        if let Some(policy) = self.edge_policy {
            config.edge_policy = policy;
        }
        if let Some(attribution) = self.client_attribution {
            config.client_attribution = attribution;
        }
    }
}

pub async fn execute(args: VbfaArgs, mut config: LoadConfig) -> Result<()> {
    args.apply(&mut config);
    let store = open_store(&config, args.load.dry_run).await?;
    let source = config.require_source()?;

    println!("{} {}", "Reading".bold(), source.display());
    let table = read_parquet(source)
        .with_context(|| format!("Failed to read VBFA table {}", source.display()))?;

    let bar = output::progress_bar(table.row_count() as u64, "rows")?;
    let result = load_vbfa(store.as_ref(), table, &config, |n| bar.inc(n as u64)).await;
    bar.finish_and_clear();
    let summary = result.context("Failed to load document chain")?;

    output::print_summary("Document chain loaded", &summary);
    if args.load.dry_run {
        output::print_counts(store.as_ref()).await?;
    }
    Ok(())
}
