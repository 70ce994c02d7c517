//! Terminal output formatting.

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docflow_graph::{GraphStore, LoadSummary};

/// Skipped rows listed before the rest are summarized as a count.
const MAX_LISTED_SKIPS: usize = 10;

/// Progress bar over `len` source entries.
pub fn progress_bar(len: u64, unit: &str) -> Result<ProgressBar> {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{eta}})",
            unit
        ))?
        .progress_chars("=> "),
    );
    Ok(bar)
}

/// Print what a load wrote and what it skipped.
pub fn print_summary(title: &str, summary: &LoadSummary) {
    println!("\n{}", format!("{}:", title).green().bold());
    println!("  Rows read:              {}", summary.rows_read);
    if summary.links_written > 0 {
        println!("  Document links:         {}", summary.links_written);
    }
    if summary.events_created > 0 || summary.objects_created > 0 {
        println!("  Events created:         {}", summary.events_created);
        println!("  Objects created:        {}", summary.objects_created);
        println!("  Memberships created:    {}", summary.memberships_created);
    }
    println!("  Relationships created:  {}", summary.relationships_created());

    if summary.skipped.is_empty() {
        return;
    }
    println!(
        "  {}  {}",
        "Skipped:".yellow().bold(),
        summary.skipped.len().to_string().yellow()
    );
    for err in summary.skipped.iter().take(MAX_LISTED_SKIPS) {
        println!("    {} {}", "•".yellow(), err);
    }
    if summary.skipped.len() > MAX_LISTED_SKIPS {
        println!(
            "    {}",
            format!("... and {} more", summary.skipped.len() - MAX_LISTED_SKIPS).dimmed()
        );
    }
}

/// Print node, relationship and per-label counts.
pub async fn print_counts(store: &dyn GraphStore) -> Result<()> {
    let counts = store.counts().await?;
    let labels = store.label_counts().await?;

    println!("\n{}", "Graph Status".bold());
    println!("{}", "─".repeat(40));
    println!("  Nodes:         {}", counts.nodes.to_string().cyan());
    println!("  Relationships: {}", counts.relationships.to_string().cyan());
    if labels.is_empty() {
        println!("  {}", "Graph is empty.".dimmed());
    }
    for (label, count) in &labels {
        println!("  {:<14} {}", format!("{}:", label), count.to_string().cyan());
    }
    println!("{}", "─".repeat(40));

    Ok(())
}
