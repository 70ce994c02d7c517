//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use docflow_core::{ErrorMode, LoadConfig};
use docflow_graph::{GraphClient, GraphStore, MemoryGraph};

pub mod clear;
pub mod ocel;
pub mod status;
pub mod vbfa;

/// Load SAP document flows and OCEL event logs into Neo4j
#[derive(Parser, Debug)]
#[command(name = "docflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML config file; flags override its values
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Neo4j URI
    #[arg(long, global = true, env = "NEO4J_URI")]
    pub uri: Option<String>,

    /// Neo4j user
    #[arg(long, global = true, env = "NEO4J_USER")]
    pub user: Option<String>,

    /// Neo4j password
    #[arg(long, global = true, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Neo4j database
    #[arg(long, global = true, env = "NEO4J_DATABASE")]
    pub database: Option<String>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a VBFA document-flow table (Parquet)
    Vbfa(vbfa::VbfaArgs),

    /// Load an OCEL log (.jsonocel or .xmlocel)
    Ocel(ocel::OcelArgs),

    /// Delete every node, relationship and index
    Clear(clear::ClearArgs),

    /// Show node and relationship counts
    Status,
}

/// Flags shared by the load commands.
#[derive(Args, Debug, Default)]
pub struct LoadArgs {
    /// Clear the database before loading
    #[arg(long)]
    pub clear: bool,

    /// Abort at the first bad row instead of skipping it
    #[arg(long)]
    pub fail_fast: bool,

    /// Rows written per statement
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Load into an in-memory graph and print the counts
    #[arg(long)]
    pub dry_run: bool,
}

impl LoadArgs {
    fn apply(&self, config: &mut LoadConfig) {
        if self.clear {
            config.clear = true;
        }
        if self.fail_fast {
            config.error_mode = ErrorMode::FailFast;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.base_config()?;

        match self.command {
            Commands::Vbfa(args) => vbfa::execute(args, config).await,
            Commands::Ocel(args) => ocel::execute(args, config).await,
            Commands::Clear(args) => clear::execute(args, config).await,
            Commands::Status => status::execute(config).await,
        }
    }

    /// Config file (or defaults) with the connection flags applied.
    fn base_config(&self) -> Result<LoadConfig> {
        let mut config = match &self.config {
            Some(path) => LoadConfig::from_file(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => LoadConfig::default(),
        };

        if let Some(uri) = &self.uri {
            config.store.uri = uri.clone();
        }
        if let Some(user) = &self.user {
            config.store.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.store.password = password.clone();
        }
        if let Some(database) = &self.database {
            config.store.database = database.clone();
        }
        Ok(config)
    }
}

/// Validate the config, then open the store a command writes to.
async fn open_store(config: &LoadConfig, dry_run: bool) -> Result<Box<dyn GraphStore>> {
    config.validate().context("Invalid configuration")?;
    if dry_run {
        return Ok(Box::new(MemoryGraph::new()));
    }
    Ok(Box::new(connect(config).await?))
}

async fn connect(config: &LoadConfig) -> Result<GraphClient> {
    GraphClient::connect(&config.store, &config.retry)
        .await
        .with_context(|| format!("Failed to connect to Neo4j at {}", config.store.uri))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_core::{ClientAttribution, EdgePolicy};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_vbfa_flags() {
        let cli = parse(&[
            "docflow",
            "--uri",
            "neo4j://db:7687",
            "vbfa",
            "vbfa.parquet",
            "--clear",
            "--fail-fast",
            "--batch-size",
            "50",
            "--edge-policy",
            "merge",
            "--client-attribution",
            "resolved",
        ]);
        let mut config = cli.base_config().unwrap();
        assert_eq!(config.store.uri, "neo4j://db:7687");

        match cli.command {
            Commands::Vbfa(args) => {
                args.apply(&mut config);
                assert!(config.clear);
                assert_eq!(config.error_mode, ErrorMode::FailFast);
                assert_eq!(config.batch_size, 50);
                assert_eq!(config.edge_policy, EdgePolicy::Merge);
                assert_eq!(config.client_attribution, ClientAttribution::Resolved);
                assert_eq!(config.source, Some(PathBuf::from("vbfa.parquet")));
            }
            other => panic!("expected vbfa, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_untouched_without_flags() {
        let cli = parse(&["docflow", "ocel", "log.jsonocel"]);
        let mut config = cli.base_config().unwrap();
        match cli.command {
            Commands::Ocel(args) => args.apply(&mut config),
            other => panic!("expected ocel, got {:?}", other),
        }
        assert!(!config.clear);
        assert_eq!(config.error_mode, ErrorMode::Skip);
        assert_eq!(config.batch_size, LoadConfig::default().batch_size);
    }

    #[test]
    fn test_unknown_edge_policy_rejected() {
        assert!(Cli::try_parse_from(["docflow", "vbfa", "x.parquet", "--edge-policy", "dedupe"]).is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docflow.toml");
        std::fs::write(&path, "batch_size = 20\n[store]\nuser = \"loader\"\n").unwrap();

        let cli = parse(&["docflow", "--config", path.to_str().unwrap(), "--user", "admin", "status"]);
        let config = cli.base_config().unwrap();
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.store.user, "admin");
    }
}
