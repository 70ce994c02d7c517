//! Load configuration.
//!
//! A [`LoadConfig`] is assembled from defaults, an optional TOML file and
//! command-line overrides, then checked once with [`LoadConfig::validate`]
//! before any store connection is made.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{DocflowError, DocflowResult};

/// Largest accepted batch size.
pub const MAX_BATCH_SIZE: usize = 100_000;

const URI_SCHEMES: &[&str] = &["bolt", "bolt+s", "bolt+ssc", "neo4j", "neo4j+s", "neo4j+ssc"];

/// What to do with a row that cannot be transformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorMode {
    /// Abort the load at the first bad row.
    FailFast,
    /// Log the row and keep going.
    #[default]
    Skip,
}

/// How `PREVIOUS_DOC_OF` relationships are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgePolicy {
    /// Always create a new relationship; reloading multiplies edges.
    #[default]
    Append,
    /// Merge on all relationship properties; identical rows share one edge.
    Merge,
}

/// Which client a newly created preceding document node receives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientAttribution {
    /// The client of the row that references the document.
    #[default]
    CurrentRow,
    /// The client resolved from the row where the document is itself current.
    Resolved,
}

macro_rules! kebab_enum {
    ($ty:ty, $name:literal, { $($variant:path => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        // Config files accept the same spellings as the command line.
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }

        impl FromStr for $ty {
            type Err = DocflowError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    other => Err(DocflowError::invalid_config(format!(
                        "unknown {} '{}'", $name, other
                    ))),
                }
            }
        }
    };
}

kebab_enum!(ErrorMode, "error mode", {
    ErrorMode::FailFast => "fail-fast",
    ErrorMode::Skip => "skip",
});

kebab_enum!(EdgePolicy, "edge policy", {
    EdgePolicy::Append => "append",
    EdgePolicy::Merge => "merge",
});

kebab_enum!(ClientAttribution, "client attribution", {
    ClientAttribution::CurrentRow => "current-row",
    ClientAttribution::Resolved => "resolved",
});

/// Connection settings for the Neo4j store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Clear through `apoc.periodic.iterate` instead of one `DETACH DELETE`.
    pub apoc_clear: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
            apoc_clear: true,
        }
    }
}

/// Bounded retry for store writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
        }
    }
}

/// Everything a load run needs to know.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub source: Option<PathBuf>,
    pub store: StoreConfig,
    pub clear: bool,
    pub error_mode: ErrorMode,
    pub batch_size: usize,
    pub edge_policy: EdgePolicy,
    pub client_attribution: ClientAttribution,
    pub retry: RetryConfig,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            source: None,
            store: StoreConfig::default(),
            clear: false,
            error_mode: ErrorMode::default(),
            batch_size: 500,
            edge_policy: EdgePolicy::default(),
            client_attribution: ClientAttribution::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl LoadConfig {
    /// Read a config from a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> DocflowResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> DocflowResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Check the config before it is used.
    pub fn validate(&self) -> DocflowResult<()> {
        let uri = self.store.uri.trim();
        if uri.is_empty() {
            return Err(DocflowError::invalid_config("store URI is empty"));
        }
        let scheme = uri.split("://").next().unwrap_or_default();
        if !uri.contains("://") || !URI_SCHEMES.contains(&scheme) {
            return Err(DocflowError::invalid_config(format!(
                "store URI '{}' must use one of: {}",
                uri,
                URI_SCHEMES.join(", ")
            )));
        }
        if self.store.user.trim().is_empty() {
            return Err(DocflowError::invalid_config("store user is empty"));
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(DocflowError::invalid_config(format!(
                "batch size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(DocflowError::invalid_config("retry.max_attempts must be at least 1"));
        }

        if let Some(source) = &self.source {
            if !source.exists() {
                return Err(DocflowError::invalid_config(format!(
                    "source '{}' does not exist",
                    source.display()
                )));
            }
            if !source.is_file() {
                return Err(DocflowError::invalid_config(format!(
                    "source '{}' is not a file",
                    source.display()
                )));
            }
        }

        Ok(())
    }

    /// The source path, which load commands require.
    pub fn require_source(&self) -> DocflowResult<&Path> {
        self.source
            .as_deref()
            .ok_or_else(|| DocflowError::invalid_config("no source file given"))
    }
}
