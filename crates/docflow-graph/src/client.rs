//! Neo4j connection client.

use std::future::Future;
use std::time::Duration;

use neo4rs::{ConfigBuilder, Graph, Neo4jErrorKind, Query, Row};
use tracing::{info, warn};

use docflow_core::config::RetryConfig;
use docflow_core::StoreConfig;

use crate::error::{GraphError, GraphResult};

/// Handle to one Neo4j database.
///
/// Create one per command and pass it to every operation; there is no
/// process-wide session.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    retry: RetryConfig,
    apoc_clear: bool,
}

impl GraphClient {
    /// Connect and verify the server answers.
    ///
    /// neo4rs builds its pool lazily, so `Graph::connect` alone does not
    /// prove the server is reachable. A `RETURN 1` forces the bolt handshake
    /// and turns an unreachable store into an immediate [`GraphError::Connect`].
    pub async fn connect(config: &StoreConfig, retry: &RetryConfig) -> GraphResult<Self> {
        let connect_err = |source| GraphError::Connect {
            uri: config.uri.clone(),
            source,
        };

        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(1)
            .fetch_size(500)
            .build()
            .map_err(connect_err)?;

        let graph = Graph::connect(neo4j_config).await.map_err(connect_err)?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .map_err(connect_err)?;

        info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");

        Ok(Self {
            graph,
            retry: retry.clone(),
            apoc_clear: config.apoc_clear,
        })
    }

    /// Whether [`clear`](crate::GraphStore::clear) goes through APOC.
    pub fn apoc_clear(&self) -> bool {
        self.apoc_clear
    }

    /// Execute a Cypher statement that returns no rows.
    pub async fn execute(&self, query: Query) -> GraphResult<()> {
        let graph = &self.graph;
        let query = &query;
        self.with_retry(move || graph.run(query.clone())).await
    }

    /// Execute a Cypher query and collect its rows.
    pub async fn query(&self, query: Query) -> GraphResult<Vec<Row>> {
        let graph = &self.graph;
        let query = &query;
        self.with_retry(move || async move {
            let mut stream = graph.execute(query.clone()).await?;
            let mut rows = Vec::new();
            while let Some(row) = stream.next().await? {
                rows.push(row);
            }
            Ok::<_, neo4rs::Error>(rows)
        })
        .await
    }

    /// Execute a query and read one integer column from its first row.
    pub async fn query_count(&self, query: Query, field: &str) -> GraphResult<usize> {
        let rows = self.query(query).await?;
        match rows.into_iter().next() {
            Some(row) => {
                let value: i64 = row
                    .get(field)
                    .map_err(|e| GraphError::Decode(format!("field '{}': {:?}", field, e)))?;
                Ok(usize::try_from(value).unwrap_or(0))
            }
            None => Ok(0),
        }
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// Each statement runs in its own transaction, so a failed attempt leaves
    /// nothing behind and can be repeated.
    async fn with_retry<T, F, Fut>(&self, op: F) -> GraphResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, neo4rs::Error>>,
    {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(source) if attempt >= max_attempts || !is_transient(&source) => {
                    return Err(GraphError::Query {
                        attempts: attempt,
                        source,
                    })
                }
                Err(err) => {
                    let delay = backoff(self.retry.base_delay_ms, attempt);
                    warn!(attempt, max_attempts, delay_ms = delay.as_millis() as u64, error = %err, "Neo4j statement failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Whether a failed statement may succeed when sent again.
///
/// Server errors are retried only when Neo4j classifies them as transient.
/// Lost connections and socket errors are retried. Everything else (syntax,
/// constraint, authentication, decoding) fails the same way every time.
fn is_transient(err: &neo4rs::Error) -> bool {
    match err {
        neo4rs::Error::Neo4j(server) => matches!(server.kind(), Neo4jErrorKind::Transient),
        neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError => true,
        _ => false,
    }
}

/// Exponential backoff: `base`, `2 * base`, `4 * base`, ... capped at 30s.
fn backoff(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.saturating_sub(1).min(16);
    Duration::from_millis(base_ms.saturating_mul(factor).min(30_000))
}
