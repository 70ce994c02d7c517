//! VBFA document-chain load.
//!
//! Resolves every row into a [`ChainLink`] and writes the links in batches:
//! - (:Document {d_num, d_type, client}) merged by `(d_num, d_type)`
//! - (:Document)-[:PREVIOUS_DOC_OF {from, to, created, sub_item, prec_item}]->(:Document)

use tracing::info;

use docflow_core::{ChainLink, ChainResolver, LoadConfig};
use docflow_source::VbfaTable;

use super::{batch_size, LoadSummary};
use crate::error::{GraphError, GraphResult};
use crate::store::GraphStore;

/// Load a VBFA table into `store`.
///
/// `progress` receives the number of rows handled after every batch.
pub async fn load_vbfa<S, P>(
    store: &S,
    table: VbfaTable,
    config: &LoadConfig,
    mut progress: P,
) -> GraphResult<LoadSummary>
where
    S: GraphStore + ?Sized,
    P: FnMut(usize),
{
    let batch_size = batch_size(config)?;
    let mut summary = LoadSummary {
        rows_read: table.row_count(),
        ..LoadSummary::default()
    };

    for rejected in table.rejected {
        summary.reject(GraphError::Row(rejected), config.error_mode)?;
    }
    if !summary.skipped.is_empty() {
        progress(summary.skipped.len());
    }

    if config.clear {
        store.clear().await?;
    }
    store.ensure_document_indexes().await?;

    let resolver = ChainResolver::new(&table.records);
    info!(
        rows = table.records.len(),
        documents = resolver.indexed_documents(),
        batch_size,
        edge_policy = %config.edge_policy,
        "Loading document chain"
    );

    let mut batch: Vec<ChainLink> = Vec::with_capacity(batch_size);
    let mut handled = 0;
    for result in resolver.resolve() {
        handled += 1;
        match result {
            Ok(link) => batch.push(link),
            Err(err) => {
                if let Err(err) = summary.reject(GraphError::Row(err), config.error_mode) {
                    // Every row before the bad one is written before aborting.
                    write_batch(store, &mut batch, config, &mut summary).await?;
                    return Err(err);
                }
            }
        }

        if batch.len() >= batch_size {
            write_batch(store, &mut batch, config, &mut summary).await?;
            progress(handled);
            handled = 0;
        }
    }
    write_batch(store, &mut batch, config, &mut summary).await?;
    if handled > 0 {
        progress(handled);
    }

    info!(
        links = summary.links_written,
        skipped = summary.skipped.len(),
        "Document chain loaded"
    );
    Ok(summary)
}

async fn write_batch<S>(
    store: &S,
    batch: &mut Vec<ChainLink>,
    config: &LoadConfig,
    summary: &mut LoadSummary,
) -> GraphResult<()>
where
    S: GraphStore + ?Sized,
{
    if batch.is_empty() {
        return Ok(());
    }
    store
        .upsert_chain(batch, config.edge_policy, config.client_attribution)
        .await?;
    summary.links_written += batch.len();
    batch.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_core::{DocflowError, DocumentRecord, EdgePolicy, ErrorMode};

    use crate::{GraphCounts, MemoryGraph};

    fn record(row: usize, number: &str, client: &str, code: &str, prev: &str, prev_code: &str) -> DocumentRecord {
        DocumentRecord {
            row,
            document_number: number.to_string(),
            client: client.to_string(),
            doc_type_code: code.to_string(),
            prev_document_number: Some(prev.to_string()),
            prev_doc_type_code: prev_code.to_string(),
            current_item_pos: Some("000010".to_string()),
            prev_item_pos: Some("000010".to_string()),
            creation_date: "20230101".to_string(),
            creation_time: "120000".to_string(),
        }
    }

    fn table(records: Vec<DocumentRecord>) -> VbfaTable {
        VbfaTable {
            records,
            rejected: Vec::new(),
        }
    }

    fn config(batch_size: usize) -> LoadConfig {
        LoadConfig {
            batch_size,
            ..LoadConfig::default()
        }
    }

    #[tokio::test]
    async fn test_chain_load() {
        let graph = MemoryGraph::new();
        let records = vec![
            record(0, "B", "100", "J", "A", "C"),
            record(1, "C", "100", "M", "B", "J"),
        ];
        let summary = load_vbfa(&graph, table(records), &config(1), |_| {}).await.unwrap();

        assert_eq!(summary.links_written, 2);
        assert_eq!(graph.document_count(), 3);
        assert!(graph.document_client("B", "Delivery").is_some());
        assert!(graph.has_index("d_num_dex"));
        assert!(graph.has_index("d_type_dex"));

        let edges = graph.edges();
        assert_eq!(edges[0].from, ("A".to_string(), "Order".to_string()));
        assert_eq!(edges[0].to, ("B".to_string(), "Delivery".to_string()));
        assert_eq!(edges[1].edge.from_label, "Delivery");
        assert_eq!(edges[1].edge.to_label, "Invoice");
    }

    #[tokio::test]
    async fn test_node_identity_is_merged_in_any_order() {
        for records in [
            vec![record(0, "B", "100", "J", "A", "C"), record(1, "A", "100", "C", "Q", "B")],
            vec![record(0, "A", "100", "C", "Q", "B"), record(1, "B", "100", "J", "A", "C")],
        ] {
            let graph = MemoryGraph::new();
            load_vbfa(&graph, table(records), &config(10), |_| {}).await.unwrap();
            assert_eq!(graph.document_count(), 3);
        }
    }

    #[tokio::test]
    async fn test_identical_rows_append_edges() {
        let graph = MemoryGraph::new();
        let records: Vec<_> = (0..4).map(|i| record(i, "B", "100", "J", "A", "C")).collect();
        load_vbfa(&graph, table(records), &config(3), |_| {}).await.unwrap();

        assert_eq!(graph.document_count(), 2);
        assert_eq!(graph.edges().len(), 4);
    }

    #[tokio::test]
    async fn test_identical_rows_merge_edges() {
        let graph = MemoryGraph::new();
        let records: Vec<_> = (0..4).map(|i| record(i, "B", "100", "J", "A", "C")).collect();
        let config = LoadConfig {
            edge_policy: EdgePolicy::Merge,
            ..config(3)
        };
        load_vbfa(&graph, table(records), &config, |_| {}).await.unwrap();

        assert_eq!(graph.edges().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_without_clear_multiplies_edges() {
        let graph = MemoryGraph::new();
        let records = vec![record(0, "B", "100", "J", "A", "C")];
        load_vbfa(&graph, table(records.clone()), &config(10), |_| {}).await.unwrap();
        load_vbfa(&graph, table(records), &config(10), |_| {}).await.unwrap();

        assert_eq!(graph.document_count(), 2);
        assert_eq!(graph.edges().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_before_load_drops_prior_run() {
        let graph = MemoryGraph::new();
        load_vbfa(&graph, table(vec![record(0, "X", "100", "J", "W", "C")]), &config(10), |_| {})
            .await
            .unwrap();

        let config = LoadConfig {
            clear: true,
            ..config(10)
        };
        load_vbfa(&graph, table(vec![record(0, "B", "100", "J", "A", "C")]), &config, |_| {})
            .await
            .unwrap();

        assert_eq!(
            graph.counts().await.unwrap(),
            GraphCounts {
                nodes: 2,
                relationships: 1
            }
        );
        assert!(graph.document_client("X", "Delivery").is_none());
    }

    #[tokio::test]
    async fn test_skip_mode_continues_past_bad_rows() {
        let graph = MemoryGraph::new();
        let mut bad = record(1, "C", "100", "M", "B", "J");
        bad.creation_date = "2023-13-45".to_string();
        let records = vec![record(0, "B", "100", "J", "A", "C"), bad, record(2, "D", "100", "M", "B", "J")];

        let mut progressed = 0;
        let summary = load_vbfa(&graph, table(records), &config(10), |n| progressed += n)
            .await
            .unwrap();

        assert_eq!(summary.rows_read, 3);
        assert_eq!(summary.links_written, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].row(), Some(1));
        assert_eq!(progressed, 3);
    }

    #[tokio::test]
    async fn test_fail_fast_writes_rows_before_bad_row() {
        let mut bad = record(2, "D", "100", "M", "C", "J");
        bad.creation_time = "xx".to_string();
        let records = vec![
            record(0, "B", "100", "J", "A", "C"),
            record(1, "C", "100", "M", "B", "J"),
            bad,
            record(3, "E", "100", "M", "D", "J"),
        ];

        for batch_size in [1, 2, 3, 10] {
            let graph = MemoryGraph::new();
            let config = LoadConfig {
                error_mode: ErrorMode::FailFast,
                ..config(batch_size)
            };

            let err = load_vbfa(&graph, table(records.clone()), &config, |_| {})
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                GraphError::Row(DocflowError::MalformedTimestamp { row: 2, .. })
            ));
            assert_eq!(graph.edges().len(), 2, "batch size {}", batch_size);
        }
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_an_error() {
        let graph = MemoryGraph::new();
        let records = vec![record(0, "B", "100", "J", "A", "C")];
        let err = load_vbfa(&graph, table(records), &config(0), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Row(DocflowError::InvalidConfig(_))));
        assert!(graph.edges().is_empty());
    }

    #[tokio::test]
    async fn test_reader_rejections_follow_error_mode() {
        let graph = MemoryGraph::new();
        let input = VbfaTable {
            records: vec![record(0, "B", "100", "J", "A", "C")],
            rejected: vec![DocflowError::MissingField { row: 1, field: "ERDAT" }],
        };

        let summary = load_vbfa(&graph, input, &config(10), |_| {}).await.unwrap();
        assert_eq!(summary.rows_read, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.links_written, 1);

        let input = VbfaTable {
            records: Vec::new(),
            rejected: vec![DocflowError::MissingField { row: 1, field: "ERDAT" }],
        };
        let config = LoadConfig {
            error_mode: ErrorMode::FailFast,
            clear: true,
            ..config(10)
        };
        assert!(load_vbfa(&graph, input, &config, |_| {}).await.is_err());
        // Rejected before the clear ran.
        assert_eq!(graph.edges().len(), 1);
    }
}
