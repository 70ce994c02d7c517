//! Neo4j index management and full clear.

use neo4rs::Query;
use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};
use crate::GraphClient;

/// Indexes used by the `Document` merges.
pub const DOCUMENT_INDEXES: &[&str] = &[
    "CREATE INDEX d_num_dex IF NOT EXISTS FOR (d:Document) ON (d.d_num)",
    "CREATE INDEX d_type_dex IF NOT EXISTS FOR (d:Document) ON (d.d_type)",
];

/// Indexes used to match relation endpoints.
pub const OCEL_INDEXES: &[&str] = &[
    "CREATE INDEX e_index IF NOT EXISTS FOR (e:Event) ON (e.e_id)",
    "CREATE INDEX o_index IF NOT EXISTS FOR (o:Object) ON (o.obj_id)",
];

/// Batched, parallel delete through APOC.
const APOC_CLEAR: &str = "CALL apoc.periodic.iterate(
    'MATCH (n) RETURN n',
    'DETACH DELETE n',
    {batchSize: 10000, parallel: true})";

const PLAIN_CLEAR: &str = "MATCH (n) DETACH DELETE n";

/// User indexes; lookup indexes and constraint-backed ones stay.
const LIST_INDEXES: &str = "SHOW INDEXES YIELD name, type, owningConstraint
    WHERE type <> 'LOOKUP' AND owningConstraint IS NULL
    RETURN name";

/// Create indexes. Safe to run repeatedly.
pub async fn ensure_indexes(client: &GraphClient, statements: &[&str]) -> GraphResult<()> {
    for statement in statements {
        client.execute(Query::new(statement.to_string())).await?;
    }
    debug!(count = statements.len(), "Indexes ensured");
    Ok(())
}

/// Delete all nodes and relationships, then drop user indexes.
pub async fn clear_database(client: &GraphClient, use_apoc: bool) -> GraphResult<()> {
    let statement = if use_apoc { APOC_CLEAR } else { PLAIN_CLEAR };
    client.execute(Query::new(statement.to_string())).await?;

    let rows = client.query(Query::new(LIST_INDEXES.to_string())).await?;
    let mut dropped = 0;
    for row in rows {
        let name: String = row
            .get("name")
            .map_err(|e| GraphError::Decode(format!("index name: {:?}", e)))?;
        client
            .execute(Query::new(drop_index_statement(&name)))
            .await?;
        dropped += 1;
    }

    info!(apoc = use_apoc, indexes_dropped = dropped, "Cleared database");
    Ok(())
}

fn drop_index_statement(name: &str) -> String {
    format!("DROP INDEX `{}` IF EXISTS", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_index_statement_quotes_name() {
        assert_eq!(drop_index_statement("d_num_dex"), "DROP INDEX `d_num_dex` IF EXISTS");
        assert_eq!(drop_index_statement("odd`name"), "DROP INDEX `odd``name` IF EXISTS");
    }

    #[test]
    fn test_index_statements_are_idempotent() {
        for statement in DOCUMENT_INDEXES.iter().chain(OCEL_INDEXES) {
            assert!(statement.contains("IF NOT EXISTS"), "{}", statement);
        }
    }
}
