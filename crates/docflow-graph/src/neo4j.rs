//! [`GraphStore`] over Neo4j.
//!
//! Each batch is one `UNWIND $rows` statement, so a batch is written (or
//! retried) as a unit:
//!
//! - (:Document)-[:PREVIOUS_DOC_OF]->(:Document)
//! - (:Event), (:Object)
//! - (:Object)-[:part_of]->(:Event)

use async_trait::async_trait;
use neo4rs::{BoltList, BoltMap, BoltType, Query};
use tracing::debug;

use docflow_core::ocel::EventNode;
use docflow_core::{ChainLink, ClientAttribution, EdgePolicy, OcelObject, OcelRelation};

use crate::error::{GraphError, GraphResult};
use crate::schema;
use crate::store::{preceding_client, GraphCounts, GraphStore};
use crate::GraphClient;

const UPSERT_CHAIN_APPEND: &str = "UNWIND $rows AS row
     MERGE (d:Document {d_num: row.doc_num, d_type: row.doc_type})
       ON CREATE SET d.client = row.client
     MERGE (prev:Document {d_num: row.prev_num, d_type: row.prev_type})
       ON CREATE SET prev.client = row.prev_client
     CREATE (prev)-[:PREVIOUS_DOC_OF {from: row.prev_type, to: row.doc_type, created: row.created,
                                      sub_item: row.sub_item, prec_item: row.prec_item}]->(d)";

const UPSERT_CHAIN_MERGE: &str = "UNWIND $rows AS row
     MERGE (d:Document {d_num: row.doc_num, d_type: row.doc_type})
       ON CREATE SET d.client = row.client
     MERGE (prev:Document {d_num: row.prev_num, d_type: row.prev_type})
       ON CREATE SET prev.client = row.prev_client
     MERGE (prev)-[:PREVIOUS_DOC_OF {from: row.prev_type, to: row.doc_type, created: row.created,
                                     sub_item: row.sub_item, prec_item: row.prec_item}]->(d)";

const INSERT_EVENTS: &str = "UNWIND $rows AS row
     CREATE (:Event {e_id: row.e_id, activity: row.activity, timestamp: row.timestamp})";

const INSERT_OBJECTS: &str = "UNWIND $rows AS row
     CREATE (:Object {obj_id: row.obj_id, obj_attribute: row.obj_attribute})";

const MISSING_ENDPOINTS: &str = "UNWIND $rows AS row
     OPTIONAL MATCH (e:Event {e_id: row.e_id})
     WITH row, count(e) AS events
     OPTIONAL MATCH (o:Object {obj_id: row.obj_id})
     WITH row, events, count(o) AS objects
     WHERE events = 0 OR objects = 0
     RETURN row.idx AS idx";

const INSERT_MEMBERSHIPS: &str = "UNWIND $rows AS row
     MATCH (e:Event {e_id: row.e_id}), (o:Object {obj_id: row.obj_id})
     CREATE (o)-[:part_of {name: e.e_id + ' <-> ' + o.obj_id}]->(e)
     RETURN count(*) AS created";

const LABEL_COUNTS: &str = "MATCH (n) UNWIND labels(n) AS label
     RETURN label, count(*) AS count
     ORDER BY label";

#[async_trait]
impl GraphStore for GraphClient {
    async fn clear(&self) -> GraphResult<()> {
        schema::clear_database(self, self.apoc_clear()).await
    }

    async fn ensure_document_indexes(&self) -> GraphResult<()> {
        schema::ensure_indexes(self, schema::DOCUMENT_INDEXES).await
    }

    async fn ensure_ocel_indexes(&self) -> GraphResult<()> {
        schema::ensure_indexes(self, schema::OCEL_INDEXES).await
    }

    async fn upsert_chain(
        &self,
        links: &[ChainLink],
        policy: EdgePolicy,
        attribution: ClientAttribution,
    ) -> GraphResult<()> {
        if links.is_empty() {
            return Ok(());
        }

        let rows = links
            .iter()
            .map(|link| {
                row(vec![
                    ("doc_num", link.current.number.as_str().into()),
                    ("doc_type", link.current.type_label.as_str().into()),
                    ("client", link.current.client.as_str().into()),
                    ("prev_num", link.preceding.number.as_str().into()),
                    ("prev_type", link.preceding.type_label.as_str().into()),
                    ("prev_client", preceding_client(link, attribution).into()),
                    ("created", link.edge.created.into()),
                    ("sub_item", link.edge.sub_item.as_str().into()),
                    ("prec_item", link.edge.prec_item.as_str().into()),
                ])
            })
            .collect();

        let statement = match policy {
            EdgePolicy::Append => UPSERT_CHAIN_APPEND,
            EdgePolicy::Merge => UPSERT_CHAIN_MERGE,
        };
        self.execute(Query::new(statement.to_string()).param("rows", list(rows)))
            .await?;

        debug!(links = links.len(), first_row = links[0].row, %policy, "Wrote document chain batch");
        Ok(())
    }

    async fn insert_events(&self, events: &[EventNode]) -> GraphResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        let rows = events
            .iter()
            .map(|event| {
                row(vec![
                    ("e_id", event.id.as_str().into()),
                    ("activity", event.activity.as_str().into()),
                    ("timestamp", event.timestamp.into()),
                ])
            })
            .collect();

        self.execute(Query::new(INSERT_EVENTS.to_string()).param("rows", list(rows)))
            .await?;
        debug!(events = events.len(), "Created event batch");
        Ok(())
    }

    async fn insert_objects(&self, objects: &[OcelObject]) -> GraphResult<()> {
        if objects.is_empty() {
            return Ok(());
        }
        let rows = objects
            .iter()
            .map(|object| {
                row(vec![
                    ("obj_id", object.id.as_str().into()),
                    ("obj_attribute", object.attribute.as_str().into()),
                ])
            })
            .collect();

        self.execute(Query::new(INSERT_OBJECTS.to_string()).param("rows", list(rows)))
            .await?;
        debug!(objects = objects.len(), "Created object batch");
        Ok(())
    }

    async fn missing_endpoints(&self, relations: &[OcelRelation]) -> GraphResult<Vec<usize>> {
        if relations.is_empty() {
            return Ok(Vec::new());
        }
        let rows = relations
            .iter()
            .enumerate()
            .map(|(idx, relation)| {
                row(vec![
                    ("idx", (idx as i64).into()),
                    ("e_id", relation.event_id.as_str().into()),
                    ("obj_id", relation.object_id.as_str().into()),
                ])
            })
            .collect();

        let result = self
            .query(Query::new(MISSING_ENDPOINTS.to_string()).param("rows", list(rows)))
            .await?;

        let mut missing = Vec::with_capacity(result.len());
        for found in result {
            let idx: i64 = found
                .get("idx")
                .map_err(|e| GraphError::Decode(format!("relation index: {:?}", e)))?;
            missing.push(idx as usize);
        }
        missing.sort_unstable();
        Ok(missing)
    }

    async fn insert_memberships(&self, relations: &[OcelRelation]) -> GraphResult<usize> {
        if relations.is_empty() {
            return Ok(0);
        }
        let rows = relations
            .iter()
            .map(|relation| {
                row(vec![
                    ("e_id", relation.event_id.as_str().into()),
                    ("obj_id", relation.object_id.as_str().into()),
                ])
            })
            .collect();

        let created = self
            .query_count(
                Query::new(INSERT_MEMBERSHIPS.to_string()).param("rows", list(rows)),
                "created",
            )
            .await?;
        debug!(relations = relations.len(), created, "Created membership batch");
        Ok(created)
    }

    async fn counts(&self) -> GraphResult<GraphCounts> {
        let node_query = Query::new("MATCH (n) RETURN count(n) AS count".to_string());
        let rel_query = Query::new("MATCH ()-[r]->() RETURN count(r) AS count".to_string());

        Ok(GraphCounts {
            nodes: self.query_count(node_query, "count").await?,
            relationships: self.query_count(rel_query, "count").await?,
        })
    }

    async fn label_counts(&self) -> GraphResult<Vec<(String, usize)>> {
        let rows = self.query(Query::new(LABEL_COUNTS.to_string())).await?;

        let mut counts = Vec::with_capacity(rows.len());
        for found in rows {
            let label: String = found
                .get("label")
                .map_err(|e| GraphError::Decode(format!("label: {:?}", e)))?;
            let count: i64 = found
                .get("count")
                .map_err(|e| GraphError::Decode(format!("label count: {:?}", e)))?;
            counts.push((label, count as usize));
        }
        Ok(counts)
    }
}

fn row(fields: Vec<(&str, BoltType)>) -> BoltType {
    let mut map = BoltMap::with_capacity(fields.len());
    for (key, value) in fields {
        map.put(key.into(), value);
    }
    BoltType::Map(map)
}

fn list(rows: Vec<BoltType>) -> BoltType {
    BoltType::List(BoltList { value: rows })
}
