//! OCEL bulk load.
//!
//! Three passes, always in this order:
//! - (:Event {e_id, activity, timestamp})
//! - (:Object {obj_id, obj_attribute})
//! - (:Object)-[:part_of {name}]->(:Event)
//!
//! Relations are only written once both endpoints exist. A relation whose
//! event or object is missing is reported, never dropped silently.

use tracing::{error, info};

use docflow_core::ocel::project_event;
use docflow_core::{LoadConfig, OcelLog, OcelRelation};

use super::{batch_size, LoadSummary};
use crate::error::{GraphError, GraphResult};
use crate::store::GraphStore;

/// Load an OCEL log into `store`.
///
/// `progress` receives the number of log rows handled after every batch.
pub async fn load_ocel<S, P>(
    store: &S,
    log: &OcelLog,
    config: &LoadConfig,
    mut progress: P,
) -> GraphResult<LoadSummary>
where
    S: GraphStore + ?Sized,
    P: FnMut(usize),
{
    let batch_size = batch_size(config)?;
    let mut summary = LoadSummary {
        rows_read: log.events.len() + log.objects.len() + log.relations.len(),
        ..LoadSummary::default()
    };

    if config.clear {
        store.clear().await?;
    }
    store.ensure_ocel_indexes().await?;

    for chunk in log.events.chunks(batch_size) {
        let mut nodes = Vec::with_capacity(chunk.len());
        for event in chunk {
            match project_event(event) {
                Ok(node) => nodes.push(node),
                Err(err) => {
                    if let Err(err) = summary.reject(GraphError::Row(err), config.error_mode) {
                        // Events before the bad one are still written.
                        store.insert_events(&nodes).await?;
                        return Err(err);
                    }
                }
            }
        }
        store.insert_events(&nodes).await?;
        summary.events_created += nodes.len();
        progress(chunk.len());
    }
    info!(events = summary.events_created, "Created Event nodes");

    for chunk in log.objects.chunks(batch_size) {
        store.insert_objects(chunk).await?;
        summary.objects_created += chunk.len();
        progress(chunk.len());
    }
    info!(objects = summary.objects_created, "Created Object nodes");

    for chunk in log.relations.chunks(batch_size) {
        let missing = store.missing_endpoints(chunk).await?;
        if missing.is_empty() {
            summary.memberships_created += store.insert_memberships(chunk).await?;
        } else {
            let mut valid: Vec<OcelRelation> = Vec::with_capacity(chunk.len() - missing.len());
            for (idx, relation) in chunk.iter().enumerate() {
                if missing.binary_search(&idx).is_ok() {
                    error!(
                        event_id = %relation.event_id,
                        object_id = %relation.object_id,
                        "Relation references a missing event or object"
                    );
                    let missing_endpoint = GraphError::MissingEndpoint {
                        event_id: relation.event_id.clone(),
                        object_id: relation.object_id.clone(),
                    };
                    if let Err(err) = summary.reject(missing_endpoint, config.error_mode) {
                        store.insert_memberships(&valid).await?;
                        return Err(err);
                    }
                } else {
                    valid.push(relation.clone());
                }
            }
            summary.memberships_created += store.insert_memberships(&valid).await?;
        }
        progress(chunk.len());
    }
    info!(
        memberships = summary.memberships_created,
        skipped = summary.skipped.len(),
        "Created membership relations"
    );

    Ok(summary)
}
