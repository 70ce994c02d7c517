//! In-process [`GraphStore`] with the same merge and insert semantics as the
//! Cypher statements in [`crate::neo4j`]. Backs `--dry-run` and the tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use docflow_core::ocel::EventNode;
use docflow_core::{ChainLink, ClientAttribution, EdgePolicy, OcelObject, OcelRelation, PrecedesEdge};

use crate::error::GraphResult;
use crate::store::{preceding_client, GraphCounts, GraphStore};

type DocKey = (String, String);

/// A stored `PREVIOUS_DOC_OF` relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEdge {
    pub from: DocKey,
    pub to: DocKey,
    pub edge: PrecedesEdge,
}

/// A stored `part_of` relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMembership {
    pub object_id: String,
    pub event_id: String,
    pub name: String,
}

#[derive(Default)]
struct State {
    documents: HashMap<DocKey, String>,
    edges: Vec<StoredEdge>,
    events: Vec<EventNode>,
    objects: Vec<OcelObject>,
    memberships: Vec<StoredMembership>,
    indexes: BTreeSet<&'static str>,
}

impl State {
    fn merge_document(&mut self, number: &str, type_label: &str, client: &str) -> DocKey {
        let key = (number.to_string(), type_label.to_string());
        self.documents
            .entry(key.clone())
            .or_insert_with(|| client.to_string());
        key
    }
}

/// Graph held in memory.
#[derive(Default)]
pub struct MemoryGraph {
    state: Mutex<State>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Client of the document `(number, type_label)`, if the node exists.
    pub fn document_client(&self, number: &str, type_label: &str) -> Option<String> {
        self.lock()
            .documents
            .get(&(number.to_string(), type_label.to_string()))
            .cloned()
    }

    pub fn document_count(&self) -> usize {
        self.lock().documents.len()
    }

    /// All `PREVIOUS_DOC_OF` edges in creation order.
    pub fn edges(&self) -> Vec<StoredEdge> {
        self.lock().edges.clone()
    }

    pub fn events(&self) -> Vec<EventNode> {
        self.lock().events.clone()
    }

    pub fn objects(&self) -> Vec<OcelObject> {
        self.lock().objects.clone()
    }

    pub fn memberships(&self) -> Vec<StoredMembership> {
        self.lock().memberships.clone()
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.lock().indexes.contains(name)
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn clear(&self) -> GraphResult<()> {
        *self.lock() = State::default();
        Ok(())
    }

    async fn ensure_document_indexes(&self) -> GraphResult<()> {
        self.lock().indexes.extend(["d_num_dex", "d_type_dex"]);
        Ok(())
    }

    async fn ensure_ocel_indexes(&self) -> GraphResult<()> {
        self.lock().indexes.extend(["e_index", "o_index"]);
        Ok(())
    }

    async fn upsert_chain(
        &self,
        links: &[ChainLink],
        policy: EdgePolicy,
        attribution: ClientAttribution,
    ) -> GraphResult<()> {
        let mut state = self.lock();
        for link in links {
            let to = state.merge_document(
                &link.current.number,
                &link.current.type_label,
                &link.current.client,
            );
            let from = state.merge_document(
                &link.preceding.number,
                &link.preceding.type_label,
                preceding_client(link, attribution),
            );

            let stored = StoredEdge {
                from,
                to,
                edge: link.edge.clone(),
            };
            if policy == EdgePolicy::Merge && state.edges.contains(&stored) {
                continue;
            }
            state.edges.push(stored);
        }
        Ok(())
    }

    async fn insert_events(&self, events: &[EventNode]) -> GraphResult<()> {
        self.lock().events.extend_from_slice(events);
        Ok(())
    }

    async fn insert_objects(&self, objects: &[OcelObject]) -> GraphResult<()> {
        self.lock().objects.extend_from_slice(objects);
        Ok(())
    }

    async fn missing_endpoints(&self, relations: &[OcelRelation]) -> GraphResult<Vec<usize>> {
        let state = self.lock();
        let events: BTreeSet<&str> = state.events.iter().map(|e| e.id.as_str()).collect();
        let objects: BTreeSet<&str> = state.objects.iter().map(|o| o.id.as_str()).collect();

        Ok(relations
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                !events.contains(r.event_id.as_str()) || !objects.contains(r.object_id.as_str())
            })
            .map(|(idx, _)| idx)
            .collect())
    }

    async fn insert_memberships(&self, relations: &[OcelRelation]) -> GraphResult<usize> {
        let mut state = self.lock();
        let before = state.memberships.len();
        for relation in relations {
            // MATCH semantics: one edge per matching (event, object) pair.
            let events = state.events.iter().filter(|e| e.id == relation.event_id).count();
            let objects = state.objects.iter().filter(|o| o.id == relation.object_id).count();
            for _ in 0..events * objects {
                state.memberships.push(StoredMembership {
                    object_id: relation.object_id.clone(),
                    event_id: relation.event_id.clone(),
                    name: relation.membership_name(),
                });
            }
        }
        Ok(state.memberships.len() - before)
    }

    async fn counts(&self) -> GraphResult<GraphCounts> {
        let state = self.lock();
        Ok(GraphCounts {
            nodes: state.documents.len() + state.events.len() + state.objects.len(),
            relationships: state.edges.len() + state.memberships.len(),
        })
    }

    async fn label_counts(&self) -> GraphResult<Vec<(String, usize)>> {
        let state = self.lock();
        let mut counts = BTreeMap::new();
        for (label, count) in [
            ("Document", state.documents.len()),
            ("Event", state.events.len()),
            ("Object", state.objects.len()),
        ] {
            if count > 0 {
                counts.insert(label.to_string(), count);
            }
        }
        Ok(counts.into_iter().collect())
    }
}
