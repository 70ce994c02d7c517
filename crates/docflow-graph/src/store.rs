//! The graph store seam.

use async_trait::async_trait;

use docflow_core::ocel::EventNode;
use docflow_core::{ChainLink, ClientAttribution, EdgePolicy, OcelObject, OcelRelation};

use crate::error::GraphResult;

/// Node and relationship counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}

/// Write operations the loaders need from a property graph.
///
/// Every method applies one batch. Implementations must keep the batch
/// order: links later in a slice see the nodes merged by earlier ones.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Delete every node and relationship, then drop user indexes.
    async fn clear(&self) -> GraphResult<()>;

    /// Indexes on `Document(d_num)` and `Document(d_type)`.
    async fn ensure_document_indexes(&self) -> GraphResult<()>;

    /// Indexes on `Event(e_id)` and `Object(obj_id)`.
    async fn ensure_ocel_indexes(&self) -> GraphResult<()>;

    /// Merge both documents of each link and write its `PREVIOUS_DOC_OF` edge.
    async fn upsert_chain(
        &self,
        links: &[ChainLink],
        policy: EdgePolicy,
        attribution: ClientAttribution,
    ) -> GraphResult<()>;

    /// Create one `Event` node per entry. No dedup.
    async fn insert_events(&self, events: &[EventNode]) -> GraphResult<()>;

    /// Create one `Object` node per entry. No dedup.
    async fn insert_objects(&self, objects: &[OcelObject]) -> GraphResult<()>;

    /// Positions in `relations` whose event or object node does not exist.
    async fn missing_endpoints(&self, relations: &[OcelRelation]) -> GraphResult<Vec<usize>>;

    /// Create `part_of` edges and return how many were created. A relation
    /// whose ids match several nodes gets one edge per matching pair.
    async fn insert_memberships(&self, relations: &[OcelRelation]) -> GraphResult<usize>;

    async fn counts(&self) -> GraphResult<GraphCounts>;

    /// Node count per label, sorted by label.
    async fn label_counts(&self) -> GraphResult<Vec<(String, usize)>>;
}

/// Client the preceding node gets when it is created by `link`.
pub(crate) fn preceding_client(link: &ChainLink, attribution: ClientAttribution) -> &str {
    match attribution {
        ClientAttribution::CurrentRow => &link.current.client,
        ClientAttribution::Resolved => &link.preceding_client,
    }
}
