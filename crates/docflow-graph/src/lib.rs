//! # docflow graph
//!
//! Writes resolved document chains and OCEL projections into a property
//! graph. [`GraphStore`] is the seam: [`GraphClient`] talks Cypher to Neo4j,
//! [`MemoryGraph`] keeps everything in process for dry runs and tests.

pub mod client;
pub mod error;
pub mod load;
pub mod memory;
pub mod neo4j;
pub mod schema;
pub mod store;

pub use client::GraphClient;
pub use error::{GraphError, GraphResult};
pub use load::{load_ocel, load_vbfa, LoadSummary};
pub use memory::MemoryGraph;
pub use store::{GraphCounts, GraphStore};
