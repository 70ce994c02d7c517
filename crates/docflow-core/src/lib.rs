//! # docflow core
//!
//! Domain model and pure transforms for loading SAP document flows (VBFA)
//! and object-centric event logs (OCEL) into a property graph.
//!
//! Nothing in this crate talks to the graph store; see `docflow-graph` for
//! the side-effecting half of the pipeline.

pub mod chain;
pub mod config;
pub mod doc_type;
pub mod error;
pub mod model;
pub mod ocel;
pub mod timestamp;

pub use chain::{ChainLink, ChainResolver, UNKNOWN_CLIENT};
pub use config::{ClientAttribution, EdgePolicy, ErrorMode, LoadConfig, StoreConfig};
pub use error::{DocflowError, DocflowResult};
pub use model::{Document, DocumentRecord, OcelEvent, OcelLog, OcelObject, OcelRelation, PrecedesEdge};
