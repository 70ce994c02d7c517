//! Graph loading errors.

use docflow_core::DocflowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Cannot connect to Neo4j at {uri}: {source}")]
    Connect {
        uri: String,
        #[source]
        source: neo4rs::Error,
    },

    #[error("Neo4j query failed after {attempts} attempt(s): {source}")]
    Query {
        attempts: u32,
        #[source]
        source: neo4rs::Error,
    },

    #[error("Unexpected Neo4j result: {0}")]
    Decode(String),

    #[error("Relation {event_id} <-> {object_id}: event or object does not exist")]
    MissingEndpoint { event_id: String, object_id: String },

    #[error(transparent)]
    Row(#[from] DocflowError),
}

pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// Store failures end the load; row and relation errors may be skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Query { .. } | Self::Decode(_))
    }

    /// Source row of a row-level error.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::Row(err) => err.row(),
            _ => None,
        }
    }
}
