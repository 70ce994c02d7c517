//! Domain models for document flows and object-centric event logs.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of an SAP document-flow table (VBFA).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Index of the row in the source table.
    pub row: usize,
    /// Subsequent document number (`VBELN`).
    pub document_number: String,
    /// Client (`MANDT`).
    pub client: String,
    /// Category code of the subsequent document (`VBTYP_N`).
    pub doc_type_code: String,
    /// Preceding document number (`VBELV`).
    pub prev_document_number: Option<String>,
    /// Category code of the preceding document (`VBTYP_V`).
    pub prev_doc_type_code: String,
    /// Subsequent item (`POSNN`).
    pub current_item_pos: Option<String>,
    /// Preceding item (`POSNV`).
    pub prev_item_pos: Option<String>,
    /// Creation date (`ERDAT`).
    pub creation_date: String,
    /// Creation time (`ERZET`).
    pub creation_time: String,
}

/// A document node, identified by number and type label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub number: String,
    pub type_label: String,
    pub client: String,
}

impl Document {
    /// The `(d_num, d_type)` identity used for merging.
    pub fn key(&self) -> (&str, &str) {
        (&self.number, &self.type_label)
    }
}

/// Attributes of a `PREVIOUS_DOC_OF` relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrecedesEdge {
    pub from_label: String,
    pub to_label: String,
    pub created: NaiveDateTime,
    pub sub_item: String,
    pub prec_item: String,
}

/// An OCEL event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcelEvent {
    pub id: String,
    pub activity: String,
    /// Timestamp as read from the log; parsed during projection.
    pub timestamp: String,
}

/// An OCEL object. The attribute is the object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcelObject {
    pub id: String,
    pub attribute: String,
}

/// One event-to-object relation, as in the flattened relations table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcelRelation {
    pub event_id: String,
    pub activity: String,
    pub object_id: String,
    pub object_type: String,
}

impl OcelRelation {
    /// Value of the `name` property on the `part_of` edge.
    pub fn membership_name(&self) -> String {
        format!("{} <-> {}", self.event_id, self.object_id)
    }
}

/// The three tables of an object-centric event log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcelLog {
    pub events: Vec<OcelEvent>,
    pub objects: Vec<OcelObject>,
    pub relations: Vec<OcelRelation>,
}
