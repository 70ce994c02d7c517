//! Document-chain resolution.
//!
//! Turns VBFA rows into `(preceding) -[PREVIOUS_DOC_OF]-> (current)` links.
//! The preceding document's client is looked up through an index built once
//! over the whole table:
//!
//! - the index maps a document number to the client of the **first** row
//!   (in source order) whose `VBELN` equals that number;
//! - a preceding number that is null or never appears as `VBELN` resolves to
//!   [`UNKNOWN_CLIENT`].

use std::collections::HashMap;

use tracing::warn;

use crate::doc_type;
use crate::error::{DocflowError, DocflowResult};
use crate::model::{Document, DocumentRecord, PrecedesEdge};
use crate::timestamp;

/// Client recorded when the preceding document's own row is not in the data.
pub const UNKNOWN_CLIENT: &str = "N/A";

/// One resolved row: both documents and the edge between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    /// Source row this link came from.
    pub row: usize,
    pub current: Document,
    /// Preceding document. Its `client` is the referencing row's client.
    pub preceding: Document,
    pub edge: PrecedesEdge,
    /// Client of the first row where the preceding document is current.
    pub preceding_client: String,
}

/// Resolves predecessor/successor links over a full VBFA table.
pub struct ChainResolver<'a> {
    records: &'a [DocumentRecord],
    first_client: HashMap<&'a str, &'a str>,
}

impl<'a> ChainResolver<'a> {
    /// Index the table. Runs in O(n).
    pub fn new(records: &'a [DocumentRecord]) -> Self {
        let mut first_client = HashMap::with_capacity(records.len());
        for record in records {
            first_client
                .entry(record.document_number.as_str())
                .or_insert(record.client.as_str());
        }
        Self {
            records,
            first_client,
        }
    }

    /// Client of the document `number`, or [`UNKNOWN_CLIENT`].
    pub fn preceding_client(&self, number: Option<&str>) -> &'a str {
        number
            .and_then(|n| self.first_client.get(n).copied())
            .unwrap_or(UNKNOWN_CLIENT)
    }

    /// Number of distinct document numbers seen as `VBELN`.
    pub fn indexed_documents(&self) -> usize {
        self.first_client.len()
    }

    /// Resolve every record, in input order, one result per record.
    pub fn resolve(&self) -> impl Iterator<Item = DocflowResult<ChainLink>> + '_ {
        self.records.iter().map(move |record| self.resolve_record(record))
    }

    /// Resolve a single record against the index.
    pub fn resolve_record(&self, record: &DocumentRecord) -> DocflowResult<ChainLink> {
        let current_label = doc_type::label(&record.doc_type_code);
        let prev_label = doc_type::label(&record.prev_doc_type_code);

        for code in [&record.doc_type_code, &record.prev_doc_type_code] {
            if let Some(diagnostic) = doc_type::diagnose(code) {
                warn!(row = record.row, code = %code, ?diagnostic, "Suspicious document type code");
            }
        }

        let created = timestamp::combine(&record.creation_date, &record.creation_time)
            .ok_or_else(|| DocflowError::MalformedTimestamp {
                row: record.row,
                date: record.creation_date.clone(),
                time: record.creation_time.clone(),
            })?;

        let preceding_client = self.preceding_client(record.prev_document_number.as_deref());

        let prev_number = record
            .prev_document_number
            .as_deref()
            .ok_or(DocflowError::MissingField {
                row: record.row,
                field: "VBELV",
            })?;

        Ok(ChainLink {
            row: record.row,
            current: Document {
                number: record.document_number.clone(),
                type_label: current_label.to_string(),
                client: record.client.clone(),
            },
            preceding: Document {
                number: prev_number.to_string(),
                type_label: prev_label.to_string(),
                client: record.client.clone(),
            },
            edge: PrecedesEdge {
                from_label: prev_label.to_string(),
                to_label: current_label.to_string(),
                created,
                sub_item: record.current_item_pos.clone().unwrap_or_default(),
                prec_item: record.prev_item_pos.clone().unwrap_or_default(),
            },
            preceding_client: preceding_client.to_string(),
        })
    }
}
