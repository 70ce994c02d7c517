//! OCEL 1.0 readers.
//!
//! Both serializations are flattened into the three tables of
//! [`OcelLog`]: events, objects, and one relation per entry in an event's
//! object map, in event order.

pub mod json;
pub mod xml;

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use docflow_core::{OcelEvent, OcelLog, OcelObject, OcelRelation};

use crate::error::{SourceError, SourceResult};

/// Serialization of an OCEL file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcelFormat {
    Json,
    Xml,
}

impl OcelFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "jsonocel" | "json" => Ok(Self::Json),
            "xmlocel" | "xml" => Ok(Self::Xml),
            _ => Err(SourceError::UnsupportedFormat(format!(
                "'{}' (expected .jsonocel or .xmlocel)",
                path.display()
            ))),
        }
    }
}

/// Read an OCEL log, choosing the parser by extension.
pub fn read_ocel(path: &Path) -> SourceResult<OcelLog> {
    let format = OcelFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;

    let log = match format {
        OcelFormat::Json => json::parse(&text)?,
        OcelFormat::Xml => xml::parse(&text)?,
    };

    info!(
        path = %path.display(),
        ?format,
        events = log.events.len(),
        objects = log.objects.len(),
        relations = log.relations.len(),
        "Read OCEL log"
    );
    Ok(log)
}

/// An event together with the ids in its object map.
pub(crate) struct RawEvent {
    pub event: OcelEvent,
    pub omap: Vec<String>,
}

/// Build the relations table from events and objects.
pub(crate) fn assemble(events: Vec<RawEvent>, objects: Vec<OcelObject>) -> OcelLog {
    let types: HashMap<&str, &str> = objects
        .iter()
        .map(|o| (o.id.as_str(), o.attribute.as_str()))
        .collect();

    let mut relations = Vec::new();
    for raw in &events {
        for object_id in &raw.omap {
            relations.push(OcelRelation {
                event_id: raw.event.id.clone(),
                activity: raw.event.activity.clone(),
                object_id: object_id.clone(),
                object_type: types.get(object_id.as_str()).copied().unwrap_or_default().to_string(),
            });
        }
    }

    OcelLog {
        events: events.into_iter().map(|raw| raw.event).collect(),
        objects,
        relations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_from_path() {
        assert_eq!(OcelFormat::from_path(Path::new("o2c.xmlocel")).unwrap(), OcelFormat::Xml);
        assert_eq!(OcelFormat::from_path(Path::new("log.JSONOCEL")).unwrap(), OcelFormat::Json);
        assert!(matches!(
            OcelFormat::from_path(Path::new("VBFA.parquet")),
            Err(SourceError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            OcelFormat::from_path(Path::new("o2c.csv")),
            Err(SourceError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_read_ocel_dispatches_on_extension() {
        let mut file = tempfile::Builder::new().suffix(".jsonocel").tempfile().unwrap();
        write!(
            file,
            r#"{{"ocel:events": {{"e1": {{"ocel:activity": "Create", "ocel:timestamp": "2020-01-01 10:00:00", "ocel:omap": ["o1"]}}}},
                "ocel:objects": {{"o1": {{"ocel:type": "order"}}}}}}"#
        )
        .unwrap();

        let log = read_ocel(file.path()).unwrap();
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.relations[0].object_type, "order");
    }

    #[test]
    fn test_assemble_unknown_object_keeps_relation() {
        let events = vec![RawEvent {
            event: OcelEvent {
                id: "e1".to_string(),
                activity: "Ship".to_string(),
                timestamp: "2020-01-01 10:00:00".to_string(),
            },
            omap: vec!["ghost".to_string()],
        }];
        let log = assemble(events, Vec::new());
        assert_eq!(log.relations.len(), 1);
        assert_eq!(log.relations[0].object_id, "ghost");
        assert_eq!(log.relations[0].object_type, "");
    }
}
