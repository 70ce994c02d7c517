//! JSON-OCEL (`.jsonocel`) parser.

use serde::Deserialize;
use serde_json::{Map, Value};

use docflow_core::timestamp;
use docflow_core::{OcelEvent, OcelLog, OcelObject};

use super::{assemble, RawEvent};
use crate::error::SourceResult;

#[derive(Deserialize)]
struct JsonLog {
    #[serde(rename = "ocel:events", default)]
    events: Map<String, Value>,
    #[serde(rename = "ocel:objects", default)]
    objects: Map<String, Value>,
}

#[derive(Deserialize)]
struct JsonEvent {
    #[serde(rename = "ocel:activity")]
    activity: String,
    #[serde(rename = "ocel:timestamp")]
    timestamp: String,
    #[serde(rename = "ocel:omap", default)]
    omap: Vec<String>,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(rename = "ocel:type", default)]
    object_type: String,
}

/// Parse JSON-OCEL text. Event and object order follows the file.
pub fn parse(text: &str) -> SourceResult<OcelLog> {
    let log: JsonLog = serde_json::from_str(text)?;

    let mut events = Vec::with_capacity(log.events.len());
    for (id, value) in log.events {
        let event: JsonEvent = serde_json::from_value(value)?;
        events.push(RawEvent {
            event: OcelEvent {
                id,
                activity: event.activity,
                timestamp: timestamp::normalize_event(&event.timestamp),
            },
            omap: event.omap,
        });
    }

    let mut objects = Vec::with_capacity(log.objects.len());
    for (id, value) in log.objects {
        let object: JsonObject = serde_json::from_value(value)?;
        objects.push(OcelObject {
            id,
            attribute: object.object_type,
        });
    }

    Ok(assemble(events, objects))
}
