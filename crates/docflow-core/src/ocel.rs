//! Projection of an object-centric event log onto graph entities.
//!
//! Events become `Event` nodes, objects become `Object` nodes and every
//! event-to-object relation becomes a `part_of` edge. Unlike the document
//! chain there is no merging: each row is one insert.

use chrono::NaiveDateTime;

use crate::error::{DocflowError, DocflowResult};
use crate::model::OcelEvent;
use crate::timestamp;

/// An event ready to be written, with its timestamp parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNode {
    pub id: String,
    pub activity: String,
    pub timestamp: NaiveDateTime,
}

/// Parse one event's timestamp in the fixed `YYYY-MM-DD HH:MM:SS` form.
pub fn project_event(event: &OcelEvent) -> DocflowResult<EventNode> {
    let parsed = timestamp::parse_event(&event.timestamp).ok_or_else(|| {
        DocflowError::MalformedEventTimestamp {
            event_id: event.id.clone(),
            value: event.timestamp.clone(),
        }
    })?;

    Ok(EventNode {
        id: event.id.clone(),
        activity: event.activity.clone(),
        timestamp: parsed,
    })
}

/// Project every event, one result per event, in log order.
pub fn project_events(events: &[OcelEvent]) -> impl Iterator<Item = DocflowResult<EventNode>> + '_ {
    events.iter().map(project_event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OcelRelation;

    fn event(id: &str, ts: &str) -> OcelEvent {
        OcelEvent {
            id: id.to_string(),
            activity: "Create Order".to_string(),
            timestamp: ts.to_string(),
        }
    }

    #[test]
    fn test_project_events() {
        let events = vec![event("e1", "2020-07-09 08:21:01"), event("e2", "2020-07-09 09:00:00")];
        let nodes: Vec<_> = project_events(&events).collect::<Result<_, _>>().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "e1");
        assert_eq!(nodes[1].timestamp.to_string(), "2020-07-09 09:00:00");
    }

    #[test]
    fn test_bad_timestamp_names_event() {
        let err = project_event(&event("e9", "09/07/2020")).unwrap_err();
        match err {
            DocflowError::MalformedEventTimestamp { event_id, value } => {
                assert_eq!(event_id, "e9");
                assert_eq!(value, "09/07/2020");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_membership_name() {
        let relation = OcelRelation {
            event_id: "e1".to_string(),
            activity: "Create Order".to_string(),
            object_id: "o1".to_string(),
            object_type: "order".to_string(),
        };
        assert_eq!(relation.membership_name(), "e1 <-> o1");
    }
}
