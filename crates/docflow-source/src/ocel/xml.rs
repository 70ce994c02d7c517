//! XML-OCEL (`.xmlocel`) parser.
//!
//! ```xml
//! <log>
//!   <global scope="event">...</global>
//!   <events>
//!     <event>
//!       <string key="id" value="e1"/>
//!       <string key="activity" value="Create Order"/>
//!       <date key="timestamp" value="2020-07-09T08:21:01.527+01:00"/>
//!       <list key="omap"><string key="object-id" value="o1"/></list>
//!       <list key="vmap">...</list>
//!     </event>
//!   </events>
//!   <objects>
//!     <object>
//!       <string key="id" value="o1"/>
//!       <string key="type" value="order"/>
//!       <list key="ovmap">...</list>
//!     </object>
//!   </objects>
//! </log>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use docflow_core::timestamp;
use docflow_core::{OcelEvent, OcelLog, OcelObject};

use super::{assemble, RawEvent};
use crate::error::{SourceError, SourceResult};

#[derive(Default)]
struct EventBuilder {
    id: Option<String>,
    activity: Option<String>,
    timestamp: Option<String>,
    omap: Vec<String>,
}

#[derive(Default)]
struct ObjectBuilder {
    id: Option<String>,
    object_type: Option<String>,
}

enum Section {
    Outside,
    Event(EventBuilder),
    Object(ObjectBuilder),
}

struct Parser {
    section: Section,
    global_depth: usize,
    list_depth: usize,
    list_key: Option<String>,
    events: Vec<RawEvent>,
    objects: Vec<OcelObject>,
}

/// Parse XML-OCEL text.
pub fn parse(text: &str) -> SourceResult<OcelLog> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut parser = Parser {
        section: Section::Outside,
        global_depth: 0,
        list_depth: 0,
        list_key: None,
        events: Vec::new(),
        objects: Vec::new(),
    };

    loop {
        let position = reader.buffer_position() as u64;
        let step = match reader.read_event() {
            Ok(Event::Start(e)) => parser.open(&e, false),
            Ok(Event::Empty(e)) => parser.open(&e, true),
            Ok(Event::End(e)) => parser.close(e.local_name().as_ref()),
            Ok(Event::Eof) => break,
            Ok(_) => Ok(()),
            Err(e) => Err(e.to_string()),
        };
        step.map_err(|message| SourceError::Xml { position, message })?;
    }

    Ok(assemble(parser.events, parser.objects))
}

impl Parser {
    fn open(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<(), String> {
        let name = e.local_name();
        match name.as_ref() {
            b"global" => {
                if !empty {
                    self.global_depth += 1;
                }
            }
            _ if self.global_depth > 0 => {}
            b"event" if !empty => self.section = Section::Event(EventBuilder::default()),
            b"object" if !empty => self.section = Section::Object(ObjectBuilder::default()),
            b"list" => {
                if !empty {
                    if self.list_depth == 0 {
                        self.list_key = attribute(e, b"key")?;
                    }
                    self.list_depth += 1;
                }
            }
            _ => self.leaf(e)?,
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> Result<(), String> {
        match name {
            b"global" => self.global_depth = self.global_depth.saturating_sub(1),
            _ if self.global_depth > 0 => {}
            b"list" => {
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    self.list_key = None;
                }
            }
            b"event" => {
                if let Section::Event(builder) = std::mem::replace(&mut self.section, Section::Outside) {
                    self.events.push(builder.finish()?);
                }
            }
            b"object" => {
                if let Section::Object(builder) = std::mem::replace(&mut self.section, Section::Outside) {
                    self.objects.push(builder.finish()?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// A typed value element such as `<string key=".." value=".."/>`.
    fn leaf(&mut self, e: &BytesStart<'_>) -> Result<(), String> {
        let Some(value) = attribute(e, b"value")? else {
            return Ok(());
        };
        let key = attribute(e, b"key")?.unwrap_or_default();

        match &mut self.section {
            Section::Event(event) => match (self.list_depth, self.list_key.as_deref()) {
                (0, _) => match key.as_str() {
                    "id" => event.id = Some(value),
                    "activity" => event.activity = Some(value),
                    "timestamp" => event.timestamp = Some(timestamp::normalize_event(&value)),
                    _ => {}
                },
                (1, Some("omap")) => event.omap.push(value),
                _ => {}
            },
            Section::Object(object) if self.list_depth == 0 => match key.as_str() {
                "id" => object.id = Some(value),
                "type" => object.object_type = Some(value),
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }
}

impl EventBuilder {
    fn finish(self) -> Result<RawEvent, String> {
        let id = self.id.ok_or("event without an id")?;
        let activity = self
            .activity
            .ok_or_else(|| format!("event '{}' has no activity", id))?;
        let timestamp = self
            .timestamp
            .ok_or_else(|| format!("event '{}' has no timestamp", id))?;

        Ok(RawEvent {
            event: OcelEvent {
                id,
                activity,
                timestamp,
            },
            omap: self.omap,
        })
    }
}

impl ObjectBuilder {
    fn finish(self) -> Result<OcelObject, String> {
        Ok(OcelObject {
            id: self.id.ok_or("object without an id")?,
            attribute: self.object_type.unwrap_or_default(),
        })
    }
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        if attr.key.as_ref() == name {
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
