use indexmap::IndexMap;
use serde::{
    de::{self, IgnoredAny, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use std::{borrow::Cow, fmt};

/// Occurrences per event type, in order of first appearance.
pub type TypeCountMap = IndexMap<String, u64>;

/// The only part of an event line we care about.
///
/// Only a JSON object is accepted. When `type` appears more than once the
/// last occurrence wins, and that one must be a string.
#[derive(Debug)]
pub struct TypeLine {
    pub linetype: String,
}

impl<'de> Deserialize<'de> for TypeLine {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TypeLineVisitor;

        impl<'de> Visitor<'de> for TypeLineVisitor {
            type Value = TypeLine;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with a string `type`")
            }

            fn visit_map<A>(self, mut map: A) -> Result<TypeLine, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut linetype = None;
                while let Some(key) = map.next_key::<Cow<'de, str>>()? {
                    if key == "type" {
                        linetype = Some(map.next_value::<serde_json::Value>()?);
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                match linetype {
                    Some(serde_json::Value::String(linetype)) => Ok(TypeLine { linetype }),
                    Some(other) => Err(de::Error::invalid_type(
                        de::Unexpected::Other(&other.to_string()),
                        &"a string",
                    )),
                    None => Err(de::Error::missing_field("type")),
                }
            }
        }

        deserializer.deserialize_map(TypeLineVisitor)
    }
}

/// One bar of the final chart.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub count: u64,
}

impl ProcessedEvent {
    pub fn new(event_type: impl Into<String>, count: u64) -> Self {
        Self {
            event_type: event_type.into(),
            count,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub lines: u64,
    pub counted: u64,
    pub skipped: u64,
    pub bytes: u64,
}

impl IngestStats {
    pub fn add_line(&mut self, counted: bool) {
        self.lines += 1;
        if counted {
            self.counted += 1;
        } else {
            self.skipped += 1;
        }
    }

    pub fn add_bytes(&mut self, bytes: usize) {
        self.bytes += bytes as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_serializes_processed_events_with_a_type_key() {
        let event = ProcessedEvent::new("Push", 3);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"Push","count":3}"#);
    }

    #[test]
    fn it_ignores_every_field_but_type() {
        let line: TypeLine =
            serde_json::from_str(r#"{"id":"1","type":"PushEvent","payload":{"size":2}}"#)
                .unwrap();
        assert_eq!(line.linetype, "PushEvent");
    }

    #[test]
    fn it_takes_the_last_type_when_repeated() {
        let line: TypeLine = serde_json::from_str(r#"{"type":"A","type":"B"}"#).unwrap();
        assert_eq!(line.linetype, "B");
        let line: TypeLine = serde_json::from_str(r#"{"type":5,"type":"C"}"#).unwrap();
        assert_eq!(line.linetype, "C");
        assert!(serde_json::from_str::<TypeLine>(r#"{"type":"A","type":5}"#).is_err());
    }

    #[test]
    fn it_only_reads_objects() {
        assert!(serde_json::from_str::<TypeLine>(r#"["A"]"#).is_err());
        assert!(serde_json::from_str::<TypeLine>(r#"{"kind":"A"}"#).is_err());
    }
}
