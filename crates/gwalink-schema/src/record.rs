//! Native records as handed over by the GWA codec.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RecordError;
use crate::keyword::Keyword;

/// A caller-assigned identity that survives round trips.
///
/// Spaces are stripped on construction; an id that is empty afterwards is
/// not an id at all.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let normalized: String = raw.as_ref().chars().filter(|c| *c != ' ').collect();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ApplicationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ApplicationId::new(&raw)
            .ok_or_else(|| serde::de::Error::custom("application id is empty"))
    }
}

/// Blank ids deserialize to `None` rather than failing the whole value.
///
/// For `#[serde(deserialize_with)]` on optional application-id fields.
pub fn deserialize_optional_app_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ApplicationId>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(ApplicationId::new))
}

/// Identifier of the remote stream a record came from or goes to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(String);

impl StreamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identity of an indexed record: its keyword and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub keyword: Keyword,
    pub index: u32,
}

impl RecordKey {
    pub fn new(keyword: Keyword, index: u32) -> Self {
        Self { keyword, index }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.keyword, self.index)
    }
}

/// A decoded native record.
///
/// `fields` holds the keyword-specific payload as decoded tokens; the cache
/// never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeRecord {
    pub keyword: Keyword,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_app_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub application_id: Option<ApplicationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<StreamId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl NativeRecord {
    pub fn new(keyword: Keyword) -> Self {
        Self {
            keyword,
            index: None,
            application_id: None,
            stream_id: None,
            fields: Vec::new(),
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the application id; a blank id clears it.
    pub fn with_application_id(mut self, application_id: impl AsRef<str>) -> Self {
        self.application_id = ApplicationId::new(application_id);
        self
    }

    pub fn with_stream_id(mut self, stream_id: impl Into<String>) -> Self {
        self.stream_id = Some(StreamId::new(stream_id));
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = String>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    /// The record's key, if it carries an index.
    pub fn key(&self) -> Option<RecordKey> {
        self.index.map(|index| RecordKey::new(self.keyword, index))
    }

    /// Structural validation. Field contents are left to the codec.
    pub fn validate(&self) -> Result<(), RecordError> {
        let keyword = self.keyword;
        if self.index == Some(0) {
            return Err(RecordError::ZeroIndex { keyword });
        }
        if let Some(app_id) = &self.application_id {
            if app_id
                .as_str()
                .chars()
                .any(|c| c.is_control() || c == '{' || c == '}')
            {
                return Err(RecordError::InvalidApplicationId {
                    keyword,
                    application_id: app_id.as_str().to_string(),
                });
            }
        }
        if let Some(stream_id) = &self.stream_id {
            if stream_id.as_str().chars().any(char::is_whitespace) {
                return Err(RecordError::InvalidStreamId {
                    keyword,
                    stream_id: stream_id.as_str().to_string(),
                });
            }
        }
        if let Some(position) = self
            .fields
            .iter()
            .position(|f| f.contains(['\t', '\n', '\r']))
        {
            return Err(RecordError::InvalidField { keyword, position });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_id_strips_spaces() {
        let id = ApplicationId::new(" Slab 0 ").unwrap();
        assert_eq!(id.as_str(), "Slab0");
        assert!(ApplicationId::new("   ").is_none());
        assert!(ApplicationId::new("").is_none());
    }

    #[test]
    fn builder_sets_identity() {
        let rec = NativeRecord::new(Keyword::Memb)
            .with_index(6)
            .with_application_id("Slab0")
            .with_stream_id("abcdefgh");
        assert_eq!(rec.key(), Some(RecordKey::new(Keyword::Memb, 6)));
        assert_eq!(rec.application_id.as_ref().unwrap().as_str(), "Slab0");
        assert_eq!(rec.stream_id.as_ref().unwrap().as_str(), "abcdefgh");
        assert_eq!(rec.key().unwrap().to_string(), "MEMB 6");
    }

    #[test]
    fn blank_application_id_is_absent() {
        let rec = NativeRecord::new(Keyword::Node).with_application_id(" ");
        assert!(rec.application_id.is_none());
    }

    #[test]
    fn validate_rejects_malformed() {
        let zero = NativeRecord::new(Keyword::Node).with_index(0);
        assert_eq!(
            zero.validate(),
            Err(RecordError::ZeroIndex {
                keyword: Keyword::Node
            })
        );

        let tabbed = NativeRecord::new(Keyword::Node)
            .with_fields(["ok".to_string(), "bad\tfield".to_string()]);
        assert_eq!(
            tabbed.validate(),
            Err(RecordError::InvalidField {
                keyword: Keyword::Node,
                position: 1
            })
        );

        let braces = NativeRecord::new(Keyword::Node).with_application_id("{x}");
        assert!(matches!(
            braces.validate(),
            Err(RecordError::InvalidApplicationId { .. })
        ));

        let stream = NativeRecord::new(Keyword::Node).with_stream_id("a b");
        assert!(matches!(
            stream.validate(),
            Err(RecordError::InvalidStreamId { .. })
        ));

        assert!(NativeRecord::new(Keyword::Node).with_index(1).validate().is_ok());
    }

    #[test]
    fn deserialize_from_json_line() {
        let raw = r#"{"keyword":"MEMB","index":6,"application_id":"Slab 0","fields":["Slab 0","SLAB"]}"#;
        let rec: NativeRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.keyword, Keyword::Memb);
        assert_eq!(rec.index, Some(6));
        assert_eq!(rec.application_id.unwrap().as_str(), "Slab0");
        assert_eq!(rec.fields.len(), 2);
    }

    #[test]
    fn deserialize_blank_application_id_as_none() {
        let raw = r#"{"keyword":"NODE","application_id":""}"#;
        let rec: NativeRecord = serde_json::from_str(raw).unwrap();
        assert!(rec.application_id.is_none());
        assert!(rec.index.is_none());
    }
}
