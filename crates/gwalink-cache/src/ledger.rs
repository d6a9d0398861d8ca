//! Translation ledger: which domain objects were produced from which
//! native record.

use std::collections::BTreeMap;

use gwalink_schema::record::deserialize_optional_app_id;
use gwalink_schema::{ApplicationId, Keyword, NativeRecord, RecordKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::LedgerError;

/// A vendor-neutral structural object produced by conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainObject {
    pub speckle_type: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_app_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub application_id: Option<ApplicationId>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl DomainObject {
    pub fn new(speckle_type: impl Into<String>) -> Self {
        Self {
            speckle_type: speckle_type.into(),
            application_id: None,
            properties: Map::new(),
        }
    }

    pub fn with_application_id(mut self, application_id: impl AsRef<str>) -> Self {
        self.application_id = ApplicationId::new(application_id);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Native record key → objects produced from it, keyed by application id.
#[derive(Debug, Clone, Default)]
pub struct TranslationLedger {
    entries: BTreeMap<RecordKey, BTreeMap<String, DomainObject>>,
}

impl TranslationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the objects produced from `record`, replacing any earlier
    /// entry for the same keyword and index.
    pub fn set_speckle_objects<I>(&mut self, record: &NativeRecord, objects: I) -> Result<(), LedgerError>
    where
        I: IntoIterator<Item = (String, DomainObject)>,
    {
        let key = record.key().ok_or(LedgerError::UnindexedRecord {
            keyword: record.keyword,
        })?;
        let objects: BTreeMap<String, DomainObject> = objects.into_iter().collect();
        debug!(%key, objects = objects.len(), "recorded translation");
        self.entries.insert(key, objects);
        Ok(())
    }

    /// Every recorded object, in record-key order.
    pub fn speckle_objects(&self) -> Vec<&DomainObject> {
        self.entries.values().flat_map(BTreeMap::values).collect()
    }

    /// Objects produced from one native record, optionally narrowed to a
    /// single domain type.
    pub fn speckle_objects_for(
        &self,
        keyword: Keyword,
        index: u32,
        speckle_type: Option<&str>,
    ) -> Vec<&DomainObject> {
        self.entries
            .get(&RecordKey::new(keyword, index))
            .into_iter()
            .flat_map(BTreeMap::values)
            .filter(|obj| speckle_type.map_or(true, |t| obj.speckle_type == t))
            .collect()
    }

    pub fn num_speckle_objects(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// Number of translated native records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(index: u32) -> NativeRecord {
        NativeRecord::new(Keyword::Node).with_index(index)
    }

    fn obj(ty: &str, id: &str) -> (String, DomainObject) {
        (id.to_string(), DomainObject::new(ty).with_application_id(id))
    }

    #[test]
    fn set_replaces_prior_entry() {
        let mut ledger = TranslationLedger::new();
        ledger
            .set_speckle_objects(&node(1), [obj("Objects.Structural.Geometry.Node", "n1"), obj("Objects.Geometry.Point", "p1")])
            .unwrap();
        assert_eq!(ledger.num_speckle_objects(), 2);

        ledger
            .set_speckle_objects(&node(1), [obj("Objects.Structural.Geometry.Node", "n1")])
            .unwrap();
        assert_eq!(ledger.num_speckle_objects(), 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn objects_accumulate_across_records() {
        let mut ledger = TranslationLedger::new();
        ledger.set_speckle_objects(&node(2), [obj("Node", "b")]).unwrap();
        ledger.set_speckle_objects(&node(1), [obj("Node", "a")]).unwrap();
        let ids: Vec<&str> = ledger
            .speckle_objects()
            .into_iter()
            .filter_map(|o| o.application_id.as_ref().map(ApplicationId::as_str))
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn typed_lookup_filters_by_speckle_type() {
        let mut ledger = TranslationLedger::new();
        let memb = NativeRecord::new(Keyword::Memb).with_index(4);
        ledger
            .set_speckle_objects(&memb, [obj("Element1D", "m4"), obj("Point", "m4-start")])
            .unwrap();
        assert_eq!(ledger.speckle_objects_for(Keyword::Memb, 4, None).len(), 2);
        let typed = ledger.speckle_objects_for(Keyword::Memb, 4, Some("Element1D"));
        assert_eq!(typed.len(), 1);
        assert_eq!(typed[0].speckle_type, "Element1D");
        assert!(ledger.speckle_objects_for(Keyword::Memb, 5, None).is_empty());
        assert!(ledger.speckle_objects_for(Keyword::El, 4, None).is_empty());
    }

    #[test]
    fn unindexed_record_is_rejected() {
        let mut ledger = TranslationLedger::new();
        let err = ledger
            .set_speckle_objects(&NativeRecord::new(Keyword::El), [obj("Element1D", "e")])
            .unwrap_err();
        assert_eq!(err, LedgerError::UnindexedRecord { keyword: Keyword::El });
        assert!(ledger.is_empty());
    }

    #[test]
    fn properties_serialize_with_object() {
        let o = DomainObject::new("Node").with_property("x", 1.5).with_property("name", "N1");
        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(json["speckle_type"], "Node");
        assert_eq!(json["properties"]["x"], 1.5);
        assert!(json.get("application_id").is_none());
    }

    #[test]
    fn clear_empties_ledger() {
        let mut ledger = TranslationLedger::new();
        ledger.set_speckle_objects(&node(1), [obj("Node", "a")]).unwrap();
        ledger.clear();
        assert_eq!(ledger.num_speckle_objects(), 0);
        assert!(ledger.speckle_objects().is_empty());
    }

    #[test]
    fn blank_application_id_deserializes_as_none() {
        let o: DomainObject =
            serde_json::from_str(r#"{"speckle_type":"Node","application_id":"  "}"#).unwrap();
        assert!(o.application_id.is_none());
        let o: DomainObject =
            serde_json::from_str(r#"{"speckle_type":"Node","application_id":"n 1"}"#).unwrap();
        assert_eq!(o.application_id.unwrap().as_str(), "n1");
        let o: DomainObject = serde_json::from_str(r#"{"speckle_type":"Node"}"#).unwrap();
        assert!(o.application_id.is_none());
    }
}
