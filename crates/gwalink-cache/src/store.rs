//! The indexed record store.
//!
//! [`RecordCache`] gives every native record of every keyword a unique,
//! stable index and resolves application-id references before the
//! referenced record exists. One cache belongs to one conversion session.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use gwalink_schema::{ApplicationId, Keyword, NativeRecord, RecordError, RecordKey, StreamId};
use tracing::warn;

use crate::slot::{Slot, TypeIndexSpace, UpsertOutcome, EMPTY_SLOT};

/// Type-keyed store of native records and index reservations.
#[derive(Debug, Clone, Default)]
pub struct RecordCache {
    spaces: BTreeMap<Keyword, TypeIndexSpace>,
    streams: HashMap<StreamId, BTreeSet<RecordKey>>,
}

impl RecordCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a record.
    ///
    /// Without an explicit index the record takes the index already bound to
    /// its application id, or the lowest free one. An explicit index that
    /// lands on another id's reservation moves that reservation to the
    /// lowest free index first. Only malformed records are rejected.
    pub fn upsert(&mut self, record: NativeRecord) -> Result<UpsertOutcome, RecordError> {
        if let Err(e) = record.validate() {
            warn!(keyword = %record.keyword, index = ?record.index, error = %e, "rejected record");
            return Err(e);
        }
        let keyword = record.keyword;
        let stream = record.stream_id.clone();
        let (outcome, replaced) = self.spaces.entry(keyword).or_default().upsert(record);
        let key = RecordKey::new(keyword, outcome.index);

        if let Some(old_stream) = replaced.and_then(|r| r.stream_id) {
            if let Some(keys) = self.streams.get_mut(&old_stream) {
                keys.remove(&key);
                if keys.is_empty() {
                    self.streams.remove(&old_stream);
                }
            }
        }
        if let Some(stream) = stream {
            self.streams.entry(stream).or_default().insert(key);
        }
        Ok(outcome)
    }

    /// Index for an application id, reserving one if needed. Never fails.
    ///
    /// A bound id (real or provisional) always returns its current index.
    /// Without an id (or with a blank one) a fresh anonymous reservation is
    /// made on every call.
    pub fn resolve_index(&mut self, keyword: Keyword, application_id: Option<&str>) -> u32 {
        self.spaces
            .entry(keyword)
            .or_default()
            .resolve(application_id.and_then(ApplicationId::new))
    }

    /// Sorted indices of every real record of a keyword.
    pub fn lookup_indices(&self, keyword: Keyword) -> Vec<u32> {
        self.spaces
            .get(&keyword)
            .map(TypeIndexSpace::real_indices)
            .unwrap_or_default()
    }

    /// For each id, the index of the real record bound to it.
    pub fn lookup_indices_for<I, S>(&self, keyword: Keyword, application_ids: I) -> Vec<Option<u32>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        application_ids
            .into_iter()
            .map(|id| self.lookup_index(keyword, id.as_ref()))
            .collect()
    }

    /// Index of the real record bound to one id.
    pub fn lookup_index(&self, keyword: Keyword, application_id: &str) -> Option<u32> {
        let id = ApplicationId::new(application_id)?;
        self.spaces.get(&keyword)?.real_index(&id)
    }

    /// Application id held by a slot, real or provisional.
    pub fn get_application_id(&self, keyword: Keyword, index: u32) -> Option<&ApplicationId> {
        self.slot(keyword, index).application_id()
    }

    /// The record at a real slot.
    pub fn get_native(&self, keyword: Keyword, index: u32) -> Option<&NativeRecord> {
        self.slot(keyword, index).record()
    }

    pub fn slot(&self, keyword: Keyword, index: u32) -> &Slot {
        match self.spaces.get(&keyword) {
            Some(space) => space.slot(index),
            None => &EMPTY_SLOT,
        }
    }

    pub fn space(&self, keyword: Keyword) -> Option<&TypeIndexSpace> {
        self.spaces.get(&keyword)
    }

    /// Number of real records across all keywords.
    pub fn len(&self) -> usize {
        self.spaces.values().map(TypeIndexSpace::real_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn provisional_count(&self, keyword: Keyword) -> usize {
        self.spaces
            .get(&keyword)
            .map_or(0, TypeIndexSpace::provisional_count)
    }

    /// Keywords with at least one real or provisional slot.
    pub fn keywords(&self) -> impl Iterator<Item = Keyword> + '_ {
        self.spaces
            .iter()
            .filter(|(_, space)| space.occupied() > 0)
            .map(|(&kw, _)| kw)
    }

    /// Real records of a keyword in index order.
    pub fn records(&self, keyword: Keyword) -> impl Iterator<Item = &NativeRecord> + '_ {
        self.spaces
            .get(&keyword)
            .into_iter()
            .flat_map(TypeIndexSpace::records)
    }

    /// Keys of the real records received from or bound for a stream.
    pub fn indices_for_stream(&self, stream_id: &str) -> Vec<RecordKey> {
        self.streams
            .get(&StreamId::new(stream_id))
            .map(|keys| keys.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Streams seen so far, sorted.
    pub fn stream_ids(&self) -> Vec<&StreamId> {
        let mut ids: Vec<&StreamId> = self.streams.keys().collect();
        ids.sort();
        ids
    }

    /// Begin a new send round. Records stored so far count as the previous
    /// round until they are written again.
    pub fn mark_previous(&mut self) {
        for space in self.spaces.values_mut() {
            space.mark_previous();
        }
    }

    /// Previous-round records that this round replaced or left behind. The
    /// write-back removes or overwrites these.
    pub fn expired_records(&self) -> Vec<&NativeRecord> {
        self.spaces
            .values()
            .flat_map(TypeIndexSpace::expired_records)
            .collect()
    }

    /// Records written in the current round, which a later send may delete.
    pub fn deletable_records(&self) -> Vec<&NativeRecord> {
        self.spaces
            .values()
            .flat_map(TypeIndexSpace::latest_records)
            .collect()
    }

    /// Drop every record and reservation.
    pub fn clear(&mut self) {
        self.spaces.clear();
        self.streams.clear();
    }
}
