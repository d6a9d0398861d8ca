//! Per-keyword index spaces.
//!
//! A [`TypeIndexSpace`] maps positive indices to [`Slot`]s and keeps a
//! reverse map from application id to index. Only non-empty slots are
//! stored; every bound application id points at a stored slot.

use std::collections::{BTreeMap, HashMap};

use gwalink_schema::{hash_hex, record_hash, ApplicationId, ContentHash, NativeRecord};
use serde::Serialize;
use tracing::{debug, warn};

/// State of one (keyword, index) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Empty,
    /// Reserved ahead of the record's data, optionally for an application id.
    Provisional {
        application_id: Option<ApplicationId>,
    },
    /// Holds a record. The record's index always equals the slot's index.
    Real {
        record: NativeRecord,
        hash: ContentHash,
        state: RecordState,
    },
}

/// Where a real record stands relative to the last [`TypeIndexSpace::mark_previous`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordState {
    /// Written in the current round and absent from the previous one.
    Latest,
    /// Present in the previous round and written again, unchanged, in this one.
    Carried,
    /// Present in the previous round and not written since.
    Previous,
}

impl RecordState {
    fn in_latest(self) -> bool {
        matches!(self, RecordState::Latest | RecordState::Carried)
    }

    fn in_previous(self) -> bool {
        matches!(self, RecordState::Carried | RecordState::Previous)
    }
}

pub(crate) static EMPTY_SLOT: Slot = Slot::Empty;

impl Slot {
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, Slot::Provisional { .. })
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Slot::Real { .. })
    }

    pub fn application_id(&self) -> Option<&ApplicationId> {
        match self {
            Slot::Empty => None,
            Slot::Provisional { application_id } => application_id.as_ref(),
            Slot::Real { record, .. } => record.application_id.as_ref(),
        }
    }

    pub fn record(&self) -> Option<&NativeRecord> {
        match self {
            Slot::Real { record, .. } => Some(record),
            _ => None,
        }
    }

    pub fn state(&self) -> Option<RecordState> {
        match self {
            Slot::Real { state, .. } => Some(*state),
            _ => None,
        }
    }
}

/// What an upsert did to the target slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotChange {
    /// The slot was empty.
    Inserted,
    /// The slot held a reservation.
    ClaimedReservation,
    /// The slot held a different record.
    Updated,
    /// The slot already held an identical record.
    Unchanged,
}

/// A reservation moved out of the way of an explicitly indexed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub application_id: ApplicationId,
    pub from: u32,
    pub to: u32,
}

/// Result of a successful upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub index: u32,
    pub change: SlotChange,
    pub relocated: Option<Relocation>,
}

/// Index space of a single keyword.
#[derive(Debug, Clone, Default)]
pub struct TypeIndexSpace {
    slots: BTreeMap<u32, Slot>,
    by_app_id: HashMap<ApplicationId, u32>,
    /// Previous-round records replaced by a different record since.
    superseded: BTreeMap<u32, Vec<NativeRecord>>,
}

impl TypeIndexSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, index: u32) -> &Slot {
        self.slots.get(&index).unwrap_or(&EMPTY_SLOT)
    }

    /// Index currently bound to an application id, real or provisional.
    pub fn bound_index(&self, application_id: &ApplicationId) -> Option<u32> {
        self.by_app_id.get(application_id).copied()
    }

    /// Index of the real record bound to an application id.
    pub fn real_index(&self, application_id: &ApplicationId) -> Option<u32> {
        self.bound_index(application_id)
            .filter(|&index| self.slot(index).is_real())
    }

    /// Lowest positive index with no slot, skipping `except`.
    ///
    /// Recomputed on every call: releases and relocations can free low
    /// indices at any time.
    pub fn lowest_free(&self, except: Option<u32>) -> u32 {
        let mut candidate = 1;
        for &index in self.slots.keys() {
            if Some(candidate) == except {
                candidate += 1;
            }
            if index > candidate {
                break;
            }
            if index == candidate {
                candidate += 1;
            }
        }
        if Some(candidate) == except {
            candidate += 1;
        }
        candidate
    }

    /// Sorted indices of real slots.
    pub fn real_indices(&self) -> Vec<u32> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_real())
            .map(|(&index, _)| index)
            .collect()
    }

    /// Real records in index order.
    pub fn records(&self) -> impl Iterator<Item = &NativeRecord> {
        self.slots.values().filter_map(Slot::record)
    }

    pub fn real_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_real()).count()
    }

    pub fn provisional_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_provisional()).count()
    }

    /// Number of non-empty slots.
    pub fn occupied(&self) -> usize {
        self.slots.len()
    }

    /// Start a new round: every real record now belongs to the previous one.
    pub fn mark_previous(&mut self) {
        for slot in self.slots.values_mut() {
            if let Slot::Real { state, .. } = slot {
                *state = RecordState::Previous;
            }
        }
        self.superseded.clear();
    }

    /// Previous-round records that the current round replaced or has not
    /// written again, in index order.
    pub fn expired_records(&self) -> Vec<&NativeRecord> {
        let mut expired: BTreeMap<u32, Vec<&NativeRecord>> = BTreeMap::new();
        for (&index, records) in &self.superseded {
            expired.entry(index).or_default().extend(records);
        }
        for (&index, slot) in &self.slots {
            if let Slot::Real {
                record,
                state: RecordState::Previous,
                ..
            } = slot
            {
                expired.entry(index).or_default().push(record);
            }
        }
        expired.into_values().flatten().collect()
    }

    /// Records written in the current round, in index order.
    pub fn latest_records(&self) -> impl Iterator<Item = &NativeRecord> {
        self.slots.values().filter_map(|slot| match slot {
            Slot::Real { record, state, .. } if state.in_latest() => Some(record),
            _ => None,
        })
    }

    /// Return the bound index for `application_id`, or reserve the lowest
    /// free index for it.
    pub(crate) fn resolve(&mut self, application_id: Option<ApplicationId>) -> u32 {
        if let Some(index) = application_id.as_ref().and_then(|id| self.bound_index(id)) {
            return index;
        }
        let index = self.lowest_free(None);
        if let Some(id) = &application_id {
            self.by_app_id.insert(id.clone(), index);
        }
        debug!(index, application_id = ?application_id, "reserved provisional index");
        self.slots.insert(index, Slot::Provisional { application_id });
        index
    }

    /// Store a validated record and return what happened, plus the record
    /// it replaced, if any.
    pub(crate) fn upsert(&mut self, mut record: NativeRecord) -> (UpsertOutcome, Option<NativeRecord>) {
        let keyword = record.keyword;
        let app_id = record.application_id.clone();
        let bound = app_id.as_ref().and_then(|id| self.bound_index(id));
        let index = record
            .index
            .or(bound)
            .unwrap_or_else(|| self.lowest_free(None));

        // The record claims `index`; a binding for its id elsewhere goes.
        if let (Some(id), Some(previous)) = (&app_id, bound) {
            if previous != index {
                match self.slots.get(&previous) {
                    Some(Slot::Provisional { .. }) => {
                        self.slots.remove(&previous);
                        debug!(%keyword, %id, from = previous, to = index, "released reservation");
                    }
                    Some(Slot::Real { .. }) => {
                        if let Some(Slot::Real { record, hash, .. }) = self.slots.get_mut(&previous) {
                            record.application_id = None;
                            *hash = record_hash(record);
                        }
                        warn!(%keyword, %id, from = previous, to = index, "application id moved to a new index");
                    }
                    _ => {}
                }
                self.by_app_id.remove(id);
            }
        }

        record.index = Some(index);
        // An update without an id keeps the identity already at the slot.
        if record.application_id.is_none() {
            if let Some(Slot::Real { record: existing, .. }) = self.slots.get(&index) {
                record.application_id = existing.application_id.clone();
            }
        }
        let app_id = record.application_id.clone();
        let hash = record_hash(&record);
        let mut state = RecordState::Latest;
        let mut relocated = None;
        let mut replaced = None;

        let change = match self.slots.remove(&index) {
            None | Some(Slot::Empty) => SlotChange::Inserted,
            Some(Slot::Provisional { application_id }) => {
                if let Some(other) = application_id.filter(|other| Some(other) != app_id.as_ref()) {
                    let to = self.lowest_free(Some(index));
                    self.by_app_id.insert(other.clone(), to);
                    self.slots.insert(
                        to,
                        Slot::Provisional {
                            application_id: Some(other.clone()),
                        },
                    );
                    debug!(%keyword, id = %other, from = index, to, "relocated reservation");
                    relocated = Some(Relocation {
                        application_id: other,
                        from: index,
                        to,
                    });
                }
                SlotChange::ClaimedReservation
            }
            Some(Slot::Real {
                record: existing,
                hash: existing_hash,
                state: existing_state,
            }) => {
                if let Some(old) = &existing.application_id {
                    if Some(old) != app_id.as_ref() {
                        warn!(
                            %keyword,
                            index,
                            old = %old,
                            new = ?app_id,
                            "overwriting record of a different identity"
                        );
                        if self.by_app_id.get(old) == Some(&index) {
                            self.by_app_id.remove(old);
                        }
                    }
                }
                let change = if existing_hash == hash {
                    if existing_state.in_previous() {
                        state = RecordState::Carried;
                    }
                    SlotChange::Unchanged
                } else {
                    debug!(
                        %keyword,
                        index,
                        from = %hash_hex(&existing_hash),
                        to = %hash_hex(&hash),
                        "updated record"
                    );
                    if existing_state.in_previous() {
                        self.superseded.entry(index).or_default().push(existing.clone());
                    }
                    SlotChange::Updated
                };
                replaced = Some(existing);
                change
            }
        };

        if let Some(id) = app_id {
            self.by_app_id.insert(id, index);
        }
        self.slots.insert(index, Slot::Real { record, hash, state });

        (
            UpsertOutcome {
                index,
                change,
                relocated,
            },
            replaced,
        )
    }
}
