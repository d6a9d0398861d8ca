//! Bulk loading of decoded records into a cache.

use std::fmt;

use gwalink_schema::NativeRecord;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::HydrateFailure;
use crate::slot::SlotChange;
use crate::store::RecordCache;

/// Progress snapshot handed to the hydration callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HydrateProgress {
    pub processed: usize,
    pub total: usize,
    pub failed: usize,
}

/// Counts of what a hydration run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HydrateSummary {
    pub inserted: usize,
    pub claimed: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub relocated: usize,
    pub failed: usize,
}

impl HydrateSummary {
    /// Records stored, whatever happened to their slot.
    pub fn stored(&self) -> usize {
        self.inserted + self.claimed + self.updated + self.unchanged
    }

    fn count(&mut self, change: SlotChange) {
        match change {
            SlotChange::Inserted => self.inserted += 1,
            SlotChange::ClaimedReservation => self.claimed += 1,
            SlotChange::Updated => self.updated += 1,
            SlotChange::Unchanged => self.unchanged += 1,
        }
    }
}

impl fmt::Display for HydrateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} stored ({} new, {} claimed, {} updated, {} unchanged), {} relocated, {} failed",
            self.stored(),
            self.inserted,
            self.claimed,
            self.updated,
            self.unchanged,
            self.relocated,
            self.failed
        )
    }
}

/// Hydration finished but some records were rejected. The valid ones are
/// in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} of {} records rejected", .failures.len(), .summary.stored() + .failures.len())]
pub struct HydrateErrors {
    pub summary: HydrateSummary,
    pub failures: Vec<HydrateFailure>,
}

impl RecordCache {
    /// Upsert every record, continuing past malformed ones.
    ///
    /// `on_progress` is called every `progress_every` records and once at
    /// the end; `0` only reports the end.
    pub fn hydrate<I, F>(
        &mut self,
        records: I,
        progress_every: usize,
        mut on_progress: F,
    ) -> Result<HydrateSummary, HydrateErrors>
    where
        I: IntoIterator<Item = NativeRecord>,
        F: FnMut(HydrateProgress),
    {
        let records: Vec<NativeRecord> = records.into_iter().collect();
        let total = records.len();
        let mut summary = HydrateSummary::default();
        let mut failures = Vec::new();

        for (position, record) in records.into_iter().enumerate() {
            match self.upsert(record) {
                Ok(outcome) => {
                    summary.count(outcome.change);
                    if outcome.relocated.is_some() {
                        summary.relocated += 1;
                    }
                }
                Err(error) => failures.push(HydrateFailure { position, error }),
            }
            let processed = position + 1;
            if progress_every > 0 && processed % progress_every == 0 && processed < total {
                on_progress(HydrateProgress {
                    processed,
                    total,
                    failed: failures.len(),
                });
            }
        }
        summary.failed = failures.len();
        on_progress(HydrateProgress {
            processed: total,
            total,
            failed: failures.len(),
        });

        if failures.is_empty() {
            info!(%summary, "hydrated cache");
            Ok(summary)
        } else {
            warn!(%summary, "hydrated cache with rejected records");
            Err(HydrateErrors { summary, failures })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwalink_schema::{Keyword, RecordError};

    fn node(index: u32) -> NativeRecord {
        NativeRecord::new(Keyword::Node).with_index(index)
    }

    #[test]
    fn hydrate_counts_changes() {
        let mut cache = RecordCache::new();
        cache.resolve_index(Keyword::Node, Some("n2"));
        let records = vec![
            node(1),
            NativeRecord::new(Keyword::Node).with_application_id("n2"),
            node(1),
            node(3).with_application_id("other"),
        ];
        let summary = cache.hydrate(records, 0, |_| {}).unwrap();
        // node 1 lands on n2's reservation and pushes it to index 2
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.claimed, 2);
        assert_eq!(summary.relocated, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.stored(), 4);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.lookup_index(Keyword::Node, "n2"), Some(2));
    }

    #[test]
    fn failures_are_collected_and_valid_records_kept() {
        let mut cache = RecordCache::new();
        let records = vec![
            node(1),
            node(0),
            node(2),
            node(3).with_fields(["a\nb".to_string()]),
        ];
        let err = cache.hydrate(records, 0, |_| {}).unwrap_err();
        assert_eq!(err.summary.stored(), 2);
        assert_eq!(err.summary.failed, 2);
        let positions: Vec<usize> = err.failures.iter().map(|f| f.position).collect();
        assert_eq!(positions, vec![1, 3]);
        assert_eq!(
            err.failures[0].error,
            RecordError::ZeroIndex { keyword: Keyword::Node }
        );
        assert_eq!(err.to_string(), "2 of 4 records rejected");
        assert_eq!(cache.lookup_indices(Keyword::Node), vec![1, 2]);
    }

    #[test]
    fn progress_is_reported_periodically_and_at_end() {
        let mut cache = RecordCache::new();
        let records: Vec<NativeRecord> = (1..=5).map(node).collect();
        let mut seen = Vec::new();
        cache
            .hydrate(records, 2, |p| seen.push((p.processed, p.total)))
            .unwrap();
        assert_eq!(seen, vec![(2, 5), (4, 5), (5, 5)]);
    }

    #[test]
    fn relocations_are_counted() {
        let mut cache = RecordCache::new();
        cache.resolve_index(Keyword::Memb, Some("a"));
        let summary = cache
            .hydrate([NativeRecord::new(Keyword::Memb).with_index(1).with_application_id("b")], 0, |_| {})
            .unwrap();
        assert_eq!(summary.relocated, 1);
        assert_eq!(summary.claimed, 1);
        assert_eq!(cache.resolve_index(Keyword::Memb, Some("a")), 2);
    }
}
