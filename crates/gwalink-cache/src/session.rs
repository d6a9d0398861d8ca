//! One conversion run: a cache and a ledger that live and die together.

use gwalink_deps::{keyword_generations, GraphError};
use gwalink_schema::{Keyword, Layer, NativeRecord};
use tracing::info_span;
use uuid::Uuid;

use crate::hydrate::{HydrateErrors, HydrateProgress, HydrateSummary};
use crate::ledger::TranslationLedger;
use crate::store::RecordCache;

/// State owned by a single send or receive.
#[derive(Debug, Clone)]
pub struct ConversionSession {
    id: Uuid,
    layer: Layer,
    pub cache: RecordCache,
    pub ledger: TranslationLedger,
}

impl ConversionSession {
    pub fn new(layer: Layer) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer,
            cache: RecordCache::new(),
            ledger: TranslationLedger::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Processing order of the session layer's keywords, referenced types
    /// first.
    pub fn generations(&self) -> Result<Vec<Vec<Keyword>>, GraphError> {
        keyword_generations(self.layer)
    }

    /// Load records into the session cache. Records of keywords outside the
    /// session layer are stored too; the layer only shapes the ordering.
    pub fn hydrate<I, F>(
        &mut self,
        records: I,
        progress_every: usize,
        on_progress: F,
    ) -> Result<HydrateSummary, HydrateErrors>
    where
        I: IntoIterator<Item = NativeRecord>,
        F: FnMut(HydrateProgress),
    {
        let span = info_span!("hydrate", session = %self.id, layer = %self.layer);
        let _guard = span.enter();
        self.cache.hydrate(records, progress_every, on_progress)
    }

    /// Forget everything but the session identity.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.ledger.clear();
    }
}
