//! Identity resolution for native records.
//!
//! [`RecordCache`] assigns every native record a stable integer index,
//! reserving indices for application ids that are referenced before their
//! record exists. [`TranslationLedger`] remembers which domain objects came
//! from which record. A [`ConversionSession`] owns one of each.

pub mod error;
pub mod hydrate;
pub mod ledger;
pub mod session;
pub mod slot;
pub mod store;

pub use error::{HydrateFailure, LedgerError};
pub use hydrate::{HydrateErrors, HydrateProgress, HydrateSummary};
pub use ledger::{DomainObject, TranslationLedger};
pub use session::ConversionSession;
pub use slot::{RecordState, Relocation, Slot, SlotChange, TypeIndexSpace, UpsertOutcome};
pub use store::RecordCache;
