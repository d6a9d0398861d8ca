//! Native record model for the gwalink connector.
//!
//! Defines the keyword catalogue ([`Keyword`]) that tags every native record
//! kind, the decoded [`NativeRecord`] handed over by the GWA codec, and the
//! identities records carry: [`ApplicationId`], [`StreamId`] and
//! [`RecordKey`].

pub mod error;
pub mod hash;
pub mod keyword;
pub mod record;

pub use error::RecordError;
pub use hash::{hash_hex, record_hash, ContentHash};
pub use keyword::{Keyword, Layer, SetCommand};
pub use record::{ApplicationId, NativeRecord, RecordKey, StreamId};
