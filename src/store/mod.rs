//! Record store interfaces.
//!
//! Ownership model:
//! - `RecordStore` is a handle over both collections. A handle is owned by one
//!   caller at a time and is never shared between scoring workers.
//! - `StoreOpener` produces fresh handles; the coordinator asks it for one
//!   handle per worker so no connection is ever contended.

use crate::data::{MissingRecord, UnidentifiedRecord};
use crate::errors::MatchError;

/// JSON directory store.
pub mod json_file;
/// In-memory store used for tests and embedding.
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

/// Read-only access to the UHR and MP collections.
pub trait RecordStore: Send {
    /// Stable store identifier used in logs and errors.
    fn id(&self) -> &str;
    /// Every unidentified-remains record, in store order.
    fn unidentified_records(&self) -> Result<Vec<UnidentifiedRecord>, MatchError>;
    /// Every missing-person record, in store order.
    fn missing_records(&self) -> Result<Vec<MissingRecord>, MatchError>;
}

/// Opens independent `RecordStore` handles.
///
/// Must be callable concurrently from several worker threads.
pub trait StoreOpener: Send + Sync {
    /// Identifier of the store handles this opener produces.
    fn id(&self) -> &str;
    /// Open a new handle. Failure here is fatal for the run.
    fn open(&self) -> Result<Box<dyn RecordStore>, MatchError>;
}
