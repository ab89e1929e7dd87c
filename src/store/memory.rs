use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::constants::store::MEMORY_STORE_ID;
use crate::data::{CaseNumber, FileNumber, MissingRecord, UnidentifiedRecord};
use crate::errors::MatchError;
use crate::store::{RecordStore, StoreOpener};
use crate::types::StoreId;

#[derive(Debug, Default)]
struct Collections {
    unidentified: IndexMap<CaseNumber, UnidentifiedRecord>,
    missing: IndexMap<FileNumber, MissingRecord>,
}

/// Store backed by in-memory collections keyed by case/file number.
///
/// Cloning and opening are cheap: handles share the loaded collections and
/// hand out owned copies of the records.
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    id: StoreId,
    collections: Arc<Collections>,
}

impl InMemoryStore {
    /// Build a store, rejecting duplicate case or file numbers.
    pub fn new(
        unidentified: Vec<UnidentifiedRecord>,
        missing: Vec<MissingRecord>,
    ) -> Result<Self, MatchError> {
        Self::with_id(MEMORY_STORE_ID, unidentified, missing)
    }

    /// Same as `new` with an explicit store id.
    pub fn with_id(
        id: impl Into<StoreId>,
        unidentified: Vec<UnidentifiedRecord>,
        missing: Vec<MissingRecord>,
    ) -> Result<Self, MatchError> {
        let id = id.into();
        let mut collections = Collections::default();
        for record in unidentified {
            match collections.unidentified.entry(record.case_number.clone()) {
                Entry::Occupied(entry) => {
                    return Err(duplicate(&id, "case number", entry.key()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(record);
                }
            }
        }
        for record in missing {
            match collections.missing.entry(record.file_number.clone()) {
                Entry::Occupied(entry) => {
                    return Err(duplicate(&id, "file number", entry.key()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(record);
                }
            }
        }
        Ok(Self {
            id,
            collections: Arc::new(collections),
        })
    }

    /// Number of UHR records.
    pub fn unidentified_len(&self) -> usize {
        self.collections.unidentified.len()
    }

    /// Number of MP records.
    pub fn missing_len(&self) -> usize {
        self.collections.missing.len()
    }

    /// UHR record by case number.
    pub fn unidentified(&self, case_number: &str) -> Option<&UnidentifiedRecord> {
        self.collections.unidentified.get(case_number)
    }

    /// MP record by file number.
    pub fn missing(&self, file_number: &str) -> Option<&MissingRecord> {
        self.collections.missing.get(file_number)
    }
}

fn duplicate(store_id: &str, field: &str, value: &str) -> MatchError {
    MatchError::StoreInconsistent {
        store_id: store_id.to_string(),
        details: format!("duplicate {field} '{value}'"),
    }
}

impl RecordStore for InMemoryStore {
    fn id(&self) -> &str {
        &self.id
    }

    fn unidentified_records(&self) -> Result<Vec<UnidentifiedRecord>, MatchError> {
        Ok(self.collections.unidentified.values().cloned().collect())
    }

    fn missing_records(&self) -> Result<Vec<MissingRecord>, MatchError> {
        Ok(self.collections.missing.values().cloned().collect())
    }
}

impl StoreOpener for InMemoryStore {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> Result<Box<dyn RecordStore>, MatchError> {
        Ok(Box::new(self.clone()))
    }
}
