use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::store::{JSON_STORE_PREFIX, MISSING_FILENAME, UNIDENTIFIED_FILENAME};
use crate::data::{
    AgeRange, BiologicalEvidence, EvidenceStatus, MissingRecord, Sex, UnidentifiedRecord,
};
use crate::errors::MatchError;
use crate::geo::GeoPoint;
use crate::store::{InMemoryStore, RecordStore, StoreOpener};
use crate::types::StoreId;

/// Store reading `unidentified_cases.json` and `missing_persons.json` from a
/// directory.
///
/// Each file is a JSON array of rows using the storage column names
/// (`case_number`, `discovery_date`, `estimated_sex`, ...). Malformed field
/// values degrade to unknown; rows without an identifier are skipped.
/// Every `open` re-reads the directory and yields an independent handle.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    id: StoreId,
}

impl JsonFileStore {
    /// Store reading from the directory `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let id = format!("{JSON_STORE_PREFIX}{}", root.display());
        Self { root, id }
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_rows<T: DeserializeOwned>(&self, filename: &str) -> Result<Vec<T>, MatchError> {
        let path = self.root.join(filename);
        let raw = fs::read_to_string(&path).map_err(|err| MatchError::StoreUnavailable {
            store_id: self.id.clone(),
            reason: format!("failed to read {}: {err}", path.display()),
        })?;
        serde_json::from_str(&raw).map_err(|err| MatchError::StoreInconsistent {
            store_id: self.id.clone(),
            details: format!("{} is not a JSON array of rows: {err}", path.display()),
        })
    }

    /// Load and convert both collections.
    pub fn load(&self) -> Result<InMemoryStore, MatchError> {
        let unidentified_rows: Vec<UnidentifiedRow> = self.read_rows(UNIDENTIFIED_FILENAME)?;
        let missing_rows: Vec<MissingRow> = self.read_rows(MISSING_FILENAME)?;

        let unidentified_total = unidentified_rows.len();
        let missing_total = missing_rows.len();
        let unidentified: Vec<UnidentifiedRecord> = unidentified_rows
            .into_iter()
            .filter_map(UnidentifiedRow::into_record)
            .collect();
        let missing: Vec<MissingRecord> = missing_rows
            .into_iter()
            .filter_map(MissingRow::into_record)
            .collect();

        let skipped = (unidentified_total - unidentified.len()) + (missing_total - missing.len());
        if skipped > 0 {
            warn!(
                store_id = %self.id,
                skipped,
                "skipping rows without a case or file number"
            );
        }
        debug!(
            store_id = %self.id,
            unidentified = unidentified.len(),
            missing = missing.len(),
            "json store loaded"
        );
        InMemoryStore::with_id(self.id.clone(), unidentified, missing)
    }
}

impl StoreOpener for JsonFileStore {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> Result<Box<dyn RecordStore>, MatchError> {
        Ok(Box::new(self.load()?))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UnidentifiedRow {
    case_number: Option<Value>,
    discovery_date: Option<Value>,
    estimated_sex: Option<Value>,
    estimated_age_min: Option<Value>,
    estimated_age_max: Option<Value>,
    discovery_lat: Option<Value>,
    discovery_lon: Option<Value>,
    race: Option<Value>,
    dna_status: Option<Value>,
    dental_status: Option<Value>,
    description: Option<Value>,
}

impl UnidentifiedRow {
    fn into_record(self) -> Option<UnidentifiedRecord> {
        Some(UnidentifiedRecord {
            case_number: lenient_string(self.case_number)?,
            discovery_date: lenient_date(self.discovery_date),
            sex: lenient_sex(self.estimated_sex),
            age: AgeRange::new(
                lenient_age(self.estimated_age_min),
                lenient_age(self.estimated_age_max),
            ),
            location: GeoPoint::from_parts(
                lenient_f64(self.discovery_lat),
                lenient_f64(self.discovery_lon),
            ),
            race: lenient_string(self.race),
            evidence: lenient_evidence(self.dna_status, self.dental_status),
            description: lenient_string(self.description).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MissingRow {
    file_number: Option<Value>,
    name: Option<Value>,
    last_seen_date: Option<Value>,
    sex: Option<Value>,
    age_at_disappearance: Option<Value>,
    last_seen_lat: Option<Value>,
    last_seen_lon: Option<Value>,
    race: Option<Value>,
    dna_status: Option<Value>,
    dental_status: Option<Value>,
    description: Option<Value>,
}

impl MissingRow {
    fn into_record(self) -> Option<MissingRecord> {
        Some(MissingRecord {
            file_number: lenient_string(self.file_number)?,
            name: lenient_string(self.name).unwrap_or_default(),
            last_seen_date: lenient_date(self.last_seen_date),
            sex: lenient_sex(self.sex),
            age: lenient_age(self.age_at_disappearance),
            location: GeoPoint::from_parts(
                lenient_f64(self.last_seen_lat),
                lenient_f64(self.last_seen_lon),
            ),
            race: lenient_string(self.race),
            evidence: lenient_evidence(self.dna_status, self.dental_status),
            description: lenient_string(self.description).unwrap_or_default(),
        })
    }
}

/// Trimmed non-empty string; numbers are stringified.
fn lenient_string(value: Option<Value>) -> Option<String> {
    let text = match value? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn lenient_f64(value: Option<Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|parsed| parsed.is_finite())
}

/// Whole years in `0..=130`; fractional values are truncated.
fn lenient_age(value: Option<Value>) -> Option<u32> {
    let years = lenient_f64(value)?;
    if (0.0..=130.0).contains(&years) {
        Some(years.trunc() as u32)
    } else {
        None
    }
}

/// ISO dates (optionally with a time part) or US `MM/DD/YYYY`.
fn lenient_date(value: Option<Value>) -> Option<NaiveDate> {
    let text = lenient_string(value)?;
    let day = text.split('T').next().unwrap_or(&text).trim();
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%m/%d/%Y"))
        .ok()
}

fn lenient_sex(value: Option<Value>) -> Sex {
    lenient_string(value)
        .map(|text| Sex::parse(&text))
        .unwrap_or_default()
}

fn lenient_evidence(dna: Option<Value>, dental: Option<Value>) -> BiologicalEvidence {
    let parse = |value: Option<Value>| {
        lenient_string(value)
            .map(|text| EvidenceStatus::parse(&text))
            .unwrap_or_default()
    };
    BiologicalEvidence {
        dna: parse(dna),
        dental: parse(dental),
    }
}
