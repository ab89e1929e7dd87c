use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::leads::SCORE_DECIMALS;
use crate::geo::GeoPoint;

pub use crate::types::{CaseNumber, Feature, FileNumber};

/// Recorded or estimated sex of a subject.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Examiner could not determine sex.
    Uncertain,
    /// Not recorded.
    #[default]
    Unknown,
}

impl Sex {
    /// Lenient parse of free-form sex values (`"Male"`, `"f"`, `"Uncertain"`, ...).
    ///
    /// Anything unrecognized is `Unknown` rather than an error.
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        if lowered.starts_with("uncertain") || lowered.starts_with("indeterminate") {
            return Sex::Uncertain;
        }
        match lowered.chars().next() {
            Some('m') => Sex::Male,
            Some('f') => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    /// True when the value pins down one sex.
    pub fn is_determinate(self) -> bool {
        matches!(self, Sex::Male | Sex::Female)
    }
}

/// Status of a biological evidence record (DNA or dental).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceStatus {
    /// Record on file.
    Complete,
    /// Sample submitted or processing.
    Submitted,
    /// No sample exists.
    NotAvailable,
    /// Not recorded or unrecognized.
    #[default]
    Unknown,
}

impl EvidenceStatus {
    /// Lenient parse of free-form status strings.
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        if lowered.is_empty() {
            return EvidenceStatus::Unknown;
        }
        if lowered.starts_with("not") || lowered.starts_with("none") || lowered == "no" {
            return EvidenceStatus::NotAvailable;
        }
        if lowered.contains("incomplete") {
            return EvidenceStatus::Submitted;
        }
        if lowered.contains("complete") || lowered.contains("on file") {
            return EvidenceStatus::Complete;
        }
        if lowered.contains("submit") || lowered.contains("pending") || lowered.contains("progress")
        {
            return EvidenceStatus::Submitted;
        }
        EvidenceStatus::Unknown
    }

    /// True for `Complete`.
    pub fn is_complete(self) -> bool {
        self == EvidenceStatus::Complete
    }
}

/// Estimated age range for unidentified remains; either bound may be unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    /// Lower bound in years.
    pub min: Option<u32>,
    /// Upper bound in years.
    pub max: Option<u32>,
}

impl AgeRange {
    /// Range from optional bounds; swapped bounds are reordered.
    pub fn new(min: Option<u32>, max: Option<u32>) -> Self {
        // Swapped bounds show up in hand-entered data; keep the range well-formed.
        match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => Self {
                min: Some(hi),
                max: Some(lo),
            },
            _ => Self { min, max },
        }
    }

    /// True when neither bound is known.
    pub fn is_unknown(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Biological evidence available for a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiologicalEvidence {
    /// DNA sample status.
    pub dna: EvidenceStatus,
    /// Dental record status.
    pub dental: EvidenceStatus,
}

/// Unidentified human remains case. Immutable once loaded for a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnidentifiedRecord {
    /// Case identifier, unique within the collection.
    pub case_number: CaseNumber,
    /// Date the remains were found.
    pub discovery_date: Option<NaiveDate>,
    /// Estimated sex.
    pub sex: Sex,
    /// Estimated age range.
    pub age: AgeRange,
    /// Discovery location.
    pub location: Option<GeoPoint>,
    /// Free-form race label.
    pub race: Option<String>,
    /// DNA and dental record status.
    pub evidence: BiologicalEvidence,
    /// Free-text description of remains, clothing, and marks.
    pub description: String,
}

/// Missing person case. Immutable once loaded for a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissingRecord {
    /// File identifier, unique within the collection.
    pub file_number: FileNumber,
    /// Subject name.
    pub name: String,
    /// Date the person was last seen.
    pub last_seen_date: Option<NaiveDate>,
    /// Recorded sex.
    pub sex: Sex,
    /// Age in years at disappearance.
    pub age: Option<u32>,
    /// Last-seen location.
    pub location: Option<GeoPoint>,
    /// Free-form race label.
    pub race: Option<String>,
    /// DNA and dental record status.
    pub evidence: BiologicalEvidence,
    /// Free-text description of the person, clothing, and marks.
    pub description: String,
}

/// Candidate link between one UHR case and one MP case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// UHR case number.
    pub uhr_case: CaseNumber,
    /// MP file number.
    pub mp_file: FileNumber,
    /// Name on the MP file.
    pub mp_name: String,
    /// Composite score in `[0, 1]`; serialized rounded to three decimals.
    #[serde(serialize_with = "serialize_rounded_score")]
    pub score: f64,
    /// Shared tokens followed by distance and phenotype annotations.
    pub shared_features: Vec<Feature>,
    /// Truncated UHR description.
    pub uhr_desc_preview: String,
    /// Truncated MP description.
    pub mp_desc_preview: String,
}

impl Lead {
    /// Score rounded the way it is serialized.
    pub fn rounded_score(&self) -> f64 {
        round_score(self.score)
    }
}

/// Round a score to the serialized precision.
pub fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (score * factor).round() / factor
}

fn serialize_rounded_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_score(*score))
}
