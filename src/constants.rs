/// Constants used by corpus statistics and token specificity.
pub mod specificity {
    /// Specificity assigned to tokens that never appear in a collection.
    pub const UNSEEN_TOKEN_SPECIFICITY: f64 = 2.5;
    /// Averaged specificity above which a shared token is annotated as rare.
    pub const RARE_THRESHOLD: f64 = 2.2;
    /// Averaged specificity above which a shared token is surfaced as a feature.
    pub const ORDINARY_THRESHOLD: f64 = 1.5;
    /// Suffix appended to rare-token feature annotations.
    pub const RARE_SUFFIX: &str = " (rare)";

    /// Stop words ignored at scoring time: demographic terms, measurement units,
    /// and generic forensic vocabulary.
    pub const DEFAULT_STOP_WORDS: &[&str] = &[
        "the",
        "and",
        "was",
        "with",
        "found",
        "on",
        "in",
        "at",
        "of",
        "for",
        "to",
        "is",
        "has",
        "unknown",
        "unsure",
        "uncertain",
        "years",
        "old",
        "male",
        "female",
        "white",
        "black",
        "caucasian",
        "american",
        "african",
        "hispanic",
        "asian",
        "native",
        "race",
        "sex",
        "estimated",
        "approximately",
        "approx",
        "about",
        "inches",
        "pounds",
        "cm",
        "kg",
        "lbs",
        "body",
        "description",
        "subject",
        "case",
        "number",
        "discovery",
        "location",
        "sighting",
        "last",
        "seen",
        "contact",
        "date",
        "remains",
        "charred",
        "skeletonized",
        "burned",
        "discovered",
        "debris",
        "underneath",
        "after",
        "before",
        "around",
    ];
}

/// Constants used by the pair scorer.
pub mod scoring {
    /// Divisor applied to summed token specificity before clamping to 1.0.
    pub const TEXT_NORMALIZER: f64 = 35.0;
    /// Tokens with this many characters or fewer never contribute to text overlap.
    pub const MAX_IGNORED_TOKEN_CHARS: usize = 2;
    /// Weight of the text sub-score in the composite.
    pub const TEXT_WEIGHT: f64 = 0.4;
    /// Weight of the geographic sub-score in the composite.
    pub const GEO_WEIGHT: f64 = 0.3;
    /// Weight of the phenotype sub-score in the composite.
    pub const PHENOTYPE_WEIGHT: f64 = 0.3;
    /// Multiplier applied when both sides carry complete DNA or dental records.
    pub const BIO_MULTIPLIER: f64 = 1.5;
    /// Feature emitted when both sides have complete DNA records.
    pub const FEATURE_DNA_BOTH: &str = "DNA on file (both)";
    /// Feature emitted when both sides have complete dental records.
    pub const FEATURE_DENTAL_BOTH: &str = "dental on file (both)";
}

/// Constants used by geographic distance and decay scoring.
pub mod geo {
    /// Mean Earth radius in miles used by the haversine distance.
    pub const EARTH_RADIUS_MILES: f64 = 3958.8;
    /// Distance (miles) at which the geographic score decays to 1/e.
    pub const DECAY_MILES: f64 = 300.0;
    /// Score used when either side lacks coordinates.
    pub const NEUTRAL_SCORE: f64 = 0.5;
    /// Half-width in degrees of the candidate pre-filter bounding box.
    pub const BOUNDING_BOX_DEGREES: f64 = 8.0;
}

/// Constants used by hard candidate filters.
pub mod candidates {
    /// Years subtracted from the UHR minimum age when widening the age window.
    pub const AGE_TOLERANCE_BELOW: u32 = 10;
    /// Years added to the UHR maximum age when widening the age window.
    pub const AGE_TOLERANCE_ABOVE: u32 = 10;
}

/// Constants used by ranking and lead output.
pub mod leads {
    /// Default minimum composite score for a pair to be emitted as a lead.
    pub const DEFAULT_MIN_SCORE: f64 = 0.35;
    /// Default maximum number of ranked leads returned.
    pub const DEFAULT_LIMIT: usize = 200;
    /// Characters kept in description previews.
    pub const PREVIEW_CHARS: usize = 200;
    /// Marker appended to truncated previews.
    pub const PREVIEW_ELLIPSIS: &str = "...";
    /// Decimal places kept when serializing lead scores.
    pub const SCORE_DECIMALS: i32 = 3;
}

/// Constants used by on-disk record stores.
pub mod store {
    /// File holding the unidentified-remains collection.
    pub const UNIDENTIFIED_FILENAME: &str = "unidentified_cases.json";
    /// File holding the missing-person collection.
    pub const MISSING_FILENAME: &str = "missing_persons.json";
    /// Store id used by in-memory stores.
    pub const MEMORY_STORE_ID: &str = "memory";
    /// Prefix for ids of JSON directory stores.
    pub const JSON_STORE_PREFIX: &str = "json:";
}

/// Logging defaults for the command-line runner.
pub mod logging {
    /// Filter used when `RUST_LOG` is unset, empty, or unparseable.
    pub const DEFAULT_DIRECTIVES: &str = "warn";
}
