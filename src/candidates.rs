//! Hard structural filters that prune the UHR × MP pair space before scoring.
//!
//! Filters are expressed as a `CandidateCriteria` value built from one UHR
//! record, so the rules can be inspected and tested without any storage.
//! Unknown values on either side never exclude a pair.

use chrono::NaiveDate;

use crate::config::CandidateConfig;
use crate::data::{MissingRecord, Sex, UnidentifiedRecord};
use crate::geo::GeoBox;

/// Sex constraint derived from the UHR record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SexFilter {
    /// Sex does not constrain the candidates.
    Any,
    /// MP must be the same sex, or of unknown/uncertain sex.
    CompatibleWith(Sex),
}

impl SexFilter {
    /// Whether an MP record of `sex` passes.
    pub fn admits(&self, sex: Sex) -> bool {
        match self {
            SexFilter::Any => true,
            SexFilter::CompatibleWith(required) => !sex.is_determinate() || sex == *required,
        }
    }
}

/// Inclusive age window; `None` bounds are open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgeWindow {
    /// Youngest admissible age.
    pub min: Option<u32>,
    /// Oldest admissible age.
    pub max: Option<u32>,
}

impl AgeWindow {
    /// Whether `age` falls inside the window.
    pub fn admits(&self, age: u32) -> bool {
        self.min.is_none_or(|min| age >= min) && self.max.is_none_or(|max| age <= max)
    }
}

/// Declarative hard-filter criteria for MP records paired with one UHR case.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidateCriteria {
    /// Latest admissible last-seen date (`NaiveDate::MAX` when discovery is unknown).
    pub last_seen_on_or_before: NaiveDate,
    /// Sex constraint.
    pub sex: SexFilter,
    /// Coordinate box; `None` when the UHR location is unknown or the box is disabled.
    pub geo_box: Option<GeoBox>,
    /// Age window; `None` when the UHR age is unknown.
    pub age_window: Option<AgeWindow>,
}

impl CandidateCriteria {
    /// Criteria for one UHR record under `config`.
    pub fn for_unidentified(record: &UnidentifiedRecord, config: &CandidateConfig) -> Self {
        let sex = if record.sex.is_determinate() {
            SexFilter::CompatibleWith(record.sex)
        } else {
            SexFilter::Any
        };
        let geo_box = match (config.geo_box_degrees, record.location.as_ref()) {
            (Some(degrees), Some(point)) => Some(GeoBox::around(point, degrees)),
            _ => None,
        };
        let age_window = (!record.age.is_unknown()).then(|| AgeWindow {
            min: record
                .age
                .min
                .map(|min| min.saturating_sub(config.age_tolerance_below)),
            max: record
                .age
                .max
                .map(|max| max.saturating_add(config.age_tolerance_above)),
        });
        Self {
            last_seen_on_or_before: record.discovery_date.unwrap_or(NaiveDate::MAX),
            sex,
            geo_box,
            age_window,
        }
    }

    /// Apply timeline, sex, geography, then age, in that order.
    pub fn admits(&self, record: &MissingRecord) -> bool {
        self.admits_timeline(record)
            && self.sex.admits(record.sex)
            && self.admits_geography(record)
            && self.admits_age(record)
    }

    fn admits_timeline(&self, record: &MissingRecord) -> bool {
        record
            .last_seen_date
            .is_none_or(|last_seen| last_seen <= self.last_seen_on_or_before)
    }

    fn admits_geography(&self, record: &MissingRecord) -> bool {
        match (&self.geo_box, &record.location) {
            (Some(bbox), Some(point)) => bbox.contains(point),
            _ => true,
        }
    }

    fn admits_age(&self, record: &MissingRecord) -> bool {
        match (&self.age_window, record.age) {
            (Some(window), Some(age)) => window.admits(age),
            _ => true,
        }
    }
}

/// A pair that survived the hard filters. Lives only for one scoring pass.
#[derive(Clone, Copy, Debug)]
pub struct Candidate<'a> {
    /// The UHR side of the pair.
    pub unidentified: &'a UnidentifiedRecord,
    /// The MP side of the pair.
    pub missing: &'a MissingRecord,
}

/// Produces candidates for UHR records against an MP collection.
#[derive(Clone, Copy, Debug)]
pub struct CandidateGenerator<'a> {
    config: &'a CandidateConfig,
}

impl<'a> CandidateGenerator<'a> {
    /// Generator applying the hard filters in `config`.
    pub fn new(config: &'a CandidateConfig) -> Self {
        Self { config }
    }

    /// MP records that pass every hard filter for `unidentified`.
    ///
    /// Output order follows `missing`; it carries no meaning.
    pub fn generate<'r>(
        &self,
        unidentified: &'r UnidentifiedRecord,
        missing: &'r [MissingRecord],
    ) -> Vec<Candidate<'r>> {
        let criteria = CandidateCriteria::for_unidentified(unidentified, self.config);
        missing
            .iter()
            .filter(|record| criteria.admits(record))
            .map(|record| Candidate {
                unidentified,
                missing: record,
            })
            .collect()
    }

    /// True when the UHR description is long enough to be matched at all.
    pub fn is_eligible(&self, unidentified: &UnidentifiedRecord) -> bool {
        unidentified.description.trim().chars().count() >= self.config.min_uhr_description_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AgeRange, BiologicalEvidence};
    use crate::geo::GeoPoint;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn uhr() -> UnidentifiedRecord {
        UnidentifiedRecord {
            case_number: "UP1".into(),
            discovery_date: Some(date(2020, 1, 1)),
            sex: Sex::Female,
            age: AgeRange::new(Some(20), Some(30)),
            location: GeoPoint::new(40.0, -100.0),
            race: None,
            evidence: BiologicalEvidence::default(),
            description: "blue hoodie".into(),
        }
    }

    fn mp(file: &str) -> MissingRecord {
        MissingRecord {
            file_number: file.into(),
            name: format!("Person {file}"),
            last_seen_date: Some(date(2019, 6, 1)),
            sex: Sex::Female,
            age: Some(25),
            location: GeoPoint::new(41.0, -101.0),
            race: None,
            evidence: BiologicalEvidence::default(),
            description: "blue hoodie".into(),
        }
    }

    fn admitted(uhr: &UnidentifiedRecord, missing: &[MissingRecord]) -> Vec<String> {
        let config = CandidateConfig::default();
        CandidateGenerator::new(&config)
            .generate(uhr, missing)
            .into_iter()
            .map(|candidate| candidate.missing.file_number.clone())
            .collect()
    }

    #[test]
    fn timeline_excludes_last_seen_after_discovery() {
        let mut later = mp("later");
        later.last_seen_date = Some(date(2020, 1, 2));
        let mut same_day = mp("same_day");
        same_day.last_seen_date = Some(date(2020, 1, 1));
        let mut undated = mp("undated");
        undated.last_seen_date = None;
        assert_eq!(
            admitted(&uhr(), &[later, same_day, undated]),
            vec!["same_day", "undated"]
        );
    }

    #[test]
    fn unknown_discovery_date_imposes_no_timeline() {
        let mut record = uhr();
        record.discovery_date = None;
        let mut recent = mp("recent");
        recent.last_seen_date = Some(date(2099, 1, 1));
        assert_eq!(admitted(&record, &[recent]), vec!["recent"]);
    }

    #[test]
    fn sex_filter_keeps_unknown_on_either_side() {
        let mut male = mp("male");
        male.sex = Sex::Male;
        let mut unknown = mp("unknown");
        unknown.sex = Sex::Unknown;
        let mut uncertain = mp("uncertain");
        uncertain.sex = Sex::Uncertain;
        let female = mp("female");
        let missing = [male, unknown, uncertain, female];
        assert_eq!(
            admitted(&uhr(), &missing),
            vec!["unknown", "uncertain", "female"]
        );

        let mut uncertain_uhr = uhr();
        uncertain_uhr.sex = Sex::Uncertain;
        assert_eq!(admitted(&uncertain_uhr, &missing).len(), 4);
    }

    #[test]
    fn geo_box_excludes_far_records_but_keeps_unlocated_ones() {
        let mut far = mp("far");
        far.location = GeoPoint::new(10.0, -100.0);
        let mut unlocated = mp("unlocated");
        unlocated.location = None;
        let near = mp("near");
        assert_eq!(
            admitted(&uhr(), &[far.clone(), unlocated, near]),
            vec!["unlocated", "near"]
        );

        let mut unlocated_uhr = uhr();
        unlocated_uhr.location = None;
        assert_eq!(admitted(&unlocated_uhr, &[far]), vec!["far"]);
    }

    #[test]
    fn geo_box_admits_records_across_the_antimeridian() {
        let mut pacific = uhr();
        pacific.location = GeoPoint::new(-17.0, 178.0);
        let mut across = mp("across");
        across.location = GeoPoint::new(-16.0, -179.0);
        let mut distant = mp("distant");
        distant.location = GeoPoint::new(-16.0, -165.0);
        assert_eq!(admitted(&pacific, &[across, distant]), vec!["across"]);
    }

    #[test]
    fn geo_box_can_be_disabled() {
        let config = CandidateConfig {
            geo_box_degrees: None,
            ..CandidateConfig::default()
        };
        let mut far = mp("far");
        far.location = GeoPoint::new(-40.0, 100.0);
        let missing = [far];
        let record = uhr();
        let candidates = CandidateGenerator::new(&config).generate(&record, &missing);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn age_window_applies_tolerance_on_both_sides() {
        let mut ages = Vec::new();
        for age in [9, 10, 40, 41] {
            let mut record = mp(&format!("age{age}"));
            record.age = Some(age);
            ages.push(record);
        }
        let mut ageless = mp("ageless");
        ageless.age = None;
        ages.push(ageless);
        assert_eq!(
            admitted(&uhr(), &ages),
            vec!["age10", "age40", "ageless"]
        );
    }

    #[test]
    fn open_age_bounds_only_constrain_known_side() {
        let mut record = uhr();
        record.age = AgeRange::new(Some(50), None);
        let mut young = mp("young");
        young.age = Some(30);
        let mut old = mp("old");
        old.age = Some(95);
        assert_eq!(admitted(&record, &[young, old]), vec!["old"]);

        record.age = AgeRange::new(None, None);
        let mut child = mp("child");
        child.age = Some(3);
        assert_eq!(admitted(&record, &[child]), vec!["child"]);
    }

    #[test]
    fn criteria_capture_inputs_declaratively() {
        let criteria = CandidateCriteria::for_unidentified(&uhr(), &CandidateConfig::default());
        assert_eq!(criteria.last_seen_on_or_before, date(2020, 1, 1));
        assert_eq!(criteria.sex, SexFilter::CompatibleWith(Sex::Female));
        assert_eq!(
            criteria.age_window,
            Some(AgeWindow {
                min: Some(10),
                max: Some(40)
            })
        );
        let bbox = criteria.geo_box.unwrap();
        assert_eq!(bbox.min_lat, 32.0);
        assert_eq!(bbox.max_lon, -92.0);
    }

    #[test]
    fn eligibility_respects_min_description_length() {
        let config = CandidateConfig {
            min_uhr_description_chars: 20,
            ..CandidateConfig::default()
        };
        let generator = CandidateGenerator::new(&config);
        assert!(!generator.is_eligible(&uhr()));
        let mut verbose = uhr();
        verbose.description = "navy hoodie with a torn left sleeve".into();
        assert!(generator.is_eligible(&verbose));
        assert!(CandidateGenerator::new(&CandidateConfig::default()).is_eligible(&uhr()));
    }
}
