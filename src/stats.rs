//! Corpus-wide document-frequency tables and token specificity.
//!
//! Statistics are built once per run from the full UHR and MP collections and
//! are never mutated afterwards. Workers borrow the same `CorpusStats` value;
//! no synchronization is involved because nothing can write to it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::constants::specificity::DEFAULT_STOP_WORDS;
use crate::data::{MissingRecord, UnidentifiedRecord};
use crate::types::Token;
use crate::utils::word_set;

/// Scoring-time stop-word set.
///
/// Applied when scoring, not when building statistics, so one `CorpusStats`
/// can serve several stop-word policies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct StopWords {
    words: HashSet<Token>,
}

impl StopWords {
    /// Stop words from `words`, trimmed and lowercased; blanks are dropped.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|word| word.as_ref().trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect(),
        }
    }

    /// Default list extended with `extra`.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stop_words = Self::default();
        stop_words.words.extend(
            extra
                .into_iter()
                .map(|word| word.as_ref().trim().to_lowercase())
                .filter(|word| !word.is_empty()),
        );
        stop_words
    }

    /// Whether `token` is a stop word.
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    /// Number of stop words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS.iter().copied())
    }
}

impl From<Vec<String>> for StopWords {
    fn from(words: Vec<String>) -> Self {
        Self::new(words)
    }
}

impl From<StopWords> for Vec<String> {
    fn from(stop_words: StopWords) -> Self {
        let mut words: Vec<String> = stop_words.words.into_iter().collect();
        words.sort();
        words
    }
}

/// Document-frequency table for one collection's description field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentFrequencies {
    counts: HashMap<Token, u32>,
    total_documents: u32,
}

impl DocumentFrequencies {
    /// Count, per token, how many documents contain it.
    ///
    /// Blank documents are skipped and do not count toward the total.
    pub fn build<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut frequencies = Self::default();
        for document in documents {
            let tokens = word_set(document.as_ref());
            if tokens.is_empty() {
                continue;
            }
            frequencies.total_documents += 1;
            for token in tokens {
                *frequencies.counts.entry(token).or_insert(0) += 1;
            }
        }
        frequencies
    }

    /// Documents with at least one token.
    pub fn total_documents(&self) -> u32 {
        self.total_documents
    }

    /// Documents containing `token`.
    pub fn document_frequency(&self, token: &str) -> u32 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Distinct tokens seen in the collection.
    pub fn vocabulary_size(&self) -> usize {
        self.counts.len()
    }

    /// `log10(total / df)`, or `unseen` for tokens the collection never saw.
    pub fn specificity(&self, token: &str, unseen: f64) -> f64 {
        idf(self.total_documents, self.document_frequency(token), unseen)
    }
}

/// Inverse document frequency with a fixed fallback for unseen tokens.
pub fn idf(total_documents: u32, document_frequency: u32, unseen: f64) -> f64 {
    if document_frequency == 0 || total_documents == 0 {
        return unseen;
    }
    (f64::from(total_documents) / f64::from(document_frequency)).log10()
}

/// Immutable per-run statistics over both collections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorpusStats {
    /// Frequencies over UHR descriptions.
    pub unidentified: DocumentFrequencies,
    /// Frequencies over MP descriptions.
    pub missing: DocumentFrequencies,
}

impl CorpusStats {
    /// Build both tables from the full collections; the two run concurrently.
    pub fn build(unidentified: &[UnidentifiedRecord], missing: &[MissingRecord]) -> Self {
        let (unidentified, missing) = rayon::join(
            || DocumentFrequencies::build(unidentified.iter().map(|r| r.description.as_str())),
            || DocumentFrequencies::build(missing.iter().map(|r| r.description.as_str())),
        );
        Self {
            unidentified,
            missing,
        }
    }

    /// Specificity of a token shared by a UHR and an MP description.
    ///
    /// Stop words score 0. Otherwise the per-collection figures are averaged,
    /// since a word can be rare in one corpus and common in the other.
    pub fn specificity(&self, token: &str, stop_words: &StopWords, unseen: f64) -> f64 {
        if stop_words.contains(token) {
            return 0.0;
        }
        let uhr = self.unidentified.specificity(token, unseen);
        let mp = self.missing.specificity(token, unseen);
        (uhr + mp) / 2.0
    }
}
