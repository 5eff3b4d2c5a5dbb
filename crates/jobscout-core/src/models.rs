use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A field of a [`JobRecord`] that can be extracted from a document.
///
/// `source_url` is intentionally absent: it is always the input URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordField {
    Title,
    Location,
    Company,
}

impl RecordField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Title => "title",
            RecordField::Location => "location",
            RecordField::Company => "company",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(RecordField::Title),
            "location" => Ok(RecordField::Location),
            "company" => Ok(RecordField::Company),
            _ => Err(format!("Unknown record field: {}", s)),
        }
    }
}

/// The extraction result for one URL.
///
/// Serialized with `url` as the key for `source_url`, matching the
/// `/get_jobs` response format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub location: String,
    pub company: String,
    #[serde(rename = "url")]
    pub source_url: String,
}

impl JobRecord {
    /// An empty record for `source_url`; fields are filled by the extractor.
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Self::default()
        }
    }

    pub fn set(&mut self, field: RecordField, value: impl Into<String>) {
        let value = value.into();
        match field {
            RecordField::Title => self.title = value,
            RecordField::Location => self.location = value,
            RecordField::Company => self.company = value,
        }
    }

    pub fn get(&self, field: RecordField) -> &str {
        match field {
            RecordField::Title => &self.title,
            RecordField::Location => &self.location,
            RecordField::Company => &self.company,
        }
    }
}

/// A URL whose record was dropped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlFailure {
    pub url: String,
    pub error: String,
}

/// Everything one batch produced.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Records of successful URLs, in completion order.
    pub records: Vec<JobRecord>,
    /// URLs whose fetch or parse failed. Never represented in `records`.
    pub failures: Vec<UrlFailure>,
    /// Number of URLs submitted.
    pub submitted: usize,
}

impl BatchOutcome {
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}
