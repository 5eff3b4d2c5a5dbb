use std::sync::Arc;

use jobscout_core::error::AppError;
use jobscout_core::models::{JobRecord, RecordField};
use jobscout_core::schema::ExtractionSchema;
use jobscout_core::traits::Extractor;
use scraper::{ElementRef, Html, Selector};

/// CSS selector extractor using scraper.
///
/// Compiles an [`ExtractionSchema`] once; each field takes the text of the
/// first element its selector matches, with whitespace collapsed. Fields
/// whose selector matches nothing stay empty. Bytes that are not UTF-8 are
/// replaced with U+FFFD rather than failing the document.
#[derive(Clone)]
pub struct SelectorExtractor {
    schema_name: String,
    selectors: Arc<Vec<(RecordField, Selector)>>,
}

impl SelectorExtractor {
    /// Compile `schema`. An invalid selector is a [`AppError::SchemaError`].
    pub fn new(schema: &ExtractionSchema) -> Result<Self, AppError> {
        let selectors = schema
            .fields
            .iter()
            .map(|entry| {
                Selector::parse(&entry.selector)
                    .map(|selector| (entry.field, selector))
                    .map_err(|e| {
                        AppError::SchemaError(format!(
                            "Invalid selector '{}' for field '{}': {e}",
                            entry.selector, entry.field
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            schema_name: schema.name.clone(),
            selectors: Arc::new(selectors),
        })
    }

    /// Extractor for Indeed job posting pages.
    pub fn indeed() -> Result<Self, AppError> {
        Self::new(&ExtractionSchema::indeed())
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }
}

impl Extractor for SelectorExtractor {
    fn extract(&self, document: &[u8], source_url: &str) -> Result<JobRecord, AppError> {
        let html = String::from_utf8_lossy(document);
        let document = Html::parse_document(&html);

        let mut record = JobRecord::new(source_url);
        for (field, selector) in self.selectors.iter() {
            if let Some(element) = document.select(selector).next() {
                record.set(*field, element_text(element));
            }
        }
        Ok(record)
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
