use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::RecordField;

/// One schema entry: which record field a selector fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    pub field: RecordField,
    /// CSS selector; the first matching element's text becomes the field value.
    pub selector: String,
}

/// Ordered field → selector mapping used to extract a [`JobRecord`](crate::JobRecord).
///
/// Loaded once at startup and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSchema {
    /// Human-readable schema name (e.g., "indeed")
    pub name: String,
    pub fields: Vec<FieldSelector>,
}

impl ExtractionSchema {
    /// Build and validate a schema.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSelector>) -> Result<Self, AppError> {
        let schema = Self {
            name: name.into(),
            fields,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Selectors for Indeed job posting pages.
    pub fn indeed() -> Self {
        Self {
            name: "indeed".to_string(),
            fields: vec![
                FieldSelector {
                    field: RecordField::Title,
                    selector: ".jobsearch-JobInfoHeader-title".to_string(),
                },
                // The location is the last div inside the company rating block.
                FieldSelector {
                    field: RecordField::Location,
                    selector: ".jobsearch-InlineCompanyRating > div:last-child".to_string(),
                },
                FieldSelector {
                    field: RecordField::Company,
                    selector: ".jobsearch-CompanyAvatar-companyLink".to_string(),
                },
            ],
        }
    }

    /// Load a schema from a JSON file.
    ///
    /// Format: `{"name": "...", "fields": [{"field": "title", "selector": "h1"}, ...]}`.
    /// A missing `name` is derived from the file stem.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::SchemaError(format!(
                "Failed to read schema file {}: {e}",
                path.display()
            ))
        })?;

        let file: SchemaFile = serde_json::from_str(&raw).map_err(|e| {
            AppError::SchemaError(format!(
                "Invalid schema file {}: {e}",
                path.display()
            ))
        })?;

        let name = file.name.unwrap_or_else(|| derive_schema_name(path));
        Self::new(name, file.fields)
    }

    /// Selector of `field`, if the schema maps it.
    pub fn selector_for(&self, field: RecordField) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.selector.as_str())
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.fields.is_empty() {
            return Err(AppError::SchemaError(format!(
                "Schema '{}' has no fields",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for entry in &self.fields {
            if entry.selector.trim().is_empty() {
                return Err(AppError::SchemaError(format!(
                    "Empty selector for field '{}'",
                    entry.field
                )));
            }
            if !seen.insert(entry.field) {
                return Err(AppError::SchemaError(format!(
                    "Field '{}' is mapped more than once",
                    entry.field
                )));
            }
        }
        Ok(())
    }
}

impl Default for ExtractionSchema {
    fn default() -> Self {
        Self::indeed()
    }
}

#[derive(Deserialize)]
struct SchemaFile {
    name: Option<String>,
    fields: Vec<FieldSelector>,
}

/// Derive a schema name from a file path.
///
/// Example: `"schemas/greenhouse.json"` → `"greenhouse"`
pub fn derive_schema_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("custom")
        .to_string()
}
