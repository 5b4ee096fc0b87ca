//! Column resolution.
//!
//! Screener exports do not guarantee column order, and label formatting drifts
//! between export versions (`F0 Consensus Est.` vs `f0 consensus est`). The
//! resolver builds an explicit field-to-header mapping once, before any row is
//! read, and fails closed when a required field has no matching header.

use crate::error::{DataError, Result};
use crate::field::{Field, normalize_label};
use std::collections::HashMap;
use tracing::debug;

/// Mapping from canonical field to the header present in the export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: HashMap<Field, String>,
}

impl ColumnMap {
    /// Header resolved for a field, if any.
    pub fn header(&self, field: Field) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    /// Whether the field was resolved.
    pub fn contains(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    /// Whether every price change column is available.
    pub fn has_price_changes(&self) -> bool {
        Field::PRICE_CHANGES.iter().all(|f| self.contains(*f))
    }

    /// Number of resolved fields.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Resolves export headers against the canonical field table.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    fields: Vec<(String, Field)>,
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnResolver {
    /// Create a resolver for every known field.
    pub fn new() -> Self {
        Self {
            fields: Field::all().into_iter().map(|f| (f.key(), f)).collect(),
        }
    }

    /// Build the column map for a header row.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MissingColumns`] listing every required label with
    /// no matching header.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Result<ColumnMap> {
        let mut columns = HashMap::new();

        for header in headers {
            let header = header.as_ref();
            let key = normalize_label(header);
            let Some((_, field)) = self.fields.iter().find(|(k, _)| *k == key) else {
                debug!(header, "ignoring unrecognised column");
                continue;
            };

            if let Some(existing) = columns.get(field) {
                debug!(header, existing = %existing, %field, "duplicate column, keeping first");
                continue;
            }
            columns.insert(*field, header.to_string());
        }

        let missing: Vec<String> = Field::REQUIRED
            .iter()
            .filter(|f| !columns.contains_key(f))
            .map(|f| f.label().to_string())
            .collect();

        if !missing.is_empty() {
            return Err(DataError::MissingColumns { missing });
        }

        debug!(resolved = columns.len(), "column map built");
        Ok(ColumnMap { columns })
    }
}
