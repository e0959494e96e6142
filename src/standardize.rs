//! Maps one decoded worksheet onto the canonical schema.
//!
//! Every schema field becomes a column, in schema order: cells are copied
//! verbatim from the resolved source column, or filled with the field's
//! default (or null) when nothing resolved. The region label derived from the
//! file name and the six-character plant ID are appended afterwards, and the
//! date column is cut down to its date part.

use log::debug;

use crate::{
    aliases::{CanonicalSchema, DATE_FIELD, PLANT_ID_COLUMN, PLANT_NAME_FIELD, REGION_COLUMN},
    data::Value,
    region, resolver,
    sheet::RawTable,
};

const PLANT_ID_LEN: usize = 6;

/// How a canonical field was populated for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Header(String),
    Default(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<Value>>>,
    /// One entry per schema field, in schema order.
    pub resolutions: Vec<(String, Resolution)>,
}

impl CanonicalTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn standardize(raw: RawTable, file_name: &str, schema: &CanonicalSchema) -> CanonicalTable {
    let row_count = raw.rows.len();
    let mut columns = Vec::with_capacity(schema.fields.len() + 2);
    let mut resolutions = Vec::with_capacity(schema.fields.len());
    let mut sources = Vec::with_capacity(schema.fields.len());

    for field in &schema.fields {
        let source = resolver::resolve_index(&raw.headers, field);
        let resolution = match (source, &field.default_value) {
            (Some(idx), _) => Resolution::Header(raw.headers[idx].clone()),
            (None, Some(default)) => Resolution::Default(default.clone()),
            (None, None) => Resolution::Missing,
        };
        match &resolution {
            Resolution::Header(header) if header.trim() != field.canonical_name => debug!(
                "{file_name}: '{}' read from column '{header}'",
                field.canonical_name
            ),
            Resolution::Header(_) => {}
            Resolution::Default(default) => debug!(
                "{file_name}: no column for '{}', using default '{default}'",
                field.canonical_name
            ),
            Resolution::Missing => {
                debug!("{file_name}: no column for '{}'", field.canonical_name)
            }
        }
        columns.push(field.canonical_name.clone());
        resolutions.push((field.canonical_name.clone(), resolution));
        sources.push(source);
    }

    let region = region::clean(file_name);
    let plant_name_idx = schema.field_index(PLANT_NAME_FIELD);
    let date_idx = schema.field_index(DATE_FIELD);
    columns.push(REGION_COLUMN.to_string());
    columns.push(PLANT_ID_COLUMN.to_string());

    let mut rows = Vec::with_capacity(row_count);
    for raw_row in raw.rows {
        let mut row = Vec::with_capacity(columns.len());
        for (field, source) in schema.fields.iter().zip(&sources) {
            let cell = match source {
                Some(idx) => raw_row.get(*idx).cloned().flatten(),
                None => field.default_value.clone().map(Value::Text),
            };
            row.push(cell);
        }
        let plant_id = plant_id(plant_name_idx.and_then(|idx| row[idx].as_ref()));
        if let Some(idx) = date_idx {
            row[idx] = row[idx].take().map(date_only);
        }
        row.push(Some(Value::Text(region.clone())));
        row.push(Some(Value::Text(plant_id)));
        rows.push(row);
    }

    CanonicalTable {
        columns,
        rows,
        resolutions,
    }
}

/// First six characters of the plant name; empty when the name is null.
pub fn plant_id(plant_name: Option<&Value>) -> String {
    plant_name
        .map(|value| value.as_display().chars().take(PLANT_ID_LEN).collect())
        .unwrap_or_default()
}

/// Keeps the part of the cell's text before the first space.
pub fn date_only(value: Value) -> Value {
    let text = value.as_display();
    match text.split_once(' ') {
        Some((date, _)) => Value::Text(date.to_string()),
        None => value,
    }
}
