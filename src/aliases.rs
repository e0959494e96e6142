//! The compiled-in canonical schema.
//!
//! Every output table uses the field order defined here. Each
//! [`FieldDefinition`] lists the literal header spellings accepted for the
//! field (highest priority first), optional case-insensitive regex fallbacks
//! tried only when no alias matched, and an optional default used when the
//! source file has no matching column at all.
//!
//! The schema is built once by [`CanonicalSchema::builtin()`] and passed by
//! reference to the standardizer, assembler, and aggregator.

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

pub const DATE_FIELD: &str = "Дата проводки";
pub const PLANT_NAME_FIELD: &str = "Наименование завода";
pub const QUANTITY_FIELD: &str = "Количество";
pub const REGION_COLUMN: &str = "Регион";
pub const PLANT_ID_COLUMN: &str = "ID завода";
pub const SUMMARY_TOTAL_COLUMN: &str = "Общий вес";

/// Columns appended by the standardizer after the schema fields.
pub const DERIVED_COLUMNS: [&str; 2] = [REGION_COLUMN, PLANT_ID_COLUMN];

#[derive(Debug, Clone, Serialize)]
pub struct FieldDefinition {
    pub canonical_name: String,
    pub aliases: Vec<String>,
    #[serde(serialize_with = "serialize_patterns")]
    pub regex_fallbacks: Vec<Regex>,
    pub default_value: Option<String>,
}

impl FieldDefinition {
    /// Builds a field whose alias list is guaranteed to contain the canonical
    /// name. When the caller omits it, it is appended with the lowest priority.
    pub fn new(canonical_name: &str, aliases: &[&str]) -> Self {
        let mut owned = aliases.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        if !owned.iter().any(|a| a == canonical_name) {
            owned.push(canonical_name.to_string());
        }
        Self {
            canonical_name: canonical_name.to_string(),
            aliases: owned,
            regex_fallbacks: Vec::new(),
            default_value: None,
        }
    }

    pub fn with_regex_fallbacks(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            let compiled = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .with_context(|| {
                    format!(
                        "Compiling fallback pattern '{pattern}' for field '{}'",
                        self.canonical_name
                    )
                })?;
            self.regex_fallbacks.push(compiled);
        }
        Ok(self)
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }
}

fn serialize_patterns<S>(patterns: &[Regex], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(patterns.iter().map(Regex::as_str))
}

#[derive(Debug, Clone, Serialize)]
pub struct CanonicalSchema {
    pub fields: Vec<FieldDefinition>,
}

impl CanonicalSchema {
    pub fn new(fields: Vec<FieldDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.canonical_name.as_str()) {
                bail!("Duplicate canonical field '{}'", field.canonical_name);
            }
        }
        Ok(Self { fields })
    }

    /// The fixed shipment-report schema.
    pub fn builtin() -> Result<Self> {
        Self::new(vec![
            FieldDefinition::new(DATE_FIELD, &[DATE_FIELD, "Дата", "Posting Date", "Date"])
                .with_regex_fallbacks(&["дата", "date"])?,
            FieldDefinition::new(
                PLANT_NAME_FIELD,
                &[PLANT_NAME_FIELD, "Завод", "Plant Name", "Plant"],
            )
            .with_regex_fallbacks(&["завод", "plant"])?,
            FieldDefinition::new("Подрядчик", &["Подрядчик", "Код подрядчика", "Contractor", "Vendor"]),
            FieldDefinition::new(
                "Наименование подрядчика",
                &["Наименование подрядчика", "Contractor Name", "Vendor Name"],
            )
            .with_regex_fallbacks(&[r"наименование\s+подрядчика"])?,
            FieldDefinition::new("Материал", &["Материал", "Код материала", "Material"]),
            FieldDefinition::new(
                "Наименование материала",
                &["Наименование материала", "Material Description", "Material Name"],
            )
            .with_regex_fallbacks(&[r"наименование\s+материала"])?,
            FieldDefinition::new(QUANTITY_FIELD, &[QUANTITY_FIELD, "Кол-во", "Quantity", "Qty"])
                .with_regex_fallbacks(&["количеств", "quantity"])?,
            FieldDefinition::new("Базисная ЕИ", &["Базисная ЕИ", "ЕИ", "Base Unit", "Unit"])
                .with_default("т"),
            FieldDefinition::new(
                "Транспортная накладная",
                &["Транспортная накладная", "ТН", "Waybill"],
            )
            .with_regex_fallbacks(&["накладн"])?,
        ])
    }

    /// Position of the named field, which is also its column in every
    /// standardized table.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.canonical_name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|f| f.canonical_name.as_str())
            .collect()
    }

    /// Schema fields followed by the derived columns.
    pub fn output_columns(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.canonical_name.clone())
            .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_appends_missing_canonical_name_as_last_alias() {
        let field = FieldDefinition::new("Qty", &["Quantity"]);
        assert_eq!(field.aliases, vec!["Quantity", "Qty"]);
    }

    #[test]
    fn new_keeps_alias_order_when_canonical_name_is_listed() {
        let field = FieldDefinition::new("Qty", &["Quantity", "Qty", "Amount"]);
        assert_eq!(field.aliases, vec!["Quantity", "Qty", "Amount"]);
    }

    #[test]
    fn schema_rejects_duplicate_canonical_names() {
        let err = CanonicalSchema::new(vec![
            FieldDefinition::new("A", &[]),
            FieldDefinition::new("A", &["B"]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate canonical field 'A'"));
    }

    #[test]
    fn builtin_schema_holds_special_fields() {
        let schema = CanonicalSchema::builtin().expect("builtin schema");
        assert_eq!(schema.fields.len(), 9);
        assert_eq!(schema.fields[0].canonical_name, DATE_FIELD);
        assert_eq!(schema.field_index(PLANT_NAME_FIELD), Some(1));
        assert_eq!(schema.field_index(QUANTITY_FIELD), Some(6));
        assert_eq!(schema.field_index("Регион"), None);
        for field in &schema.fields {
            assert!(field.aliases.contains(&field.canonical_name));
        }
    }

    #[test]
    fn builtin_unit_field_defaults_to_tonnes() {
        let schema = CanonicalSchema::builtin().expect("builtin schema");
        let unit = &schema.fields[schema.field_index("Базисная ЕИ").expect("unit field")];
        assert_eq!(unit.default_value.as_deref(), Some("т"));
    }

    #[test]
    fn output_columns_end_with_derived_columns() {
        let schema = CanonicalSchema::builtin().expect("builtin schema");
        let columns = schema.output_columns();
        assert_eq!(columns.len(), 11);
        assert_eq!(columns[9], REGION_COLUMN);
        assert_eq!(columns[10], PLANT_ID_COLUMN);
    }

    #[test]
    fn schema_serializes_patterns_as_text() {
        let schema = CanonicalSchema::builtin().expect("builtin schema");
        let json = serde_json::to_value(&schema).expect("serialize");
        assert_eq!(json["fields"][0]["regex_fallbacks"][0], "дата");
    }
}
