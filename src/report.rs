use log::info;

use crate::{
    aliases::{CanonicalSchema, DERIVED_COLUMNS},
    data::Value,
    standardize::CanonicalTable,
};

/// All standardized rows of a batch, or the explicit "nothing to report"
/// signal when no file produced a table.
#[derive(Debug, Clone, PartialEq)]
pub enum CombinedReport {
    Empty,
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Option<Value>>>,
    },
}

impl CombinedReport {
    pub fn is_empty(&self) -> bool {
        matches!(self, CombinedReport::Empty)
    }

    pub fn columns(&self) -> &[String] {
        match self {
            CombinedReport::Empty => &[],
            CombinedReport::Rows { columns, .. } => columns,
        }
    }

    pub fn rows(&self) -> &[Vec<Option<Value>>] {
        match self {
            CombinedReport::Empty => &[],
            CombinedReport::Rows { rows, .. } => rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows().len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns().iter().position(|c| c == name)
    }
}

/// Concatenates tables in input order, keeping canonical columns (schema
/// fields, then derived columns) that at least one table actually carries.
pub fn assemble(tables: Vec<CanonicalTable>, schema: &CanonicalSchema) -> CombinedReport {
    if tables.is_empty() {
        info!("No tables to combine");
        return CombinedReport::Empty;
    }

    let columns = schema
        .fields
        .iter()
        .map(|f| f.canonical_name.as_str())
        .chain(DERIVED_COLUMNS)
        .filter(|name| tables.iter().any(|t| t.column_index(name).is_some()))
        .map(str::to_string)
        .collect::<Vec<_>>();

    let total = tables.iter().map(CanonicalTable::row_count).sum();
    let mut rows = Vec::with_capacity(total);
    for table in tables {
        let positions = columns
            .iter()
            .map(|name| table.column_index(name))
            .collect::<Vec<_>>();
        for mut row in table.rows {
            rows.push(
                positions
                    .iter()
                    .map(|pos| pos.and_then(|idx| row.get_mut(idx).and_then(Option::take)))
                    .collect(),
            );
        }
    }

    CombinedReport::Rows { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{sheet::RawTable, standardize::standardize};

    fn table(file: &str, quantity: i64) -> CanonicalTable {
        let schema = CanonicalSchema::builtin().unwrap();
        let raw = RawTable::new(
            vec!["Количество".into()],
            vec![vec![Some(Value::Integer(quantity))]],
        );
        standardize(raw, file, &schema)
    }

    #[test]
    fn empty_input_is_explicit_empty_signal() {
        let schema = CanonicalSchema::builtin().unwrap();
        let report = assemble(Vec::new(), &schema);
        assert!(report.is_empty());
        assert_eq!(report.row_count(), 0);
        assert!(report.columns().is_empty());
    }

    #[test]
    fn rows_keep_input_order() {
        let schema = CanonicalSchema::builtin().unwrap();
        let report = assemble(vec![table("Б.xlsx", 1), table("А.xlsx", 2)], &schema);
        assert_eq!(report.columns(), schema.output_columns().as_slice());
        let region = report.column_index("Регион").unwrap();
        let regions = report
            .rows()
            .iter()
            .map(|row| row[region].clone())
            .collect::<Vec<_>>();
        assert_eq!(
            regions,
            vec![Some(Value::Text("Б".into())), Some(Value::Text("А".into()))]
        );
    }

    #[test]
    fn columns_missing_from_every_table_are_dropped() {
        let schema = CanonicalSchema::builtin().unwrap();
        let partial = CanonicalTable {
            columns: vec!["Регион".into(), "Количество".into(), "Лишняя".into()],
            rows: vec![vec![
                Some(Value::Text("X".into())),
                Some(Value::Integer(1)),
                Some(Value::Integer(9)),
            ]],
            resolutions: Vec::new(),
        };
        let report = assemble(vec![partial], &schema);
        assert_eq!(report.columns(), ["Количество", "Регион"]);
        assert_eq!(
            report.rows()[0],
            vec![Some(Value::Integer(1)), Some(Value::Text("X".into()))]
        );
    }

    #[test]
    fn tables_without_a_kept_column_contribute_nulls() {
        let schema = CanonicalSchema::builtin().unwrap();
        let narrow = CanonicalTable {
            columns: vec!["Регион".into()],
            rows: vec![vec![Some(Value::Text("Y".into()))]],
            resolutions: Vec::new(),
        };
        let report = assemble(vec![table("X.xlsx", 5), narrow], &schema);
        let quantity = report.column_index("Количество").unwrap();
        assert_eq!(report.row_count(), 2);
        assert_eq!(report.rows()[1][quantity], None);
    }
}
