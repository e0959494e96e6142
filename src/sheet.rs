use crate::data::Value;

/// A decoded worksheet: headers exactly as they appear in the source file and
/// rows padded to the header width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<Value>>>,
}

impl RawTable {
    /// Builds a table, padding short rows with nulls and truncating cells that
    /// sit beyond the last header. Rows with no non-null cell are dropped.
    pub fn new(headers: Vec<String>, rows: impl IntoIterator<Item = Vec<Option<Value>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .filter(|row| row.iter().any(Option::is_some))
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row)?.get(column)?.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pads_truncates_and_drops_blank_rows() {
        let table = RawTable::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![Some(Value::Integer(1))],
                vec![None, None],
                vec![Some(Value::Integer(2)), None, Some(Value::Integer(3))],
            ],
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0], vec![Some(Value::Integer(1)), None]);
        assert_eq!(table.rows[1].len(), 2);
        assert_eq!(table.cell(1, 0), Some(&Value::Integer(2)));
        assert_eq!(table.cell(5, 0), None);
    }
}
