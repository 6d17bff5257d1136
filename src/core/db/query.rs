/// Query Results Module
///
/// Materialized result cursors and value formatting. The underlying
/// driver cursor borrows the connection, so results are collected
/// eagerly into an owned structure the caller can hold on to after the
/// call returns.
use rusqlite::types::ValueRef;
use serde::Serialize;

/// Represents the result of a SQL query execution.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of data as string values
    pub rows: Vec<Vec<String>>,
    /// Number of rows returned
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
        }
    }

    /// Exports the rows as a JSON array of column-keyed objects.
    pub fn to_json(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let object = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|cell| serde_json::Value::String(cell.clone())))
                    .collect::<serde_json::Map<String, serde_json::Value>>();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

/// Formats a SQLite value for display.
pub(crate) fn format_value(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_result_counts_rows() {
        let result = QueryResult::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec!["1".to_string(), "Alice".to_string()],
                vec!["2".to_string(), "Bob".to_string()],
            ],
        );
        assert_eq!(result.row_count, 2);
    }

    #[test]
    fn test_to_json_keys_rows_by_column() {
        let result = QueryResult::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec!["1".to_string(), "Alice".to_string()],
                vec!["2".to_string(), "Bob".to_string()],
            ],
        );

        let json = result.to_json();
        let rows = json.as_array().expect("expected a JSON array");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "1");
        assert_eq!(rows[0]["name"], "Alice");
        assert_eq!(rows[1]["name"], "Bob");
    }

    #[test]
    fn test_format_value_variants() {
        assert_eq!(format_value(ValueRef::Null), "NULL");
        assert_eq!(format_value(ValueRef::Integer(42)), "42");
        assert_eq!(format_value(ValueRef::Real(1.5)), "1.5");
        assert_eq!(format_value(ValueRef::Text(b"hello")), "hello");
        assert_eq!(format_value(ValueRef::Blob(b"hello")), "<BLOB: 5 bytes>");
    }
}
