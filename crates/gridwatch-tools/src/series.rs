use gridwatch_store::{ResultRow, SqlValue};

use crate::error::ToolError;

/// Project a result set into the numeric vector the forecaster consumes.
///
/// Rows arrive already ordered ascending by time (the query carries the
/// ORDER BY); this only pulls out the value column. An empty result set is
/// the normal "unmonitored building / empty window" outcome and maps to
/// [`ToolError::NoData`].
pub fn extract_series(rows: &[ResultRow], value_column: &str) -> Result<Vec<f64>, ToolError> {
    if rows.is_empty() {
        return Err(ToolError::NoData);
    }

    rows.iter()
        .map(|row| {
            row.get(value_column)
                .and_then(SqlValue::as_f64)
                .ok_or_else(|| ToolError::BadColumn(value_column.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(value: SqlValue) -> ResultRow {
        ResultRow::new(vec![
            ("building".to_string(), SqlValue::Text("B1".to_string())),
            ("data_value".to_string(), value),
        ])
    }

    #[test]
    fn extracts_values_in_row_order() {
        let rows = vec![
            row(SqlValue::Real(1000.0)),
            row(SqlValue::Real(1250.0)),
            row(SqlValue::Integer(1500)),
        ];
        let series = extract_series(&rows, "data_value").unwrap();
        assert_eq!(series, vec![1000.0, 1250.0, 1500.0]);
    }

    #[test]
    fn empty_rows_is_no_data() {
        let result = extract_series(&[], "data_value");
        assert!(matches!(result, Err(ToolError::NoData)));
    }

    #[test]
    fn missing_column_is_bad_column() {
        let rows = vec![row(SqlValue::Real(1.0))];
        let result = extract_series(&rows, "kwh");
        assert!(matches!(result, Err(ToolError::BadColumn(col)) if col == "kwh"));
    }

    #[test]
    fn non_numeric_value_is_bad_column() {
        let rows = vec![row(SqlValue::Text("n/a".to_string()))];
        assert!(extract_series(&rows, "data_value").is_err());
    }
}
