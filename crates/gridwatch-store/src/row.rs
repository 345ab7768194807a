use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A value read from one result-set cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Numeric view of the cell; integers widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Integer(n) => Some(*n as f64),
            SqlValue::Real(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(n) => SqlValue::Integer(n),
            ValueRef::Real(x) => SqlValue::Real(x),
            ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Null => serializer.serialize_none(),
            SqlValue::Integer(n) => serializer.serialize_i64(*n),
            SqlValue::Real(x) => serializer.serialize_f64(*x),
            SqlValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// A positional query parameter. Binding is always delegated to the driver;
/// caller values never reach the SQL text itself.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Real(f64),
    Integer(i64),
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::Text(s) => s.to_sql(),
            SqlParam::Real(x) => x.to_sql(),
            SqlParam::Integer(n) => n.to_sql(),
        }
    }
}

impl From<&str> for SqlParam {
    fn from(s: &str) -> Self {
        SqlParam::Text(s.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(s: String) -> Self {
        SqlParam::Text(s)
    }
}

/// A validated read query with positional parameters.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QuerySpec {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// The read-only invariant: trimmed query text must begin with SELECT,
    /// case-insensitively.
    pub fn is_select(&self) -> bool {
        let trimmed = self.sql.trim();
        trimmed
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("select"))
    }
}

/// One result row: an insertion-ordered mapping from column name to value.
/// Serializes as a JSON object in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    columns: Vec<(String, SqlValue)>,
}

impl ResultRow {
    pub fn new(columns: Vec<(String, SqlValue)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, SqlValue)> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_guard_accepts_select() {
        assert!(QuerySpec::new("SELECT 1").is_select());
        assert!(QuerySpec::new("  select building FROM meter_readings").is_select());
        assert!(QuerySpec::new("\n\tSeLeCt 1").is_select());
    }

    #[test]
    fn select_guard_rejects_writes() {
        assert!(!QuerySpec::new("DELETE FROM meter_readings").is_select());
        assert!(!QuerySpec::new("INSERT INTO meter_readings VALUES ('B1', 1.0, 'x')").is_select());
        assert!(!QuerySpec::new("UPDATE meter_readings SET data_value = 0").is_select());
        assert!(!QuerySpec::new("DROP TABLE meter_readings").is_select());
        assert!(!QuerySpec::new("").is_select());
        assert!(!QuerySpec::new("SEL").is_select());
    }

    #[test]
    fn row_lookup_and_order() {
        let row = ResultRow::new(vec![
            ("building".to_string(), SqlValue::Text("B1".to_string())),
            ("data_value".to_string(), SqlValue::Real(1500.0)),
        ]);
        assert_eq!(row.get("data_value").and_then(SqlValue::as_f64), Some(1500.0));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn row_serializes_in_column_order() {
        let row = ResultRow::new(vec![
            ("building".to_string(), SqlValue::Text("B1".to_string())),
            ("data_value".to_string(), SqlValue::Real(2.5)),
            ("note".to_string(), SqlValue::Null),
        ]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"building":"B1","data_value":2.5,"note":null}"#);
    }

    #[test]
    fn integer_widens_to_f64() {
        assert_eq!(SqlValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(SqlValue::Text("3".to_string()).as_f64(), None);
    }
}
