use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of a result row.
///
/// The server sends JSON strings, numbers, booleans and nulls; the variant records which
/// one so chart and export code can match on it instead of probing at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl CellValue {
    pub fn is_text(&self) -> bool {
        matches!(self, CellValue::Text(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "null"),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value.into())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Null)
    }
}

/// Column name to value, in the column order the server returned.
pub type Row = IndexMap<String, CellValue>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryMeta {
    pub took_seconds: f64,
    pub count_rows: u64,
    pub maxed_rows: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub meta: QueryMeta,
    #[serde(default)]
    pub error: Option<String>,
}

impl QueryResult {
    /// Result reported for a query the server rejected. Carries no rows and zero timing.
    pub fn failed(message: impl Into<String>) -> Self {
        QueryResult {
            rows: Vec::new(),
            meta: QueryMeta::default(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Column names of the first row, in order.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_keeps_column_order_and_kinds() {
        let body = r#"{
            "rows": [{"url": "/about", "count": 3, "ratio": 0.5, "draft": false, "tag": null}],
            "meta": {"took_seconds": 0.012, "count_rows": 1, "maxed_rows": false},
            "error": null
        }"#;

        let result: QueryResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.columns(), vec!["url", "count", "ratio", "draft", "tag"]);

        let row = &result.rows[0];
        assert_eq!(row["url"], CellValue::Text("/about".to_string()));
        assert!(row["count"].is_number());
        assert_eq!(row["ratio"].as_f64(), Some(0.5));
        assert_eq!(row["draft"], CellValue::Bool(false));
        assert_eq!(row["tag"], CellValue::Null);
        assert!(!result.is_error());
    }

    #[test]
    fn test_missing_error_field_defaults_to_none() {
        let body = r#"{"rows": [], "meta": {"took_seconds": 0.0, "count_rows": 0, "maxed_rows": true}}"#;
        let result: QueryResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.error, None);
        assert!(result.meta.maxed_rows);
    }

    #[test]
    fn test_failed_result_shape() {
        let result = QueryResult::failed("syntax error");
        assert!(result.rows.is_empty());
        assert_eq!(result.meta.took_seconds, 0.0);
        assert_eq!(result.meta.count_rows, 0);
        assert!(!result.meta.maxed_rows);
        assert_eq!(result.error.as_deref(), Some("syntax error"));
    }

    #[test]
    fn test_null_cell_serializes_as_json_null() {
        let mut row = Row::new();
        row.insert("a".to_string(), CellValue::Null);
        row.insert("b".to_string(), CellValue::from(7i64));
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"a":null,"b":7}"#);
    }
}
