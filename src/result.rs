//! The result envelope written by `SqlWrapper2` into a statement's `TextPlain` output.

use serde::Deserialize;
use serde_json::{Map, Value};

/// One row, cells ordered as the envelope's column description.
pub type Row = Vec<Value>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResultRecord {
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Decoded output of a successful statement.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResultEnvelope {
    #[serde(default)]
    pub rowcount: Option<u64>,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
    #[serde(default)]
    pub description: Vec<ColumnDescription>,
}

impl ResultEnvelope {
    pub fn columns(&self) -> Vec<String> {
        self.description.iter().map(|c| c.name.clone()).collect()
    }

    pub fn description(&self) -> Vec<(String, String)> {
        self.description
            .iter()
            .map(|c| (c.name.clone(), c.data_type.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Cells of row `index` in column order; missing cells are null.
    pub fn row(&self, index: usize) -> Option<Row> {
        let record = self.results.get(index)?;
        Some(
            self.description
                .iter()
                .map(|c| record.data.get(&c.name).cloned().unwrap_or(Value::Null))
                .collect(),
        )
    }

    pub fn rows(&self) -> Vec<Row> {
        (0..self.results.len()).filter_map(|i| self.row(i)).collect()
    }
}

/// Parse a statement's `TextPlain` payload.
pub fn decode_envelope(text: &str) -> Result<ResultEnvelope, serde_json::Error> {
    serde_json::from_str(text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAYLOAD: &str = r#"{
        "type": "results",
        "rowcount": 2,
        "results": [
            {"type": "record", "data": {"name": "a", "id": 1}},
            {"type": "record", "data": {"id": 2}}
        ],
        "description": [{"name": "id", "type": "bigint"}, {"name": "name", "type": "string"}]
    }"#;

    #[test]
    fn rows_follow_description_order() {
        let envelope = decode_envelope(PAYLOAD).unwrap();
        assert_eq!(envelope.rowcount, Some(2));
        assert_eq!(envelope.columns(), vec!["id", "name"]);
        assert_eq!(
            envelope.rows(),
            vec![vec![json!(1), json!("a")], vec![json!(2), Value::Null]]
        );
        assert_eq!(envelope.row(2), None);
    }

    #[test]
    fn description_pairs() {
        let envelope = decode_envelope(PAYLOAD).unwrap();
        assert_eq!(
            envelope.description(),
            vec![
                ("id".to_string(), "bigint".to_string()),
                ("name".to_string(), "string".to_string())
            ]
        );
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(decode_envelope("not json").is_err());
        assert!(decode_envelope(r#"{"results": 3}"#).is_err());
    }
}
