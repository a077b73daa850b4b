//! Opaque API records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// One item returned by the API, passed through unmodified.
///
/// The accessors cover the fields the dashboard reads; everything else is
/// reachable through [`Record::field`] or the raw value. A record
/// serializes back to exactly the JSON it was built from, whether it came
/// from the network or from a file snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns a top-level field, if this record is an object that has it.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The record id. Numeric ids are rendered as strings.
    pub fn id(&self) -> Option<String> {
        match self.field("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn latitude(&self) -> Option<f64> {
        self.field("latitude").and_then(Value::as_f64)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.field("longitude").and_then(Value::as_f64)
    }

    /// The `identifications` array, or an empty slice.
    pub fn identifications(&self) -> &[Value] {
        self.field("identifications")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Flattens a response body into records.
///
/// A bare array yields its elements, an object with an `items` array yields
/// those items, any other non-empty object is a single record, and falsy
/// bodies (`null`, `{}`, `[]`, `false`, `0`, `""`) yield nothing.
pub fn flatten_records(body: Value) -> Vec<Record> {
    match body {
        Value::Array(items) => items.into_iter().map(Record).collect(),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items.into_iter().map(Record).collect(),
            Some(other) => {
                map.insert("items".to_string(), other);
                vec![Record(Value::Object(map))]
            }
            None if map.is_empty() => Vec::new(),
            None => vec![Record(Value::Object(map))],
        },
        _ => Vec::new(),
    }
}

/// Sorts records by a top-level field.
///
/// Numbers compare numerically and strings lexically; numbers sort before
/// strings, then booleans, then any other JSON. Records missing the field
/// (or holding `null`) always sort last, in either direction. The sort is
/// stable.
pub fn sort_records_by(records: &mut [Record], key: &str, descending: bool) {
    records.sort_by(|a, b| {
        let (a, b) = (a.field(key), b.field(key));
        match (is_present(a), is_present(b)) {
            (false, false) => Ordering::Equal,
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (true, true) => {
                let ordering = compare_values(a.unwrap_or(&Value::Null), b.unwrap_or(&Value::Null));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            }
        }
    });
}

fn is_present(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Bool(_) => 2,
        _ => 3,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(records: &[Record]) -> Vec<Option<String>> {
        records.iter().map(Record::id).collect()
    }

    #[test]
    fn accessors() {
        let record = Record::new(json!({
            "id": 42,
            "latitude": -22.9,
            "longitude": -43.2,
            "identifications": [{"label": "flood"}]
        }));
        assert_eq!(record.id().as_deref(), Some("42"));
        assert_eq!(record.latitude(), Some(-22.9));
        assert_eq!(record.longitude(), Some(-43.2));
        assert_eq!(record.identifications().len(), 1);
    }

    #[test]
    fn missing_identifications_is_empty() {
        let record = Record::new(json!({"id": "abc"}));
        assert!(record.identifications().is_empty());
        assert_eq!(record.latitude(), None);
    }

    #[test]
    fn serializes_unchanged() {
        let raw = json!({"id": "abc", "nested": {"x": [1, 2]}});
        let record: Record = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn flatten_shapes() {
        assert_eq!(flatten_records(json!([{"id": 1}, {"id": 2}])).len(), 2);
        assert_eq!(flatten_records(json!({"total": 1, "items": [{"id": 1}]})).len(), 1);
        assert_eq!(
            flatten_records(json!({"id": "abc", "name": "cam"})),
            vec![Record::new(json!({"id": "abc", "name": "cam"}))]
        );
        assert!(flatten_records(json!(null)).is_empty());
        assert!(flatten_records(json!({})).is_empty());
        assert!(flatten_records(json!([])).is_empty());
    }

    #[test]
    fn object_with_non_array_items_is_one_record() {
        let raw = json!({"id": "x", "items": "not-a-list"});
        assert_eq!(flatten_records(raw.clone()), vec![Record::new(raw)]);
    }

    #[test]
    fn sort_numeric_ascending_missing_last() {
        let mut records = vec![
            Record::new(json!({"id": "a", "ts": 30})),
            Record::new(json!({"id": "b"})),
            Record::new(json!({"id": "c", "ts": 2})),
            Record::new(json!({"id": "d", "ts": null})),
            Record::new(json!({"id": "e", "ts": 10.5})),
        ];
        sort_records_by(&mut records, "ts", false);
        assert_eq!(
            ids(&records),
            vec![
                Some("c".into()),
                Some("e".into()),
                Some("a".into()),
                Some("b".into()),
                Some("d".into())
            ]
        );
    }

    #[test]
    fn sort_descending_keeps_missing_last() {
        let mut records = vec![
            Record::new(json!({"id": "a", "ts": "2024-01-01"})),
            Record::new(json!({"id": "b"})),
            Record::new(json!({"id": "c", "ts": "2024-03-01"})),
        ];
        sort_records_by(&mut records, "ts", true);
        assert_eq!(
            ids(&records),
            vec![Some("c".into()), Some("a".into()), Some("b".into())]
        );
    }
}
