use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LabelError, Result};

/// One uniform data record. Fields are looked up by name.
pub type Record = Map<String, Value>;

/// Names of the record fields a placer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub x: String,
    pub y: String,
    /// Series identifier; required by line-end placement, ignored by region placement.
    pub z: Option<String>,
    pub label: String,
}

impl FieldSpec {
    pub fn new(x: impl Into<String>, y: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            z: None,
            label: label.into(),
        }
    }

    pub fn with_group(mut self, z: impl Into<String>) -> Self {
        self.z = Some(z.into());
        self
    }

    /// Every field name that must be present on the first record.
    pub fn required(&self) -> Vec<&str> {
        let mut fields = vec![self.x.as_str(), self.y.as_str()];
        if let Some(z) = self.z.as_deref() {
            fields.push(z);
        }
        fields.push(self.label.as_str());
        fields
    }
}

/// An ordered sequence of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Parse either an array of row objects or a columnar object whose
    /// values are equally long arrays.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(rows) => {
                let mut records = Vec::with_capacity(rows.len());
                for (idx, row) in rows.into_iter().enumerate() {
                    match row {
                        Value::Object(record) => records.push(record),
                        other => {
                            return Err(LabelError::InvalidData(format!(
                                "row {idx} is not an object: {other}"
                            )));
                        }
                    }
                }
                Ok(Self { records })
            }
            Value::Object(columns) => Self::from_columns(columns),
            other => Err(LabelError::InvalidData(format!(
                "expected an array of rows or an object of columns, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn from_columns(columns: Map<String, Value>) -> Result<Self> {
        let mut len: Option<usize> = None;
        let mut arrays = Vec::with_capacity(columns.len());
        for (name, column) in columns {
            let Value::Array(values) = column else {
                return Err(LabelError::InvalidData(format!(
                    "column `{name}` is not an array"
                )));
            };
            match len {
                Some(expected) if expected != values.len() => {
                    return Err(LabelError::InvalidData(format!(
                        "column `{name}` has {} values, expected {expected}",
                        values.len()
                    )));
                }
                _ => len = Some(values.len()),
            }
            arrays.push((name, values));
        }

        let mut records = vec![Record::new(); len.unwrap_or(0)];
        for (name, values) in arrays {
            for (record, value) in records.iter_mut().zip(values) {
                record.insert(name.clone(), value);
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Fail fast when the first record lacks any of `fields`.
    ///
    /// Only the first record is inspected; an empty dataset passes.
    pub fn require_fields<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let Some(first) = self.records.first() else {
            return Ok(());
        };
        for field in fields {
            if !first.contains_key(field) {
                return Err(LabelError::MissingField {
                    field: field.to_string(),
                    record: Value::Object(first.clone()).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Sort ascending by `field` and drop the lowest `ceil(len * fraction)`
    /// records, keeping the top of the distribution.
    pub fn slice_quantile(&self, field: &str, fraction: f32) -> Result<Dataset> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(LabelError::InvalidOption {
                name: "fraction",
                reason: format!("{fraction} is outside [0, 1]"),
            });
        }
        self.require_fields([field])?;

        let mut keyed = Vec::with_capacity(self.records.len());
        for (idx, record) in self.records.iter().enumerate() {
            keyed.push((numeric_field(record, field, idx)?, record));
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let skip = (self.records.len() as f32 * fraction).ceil() as usize;
        let records = keyed
            .into_iter()
            .skip(skip)
            .map(|(_, record)| record.clone())
            .collect();
        Ok(Dataset { records })
    }

    /// Minimum and maximum of a numeric field, `None` when empty.
    pub fn extent(&self, field: &str) -> Result<Option<(f32, f32)>> {
        let mut extent: Option<(f32, f32)> = None;
        for (idx, record) in self.records.iter().enumerate() {
            let value = numeric_field(record, field, idx)?;
            extent = Some(match extent {
                Some((lo, hi)) => (lo.min(value), hi.max(value)),
                None => (value, value),
            });
        }
        Ok(extent)
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Read a numeric field. Numeric strings are accepted.
pub fn numeric_field(record: &Record, field: &str, index: usize) -> Result<f32> {
    record
        .get(field)
        .and_then(value_as_f32)
        .ok_or_else(|| LabelError::InvalidValue {
            field: field.to_string(),
            index,
        })
}

/// Read a field as label text. Missing and null values become empty text.
pub fn text_field(record: &Record, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Series key of a record. Strings are used unquoted so `"a"` and `a`
/// written by different producers land in the same group.
pub fn group_key(record: &Record, field: &str) -> String {
    text_field(record, field)
}

fn value_as_f32(value: &Value) -> Option<f32> {
    match value {
        Value::Number(number) => number.as_f64().map(|v| v as f32),
        Value::String(text) => text.trim().parse::<f32>().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset(value: Value) -> Dataset {
        Dataset::from_value(value).unwrap()
    }

    #[test]
    fn parses_row_arrays() {
        let data = dataset(json!([{"a": 1, "b": "x"}, {"a": 2, "b": "y"}]));
        assert_eq!(data.len(), 2);
        assert_eq!(text_field(&data.records()[1], "b"), "y");
    }

    #[test]
    fn parses_columnar_objects() {
        let data = dataset(json!({"a": [1, 2, 3], "b": ["x", "y", "z"]}));
        assert_eq!(data.len(), 3);
        assert_eq!(numeric_field(&data.records()[2], "a", 2).unwrap(), 3.0);
        assert_eq!(text_field(&data.records()[0], "b"), "x");
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Dataset::from_value(json!({"a": [1, 2], "b": [1]})).unwrap_err();
        assert!(matches!(err, LabelError::InvalidData(_)));
    }

    #[test]
    fn rejects_scalar_rows() {
        let err = Dataset::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn require_fields_checks_first_record_only() {
        let data = dataset(json!([{"x": 1, "y": 2}, {"x": 3}]));
        assert!(data.require_fields(["x", "y"]).is_ok());
        let err = data.require_fields(["x", "name"]).unwrap_err();
        match err {
            LabelError::MissingField { field, .. } => assert_eq!(field, "name"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_dataset_passes_validation() {
        assert!(Dataset::default().require_fields(["x"]).is_ok());
    }

    #[test]
    fn numeric_strings_are_numbers() {
        let data = dataset(json!([{"x": " 2.5 ", "y": true}]));
        assert_eq!(numeric_field(&data.records()[0], "x", 0).unwrap(), 2.5);
        assert!(matches!(
            numeric_field(&data.records()[0], "y", 0),
            Err(LabelError::InvalidValue { index: 0, .. })
        ));
    }

    #[test]
    fn text_field_formats_scalars() {
        let data = dataset(json!([{"n": 3, "b": false, "z": null}]));
        let record = &data.records()[0];
        assert_eq!(text_field(record, "n"), "3");
        assert_eq!(text_field(record, "b"), "false");
        assert_eq!(text_field(record, "z"), "");
        assert_eq!(text_field(record, "missing"), "");
    }

    #[test]
    fn slice_quantile_keeps_the_top() {
        let data = dataset(json!([
            {"v": 5}, {"v": 1}, {"v": 4}, {"v": 2}, {"v": 3}
        ]));
        let top = data.slice_quantile("v", 0.5).unwrap();
        let values: Vec<f32> = top
            .iter()
            .enumerate()
            .map(|(idx, r)| numeric_field(r, "v", idx).unwrap())
            .collect();
        // ceil(5 * 0.5) = 3 dropped
        assert_eq!(values, vec![4.0, 5.0]);
        assert_eq!(data.len(), 5);
    }

    #[test]
    fn slice_quantile_validates_field() {
        let data = dataset(json!([{"v": 1}]));
        assert!(matches!(
            data.slice_quantile("w", 0.1),
            Err(LabelError::MissingField { .. })
        ));
        assert!(matches!(
            data.slice_quantile("v", 1.5),
            Err(LabelError::InvalidOption { .. })
        ));
    }

    #[test]
    fn extent_spans_values() {
        let data = dataset(json!([{"v": 3}, {"v": -1}, {"v": 7}]));
        assert_eq!(data.extent("v").unwrap(), Some((-1.0, 7.0)));
        assert_eq!(Dataset::default().extent("v").unwrap(), None);
    }

    #[test]
    fn field_spec_lists_required_fields() {
        let spec = FieldSpec::new("x", "y", "name").with_group("team");
        assert_eq!(spec.required(), vec!["x", "y", "team", "name"]);
    }
}
