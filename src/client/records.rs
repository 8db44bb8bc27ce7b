//! Materialized query results.

use crate::protocol::{Error, Result};
use serde_json::{json, Value};
use std::ops::Deref;

/// Record sequence returned by an executed query.
///
/// Derefs to `[Value]`, so slice and iterator operations apply directly; the
/// dynamic surface goes through [`Records::invoke`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records(Vec<Value>);

impl Records {
    pub(crate) fn new(records: Vec<Value>) -> Self {
        Self(records)
    }

    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }

    /// Id field of every record that carries one.
    pub fn ids(&self) -> Vec<String> {
        self.0
            .iter()
            .filter_map(|record| record.get("Id").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }

    /// Dynamic-dispatch surface for names arriving via a builder fallback.
    /// Unrecognized names are an [`Error::UnknownOperation`], never silently
    /// swallowed.
    pub fn invoke(&self, name: &str, _args: &[Value]) -> Result<Value> {
        match name {
            "count" | "size" | "length" => Ok(json!(self.0.len())),
            "first" => Ok(self.0.first().cloned().unwrap_or(Value::Null)),
            "last" => Ok(self.0.last().cloned().unwrap_or(Value::Null)),
            "ids" => Ok(json!(self.ids())),
            other => Err(Error::UnknownOperation(other.to_string())),
        }
    }
}

impl Deref for Records {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl IntoIterator for Records {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Records {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Value>> for Records {
    fn from(records: Vec<Value>) -> Self {
        Self(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Records {
        Records::new(vec![
            json!({"Id": "001", "Name": "Acme"}),
            json!({"Id": "002", "Name": "Globex"}),
            json!({"Name": "NoId"}),
        ])
    }

    #[test]
    fn ids_skips_records_without_one() {
        assert_eq!(sample().ids(), vec!["001".to_string(), "002".to_string()]);
    }

    #[test]
    fn invoke_count_and_first() {
        let records = sample();
        assert_eq!(records.invoke("count", &[]).unwrap(), json!(3));
        assert_eq!(
            records.invoke("first", &[]).unwrap(),
            json!({"Id": "001", "Name": "Acme"})
        );
    }

    #[test]
    fn invoke_unknown_name_is_an_error() {
        let err = sample().invoke("pluck", &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(name) if name == "pluck"));
    }

    #[test]
    fn slice_operations_delegate_through_deref() {
        let records = sample();
        assert_eq!(records.len(), 3);
        assert!(records.iter().any(|r| r["Name"] == "Globex"));
    }
}
