//! CSV to JSON
//!
//! The first line is the header row. Fields are split on bare commas: quoted
//! fields and escapes are not understood.

use serde_json::{Map, Value};

use crate::fragment::{FragmentError, Result};

pub(crate) fn to_json(text: &str) -> Result<Vec<u8>> {
    let mut lines = text.trim().split('\n');
    let headers: Vec<&str> = lines
        .next()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .collect();

    let rows: Vec<Value> = lines
        .map(|line| {
            let values: Vec<&str> = line.split(',').collect();
            let row: Map<String, Value> = headers
                .iter()
                .enumerate()
                .map(|(index, header)| {
                    let value = values.get(index).map(|v| v.trim()).unwrap_or_default();
                    (header.to_string(), Value::String(value.to_string()))
                })
                .collect();
            Value::Object(row)
        })
        .collect();

    serde_json::to_vec_pretty(&rows)
        .map_err(|err| FragmentError::malformed_payload(format!("cannot encode CSV rows: {err}")))
}
