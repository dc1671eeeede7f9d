//! JSON to "YAML"
//!
//! Not a YAML emitter: the JSON is pretty-printed and then stripped of braces,
//! double quotes and commas. The result only reads as YAML for flat objects
//! with simple scalar values. Arrays, nested objects and strings containing
//! braces, quotes or commas do not survive.

use serde_json::Value;

use crate::fragment::{FragmentError, Result};

pub(crate) fn from_json(text: &str) -> Result<Vec<u8>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| FragmentError::malformed_payload(format!("invalid JSON: {err}")))?;
    let pretty = serde_json::to_string_pretty(&value)
        .map_err(|err| FragmentError::malformed_payload(format!("cannot format JSON: {err}")))?;

    let yaml = pretty.replace(['{', '}', '"', ','], "");
    Ok(yaml.trim().as_bytes().to_vec())
}
