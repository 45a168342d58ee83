//! Agent metadata records (`model.yaml`).
//!
//! Two readers exist on purpose. The structural gate only needs to know
//! which top-level keys are present, so it uses a permissive line parser
//! that never fails. The digest stamper rewrites the record, so it goes
//! through a full YAML round-trip that keeps nested mappings and key order.

use anyhow::{anyhow, Context, Result};
use serde_yaml::{Mapping, Value};
use std::{collections::BTreeMap, fs, path::Path};

/// Maximum metadata record size (1 MB).
pub const MAX_METADATA_BYTES: u64 = 1024 * 1024;

/// Parses `key: value` lines. Blank lines and `#` comments are skipped;
/// everything after the first `:` is the value. Later keys win.
pub fn parse_key_values(text: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once(':') {
            out.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    out
}

/// Reads a record with [`parse_key_values`]. A missing or unreadable file
/// is an empty mapping, not an error.
pub fn read_key_values(path: &Path) -> BTreeMap<String, String> {
    if !path.exists() {
        return BTreeMap::new();
    }
    match crate::fs_guard::read_text_lossy(path, MAX_METADATA_BYTES) {
        Ok(text) => parse_key_values(&text),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "metadata unreadable, treating as empty");
            BTreeMap::new()
        }
    }
}

/// Loads a record as an ordered YAML mapping. Absent files and empty
/// documents load as an empty mapping.
pub fn load_record(path: &Path) -> Result<Mapping> {
    if !path.exists() {
        return Ok(Mapping::new());
    }
    let bytes = crate::fs_guard::read_validated(path, MAX_METADATA_BYTES)?;
    let doc: Value = serde_yaml::from_slice(&bytes)
        .with_context(|| format!("parse metadata record {}", path.display()))?;
    match doc {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(m) => Ok(m),
        _ => Err(anyhow!(
            "metadata record {} is not a key/value document",
            path.display()
        )),
    }
}

/// Writes a record back in insertion order.
pub fn save_record(path: &Path, record: &Mapping) -> Result<()> {
    let text = serde_yaml::to_string(record)
        .with_context(|| format!("serialize metadata record {}", path.display()))?;
    fs::write(path, text).with_context(|| format!("write {}", path.display()))
}

/// Sets `signatures.<key>`, creating the `signatures` mapping if needed.
pub fn set_signature(record: &mut Mapping, key: &str, value: &str) -> Result<()> {
    let sigs_key = Value::from("signatures");
    let entry = record
        .entry(sigs_key)
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if entry.is_null() {
        *entry = Value::Mapping(Mapping::new());
    }
    let Value::Mapping(sigs) = entry else {
        return Err(anyhow!("`signatures` is present but is not a mapping"));
    };
    sigs.insert(Value::from(key), Value::from(value));
    Ok(())
}

/// Reads `signatures.<key>` as a string, if present.
pub fn signature<'a>(record: &'a Mapping, key: &str) -> Option<&'a str> {
    record
        .get("signatures")
        .and_then(Value::as_mapping)
        .and_then(|m| m.get(key))
        .and_then(Value::as_str)
}
