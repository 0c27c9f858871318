//! Flat test-data files.
//!
//! Scenarios read credentials and fixtures from small JSON, YAML or CSV files.
//! Every reader returns plain strings; typing is up to the step using them.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

/// Source of key/value test data
pub trait TestData {
    /// Load every entry of the file at `path`
    fn load(&self, path: &Path) -> ProbeResult<HashMap<String, String>>;
}

/// Flat JSON object; non-string scalars are rendered as JSON text
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTestData;

impl TestData for JsonTestData {
    fn load(&self, path: &Path) -> ProbeResult<HashMap<String, String>> {
        let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        let Value::Object(map) = value else {
            return Err(ProbeError::data(format!(
                "{} does not contain a JSON object",
                path.display()
            )));
        };
        Ok(map
            .into_iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, text)
            })
            .collect())
    }
}

/// Flat YAML mapping of strings
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlTestData;

impl TestData for YamlTestData {
    fn load(&self, path: &Path) -> ProbeResult<HashMap<String, String>> {
        Ok(serde_yaml_ng::from_str(&fs::read_to_string(path)?)?)
    }
}

/// Read one string value from a JSON object file
pub fn read_json_key(path: &Path, key: &str) -> ProbeResult<String> {
    debug!(path = %path.display(), key, "reading test data");
    let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let found = value
        .get(key)
        .ok_or_else(|| ProbeError::data(format!("key '{key}' not found in {}", path.display())))?;
    found
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ProbeError::data(format!("key '{key}' in {} is not a string", path.display())))
}

/// Login credentials as stored in the test-data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// User name
    pub name: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Read `name` and `password` from a JSON file
    pub fn from_json_file(path: &Path) -> ProbeResult<Self> {
        let credentials: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        info!(user = %credentials.name, "loaded credentials");
        Ok(credentials)
    }
}

// =============================================================================
// CSV
// =============================================================================

/// One CSV row keyed by header
pub type CsvRow = HashMap<String, String>;

fn read_csv_with_headers(path: &Path) -> ProbeResult<(Vec<String>, Vec<CsvRow>)> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect(),
        );
    }
    Ok((headers, rows))
}

fn write_csv_with_headers(path: &Path, headers: &[String], rows: &[CsvRow]) -> ProbeResult<()> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(
            headers
                .iter()
                .map(|h| row.get(h).map_or("", String::as_str)),
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn new_headers<'a>(rows: &'a [CsvRow], known: &[String]) -> Vec<String> {
    let extra: BTreeSet<&'a String> = rows
        .iter()
        .flat_map(HashMap::keys)
        .filter(|k| !known.contains(k))
        .collect();
    extra.into_iter().cloned().collect()
}

/// Read every row of a CSV file with a header line
pub fn read_csv(path: &Path) -> ProbeResult<Vec<CsvRow>> {
    let (_, rows) = read_csv_with_headers(path)?;
    debug!(path = %path.display(), rows = rows.len(), "read csv");
    Ok(rows)
}

/// Write `rows` to `path`, replacing it. Columns are sorted by name; missing
/// cells are written empty. Nothing is written when `rows` is empty.
pub fn write_csv(path: &Path, rows: &[CsvRow]) -> ProbeResult<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let headers = new_headers(rows, &[]);
    write_csv_with_headers(path, &headers, rows)
}

/// Append `rows` to an existing CSV file, keeping its column order and adding
/// any new columns at the end
pub fn append_csv(path: &Path, rows: &[CsvRow]) -> ProbeResult<()> {
    if !path.exists() {
        return Err(ProbeError::data(format!("{} does not exist", path.display())));
    }
    let (mut headers, mut existing) = read_csv_with_headers(path)?;
    let added = new_headers(rows, &headers);
    headers.extend(added);
    existing.extend(rows.iter().cloned());
    write_csv_with_headers(path, &headers, &existing)
}
