//! One-shot consolidation of per-category files into a single array with
//! sequential global ids.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::MigrationError;

pub const DEFAULT_AUTHOR: &str = "Halli";
pub const DEFAULT_DIFFICULTY: i64 = 2;

// ASCII digits only, so ids ending in other scripts' digits count as unnumbered
static TRAILING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)\s*$").expect("Invalid regex"));

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigratedQuestion {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<Value>,
    pub category: String,
    pub question: Value,
    pub answer: Value,
    pub difficulty: Value,
    pub author: Value,
    pub tags: Value,
}

#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub root: PathBuf,
    pub output: Option<PathBuf>,
    pub default_author: String,
}

impl MigrationOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: None,
            default_author: DEFAULT_AUTHOR.to_string(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("manifest.json")
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.root.join("data").join("questions.json"))
    }
}

/// Numeric tail of a legacy id (`"misc-023"` → 23). Ids without one sort last.
pub fn legacy_number(id: Option<&Value>) -> Option<u64> {
    let text = match id? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let digits = TRAILING_NUMBER.captures(&text)?.get(1)?.as_str();
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

/// Width of the zero-padded global id.
pub fn id_width(total: usize) -> usize {
    total.to_string().len().max(4)
}

fn read_json(path: &Path) -> Result<Value, MigrationError> {
    let raw = fs::read_to_string(path).map_err(|source| MigrationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| MigrationError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn non_empty_str<'a>(entry: &'a Value, field: &str) -> Option<&'a str> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn or_default(v: Option<&Value>, default: Value) -> Value {
    match v {
        Some(Value::Null) | None => default,
        Some(v) => v.clone(),
    }
}

/// Builds the consolidated list in manifest order, each category ordered by
/// the numeric tail of its legacy ids.
pub fn consolidate(root: &Path, manifest: &Value, default_author: &str) -> Result<Vec<MigratedQuestion>, MigrationError> {
    let categories = manifest
        .get("categories")
        .and_then(Value::as_array)
        .ok_or(MigrationError::BadManifest)?;

    let mut combined: Vec<MigratedQuestion> = Vec::new();
    for entry in categories {
        let (Some(key), Some(file)) = (non_empty_str(entry, "key"), non_empty_str(entry, "file"))
        else {
            return Err(MigrationError::BadEntry(entry.to_string()));
        };
        let Value::Array(mut items) = read_json(&root.join(file))? else {
            return Err(MigrationError::NotArray(file.to_string()));
        };
        // stable: ids without a number keep their relative order at the end
        items.sort_by_key(|q| legacy_number(q.get("id")).map_or((1, 0), |n| (0, n)));
        debug!("{key}: {} question(s) from {file}", items.len());

        for q in &items {
            let tags = match q.get("tags") {
                Some(Value::Array(t)) => Value::Array(t.clone()),
                _ => Value::Array(Vec::new()),
            };
            combined.push(MigratedQuestion {
                id: String::new(),
                legacy_id: q.get("id").filter(|v| !v.is_null()).cloned(),
                category: key.to_string(),
                question: or_default(q.get("question"), Value::from("")),
                answer: or_default(q.get("answer"), Value::from("")),
                difficulty: or_default(q.get("difficulty"), Value::from(DEFAULT_DIFFICULTY)),
                author: or_default(q.get("author"), Value::from(default_author)),
                tags,
            });
        }
    }

    let width = id_width(combined.len());
    for (idx, q) in combined.iter_mut().enumerate() {
        q.id = format!("{:0width$}", idx + 1, width = width);
    }
    Ok(combined)
}

/// Reads `<root>/manifest.json`, writes the consolidated array and returns
/// the number of records written.
pub fn run(opts: &MigrationOptions) -> Result<usize, MigrationError> {
    let manifest = read_json(&opts.manifest_path())?;
    let combined = consolidate(&opts.root, &manifest, &opts.default_author)?;

    let out = opts.output_path();
    let write_err = |source| MigrationError::Write {
        path: out.clone(),
        source,
    };
    if let Some(dir) = out.parent() {
        fs::create_dir_all(dir).map_err(write_err)?;
    }
    let mut text = serde_json::to_string_pretty(&combined).map_err(MigrationError::Encode)?;
    text.push('\n');
    fs::write(&out, text).map_err(write_err)?;
    info!("Wrote {} questions to {}", combined.len(), out.display());
    Ok(combined.len())
}
