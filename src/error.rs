use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest fetch failed: {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Manifest is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("manifest.json has no categories[]")]
    NoCategories,
}

#[derive(Debug, Error)]
pub enum CategoryFailure {
    #[error("{0}")]
    Fetch(std::io::Error),
    #[error("invalid JSON: {0}")]
    Parse(serde_json::Error),
    #[error("not a JSON array")]
    NotArray,
}

#[derive(Debug, Error)]
#[error("Failed to load {file}: {reason}")]
pub struct CategoryLoadError {
    pub file: String,
    pub reason: CategoryFailure,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Category(#[from] CategoryLoadError),
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("system clipboard unavailable: {0}")]
    System(#[from] arboard::Error),
    #[error("no clipboard command available")]
    NoCommand,
    #[error("clipboard command {command} failed: {reason}")]
    Command { command: String, reason: String },
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("manifest.json must have {{ categories: [...] }}")]
    BadManifest,
    #[error("Bad manifest entry: {0}")]
    BadEntry(String),
    #[error("{0} is not a JSON array")]
    NotArray(String),
    #[error("failed to encode output: {0}")]
    Encode(serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
