use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::try_join_all;
use log::{debug, error, info, warn};
use serde_json::Value;

use crate::error::{CategoryFailure, CategoryLoadError, LoadError, ManifestError};
use crate::model::{CategoryDescriptor, Manifest, Question, RawQuestion};
use crate::sort::compare_text;

/// Where manifest and category documents come from.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_manifest(&self) -> std::io::Result<String>;
    async fn fetch_category(&self, file: &str) -> std::io::Result<String>;
    fn describe(&self, file: &str) -> String {
        file.to_string()
    }
    fn manifest_location(&self) -> String {
        "manifest.json".to_string()
    }
}

/// Reads the manifest from disk; category files resolve against its directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    manifest: PathBuf,
}

impl FsSource {
    pub fn new(manifest: impl Into<PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
        }
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let rel = file.strip_prefix("./").unwrap_or(file);
        match self.manifest.parent() {
            Some(dir) => dir.join(rel),
            None => PathBuf::from(rel),
        }
    }
}

#[async_trait]
impl DataSource for FsSource {
    async fn fetch_manifest(&self) -> std::io::Result<String> {
        tokio::fs::read_to_string(&self.manifest).await
    }

    async fn fetch_category(&self, file: &str) -> std::io::Result<String> {
        tokio::fs::read_to_string(self.resolve(file)).await
    }

    fn describe(&self, file: &str) -> String {
        self.resolve(file).display().to_string()
    }

    fn manifest_location(&self) -> String {
        self.manifest.display().to_string()
    }
}

/// The loaded session: categories in manifest order plus every record,
/// flattened in the same order. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    categories: Vec<CategoryDescriptor>,
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(categories: Vec<CategoryDescriptor>, questions: Vec<Question>) -> Self {
        Self {
            categories,
            questions,
        }
    }

    pub fn categories(&self) -> &[CategoryDescriptor] {
        &self.categories
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// First record carrying `id`.
    pub fn find(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Distinct non-empty authors, ordered like the author sort.
    pub fn authors(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for a in self.questions.iter().filter_map(|q| q.author.as_deref()) {
            if !a.is_empty() && !out.iter().any(|x| x == a) {
                out.push(a.to_string());
            }
        }
        out.sort_by(|a, b| compare_text(a, b).then_with(|| a.cmp(b)));
        out
    }
}

pub fn parse_manifest(text: &str) -> Result<Manifest, ManifestError> {
    let v: Value = serde_json::from_str(text)?;
    match v.get("categories") {
        Some(Value::Array(items)) if !items.is_empty() => {}
        _ => return Err(ManifestError::NoCategories),
    }
    Ok(serde_json::from_value(v)?)
}

/// Parses one category file and tags every record with its category.
pub fn parse_category(
    text: &str,
    category: &CategoryDescriptor,
) -> Result<Vec<Question>, CategoryFailure> {
    let v: Value = serde_json::from_str(text).map_err(CategoryFailure::Parse)?;
    let Value::Array(items) = v else {
        return Err(CategoryFailure::NotArray);
    };
    let questions = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            // only a non-object entry can fail here; it still gets a card
            let raw: RawQuestion = serde_json::from_value(item).unwrap_or_else(|e| {
                warn!("{}: record {index} is not an object: {e}", category.file);
                RawQuestion::default()
            });
            Question::from_raw(raw, category, index)
        })
        .collect();
    Ok(questions)
}

async fn load_category<S: DataSource + ?Sized>(
    source: &S,
    category: &CategoryDescriptor,
) -> Result<Vec<Question>, CategoryLoadError> {
    let fail = |reason| CategoryLoadError {
        file: category.file.clone(),
        reason,
    };
    debug!("fetching category {} from {}", category.key, source.describe(&category.file));
    let text = source
        .fetch_category(&category.file)
        .await
        .map_err(|e| fail(CategoryFailure::Fetch(e)))?;
    let questions = parse_category(&text, category).map_err(fail)?;
    debug!("category {}: {} question(s)", category.key, questions.len());
    Ok(questions)
}

/// Fetches the manifest, then every category file concurrently. Any failure
/// fails the whole load.
pub async fn load_bank<S: DataSource + ?Sized>(source: &S) -> Result<QuestionBank, LoadError> {
    let result = load_inner(source).await;
    if let Err(e) = &result {
        error!("Error loading question bank. {e}");
    }
    result
}

async fn load_inner<S: DataSource + ?Sized>(source: &S) -> Result<QuestionBank, LoadError> {
    info!("Loading manifest…");
    let text = source
        .fetch_manifest()
        .await
        .map_err(|e| ManifestError::Fetch {
            location: source.manifest_location(),
            source: e,
        })?;
    let manifest = parse_manifest(&text)?;
    let categories = manifest.categories;

    info!("Loading {} category file(s)…", categories.len());
    let per_category = try_join_all(categories.iter().map(|c| load_category(source, c))).await?;
    let questions: Vec<Question> = per_category.into_iter().flatten().collect();

    info!(
        "Loaded {} question(s) from {} categories.",
        questions.len(),
        categories.len()
    );
    Ok(QuestionBank::new(categories, questions))
}
