use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDescriptor {
    pub key: String,
    pub file: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    #[serde(default)]
    pub categories: Vec<CategoryDescriptor>,
}

/// A question record as stored in a category file, before the loader tags it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawQuestion {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub question: String,
    #[serde(default, deserialize_with = "de_text")]
    pub answer: String,
    /// Kept as written; coerced to a number when the record is tagged.
    #[serde(default)]
    pub difficulty: Option<Value>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "de_tags")]
    pub tags: Option<Vec<String>>,
}

/// A loaded question, owned by exactly one category.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub difficulty: Option<f64>,
    /// Raw difficulty text when the record did not store a JSON number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_text: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub category_key: String,
    pub category_label: String,
}

impl Question {
    pub fn from_raw(raw: RawQuestion, category: &CategoryDescriptor, position: usize) -> Self {
        let id = raw
            .id
            .unwrap_or_else(|| format!("{}-{}", category.key, position + 1));
        let difficulty = raw.difficulty.as_ref().and_then(coerce_number);
        let difficulty_text = match raw.difficulty {
            Some(Value::Number(_)) => None,
            other => other.and_then(value_text),
        };
        Self {
            id,
            question: raw.question,
            answer: raw.answer,
            difficulty,
            difficulty_text,
            author: raw.author,
            tags: raw.tags.unwrap_or_default(),
            category_key: category.key.clone(),
            category_label: category.label.clone(),
        }
    }

    /// Author compared verbatim by the filter; missing is the empty string.
    pub fn author_or_empty(&self) -> &str {
        self.author.as_deref().unwrap_or("")
    }

    pub fn author_display(&self) -> &str {
        match self.author.as_deref() {
            Some(a) if !a.is_empty() => a,
            _ => UNKNOWN_AUTHOR,
        }
    }

    pub fn category_display(&self) -> &str {
        if !self.category_label.is_empty() {
            &self.category_label
        } else if !self.category_key.is_empty() {
            &self.category_key
        } else {
            UNCATEGORIZED
        }
    }

    /// Numbers print in their shortest form; anything else as written.
    pub fn difficulty_display(&self) -> String {
        if let Some(text) = &self.difficulty_text {
            return text.clone();
        }
        self.difficulty.map(|d| d.to_string()).unwrap_or_default()
    }
}

/// Numeric coercion shared by record difficulties and filter values.
pub fn coerce_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Text of a loose JSON value; `null` has none.
fn value_text(v: Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn de_text<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.and_then(value_text).unwrap_or_default())
}

fn de_opt_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.and_then(value_text))
}

/// Tags must be a list; `null` entries are dropped, other scalars become text.
fn de_tags<'de, D>(d: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Array(items)) => Some(items.into_iter().filter_map(value_text).collect()),
        _ => None,
    })
}

fn de_opt_id<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
