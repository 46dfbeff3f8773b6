use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use icu_collator::{Collator, CollatorOptions, Strength};
use rand::seq::SliceRandom;

use crate::model::Question;
use crate::normalize::fold;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Category,
    Difficulty,
    Author,
    Question,
    Random,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Category,
        SortKey::Difficulty,
        SortKey::Author,
        SortKey::Question,
        SortKey::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Difficulty => "difficulty",
            Self::Author => "author",
            Self::Question => "question",
            Self::Random => "random",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Category => "Category (A→Z)",
            Self::Difficulty => "Difficulty (1→3)",
            Self::Author => "Author (A→Z)",
            Self::Question => "Question (A→Z)",
            Self::Random => "Random",
        }
    }

    /// Unknown names fall back to `category`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown sort key: {s}"))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

thread_local! {
    // root collation at primary strength: case and accents tie
    static COLLATOR: Option<Collator> = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Primary);
        Collator::try_new(&Default::default(), options).ok()
    };
}

/// Case- and accent-insensitive collation used by every text sort key.
/// Falls back to comparing folded text if the collator cannot be built.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(c) => c.compare(a, b),
        None => fold(a).cmp(&fold(b)),
    })
}

fn compare_difficulty(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Deterministic comparator for every key except `Random`, which compares equal.
pub fn compare(key: SortKey, a: &Question, b: &Question) -> Ordering {
    let by_question = || compare_text(&a.question, &b.question);
    match key {
        SortKey::Category => {
            compare_text(&a.category_label, &b.category_label).then_with(by_question)
        }
        SortKey::Difficulty => {
            compare_difficulty(a.difficulty, b.difficulty).then_with(by_question)
        }
        SortKey::Author => {
            compare_text(a.author_or_empty(), b.author_or_empty()).then_with(by_question)
        }
        SortKey::Question => by_question(),
        SortKey::Random => Ordering::Equal,
    }
}

/// Orders `items` in place; `question_of` projects each item to its record.
/// Ties keep their incoming order.
pub fn order_by<'q, T, F>(items: &mut [T], key: SortKey, question_of: F)
where
    F: Fn(&T) -> &'q Question,
{
    if key == SortKey::Random {
        items.shuffle(&mut rand::thread_rng());
    } else {
        items.sort_by(|a, b| compare(key, question_of(a), question_of(b)));
    }
}

/// Returns a freshly ordered copy of `items`.
pub fn sorted<'a>(items: &[&'a Question], key: SortKey) -> Vec<&'a Question> {
    let mut out = items.to_vec();
    order_by(&mut out, key, |q| *q);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: &str, question: &str, label: &str, difficulty: Option<f64>, author: &str) -> Question {
        Question {
            id: id.into(),
            question: question.into(),
            answer: String::new(),
            difficulty,
            difficulty_text: None,
            author: Some(author.into()),
            tags: vec![],
            category_key: label.to_lowercase(),
            category_label: label.into(),
        }
    }

    fn sample() -> Vec<Question> {
        vec![
            q("1", "zebra", "Science", Some(3.0), "bob"),
            q("2", "Apple", "history", Some(1.0), "Álvaro"),
            q("3", "banana", "Science", Some(1.0), "alice"),
            q("4", "éclair", "History", None, "Bob"),
        ]
    }

    fn ids<'a>(v: &[&'a Question]) -> Vec<&'a str> {
        v.iter().map(|q| q.id.as_str()).collect()
    }

    #[test]
    fn parse_and_default() {
        assert_eq!("author".parse::<SortKey>(), Ok(SortKey::Author));
        assert_eq!(SortKey::parse_lenient("nope"), SortKey::Category);
        assert_eq!(SortKey::parse_lenient(""), SortKey::Category);
        assert_eq!(SortKey::default(), SortKey::Category);
    }

    #[test]
    fn category_then_question() {
        let all = sample();
        let refs: Vec<&Question> = all.iter().collect();
        assert_eq!(ids(&sorted(&refs, SortKey::Category)), vec!["2", "4", "3", "1"]);
    }

    #[test]
    fn difficulty_numeric_with_missing_last() {
        let all = sample();
        let refs: Vec<&Question> = all.iter().collect();
        assert_eq!(ids(&sorted(&refs, SortKey::Difficulty)), vec!["2", "3", "1", "4"]);
    }

    #[test]
    fn author_ignores_case_and_accents() {
        let all = sample();
        let refs: Vec<&Question> = all.iter().collect();
        // "alice" < "Álvaro" < "bob"/"Bob" (tie broken by question)
        assert_eq!(ids(&sorted(&refs, SortKey::Author)), vec!["3", "2", "4", "1"]);
    }

    #[test]
    fn question_order_is_non_decreasing() {
        let all = sample();
        let refs: Vec<&Question> = all.iter().collect();
        let out = sorted(&refs, SortKey::Question);
        for pair in out.windows(2) {
            assert_ne!(compare_text(&pair[0].question, &pair[1].question), Ordering::Greater);
        }
        assert_eq!(ids(&out), vec!["2", "3", "4", "1"]);
    }

    #[test]
    fn input_is_left_untouched() {
        let all = sample();
        let refs: Vec<&Question> = all.iter().collect();
        let _ = sorted(&refs, SortKey::Question);
        assert_eq!(ids(&refs), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn collation_handles_letters_that_do_not_decompose() {
        let mut words = vec!["Zebra", "Ærlegur", "Bergen", "Ðóra", "100 ár?", "?Hvað"];
        words.sort_by(|a, b| compare_text(a, b));
        assert_eq!(words, vec!["?Hvað", "100 ár?", "Ærlegur", "Bergen", "Ðóra", "Zebra"]);
        assert_eq!(compare_text("ÞORN", "þorn"), Ordering::Equal);
        assert_eq!(compare_text("Árni", "arni"), Ordering::Equal);
    }

    #[test]
    fn order_by_projects_through_indices() {
        let all = sample();
        let mut idx: Vec<usize> = (0..all.len()).collect();
        order_by(&mut idx, SortKey::Question, |i| &all[*i]);
        assert_eq!(idx, vec![1, 2, 3, 0]);
    }

    #[test]
    fn random_is_a_permutation_and_varies() {
        let all: Vec<Question> = (0..8)
            .map(|i| q(&i.to_string(), &format!("q{i}"), "C", Some(1.0), "a"))
            .collect();
        let refs: Vec<&Question> = all.iter().collect();
        let before = ids(&refs);
        let mut saw_different = false;
        for _ in 0..50 {
            let out = sorted(&refs, SortKey::Random);
            let mut got = ids(&out);
            if got != before {
                saw_different = true;
            }
            got.sort();
            let mut want = before.clone();
            want.sort();
            assert_eq!(got, want);
        }
        assert!(saw_different);
    }
}
