use crate::model::{parse_number, Question};
use crate::normalize::fold;
use crate::sort::SortKey;

/// Active selections. Empty strings mean "match all" for that dimension;
/// `search` is expected to be folded already.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search: String,
    pub category_key: String,
    pub difficulty: String,
    pub author: String,
    pub sort: SortKey,
}

/// Text searched by the `search` criterion, before folding.
pub fn haystack(q: &Question) -> String {
    format!(
        "{} {} {} {} {}",
        q.question,
        q.answer,
        q.tags.join(" "),
        q.author_or_empty(),
        q.category_label
    )
}

pub fn matches(q: &Question, f: &FilterState) -> bool {
    if !f.search.is_empty() && !fold(&haystack(q)).contains(&f.search) {
        return false;
    }
    if !f.category_key.is_empty() && q.category_key != f.category_key {
        return false;
    }
    if !f.difficulty.is_empty() {
        // NaN on either side never matches
        match (q.difficulty, parse_number(&f.difficulty)) {
            (Some(a), Some(b)) if a == b => {}
            _ => return false,
        }
    }
    if !f.author.is_empty() && q.author_or_empty() != f.author {
        return false;
    }
    true
}

pub fn filter<'a>(questions: &'a [Question], f: &FilterState) -> Vec<&'a Question> {
    questions.iter().filter(|q| matches(q, f)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: &str, question: &str, difficulty: Option<f64>, author: Option<&str>, cat: &str) -> Question {
        Question {
            id: id.into(),
            question: question.into(),
            answer: format!("answer {id}"),
            difficulty,
            difficulty_text: None,
            author: author.map(String::from),
            tags: vec![],
            category_key: cat.into(),
            category_label: cat.to_uppercase(),
        }
    }

    fn sample() -> Vec<Question> {
        vec![
            q("1", "Capital of France?", Some(1.0), Some("A"), "geo"),
            q("2", "Capital of Japan?", Some(2.0), Some("B"), "geo"),
            q("3", "Who wrote Hamlet?", Some(2.0), Some("A"), "lit"),
            q("4", "Best café in town?", None, None, "misc"),
        ]
    }

    fn ids(v: &[&Question]) -> Vec<String> {
        v.iter().map(|q| q.id.clone()).collect()
    }

    #[test]
    fn empty_state_matches_everything() {
        let all = sample();
        let f = FilterState::default();
        assert!(all.iter().all(|r| matches(r, &f)));
    }

    #[test]
    fn search_is_case_and_accent_insensitive() {
        let mut r = sample().remove(0);
        r.question = "Where is the CAFE?".into();
        let f = FilterState {
            search: fold("café"),
            ..Default::default()
        };
        assert!(matches(&r, &f));
        r.question = "Où est le Café ?".into();
        assert!(matches(&r, &f));
    }

    #[test]
    fn search_covers_answer_tags_author_and_label() {
        let mut r = sample().remove(0);
        r.tags = vec!["europe".into()];
        for needle in ["answer 1", "europe", "a", "geo"] {
            let f = FilterState {
                search: fold(needle),
                ..Default::default()
            };
            assert!(matches(&r, &f), "{needle}");
        }
        let f = FilterState {
            search: "tokyo".into(),
            ..Default::default()
        };
        assert!(!matches(&r, &f));
    }

    #[test]
    fn difficulty_compares_numerically() {
        let all = sample();
        let f = FilterState {
            difficulty: "2".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&all, &f)), vec!["2", "3"]);
        let f = FilterState {
            difficulty: " 2.0 ".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&all, &f)), vec!["2", "3"]);
        let f = FilterState {
            difficulty: "hard".into(),
            ..Default::default()
        };
        assert!(filter(&all, &f).is_empty());
    }

    #[test]
    fn category_and_author_are_exact() {
        let all = sample();
        let f = FilterState {
            category_key: "GEO".into(),
            ..Default::default()
        };
        assert!(filter(&all, &f).is_empty());
        let f = FilterState {
            author: "a".into(),
            ..Default::default()
        };
        assert!(filter(&all, &f).is_empty());
        let f = FilterState {
            author: "A".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&all, &f)), vec!["1", "3"]);
    }

    #[test]
    fn combined_filter_is_intersection_of_single_criteria() {
        let all = sample();
        let by_author = FilterState {
            author: "A".into(),
            ..Default::default()
        };
        let by_difficulty = FilterState {
            difficulty: "2".into(),
            ..Default::default()
        };
        let both = FilterState {
            author: "A".into(),
            difficulty: "2".into(),
            ..Default::default()
        };
        let a = ids(&filter(&all, &by_author));
        let d = ids(&filter(&all, &by_difficulty));
        let expected: Vec<String> = a.into_iter().filter(|id| d.contains(id)).collect();
        assert_eq!(ids(&filter(&all, &both)), expected);
        assert_eq!(expected, vec!["3"]);
    }
}
