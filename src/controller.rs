use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::debug;

use crate::filter::{matches, FilterState};
use crate::loader::QuestionBank;
use crate::model::Question;
use crate::normalize::fold;
use crate::render::{summary_line, Card};
use crate::sort::{order_by, SortKey};

/// How long a copy outcome replaces the copy label.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(900);

pub const DIFFICULTY_OPTIONS: [&str; 3] = ["1", "2", "3"];

/// Raw control values as the user left them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub search: String,
    pub category: String,
    pub difficulty: String,
    pub author: String,
    pub sort: String,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: String::new(),
            difficulty: String::new(),
            author: String::new(),
            sort: SortKey::Category.as_str().to_string(),
        }
    }
}

impl Controls {
    /// Folds the search text; every other control passes through verbatim.
    pub fn to_filter_state(&self) -> FilterState {
        FilterState {
            search: fold(self.search.trim()),
            category_key: self.category.clone(),
            difficulty: self.difficulty.clone(),
            author: self.author.clone(),
            sort: SortKey::parse_lenient(&self.sort),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    ToggleAnswer,
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    AnswerShown,
    AnswerHidden,
    Copied,
    CopyFailed,
    UnknownCard,
}

#[derive(Debug, Clone)]
struct CopyFeedback {
    card: String,
    ok: bool,
    until: Instant,
}

/// Plain-text block written to the clipboard for one record.
pub fn copy_text(q: &Question) -> String {
    let category = if q.category_label.is_empty() {
        &q.category_key
    } else {
        &q.category_label
    };
    format!(
        "{}\nDifficulty: {} | Author: {}\n\nQ: {}\nA: {}\n",
        category,
        q.difficulty_display(),
        q.author_display(),
        q.question,
        q.answer
    )
}

/// Owns the session and the derived view; every control change re-runs
/// filter, sort and render projection.
#[derive(Debug)]
pub struct Controller {
    bank: QuestionBank,
    authors: Vec<String>,
    controls: Controls,
    state: FilterState,
    view: Vec<usize>,
    revealed: HashSet<String>,
    feedback: Option<CopyFeedback>,
}

impl Controller {
    pub fn new(bank: QuestionBank) -> Self {
        let authors = bank.authors();
        let mut c = Self {
            bank,
            authors,
            controls: Controls::default(),
            state: FilterState::default(),
            view: Vec::new(),
            revealed: HashSet::new(),
            feedback: None,
        };
        c.refresh();
        c
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Swaps in a freshly loaded session, keeping the current controls.
    pub fn replace_bank(&mut self, bank: QuestionBank) {
        self.authors = bank.authors();
        self.bank = bank;
        self.refresh();
    }

    pub fn update_controls(&mut self, f: impl FnOnce(&mut Controls)) {
        f(&mut self.controls);
        self.refresh();
    }

    pub fn set_search(&mut self, text: &str) {
        self.update_controls(|c| c.search = text.to_string());
    }

    pub fn set_category(&mut self, key: &str) {
        self.update_controls(|c| c.category = key.to_string());
    }

    pub fn set_difficulty(&mut self, value: &str) {
        self.update_controls(|c| c.difficulty = value.to_string());
    }

    pub fn set_author(&mut self, author: &str) {
        self.update_controls(|c| c.author = author.to_string());
    }

    pub fn set_sort(&mut self, sort: &str) {
        self.update_controls(|c| c.sort = sort.to_string());
    }

    pub fn clear(&mut self) {
        self.update_controls(|c| *c = Controls::default());
    }

    /// Re-derives the filter state and rebuilds the view. Collapses every
    /// answer and drops pending copy feedback.
    pub fn refresh(&mut self) {
        self.state = self.controls.to_filter_state();
        let questions = self.bank.questions();
        let mut view: Vec<usize> = questions
            .iter()
            .enumerate()
            .filter(|(_, q)| matches(q, &self.state))
            .map(|(i, _)| i)
            .collect();
        order_by(&mut view, self.state.sort, |i| &questions[*i]);
        debug!(
            "view rebuilt: {} of {} (sort={})",
            view.len(),
            questions.len(),
            self.state.sort
        );
        self.view = view;
        self.revealed.clear();
        self.feedback = None;
    }

    pub fn visible(&self) -> Vec<&Question> {
        let questions = self.bank.questions();
        self.view.iter().map(|&i| &questions[i]).collect()
    }

    pub fn visible_len(&self) -> usize {
        self.view.len()
    }

    pub fn summary(&self) -> String {
        summary_line(self.view.len(), self.bank.len())
    }

    pub fn cards(&self) -> Vec<Card<'_>> {
        self.visible()
            .into_iter()
            .map(|q| Card::new(q, self.is_revealed(&q.id)))
            .collect()
    }

    pub fn is_revealed(&self, card_id: &str) -> bool {
        self.revealed.contains(card_id)
    }

    /// Routes a card action. `copy` writes to the clipboard and reports success.
    pub fn dispatch<C>(&mut self, card_id: &str, action: CardAction, copy: C, now: Instant) -> ActionOutcome
    where
        C: FnOnce(&str) -> bool,
    {
        let Some(q) = self.bank.find(card_id) else {
            return ActionOutcome::UnknownCard;
        };
        match action {
            CardAction::ToggleAnswer => {
                if self.revealed.remove(card_id) {
                    ActionOutcome::AnswerHidden
                } else {
                    self.revealed.insert(card_id.to_string());
                    ActionOutcome::AnswerShown
                }
            }
            CardAction::Copy => {
                let ok = copy(&copy_text(q));
                self.feedback = Some(CopyFeedback {
                    card: card_id.to_string(),
                    ok,
                    until: now + COPY_FEEDBACK,
                });
                if ok {
                    ActionOutcome::Copied
                } else {
                    ActionOutcome::CopyFailed
                }
            }
        }
    }

    pub fn copy_label(&self, card_id: &str, now: Instant) -> &'static str {
        match &self.feedback {
            Some(fb) if fb.card == card_id && now < fb.until => {
                if fb.ok {
                    "Copied!"
                } else {
                    "Copy failed"
                }
            }
            _ => "Copy",
        }
    }

    /// Drops copy feedback whose delay has elapsed.
    pub fn expire_feedback(&mut self, now: Instant) {
        if self.feedback.as_ref().is_some_and(|fb| now >= fb.until) {
            self.feedback = None;
        }
    }
}
