use crate::model::Question;

/// Escapes `& < > " '` for embedding free text into markup.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn summary_line(filtered: usize, total: usize) -> String {
    format!("Showing {filtered} of {total} question(s).")
}

/// Display projection of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Card<'a> {
    pub id: &'a str,
    pub category: &'a str,
    pub difficulty: String,
    pub author: &'a str,
    pub question: &'a str,
    pub answer: &'a str,
    pub tags: &'a [String],
    pub answer_visible: bool,
}

impl<'a> Card<'a> {
    pub fn new(q: &'a Question, answer_visible: bool) -> Self {
        Self {
            id: &q.id,
            category: q.category_display(),
            difficulty: q.difficulty_display(),
            author: q.author_display(),
            question: &q.question,
            answer: &q.answer,
            tags: &q.tags,
            answer_visible,
        }
    }

    pub fn reveal_label(&self) -> &'static str {
        if self.answer_visible {
            "Hide answer"
        } else {
            "Reveal answer"
        }
    }

    pub fn to_html(&self, copy_label: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "<article class=\"qcard\" data-qid=\"{}\">\n",
            escape_html(self.id)
        ));
        out.push_str("  <div class=\"qhead\">\n    <div class=\"qmeta\">\n");
        out.push_str(&format!(
            "      <span class=\"pill\">{}</span>\n",
            escape_html(self.category)
        ));
        out.push_str(&format!(
            "      <span class=\"pill\">Difficulty: {}</span>\n",
            escape_html(&self.difficulty)
        ));
        out.push_str(&format!(
            "      <span class=\"pill\">Author: {}</span>\n",
            escape_html(self.author)
        ));
        out.push_str("    </div>\n    <div class=\"qactions\">\n");
        out.push_str(&format!(
            "      <button class=\"btn copy-btn\" type=\"button\">{}</button>\n",
            escape_html(copy_label)
        ));
        out.push_str(&format!(
            "      <button class=\"btn reveal-btn\" type=\"button\">{}</button>\n",
            self.reveal_label()
        ));
        out.push_str("    </div>\n  </div>\n");
        out.push_str(&format!(
            "  <h3 class=\"qtext\">{}</h3>\n",
            escape_html(self.question)
        ));
        out.push_str(&format!(
            "  <div class=\"answer\"{}>\n    <div class=\"answer-label\">Answer</div>\n    <div class=\"answer-text\">{}</div>\n  </div>\n",
            if self.answer_visible { "" } else { " hidden" },
            escape_html(self.answer)
        ));
        if !self.tags.is_empty() {
            let tags: String = self
                .tags
                .iter()
                .map(|t| format!("<span class=\"tag\">{}</span>", escape_html(t)))
                .collect();
            out.push_str(&format!("  <div class=\"tags\">{tags}</div>\n"));
        }
        out.push_str("</article>\n");
        out
    }
}

/// Summary line plus every card.
pub fn render_page(cards: &[Card<'_>], total: usize) -> String {
    let mut out = format!(
        "<div class=\"summary\" id=\"summary\">{}</div>\n<div class=\"list\" id=\"list\">\n",
        escape_html(&summary_line(cards.len(), total))
    );
    for card in cards {
        out.push_str(&card.to_html("Copy"));
    }
    out.push_str("</div>\n");
    out
}

/// Reads back the `data-qid` of a rendered card.
pub fn card_id(html: &str) -> Option<String> {
    let start = html.find("data-qid=\"")? + "data-qid=\"".len();
    let end = html[start..].find('"')? + start;
    Some(unescape_html(&html[start..end]))
}

fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryDescriptor, RawQuestion};

    fn question(id: &str) -> Question {
        let cat = CategoryDescriptor {
            key: "geo".into(),
            file: "geo.json".into(),
            label: "Geography".into(),
        };
        let raw = RawQuestion {
            id: Some(id.into()),
            question: "Is 1 < 2 & \"yes\"?".into(),
            answer: "<b>'yes'</b>".into(),
            difficulty: Some(serde_json::Value::from(1)),
            author: None,
            tags: None,
        };
        Question::from_raw(raw, &cat, 0)
    }

    #[test]
    fn escapes_every_special_character() {
        assert_eq!(escape_html(r#"<a href="x">&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#039;&lt;/a&gt;");
    }

    #[test]
    fn card_markup_is_escaped_and_hides_answer() {
        let q = question("g1");
        let html = Card::new(&q, false).to_html("Copy");
        assert!(html.contains("Is 1 &lt; 2 &amp; &quot;yes&quot;?"));
        assert!(html.contains("&lt;b&gt;&#039;yes&#039;&lt;/b&gt;"));
        assert!(html.contains("<div class=\"answer\" hidden>"));
        assert!(html.contains("Author: Unknown"));
        assert!(html.contains("Difficulty: 1"));
        assert!(html.contains("Reveal answer"));
        assert!(!html.contains("class=\"tags\""));
    }

    #[test]
    fn tags_rendered_when_present() {
        let mut q = question("g1");
        q.tags = vec!["europe".into(), "<capital>".into()];
        let html = Card::new(&q, true).to_html("Copy");
        assert!(html.contains("<span class=\"tag\">europe</span><span class=\"tag\">&lt;capital&gt;</span>"));
        assert!(html.contains("<div class=\"answer\">"));
        assert!(html.contains("Hide answer"));
    }

    #[test]
    fn card_id_round_trips_through_markup() {
        let qs = vec![question("g1"), question("a&\"b'<c>")];
        for q in &qs {
            let html = Card::new(q, false).to_html("Copy");
            let id = card_id(&html).unwrap();
            let found = qs.iter().find(|x| x.id == id).unwrap();
            assert_eq!(found, q);
        }
    }

    #[test]
    fn page_has_summary() {
        let q = question("g1");
        let cards = vec![Card::new(&q, false)];
        let page = render_page(&cards, 3);
        assert!(page.contains("Showing 1 of 3 question(s)."));
        assert_eq!(page.matches("<article").count(), 1);
    }
}
