// ratatui + crossterm browser over a loaded question bank:
// - header: active filters and sort
// - left: filtered/sorted question cards, right: detail of the selected card
// - answers stay hidden until revealed; every filter or sort change collapses them

use std::cmp::min;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use log::info;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Runtime;
use tui_textarea::TextArea;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::clipboard::ClipboardPair;
use crate::config::{KeyAction, Theme};
use crate::controller::{ActionOutcome, CardAction, Controller, DIFFICULTY_OPTIONS};
use crate::loader::{load_bank, FsSource};
use crate::model::Question;
use crate::sort::SortKey;

pub struct App {
    controller: Controller,
    source: FsSource,
    list_state: ListState,
    theme: Theme,
    keymap: HashMap<char, KeyAction>,
    left_width: u16,
    search_active: bool,
    search_input: TextArea<'static>,
    status: String,
    status_is_error: bool,
    clipboard: ClipboardPair,
}

impl App {
    pub fn new(
        controller: Controller,
        source: FsSource,
        theme: Theme,
        keymap: HashMap<char, KeyAction>,
    ) -> Self {
        let status = loaded_status(&controller);
        let mut app = Self {
            controller,
            source,
            list_state: ListState::default(),
            theme,
            keymap,
            left_width: 45,
            search_active: false,
            search_input: TextArea::default(),
            status,
            status_is_error: false,
            clipboard: ClipboardPair::default(),
        };
        app.sync_selection();
        app
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    fn selected_question(&self) -> Option<&Question> {
        let idx = self.list_state.selected()?;
        self.controller.visible().get(idx).copied()
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_question().map(|q| q.id.clone())
    }

    /// Keeps the selection inside the freshly rendered list.
    fn sync_selection(&mut self) {
        let n = self.controller.visible_len();
        if n == 0 {
            self.list_state.select(None);
        } else {
            let sel = self.list_state.selected().unwrap_or(0).min(n - 1);
            self.list_state.select(Some(sel));
        }
    }

    fn search_text(&self) -> String {
        self.search_input.lines().join(" ")
    }

    fn apply_search(&mut self) {
        let text = self.search_text();
        self.controller.set_search(&text);
        self.sync_selection();
    }
}

fn loaded_status(c: &Controller) -> String {
    format!(
        "Loaded {} question(s) from {} categories.",
        c.bank().len(),
        c.bank().categories().len()
    )
}

/// Next value after `current` in `["", options...]`, wrapping around.
pub fn cycle_option(options: &[String], current: &str) -> String {
    let pos = options.iter().position(|o| o == current);
    match pos {
        None if current.is_empty() => options.first().cloned().unwrap_or_default(),
        None => String::new(),
        Some(i) => options.get(i + 1).cloned().unwrap_or_default(),
    }
}

pub fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rt: &Runtime,
) -> Result<()> {
    loop {
        app.controller.expire_feedback(Instant::now());
        terminal.draw(|f| ui(f, app))?;
        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(k) = event::read()? {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(app, k, rt)? {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent, rt: &Runtime) -> Result<bool> {
    if app.search_active {
        handle_search_key(app, key);
        return Ok(false);
    }
    let KeyEvent { code, .. } = key;
    match code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Down | KeyCode::Char('j') => {
            let n = app.controller.visible_len();
            if n > 0 {
                let next = app.list_state.selected().map_or(0, |sel| min(sel + 1, n - 1));
                app.list_state.select(Some(next));
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if let Some(sel) = app.list_state.selected() {
                app.list_state.select(Some(sel.saturating_sub(1)));
            }
        }
        KeyCode::Home => {
            if app.controller.visible_len() > 0 {
                app.list_state.select(Some(0));
            }
        }
        KeyCode::End => {
            let n = app.controller.visible_len();
            if n > 0 {
                app.list_state.select(Some(n - 1));
            }
        }
        KeyCode::Enter => apply_action(app, KeyAction::ToggleAnswer, rt),
        KeyCode::Esc => apply_action(app, KeyAction::Clear, rt),
        KeyCode::Char(ch) => {
            if let Some(action) = app.keymap.get(&ch).copied() {
                apply_action(app, action, rt);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.search_active = false,
        KeyCode::Esc => {
            app.search_active = false;
            app.search_input = TextArea::default();
            app.apply_search();
        }
        KeyCode::Backspace => {
            app.search_input.delete_char();
            app.apply_search();
        }
        KeyCode::Left => {
            app.search_input.move_cursor(tui_textarea::CursorMove::Back);
        }
        KeyCode::Right => {
            app.search_input.move_cursor(tui_textarea::CursorMove::Forward);
        }
        KeyCode::Char(ch) => {
            app.search_input.insert_char(ch);
            app.apply_search();
        }
        _ => {}
    }
}

fn apply_action(app: &mut App, action: KeyAction, rt: &Runtime) {
    match action {
        KeyAction::ToggleAnswer => {
            if let Some(id) = app.selected_id() {
                app.controller
                    .dispatch(&id, CardAction::ToggleAnswer, |_| true, Instant::now());
            }
        }
        KeyAction::Copy => {
            if let Some(id) = app.selected_id() {
                let clipboard = &mut app.clipboard;
                let outcome = app.controller.dispatch(
                    &id,
                    CardAction::Copy,
                    |text| clipboard.copy(text),
                    Instant::now(),
                );
                if outcome == ActionOutcome::CopyFailed {
                    info!("copy failed for card {id}");
                }
            }
        }
        KeyAction::Search => {
            app.search_active = true;
        }
        KeyAction::CycleCategory => {
            let keys: Vec<String> = app
                .controller
                .bank()
                .categories()
                .iter()
                .map(|c| c.key.clone())
                .collect();
            let next = cycle_option(&keys, &app.controller.controls().category);
            app.controller.set_category(&next);
        }
        KeyAction::CycleDifficulty => {
            let opts: Vec<String> = DIFFICULTY_OPTIONS.iter().map(|s| s.to_string()).collect();
            let next = cycle_option(&opts, &app.controller.controls().difficulty);
            app.controller.set_difficulty(&next);
        }
        KeyAction::CycleAuthor => {
            let next = cycle_option(app.controller.authors(), &app.controller.controls().author);
            app.controller.set_author(&next);
        }
        KeyAction::CycleSort => {
            let current = app.controller.state().sort;
            let i = SortKey::ALL.iter().position(|k| *k == current).unwrap_or(0);
            let next = SortKey::ALL[(i + 1) % SortKey::ALL.len()];
            app.controller.set_sort(next.as_str());
        }
        KeyAction::Clear => {
            app.search_input = TextArea::default();
            app.controller.clear();
            app.list_state.select(Some(0));
        }
        KeyAction::Reload => reload(app, rt),
        KeyAction::ResizeLeftShrink => resize_left(app, -5),
        KeyAction::ResizeLeftExpand => resize_left(app, 5),
    }
    app.sync_selection();
}

fn reload(app: &mut App, rt: &Runtime) {
    match rt.block_on(load_bank(&app.source)) {
        Ok(bank) => {
            app.controller.replace_bank(bank);
            app.status = loaded_status(&app.controller);
            app.status_is_error = false;
        }
        Err(e) => {
            // keep the previous session on screen
            app.status = format!("Error loading question bank. {e}");
            app.status_is_error = true;
        }
    }
}

fn resize_left(app: &mut App, delta: i16) {
    let w = app.left_width as i16 + delta;
    app.left_width = w.clamp(20, 80) as u16;
}

fn ui(f: &mut Frame, app: &mut App) {
    // header + status + body + footer
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    let h = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(app.left_width),
            Constraint::Percentage(100 - app.left_width),
        ])
        .split(v[2]);

    draw_header(f, v[0], app);
    draw_status(f, v[1], app);
    draw_list(f, h[0], app);
    draw_detail(f, h[1], app);
    draw_footer(f, v[3], app);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme;
    let bg = Block::default()
        .borders(Borders::NONE)
        .style(Style::default().bg(th.bar_bg));
    f.render_widget(bg, area);

    let controls = app.controller.controls();
    let category = app
        .controller
        .bank()
        .categories()
        .iter()
        .find(|c| c.key == controls.category)
        .map(|c| c.label.clone())
        .unwrap_or_else(|| "All categories".into());
    let or_all = |v: &str, all: &str| {
        if v.is_empty() {
            all.to_string()
        } else {
            v.to_string()
        }
    };
    let segs = vec![
        Span::styled(
            " QBank · Browse ",
            Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | category:", Style::default().fg(th.muted)),
        Span::styled(category, Style::default().fg(th.fg)),
        Span::styled(" | difficulty:", Style::default().fg(th.muted)),
        Span::styled(
            or_all(&controls.difficulty, "All difficulties"),
            Style::default().fg(th.fg),
        ),
        Span::styled(" | author:", Style::default().fg(th.muted)),
        Span::styled(
            or_all(&controls.author, "All authors"),
            Style::default().fg(th.fg),
        ),
        Span::styled(" | sort:", Style::default().fg(th.muted)),
        Span::styled(app.controller.state().sort.label(), Style::default().fg(th.fg)),
    ];
    let para = Paragraph::new(Line::from(segs)).style(Style::default().bg(th.bar_bg).fg(th.fg));
    f.render_widget(para, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &mut App) {
    let th = app.theme;
    if app.search_active {
        let h = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(9), Constraint::Min(10)])
            .split(area);
        f.render_widget(
            Paragraph::new(Span::styled(" Search: ", Style::default().fg(th.accent))),
            h[0],
        );
        app.search_input.set_cursor_line_style(Style::default());
        app.search_input
            .set_cursor_style(Style::default().bg(th.accent).fg(th.bar_bg));
        f.render_widget(&app.search_input, h[1]);
        return;
    }
    let search = app.search_text();
    let mut segs = vec![Span::styled(
        format!(" {}", app.status),
        Style::default().fg(if app.status_is_error { th.error } else { th.muted }),
    )];
    if !search.is_empty() {
        segs.push(Span::styled("  /", Style::default().fg(th.muted)));
        segs.push(Span::styled(search, Style::default().fg(th.fg)));
    }
    f.render_widget(Paragraph::new(Line::from(segs)), area);
}

/// Cuts `s` to at most `max` display columns, marking the cut with `…`.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if UnicodeWidthStr::width(s) <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

fn draw_list(f: &mut Frame, area: Rect, app: &mut App) {
    let th = app.theme;
    let inner_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .controller
        .cards()
        .into_iter()
        .map(|card| {
            let head = format!("[{}] d{} · {} · ", card.category, card.difficulty, card.author);
            let rest = inner_width.saturating_sub(UnicodeWidthStr::width(head.as_str()));
            let question = truncate_to_width(&card.question.replace('\n', " "), rest);
            let mut spans = vec![
                Span::styled(format!("[{}]", card.category), Style::default().fg(th.info)),
                Span::styled(format!(" d{} · ", card.difficulty), Style::default().fg(th.warn)),
                Span::styled(format!("{} · ", card.author), Style::default().fg(th.muted)),
                Span::styled(question, Style::default().fg(th.fg)),
            ];
            if card.answer_visible {
                spans.push(Span::styled(" ✓", Style::default().fg(th.good)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", app.controller.summary()),
                    Style::default().fg(th.accent),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(th.muted)),
        )
        .highlight_style(
            Style::default()
                .bg(th.selection_bg)
                .fg(th.fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme;
    let mut lines: Vec<Line> = vec![];
    if let Some(q) = app.selected_question() {
        let revealed = app.controller.is_revealed(&q.id);
        let card = crate::render::Card::new(q, revealed);
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", card.category), Style::default().fg(th.info)),
            Span::styled(
                format!(" Difficulty: {} ", card.difficulty),
                Style::default().fg(th.warn),
            ),
            Span::styled(format!(" Author: {} ", card.author), Style::default().fg(th.muted)),
        ]));
        lines.push(Line::from(" "));
        for l in card.question.lines() {
            lines.push(Line::from(Span::styled(
                l.to_string(),
                Style::default().fg(th.fg).add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(Line::from(" "));
        if card.answer_visible {
            lines.push(Line::from(Span::styled(
                "Answer",
                Style::default().add_modifier(Modifier::BOLD).fg(th.good),
            )));
            for l in card.answer.lines() {
                lines.push(Line::from(Span::raw(l.to_string())));
            }
            lines.push(Line::from(" "));
        }
        if !card.tags.is_empty() {
            let tags: Vec<Span> = card
                .tags
                .iter()
                .map(|t| Span::styled(format!("#{t} "), Style::default().fg(th.muted)))
                .collect();
            lines.push(Line::from(tags));
            lines.push(Line::from(" "));
        }
        let copy_label = app.controller.copy_label(&q.id, Instant::now());
        let copy_color = match copy_label {
            "Copied!" => th.good,
            "Copy failed" => th.error,
            _ => th.accent,
        };
        lines.push(Line::from(vec![
            Span::styled(format!("[y] {copy_label}"), Style::default().fg(copy_color)),
            Span::raw("   "),
            Span::styled(
                format!("[a] {}", card.reveal_label()),
                Style::default().fg(th.accent),
            ),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            "No questions match the current filters. [x] clears them.",
            Style::default().fg(th.muted),
        )));
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(Span::styled(" Question ", Style::default().fg(th.accent)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(th.muted)),
    );
    f.render_widget(para, area);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme;
    let bg = Block::default()
        .borders(Borders::NONE)
        .style(Style::default().bg(th.bar_bg));
    f.render_widget(bg, area);
    let tips = if app.search_active {
        " typing filters live  [Enter]keep  [Esc]clear search "
    } else {
        " [q]quit  [j/k]move  [/]search  [c]category  [d]difficulty  [u]author  [s]sort  [x]clear  [a]answer  [y]copy  [R]reload "
    };
    let help = Paragraph::new(Line::from(Span::styled(tips, Style::default().fg(th.muted))))
        .style(Style::default().bg(th.bar_bg));
    f.render_widget(help, area);
}
