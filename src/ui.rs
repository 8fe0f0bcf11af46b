use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{io, sync::Arc, time::Duration};
use tracing::info;
use tui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::api::{ApiClient, ReviewBackend};
use crate::config::Config;
use crate::feed::ReviewFeed;
use crate::pagination::{page_window, render_window};
use crate::query::ReplyStatus;
use crate::reply::ReplyDraft;
use crate::review::{Review, ReviewStatus};
use crate::store::{FilterAction, LoadState, ReviewStore};
use crate::text::{star_bar, truncate_text};

const TICK_RATE: Duration = Duration::from_millis(100);
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, PartialEq)]
enum AppState {
    Browsing,
    EditingSearch,
    WritingReply,
    ConfirmingReply,
}

enum UIAction {
    Quit,
}

pub struct ReviewUI {
    feed: ReviewFeed<ApiClient>,
    state: AppState,
    input: String,
    reply_public: bool,
    selected_review: Option<usize>,
    list_state: ListState,
    message: Option<String>,
}

impl ReviewUI {
    pub async fn new(config: &Config) -> Result<Self> {
        let api = Arc::new(ApiClient::new(config)?);
        let store = ReviewStore::new(config.account_id.clone(), config.per_page);
        let mut feed = ReviewFeed::new(api, store);

        // First page is loaded before the terminal switches to raw mode.
        // A failure here is shown in the filter bar rather than aborting.
        feed.dispatch(FilterAction::Refresh);
        feed.settle().await;

        let mut ui = Self {
            feed,
            state: AppState::Browsing,
            input: String::new(),
            reply_public: true,
            selected_review: None,
            list_state: ListState::default(),
            message: None,
        };
        let first = if ui.reviews().is_empty() { None } else { Some(0) };
        ui.select(first);
        Ok(ui)
    }

    fn reviews(&self) -> &[Review] {
        self.feed
            .store()
            .page()
            .map(|p| p.reviews.as_slice())
            .unwrap_or(&[])
    }

    fn selected(&self) -> Option<&Review> {
        self.selected_review.and_then(|i| self.reviews().get(i))
    }

    fn select(&mut self, index: Option<usize>) {
        self.selected_review = index;
        self.list_state.select(index);
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_app(&mut terminal).await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            if self.feed.poll() {
                let first = if self.reviews().is_empty() { None } else { Some(0) };
                self.select(first);
            }

            terminal.draw(|f| self.ui(f))?;

            if crossterm::event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    // Any key dismisses the message popup
                    self.message = None;
                    if let Some(UIAction::Quit) = self.handle_input(key).await? {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, key: KeyEvent) -> Result<Option<UIAction>> {
        match self.state {
            AppState::Browsing => return Ok(self.handle_browsing(key)),
            AppState::EditingSearch => match key.code {
                KeyCode::Esc => {
                    self.input.clear();
                    self.state = AppState::Browsing;
                }
                KeyCode::Enter => {
                    let term = std::mem::take(&mut self.input);
                    self.feed.dispatch(FilterAction::Search(term));
                    self.state = AppState::Browsing;
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
            AppState::WritingReply => match key.code {
                KeyCode::Esc => {
                    self.input.clear();
                    self.state = AppState::Browsing;
                }
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    if !self.input.trim().is_empty() {
                        self.state = AppState::ConfirmingReply;
                    }
                }
                KeyCode::Tab => self.reply_public = !self.reply_public,
                KeyCode::Enter => self.input.push('\n'),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
            AppState::ConfirmingReply => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.submit_reply().await,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.state = AppState::WritingReply;
                }
                _ => {}
            },
        }
        Ok(None)
    }

    fn handle_browsing(&mut self, key: KeyEvent) -> Option<UIAction> {
        let filters = self.feed.store().filters().clone();
        let action = match key.code {
            KeyCode::Char('q') => return Some(UIAction::Quit),
            KeyCode::Up => {
                if let Some(selected) = self.selected_review.filter(|s| *s > 0) {
                    self.select(Some(selected - 1));
                }
                None
            }
            KeyCode::Down => {
                if let Some(selected) = self.selected_review {
                    if selected + 1 < self.reviews().len() {
                        self.select(Some(selected + 1));
                    }
                }
                None
            }
            KeyCode::Enter => {
                let can_reply = self
                    .selected()
                    .is_some_and(|r| r.status != ReviewStatus::Hidden);
                if can_reply {
                    self.input.clear();
                    self.reply_public = true;
                    self.state = AppState::WritingReply;
                }
                None
            }
            KeyCode::Char('/') => {
                self.input = filters.search_term.clone();
                self.state = AppState::EditingSearch;
                None
            }
            KeyCode::Char(c @ '1'..='5') => {
                let star = c as u8 - b'0';
                // Pressing the active star again clears it.
                let rating = (filters.star_rating != Some(star)).then_some(star);
                Some(FilterAction::StarRating(rating))
            }
            KeyCode::Char('0') => Some(FilterAction::StarRating(None)),
            KeyCode::Char('f') => Some(FilterAction::ReplyStatus(ReplyStatus::cycle(
                filters.reply_status,
            ))),
            KeyCode::Char('s') => Some(FilterAction::Sort(filters.sort.next())),
            KeyCode::Char('m') => Some(FilterAction::HasComment(match filters.has_comment {
                None => Some(true),
                Some(_) => None,
            })),
            KeyCode::Char('+') => Some(FilterAction::PerPage(larger_page_size(filters.per_page))),
            KeyCode::Char('-') => Some(FilterAction::PerPage(filters.per_page / 2)),
            KeyCode::Char('c') => Some(FilterAction::ClearFilters),
            KeyCode::Char('r') => Some(FilterAction::Refresh),
            KeyCode::Char('x') => {
                self.feed.cancel();
                None
            }
            KeyCode::Right | KeyCode::Char('n') => Some(FilterAction::NextPage),
            KeyCode::Left | KeyCode::Char('p') => Some(FilterAction::PrevPage),
            KeyCode::Home => Some(FilterAction::GoToPage(1)),
            KeyCode::End => self
                .feed
                .store()
                .page()
                .map(|p| FilterAction::GoToPage(p.pagination.total_pages)),
            _ => None,
        };

        if let Some(action) = action {
            self.feed.dispatch(action);
        }
        None
    }

    async fn submit_reply(&mut self) {
        let Some(review_id) = self.selected().map(|r| r.id.clone()) else {
            self.state = AppState::Browsing;
            return;
        };
        let draft = ReplyDraft {
            review_id,
            text: self.input.clone(),
            is_public: self.reply_public,
        };

        match self.feed.backend().post_reply(&draft).await {
            Ok(_) => {
                info!(review_id = %draft.review_id, "reply posted");
                self.message = Some("Reply posted.".to_string());
                self.input.clear();
                self.state = AppState::Browsing;
                self.feed.dispatch(FilterAction::Refresh);
            }
            Err(e) => {
                self.message = Some(format!("Failed to post reply: {}", e));
                self.state = AppState::WritingReply;
            }
        }
    }

    fn ui<B: Backend>(&mut self, f: &mut Frame<B>) {
        let size = f.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Length(3), // Filters
                    Constraint::Min(10),   // Reviews
                    Constraint::Length(6), // Pagination and help
                ]
                .as_ref(),
            )
            .split(size);

        self.draw_filter_bar(f, chunks[0]);
        match self.state {
            AppState::WritingReply => self.draw_reply_view(f, chunks[1]),
            _ => self.draw_reviews_view(f, chunks[1]),
        }
        self.draw_footer(f, chunks[2]);

        if self.state == AppState::ConfirmingReply {
            self.draw_confirmation_view(f, size);
        }

        if let Some(message) = &self.message {
            let popup_area = centered_rect(60, 20, size);
            f.render_widget(Clear, popup_area);
            let paragraph = Paragraph::new(message.as_str())
                .block(Block::default().borders(Borders::ALL).title("Message"))
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, popup_area);
        }
    }

    fn draw_filter_bar<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let store = self.feed.store();
        let filters = store.filters();

        let search = if self.state == AppState::EditingSearch {
            format!("{}█", self.input)
        } else if filters.search_term.is_empty() {
            "—".to_string()
        } else {
            truncate_text(&filters.search_term, 24)
        };
        let stars = filters
            .star_rating
            .map(|s| format!("{}★", s))
            .unwrap_or_else(|| "any".to_string());
        let replies = filters
            .reply_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "any".to_string());
        let comment = if filters.has_comment.is_some() { " · with comment" } else { "" };

        let mut spans = vec![Span::raw(format!(
            "Search: {} · Stars: {} · Replies: {} · Sort: {}{}",
            search, stars, replies, filters.sort, comment
        ))];
        match store.state() {
            LoadState::Loading => spans.push(Span::styled(
                "  loading…",
                Style::default().fg(Color::Yellow),
            )),
            LoadState::Errored => {
                let error = store
                    .error()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                spans.push(Span::styled(
                    format!("  ⚠ {} (r to retry)", truncate_text(&error, 60)),
                    Style::default().fg(Color::Red),
                ));
            }
            LoadState::Idle | LoadState::Loaded => {}
        }

        let title = if filters.is_filtered() { "Filters (c to clear)" } else { "Filters" };
        let bar = Paragraph::new(Spans::from(spans))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(bar, area);
    }

    fn draw_reviews_view<B: Backend>(&mut self, f: &mut Frame<B>, area: Rect) {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
            .split(area);

        let items: Vec<ListItem> = self
            .reviews()
            .iter()
            .map(|review| {
                ListItem::new(format!(
                    "{} {} - {} [{}]",
                    star_bar(review.rating),
                    truncate_text(&review.customer_name, 18),
                    review.date.format("%Y-%m-%d"),
                    review.status.label()
                ))
            })
            .collect();

        let title = match self.feed.store().page() {
            Some(page) => format!("Reviews ({} total)", page.summary.total),
            None => "Reviews".to_string(),
        };
        let reviews_list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(">> ");
        f.render_stateful_widget(reviews_list, content_chunks[0], &mut self.list_state);

        let Some(review) = self.selected() else {
            return;
        };

        let mut text = vec![
            Spans::from(vec![Span::styled(
                format!("Rating: {}", star_bar(review.rating)),
                Style::default().fg(Color::Yellow),
            )]),
            Spans::from(format!("Customer: {}", review.customer_name)),
            Spans::from(format!("Date: {}", review.date.format("%Y-%m-%d %H:%M"))),
            Spans::from(format!("Location: {}", review.location_name)),
            Spans::from(format!("Status: {}", review.status.label())),
            Spans::from(""),
        ];

        if review.comment.is_empty() {
            text.push(Spans::from(vec![Span::styled(
                "(No written comment)",
                Style::default().fg(Color::Gray),
            )]));
        } else {
            text.push(Spans::from(vec![Span::styled(
                "Review:",
                Style::default().add_modifier(Modifier::BOLD),
            )]));
            text.push(Spans::from(review.comment.clone()));
        }

        text.push(Spans::from(""));
        match (&review.business_reply, review.status) {
            (Some(reply), _) => {
                text.push(Spans::from(vec![Span::styled(
                    "✅ Business reply:",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )]));
                text.push(Spans::from(vec![Span::styled(
                    reply.text.clone(),
                    Style::default().fg(Color::Green),
                )]));
                text.push(Spans::from(vec![Span::styled(
                    format!("Replied: {}", reply.date.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(Color::Gray),
                )]));
            }
            (None, ReviewStatus::Hidden) => text.push(Spans::from(vec![Span::styled(
                "Review removed; replies are disabled",
                Style::default().fg(Color::Gray),
            )])),
            (None, _) => text.push(Spans::from(vec![Span::styled(
                "Press Enter to reply",
                Style::default().fg(Color::Yellow),
            )])),
        }

        let detail = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Review Details"))
            .wrap(Wrap { trim: true });
        f.render_widget(detail, content_chunks[1]);
    }

    fn draw_reply_view<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(6)].as_ref())
            .split(area);

        if let Some(review) = self.selected() {
            let review_text = vec![
                Spans::from(vec![Span::styled(
                    format!("{} {}", star_bar(review.rating), review.customer_name),
                    Style::default().add_modifier(Modifier::BOLD),
                )]),
                Spans::from(review.comment.clone()),
            ];
            let original = Paragraph::new(review_text)
                .block(Block::default().borders(Borders::ALL).title("Replying to"))
                .wrap(Wrap { trim: true });
            f.render_widget(original, chunks[0]);
        }

        let visibility = if self.reply_public { "public" } else { "private" };
        let input = Paragraph::new(format!("{}█", self.input))
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Your reply ({}) · Tab visibility · Ctrl+S send · Esc cancel",
                visibility
            )))
            .wrap(Wrap { trim: false });
        f.render_widget(input, chunks[1]);
    }

    fn draw_confirmation_view<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let popup_area = centered_rect(60, 40, area);
        f.render_widget(Clear, popup_area);

        let text = vec![
            Spans::from(vec![Span::styled(
                "Post this reply?",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Spans::from(""),
            Spans::from(truncate_text(&self.input, 280)),
            Spans::from(""),
            Spans::from("y - post · n - keep editing"),
        ];
        let confirm = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Confirm"))
            .wrap(Wrap { trim: true });
        f.render_widget(confirm, popup_area);
    }

    fn draw_footer<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let mut lines = Vec::new();

        if let Some(page) = self.feed.store().page() {
            let window = page_window(page.pagination.page, page.pagination.total_pages);
            let distribution = (1..=5u8)
                .rev()
                .map(|s| format!("{}★ {}", s, page.summary.count_for(s)))
                .collect::<Vec<_>>()
                .join("  ");
            lines.push(Spans::from(format!(
                "Page {}/{}   {}",
                page.pagination.page,
                page.pagination.total_pages.max(1),
                render_window(&window)
            )));
            lines.push(Spans::from(format!(
                "Avg {:.2} on this page   {}",
                page.summary.average_rating, distribution
            )));
        }

        lines.push(Spans::from(vec![Span::styled(
            "↑/↓ select · ←/→ page · / search · 1-5 stars · 0 any · f replies · m comment · s sort · +/- page size · c clear · r refresh · x cancel · Enter reply · q quit",
            Style::default().fg(Color::Gray),
        )]));

        let footer = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(footer, area);
    }
}

fn larger_page_size(per_page: u32) -> u32 {
    per_page.saturating_mul(2).min(MAX_PER_PAGE)
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
