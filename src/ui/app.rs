use std::mem;
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
    Wrap,
};
use ratatui::Frame;

use crate::api::LibraryApi;
use crate::models::{Book, Member};
use crate::store::{LibraryStore, Mutation};
use crate::views::{
    books_view, dashboard_stats, lendings_view, members_view, recent_activity, ActivityKind,
    BookRow, EmptyState, LendingRow, LendingTab, MemberRow, TableView,
};

use super::forms::{
    BookField, BookForm, ConfirmBookDelete, ConfirmMemberDelete, LendColumn, LendForm,
    MemberField, MemberForm,
};
use super::helpers::{centered_rect, clamp_selection, move_selection};

/// Footer space reserved for status messages and key hints.
const FOOTER_HEIGHT: u16 = 3;
/// Shown when a submission arrives while another request is still out.
const IN_FLIGHT_NOTICE: &str = "Still working on the previous request.";

/// High-level navigation states, one per top-level screen. Keeping this
/// explicit makes it easy to reason about which rendering path runs and
/// what the keyboard shortcuts should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Dashboard,
    Books,
    Members,
    Lending,
}

impl Screen {
    const ALL: [Screen; 4] = [
        Screen::Dashboard,
        Screen::Books,
        Screen::Members,
        Screen::Lending,
    ];

    fn title(self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::Books => "Books",
            Screen::Members => "Members",
            Screen::Lending => "Lending",
        }
    }

    fn next(self) -> Self {
        match self {
            Screen::Dashboard => Screen::Books,
            Screen::Books => Screen::Members,
            Screen::Members => Screen::Lending,
            Screen::Lending => Screen::Dashboard,
        }
    }

    fn previous(self) -> Self {
        match self {
            Screen::Dashboard => Screen::Lending,
            Screen::Books => Screen::Dashboard,
            Screen::Members => Screen::Books,
            Screen::Lending => Screen::Members,
        }
    }
}

/// Fine-grained modes layered over the current screen. Each form or dialog
/// owns its input state; `Normal` is plain table navigation.
enum Mode {
    Normal,
    AddingBook(BookForm),
    AddingMember(MemberForm),
    LendingBook(LendForm),
    ConfirmBookDelete(ConfirmBookDelete),
    ConfirmMemberDelete(ConfirmMemberDelete),
    Searching(SearchState),
}

/// Which table the inline search is filtering.
enum SearchTarget {
    Books,
    Members,
}

/// State for an active inline search. The query writes through to the
/// matching filter on every keystroke, so the table narrows live.
struct SearchState {
    target: SearchTarget,
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI: the service handle, the
/// mirror snapshot, the navigation state machine, and the filter inputs.
pub struct App {
    api: Arc<dyn LibraryApi>,
    pub(crate) store: LibraryStore,
    screen: Screen,
    mode: Mode,
    lending_tab: LendingTab,
    book_search: String,
    member_search: String,
    books_selected: usize,
    members_selected: usize,
    lendings_selected: usize,
    status: Option<StatusMessage>,
    submitting: bool,
}

impl App {
    pub fn new(api: Arc<dyn LibraryApi>) -> Self {
        Self {
            api,
            store: LibraryStore::default(),
            screen: Screen::Dashboard,
            mode: Mode::Normal,
            lending_tab: LendingTab::default(),
            book_search: String::new(),
            member_search: String::new(),
            books_selected: 0,
            members_selected: 0,
            lendings_selected: 0,
            status: None,
            submitting: false,
        }
    }

    /// Fetch all three collections concurrently. Failures leave the
    /// affected collections in their empty state and surface one message.
    pub async fn initial_load(&mut self) {
        let api = Arc::clone(&self.api);
        if let Err(err) = self.store.reload_all(api.as_ref()).await {
            self.set_status(err.to_string(), StatusKind::Error);
        }
        self.clamp_selections();
    }

    /// Route one keypress through the mode state machine. Returns `true`
    /// when the application should exit.
    pub async fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        self.clear_status();

        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit).await,
            Mode::AddingBook(form) => self.handle_add_book(code, form).await,
            Mode::AddingMember(form) => self.handle_add_member(code, form).await,
            Mode::LendingBook(form) => self.handle_lend_form(code, form).await,
            Mode::ConfirmBookDelete(confirm) => {
                self.handle_confirm_book_delete(code, confirm).await
            }
            Mode::ConfirmMemberDelete(confirm) => {
                self.handle_confirm_member_delete(code, confirm).await
            }
            Mode::Searching(state) => self.handle_search(code, state),
        };
        Ok(exit)
    }

    async fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Mode::Normal;
            }
            KeyCode::Esc => {
                if self.screen == Screen::Dashboard {
                    *exit = true;
                } else {
                    self.screen = Screen::Dashboard;
                }
                return Mode::Normal;
            }
            KeyCode::Char('1') => {
                self.screen = Screen::Dashboard;
                return Mode::Normal;
            }
            KeyCode::Char('2') => {
                self.screen = Screen::Books;
                return Mode::Normal;
            }
            KeyCode::Char('3') => {
                self.screen = Screen::Members;
                return Mode::Normal;
            }
            KeyCode::Char('4') => {
                self.screen = Screen::Lending;
                return Mode::Normal;
            }
            KeyCode::Tab => {
                self.screen = self.screen.next();
                return Mode::Normal;
            }
            KeyCode::BackTab => {
                self.screen = self.screen.previous();
                return Mode::Normal;
            }
            KeyCode::Char('R') => {
                self.refresh_all().await;
                return Mode::Normal;
            }
            KeyCode::Up => {
                self.move_current_selection(-1);
                return Mode::Normal;
            }
            KeyCode::Down => {
                self.move_current_selection(1);
                return Mode::Normal;
            }
            KeyCode::PageUp => {
                self.move_current_selection(-5);
                return Mode::Normal;
            }
            KeyCode::PageDown => {
                self.move_current_selection(5);
                return Mode::Normal;
            }
            KeyCode::Home => {
                self.move_current_selection(isize::MIN / 2);
                return Mode::Normal;
            }
            KeyCode::End => {
                let len = self.current_rows_len() as isize;
                self.move_current_selection(len);
                return Mode::Normal;
            }
            _ => {}
        }

        match self.screen {
            Screen::Dashboard => Mode::Normal,
            Screen::Books => match code {
                KeyCode::Char('f') => Mode::Searching(SearchState {
                    target: SearchTarget::Books,
                    query: self.book_search.clone(),
                }),
                KeyCode::Char('+') => Mode::AddingBook(BookForm::default()),
                KeyCode::Char('-') => match self.selected_book_row() {
                    Some(row) => Mode::ConfirmBookDelete(ConfirmBookDelete {
                        id: row.id,
                        title: row.title,
                    }),
                    None => {
                        self.set_status("No book selected.", StatusKind::Error);
                        Mode::Normal
                    }
                },
                KeyCode::Char('l') => {
                    let preselect = self.selected_book_row().map(|row| row.id);
                    self.open_lend_form(preselect.as_deref())
                }
                _ => Mode::Normal,
            },
            Screen::Members => match code {
                KeyCode::Char('f') => Mode::Searching(SearchState {
                    target: SearchTarget::Members,
                    query: self.member_search.clone(),
                }),
                KeyCode::Char('+') => Mode::AddingMember(MemberForm::default()),
                KeyCode::Char('-') => match self.selected_member_row() {
                    Some(row) => Mode::ConfirmMemberDelete(ConfirmMemberDelete {
                        id: row.id,
                        name: row.name,
                    }),
                    None => {
                        self.set_status("No member selected.", StatusKind::Error);
                        Mode::Normal
                    }
                },
                _ => Mode::Normal,
            },
            Screen::Lending => match code {
                KeyCode::Char('a') => {
                    self.lending_tab = self.lending_tab.toggle();
                    self.clamp_selections();
                    Mode::Normal
                }
                KeyCode::Char('+') | KeyCode::Char('l') => self.open_lend_form(None),
                KeyCode::Char('r') => {
                    self.return_selected().await;
                    Mode::Normal
                }
                _ => Mode::Normal,
            },
        }
    }

    async fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                form.toggle_field();
                Mode::AddingBook(form)
            }
            KeyCode::Backspace => {
                form.backspace();
                Mode::AddingBook(form)
            }
            KeyCode::Enter => {
                let (title, author) = match form.parse_inputs() {
                    Ok(values) => values,
                    Err(err) => {
                        form.error = Some(err.to_string());
                        return Mode::AddingBook(form);
                    }
                };
                match self.add_book(&title, &author).await {
                    None => Mode::Normal,
                    Some(message) => {
                        form.error = Some(message);
                        Mode::AddingBook(form)
                    }
                }
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
                form.error = None;
                Mode::AddingBook(form)
            }
            _ => Mode::AddingBook(form),
        }
    }

    async fn handle_add_member(&mut self, code: KeyCode, mut form: MemberForm) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                form.toggle_field();
                Mode::AddingMember(form)
            }
            KeyCode::Backspace => {
                form.backspace();
                Mode::AddingMember(form)
            }
            KeyCode::Enter => {
                let (name, email) = match form.parse_inputs() {
                    Ok(values) => values,
                    Err(err) => {
                        form.error = Some(err.to_string());
                        return Mode::AddingMember(form);
                    }
                };
                match self.add_member(&name, &email).await {
                    None => Mode::Normal,
                    Some(message) => {
                        form.error = Some(message);
                        Mode::AddingMember(form)
                    }
                }
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
                form.error = None;
                Mode::AddingMember(form)
            }
            _ => Mode::AddingMember(form),
        }
    }

    async fn handle_lend_form(&mut self, code: KeyCode, mut form: LendForm) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                form.toggle_column();
                Mode::LendingBook(form)
            }
            KeyCode::Up => {
                form.move_selection(-1);
                Mode::LendingBook(form)
            }
            KeyCode::Down => {
                form.move_selection(1);
                Mode::LendingBook(form)
            }
            KeyCode::Enter => {
                let (book_id, member_id) = match form.parse_inputs() {
                    Ok(values) => values,
                    Err(err) => {
                        form.error = Some(err.to_string());
                        return Mode::LendingBook(form);
                    }
                };
                match self.lend_book(&book_id, &member_id).await {
                    None => Mode::Normal,
                    Some(message) => {
                        form.error = Some(message);
                        Mode::LendingBook(form)
                    }
                }
            }
            _ => Mode::LendingBook(form),
        }
    }

    async fn handle_confirm_book_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmBookDelete,
    ) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Char('y') => {
                self.delete_book(&confirm.id, &confirm.title).await;
                Mode::Normal
            }
            KeyCode::Esc | KeyCode::Char('n') => Mode::Normal,
            _ => Mode::ConfirmBookDelete(confirm),
        }
    }

    async fn handle_confirm_member_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmMemberDelete,
    ) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Char('y') => {
                self.delete_member(&confirm.id, &confirm.name).await;
                Mode::Normal
            }
            KeyCode::Esc | KeyCode::Char('n') => Mode::Normal,
            _ => Mode::ConfirmMemberDelete(confirm),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.apply_search(&state.target, "");
                Mode::Normal
            }
            KeyCode::Enter => Mode::Normal,
            KeyCode::Backspace => {
                state.query.pop();
                self.apply_search(&state.target, &state.query);
                Mode::Searching(state)
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                state.query.push(ch);
                self.apply_search(&state.target, &state.query);
                Mode::Searching(state)
            }
            _ => Mode::Searching(state),
        }
    }

    fn apply_search(&mut self, target: &SearchTarget, query: &str) {
        match target {
            SearchTarget::Books => self.book_search = query.to_string(),
            SearchTarget::Members => self.member_search = query.to_string(),
        }
        self.clamp_selections();
    }

    fn open_lend_form(&mut self, preselect: Option<&str>) -> Mode {
        let available: Vec<Book> = self
            .store
            .books
            .items()
            .iter()
            .filter(|book| book.available)
            .cloned()
            .collect();
        if available.is_empty() {
            self.set_status("No books are available to lend.", StatusKind::Error);
            return Mode::Normal;
        }
        let members: Vec<Member> = self.store.members.items().to_vec();
        if members.is_empty() {
            self.set_status("Register a member before lending.", StatusKind::Error);
            return Mode::Normal;
        }
        Mode::LendingBook(LendForm::new(available, members, preselect))
    }

    async fn return_selected(&mut self) {
        let Some(row) = self.selected_lending_row() else {
            self.set_status("No lending selected.", StatusKind::Error);
            return;
        };
        if row.returned {
            self.set_status("That lending is already returned.", StatusKind::Error);
            return;
        }
        self.return_book(&row.lending_id).await;
    }

    // Mutation handlers. Each follows the same shape: refuse duplicates
    // while a request is outstanding, call the service, then re-fetch the
    // collections named by the consistency table. Handlers backed by a form
    // hand the failure message back so the form can display it; the rest
    // report through the status footer.

    pub(crate) async fn add_book(&mut self, title: &str, author: &str) -> Option<String> {
        if !self.begin_submit() {
            return Some(IN_FLIGHT_NOTICE.to_string());
        }
        let api = Arc::clone(&self.api);
        let result = api.create_book(title, author).await;
        self.end_submit();
        match result {
            Ok(book) => {
                tracing::info!(id = %book.id, title = %book.title, "book added");
                self.set_status(format!("Added \"{}\".", book.title), StatusKind::Info);
                self.reload_for(Mutation::AddBook).await;
                None
            }
            Err(err) => Some(err.to_string()),
        }
    }

    pub(crate) async fn add_member(&mut self, name: &str, email: &str) -> Option<String> {
        if !self.begin_submit() {
            return Some(IN_FLIGHT_NOTICE.to_string());
        }
        let api = Arc::clone(&self.api);
        let result = api.create_member(name, email).await;
        self.end_submit();
        match result {
            Ok(member) => {
                tracing::info!(id = %member.id, "member added");
                self.set_status(format!("Added {}.", member.name), StatusKind::Info);
                self.reload_for(Mutation::AddMember).await;
                None
            }
            Err(err) => Some(err.to_string()),
        }
    }

    pub(crate) async fn lend_book(&mut self, book_id: &str, member_id: &str) -> Option<String> {
        if !self.begin_submit() {
            return Some(IN_FLIGHT_NOTICE.to_string());
        }
        let api = Arc::clone(&self.api);
        let result = api.lend_book(book_id, member_id).await;
        self.end_submit();
        match result {
            Ok(record) => {
                tracing::info!(lending = %record.lending_id, book = %record.book_id, "book lent");
                self.set_status("Book lent.", StatusKind::Info);
                self.reload_for(Mutation::Lend).await;
                None
            }
            Err(err) => Some(err.to_string()),
        }
    }

    pub(crate) async fn return_book(&mut self, lending_id: &str) {
        if !self.begin_submit() {
            return;
        }
        let api = Arc::clone(&self.api);
        let result = api.return_book(lending_id).await;
        self.end_submit();
        match result {
            Ok(record) => {
                tracing::info!(lending = %record.lending_id, "book returned");
                self.set_status("Book returned.", StatusKind::Info);
                self.reload_for(Mutation::Return).await;
            }
            Err(err) => self.set_status(err.to_string(), StatusKind::Error),
        }
    }

    pub(crate) async fn delete_book(&mut self, id: &str, title: &str) {
        if !self.begin_submit() {
            return;
        }
        let api = Arc::clone(&self.api);
        let result = api.delete_book(id).await;
        self.end_submit();
        match result {
            Ok(()) => {
                tracing::info!(id, "book deleted");
                self.set_status(format!("Deleted \"{title}\"."), StatusKind::Info);
                self.reload_for(Mutation::DeleteBook).await;
            }
            Err(err) => self.set_status(err.to_string(), StatusKind::Error),
        }
    }

    pub(crate) async fn delete_member(&mut self, id: &str, name: &str) {
        if !self.begin_submit() {
            return;
        }
        let api = Arc::clone(&self.api);
        let result = api.delete_member(id).await;
        self.end_submit();
        match result {
            Ok(()) => {
                tracing::info!(id, "member deleted");
                self.set_status(format!("Removed {name}."), StatusKind::Info);
                self.reload_for(Mutation::DeleteMember).await;
            }
            Err(err) => self.set_status(err.to_string(), StatusKind::Error),
        }
    }

    /// Re-fetch the collections the mutation may have touched. A reload
    /// failure overwrites the success status, since the mirror is now
    /// showing an empty state the user should know about.
    async fn reload_for(&mut self, mutation: Mutation) {
        let api = Arc::clone(&self.api);
        if let Err(err) = self.store.reload_after(api.as_ref(), mutation).await {
            self.set_status(err.to_string(), StatusKind::Error);
        }
        self.clamp_selections();
    }

    async fn refresh_all(&mut self) {
        let api = Arc::clone(&self.api);
        match self.store.reload_all(api.as_ref()).await {
            Ok(()) => self.set_status("Refreshed.", StatusKind::Info),
            Err(err) => self.set_status(err.to_string(), StatusKind::Error),
        }
        self.clamp_selections();
    }

    /// Idle to Submitting transition; refuses duplicate submissions while a
    /// request is outstanding.
    fn begin_submit(&mut self) -> bool {
        if self.submitting {
            self.set_status(IN_FLIGHT_NOTICE, StatusKind::Error);
            return false;
        }
        self.submitting = true;
        true
    }

    fn end_submit(&mut self) {
        self.submitting = false;
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn selected_book_row(&self) -> Option<BookRow> {
        books_view(&self.store.books, &self.book_search)
            .rows()
            .get(self.books_selected)
            .cloned()
    }

    fn selected_member_row(&self) -> Option<MemberRow> {
        members_view(&self.store.members, &self.member_search)
            .rows()
            .get(self.members_selected)
            .cloned()
    }

    fn selected_lending_row(&self) -> Option<LendingRow> {
        lendings_view(&self.store, self.lending_tab)
            .rows()
            .get(self.lendings_selected)
            .cloned()
    }

    fn current_rows_len(&self) -> usize {
        match self.screen {
            Screen::Dashboard => 0,
            Screen::Books => books_view(&self.store.books, &self.book_search).rows().len(),
            Screen::Members => members_view(&self.store.members, &self.member_search)
                .rows()
                .len(),
            Screen::Lending => lendings_view(&self.store, self.lending_tab).rows().len(),
        }
    }

    fn move_current_selection(&mut self, offset: isize) {
        let len = self.current_rows_len();
        match self.screen {
            Screen::Dashboard => {}
            Screen::Books => {
                self.books_selected = move_selection(self.books_selected, offset, len);
            }
            Screen::Members => {
                self.members_selected = move_selection(self.members_selected, offset, len);
            }
            Screen::Lending => {
                self.lendings_selected = move_selection(self.lendings_selected, offset, len);
            }
        }
    }

    /// Keep every table selection within the rendered row count after a
    /// reload or filter change shrinks a table.
    fn clamp_selections(&mut self) {
        self.books_selected = clamp_selection(
            self.books_selected,
            books_view(&self.store.books, &self.book_search).rows().len(),
        );
        self.members_selected = clamp_selection(
            self.members_selected,
            members_view(&self.store.members, &self.member_search)
                .rows()
                .len(),
        );
        self.lendings_selected = clamp_selection(
            self.lendings_selected,
            lendings_view(&self.store, self.lending_tab).rows().len(),
        );
    }

    // Drawing. Every screen renders from the pure view models so the frame
    // always reflects the current mirror snapshot plus filter state.

    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        match self.screen {
            Screen::Dashboard => self.draw_dashboard(frame, chunks[1]),
            Screen::Books => self.draw_books(frame, chunks[1]),
            Screen::Members => self.draw_members(frame, chunks[1]),
            Screen::Lending => self.draw_lending(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, form),
            Mode::AddingMember(form) => self.draw_member_form(frame, form),
            Mode::LendingBook(form) => self.draw_lend_form(frame, form),
            Mode::ConfirmBookDelete(confirm) => self.draw_confirm(
                frame,
                "Delete Book",
                &format!("Delete \"{}\" from the catalog?", confirm.title),
            ),
            Mode::ConfirmMemberDelete(confirm) => self.draw_confirm(
                frame,
                "Delete Member",
                &format!("Remove {} from the registry?", confirm.name),
            ),
            Mode::Normal | Mode::Searching(_) => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (idx, screen) in Screen::ALL.iter().enumerate() {
            let style = if *screen == self.screen {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {} {} ", idx + 1, screen.title()), style));
        }
        let tabs = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Library Lending Desk"),
        );
        frame.render_widget(tabs, area);
    }

    fn draw_dashboard(&self, frame: &mut Frame, area: Rect) {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let stats = dashboard_stats(&self.store);
        let tiles = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(sections[0]);
        draw_stat_tile(frame, tiles[0], "Total Books", stats.total_books);
        draw_stat_tile(frame, tiles[1], "Total Members", stats.total_members);
        draw_stat_tile(frame, tiles[2], "Active Lendings", stats.active_lendings);
        draw_stat_tile(frame, tiles[3], "Available Books", stats.available_books);

        let block = Block::default().borders(Borders::ALL).title("Recent Activity");
        let feed = recent_activity(&self.store);
        if feed.is_empty() {
            let placeholder = Paragraph::new("No recent activity")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(placeholder, sections[1]);
            return;
        }

        let items: Vec<ListItem> = feed
            .iter()
            .map(|entry| {
                let (tag, color) = match entry.kind {
                    ActivityKind::Lent => ("LENT", Color::Yellow),
                    ActivityKind::Returned => ("RETURNED", Color::Green),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{tag:<10}"), Style::default().fg(color)),
                    Span::raw(format!(
                        "{} · {} · {}",
                        entry.book_title, entry.member_name, entry.lent_on
                    )),
                ]))
            })
            .collect();
        frame.render_widget(List::new(items).block(block), sections[1]);
    }

    fn draw_books(&self, frame: &mut Frame, area: Rect) {
        let title = if self.book_search.trim().is_empty() {
            format!("Books ({})", self.store.books.len())
        } else {
            format!("Books · filter \"{}\"", self.book_search.trim())
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        match books_view(&self.store.books, &self.book_search) {
            TableView::Empty(empty) => draw_empty_state(frame, area, block, empty),
            TableView::Rows(rows) => {
                let header = Row::new(vec!["Title", "Author", "Copies", "Status"])
                    .style(Style::default().add_modifier(Modifier::BOLD));
                let body: Vec<Row> = rows
                    .iter()
                    .map(|row| {
                        let status = if row.available {
                            Span::styled("Available", Style::default().fg(Color::Green))
                        } else {
                            Span::styled("Unavailable", Style::default().fg(Color::Red))
                        };
                        Row::new(vec![
                            Cell::from(row.title.clone()),
                            Cell::from(row.author.clone()),
                            Cell::from(row.quantity.to_string()),
                            Cell::from(status),
                        ])
                    })
                    .collect();
                let widths = [
                    Constraint::Percentage(40),
                    Constraint::Percentage(32),
                    Constraint::Length(8),
                    Constraint::Length(13),
                ];
                let table = Table::new(body, widths)
                    .header(header)
                    .block(block)
                    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                    .highlight_symbol("> ");
                let mut state = TableState::default()
                    .with_selected(Some(clamp_selection(self.books_selected, rows.len())));
                frame.render_stateful_widget(table, area, &mut state);
            }
        }
    }

    fn draw_members(&self, frame: &mut Frame, area: Rect) {
        let title = if self.member_search.trim().is_empty() {
            format!("Members ({})", self.store.members.len())
        } else {
            format!("Members · filter \"{}\"", self.member_search.trim())
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        match members_view(&self.store.members, &self.member_search) {
            TableView::Empty(empty) => draw_empty_state(frame, area, block, empty),
            TableView::Rows(rows) => {
                let header = Row::new(vec!["Name", "Email"])
                    .style(Style::default().add_modifier(Modifier::BOLD));
                let body: Vec<Row> = rows
                    .iter()
                    .map(|row| {
                        Row::new(vec![
                            Cell::from(row.name.clone()),
                            Cell::from(row.email.clone()),
                        ])
                    })
                    .collect();
                let widths = [Constraint::Percentage(40), Constraint::Percentage(60)];
                let table = Table::new(body, widths)
                    .header(header)
                    .block(block)
                    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                    .highlight_symbol("> ");
                let mut state = TableState::default()
                    .with_selected(Some(clamp_selection(self.members_selected, rows.len())));
                frame.render_stateful_widget(table, area, &mut state);
            }
        }
    }

    fn draw_lending(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Lending · {}", self.lending_tab.label()));

        match lendings_view(&self.store, self.lending_tab) {
            TableView::Empty(empty) => draw_empty_state(frame, area, block, empty),
            TableView::Rows(rows) => {
                let header = Row::new(vec!["Book", "Member", "Lent", "Returned", "Status"])
                    .style(Style::default().add_modifier(Modifier::BOLD));
                let body: Vec<Row> = rows
                    .iter()
                    .map(|row| {
                        let status = if row.returned {
                            Span::styled(row.status_label(), Style::default().fg(Color::Green))
                        } else {
                            Span::styled(row.status_label(), Style::default().fg(Color::Yellow))
                        };
                        Row::new(vec![
                            Cell::from(row.book_title.clone()),
                            Cell::from(row.member_name.clone()),
                            Cell::from(row.lent_on.clone()),
                            Cell::from(row.returned_on.clone().unwrap_or_else(|| "-".to_string())),
                            Cell::from(status),
                        ])
                    })
                    .collect();
                let widths = [
                    Constraint::Percentage(28),
                    Constraint::Percentage(22),
                    Constraint::Percentage(20),
                    Constraint::Percentage(20),
                    Constraint::Length(9),
                ];
                let table = Table::new(body, widths)
                    .header(header)
                    .block(block)
                    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                    .highlight_symbol("> ");
                let mut state = TableState::default()
                    .with_selected(Some(clamp_selection(self.lendings_selected, rows.len())));
                frame.render_stateful_widget(table, area, &mut state);
            }
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let line = if let Mode::Searching(state) = &self.mode {
            Line::from(vec![
                Span::raw("Search: "),
                Span::styled(format!("{}_", state.query), Style::default().fg(Color::Yellow)),
            ])
        } else if let Some(status) = &self.status {
            Line::from(Span::styled(status.text.clone(), status.kind.style()))
        } else {
            Line::from(Span::styled(
                self.key_hints(),
                Style::default().fg(Color::DarkGray),
            ))
        };
        frame.render_widget(
            Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }

    fn key_hints(&self) -> &'static str {
        match self.screen {
            Screen::Dashboard => "1-4 switch screens · Tab cycle · R refresh · q quit",
            Screen::Books => "up/down select · f search · + add · - delete · l lend · q quit",
            Screen::Members => "up/down select · f search · + add · - delete · q quit",
            Screen::Lending => "up/down select · a active/history · l lend · r return · q quit",
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, form: &BookForm) {
        let area = centered_rect(50, 35, frame.area());
        frame.render_widget(Clear, area);
        let mut lines = vec![
            form.build_line("Title", BookField::Title),
            form.build_line("Author", BookField::Author),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Enter save · Tab switch field · Esc cancel",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title("Add Book")),
            area,
        );
    }

    fn draw_member_form(&self, frame: &mut Frame, form: &MemberForm) {
        let area = centered_rect(50, 35, frame.area());
        frame.render_widget(Clear, area);
        let mut lines = vec![
            form.build_line("Name", MemberField::Name),
            form.build_line("Email", MemberField::Email),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Enter save · Tab switch field · Esc cancel",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title("Add Member")),
            area,
        );
    }

    fn draw_lend_form(&self, frame: &mut Frame, form: &LendForm) {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default().borders(Borders::ALL).title("Lend Book");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(inner);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(sections[0]);

        let focus_style = Style::default().fg(Color::Yellow);

        let book_items: Vec<ListItem> = form
            .books
            .iter()
            .map(|book| {
                ListItem::new(format!("{} ({} left)", book.display_title(), book.quantity))
            })
            .collect();
        let books_block = Block::default()
            .borders(Borders::ALL)
            .title("Available Books")
            .border_style(if form.active == LendColumn::Books {
                focus_style
            } else {
                Style::default()
            });
        let book_list = List::new(book_items)
            .block(books_block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut book_state = ListState::default().with_selected(Some(form.book_selected));
        frame.render_stateful_widget(book_list, columns[0], &mut book_state);

        let member_items: Vec<ListItem> = form
            .members
            .iter()
            .map(|member| ListItem::new(member.display_name()))
            .collect();
        let members_block = Block::default()
            .borders(Borders::ALL)
            .title("Members")
            .border_style(if form.active == LendColumn::Members {
                focus_style
            } else {
                Style::default()
            });
        let member_list = List::new(member_items)
            .block(members_block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut member_state = ListState::default().with_selected(Some(form.member_selected));
        frame.render_stateful_widget(member_list, columns[1], &mut member_state);

        let footer = match &form.error {
            Some(error) => Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(Span::styled(
                "Enter lend · Tab switch column · Esc cancel",
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(Paragraph::new(footer), sections[1]);
    }

    fn draw_confirm(&self, frame: &mut Frame, title: &str, message: &str) {
        let area = centered_rect(50, 25, frame.area());
        frame.render_widget(Clear, area);
        let lines = vec![
            Line::from(message.to_string()),
            Line::from(""),
            Line::from(Span::styled(
                "Enter confirm · Esc cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(title.to_string()),
                ),
            area,
        );
    }
}

fn draw_stat_tile(frame: &mut Frame, area: Rect, label: &str, value: usize) {
    let text = vec![
        Line::from(Span::styled(
            value.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_empty_state(frame: &mut Frame, area: Rect, block: Block, empty: EmptyState) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(empty.title, Style::default().fg(Color::Gray))),
    ];
    if !empty.hint.is_empty() {
        lines.push(Line::from(Span::styled(
            empty.hint,
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        area,
    );
}
