//! Pure view models built from the mirror snapshot. Every function here is
//! referentially transparent: the same store contents and filter inputs
//! always produce the same rows, with no state retained between calls. The
//! terminal layer only turns these structures into widgets; all filtering,
//! counting, and placeholder resolution happens here where it can be tested
//! without a terminal.

use crate::models::{format_timestamp, Book, LendingRecord, Member};
use crate::store::{Collection, LibraryStore, LoadState};

/// Maximum number of entries in the recent-activity feed.
pub const ACTIVITY_LIMIT: usize = 5;

/// Which slice of the lending history the lending screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LendingTab {
    /// Only records that have not been returned yet.
    #[default]
    Active,
    /// The complete history, returned records included.
    All,
}

impl LendingTab {
    pub fn toggle(self) -> Self {
        match self {
            LendingTab::Active => LendingTab::All,
            LendingTab::All => LendingTab::Active,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LendingTab::Active => "Active",
            LendingTab::All => "History",
        }
    }
}

/// Heading plus hint shown when a table has nothing to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub hint: &'static str,
}

const LOADING: EmptyState = EmptyState {
    title: "Loading...",
    hint: "",
};
const NO_BOOKS: EmptyState = EmptyState {
    title: "No books found",
    hint: "Add your first book to get started",
};
const NO_BOOKS_MATCHING: EmptyState = EmptyState {
    title: "No books found matching your search",
    hint: "",
};
const NO_MEMBERS: EmptyState = EmptyState {
    title: "No members found",
    hint: "Add your first member to get started",
};
const NO_MEMBERS_MATCHING: EmptyState = EmptyState {
    title: "No members found matching your search",
    hint: "",
};
const NO_LENDING_HISTORY: EmptyState = EmptyState {
    title: "No lending history",
    hint: "Start lending books to see activity",
};
const NO_ACTIVE_LENDINGS: EmptyState = EmptyState {
    title: "No active lendings",
    hint: "Start lending books to see activity",
};

/// A rendered table: either rows to draw or the empty-state placeholder.
#[derive(Debug, PartialEq, Eq)]
pub enum TableView<R> {
    Rows(Vec<R>),
    Empty(EmptyState),
}

impl<R> TableView<R> {
    /// The rows to draw; the empty state renders as zero rows.
    pub fn rows(&self) -> &[R] {
        match self {
            TableView::Rows(rows) => rows,
            TableView::Empty(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub quantity: u32,
    pub available: bool,
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            quantity: book.quantity,
            available: book.available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&Member> for MemberRow {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            email: member.email.clone(),
        }
    }
}

/// One row of the lending table, with book and member references already
/// resolved. Dangling references render as placeholders rather than being
/// dropped, so a half-reloaded mirror still shows every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingRow {
    pub lending_id: String,
    pub book_title: String,
    pub member_name: String,
    pub lent_on: String,
    pub returned_on: Option<String>,
    pub returned: bool,
}

impl LendingRow {
    pub fn status_label(&self) -> &'static str {
        if self.returned {
            "Returned"
        } else {
            "Lent"
        }
    }
}

/// The four dashboard counters, always derived from the current mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_books: usize,
    pub total_members: usize,
    pub active_lendings: usize,
    pub available_books: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Lent,
    Returned,
}

/// One line of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub book_title: String,
    pub member_name: String,
    pub lent_on: String,
}

impl ActivityEntry {
    pub fn headline(&self) -> &'static str {
        match self.kind {
            ActivityKind::Lent => "Book Lent",
            ActivityKind::Returned => "Book Returned",
        }
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Books table: one row per book whose title or author contains the search
/// term, case-insensitively. A blank search selects everything.
pub fn books_view(books: &Collection<Book>, search: &str) -> TableView<BookRow> {
    if books.state() == LoadState::Loading {
        return TableView::Empty(LOADING);
    }
    if books.is_empty() {
        return TableView::Empty(NO_BOOKS);
    }

    let query = search.trim().to_lowercase();
    let rows: Vec<BookRow> = books
        .items()
        .iter()
        .filter(|book| {
            query.is_empty()
                || contains_ignore_case(&book.title, &query)
                || contains_ignore_case(&book.author, &query)
        })
        .map(BookRow::from)
        .collect();

    if rows.is_empty() {
        TableView::Empty(NO_BOOKS_MATCHING)
    } else {
        TableView::Rows(rows)
    }
}

/// Members table, filtered on name or email. Same shape as the books table.
pub fn members_view(members: &Collection<Member>, search: &str) -> TableView<MemberRow> {
    if members.state() == LoadState::Loading {
        return TableView::Empty(LOADING);
    }
    if members.is_empty() {
        return TableView::Empty(NO_MEMBERS);
    }

    let query = search.trim().to_lowercase();
    let rows: Vec<MemberRow> = members
        .items()
        .iter()
        .filter(|member| {
            query.is_empty()
                || contains_ignore_case(&member.name, &query)
                || contains_ignore_case(&member.email, &query)
        })
        .map(MemberRow::from)
        .collect();

    if rows.is_empty() {
        TableView::Empty(NO_MEMBERS_MATCHING)
    } else {
        TableView::Rows(rows)
    }
}

/// Lending table for the chosen tab. `Active` keeps only records without a
/// return timestamp; `All` keeps everything. The two tabs carry different
/// empty-state messages.
pub fn lendings_view(store: &LibraryStore, tab: LendingTab) -> TableView<LendingRow> {
    if store.lendings.state() == LoadState::Loading {
        return TableView::Empty(LOADING);
    }
    if store.lendings.is_empty() {
        return TableView::Empty(NO_LENDING_HISTORY);
    }

    let rows: Vec<LendingRow> = store
        .lendings
        .items()
        .iter()
        .filter(|record| match tab {
            LendingTab::Active => !record.is_returned(),
            LendingTab::All => true,
        })
        .map(|record| lending_row(record, &store.books, &store.members))
        .collect();

    if rows.is_empty() {
        TableView::Empty(match tab {
            LendingTab::Active => NO_ACTIVE_LENDINGS,
            LendingTab::All => NO_LENDING_HISTORY,
        })
    } else {
        TableView::Rows(rows)
    }
}

fn lending_row(
    record: &LendingRecord,
    books: &Collection<Book>,
    members: &Collection<Member>,
) -> LendingRow {
    let book_title = books
        .items()
        .iter()
        .find(|book| book.id == record.book_id)
        .map(|book| book.title.clone())
        .unwrap_or_else(|| "Unknown Book".to_string());
    let member_name = members
        .items()
        .iter()
        .find(|member| member.id == record.member_id)
        .map(|member| member.name.clone())
        .unwrap_or_else(|| "Unknown Member".to_string());

    LendingRow {
        lending_id: record.lending_id.clone(),
        book_title,
        member_name,
        lent_on: format_timestamp(&record.lending_date),
        returned_on: record.return_date.as_deref().map(format_timestamp),
        returned: record.is_returned(),
    }
}

/// Dashboard counters derived from the current snapshot.
pub fn dashboard_stats(store: &LibraryStore) -> DashboardStats {
    DashboardStats {
        total_books: store.books.len(),
        total_members: store.members.len(),
        active_lendings: store
            .lendings
            .items()
            .iter()
            .filter(|record| !record.is_returned())
            .count(),
        available_books: store
            .books
            .items()
            .iter()
            .filter(|book| book.available)
            .count(),
    }
}

/// The five most recent lending events, lend timestamp descending. The sort
/// is stable, so records with equal (or unparseable) timestamps keep their
/// server order, with unparseable ones at the end.
pub fn recent_activity(store: &LibraryStore) -> Vec<ActivityEntry> {
    let mut records: Vec<&LendingRecord> = store.lendings.items().iter().collect();
    records.sort_by(|a, b| b.lent_at().cmp(&a.lent_at()));

    records
        .into_iter()
        .take(ACTIVITY_LIMIT)
        .map(|record| {
            let row = lending_row(record, &store.books, &store.members);
            ActivityEntry {
                kind: if record.is_returned() {
                    ActivityKind::Returned
                } else {
                    ActivityKind::Lent
                },
                book_title: row.book_title,
                member_name: row.member_name,
                lent_on: row.lent_on,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeLibrary;
    use crate::api::LibraryApi;
    use crate::store::CollectionKind;

    async fn loaded_store(api: &FakeLibrary) -> LibraryStore {
        let mut store = LibraryStore::default();
        store.reload_all(api).await.ok();
        store
    }

    fn titles(view: &TableView<BookRow>) -> Vec<&str> {
        view.rows().iter().map(|row| row.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_book_search_matches_title_or_author_case_insensitively() {
        let api = FakeLibrary::new();
        api.seed_book("Dune", "Herbert", 2);
        api.seed_book("Emma", "Austen", 1);
        api.seed_book("Persuasion", "Austen", 1);
        let store = loaded_store(&api).await;

        assert_eq!(titles(&books_view(&store.books, "dUnE")), vec!["Dune"]);
        assert_eq!(
            titles(&books_view(&store.books, "AUSTEN")),
            vec!["Emma", "Persuasion"]
        );
        // Blank and whitespace-only searches select everything.
        assert_eq!(books_view(&store.books, "").rows().len(), 3);
        assert_eq!(books_view(&store.books, "   ").rows().len(), 3);
    }

    #[tokio::test]
    async fn test_book_search_with_no_match_shows_search_empty_state() {
        let api = FakeLibrary::new();
        api.seed_book("Dune", "Herbert", 2);
        let store = loaded_store(&api).await;

        match books_view(&store.books, "tolstoy") {
            TableView::Empty(state) => {
                assert_eq!(state.title, "No books found matching your search");
            }
            TableView::Rows(_) => panic!("expected empty state"),
        }
    }

    #[tokio::test]
    async fn test_member_search_matches_name_or_email() {
        let api = FakeLibrary::new();
        api.seed_member("Alice", "a@x.com");
        api.seed_member("Bob", "bob@y.org");
        let store = loaded_store(&api).await;

        let by_email = members_view(&store.members, "Y.ORG");
        assert_eq!(by_email.rows().len(), 1);
        assert_eq!(by_email.rows()[0].name, "Bob");

        let by_name = members_view(&store.members, "ali");
        assert_eq!(by_name.rows().len(), 1);
        assert_eq!(by_name.rows()[0].email, "a@x.com");
    }

    #[tokio::test]
    async fn test_active_tab_keeps_only_outstanding_records() {
        let api = FakeLibrary::new();
        let book = api.seed_book("Dune", "Herbert", 2);
        let member = api.seed_member("Alice", "a@x.com");
        let first = api.lend_book(&book.id, &member.id).await.unwrap();
        api.lend_book(&book.id, &member.id).await.unwrap();
        api.return_book(&first.lending_id).await.unwrap();
        let store = loaded_store(&api).await;

        let active = lendings_view(&store, LendingTab::Active);
        assert_eq!(active.rows().len(), 1);
        assert!(!active.rows()[0].returned);

        let all = lendings_view(&store, LendingTab::All);
        assert_eq!(all.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_lending_empty_states_differ_by_tab() {
        let api = FakeLibrary::new();
        let store = loaded_store(&api).await;

        // No history at all: both tabs show the history message.
        match lendings_view(&store, LendingTab::Active) {
            TableView::Empty(state) => assert_eq!(state.title, "No lending history"),
            TableView::Rows(_) => panic!("expected empty state"),
        }

        // History exists but everything is returned: the active tab says so.
        let book = api.seed_book("Dune", "Herbert", 1);
        let member = api.seed_member("Alice", "a@x.com");
        let record = api.lend_book(&book.id, &member.id).await.unwrap();
        api.return_book(&record.lending_id).await.unwrap();
        let store = loaded_store(&api).await;

        match lendings_view(&store, LendingTab::Active) {
            TableView::Empty(state) => assert_eq!(state.title, "No active lendings"),
            TableView::Rows(_) => panic!("expected empty state"),
        }
        assert_eq!(lendings_view(&store, LendingTab::All).rows().len(), 1);
    }

    #[tokio::test]
    async fn test_dangling_references_render_placeholders() {
        let api = FakeLibrary::new();
        let book = api.seed_book("Dune", "Herbert", 1);
        let member = api.seed_member("Alice", "a@x.com");
        api.lend_book(&book.id, &member.id).await.unwrap();
        api.delete_book(&book.id).await.unwrap();
        api.delete_member(&member.id).await.unwrap();
        let store = loaded_store(&api).await;

        let all = lendings_view(&store, LendingTab::All);
        assert_eq!(all.rows()[0].book_title, "Unknown Book");
        assert_eq!(all.rows()[0].member_name, "Unknown Member");
    }

    #[tokio::test]
    async fn test_dashboard_counters_agree_with_mirror() {
        let api = FakeLibrary::new();
        let dune = api.seed_book("Dune", "Herbert", 1);
        api.seed_book("Emma", "Austen", 3);
        let member = api.seed_member("Alice", "a@x.com");
        // Lending the last copy of Dune flips it to unavailable.
        api.lend_book(&dune.id, &member.id).await.unwrap();
        let store = loaded_store(&api).await;

        let stats = dashboard_stats(&store);
        assert_eq!(stats.total_books, 2);
        assert_eq!(stats.total_members, 1);
        assert_eq!(stats.active_lendings, 1);
        assert_eq!(stats.available_books, 1);
    }

    #[tokio::test]
    async fn test_recent_activity_is_capped_and_sorted_descending() {
        let api = FakeLibrary::new();
        let book = api.seed_book("Dune", "Herbert", 10);
        let member = api.seed_member("Alice", "a@x.com");
        for _ in 0..7 {
            api.lend_book(&book.id, &member.id).await.unwrap();
        }
        let store = loaded_store(&api).await;

        let feed = recent_activity(&store);
        assert_eq!(feed.len(), ACTIVITY_LIMIT);
        // The fake stamps strictly increasing timestamps, so the feed must
        // be newest-first.
        let stamps: Vec<&str> = feed.iter().map(|entry| entry.lent_on.as_str()).collect();
        let mut sorted = stamps.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(stamps, sorted);
    }

    #[tokio::test]
    async fn test_recent_activity_tags_returned_records() {
        let api = FakeLibrary::new();
        let book = api.seed_book("Dune", "Herbert", 2);
        let member = api.seed_member("Alice", "a@x.com");
        let first = api.lend_book(&book.id, &member.id).await.unwrap();
        api.lend_book(&book.id, &member.id).await.unwrap();
        api.return_book(&first.lending_id).await.unwrap();
        let store = loaded_store(&api).await;

        let feed = recent_activity(&store);
        assert_eq!(feed.len(), 2);
        // Second lend is newer, still out.
        assert_eq!(feed[0].kind, ActivityKind::Lent);
        assert_eq!(feed[0].headline(), "Book Lent");
        assert_eq!(feed[1].kind, ActivityKind::Returned);
        assert_eq!(feed[1].headline(), "Book Returned");
    }

    #[tokio::test]
    async fn test_failed_load_renders_domain_empty_state() {
        let api = FakeLibrary::new();
        api.seed_book("Dune", "Herbert", 2);
        api.set_fail_books(true);

        let mut store = LibraryStore::default();
        store.reload(&api, CollectionKind::Books).await.ok();

        match books_view(&store.books, "") {
            TableView::Empty(state) => {
                assert_eq!(state.title, "No books found");
                assert_eq!(state.hint, "Add your first book to get started");
            }
            TableView::Rows(_) => panic!("expected empty state, not stale rows"),
        }
    }

    #[test]
    fn test_unloaded_collections_show_loading() {
        let store = LibraryStore::default();
        match books_view(&store.books, "") {
            TableView::Empty(state) => assert_eq!(state.title, "Loading..."),
            TableView::Rows(_) => panic!("expected loading state"),
        }
    }
}
