//! In-memory mirror of the server-owned collections. The service is the
//! source of truth: every state change on the client is followed by a full
//! re-fetch of the affected collections, so the mirror is always a snapshot
//! and never independently derived. There is no per-item patching.

use crate::api::{LibraryApi, RequestError};
use crate::models::{Book, LendingRecord, Member};

/// The three server-owned collections the client mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Books,
    Members,
    Lendings,
}

/// Mutations the client can issue against the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    AddBook,
    DeleteBook,
    AddMember,
    DeleteMember,
    Lend,
    Return,
}

impl Mutation {
    /// Consistency table: the collections that must be re-fetched once a
    /// mutation commits. Lend and return change book quantity and
    /// availability on the service side, so both collections reload.
    pub fn affected(self) -> &'static [CollectionKind] {
        match self {
            Mutation::AddBook | Mutation::DeleteBook => &[CollectionKind::Books],
            Mutation::AddMember | Mutation::DeleteMember => &[CollectionKind::Members],
            Mutation::Lend | Mutation::Return => {
                &[CollectionKind::Lendings, CollectionKind::Books]
            }
        }
    }
}

/// Load status of a mirrored collection. A failed reload clears the data
/// wholesale so renderers fall back to the empty-state message instead of
/// showing stale rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded,
    Failed,
}

/// One mirrored collection plus its load status.
#[derive(Debug)]
pub struct Collection<T> {
    items: Vec<T>,
    state: LoadState,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::default(),
        }
    }
}

impl<T> Collection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the whole collection with a fetch result. Failures empty the
    /// collection and hand the error back for notification.
    fn apply(&mut self, result: Result<Vec<T>, RequestError>) -> Result<(), RequestError> {
        match result {
            Ok(items) => {
                self.items = items;
                self.state = LoadState::Loaded;
                Ok(())
            }
            Err(err) => {
                self.items.clear();
                self.state = LoadState::Failed;
                Err(err)
            }
        }
    }
}

/// Snapshot mirror of the remote service, reloaded collection-by-collection.
#[derive(Default)]
pub struct LibraryStore {
    pub books: Collection<Book>,
    pub members: Collection<Member>,
    pub lendings: Collection<LendingRecord>,
}

impl LibraryStore {
    /// Replace one collection with the latest server snapshot.
    pub async fn reload(
        &mut self,
        api: &dyn LibraryApi,
        kind: CollectionKind,
    ) -> Result<(), RequestError> {
        match kind {
            CollectionKind::Books => {
                let result = api.fetch_books().await;
                self.books.apply(result)
            }
            CollectionKind::Members => {
                let result = api.fetch_members().await;
                self.members.apply(result)
            }
            CollectionKind::Lendings => {
                let result = api.fetch_lendings().await;
                self.lendings.apply(result)
            }
        }
    }

    /// Re-fetch every collection the mutation may have touched, in table
    /// order. A failed reload does not stop the remaining ones; the first
    /// error is reported for notification.
    pub async fn reload_after(
        &mut self,
        api: &dyn LibraryApi,
        mutation: Mutation,
    ) -> Result<(), RequestError> {
        let mut first_error = None;
        for kind in mutation.affected() {
            if let Err(err) = self.reload(api, *kind).await {
                tracing::warn!(?kind, error = %err, "reload after mutation failed");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Issue all three fetches concurrently and apply whatever comes back,
    /// one collection at a time. A failing collection never blocks the
    /// others from loading.
    pub async fn reload_all(&mut self, api: &dyn LibraryApi) -> Result<(), RequestError> {
        let (books, members, lendings) = tokio::join!(
            api.fetch_books(),
            api.fetch_members(),
            api.fetch_lendings()
        );

        let mut first_error = None;
        if let Err(err) = self.books.apply(books) {
            first_error.get_or_insert(err);
        }
        if let Err(err) = self.members.apply(members) {
            first_error.get_or_insert(err);
        }
        if let Err(err) = self.lendings.apply(lendings) {
            first_error.get_or_insert(err);
        }
        match first_error {
            Some(err) => {
                tracing::warn!(error = %err, "initial load incomplete");
                Err(err)
            }
            None => Ok(()),
        }
    }
}
