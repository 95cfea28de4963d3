//! Remote service access split across logical submodules, one per entity,
//! over a shared HTTP client. The `LibraryApi` trait is the seam the store
//! and UI depend on so tests can swap the network out for an in-memory
//! stand-in.

mod books;
mod client;
mod lendings;
mod members;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::models::{Book, LendingRecord, Member};

pub use books::{create_book, delete_book, fetch_books};
pub use client::{ApiClient, RequestError};
pub use lendings::{fetch_lendings, lend_book, return_book};
pub use members::{create_member, delete_member, fetch_members};

/// The nine operations the lending service exposes to this client.
/// Object-safe so the application can hold an `Arc<dyn LibraryApi>`.
#[async_trait]
pub trait LibraryApi: Send + Sync {
    async fn fetch_books(&self) -> Result<Vec<Book>, RequestError>;
    async fn create_book(&self, title: &str, author: &str) -> Result<Book, RequestError>;
    async fn delete_book(&self, id: &str) -> Result<(), RequestError>;

    async fn fetch_members(&self) -> Result<Vec<Member>, RequestError>;
    async fn create_member(&self, name: &str, email: &str) -> Result<Member, RequestError>;
    async fn delete_member(&self, id: &str) -> Result<(), RequestError>;

    async fn fetch_lendings(&self) -> Result<Vec<LendingRecord>, RequestError>;
    async fn lend_book(
        &self,
        book_id: &str,
        member_id: &str,
    ) -> Result<LendingRecord, RequestError>;
    async fn return_book(&self, lending_id: &str) -> Result<LendingRecord, RequestError>;
}

#[async_trait]
impl LibraryApi for ApiClient {
    async fn fetch_books(&self) -> Result<Vec<Book>, RequestError> {
        books::fetch_books(self).await
    }

    async fn create_book(&self, title: &str, author: &str) -> Result<Book, RequestError> {
        books::create_book(self, title, author).await
    }

    async fn delete_book(&self, id: &str) -> Result<(), RequestError> {
        books::delete_book(self, id).await
    }

    async fn fetch_members(&self) -> Result<Vec<Member>, RequestError> {
        members::fetch_members(self).await
    }

    async fn create_member(&self, name: &str, email: &str) -> Result<Member, RequestError> {
        members::create_member(self, name, email).await
    }

    async fn delete_member(&self, id: &str) -> Result<(), RequestError> {
        members::delete_member(self, id).await
    }

    async fn fetch_lendings(&self) -> Result<Vec<LendingRecord>, RequestError> {
        lendings::fetch_lendings(self).await
    }

    async fn lend_book(
        &self,
        book_id: &str,
        member_id: &str,
    ) -> Result<LendingRecord, RequestError> {
        lendings::lend_book(self, book_id, member_id).await
    }

    async fn return_book(&self, lending_id: &str) -> Result<LendingRecord, RequestError> {
        lendings::return_book(self, lending_id).await
    }
}
