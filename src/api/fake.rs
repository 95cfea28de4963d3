//! In-memory stand-in for the lending service, used by store and UI tests.
//! It mirrors the server's observable semantics: lend validates
//! availability, stamps the lend time, and decrements the quantity; return
//! stamps the return time and restores it; returning an already-returned
//! record is a no-op success. Timestamps come from a monotonic counter so
//! ordering assertions are deterministic.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::models::{Book, LendingRecord, Member};

use super::{LibraryApi, RequestError};

#[derive(Default)]
struct FakeState {
    books: Vec<Book>,
    members: Vec<Member>,
    lendings: Vec<LendingRecord>,
    next_id: u32,
    clock: u32,
    fail_books: bool,
    fail_members: bool,
    fail_lendings: bool,
    book_fetches: u32,
    member_fetches: u32,
    lending_fetches: u32,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn next_timestamp(&mut self) -> String {
        self.clock += 1;
        format!("2026-03-01 09:{:02}:00", self.clock)
    }
}

pub(crate) struct FakeLibrary {
    state: Mutex<FakeState>,
}

impl FakeLibrary {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
        }
    }

    pub(crate) fn seed_book(&self, title: &str, author: &str, quantity: u32) -> Book {
        let mut state = self.state.lock().unwrap();
        let book = Book {
            id: state.next_id("b"),
            title: title.to_string(),
            author: author.to_string(),
            available: quantity > 0,
            quantity,
        };
        state.books.push(book.clone());
        book
    }

    pub(crate) fn seed_member(&self, name: &str, email: &str) -> Member {
        let mut state = self.state.lock().unwrap();
        let member = Member {
            id: state.next_id("m"),
            name: name.to_string(),
            email: email.to_string(),
        };
        state.members.push(member.clone());
        member
    }

    pub(crate) fn set_fail_books(&self, fail: bool) {
        self.state.lock().unwrap().fail_books = fail;
    }

    pub(crate) fn set_fail_members(&self, fail: bool) {
        self.state.lock().unwrap().fail_members = fail;
    }

    pub(crate) fn set_fail_lendings(&self, fail: bool) {
        self.state.lock().unwrap().fail_lendings = fail;
    }

    /// `(books, members, lendings)` fetch counters, for asserting which
    /// collections a mutation reloaded.
    pub(crate) fn fetch_counts(&self) -> (u32, u32, u32) {
        let state = self.state.lock().unwrap();
        (
            state.book_fetches,
            state.member_fetches,
            state.lending_fetches,
        )
    }

    pub(crate) fn lending_count(&self) -> usize {
        self.state.lock().unwrap().lendings.len()
    }
}

fn unavailable(status: StatusCode, message: impl Into<String>) -> RequestError {
    RequestError::Api {
        status,
        message: message.into(),
    }
}

#[async_trait]
impl LibraryApi for FakeLibrary {
    async fn fetch_books(&self) -> Result<Vec<Book>, RequestError> {
        let mut state = self.state.lock().unwrap();
        state.book_fetches += 1;
        if state.fail_books {
            return Err(unavailable(
                StatusCode::INTERNAL_SERVER_ERROR,
                "book service unavailable",
            ));
        }
        Ok(state.books.clone())
    }

    async fn create_book(&self, title: &str, author: &str) -> Result<Book, RequestError> {
        let mut state = self.state.lock().unwrap();
        let book = Book {
            id: state.next_id("b"),
            title: title.to_string(),
            author: author.to_string(),
            available: true,
            quantity: 1,
        };
        state.books.push(book.clone());
        Ok(book)
    }

    async fn delete_book(&self, id: &str) -> Result<(), RequestError> {
        let mut state = self.state.lock().unwrap();
        let before = state.books.len();
        state.books.retain(|book| book.id != id);
        if state.books.len() == before {
            return Err(unavailable(
                StatusCode::NOT_FOUND,
                format!("Book not found with ID: {id}"),
            ));
        }
        Ok(())
    }

    async fn fetch_members(&self) -> Result<Vec<Member>, RequestError> {
        let mut state = self.state.lock().unwrap();
        state.member_fetches += 1;
        if state.fail_members {
            return Err(unavailable(
                StatusCode::INTERNAL_SERVER_ERROR,
                "member service unavailable",
            ));
        }
        Ok(state.members.clone())
    }

    async fn create_member(&self, name: &str, email: &str) -> Result<Member, RequestError> {
        let mut state = self.state.lock().unwrap();
        let member = Member {
            id: state.next_id("m"),
            name: name.to_string(),
            email: email.to_string(),
        };
        state.members.push(member.clone());
        Ok(member)
    }

    async fn delete_member(&self, id: &str) -> Result<(), RequestError> {
        let mut state = self.state.lock().unwrap();
        let before = state.members.len();
        state.members.retain(|member| member.id != id);
        if state.members.len() == before {
            return Err(unavailable(
                StatusCode::NOT_FOUND,
                format!("Member not found with ID: {id}"),
            ));
        }
        Ok(())
    }

    async fn fetch_lendings(&self) -> Result<Vec<LendingRecord>, RequestError> {
        let mut state = self.state.lock().unwrap();
        state.lending_fetches += 1;
        if state.fail_lendings {
            return Err(unavailable(
                StatusCode::INTERNAL_SERVER_ERROR,
                "lending service unavailable",
            ));
        }
        Ok(state.lendings.clone())
    }

    async fn lend_book(
        &self,
        book_id: &str,
        member_id: &str,
    ) -> Result<LendingRecord, RequestError> {
        let mut state = self.state.lock().unwrap();

        if !state.members.iter().any(|member| member.id == member_id) {
            return Err(unavailable(
                StatusCode::NOT_FOUND,
                format!("Member not found with ID: {member_id}"),
            ));
        }

        let Some(book_idx) = state.books.iter().position(|book| book.id == book_id) else {
            return Err(unavailable(
                StatusCode::NOT_FOUND,
                format!("Book not found with ID: {book_id}"),
            ));
        };
        if !state.books[book_idx].available {
            return Err(unavailable(
                StatusCode::BAD_REQUEST,
                format!("Book is not available for lending. Book ID: {book_id}"),
            ));
        }

        let record = LendingRecord {
            lending_id: state.next_id("l"),
            book_id: book_id.to_string(),
            member_id: member_id.to_string(),
            lending_date: state.next_timestamp(),
            return_date: None,
        };
        state.lendings.push(record.clone());

        let book = &mut state.books[book_idx];
        book.quantity -= 1;
        book.available = book.quantity > 0;

        Ok(record)
    }

    async fn return_book(&self, lending_id: &str) -> Result<LendingRecord, RequestError> {
        let mut state = self.state.lock().unwrap();

        let Some(record_idx) = state
            .lendings
            .iter()
            .position(|record| record.lending_id == lending_id)
        else {
            return Err(unavailable(
                StatusCode::NOT_FOUND,
                format!("Lending not found with ID: {lending_id}"),
            ));
        };

        if state.lendings[record_idx].return_date.is_some() {
            return Ok(state.lendings[record_idx].clone());
        }

        let stamp = state.next_timestamp();
        state.lendings[record_idx].return_date = Some(stamp);
        let book_id = state.lendings[record_idx].book_id.clone();
        let record = state.lendings[record_idx].clone();

        if let Some(book) = state.books.iter_mut().find(|book| book.id == book_id) {
            book.quantity += 1;
            book.available = true;
        }

        Ok(record)
    }
}
