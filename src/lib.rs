//! Core library surface for the lending-desk TUI client.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces: the typed API client, the snapshot store, and the pure view
//! models the terminal renders from.

pub mod api;
pub mod models;
pub mod store;
pub mod ui;
pub mod views;

/// Remote-access layer: the HTTP client, the trait seam over it, and the
/// single error kind every call can raise.
pub use api::{ApiClient, LibraryApi, RequestError};

/// The three domain types mirrored from the service.
pub use models::{Book, LendingRecord, Member};

/// The snapshot mirror plus the mutation consistency table.
pub use store::{CollectionKind, LibraryStore, Mutation};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
