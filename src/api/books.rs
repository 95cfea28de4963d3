use serde_json::json;

use crate::models::Book;

use super::client::{ApiClient, RequestError};

/// Fetch the full book catalog.
pub async fn fetch_books(client: &ApiClient) -> Result<Vec<Book>, RequestError> {
    client.get_json("/books").await
}

/// Register a new title. The service assigns the identifier, the initial
/// quantity, and the availability flag; the created book is echoed back.
pub async fn create_book(
    client: &ApiClient,
    title: &str,
    author: &str,
) -> Result<Book, RequestError> {
    client
        .post_json("/books", &json!({ "title": title, "author": author }))
        .await
}

/// Remove a book from the catalog entirely.
pub async fn delete_book(client: &ApiClient, id: &str) -> Result<(), RequestError> {
    client.delete(&format!("/books/{id}")).await
}
