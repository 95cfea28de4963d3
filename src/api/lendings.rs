use serde_json::json;

use crate::models::LendingRecord;

use super::client::{ApiClient, RequestError};

/// Fetch the complete lending history, returned records included.
pub async fn fetch_lendings(client: &ApiClient) -> Result<Vec<LendingRecord>, RequestError> {
    client.get_json("/lending/history").await
}

/// Lend a book to a member. The service rejects the call when the book has
/// no copies left, so the created record always starts without a return
/// timestamp.
pub async fn lend_book(
    client: &ApiClient,
    book_id: &str,
    member_id: &str,
) -> Result<LendingRecord, RequestError> {
    client
        .post_json(
            "/lending",
            &json!({ "bookId": book_id, "memberId": member_id }),
        )
        .await
}

/// Mark a lending as returned. Returning an already-returned record is a
/// no-op on the service side; the record comes back unchanged.
pub async fn return_book(
    client: &ApiClient,
    lending_id: &str,
) -> Result<LendingRecord, RequestError> {
    client
        .post_empty(&format!("/lending/returns/{lending_id}"))
        .await
}
