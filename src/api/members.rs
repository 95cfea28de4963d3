use serde_json::json;

use crate::models::Member;

use super::client::{ApiClient, RequestError};

/// Fetch every registered member.
pub async fn fetch_members(client: &ApiClient) -> Result<Vec<Member>, RequestError> {
    client.get_json("/members").await
}

/// Register a new member and echo the created record back.
pub async fn create_member(
    client: &ApiClient,
    name: &str,
    email: &str,
) -> Result<Member, RequestError> {
    client
        .post_json("/members", &json!({ "name": name, "email": email }))
        .await
}

/// Remove a member from the registry.
pub async fn delete_member(client: &ApiClient, id: &str) -> Result<(), RequestError> {
    client.delete(&format!("/members/{id}")).await
}
