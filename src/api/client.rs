use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// The single failure signal raised by every outbound call. Callers present
/// the `Display` text to the user; nothing retries.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request never produced an HTTP response (connection refused,
    /// DNS failure, timeout).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-success status. `message` carries the
    /// `error` field from the response body when present, otherwise a bare
    /// `HTTP <code>` line.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    /// The response arrived but its body was not the expected JSON shape.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Thin wrapper over `reqwest::Client` bound to the service base address.
/// All endpoint modules go through the helpers here so error normalization
/// happens in exactly one place.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the given base address. Trailing slashes are
    /// stripped once here so endpoint paths can always start with `/`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        self.request(Method::GET, path, None).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, RequestError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// POST without a payload, for endpoints addressed purely by path.
    pub(crate) async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, RequestError> {
        self.request(Method::POST, path, None).await
    }

    /// DELETE, discarding whatever body the service sends back.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), RequestError> {
        let url = self.url(path);
        self.send(Method::DELETE, &url, None).await?;
        Ok(())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, RequestError> {
        let url = self.url(path);
        let response = self.send(method, &url, body).await?;
        response
            .json()
            .await
            .map_err(|source| RequestError::Decode { url, source })
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, RequestError> {
        tracing::debug!(%method, url, "issuing request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| RequestError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let payload = response.text().await.unwrap_or_default();
        let message = extract_error_message(status, &payload);
        tracing::warn!(url, %status, %message, "request rejected");
        Err(RequestError::Api { status, message })
    }
}

/// Pull the human-readable message out of an error payload. The service
/// wraps failures as `{"error": "...", "timestamp": ...}`; anything else
/// (HTML error pages, empty bodies) degrades to the status code.
fn extract_error_message(status: StatusCode, payload: &str) -> String {
    serde_json::from_str::<Value>(payload)
        .ok()
        .and_then(|body| {
            body.get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
