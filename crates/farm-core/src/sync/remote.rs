//! Remote database seam and its PostgREST implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Remote API error: {message}")]
    Api { status: u16, message: String },
    #[error("Invalid queued payload: {0}")]
    InvalidPayload(String),
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Collection-oriented remote database.
///
/// Payloads arrive with keys already in the remote (snake_case) layout.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn insert(&self, collection: &str, payload: &Value) -> RemoteResult<()>;
    async fn update(&self, collection: &str, id: &str, payload: &Value) -> RemoteResult<()>;
    async fn delete(&self, collection: &str, id: &str) -> RemoteResult<()>;
}

/// Supabase/PostgREST client writing to `{url}/rest/v1/{collection}`.
#[derive(Clone)]
pub struct PostgrestRemoteStore {
    rest_url: String,
    anon_key: String,
    access_token: Option<String>,
    client: Client,
}

impl fmt::Debug for PostgrestRemoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgrestRemoteStore")
            .field("rest_url", &self.rest_url)
            .field("anon_key", &"<redacted>")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish_non_exhaustive()
    }
}

impl PostgrestRemoteStore {
    pub fn new(
        url: impl AsRef<str>,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> RemoteResult<Self> {
        let rest_url = normalize_rest_url(url.as_ref())?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(RemoteError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            rest_url,
            anon_key,
            access_token: None,
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    /// Authenticate writes as a signed-in user instead of the anon role.
    #[must_use]
    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        self
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.rest_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

#[async_trait]
impl RemoteStore for PostgrestRemoteStore {
    async fn insert(&self, collection: &str, payload: &Value) -> RemoteResult<()> {
        // Upsert on the primary key so a replayed create does not conflict.
        let request = self
            .authorize(self.client.post(self.collection_url(collection)))
            .header("Prefer", "return=minimal,resolution=merge-duplicates")
            .json(payload);
        check_response(request.send().await?).await
    }

    async fn update(&self, collection: &str, id: &str, payload: &Value) -> RemoteResult<()> {
        let request = self
            .authorize(self.client.patch(self.collection_url(collection)))
            .header("Prefer", "return=minimal")
            .query(&[("id", format!("eq.{id}"))])
            .json(payload);
        check_response(request.send().await?).await
    }

    async fn delete(&self, collection: &str, id: &str) -> RemoteResult<()> {
        let request = self
            .authorize(self.client.delete(self.collection_url(collection)))
            .header("Prefer", "return=minimal")
            .query(&[("id", format!("eq.{id}"))]);
        check_response(request.send().await?).await
    }
}

/// Accepts a bare project URL or one already ending in `/rest/v1`.
pub fn normalize_rest_url(url: &str) -> RemoteResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(RemoteError::InvalidConfiguration(
            "Supabase URL must not be empty",
        ));
    }
    if !crate::util::is_http_url(trimmed) {
        return Err(RemoteError::InvalidConfiguration(
            "Supabase URL must include http:// or https://",
        ));
    }
    if trimmed.ends_with("/rest/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/rest/v1"))
    }
}

async fn check_response(response: Response) -> RemoteResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Api {
        status: status.as_u16(),
        message: parse_api_error(status, &body),
    })
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorResponse {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorResponse>(body) {
        if let Some(message) = payload.message.or(payload.details).or(payload.hint) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
