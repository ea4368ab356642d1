//! HTTP capability used by the client: POST a JSON body, await a JSON body.

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::debug;

use crate::PredictError;

/// Shared HTTP session. Implementations must allow many outstanding
/// `post_json` calls at once.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: Value,
    ) -> Result<Value, PredictError>;

    /// Release the session. Later posts fail with [`PredictError::Closed`].
    fn close(&self);
}

/// [`Transport`] over a pooled `reqwest::Client`.
pub struct HttpTransport {
    client: RwLock<Option<reqwest::Client>>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Reuse a pre-built client (and its connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    fn client(&self) -> Result<reqwest::Client, PredictError> {
        self.client
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(PredictError::Closed)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: Value,
    ) -> Result<Value, PredictError> {
        let client = self.client()?;
        let resp = client
            .post(url)
            .headers(headers.clone())
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PredictError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn close(&self) {
        let client = self.client.write().unwrap_or_else(|e| e.into_inner()).take();
        if client.is_some() {
            debug!("closed HTTP session");
        }
    }
}
