//! The prediction client: one instance per logical session.
//!
//! ```no_run
//! # async fn demo() -> Result<(), mlengine_client::PredictError> {
//! use mlengine_client::{Instances, PredictionClient};
//! use serde_json::json;
//!
//! let client = PredictionClient::builder("my-project")
//!     .credentials("/etc/keys/sa.json")
//!     .build();
//! let instances = Instances::try_from(json!([[1.0, 2.0], [3.0, 4.0]]))?;
//! let _scores = client.predict("census", instances, Some("v1")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Dropping the client closes its HTTP session, on every exit path.

use std::sync::Arc;

use futures::future::join_all;
use mlengine_core::{EngineConfig, Instances, ModelRef, split_by_size};
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, info};

use crate::response::{ScoreVector, chunk_scores};
use crate::token::{CommandToken, TokenProvider};
use crate::transport::{HttpTransport, Transport};
use crate::PredictError;


pub struct ClientBuilder {
    project: String,
    credentials: Option<String>,
    config: EngineConfig,
    token: Option<Arc<dyn TokenProvider>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Service-account credential locator, handed to the default token provider.
    pub fn credentials(mut self, locator: impl Into<String>) -> Self {
        self.credentials = Some(locator.into());
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a pre-built token provider instead of `gcloud`.
    pub fn token_provider(mut self, token: Arc<dyn TokenProvider>) -> Self {
        self.token = Some(token);
        self
    }

    /// Use a pre-built HTTP session. It is closed when the client is dropped.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> PredictionClient {
        let token = self
            .token
            .unwrap_or_else(|| Arc::new(CommandToken::gcloud(self.credentials.clone())));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));
        PredictionClient {
            project: self.project,
            credentials: self.credentials,
            config: self.config,
            headers: default_headers(),
            token,
            transport,
        }
    }
}

/// Client for the online prediction endpoint of one project.
pub struct PredictionClient {
    project: String,
    credentials: Option<String>,
    config: EngineConfig,
    /// Sent with every request, alongside `Authorization`.
    headers: HeaderMap,
    token: Arc<dyn TokenProvider>,
    transport: Arc<dyn Transport>,
}

impl PredictionClient {
    pub fn builder(project: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            project: project.into(),
            credentials: None,
            config: EngineConfig::default(),
            token: None,
            transport: None,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn credentials(&self) -> Option<&str> {
        self.credentials.as_deref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Request predictions for `instances` from `model_name` (default version
    /// when `version` is `None`).
    ///
    /// Instances are split into size-bounded chunks which are posted
    /// concurrently; the returned score vectors line up with the input order.
    /// Any failed chunk fails the whole call.
    pub async fn predict(
        &self,
        model_name: &str,
        instances: Instances,
        version: Option<&str>,
    ) -> Result<Vec<ScoreVector>, PredictError> {
        let model = ModelRef::new(&self.project, model_name, version.map(str::to_string))?;
        let batch = instances.normalize()?;
        let total = batch.instances.len();
        let chunks = split_by_size(batch.instances, self.config.max_payload_bytes)?;
        if chunks.is_empty() {
            debug!(model = %model.resource_name(), "no instances, skipping request");
            return Ok(Vec::new());
        }

        let url = model.predict_url(&self.config.base_url);
        let token = self.token.get().await?;
        let headers = self.request_headers(&token)?;

        info!(
            model = %model.resource_name(),
            instances = total,
            chunks = chunks.len(),
            "requesting predictions"
        );
        let requests = chunks.iter().enumerate().map(|(i, chunk)| {
            debug!(chunk = i, instances = chunk.len(), bytes = chunk.bytes, "posting chunk");
            self.transport
                .post_json(&url, &headers, chunk.body(&batch.extra))
        });
        let responses = join_all(requests).await;

        let mut scores = Vec::with_capacity(total);
        for (chunk, response) in chunks.iter().zip(responses) {
            scores.extend(chunk_scores(response?, chunk.len())?);
        }
        info!(predictions = scores.len(), "predictions complete");
        Ok(scores)
    }

    /// Like [`predict`](Self::predict), taking instances as raw JSON: either
    /// an object with an `instances` key or an array of instances.
    pub async fn predict_json(
        &self,
        model_name: &str,
        instances: Value,
        version: Option<&str>,
    ) -> Result<Vec<ScoreVector>, PredictError> {
        let instances = Instances::try_from(instances)?;
        self.predict(model_name, instances, version).await
    }

    /// End the session now. Equivalent to dropping the client.
    pub fn close(self) {}

    fn request_headers(&self, token: &str) -> Result<HeaderMap, PredictError> {
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(PredictError::auth)?;
        bearer.set_sensitive(true);
        let mut headers = self.headers.clone();
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }
}

impl Drop for PredictionClient {
    fn drop(&mut self) {
        debug!(project = %self.project, "closing prediction client");
        self.transport.close();
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
    headers
}
