//! Engine-wide settings shared by every prediction request.

use serde::Deserialize;

/// Public endpoint of the online prediction service.
pub const BASE_URL: &str = "https://ml.googleapis.com/v1";

/// Target ceiling for the serialized size of one request's instances (1.5 MiB).
pub const MAX_PAYLOAD_BYTES: usize = 1_572_864;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub max_payload_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            max_payload_bytes: MAX_PAYLOAD_BYTES,
        }
    }
}

impl EngineConfig {
    /// Point requests at a different endpoint, e.g. a local mock.
    ///
    /// `base_url` should be like `http://localhost:8080/v1`; a trailing slash is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_payload_bytes(mut self, bytes: usize) -> Self {
        self.max_payload_bytes = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_public_endpoint() {
        let config = EngineConfig::default();
        assert_eq!(config.base_url, "https://ml.googleapis.com/v1");
        assert_eq!(config.max_payload_bytes, 1_572_864);
    }

    #[test]
    fn with_base_url_trims_trailing_slash() {
        let config = EngineConfig::default().with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"max_payload_bytes": 1024}"#).unwrap();
        assert_eq!(config.base_url, BASE_URL);
        assert_eq!(config.max_payload_bytes, 1024);
    }
}
