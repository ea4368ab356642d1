use mlengine_core::InputError;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("token provider failed: {0}")]
    Auth(BoxError),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("prediction service error: {0}")]
    Service(String),
    #[error("malformed prediction response: {0}")]
    Response(String),
    #[error("HTTP session is closed")]
    Closed,
}

impl PredictError {
    pub fn auth(err: impl Into<BoxError>) -> Self {
        PredictError::Auth(err.into())
    }
}
