//! Async client for online prediction: bearer-token auth, payload chunking,
//! concurrent dispatch, ordered merge of per-instance scores.

mod client;
mod error;
mod response;
pub mod token;
pub mod transport;

pub use client::{ClientBuilder, PredictionClient};
pub use error::PredictError;
pub use response::ScoreVector;
pub use token::{CommandToken, StaticToken, TokenProvider};
pub use transport::{HttpTransport, Transport};

pub use mlengine_core::{EngineConfig, Instances};
