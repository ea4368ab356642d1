//! Decoding of `:predict` response bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::PredictError;

/// Per-instance prediction output.
pub type ScoreVector = Vec<f64>;

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predictions: Option<Vec<Prediction>>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    scores: ScoreVector,
}

/// Pull the `scores` of every prediction out of one chunk's response.
///
/// `expected` is the number of instances sent; any other count would shift
/// later scores onto the wrong instances, so it is an error.
pub(crate) fn chunk_scores(body: Value, expected: usize) -> Result<Vec<ScoreVector>, PredictError> {
    let resp: PredictResponse = serde_json::from_value(body)?;
    if let Some(message) = resp.error {
        return Err(PredictError::Service(message));
    }
    let predictions = resp
        .predictions
        .ok_or_else(|| PredictError::Response("missing `predictions`".into()))?;
    if predictions.len() != expected {
        return Err(PredictError::Response(format!(
            "expected {expected} predictions, got {}",
            predictions.len()
        )));
    }
    Ok(predictions.into_iter().map(|p| p.scores).collect())
}
