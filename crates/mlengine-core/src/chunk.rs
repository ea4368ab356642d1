//! Size-bounded splitting of an instance list into request bodies.
//!
//! Each instance is sized independently as its compact JSON encoding. The
//! list is walked once; an instance joins the open chunk while the running
//! total stays strictly below the ceiling, otherwise the open chunk is closed
//! and a new one starts with that instance. An instance that alone reaches the
//! ceiling becomes a singleton chunk; it is never split or rejected.

use serde_json::{Map, Value};
use tracing::debug;

/// A contiguous run of instances sent as one request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    pub instances: Vec<Value>,
    /// Sum of the serialized sizes of `instances`.
    pub bytes: usize,
}

impl Chunk {
    fn push(&mut self, instance: Value, size: usize) {
        self.instances.push(instance);
        self.bytes += size;
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Request body `{"instances": [...]}`, with `extra` fields merged in.
    pub fn body(&self, extra: &Map<String, Value>) -> Value {
        let mut body = extra.clone();
        body.insert("instances".into(), Value::Array(self.instances.clone()));
        Value::Object(body)
    }
}

/// Split `instances` into order-preserving chunks bounded by `ceiling` bytes.
///
/// Never yields an empty chunk, so an empty input yields no chunks.
pub fn split_by_size(
    instances: Vec<Value>,
    ceiling: usize,
) -> Result<Vec<Chunk>, serde_json::Error> {
    let mut chunks = Vec::new();
    let mut current = Chunk::default();

    for instance in instances {
        let size = serde_json::to_vec(&instance)?.len();
        if size >= ceiling {
            debug!(bytes = size, ceiling, "instance exceeds payload ceiling, sending it alone");
        }
        if current.bytes + size >= ceiling && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(instance, size);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    Ok(chunks)
}
