pub mod chunk;
pub mod config;
mod error;
pub mod instances;
pub mod model;

pub use chunk::{Chunk, split_by_size};
pub use config::{BASE_URL, EngineConfig, MAX_PAYLOAD_BYTES};
pub use error::InputError;
pub use instances::{InstanceBatch, Instances};
pub use model::ModelRef;
