use arrow::datatypes::DataType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("unrecognized instances shape: {0}")]
    UnrecognizedShape(String),

    #[error("unsupported array type for instances: {0}")]
    UnsupportedArrayType(DataType),

    #[error("non-finite number at instance {0}")]
    NonFiniteNumber(usize),

    #[error("{0} must not be empty")]
    EmptyName(&'static str),
}
