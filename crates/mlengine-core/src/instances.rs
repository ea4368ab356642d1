//! The accepted shapes of prediction input and their normalization into a
//! flat, ordered list of JSON instances.
//!
//! Three shapes are accepted:
//! - a wrapper object that already carries an `instances` key
//!   (`{"instances": [...], "signature_name": "..."}`)
//! - a plain sequence of instances
//! - an Arrow numeric array, converted row by row into (nested) number lists;
//!   integer, float (16/32/64 bit) and boolean arrays are accepted

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float16Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type,
    UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use serde_json::{Map, Number, Value};

use crate::InputError;

const INSTANCES_KEY: &str = "instances";

/// Prediction input in one of the three accepted shapes.
#[derive(Debug, Clone)]
pub enum Instances {
    /// An object holding an `instances` key. Other keys are forwarded with every request.
    Wrapped(Map<String, Value>),
    Sequence(Vec<Value>),
    Array(ArrayRef),
}

/// Normalized input: instances in order plus any extra request-body fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceBatch {
    pub instances: Vec<Value>,
    pub extra: Map<String, Value>,
}

impl Instances {
    pub fn normalize(self) -> Result<InstanceBatch, InputError> {
        match self {
            Instances::Wrapped(mut fields) => match fields.remove(INSTANCES_KEY) {
                Some(Value::Array(instances)) => Ok(InstanceBatch {
                    instances,
                    extra: fields,
                }),
                Some(other) => Err(InputError::UnrecognizedShape(format!(
                    "`instances` must be an array, got {}",
                    kind(&other)
                ))),
                None => Err(InputError::UnrecognizedShape(
                    "object without an `instances` key".into(),
                )),
            },
            Instances::Sequence(instances) => Ok(InstanceBatch {
                instances,
                extra: Map::new(),
            }),
            Instances::Array(array) => Ok(InstanceBatch {
                instances: array_rows(array.as_ref())?,
                extra: Map::new(),
            }),
        }
    }
}

impl TryFrom<Value> for Instances {
    type Error = InputError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) if fields.contains_key(INSTANCES_KEY) => {
                Ok(Instances::Wrapped(fields))
            }
            Value::Array(items) => Ok(Instances::Sequence(items)),
            other => Err(InputError::UnrecognizedShape(kind(&other).into())),
        }
    }
}

impl From<Vec<Value>> for Instances {
    fn from(instances: Vec<Value>) -> Self {
        Instances::Sequence(instances)
    }
}

impl From<ArrayRef> for Instances {
    fn from(array: ArrayRef) -> Self {
        Instances::Array(array)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object without an `instances` key",
    }
}

/// One JSON value per top-level row of `array`.
fn array_rows(array: &dyn Array) -> Result<Vec<Value>, InputError> {
    (0..array.len()).map(|i| cell(array, i, i)).collect()
}

/// Convert element `i` of `array`; `row` is the top-level instance index for errors.
fn cell(array: &dyn Array, i: usize, row: usize) -> Result<Value, InputError> {
    if array.is_null(i) {
        return Ok(Value::Null);
    }
    let value = match array.data_type() {
        DataType::Int8 => Value::from(array.as_primitive::<Int8Type>().value(i)),
        DataType::Int16 => Value::from(array.as_primitive::<Int16Type>().value(i)),
        DataType::Int32 => Value::from(array.as_primitive::<Int32Type>().value(i)),
        DataType::Int64 => Value::from(array.as_primitive::<Int64Type>().value(i)),
        DataType::UInt8 => Value::from(array.as_primitive::<UInt8Type>().value(i)),
        DataType::UInt16 => Value::from(array.as_primitive::<UInt16Type>().value(i)),
        DataType::UInt32 => Value::from(array.as_primitive::<UInt32Type>().value(i)),
        DataType::UInt64 => Value::from(array.as_primitive::<UInt64Type>().value(i)),
        DataType::Boolean => Value::Bool(array.as_boolean().value(i)),
        DataType::Float16 => float(array.as_primitive::<Float16Type>().value(i).to_f64(), row)?,
        DataType::Float32 => float(array.as_primitive::<Float32Type>().value(i) as f64, row)?,
        DataType::Float64 => float(array.as_primitive::<Float64Type>().value(i), row)?,
        DataType::List(_) => nested(array.as_list::<i32>().value(i).as_ref(), row)?,
        DataType::LargeList(_) => nested(array.as_list::<i64>().value(i).as_ref(), row)?,
        DataType::FixedSizeList(_, _) => nested(array.as_fixed_size_list().value(i).as_ref(), row)?,
        other => return Err(InputError::UnsupportedArrayType(other.clone())),
    };
    Ok(value)
}

fn nested(values: &dyn Array, row: usize) -> Result<Value, InputError> {
    (0..values.len())
        .map(|j| cell(values, j, row))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn float(v: f64, row: usize) -> Result<Value, InputError> {
    Number::from_f64(v)
        .map(Value::Number)
        .ok_or(InputError::NonFiniteNumber(row))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{
        BooleanArray, FixedSizeListArray, Float32Array, Float64Array, Int64Array, ListArray,
        StringArray,
    };
    use arrow::compute::cast;
    use arrow::datatypes::Field;
    use serde_json::json;

    use super::*;

    #[test]
    fn three_shapes_normalize_identically() {
        let wrapped = Instances::try_from(json!({"instances": [[1.0, 2.0], [3.0, 4.0]]})).unwrap();
        let sequence = Instances::from(vec![json!([1.0, 2.0]), json!([3.0, 4.0])]);
        let values = Float64Array::from(vec![1.0, 2.0, 3.0, 4.0]);
        let array = FixedSizeListArray::new(
            Arc::new(Field::new("item", DataType::Float64, false)),
            2,
            Arc::new(values),
            None,
        );
        let array = Instances::from(Arc::new(array) as ArrayRef);

        let wrapped = wrapped.normalize().unwrap();
        assert_eq!(wrapped, sequence.normalize().unwrap());
        assert_eq!(wrapped, array.normalize().unwrap());
        assert_eq!(wrapped.instances, vec![json!([1.0, 2.0]), json!([3.0, 4.0])]);
    }

    #[test]
    fn wrapper_keeps_extra_fields() {
        let batch = Instances::try_from(json!({
            "instances": [{"x": 1}],
            "signature_name": "serving_default"
        }))
        .unwrap()
        .normalize()
        .unwrap();
        assert_eq!(batch.instances, vec![json!({"x": 1})]);
        assert_eq!(batch.extra["signature_name"], "serving_default");
        assert!(!batch.extra.contains_key("instances"));
    }

    #[test]
    fn plain_string_is_unrecognized() {
        let err = Instances::try_from(json!("not instances")).unwrap_err();
        assert!(matches!(err, InputError::UnrecognizedShape(_)));
        assert_eq!(err.to_string(), "unrecognized instances shape: string");
    }

    #[test]
    fn object_without_instances_key_is_unrecognized() {
        let err = Instances::try_from(json!({"inputs": [1, 2]})).unwrap_err();
        assert!(matches!(err, InputError::UnrecognizedShape(_)));
    }

    #[test]
    fn wrapper_with_non_array_instances_fails_on_normalize() {
        let instances = Instances::try_from(json!({"instances": 5})).unwrap();
        let err = instances.normalize().unwrap_err();
        assert!(err.to_string().contains("`instances` must be an array"));
    }

    #[test]
    fn flat_integer_array_becomes_numbers() {
        let array: ArrayRef = Arc::new(Int64Array::from(vec![Some(7), None, Some(-2)]));
        let batch = Instances::from(array).normalize().unwrap();
        assert_eq!(batch.instances, vec![json!(7), Value::Null, json!(-2)]);
    }

    #[test]
    fn variable_length_lists_are_nested() {
        let array = ListArray::from_iter_primitive::<Int64Type, _, _>(vec![
            Some(vec![Some(1), Some(2), Some(3)]),
            Some(vec![Some(4)]),
        ]);
        let batch = Instances::from(Arc::new(array) as ArrayRef)
            .normalize()
            .unwrap();
        assert_eq!(batch.instances, vec![json!([1, 2, 3]), json!([4])]);
    }

    #[test]
    fn boolean_array_becomes_bools() {
        let array: ArrayRef = Arc::new(BooleanArray::from(vec![Some(true), None, Some(false)]));
        let batch = Instances::from(array).normalize().unwrap();
        assert_eq!(batch.instances, vec![json!(true), Value::Null, json!(false)]);
    }

    #[test]
    fn half_precision_floats_widen_to_f64() {
        let array = cast(&Float32Array::from(vec![0.5f32, -2.0]), &DataType::Float16).unwrap();
        let batch = Instances::from(array).normalize().unwrap();
        assert_eq!(batch.instances, vec![json!(0.5), json!(-2.0)]);
    }

    #[test]
    fn half_precision_nan_is_rejected() {
        let array = cast(&Float32Array::from(vec![f32::NAN]), &DataType::Float16).unwrap();
        let err = Instances::from(array).normalize().unwrap_err();
        assert!(matches!(err, InputError::NonFiniteNumber(0)));
    }

    #[test]
    fn nan_is_rejected_with_row_index() {
        let array: ArrayRef = Arc::new(Float32Array::from(vec![1.0, f32::NAN]));
        let err = Instances::from(array).normalize().unwrap_err();
        assert!(matches!(err, InputError::NonFiniteNumber(1)));
    }

    #[test]
    fn string_array_is_unsupported() {
        let array: ArrayRef = Arc::new(StringArray::from(vec!["a", "b"]));
        let err = Instances::from(array).normalize().unwrap_err();
        assert!(matches!(err, InputError::UnsupportedArrayType(DataType::Utf8)));
    }
}
