//! The generic value carrier for answers and free-form metadata.
//!
//! Answers and `questionData` are held as [`serde_json::Value`]. Values are
//! replaced wholesale, never edited in place by the model.

use std::sync::Arc;

pub use serde_json::{Map, Value};

use crate::answer_type::{
    AnswerType, ArrayType, BaseType, BooleanType, IntegerType, NumberType, ObjectType, StringType,
};

/// Name of a value's JSON shape, used in error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The answer type implied by a value's shape when no descriptor is given.
///
/// Arrays take the narrowest base type that every element fits: integers
/// mixed with other numbers widen to `number`, and any other mix (or a
/// `null` element) falls back to `object`. An empty array is treated as an
/// array of strings. `null` implies nothing.
pub fn infer_answer_type(value: &Value) -> Option<Arc<dyn AnswerType>> {
    let inferred: Arc<dyn AnswerType> = match value {
        Value::Null => return None,
        Value::Bool(_) => Arc::new(BooleanType),
        Value::Number(n) if n.is_i64() || n.is_u64() => Arc::new(IntegerType),
        Value::Number(_) => Arc::new(NumberType),
        Value::String(_) => Arc::new(StringType),
        Value::Array(items) => Arc::new(ArrayType::new(common_base_type(items))),
        Value::Object(_) => Arc::new(ObjectType),
    };
    Some(inferred)
}

fn common_base_type(items: &[Value]) -> BaseType {
    let mut shapes = items.iter().map(BaseType::of);
    let Some(first) = shapes.next() else {
        return BaseType::String;
    };
    shapes
        .fold(first, |acc, next| match (acc, next) {
            (Some(a), Some(b)) if a == b => Some(a),
            (
                Some(BaseType::Integer | BaseType::Number),
                Some(BaseType::Integer | BaseType::Number),
            ) => Some(BaseType::Number),
            _ => Some(BaseType::Object),
        })
        .unwrap_or(BaseType::Object)
}
