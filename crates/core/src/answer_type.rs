//! Answer-type descriptors.
//!
//! A descriptor says how an answer value is written to the wire and how a
//! raw wire value is read back. The result tree only depends on the
//! [`AnswerType`] trait; the descriptors here are the built-in catalog that
//! [`AnswerTypeRegistry::with_builtins`](crate::registry::AnswerTypeRegistry::with_builtins)
//! installs.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::AnswerTypeError;
use crate::value::json_kind;

// ──────────────────────────────────────────────
// Trait
// ──────────────────────────────────────────────

/// Capability set of an answer-type descriptor.
pub trait AnswerType: fmt::Debug + Send + Sync {
    /// Discriminator written as the descriptor object's `type` field.
    fn type_name(&self) -> &str;

    /// Descriptor-specific fields written alongside `type`.
    fn descriptor_fields(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Transform an answer into its wire representation.
    ///
    /// Returns `Ok(None)` when there is nothing to write.
    fn encode_answer(&self, value: Option<&Value>) -> Result<Option<Value>, AnswerTypeError>;

    /// Interpret a raw wire value under this descriptor.
    fn decode_value(&self, raw: &Value) -> Result<Option<Value>, AnswerTypeError>;

    /// The descriptor as a tagged JSON object.
    fn to_json(&self) -> Value {
        let mut m = Map::new();
        m.insert("type".to_owned(), Value::String(self.type_name().to_owned()));
        m.extend(self.descriptor_fields());
        Value::Object(m)
    }
}

/// Two descriptors are the same when they encode to the same JSON.
pub fn same_answer_type(a: &dyn AnswerType, b: &dyn AnswerType) -> bool {
    a.type_name() == b.type_name() && a.descriptor_fields() == b.descriptor_fields()
}

fn encoding_error(type_name: &str, value: &Value, message: impl Into<String>) -> AnswerTypeError {
    AnswerTypeError::Encoding {
        type_name: type_name.to_owned(),
        found: json_kind(value).to_owned(),
        message: message.into(),
    }
}

fn decoding_error(type_name: &str, raw: &Value, message: impl Into<String>) -> AnswerTypeError {
    AnswerTypeError::Decoding {
        type_name: type_name.to_owned(),
        found: json_kind(raw).to_owned(),
        message: message.into(),
    }
}

fn optional_string_field(
    type_name: &str,
    fields: &Map<String, Value>,
    field: &str,
) -> Result<Option<String>, AnswerTypeError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(AnswerTypeError::MalformedDescriptor {
            type_name: type_name.to_owned(),
            message: format!("'{}' must be a string, got {}", field, json_kind(other)),
        }),
    }
}

// ──────────────────────────────────────────────
// Base types
// ──────────────────────────────────────────────

/// The JSON shape a scalar descriptor (or an array element) accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    Boolean,
    Integer,
    Number,
    String,
    Object,
}

impl BaseType {
    /// The base type matching a value's shape, if it has one.
    pub fn of(value: &Value) -> Option<BaseType> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(BaseType::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(BaseType::Integer),
            Value::Number(_) => Some(BaseType::Number),
            Value::String(_) => Some(BaseType::String),
            Value::Array(_) | Value::Object(_) => Some(BaseType::Object),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BaseType::Boolean => "boolean",
            BaseType::Integer => "integer",
            BaseType::Number => "number",
            BaseType::String => "string",
            BaseType::Object => "object",
        }
    }

    pub fn parse(name: &str) -> Option<BaseType> {
        match name {
            "boolean" => Some(BaseType::Boolean),
            "integer" => Some(BaseType::Integer),
            "number" => Some(BaseType::Number),
            "string" => Some(BaseType::String),
            "object" => Some(BaseType::Object),
            _ => None,
        }
    }

    /// Whether a value has this shape. Only `Object` accepts `null`.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            BaseType::Boolean => value.is_boolean(),
            BaseType::Integer => value.is_i64() || value.is_u64(),
            BaseType::Number => value.is_number(),
            BaseType::String => value.is_string(),
            BaseType::Object => true,
        }
    }

    /// Text form of an element inside a separated sequence.
    ///
    /// Object elements are written as JSON text so that strings keep their
    /// quotes and read back through [`BaseType::parse_piece`].
    fn render(self, value: &Value) -> String {
        match (self, value) {
            (BaseType::Object, other) => other.to_string(),
            (_, Value::String(s)) => s.clone(),
            (_, other) => other.to_string(),
        }
    }

    /// Inverse of [`BaseType::render`].
    fn parse_piece(self, piece: &str) -> Option<Value> {
        match self {
            BaseType::Boolean => piece.parse::<bool>().ok().map(Value::Bool),
            BaseType::Integer => parse_integer(piece),
            BaseType::Number => {
                if let Some(i) = parse_integer(piece) {
                    return Some(i);
                }
                let f = piece.parse::<f64>().ok()?;
                Number::from_f64(f).map(Value::Number)
            }
            BaseType::String => Some(Value::String(piece.to_owned())),
            BaseType::Object => serde_json::from_str(piece).ok(),
        }
    }
}

fn parse_integer(piece: &str) -> Option<Value> {
    if let Ok(i) = piece.parse::<i64>() {
        return Some(Value::from(i));
    }
    piece.parse::<u64>().ok().map(Value::from)
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn encode_scalar(
    type_name: &str,
    base: BaseType,
    value: Option<&Value>,
) -> Result<Option<Value>, AnswerTypeError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) if base.accepts(v) => Ok(Some(v.clone())),
        Some(v) => Err(encoding_error(type_name, v, format!("expected {}", base))),
    }
}

fn decode_scalar(
    type_name: &str,
    base: BaseType,
    raw: &Value,
) -> Result<Option<Value>, AnswerTypeError> {
    match raw {
        Value::Null => Ok(None),
        v if base.accepts(v) => Ok(Some(v.clone())),
        v => Err(decoding_error(type_name, v, format!("expected {}", base))),
    }
}

// ──────────────────────────────────────────────
// Scalar descriptors
// ──────────────────────────────────────────────

macro_rules! scalar_answer_type {
    ($(#[$doc:meta])* $name:ident, $type_name:literal, $base:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl $name {
            pub const TYPE_NAME: &'static str = $type_name;

            pub fn from_descriptor(
                _fields: &Map<String, Value>,
            ) -> Result<Arc<dyn AnswerType>, AnswerTypeError> {
                Ok(Arc::new($name))
            }
        }

        impl AnswerType for $name {
            fn type_name(&self) -> &str {
                Self::TYPE_NAME
            }

            fn encode_answer(
                &self,
                value: Option<&Value>,
            ) -> Result<Option<Value>, AnswerTypeError> {
                encode_scalar(Self::TYPE_NAME, $base, value)
            }

            fn decode_value(&self, raw: &Value) -> Result<Option<Value>, AnswerTypeError> {
                decode_scalar(Self::TYPE_NAME, $base, raw)
            }
        }
    };
}

scalar_answer_type!(
    /// A yes/no answer.
    BooleanType,
    "boolean",
    BaseType::Boolean
);
scalar_answer_type!(
    /// A whole-number answer.
    IntegerType,
    "integer",
    BaseType::Integer
);
scalar_answer_type!(
    /// Any numeric answer.
    NumberType,
    "number",
    BaseType::Number
);
scalar_answer_type!(
    /// A free-text answer.
    StringType,
    "string",
    BaseType::String
);
scalar_answer_type!(
    /// A free-form answer of any JSON shape.
    ObjectType,
    "object",
    BaseType::Object
);

/// A timestamp answer carried as a string in `coding_format`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeType {
    pub coding_format: Option<String>,
}

impl DateTimeType {
    pub const TYPE_NAME: &'static str = "date-time";

    pub fn from_descriptor(
        fields: &Map<String, Value>,
    ) -> Result<Arc<dyn AnswerType>, AnswerTypeError> {
        Ok(Arc::new(DateTimeType {
            coding_format: optional_string_field(Self::TYPE_NAME, fields, "codingFormat")?,
        }))
    }
}

impl AnswerType for DateTimeType {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn descriptor_fields(&self) -> Map<String, Value> {
        let mut m = Map::new();
        if let Some(format) = &self.coding_format {
            m.insert("codingFormat".to_owned(), Value::String(format.clone()));
        }
        m
    }

    fn encode_answer(&self, value: Option<&Value>) -> Result<Option<Value>, AnswerTypeError> {
        encode_scalar(Self::TYPE_NAME, BaseType::String, value)
    }

    fn decode_value(&self, raw: &Value) -> Result<Option<Value>, AnswerTypeError> {
        decode_scalar(Self::TYPE_NAME, BaseType::String, raw)
    }
}

/// A numeric answer with an optional unit of measure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementType {
    pub unit: Option<String>,
}

impl MeasurementType {
    pub const TYPE_NAME: &'static str = "measurement";

    pub fn from_descriptor(
        fields: &Map<String, Value>,
    ) -> Result<Arc<dyn AnswerType>, AnswerTypeError> {
        Ok(Arc::new(MeasurementType {
            unit: optional_string_field(Self::TYPE_NAME, fields, "unit")?,
        }))
    }
}

impl AnswerType for MeasurementType {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn descriptor_fields(&self) -> Map<String, Value> {
        let mut m = Map::new();
        if let Some(unit) = &self.unit {
            m.insert("unit".to_owned(), Value::String(unit.clone()));
        }
        m
    }

    fn encode_answer(&self, value: Option<&Value>) -> Result<Option<Value>, AnswerTypeError> {
        encode_scalar(Self::TYPE_NAME, BaseType::Number, value)
    }

    fn decode_value(&self, raw: &Value) -> Result<Option<Value>, AnswerTypeError> {
        decode_scalar(Self::TYPE_NAME, BaseType::Number, raw)
    }
}

// ──────────────────────────────────────────────
// Array descriptor
// ──────────────────────────────────────────────

/// A list answer whose elements share one base type.
///
/// With a `sequence_separator` the list travels as a single string of
/// rendered elements joined by the separator; otherwise as a JSON array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    pub base_type: BaseType,
    pub sequence_separator: Option<String>,
}

impl ArrayType {
    pub const TYPE_NAME: &'static str = "array";

    pub fn new(base_type: BaseType) -> Self {
        ArrayType {
            base_type,
            sequence_separator: None,
        }
    }

    pub fn separated(base_type: BaseType, separator: impl Into<String>) -> Self {
        ArrayType {
            base_type,
            sequence_separator: Some(separator.into()),
        }
    }

    pub fn from_descriptor(
        fields: &Map<String, Value>,
    ) -> Result<Arc<dyn AnswerType>, AnswerTypeError> {
        let base_type = match fields.get("baseType") {
            None | Some(Value::Null) => BaseType::String,
            Some(Value::String(name)) => {
                BaseType::parse(name).ok_or_else(|| AnswerTypeError::MalformedDescriptor {
                    type_name: Self::TYPE_NAME.to_owned(),
                    message: format!("unknown baseType '{}'", name),
                })?
            }
            Some(other) => {
                return Err(AnswerTypeError::MalformedDescriptor {
                    type_name: Self::TYPE_NAME.to_owned(),
                    message: format!("'baseType' must be a string, got {}", json_kind(other)),
                })
            }
        };
        let sequence_separator =
            optional_string_field(Self::TYPE_NAME, fields, "sequenceSeparator")?;
        if sequence_separator.as_deref() == Some("") {
            return Err(AnswerTypeError::MalformedDescriptor {
                type_name: Self::TYPE_NAME.to_owned(),
                message: "'sequenceSeparator' must not be empty".to_owned(),
            });
        }
        Ok(Arc::new(ArrayType {
            base_type,
            sequence_separator,
        }))
    }

    fn check_elements(&self, items: &[Value]) -> Option<usize> {
        items
            .iter()
            .position(|item| !self.base_type.accepts(item))
    }
}

impl AnswerType for ArrayType {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn descriptor_fields(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert(
            "baseType".to_owned(),
            Value::String(self.base_type.as_str().to_owned()),
        );
        if let Some(sep) = &self.sequence_separator {
            m.insert("sequenceSeparator".to_owned(), Value::String(sep.clone()));
        }
        m
    }

    fn encode_answer(&self, value: Option<&Value>) -> Result<Option<Value>, AnswerTypeError> {
        let items = match value {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(other) => return Err(encoding_error(Self::TYPE_NAME, other, "expected array")),
        };
        if let Some(index) = self.check_elements(items) {
            return Err(encoding_error(
                Self::TYPE_NAME,
                &items[index],
                format!("element {} is not {}", index, self.base_type),
            ));
        }
        match &self.sequence_separator {
            Some(sep) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| self.base_type.render(item))
                    .collect();
                if let Some(index) = rendered
                    .iter()
                    .position(|text| text.contains(sep.as_str()))
                {
                    return Err(encoding_error(
                        Self::TYPE_NAME,
                        &items[index],
                        format!("element {} contains the separator '{}'", index, sep),
                    ));
                }
                // An empty string is the encoding of an empty list.
                if rendered.len() == 1 && rendered[0].is_empty() {
                    return Err(encoding_error(
                        Self::TYPE_NAME,
                        &items[0],
                        "a lone empty element cannot be told apart from an empty list",
                    ));
                }
                Ok(Some(Value::String(rendered.join(sep))))
            }
            None => Ok(Some(Value::Array(items.clone()))),
        }
    }

    fn decode_value(&self, raw: &Value) -> Result<Option<Value>, AnswerTypeError> {
        match (raw, &self.sequence_separator) {
            (Value::Null, _) => Ok(None),
            (Value::Array(items), _) => match self.check_elements(items) {
                Some(index) => Err(decoding_error(
                    Self::TYPE_NAME,
                    &items[index],
                    format!("element {} is not {}", index, self.base_type),
                )),
                None => Ok(Some(raw.clone())),
            },
            (Value::String(s), Some(_)) if s.is_empty() => Ok(Some(Value::Array(Vec::new()))),
            (Value::String(s), Some(sep)) => {
                let mut items = Vec::new();
                for piece in s.split(sep.as_str()) {
                    let item = self.base_type.parse_piece(piece).ok_or_else(|| {
                        decoding_error(
                            Self::TYPE_NAME,
                            raw,
                            format!("'{}' is not {}", piece, self.base_type),
                        )
                    })?;
                    items.push(item);
                }
                Ok(Some(Value::Array(items)))
            }
            (other, _) => Err(decoding_error(Self::TYPE_NAME, other, "expected array")),
        }
    }
}
