//! Discriminator catalogs for answer types and result variants.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::answer_type::{
    AnswerType, ArrayType, BooleanType, DateTimeType, IntegerType, MeasurementType, NumberType,
    ObjectType, StringType,
};
use crate::error::{AnswerTypeError, ResultError};
use crate::value::json_kind;

/// Builds a descriptor from the fields of its tagged JSON object.
pub type AnswerTypeFactory =
    fn(&Map<String, Value>) -> Result<Arc<dyn AnswerType>, AnswerTypeError>;

// ──────────────────────────────────────────────
// Answer types
// ──────────────────────────────────────────────

/// Open registry of answer-type descriptors, keyed by discriminator.
#[derive(Clone)]
pub struct AnswerTypeRegistry {
    factories: HashMap<String, AnswerTypeFactory>,
}

impl AnswerTypeRegistry {
    /// A registry with nothing registered.
    pub fn new() -> Self {
        AnswerTypeRegistry {
            factories: HashMap::new(),
        }
    }

    /// A registry carrying the built-in descriptor catalog.
    pub fn with_builtins() -> Self {
        let mut registry = AnswerTypeRegistry::new();
        registry.register(BooleanType::TYPE_NAME, BooleanType::from_descriptor);
        registry.register(IntegerType::TYPE_NAME, IntegerType::from_descriptor);
        registry.register(NumberType::TYPE_NAME, NumberType::from_descriptor);
        registry.register(StringType::TYPE_NAME, StringType::from_descriptor);
        registry.register(ObjectType::TYPE_NAME, ObjectType::from_descriptor);
        registry.register(DateTimeType::TYPE_NAME, DateTimeType::from_descriptor);
        registry.register(MeasurementType::TYPE_NAME, MeasurementType::from_descriptor);
        registry.register(ArrayType::TYPE_NAME, ArrayType::from_descriptor);
        registry
    }

    /// Add a descriptor kind, replacing any earlier one with the same name.
    pub fn register(&mut self, type_name: impl Into<String>, factory: AnswerTypeFactory) {
        self.factories.insert(type_name.into(), factory);
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn resolve(&self, type_name: &str) -> Result<AnswerTypeFactory, AnswerTypeError> {
        self.factories
            .get(type_name)
            .copied()
            .ok_or_else(|| AnswerTypeError::UnknownAnswerType {
                type_name: type_name.to_owned(),
            })
    }

    /// Build a descriptor from its tagged JSON object.
    pub fn decode_descriptor(&self, raw: &Value) -> Result<Arc<dyn AnswerType>, AnswerTypeError> {
        let fields = raw
            .as_object()
            .ok_or_else(|| AnswerTypeError::MalformedDescriptor {
                type_name: String::new(),
                message: format!("expected object, got {}", json_kind(raw)),
            })?;
        let type_name = fields.get("type").and_then(Value::as_str).ok_or_else(|| {
            AnswerTypeError::MalformedDescriptor {
                type_name: String::new(),
                message: "missing string 'type' field".to_owned(),
            }
        })?;
        let factory = self.resolve(type_name)?;
        factory(fields)
    }

    /// Registered discriminators, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for AnswerTypeRegistry {
    fn default() -> Self {
        AnswerTypeRegistry::with_builtins()
    }
}

impl fmt::Debug for AnswerTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerTypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

// ──────────────────────────────────────────────
// Result types
// ──────────────────────────────────────────────

/// The closed catalog of result variants, one per wire discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    Base,
    Answer,
    Collection,
    File,
    Error,
    Section,
    Assessment,
}

impl ResultType {
    pub const ALL: [ResultType; 7] = [
        ResultType::Base,
        ResultType::Answer,
        ResultType::Collection,
        ResultType::File,
        ResultType::Error,
        ResultType::Section,
        ResultType::Assessment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResultType::Base => "base",
            ResultType::Answer => "answer",
            ResultType::Collection => "collection",
            ResultType::File => "file",
            ResultType::Error => "error",
            ResultType::Section => "section",
            ResultType::Assessment => "assessment",
        }
    }

    /// Look up a discriminator found at `at` in a document.
    pub fn resolve(type_name: &str, at: &str) -> Result<ResultType, ResultError> {
        ResultType::ALL
            .into_iter()
            .find(|t| t.as_str() == type_name)
            .ok_or_else(|| ResultError::UnknownResultType {
                at: at.to_owned(),
                type_name: type_name.to_owned(),
            })
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
