//! Entry points for reading and writing result documents.

use serde_json::Value;

use crate::error::ResultError;
use crate::registry::AnswerTypeRegistry;
use crate::result::ResultNode;
use crate::serialize;

/// Decodes and encodes result trees against a set of known answer types.
#[derive(Debug, Clone, Default)]
pub struct ResultCodec {
    pub(crate) answer_types: AnswerTypeRegistry,
}

impl ResultCodec {
    pub fn new(answer_types: AnswerTypeRegistry) -> Self {
        ResultCodec { answer_types }
    }

    pub fn answer_types(&self) -> &AnswerTypeRegistry {
        &self.answer_types
    }

    pub fn answer_types_mut(&mut self) -> &mut AnswerTypeRegistry {
        &mut self.answer_types
    }

    /// Encode a result tree. Descriptors travel with the answers, so this
    /// does not consult the registry.
    pub fn encode(&self, node: &ResultNode) -> Result<Value, ResultError> {
        serialize::encode(node)
    }

    pub fn decode_str(&self, text: &str) -> Result<ResultNode, ResultError> {
        let doc: Value = serde_json::from_str(text)?;
        self.decode(&doc)
    }
}

/// Decode a result document using the built-in answer types.
pub fn from_json(doc: &Value) -> Result<ResultNode, ResultError> {
    ResultCodec::default().decode(doc)
}

pub fn from_str(text: &str) -> Result<ResultNode, ResultError> {
    ResultCodec::default().decode_str(text)
}

pub fn to_json(node: &ResultNode) -> Result<Value, ResultError> {
    serialize::encode(node)
}

pub fn to_string_pretty(node: &ResultNode) -> Result<String, ResultError> {
    let doc = serialize::encode(node)?;
    Ok(serde_json::to_string_pretty(&doc)?)
}
