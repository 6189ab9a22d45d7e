//! Error types for answer-type descriptors and result tree interchange.

/// Errors raised by an answer-type descriptor or while resolving one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerTypeError {
    /// No descriptor is registered under this discriminator.
    #[error("unknown answer type '{type_name}'")]
    UnknownAnswerType { type_name: String },

    /// The value's shape cannot be written under this descriptor.
    #[error("cannot encode {found} as '{type_name}' answer: {message}")]
    Encoding {
        type_name: String,
        found: String,
        message: String,
    },

    /// The raw payload cannot be interpreted under this descriptor.
    #[error("cannot decode {found} as '{type_name}' answer: {message}")]
    Decoding {
        type_name: String,
        found: String,
        message: String,
    },

    /// The descriptor object itself is missing fields or carries bad ones.
    #[error("malformed '{type_name}' answer type: {message}")]
    MalformedDescriptor { type_name: String, message: String },
}

/// Errors during result tree decode or encode.
///
/// `at` is the location of the failing subtree within the document, in
/// JSON pointer form (`""` for the root, `/stepHistory/2` for a nested entry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResultError {
    /// Wrong shape, bad discriminator, or a field with an unusable value.
    #[error("malformed payload at '{at}': {message}")]
    MalformedPayload { at: String, message: String },

    /// The `type` discriminator does not name a known result variant.
    #[error("unknown result type '{type_name}' at '{at}'")]
    UnknownResultType { at: String, type_name: String },

    /// A required field is absent.
    #[error("{type_name} at '{at}' is missing required field '{field}'")]
    MissingField {
        at: String,
        type_name: String,
        field: String,
    },

    /// An answer-type descriptor rejected a value.
    #[error("answer at '{at}': {source}")]
    AnswerType {
        at: String,
        #[source]
        source: AnswerTypeError,
    },

    /// A timestamp could not be parsed or formatted as RFC 3339.
    #[error("bad timestamp in '{field}' at '{at}': {message}")]
    Timestamp {
        at: String,
        field: String,
        message: String,
    },

    /// The document text is not JSON.
    #[error("invalid JSON: {0}")]
    Json(String),
}

impl ResultError {
    pub(crate) fn malformed(at: &str, message: impl Into<String>) -> Self {
        ResultError::MalformedPayload {
            at: at.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn missing(at: &str, type_name: &str, field: &str) -> Self {
        ResultError::MissingField {
            at: at.to_owned(),
            type_name: type_name.to_owned(),
            field: field.to_owned(),
        }
    }

    pub(crate) fn answer(at: &str, source: AnswerTypeError) -> Self {
        ResultError::AnswerType {
            at: at.to_owned(),
            source,
        }
    }

    /// The document location the error refers to, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            ResultError::MalformedPayload { at, .. }
            | ResultError::UnknownResultType { at, .. }
            | ResultError::MissingField { at, .. }
            | ResultError::AnswerType { at, .. }
            | ResultError::Timestamp { at, .. } => Some(at),
            ResultError::Json(_) => None,
        }
    }
}

impl From<serde_json::Error> for ResultError {
    fn from(e: serde_json::Error) -> Self {
        ResultError::Json(e.to_string())
    }
}
