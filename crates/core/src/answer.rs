//! The answer-bearing leaf result.

use std::sync::Arc;

use serde_json::Value;
use time::OffsetDateTime;

use crate::answer_type::{same_answer_type, AnswerType};
use crate::error::AnswerTypeError;
use crate::timestamp;
use crate::value::infer_answer_type;

/// The answer to one question.
///
/// A tree owns its answers. A controller that updates an answer in place
/// reaches it through [`find_answer_mut`](crate::ResultNode::find_answer_mut);
/// a snapshot that must not follow later edits is taken with `clone()`.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    pub identifier: String,
    pub start_date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
    /// How `value` is written to the wire. `None` writes it verbatim.
    pub answer_type: Option<Arc<dyn AnswerType>>,
    pub value: Option<Value>,
    pub question_text: Option<String>,
    /// Free-form metadata about the question that was asked.
    pub question_data: Option<Value>,
}

impl AnswerResult {
    pub fn new(identifier: impl Into<String>) -> Self {
        AnswerResult {
            identifier: identifier.into(),
            start_date: timestamp::now(),
            end_date: None,
            answer_type: None,
            value: None,
            question_text: None,
            question_data: None,
        }
    }

    /// An answer whose descriptor is inferred from the value's shape.
    pub fn inferred(identifier: impl Into<String>, value: Value) -> Self {
        let mut answer = AnswerResult::new(identifier);
        answer.answer_type = infer_answer_type(&value);
        answer.value = Some(value);
        answer
    }

    pub fn with_answer_type(mut self, answer_type: Arc<dyn AnswerType>) -> Self {
        self.answer_type = Some(answer_type);
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_question_text(mut self, text: impl Into<String>) -> Self {
        self.question_text = Some(text.into());
        self
    }

    pub fn with_question_data(mut self, data: Value) -> Self {
        self.question_data = Some(data);
        self
    }

    /// The value as it goes on the wire.
    ///
    /// Passed through the descriptor when one is set. A `null` result is
    /// reported as `None` so that it is left out rather than written.
    pub fn encoded_value(&self) -> Result<Option<Value>, AnswerTypeError> {
        let encoded = match &self.answer_type {
            Some(answer_type) => answer_type.encode_answer(self.value.as_ref())?,
            None => self.value.clone(),
        };
        Ok(encoded.filter(|v| !v.is_null()))
    }
}

impl PartialEq for AnswerResult {
    fn eq(&self, other: &Self) -> bool {
        let same_type = match (&self.answer_type, &other.answer_type) {
            (None, None) => true,
            (Some(a), Some(b)) => same_answer_type(a.as_ref(), b.as_ref()),
            _ => false,
        };
        same_type
            && self.identifier == other.identifier
            && self.start_date == other.start_date
            && self.end_date == other.end_date
            && self.value == other.value
            && self.question_text == other.question_text
            && self.question_data == other.question_data
    }
}
