//! Results that group named child results.

use time::OffsetDateTime;

use crate::answer::AnswerResult;
use crate::result::ResultNode;
use crate::timestamp;

/// A set of uniquely identified child results, kept in insertion order.
///
/// Uniqueness of child identifiers is up to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionResult {
    pub identifier: String,
    pub start_date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
    pub children: Vec<ResultNode>,
}

impl CollectionResult {
    pub fn new(identifier: impl Into<String>) -> Self {
        CollectionResult {
            identifier: identifier.into(),
            start_date: timestamp::now(),
            end_date: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ResultNode>) -> Self {
        self.children = children;
        self
    }

    /// The last child with this identifier.
    pub fn find_child(&self, identifier: &str) -> Option<&ResultNode> {
        self.children
            .iter()
            .rev()
            .find(|child| child.identifier() == identifier)
    }

    pub fn find_answer(&self, identifier: &str) -> Option<&AnswerResult> {
        self.children
            .iter()
            .rev()
            .find_map(|child| child.find_answer(identifier))
    }

    pub fn find_answer_mut(&mut self, identifier: &str) -> Option<&mut AnswerResult> {
        self.children
            .iter_mut()
            .rev()
            .find_map(|child| child.find_answer_mut(identifier))
    }

    pub fn finish(&mut self) {
        self.end_date = Some(timestamp::now());
    }
}
