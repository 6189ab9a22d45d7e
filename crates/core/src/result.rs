//! The polymorphic result node and its leaf variants.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::answer::AnswerResult;
use crate::branch::{AssessmentResult, BranchNodeResult};
use crate::collection::CollectionResult;
use crate::registry::ResultType;
use crate::timestamp;

/// One node of a result tree. The variant is picked at decode time from
/// the node's `type` discriminator.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultNode {
    Base(StepResult),
    Answer(AnswerResult),
    Collection(CollectionResult),
    File(FileResult),
    Error(ErrorResult),
    Section(BranchNodeResult),
    Assessment(AssessmentResult),
}

impl ResultNode {
    pub fn result_type(&self) -> ResultType {
        match self {
            ResultNode::Base(_) => ResultType::Base,
            ResultNode::Answer(_) => ResultType::Answer,
            ResultNode::Collection(_) => ResultType::Collection,
            ResultNode::File(_) => ResultType::File,
            ResultNode::Error(_) => ResultType::Error,
            ResultNode::Section(_) => ResultType::Section,
            ResultNode::Assessment(_) => ResultType::Assessment,
        }
    }

    /// The wire discriminator of this node.
    pub fn type_name(&self) -> &'static str {
        self.result_type().as_str()
    }

    pub fn identifier(&self) -> &str {
        match self {
            ResultNode::Base(r) => &r.identifier,
            ResultNode::Answer(r) => &r.identifier,
            ResultNode::Collection(r) => &r.identifier,
            ResultNode::File(r) => &r.identifier,
            ResultNode::Error(r) => &r.identifier,
            ResultNode::Section(r) => &r.identifier,
            ResultNode::Assessment(r) => &r.branch.identifier,
        }
    }

    pub fn start_date(&self) -> OffsetDateTime {
        match self {
            ResultNode::Base(r) => r.start_date,
            ResultNode::Answer(r) => r.start_date,
            ResultNode::Collection(r) => r.start_date,
            ResultNode::File(r) => r.start_date,
            ResultNode::Error(r) => r.start_date,
            ResultNode::Section(r) => r.start_date,
            ResultNode::Assessment(r) => r.branch.start_date,
        }
    }

    pub fn end_date(&self) -> Option<OffsetDateTime> {
        match self {
            ResultNode::Base(r) => r.end_date,
            ResultNode::Answer(r) => r.end_date,
            ResultNode::Collection(r) => r.end_date,
            ResultNode::File(r) => r.end_date,
            ResultNode::Error(r) => r.end_date,
            ResultNode::Section(r) => r.end_date,
            ResultNode::Assessment(r) => r.branch.end_date,
        }
    }

    pub fn set_end_date(&mut self, end_date: Option<OffsetDateTime>) {
        let slot = match self {
            ResultNode::Base(r) => &mut r.end_date,
            ResultNode::Answer(r) => &mut r.end_date,
            ResultNode::Collection(r) => &mut r.end_date,
            ResultNode::File(r) => &mut r.end_date,
            ResultNode::Error(r) => &mut r.end_date,
            ResultNode::Section(r) => &mut r.end_date,
            ResultNode::Assessment(r) => &mut r.branch.end_date,
        };
        *slot = end_date;
    }

    pub fn as_answer(&self) -> Option<&AnswerResult> {
        match self {
            ResultNode::Answer(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_answer_mut(&mut self) -> Option<&mut AnswerResult> {
        match self {
            ResultNode::Answer(a) => Some(a),
            _ => None,
        }
    }

    /// The branch-node part of a section or assessment.
    pub fn as_branch(&self) -> Option<&BranchNodeResult> {
        match self {
            ResultNode::Section(b) => Some(b),
            ResultNode::Assessment(a) => Some(&a.branch),
            _ => None,
        }
    }

    pub fn as_branch_mut(&mut self) -> Option<&mut BranchNodeResult> {
        match self {
            ResultNode::Section(b) => Some(b),
            ResultNode::Assessment(a) => Some(&mut a.branch),
            _ => None,
        }
    }

    /// Locate the answer for a question anywhere below this node.
    ///
    /// An answer matches itself. Containers delegate to their children with
    /// the most recent entries searched first.
    pub fn find_answer(&self, identifier: &str) -> Option<&AnswerResult> {
        match self {
            ResultNode::Answer(a) if a.identifier == identifier => Some(a),
            ResultNode::Collection(c) => c.find_answer(identifier),
            ResultNode::Section(b) => b.find_answer(identifier),
            ResultNode::Assessment(a) => a.branch.find_answer(identifier),
            _ => None,
        }
    }

    /// Mutable counterpart of [`ResultNode::find_answer`], for updating a
    /// live answer in place.
    pub fn find_answer_mut(&mut self, identifier: &str) -> Option<&mut AnswerResult> {
        match self {
            ResultNode::Answer(a) if a.identifier == identifier => Some(a),
            ResultNode::Collection(c) => c.find_answer_mut(identifier),
            ResultNode::Section(b) => b.find_answer_mut(identifier),
            ResultNode::Assessment(a) => a.branch.find_answer_mut(identifier),
            _ => None,
        }
    }

    /// An independent copy of this node and everything below it.
    pub fn deep_copy(&self) -> ResultNode {
        self.clone()
    }

    /// Set the run identifier on every assessment in this subtree.
    pub(crate) fn stamp_run(&mut self, run: Uuid) {
        match self {
            ResultNode::Assessment(a) => a.stamp_run(run),
            ResultNode::Section(b) => b.stamp_run(run),
            ResultNode::Collection(c) => {
                for child in &mut c.children {
                    child.stamp_run(run);
                }
            }
            _ => {}
        }
    }
}

impl From<StepResult> for ResultNode {
    fn from(r: StepResult) -> Self {
        ResultNode::Base(r)
    }
}

impl From<AnswerResult> for ResultNode {
    fn from(r: AnswerResult) -> Self {
        ResultNode::Answer(r)
    }
}

impl From<CollectionResult> for ResultNode {
    fn from(r: CollectionResult) -> Self {
        ResultNode::Collection(r)
    }
}

impl From<FileResult> for ResultNode {
    fn from(r: FileResult) -> Self {
        ResultNode::File(r)
    }
}

impl From<ErrorResult> for ResultNode {
    fn from(r: ErrorResult) -> Self {
        ResultNode::Error(r)
    }
}

impl From<BranchNodeResult> for ResultNode {
    fn from(r: BranchNodeResult) -> Self {
        ResultNode::Section(r)
    }
}

impl From<AssessmentResult> for ResultNode {
    fn from(r: AssessmentResult) -> Self {
        ResultNode::Assessment(r)
    }
}

// ── Leaves ──────────────────────────────────────────────────────────

/// A plain step with nothing but its identifier and time bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub identifier: String,
    pub start_date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
}

impl StepResult {
    pub fn new(identifier: impl Into<String>) -> Self {
        StepResult {
            identifier: identifier.into(),
            start_date: timestamp::now(),
            end_date: None,
        }
    }
}

/// A file written during the step, referenced by its relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    pub identifier: String,
    pub start_date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
    pub relative_path: String,
    /// MIME type of the file contents.
    pub content_type: Option<String>,
    /// URI of a JSON schema describing the file contents.
    pub json_schema: Option<String>,
}

impl FileResult {
    pub fn new(identifier: impl Into<String>, relative_path: impl Into<String>) -> Self {
        FileResult {
            identifier: identifier.into(),
            start_date: timestamp::now(),
            end_date: None,
            relative_path: relative_path.into(),
            content_type: None,
            json_schema: None,
        }
    }
}

/// A step that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResult {
    pub identifier: String,
    pub start_date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
    pub description: String,
    pub domain: String,
    pub code: i64,
}

impl ErrorResult {
    pub fn new(
        identifier: impl Into<String>,
        description: impl Into<String>,
        domain: impl Into<String>,
        code: i64,
    ) -> Self {
        ErrorResult {
            identifier: identifier.into(),
            start_date: timestamp::now(),
            end_date: None,
            description: description.into(),
            domain: domain.into(),
            code,
        }
    }
}
