//! assay-core: assessment result trees and their JSON interchange.
//!
//! A task run produces a tree of results: branch nodes record the steps
//! visited ([`BranchNodeResult::step_history`]) and the navigation path,
//! leaves carry answers, files, or errors. Documents are self-describing:
//! every result object has a `type` discriminator that picks its variant
//! at decode time, and every answer may carry an `answerType` descriptor
//! that decides how its `value` is read.
//!
//! # Public API
//!
//! - [`from_json`] / [`to_json`] -- decode and encode with the built-in answer types
//! - [`ResultCodec`] -- decode/encode against a custom [`AnswerTypeRegistry`]
//! - [`ResultNode`] -- the polymorphic node, with `find_answer` lookup
//! - [`BranchNodeResult`] -- step history / path management
//! - [`AnswerType`] -- the descriptor capability; built-ins in [`answer_type`]

pub mod answer;
pub mod answer_type;
pub mod branch;
pub mod codec;
pub mod collection;
mod deserialize;
pub mod error;
pub mod registry;
pub mod result;
mod serialize;
pub mod timestamp;
pub mod value;

// ── Convenience re-exports ──────────────────────────────────────────

pub use answer::AnswerResult;
pub use answer_type::{AnswerType, ArrayType, BaseType};
pub use branch::{AssessmentResult, BranchNodeResult, NavigationDirection, PathMarker};
pub use codec::{from_json, from_str, to_json, to_string_pretty, ResultCodec};
pub use collection::CollectionResult;
pub use error::{AnswerTypeError, ResultError};
pub use registry::{AnswerTypeFactory, AnswerTypeRegistry, ResultType};
pub use result::{ErrorResult, FileResult, ResultNode, StepResult};
pub use value::{infer_answer_type, Value};
