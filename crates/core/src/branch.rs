//! Branch-node results: the step history and navigation path of a task run.
//!
//! A [`BranchNodeResult`] is mutated by the controller that runs the task:
//! every visited node is appended to `step_history`, and every navigation
//! event to `path`. Answers that do not depend on the route taken live in
//! `async_results`.
//!
//! The history is append-only with one exception: visiting the same node
//! twice in a row replaces the earlier entry. A node revisited after some
//! other node keeps both entries, and lookups prefer the later one.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::answer::AnswerResult;
use crate::result::ResultNode;
use crate::timestamp;

// ──────────────────────────────────────────────
// Path markers
// ──────────────────────────────────────────────

/// Which way navigation moved when a node was reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationDirection {
    #[default]
    Forward,
    Backward,
    Exit,
}

impl NavigationDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            NavigationDirection::Forward => "forward",
            NavigationDirection::Backward => "backward",
            NavigationDirection::Exit => "exit",
        }
    }
}

impl fmt::Display for NavigationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One navigation event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathMarker {
    pub identifier: String,
    pub direction: NavigationDirection,
}

impl PathMarker {
    pub fn new(identifier: impl Into<String>, direction: NavigationDirection) -> Self {
        PathMarker {
            identifier: identifier.into(),
            direction,
        }
    }
}

// ──────────────────────────────────────────────
// BranchNodeResult
// ──────────────────────────────────────────────

/// Results of a section of a task: what was visited, in order, and how.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchNodeResult {
    pub identifier: String,
    pub start_date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
    /// Every node visited, oldest first.
    pub step_history: Vec<ResultNode>,
    /// Route-independent results, such as background measurements.
    pub async_results: Option<Vec<ResultNode>>,
    /// Navigation trace without consecutive duplicates.
    pub path: Vec<PathMarker>,
}

impl BranchNodeResult {
    pub fn new(identifier: impl Into<String>) -> Self {
        BranchNodeResult {
            identifier: identifier.into(),
            start_date: timestamp::now(),
            end_date: None,
            step_history: Vec::new(),
            async_results: None,
            path: Vec::new(),
        }
    }

    /// The collection view of a branch node is its async results.
    pub fn children(&self) -> &[ResultNode] {
        self.async_results.as_deref().unwrap_or(&[])
    }

    pub fn set_children(&mut self, children: Vec<ResultNode>) {
        self.async_results = Some(children);
    }

    /// Find an answer, preferring the most recent step history entry and
    /// falling back to async results.
    pub fn find_answer(&self, identifier: &str) -> Option<&AnswerResult> {
        self.step_history
            .iter()
            .rev()
            .find_map(|r| r.find_answer(identifier))
            .or_else(|| {
                self.children()
                    .iter()
                    .rev()
                    .find_map(|r| r.find_answer(identifier))
            })
    }

    pub fn find_answer_mut(&mut self, identifier: &str) -> Option<&mut AnswerResult> {
        // Probe first so the history borrow is released before the fallback.
        let in_history = self
            .step_history
            .iter()
            .rev()
            .any(|r| r.find_answer(identifier).is_some());
        if in_history {
            return self
                .step_history
                .iter_mut()
                .rev()
                .find_map(|r| r.find_answer_mut(identifier));
        }
        self.async_results
            .as_mut()?
            .iter_mut()
            .rev()
            .find_map(|r| r.find_answer_mut(identifier))
    }

    /// The last step history entry with this identifier.
    pub fn find_result(&self, identifier: &str) -> Option<&ResultNode> {
        self.step_history
            .iter()
            .rev()
            .find(|r| r.identifier() == identifier)
    }

    pub fn find_result_mut(&mut self, identifier: &str) -> Option<&mut ResultNode> {
        self.step_history
            .iter_mut()
            .rev()
            .find(|r| r.identifier() == identifier)
    }

    /// The last async result with this identifier.
    pub fn find_async_result(&self, identifier: &str) -> Option<&ResultNode> {
        self.children()
            .iter()
            .rev()
            .find(|r| r.identifier() == identifier)
    }

    pub fn last_marker(&self) -> Option<&PathMarker> {
        self.path.last()
    }

    /// Record a visit to `result`.
    ///
    /// If the history already ends with an entry of the same identifier,
    /// that entry is replaced and returned. Earlier entries with the same
    /// identifier are kept. A path marker is added unless it repeats the
    /// last one.
    pub fn append_step_history(
        &mut self,
        result: ResultNode,
        direction: NavigationDirection,
    ) -> Option<ResultNode> {
        let replaced = match self.step_history.last() {
            Some(last) if last.identifier() == result.identifier() => self.step_history.pop(),
            _ => None,
        };
        if replaced.is_some() {
            debug!(
                branch = %self.identifier,
                step = %result.identifier(),
                "replacing step history tail"
            );
        }

        let marker = PathMarker::new(result.identifier(), direction);
        if self.path.last() != Some(&marker) {
            self.path.push(marker);
        }
        self.step_history.push(result);
        replaced
    }

    /// Unwind the history back to before the last visit of `identifier`.
    ///
    /// `path` is cut at its own last marker for the identifier,
    /// `step_history` at its own last entry. The removed history suffix
    /// is returned; `None` means the identifier was not in the history,
    /// though the path may still have been cut.
    pub fn remove_step_history_from(&mut self, identifier: &str) -> Option<Vec<ResultNode>> {
        if let Some(index) = self.path.iter().rposition(|m| m.identifier == identifier) {
            self.path.truncate(index);
        }
        let index = self
            .step_history
            .iter()
            .rposition(|r| r.identifier() == identifier)?;
        let removed = self.step_history.split_off(index);
        debug!(
            branch = %self.identifier,
            from = %identifier,
            removed = removed.len(),
            "truncated step history"
        );
        Some(removed)
    }

    /// Add a route-independent result, replacing any with the same identifier.
    pub fn append_async_result(&mut self, result: ResultNode) {
        let results = self.async_results.get_or_insert_with(Vec::new);
        results.retain(|r| r.identifier() != result.identifier());
        results.push(result);
    }

    pub fn finish(&mut self) {
        self.end_date = Some(timestamp::now());
    }

    pub(crate) fn stamp_run(&mut self, run: Uuid) {
        for r in &mut self.step_history {
            r.stamp_run(run);
        }
        if let Some(results) = &mut self.async_results {
            for r in results {
                r.stamp_run(run);
            }
        }
    }
}

// ──────────────────────────────────────────────
// AssessmentResult
// ──────────────────────────────────────────────

/// The root result of one assessment run.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentResult {
    pub branch: BranchNodeResult,
    /// Identifies one execution of the assessment.
    pub task_run_uuid: Uuid,
    pub version_string: Option<String>,
    pub assessment_identifier: Option<String>,
    pub schema_identifier: Option<String>,
    /// `$schema` URI, written when the result is the document root.
    pub schema_location: Option<String>,
}

impl AssessmentResult {
    /// Start a new run with a fresh run identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        AssessmentResult {
            branch: BranchNodeResult::new(identifier),
            task_run_uuid: Uuid::new_v4(),
            version_string: None,
            assessment_identifier: None,
            schema_identifier: None,
            schema_location: None,
        }
    }

    /// Give this result, and every assessment nested below it, the same run
    /// identifier.
    pub fn stamp_run(&mut self, run: Uuid) {
        self.task_run_uuid = run;
        self.branch.stamp_run(run);
    }
}
