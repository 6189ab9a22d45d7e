//! Step history and path bookkeeping as a task controller drives it.

use assay_core::{
    AnswerResult, AssessmentResult, BranchNodeResult, CollectionResult, NavigationDirection,
    PathMarker, ResultNode, StepResult,
};
use serde_json::json;

use NavigationDirection::{Backward, Exit, Forward};

fn step(id: &str) -> ResultNode {
    StepResult::new(id).into()
}

fn answer(id: &str, value: serde_json::Value) -> ResultNode {
    AnswerResult::inferred(id, value).into()
}

fn ids(results: &[ResultNode]) -> Vec<&str> {
    results.iter().map(|r| r.identifier()).collect()
}

fn three_step_run() -> BranchNodeResult {
    let mut b = BranchNodeResult::new("task");
    b.append_step_history(step("introduction"), Forward);
    b.append_step_history(step("collection"), Forward);
    b.append_step_history(step("conclusion"), Forward);
    b
}

#[test]
fn forward_run_records_path_and_history() {
    let b = three_step_run();
    assert_eq!(
        b.path,
        vec![
            PathMarker::new("introduction", Forward),
            PathMarker::new("collection", Forward),
            PathMarker::new("conclusion", Forward),
        ]
    );
    assert_eq!(ids(&b.step_history), vec!["introduction", "collection", "conclusion"]);
}

#[test]
fn removing_from_middle_returns_suffix() {
    let mut b = three_step_run();
    let removed = b.remove_step_history_from("collection").unwrap();
    assert_eq!(ids(&removed), vec!["collection", "conclusion"]);
    assert_eq!(ids(&b.step_history), vec!["introduction"]);
    assert_eq!(b.path, vec![PathMarker::new("introduction", Forward)]);
}

#[test]
fn repeated_tail_append_keeps_one_entry_and_marker() {
    let mut b = BranchNodeResult::new("task");
    b.append_step_history(step("intro"), Forward);
    b.append_step_history(answer("X", json!(1)), Forward);
    let replaced = b.append_step_history(answer("X", json!(2)), Forward);

    assert!(replaced.is_some());
    assert_eq!(ids(&b.step_history), vec!["intro", "X"]);
    assert_eq!(
        b.path,
        vec![PathMarker::new("intro", Forward), PathMarker::new("X", Forward)]
    );
    assert_eq!(b.find_answer("X").unwrap().value, Some(json!(2)));
}

#[test]
fn revisit_after_other_step_keeps_duplicates() {
    let mut b = BranchNodeResult::new("task");
    b.append_step_history(answer("X", json!(1)), Forward);
    b.append_step_history(step("Y"), Forward);
    b.append_step_history(answer("X", json!(2)), Backward);
    assert_eq!(ids(&b.step_history), vec!["X", "Y", "X"]);
    assert_eq!(b.find_result("X").unwrap().as_answer().unwrap().value, Some(json!(2)));
}

#[test]
fn most_recent_answer_wins() {
    let mut b = BranchNodeResult::new("task");
    b.step_history = vec![answer("q1", json!(1)), step("B"), answer("q1", json!(2))];
    assert_eq!(b.find_answer("q1").unwrap().value, Some(json!(2)));
}

#[test]
fn async_results_answer_when_history_is_empty() {
    let mut b = BranchNodeResult::new("task");
    b.async_results = Some(vec![answer("q1", json!(5))]);
    assert_eq!(b.find_answer("q1").unwrap().value, Some(json!(5)));
    assert!(b.find_result("q1").is_none());
}

#[test]
fn answers_are_found_through_nested_containers() {
    let mut section = BranchNodeResult::new("section");
    section.append_step_history(
        CollectionResult::new("form")
            .with_children(vec![answer("name", json!("Ada"))])
            .into(),
        Forward,
    );
    let mut root = AssessmentResult::new("root");
    root.branch.append_step_history(section.into(), Forward);
    let mut root: ResultNode = root.into();

    assert_eq!(root.find_answer("name").unwrap().value, Some(json!("Ada")));
    root.find_answer_mut("name").unwrap().value = Some(json!("Grace"));
    assert_eq!(root.find_answer("name").unwrap().value, Some(json!("Grace")));
    assert!(root.find_answer("form").is_none());
}

#[test]
fn going_back_and_forward_again() {
    let mut b = three_step_run();
    // The participant backs up to "collection" and answers again.
    let removed = b.remove_step_history_from("conclusion").unwrap();
    assert_eq!(ids(&removed), vec!["conclusion"]);
    b.append_step_history(step("collection"), Backward);
    b.append_step_history(step("conclusion"), Forward);
    b.append_step_history(step("conclusion"), Exit);

    assert_eq!(ids(&b.step_history), vec!["introduction", "collection", "conclusion"]);
    assert_eq!(
        b.path,
        vec![
            PathMarker::new("introduction", Forward),
            PathMarker::new("collection", Forward),
            PathMarker::new("collection", Backward),
            PathMarker::new("conclusion", Forward),
            PathMarker::new("conclusion", Exit),
        ]
    );
}

#[test]
fn path_and_history_cut_independently() {
    let mut b = BranchNodeResult::new("task");
    b.append_step_history(step("a"), Forward);
    b.append_step_history(step("b"), Forward);
    // A path-only event, as when a controller logs an exit it did not record
    // as a step.
    b.path.push(PathMarker::new("a", Exit));

    let removed = b.remove_step_history_from("a").unwrap();
    assert_eq!(ids(&removed), vec!["a", "b"]);
    assert!(b.step_history.is_empty());
    assert_eq!(
        b.path,
        vec![PathMarker::new("a", Forward), PathMarker::new("b", Forward)]
    );
}
