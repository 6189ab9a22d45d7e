//! `assay inspect`: an outline of a decoded result tree.

use std::fmt::Write as _;
use std::path::Path;
use std::process;

use assay_core::{BranchNodeResult, ResultNode};
use serde_json::json;

use crate::{load_document, report_error, OutputFormat};

pub(crate) fn cmd_inspect(file: &Path, output: OutputFormat, quiet: bool) {
    let root = load_document(file, output, quiet);
    match output {
        OutputFormat::Text => {
            let mut out = String::new();
            outline(&root, 0, &mut out);
            print!("{}", out);
        }
        OutputFormat::Json => match summary(&root) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                report_error(&format!("error encoding summary: {}", e), output, quiet);
                process::exit(1);
            }
        },
    }
}

/// Root type and identifier with node counts, as pretty JSON.
pub(crate) fn summary(root: &ResultNode) -> Result<String, serde_json::Error> {
    let counts = count(root);
    serde_json::to_string_pretty(&json!({
        "type": root.type_name(),
        "identifier": root.identifier(),
        "results": counts.results,
        "answers": counts.answers,
        "answered": counts.answered,
    }))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Counts {
    pub results: usize,
    pub answers: usize,
    /// Answers that carry a value.
    pub answered: usize,
}

pub(crate) fn count(node: &ResultNode) -> Counts {
    let mut counts = Counts::default();
    walk(node, &mut |n: &ResultNode| {
        counts.results += 1;
        if let Some(answer) = n.as_answer() {
            counts.answers += 1;
            if answer.value.is_some() {
                counts.answered += 1;
            }
        }
    });
    counts
}

/// Visit a node and everything below it, history before async results.
fn walk(node: &ResultNode, visit: &mut dyn FnMut(&ResultNode)) {
    visit(node);
    match node {
        ResultNode::Collection(c) => {
            for child in &c.children {
                walk(child, visit);
            }
        }
        _ => {
            if let Some(branch) = node.as_branch() {
                for child in branch.step_history.iter().chain(branch.children()) {
                    walk(child, visit);
                }
            }
        }
    }
}

pub(crate) fn outline(node: &ResultNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{}{} {}", indent, node.type_name(), node.identifier());
    match node {
        ResultNode::Answer(a) => match &a.value {
            Some(v) => {
                let _ = write!(out, " = {}", v);
            }
            None => out.push_str(" (no answer)"),
        },
        ResultNode::File(f) => {
            let _ = write!(out, " -> {}", f.relative_path);
        }
        ResultNode::Error(e) => {
            let _ = write!(out, " [{} {}] {}", e.domain, e.code, e.description);
        }
        ResultNode::Assessment(a) => {
            let _ = write!(out, " run {}", a.task_run_uuid);
        }
        _ => {}
    }
    out.push('\n');

    match node {
        ResultNode::Collection(c) => {
            for child in &c.children {
                outline(child, depth + 1, out);
            }
        }
        _ => {
            if let Some(branch) = node.as_branch() {
                outline_branch(branch, depth + 1, out);
            }
        }
    }
}

fn outline_branch(branch: &BranchNodeResult, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for child in &branch.step_history {
        outline(child, depth, out);
    }
    if !branch.children().is_empty() {
        let _ = writeln!(out, "{}async:", indent);
        for child in branch.children() {
            outline(child, depth + 1, out);
        }
    }
    if !branch.path.is_empty() {
        let markers: Vec<String> = branch
            .path
            .iter()
            .map(|m| format!("{}/{}", m.identifier, m.direction))
            .collect();
        let _ = writeln!(out, "{}path: {}", indent, markers.join(" "));
    }
}
