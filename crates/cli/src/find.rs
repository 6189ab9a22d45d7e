//! `assay find`: look up an answer or a step result by identifier.

use std::path::Path;
use std::process;

use assay_core::ResultNode;

use crate::{load_document, report_error, OutputFormat};

pub(crate) fn cmd_find(
    file: &Path,
    identifier: &str,
    any_result: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let root = load_document(file, output, quiet);

    let found = if any_result {
        let Some(branch) = root.as_branch() else {
            report_error(
                &format!(
                    "root '{}' is a {} result and has no step history",
                    root.identifier(),
                    root.type_name()
                ),
                output,
                quiet,
            );
            process::exit(1);
        };
        branch.find_result(identifier).cloned()
    } else {
        root.find_answer(identifier).cloned().map(ResultNode::Answer)
    };

    let Some(found) = found else {
        let what = if any_result { "result" } else { "answer" };
        report_error(
            &format!("no {} '{}' in '{}'", what, identifier, file.display()),
            output,
            quiet,
        );
        process::exit(1);
    };

    match output {
        OutputFormat::Text => match (&found, any_result) {
            (ResultNode::Answer(a), false) => match &a.value {
                Some(v) => println!("{}", v),
                None => println!("null"),
            },
            _ => println!("{} {}", found.type_name(), found.identifier()),
        },
        OutputFormat::Json => match assay_core::to_string_pretty(&found) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                report_error(&format!("error encoding result: {}", e), output, quiet);
                process::exit(1);
            }
        },
    }
}
