//! Encoding result trees as JSON documents.
//!
//! Every object starts with its `type` discriminator, followed by the
//! common `identifier` / `startDate` / `endDate` fields and then the
//! variant's own fields. Nested results are encoded recursively.

use serde_json::{json, Map, Value};

use crate::answer::AnswerResult;
use crate::branch::BranchNodeResult;
use crate::error::ResultError;
use crate::result::ResultNode;
use crate::timestamp;

pub(crate) fn encode(node: &ResultNode) -> Result<Value, ResultError> {
    encode_node(node, "")
}

fn encode_node(node: &ResultNode, at: &str) -> Result<Value, ResultError> {
    let mut m = Map::new();
    m.insert("type".to_owned(), json!(node.type_name()));
    if let ResultNode::Assessment(a) = node {
        if let Some(schema) = &a.schema_location {
            m.insert("$schema".to_owned(), json!(schema));
        }
    }
    m.insert("identifier".to_owned(), json!(node.identifier()));
    m.insert(
        "startDate".to_owned(),
        json!(timestamp::format(&node.start_date(), at, "startDate")?),
    );
    if let Some(end) = node.end_date() {
        m.insert(
            "endDate".to_owned(),
            json!(timestamp::format(&end, at, "endDate")?),
        );
    }

    match node {
        ResultNode::Base(_) => {}
        ResultNode::Answer(a) => encode_answer(&mut m, a, at)?,
        ResultNode::Collection(c) => {
            m.insert(
                "children".to_owned(),
                encode_list(&c.children, at, "children")?,
            );
        }
        ResultNode::File(f) => {
            m.insert("relativePath".to_owned(), json!(f.relative_path));
            insert_opt(&mut m, "contentType", &f.content_type);
            insert_opt(&mut m, "jsonSchema", &f.json_schema);
        }
        ResultNode::Error(e) => {
            m.insert("errorDescription".to_owned(), json!(e.description));
            m.insert("errorDomain".to_owned(), json!(e.domain));
            m.insert("errorCode".to_owned(), json!(e.code));
        }
        ResultNode::Section(b) => encode_branch(&mut m, b, at)?,
        ResultNode::Assessment(a) => {
            m.insert("taskRunUUID".to_owned(), json!(a.task_run_uuid.to_string()));
            insert_opt(&mut m, "versionString", &a.version_string);
            insert_opt(&mut m, "assessmentIdentifier", &a.assessment_identifier);
            insert_opt(&mut m, "schemaIdentifier", &a.schema_identifier);
            encode_branch(&mut m, &a.branch, at)?;
        }
    }
    Ok(Value::Object(m))
}

/// The descriptor is written before the value it shapes.
fn encode_answer(
    m: &mut Map<String, Value>,
    a: &AnswerResult,
    at: &str,
) -> Result<(), ResultError> {
    if let Some(answer_type) = &a.answer_type {
        m.insert("answerType".to_owned(), answer_type.to_json());
    }
    let value = a.encoded_value().map_err(|e| ResultError::answer(at, e))?;
    if let Some(value) = value {
        m.insert("value".to_owned(), value);
    }
    insert_opt(m, "questionText", &a.question_text);
    if let Some(data) = &a.question_data {
        m.insert("questionData".to_owned(), data.clone());
    }
    Ok(())
}

fn encode_branch(
    m: &mut Map<String, Value>,
    b: &BranchNodeResult,
    at: &str,
) -> Result<(), ResultError> {
    m.insert(
        "stepHistory".to_owned(),
        encode_list(&b.step_history, at, "stepHistory")?,
    );
    if let Some(results) = &b.async_results {
        m.insert(
            "asyncResults".to_owned(),
            encode_list(results, at, "asyncResults")?,
        );
    }
    m.insert("path".to_owned(), serde_json::to_value(&b.path)?);
    Ok(())
}

fn encode_list(nodes: &[ResultNode], at: &str, field: &str) -> Result<Value, ResultError> {
    let mut items = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        items.push(encode_node(node, &format!("{}/{}/{}", at, field, index))?);
    }
    Ok(Value::Array(items))
}

fn insert_opt(m: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        m.insert(key.to_owned(), json!(v));
    }
}
