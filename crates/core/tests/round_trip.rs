//! Encode/decode round trips over full result trees.
//!
//! Every result variant appears at depth two or more, with all optional
//! fields populated, and the decoded tree must equal the original.

use std::sync::Arc;

use assay_core::answer_type::{
    DateTimeType, IntegerType, MeasurementType, NumberType, ObjectType, StringType,
};
use assay_core::{
    from_json, from_str, to_json, to_string_pretty, AnswerResult, AnswerType, AnswerTypeError,
    AnswerTypeRegistry, ArrayType, AssessmentResult, BaseType, BranchNodeResult, CollectionResult,
    ErrorResult, FileResult, NavigationDirection, ResultCodec, ResultNode, StepResult, Value,
};
use serde_json::{json, Map};

// ──────────────────────────────────────────────
// Fixtures
// ──────────────────────────────────────────────

fn finished(mut node: ResultNode) -> ResultNode {
    let end = node.start_date() + time::Duration::seconds(30);
    node.set_end_date(Some(end));
    node
}

fn full_answer(id: &str) -> AnswerResult {
    AnswerResult::new(id)
        .with_answer_type(Arc::new(ArrayType::separated(BaseType::Integer, ",")))
        .with_value(json!([4, 8, 15]))
        .with_question_text("Pick some numbers")
        .with_question_data(json!({"min": 0, "labels": ["low", "high"]}))
}

fn full_file(id: &str) -> FileResult {
    let mut f = FileResult::new(id, "recordings/motion.json");
    f.content_type = Some("application/json".to_string());
    f.json_schema = Some("https://example.org/schemas/motion.json".to_string());
    f
}

fn full_tree() -> ResultNode {
    let collection = CollectionResult::new("vitals").with_children(vec![
        AnswerResult::inferred("heart_rate", json!(72)).into(),
        AnswerResult::new("height")
            .with_answer_type(Arc::new(MeasurementType {
                unit: Some("cm".to_string()),
            }))
            .with_value(json!(171.5))
            .into(),
        finished(full_file("ecg").into()),
    ]);

    let mut section = BranchNodeResult::new("questionnaire");
    section.append_step_history(full_answer("numbers").into(), NavigationDirection::Forward);
    section.append_step_history(collection.into(), NavigationDirection::Forward);
    section.append_step_history(
        ErrorResult::new("camera", "permission denied", "capture", 13).into(),
        NavigationDirection::Backward,
    );
    section.set_children(vec![AnswerResult::new("when")
        .with_answer_type(Arc::new(DateTimeType {
            coding_format: Some("yyyy-MM-dd".to_string()),
        }))
        .with_value(json!("2024-05-01"))
        .into()]);
    section.finish();

    let mut nested = AssessmentResult::new("follow_up");
    nested.assessment_identifier = Some("follow_up_v2".to_string());
    nested
        .branch
        .append_step_history(StepResult::new("thanks").into(), NavigationDirection::Exit);

    let mut root = AssessmentResult::new("daily_check_in");
    root.version_string = Some("2.1.0".to_string());
    root.assessment_identifier = Some("daily".to_string());
    root.schema_identifier = Some("daily-schema".to_string());
    root.schema_location = Some("https://example.org/schemas/assessment.json".to_string());
    root.branch
        .append_step_history(StepResult::new("introduction").into(), NavigationDirection::Forward);
    root.branch
        .append_step_history(section.into(), NavigationDirection::Forward);
    root.branch
        .append_step_history(nested.into(), NavigationDirection::Forward);
    root.branch
        .append_async_result(finished(full_file("accelerometer").into()));
    root.branch.finish();
    root.into()
}

// ──────────────────────────────────────────────
// Round trips
// ──────────────────────────────────────────────

#[test]
fn full_tree_round_trips() {
    let tree = full_tree();
    let doc = to_json(&tree).unwrap();
    let decoded = from_json(&doc).unwrap();
    assert_eq!(decoded, tree);
    assert_eq!(to_json(&decoded).unwrap(), doc);
}

#[test]
fn full_tree_round_trips_through_text() {
    let tree = full_tree();
    let text = to_string_pretty(&tree).unwrap();
    assert!(text.contains("\"$schema\""));
    assert_eq!(from_str(&text).unwrap(), tree);
}

#[test]
fn every_leaf_variant_round_trips_alone() {
    let leaves: Vec<ResultNode> = vec![
        finished(StepResult::new("plain").into()),
        full_answer("answer").into(),
        AnswerResult::new("untyped")
            .with_value(json!({"free": ["form", 1, true]}))
            .into(),
        full_file("file").into(),
        ErrorResult::new("error", "timed out", "network", -1).into(),
        CollectionResult::new("empty").into(),
        BranchNodeResult::new("empty_section").into(),
    ];
    for leaf in leaves {
        let decoded = from_json(&to_json(&leaf).unwrap()).unwrap();
        assert_eq!(decoded, leaf, "round trip of {}", leaf.identifier());
    }
}

#[test]
fn wire_document_survives_decode_encode() {
    let doc = json!({
        "type": "section",
        "identifier": "survey",
        "startDate": "2024-05-01T10:00:00Z",
        "endDate": "2024-05-01T10:04:30.5Z",
        "stepHistory": [
            {
                "type": "answer",
                "identifier": "mood",
                "startDate": "2024-05-01T10:01:00Z",
                "answerType": {"type": "integer"},
                "value": 3
            },
            {
                "type": "collection",
                "identifier": "extras",
                "startDate": "2024-05-01T10:02:00Z",
                "children": [
                    {"type": "base", "identifier": "note", "startDate": "2024-05-01T10:02:10Z"}
                ]
            }
        ],
        "asyncResults": [],
        "path": [
            {"identifier": "mood", "direction": "forward"},
            {"identifier": "extras", "direction": "forward"}
        ]
    });
    let decoded = from_json(&doc).unwrap();
    assert_eq!(to_json(&decoded).unwrap(), doc);
}

// ──────────────────────────────────────────────
// Answer descriptors
// ──────────────────────────────────────────────

#[test]
fn descriptors_decode_what_they_encode() {
    let cases: Vec<(Arc<dyn AnswerType>, Value)> = vec![
        (Arc::new(IntegerType), json!(-12)),
        (Arc::new(NumberType), json!(0.125)),
        (Arc::new(StringType), json!("hello")),
        (Arc::new(ObjectType), json!({"a": [1, {"b": null}]})),
        (Arc::new(ArrayType::new(BaseType::Boolean)), json!([true, false])),
        (
            Arc::new(ArrayType::separated(BaseType::String, " | ")),
            json!(["one", "two words"]),
        ),
        (
            Arc::new(ArrayType::separated(BaseType::Number, ",")),
            json!([1, 2.5, -3]),
        ),
    ];
    for (descriptor, value) in cases {
        let encoded = descriptor.encode_answer(Some(&value)).unwrap().unwrap();
        assert_eq!(
            descriptor.decode_value(&encoded).unwrap(),
            Some(value),
            "descriptor {}",
            descriptor.type_name()
        );
    }
}

#[test]
fn answers_from_built_in_descriptors_decode_back() {
    let answers: Vec<ResultNode> = vec![
        AnswerResult::inferred("readings", json!([1, 2.5])).into(),
        AnswerResult::inferred("mixed", json!([null, "a", 3])).into(),
        AnswerResult::new("notes")
            .with_answer_type(Arc::new(ArrayType::separated(BaseType::Object, ";")))
            .with_value(json!(["plain", {"k": 1}]))
            .into(),
        AnswerResult::new("counts")
            .with_answer_type(Arc::new(ArrayType::separated(BaseType::Integer, ",")))
            .with_value(json!([u64::MAX, 0]))
            .into(),
    ];
    let mut section = BranchNodeResult::new("answers");
    for answer in answers {
        section.append_step_history(answer, NavigationDirection::Forward);
    }
    let tree: ResultNode = section.into();
    let decoded = from_json(&to_json(&tree).unwrap()).unwrap();
    assert_eq!(decoded, tree);
}

#[derive(Debug)]
struct YesNoType;

impl AnswerType for YesNoType {
    fn type_name(&self) -> &str {
        "yes-no"
    }

    fn encode_answer(&self, value: Option<&Value>) -> Result<Option<Value>, AnswerTypeError> {
        Ok(value.and_then(Value::as_bool).map(|b| json!(if b { "Y" } else { "N" })))
    }

    fn decode_value(&self, raw: &Value) -> Result<Option<Value>, AnswerTypeError> {
        match raw.as_str() {
            Some("Y") => Ok(Some(json!(true))),
            Some("N") => Ok(Some(json!(false))),
            _ => Err(AnswerTypeError::Decoding {
                type_name: "yes-no".to_string(),
                found: raw.to_string(),
                message: "expected Y or N".to_string(),
            }),
        }
    }
}

fn yes_no_factory(_: &Map<String, Value>) -> Result<Arc<dyn AnswerType>, AnswerTypeError> {
    Ok(Arc::new(YesNoType))
}

#[test]
fn custom_descriptor_needs_registration() {
    let answer: ResultNode = AnswerResult::new("consent")
        .with_answer_type(Arc::new(YesNoType))
        .with_value(json!(true))
        .into();
    let doc = to_json(&answer).unwrap();
    assert_eq!(doc["value"], "Y");

    let mut registry = AnswerTypeRegistry::with_builtins();
    registry.register("yes-no", yes_no_factory);
    let codec = ResultCodec::new(registry);
    assert_eq!(codec.decode(&doc).unwrap(), answer);

    let mut extended = ResultCodec::default();
    assert!(!extended.answer_types().contains("yes-no"));
    extended.answer_types_mut().register("yes-no", yes_no_factory);
    assert!(extended.answer_types().contains("yes-no"));
    assert_eq!(extended.decode(&doc).unwrap(), answer);

    // Without the registration the value stays as it was written.
    let fallback = from_json(&doc).unwrap();
    let fallback = fallback.as_answer().unwrap();
    assert!(fallback.answer_type.is_none());
    assert_eq!(fallback.value, Some(json!("Y")));
}

// ──────────────────────────────────────────────
// Deep copy
// ──────────────────────────────────────────────

fn assert_distinct(a: &ResultNode, b: &ResultNode) {
    assert!(!std::ptr::eq(a, b), "{} shares storage", a.identifier());
    if let (Some(x), Some(y)) = (a.as_branch(), b.as_branch()) {
        for (l, r) in x.step_history.iter().zip(&y.step_history) {
            assert_distinct(l, r);
        }
        for (l, r) in x.children().iter().zip(y.children()) {
            assert_distinct(l, r);
        }
    }
    if let (ResultNode::Collection(x), ResultNode::Collection(y)) = (a, b) {
        for (l, r) in x.children.iter().zip(&y.children) {
            assert_distinct(l, r);
        }
    }
}

#[test]
fn deep_copy_is_independent() {
    let original = full_tree();
    let mut copy = original.deep_copy();
    assert_eq!(copy, original);
    assert_distinct(&original, &copy);

    copy.find_answer_mut("heart_rate").unwrap().value = Some(json!(90));
    assert_eq!(
        original.find_answer("heart_rate").unwrap().value,
        Some(json!(72))
    );
    assert_eq!(copy.find_answer("heart_rate").unwrap().value, Some(json!(90)));
    assert_ne!(copy, original);
}
