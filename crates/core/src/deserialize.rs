//! Decoding result documents into typed trees.
//!
//! Each object's `type` field picks the result variant; nested results are
//! decoded the same way. The first error aborts the whole document.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::answer::AnswerResult;
use crate::answer_type::AnswerType;
use crate::branch::{AssessmentResult, BranchNodeResult, PathMarker};
use crate::codec::ResultCodec;
use crate::collection::CollectionResult;
use crate::error::{AnswerTypeError, ResultError};
use crate::registry::ResultType;
use crate::result::{ErrorResult, FileResult, ResultNode, StepResult};
use crate::timestamp;
use crate::value::json_kind;

impl ResultCodec {
    /// Decode a result document.
    pub fn decode(&self, doc: &Value) -> Result<ResultNode, ResultError> {
        self.decode_node(doc, "")
    }

    fn decode_node(&self, value: &Value, at: &str) -> Result<ResultNode, ResultError> {
        let obj = value.as_object().ok_or_else(|| {
            ResultError::malformed(
                at,
                format!("expected result object, got {}", json_kind(value)),
            )
        })?;
        let type_name = match obj.get("type") {
            Some(Value::String(s)) => s.as_str(),
            Some(other) => {
                return Err(ResultError::malformed(
                    at,
                    format!("'type' must be a string, got {}", json_kind(other)),
                ))
            }
            None => return Err(ResultError::malformed(at, "missing 'type' discriminator")),
        };
        let fields = Fields {
            obj,
            at,
            result_type: ResultType::resolve(type_name, at)?,
        };

        let node = match fields.result_type {
            ResultType::Base => ResultNode::Base(parse_step(&fields)?),
            ResultType::Answer => ResultNode::Answer(self.parse_answer(&fields)?),
            ResultType::Collection => ResultNode::Collection(self.parse_collection(&fields)?),
            ResultType::File => ResultNode::File(parse_file(&fields)?),
            ResultType::Error => ResultNode::Error(parse_error(&fields)?),
            ResultType::Section => ResultNode::Section(self.parse_branch(&fields)?),
            ResultType::Assessment => ResultNode::Assessment(self.parse_assessment(&fields)?),
        };
        Ok(node)
    }

    fn decode_list(
        &self,
        fields: &Fields<'_>,
        field: &str,
    ) -> Result<Option<Vec<ResultNode>>, ResultError> {
        let items = match fields.obj.get(field) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ResultError::malformed(
                    fields.at,
                    format!("'{}' must be an array, got {}", field, json_kind(other)),
                ))
            }
        };
        let mut nodes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let at = format!("{}/{}/{}", fields.at, field, index);
            nodes.push(self.decode_node(item, &at)?);
        }
        Ok(Some(nodes))
    }

    /// The descriptor is resolved before the value, which is then read
    /// through it. Unknown descriptors leave the value untyped.
    fn parse_answer(&self, fields: &Fields<'_>) -> Result<AnswerResult, ResultError> {
        let (identifier, start_date, end_date) = fields.header()?;

        let answer_type: Option<Arc<dyn AnswerType>> = match fields.obj.get("answerType") {
            None | Some(Value::Null) => None,
            Some(raw) => match self.answer_types.decode_descriptor(raw) {
                Ok(t) => Some(t),
                Err(AnswerTypeError::UnknownAnswerType { type_name }) => {
                    warn!(
                        at = %fields.at,
                        answer_type = %type_name,
                        "unknown answer type, keeping value untyped"
                    );
                    None
                }
                Err(e) => return Err(ResultError::answer(fields.at, e)),
            },
        };

        let value = match (fields.obj.get("value"), &answer_type) {
            (None, _) => None,
            (Some(raw), Some(t)) => t
                .decode_value(raw)
                .map_err(|e| ResultError::answer(fields.at, e))?,
            (Some(raw), None) => Some(raw.clone()).filter(|v| !v.is_null()),
        };

        Ok(AnswerResult {
            identifier,
            start_date,
            end_date,
            answer_type,
            value,
            question_text: fields.optional_str("questionText")?,
            question_data: fields.obj.get("questionData").cloned().filter(|v| !v.is_null()),
        })
    }

    fn parse_collection(&self, fields: &Fields<'_>) -> Result<CollectionResult, ResultError> {
        let (identifier, start_date, end_date) = fields.header()?;
        Ok(CollectionResult {
            identifier,
            start_date,
            end_date,
            children: self.decode_list(fields, "children")?.unwrap_or_default(),
        })
    }

    fn parse_branch(&self, fields: &Fields<'_>) -> Result<BranchNodeResult, ResultError> {
        let (identifier, start_date, end_date) = fields.header()?;
        let step_history = self
            .decode_list(fields, "stepHistory")?
            .ok_or_else(|| fields.missing("stepHistory"))?;
        let async_results = self.decode_list(fields, "asyncResults")?;
        Ok(BranchNodeResult {
            identifier,
            start_date,
            end_date,
            step_history,
            async_results,
            path: parse_path(fields)?,
        })
    }

    fn parse_assessment(&self, fields: &Fields<'_>) -> Result<AssessmentResult, ResultError> {
        let branch = self.parse_branch(fields)?;
        let run = fields.required_str("taskRunUUID")?;
        let task_run_uuid = Uuid::parse_str(&run).map_err(|e| {
            ResultError::malformed(fields.at, format!("'taskRunUUID' is not a UUID: {}", e))
        })?;
        Ok(AssessmentResult {
            branch,
            task_run_uuid,
            version_string: fields.optional_str("versionString")?,
            assessment_identifier: fields.optional_str("assessmentIdentifier")?,
            schema_identifier: fields.optional_str("schemaIdentifier")?,
            schema_location: fields.optional_str("$schema")?,
        })
    }
}

// ── Parsing helpers ─────────────────────────────────────────────────

struct Fields<'a> {
    obj: &'a Map<String, Value>,
    at: &'a str,
    result_type: ResultType,
}

impl Fields<'_> {
    fn missing(&self, field: &str) -> ResultError {
        ResultError::missing(self.at, self.result_type.as_str(), field)
    }

    fn required_str(&self, field: &str) -> Result<String, ResultError> {
        self.optional_str(field)?.ok_or_else(|| self.missing(field))
    }

    fn optional_str(&self, field: &str) -> Result<Option<String>, ResultError> {
        match self.obj.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(ResultError::malformed(
                self.at,
                format!("'{}' must be a string, got {}", field, json_kind(other)),
            )),
        }
    }

    fn required_i64(&self, field: &str) -> Result<i64, ResultError> {
        match self.obj.get(field) {
            None | Some(Value::Null) => Err(self.missing(field)),
            Some(v) => v.as_i64().ok_or_else(|| {
                ResultError::malformed(
                    self.at,
                    format!("'{}' must be an integer, got {}", field, json_kind(v)),
                )
            }),
        }
    }

    fn optional_date(&self, field: &str) -> Result<Option<OffsetDateTime>, ResultError> {
        self.optional_str(field)?
            .map(|text| timestamp::parse(&text, self.at, field))
            .transpose()
    }

    /// Identifier and time bounds shared by every result.
    fn header(&self) -> Result<(String, OffsetDateTime, Option<OffsetDateTime>), ResultError> {
        let identifier = self.required_str("identifier")?;
        let start_date = self
            .optional_date("startDate")?
            .ok_or_else(|| self.missing("startDate"))?;
        let end_date = self.optional_date("endDate")?;
        if let Some(end) = end_date {
            if end < start_date {
                return Err(ResultError::malformed(
                    self.at,
                    "'endDate' is earlier than 'startDate'",
                ));
            }
        }
        Ok((identifier, start_date, end_date))
    }
}

fn parse_step(fields: &Fields<'_>) -> Result<StepResult, ResultError> {
    let (identifier, start_date, end_date) = fields.header()?;
    Ok(StepResult {
        identifier,
        start_date,
        end_date,
    })
}

fn parse_file(fields: &Fields<'_>) -> Result<FileResult, ResultError> {
    let (identifier, start_date, end_date) = fields.header()?;
    Ok(FileResult {
        identifier,
        start_date,
        end_date,
        relative_path: fields.required_str("relativePath")?,
        content_type: fields.optional_str("contentType")?,
        json_schema: fields.optional_str("jsonSchema")?,
    })
}

fn parse_error(fields: &Fields<'_>) -> Result<ErrorResult, ResultError> {
    let (identifier, start_date, end_date) = fields.header()?;
    Ok(ErrorResult {
        identifier,
        start_date,
        end_date,
        description: fields.required_str("errorDescription")?,
        domain: fields.required_str("errorDomain")?,
        code: fields.required_i64("errorCode")?,
    })
}

fn parse_path(fields: &Fields<'_>) -> Result<Vec<PathMarker>, ResultError> {
    let items = match fields.obj.get("path") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ResultError::malformed(
                fields.at,
                format!("'path' must be an array, got {}", json_kind(other)),
            ))
        }
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            PathMarker::deserialize(item).map_err(|e| {
                ResultError::malformed(&format!("{}/path/{}", fields.at, index), e.to_string())
            })
        })
        .collect()
}
