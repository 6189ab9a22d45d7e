//! RFC 3339 timestamps for `startDate` / `endDate`.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::ResultError;

pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub(crate) fn format(value: &OffsetDateTime, at: &str, field: &str) -> Result<String, ResultError> {
    value.format(&Rfc3339).map_err(|e| ResultError::Timestamp {
        at: at.to_owned(),
        field: field.to_owned(),
        message: e.to_string(),
    })
}

pub(crate) fn parse(text: &str, at: &str, field: &str) -> Result<OffsetDateTime, ResultError> {
    OffsetDateTime::parse(text, &Rfc3339).map_err(|e| ResultError::Timestamp {
        at: at.to_owned(),
        field: field.to_owned(),
        message: e.to_string(),
    })
}
