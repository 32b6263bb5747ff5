use serde::Deserialize;

use super::domain::ReportType;
use crate::workflows::students::StudentId;

/// Raw report body. Every field is optional so missing input surfaces as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub reported_user_id: Option<String>,
    pub reported_by: Option<String>,
    pub description: Option<String>,
}

/// A submission that passed intake checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReport {
    pub report_type: ReportType,
    pub reported_user_id: StudentId,
    pub reported_by: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportIntakeError {
    #[error("Missing required fields")]
    MissingFields(Vec<&'static str>),
    #[error("Invalid report type")]
    InvalidType(String),
}

impl ReportSubmission {
    pub fn validate(self) -> Result<ValidatedReport, ReportIntakeError> {
        let ReportSubmission {
            report_type,
            reported_user_id,
            reported_by,
            description,
        } = self;

        let mut missing = Vec::new();
        let report_type = required(report_type, "type", &mut missing);
        let reported_user_id = required(reported_user_id, "reportedUserId", &mut missing);
        let reported_by = required(reported_by, "reportedBy", &mut missing);
        let description = required(description, "description", &mut missing);

        let (Some(report_type), Some(reported_user_id), Some(reported_by), Some(description)) =
            (report_type, reported_user_id, reported_by, description)
        else {
            return Err(ReportIntakeError::MissingFields(missing));
        };

        let report_type =
            ReportType::parse(&report_type).ok_or(ReportIntakeError::InvalidType(report_type))?;

        Ok(ValidatedReport {
            report_type,
            reported_user_id: StudentId(reported_user_id.trim().to_string()),
            reported_by,
            description,
        })
    }
}

// Blank strings count as missing.
fn required(
    value: Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => {
            missing.push(field);
            None
        }
    }
}
