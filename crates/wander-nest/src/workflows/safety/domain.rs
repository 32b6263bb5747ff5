use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::intake::ValidatedReport;
use crate::workflows::students::StudentId;

/// Opaque report identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl ReportId {
    pub fn generate() -> Self {
        Self(format!("rpt_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    SafetyConcern,
    Harassment,
    InappropriateBehavior,
    PaymentDispute,
    NoShow,
    Other,
}

impl ReportType {
    pub const ALL: [Self; 6] = [
        Self::SafetyConcern,
        Self::Harassment,
        Self::InappropriateBehavior,
        Self::PaymentDispute,
        Self::NoShow,
        Self::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SafetyConcern => "SAFETY_CONCERN",
            Self::Harassment => "HARASSMENT",
            Self::InappropriateBehavior => "INAPPROPRIATE_BEHAVIOR",
            Self::PaymentDispute => "PAYMENT_DISPUTE",
            Self::NoShow => "NO_SHOW",
            Self::Other => "OTHER",
        }
    }

    /// Exact, case-sensitive match on the wire name.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

/// Review state of a report. `Resolved` is only ever set by admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    UnderReview,
    Resolved,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::UnderReview => "under_review",
            ReportStatus::Resolved => "resolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub reported_user_id: StudentId,
    pub reported_by: String,
    pub description: String,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn pending(validated: ValidatedReport, created_at: DateTime<Utc>) -> Self {
        let ValidatedReport {
            report_type,
            reported_user_id,
            reported_by,
            description,
        } = validated;

        Self {
            id: ReportId::generate(),
            report_type,
            reported_user_id,
            reported_by,
            description,
            status: ReportStatus::Pending,
            action_taken: None,
            created_at,
        }
    }
}

/// Body returned to the reporting client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportReceipt {
    pub success: bool,
    pub report_id: ReportId,
    pub message: String,
    pub immediate_action: bool,
}
