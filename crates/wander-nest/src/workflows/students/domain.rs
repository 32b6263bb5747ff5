use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque student identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

impl StudentId {
    pub fn generate() -> Self {
        Self(format!("stu_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account lifecycle. Approval is driven by admins, suspension by the safety workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentStatus {
    PendingApproval,
    Approved,
    Suspended,
}

impl StudentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            StudentStatus::PendingApproval => "PENDING_APPROVAL",
            StudentStatus::Approved => "APPROVED",
            StudentStatus::Suspended => "SUSPENDED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub email: String,
    pub name: String,
    pub provider_account_id: Option<String>,
    pub institute: Option<String>,
    pub nationality: Option<String>,
    pub city: Option<String>,
    pub cover_letter: Option<String>,
    pub id_card_url: Option<String>,
    pub status: StudentStatus,
    pub safety_guidelines_acknowledged: bool,
    pub safety_acknowledged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// A fresh account awaiting admin approval.
    pub fn pending(email: &str, name: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: StudentId::generate(),
            email: normalize_email(email),
            name: name.trim().to_string(),
            provider_account_id: None,
            institute: None,
            nationality: None,
            city: None,
            cover_letter: None,
            id_card_url: None,
            status: StudentStatus::PendingApproval,
            safety_guidelines_acknowledged: false,
            safety_acknowledged_at: None,
            created_at,
        }
    }
}

/// Canonical form used for storage and uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
