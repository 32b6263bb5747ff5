use serde::{Deserialize, Serialize};

use crate::workflows::students::{StudentId, StudentStatus};

/// Identity provider callback payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInCallback {
    pub email: Option<String>,
    pub name: Option<String>,
    pub provider_account_id: Option<String>,
}

/// Outcome handed back to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum SignInDecision {
    Accept {
        #[serde(rename = "studentId")]
        student_id: StudentId,
        status: StudentStatus,
        created: bool,
    },
    Redirect {
        location: String,
    },
    Deny {
        reason: String,
    },
}

/// Student facts attached to an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub student_id: Option<StudentId>,
    pub student_status: Option<StudentStatus>,
    pub has_completed_onboarding: bool,
}

impl SessionView {
    pub fn anonymous() -> Self {
        Self {
            student_id: None,
            student_status: None,
            has_completed_onboarding: false,
        }
    }
}
