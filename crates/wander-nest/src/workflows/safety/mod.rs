//! Safety reporting: intake validation, escalation rules, and the admin surface
//! around reported students.
//!
//! A report is always recorded before any escalation runs. Escalation may
//! suspend the reported student and move the report to `under_review`; admin
//! alerts are best-effort and never fail an intake.

pub mod contacts;
pub mod domain;
pub mod escalation;
pub mod intake;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use contacts::{emergency_contact_for_city, emergency_contacts, EmergencyContact};
pub use domain::{Report, ReportId, ReportReceipt, ReportStatus, ReportType};
pub use escalation::{EscalationAssessment, EscalationPolicy, EscalationTrigger};
pub use intake::{ReportIntakeError, ReportSubmission, ValidatedReport};
pub use repository::{RecordedReport, ReportRepository};
pub use router::safety_router;
pub use service::{
    GuidelinesAcknowledgement, ManualReviewOutcome, SafetyService, SafetyServiceError,
};
