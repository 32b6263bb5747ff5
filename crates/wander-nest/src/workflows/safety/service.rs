use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::domain::{Report, ReportId, ReportReceipt, ReportStatus};
use super::escalation::{EscalationPolicy, EscalationTrigger};
use super::intake::{ReportIntakeError, ReportSubmission};
use super::repository::ReportRepository;
use crate::notifications::{admin_alert_email, AdminAlert, AlertUrgency, Mailer};
use crate::workflows::students::{
    RepositoryError, Student, StudentId, StudentRepository, StudentStatus,
};

const SUBMITTED_MESSAGE: &str = "Report submitted successfully";

/// Report intake, escalation, and the admin operations around reported students.
pub struct SafetyService<R, S, M> {
    reports: Arc<R>,
    students: Arc<S>,
    mailer: Arc<M>,
    policy: EscalationPolicy,
    admin_recipient: String,
}

/// Result of flagging a student for manual review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualReviewOutcome {
    pub student_id: StudentId,
    pub recent_reports: u32,
    pub status: StudentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidelinesAcknowledgement {
    pub student_id: StudentId,
    pub acknowledged_at: DateTime<Utc>,
}

impl<R, S, M> SafetyService<R, S, M>
where
    R: ReportRepository + 'static,
    S: StudentRepository + 'static,
    M: Mailer + 'static,
{
    pub fn new(
        reports: Arc<R>,
        students: Arc<S>,
        mailer: Arc<M>,
        policy: EscalationPolicy,
        admin_recipient: impl Into<String>,
    ) -> Self {
        Self {
            reports,
            students,
            mailer,
            policy,
            admin_recipient: admin_recipient.into(),
        }
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    pub fn submit_report(
        &self,
        submission: ReportSubmission,
    ) -> Result<ReportReceipt, SafetyServiceError> {
        self.submit_report_at(submission, Utc::now())
    }

    /// Validate, record, and escalate a report as of `now`.
    pub fn submit_report_at(
        &self,
        submission: ReportSubmission,
        now: DateTime<Utc>,
    ) -> Result<ReportReceipt, SafetyServiceError> {
        let validated = submission.validate()?;
        let student_id = validated.reported_user_id.clone();
        self.require_student(&student_id)?;

        let recorded = self
            .reports
            .record_and_count(Report::pending(validated, now), self.policy.window_start(now))
            .map_err(processing_failure)?;
        let report = recorded.report;

        let assessment = self
            .policy
            .assess(report.report_type, recorded.recent_reports);

        for trigger in assessment.triggers() {
            match trigger {
                EscalationTrigger::ImmediateSuspension => {
                    self.notify_admins(AdminAlert {
                        reference: report.id.to_string(),
                        kind: report.report_type.as_str().to_string(),
                        reported_user_id: student_id.to_string(),
                        reported_by: report.reported_by.clone(),
                        description: report.description.clone(),
                        urgency: AlertUrgency::Urgent,
                    });
                    self.students
                        .update_status(&student_id, StudentStatus::Suspended)
                        .map_err(processing_failure)?;
                    warn!(
                        student_id = %student_id,
                        report_id = %report.id,
                        report_type = report.report_type.as_str(),
                        "student suspended pending investigation"
                    );
                }
                EscalationTrigger::PatternDetected { report_count } => {
                    self.notify_admins(AdminAlert {
                        reference: report.id.to_string(),
                        kind: "PATTERN_DETECTED".to_string(),
                        reported_user_id: student_id.to_string(),
                        reported_by: "SYSTEM".to_string(),
                        description: format!(
                            "User has {report_count} reports in the last {} days. Manual review recommended.",
                            self.policy.pattern_window_days()
                        ),
                        urgency: AlertUrgency::Review,
                    });
                }
            }
        }

        if let Some(action_taken) = assessment.action_taken() {
            self.reports
                .set_review_state(&report.id, ReportStatus::UnderReview, Some(action_taken))
                .map_err(processing_failure)?;
        }

        info!(
            report_id = %report.id,
            student_id = %student_id,
            report_type = report.report_type.as_str(),
            recent_reports = recorded.recent_reports,
            escalated = assessment.is_escalated(),
            "report recorded"
        );

        Ok(ReportReceipt {
            success: true,
            report_id: report.id,
            message: SUBMITTED_MESSAGE.to_string(),
            immediate_action: assessment.immediate_action(),
        })
    }

    pub fn report(&self, id: &ReportId) -> Result<Report, SafetyServiceError> {
        self.reports
            .fetch(id)
            .map_err(processing_failure)?
            .ok_or_else(|| SafetyServiceError::ReportNotFound(id.clone()))
    }

    /// Reports against `student_id` inside the pattern window ending at `now`.
    pub fn recent_report_count_at(
        &self,
        student_id: &StudentId,
        now: DateTime<Utc>,
    ) -> Result<u32, SafetyServiceError> {
        self.require_student(student_id)?;
        self.reports
            .count_since(student_id, self.policy.window_start(now))
            .map_err(processing_failure)
    }

    pub fn recent_report_count(&self, student_id: &StudentId) -> Result<u32, SafetyServiceError> {
        self.recent_report_count_at(student_id, Utc::now())
    }

    /// Alert admins and drop the student back to pending approval.
    pub fn flag_for_manual_review(
        &self,
        student_id: &StudentId,
    ) -> Result<ManualReviewOutcome, SafetyServiceError> {
        let recent_reports = self.recent_report_count(student_id)?;

        self.notify_admins(AdminAlert {
            reference: "PATTERN_ALERT".to_string(),
            kind: "MANUAL_REVIEW_REQUIRED".to_string(),
            reported_user_id: student_id.to_string(),
            reported_by: "SYSTEM".to_string(),
            description: format!(
                "User {student_id} has {recent_reports} reports. Requires manual review."
            ),
            urgency: AlertUrgency::Review,
        });

        let student = self
            .students
            .update_status(student_id, StudentStatus::PendingApproval)
            .map_err(processing_failure)?;

        info!(student_id = %student_id, recent_reports, "student flagged for manual review");

        Ok(ManualReviewOutcome {
            student_id: student.id,
            recent_reports,
            status: student.status,
        })
    }

    pub fn acknowledge_guidelines(
        &self,
        student_id: &StudentId,
    ) -> Result<GuidelinesAcknowledgement, SafetyServiceError> {
        self.acknowledge_guidelines_at(student_id, Utc::now())
    }

    pub fn acknowledge_guidelines_at(
        &self,
        student_id: &StudentId,
        now: DateTime<Utc>,
    ) -> Result<GuidelinesAcknowledgement, SafetyServiceError> {
        let mut student = self.require_student(student_id)?;
        student.safety_guidelines_acknowledged = true;
        student.safety_acknowledged_at = Some(now);
        self.students.update(student).map_err(processing_failure)?;

        Ok(GuidelinesAcknowledgement {
            student_id: student_id.clone(),
            acknowledged_at: now,
        })
    }

    fn require_student(&self, student_id: &StudentId) -> Result<Student, SafetyServiceError> {
        self.students
            .fetch(student_id)
            .map_err(processing_failure)?
            .ok_or_else(|| SafetyServiceError::StudentNotFound(student_id.clone()))
    }

    fn notify_admins(&self, alert: AdminAlert) {
        let email = admin_alert_email(&self.admin_recipient, &alert);
        if let Err(err) = self.mailer.send(email) {
            warn!(
                error = %err,
                reference = %alert.reference,
                kind = %alert.kind,
                "admin safety alert was not delivered"
            );
        }
    }
}

fn processing_failure(err: RepositoryError) -> SafetyServiceError {
    error!(error = %err, "safety workflow persistence failure");
    SafetyServiceError::Processing(err)
}

/// Error raised by the safety service. `Processing` hides its cause from clients.
#[derive(Debug, thiserror::Error)]
pub enum SafetyServiceError {
    #[error(transparent)]
    Validation(#[from] ReportIntakeError),
    #[error("student {0} not found")]
    StudentNotFound(StudentId),
    #[error("report {0} not found")]
    ReportNotFound(ReportId),
    #[error("Failed to process report")]
    Processing(#[source] RepositoryError),
}
