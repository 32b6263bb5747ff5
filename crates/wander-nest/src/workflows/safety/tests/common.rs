use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::notifications::{MailError, Mailer, OutboundEmail};
use crate::workflows::safety::domain::{Report, ReportId, ReportStatus, ReportType};
use crate::workflows::safety::escalation::EscalationPolicy;
use crate::workflows::safety::intake::ReportSubmission;
use crate::workflows::safety::repository::{RecordedReport, ReportRepository};
use crate::workflows::safety::SafetyService;
use crate::workflows::students::{
    RepositoryError, Student, StudentId, StudentRepository, StudentStatus,
};

pub(super) const ADMIN: &str = "safety@wandernest.com";

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(super) fn submission(report_type: &str, student_id: &StudentId) -> ReportSubmission {
    ReportSubmission {
        report_type: Some(report_type.to_string()),
        reported_user_id: Some(student_id.0.clone()),
        reported_by: Some("tourist-42".to_string()),
        description: Some("Guide did not arrive at the agreed meeting point.".to_string()),
    }
}

pub(super) fn stored_report(
    student_id: &StudentId,
    report_type: ReportType,
    created_at: DateTime<Utc>,
) -> Report {
    Report {
        id: ReportId::generate(),
        report_type,
        reported_user_id: student_id.clone(),
        reported_by: "tourist-7".to_string(),
        description: "earlier complaint".to_string(),
        status: ReportStatus::Pending,
        action_taken: None,
        created_at,
    }
}

pub(super) type TestService = SafetyService<MemoryReports, MemoryStudents, MemoryMailer>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryReports>,
    Arc<MemoryStudents>,
    Arc<MemoryMailer>,
) {
    let reports = Arc::new(MemoryReports::default());
    let students = Arc::new(MemoryStudents::default());
    let mailer = Arc::new(MemoryMailer::default());
    let service = SafetyService::new(
        reports.clone(),
        students.clone(),
        mailer.clone(),
        EscalationPolicy::default(),
        ADMIN,
    );
    (service, reports, students, mailer)
}

pub(super) fn seed_student(students: &MemoryStudents, status: StudentStatus) -> StudentId {
    let mut student = Student::pending("priya@iitb.ac.in", "Priya", days_ago(400));
    student.status = status;
    let id = student.id.clone();
    students.insert(student).expect("seed student");
    id
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default)]
pub(super) struct MemoryReports {
    records: Mutex<Vec<Report>>,
}

impl MemoryReports {
    pub(super) fn seed(&self, report: Report) {
        self.records.lock().expect("reports mutex poisoned").push(report);
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("reports mutex poisoned").len()
    }
}

impl ReportRepository for MemoryReports {
    fn record_and_count(
        &self,
        report: Report,
        window_start: DateTime<Utc>,
    ) -> Result<RecordedReport, RepositoryError> {
        let mut guard = self.records.lock().expect("reports mutex poisoned");
        guard.push(report.clone());
        let recent_reports = guard
            .iter()
            .filter(|stored| {
                stored.reported_user_id == report.reported_user_id
                    && stored.created_at >= window_start
            })
            .count() as u32;
        Ok(RecordedReport {
            report,
            recent_reports,
        })
    }

    fn set_review_state(
        &self,
        id: &ReportId,
        status: ReportStatus,
        action_taken: Option<String>,
    ) -> Result<Report, RepositoryError> {
        let mut guard = self.records.lock().expect("reports mutex poisoned");
        let report = guard
            .iter_mut()
            .find(|report| &report.id == id)
            .ok_or(RepositoryError::NotFound)?;
        report.status = status;
        report.action_taken = action_taken;
        Ok(report.clone())
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError> {
        let guard = self.records.lock().expect("reports mutex poisoned");
        Ok(guard.iter().find(|report| &report.id == id).cloned())
    }

    fn count_since(
        &self,
        reported_user_id: &StudentId,
        window_start: DateTime<Utc>,
    ) -> Result<u32, RepositoryError> {
        let guard = self.records.lock().expect("reports mutex poisoned");
        Ok(guard
            .iter()
            .filter(|report| {
                &report.reported_user_id == reported_user_id && report.created_at >= window_start
            })
            .count() as u32)
    }
}

#[derive(Default)]
pub(super) struct MemoryStudents {
    records: Mutex<HashMap<StudentId, Student>>,
}

impl MemoryStudents {
    pub(super) fn student(&self, id: &StudentId) -> Student {
        self.fetch(id)
            .expect("fetch succeeds")
            .expect("student exists")
    }

    pub(super) fn status_of(&self, id: &StudentId) -> StudentStatus {
        self.student(id).status
    }
}

impl StudentRepository for MemoryStudents {
    fn insert(&self, student: Student) -> Result<Student, RepositoryError> {
        let mut guard = self.records.lock().expect("students mutex poisoned");
        if guard.values().any(|existing| existing.email == student.email) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(student.id.clone(), student.clone());
        Ok(student)
    }

    fn update(&self, student: Student) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("students mutex poisoned");
        match guard.get_mut(&student.id) {
            Some(existing) => {
                *existing = student;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        let guard = self.records.lock().expect("students mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Student>, RepositoryError> {
        let guard = self.records.lock().expect("students mutex poisoned");
        Ok(guard.values().find(|student| student.email == email).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl MemoryMailer {
    pub(super) fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        self.sent.lock().expect("mailer mutex poisoned").push(email);
        Ok(())
    }
}

pub(super) struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _email: OutboundEmail) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".to_string()))
    }
}

/// Accepts reads but fails every write.
pub(super) struct UnavailableReports;

impl ReportRepository for UnavailableReports {
    fn record_and_count(
        &self,
        _report: Report,
        _window_start: DateTime<Utc>,
    ) -> Result<RecordedReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_review_state(
        &self,
        _id: &ReportId,
        _status: ReportStatus,
        _action_taken: Option<String>,
    ) -> Result<Report, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ReportId) -> Result<Option<Report>, RepositoryError> {
        Ok(None)
    }

    fn count_since(
        &self,
        _reported_user_id: &StudentId,
        _window_start: DateTime<Utc>,
    ) -> Result<u32, RepositoryError> {
        Ok(0)
    }
}
