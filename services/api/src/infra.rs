use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::warn;
use wander_nest::config::MailConfig;
use wander_nest::notifications::{LogMailer, MailError, Mailer, OutboundEmail, SmtpMailer};
use wander_nest::workflows::safety::{
    RecordedReport, Report, ReportId, ReportRepository, ReportStatus,
};
use wander_nest::workflows::students::{
    RepositoryError, Student, StudentId, StudentRepository,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct Tables {
    students: HashMap<StudentId, Student>,
    reports: Vec<Report>,
}

/// Process-local store backing both repositories. A single lock covers
/// students and reports so a report insert and its pattern count are one step.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub(crate) fn report_count(&self) -> usize {
        self.tables.lock().expect("store mutex poisoned").reports.len()
    }
}

impl StudentRepository for InMemoryStore {
    fn insert(&self, student: Student) -> Result<Student, RepositoryError> {
        let mut guard = self.tables.lock().expect("store mutex poisoned");
        if guard
            .students
            .values()
            .any(|existing| existing.email == student.email)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.students.insert(student.id.clone(), student.clone());
        Ok(student)
    }

    fn update(&self, student: Student) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("store mutex poisoned");
        if guard.students.contains_key(&student.id) {
            guard.students.insert(student.id.clone(), student);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        let guard = self.tables.lock().expect("store mutex poisoned");
        Ok(guard.students.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Student>, RepositoryError> {
        let guard = self.tables.lock().expect("store mutex poisoned");
        Ok(guard
            .students
            .values()
            .find(|student| student.email == email)
            .cloned())
    }
}

impl ReportRepository for InMemoryStore {
    fn record_and_count(
        &self,
        report: Report,
        window_start: DateTime<Utc>,
    ) -> Result<RecordedReport, RepositoryError> {
        let mut guard = self.tables.lock().expect("store mutex poisoned");
        guard.reports.push(report.clone());
        let recent_reports = count_recent(&guard.reports, &report.reported_user_id, window_start);
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
        let mut guard = self.tables.lock().expect("store mutex poisoned");
        let report = guard
            .reports
            .iter_mut()
            .find(|report| &report.id == id)
            .ok_or(RepositoryError::NotFound)?;
        report.status = status;
        report.action_taken = action_taken;
        Ok(report.clone())
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError> {
        let guard = self.tables.lock().expect("store mutex poisoned");
        Ok(guard.reports.iter().find(|report| &report.id == id).cloned())
    }

    fn count_since(
        &self,
        reported_user_id: &StudentId,
        window_start: DateTime<Utc>,
    ) -> Result<u32, RepositoryError> {
        let guard = self.tables.lock().expect("store mutex poisoned");
        Ok(count_recent(&guard.reports, reported_user_id, window_start))
    }
}

fn count_recent(reports: &[Report], student: &StudentId, window_start: DateTime<Utc>) -> u32 {
    let count = reports
        .iter()
        .filter(|report| &report.reported_user_id == student && report.created_at >= window_start)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Mail transport chosen at startup from the SMTP settings.
#[derive(Debug)]
pub(crate) enum ConfiguredMailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl ConfiguredMailer {
    pub(crate) fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        if config.smtp_enabled() {
            Ok(Self::Smtp(SmtpMailer::from_config(config)?))
        } else {
            warn!("EMAIL_USER/EMAIL_PASS not set; admin alerts will only be logged");
            Ok(Self::Log(LogMailer))
        }
    }
}

impl Mailer for ConfiguredMailer {
    fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        match self {
            Self::Smtp(mailer) => mailer.send(email),
            Self::Log(mailer) => mailer.send(email),
        }
    }
}

/// Keeps every email in memory; used by the demo to show which alerts fired.
#[derive(Default, Clone)]
pub(crate) struct OutboxMailer {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl Mailer for OutboxMailer {
    fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let mut guard = self.sent.lock().expect("outbox mutex poisoned");
        guard.push(email);
        Ok(())
    }
}

impl OutboxMailer {
    pub(crate) fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("outbox mutex poisoned").clone()
    }
}
