use chrono::{DateTime, Utc};

use super::domain::{Report, ReportId, ReportStatus};
use crate::workflows::students::{RepositoryError, StudentId};

/// A stored report plus the pattern count observed in the same write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedReport {
    pub report: Report,
    /// Reports against the same student created at or after the window start,
    /// including `report`.
    pub recent_reports: u32,
}

/// Persistence gateway for reports. Reports are append-only; only the review
/// fields change after creation.
pub trait ReportRepository: Send + Sync {
    /// Stores `report` and counts recent reports against its student as one
    /// atomic step, so concurrent intakes never observe the same count.
    fn record_and_count(
        &self,
        report: Report,
        window_start: DateTime<Utc>,
    ) -> Result<RecordedReport, RepositoryError>;

    fn set_review_state(
        &self,
        id: &ReportId,
        status: ReportStatus,
        action_taken: Option<String>,
    ) -> Result<Report, RepositoryError>;

    fn fetch(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError>;

    fn count_since(
        &self,
        reported_user_id: &StudentId,
        window_start: DateTime<Utc>,
    ) -> Result<u32, RepositoryError>;
}
