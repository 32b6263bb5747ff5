use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::contacts::{emergency_contact_for_city, emergency_contacts};
use super::domain::ReportId;
use super::intake::ReportSubmission;
use super::repository::ReportRepository;
use super::service::{SafetyService, SafetyServiceError};
use crate::notifications::Mailer;
use crate::workflows::students::{StudentId, StudentRepository};

/// Router exposing report intake, safety acknowledgement, and admin report endpoints.
pub fn safety_router<R, S, M>(service: Arc<SafetyService<R, S, M>>) -> Router
where
    R: ReportRepository + 'static,
    S: StudentRepository + 'static,
    M: Mailer + 'static,
{
    Router::new()
        .route("/api/reports", post(submit_handler::<R, S, M>))
        .route("/api/reports/:report_id", get(report_handler::<R, S, M>))
        .route("/api/safety/acknowledge", post(acknowledge_handler::<R, S, M>))
        .route("/api/safety/emergency-contacts", get(contacts_handler))
        .route(
            "/api/safety/emergency-contacts/:city",
            get(city_contact_handler),
        )
        .route(
            "/api/admin/students/:student_id/report-count",
            get(report_count_handler::<R, S, M>),
        )
        .route(
            "/api/admin/students/:student_id/manual-review",
            post(manual_review_handler::<R, S, M>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AcknowledgeRequest {
    pub(crate) student_id: Option<String>,
}

pub(crate) async fn submit_handler<R, S, M>(
    State(service): State<Arc<SafetyService<R, S, M>>>,
    payload: Result<Json<ReportSubmission>, JsonRejection>,
) -> Response
where
    R: ReportRepository + 'static,
    S: StudentRepository + 'static,
    M: Mailer + 'static,
{
    let Ok(Json(submission)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid report payload");
    };

    match service.submit_report(submission) {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn report_handler<R, S, M>(
    State(service): State<Arc<SafetyService<R, S, M>>>,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    S: StudentRepository + 'static,
    M: Mailer + 'static,
{
    match service.report(&ReportId(report_id)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn acknowledge_handler<R, S, M>(
    State(service): State<Arc<SafetyService<R, S, M>>>,
    payload: Result<Json<AcknowledgeRequest>, JsonRejection>,
) -> Response
where
    R: ReportRepository + 'static,
    S: StudentRepository + 'static,
    M: Mailer + 'static,
{
    let student_id = payload
        .ok()
        .and_then(|Json(request)| request.student_id)
        .filter(|id| !id.trim().is_empty());
    let Some(student_id) = student_id else {
        return error_response(StatusCode::BAD_REQUEST, "Student ID is required");
    };

    match service.acknowledge_guidelines(&StudentId(student_id)) {
        Ok(ack) => {
            let payload = json!({
                "success": true,
                "message": "Safety guidelines acknowledged",
                "acknowledgedAt": ack.acknowledged_at,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn contacts_handler() -> Response {
    (StatusCode::OK, Json(emergency_contacts())).into_response()
}

pub(crate) async fn city_contact_handler(Path(city): Path<String>) -> Response {
    match emergency_contact_for_city(&city) {
        Some(contact) => (StatusCode::OK, Json(contact)).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            &format!("no emergency contacts listed for {city}"),
        ),
    }
}

pub(crate) async fn report_count_handler<R, S, M>(
    State(service): State<Arc<SafetyService<R, S, M>>>,
    Path(student_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    S: StudentRepository + 'static,
    M: Mailer + 'static,
{
    let student_id = StudentId(student_id);
    match service.recent_report_count(&student_id) {
        Ok(count) => {
            let payload = json!({
                "studentId": student_id,
                "recentReports": count,
                "threshold": service.policy().pattern_threshold(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn manual_review_handler<R, S, M>(
    State(service): State<Arc<SafetyService<R, S, M>>>,
    Path(student_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    S: StudentRepository + 'static,
    M: Mailer + 'static,
{
    match service.flag_for_manual_review(&StudentId(student_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => service_error_response(err),
    }
}

fn service_error_response(err: SafetyServiceError) -> Response {
    let status = match &err {
        SafetyServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        SafetyServiceError::StudentNotFound(_) | SafetyServiceError::ReportNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        SafetyServiceError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &err.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
