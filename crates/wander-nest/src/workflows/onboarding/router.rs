use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartError, rejection::JsonRejection, FromRequest, Multipart, Path, Query,
        Request, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::manual_verification::ManualVerificationRequest;
use super::service::{OnboardingError, OnboardingService};
use super::sign_in::{SessionView, SignInCallback, SignInDecision};
use crate::workflows::students::{StudentId, StudentRepository};

/// Router for the identity-provider callback, session lookups, and student intake.
pub fn onboarding_router<S>(service: Arc<OnboardingService<S>>) -> Router
where
    S: StudentRepository + 'static,
{
    Router::new()
        .route("/api/auth/callback", post(sign_in_handler::<S>))
        .route("/api/auth/session", get(session_handler::<S>))
        .route(
            "/api/student/manual-verification",
            post(manual_verification_handler::<S>),
        )
        .route(
            "/api/admin/students/:student_id/approve",
            post(approve_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionQuery {
    #[serde(default)]
    pub(crate) email: Option<String>,
}

pub(crate) async fn sign_in_handler<S>(
    State(service): State<Arc<OnboardingService<S>>>,
    payload: Result<Json<SignInCallback>, JsonRejection>,
) -> Response
where
    S: StudentRepository + 'static,
{
    let Ok(Json(callback)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid sign-in payload");
    };

    match service.sign_in(callback) {
        Ok(decision @ SignInDecision::Deny { .. }) => {
            (StatusCode::FORBIDDEN, Json(decision)).into_response()
        }
        Ok(decision) => (StatusCode::OK, Json(decision)).into_response(),
        Err(err) => onboarding_error_response(err),
    }
}

pub(crate) async fn session_handler<S>(
    State(service): State<Arc<OnboardingService<S>>>,
    Query(query): Query<SessionQuery>,
) -> Response
where
    S: StudentRepository + 'static,
{
    let Some(email) = query.email.filter(|email| !email.trim().is_empty()) else {
        return (StatusCode::OK, Json(SessionView::anonymous())).into_response();
    };

    match service.session(&email) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => onboarding_error_response(err),
    }
}

pub(crate) async fn manual_verification_handler<S>(
    State(service): State<Arc<OnboardingService<S>>>,
    request: Request,
) -> Response
where
    S: StudentRepository + 'static,
{
    let Some(application) = read_application(request).await else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid application payload");
    };

    match service.submit_manual_verification(application) {
        Ok(student) => {
            let payload = json!({
                "success": true,
                "message": "Application submitted successfully",
                "studentId": student.id,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => onboarding_error_response(err),
    }
}

pub(crate) async fn approve_handler<S>(
    State(service): State<Arc<OnboardingService<S>>>,
    Path(student_id): Path<String>,
) -> Response
where
    S: StudentRepository + 'static,
{
    match service.approve(&StudentId(student_id)) {
        Ok(student) => {
            let payload = json!({
                "studentId": student.id,
                "status": student.status,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => onboarding_error_response(err),
    }
}

/// The web form posts `multipart/form-data`; JSON bodies are accepted too.
async fn read_application(request: Request) -> Option<ManualVerificationRequest> {
    if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &()).await.ok()?;
        read_multipart_application(multipart).await.ok()
    } else {
        let Json(application) = Json::<ManualVerificationRequest>::from_request(request, &())
            .await
            .ok()?;
        Some(application)
    }
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

async fn read_multipart_application(
    mut multipart: Multipart,
) -> Result<ManualVerificationRequest, MultipartError> {
    let mut application = ManualVerificationRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let slot = match name.as_str() {
            "email" => &mut application.email,
            "name" => &mut application.name,
            "institute" => &mut application.institute,
            "nationality" => &mut application.nationality,
            "city" => &mut application.city,
            "coverLetter" => &mut application.cover_letter,
            "idCardUrl" => &mut application.id_card_url,
            // The ID card upload (`idCardFile`) is drained and not stored.
            _ => {
                field.bytes().await?;
                continue;
            }
        };
        *slot = Some(field.text().await?);
    }

    Ok(application)
}

fn onboarding_error_response(err: OnboardingError) -> Response {
    match err {
        OnboardingError::Validation(err) => {
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        OnboardingError::DuplicateEmail => error_response(StatusCode::CONFLICT, &err.to_string()),
        OnboardingError::StudentNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, &err.to_string())
        }
        OnboardingError::Repository(source) => {
            error!(error = %source, "onboarding persistence failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
