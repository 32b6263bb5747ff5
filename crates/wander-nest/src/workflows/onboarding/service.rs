use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use url::form_urlencoded;

use super::domain_gate::InstitutionalEmailPolicy;
use super::manual_verification::{ManualVerificationError, ManualVerificationRequest};
use super::sign_in::{SessionView, SignInCallback, SignInDecision};
use crate::workflows::students::{
    normalize_email, RepositoryError, Student, StudentId, StudentRepository, StudentStatus,
};

/// Auth gateway composing the institutional email policy with the student store.
pub struct OnboardingService<S> {
    policy: InstitutionalEmailPolicy,
    students: Arc<S>,
    manual_verification_path: String,
}

impl<S> OnboardingService<S>
where
    S: StudentRepository + 'static,
{
    pub fn new(
        policy: InstitutionalEmailPolicy,
        students: Arc<S>,
        manual_verification_path: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            students,
            manual_verification_path: manual_verification_path.into(),
        }
    }

    pub fn policy(&self) -> &InstitutionalEmailPolicy {
        &self.policy
    }

    pub fn sign_in(&self, callback: SignInCallback) -> Result<SignInDecision, OnboardingError> {
        self.sign_in_at(callback, Utc::now())
    }

    /// Gate a sign-in on the email domain, creating a pending student on first
    /// institutional sign-in.
    pub fn sign_in_at(
        &self,
        callback: SignInCallback,
        now: DateTime<Utc>,
    ) -> Result<SignInDecision, OnboardingError> {
        let Some(email) = callback.email.filter(|email| !email.trim().is_empty()) else {
            return Ok(SignInDecision::Deny {
                reason: "identity provider did not supply an email".to_string(),
            });
        };

        if !self.policy.is_institutional(&email) {
            info!("sign-in redirected to manual verification (non-institutional domain)");
            return Ok(SignInDecision::Redirect {
                location: self.manual_verification_location(&email),
            });
        }

        if let Some(existing) = self.students.find_by_email(&normalize_email(&email))? {
            return Ok(accepted(existing, false));
        }

        let mut student = Student::pending(&email, callback.name.as_deref().unwrap_or(""), now);
        student.provider_account_id = callback.provider_account_id;

        match self.students.insert(student) {
            Ok(created) => {
                info!(student_id = %created.id, "student account created on first sign-in");
                Ok(accepted(created, true))
            }
            // A concurrent sign-in created the record first.
            Err(RepositoryError::Conflict) => {
                let existing = self
                    .students
                    .find_by_email(&normalize_email(&email))?
                    .ok_or(RepositoryError::NotFound)?;
                Ok(accepted(existing, false))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn session(&self, email: &str) -> Result<SessionView, OnboardingError> {
        let student = self.students.find_by_email(&normalize_email(email))?;
        Ok(match student {
            Some(student) => SessionView {
                student_id: Some(student.id),
                student_status: Some(student.status),
                has_completed_onboarding: true,
            },
            None => SessionView::anonymous(),
        })
    }

    pub fn submit_manual_verification(
        &self,
        request: ManualVerificationRequest,
    ) -> Result<Student, OnboardingError> {
        let student = request.into_student(Utc::now())?;

        if self.students.find_by_email(&student.email)?.is_some() {
            return Err(OnboardingError::DuplicateEmail);
        }

        match self.students.insert(student) {
            Ok(student) => {
                info!(student_id = %student.id, "manual verification application received");
                Ok(student)
            }
            Err(RepositoryError::Conflict) => Err(OnboardingError::DuplicateEmail),
            Err(err) => Err(err.into()),
        }
    }

    /// Admin approval of a pending or previously suspended student.
    pub fn approve(&self, student_id: &StudentId) -> Result<Student, OnboardingError> {
        match self
            .students
            .update_status(student_id, StudentStatus::Approved)
        {
            Ok(student) => {
                info!(student_id = %student.id, "student approved");
                Ok(student)
            }
            Err(RepositoryError::NotFound) => {
                warn!(student_id = %student_id, "approval requested for unknown student");
                Err(OnboardingError::StudentNotFound(student_id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn manual_verification_location(&self, email: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(email.trim().as_bytes()).collect();
        format!(
            "{}?error=invalid_domain&email={}",
            self.manual_verification_path, encoded
        )
    }
}

fn accepted(student: Student, created: bool) -> SignInDecision {
    SignInDecision::Accept {
        student_id: student.id,
        status: student.status,
        created,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error(transparent)]
    Validation(#[from] ManualVerificationError),
    #[error("A student with this email already exists")]
    DuplicateEmail,
    #[error("student {0} not found")]
    StudentNotFound(StudentId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
