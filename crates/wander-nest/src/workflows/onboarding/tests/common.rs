use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::AuthConfig;
use crate::workflows::onboarding::{
    InstitutionalEmailPolicy, ManualVerificationRequest, OnboardingService, SignInCallback,
};
use crate::workflows::students::{RepositoryError, Student, StudentId, StudentRepository};

pub(super) fn build_service() -> (OnboardingService<MemoryStudents>, Arc<MemoryStudents>) {
    let students = Arc::new(MemoryStudents::default());
    let config = AuthConfig::default();
    let policy = InstitutionalEmailPolicy::from_config(&config).expect("default policy compiles");
    let service = OnboardingService::new(policy, students.clone(), config.manual_verification_path);
    (service, students)
}

pub(super) fn callback(email: &str) -> SignInCallback {
    SignInCallback {
        email: Some(email.to_string()),
        name: Some("Arjun Mehta".to_string()),
        provider_account_id: Some("google-10987".to_string()),
    }
}

pub(super) fn manual_request(email: &str) -> ManualVerificationRequest {
    ManualVerificationRequest {
        email: Some(email.to_string()),
        name: Some("Lucia Romero".to_string()),
        institute: Some("Universidad de Barcelona".to_string()),
        nationality: Some("Spanish".to_string()),
        city: Some("Barcelona".to_string()),
        cover_letter: Some("I lead weekend walking tours of the Gothic Quarter.".to_string()),
        id_card_url: Some("https://cdn.example.com/ids/lucia.png".to_string()),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default)]
pub(super) struct MemoryStudents {
    records: Mutex<HashMap<StudentId, Student>>,
}

impl MemoryStudents {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("students mutex poisoned").len()
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

/// Reports a conflict on insert while hiding the record from the first lookup,
/// mimicking a concurrent sign-in that won the race.
#[derive(Default)]
pub(super) struct RacingStudents {
    inner: MemoryStudents,
    lookups: Mutex<u32>,
}

impl RacingStudents {
    pub(super) fn with_existing(student: Student) -> Self {
        let racing = Self::default();
        racing.inner.insert(student).expect("seed");
        racing
    }
}

impl StudentRepository for RacingStudents {
    fn insert(&self, student: Student) -> Result<Student, RepositoryError> {
        self.inner.insert(student)
    }

    fn update(&self, student: Student) -> Result<(), RepositoryError> {
        self.inner.update(student)
    }

    fn fetch(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Student>, RepositoryError> {
        let mut lookups = self.lookups.lock().expect("lookup mutex poisoned");
        *lookups += 1;
        if *lookups == 1 {
            return Ok(None);
        }
        self.inner.find_by_email(email)
    }
}
