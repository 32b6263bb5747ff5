use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::workflows::students::Student;

/// Fallback application for students without an institutional email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualVerificationRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub institute: Option<String>,
    pub nationality: Option<String>,
    pub city: Option<String>,
    pub cover_letter: Option<String>,
    pub id_card_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManualVerificationError {
    #[error("Missing required fields")]
    MissingFields(Vec<&'static str>),
}

impl ManualVerificationRequest {
    /// Build the pending student record. The ID card upload is not handled
    /// here; a placeholder URL is stored when none was supplied.
    pub fn into_student(self, now: DateTime<Utc>) -> Result<Student, ManualVerificationError> {
        let mut missing = Vec::new();
        let email = required(self.email, "email", &mut missing);
        let name = required(self.name, "name", &mut missing);
        let institute = required(self.institute, "institute", &mut missing);
        let nationality = required(self.nationality, "nationality", &mut missing);
        let city = required(self.city, "city", &mut missing);
        let cover_letter = required(self.cover_letter, "coverLetter", &mut missing);

        let (Some(email), Some(name), Some(institute), Some(nationality), Some(city), Some(cover_letter)) =
            (email, name, institute, nationality, city, cover_letter)
        else {
            return Err(ManualVerificationError::MissingFields(missing));
        };

        let mut student = Student::pending(&email, &name, now);
        let id_card_url = self
            .id_card_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| format!("placeholder-url-for-{}-id-card", student.email));

        student.institute = Some(institute);
        student.nationality = Some(nationality);
        student.city = Some(city);
        student.cover_letter = Some(cover_letter);
        student.id_card_url = Some(id_card_url);
        Ok(student)
    }
}

fn required(
    value: Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value.map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            missing.push(field);
            None
        }
    }
}
