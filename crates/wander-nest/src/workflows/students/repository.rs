use super::domain::{Student, StudentId, StudentStatus};

/// Persistence gateway for student records.
pub trait StudentRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when the email is already registered.
    fn insert(&self, student: Student) -> Result<Student, RepositoryError>;
    fn update(&self, student: Student) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError>;
    /// Lookup by normalized email.
    fn find_by_email(&self, email: &str) -> Result<Option<Student>, RepositoryError>;

    fn update_status(
        &self,
        id: &StudentId,
        status: StudentStatus,
    ) -> Result<Student, RepositoryError> {
        let mut student = self.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        student.status = status;
        self.update(student.clone())?;
        Ok(student)
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
