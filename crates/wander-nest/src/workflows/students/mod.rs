//! Student guide records shared by the onboarding and safety workflows.

pub mod domain;
pub mod repository;

pub use domain::{normalize_email, Student, StudentId, StudentStatus};
pub use repository::{RepositoryError, StudentRepository};
