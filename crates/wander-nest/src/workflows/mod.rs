pub mod onboarding;
pub mod safety;
pub mod students;
