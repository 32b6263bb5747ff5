//! Student onboarding: the institutional email gate applied on OAuth sign-in,
//! session lookups, the manual verification fallback, and admin approval.

pub mod domain_gate;
pub mod manual_verification;
pub mod router;
pub mod service;
pub mod sign_in;

#[cfg(test)]
mod tests;

pub use domain_gate::{DomainPolicyError, InstitutionalEmailPolicy};
pub use manual_verification::{ManualVerificationError, ManualVerificationRequest};
pub use router::onboarding_router;
pub use service::{OnboardingError, OnboardingService};
pub use sign_in::{SessionView, SignInCallback, SignInDecision};
