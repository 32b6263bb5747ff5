//! Safety reporting, escalation, and student onboarding for the WanderNest marketplace.

pub mod config;
pub mod error;
pub mod notifications;
pub mod telemetry;
pub mod workflows;
