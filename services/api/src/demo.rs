use crate::infra::{InMemoryStore, OutboxMailer};
use chrono::{Duration, Utc};
use clap::Args;
use std::sync::Arc;
use wander_nest::config::AuthConfig;
use wander_nest::error::AppError;
use wander_nest::workflows::onboarding::{
    InstitutionalEmailPolicy, OnboardingService, SignInCallback, SignInDecision,
};
use wander_nest::workflows::safety::{
    EscalationPolicy, ReportRepository, ReportSubmission, SafetyService,
};
use wander_nest::workflows::students::{StudentId, StudentRepository};

const DEMO_REPORTER: &str = "tourist-demo";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Institutional email used for the demo student
    #[arg(long, default_value = "priya.sharma@iitb.ac.in")]
    pub(crate) student_email: String,
    /// Consumer email shown being redirected to manual verification
    #[arg(long, default_value = "priya.travels@gmail.com")]
    pub(crate) consumer_email: String,
    /// Stop after pattern detection instead of filing a safety concern
    #[arg(long)]
    pub(crate) skip_safety_concern: bool,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            student_email: "priya.sharma@iitb.ac.in".to_string(),
            consumer_email: "priya.travels@gmail.com".to_string(),
            skip_safety_concern: false,
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        student_email,
        consumer_email,
        skip_safety_concern,
    } = args;

    let store = Arc::new(InMemoryStore::default());
    let outbox = Arc::new(OutboxMailer::default());
    let auth = AuthConfig::default();
    let onboarding = OnboardingService::new(
        InstitutionalEmailPolicy::from_config(&auth)?,
        store.clone(),
        auth.manual_verification_path,
    );
    let safety = SafetyService::new(
        store.clone(),
        store.clone(),
        outbox.clone(),
        EscalationPolicy::default(),
        "safety@wandernest.com",
    );

    println!("WanderNest safety demo");
    println!("\nSign-in gate");
    for email in [&consumer_email, &student_email] {
        match onboarding.sign_in(demo_callback(email)) {
            Ok(decision) => println!("- {email}: {}", describe(&decision)),
            Err(err) => println!("- {email}: sign-in failed: {err}"),
        }
    }

    let student_id = match onboarding.sign_in(demo_callback(&student_email)) {
        Ok(SignInDecision::Accept { student_id, .. }) => student_id,
        Ok(decision) => {
            println!("  Demo student was not admitted: {}", describe(&decision));
            return Ok(());
        }
        Err(err) => {
            println!("  Sign-in unavailable: {err}");
            return Ok(());
        }
    };
    match onboarding.approve(&student_id) {
        Ok(student) => println!("- Admin approved {} -> {}", student.id, student.status.label()),
        Err(err) => println!("- Approval failed: {err}"),
    }

    println!("\nReport intake");
    let now = Utc::now();
    let history = [
        ("NO_SHOW", now - Duration::days(240)),
        ("NO_SHOW", now - Duration::days(45)),
        ("PAYMENT_DISPUTE", now - Duration::days(12)),
        ("INAPPROPRIATE_BEHAVIOR", now),
    ];
    for (report_type, filed_at) in history {
        let submission = demo_submission(report_type, &student_id);
        match safety.submit_report_at(submission, filed_at) {
            Ok(receipt) => {
                let state = safety
                    .report(&receipt.report_id)
                    .map(|report| report.status.label())
                    .unwrap_or("unknown");
                println!(
                    "- {report_type} filed {} days ago -> {} ({state})",
                    (now - filed_at).num_days(),
                    receipt.report_id
                );
            }
            Err(err) => println!("- {report_type} rejected: {err}"),
        }
    }
    print_student(&safety, store.as_ref(), &student_id);

    if !skip_safety_concern {
        println!("\nSafety concern");
        match safety.submit_report(demo_submission("SAFETY_CONCERN", &student_id)) {
            Ok(receipt) => println!(
                "- {} immediate action: {}",
                receipt.report_id, receipt.immediate_action
            ),
            Err(err) => println!("- Safety concern rejected: {err}"),
        }
        print_student(&safety, store.as_ref(), &student_id);
    }

    let sent = outbox.sent();
    if sent.is_empty() {
        println!("\nAdmin alerts: none dispatched");
    } else {
        println!("\nAdmin alerts:");
        for email in sent {
            println!("  - to={} subject={}", email.to, email.subject);
        }
    }

    Ok(())
}

fn demo_callback(email: &str) -> SignInCallback {
    SignInCallback {
        email: Some(email.to_string()),
        name: Some("Priya Sharma".to_string()),
        provider_account_id: Some("google-demo".to_string()),
    }
}

fn demo_submission(report_type: &str, student_id: &StudentId) -> ReportSubmission {
    ReportSubmission {
        report_type: Some(report_type.to_string()),
        reported_user_id: Some(student_id.to_string()),
        reported_by: Some(DEMO_REPORTER.to_string()),
        description: Some(format!("Demo {report_type} report")),
    }
}

fn describe(decision: &SignInDecision) -> String {
    match decision {
        SignInDecision::Accept {
            student_id,
            status,
            created,
        } => format!(
            "accepted as {student_id} ({}, {})",
            status.label(),
            if *created { "new account" } else { "existing account" }
        ),
        SignInDecision::Redirect { location } => format!("redirected to {location}"),
        SignInDecision::Deny { reason } => format!("denied: {reason}"),
    }
}

fn print_student<R, M>(
    safety: &SafetyService<R, InMemoryStore, M>,
    store: &InMemoryStore,
    student_id: &StudentId,
) where
    R: ReportRepository + 'static,
    M: wander_nest::notifications::Mailer + 'static,
{
    let recent = safety
        .recent_report_count(student_id)
        .map(|count| count.to_string())
        .unwrap_or_else(|err| format!("unavailable ({err})"));
    match StudentRepository::fetch(store, student_id) {
        Ok(Some(student)) => println!(
            "  Student {} is {} with {recent} report(s) in the window",
            student.id,
            student.status.label()
        ),
        Ok(None) => println!("  Student {student_id} no longer exists"),
        Err(err) => println!("  Student lookup failed: {err}"),
    }
}
