use std::sync::Arc;

use chrono::Utc;

use super::common::*;
use crate::config::AuthConfig;
use crate::workflows::onboarding::{
    InstitutionalEmailPolicy, OnboardingError, OnboardingService, SignInCallback, SignInDecision,
};
use crate::workflows::students::{Student, StudentId, StudentRepository, StudentStatus};

#[test]
fn first_institutional_sign_in_creates_pending_student() {
    let (service, students) = build_service();

    let decision = service
        .sign_in(callback("Arjun.Mehta@IITB.ac.in"))
        .expect("sign-in handled");

    let SignInDecision::Accept {
        student_id,
        status,
        created,
    } = decision
    else {
        panic!("expected accept");
    };
    assert!(created);
    assert_eq!(status, StudentStatus::PendingApproval);

    let student = students
        .fetch(&student_id)
        .expect("fetch")
        .expect("student stored");
    assert_eq!(student.email, "arjun.mehta@iitb.ac.in");
    assert_eq!(student.name, "Arjun Mehta");
    assert_eq!(student.provider_account_id.as_deref(), Some("google-10987"));
}

#[test]
fn repeat_sign_in_reuses_existing_student() {
    let (service, students) = build_service();
    let first = service
        .sign_in(callback("maria@stanford.edu"))
        .expect("first sign-in");
    let second = service
        .sign_in(callback("MARIA@stanford.edu"))
        .expect("second sign-in");

    let (
        SignInDecision::Accept {
            student_id: first_id,
            ..
        },
        SignInDecision::Accept {
            student_id: second_id,
            created,
            ..
        },
    ) = (first, second)
    else {
        panic!("both sign-ins should be accepted");
    };
    assert_eq!(first_id, second_id);
    assert!(!created);
    assert_eq!(students.len(), 1);
}

#[test]
fn existing_status_is_reported_on_sign_in() {
    let (service, students) = build_service();
    let mut student = Student::pending("kenji@keio.ac.jp", "Kenji", Utc::now());
    student.status = StudentStatus::Suspended;
    students.insert(student).expect("seed");

    let decision = service
        .sign_in(callback("kenji@keio.ac.jp"))
        .expect("sign-in handled");
    assert!(matches!(
        decision,
        SignInDecision::Accept {
            status: StudentStatus::Suspended,
            created: false,
            ..
        }
    ));
}

#[test]
fn non_institutional_email_is_redirected_without_account() {
    let (service, students) = build_service();

    let decision = service
        .sign_in(callback("lucia+tours@gmail.com"))
        .expect("sign-in handled");

    assert_eq!(
        decision,
        SignInDecision::Redirect {
            location: "/student/manual-verification?error=invalid_domain&email=lucia%2Btours%40gmail.com"
                .to_string(),
        }
    );
    assert_eq!(students.len(), 0);
}

#[test]
fn missing_email_is_denied() {
    let (service, students) = build_service();
    let decision = service
        .sign_in(SignInCallback {
            email: None,
            ..callback("unused@stanford.edu")
        })
        .expect("sign-in handled");
    assert!(matches!(decision, SignInDecision::Deny { .. }));
    assert_eq!(students.len(), 0);
}

#[test]
fn concurrent_creation_falls_back_to_existing_record() {
    let existing = Student::pending("li@nus.edu.sg", "Li Wei", Utc::now());
    let existing_id = existing.id.clone();
    let students = Arc::new(RacingStudents::with_existing(existing));
    let policy =
        InstitutionalEmailPolicy::from_config(&AuthConfig::default()).expect("policy compiles");
    let service = OnboardingService::new(policy, students, "/student/manual-verification");

    let decision = service
        .sign_in(callback("li@nus.edu.sg"))
        .expect("sign-in handled");

    assert_eq!(
        decision,
        SignInDecision::Accept {
            student_id: existing_id,
            status: StudentStatus::PendingApproval,
            created: false,
        }
    );
}

#[test]
fn session_reflects_onboarding_state() {
    let (service, _students) = build_service();
    let anonymous = service.session("ghost@stanford.edu").expect("session");
    assert!(!anonymous.has_completed_onboarding);
    assert_eq!(anonymous.student_id, None);

    service
        .sign_in(callback("maria@stanford.edu"))
        .expect("sign-in handled");
    let view = service.session("Maria@Stanford.edu").expect("session");
    assert!(view.has_completed_onboarding);
    assert_eq!(view.student_status, Some(StudentStatus::PendingApproval));
}

#[test]
fn manual_verification_creates_pending_student_once() {
    let (service, students) = build_service();

    let student = service
        .submit_manual_verification(manual_request("lucia@gmail.com"))
        .expect("application accepted");
    assert_eq!(student.status, StudentStatus::PendingApproval);
    assert_eq!(
        student.id_card_url.as_deref(),
        Some("https://cdn.example.com/ids/lucia.png")
    );

    let err = service
        .submit_manual_verification(manual_request("LUCIA@gmail.com"))
        .expect_err("duplicate email");
    assert!(matches!(err, OnboardingError::DuplicateEmail));
    assert_eq!(students.len(), 1);
}

#[test]
fn manual_verification_requires_fields() {
    let (service, students) = build_service();
    let mut request = manual_request("lucia@gmail.com");
    request.city = None;

    let err = service
        .submit_manual_verification(request)
        .expect_err("city missing");
    assert!(matches!(err, OnboardingError::Validation(_)));
    assert_eq!(err.to_string(), "Missing required fields");
    assert_eq!(students.len(), 0);
}

#[test]
fn approval_updates_status_or_reports_missing_student() {
    let (service, _students) = build_service();
    let SignInDecision::Accept { student_id, .. } = service
        .sign_in(callback("maria@stanford.edu"))
        .expect("sign-in handled")
    else {
        panic!("expected accept");
    };

    let approved = service.approve(&student_id).expect("approved");
    assert_eq!(approved.status, StudentStatus::Approved);

    let err = service
        .approve(&StudentId("stu_missing".to_string()))
        .expect_err("unknown student");
    assert!(matches!(err, OnboardingError::StudentNotFound(_)));
}
