use chrono::Duration;

use super::common::now;
use crate::config::SafetyConfig;
use crate::workflows::safety::domain::ReportType;
use crate::workflows::safety::escalation::{
    EscalationPolicy, EscalationTrigger, SUSPENSION_ACTION,
};

#[test]
fn severe_types_trigger_immediate_suspension() {
    let policy = EscalationPolicy::default();
    for kind in [ReportType::SafetyConcern, ReportType::Harassment] {
        let assessment = policy.assess(kind, 1);
        assert!(assessment.immediate_action());
        assert_eq!(
            assessment.triggers(),
            &[EscalationTrigger::ImmediateSuspension]
        );
        assert_eq!(assessment.action_taken().as_deref(), Some(SUSPENSION_ACTION));
    }
}

#[test]
fn ordinary_types_below_threshold_do_not_escalate() {
    let policy = EscalationPolicy::default();
    for kind in [
        ReportType::InappropriateBehavior,
        ReportType::PaymentDispute,
        ReportType::NoShow,
        ReportType::Other,
    ] {
        let assessment = policy.assess(kind, 2);
        assert!(!assessment.is_escalated());
        assert!(!assessment.immediate_action());
        assert_eq!(assessment.action_taken(), None);
    }
}

#[test]
fn third_report_flags_pattern() {
    let assessment = EscalationPolicy::default().assess(ReportType::NoShow, 3);
    assert!(!assessment.immediate_action());
    assert_eq!(
        assessment.action_taken().as_deref(),
        Some("Flagged for manual review - 3 total reports detected")
    );
}

#[test]
fn severe_report_with_pattern_keeps_both_reasons_in_order() {
    let assessment = EscalationPolicy::default().assess(ReportType::SafetyConcern, 4);
    assert_eq!(
        assessment.action_taken().as_deref(),
        Some(
            "User temporarily suspended pending investigation; \
             Flagged for manual review - 4 total reports detected"
        )
    );
}

#[test]
fn window_is_one_hundred_eighty_days_by_default() {
    let policy = EscalationPolicy::default();
    assert_eq!(policy.window_start(now()), now() - Duration::days(180));
    assert_eq!(policy.pattern_threshold(), 3);
}

#[test]
fn config_overrides_threshold_and_window() {
    let policy = EscalationPolicy::from_config(&SafetyConfig {
        pattern_threshold: 5,
        pattern_window_days: 30,
    });
    assert_eq!(policy.window_start(now()), now() - Duration::days(30));
    assert!(!policy.assess(ReportType::Other, 4).is_escalated());
    assert!(policy.assess(ReportType::Other, 5).is_escalated());
}
