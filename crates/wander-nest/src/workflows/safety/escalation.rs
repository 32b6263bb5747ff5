use chrono::{DateTime, Duration, Utc};

use super::domain::ReportType;
use crate::config::SafetyConfig;

pub const SUSPENSION_ACTION: &str = "User temporarily suspended pending investigation";

const SEVERE_TYPES: [ReportType; 2] = [ReportType::SafetyConcern, ReportType::Harassment];

/// Rules deciding when a fresh report escalates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    pattern_threshold: u32,
    pattern_window: Duration,
}

impl EscalationPolicy {
    pub fn new(pattern_threshold: u32, pattern_window_days: i64) -> Self {
        Self {
            pattern_threshold: pattern_threshold.max(1),
            pattern_window: Duration::days(pattern_window_days.max(1)),
        }
    }

    pub fn from_config(config: &SafetyConfig) -> Self {
        Self::new(config.pattern_threshold, config.pattern_window_days)
    }

    pub fn pattern_threshold(&self) -> u32 {
        self.pattern_threshold
    }

    pub fn pattern_window_days(&self) -> i64 {
        self.pattern_window.num_days()
    }

    /// Earliest `created_at` still counted towards pattern detection.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.pattern_window
    }

    pub fn is_severe(&self, report_type: ReportType) -> bool {
        SEVERE_TYPES.contains(&report_type)
    }

    /// `recent_reports` includes the report being assessed.
    pub fn assess(&self, report_type: ReportType, recent_reports: u32) -> EscalationAssessment {
        let mut triggers = Vec::with_capacity(2);
        if self.is_severe(report_type) {
            triggers.push(EscalationTrigger::ImmediateSuspension);
        }
        if recent_reports >= self.pattern_threshold {
            triggers.push(EscalationTrigger::PatternDetected {
                report_count: recent_reports,
            });
        }
        EscalationAssessment { triggers }
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::from_config(&SafetyConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationTrigger {
    ImmediateSuspension,
    PatternDetected { report_count: u32 },
}

impl EscalationTrigger {
    pub fn action_taken(&self) -> String {
        match self {
            EscalationTrigger::ImmediateSuspension => SUSPENSION_ACTION.to_string(),
            EscalationTrigger::PatternDetected { report_count } => {
                format!("Flagged for manual review - {report_count} total reports detected")
            }
        }
    }
}

/// Triggers that fired for one report, severity first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EscalationAssessment {
    triggers: Vec<EscalationTrigger>,
}

impl EscalationAssessment {
    pub fn triggers(&self) -> &[EscalationTrigger] {
        &self.triggers
    }

    pub fn is_escalated(&self) -> bool {
        !self.triggers.is_empty()
    }

    pub fn immediate_action(&self) -> bool {
        self.triggers
            .contains(&EscalationTrigger::ImmediateSuspension)
    }

    /// Every fired reason, joined in trigger order.
    pub fn action_taken(&self) -> Option<String> {
        if self.triggers.is_empty() {
            return None;
        }
        let reasons: Vec<String> = self
            .triggers
            .iter()
            .map(EscalationTrigger::action_taken)
            .collect();
        Some(reasons.join("; "))
    }
}
