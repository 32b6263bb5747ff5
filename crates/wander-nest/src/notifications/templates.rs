use std::fmt::Write as _;

use super::OutboundEmail;

/// How loudly the admin team should be paged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertUrgency {
    Urgent,
    Review,
}

impl AlertUrgency {
    const fn subject_prefix(self) -> &'static str {
        match self {
            AlertUrgency::Urgent => "URGENT",
            AlertUrgency::Review => "Review needed",
        }
    }
}

/// Payload of an admin safety alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAlert {
    pub reference: String,
    pub kind: String,
    pub reported_user_id: String,
    pub reported_by: String,
    pub description: String,
    pub urgency: AlertUrgency,
}

pub fn admin_alert_email(to: &str, alert: &AdminAlert) -> OutboundEmail {
    let subject = format!(
        "[WanderNest Safety] {}: {} ({})",
        alert.urgency.subject_prefix(),
        alert.kind,
        alert.reference
    );

    let mut html = String::new();
    html.push_str(r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">"#);
    let _ = write!(
        html,
        r#"<h2 style="color: #DC2626;">{}</h2>"#,
        escape_html(&format!("{} safety report", alert.urgency.subject_prefix()))
    );
    html.push_str(r#"<table style="border-collapse: collapse; width: 100%;">"#);
    for (label, value) in [
        ("Reference", alert.reference.as_str()),
        ("Type", alert.kind.as_str()),
        ("Reported user", alert.reported_user_id.as_str()),
        ("Reported by", alert.reported_by.as_str()),
    ] {
        let _ = write!(
            html,
            r#"<tr><td style="padding: 4px 8px; font-weight: bold;">{}</td><td style="padding: 4px 8px;">{}</td></tr>"#,
            label,
            escape_html(value)
        );
    }
    html.push_str("</table>");
    let _ = write!(
        html,
        r#"<p style="white-space: pre-wrap; background-color: #F3F4F6; padding: 12px;">{}</p>"#,
        escape_html(&alert.description)
    );
    html.push_str("</div>");

    OutboundEmail {
        to: to.to_string(),
        subject,
        html,
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
