//! Notification message templates.
//!
//! Two payloads are produced for each accepted registration: an admin alert
//! carrying every submitted field, and a welcome message carrying the
//! assigned position. Building a message is pure; delivery lives in the
//! application layer.

use crate::domain::entry::WaitlistEntry;
use std::collections::BTreeMap;

/// Placeholder used for fields the registrant left empty.
const EMPTY_FIELD: &str = "N/A";

/// Which template the transport should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Full-detail alert sent to the admin recipient
    AdminAlert,
    /// Position confirmation sent to the registrant
    Welcome,
}

impl TemplateKind {
    /// Stable identifier for logging and transport routing.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::AdminAlert => "admin_alert",
            TemplateKind::Welcome => "welcome",
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A renderable notification: recipient, template, and template parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// Address the transport should deliver to.
    pub recipient: String,
    /// Template selecting the message shape.
    pub template: TemplateKind,
    /// Named template parameters.
    pub params: BTreeMap<String, String>,
}

impl NotificationMessage {
    /// Build the admin alert for a newly accepted entry.
    ///
    /// Carries every submitted field, with empty optionals rendered as
    /// `N/A`, plus the assigned position and the RFC 3339 join time.
    pub fn admin_alert(entry: &WaitlistEntry, admin_recipient: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert("user_email".to_string(), entry.email.clone());
        params.insert("twitter".to_string(), or_placeholder(&entry.twitter));
        params.insert("telegram".to_string(), or_placeholder(&entry.telegram));
        params.insert("discord".to_string(), or_placeholder(&entry.discord));
        params.insert(
            "referral_code".to_string(),
            or_placeholder(&entry.referral_code),
        );
        params.insert("position".to_string(), format!("#{}", entry.position));
        params.insert("joined_at".to_string(), entry.joined_at.to_rfc3339());

        Self {
            recipient: admin_recipient.to_string(),
            template: TemplateKind::AdminAlert,
            params,
        }
    }

    /// Build the welcome message for the registrant.
    pub fn welcome(entry: &WaitlistEntry) -> Self {
        let mut params = BTreeMap::new();
        params.insert("position".to_string(), format!("#{}", entry.position));

        Self {
            recipient: entry.email.clone(),
            template: TemplateKind::Welcome,
            params,
        }
    }
}

fn or_placeholder(value: &str) -> String {
    if value.is_empty() {
        EMPTY_FIELD.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::PendingEntry;
    use crate::domain::submission::NormalizedSubmission;
    use chrono::Utc;

    fn entry() -> WaitlistEntry {
        let submission = NormalizedSubmission {
            email: "user@domain.com".to_string(),
            twitter: "@bob".to_string(),
            telegram: String::new(),
            discord: "gamer#1234".to_string(),
            referral_code: "REF1".to_string(),
        };
        PendingEntry::from_submission(submission, "203.0.113.9", "agent")
            .into_entry(42, Utc::now())
    }

    #[test]
    fn test_admin_alert_carries_all_fields() {
        let entry = entry();
        let message = NotificationMessage::admin_alert(&entry, "admin@site.com");

        assert_eq!(message.recipient, "admin@site.com");
        assert_eq!(message.template, TemplateKind::AdminAlert);
        assert_eq!(message.params["user_email"], "user@domain.com");
        assert_eq!(message.params["twitter"], "@bob");
        assert_eq!(message.params["discord"], "gamer#1234");
        assert_eq!(message.params["referral_code"], "REF1");
        assert_eq!(message.params["position"], "#42");
        assert_eq!(message.params["joined_at"], entry.joined_at.to_rfc3339());
    }

    #[test]
    fn test_admin_alert_placeholders_for_empty_fields() {
        let message = NotificationMessage::admin_alert(&entry(), "admin@site.com");
        assert_eq!(message.params["telegram"], "N/A");
    }

    #[test]
    fn test_welcome_targets_registrant_with_position() {
        let message = NotificationMessage::welcome(&entry());
        assert_eq!(message.recipient, "user@domain.com");
        assert_eq!(message.template, TemplateKind::Welcome);
        assert_eq!(message.params["position"], "#42");
        assert_eq!(message.params.len(), 1);
    }

    #[test]
    fn test_template_kind_identifiers() {
        assert_eq!(TemplateKind::AdminAlert.as_str(), "admin_alert");
        assert_eq!(TemplateKind::Welcome.as_str(), "welcome");
    }
}
