//! Waitlist entry types.
//!
//! A [`PendingEntry`] is a normalized submission plus audit fields, waiting
//! for the registry to accept it. A [`WaitlistEntry`] is the persisted form:
//! position and join time are assigned exactly once at creation and the entry
//! is never mutated afterwards.

use crate::domain::submission::NormalizedSubmission;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 1-based rank at which an identity was accepted onto the waitlist.
///
/// Positions form a contiguous, strictly increasing sequence starting at 1 in
/// acceptance order: no gaps, no reuse, no duplicates.
pub type Position = u64;

/// Fallback recorded when the client reported no user agent.
pub const UNKNOWN_CLIENT_AGENT: &str = "Unknown";

/// A normalized submission ready to be offered to the registry.
///
/// Carries everything a [`WaitlistEntry`] needs except the position and join
/// time, which only the registry may assign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    /// Normalized identity key.
    pub email: String,
    /// `@`-prefixed Twitter handle or `""`.
    pub twitter: String,
    /// `@`-prefixed Telegram handle or `""`.
    pub telegram: String,
    /// Discord username or `""`.
    pub discord: String,
    /// Uppercased referral code or `""`.
    pub referral_code: String,
    /// Audit: network address the submission arrived from.
    pub source_address: String,
    /// Audit: user agent reported by the client.
    pub client_agent: String,
}

impl PendingEntry {
    /// Combine a normalized submission with its ambient audit fields.
    ///
    /// A blank client agent is recorded as [`UNKNOWN_CLIENT_AGENT`].
    pub fn from_submission(
        submission: NormalizedSubmission,
        source_address: impl Into<String>,
        client_agent: impl Into<String>,
    ) -> Self {
        let client_agent = client_agent.into();
        let client_agent = if client_agent.trim().is_empty() {
            UNKNOWN_CLIENT_AGENT.to_string()
        } else {
            client_agent
        };
        Self {
            email: submission.email,
            twitter: submission.twitter,
            telegram: submission.telegram,
            discord: submission.discord,
            referral_code: submission.referral_code,
            source_address: source_address.into(),
            client_agent,
        }
    }

    /// Finalize the entry with its assigned position and join time.
    ///
    /// Called by registry implementations inside their atomic insert; the
    /// position must come from the registry's own serialization point.
    pub fn into_entry(self, position: Position, joined_at: DateTime<Utc>) -> WaitlistEntry {
        WaitlistEntry {
            email: self.email,
            twitter: self.twitter,
            telegram: self.telegram,
            discord: self.discord,
            referral_code: self.referral_code,
            position,
            source_address: self.source_address,
            client_agent: self.client_agent,
            joined_at,
        }
    }
}

/// A persisted waitlist entry.
///
/// Serializes to the outbound success shape: camelCase field names, with
/// audit fields and the referral code omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    /// Normalized email; unique across all entries.
    pub email: String,
    /// `@`-prefixed Twitter handle or `""`.
    pub twitter: String,
    /// `@`-prefixed Telegram handle or `""`.
    pub telegram: String,
    /// Discord username or `""`.
    pub discord: String,
    /// Uppercased referral code or `""`; never exposed externally.
    #[serde(skip_serializing)]
    pub referral_code: String,
    /// Assigned acceptance rank, immutable after creation.
    pub position: Position,
    /// Audit only; never exposed externally.
    #[serde(skip_serializing)]
    pub source_address: String,
    /// Audit only; never exposed externally.
    #[serde(skip_serializing)]
    pub client_agent: String,
    /// Timestamp set at creation, immutable.
    pub joined_at: DateTime<Utc>,
}

impl WaitlistEntry {
    /// Reduce to the external query projection.
    pub fn summary(&self) -> EntrySummary {
        EntrySummary::from(self)
    }
}

/// External projection of an entry: email, position, and join time only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySummary {
    /// Normalized email.
    pub email: String,
    /// Assigned acceptance rank.
    pub position: Position,
    /// Timestamp set at creation.
    pub joined_at: DateTime<Utc>,
}

impl From<&WaitlistEntry> for EntrySummary {
    fn from(entry: &WaitlistEntry) -> Self {
        Self {
            email: entry.email.clone(),
            position: entry.position,
            joined_at: entry.joined_at,
        }
    }
}
