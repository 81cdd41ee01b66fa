//! Submission normalization and validation.
//!
//! A raw submission is cleaned into a [`NormalizedSubmission`] before it is
//! used as an identity or persisted. Normalization is a pure function: same
//! input, same output, no side effects.

/// Raw field values as received from the inbound boundary.
///
/// `source_address` and `client_agent` are ambient values supplied by the
/// transport layer; they are captured for audit and never validated.
#[derive(Debug, Clone, Default)]
pub struct SubmissionRequest {
    /// Submitted email address (required).
    pub email: String,
    /// Optional Twitter handle.
    pub twitter: Option<String>,
    /// Optional Telegram handle.
    pub telegram: Option<String>,
    /// Optional Discord username.
    pub discord: Option<String>,
    /// Optional referral code.
    pub referral_code: Option<String>,
    /// Network address the submission arrived from.
    pub source_address: String,
    /// User agent (or equivalent) reported by the client.
    pub client_agent: String,
}

/// A submission after field-level cleanup, ready for identity comparison.
///
/// Optional fields are always present as strings; a missing field normalizes
/// to `""` so downstream consumers need no null handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSubmission {
    /// Lowercased, trimmed email; the identity key.
    pub email: String,
    /// Trimmed Twitter handle, `@`-prefixed if non-empty.
    pub twitter: String,
    /// Trimmed Telegram handle, `@`-prefixed if non-empty.
    pub telegram: String,
    /// Trimmed Discord username.
    pub discord: String,
    /// Trimmed, uppercased referral code.
    pub referral_code: String,
}

/// Reason a submission failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Email field was missing or blank
    MissingEmail,
    /// Email did not match the accepted address grammar
    InvalidEmail,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingEmail => write!(f, "email is required"),
            ValidationError::InvalidEmail => write!(f, "invalid email address"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Normalize a raw submission into its canonical form.
///
/// # Errors
/// Returns [`ValidationError`] when the email is missing or malformed.
/// Optional fields never fail validation; they are cleaned in place.
pub fn normalize(request: &SubmissionRequest) -> Result<NormalizedSubmission, ValidationError> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(NormalizedSubmission {
        email,
        twitter: at_prefixed(request.twitter.as_deref()),
        telegram: at_prefixed(request.telegram.as_deref()),
        discord: trimmed(request.discord.as_deref()),
        referral_code: trimmed(request.referral_code.as_deref()).to_uppercase(),
    })
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Trim a social handle and ensure a single leading `@`.
///
/// Handles already starting with `@` pass through untouched, so normalization
/// is idempotent (`"@bob"` stays `"@bob"`, never `"@@bob"`). Interior `@`
/// characters are stripped before prefixing to avoid doubling.
fn at_prefixed(value: Option<&str>) -> String {
    let handle = value.map(str::trim).unwrap_or_default();
    if handle.is_empty() || handle.starts_with('@') {
        return handle.to_string();
    }
    format!("@{}", handle.replace('@', ""))
}

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

/// Check an address against a standard email grammar: one `@`, an RFC-atom
/// local part without leading/trailing/doubled dots, and a dotted domain of
/// alnum/hyphen labels ending in an alphabetic TLD.
fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    is_valid_local_part(local) && is_valid_domain(domain)
}

fn is_valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    local.chars().all(is_atom_char)
}

fn is_atom_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ".!#$%&'*+-/=?^_`{|}~".contains(c)
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let tld = labels[labels.len() - 1];
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    labels.iter().all(|label| is_valid_label(label))
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
