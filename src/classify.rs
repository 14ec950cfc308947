//! Heuristic classification of hydra output lines.
//!
//! Hydra's output is line-oriented but not machine-structured, so semantic
//! tags come from case-insensitive substring matching. The exact patterns
//! matter for behavioral compatibility; do not "improve" them.

use serde::{Deserialize, Serialize};

/// Semantic tags attached to one output line. A line may carry several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTags {
    /// The line looks like a login attempt.
    pub attempt: bool,
    /// The line contains a discovered credential.
    pub credential: bool,
    pub error: bool,
    pub info: bool,
}

impl LineTags {
    /// True when no tag matched.
    #[must_use]
    pub fn is_empty(self) -> bool {
        !(self.attempt || self.credential || self.error || self.info)
    }
}

const ATTEMPT_MARKERS: &[&str] = &["login:", "host:", "[", "attempt"];
const CREDENTIAL_PROTO_MARKERS: &[&str] = &["[host]", "[ssh]", "[ftp]", "[rdp]"];
const ERROR_MARKERS: &[&str] = &["error", "fatal", "failed"];
const INFO_PREFIX: &str = "[INFO]";

/// Classify one line. Pure and stateless; each rule is evaluated
/// independently against the lower-cased line (except the `[INFO]` prefix,
/// which is literal).
#[must_use]
pub fn classify(line: &str) -> LineTags {
    let lower = line.to_lowercase();

    let attempt = ATTEMPT_MARKERS.iter().any(|m| lower.contains(m));

    let credential = (lower.contains("login:") && lower.contains("password:"))
        || (lower.contains("login:")
            && CREDENTIAL_PROTO_MARKERS.iter().any(|m| lower.contains(m)))
        || (lower.contains("successfully") && lower.contains("login"));

    let error = ERROR_MARKERS.iter().any(|m| lower.contains(m));

    let info = line.starts_with(INFO_PREFIX);

    LineTags {
        attempt,
        credential,
        error,
        info,
    }
}
