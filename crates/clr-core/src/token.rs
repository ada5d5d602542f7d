// SPDX-License-Identifier: BUSL-1.1
//! # Scroll Hash — License Verification Token
//!
//! Derives the verification token ("scroll hash") bound to a license at
//! issuance. The token doubles as an alternate lookup key in the treaty
//! ledger and as a tamper-evidence check for exported licenses.
//!
//! ## Deviation from the reference system
//!
//! The reference derived this token by base64-encoding the concatenated
//! identifying fields and truncating to 32 characters — a reversible
//! encoding, not a digest. This implementation computes a SHA-256 digest
//! over the same fields. Token values are therefore NOT bit-compatible
//! with licenses issued by the reference system.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The verification token bound to a license at issuance.
///
/// Format: `scroll_` followed by the lowercase hex SHA-256 digest of
/// `appId|appName|userId|domain|issuedAt`. Deterministic for a fixed
/// input set; distinct issuance instants yield distinct tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScrollHash(String);

impl ScrollHash {
    /// Derive the scroll hash for a license from its identifying
    /// attributes and issuance instant.
    pub fn derive(
        app_id: &str,
        app_name: &str,
        user_id: &str,
        domain: &str,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let preimage = format!(
            "{app_id}|{app_name}|{user_id}|{domain}|{}",
            issued_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        let digest = Sha256::digest(preimage.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        Self(format!("scroll_{hex}"))
    }

    /// Wrap an existing token string (e.g. from a verify request).
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Access the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScrollHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn derivation_is_deterministic() {
        let at = fixed_instant();
        let a = ScrollHash::derive("app_1", "Demo", "u1", "demo.example.com", at);
        let b = ScrollHash::derive("app_1", "Demo", "u1", "demo.example.com", at);
        assert_eq!(a, b);
    }

    #[test]
    fn token_has_scroll_prefix_and_hex_digest() {
        let token = ScrollHash::derive("app_1", "Demo", "u1", "demo.example.com", fixed_instant());
        let hex = token.as_str().strip_prefix("scroll_").unwrap();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn distinct_fields_yield_distinct_tokens() {
        let at = fixed_instant();
        let a = ScrollHash::derive("app_1", "Demo", "u1", "demo.example.com", at);
        let b = ScrollHash::derive("app_2", "Demo", "u1", "demo.example.com", at);
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_instants_yield_distinct_tokens() {
        let a = ScrollHash::derive("app_1", "Demo", "u1", "demo.example.com", fixed_instant());
        let later = fixed_instant() + chrono::Duration::milliseconds(1);
        let b = ScrollHash::derive("app_1", "Demo", "u1", "demo.example.com", later);
        assert_ne!(a, b);
    }
}
