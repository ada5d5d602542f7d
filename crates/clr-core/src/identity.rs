// SPDX-License-Identifier: BUSL-1.1
//! # Identifier Newtypes
//!
//! Domain-primitive newtypes for the identifiers minted by the ClaimRoot
//! stack. Each identifier is a distinct type — you cannot pass a
//! [`VaultId`] where a [`LicenseId`] is expected.
//!
//! ## Formats
//!
//! - License: `CLR_{appId}_{unix_millis}_{9-char suffix}`
//! - Vault:   `VAULT_{unix_millis}_{6-char suffix}`
//! - Audit:   `audit_{unix_millis}_{9-char suffix}`
//!
//! The timestamp component gives operators a rough issuance ordering at
//! a glance; the random suffix guarantees uniqueness within a
//! millisecond. Collision probability is negligible but not
//! cryptographically bounded — these are identifiers, not capabilities.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Draw `len` characters of uppercase hex entropy from a fresh UUIDv4.
fn random_suffix(len: usize) -> String {
    let simple = Uuid::new_v4().simple().to_string().to_uppercase();
    simple.chars().take(len).collect()
}

/// Unique identifier for an issued license.
///
/// Assigned exactly once by the issuer; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LicenseId(String);

impl LicenseId {
    /// Mint a new license identifier for the given application.
    pub fn mint(app_id: &str) -> Self {
        Self(format!(
            "CLR_{}_{}_{}",
            app_id,
            Utc::now().timestamp_millis(),
            random_suffix(9)
        ))
    }

    /// Wrap an existing identifier string (e.g. from a request path).
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LicenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a vault entry, distinct from the license id.
///
/// Assigned at storage time; a re-store of the same license mints a
/// fresh vault id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultId(String);

impl VaultId {
    /// Mint a new vault identifier.
    pub fn mint() -> Self {
        Self(format!(
            "VAULT_{}_{}",
            Utc::now().timestamp_millis(),
            random_suffix(6)
        ))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VaultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for an audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditId(String);

impl AuditId {
    /// Mint a new audit entry identifier.
    pub fn mint() -> Self {
        Self(format!(
            "audit_{}_{}",
            Utc::now().timestamp_millis(),
            random_suffix(9).to_lowercase()
        ))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuditId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
