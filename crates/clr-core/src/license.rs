// SPDX-License-Identifier: BUSL-1.1
//! # License Record
//!
//! The immutable record representing one granted right-to-operate for an
//! application on a domain. Constructed exactly once by the issuer in
//! `clr-ledger`; never mutated field-by-field afterward. Conceptual
//! revocation is a governance action that the current system does not
//! implement — `Issuer::revoke` is an always-fail stub.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::LicenseId;
use crate::token::ScrollHash;

/// License tier, carried from the issuance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseTier {
    /// Default tier when the request does not specify one.
    Standard,
    Premium,
    Sovereign,
}

impl LicenseTier {
    /// The canonical string name of this tier (e.g. "STANDARD").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Premium => "PREMIUM",
            Self::Sovereign => "SOVEREIGN",
        }
    }

    /// Parse a tier from its canonical name, case-insensitively.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_uppercase().as_str() {
            "STANDARD" => Ok(Self::Standard),
            "PREMIUM" => Ok(Self::Premium),
            "SOVEREIGN" => Ok(Self::Sovereign),
            _ => Err(ValidationError::InvalidTier(s.to_string())),
        }
    }
}

impl Default for LicenseTier {
    fn default() -> Self {
        Self::Standard
    }
}

impl std::fmt::Display for LicenseTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compliance verdict recorded at issuance.
///
/// The current issuer performs no actual compliance check and always
/// records [`ComplianceStatus::Verified`]; the other variants exist for
/// forward compatibility with a real verification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Verified,
    Pending,
    Failed,
}

impl ComplianceStatus {
    /// The canonical string name of this status (e.g. "VERIFIED").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::Pending => "PENDING",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One issued right-to-operate record.
///
/// Wire representation uses camelCase keys to match the public API
/// contract (`licenseId`, `scrollHash`, `ledgerPosition`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// Opaque unique identifier, assigned at issuance.
    pub license_id: LicenseId,
    /// Caller-supplied application identifier.
    pub app_id: String,
    /// Caller-supplied application display name.
    pub app_name: String,
    /// Owning user.
    pub user_id: String,
    /// Domain the license grants the right to operate on.
    pub domain: String,
    /// Legal or contact identity the license was issued to.
    pub issued_to: String,
    /// Optional free-text sector classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Verification token derived from the identifying attributes.
    pub scroll_hash: ScrollHash,
    /// Position in the append-only treaty ledger. Strictly increasing
    /// across issuances; never reused.
    pub ledger_position: u64,
    /// Whether the license is bound to its scroll hash. Always true for
    /// licenses minted by this issuer.
    pub scroll_bound: bool,
    /// Issuance instant.
    pub issued_at: DateTime<Utc>,
    /// Expiry instant, fixed at issuance to `issued_at` + 365 days.
    pub expires_at: DateTime<Utc>,
    /// Compliance verdict recorded at issuance.
    pub compliance_status: ComplianceStatus,
    /// License tier.
    pub tier: LicenseTier,
    /// Relative URL of the rendered license document.
    pub pdf_url: String,
}

impl License {
    /// Whether the license has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
