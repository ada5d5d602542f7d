// SPDX-License-Identifier: BUSL-1.1
//! # Treaty Ledger Entry
//!
//! Append-only record of one issuance event. Entries are owned by the
//! issuer, indexed by `position`, and never deleted or reordered.

use chrono::{DateTime, Utc};
use clr_core::{LicenseId, LicenseTier, ScrollHash};
use serde::{Deserialize, Serialize};

/// One entry in the append-only treaty ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Ledger position. Equals the license's `ledger_position`.
    pub position: u64,
    /// The license this entry records.
    pub license_id: LicenseId,
    /// Application the license was issued for.
    pub app_id: String,
    /// Issuance instant.
    pub timestamp: DateTime<Utc>,
    /// Verification token of the license; alternate lookup key.
    pub scroll_hash: ScrollHash,
    /// License tier at issuance.
    pub tier: LicenseTier,
    /// Whether the background ledger sync for this entry has completed.
    /// Flips to true at most once; a failed sync leaves it false and is
    /// visible in issuer statistics.
    pub synced: bool,
}
