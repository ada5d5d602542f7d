// SPDX-License-Identifier: BUSL-1.1
//! # clr-vault — License Store
//!
//! In-memory vault for issued licenses, keyed by license id, with
//! backup replication over the mesh seam, multi-key lookup (user,
//! domain, app), verification with expiry, JSON export, statistics,
//! and a complete audit trail.
//!
//! The vault never mutates a stored [`clr_core::License`]; all mutable
//! state lives in the surrounding [`VaultEntry`] bookkeeping.

pub mod audit;
pub mod vault;

pub use audit::{AuditLog, AuditLogEntry, AuditOperation};
pub use vault::{
    BackupStatus, ExportOutcome, ExportPayload, LicenseVault, RetrieveOutcome, StoreOutcome,
    VaultEntry, VaultHealth, VaultMetadata, VaultStatistics, VaultVerification, BULK_QUERY_ID,
};
