// SPDX-License-Identifier: BUSL-1.1
//! # Vault Audit Trail
//!
//! Append-only record of every vault operation. Each public vault entry
//! point records exactly one [`AuditLogEntry`] per call, success or
//! failure, so the trail is a complete account of access to stored
//! licenses. Entries are kept in memory in insertion order and are never
//! mutated after the fact.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use clr_core::AuditId;

/// The vault operation an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOperation {
    Store,
    Retrieve,
    Update,
    Delete,
    Verify,
    Export,
}

impl AuditOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOperation::Store => "STORE",
            AuditOperation::Retrieve => "RETRIEVE",
            AuditOperation::Update => "UPDATE",
            AuditOperation::Delete => "DELETE",
            AuditOperation::Verify => "VERIFY",
            AuditOperation::Export => "EXPORT",
        }
    }
}

/// One recorded vault operation.
///
/// `license_id` is a plain string rather than [`clr_core::LicenseId`]
/// because bulk lookups audit under the synthetic id `BULK_QUERY`, which
/// does not correspond to any stored license.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: AuditId,
    pub license_id: String,
    pub operation: AuditOperation,
    /// Caller identity, when the caller supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    /// Operation-specific details (vault id, export size, result count).
    pub metadata: serde_json::Value,
}

/// In-memory append-only audit log.
///
/// Writers take the write lock only long enough to push; readers clone
/// the slice they need out of the read lock.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, stamping the id and timestamp.
    pub fn record(
        &self,
        license_id: impl Into<String>,
        operation: AuditOperation,
        actor_id: Option<String>,
        success: bool,
        metadata: serde_json::Value,
    ) {
        let entry = AuditLogEntry {
            id: AuditId::mint(),
            license_id: license_id.into(),
            operation,
            actor_id,
            timestamp: Utc::now(),
            success,
            metadata,
        };
        self.entries.write().push(entry);
    }

    /// Returns a page of entries in insertion order.
    pub fn slice(&self, limit: usize, offset: usize) -> Vec<AuditLogEntry> {
        self.entries
            .read()
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Returns every entry that names the given license, in insertion
    /// order. Bulk-query entries are excluded by construction since they
    /// carry the synthetic `BULK_QUERY` id.
    pub fn for_license(&self, license_id: &str) -> Vec<AuditLogEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.license_id == license_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Discards the entire trail. Test and reset tooling only.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
