// SPDX-License-Identifier: BUSL-1.1
//! # License Vault
//!
//! Keyed storage for issued licenses with a complete audit trail. The
//! vault owns its own replication lifecycle: every store spawns a
//! background backup sync that moves the entry through
//! `Pending → Synced | Failed`, and a re-store of the same license id
//! overwrites the entry and resets it to `Pending`.
//!
//! ## Audit Discipline
//!
//! Every call to `store`, `retrieve`, `verify`, and `export` records
//! exactly one audit entry whose `success` flag matches the outcome.
//! Bulk user lookups record a single entry under the synthetic id
//! `BULK_QUERY`; domain and app lookups are unaudited.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::JoinHandle;

use clr_core::{License, VaultId};
use clr_mesh::MeshTransport;

use crate::audit::{AuditLog, AuditLogEntry, AuditOperation};

/// Synthetic license id audit entries use for bulk user lookups.
pub const BULK_QUERY_ID: &str = "BULK_QUERY";

/// Nominal per-entry footprint used for the storage estimate, matching
/// the reference deployment's capacity-planning figure.
const ESTIMATED_ENTRY_BYTES: u64 = 2048;

/// Replication state of a stored entry's backup.
///
/// `Pending` is the only non-terminal state; a re-store of the same
/// license id resets the entry to `Pending` and starts a fresh sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupStatus {
    Pending,
    Synced,
    Failed,
}

impl BackupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupStatus::Pending => "PENDING",
            BackupStatus::Synced => "SYNCED",
            BackupStatus::Failed => "FAILED",
        }
    }
}

/// A stored license plus the vault's bookkeeping around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEntry {
    pub vault_id: VaultId,
    pub license: License,
    pub stored_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
    /// Reported configuration flag; entries are not actually encrypted
    /// in this in-memory deployment.
    pub encrypted: bool,
    pub backup_status: BackupStatus,
}

/// Result of a store call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_id: Option<VaultId>,
    pub message: String,
}

/// Result of a retrieve call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_id: Option<VaultId>,
    pub message: String,
}

/// Result of verifying a stored license.
///
/// Unlike ledger token verification, vault verification does check
/// expiry: `valid` is false once the license has expired.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultVerification {
    pub valid: bool,
    pub expired: bool,
    pub backup_synced: bool,
    pub message: String,
}

/// Vault bookkeeping attached to an export payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMetadata {
    pub vault_id: VaultId,
    pub stored_at: DateTime<Utc>,
    pub access_count: u64,
    pub backup_status: BackupStatus,
}

/// The downloadable export document: the license plus its vault
/// metadata and the export provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub license: License,
    pub vault_metadata: VaultMetadata,
    pub exported_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_by: Option<String>,
}

/// Result of an export call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<ExportPayload>,
    pub message: String,
}

/// Aggregate vault statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultStatistics {
    pub total_licenses: u64,
    /// Entries whose backup sync has completed successfully.
    pub synced_count: u64,
    pub estimated_storage_gb: f64,
    /// Most recent `stored_at` across all entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_backup: Option<DateTime<Utc>>,
    pub audit_entries: u64,
    /// Mean wall-clock latency of successful retrievals.
    pub avg_retrieval_latency_ms: f64,
}

/// Vault health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultHealth {
    pub healthy: bool,
    pub issues: Vec<String>,
    pub backup_connected: bool,
    pub encryption_active: bool,
}

struct VaultInner<T> {
    entries: DashMap<String, VaultEntry>,
    audit: AuditLog,
    transport: T,
    retrieval_micros: AtomicU64,
    retrievals: AtomicU64,
    encryption_enabled: bool,
    inflight: Mutex<Vec<JoinHandle<()>>>,
}

/// In-memory license vault. Cheap to clone; all clones share state.
pub struct LicenseVault<T> {
    inner: Arc<VaultInner<T>>,
}

impl<T> Clone for LicenseVault<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: MeshTransport> LicenseVault<T> {
    pub fn new(transport: T) -> Self {
        Self::with_encryption(transport, true)
    }

    pub fn with_encryption(transport: T, encryption_enabled: bool) -> Self {
        Self {
            inner: Arc::new(VaultInner {
                entries: DashMap::new(),
                audit: AuditLog::new(),
                transport,
                retrieval_micros: AtomicU64::new(0),
                retrievals: AtomicU64::new(0),
                encryption_enabled,
                inflight: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Stores a license, overwriting any existing entry for the same
    /// license id and resetting its backup status to `Pending`. The
    /// backup sync runs in the background; its outcome is observable
    /// only through the entry's `backup_status`.
    pub fn store(&self, license: License, actor_id: Option<String>) -> StoreOutcome {
        let vault_id = VaultId::mint();
        let license_id = license.license_id.to_string();
        let now = Utc::now();
        let entry = VaultEntry {
            vault_id: vault_id.clone(),
            license,
            stored_at: now,
            last_accessed_at: now,
            access_count: 0,
            encrypted: self.inner.encryption_enabled,
            backup_status: BackupStatus::Pending,
        };
        let overwrote = self.inner.entries.insert(license_id.clone(), entry).is_some();

        self.inner.audit.record(
            &license_id,
            AuditOperation::Store,
            actor_id,
            true,
            json!({
                "vaultId": vault_id.to_string(),
                "encrypted": self.inner.encryption_enabled,
                "overwrote": overwrote,
            }),
        );
        tracing::info!(%license_id, vault_id = %vault_id, overwrote, "license stored in vault");

        self.spawn_backup_sync(license_id, vault_id.clone());

        StoreOutcome {
            success: true,
            vault_id: Some(vault_id),
            message: "License stored in vault with backup replication".to_string(),
        }
    }

    /// Background backup replication for one store event. Only the
    /// entry that still carries `vault_id` is updated, so a sync from
    /// an overwritten store cannot clobber the newer entry's status.
    fn spawn_backup_sync(&self, license_id: String, vault_id: VaultId) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.transport.pulse_latency()).await;
            let status = match inner.transport.replicate(&license_id) {
                Ok(()) => BackupStatus::Synced,
                Err(err) => {
                    tracing::warn!(%license_id, error = %err, "vault backup sync failed");
                    BackupStatus::Failed
                }
            };
            if let Some(mut entry) = inner.entries.get_mut(&license_id) {
                if entry.vault_id == vault_id {
                    entry.backup_status = status;
                }
            }
        });
        self.inner.inflight.lock().push(handle);
    }

    /// Looks up a license by id, bumping its access bookkeeping.
    pub fn retrieve(&self, license_id: &str, actor_id: Option<String>) -> RetrieveOutcome {
        let started = Instant::now();
        let found = self.inner.entries.get_mut(license_id).map(|mut entry| {
            entry.access_count += 1;
            entry.last_accessed_at = Utc::now();
            (entry.license.clone(), entry.vault_id.clone(), entry.access_count)
        });

        match found {
            Some((license, vault_id, access_count)) => {
                let micros = started.elapsed().as_micros() as u64;
                self.inner.retrieval_micros.fetch_add(micros, Ordering::Relaxed);
                self.inner.retrievals.fetch_add(1, Ordering::Relaxed);
                self.inner.audit.record(
                    license_id,
                    AuditOperation::Retrieve,
                    actor_id,
                    true,
                    json!({ "accessCount": access_count }),
                );
                RetrieveOutcome {
                    success: true,
                    license: Some(license),
                    vault_id: Some(vault_id),
                    message: "License retrieved from vault".to_string(),
                }
            }
            None => {
                self.inner.audit.record(
                    license_id,
                    AuditOperation::Retrieve,
                    actor_id,
                    false,
                    json!({ "reason": "not found" }),
                );
                RetrieveOutcome {
                    success: false,
                    license: None,
                    vault_id: None,
                    message: "License not found in vault".to_string(),
                }
            }
        }
    }

    /// All licenses stored for a user, oldest first. Records a single
    /// bulk-query audit entry with the result count.
    pub fn licenses_for_user(&self, user_id: &str) -> Vec<License> {
        let licenses = self.scan(|e| e.license.user_id == user_id);
        self.inner.audit.record(
            BULK_QUERY_ID,
            AuditOperation::Retrieve,
            Some(user_id.to_string()),
            true,
            json!({ "count": licenses.len(), "userId": user_id }),
        );
        licenses
    }

    /// All licenses bound to a domain, oldest first. Unaudited.
    pub fn licenses_for_domain(&self, domain: &str) -> Vec<License> {
        self.scan(|e| e.license.domain == domain)
    }

    /// All licenses issued for an app, oldest first. Unaudited.
    pub fn licenses_for_app(&self, app_id: &str) -> Vec<License> {
        self.scan(|e| e.license.app_id == app_id)
    }

    fn scan(&self, keep: impl Fn(&VaultEntry) -> bool) -> Vec<License> {
        let mut matched: Vec<(DateTime<Utc>, License)> = self
            .inner
            .entries
            .iter()
            .filter(|e| keep(e.value()))
            .map(|e| (e.stored_at, e.license.clone()))
            .collect();
        // DashMap iteration order is arbitrary; callers expect storage order.
        matched.sort_by_key(|(stored_at, _)| *stored_at);
        matched.into_iter().map(|(_, license)| license).collect()
    }

    /// Checks a stored license's validity, including expiry.
    pub fn verify(&self, license_id: &str) -> VaultVerification {
        match self.inner.entries.get(license_id) {
            Some(entry) => {
                let expired = entry.license.is_expired(Utc::now());
                let backup_synced = entry.backup_status == BackupStatus::Synced;
                let message = if expired {
                    "License has expired".to_string()
                } else {
                    "License is valid and vault-bound".to_string()
                };
                self.inner.audit.record(
                    license_id,
                    AuditOperation::Verify,
                    None,
                    !expired,
                    json!({ "expired": expired, "backupSynced": backup_synced }),
                );
                VaultVerification {
                    valid: !expired,
                    expired,
                    backup_synced,
                    message,
                }
            }
            None => {
                self.inner.audit.record(
                    license_id,
                    AuditOperation::Verify,
                    None,
                    false,
                    json!({ "reason": "not found" }),
                );
                VaultVerification {
                    valid: false,
                    expired: false,
                    backup_synced: false,
                    message: "License not found in vault".to_string(),
                }
            }
        }
    }

    /// Builds the downloadable export document for a stored license.
    pub fn export(&self, license_id: &str, actor_id: Option<String>) -> ExportOutcome {
        match self.inner.entries.get(license_id) {
            Some(entry) => {
                let payload = ExportPayload {
                    license: entry.license.clone(),
                    vault_metadata: VaultMetadata {
                        vault_id: entry.vault_id.clone(),
                        stored_at: entry.stored_at,
                        access_count: entry.access_count,
                        backup_status: entry.backup_status,
                    },
                    exported_at: Utc::now(),
                    exported_by: actor_id.clone(),
                };
                drop(entry);
                let size_bytes = serde_json::to_vec(&payload)
                    .map(|b| b.len())
                    .unwrap_or(0);
                self.inner.audit.record(
                    license_id,
                    AuditOperation::Export,
                    actor_id,
                    true,
                    json!({ "sizeBytes": size_bytes }),
                );
                ExportOutcome {
                    success: true,
                    payload: Some(payload),
                    message: "License exported from vault".to_string(),
                }
            }
            None => {
                self.inner.audit.record(
                    license_id,
                    AuditOperation::Export,
                    actor_id,
                    false,
                    json!({ "reason": "not found" }),
                );
                ExportOutcome {
                    success: false,
                    payload: None,
                    message: "License not found in vault".to_string(),
                }
            }
        }
    }

    pub fn statistics(&self) -> VaultStatistics {
        let total_licenses = self.inner.entries.len() as u64;
        let mut synced_count = 0u64;
        let mut last_backup: Option<DateTime<Utc>> = None;
        for entry in self.inner.entries.iter() {
            if entry.backup_status == BackupStatus::Synced {
                synced_count += 1;
            }
            if last_backup.map_or(true, |t| entry.stored_at > t) {
                last_backup = Some(entry.stored_at);
            }
        }
        let retrievals = self.inner.retrievals.load(Ordering::Relaxed);
        let avg_retrieval_latency_ms = if retrievals == 0 {
            0.0
        } else {
            self.inner.retrieval_micros.load(Ordering::Relaxed) as f64
                / retrievals as f64
                / 1000.0
        };
        VaultStatistics {
            total_licenses,
            synced_count,
            estimated_storage_gb: (total_licenses * ESTIMATED_ENTRY_BYTES) as f64
                / (1024.0 * 1024.0 * 1024.0),
            last_backup,
            audit_entries: self.inner.audit.len() as u64,
            avg_retrieval_latency_ms,
        }
    }

    /// Returns a page of the audit trail in insertion order.
    pub fn audit_log(&self, limit: usize, offset: usize) -> Vec<AuditLogEntry> {
        self.inner.audit.slice(limit, offset)
    }

    /// Returns the full trail for one license, in insertion order.
    pub fn audit_log_for_license(&self, license_id: &str) -> Vec<AuditLogEntry> {
        self.inner.audit.for_license(license_id)
    }

    /// Reports vault health. Unhealthy when any entry's backup has
    /// failed or any stored license has expired.
    pub fn health(&self) -> VaultHealth {
        let now = Utc::now();
        let mut failed_backups = 0u64;
        let mut expired = 0u64;
        for entry in self.inner.entries.iter() {
            if entry.backup_status == BackupStatus::Failed {
                failed_backups += 1;
            }
            if entry.license.is_expired(now) {
                expired += 1;
            }
        }
        let mut issues = Vec::new();
        if failed_backups > 0 {
            issues.push(format!("{failed_backups} license(s) with failed backup sync"));
        }
        if expired > 0 {
            issues.push(format!("{expired} expired license(s) in vault"));
        }
        VaultHealth {
            healthy: issues.is_empty(),
            issues,
            backup_connected: self.inner.transport.is_connected(),
            encryption_active: self.inner.encryption_enabled,
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Drops every entry and the audit trail. Test and dev reset only.
    pub fn clear(&self) {
        self.inner.entries.clear();
        self.inner.audit.clear();
        tracing::warn!("vault cleared");
    }

    /// Awaits every in-flight backup sync. Used by graceful shutdown
    /// and by tests that need deterministic backup status.
    pub async fn quiesce(&self) {
        let handles: Vec<_> = std::mem::take(&mut *self.inner.inflight.lock());
        for handle in handles {
            let _ = handle.await;
        }
    }
}
