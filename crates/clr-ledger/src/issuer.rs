// SPDX-License-Identifier: BUSL-1.1
//! # License Issuer
//!
//! Mints licenses and appends treaty ledger entries. The issuer owns all
//! issuance state: the position counter, the ledger, and the scroll hash
//! index. It assumes pre-validated input — request-field validation
//! happens at the HTTP boundary in `clr-api`.
//!
//! ## Ledger Sync
//!
//! Every issuance spawns a background mesh replication task. The license
//! is returned to the caller before the sync runs; a sync failure is
//! logged and leaves the entry's `synced` flag false, observable only
//! through [`Issuer::statistics`]. It never surfaces as an issuance
//! error.
//!
//! ## Concurrency
//!
//! The position counter increments under the ledger write lock, so
//! concurrent issuances receive strictly increasing, non-repeating
//! positions AND append in position order — the ledger vector stays
//! sorted, which the binary-search lookup paths rely on. Queries clone
//! out of the read lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use clr_core::{ComplianceStatus, License, LicenseId, LicenseTier, ScrollHash};
use clr_mesh::MeshTransport;

use crate::ledger::LedgerEntry;

/// Ledger position the counter starts from, simulating the documented
/// count of historical issuances that predate this deployment. The first
/// license issued lands at `DEFAULT_START_POSITION + 1`.
pub const DEFAULT_START_POSITION: u64 = 1834;

/// Licenses are valid for one year from issuance.
const VALIDITY_DAYS: i64 = 365;

/// A validated license issuance request.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub app_id: String,
    pub app_name: String,
    pub user_id: String,
    pub domain: String,
    pub issued_to: String,
    pub sector: Option<String>,
    pub tier: LicenseTier,
}

/// Outcome of a scroll hash verification against the ledger.
///
/// Ledger verification checks existence only; expiry is the vault's
/// concern (`clr-vault` verify does check it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenVerification {
    pub valid: bool,
    pub message: String,
}

/// Aggregate issuer statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerStatistics {
    /// Number of licenses issued by this instance.
    pub total_issued: u64,
    /// Last assigned ledger position.
    pub current_position: u64,
    /// Entries whose background ledger sync has completed.
    pub synced_count: u64,
    /// Entries bound to a scroll hash (all of them, by construction).
    pub scroll_bound: u64,
}

struct IssuerInner<T> {
    transport: T,
    /// Last assigned ledger position.
    position: AtomicU64,
    /// Append-only ledger, ascending by position.
    ledger: RwLock<Vec<LedgerEntry>>,
    /// Scroll hash → ledger position.
    token_index: DashMap<String, u64>,
    /// In-flight sync tasks, drained by [`Issuer::quiesce`].
    inflight: Mutex<Vec<JoinHandle<()>>>,
}

/// The ClaimRoot license issuer.
///
/// Cheaply cloneable via `Arc` — all clones share the same ledger.
pub struct Issuer<T> {
    inner: Arc<IssuerInner<T>>,
}

impl<T> Clone for Issuer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: MeshTransport> Issuer<T> {
    /// Create an issuer starting from [`DEFAULT_START_POSITION`].
    pub fn new(transport: T) -> Self {
        Self::with_start_position(transport, DEFAULT_START_POSITION)
    }

    /// Create an issuer with an explicit ledger start position. Tests
    /// use this for isolated instances; deployments restoring from a
    /// snapshot use it to preserve position monotonicity.
    pub fn with_start_position(transport: T, start: u64) -> Self {
        Self {
            inner: Arc::new(IssuerInner {
                transport,
                position: AtomicU64::new(start),
                ledger: RwLock::new(Vec::new()),
                token_index: DashMap::new(),
                inflight: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Issue a new license and append its ledger entry.
    ///
    /// Input is assumed validated (non-empty required fields). Returns
    /// the license immediately; ledger sync runs in the background.
    pub fn issue(&self, req: IssueRequest) -> License {
        let issued_at = Utc::now();
        let license_id = LicenseId::mint(&req.app_id);
        let scroll_hash = ScrollHash::derive(
            &req.app_id,
            &req.app_name,
            &req.user_id,
            &req.domain,
            issued_at,
        );
        // The counter increments while the write lock is held so append
        // order matches position order; the lookup and sync-completion
        // paths binary-search the vector and rely on it staying sorted.
        let position = {
            let mut ledger = self.inner.ledger.write();
            let position = self.inner.position.fetch_add(1, Ordering::SeqCst) + 1;
            ledger.push(LedgerEntry {
                position,
                license_id: license_id.clone(),
                app_id: req.app_id.clone(),
                timestamp: issued_at,
                scroll_hash: scroll_hash.clone(),
                tier: req.tier,
                synced: false,
            });
            position
        };
        self.inner.token_index.insert(scroll_hash.as_str().to_string(), position);

        let license = License {
            license_id: license_id.clone(),
            app_id: req.app_id,
            app_name: req.app_name,
            user_id: req.user_id,
            domain: req.domain,
            issued_to: req.issued_to,
            sector: req.sector,
            scroll_hash,
            ledger_position: position,
            scroll_bound: true,
            issued_at,
            expires_at: issued_at + Duration::days(VALIDITY_DAYS),
            compliance_status: ComplianceStatus::Verified,
            tier: req.tier,
            pdf_url: format!("/licenses/{license_id}.pdf"),
        };

        tracing::info!(
            license_id = %license_id,
            position,
            tier = %req.tier,
            "license issued"
        );

        self.spawn_ledger_sync(license_id, position);
        license
    }

    /// Fire-and-forget ledger sync. The only externally observable
    /// effect is the later `synced` flag transition.
    fn spawn_ledger_sync(&self, license_id: LicenseId, position: u64) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.transport.pulse_latency()).await;
            match inner.transport.replicate(license_id.as_str()) {
                Ok(()) => {
                    let mut ledger = inner.ledger.write();
                    if let Ok(idx) = ledger.binary_search_by_key(&position, |e| e.position) {
                        ledger[idx].synced = true;
                    }
                    tracing::debug!(license_id = %license_id, position, "ledger sync complete");
                }
                Err(err) => {
                    tracing::warn!(
                        license_id = %license_id,
                        position,
                        error = %err,
                        "ledger sync failed; entry remains unsynced"
                    );
                }
            }
        });
        self.inner.inflight.lock().push(handle);
    }

    /// Verify a scroll hash against the ledger.
    ///
    /// Existence check only — does not consult expiry.
    pub fn verify_token(&self, scroll_hash: &str) -> TokenVerification {
        if self.inner.token_index.contains_key(scroll_hash) {
            TokenVerification {
                valid: true,
                message: "License verified - scroll bound and recorded in treaty ledger"
                    .to_string(),
            }
        } else {
            TokenVerification {
                valid: false,
                message: "Scroll hash not found in treaty ledger".to_string(),
            }
        }
    }

    /// Look up a ledger entry by position.
    pub fn ledger_entry(&self, position: u64) -> Option<LedgerEntry> {
        let ledger = self.inner.ledger.read();
        ledger
            .binary_search_by_key(&position, |e| e.position)
            .ok()
            .map(|idx| ledger[idx].clone())
    }

    /// A slice of the ledger in ascending position order.
    pub fn ledger_slice(&self, limit: usize, offset: usize) -> Vec<LedgerEntry> {
        self.inner
            .ledger
            .read()
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Last assigned ledger position.
    pub fn current_position(&self) -> u64 {
        self.inner.position.load(Ordering::SeqCst)
    }

    /// Aggregate statistics over the ledger.
    pub fn statistics(&self) -> IssuerStatistics {
        let ledger = self.inner.ledger.read();
        let total = ledger.len() as u64;
        let synced = ledger.iter().filter(|e| e.synced).count() as u64;
        IssuerStatistics {
            total_issued: total,
            current_position: self.current_position(),
            synced_count: synced,
            scroll_bound: total,
        }
    }

    /// Renew an existing license.
    ///
    /// Not implemented: renewal requires durable license storage and a
    /// governance decision on expiry extension. Always returns `None`.
    pub fn renew(&self, license_id: &str) -> Option<License> {
        tracing::warn!(license_id, "license renewal is not implemented");
        None
    }

    /// Revoke a license.
    ///
    /// ClaimRoot licenses are immutable once issued; revocation requires
    /// an out-of-band governance action that this system does not model.
    /// Always returns `false`.
    pub fn revoke(&self, license_id: &str, reason: &str) -> bool {
        tracing::warn!(
            license_id,
            reason,
            "revocation refused: licenses are immutable once issued"
        );
        false
    }

    /// Await all in-flight ledger sync tasks. Used for graceful shutdown
    /// and by tests that assert on post-sync state.
    pub async fn quiesce(&self) {
        let handles: Vec<JoinHandle<()>> = self.inner.inflight.lock().drain(..).collect();
        for handle in handles {
            // A panicked sync task only loses its own sync mark.
            let _ = handle.await;
        }
    }
}
