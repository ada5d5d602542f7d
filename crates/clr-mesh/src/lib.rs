// SPDX-License-Identifier: BUSL-1.1
//! # clr-mesh — VaultMesh Replication Seam
//!
//! Defines the abstract interface for replicating ledger entries and
//! vault records to the VaultMesh. All implementations (simulated pulse,
//! a future networked mesh, test mocks) must satisfy [`MeshTransport`].
//!
//! ## Contract
//!
//! Replication is a best-effort background step. Callers spawn it after
//! the local commit has already succeeded; a replication failure is
//! recorded in component state (`backup_status`, ledger `synced` flags)
//! and surfaced through statistics and health checks — it never fails
//! the operation that triggered it.
//!
//! The trait requires `Send + Sync + 'static` so implementations can be
//! shared with spawned tokio tasks.

pub mod mock;
pub mod pulse;

use std::time::Duration;

use thiserror::Error;

pub use mock::MockTransport;
pub use pulse::PulseTransport;

/// Error during a mesh replication attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The mesh rejected or failed to acknowledge the record.
    #[error("mesh replication failed for {target}: {reason}")]
    ReplicationFailed {
        /// Identifier of the record being replicated.
        target: String,
        /// Failure detail.
        reason: String,
    },
}

/// Abstract interface for VaultMesh replication.
///
/// `replicate` is synchronous; the simulated round-trip latency lives in
/// [`MeshTransport::pulse_latency`], which callers await before invoking
/// it. This keeps implementations trivial to mock while preserving the
/// bounded-latency background behavior of the reference system.
pub trait MeshTransport: Send + Sync + 'static {
    /// Push one record to the mesh, identified by `target`.
    fn replicate(&self, target: &str) -> Result<(), MeshError>;

    /// Simulated mesh round-trip latency. Callers sleep this long
    /// before calling [`MeshTransport::replicate`].
    fn pulse_latency(&self) -> Duration {
        Duration::from_millis(100)
    }

    /// Whether the transport currently considers the mesh reachable.
    /// Reported by vault health checks.
    fn is_connected(&self) -> bool {
        true
    }
}
