// SPDX-License-Identifier: BUSL-1.1
//! # Pulse Transport — Simulated VaultMesh
//!
//! The default transport for single-instance deployments. There is no
//! real mesh behind it: replication always succeeds after the configured
//! pulse latency. This matches the reference system, where VaultMesh
//! synchronization was a fixed 100ms delay with an unconditional success.

use std::time::Duration;

use crate::{MeshError, MeshTransport};

/// Simulated mesh transport: always succeeds after a fixed pulse delay.
#[derive(Debug, Clone)]
pub struct PulseTransport {
    latency: Duration,
}

impl PulseTransport {
    /// Create a transport with the standard 100ms pulse latency.
    pub fn new() -> Self {
        Self {
            latency: Duration::from_millis(100),
        }
    }

    /// Create a transport with a custom pulse latency. A zero latency is
    /// useful in tests that do not exercise timing behavior.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for PulseTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshTransport for PulseTransport {
    fn replicate(&self, target: &str) -> Result<(), MeshError> {
        tracing::debug!(record = %target, "mesh pulse replication complete");
        Ok(())
    }

    fn pulse_latency(&self) -> Duration {
        self.latency
    }
}
