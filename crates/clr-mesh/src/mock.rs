// SPDX-License-Identifier: BUSL-1.1
//! # Mock Transport
//!
//! A configurable transport for tests: zero latency, scriptable failure,
//! and a replication counter so tests can assert that background sync
//! actually ran.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{MeshError, MeshTransport};

/// Test transport with scriptable failure and call counting.
///
/// Cheaply cloneable; clones share the same counters and failure switch.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    fail: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    replications: Arc<AtomicUsize>,
}

impl MockTransport {
    /// Create a mock transport that succeeds on every replication.
    pub fn new() -> Self {
        Self {
            fail: Arc::new(AtomicBool::new(false)),
            connected: Arc::new(AtomicBool::new(true)),
            replications: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock transport that fails every replication.
    pub fn failing() -> Self {
        let transport = Self::new();
        transport.fail.store(true, Ordering::SeqCst);
        transport.connected.store(false, Ordering::SeqCst);
        transport
    }

    /// Flip the failure switch at runtime.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
        self.connected.store(!failing, Ordering::SeqCst);
    }

    /// Number of replication attempts observed so far.
    pub fn replication_count(&self) -> usize {
        self.replications.load(Ordering::SeqCst)
    }
}

impl MeshTransport for MockTransport {
    fn replicate(&self, target: &str) -> Result<(), MeshError> {
        self.replications.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(MeshError::ReplicationFailed {
                target: target.to_string(),
                reason: "mock transport set to fail".to_string(),
            });
        }
        Ok(())
    }

    fn pulse_latency(&self) -> Duration {
        Duration::ZERO
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_counts_replications() {
        let transport = MockTransport::new();
        assert!(transport.replicate("a").is_ok());
        assert!(transport.replicate("b").is_ok());
        assert_eq!(transport.replication_count(), 2);
    }

    #[test]
    fn failing_mock_reports_disconnected() {
        let transport = MockTransport::failing();
        assert!(transport.replicate("a").is_err());
        assert!(!transport.is_connected());
    }

    #[test]
    fn failure_switch_can_be_flipped() {
        let transport = MockTransport::failing();
        transport.set_failing(false);
        assert!(transport.replicate("a").is_ok());
        assert!(transport.is_connected());
    }
}
