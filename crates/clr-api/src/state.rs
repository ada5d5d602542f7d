// SPDX-License-Identifier: BUSL-1.1
//! # Application State
//!
//! Shared state handed to every handler. Both the issuer and the vault
//! are `Clone` over inner `Arc`s, so `AppState` clones are cheap and
//! all clones observe the same ledger, vault, and audit trail.

use std::time::Duration;

use clr_ledger::Issuer;
use clr_mesh::PulseTransport;
use clr_vault::LicenseVault;

/// Shared application state for the ClaimRoot API.
#[derive(Clone)]
pub struct AppState {
    pub issuer: Issuer<PulseTransport>,
    pub vault: LicenseVault<PulseTransport>,
}

impl AppState {
    /// State with the default treaty ledger start position and the
    /// standard 100ms mesh pulse.
    pub fn new() -> Self {
        Self {
            issuer: Issuer::new(PulseTransport::new()),
            vault: LicenseVault::new(PulseTransport::new()),
        }
    }

    /// State with an explicit ledger start position.
    pub fn with_ledger_start(start: u64) -> Self {
        Self {
            issuer: Issuer::with_start_position(PulseTransport::new(), start),
            vault: LicenseVault::new(PulseTransport::new()),
        }
    }

    /// State with a custom mesh pulse latency. Tests use a zero pulse so
    /// `quiesce` settles immediately.
    pub fn with_pulse_latency(latency: Duration) -> Self {
        Self {
            issuer: Issuer::new(PulseTransport::with_latency(latency)),
            vault: LicenseVault::new(PulseTransport::with_latency(latency)),
        }
    }

    /// Awaits all in-flight ledger and backup sync tasks.
    pub async fn quiesce(&self) {
        self.issuer.quiesce().await;
        self.vault.quiesce().await;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
