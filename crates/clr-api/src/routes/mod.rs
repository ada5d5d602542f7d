// SPDX-License-Identifier: BUSL-1.1
//! # API Route Modules
//!
//! Route modules for the ClaimRoot API surface:
//!
//! - `licenses` — License Issuer endpoints: generation (issue + vault
//!   store), scroll hash verification, treaty ledger queries, issuer
//!   statistics.
//! - `vault` — License Store endpoints: retrieval, per-user/domain/app
//!   lookup, verification with expiry, export download, statistics,
//!   audit trail, and health.

pub mod licenses;
pub mod vault;
