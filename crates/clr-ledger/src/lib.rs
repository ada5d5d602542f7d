// SPDX-License-Identifier: BUSL-1.1
//! # clr-ledger — ClaimRoot License Issuer
//!
//! Mints [`clr_core::License`] records and maintains the treaty ledger:
//! an append-only, position-indexed history of issuance events.
//!
//! ## Components
//!
//! - [`ledger`] — the [`LedgerEntry`] record and its wire shape.
//! - [`issuer`] — the [`Issuer`] service: issuance, token verification,
//!   ledger queries, statistics, and the fire-and-forget ledger sync.
//!
//! ## Invariants
//!
//! - Ledger positions are strictly increasing and never reused; the
//!   counter starts above zero (documented pre-existing history) and the
//!   first issuance returns `start + 1`.
//! - Ledger entries are never deleted or reordered.
//! - A scroll hash resolves to at most one ledger entry.

pub mod issuer;
pub mod ledger;

pub use issuer::{IssueRequest, Issuer, IssuerStatistics, TokenVerification, DEFAULT_START_POSITION};
pub use ledger::LedgerEntry;
