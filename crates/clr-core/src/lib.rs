// SPDX-License-Identifier: BUSL-1.1
//! # clr-core — Foundational Types for the ClaimRoot Stack
//!
//! Defines the domain primitives shared by the issuer (`clr-ledger`) and
//! the vault (`clr-vault`): the immutable [`License`] record, identifier
//! newtypes, and the [`ScrollHash`] verification token.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** [`LicenseId`],
//!    [`VaultId`], [`AuditId`] — no bare strings for identifiers that
//!    cross component boundaries.
//!
//! 2. **Licenses are immutable once issued.** There are no mutating
//!    methods on [`License`]; the issuer constructs it exactly once and
//!    every downstream component holds it read-only.
//!
//! 3. **The scroll hash is a real digest.** The reference system derived
//!    its verification token from a truncated base64 encoding; this
//!    implementation uses SHA-256 over the identifying attributes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `clr-*` crates (leaf of the DAG).
//! - No `unsafe` code, no `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, `Serialize`, `Deserialize`.

pub mod error;
pub mod identity;
pub mod license;
pub mod token;

pub use error::ValidationError;
pub use identity::{AuditId, LicenseId, VaultId};
pub use license::{ComplianceStatus, License, LicenseTier};
pub use token::ScrollHash;
