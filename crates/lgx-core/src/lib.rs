//! # lgx-core: Foundational Types for LGX
//!
//! Leaf crate of the LGX workspace. Every other `lgx-*` crate depends on it;
//! it depends on nothing internal.
//!
//! ## Contents
//!
//! 1. **Identifier newtypes.** `ShipmentId`, `ShipmentRef`, `MilestoneId`.
//!    Validated constructors, no bare strings crossing crate boundaries.
//!
//! 2. **Shipment taxonomy.** `ShipmentDirection`, `TransportMode`,
//!    `MilestoneCategory` and the `Department` each category is routed to.
//!    Exhaustive `match` everywhere.
//!
//! 3. **UTC-only timestamps** for transition records and snapshots, plus
//!    calendar-date validation for milestone dates.
//!
//! 4. **`CanonicalBytes` + SHA-256 digests** for export snapshots. All digest
//!    computation flows through `CanonicalBytes::new()`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lgx-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod domain;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use domain::{Department, MilestoneCategory, ShipmentDirection, TransportMode};
pub use error::{CanonicalizationError, LgxError};
pub use identity::{MilestoneId, ShipmentId, ShipmentRef};
pub use temporal::{parse_calendar_date, Timestamp};
