//! Referenced-record lookup boundary.
//!
//! # Responsibility
//! - Define the only capability the core needs from a persistence layer.
//! - Provide an in-memory implementation for hosts and tests.
//!
//! # Invariants
//! - Single-id lookups report absence as `Ok(None)`, never as an error.
//! - Multi-id lookups silently omit unknown identifiers.

pub mod lookup;
pub mod memory;
