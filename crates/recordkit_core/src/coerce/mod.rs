//! Per-kind coercion strategies.
//!
//! # Responsibility
//! - Turn one untyped `Value` into the typed value of one attribute kind.
//! - Stay free of record state so every strategy is testable in isolation.
//!
//! # Invariants
//! - A malformed but acceptable input yields `None`, never an error.
//! - Only input *types* a kind never accepts yield `Mismatch` (dates only).

pub mod date;
pub mod numeric;
pub mod text;

pub use date::{date, parse_datetime};
pub use numeric::{currency, decimal, integer};
pub use text::{boolean, enumeration, string};

use crate::error::RecordError;

/// Input type a strategy refuses outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

impl Mismatch {
    pub(crate) fn into_error(self, attribute: &str) -> RecordError {
        RecordError::UnexpectedValue {
            attribute: attribute.to_string(),
            expected: self.expected,
            found: self.found,
        }
    }
}
