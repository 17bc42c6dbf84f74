//! Validation composition.
//!
//! # Responsibility
//! - Derive field errors from the attribute state of one record.
//! - Compose validity of owned associations into the parent.
//!
//! # Invariants
//! - Validation is pull-based and never mutates the record.
//! - Entries follow effective attribute order; at most one entry per attribute.
//! - Referenced associations never affect the parent's validity.

use crate::model::entity::Validatable;
use crate::model::record::{Record, Slot};
use crate::schema::attribute::AttributeConfig;
use log::debug;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Why an attribute failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    Invalid,
    NotAnInteger,
    NotANumber,
    Inclusion,
}

impl ErrorReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::NotAnInteger => "not_an_integer",
            Self::NotANumber => "not_a_number",
            Self::Inclusion => "inclusion",
        }
    }
}

impl Display for ErrorReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub attribute: String,
    pub reason: ErrorReason,
}

/// Ordered field errors of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    entries: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reasons recorded against `attribute`.
    pub fn on(&self, attribute: &str) -> Vec<ErrorReason> {
        self.entries
            .iter()
            .filter(|entry| entry.attribute == attribute)
            .map(|entry| entry.reason)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.entries.iter()
    }

    fn add(&mut self, attribute: &str, reason: ErrorReason) {
        self.entries.push(FieldError {
            attribute: attribute.to_string(),
            reason,
        });
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self
            .entries
            .iter()
            .map(|entry| format!("{} is {}", entry.attribute, entry.reason))
            .collect();
        f.write_str(&rendered.join(", "))
    }
}

impl Validatable for Record {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        for (spec, slot) in self.schema.attributes().iter().zip(&self.slots) {
            if let Some(reason) = check(&spec.config, slot) {
                errors.add(&spec.name, reason);
            }
        }
        debug!(
            "event=record_validate module=validation status={} type={} errors={}",
            if errors.is_empty() { "ok" } else { "error" },
            self.schema.name(),
            errors.len()
        );
        errors
    }
}

impl Record {
    /// Field errors for the current state; empty when valid.
    pub fn validate(&self) -> ValidationErrors {
        Validatable::validate(self)
    }

    pub fn is_valid(&self) -> bool {
        Validatable::is_valid(self)
    }
}

fn check(config: &AttributeConfig, slot: &Slot) -> Option<ErrorReason> {
    match (config, slot) {
        (AttributeConfig::Integer, Slot::Integer(tracked)) if tracked.is_mismatched() => {
            Some(ErrorReason::NotAnInteger)
        }
        (AttributeConfig::Decimal, Slot::Decimal(tracked)) if tracked.is_mismatched() => {
            Some(ErrorReason::NotANumber)
        }
        (AttributeConfig::Currency(_), Slot::Decimal(tracked)) if tracked.is_mismatched() => {
            Some(ErrorReason::Invalid)
        }
        (AttributeConfig::Date(_), Slot::Date(tracked)) if tracked.is_mismatched() => {
            Some(ErrorReason::Invalid)
        }
        (AttributeConfig::Enum(options), Slot::Text(value))
            if !options.permits(value.as_deref()) =>
        {
            Some(ErrorReason::Inclusion)
        }
        (AttributeConfig::Owned(_), Slot::Owned(Some(record))) if !record.is_valid() => {
            Some(ErrorReason::Invalid)
        }
        (AttributeConfig::OwnedCollection(_), Slot::OwnedCollection(records))
            if records.iter().any(|record| !record.is_valid()) =>
        {
            Some(ErrorReason::Invalid)
        }
        _ => None,
    }
}
