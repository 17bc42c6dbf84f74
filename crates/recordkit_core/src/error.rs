//! Configuration error contract.
//!
//! # Responsibility
//! - Describe every caller/programmer contract violation the core can detect.
//! - Keep validation failures out of this type; those accumulate in
//!   `validation::ValidationErrors` instead.
//!
//! # Invariants
//! - Errors are returned at the point of misuse and never swallowed.
//! - Messages carry attribute and type names only, never payload contents
//!   beyond the offending token.

use crate::repo::lookup::LookupError;
use crate::schema::attribute::AttributeKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RecordResult<T> = Result<T, RecordError>;

/// Configuration error raised by schema declaration or record assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Attribute (or derived setter) name already registered on the type chain.
    DuplicateDeclaration {
        type_name: String,
        kind: AttributeKind,
        name: String,
    },
    /// Declaration arguments are unusable.
    MalformedDeclaration {
        type_name: String,
        name: String,
        reason: String,
    },
    /// No setter exists for a mass-assignment key.
    UnknownAttribute { type_name: String, key: String },
    /// Association setter received an instance of another type.
    WrongAssociationType {
        attribute: String,
        expected: String,
        found: String,
    },
    /// Collection setter received a value with no sequence form.
    NotACollection { attribute: String, found: String },
    /// Fail-fast identifier lookup found nothing (generic form).
    NotFound { type_name: String, id: i64 },
    /// Fail-fast identifier lookup found nothing (attribute-specific form).
    UnresolvedReference {
        attribute: String,
        type_name: String,
        id: i64,
    },
    /// Identifier token is neither an integer nor a digit string.
    InvalidIdentifier { attribute: String, value: String },
    /// Enum setter configured to fail on out-of-set values.
    InvalidEnumValue { attribute: String, value: String },
    /// Setter received a value type it never accepts.
    UnexpectedValue {
        attribute: String,
        expected: &'static str,
        found: &'static str,
    },
    /// External lookup capability failed.
    Lookup(LookupError),
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateDeclaration {
                type_name,
                kind,
                name,
            } => write!(
                f,
                "`{type_name}` already contains an attribute named `{name}` (declaring {kind})"
            ),
            Self::MalformedDeclaration {
                type_name,
                name,
                reason,
            } => write!(f, "malformed declaration `{type_name}.{name}`: {reason}"),
            Self::UnknownAttribute { type_name, key } => {
                write!(f, "unknown attribute `{key}` for `{type_name}`")
            }
            Self::WrongAssociationType {
                attribute,
                expected,
                found,
            } => write!(
                f,
                "assignment to `{attribute}` expected instance of `{expected}`, got {found}"
            ),
            Self::NotACollection { attribute, found } => write!(
                f,
                "assignment to `{attribute}` expected a collection, got {found}"
            ),
            Self::NotFound { type_name, id } => {
                write!(f, "couldn't find `{type_name}` with id={id}")
            }
            Self::UnresolvedReference {
                attribute,
                type_name,
                id,
            } => write!(
                f,
                "reference `{attribute}` could not resolve `{type_name}` with id={id}"
            ),
            Self::InvalidIdentifier { attribute, value } => write!(
                f,
                "assignment to `{attribute}` contained value ({value}) not an integer or stringified integer"
            ),
            Self::InvalidEnumValue { attribute, value } => write!(
                f,
                "assignment to `{attribute}` expected a declared enum value or nil, got `{value}`"
            ),
            Self::UnexpectedValue {
                attribute,
                expected,
                found,
            } => write!(
                f,
                "unexpected value passed to `{attribute}`; expected {expected}, got {found}"
            ),
            Self::Lookup(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lookup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LookupError> for RecordError {
    fn from(value: LookupError) -> Self {
        Self::Lookup(value)
    }
}
