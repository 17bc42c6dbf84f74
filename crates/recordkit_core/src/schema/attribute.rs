//! Attribute declarations: kinds and kind-specific options.

use crate::schema::Schema;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Closed set of attribute kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Boolean,
    Integer,
    Decimal,
    Currency,
    Date,
    String,
    Enum,
    OwnedSingle,
    OwnedCollection,
    RefSingle,
    RefCollection,
}

impl AttributeKind {
    /// Category order used by serialization.
    pub const ALL: [AttributeKind; 11] = [
        Self::Boolean,
        Self::Integer,
        Self::Decimal,
        Self::Currency,
        Self::Date,
        Self::String,
        Self::Enum,
        Self::RefSingle,
        Self::RefCollection,
        Self::OwnedSingle,
        Self::OwnedCollection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Currency => "currency",
            Self::Date => "date",
            Self::String => "string",
            Self::Enum => "enum",
            Self::OwnedSingle => "owned_single",
            Self::OwnedCollection => "owned_collection",
            Self::RefSingle => "ref_single",
            Self::RefCollection => "ref_collection",
        }
    }

    /// Kinds that keep both a raw and a converted value.
    pub fn is_tracked(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Decimal | Self::Currency | Self::Date
        )
    }

    pub fn is_collection(self) -> bool {
        matches!(self, Self::OwnedCollection | Self::RefCollection)
    }
}

impl Display for AttributeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a date attribute takes its zone from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TimezoneSource {
    #[default]
    Utc,
    Fixed(Tz),
    /// Name of a zone resolver registered on the schema builder.
    Method(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringOptions {
    pub strip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyOptions {
    pub symbol: char,
}

impl Default for CurrencyOptions {
    fn default() -> Self {
        Self { symbol: '$' }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateOptions {
    pub timezone: TimezoneSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumOptions {
    pub values: Vec<String>,
    pub allow_nil: bool,
    /// Reject out-of-set values in the setter instead of at validation.
    pub fail_on_set: bool,
}

impl EnumOptions {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            allow_nil: true,
            fail_on_set: false,
        }
    }

    /// Returns whether `value` passes the membership rule.
    pub fn permits(&self, value: Option<&str>) -> bool {
        match value {
            None => self.allow_nil,
            Some(value) => self.values.iter().any(|allowed| allowed == value),
        }
    }
}

/// Error surfaced when a fail-fast identifier lookup finds nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// `RecordError::NotFound` naming only the target type.
    #[default]
    Generic,
    /// `RecordError::UnresolvedReference` naming the attribute as well.
    Attribute,
}

/// Options for a single referenced record.
///
/// An empty `target` is derived from the attribute name at declaration time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceOptions {
    pub target: String,
    pub eager_load: Vec<String>,
    pub not_found: NotFoundPolicy,
}

impl ReferenceOptions {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }
}

/// Options for a referenced collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCollectionOptions {
    pub target: String,
    pub eager_load: Vec<String>,
    /// Drop repeated identifiers before lookup.
    pub unique: bool,
}

impl Default for ReferenceCollectionOptions {
    fn default() -> Self {
        Self {
            target: String::new(),
            eager_load: Vec::new(),
            unique: true,
        }
    }
}

impl ReferenceCollectionOptions {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }
}

/// Kind plus kind-specific options for one declaration.
#[derive(Debug, Clone)]
pub enum AttributeConfig {
    Boolean,
    Integer,
    Decimal,
    Currency(CurrencyOptions),
    Date(DateOptions),
    String(StringOptions),
    Enum(EnumOptions),
    Owned(Arc<Schema>),
    OwnedCollection(Arc<Schema>),
    Reference(ReferenceOptions),
    ReferenceCollection(ReferenceCollectionOptions),
}

impl AttributeConfig {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Boolean => AttributeKind::Boolean,
            Self::Integer => AttributeKind::Integer,
            Self::Decimal => AttributeKind::Decimal,
            Self::Currency(_) => AttributeKind::Currency,
            Self::Date(_) => AttributeKind::Date,
            Self::String(_) => AttributeKind::String,
            Self::Enum(_) => AttributeKind::Enum,
            Self::Owned(_) => AttributeKind::OwnedSingle,
            Self::OwnedCollection(_) => AttributeKind::OwnedCollection,
            Self::Reference(_) => AttributeKind::RefSingle,
            Self::ReferenceCollection(_) => AttributeKind::RefCollection,
        }
    }
}

/// One declared attribute.
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    pub name: String,
    pub config: AttributeConfig,
}

impl AttributeSpec {
    pub fn kind(&self) -> AttributeKind {
        self.config.kind()
    }

    /// Setter names this attribute installs besides its bare name.
    pub fn auxiliary_setters(&self) -> Vec<(String, SetterForm)> {
        match self.kind() {
            AttributeKind::OwnedSingle | AttributeKind::OwnedCollection => vec![(
                format!("{}_attributes", self.name),
                SetterForm::NestedAttributes,
            )],
            AttributeKind::RefSingle => {
                vec![(format!("{}_id", self.name), SetterForm::Identifier)]
            }
            AttributeKind::RefCollection => {
                vec![(format!("{}_ids", self.name), SetterForm::Identifiers)]
            }
            _ => Vec::new(),
        }
    }
}

/// Which setter a dispatch-table key invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetterForm {
    /// Bare attribute name: value or instance form.
    Value,
    /// `<name>_attributes`: nested payload for owned kinds.
    NestedAttributes,
    /// `<name>_id`: identifier for a single reference.
    Identifier,
    /// `<name>_ids`: identifier list for a referenced collection.
    Identifiers,
}
