//! Typed record instances.
//!
//! # Responsibility
//! - Hold one slot of attribute state per effective schema attribute.
//! - Dispatch setter keys (`name`, `name_attributes`, `name_id`, `name_ids`)
//!   to the coercion strategies and association bindings.
//!
//! # Invariants
//! - Slot order mirrors `Schema::attributes()`.
//! - Tracked slots keep `raw` verbatim even when conversion fails.
//! - Collections are never absent; a fresh record starts with empty ones.

use crate::coerce;
use crate::error::{RecordError, RecordResult};
use crate::model::entity::{Entity, Identifiable};
use crate::model::value::Value;
use crate::repo::lookup::RecordLookup;
use crate::schema::attribute::{AttributeConfig, AttributeKind, SetterForm, TimezoneSource};
use crate::schema::Schema;
use bigdecimal::BigDecimal;
use chrono::DateTime;
use chrono_tz::Tz;
use std::any::Any;
use std::sync::Arc;

/// Raw input plus its conversion for tracked kinds.
#[derive(Debug, Clone)]
pub(crate) struct Tracked<T> {
    pub raw: Value,
    pub converted: Option<T>,
}

impl<T> Tracked<T> {
    fn empty() -> Self {
        Self {
            raw: Value::Null,
            converted: None,
        }
    }

    /// Something was entered but did not convert.
    pub fn is_mismatched(&self) -> bool {
        self.raw.is_present() && self.converted.is_none()
    }
}

/// Per-attribute state.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Boolean(Option<bool>),
    Integer(Tracked<i64>),
    /// Decimal and currency kinds.
    Decimal(Tracked<BigDecimal>),
    Date(Tracked<DateTime<Tz>>),
    /// String and enum kinds.
    Text(Option<String>),
    Owned(Option<Box<Record>>),
    OwnedCollection(Vec<Record>),
    Reference {
        id: Option<i64>,
        target: Option<Arc<dyn Entity>>,
    },
    ReferenceCollection(Vec<Arc<dyn Entity>>),
}

impl Slot {
    fn empty(config: &AttributeConfig) -> Self {
        match config {
            AttributeConfig::Boolean => Self::Boolean(None),
            AttributeConfig::Integer => Self::Integer(Tracked::empty()),
            AttributeConfig::Decimal | AttributeConfig::Currency(_) => {
                Self::Decimal(Tracked::empty())
            }
            AttributeConfig::Date(_) => Self::Date(Tracked::empty()),
            AttributeConfig::String(_) | AttributeConfig::Enum(_) => Self::Text(None),
            AttributeConfig::Owned(_) => Self::Owned(None),
            AttributeConfig::OwnedCollection(_) => Self::OwnedCollection(Vec::new()),
            AttributeConfig::Reference(_) => Self::Reference {
                id: None,
                target: None,
            },
            AttributeConfig::ReferenceCollection(_) => Self::ReferenceCollection(Vec::new()),
        }
    }
}

/// One instance of a schema-described record type.
#[derive(Debug, Clone)]
pub struct Record {
    pub(crate) schema: Arc<Schema>,
    pub(crate) slots: Vec<Slot>,
}

impl Record {
    /// Creates an instance with every attribute unset and every collection empty.
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            slots: schema
                .attributes()
                .iter()
                .map(|spec| Slot::empty(&spec.config))
                .collect(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Model name of this instance's type.
    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    /// Returns whether the record carries a present integer `id` attribute.
    pub fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    /// Invokes the setter registered under `key`.
    ///
    /// `key` is a bare attribute name or one of its derived forms
    /// (`<name>_attributes`, `<name>_id`, `<name>_ids`). `lookup` is consulted
    /// only by identifier forms and by nested construction.
    ///
    /// # Errors
    /// - `UnknownAttribute` when no setter is registered under `key`.
    /// - Any configuration error raised by the target setter.
    pub fn set(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        lookup: &dyn RecordLookup,
    ) -> RecordResult<()> {
        let value = value.into();
        let (position, form) = self.schema.setter(key).ok_or_else(|| {
            RecordError::UnknownAttribute {
                type_name: self.schema.name().to_string(),
                key: key.to_string(),
            }
        })?;
        match form {
            SetterForm::Value => self.assign_value(position, value),
            SetterForm::NestedAttributes => self.assign_nested(position, value, lookup),
            SetterForm::Identifier => self.assign_identifier(position, value, lookup),
            SetterForm::Identifiers => self.assign_identifiers(position, value, lookup),
        }
    }

    fn assign_value(&mut self, position: usize, value: Value) -> RecordResult<()> {
        let schema = Arc::clone(&self.schema);
        let spec = &schema.attributes()[position];
        let name = spec.name.as_str();
        let slot = match &spec.config {
            AttributeConfig::Boolean => Slot::Boolean(coerce::boolean(&value)),
            AttributeConfig::Integer => Slot::Integer(Tracked {
                converted: coerce::integer(&value),
                raw: value,
            }),
            AttributeConfig::Decimal => Slot::Decimal(Tracked {
                converted: coerce::decimal(&value),
                raw: value,
            }),
            AttributeConfig::Currency(options) => Slot::Decimal(Tracked {
                converted: coerce::currency(&value, options.symbol),
                raw: value,
            }),
            AttributeConfig::Date(options) => {
                let zone = self.resolve_zone(&options.timezone);
                let converted =
                    coerce::date(&value, zone).map_err(|mismatch| mismatch.into_error(name))?;
                Slot::Date(Tracked {
                    raw: value,
                    converted,
                })
            }
            AttributeConfig::String(options) => Slot::Text(coerce::string(&value, options.strip)),
            AttributeConfig::Enum(options) => {
                let candidate = coerce::enumeration(&value);
                if options.fail_on_set && !options.permits(candidate.as_deref()) {
                    return Err(RecordError::InvalidEnumValue {
                        attribute: name.to_string(),
                        value: candidate.unwrap_or_else(|| "nil".to_string()),
                    });
                }
                Slot::Text(candidate)
            }
            AttributeConfig::Owned(_)
            | AttributeConfig::OwnedCollection(_)
            | AttributeConfig::Reference(_)
            | AttributeConfig::ReferenceCollection(_) => {
                return self.assign_association(position, value);
            }
        };
        self.slots[position] = slot;
        Ok(())
    }

    pub(crate) fn resolve_zone(&self, source: &TimezoneSource) -> Tz {
        match source {
            TimezoneSource::Utc => Tz::UTC,
            TimezoneSource::Fixed(zone) => *zone,
            TimezoneSource::Method(method) => self
                .schema
                .zone_resolver(method)
                .and_then(|resolver| resolver(self))
                .unwrap_or(Tz::UTC),
        }
    }

    pub(crate) fn slot(&self, name: &str) -> Option<&Slot> {
        self.schema
            .position(name)
            .map(|position| &self.slots[position])
    }

    /// Position of `name` when it is declared with `kind`.
    pub(crate) fn locate(&self, name: &str, kind: AttributeKind) -> RecordResult<usize> {
        self.schema
            .position(name)
            .filter(|position| self.schema.attributes()[*position].kind() == kind)
            .ok_or_else(|| RecordError::UnknownAttribute {
                type_name: self.schema.name().to_string(),
                key: name.to_string(),
            })
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.slot(name)? {
            Slot::Boolean(flag) => *flag,
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.slot(name)? {
            Slot::Integer(tracked) => tracked.converted,
            _ => None,
        }
    }

    /// Converted value of a decimal or currency attribute.
    pub fn decimal(&self, name: &str) -> Option<&BigDecimal> {
        match self.slot(name)? {
            Slot::Decimal(tracked) => tracked.converted.as_ref(),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<&DateTime<Tz>> {
        match self.slot(name)? {
            Slot::Date(tracked) => tracked.converted.as_ref(),
            _ => None,
        }
    }

    /// Value of a string or enum attribute.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.slot(name)? {
            Slot::Text(text) => text.as_deref(),
            _ => None,
        }
    }

    /// Last value presented to a tracked attribute, before conversion.
    pub fn unconverted_value(&self, name: &str) -> Option<&Value> {
        match self.slot(name)? {
            Slot::Integer(tracked) => Some(&tracked.raw),
            Slot::Decimal(tracked) => Some(&tracked.raw),
            Slot::Date(tracked) => Some(&tracked.raw),
            _ => None,
        }
    }

    pub fn owned(&self, name: &str) -> Option<&Record> {
        match self.slot(name)? {
            Slot::Owned(record) => record.as_deref(),
            _ => None,
        }
    }

    pub fn owned_mut(&mut self, name: &str) -> Option<&mut Record> {
        let position = self.schema.position(name)?;
        match &mut self.slots[position] {
            Slot::Owned(record) => record.as_deref_mut(),
            _ => None,
        }
    }

    pub fn owned_collection(&self, name: &str) -> &[Record] {
        match self.slot(name) {
            Some(Slot::OwnedCollection(records)) => records,
            _ => &[],
        }
    }

    pub fn reference(&self, name: &str) -> Option<&Arc<dyn Entity>> {
        match self.slot(name)? {
            Slot::Reference { target, .. } => target.as_ref(),
            _ => None,
        }
    }

    /// Companion identifier of a single reference.
    pub fn reference_id(&self, name: &str) -> Option<i64> {
        match self.slot(name)? {
            Slot::Reference { id, .. } => *id,
            _ => None,
        }
    }

    pub fn references(&self, name: &str) -> &[Arc<dyn Entity>] {
        match self.slot(name) {
            Some(Slot::ReferenceCollection(entities)) => entities,
            _ => &[],
        }
    }

    /// Identifiers of a referenced collection; entities without one are skipped.
    pub fn reference_ids(&self, name: &str) -> Vec<i64> {
        self.references(name)
            .iter()
            .filter_map(|entity| entity.id())
            .collect()
    }

    /// Current value of any attribute in untyped form.
    ///
    /// Returns `None` only when `name` is not declared.
    pub fn get(&self, name: &str) -> Option<Value> {
        let value = match self.slot(name)? {
            Slot::Boolean(flag) => Value::from(*flag),
            Slot::Integer(tracked) => Value::from(tracked.converted),
            Slot::Decimal(tracked) => Value::from(tracked.converted.clone()),
            Slot::Date(tracked) => {
                Value::from(tracked.converted.as_ref().map(DateTime::fixed_offset))
            }
            Slot::Text(text) => Value::from(text.clone()),
            Slot::Owned(record) => Value::from(record.as_deref().cloned()),
            Slot::OwnedCollection(records) => {
                Value::List(records.iter().cloned().map(Value::Record).collect())
            }
            Slot::Reference { target, .. } => Value::from(target.clone()),
            Slot::ReferenceCollection(entities) => {
                Value::List(entities.iter().cloned().map(Value::Entity).collect())
            }
        };
        Some(value)
    }
}

impl Identifiable for Record {
    fn id(&self) -> Option<i64> {
        self.integer("id")
    }
}

impl Entity for Record {
    fn type_name(&self) -> &str {
        self.schema.name()
    }

    fn is_kind_of(&self, type_name: &str) -> bool {
        self.schema.is_kind_of(type_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
