//! Untyped attribute values crossing the core boundary.
//!
//! # Responsibility
//! - Represent the shape a form/request decoding layer hands in: scalars,
//!   timestamps, nested mappings, sequences and already-built instances.
//! - Bridge that shape to and from `serde_json::Value`.
//!
//! # Invariants
//! - `AttributeMap` preserves insertion order.
//! - Blank rules are shared by every accessor through `Value::is_blank`.

use crate::model::entity::Entity;
use crate::model::record::Record;
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use std::str::FromStr;
use std::sync::Arc;

/// Ordered mapping from attribute (or derived setter) names to values.
pub type AttributeMap = IndexMap<String, Value>;

/// One untyped value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(BigDecimal),
    Text(String),
    /// Absolute instant with its original offset.
    Timestamp(DateTime<FixedOffset>),
    /// Wall-clock time without zone; attached to the attribute's zone on assignment.
    LocalTimestamp(NaiveDateTime),
    List(Vec<Value>),
    Map(AttributeMap),
    Record(Record),
    Entity(Arc<dyn Entity>),
}

impl Value {
    /// Returns whether this value counts as "nothing entered".
    ///
    /// Null, `false`, whitespace-only text, empty lists and empty maps are blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(value) => !value,
            Self::Text(text) => text.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    pub fn is_present(&self) -> bool {
        !self.is_blank()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type label used in error messages.
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Null => "nil",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "string",
            Self::Timestamp(_) | Self::LocalTimestamp(_) => "timestamp",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
            Self::Entity(_) => "entity",
        }
    }

    /// Scalar text form, when one exists.
    pub(crate) fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Bool(value) => Some(value.to_string()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Decimal(value) => Some(value.to_plain_string()),
            Self::Text(text) => Some(text.clone()),
            Self::Timestamp(value) => Some(value.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<AttributeMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Converts decoded JSON into an untyped value.
    ///
    /// Integral numbers become `Integer`; other numbers keep their exact
    /// decimal text as `Decimal`, falling back to `Float`.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    Self::Integer(integer)
                } else if let Ok(decimal) = BigDecimal::from_str(&number.to_string()) {
                    Self::Decimal(decimal)
                } else {
                    number.as_f64().map(Self::Float).unwrap_or(Self::Null)
                }
            }
            serde_json::Value::String(text) => Self::Text(text),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(object) => Self::Map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Renders this value as JSON.
    ///
    /// Decimals render as exact text, timestamps as RFC 3339, records as their
    /// serialized attribute mapping and entities as their identifier.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(value) => serde_json::Value::Bool(*value),
            Self::Integer(value) => serde_json::Value::from(*value),
            Self::Float(value) => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Decimal(value) => serde_json::Value::String(value.to_plain_string()),
            Self::Text(text) => serde_json::Value::String(text.clone()),
            Self::Timestamp(value) => {
                serde_json::Value::String(value.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
            Self::LocalTimestamp(value) => {
                serde_json::Value::String(value.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => map_to_json(map),
            Self::Record(record) => record.to_json(),
            Self::Entity(entity) => entity
                .id()
                .map(serde_json::Value::from)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

/// Renders an attribute mapping as a JSON object, keeping key order.
pub fn map_to_json(map: &AttributeMap) -> serde_json::Value {
    serde_json::Value::Object(
        map.iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<BigDecimal> for Value {
    fn from(value: BigDecimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value.fixed_offset())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::LocalTimestamp(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<AttributeMap> for Value {
    fn from(value: AttributeMap) -> Self {
        Self::Map(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<Arc<dyn Entity>> for Value {
    fn from(value: Arc<dyn Entity>) -> Self {
        Self::Entity(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}
