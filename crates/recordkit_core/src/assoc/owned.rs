//! Owned (embedded) associations.

use crate::assoc::describe;
use crate::error::{RecordError, RecordResult};
use crate::model::record::Record;
use crate::model::value::Value;
use crate::repo::lookup::RecordLookup;
use crate::schema::Schema;
use log::debug;
use std::sync::Arc;

pub(crate) fn single(attribute: &str, target: &Schema, value: Value) -> RecordResult<Option<Record>> {
    match value {
        Value::Null => Ok(None),
        Value::Record(record) if record.schema().is_kind_of(target.name()) => Ok(Some(record)),
        other => Err(wrong_type(attribute, target, &other)),
    }
}

/// Accepts a list of records, or a map whose values are taken in order.
pub(crate) fn collection(attribute: &str, target: &Schema, value: Value) -> RecordResult<Vec<Record>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Record(record) if record.schema().is_kind_of(target.name()) => Ok(record),
                other => Err(wrong_type(attribute, target, &other)),
            })
            .collect(),
        Value::Map(map) => collection(attribute, target, Value::List(map.into_values().collect())),
        other => Err(RecordError::NotACollection {
            attribute: attribute.to_string(),
            found: describe(&other),
        }),
    }
}

/// Builds the owned record from a nested attribute payload.
///
/// `nil` and `false` clear the association.
pub(crate) fn nested_single(
    attribute: &str,
    target: &Arc<Schema>,
    payload: Value,
    lookup: &dyn RecordLookup,
) -> RecordResult<Option<Record>> {
    match payload {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Map(attributes) => {
            debug!(
                "event=nested_build module=assoc status=start attribute={} type={} keys={}",
                attribute,
                target.name(),
                attributes.len()
            );
            Record::build(target, attributes, lookup).map(Some)
        }
        other => Err(RecordError::UnexpectedValue {
            attribute: format!("{attribute}_attributes"),
            expected: "an attribute map",
            found: other.type_label(),
        }),
    }
}

/// Builds every element of an owned collection from its payloads.
///
/// Payloads come as a list, or as a map whose values are used in key order
/// (the shape form encoders produce for indexed fields). A `nil` element
/// yields an empty record.
pub(crate) fn nested_collection(
    attribute: &str,
    target: &Arc<Schema>,
    payload: Value,
    lookup: &dyn RecordLookup,
) -> RecordResult<Vec<Record>> {
    let payloads: Vec<Value> = match payload {
        Value::Null | Value::Bool(false) => return Ok(Vec::new()),
        Value::Map(indexed) => indexed.into_values().collect(),
        Value::List(items) => items,
        other => {
            return Err(RecordError::UnexpectedValue {
                attribute: format!("{attribute}_attributes"),
                expected: "a list or map of attribute maps",
                found: other.type_label(),
            })
        }
    };
    debug!(
        "event=nested_build module=assoc status=start attribute={} type={} count={}",
        attribute,
        target.name(),
        payloads.len()
    );
    payloads
        .into_iter()
        .map(|element| match element {
            Value::Null => Ok(Record::new(target)),
            Value::Map(attributes) => Record::build(target, attributes, lookup),
            other => Err(RecordError::UnexpectedValue {
                attribute: format!("{attribute}_attributes"),
                expected: "an attribute map",
                found: other.type_label(),
            }),
        })
        .collect()
}

fn wrong_type(attribute: &str, target: &Schema, found: &Value) -> RecordError {
    RecordError::WrongAssociationType {
        attribute: attribute.to_string(),
        expected: target.name().to_string(),
        found: describe(found),
    }
}
