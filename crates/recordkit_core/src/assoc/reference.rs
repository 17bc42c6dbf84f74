//! Referenced (foreign) associations.

use crate::assoc::describe;
use crate::error::{RecordError, RecordResult};
use crate::model::entity::Entity;
use crate::model::value::Value;
use crate::repo::lookup::RecordLookup;
use crate::schema::attribute::{NotFoundPolicy, ReferenceCollectionOptions, ReferenceOptions};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;

static IDENTIFIER_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s*$").expect("identifier regex must compile"));

/// Parses an identifier token: an integer or a string of digits.
pub fn parse_identifier(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(id) => Some(*id),
        Value::Text(text) if IDENTIFIER_TEXT.is_match(text) => text.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn single(
    attribute: &str,
    target: &str,
    value: Value,
) -> RecordResult<Option<Arc<dyn Entity>>> {
    match value {
        Value::Null => Ok(None),
        Value::Entity(entity) => accept(attribute, target, entity).map(Some),
        Value::Record(record) => accept(attribute, target, Arc::new(record)).map(Some),
        other => Err(wrong_type(attribute, target, &other)),
    }
}

/// Accepts a list of entities, or a map whose values are taken in order.
pub(crate) fn collection(
    attribute: &str,
    target: &str,
    value: Value,
) -> RecordResult<Vec<Arc<dyn Entity>>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Entity(entity) => accept(attribute, target, entity),
                Value::Record(record) => accept(attribute, target, Arc::new(record)),
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

/// Resolves `<attribute>_id` input. Blank input clears the reference.
pub(crate) fn resolve(
    attribute: &str,
    options: &ReferenceOptions,
    value: Value,
    lookup: &dyn RecordLookup,
) -> RecordResult<Option<Arc<dyn Entity>>> {
    if value.is_blank() {
        return Ok(None);
    }
    let id = identifier(&format!("{attribute}_id"), &value)?;
    match lookup.find_by_id(&options.target, id, &options.eager_load)? {
        Some(entity) => {
            debug!(
                "event=reference_resolve module=assoc status=ok attribute={} type={} id={}",
                attribute, options.target, id
            );
            Ok(Some(entity))
        }
        None => {
            warn!(
                "event=reference_resolve module=assoc status=error attribute={} type={} id={} error_code=not_found",
                attribute, options.target, id
            );
            Err(match options.not_found {
                NotFoundPolicy::Generic => RecordError::NotFound {
                    type_name: options.target.clone(),
                    id,
                },
                NotFoundPolicy::Attribute => RecordError::UnresolvedReference {
                    attribute: attribute.to_string(),
                    type_name: options.target.clone(),
                    id,
                },
            })
        }
    }
}

/// Resolves `<attribute>_ids` input.
///
/// Identifiers that match nothing are dropped silently; the result follows
/// the lookup's own ordering.
pub(crate) fn resolve_many(
    attribute: &str,
    options: &ReferenceCollectionOptions,
    value: Value,
    lookup: &dyn RecordLookup,
) -> RecordResult<Vec<Arc<dyn Entity>>> {
    let key = format!("{attribute}_ids");
    let items = match value {
        blank if blank.is_blank() => return Ok(Vec::new()),
        Value::List(items) => items,
        other => {
            return Err(RecordError::UnexpectedValue {
                attribute: key,
                expected: "a list of identifiers",
                found: other.type_label(),
            })
        }
    };

    let mut seen = BTreeSet::new();
    let mut ids = Vec::with_capacity(items.len());
    for item in &items {
        let id = identifier(&key, item)?;
        if options.unique && !seen.insert(id) {
            continue;
        }
        ids.push(id);
    }

    let entities = lookup.find_by_ids(&options.target, &ids, &options.eager_load)?;
    debug!(
        "event=reference_resolve module=assoc status=ok attribute={} type={} requested={} resolved={}",
        attribute,
        options.target,
        ids.len(),
        entities.len()
    );
    Ok(entities)
}

fn identifier(key: &str, value: &Value) -> RecordResult<i64> {
    parse_identifier(value).ok_or_else(|| RecordError::InvalidIdentifier {
        attribute: key.to_string(),
        value: value
            .scalar_text()
            .unwrap_or_else(|| value.type_label().to_string()),
    })
}

fn accept(
    attribute: &str,
    target: &str,
    entity: Arc<dyn Entity>,
) -> RecordResult<Arc<dyn Entity>> {
    if entity.is_kind_of(target) {
        Ok(entity)
    } else {
        Err(RecordError::WrongAssociationType {
            attribute: attribute.to_string(),
            expected: target.to_string(),
            found: format!("`{}`", entity.type_name()),
        })
    }
}

fn wrong_type(attribute: &str, target: &str, found: &Value) -> RecordError {
    RecordError::WrongAssociationType {
        attribute: attribute.to_string(),
        expected: target.to_string(),
        found: describe(found),
    }
}
