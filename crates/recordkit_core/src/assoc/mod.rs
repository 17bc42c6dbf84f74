//! Association bindings.
//!
//! # Responsibility
//! - Type-check instance assignment for owned and referenced associations.
//! - Build owned records from nested payloads and resolve references by id.
//!
//! # Invariants
//! - Owned associations accept only records whose schema is (or extends) the
//!   declared target.
//! - Identifier assignment resolves eagerly; a single unknown id fails fast.
//! - A single reference's companion id always mirrors its target.

pub mod owned;
pub mod reference;

use crate::error::{RecordError, RecordResult};
use crate::model::entity::Entity;
use crate::model::record::{Record, Slot};
use crate::model::value::Value;
use crate::repo::lookup::RecordLookup;
use crate::schema::attribute::{AttributeConfig, AttributeKind};
use std::sync::Arc;

impl Record {
    /// Assigns an owned record (or clears it with `None`).
    pub fn set_owned(&mut self, name: &str, record: Option<Record>) -> RecordResult<()> {
        let position = self.locate(name, AttributeKind::OwnedSingle)?;
        self.assign_association(position, Value::from(record))
    }

    pub fn set_owned_collection(&mut self, name: &str, records: Vec<Record>) -> RecordResult<()> {
        let position = self.locate(name, AttributeKind::OwnedCollection)?;
        self.assign_association(
            position,
            Value::List(records.into_iter().map(Value::Record).collect()),
        )
    }

    /// Points a single reference at `entity`, updating its companion id.
    pub fn set_reference(
        &mut self,
        name: &str,
        entity: Option<Arc<dyn Entity>>,
    ) -> RecordResult<()> {
        let position = self.locate(name, AttributeKind::RefSingle)?;
        self.assign_association(position, Value::from(entity))
    }

    pub fn set_references(
        &mut self,
        name: &str,
        entities: Vec<Arc<dyn Entity>>,
    ) -> RecordResult<()> {
        let position = self.locate(name, AttributeKind::RefCollection)?;
        self.assign_association(
            position,
            Value::List(entities.into_iter().map(Value::Entity).collect()),
        )
    }

    /// Resolves a single reference through `lookup`; `None` clears it.
    pub fn set_reference_id(
        &mut self,
        name: &str,
        id: Option<i64>,
        lookup: &dyn RecordLookup,
    ) -> RecordResult<()> {
        let position = self.locate(name, AttributeKind::RefSingle)?;
        self.assign_identifier(position, Value::from(id), lookup)
    }

    pub fn set_reference_ids(
        &mut self,
        name: &str,
        ids: &[i64],
        lookup: &dyn RecordLookup,
    ) -> RecordResult<()> {
        let position = self.locate(name, AttributeKind::RefCollection)?;
        let ids = ids.iter().copied().map(Value::Integer).collect();
        self.assign_identifiers(position, Value::List(ids), lookup)
    }

    pub(crate) fn assign_association(&mut self, position: usize, value: Value) -> RecordResult<()> {
        let schema = Arc::clone(&self.schema);
        let spec = &schema.attributes()[position];
        let name = spec.name.as_str();
        self.slots[position] = match &spec.config {
            AttributeConfig::Owned(target) => {
                Slot::Owned(owned::single(name, target, value)?.map(Box::new))
            }
            AttributeConfig::OwnedCollection(target) => {
                Slot::OwnedCollection(owned::collection(name, target, value)?)
            }
            AttributeConfig::Reference(options) => {
                reference_slot(reference::single(name, &options.target, value)?)
            }
            AttributeConfig::ReferenceCollection(options) => {
                Slot::ReferenceCollection(reference::collection(name, &options.target, value)?)
            }
            _ => return Err(self.no_setter(name)),
        };
        Ok(())
    }

    pub(crate) fn assign_nested(
        &mut self,
        position: usize,
        payload: Value,
        lookup: &dyn RecordLookup,
    ) -> RecordResult<()> {
        let schema = Arc::clone(&self.schema);
        let spec = &schema.attributes()[position];
        let name = spec.name.as_str();
        self.slots[position] = match &spec.config {
            AttributeConfig::Owned(target) => {
                Slot::Owned(owned::nested_single(name, target, payload, lookup)?.map(Box::new))
            }
            AttributeConfig::OwnedCollection(target) => {
                Slot::OwnedCollection(owned::nested_collection(name, target, payload, lookup)?)
            }
            _ => return Err(self.no_setter(&format!("{name}_attributes"))),
        };
        Ok(())
    }

    pub(crate) fn assign_identifier(
        &mut self,
        position: usize,
        value: Value,
        lookup: &dyn RecordLookup,
    ) -> RecordResult<()> {
        let schema = Arc::clone(&self.schema);
        let spec = &schema.attributes()[position];
        let AttributeConfig::Reference(options) = &spec.config else {
            return Err(self.no_setter(&format!("{}_id", spec.name)));
        };
        let target = reference::resolve(&spec.name, options, value, lookup)?;
        self.slots[position] = reference_slot(target);
        Ok(())
    }

    pub(crate) fn assign_identifiers(
        &mut self,
        position: usize,
        value: Value,
        lookup: &dyn RecordLookup,
    ) -> RecordResult<()> {
        let schema = Arc::clone(&self.schema);
        let spec = &schema.attributes()[position];
        let AttributeConfig::ReferenceCollection(options) = &spec.config else {
            return Err(self.no_setter(&format!("{}_ids", spec.name)));
        };
        let entities = reference::resolve_many(&spec.name, options, value, lookup)?;
        self.slots[position] = Slot::ReferenceCollection(entities);
        Ok(())
    }

    fn no_setter(&self, key: &str) -> RecordError {
        RecordError::UnknownAttribute {
            type_name: self.schema.name().to_string(),
            key: key.to_string(),
        }
    }
}

fn reference_slot(target: Option<Arc<dyn Entity>>) -> Slot {
    Slot::Reference {
        id: target.as_ref().and_then(|entity| entity.id()),
        target,
    }
}

/// Type description of an assigned value for error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Record(record) => format!("`{}`", record.type_name()),
        Value::Entity(entity) => format!("`{}`", entity.type_name()),
        other => other.type_label().to_string(),
    }
}
