//! Per-type schema registry.
//!
//! # Responsibility
//! - Hold the immutable, inheritance-aware attribute catalog of one record type.
//! - Own the setter dispatch table used by mass-assignment.
//!
//! # Invariants
//! - A schema never changes after `SchemaBuilder::build`.
//! - Effective attribute order is ancestor-first, then declaration order.
//! - Every setter key maps to exactly one attribute.
//!
//! # See also
//! - `schema::builder` for declaration rules.

pub mod attribute;
pub mod builder;

use crate::model::record::Record;
use attribute::{AttributeKind, AttributeSpec, SetterForm};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Per-instance zone resolver registered under a method name.
pub type ZoneResolver = fn(&Record) -> Option<Tz>;

/// Immutable attribute catalog for one record type.
pub struct Schema {
    name: String,
    parent: Option<Arc<Schema>>,
    attributes: Vec<AttributeSpec>,
    local_start: usize,
    positions: BTreeMap<String, usize>,
    setters: BTreeMap<String, (usize, SetterForm)>,
    zone_resolvers: BTreeMap<String, ZoneResolver>,
}

impl Schema {
    /// Type (model) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<Schema>> {
        self.parent.as_ref()
    }

    /// Returns whether this type is `type_name` or descends from it.
    pub fn is_kind_of(&self, type_name: &str) -> bool {
        self.name == type_name
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.is_kind_of(type_name))
    }

    /// Effective attributes across every kind, ancestor-first.
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    /// Attributes declared on this type itself.
    pub fn local_attributes(&self) -> &[AttributeSpec] {
        &self.attributes[self.local_start..]
    }

    /// Effective attributes of one kind: ancestor declarations, then local ones.
    pub fn effective_list(&self, kind: AttributeKind) -> Vec<&AttributeSpec> {
        self.attributes
            .iter()
            .filter(|spec| spec.kind() == kind)
            .collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.position(name).map(|position| &self.attributes[position])
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Resolves a mass-assignment key to its attribute position and setter form.
    pub fn setter(&self, key: &str) -> Option<(usize, SetterForm)> {
        self.setters.get(key).copied()
    }

    /// Declared value set of an enum attribute.
    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        match &self.attribute(name)?.config {
            attribute::AttributeConfig::Enum(options) => Some(options.values.as_slice()),
            _ => None,
        }
    }

    pub(crate) fn zone_resolver(&self, method: &str) -> Option<ZoneResolver> {
        self.zone_resolvers.get(method).copied()
    }
}

impl Debug for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|parent| parent.name()))
            .field("attributes", &self.attributes)
            .field("zone_resolvers", &self.zone_resolvers.keys().collect::<Vec<_>>())
            .finish()
    }
}
