//! Attribute-map serialization.
//!
//! # Responsibility
//! - Render a record as the attribute mapping mass-assignment accepts, so
//!   `Record::build(schema, record.to_attributes(), lookup)` reproduces it.
//!
//! # Invariants
//! - Category order: scalars (boolean through enum), reference ids, owned
//!   payloads; declaration order within each category.
//! - Decimals render as plain exact text, dates as RFC 3339 in their zone.

use crate::model::record::{Record, Slot};
use crate::model::value::{map_to_json, AttributeMap, Value};
use crate::schema::attribute::AttributeKind;
use chrono::SecondsFormat;

impl Record {
    /// Current state as an ordered attribute mapping.
    ///
    /// Absent scalars map to `Null`. `<name>_id` is emitted only for a set
    /// reference, `<name>_ids` always. Owned collections render as a map
    /// keyed `"0"`, `"1"`, ... in element order.
    pub fn to_attributes(&self) -> AttributeMap {
        let mut out = AttributeMap::new();
        for kind in AttributeKind::ALL {
            for spec in self.schema.effective_list(kind) {
                let Some(slot) = self.slot(&spec.name) else {
                    continue;
                };
                match slot {
                    Slot::Boolean(flag) => {
                        out.insert(spec.name.clone(), Value::from(*flag));
                    }
                    Slot::Integer(tracked) => {
                        out.insert(spec.name.clone(), Value::from(tracked.converted));
                    }
                    Slot::Decimal(tracked) => {
                        let text = tracked.converted.as_ref().map(|d| d.to_plain_string());
                        out.insert(spec.name.clone(), Value::from(text));
                    }
                    Slot::Date(tracked) => {
                        let text = tracked.converted.as_ref().map(|instant| {
                            instant
                                .fixed_offset()
                                .to_rfc3339_opts(SecondsFormat::AutoSi, false)
                        });
                        out.insert(spec.name.clone(), Value::from(text));
                    }
                    Slot::Text(text) => {
                        out.insert(spec.name.clone(), Value::from(text.clone()));
                    }
                    Slot::Reference { id: Some(id), .. } => {
                        out.insert(format!("{}_id", spec.name), Value::Integer(*id));
                    }
                    Slot::Reference { id: None, .. } => {}
                    Slot::ReferenceCollection(_) => {
                        let ids = self
                            .reference_ids(&spec.name)
                            .into_iter()
                            .map(Value::Integer)
                            .collect();
                        out.insert(format!("{}_ids", spec.name), Value::List(ids));
                    }
                    Slot::Owned(Some(record)) => {
                        out.insert(
                            format!("{}_attributes", spec.name),
                            Value::Map(record.to_attributes()),
                        );
                    }
                    Slot::Owned(None) => {}
                    Slot::OwnedCollection(records) => {
                        let indexed = records
                            .iter()
                            .enumerate()
                            .map(|(index, record)| {
                                (index.to_string(), Value::Map(record.to_attributes()))
                            })
                            .collect();
                        out.insert(format!("{}_attributes", spec.name), Value::Map(indexed));
                    }
                }
            }
        }
        out
    }

    /// Same mapping as [`Record::to_attributes`], rendered as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        map_to_json(&self.to_attributes())
    }
}
