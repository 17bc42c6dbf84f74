//! Mass-assignment pipeline.
//!
//! # Responsibility
//! - Apply one attribute mapping to a record with deterministic precedence
//!   between bare association keys and their derived forms.
//!
//! # Invariants
//! - Owned associations apply before references, references before scalars.
//! - A bare association key always wins over its `_id`/`_ids` form.
//! - The first failing assignment aborts; earlier assignments stay applied.
//! - Collections are never absent on a record, so the pipeline never has to
//!   normalize a missing collection before applying keys.
//!
//! # See also
//! - `assoc` for the per-association setters this pipeline calls.

use crate::error::RecordResult;
use crate::model::record::Record;
use crate::model::value::AttributeMap;
use crate::repo::lookup::RecordLookup;
use crate::schema::attribute::AttributeKind;
use crate::schema::Schema;
use log::debug;
use std::sync::Arc;

impl Record {
    /// Creates an instance of `schema` and mass-assigns `attributes` to it.
    pub fn build(
        schema: &Arc<Schema>,
        attributes: AttributeMap,
        lookup: &dyn RecordLookup,
    ) -> RecordResult<Self> {
        let mut record = Self::new(schema);
        record.assign_attributes(attributes, lookup)?;
        Ok(record)
    }

    /// Applies every entry of `attributes`.
    ///
    /// Order: owned singles, owned collections (bare key then
    /// `<name>_attributes`), single references (bare key, else `<name>_id`),
    /// referenced collections (bare key, else `<name>_ids`), then every
    /// remaining key through [`Record::set`].
    ///
    /// # Errors
    /// - `UnknownAttribute` for a remaining key with no setter.
    /// - Any error raised by an individual setter.
    pub fn assign_attributes(
        &mut self,
        mut attributes: AttributeMap,
        lookup: &dyn RecordLookup,
    ) -> RecordResult<()> {
        let schema = Arc::clone(&self.schema);
        debug!(
            "event=assign_attributes module=assign status=start type={} keys={}",
            schema.name(),
            attributes.len()
        );

        if !attributes.is_empty() {
            for kind in [AttributeKind::OwnedSingle, AttributeKind::OwnedCollection] {
                for spec in schema.effective_list(kind) {
                    if let Some(value) = attributes.shift_remove(&spec.name) {
                        self.set(&spec.name, value, lookup)?;
                    }
                    let nested = format!("{}_attributes", spec.name);
                    if let Some(payload) = attributes.shift_remove(&nested) {
                        self.set(&nested, payload, lookup)?;
                    }
                }
            }
        }

        for (kind, suffix) in [
            (AttributeKind::RefSingle, "_id"),
            (AttributeKind::RefCollection, "_ids"),
        ] {
            for spec in schema.effective_list(kind) {
                let derived = format!("{}{}", spec.name, suffix);
                let bare = attributes.shift_remove(&spec.name);
                let identifiers = attributes.shift_remove(&derived);
                match (bare, identifiers) {
                    (Some(value), discarded) => {
                        if discarded.is_some() {
                            debug!(
                                "event=assign_attributes module=assign status=ok type={} attribute={} discarded={}",
                                schema.name(),
                                spec.name,
                                derived
                            );
                        }
                        self.set(&spec.name, value, lookup)?;
                    }
                    (None, Some(value)) => self.set(&derived, value, lookup)?,
                    (None, None) => {}
                }
            }
        }

        for (key, value) in attributes {
            self.set(&key, value, lookup)?;
        }

        debug!(
            "event=assign_attributes module=assign status=ok type={}",
            schema.name()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RecordError;
    use crate::model::record::Record;
    use crate::model::value::{AttributeMap, Value};
    use crate::repo::memory::InMemoryLookup;
    use crate::schema::builder::SchemaBuilder;

    #[test]
    fn unknown_keys_abort_after_earlier_assignments() {
        let mut builder = SchemaBuilder::new("Widget");
        builder.integer("count").expect("declare count");
        let schema = builder.build().expect("schema builds");

        let mut attributes = AttributeMap::new();
        attributes.insert("count".to_string(), Value::from("3"));
        attributes.insert("colour".to_string(), Value::from("red"));

        let mut record = Record::new(&schema);
        let err = record
            .assign_attributes(attributes, &InMemoryLookup::new())
            .expect_err("colour has no setter");
        assert_eq!(
            err,
            RecordError::UnknownAttribute {
                type_name: "Widget".to_string(),
                key: "colour".to_string(),
            }
        );
        assert_eq!(record.integer("count"), Some(3));
    }

    #[test]
    fn empty_mapping_leaves_collections_empty() {
        let mut line = SchemaBuilder::new("Line");
        line.string("sku", Default::default()).expect("declare sku");
        let line = line.build().expect("line builds");
        let mut order = SchemaBuilder::new("Order");
        order.owned_collection("lines", &line).expect("declare lines");
        let order = order.build().expect("order builds");

        let record =
            Record::build(&order, AttributeMap::new(), &InMemoryLookup::new()).expect("builds");
        assert!(record.owned_collection("lines").is_empty());
    }
}
