use recordkit_core::{
    AttributeMap, CurrencyOptions, DateOptions, EnumOptions, ErrorReason, InMemoryLookup, Record,
    ReferenceCollectionOptions, ReferenceOptions, Schema, SchemaBuilder, StringOptions,
    Validatable, Value,
};
use bigdecimal::BigDecimal;
use chrono::{FixedOffset, TimeZone};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

fn attrs(value: serde_json::Value) -> AttributeMap {
    Value::from_json(value).into_map().unwrap()
}

fn line_schema() -> Arc<Schema> {
    let mut builder = SchemaBuilder::new("Line");
    builder.integer("quantity").unwrap();
    builder.build().unwrap()
}

fn invoice_schema(line: &Arc<Schema>) -> Arc<Schema> {
    let mut builder = SchemaBuilder::new("Invoice");
    builder.owned_collection("lines", line).unwrap();
    builder.owned("summary", line).unwrap();
    builder
        .reference_collection("tags", ReferenceCollectionOptions::default())
        .unwrap();
    builder
        .reference("owner", ReferenceOptions::to("User"))
        .unwrap();
    builder
        .enumeration("kind", EnumOptions::new(["sale", "refund"]))
        .unwrap();
    builder
        .enumeration(
            "channel",
            EnumOptions {
                allow_nil: false,
                ..EnumOptions::new(["web", "store"])
            },
        )
        .unwrap();
    builder.string("memo", StringOptions::default()).unwrap();
    builder.date("issued_at", DateOptions::default()).unwrap();
    builder.currency("total", CurrencyOptions::default()).unwrap();
    builder.decimal("rate").unwrap();
    builder.integer("number").unwrap();
    builder.boolean("paid").unwrap();
    builder.build().unwrap()
}

#[test]
fn enum_nil_allowance_is_per_declaration() {
    let line = line_schema();
    let lookup = InMemoryLookup::new();
    let mut invoice = Record::new(&invoice_schema(&line));

    assert_eq!(invoice.validate().on("channel"), vec![ErrorReason::Inclusion]);
    assert!(invoice.validate().on("kind").is_empty());

    invoice.set("channel", "web", &lookup).unwrap();
    invoice.set("kind", "gift", &lookup).unwrap();
    let errors = invoice.validate();
    assert!(errors.on("channel").is_empty());
    assert_eq!(errors.on("kind"), vec![ErrorReason::Inclusion]);
}

#[test]
fn owned_records_compose_into_parent_validity() {
    let line = line_schema();
    let lookup = InMemoryLookup::new();
    let mut invoice = Record::build(
        &invoice_schema(&line),
        attrs(json!({
            "channel": "store",
            "summary_attributes": {"quantity": "3"},
            "lines_attributes": [{"quantity": "1"}, {"quantity": "two"}]
        })),
        &lookup,
    )
    .unwrap();

    let errors = invoice.validate();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.on("lines"), vec![ErrorReason::Invalid]);
    assert!(!invoice.is_valid());

    invoice
        .set("summary_attributes", Value::from_json(json!({"quantity": "x"})), &lookup)
        .unwrap();
    invoice
        .set("lines_attributes", Value::from_json(json!([{"quantity": 2}])), &lookup)
        .unwrap();
    let errors = Validatable::validate(&invoice);
    assert_eq!(errors.on("summary"), vec![ErrorReason::Invalid]);
    assert!(errors.on("lines").is_empty());
}

#[test]
fn referenced_records_never_affect_validity() {
    let line = line_schema();
    let mut invalid_owner = SchemaBuilder::new("User");
    invalid_owner.integer("id").unwrap();
    invalid_owner.integer("age").unwrap();
    let invalid_owner = invalid_owner.build().unwrap();

    let mut lookup = InMemoryLookup::new();
    let empty = InMemoryLookup::new();
    let owner = Record::build(
        &invalid_owner,
        attrs(json!({"id": 1, "age": "old"})),
        &empty,
    )
    .unwrap();
    assert!(!owner.is_valid());
    lookup.insert(Arc::new(owner)).unwrap();

    let mut invoice = Record::new(&invoice_schema(&line));
    invoice.set("channel", "web", &lookup).unwrap();
    invoice.set("owner_id", 1, &lookup).unwrap();
    assert!(invoice.is_valid());
}

#[test]
fn attributes_serialize_in_category_order() {
    let line = line_schema();
    let lookup = InMemoryLookup::new();
    let mut invoice = Record::build(
        &invoice_schema(&line),
        attrs(json!({
            "paid": "1",
            "number": "17",
            "rate": "0.075",
            "total": "$1,250.00",
            "issued_at": "2024-05-06T07:08:09+02:00",
            "memo": "thanks",
            "kind": "sale",
            "channel": "web",
            "lines_attributes": [{"quantity": 4}]
        })),
        &lookup,
    )
    .unwrap();

    let keys: Vec<String> = invoice.to_attributes().keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            "paid",
            "number",
            "rate",
            "total",
            "issued_at",
            "memo",
            "kind",
            "channel",
            "tags_ids",
            "lines_attributes",
        ]
    );

    assert_eq!(
        invoice.to_json(),
        json!({
            "paid": true,
            "number": 17,
            "rate": "0.075",
            "total": "1250.00",
            "issued_at": "2024-05-06T05:08:09+00:00",
            "memo": "thanks",
            "kind": "sale",
            "channel": "web",
            "tags_ids": [],
            "lines_attributes": {"0": {"quantity": 4}}
        })
    );

    invoice
        .set("summary_attributes", Value::from_json(json!({"quantity": 1})), &lookup)
        .unwrap();
    let json = invoice.to_json();
    assert_eq!(json["summary_attributes"], json!({"quantity": 1}));
    assert!(json.get("owner_id").is_none());
}

#[test]
fn absent_scalars_serialize_as_null() {
    let line = line_schema();
    let invoice = Record::new(&invoice_schema(&line));
    let json = invoice.to_json();
    assert_eq!(json["paid"], json!(null));
    assert_eq!(json["total"], json!(null));
    assert_eq!(json["issued_at"], json!(null));
    assert_eq!(json["lines_attributes"], json!({}));
    assert!(json.get("summary_attributes").is_none());
}

#[test]
fn validation_errors_render_for_hosts() {
    let line = line_schema();
    let lookup = InMemoryLookup::new();
    let mut invoice = Record::new(&invoice_schema(&line));
    invoice.set("number", "seventeen", &lookup).unwrap();
    invoice.set("rate", "high", &lookup).unwrap();

    let errors = invoice.validate();
    assert_eq!(
        serde_json::to_value(&errors).unwrap(),
        json!([
            {"attribute": "channel", "reason": "inclusion"},
            {"attribute": "rate", "reason": "not_a_number"},
            {"attribute": "number", "reason": "not_an_integer"}
        ])
    );
}

#[test]
fn signed_amounts_false_flags_and_ambiguous_local_times_survive_a_rebuild() {
    let mut builder = SchemaBuilder::new("Ledger");
    builder.boolean("flag").unwrap();
    builder.decimal("rate").unwrap();
    builder
        .currency("total", CurrencyOptions { symbol: '€' })
        .unwrap();
    builder.date_in_zone("at", "America/New_York").unwrap();
    let schema = builder.build().unwrap();
    let lookup = InMemoryLookup::new();

    let original = Record::build(
        &schema,
        attrs(json!({
            "flag": false,
            "rate": "-1,000.5",
            "total": "-€ 3.",
            "at": "2024-11-03T01:30:00-05:00"
        })),
        &lookup,
    )
    .unwrap();
    let rebuilt = Record::build(&schema, original.to_attributes(), &lookup).unwrap();

    assert_eq!(rebuilt.boolean("flag"), Some(false));
    assert_eq!(rebuilt.boolean("flag"), original.boolean("flag"));
    assert_eq!(
        rebuilt.decimal("rate"),
        Some(&BigDecimal::from_str("-1000.5").unwrap())
    );
    assert_eq!(
        rebuilt.decimal("total"),
        Some(&BigDecimal::from_str("-3").unwrap())
    );
    assert_eq!(rebuilt.decimal("total"), original.decimal("total"));

    let second_half_hour = FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 11, 3, 1, 30, 0)
        .unwrap();
    assert_eq!(*original.date("at").unwrap(), second_half_hour);
    assert_eq!(rebuilt.date("at"), original.date("at"));
    assert_eq!(
        rebuilt.to_attributes()["at"].as_str(),
        Some("2024-11-03T01:30:00-05:00")
    );
    assert!(rebuilt.is_valid());
}
