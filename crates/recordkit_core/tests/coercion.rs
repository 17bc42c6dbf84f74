use bigdecimal::BigDecimal;
use chrono::{FixedOffset, TimeZone, Utc};
use chrono_tz::Tz;
use recordkit_core::{
    CurrencyOptions, DateOptions, EnumOptions, ErrorReason, InMemoryLookup, Record, RecordError,
    Schema, SchemaBuilder, StringOptions, TimezoneSource, Value,
};
use std::str::FromStr;
use std::sync::Arc;

fn record_zone(record: &Record) -> Option<Tz> {
    record.string("time_zone")?.parse().ok()
}

fn profile_schema() -> Arc<Schema> {
    let mut builder = SchemaBuilder::new("Profile");
    builder.boolean("active").unwrap();
    builder.integer("age").unwrap();
    builder.decimal("weight").unwrap();
    builder.currency("salary", CurrencyOptions::default()).unwrap();
    builder.date("born_at", DateOptions::default()).unwrap();
    builder.date_in_zone("local_at", "America/Chicago").unwrap();
    builder
        .date(
            "meets_at",
            DateOptions {
                timezone: TimezoneSource::Method("record_zone".to_string()),
            },
        )
        .unwrap();
    builder
        .string("nickname", StringOptions { strip: true })
        .unwrap();
    builder
        .string("time_zone", StringOptions::default())
        .unwrap();
    builder
        .enumeration("status", EnumOptions::new(["active", "retired"]))
        .unwrap();
    builder.zone_resolver("record_zone", record_zone);
    builder.build().unwrap()
}

fn dec(text: &str) -> BigDecimal {
    BigDecimal::from_str(text).unwrap()
}

#[test]
fn integer_keeps_unconverted_input_and_flags_it() {
    let lookup = InMemoryLookup::new();
    let mut record = Record::new(&profile_schema());

    record.set("age", "abc", &lookup).unwrap();
    assert_eq!(record.integer("age"), None);
    assert_eq!(
        record.unconverted_value("age").and_then(Value::as_str),
        Some("abc")
    );
    assert_eq!(record.validate().on("age"), vec![ErrorReason::NotAnInteger]);

    record.set("age", "  42 ", &lookup).unwrap();
    assert_eq!(record.integer("age"), Some(42));
    assert!(record.validate().on("age").is_empty());

    record.set("age", Value::Null, &lookup).unwrap();
    assert_eq!(record.integer("age"), None);
    assert!(record.validate().on("age").is_empty());

    record.set("age", "", &lookup).unwrap();
    assert_eq!(record.integer("age"), None);
    assert!(record.is_valid());
}

#[test]
fn integer_rejects_fractional_numbers() {
    let lookup = InMemoryLookup::new();
    let mut record = Record::new(&profile_schema());
    record.set("age", 4.5, &lookup).unwrap();
    assert_eq!(record.integer("age"), None);
    assert_eq!(record.validate().on("age"), vec![ErrorReason::NotAnInteger]);

    record.set("age", "99999999999999999999", &lookup).unwrap();
    assert_eq!(record.integer("age"), None);
    assert_eq!(record.validate().on("age"), vec![ErrorReason::NotAnInteger]);
}

#[test]
fn decimal_and_currency_parse_grouped_text() {
    let lookup = InMemoryLookup::new();
    let mut record = Record::new(&profile_schema());

    record.set("weight", "1,234.50", &lookup).unwrap();
    record.set("salary", "-$2,000", &lookup).unwrap();
    assert_eq!(record.decimal("weight"), Some(&dec("1234.50")));
    assert_eq!(record.decimal("salary"), Some(&dec("-2000")));

    record.set("weight", "12kg", &lookup).unwrap();
    record.set("salary", "lots", &lookup).unwrap();
    let errors = record.validate();
    assert_eq!(errors.on("weight"), vec![ErrorReason::NotANumber]);
    assert_eq!(errors.on("salary"), vec![ErrorReason::Invalid]);
    assert_eq!(
        record.unconverted_value("salary").and_then(Value::as_str),
        Some("lots")
    );
}

#[test]
fn currency_symbol_is_configurable() {
    let mut builder = SchemaBuilder::new("Price");
    builder
        .currency("amount", CurrencyOptions { symbol: '€' })
        .unwrap();
    let schema = builder.build().unwrap();
    let lookup = InMemoryLookup::new();

    let mut record = Record::new(&schema);
    record.set("amount", "€ 9.99", &lookup).unwrap();
    assert_eq!(record.decimal("amount"), Some(&dec("9.99")));

    record.set("amount", "$9.99", &lookup).unwrap();
    assert_eq!(record.decimal("amount"), None);
    assert_eq!(record.validate().on("amount"), vec![ErrorReason::Invalid]);
}

#[test]
fn booleans_follow_token_rules() {
    let lookup = InMemoryLookup::new();
    let mut record = Record::new(&profile_schema());
    for (input, expected) in [
        (Value::from("1"), Some(true)),
        (Value::from("t"), Some(true)),
        (Value::from("true"), Some(true)),
        (Value::Integer(1), Some(true)),
        (Value::from("0"), Some(false)),
        (Value::from("no"), Some(false)),
        (Value::Bool(false), Some(false)),
        (Value::from(""), None),
        (Value::Null, None),
    ] {
        record.set("active", input, &lookup).unwrap();
        assert_eq!(record.boolean("active"), expected);
    }
}

#[test]
fn dates_default_to_utc() {
    let lookup = InMemoryLookup::new();
    let mut record = Record::new(&profile_schema());

    record.set("born_at", "2001-02-03 04:05:06", &lookup).unwrap();
    assert_eq!(
        record.date("born_at").copied(),
        Some(Tz::UTC.with_ymd_and_hms(2001, 2, 3, 4, 5, 6).unwrap())
    );

    record.set("born_at", "yesterday-ish", &lookup).unwrap();
    assert_eq!(record.date("born_at"), None);
    assert_eq!(record.validate().on("born_at"), vec![ErrorReason::Invalid]);
}

#[test]
fn fixed_zone_dates_attach_wall_clock_and_keep_instants() {
    let lookup = InMemoryLookup::new();
    let mut record = Record::new(&profile_schema());

    record.set("local_at", "2024-03-01 09:30", &lookup).unwrap();
    assert_eq!(
        record.to_attributes()["local_at"].as_str(),
        Some("2024-03-01T09:30:00-06:00")
    );

    let instant = FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 7, 1, 12, 0, 0)
        .unwrap();
    record.set("local_at", instant, &lookup).unwrap();
    let stored = record.date("local_at").copied().unwrap();
    assert_eq!(stored, Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap());
    assert_eq!(
        record.to_attributes()["local_at"].as_str(),
        Some("2024-07-01T05:00:00-05:00")
    );
}

#[test]
fn method_zone_dates_resolve_per_instance() {
    let lookup = InMemoryLookup::new();
    let mut record = Record::new(&profile_schema());

    record.set("meets_at", "2024-01-01 10:00", &lookup).unwrap();
    assert_eq!(
        record.to_attributes()["meets_at"].as_str(),
        Some("2024-01-01T10:00:00+00:00")
    );

    record.set("time_zone", "Asia/Tokyo", &lookup).unwrap();
    record.set("meets_at", "2024-01-01 10:00", &lookup).unwrap();
    assert_eq!(
        record.to_attributes()["meets_at"].as_str(),
        Some("2024-01-01T10:00:00+09:00")
    );
}

#[test]
fn dates_reject_non_temporal_types() {
    let lookup = InMemoryLookup::new();
    let mut record = Record::new(&profile_schema());
    let err = record.set("born_at", 20240101, &lookup).unwrap_err();
    assert!(matches!(
        err,
        RecordError::UnexpectedValue {
            ref attribute,
            found: "integer",
            ..
        } if attribute == "born_at"
    ));
}

#[test]
fn strings_strip_and_blank_to_nil() {
    let lookup = InMemoryLookup::new();
    let mut record = Record::new(&profile_schema());

    record.set("nickname", "  Bo  ", &lookup).unwrap();
    assert_eq!(record.string("nickname"), Some("Bo"));
    record.set("nickname", "   ", &lookup).unwrap();
    assert_eq!(record.string("nickname"), None);
    record.set("time_zone", " UTC ", &lookup).unwrap();
    assert_eq!(record.string("time_zone"), Some(" UTC "));

    record
        .set("nickname", Value::List(vec![Value::from("x")]), &lookup)
        .unwrap();
    assert_eq!(record.string("nickname"), Some(r#"["x"]"#));
}

#[test]
fn structured_values_become_text_for_strings_and_enums() {
    let lookup = InMemoryLookup::new();
    let mut record = Record::new(&profile_schema());

    record
        .set("time_zone", Value::from_json(serde_json::json!(["a", "b"])), &lookup)
        .unwrap();
    assert_eq!(record.string("time_zone"), Some(r#"["a","b"]"#));

    let structured = Value::from_json(serde_json::json!({"x": "a"}));
    record.set("status", structured, &lookup).unwrap();
    assert_eq!(record.string("status"), Some(r#"{"x":"a"}"#));
    assert_eq!(record.validate().on("status"), vec![ErrorReason::Inclusion]);
}

#[test]
fn enums_normalize_blank_and_check_membership_at_validation() {
    let lookup = InMemoryLookup::new();
    let mut record = Record::new(&profile_schema());

    record.set("status", "", &lookup).unwrap();
    assert_eq!(record.string("status"), None);
    assert!(record.is_valid());

    record.set("status", "missing", &lookup).unwrap();
    assert_eq!(record.string("status"), Some("missing"));
    assert_eq!(record.validate().on("status"), vec![ErrorReason::Inclusion]);
}

#[test]
fn fail_on_set_enums_reject_immediately() {
    let mut builder = SchemaBuilder::new("Ticket");
    builder
        .enumeration(
            "status",
            EnumOptions {
                fail_on_set: true,
                ..EnumOptions::new(["open", "closed"])
            },
        )
        .unwrap();
    let schema = builder.build().unwrap();
    let lookup = InMemoryLookup::new();

    let mut record = Record::new(&schema);
    record.set("status", "open", &lookup).unwrap();
    let err = record.set("status", "archived", &lookup).unwrap_err();
    assert_eq!(
        err,
        RecordError::InvalidEnumValue {
            attribute: "status".to_string(),
            value: "archived".to_string(),
        }
    );
    assert_eq!(record.string("status"), Some("open"));

    let err = record
        .set("status", Value::List(vec![Value::from("open")]), &lookup)
        .unwrap_err();
    assert_eq!(
        err,
        RecordError::InvalidEnumValue {
            attribute: "status".to_string(),
            value: r#"["open"]"#.to_string(),
        }
    );
    assert_eq!(record.string("status"), Some("open"));
}
