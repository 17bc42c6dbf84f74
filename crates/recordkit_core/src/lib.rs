//! Declarative typed records for form and request payloads.
//!
//! A record type is described once as an immutable [`Schema`]; instances
//! coerce loosely-typed input into typed attributes, bind owned and referenced
//! associations, accept whole attribute mappings with deterministic
//! precedence, report validation errors and serialize back to the same shape.

pub mod assign;
pub mod assoc;
pub mod coerce;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schema;
pub mod serialize;
pub mod validation;

pub use assoc::reference::parse_identifier;
pub use error::{RecordError, RecordResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entity::{Entity, Identifiable, Validatable};
pub use model::record::Record;
pub use model::value::{AttributeMap, Value};
pub use repo::lookup::{LookupError, LookupResult, RecordLookup};
pub use repo::memory::InMemoryLookup;
pub use schema::attribute::{
    AttributeConfig, AttributeKind, AttributeSpec, CurrencyOptions, DateOptions, EnumOptions,
    NotFoundPolicy, ReferenceCollectionOptions, ReferenceOptions, SetterForm, StringOptions,
    TimezoneSource,
};
pub use schema::builder::SchemaBuilder;
pub use schema::{Schema, ZoneResolver};
pub use validation::{ErrorReason, FieldError, ValidationErrors};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
