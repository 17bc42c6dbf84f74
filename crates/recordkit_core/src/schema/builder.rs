//! Schema declaration and composition.
//!
//! # Responsibility
//! - Collect declarations for one type and freeze them into a `Schema`.
//! - Compose subtype schemas from a parent schema plus local declarations.
//!
//! # Invariants
//! - Duplicate or colliding names fail at declaration time, never at use.
//! - Malformed options fail at declaration time (zone methods at `build`).

use crate::error::{RecordError, RecordResult};
use crate::schema::attribute::{
    AttributeConfig, AttributeSpec, CurrencyOptions, DateOptions, EnumOptions,
    ReferenceCollectionOptions, ReferenceOptions, SetterForm, StringOptions, TimezoneSource,
};
use crate::schema::{Schema, ZoneResolver};
use chrono_tz::Tz;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;

static ATTRIBUTE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]*$").expect("attribute name pattern must compile")
});

/// Declaration collector for one record type.
pub struct SchemaBuilder {
    name: String,
    parent: Option<Arc<Schema>>,
    local: Vec<AttributeSpec>,
    zone_resolvers: BTreeMap<String, ZoneResolver>,
}

impl SchemaBuilder {
    /// Starts a root type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            local: Vec::new(),
            zone_resolvers: BTreeMap::new(),
        }
    }

    /// Starts a subtype inheriting every declaration of `parent`.
    pub fn extend(name: impl Into<String>, parent: &Arc<Schema>) -> Self {
        Self {
            parent: Some(Arc::clone(parent)),
            ..Self::new(name)
        }
    }

    /// Registers one attribute.
    ///
    /// # Errors
    /// - `DuplicateDeclaration` when the name, or a setter name it installs, is
    ///   already taken on this type or an ancestor.
    /// - `MalformedDeclaration` when the name or options are unusable.
    pub fn declare(&mut self, name: &str, config: AttributeConfig) -> RecordResult<&mut Self> {
        if !ATTRIBUTE_NAME.is_match(name) {
            return Err(self.malformed(name, "name must be a lowercase identifier"));
        }
        let config = self.normalize(name, config)?;
        let spec = AttributeSpec {
            name: name.to_string(),
            config,
        };

        let mut keys = vec![spec.name.clone()];
        keys.extend(spec.auxiliary_setters().into_iter().map(|(key, _)| key));
        if keys.iter().any(|key| self.setter_taken(key)) {
            return Err(RecordError::DuplicateDeclaration {
                type_name: self.name.clone(),
                kind: spec.kind(),
                name: spec.name,
            });
        }

        debug!(
            "event=attribute_declare module=schema status=ok type={} attribute={} kind={}",
            self.name,
            spec.name,
            spec.kind()
        );
        self.local.push(spec);
        Ok(self)
    }

    pub fn boolean(&mut self, name: &str) -> RecordResult<&mut Self> {
        self.declare(name, AttributeConfig::Boolean)
    }

    pub fn integer(&mut self, name: &str) -> RecordResult<&mut Self> {
        self.declare(name, AttributeConfig::Integer)
    }

    pub fn decimal(&mut self, name: &str) -> RecordResult<&mut Self> {
        self.declare(name, AttributeConfig::Decimal)
    }

    pub fn currency(&mut self, name: &str, options: CurrencyOptions) -> RecordResult<&mut Self> {
        self.declare(name, AttributeConfig::Currency(options))
    }

    pub fn date(&mut self, name: &str, options: DateOptions) -> RecordResult<&mut Self> {
        self.declare(name, AttributeConfig::Date(options))
    }

    /// Declares a date attribute pinned to a named zone (e.g. `America/Chicago`).
    pub fn date_in_zone(&mut self, name: &str, zone: &str) -> RecordResult<&mut Self> {
        let tz = zone
            .trim()
            .parse::<Tz>()
            .map_err(|_| self.malformed(name, &format!("unknown timezone `{zone}`")))?;
        self.date(
            name,
            DateOptions {
                timezone: TimezoneSource::Fixed(tz),
            },
        )
    }

    pub fn string(&mut self, name: &str, options: StringOptions) -> RecordResult<&mut Self> {
        self.declare(name, AttributeConfig::String(options))
    }

    pub fn enumeration(&mut self, name: &str, options: EnumOptions) -> RecordResult<&mut Self> {
        self.declare(name, AttributeConfig::Enum(options))
    }

    pub fn owned(&mut self, name: &str, target: &Arc<Schema>) -> RecordResult<&mut Self> {
        self.declare(name, AttributeConfig::Owned(Arc::clone(target)))
    }

    pub fn owned_collection(
        &mut self,
        name: &str,
        target: &Arc<Schema>,
    ) -> RecordResult<&mut Self> {
        self.declare(name, AttributeConfig::OwnedCollection(Arc::clone(target)))
    }

    pub fn reference(&mut self, name: &str, options: ReferenceOptions) -> RecordResult<&mut Self> {
        self.declare(name, AttributeConfig::Reference(options))
    }

    pub fn reference_collection(
        &mut self,
        name: &str,
        options: ReferenceCollectionOptions,
    ) -> RecordResult<&mut Self> {
        self.declare(name, AttributeConfig::ReferenceCollection(options))
    }

    /// Registers a zone resolver that `TimezoneSource::Method(method)` refers to.
    pub fn zone_resolver(&mut self, method: &str, resolver: ZoneResolver) -> &mut Self {
        self.zone_resolvers.insert(method.to_string(), resolver);
        self
    }

    /// Freezes the declarations into an immutable schema.
    ///
    /// # Errors
    /// - `MalformedDeclaration` when a date attribute names an unregistered
    ///   zone resolver.
    pub fn build(self) -> RecordResult<Arc<Schema>> {
        let mut zone_resolvers = self
            .parent
            .as_ref()
            .map(|parent| parent.zone_resolvers.clone())
            .unwrap_or_default();
        zone_resolvers.extend(self.zone_resolvers);

        for spec in &self.local {
            if let AttributeConfig::Date(DateOptions {
                timezone: TimezoneSource::Method(method),
            }) = &spec.config
            {
                if !zone_resolvers.contains_key(method) {
                    return Err(RecordError::MalformedDeclaration {
                        type_name: self.name.clone(),
                        name: spec.name.clone(),
                        reason: format!("no zone resolver registered as `{method}`"),
                    });
                }
            }
        }

        let mut attributes = self
            .parent
            .as_ref()
            .map(|parent| parent.attributes.clone())
            .unwrap_or_default();
        let local_start = attributes.len();
        attributes.extend(self.local);

        let mut positions = BTreeMap::new();
        let mut setters = BTreeMap::new();
        for (position, spec) in attributes.iter().enumerate() {
            positions.insert(spec.name.clone(), position);
            setters.insert(spec.name.clone(), (position, SetterForm::Value));
            for (key, form) in spec.auxiliary_setters() {
                setters.insert(key, (position, form));
            }
        }

        debug!(
            "event=schema_build module=schema status=ok type={} attributes={} inherited={}",
            self.name,
            attributes.len(),
            local_start
        );

        Ok(Arc::new(Schema {
            name: self.name,
            parent: self.parent,
            attributes,
            local_start,
            positions,
            setters,
            zone_resolvers,
        }))
    }

    fn setter_taken(&self, key: &str) -> bool {
        let inherited = self
            .parent
            .as_ref()
            .is_some_and(|parent| parent.setter(key).is_some());
        inherited
            || self.local.iter().any(|spec| {
                spec.name == key
                    || spec
                        .auxiliary_setters()
                        .iter()
                        .any(|(auxiliary, _)| auxiliary == key)
            })
    }

    fn normalize(&self, name: &str, config: AttributeConfig) -> RecordResult<AttributeConfig> {
        match config {
            AttributeConfig::Enum(options) => {
                if options.values.iter().any(|value| value.trim().is_empty()) {
                    return Err(self.malformed(name, "enum values must not be blank"));
                }
                Ok(AttributeConfig::Enum(options))
            }
            AttributeConfig::Currency(options) => {
                let symbol = options.symbol;
                if symbol.is_ascii_digit()
                    || symbol.is_whitespace()
                    || matches!(symbol, '+' | '-' | ',' | '.')
                {
                    return Err(self.malformed(name, &format!("invalid currency symbol `{symbol}`")));
                }
                Ok(AttributeConfig::Currency(options))
            }
            AttributeConfig::Reference(mut options) => {
                options.target = self.target_type(name, &options.target, false)?;
                Ok(AttributeConfig::Reference(options))
            }
            AttributeConfig::ReferenceCollection(mut options) => {
                options.target = self.target_type(name, &options.target, true)?;
                Ok(AttributeConfig::ReferenceCollection(options))
            }
            other => Ok(other),
        }
    }

    fn target_type(&self, name: &str, declared: &str, collection: bool) -> RecordResult<String> {
        let declared = declared.trim();
        if !declared.is_empty() {
            return Ok(declared.to_string());
        }
        let derived = default_type_name(name, collection);
        if derived.is_empty() {
            return Err(self.malformed(name, "cannot derive a target type name"));
        }
        Ok(derived)
    }

    fn malformed(&self, name: &str, reason: &str) -> RecordError {
        RecordError::MalformedDeclaration {
            type_name: self.name.clone(),
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Camel-cases an attribute name, singularizing it for collections.
///
/// `billing_contact` -> `BillingContact`, `categories` -> `Category`.
pub fn default_type_name(name: &str, collection: bool) -> String {
    let base = if collection {
        singularize(name)
    } else {
        name.to_string()
    };
    base.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{stem}y")
    } else if word.ends_with("ss") {
        word.to_string()
    } else if let Some(stem) = word.strip_suffix('s') {
        stem.to_string()
    } else {
        word.to_string()
    }
}
