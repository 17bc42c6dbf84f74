//! Capability traits for associated instances.
//!
//! Association bindings never inspect concrete types: owned targets are
//! checked through `Validatable`, referenced targets through `Entity`.

use crate::validation::ValidationErrors;
use std::any::Any;
use std::fmt::Debug;

/// Exposes a stable identifier.
pub trait Identifiable {
    /// Returns `None` for instances without a persistent identity.
    fn id(&self) -> Option<i64>;
}

/// Exposes a validity check and its error collection.
pub trait Validatable {
    fn validate(&self) -> ValidationErrors;

    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Externally-owned instance resolvable by identifier.
///
/// Records hold these behind `Arc` and never mutate them.
pub trait Entity: Identifiable + Debug + Send + Sync {
    /// Type name matched against reference declarations.
    fn type_name(&self) -> &str;

    /// Returns whether this entity satisfies a declared target type.
    fn is_kind_of(&self, type_name: &str) -> bool {
        self.type_name() == type_name
    }

    /// Host-side downcasting hook.
    fn as_any(&self) -> &dyn Any;
}
