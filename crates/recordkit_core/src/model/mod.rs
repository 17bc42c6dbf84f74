//! Record instance model.
//!
//! # Responsibility
//! - Define record instances, the untyped values they are assigned from, and
//!   the capability traits associations rely on.
//!
//! # Invariants
//! - Every record exclusively owns its attribute state and owned associations.
//! - Referenced entities are shared read-only handles.

pub mod entity;
pub mod record;
pub mod value;
