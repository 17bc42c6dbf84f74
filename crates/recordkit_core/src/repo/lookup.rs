//! Lookup-by-identifier contract.

use crate::model::entity::Entity;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type LookupResult<T> = Result<T, LookupError>;

/// Failure reported by a lookup implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Entity offered for registration has no identifier.
    MissingIdentifier(String),
    /// Backend could not answer; message is implementation-defined.
    Backend(String),
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentifier(type_name) => {
                write!(f, "`{type_name}` entity has no identifier")
            }
            Self::Backend(message) => write!(f, "lookup failed: {message}"),
        }
    }
}

impl Error for LookupError {}

/// Synchronous lookup capability for referenced records.
///
/// `eager_load` carries relation names the implementation may preload; it is
/// a hint and may be ignored.
pub trait RecordLookup {
    fn find_by_id(
        &self,
        type_name: &str,
        id: i64,
        eager_load: &[String],
    ) -> LookupResult<Option<Arc<dyn Entity>>>;

    fn find_by_ids(
        &self,
        type_name: &str,
        ids: &[i64],
        eager_load: &[String],
    ) -> LookupResult<Vec<Arc<dyn Entity>>>;
}
