//! simplendb datastore layer
//!
//! The raw side of simplendb: what a document-store client takes and returns.
//! - `Key`: project, namespace and an ancestor path of kind/id elements
//! - `Value`: a single stored property value
//! - `Entity`: a keyed record of values plus index exclusions
//! - `QuerySpec`: kind, filters, orders and paging passed through to a store
//! - `Datastore`: the client interface the mapping layer drives
//!
//! `MemoryDatastore` implements the interface in process memory.
//!
//! # Example
//!
//! ```rust
//! use simplendb_datastore::{Datastore, Entity, Error, Key};
//!
//! fn copy_entity(from: &dyn Datastore, to: &dyn Datastore, key: &Key) -> Result<Option<Key>, Error> {
//!     match from.get(key)? {
//!         Some(entity) => to.put(&entity).map(Some),
//!         None => Ok(None),
//!     }
//! }
//! ```

mod config;
mod entity;
mod error;
mod in_memory;
mod key;
mod query;
mod traits;
mod value;

pub use config::{DatastoreConfig, NAMESPACE_ENV_VAR, PROJECT_ENV_VARS};
pub use entity::Entity;
pub use error::Error;
pub use in_memory::MemoryDatastore;
pub use key::{IdOrName, Key, PathElement};
pub use query::{Direction, Filter, Operator, Order, QuerySpec};
pub use traits::Datastore;
pub use value::{GeoPoint, Value, ValueType};

// Re-export the timestamp type so callers need not depend on chrono directly.
pub use chrono::{DateTime, Utc};
