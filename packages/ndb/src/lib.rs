//! simplendb: NDB-style models over a document-store client
//!
//! This layer gives the raw entities of `simplendb-datastore` a typed face:
//! - `ModelClass` / `Model`: a kind plus a declared `Schema` of typed properties
//! - `PropertyType`: the property registry (`IntegerProperty`, `JsonProperty`, ...)
//! - `Key`: a store key bound to the model class it identifies
//! - `Query`: a store query whose results come back as models
//! - `Client`: the shared store handle everything goes through
//!
//! Reads fail soft: a property whose stored data does not fit its declared
//! type reads as `None`. Writes fail loud with a [`TypeError`].
//!
//! # Example
//!
//! ```rust
//! use simplendb::{Client, Model, ModelClass, Options, PropertyType, Schema};
//!
//! fn gun_schema(schema: &mut Schema) {
//!     schema
//!         .property("name", PropertyType::String, Options::new())
//!         .property("shots", PropertyType::Integer, Options::new().repeated());
//! }
//!
//! const GUN: ModelClass = ModelClass::new("Gun", gun_schema);
//!
//! let client = Client::in_memory("my-project");
//! let mut gun = Model::new(&client, GUN)?;
//! gun.set("name", "Long Tom")?;
//! gun.set("shots", 3)?;
//! gun.set("shots", 4)?;
//! assert!(gun.set("name", 7).is_err());
//!
//! let key = gun.put(&client)?;
//! let fetched = GUN.get_by_id(&client, key.id().unwrap())?.unwrap();
//! assert_eq!(fetched.get_string("name").as_deref(), Some("Long Tom"));
//! assert_eq!(fetched.get_list("shots").map(|s| s.len()), Some(2));
//! # Ok::<(), simplendb::Error>(())
//! ```

mod accessor;
mod client;
mod enums;
mod error;
mod field;
mod geo;
mod json;
mod key;
mod model;
mod property;
mod query;
mod state;

pub use client::{Client, QueryArgs};
pub use enums::{EnumType, EnumValue, NdbEnum};
pub use error::{Error, TypeError};
pub use field::FieldValue;
pub use geo::{Coordinate, GeoPt};
pub use json::Json;
pub use key::Key;
pub use model::{Model, ModelClass};
pub use property::{Options, PropertySpec, PropertyType, Schema};
pub use query::{FetchOptions, Query};
pub use state::ModelState;

// Re-export the store layer; its Key is reachable as `datastore::Key`.
pub use simplendb_datastore as datastore;
pub use simplendb_datastore::{
    Datastore, DatastoreConfig, DateTime, Entity, IdOrName, MemoryDatastore, Operator, Utc, Value,
    ValueType,
};
