//! The store client interface.

use std::sync::Arc;

use crate::{Entity, Error, IdOrName, Key, QuerySpec};

/// A document-store client.
///
/// This is the whole surface the mapping layer relies on: key allocation,
/// get/put/delete of raw entities, and query execution. Durability,
/// consistency, indexing and transport are the implementation's business.
///
/// Methods take `&self` so one client can be shared behind an `Arc`;
/// implementations synchronize internally.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn Datastore>`.
pub trait Datastore: Send + Sync {
    /// The project every key and query is scoped to.
    fn project(&self) -> &str;

    /// The default namespace, if any.
    fn namespace(&self) -> Option<&str>;

    /// Build a key in this client's project and namespace.
    ///
    /// With a `parent`, the key is a child of it and inherits its namespace;
    /// the parent must belong to this client's project.
    fn key(
        &self,
        kind: &str,
        id_or_name: Option<IdOrName>,
        parent: Option<&Key>,
    ) -> Result<Key, Error> {
        match parent {
            Some(parent) => {
                if parent.project() != self.project() {
                    return Err(Error::InvalidKey {
                        message: format!(
                            "parent project '{}' does not match '{}'",
                            parent.project(),
                            self.project()
                        ),
                    });
                }
                parent.child(kind, id_or_name)
            }
            None => Key::new(
                self.project(),
                self.namespace().map(str::to_string),
                kind,
                id_or_name,
            ),
        }
    }

    /// Fetch an entity.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No entity is stored under the key.
    /// * `Ok(Some(entity))` - The stored entity.
    /// * `Err(Error)` - An error occurred.
    fn get(&self, key: &Key) -> Result<Option<Entity>, Error>;

    /// Store an entity, returning its complete key.
    ///
    /// A partial key is completed with a newly allocated id.
    fn put(&self, entity: &Entity) -> Result<Key, Error>;

    /// Remove the entity stored under `key`. Missing entities are not an error.
    fn delete(&self, key: &Key) -> Result<(), Error>;

    /// Run a query and materialize every result.
    fn run_query(&self, query: &QuerySpec) -> Result<Vec<Entity>, Error>;
}

impl<T: Datastore + ?Sized> Datastore for Arc<T> {
    fn project(&self) -> &str {
        self.as_ref().project()
    }

    fn namespace(&self) -> Option<&str> {
        self.as_ref().namespace()
    }

    fn key(
        &self,
        kind: &str,
        id_or_name: Option<IdOrName>,
        parent: Option<&Key>,
    ) -> Result<Key, Error> {
        self.as_ref().key(kind, id_or_name, parent)
    }

    fn get(&self, key: &Key) -> Result<Option<Entity>, Error> {
        self.as_ref().get(key)
    }

    fn put(&self, entity: &Entity) -> Result<Key, Error> {
        self.as_ref().put(entity)
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        self.as_ref().delete(key)
    }

    fn run_query(&self, query: &QuerySpec) -> Result<Vec<Entity>, Error> {
        self.as_ref().run_query(query)
    }
}

impl<T: Datastore + ?Sized> Datastore for Box<T> {
    fn project(&self) -> &str {
        self.as_ref().project()
    }

    fn namespace(&self) -> Option<&str> {
        self.as_ref().namespace()
    }

    fn key(
        &self,
        kind: &str,
        id_or_name: Option<IdOrName>,
        parent: Option<&Key>,
    ) -> Result<Key, Error> {
        self.as_ref().key(kind, id_or_name, parent)
    }

    fn get(&self, key: &Key) -> Result<Option<Entity>, Error> {
        self.as_ref().get(key)
    }

    fn put(&self, entity: &Entity) -> Result<Key, Error> {
        self.as_ref().put(entity)
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        self.as_ref().delete(key)
    }

    fn run_query(&self, query: &QuerySpec) -> Result<Vec<Entity>, Error> {
        self.as_ref().run_query(query)
    }
}
