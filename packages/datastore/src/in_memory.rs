//! In-memory store.
//!
//! Keeps entities in a `BTreeMap` behind an `RwLock`, allocates sequential ids
//! and runs queries by scanning. Suitable for tests and local tooling.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Datastore, DatastoreConfig, Entity, Error, Key, QuerySpec};

#[derive(Default)]
struct State {
    entities: BTreeMap<Key, Entity>,
    last_id: i64,
}

/// A [`Datastore`] that keeps everything in process memory.
///
/// # Example
///
/// ```rust
/// use simplendb_datastore::{Datastore, Entity, MemoryDatastore, Value};
///
/// let store = MemoryDatastore::new("demo");
///
/// let mut entity = Entity::new(Some(store.key("Gun", None, None).unwrap()));
/// entity.insert("name", Value::from("Mons Meg")).unwrap();
///
/// let key = store.put(&entity).unwrap();
/// assert_eq!(key.id(), Some(1));
///
/// let stored = store.get(&key).unwrap().unwrap();
/// assert_eq!(stored.get("name"), Some(&Value::from("Mons Meg")));
/// ```
pub struct MemoryDatastore {
    config: DatastoreConfig,
    state: RwLock<State>,
}

impl MemoryDatastore {
    /// Create an empty store for `project` in the default namespace.
    pub fn new(project: impl Into<String>) -> Self {
        Self::with_config(DatastoreConfig::new(project))
    }

    pub fn with_config(config: DatastoreConfig) -> Self {
        Self {
            config,
            state: RwLock::new(State::default()),
        }
    }

    /// Create a store configured from the environment.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self::with_config(DatastoreConfig::from_env()?))
    }

    pub fn config(&self) -> &DatastoreConfig {
        &self.config
    }

    /// Number of stored entities across all namespaces.
    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.read()?.entities.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, Error> {
        self.state.read().map_err(|_| Error::ImplementationFailure {
            message: "memory store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, Error> {
        self.state.write().map_err(|_| Error::ImplementationFailure {
            message: "memory store lock poisoned".to_string(),
        })
    }

    fn check_project(&self, key: &Key) -> Result<(), Error> {
        if key.project() != self.config.project {
            return Err(Error::InvalidKey {
                message: format!(
                    "key project '{}' does not match store project '{}'",
                    key.project(),
                    self.config.project
                ),
            });
        }
        Ok(())
    }
}

impl Datastore for MemoryDatastore {
    fn project(&self) -> &str {
        &self.config.project
    }

    fn namespace(&self) -> Option<&str> {
        self.config.namespace.as_deref()
    }

    fn get(&self, key: &Key) -> Result<Option<Entity>, Error> {
        self.check_project(key)?;
        if key.is_partial() {
            return Err(Error::InvalidKey {
                message: format!("cannot get partial key {}", key),
            });
        }
        Ok(self.read()?.entities.get(key).cloned())
    }

    fn put(&self, entity: &Entity) -> Result<Key, Error> {
        let key = entity.key().ok_or_else(|| Error::InvalidKey {
            message: "entity has no key".to_string(),
        })?;
        self.check_project(key)?;

        let mut state = self.write()?;
        let key = if key.is_partial() {
            state.last_id += 1;
            key.complete(state.last_id)?
        } else {
            key.clone()
        };

        let mut stored = entity.clone();
        stored.set_key(key.clone());
        state.entities.insert(key.clone(), stored);
        log::debug!("Stored {}", key);
        Ok(key)
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        self.check_project(key)?;
        if key.is_partial() {
            return Err(Error::InvalidKey {
                message: format!("cannot delete partial key {}", key),
            });
        }
        self.write()?.entities.remove(key);
        log::debug!("Deleted {}", key);
        Ok(())
    }

    fn run_query(&self, query: &QuerySpec) -> Result<Vec<Entity>, Error> {
        if query.project != self.config.project {
            return Err(Error::InvalidQuery {
                message: format!(
                    "query project '{}' does not match store project '{}'",
                    query.project, self.config.project
                ),
            });
        }

        let state = self.read()?;
        let mut results: Vec<&Entity> = state
            .entities
            .values()
            .filter(|entity| query.matches(entity))
            .collect();
        results.sort_by(|a, b| query.compare(a, b));

        let limit = query.limit.unwrap_or(usize::MAX);
        let results: Vec<Entity> = results
            .into_iter()
            .skip(query.offset)
            .take(limit)
            .cloned()
            .collect();
        log::debug!(
            "Query for kind {:?} returned {} entities",
            query.kind,
            results.len()
        );
        Ok(results)
    }
}
