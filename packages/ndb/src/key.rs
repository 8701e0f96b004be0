//! Keys bound to a model class.

use std::fmt;

use simplendb_datastore::IdOrName;

use crate::{Client, Error, Model, ModelClass, TypeError};

/// A store key, optionally bound to the model class it identifies.
///
/// The binding lets [`Key::get`] hand back a typed [`Model`]. It only lives
/// in memory; keys are stored without it. Two keys are equal when their
/// store keys are.
#[derive(Clone, Debug)]
pub struct Key {
    raw: simplendb_datastore::Key,
    class: Option<ModelClass>,
}

impl Key {
    /// Build a key for `class` in the client's project and namespace.
    pub fn new(
        client: &Client,
        class: ModelClass,
        id_or_name: Option<IdOrName>,
        parent: Option<&Key>,
    ) -> Result<Key, Error> {
        let raw = client.key(class.name(), id_or_name, parent.map(Key::raw))?;
        Ok(Key::bound(raw, class))
    }

    /// Wrap a store key with no bound class.
    pub fn from_raw(raw: simplendb_datastore::Key) -> Self {
        Key { raw, class: None }
    }

    pub fn bound(raw: simplendb_datastore::Key, class: ModelClass) -> Self {
        Key {
            raw,
            class: Some(class),
        }
    }

    /// Fetch the record and rebuild it as a model of the bound class.
    pub fn get(&self, client: &Client) -> Result<Option<Model>, Error> {
        let class = self.class.ok_or_else(|| TypeError::UnboundKey {
            key: self.raw.to_string(),
        })?;
        match client.get(&self.raw)? {
            Some(entity) => Model::from_entity(class, entity).map(Some),
            None => Ok(None),
        }
    }

    pub fn delete(&self, client: &Client) -> Result<(), Error> {
        client.delete(&self.raw)
    }

    pub fn kind(&self) -> &str {
        self.raw.kind()
    }

    pub fn id(&self) -> Option<i64> {
        self.raw.id()
    }

    pub fn name(&self) -> Option<&str> {
        self.raw.name()
    }

    pub fn id_or_name(&self) -> Option<&IdOrName> {
        self.raw.id_or_name()
    }

    pub fn project(&self) -> &str {
        self.raw.project()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.raw.namespace()
    }

    /// The parent key, unbound.
    pub fn parent(&self) -> Option<Key> {
        self.raw.parent().map(Key::from_raw)
    }

    pub fn class(&self) -> Option<ModelClass> {
        self.class
    }

    pub fn raw(&self) -> &simplendb_datastore::Key {
        &self.raw
    }

    pub fn into_raw(self) -> simplendb_datastore::Key {
        self.raw
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Key {}

impl From<simplendb_datastore::Key> for Key {
    fn from(raw: simplendb_datastore::Key) -> Self {
        Key::from_raw(raw)
    }
}

impl From<Key> for simplendb_datastore::Key {
    fn from(key: Key) -> Self {
        key.raw
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}
