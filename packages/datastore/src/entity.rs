//! The Entity type - a raw record exchanged with the store.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{Error, Key, Value};

/// A raw stored record: an optional key, named property values, and the set
/// of properties the store should leave out of its indexes.
///
/// An entity built in memory usually starts with a partial key; the store
/// hands back the completed key from [`Datastore::put`](crate::Datastore::put).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    key: Option<Key>,
    properties: BTreeMap<String, Value>,
    exclude_from_indexes: BTreeSet<String>,
}

impl Entity {
    pub fn new(key: Option<Key>) -> Self {
        Self {
            key,
            properties: BTreeMap::new(),
            exclude_from_indexes: BTreeSet::new(),
        }
    }

    /// Create an entity that keeps the named properties out of indexes.
    pub fn with_exclusions<I, S>(key: Option<Key>, exclude_from_indexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key,
            properties: BTreeMap::new(),
            exclude_from_indexes: exclude_from_indexes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn set_key(&mut self, key: Key) {
        self.key = Some(key);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.properties.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Set a property, returning the previous value.
    ///
    /// Rejects names the store reserves: the empty name and `__name__`.
    pub fn insert(&mut self, name: &str, value: Value) -> Result<Option<Value>, Error> {
        validate_name(name)?;
        Ok(self.properties.insert(name.to_string(), value))
    }

    /// Set several properties; stops at the first rejected name.
    pub fn update<I, S>(&mut self, values: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        for (name, value) in values {
            self.insert(name.as_ref(), value)?;
        }
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.properties.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn exclude_from_indexes(&self) -> &BTreeSet<String> {
        &self.exclude_from_indexes
    }

    pub fn exclude_from_index(&mut self, name: impl Into<String>) {
        self.exclude_from_indexes.insert(name.into());
    }

    pub fn is_indexed(&self, name: &str) -> bool {
        !self.exclude_from_indexes.contains(name)
    }
}

fn validate_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::InvalidProperty {
            name: name.to_string(),
            message: "property names must not be empty".to_string(),
        });
    }
    if name.len() > 4 && name.starts_with("__") && name.ends_with("__") {
        return Err(Error::InvalidProperty {
            name: name.to_string(),
            message: "names of the form __name__ are reserved".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;

    #[test]
    fn insert_and_get() {
        let mut entity = Entity::new(None);
        assert!(entity.insert("name", Value::from("Alice")).unwrap().is_none());
        assert_eq!(entity.get("name"), Some(&Value::from("Alice")));

        let previous = entity.insert("name", Value::from("Bob")).unwrap();
        assert_eq!(previous, Some(Value::from("Alice")));
        assert_eq!(entity.len(), 1);
    }

    #[test]
    fn reserved_names_rejected() {
        let mut entity = Entity::new(None);
        assert!(matches!(
            entity.insert("", Value::Null),
            Err(Error::InvalidProperty { .. })
        ));
        assert!(entity.insert("__key__", Value::Null).is_err());
        // Leading underscores alone are fine.
        assert!(entity.insert("_private", Value::Null).is_ok());
        assert!(entity.insert("____", Value::Null).is_ok());
    }

    #[test]
    fn update_many() {
        let values: BTreeMap<String, Value> = btree! {
            "a".to_string() => Value::from(1i64),
            "b".to_string() => Value::from(2i64),
        };
        let mut entity = Entity::new(None);
        entity.update(values).unwrap();
        assert_eq!(entity.len(), 2);
        assert_eq!(entity.get("b"), Some(&Value::from(2i64)));
    }

    #[test]
    fn exclusions() {
        let mut entity = Entity::with_exclusions(None, ["notes"]);
        assert!(!entity.is_indexed("notes"));
        assert!(entity.is_indexed("name"));
        entity.exclude_from_index("name");
        assert!(!entity.is_indexed("name"));
    }

    #[test]
    fn key_roundtrip() {
        let key = Key::new("demo", None, "Gun", Some(3.into())).unwrap();
        let mut entity = Entity::new(None);
        assert!(entity.key().is_none());
        entity.set_key(key.clone());
        assert_eq!(entity.key(), Some(&key));
    }
}
