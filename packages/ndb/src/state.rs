//! Serializable snapshots of models.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use simplendb_datastore::{Entity, Value};

use crate::accessor::{self, Property};
use crate::{Error, Model, ModelClass, Schema, TypeError};

/// Everything needed to rebuild a model: its kind, key, raw values and
/// index exclusions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub kind: String,
    pub key: Option<simplendb_datastore::Key>,
    pub values: BTreeMap<String, Value>,
    #[serde(default)]
    pub exclude_from_indexes: BTreeSet<String>,
}

impl Model {
    /// Snapshot every non-null stored value, declared or not.
    pub fn to_state(&self) -> ModelState {
        let entity = self.entity();
        ModelState {
            kind: self.kind().to_string(),
            key: entity.key().cloned(),
            values: entity
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            exclude_from_indexes: entity.exclude_from_indexes().clone(),
        }
    }

    /// Rebuild a model of `class` from a snapshot.
    ///
    /// Declared values are checked against their property types as they are
    /// restored; undeclared ones are restored as they are.
    pub fn from_state(class: ModelClass, state: ModelState) -> Result<Model, Error> {
        if state.kind != class.name() {
            return Err(TypeError::WrongModel {
                expected: class.name().to_string(),
                received: state.kind,
            }
            .into());
        }

        let mut schema = Schema::new();
        class.declare(&mut schema);
        let mut entity = Entity::with_exclusions(state.key, state.exclude_from_indexes);
        for (name, value) in state.values {
            if value.is_null() {
                continue;
            }
            match schema.get(&name) {
                Some(spec) => {
                    let property = Property { name: &name, spec };
                    accessor::store(&property, &mut entity, value)?;
                }
                None => accessor::insert(&mut entity, &name, value)?,
            }
        }

        Model::from_entity(class, entity)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.to_state())?)
    }

    pub fn from_json(class: ModelClass, json: &str) -> Result<Model, Error> {
        let state: ModelState = serde_json::from_str(json)?;
        Model::from_state(class, state)
    }
}
