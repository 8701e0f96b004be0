//! Models: a raw entity seen through a declared schema.

use std::fmt;

use chrono::{DateTime, Utc};
use simplendb_datastore::{Entity, IdOrName, Value};

use crate::accessor::{self, Property};
use crate::{
    Client, EnumValue, Error, FieldValue, GeoPt, Json, Key, NdbEnum, Options, PropertyType,
    Query, QueryArgs, Schema, TypeError,
};

/// A model class: a kind name and the function that declares its schema.
///
/// ```rust
/// use simplendb::{ModelClass, Options, PropertyType, Schema};
///
/// fn gun_schema(schema: &mut Schema) {
///     schema
///         .property("name", PropertyType::String, Options::new())
///         .property("calibres", PropertyType::Float, Options::new().repeated());
/// }
///
/// const GUN: ModelClass = ModelClass::new("Gun", gun_schema);
///
/// let mut schema = Schema::new();
/// GUN.declare(&mut schema);
/// assert_eq!(schema.len(), 2);
/// ```
#[derive(Clone, Copy)]
pub struct ModelClass {
    name: &'static str,
    schema: fn(&mut Schema),
}

impl ModelClass {
    pub const fn new(name: &'static str, schema: fn(&mut Schema)) -> Self {
        ModelClass { name, schema }
    }

    /// The kind this class is stored under.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declare this class's properties on `schema`.
    pub fn declare(&self, schema: &mut Schema) {
        (self.schema)(schema)
    }

    pub fn key(&self, client: &Client, id_or_name: impl Into<IdOrName>) -> Result<Key, Error> {
        Key::new(client, *self, Some(id_or_name.into()), None)
    }

    pub fn get_by_id(
        &self,
        client: &Client,
        id_or_name: impl Into<IdOrName>,
    ) -> Result<Option<Model>, Error> {
        self.key(client, id_or_name)?.get(client)
    }

    /// A query over this class's kind.
    pub fn query(&self, client: &Client) -> Result<Query, Error> {
        self.query_with(client, QueryArgs::new())
    }

    /// A query over this class's kind, refined by `args`.
    pub fn query_with(&self, client: &Client, args: QueryArgs) -> Result<Query, Error> {
        Ok(client.query(args.kind(self.name))?.bind(*self))
    }

    pub fn create(&self, client: &Client) -> Result<Model, Error> {
        Model::new(client, *self)
    }
}

impl PartialEq for ModelClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ModelClass {}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelClass").field(&self.name).finish()
    }
}

/// An entity together with the schema it is read and written through.
///
/// Declared properties go through their type's accessor; anything else is
/// read and written raw. Every instance owns its schema, so one instance
/// can [`declare`](Model::declare) properties its class does not have.
#[derive(Clone, Debug)]
pub struct Model {
    class: ModelClass,
    properties: Schema,
    entity: Entity,
}

impl Model {
    pub fn new(client: &Client, class: ModelClass) -> Result<Model, Error> {
        Self::build(client, class, None, Vec::<(String, FieldValue)>::new())
    }

    pub fn with_parent(client: &Client, class: ModelClass, parent: &Key) -> Result<Model, Error> {
        Self::build(client, class, Some(parent), Vec::<(String, FieldValue)>::new())
    }

    /// Create a model and populate it with `values`.
    pub fn with_values<I, S>(
        client: &Client,
        class: ModelClass,
        parent: Option<&Key>,
        values: I,
    ) -> Result<Model, Error>
    where
        I: IntoIterator<Item = (S, FieldValue)>,
        S: AsRef<str>,
    {
        Self::build(client, class, parent, values)
    }

    fn build<I, S>(
        client: &Client,
        class: ModelClass,
        parent: Option<&Key>,
        values: I,
    ) -> Result<Model, Error>
    where
        I: IntoIterator<Item = (S, FieldValue)>,
        S: AsRef<str>,
    {
        let mut properties = Schema::new();
        class.declare(&mut properties);
        let exclusions = properties
            .iter()
            .filter(|(_, spec)| !spec.is_indexed())
            .map(|(name, _)| name.to_string())
            .collect::<Vec<_>>();

        let mut model = Model {
            class,
            entity: Entity::with_exclusions(None, exclusions),
            properties,
        };

        let now = Utc::now();
        let declared = model
            .properties
            .iter()
            .map(|(name, spec)| (name.to_string(), spec.clone()))
            .collect::<Vec<_>>();
        for (name, spec) in declared {
            if spec.options.repeated {
                accessor::insert(&mut model.entity, &name, Value::Array(Vec::new()))?;
            }
            if let Some(default) = &spec.options.default {
                model.set(&name, default.clone())?;
            }
            if spec.stamps_on_create() {
                model.set(&name, now)?;
            }
        }

        let key = client.key(class.name(), None, parent.map(Key::raw))?;
        model.entity.set_key(key);
        model.populate(values)?;
        Ok(model)
    }

    /// Rebuild a model of `class` around a fetched record.
    ///
    /// Defaults and timestamps are not applied again. Declared repeated
    /// properties the record lacks start out empty, and stored scalars are
    /// wrapped in an array.
    pub fn from_entity(class: ModelClass, entity: Entity) -> Result<Model, Error> {
        let mut model = Model {
            class,
            properties: Schema::new(),
            entity,
        };
        class.declare(&mut model.properties);
        model.fill_repeated()?;
        Ok(model)
    }

    /// Make every declared repeated property hold an array: missing and
    /// null values become empty, a bare scalar becomes a one-element array.
    pub(crate) fn fill_repeated(&mut self) -> Result<(), Error> {
        let repeated = self
            .properties
            .iter()
            .filter(|(_, spec)| spec.options.repeated)
            .map(|(name, _)| name.to_string())
            .collect::<Vec<_>>();
        for name in repeated {
            let items = match self.entity.remove(&name) {
                Some(Value::Array(items)) => items,
                None | Some(Value::Null) => Vec::new(),
                Some(scalar) => vec![scalar],
            };
            accessor::insert(&mut self.entity, &name, Value::Array(items))?;
        }
        Ok(())
    }

    pub fn class(&self) -> ModelClass {
        self.class
    }

    pub fn kind(&self) -> &'static str {
        self.class.name()
    }

    /// Re-run the class's declarations against this instance's schema.
    pub fn schema(&mut self) {
        self.class.declare(&mut self.properties);
    }

    /// Declare one more property on this instance.
    pub fn declare(&mut self, name: &str, property_type: PropertyType, options: Options) {
        self.properties.property(name, property_type, options);
    }

    pub fn properties(&self) -> &Schema {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Schema {
        &mut self.properties
    }

    /// Read a property.
    ///
    /// `None` if it is absent or its stored data does not fit the declared
    /// type. [`try_get`](Model::try_get) reports the latter.
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        match self.try_get(name) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("Ignoring unreadable {}.{}: {}", self.kind(), name, e);
                None
            }
        }
    }

    pub fn try_get(&self, name: &str) -> Result<Option<FieldValue>, TypeError> {
        match self.properties.get(name) {
            Some(spec) => {
                let property = Property { name, spec };
                (spec.property_type.accessor().get)(&property, &self.entity)
            }
            None => Ok(self.entity.get(name).and_then(FieldValue::from_raw)),
        }
    }

    /// Write a property.
    ///
    /// Declared properties are validated by their type; on failure the prior
    /// value is kept. Undeclared names are stored as given.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), Error> {
        let value = value.into();
        match self.properties.get(name) {
            Some(spec) => {
                let property = Property { name, spec };
                (spec.property_type.accessor().set)(&property, &mut self.entity, value)
            }
            None => accessor::insert(&mut self.entity, name, value.into_raw()),
        }
    }

    pub fn set_enum<E: NdbEnum>(&mut self, name: &str, member: E) -> Result<(), Error> {
        self.set(name, EnumValue::of(member))
    }

    /// Set each of `values` in turn, stopping at the first failure.
    pub fn populate<I, S>(&mut self, values: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (S, FieldValue)>,
        S: AsRef<str>,
    {
        for (name, value) in values {
            self.set(name.as_ref(), value)?;
        }
        Ok(())
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_integer()
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_float()
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    pub fn get_datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name)?.as_datetime()
    }

    pub fn get_geo(&self, name: &str) -> Option<GeoPt> {
        self.get(name)?.as_geo()
    }

    pub fn get_json(&self, name: &str) -> Option<Json> {
        match self.get(name)? {
            FieldValue::Json(json) => Some(json),
            _ => None,
        }
    }

    /// Read a KeyProperty.
    pub fn get_key_property(&self, name: &str) -> Option<Key> {
        match self.get(name)? {
            FieldValue::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn get_list(&self, name: &str) -> Option<Vec<FieldValue>> {
        self.get(name)?.into_list()
    }

    pub fn get_enum<E: NdbEnum>(&self, name: &str) -> Option<E> {
        self.get(name)?.as_enum()?.to::<E>()
    }

    /// The raw stored value of a property.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.entity.get(name)
    }

    /// Declared properties that hold a value, in declaration order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties
            .names()
            .filter_map(|name| match self.entity.get(name) {
                Some(value) if !value.is_null() => Some((name, value)),
                _ => None,
            })
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// The entity as it is persisted: the key, index exclusions and
    /// [`items`](Model::items).
    pub fn to_entity(&self) -> Entity {
        let mut entity = Entity::with_exclusions(
            self.entity.key().cloned(),
            self.entity.exclude_from_indexes().iter().cloned(),
        );
        for (name, value) in self.items() {
            // Names already passed validation on the way into self.entity.
            let _ = entity.insert(name, value.clone());
        }
        entity
    }

    /// Store the model and record its completed key.
    ///
    /// `auto_now` properties are stamped first.
    pub fn put(&mut self, client: &Client) -> Result<Key, Error> {
        let now = Utc::now();
        let stamped = self
            .properties
            .iter()
            .filter(|(_, spec)| spec.stamps_on_put())
            .map(|(name, _)| name.to_string())
            .collect::<Vec<_>>();
        for name in stamped {
            self.set(&name, now)?;
        }

        let raw = client.put(&self.to_entity())?;
        self.entity.set_key(raw.clone());
        Ok(Key::bound(raw, self.class))
    }

    /// Delete the stored record. The model itself stays usable.
    pub fn delete(&self, client: &Client) -> Result<(), Error> {
        let key = self.entity.key().ok_or_else(|| {
            Error::Datastore(simplendb_datastore::Error::InvalidKey {
                message: format!("{} model has no key", self.kind()),
            })
        })?;
        client.delete(key)
    }

    /// The instance key, unbound.
    ///
    /// Always present on models built with [`Model::new`] and friends, or
    /// fetched from a store. `None` only when the model was rebuilt from an
    /// entity or [`ModelState`](crate::ModelState) that carried no key.
    pub fn get_key(&self) -> Option<Key> {
        self.entity.key().cloned().map(Key::from_raw)
    }

    pub(crate) fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}
