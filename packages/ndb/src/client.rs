//! The client handle models, keys and queries go through.

use std::fmt;
use std::sync::Arc;

use simplendb_datastore::{
    Datastore, DatastoreConfig, Entity, Filter, IdOrName, MemoryDatastore, Operator, QuerySpec,
    Value,
};

use crate::{Error, Query, TypeError};

/// A shared handle on a [`Datastore`].
///
/// Cloning is cheap and every clone talks to the same store. Pass it to
/// whatever needs the store; there is no ambient client.
///
/// ```rust
/// use simplendb::{Client, QueryArgs};
///
/// let client = Client::in_memory("my-project");
/// let query = client.query(QueryArgs::new().kind("Gun")).unwrap();
/// assert_eq!(query.spec().project, "my-project");
/// assert!(query.fetch_entities(Default::default()).unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct Client {
    store: Arc<dyn Datastore>,
}

impl Client {
    pub fn new(store: impl Datastore + 'static) -> Self {
        Self::from_arc(Arc::new(store))
    }

    pub fn from_arc(store: Arc<dyn Datastore>) -> Self {
        Client { store }
    }

    /// A client over a fresh [`MemoryDatastore`].
    pub fn in_memory(project: impl Into<String>) -> Self {
        Self::new(MemoryDatastore::new(project))
    }

    pub fn from_config(config: DatastoreConfig) -> Self {
        Self::new(MemoryDatastore::with_config(config))
    }

    pub fn project(&self) -> &str {
        self.store.project()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.store.namespace()
    }

    pub fn datastore(&self) -> &Arc<dyn Datastore> {
        &self.store
    }

    pub fn key(
        &self,
        kind: &str,
        id_or_name: Option<IdOrName>,
        parent: Option<&simplendb_datastore::Key>,
    ) -> Result<simplendb_datastore::Key, Error> {
        Ok(self.store.key(kind, id_or_name, parent)?)
    }

    pub fn get(&self, key: &simplendb_datastore::Key) -> Result<Option<Entity>, Error> {
        log::debug!("Getting {}", key);
        Ok(self.store.get(key)?)
    }

    pub fn put(&self, entity: &Entity) -> Result<simplendb_datastore::Key, Error> {
        let key = self.store.put(entity)?;
        log::debug!("Put {} ({} properties)", key, entity.len());
        Ok(key)
    }

    pub fn delete(&self, key: &simplendb_datastore::Key) -> Result<(), Error> {
        log::debug!("Deleting {}", key);
        Ok(self.store.delete(key)?)
    }

    pub fn run_query(&self, spec: &QuerySpec) -> Result<Vec<Entity>, Error> {
        let entities = self.store.run_query(spec)?;
        log::debug!(
            "Query on {} returned {} entities",
            spec.kind.as_deref().unwrap_or("*"),
            entities.len()
        );
        Ok(entities)
    }

    /// Start a query in this client's project.
    ///
    /// The project always comes from the client; passing one is a type
    /// error. The client's namespace applies unless `args` names one.
    pub fn query(&self, args: QueryArgs) -> Result<Query, Error> {
        if args.project.is_some() {
            return Err(TypeError::ReservedQueryArgument {
                argument: "project",
            }
            .into());
        }

        let mut spec = QuerySpec::new(self.project())
            .namespace(args.namespace.or_else(|| self.namespace().map(str::to_string)));
        spec.kind = args.kind;
        spec.ancestor = args.ancestor;
        spec.filters = args.filters;
        for order in &args.order {
            spec = spec.order(order);
        }
        Ok(Query::new(self.clone(), spec))
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("project", &self.project())
            .field("namespace", &self.namespace())
            .finish()
    }
}

/// Arguments to [`Client::query`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryArgs {
    pub kind: Option<String>,
    /// Always rejected; queries run in the client's project.
    pub project: Option<String>,
    pub namespace: Option<String>,
    pub ancestor: Option<simplendb_datastore::Key>,
    pub filters: Vec<Filter>,
    /// Property names, `-` prefixed for descending.
    pub order: Vec<String>,
}

impl QueryArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn ancestor(mut self, ancestor: impl Into<simplendb_datastore::Key>) -> Self {
        self.ancestor = Some(ancestor.into());
        self
    }

    pub fn filter(
        mut self,
        property: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter {
            property: property.into(),
            operator,
            value: value.into(),
        });
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order.push(order.into());
        self
    }
}
