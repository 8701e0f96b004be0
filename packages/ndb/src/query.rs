//! Queries that hand back models.

use simplendb_datastore::{Entity, Operator, QuerySpec, Value};

use crate::{Client, Error, Model, ModelClass, TypeError};

/// Paging for [`Query::fetch`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub limit: Option<usize>,
    pub offset: usize,
}

impl FetchOptions {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// A store query, optionally bound to the model class its results become.
#[derive(Clone, Debug)]
pub struct Query {
    client: Client,
    spec: QuerySpec,
    class: Option<ModelClass>,
}

impl Query {
    pub(crate) fn new(client: Client, spec: QuerySpec) -> Self {
        Query {
            client,
            spec,
            class: None,
        }
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn class(&self) -> Option<ModelClass> {
        self.class
    }

    /// Rebuild results as models of `class`.
    pub fn bind(mut self, class: ModelClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Add a filter, with the operator written as `=`, `!=`, `<`, `<=`, `>`
    /// or `>=`.
    pub fn filter(self, property: &str, operator: &str, value: impl Into<Value>) -> Result<Self, Error> {
        let operator: Operator = operator.parse()?;
        Ok(self.filter_by(property, operator, value))
    }

    pub fn filter_by(mut self, property: &str, operator: Operator, value: impl Into<Value>) -> Self {
        self.spec = self.spec.filter(property, operator, value.into());
        self
    }

    /// Sort by a property, `-` prefixed for descending.
    pub fn order(mut self, order: &str) -> Self {
        self.spec = self.spec.order(order);
        self
    }

    pub fn ancestor(mut self, ancestor: impl Into<simplendb_datastore::Key>) -> Self {
        self.spec = self.spec.ancestor(ancestor.into());
        self
    }

    /// Run the query and return the raw records.
    pub fn fetch_entities(&self, options: FetchOptions) -> Result<Vec<Entity>, Error> {
        let mut spec = self.spec.clone().offset(options.offset);
        spec.limit = options.limit;
        self.client.run_query(&spec)
    }

    /// Run the query and rebuild every record as a model of the bound class.
    pub fn fetch(&self, options: FetchOptions) -> Result<Vec<Model>, Error> {
        let class = self.class.ok_or(TypeError::UnboundQuery)?;
        self.fetch_entities(options)?
            .into_iter()
            .map(|entity| Model::from_entity(class, entity))
            .collect()
    }

    /// The first fetched model, if any.
    pub fn get(&self, options: FetchOptions) -> Result<Option<Model>, Error> {
        Ok(self.fetch(options)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryArgs;

    #[test]
    fn unbound_fetch_is_type_error() {
        let client = Client::in_memory("proj");
        let query = client.query(QueryArgs::new().kind("Gun")).unwrap();
        let err = query.fetch(FetchOptions::default()).unwrap_err();
        assert_eq!(err.as_type_error(), Some(&TypeError::UnboundQuery));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let client = Client::in_memory("proj");
        let query = client.query(QueryArgs::new()).unwrap();
        assert!(matches!(
            query.filter("a", "=~", 1),
            Err(Error::Datastore(_))
        ));
    }

    #[test]
    fn raw_fetch_applies_paging() {
        let client = Client::in_memory("proj");
        for i in 0..5 {
            let key = client.key("Row", None, None).unwrap();
            let mut entity = Entity::new(Some(key));
            entity.insert("n", Value::from(i)).unwrap();
            client.put(&entity).unwrap();
        }

        let query = client
            .query(QueryArgs::new().kind("Row"))
            .unwrap()
            .filter("n", ">=", 1)
            .unwrap()
            .order("-n");
        let rows = query
            .fetch_entities(FetchOptions::default().offset(1).limit(2))
            .unwrap();
        let ns: Vec<_> = rows.iter().filter_map(|e| e.get("n")).cloned().collect();
        assert_eq!(ns, vec![Value::from(3), Value::from(2)]);
    }
}
