//! Query descriptions passed through to a store.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Entity, Error, Key, Value};

/// A property filter comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Operator {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::LessThanOrEqual => ordering != Ordering::Greater,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            other => Err(Error::invalid_query(format!("unknown operator '{}'", other))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        };
        f.write_str(symbol)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub property: String,
    pub operator: Operator,
    pub value: Value,
}

impl Filter {
    /// Whether `entity` satisfies this filter.
    ///
    /// Unindexed and missing properties never match. An array property
    /// matches when any element does.
    pub fn matches(&self, entity: &Entity) -> bool {
        if !entity.is_indexed(&self.property) {
            return false;
        }
        match entity.get(&self.property) {
            Some(Value::Array(items)) => items.iter().any(|item| self.matches_value(item)),
            Some(value) => self.matches_value(value),
            None => false,
        }
    }

    fn matches_value(&self, value: &Value) -> bool {
        value
            .compare(&self.value)
            .map(|ordering| self.operator.accepts(ordering))
            .unwrap_or(false)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub property: String,
    pub direction: Direction,
}

impl Order {
    /// Parse `"name"` (ascending) or `"-name"` (descending).
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix('-') {
            Some(property) => Order {
                property: property.to_string(),
                direction: Direction::Descending,
            },
            None => Order {
                property: spec.to_string(),
                direction: Direction::Ascending,
            },
        }
    }

    /// The value an entity sorts by: the smallest array element when
    /// ascending, the largest when descending.
    pub fn sort_value<'a>(&self, entity: &'a Entity) -> Option<&'a Value> {
        if !entity.is_indexed(&self.property) {
            return None;
        }
        match entity.get(&self.property)? {
            Value::Array(items) => {
                let pick = match self.direction {
                    Direction::Ascending => Ordering::Less,
                    Direction::Descending => Ordering::Greater,
                };
                items.iter().fold(None, |best: Option<&Value>, item| match best {
                    Some(current) if item.compare(current) != Some(pick) => Some(current),
                    _ => Some(item),
                })
            }
            Value::Null => None,
            value => Some(value),
        }
    }
}

/// Everything a store needs to run a query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub kind: Option<String>,
    pub project: String,
    pub namespace: Option<String>,
    pub ancestor: Option<Key>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl QuerySpec {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Self::default()
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    pub fn ancestor(mut self, ancestor: Key) -> Self {
        self.ancestor = Some(ancestor);
        self
    }

    pub fn filter(mut self, property: impl Into<String>, operator: Operator, value: Value) -> Self {
        self.filters.push(Filter {
            property: property.into(),
            operator,
            value,
        });
        self
    }

    pub fn order(mut self, spec: &str) -> Self {
        self.order.push(Order::parse(spec));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Whether `entity` falls inside this query's scope and filters.
    pub fn matches(&self, entity: &Entity) -> bool {
        let Some(key) = entity.key() else {
            return false;
        };
        if key.project() != self.project || key.namespace() != self.namespace.as_deref() {
            return false;
        }
        if let Some(kind) = &self.kind {
            if key.kind() != kind {
                return false;
            }
        }
        if let Some(ancestor) = &self.ancestor {
            if !key.has_ancestor(ancestor) {
                return false;
            }
        }
        if self
            .order
            .iter()
            .any(|order| order.sort_value(entity).is_none())
        {
            return false;
        }
        self.filters.iter().all(|filter| filter.matches(entity))
    }

    /// Compare two matching entities by this query's sort orders.
    pub fn compare(&self, a: &Entity, b: &Entity) -> Ordering {
        for order in &self.order {
            let ordering = match (order.sort_value(a), order.sort_value(b)) {
                (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            let ordering = match order.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.key().cmp(&b.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: i64, score: i64) -> Entity {
        let key = Key::new("demo", None, "Gun", Some(id.into())).unwrap();
        let mut entity = Entity::new(Some(key));
        entity.insert("score", Value::from(score)).unwrap();
        entity
    }

    #[test]
    fn parse_operators() {
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Equal);
        assert_eq!(">=".parse::<Operator>().unwrap(), Operator::GreaterThanOrEqual);
        assert!("~".parse::<Operator>().is_err());
    }

    #[test]
    fn parse_order() {
        assert_eq!(Order::parse("-date").direction, Direction::Descending);
        assert_eq!(Order::parse("-date").property, "date");
        assert_eq!(Order::parse("name").direction, Direction::Ascending);
    }

    #[test]
    fn filter_matches_scalar() {
        let spec = QuerySpec::new("demo").filter("score", Operator::GreaterThan, Value::from(5i64));
        assert!(spec.matches(&entity(1, 10)));
        assert!(!spec.matches(&entity(2, 5)));
    }

    #[test]
    fn filter_matches_any_array_element() {
        let mut e = entity(1, 0);
        e.insert("tags", Value::from(vec!["a", "b"])).unwrap();
        let spec = QuerySpec::new("demo").filter("tags", Operator::Equal, Value::from("b"));
        assert!(spec.matches(&e));
    }

    #[test]
    fn unindexed_property_never_matches() {
        let mut e = entity(1, 10);
        e.exclude_from_index("score");
        let spec = QuerySpec::new("demo").filter("score", Operator::Equal, Value::from(10i64));
        assert!(!spec.matches(&e));
    }

    #[test]
    fn scope_checks() {
        let e = entity(1, 10);
        assert!(!QuerySpec::new("other").matches(&e));
        assert!(!QuerySpec::new("demo").kind("Site").matches(&e));
        assert!(!QuerySpec::new("demo")
            .namespace(Some("ns".to_string()))
            .matches(&e));
        assert!(QuerySpec::new("demo").kind("Gun").matches(&e));
    }

    #[test]
    fn ordering_descending() {
        let spec = QuerySpec::new("demo").order("-score");
        let (a, b) = (entity(1, 1), entity(2, 2));
        assert_eq!(spec.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn array_sort_value() {
        let mut e = entity(1, 0);
        e.insert("marks", Value::from(vec![3i64, 1, 2])).unwrap();
        assert_eq!(
            Order::parse("marks").sort_value(&e),
            Some(&Value::from(1i64))
        );
        assert_eq!(
            Order::parse("-marks").sort_value(&e),
            Some(&Value::from(3i64))
        );
    }
}
