//! Entity keys: project, namespace and an ancestor path of kind/id elements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The identifying part of a path element: a numeric id or a string name.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdOrName {
    Id(i64),
    Name(String),
}

impl fmt::Display for IdOrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdOrName::Id(id) => write!(f, "{}", id),
            IdOrName::Name(name) => write!(f, "{:?}", name),
        }
    }
}

impl From<i64> for IdOrName {
    fn from(id: i64) -> Self {
        IdOrName::Id(id)
    }
}

impl From<i32> for IdOrName {
    fn from(id: i32) -> Self {
        IdOrName::Id(id as i64)
    }
}

impl From<&str> for IdOrName {
    fn from(name: &str) -> Self {
        IdOrName::Name(name.to_string())
    }
}

impl From<String> for IdOrName {
    fn from(name: String) -> Self {
        IdOrName::Name(name)
    }
}

/// One step of a key path.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathElement {
    pub kind: String,
    pub id_or_name: Option<IdOrName>,
}

impl PathElement {
    fn validate(&self, position: usize) -> Result<(), Error> {
        if self.kind.is_empty() {
            return Err(Error::invalid_key(format!(
                "empty kind at path position {}",
                position
            )));
        }
        match &self.id_or_name {
            Some(IdOrName::Id(id)) if *id <= 0 => Err(Error::invalid_key(format!(
                "id {} at path position {} must be positive",
                id, position
            ))),
            Some(IdOrName::Name(name)) if name.is_empty() => Err(Error::invalid_key(format!(
                "empty name at path position {}",
                position
            ))),
            _ => Ok(()),
        }
    }
}

/// A key identifying one stored entity.
///
/// The last path element names the entity itself; any earlier elements form
/// its ancestor chain. A key whose last element carries neither id nor name
/// is *partial*: the store fills in an id when the entity is first put.
///
/// ```rust
/// use simplendb_datastore::Key;
///
/// let parent = Key::new("demo", None, "Site", Some(7.into())).unwrap();
/// let child = parent.child("Gun", None).unwrap();
///
/// assert!(child.is_partial());
/// assert_eq!(child.kind(), "Gun");
/// assert_eq!(child.parent(), Some(parent));
/// ```
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    project: String,
    namespace: Option<String>,
    path: Vec<PathElement>,
}

impl Key {
    /// Build a root key (no ancestors).
    pub fn new(
        project: impl Into<String>,
        namespace: Option<String>,
        kind: impl Into<String>,
        id_or_name: Option<IdOrName>,
    ) -> Result<Self, Error> {
        Self::from_path(
            project,
            namespace,
            vec![PathElement {
                kind: kind.into(),
                id_or_name,
            }],
        )
    }

    /// Build a key from a full path, validating each element.
    ///
    /// Only the last element may be incomplete.
    pub fn from_path(
        project: impl Into<String>,
        namespace: Option<String>,
        path: Vec<PathElement>,
    ) -> Result<Self, Error> {
        let project = project.into();
        if project.is_empty() {
            return Err(Error::invalid_key("project must not be empty"));
        }
        if path.is_empty() {
            return Err(Error::invalid_key("key path must not be empty"));
        }
        let last = path.len() - 1;
        for (i, element) in path.iter().enumerate() {
            element.validate(i)?;
            if i < last && element.id_or_name.is_none() {
                return Err(Error::invalid_key(format!(
                    "ancestor '{}' at path position {} is incomplete",
                    element.kind, i
                )));
            }
        }
        Ok(Key {
            project,
            namespace: namespace.filter(|ns| !ns.is_empty()),
            path,
        })
    }

    /// Build a key for a child entity under this (complete) key.
    pub fn child(
        &self,
        kind: impl Into<String>,
        id_or_name: Option<IdOrName>,
    ) -> Result<Key, Error> {
        if self.is_partial() {
            return Err(Error::invalid_key(format!(
                "parent {} is incomplete",
                self
            )));
        }
        let mut path = self.path.clone();
        path.push(PathElement {
            kind: kind.into(),
            id_or_name,
        });
        Self::from_path(self.project.clone(), self.namespace.clone(), path)
    }

    /// Fill in the id of a partial key.
    pub fn complete(&self, id: i64) -> Result<Key, Error> {
        if !self.is_partial() {
            return Err(Error::invalid_key(format!("{} is already complete", self)));
        }
        let mut path = self.path.clone();
        if let Some(last) = path.last_mut() {
            last.id_or_name = Some(IdOrName::Id(id));
        }
        Self::from_path(self.project.clone(), self.namespace.clone(), path)
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn path(&self) -> &[PathElement] {
        &self.path
    }

    fn last(&self) -> &PathElement {
        // from_path guarantees at least one element
        &self.path[self.path.len() - 1]
    }

    /// The kind of the entity this key names.
    pub fn kind(&self) -> &str {
        &self.last().kind
    }

    pub fn id_or_name(&self) -> Option<&IdOrName> {
        self.last().id_or_name.as_ref()
    }

    pub fn id(&self) -> Option<i64> {
        match self.id_or_name() {
            Some(IdOrName::Id(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self.id_or_name() {
            Some(IdOrName::Name(name)) => Some(name),
            _ => None,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.last().id_or_name.is_none()
    }

    /// The key of the immediate ancestor, if any.
    pub fn parent(&self) -> Option<Key> {
        if self.path.len() < 2 {
            return None;
        }
        Some(Key {
            project: self.project.clone(),
            namespace: self.namespace.clone(),
            path: self.path[..self.path.len() - 1].to_vec(),
        })
    }

    /// Whether `ancestor` is this key or one of its ancestors.
    pub fn has_ancestor(&self, ancestor: &Key) -> bool {
        self.project == ancestor.project
            && self.namespace == ancestor.namespace
            && self.path.len() >= ancestor.path.len()
            && self.path[..ancestor.path.len()] == ancestor.path[..]
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for element in &self.path {
            if !first {
                write!(f, "/")?;
            }
            first = false;
            match &element.id_or_name {
                Some(id_or_name) => write!(f, "{}:{}", element.kind, id_or_name)?,
                None => write!(f, "{}:?", element.kind)?,
            }
        }
        Ok(())
    }
}
