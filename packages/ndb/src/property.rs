//! The property type registry and schema declarations.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use simplendb_datastore::ValueType;

use crate::{EnumType, FieldValue, ModelClass, NdbEnum};

/// The kinds of property a model can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Integer,
    Float,
    String,
    Text,
    Boolean,
    DateTime,
    GeoPt,
    Key,
    Json,
    Enum,
}

lazy_static! {
    static ref BY_NAME: HashMap<&'static str, PropertyType> = PropertyType::ALL
        .iter()
        .map(|property_type| (property_type.name(), *property_type))
        .collect();
}

impl PropertyType {
    /// Every property type, in ordinal order.
    pub const ALL: [PropertyType; 10] = [
        PropertyType::Integer,
        PropertyType::Float,
        PropertyType::String,
        PropertyType::Text,
        PropertyType::Boolean,
        PropertyType::DateTime,
        PropertyType::GeoPt,
        PropertyType::Key,
        PropertyType::Json,
        PropertyType::Enum,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// The registry name, e.g. `"IntegerProperty"`.
    pub fn name(self) -> &'static str {
        match self {
            PropertyType::Integer => "IntegerProperty",
            PropertyType::Float => "FloatProperty",
            PropertyType::String => "StringProperty",
            PropertyType::Text => "TextProperty",
            PropertyType::Boolean => "BooleanProperty",
            PropertyType::DateTime => "DateTimeProperty",
            PropertyType::GeoPt => "GeoPtProperty",
            PropertyType::Key => "KeyProperty",
            PropertyType::Json => "JsonProperty",
            PropertyType::Enum => "EnumProperty",
        }
    }

    pub fn from_name(name: &str) -> Option<PropertyType> {
        BY_NAME.get(name).copied()
    }

    /// Whether the store indexes this property unless told otherwise.
    pub fn indexed_by_default(self) -> bool {
        !matches!(
            self,
            PropertyType::Float | PropertyType::Text | PropertyType::Json
        )
    }

    /// The store value type this property is kept as.
    pub fn native_type(self) -> ValueType {
        match self {
            PropertyType::Integer | PropertyType::Enum => ValueType::Integer,
            PropertyType::Float => ValueType::Float,
            PropertyType::String | PropertyType::Text | PropertyType::Json => ValueType::String,
            PropertyType::Boolean => ValueType::Bool,
            PropertyType::DateTime => ValueType::Timestamp,
            PropertyType::GeoPt => ValueType::GeoPoint,
            PropertyType::Key => ValueType::Key,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-property options.
///
/// ```rust
/// use simplendb::Options;
///
/// let options = Options::new().repeated().default(vec![1, 2]);
/// assert!(options.repeated);
/// assert!(!options.indexed);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    /// Index the property even if its type is unindexed by default.
    pub indexed: bool,
    /// Assigned through the typed setter at construction.
    pub default: Option<FieldValue>,
    /// Stamp the current time at construction and on every put.
    pub auto_now: bool,
    /// Stamp the current time at construction only.
    pub auto_now_add: bool,
    pub repeated: bool,
    /// The enum an EnumProperty's members belong to.
    pub enumeration: Option<EnumType>,
    /// The model a KeyProperty refers to.
    pub kind: Option<ModelClass>,
}

impl Options {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn auto_now(mut self) -> Self {
        self.auto_now = true;
        self
    }

    pub fn auto_now_add(mut self) -> Self {
        self.auto_now_add = true;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub fn enum_of<E: NdbEnum>(self) -> Self {
        self.enumeration(EnumType::of::<E>())
    }

    pub fn enumeration(mut self, enum_type: EnumType) -> Self {
        self.enumeration = Some(enum_type);
        self
    }

    pub fn kind(mut self, class: ModelClass) -> Self {
        self.kind = Some(class);
        self
    }
}

/// A declared property: its type and options.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySpec {
    pub property_type: PropertyType,
    pub options: Options,
}

impl PropertySpec {
    pub fn new(property_type: PropertyType, options: Options) -> Self {
        Self {
            property_type,
            options,
        }
    }

    /// Whether the store should index this property.
    pub fn is_indexed(&self) -> bool {
        self.options.indexed || self.property_type.indexed_by_default()
    }

    /// Whether construction stamps the current time.
    pub fn stamps_on_create(&self) -> bool {
        self.property_type == PropertyType::DateTime
            && (self.options.auto_now || self.options.auto_now_add)
    }

    /// Whether every put stamps the current time.
    pub fn stamps_on_put(&self) -> bool {
        self.property_type == PropertyType::DateTime && self.options.auto_now
    }
}

/// The declared properties of a model, in declaration order.
///
/// Declaring a name again replaces its spec but keeps its position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    properties: Vec<(String, PropertySpec)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(
        &mut self,
        name: impl Into<String>,
        property_type: PropertyType,
        options: Options,
    ) -> &mut Self {
        let name = name.into();
        let spec = PropertySpec::new(property_type, options);
        match self.properties.iter_mut().find(|(declared, _)| *declared == name) {
            Some((_, existing)) => *existing = spec,
            None => self.properties.push((name, spec)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertySpec> {
        self.properties
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, spec)| spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertySpec)> {
        self.properties.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_table() {
        let rows: Vec<_> = PropertyType::ALL
            .iter()
            .map(|t| (t.name(), t.ordinal(), t.indexed_by_default(), t.native_type()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("IntegerProperty", 0, true, ValueType::Integer),
                ("FloatProperty", 1, false, ValueType::Float),
                ("StringProperty", 2, true, ValueType::String),
                ("TextProperty", 3, false, ValueType::String),
                ("BooleanProperty", 4, true, ValueType::Bool),
                ("DateTimeProperty", 5, true, ValueType::Timestamp),
                ("GeoPtProperty", 6, true, ValueType::GeoPoint),
                ("KeyProperty", 7, true, ValueType::Key),
                ("JsonProperty", 8, false, ValueType::String),
                ("EnumProperty", 9, true, ValueType::Integer),
            ]
        );
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(
            PropertyType::from_name("GeoPtProperty"),
            Some(PropertyType::GeoPt)
        );
        assert_eq!(PropertyType::from_name("BlobProperty"), None);
        for property_type in PropertyType::ALL {
            assert_eq!(
                PropertyType::from_name(&property_type.to_string()),
                Some(property_type)
            );
        }
    }

    #[test]
    fn explicit_index_overrides_type_default() {
        assert!(!PropertySpec::new(PropertyType::Text, Options::new()).is_indexed());
        assert!(PropertySpec::new(PropertyType::Text, Options::new().indexed()).is_indexed());
        assert!(PropertySpec::new(PropertyType::String, Options::new()).is_indexed());
    }

    #[test]
    fn auto_now_only_stamps_datetimes() {
        let spec = PropertySpec::new(PropertyType::DateTime, Options::new().auto_now_add());
        assert!(spec.stamps_on_create());
        assert!(!spec.stamps_on_put());
        let spec = PropertySpec::new(PropertyType::Integer, Options::new().auto_now());
        assert!(!spec.stamps_on_create());
    }

    #[test]
    fn redeclaring_overwrites_in_place() {
        let mut schema = Schema::new();
        schema
            .property("a", PropertyType::Integer, Options::new())
            .property("b", PropertyType::String, Options::new())
            .property("a", PropertyType::Float, Options::new().repeated());

        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["a", "b"]);
        let a = schema.get("a").unwrap();
        assert_eq!(a.property_type, PropertyType::Float);
        assert!(a.options.repeated);
        assert!(!schema.contains("c"));
    }
}
