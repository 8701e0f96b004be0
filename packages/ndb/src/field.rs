//! FieldValue - what typed property accessors read and write.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use simplendb_datastore::{GeoPoint, Value};

use crate::{EnumValue, GeoPt, Json, Key};

/// A typed property value.
///
/// Where [`Value`] is what the store keeps, `FieldValue` is what a model
/// hands out: store keys come back as mapping-layer [`Key`]s, JSON strings as
/// parsed [`Json`] and enum integers as [`EnumValue`]s.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    GeoPoint(GeoPt),
    Key(Key),
    Json(Json),
    Enum(EnumValue),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Name of the variant, used when reporting what a setter received.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Integer(_) => "Integer",
            FieldValue::Float(_) => "Float",
            FieldValue::String(_) => "String",
            FieldValue::Boolean(_) => "Boolean",
            FieldValue::DateTime(_) => "DateTime",
            FieldValue::GeoPoint(_) => "GeoPt",
            FieldValue::Key(_) => "Key",
            FieldValue::Json(_) => "Json",
            FieldValue::Enum(_) => "Enum",
            FieldValue::List(_) => "List",
        }
    }

    /// Read a raw stored value without any declared type to guide it.
    ///
    /// Keys come back unbound and embedded entities come back as JSON.
    pub fn from_raw(value: &Value) -> Option<FieldValue> {
        Some(match value {
            Value::Null => return None,
            Value::Bool(b) => FieldValue::Boolean(*b),
            Value::Integer(i) => FieldValue::Integer(*i),
            Value::Float(f) => FieldValue::Float(*f),
            Value::String(s) => FieldValue::String(s.clone()),
            Value::Timestamp(t) => FieldValue::DateTime(*t),
            Value::GeoPoint(p) => FieldValue::GeoPoint(GeoPt::from(*p)),
            Value::Key(k) => FieldValue::Key(Key::from_raw(k.clone())),
            Value::Array(items) => {
                FieldValue::List(items.iter().filter_map(FieldValue::from_raw).collect())
            }
            Value::Map(_) => FieldValue::Json(Json::new(raw_to_json(value))),
        })
    }

    /// The store value for a natively stored type.
    ///
    /// `None` for JSON documents and enum members, which only their own
    /// property types know how to store, and for lists holding either.
    pub fn to_raw(&self) -> Option<Value> {
        Some(match self {
            FieldValue::Integer(i) => Value::Integer(*i),
            FieldValue::Float(f) => Value::Float(*f),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::DateTime(t) => Value::Timestamp(*t),
            FieldValue::GeoPoint(p) => Value::GeoPoint(p.into_inner()),
            FieldValue::Key(k) => Value::Key(k.raw().clone()),
            FieldValue::List(items) => {
                Value::Array(items.iter().map(FieldValue::to_raw).collect::<Option<_>>()?)
            }
            FieldValue::Json(_) | FieldValue::Enum(_) => return None,
        })
    }

    /// The store value for an undeclared field, where nothing is rejected.
    ///
    /// Enum members store their integer and JSON maps to the nearest store
    /// values, objects becoming embedded entities.
    pub fn into_raw(self) -> Value {
        match self {
            FieldValue::Json(json) => json_to_raw(&json),
            FieldValue::Enum(member) => Value::Integer(member.value()),
            FieldValue::List(items) => {
                Value::Array(items.into_iter().map(FieldValue::into_raw).collect())
            }
            FieldValue::Key(k) => Value::Key(k.into_raw()),
            other => other.to_raw().unwrap_or_default(),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::DateTime(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_geo(&self) -> Option<GeoPt> {
        match self {
            FieldValue::GeoPoint(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<&Key> {
        match self {
            FieldValue::Key(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Json> {
        match self {
            FieldValue::Json(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<EnumValue> {
        match self {
            FieldValue::Enum(e) => Some(*e),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<FieldValue>> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

fn raw_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::from(*b),
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(s) => JsonValue::from(s.as_str()),
        Value::Timestamp(t) => JsonValue::from(t.to_rfc3339()),
        Value::GeoPoint(p) => serde_json::json!({
            "latitude": p.latitude,
            "longitude": p.longitude,
        }),
        Value::Key(k) => JsonValue::from(k.to_string()),
        Value::Array(items) => items.iter().map(raw_to_json).collect(),
        Value::Map(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), raw_to_json(value)))
                .collect(),
        ),
    }
}

fn json_to_raw(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or_default(),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::Array(items.iter().map(json_to_raw).collect()),
        JsonValue::Object(fields) => Value::Map(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), json_to_raw(value)))
                .collect(),
        ),
    }
}

// Conversion from common types

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::DateTime(v)
    }
}

impl From<GeoPt> for FieldValue {
    fn from(v: GeoPt) -> Self {
        FieldValue::GeoPoint(v)
    }
}

impl From<GeoPoint> for FieldValue {
    fn from(v: GeoPoint) -> Self {
        FieldValue::GeoPoint(GeoPt::from(v))
    }
}

impl From<Key> for FieldValue {
    fn from(v: Key) -> Self {
        FieldValue::Key(v)
    }
}

impl From<simplendb_datastore::Key> for FieldValue {
    fn from(v: simplendb_datastore::Key) -> Self {
        FieldValue::Key(Key::from_raw(v))
    }
}

impl From<Json> for FieldValue {
    fn from(v: Json) -> Self {
        FieldValue::Json(v)
    }
}

impl From<JsonValue> for FieldValue {
    fn from(v: JsonValue) -> Self {
        FieldValue::Json(Json::new(v))
    }
}

impl From<EnumValue> for FieldValue {
    fn from(v: EnumValue) -> Self {
        FieldValue::Enum(v)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        FieldValue::List(v.into_iter().map(Into::into).collect())
    }
}
