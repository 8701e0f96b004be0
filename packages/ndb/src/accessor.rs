//! Typed getters and setters, one pair per property type.
//!
//! Most types are stored natively and share one pair. Enum, Json and Key
//! properties translate between what a model hands out and what the store
//! keeps, then defer to the same [`store`] rules.

use serde_json::Value as JsonValue;
use simplendb_datastore::{Entity, Value, ValueType};

use crate::{Error, FieldValue, Json, Key, PropertySpec, PropertyType, TypeError};

/// A declared property being read or written.
pub(crate) struct Property<'a> {
    pub name: &'a str,
    pub spec: &'a PropertySpec,
}

pub(crate) type Getter = fn(&Property<'_>, &Entity) -> Result<Option<FieldValue>, TypeError>;
pub(crate) type Setter = fn(&Property<'_>, &mut Entity, FieldValue) -> Result<(), Error>;

pub(crate) struct Accessor {
    pub get: Getter,
    pub set: Setter,
}

static NATIVE: Accessor = Accessor {
    get: get_native,
    set: set_native,
};

static ENUM: Accessor = Accessor {
    get: get_enum,
    set: set_enum,
};

static JSON: Accessor = Accessor {
    get: get_json,
    set: set_json,
};

static KEY: Accessor = Accessor {
    get: get_key,
    set: set_key,
};

impl PropertyType {
    pub(crate) fn accessor(self) -> &'static Accessor {
        match self {
            PropertyType::Enum => &ENUM,
            PropertyType::Json => &JSON,
            PropertyType::Key => &KEY,
            _ => &NATIVE,
        }
    }
}

impl Property<'_> {
    fn type_name(&self) -> &'static str {
        self.spec.property_type.name()
    }

    fn mismatch(&self, received: ValueType) -> TypeError {
        TypeError::Mismatch {
            property: self.name.to_string(),
            expected: self.spec.property_type.native_type(),
            received: received.to_string(),
        }
    }

    fn unsupported(&self, value: &FieldValue) -> TypeError {
        TypeError::Unsupported {
            property: self.name.to_string(),
            property_type: self.type_name(),
            received: value.type_name().to_string(),
        }
    }

    fn malformed(&self, message: impl Into<String>) -> TypeError {
        TypeError::Malformed {
            property: self.name.to_string(),
            property_type: self.type_name(),
            message: message.into(),
        }
    }

    fn missing(&self, option: &'static str) -> TypeError {
        TypeError::MissingOption {
            property: self.name.to_string(),
            property_type: self.type_name(),
            option,
        }
    }
}

pub(crate) fn insert(entity: &mut Entity, name: &str, value: Value) -> Result<(), Error> {
    entity
        .insert(name, value)
        .map(|_| ())
        .map_err(|source| Error::Attribute {
            name: name.to_string(),
            source,
        })
}

/// Validate a raw value against the property's native type and store it.
///
/// A non-repeated property takes exactly its native type. A repeated one
/// appends a native scalar to its array, or replaces the array wholesale
/// when every element is native. Nothing is written on failure.
pub(crate) fn store(property: &Property<'_>, entity: &mut Entity, value: Value) -> Result<(), Error> {
    let native = property.spec.property_type.native_type();

    if !property.spec.options.repeated {
        if value.value_type() != native {
            return Err(property.mismatch(value.value_type()).into());
        }
        return insert(entity, property.name, value);
    }

    match value {
        Value::Array(items) => {
            if let Some(item) = items.iter().find(|item| item.value_type() != native) {
                return Err(property.mismatch(item.value_type()).into());
            }
            insert(entity, property.name, Value::Array(items))
        }
        item if item.value_type() == native => {
            if let Some(Value::Array(items)) = entity.get_mut(property.name) {
                items.push(item);
                return Ok(());
            }
            insert(entity, property.name, Value::Array(vec![item]))
        }
        other => Err(property.mismatch(other.value_type()).into()),
    }
}

/// Read a stored scalar, or each element of a stored array.
fn read_each<F>(property: &Property<'_>, entity: &Entity, read: F) -> Result<Option<FieldValue>, TypeError>
where
    F: Fn(&Value) -> Result<FieldValue, TypeError>,
{
    match entity.get(property.name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(read)
            .collect::<Result<Vec<_>, _>>()
            .map(|items| Some(FieldValue::List(items))),
        Some(value) => read(value).map(Some),
    }
}

/// Convert a value, or each element of a list, to its stored form.
fn convert_each<F>(value: &FieldValue, convert: F) -> Result<Value, Error>
where
    F: Fn(&FieldValue) -> Result<Value, Error>,
{
    match value {
        FieldValue::List(items) => Ok(Value::Array(
            items.iter().map(convert).collect::<Result<_, _>>()?,
        )),
        single => convert(single),
    }
}

fn get_native(property: &Property<'_>, entity: &Entity) -> Result<Option<FieldValue>, TypeError> {
    Ok(entity.get(property.name).and_then(FieldValue::from_raw))
}

fn set_native(property: &Property<'_>, entity: &mut Entity, value: FieldValue) -> Result<(), Error> {
    let raw = value.to_raw().ok_or_else(|| property.unsupported(&value))?;
    store(property, entity, raw)
}

fn get_enum(property: &Property<'_>, entity: &Entity) -> Result<Option<FieldValue>, TypeError> {
    let enum_type = property
        .spec
        .options
        .enumeration
        .ok_or_else(|| property.missing("enum"))?;
    read_each(property, entity, |raw| match raw {
        Value::Integer(value) => enum_type.member(*value).map(FieldValue::Enum),
        other => Err(property.malformed(format!("expected an integer, found {}", other.value_type()))),
    })
}

fn set_enum(property: &Property<'_>, entity: &mut Entity, value: FieldValue) -> Result<(), Error> {
    let declared = property.spec.options.enumeration;
    let raw = convert_each(&value, |item| match item {
        FieldValue::Enum(member) => match declared {
            Some(expected) if member.enum_type() != expected => Err(TypeError::EnumMismatch {
                property: property.name.to_string(),
                expected: expected.name(),
                received: member.enum_type().name(),
            }
            .into()),
            _ => Ok(Value::Integer(member.value())),
        },
        other => Err(property.unsupported(other).into()),
    })?;
    store(property, entity, raw)
}

fn get_json(property: &Property<'_>, entity: &Entity) -> Result<Option<FieldValue>, TypeError> {
    read_each(property, entity, |raw| match raw {
        Value::String(text) => Json::parse(text)
            .map(FieldValue::Json)
            .map_err(|e| property.malformed(e.to_string())),
        other => Err(property.malformed(format!("expected JSON text, found {}", other.value_type()))),
    })
}

fn set_json(property: &Property<'_>, entity: &mut Entity, value: FieldValue) -> Result<(), Error> {
    let raw = match value {
        FieldValue::Json(json) => match json.into_inner() {
            JsonValue::Array(items) if property.spec.options.repeated => Value::Array(
                items
                    .iter()
                    .map(|item| serde_json::to_string(item).map(Value::String))
                    .collect::<Result<_, _>>()?,
            ),
            other => Value::String(serde_json::to_string(&other)?),
        },
        // Already serialized.
        FieldValue::String(text) => Value::String(text),
        // One document holding the whole list.
        FieldValue::List(items) if !property.spec.options.repeated => {
            let array = items
                .into_iter()
                .map(|item| match item {
                    FieldValue::Json(json) => Ok(json.into_inner()),
                    FieldValue::String(text) => Ok(JsonValue::String(text)),
                    other => Err(property.unsupported(&other)),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Value::String(serde_json::to_string(&JsonValue::Array(array))?)
        }
        list @ FieldValue::List(_) => convert_each(&list, |item| match item {
            FieldValue::Json(json) => Ok(Value::String(json.to_text()?)),
            FieldValue::String(text) => Ok(Value::String(text.clone())),
            other => Err(property.unsupported(other).into()),
        })?,
        other => return Err(property.unsupported(&other).into()),
    };
    store(property, entity, raw)
}

fn get_key(property: &Property<'_>, entity: &Entity) -> Result<Option<FieldValue>, TypeError> {
    let class = property.spec.options.kind.ok_or_else(|| property.missing("kind"))?;
    read_each(property, entity, |raw| match raw {
        Value::Key(key) => Ok(FieldValue::Key(Key::bound(key.clone(), class))),
        other => Err(property.malformed(format!("expected a key, found {}", other.value_type()))),
    })
}

fn set_key(property: &Property<'_>, entity: &mut Entity, value: FieldValue) -> Result<(), Error> {
    let class = property.spec.options.kind.ok_or_else(|| property.missing("kind"))?;
    let raw = convert_each(&value, |item| match item {
        FieldValue::Key(key) if key.kind() == class.name() => Ok(Value::Key(key.raw().clone())),
        FieldValue::Key(key) => Err(TypeError::KindMismatch {
            property: property.name.to_string(),
            expected: class.name().to_string(),
            received: key.kind().to_string(),
        }
        .into()),
        other => Err(property.unsupported(other).into()),
    })?;
    store(property, entity, raw)
}
