//! Error types for the mapping layer.

use simplendb_datastore::ValueType;

/// Schema and typing violations.
///
/// Every rule the property accessors enforce on a write (and every reason a
/// read can find stored data unusable) has a variant here.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("{property} takes {expected} but received {received}")]
    Mismatch {
        property: String,
        expected: ValueType,
        received: String,
    },

    #[error("{property_type} {property} cannot take {received}")]
    Unsupported {
        property: String,
        property_type: &'static str,
        received: String,
    },

    #[error("{property} takes members of {expected} but received a member of {received}")]
    EnumMismatch {
        property: String,
        expected: &'static str,
        received: &'static str,
    },

    #[error("{value} is not a member of {enum_name}")]
    NotAMember { enum_name: &'static str, value: i64 },

    #[error("{property} expected a key of kind {expected} but received {received}")]
    KindMismatch {
        property: String,
        expected: String,
        received: String,
    },

    #[error("{property_type} {property} must declare the '{option}' option")]
    MissingOption {
        property: String,
        property_type: &'static str,
        option: &'static str,
    },

    #[error("bad stored data in {property_type} {property}: {message}")]
    Malformed {
        property: String,
        property_type: &'static str,
        message: String,
    },

    #[error("GeoPt - input {input:?} cannot be converted to float: {message}")]
    Coordinate { input: String, message: String },

    #[error("cannot pass {argument} to a query")]
    ReservedQueryArgument { argument: &'static str },

    #[error("key {key} is not bound to a model class")]
    UnboundKey { key: String },

    #[error("query is not bound to a model class")]
    UnboundQuery,

    #[error("expected a {expected} model but received {received}")]
    WrongModel { expected: String, received: String },
}

/// Errors from model, key and query operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("No such attribute: {name}")]
    Attribute {
        name: String,
        #[source]
        source: simplendb_datastore::Error,
    },

    #[error("datastore error: {0}")]
    Datastore(#[from] simplendb_datastore::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this is a schema/type violation rather than a store failure.
    pub fn is_type_error(&self) -> bool {
        matches!(self, Error::Type(_))
    }

    pub fn as_type_error(&self) -> Option<&TypeError> {
        match self {
            Error::Type(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn mismatch_display_names_everything() {
        let e = TypeError::Mismatch {
            property: "gunid".to_string(),
            expected: ValueType::Integer,
            received: "String".to_string(),
        };
        assert_eq!(format!("{}", e), "gunid takes integer but received String");
    }

    #[test]
    fn type_error_is_transparent() {
        let e: Error = TypeError::UnboundQuery.into();
        assert!(e.is_type_error());
        assert_eq!(format!("{}", e), "query is not bound to a model class");
    }

    #[test]
    fn attribute_error_has_source() {
        let e = Error::Attribute {
            name: "__key__".to_string(),
            source: simplendb_datastore::Error::InvalidProperty {
                name: "__key__".to_string(),
                message: "reserved".to_string(),
            },
        };
        assert!(!e.is_type_error());
        assert!(format!("{}", e).contains("__key__"));
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn datastore_error_converts() {
        let e: Error = simplendb_datastore::Error::InvalidQuery {
            message: "bad".to_string(),
        }
        .into();
        assert!(matches!(e, Error::Datastore(_)));
        assert!(e.as_type_error().is_none());
    }
}
