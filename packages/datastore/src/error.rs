//! Error types for the store layer.

/// Errors raised by a [`Datastore`](crate::Datastore) or by the raw types it
/// exchanges.
///
/// These cover malformed keys, rejected property names and bad queries.
/// Typing rules for properties live in the mapping layer above.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid key: {message}")]
    InvalidKey { message: String },

    #[error("invalid property name {name:?}: {message}")]
    InvalidProperty { name: String, message: String },

    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("An implementation error occurred: {message}")]
    ImplementationFailure { message: String },
}

impl Error {
    pub(crate) fn invalid_key(message: impl Into<String>) -> Self {
        Error::InvalidKey {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_query(message: impl Into<String>) -> Self {
        Error::InvalidQuery {
            message: message.into(),
        }
    }
}
