//! Parsed JSON documents held by JsonProperty.

use std::fmt;
use std::ops::Deref;

use serde_json::Value as JsonValue;

/// A JSON document read from a JsonProperty.
///
/// Dereferences to [`serde_json::Value`] and adds attribute-style access to
/// object members.
///
/// ```rust
/// use simplendb::Json;
/// use serde_json::json;
///
/// let doc = Json::new(json!({"place": {"name": "Dover", "county": "Kent"}}));
/// assert_eq!(doc.lookup("place.name"), Some(&json!("Dover")));
/// assert_eq!(doc.attr("missing"), None);
/// assert_eq!(doc, json!({"place": {"name": "Dover", "county": "Kent"}}));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Json(JsonValue);

impl Json {
    pub fn new(value: JsonValue) -> Self {
        Json(value)
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Json)
    }

    /// An object member by name.
    pub fn attr(&self, name: &str) -> Option<&JsonValue> {
        self.0.as_object()?.get(name)
    }

    /// A nested object member by dotted path, e.g. `"address.city"`.
    pub fn lookup(&self, path: &str) -> Option<&JsonValue> {
        path.split('.').try_fold(&self.0, |current, name| {
            current.as_object()?.get(name)
        })
    }

    pub fn into_inner(self) -> JsonValue {
        self.0
    }

    pub(crate) fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}

impl Deref for Json {
    type Target = JsonValue;

    fn deref(&self) -> &JsonValue {
        &self.0
    }
}

impl From<JsonValue> for Json {
    fn from(value: JsonValue) -> Self {
        Json(value)
    }
}

impl From<Json> for JsonValue {
    fn from(value: Json) -> Self {
        value.0
    }
}

impl PartialEq<JsonValue> for Json {
    fn eq(&self, other: &JsonValue) -> bool {
        &self.0 == other
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
