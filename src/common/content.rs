use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};

/// A leaf value in a [`Content`] tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => write!(f, "{}", s),
        }
    }
}

/// A structured value stored per revision: arbitrary nesting of mappings,
/// ordered lists, and scalars.
///
/// Map order is irrelevant (kept sorted by key for deterministic
/// serialization); list order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Scalar(Scalar),
    List(Vec<Content>),
    Map(BTreeMap<String, Content>),
}

impl Default for Content {
    fn default() -> Self {
        Content::Map(BTreeMap::new())
    }
}

impl Content {
    pub fn null() -> Self {
        Content::Scalar(Scalar::Null)
    }

    pub fn map() -> Self {
        Content::Map(BTreeMap::new())
    }

    pub fn list() -> Self {
        Content::List(Vec::new())
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Content::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Content::List(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Content::Scalar(_))
    }

    /// Look up a single path segment: a map key, or a list index (as a
    /// decimal string). Returns `None` if the segment doesn't apply to this
    /// node's shape or is out of range.
    pub fn get(&self, segment: &str) -> Option<&Content> {
        match self {
            Content::Map(map) => map.get(segment),
            Content::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            Content::Scalar(_) => None,
        }
    }

    /// Walk a `/`-separated path of segments, e.g. `"author/name"` or
    /// `"tags/0"`.
    pub fn get_path(&self, path: &str) -> Option<&Content> {
        let mut node = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = node.get(segment)?;
        }
        Some(node)
    }

    /// Set a field on a map node in place. No-op (returns `false`) if `self`
    /// is not a map.
    pub fn set(&mut self, key: impl Into<String>, value: Content) -> bool {
        match self {
            Content::Map(map) => {
                map.insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Remove a field from a map node in place. Returns the removed value,
    /// if any.
    pub fn delete_field(&mut self, key: &str) -> Option<Content> {
        match self {
            Content::Map(map) => map.remove(key),
            _ => None,
        }
    }

    /// Serialize to a UTF-8 JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a UTF-8 JSON string into a `Content` tree.
    pub fn from_json(text: &str) -> serde_json::Result<Content> {
        serde_json::from_str(text)
    }
}

impl From<JsonValue> for Content {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Content::Scalar(Scalar::Null),
            JsonValue::Bool(b) => Content::Scalar(Scalar::Bool(b)),
            JsonValue::Number(n) => Content::Scalar(Scalar::Number(n)),
            JsonValue::String(s) => Content::Scalar(Scalar::String(s)),
            JsonValue::Array(items) => Content::List(items.into_iter().map(Content::from).collect()),
            JsonValue::Object(map) => {
                Content::Map(map.into_iter().map(|(k, v)| (k, Content::from(v))).collect())
            }
        }
    }
}

impl From<Content> for JsonValue {
    fn from(content: Content) -> Self {
        match content {
            Content::Scalar(Scalar::Null) => JsonValue::Null,
            Content::Scalar(Scalar::Bool(b)) => JsonValue::Bool(b),
            Content::Scalar(Scalar::Number(n)) => JsonValue::Number(n),
            Content::Scalar(Scalar::String(s)) => JsonValue::String(s),
            Content::List(items) => JsonValue::Array(items.into_iter().map(JsonValue::from).collect()),
            Content::Map(map) => {
                JsonValue::Object(map.into_iter().map(|(k, v)| (k, JsonValue::from(v))).collect())
            }
        }
    }
}

/// A thin facade over an owned [`Content`] value.
///
/// Where a dynamically typed implementation would let callers poke at
/// content through open-ended attribute access, this forwards a small,
/// enumerated set of operations instead: `get`, `set`, `delete_field`,
/// `to_json`, `from_json`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentItem(Content);

impl ContentItem {
    pub fn new(content: Content) -> Self {
        Self(content)
    }

    pub fn get(&self, path: &str) -> Option<&Content> {
        self.0.get_path(path)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Content) -> bool {
        self.0.set(key, value)
    }

    pub fn delete_field(&mut self, key: &str) -> Option<Content> {
        self.0.delete_field(key)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        self.0.to_json()
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        Ok(Self(Content::from_json(text)?))
    }

    pub fn into_content(self) -> Content {
        self.0
    }

    pub fn as_content(&self) -> &Content {
        &self.0
    }
}

impl From<Content> for ContentItem {
    fn from(content: Content) -> Self {
        Self(content)
    }
}

impl From<ContentItem> for Content {
    fn from(item: ContentItem) -> Self {
        item.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Content {
        Content::from_json(r#"{"title":"hi","tags":["a","b"],"meta":{"n":1,"ok":true,"nil":null}}"#)
            .unwrap()
    }

    #[test]
    fn round_trip() {
        let c = sample();
        let json = c.to_json().unwrap();
        let back = Content::from_json(&json).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn round_trip_scalars_and_empty_containers() {
        for c in [
            Content::null(),
            Content::Scalar(Scalar::Bool(false)),
            Content::Scalar(Scalar::String(String::new())),
            Content::list(),
            Content::map(),
        ] {
            let json = c.to_json().unwrap();
            assert_eq!(Content::from_json(&json).unwrap(), c);
        }
    }

    #[test]
    fn get_path_navigates_maps_and_lists() {
        let c = sample();
        assert_eq!(
            c.get_path("title"),
            Some(&Content::Scalar(Scalar::String("hi".into())))
        );
        assert_eq!(
            c.get_path("tags/1"),
            Some(&Content::Scalar(Scalar::String("b".into())))
        );
        assert_eq!(
            c.get_path("meta/n"),
            Some(&Content::Scalar(Scalar::Number(1.into())))
        );
        assert_eq!(c.get_path("tags/99"), None);
        assert_eq!(c.get_path("nonexistent"), None);
    }

    #[test]
    fn content_item_forwards_mutations() {
        let mut item = ContentItem::new(Content::map());
        assert!(item.set("title", Content::Scalar(Scalar::String("x".into()))));
        assert_eq!(
            item.get("title"),
            Some(&Content::Scalar(Scalar::String("x".into())))
        );
        let removed = item.delete_field("title");
        assert!(removed.is_some());
        assert_eq!(item.get("title"), None);
    }

    #[test]
    fn set_and_delete_are_no_ops_on_non_map() {
        let mut item = ContentItem::new(Content::list());
        assert!(!item.set("k", Content::null()));
        assert_eq!(item.delete_field("k"), None);
    }
}
