//! Collection types.
//!
//! Collections are named folders of items, nestable into a tree. The API
//! encodes a missing parent as the JSON literal `false` rather than `null`,
//! which [`ParentCollection`] absorbs on both ends.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A collection as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Collection {
  /// Unique eight-character collection key.
  pub key:     String,
  /// Server-side version number.
  #[serde(default)]
  pub version: u64,
  /// Read-only counts supplied by the server.
  #[serde(default)]
  pub meta:    CollectionMeta,
  /// The editable collection fields.
  pub data:    CollectionData,
}

/// Server-computed collection counts.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CollectionMeta {
  /// Number of items directly in the collection.
  #[serde(rename = "numItems", default)]
  pub num_items:       u64,
  /// Number of immediate subcollections.
  #[serde(rename = "numCollections", default)]
  pub num_collections: u64,
}

/// Editable fields of a collection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CollectionData {
  /// Collection key, duplicated inside `data` on reads.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub key: Option<String>,

  /// Collection version, duplicated inside `data` on reads.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<u64>,

  /// Display name.
  #[serde(default)]
  pub name: String,

  /// Parent collection key, or `false` on the wire for top-level
  /// collections.
  #[serde(rename = "parentCollection", default)]
  pub parent: ParentCollection,
}

/// Parent slot of a collection: a key, or none (serialized as `false`).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ParentCollection {
  /// Top-level collection.
  #[default]
  None,
  /// Nested under the collection with this key.
  Key(String),
}

impl ParentCollection {
  /// The parent key, if nested.
  pub fn key(&self) -> Option<&str> {
    match self {
      ParentCollection::None => None,
      ParentCollection::Key(key) => Some(key),
    }
  }
}

impl Serialize for ParentCollection {
  fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
    match self {
      ParentCollection::None => serializer.serialize_bool(false),
      ParentCollection::Key(key) => serializer.serialize_str(key),
    }
  }
}

impl<'de> Deserialize<'de> for ParentCollection {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
    match Value::deserialize(deserializer)? {
      Value::String(key) if !key.is_empty() => Ok(ParentCollection::Key(key)),
      _ => Ok(ParentCollection::None),
    }
  }
}

impl Collection {
  /// Whether the collection sits at the top of the tree.
  pub fn is_top_level(&self) -> bool { self.data.parent == ParentCollection::None }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parent_false_and_key() {
    let json = r#"{"key":"AAAAAAAA","version":3,"data":{"name":"Papers","parentCollection":false}}"#;
    let c: Collection = serde_json::from_str(json).unwrap();
    assert!(c.is_top_level());

    let json =
      r#"{"key":"BBBBBBBB","version":3,"data":{"name":"Sub","parentCollection":"AAAAAAAA"}}"#;
    let c: Collection = serde_json::from_str(json).unwrap();
    assert_eq!(c.data.parent.key(), Some("AAAAAAAA"));
  }

  #[test]
  fn parent_serializes_as_false_when_absent() {
    let data = CollectionData { name: "Top".to_string(), ..Default::default() };
    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["parentCollection"], false);
  }
}
