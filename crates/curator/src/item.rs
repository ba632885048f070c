//! Core item types mirroring the reference manager's JSON wire format.
//!
//! An item is the unit of storage: a bibliographic record, an attachment, or
//! a note. The API wraps the editable fields in a `data` object alongside a
//! `key` and `version`; writes must echo the version back so the server can
//! enforce last-write-wins.
//!
//! [`ItemData`] keeps the fields this crate manipulates as typed members and
//! funnels everything else into `extra_fields`, so items round-trip through
//! edit operations without losing fields we don't model.
//!
//! # Examples
//!
//! ```
//! use curator::item::{Creator, ItemData};
//!
//! let mut draft = ItemData::new("journalArticle");
//! draft.title = Some("A Study of Studies".to_string());
//! draft.creators.push(Creator::author("Alice", "Researcher"));
//! assert_eq!(draft.creators[0].display_name(), "Researcher, Alice");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A library item as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Item {
  /// Unique eight-character item key.
  pub key:     String,
  /// Server-side version number, incremented on every write.
  #[serde(default)]
  pub version: u64,
  /// The editable item fields.
  pub data:    ItemData,
}

/// Editable fields of an item.
///
/// Field names are serialized in the API's camelCase (and upper-case for the
/// identifier fields). Unmodeled fields survive in `extra_fields`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItemData {
  /// Item key, duplicated inside `data` by the API on reads.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub key: Option<String>,

  /// Item version, duplicated inside `data` by the API on reads.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<u64>,

  /// Item type, e.g. `journalArticle`, `book`, `attachment`, `note`.
  #[serde(rename = "itemType", default)]
  pub item_type: String,

  /// Full title.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,

  /// Abstract or summary text.
  #[serde(rename = "abstractNote", default, skip_serializing_if = "Option::is_none")]
  pub abstract_note: Option<String>,

  /// Journal or other container title.
  #[serde(rename = "publicationTitle", default, skip_serializing_if = "Option::is_none")]
  pub publication_title: Option<String>,

  /// Publication date, free-form but usually starting with a 4-digit year.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date: Option<String>,

  /// Volume number.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub volume: Option<String>,

  /// Issue number.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub issue: Option<String>,

  /// Page range.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pages: Option<String>,

  /// Publisher name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub publisher: Option<String>,

  /// Place of publication.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub place: Option<String>,

  /// Edition.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub edition: Option<String>,

  /// Series name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub series: Option<String>,

  /// Language code.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub language: Option<String>,

  /// Digital Object Identifier.
  #[serde(rename = "DOI", default, skip_serializing_if = "Option::is_none")]
  pub doi: Option<String>,

  /// International Standard Book Number.
  #[serde(rename = "ISBN", default, skip_serializing_if = "Option::is_none")]
  pub isbn: Option<String>,

  /// International Standard Serial Number.
  #[serde(rename = "ISSN", default, skip_serializing_if = "Option::is_none")]
  pub issn: Option<String>,

  /// Canonical URL.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,

  /// Free-form extra field (one entry per line by convention).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub extra: Option<String>,

  /// Thesis type, for `thesis` items.
  #[serde(rename = "thesisType", default, skip_serializing_if = "Option::is_none")]
  pub thesis_type: Option<String>,

  /// Report type, for `report` items.
  #[serde(rename = "reportType", default, skip_serializing_if = "Option::is_none")]
  pub report_type: Option<String>,

  /// Archive identifier, e.g. an arXiv id on preprints.
  #[serde(rename = "archiveID", default, skip_serializing_if = "Option::is_none")]
  pub archive_id: Option<String>,

  /// Note content (HTML), for `note` items.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note: Option<String>,

  /// Parent item key, for attachments and child notes.
  #[serde(rename = "parentItem", default, skip_serializing_if = "Option::is_none")]
  pub parent_item: Option<String>,

  /// Attachment link mode: `imported_file`, `linked_file`, `linked_url`, …
  #[serde(rename = "linkMode", default, skip_serializing_if = "Option::is_none")]
  pub link_mode: Option<String>,

  /// Attachment MIME type.
  #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
  pub content_type: Option<String>,

  /// Attachment filename.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub filename: Option<String>,

  /// MD5 of the stored file, hex-encoded.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub md5: Option<String>,

  /// File modification time in milliseconds since the epoch.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mtime: Option<i64>,

  /// Creators (authors, editors, …).
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub creators: Vec<Creator>,

  /// Tags attached to the item.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<Tag>,

  /// Keys of collections containing the item.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub collections: Vec<String>,

  /// Item relations, keyed by predicate (`dc:relation`, …).
  #[serde(default, skip_serializing_if = "Relations::is_empty")]
  pub relations: Relations,

  /// Timestamp the item was added, set by the server.
  #[serde(rename = "dateAdded", default, skip_serializing_if = "Option::is_none")]
  pub date_added: Option<String>,

  /// Timestamp the item was last modified, set by the server.
  #[serde(rename = "dateModified", default, skip_serializing_if = "Option::is_none")]
  pub date_modified: Option<String>,

  /// Everything the API sent that this struct doesn't model.
  #[serde(flatten)]
  pub extra_fields: BTreeMap<String, Value>,
}

/// A single creator entry.
///
/// Most creators have split first/last names; institutional creators come
/// back as a single `name` field instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Creator {
  /// Role: `author`, `editor`, `translator`, …
  #[serde(rename = "creatorType", default)]
  pub creator_type: String,
  /// Given name.
  #[serde(rename = "firstName", default, skip_serializing_if = "Option::is_none")]
  pub first_name:   Option<String>,
  /// Family name.
  #[serde(rename = "lastName", default, skip_serializing_if = "Option::is_none")]
  pub last_name:    Option<String>,
  /// Single-field name for institutional creators.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:         Option<String>,
}

impl Creator {
  /// Creates an author with split names.
  pub fn author(first: &str, last: &str) -> Self {
    Self {
      creator_type: "author".to_string(),
      first_name:   Some(first.to_string()),
      last_name:    Some(last.to_string()),
      name:         None,
    }
  }

  /// Formats the creator as `Last, First`, falling back to whichever parts
  /// exist.
  pub fn display_name(&self) -> String {
    if let Some(name) = &self.name {
      return name.clone();
    }
    match (self.last_name.as_deref(), self.first_name.as_deref()) {
      (Some(last), Some(first)) if !first.is_empty() => format!("{last}, {first}"),
      (Some(last), _) => last.to_string(),
      (None, Some(first)) => first.to_string(),
      (None, None) => String::new(),
    }
  }

  /// Formats the creator as `First Last`.
  pub fn full_name(&self) -> String {
    if let Some(name) = &self.name {
      return name.clone();
    }
    match (self.first_name.as_deref(), self.last_name.as_deref()) {
      (Some(first), Some(last)) if !first.is_empty() => format!("{first} {last}"),
      (_, Some(last)) => last.to_string(),
      (Some(first), None) => first.to_string(),
      (None, None) => String::new(),
    }
  }

  /// Splits a free-form `First Last` or `Last, First` name into a creator.
  pub fn from_name(name: &str, creator_type: &str) -> Option<Self> {
    let name = name.trim();
    if name.is_empty() {
      return None;
    }
    let (first, last) = if let Some((last, first)) = name.split_once(',') {
      (first.trim().to_string(), last.trim().to_string())
    } else if let Some((first, last)) = name.split_once(' ') {
      (first.trim().to_string(), last.trim().to_string())
    } else {
      (String::new(), name.to_string())
    };
    Some(Self {
      creator_type: creator_type.to_string(),
      first_name:   (!first.is_empty()).then_some(first),
      last_name:    Some(last),
      name:         None,
    })
  }
}

/// A tag entry. `type` 0 is a manual tag, 1 an automatic one.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Tag {
  /// The tag text.
  pub tag:  String,
  /// Manual (0) or automatic (1).
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<u8>,
}

impl Tag {
  /// Creates a manual tag.
  pub fn new(tag: impl Into<String>) -> Self { Self { tag: tag.into(), kind: None } }
}

/// Item relations, keyed by predicate.
///
/// The API emits a bare string when a predicate has a single target and an
/// array otherwise; deserialization normalizes both to lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relations(pub BTreeMap<String, Vec<String>>);

impl Relations {
  /// Whether there are no relations at all.
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Targets for a predicate, empty if absent.
  pub fn get(&self, predicate: &str) -> &[String] {
    self.0.get(predicate).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Adds a target under a predicate, ignoring duplicates. Returns whether
  /// anything changed.
  pub fn add(&mut self, predicate: &str, target: &str) -> bool {
    let targets = self.0.entry(predicate.to_string()).or_default();
    if targets.iter().any(|t| t == target) {
      false
    } else {
      targets.push(target.to_string());
      true
    }
  }

  /// Merges all relations from `other` into `self`, skipping targets already
  /// present. Returns the number of targets actually added.
  pub fn merge_from(&mut self, other: &Relations) -> usize {
    let mut added = 0;
    for (predicate, targets) in &other.0 {
      for target in targets {
        if self.add(predicate, target) {
          added += 1;
        }
      }
    }
    added
  }
}

impl Serialize for Relations {
  fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
    self.0.serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for Relations {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
    let raw: BTreeMap<String, Value> = BTreeMap::deserialize(deserializer)?;
    let mut map = BTreeMap::new();
    for (predicate, value) in raw {
      let targets = match value {
        Value::String(s) => vec![s],
        Value::Array(values) =>
          values.into_iter().filter_map(|v| v.as_str().map(String::from)).collect(),
        _ => Vec::new(),
      };
      map.insert(predicate, targets);
    }
    Ok(Relations(map))
  }
}

/// Envelope returned by batched write endpoints.
///
/// Indices are stringified positions into the submitted array. `successful`
/// carries full items; older response shapes put bare keys (or key-bearing
/// objects) under `success`, so [`WriteResponse::created_keys`] checks both.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WriteResponse {
  /// Index → created/updated key (string or key-bearing object).
  #[serde(default)]
  pub success:    BTreeMap<String, Value>,
  /// Index → full item.
  #[serde(default)]
  pub successful: BTreeMap<String, Item>,
  /// Index → key of items the write left untouched.
  #[serde(default)]
  pub unchanged:  BTreeMap<String, Value>,
  /// Index → failure details.
  #[serde(default)]
  pub failed:     BTreeMap<String, WriteFailure>,
}

/// Failure details for one entry of a batched write.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WriteFailure {
  /// HTTP-style error code.
  #[serde(default)]
  pub code:    u64,
  /// Human-readable message.
  #[serde(default)]
  pub message: String,
}

impl WriteResponse {
  /// Keys of everything the write created, in submission order.
  pub fn created_keys(&self) -> Vec<String> {
    let mut indexed: Vec<(usize, String)> = self
      .successful
      .iter()
      .map(|(index, item)| (index.parse().unwrap_or(usize::MAX), item.key.clone()))
      .collect();
    if indexed.is_empty() {
      indexed = self
        .success
        .iter()
        .filter_map(|(index, value)| {
          let key = match value {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("key").and_then(|k| k.as_str()).map(String::from),
            _ => None,
          };
          key.map(|k| (index.parse().unwrap_or(usize::MAX), k))
        })
        .collect();
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, key)| key).collect()
  }

  /// Whether every submitted entry succeeded.
  pub fn all_succeeded(&self) -> bool { self.failed.is_empty() }
}

impl Item {
  /// Whether this item is an attachment.
  pub fn is_attachment(&self) -> bool { self.data.item_type == "attachment" }

  /// Whether this item is a note.
  pub fn is_note(&self) -> bool { self.data.item_type == "note" }

  /// Whether this item is an attachment holding a PDF.
  pub fn is_pdf_attachment(&self) -> bool {
    self.is_attachment() && self.data.content_type.as_deref() == Some("application/pdf")
  }

  /// Tag strings in their stored order.
  pub fn tag_names(&self) -> Vec<&str> { self.data.tags.iter().map(|t| t.tag.as_str()).collect() }

  /// Publication year parsed from the leading 4 digits of `date`.
  pub fn year(&self) -> Option<i32> {
    let date = self.data.date.as_deref()?;
    date.get(..4)?.parse().ok()
  }
}

impl ItemData {
  /// Creates an empty draft of the given type.
  pub fn new(item_type: &str) -> Self {
    Self { item_type: item_type.to_string(), ..Self::default() }
  }

  /// Strips server-managed fields so the data can be resubmitted as a new
  /// item. The API mints a fresh key for drafts without one.
  pub fn as_draft(&self) -> Self {
    let mut draft = self.clone();
    draft.key = None;
    draft.version = None;
    draft.date_added = None;
    draft.date_modified = None;
    draft
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn relations_accept_string_or_list() {
    let json = r#"{
      "dc:relation": "http://zotero.org/users/0/items/AAAAAAAA",
      "dc:relation:cites": ["a", "b"]
    }"#;
    let relations: Relations = serde_json::from_str(json).unwrap();
    assert_eq!(relations.get("dc:relation").len(), 1);
    assert_eq!(relations.get("dc:relation:cites"), ["a", "b"]);
    assert!(relations.get("owl:sameAs").is_empty());
  }

  #[test]
  fn relations_merge_deduplicates() {
    let mut left = Relations::default();
    left.add("dc:relation:cites", "a");
    let mut right = Relations::default();
    right.add("dc:relation:cites", "a");
    right.add("dc:relation:cites", "b");
    assert_eq!(left.merge_from(&right), 1);
    assert_eq!(left.get("dc:relation:cites"), ["a", "b"]);
  }

  #[test]
  fn unknown_fields_round_trip() {
    let json = r#"{"itemType":"journalArticle","title":"T","numPages":"12"}"#;
    let data: ItemData = serde_json::from_str(json).unwrap();
    assert_eq!(data.extra_fields.get("numPages").and_then(|v| v.as_str()), Some("12"));
    let back = serde_json::to_value(&data).unwrap();
    assert_eq!(back["numPages"], "12");
  }

  #[test]
  fn creator_name_parsing() {
    let c = Creator::from_name("Smith, John", "author").unwrap();
    assert_eq!(c.first_name.as_deref(), Some("John"));
    assert_eq!(c.last_name.as_deref(), Some("Smith"));

    let c = Creator::from_name("Ada Lovelace", "author").unwrap();
    assert_eq!(c.display_name(), "Lovelace, Ada");

    let c = Creator::from_name("Aristotle", "author").unwrap();
    assert_eq!(c.first_name, None);
    assert_eq!(c.display_name(), "Aristotle");

    assert!(Creator::from_name("  ", "author").is_none());
  }

  #[test]
  fn write_response_key_extraction() {
    let json = r#"{"success":{"1":"BBBBBBBB","0":"AAAAAAAA"},"failed":{}}"#;
    let response: WriteResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.created_keys(), ["AAAAAAAA", "BBBBBBBB"]);
    assert!(response.all_succeeded());

    let json = r#"{"successful":{"0":{"key":"CCCCCCCC","version":1,"data":{"itemType":"book"}}}}"#;
    let response: WriteResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.created_keys(), ["CCCCCCCC"]);
  }

  #[test]
  fn pdf_attachment_predicate() {
    let mut item = Item::default();
    item.data.item_type = "attachment".to_string();
    item.data.content_type = Some("application/pdf".to_string());
    assert!(item.is_pdf_attachment());
    item.data.content_type = Some("text/html".to_string());
    assert!(!item.is_pdf_attachment());
  }
}
