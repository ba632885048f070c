//! Open Library book lookup by ISBN.
//!
//! The edition record at `/isbn/{isbn}.json` references authors by key
//! only, so each author costs a second request. An author fetch that
//! fails is skipped rather than sinking the whole import.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use super::MetadataSource;
use crate::{error::CuratorError, item::{Creator, ItemData, Tag}, prelude::*};

/// Open Library host for edition and author records.
const API_BASE: &str = "https://openlibrary.org";

/// At most this many subjects become tags.
const MAX_SUBJECT_TAGS: usize = 10;

lazy_static! {
  /// Four-digit year inside a free-form `publish_date`.
  static ref YEAR: Regex = Regex::new(r"\d{4}").unwrap();
}

/// Open Library metadata source.
pub struct OpenLibrary {
  /// HTTP client with the remote timeout applied.
  client: reqwest::Client,
}

/// An edition record, reduced to the fields we map.
#[derive(Debug, Deserialize, Default)]
pub(crate) struct Edition {
  /// Book title.
  title: Option<String>,

  /// Author references (`{"key": "/authors/OL…A"}`).
  #[serde(default)]
  authors: Vec<AuthorRef>,

  /// Free-form publication date, e.g. `"March 1994"`.
  publish_date: Option<String>,

  /// Publishers; the first one wins.
  #[serde(default)]
  publishers: Vec<String>,

  /// Page count.
  number_of_pages: Option<u32>,

  /// Language references (`{"key": "/languages/eng"}`).
  #[serde(default)]
  languages: Vec<KeyRef>,

  /// Subject headings.
  #[serde(default)]
  subjects: Vec<String>,
}

/// An author reference. Some editions inline a `name` directly.
#[derive(Debug, Deserialize, Default)]
struct AuthorRef {
  /// Record key under `/authors/`.
  key:  Option<String>,
  /// Inline name, present on older records.
  name: Option<String>,
}

/// A bare `{"key": …}` reference.
#[derive(Debug, Deserialize, Default)]
struct KeyRef {
  /// Record path, e.g. `/languages/eng`.
  key: Option<String>,
}

/// An author record; only the name matters here.
#[derive(Debug, Deserialize)]
struct AuthorRecord {
  /// Display name.
  name: Option<String>,
}

/// Maps an edition onto a book draft, with author names already resolved.
pub(crate) fn edition_to_item(edition: Edition, isbn: &str, authors: Vec<String>) -> ItemData {
  let mut draft = ItemData::new("book");
  draft.title = edition.title;
  draft.isbn = Some(isbn.to_string());
  draft.creators = authors
    .iter()
    .filter_map(|name| Creator::from_name(name, "author"))
    .collect();
  draft.date = edition
    .publish_date
    .as_deref()
    .and_then(|d| YEAR.find(d))
    .map(|m| m.as_str().to_string());
  draft.publisher = edition.publishers.into_iter().next();
  if let Some(pages) = edition.number_of_pages {
    draft
      .extra_fields
      .insert("numPages".to_string(), serde_json::Value::String(pages.to_string()));
  }
  draft.language = edition
    .languages
    .into_iter()
    .next()
    .and_then(|l| l.key)
    .and_then(|k| k.rsplit('/').next().map(str::to_string));
  draft.tags = edition
    .subjects
    .into_iter()
    .take(MAX_SUBJECT_TAGS)
    .map(Tag::new)
    .collect();
  draft
}

impl OpenLibrary {
  /// Creates the source with a fresh HTTP client.
  pub fn new() -> Result<Self> { Ok(Self { client: super::remote_client()? }) }

  /// Resolves an author reference to a display name, following the
  /// `/authors/{key}.json` record when no inline name exists.
  async fn author_name(&self, author: &AuthorRef) -> Option<String> {
    if let Some(name) = &author.name {
      return Some(name.clone());
    }
    let key = author.key.as_deref()?;
    let url = format!("{API_BASE}{key}.json");
    match self.client.get(&url).send().await {
      Ok(response) => match response.json::<AuthorRecord>().await {
        Ok(record) => record.name,
        Err(e) => {
          warn!(key, error = %e, "skipping unreadable author record");
          None
        },
      },
      Err(e) => {
        warn!(key, error = %e, "skipping unreachable author record");
        None
      },
    }
  }
}

#[async_trait]
impl MetadataSource for OpenLibrary {
  fn name(&self) -> &'static str { "openlibrary" }

  async fn fetch(&self, isbn: &str) -> Result<ItemData> {
    let url = format!("{API_BASE}/isbn/{isbn}.json");
    let response = self.client.get(&url).send().await?;
    let status = response.status();
    if status.as_u16() == 404 {
      return Err(CuratorError::NotFound { kind: "book", key: isbn.to_string() });
    }
    if !status.is_success() {
      return Err(CuratorError::Api {
        status:  status.as_u16(),
        message: format!("Open Library lookup failed for {isbn}"),
      });
    }
    let edition: Edition = response.json().await?;

    let mut authors = Vec::new();
    for author in &edition.authors {
      if let Some(name) = self.author_name(author).await {
        authors.push(name);
      }
    }
    Ok(edition_to_item(edition, isbn, authors))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn maps_edition() {
    let json = r#"{
      "title": "Design Patterns",
      "authors": [{"key": "/authors/OL726679A"}],
      "publish_date": "March 1994",
      "publishers": ["Addison-Wesley"],
      "number_of_pages": 395,
      "languages": [{"key": "/languages/eng"}],
      "subjects": ["Object-oriented programming", "Software engineering"]
    }"#;
    let edition: Edition = serde_json::from_str(json).unwrap();
    let draft = edition_to_item(edition, "9780201633610", vec!["Erich Gamma".to_string()]);

    assert_eq!(draft.item_type, "book");
    assert_eq!(draft.title.as_deref(), Some("Design Patterns"));
    assert_eq!(draft.date.as_deref(), Some("1994"));
    assert_eq!(draft.publisher.as_deref(), Some("Addison-Wesley"));
    assert_eq!(draft.language.as_deref(), Some("eng"));
    assert_eq!(draft.creators[0].last_name.as_deref(), Some("Gamma"));
    assert_eq!(draft.tags.len(), 2);
  }

  #[test]
  fn caps_subject_tags() {
    let edition = Edition {
      subjects: (0..25).map(|i| format!("subject {i}")).collect(),
      ..Default::default()
    };
    let draft = edition_to_item(edition, "0000000000", Vec::new());
    assert_eq!(draft.tags.len(), MAX_SUBJECT_TAGS);
  }
}
