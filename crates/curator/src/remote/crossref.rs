//! CrossRef works lookup by DOI.
//!
//! CrossRef's JSON wraps the record in `{"status": "ok", "message": {…}}`;
//! dates come as nested `date-parts` arrays and most scalar fields as
//! one-element lists. The mapping here mirrors that tolerance: missing
//! fields degrade to absent item fields, never to errors.

use async_trait::async_trait;
use serde::Deserialize;

use super::MetadataSource;
use crate::{error::CuratorError, item::{Creator, ItemData}, prelude::*};

/// CrossRef REST API endpoint.
const API_BASE: &str = "https://api.crossref.org/works";

/// CrossRef metadata source.
pub struct CrossRef {
  /// HTTP client with the remote timeout applied.
  client: reqwest::Client,
}

/// Top-level CrossRef response.
#[derive(Debug, Deserialize)]
struct Envelope {
  /// `"ok"` on success.
  status:  String,
  /// The work record.
  message: Work,
}

/// A CrossRef work record, reduced to the fields we map.
#[derive(Debug, Deserialize, Default)]
pub(crate) struct Work {
  /// CrossRef work type, e.g. `journal-article`.
  #[serde(rename = "type", default)]
  kind: String,

  /// Titles; the first is the main title.
  #[serde(default)]
  title: Vec<String>,

  /// Authors with split given/family names.
  #[serde(default)]
  author: Vec<WorkAuthor>,

  /// Print publication date.
  #[serde(rename = "published-print")]
  published_print: Option<WorkDate>,

  /// Online publication date.
  #[serde(rename = "published-online")]
  published_online: Option<WorkDate>,

  /// Deposit date, the fallback when no publication date exists.
  created: Option<WorkDate>,

  /// Container (journal/book) titles.
  #[serde(rename = "container-title", default)]
  container_title: Vec<String>,

  /// Volume.
  volume: Option<String>,

  /// Issue.
  issue: Option<String>,

  /// Page range.
  page: Option<String>,

  /// Publisher.
  publisher: Option<String>,

  /// ISBNs.
  #[serde(rename = "ISBN", default)]
  isbn: Vec<String>,

  /// ISSNs.
  #[serde(rename = "ISSN", default)]
  issn: Vec<String>,

  /// Abstract, often JATS-flavored XML.
  #[serde(rename = "abstract")]
  abstract_text: Option<String>,

  /// Canonical URL.
  #[serde(rename = "URL")]
  url: Option<String>,
}

/// One author entry of a work.
#[derive(Debug, Deserialize, Default)]
struct WorkAuthor {
  /// Given name.
  given:  Option<String>,
  /// Family name.
  family: Option<String>,
}

/// A CrossRef date: `[[year, month, day]]` with trailing parts optional.
#[derive(Debug, Deserialize, Default)]
struct WorkDate {
  /// The nested date parts.
  #[serde(rename = "date-parts", default)]
  date_parts: Vec<Vec<Option<u32>>>,
}

impl WorkDate {
  /// Formats as `YYYY`, `YYYY-MM`, or `YYYY-MM-DD` depending on how many
  /// parts are present.
  fn format(&self) -> Option<String> {
    let parts = self.date_parts.first()?;
    let year = (*parts.first()?)?;
    match (parts.get(1).copied().flatten(), parts.get(2).copied().flatten()) {
      (Some(month), Some(day)) => Some(format!("{year}-{month:02}-{day:02}")),
      (Some(month), None) => Some(format!("{year}-{month:02}")),
      _ => Some(year.to_string()),
    }
  }
}

/// CrossRef work type → item type. Unknown types default to
/// `journalArticle`, CrossRef's overwhelmingly common case.
fn item_type_for(kind: &str) -> &'static str {
  match kind {
    "journal-article" | "journal-issue" => "journalArticle",
    "book" => "book",
    "book-chapter" | "book-part" | "book-section" => "bookSection",
    "proceedings-article" | "proceedings" => "conferencePaper",
    "dissertation" | "thesis" => "thesis",
    "report" | "report-series" => "report",
    "dataset" | "component" | "entry" | "reference-entry" => "document",
    _ => "journalArticle",
  }
}

/// Maps a work record onto an item draft.
pub(crate) fn work_to_item(work: Work, doi: &str) -> ItemData {
  let mut draft = ItemData::new(item_type_for(&work.kind));
  draft.title = work.title.into_iter().next();
  draft.doi = Some(doi.to_string());

  draft.creators = work
    .author
    .into_iter()
    .filter(|a| a.given.is_some() || a.family.is_some())
    .map(|a| Creator {
      creator_type: "author".to_string(),
      first_name:   a.given,
      last_name:    a.family,
      name:         None,
    })
    .collect();

  draft.date = work
    .published_print
    .as_ref()
    .or(work.published_online.as_ref())
    .or(work.created.as_ref())
    .and_then(WorkDate::format);

  draft.publication_title = work.container_title.into_iter().next();
  draft.volume = work.volume;
  draft.issue = work.issue;
  draft.pages = work.page;
  draft.publisher = work.publisher;
  draft.isbn = work.isbn.into_iter().next();
  draft.issn = work.issn.into_iter().next();
  draft.abstract_note = work.abstract_text;
  draft.url = work.url;
  draft
}

impl CrossRef {
  /// Creates the source with a fresh HTTP client.
  pub fn new() -> Result<Self> { Ok(Self { client: super::remote_client()? }) }
}

#[async_trait]
impl MetadataSource for CrossRef {
  fn name(&self) -> &'static str { "crossref" }

  async fn fetch(&self, doi: &str) -> Result<ItemData> {
    let url = format!("{API_BASE}/{doi}");
    let response = self.client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(CuratorError::Api {
        status:  status.as_u16(),
        message: format!("CrossRef lookup failed for {doi}"),
      });
    }
    let envelope: Envelope = response.json().await?;
    if envelope.status != "ok" {
      return Err(CuratorError::Api {
        status:  0,
        message: format!("CrossRef returned status {}", envelope.status),
      });
    }
    Ok(work_to_item(envelope.message, doi))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn maps_journal_article() {
    let json = r#"{
      "status": "ok",
      "message": {
        "type": "journal-article",
        "title": ["MapReduce: Simplified Data Processing on Large Clusters"],
        "author": [
          {"given": "Jeffrey", "family": "Dean"},
          {"given": "Sanjay", "family": "Ghemawat"}
        ],
        "published-print": {"date-parts": [[2008, 1]]},
        "container-title": ["Communications of the ACM"],
        "volume": "51",
        "issue": "1",
        "page": "107-113",
        "ISSN": ["0001-0782"],
        "URL": "https://doi.org/10.1145/1327452.1327492"
      }
    }"#;
    let envelope: Envelope = serde_json::from_str(json).unwrap();
    let draft = work_to_item(envelope.message, "10.1145/1327452.1327492");

    assert_eq!(draft.item_type, "journalArticle");
    assert_eq!(draft.date.as_deref(), Some("2008-01"));
    assert_eq!(draft.creators.len(), 2);
    assert_eq!(draft.creators[0].last_name.as_deref(), Some("Dean"));
    assert_eq!(draft.publication_title.as_deref(), Some("Communications of the ACM"));
    assert_eq!(draft.issn.as_deref(), Some("0001-0782"));
  }

  #[test]
  fn date_parts_variants() {
    let full = WorkDate { date_parts: vec![vec![Some(2021), Some(3), Some(9)]] };
    assert_eq!(full.format().as_deref(), Some("2021-03-09"));
    let year_only = WorkDate { date_parts: vec![vec![Some(2021)]] };
    assert_eq!(year_only.format().as_deref(), Some("2021"));
    let empty = WorkDate::default();
    assert_eq!(empty.format(), None);
  }

  #[test]
  fn unknown_kind_defaults_to_article() {
    let work = Work { kind: "peer-review".to_string(), ..Default::default() };
    assert_eq!(work_to_item(work, "10.1/x").item_type, "journalArticle");
  }
}
