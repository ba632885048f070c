//! BibTeX conversion, in both directions.
//!
//! [`render`] turns items into BibTeX entries using the item key as the
//! citation key. [`parse`] goes the other way, turning BibTeX source into
//! item drafts ready for [`Library::create_items`]; the original citation
//! key is preserved in the `extra` field as a `Citekey:` line.
//!
//! Parsing is delegated to [`biblatex`], which handles brace nesting,
//! string concatenation, and name splitting far beyond what a regex would.
//!
//! [`Library::create_items`]: crate::client::Library::create_items

use std::collections::HashMap;

use biblatex::{Bibliography, ChunksExt};
use tracing::{debug, warn};

use crate::{
  item::{Creator, Item, ItemData, Tag},
  prelude::*,
};

/// Item type → BibTeX entry type.
fn bibtex_type_for(item_type: &str) -> &'static str {
  match item_type {
    "journalArticle" | "magazineArticle" | "newspaperArticle" => "article",
    "book" => "book",
    "bookSection" => "incollection",
    "conferencePaper" => "inproceedings",
    "thesis" => "phdthesis",
    "report" => "techreport",
    "manuscript" | "preprint" => "unpublished",
    _ => "misc",
  }
}

/// BibTeX entry type → item type.
fn item_type_for(entry_type: &str) -> &'static str {
  match entry_type {
    "article" => "journalArticle",
    "book" => "book",
    "inbook" | "incollection" => "bookSection",
    "inproceedings" | "proceedings" | "conference" => "conferencePaper",
    "phdthesis" | "mastersthesis" | "thesis" => "thesis",
    "techreport" | "report" => "report",
    "unpublished" => "manuscript",
    "online" | "webpage" => "webpage",
    _ => "document",
  }
}

/// Month names and abbreviations, normalized to two-digit numbers.
fn month_number(month: &str) -> Option<&'static str> {
  match month.to_lowercase().as_str() {
    "jan" | "january" | "1" => Some("01"),
    "feb" | "february" | "2" => Some("02"),
    "mar" | "march" | "3" => Some("03"),
    "apr" | "april" | "4" => Some("04"),
    "may" | "5" => Some("05"),
    "jun" | "june" | "6" => Some("06"),
    "jul" | "july" | "7" => Some("07"),
    "aug" | "august" | "8" => Some("08"),
    "sep" | "september" | "9" => Some("09"),
    "oct" | "october" | "10" => Some("10"),
    "nov" | "november" | "11" => Some("11"),
    "dec" | "december" | "12" => Some("12"),
    _ => None,
  }
}

/// Escapes braces, which delimit values in BibTeX.
fn escape_braces(value: &str) -> String { value.replace('{', "\\{").replace('}', "\\}") }

/// Renders one item as a BibTeX entry.
///
/// `first_note` becomes an `annote` field, HTML stripped.
pub fn render_entry(item: &Item, first_note: Option<&str>) -> String {
  let data = &item.data;
  let mut fields: Vec<String> = Vec::new();
  let mut push = |name: &str, value: &str| {
    if !value.is_empty() {
      fields.push(format!("  {name} = {{{value}}}"));
    }
  };

  let authors: Vec<String> = data
    .creators
    .iter()
    .filter(|c| c.creator_type == "author")
    .map(Creator::display_name)
    .filter(|n| !n.is_empty())
    .collect();
  push("author", &authors.join(" and "));
  push("title", data.title.as_deref().unwrap_or_default());
  push("journal", data.publication_title.as_deref().unwrap_or_default());
  if let Some(date) = data.date.as_deref() {
    push("year", date.get(..4).unwrap_or(date));
  }
  push("volume", data.volume.as_deref().unwrap_or_default());
  push("number", data.issue.as_deref().unwrap_or_default());
  push("pages", data.pages.as_deref().unwrap_or_default());
  push("publisher", data.publisher.as_deref().unwrap_or_default());
  push("address", data.place.as_deref().unwrap_or_default());
  push("doi", data.doi.as_deref().unwrap_or_default());
  push("url", data.url.as_deref().unwrap_or_default());
  if let Some(abstract_note) = data.abstract_note.as_deref() {
    push("abstract", &escape_braces(abstract_note));
  }
  if let Some(kind) = data.thesis_type.as_deref().or(data.report_type.as_deref()) {
    push("type", kind);
  }
  push("isbn", data.isbn.as_deref().unwrap_or_default());
  push("issn", data.issn.as_deref().unwrap_or_default());
  push("series", data.series.as_deref().unwrap_or_default());
  push("edition", data.edition.as_deref().unwrap_or_default());
  let keywords: Vec<&str> =
    data.tags.iter().map(|t| t.tag.as_str()).filter(|t| !t.is_empty()).collect();
  push("keywords", &keywords.join(", "));
  if let Some(note) = first_note {
    let plain = crate::client::notes::strip_html(note);
    push("annote", &escape_braces(plain.trim()));
  }

  format!("@{}{{{},\n{}\n}}", bibtex_type_for(&data.item_type), item.key, fields.join(",\n"))
}

/// Renders items as a BibTeX document.
///
/// `notes_by_parent` supplies the first note of each item for `annote`
/// fields; pass an empty map to skip notes.
pub fn render(items: &[Item], notes_by_parent: &HashMap<String, String>) -> String {
  let mut entries: Vec<String> = items
    .iter()
    .filter(|item| !item.is_attachment() && !item.is_note())
    .map(|item| render_entry(item, notes_by_parent.get(&item.key).map(String::as_str)))
    .collect();
  if entries.is_empty() {
    return String::new();
  }
  entries.push(String::new());
  entries.join("\n\n")
}

/// Parses BibTeX source into item drafts.
///
/// Unknown entry types become `document` items. Each draft carries its
/// citation key in `extra` so the import remains traceable to the source.
///
/// # Errors
///
/// Returns [`CuratorError::Bibtex`] when the source has no parsable
/// structure. Individually malformed fields are skipped, not fatal.
///
/// [`CuratorError::Bibtex`]: crate::error::CuratorError::Bibtex
pub fn parse(content: &str) -> Result<Vec<ItemData>> {
  let bibliography =
    Bibliography::parse(content).map_err(|e| crate::error::CuratorError::Bibtex(e.to_string()))?;
  let mut drafts = Vec::new();

  for entry in bibliography.iter() {
    let entry_type = entry.entry_type.to_string().to_lowercase();
    let mut draft = ItemData::new(item_type_for(&entry_type));

    let field = |name: &str| entry.get(name).map(|chunks| chunks.format_verbatim());

    draft.title = field("title");
    draft.publication_title =
      field("journal").or_else(|| field("journaltitle")).or_else(|| field("booktitle"));
    draft.volume = field("volume");
    draft.issue = field("number");
    draft.pages = field("pages");
    draft.publisher = field("publisher");
    draft.place = field("address").or_else(|| field("location"));
    draft.edition = field("edition");
    draft.series = field("series");
    draft.isbn = field("isbn");
    draft.issn = field("issn");
    draft.doi = field("doi");
    draft.url = field("url");
    draft.abstract_note = field("abstract");
    if draft.item_type == "thesis" {
      draft.thesis_type = field("type");
    }

    draft.date = field("date").or_else(|| field("year"));
    if let (Some(date), Some(month)) = (draft.date.clone(), field("month")) {
      // year-only dates gain the month when one is present
      if date.len() == 4 {
        if let Some(number) = month_number(month.trim()) {
          draft.date = Some(format!("{date}-{number}"));
        }
      }
    }

    for person in entry.author().unwrap_or_default() {
      draft.creators.push(person_to_creator(&person, "author"));
    }
    if let Some(editors) = field("editor") {
      for name in editors.split(" and ") {
        if let Some(creator) = Creator::from_name(name, "editor") {
          draft.creators.push(creator);
        }
      }
    }

    if let Some(keywords) = field("keywords") {
      draft.tags =
        keywords.split(',').map(str::trim).filter(|t| !t.is_empty()).map(Tag::new).collect();
    }

    let citekey_line = format!("Citekey: {}", entry.key);
    draft.extra = match field("note") {
      Some(note) if !note.is_empty() => Some(format!("{note}\n{citekey_line}")),
      _ => Some(citekey_line),
    };

    drafts.push(draft);
  }

  debug!(entries = drafts.len(), "parsed BibTeX source");
  Ok(drafts)
}

/// Converts a parsed BibTeX name to a creator.
fn person_to_creator(person: &biblatex::Person, creator_type: &str) -> Creator {
  let last = if person.prefix.is_empty() {
    person.name.clone()
  } else {
    format!("{} {}", person.prefix, person.name)
  };
  Creator {
    creator_type: creator_type.to_string(),
    first_name:   (!person.given_name.is_empty()).then(|| person.given_name.clone()),
    last_name:    Some(last),
    name:         None,
  }
}

impl crate::client::Library {
  /// Parses BibTeX source and creates an item per entry.
  ///
  /// Entries that fail to create are logged and skipped; the keys of
  /// successfully created items are returned in source order.
  pub async fn import_from_bibtex(&mut self, content: &str) -> Result<Vec<String>> {
    let drafts = parse(content)?;
    let mut created = Vec::new();
    for draft in drafts {
      let title = draft.title.clone().unwrap_or_default();
      match self.create_item(draft).await {
        Ok(key) => created.push(key),
        Err(error) => warn!(%title, %error, "skipping entry that failed to import"),
      }
    }
    Ok(created)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_article_entry() {
    let mut item = Item { key: "AAAAAAAA".to_string(), ..Default::default() };
    item.data.item_type = "journalArticle".to_string();
    item.data.title = Some("MapReduce".to_string());
    item.data.publication_title = Some("CACM".to_string());
    item.data.date = Some("2008-01".to_string());
    item.data.doi = Some("10.1145/1327452.1327492".to_string());
    item.data.creators.push(Creator::author("Jeffrey", "Dean"));
    item.data.creators.push(Creator::author("Sanjay", "Ghemawat"));

    let entry = render_entry(&item, None);
    assert!(entry.starts_with("@article{AAAAAAAA,"));
    assert!(entry.contains("author = {Dean, Jeffrey and Ghemawat, Sanjay}"));
    assert!(entry.contains("year = {2008}"));
    assert!(entry.contains("doi = {10.1145/1327452.1327492}"));
    assert!(entry.ends_with("\n}"));
  }

  #[test]
  fn thesis_maps_to_phdthesis() {
    let mut item = Item { key: "BBBBBBBB".to_string(), ..Default::default() };
    item.data.item_type = "thesis".to_string();
    item.data.title = Some("On Things".to_string());
    item.data.thesis_type = Some("Masters thesis".to_string());

    let entry = render_entry(&item, None);
    assert!(entry.starts_with("@phdthesis{"));
    assert!(entry.contains("type = {Masters thesis}"));
  }

  #[test]
  fn parses_article_round() {
    let source = r#"
      @article{dean2008,
        author  = {Dean, Jeffrey and Ghemawat, Sanjay},
        title   = {MapReduce: Simplified Data Processing},
        journal = {Communications of the ACM},
        year    = {2008},
        month   = {jan},
        volume  = {51},
        number  = {1},
        doi     = {10.1145/1327452.1327492},
        keywords = {distributed systems, databases}
      }
    "#;
    let drafts = parse(source).unwrap();
    assert_eq!(drafts.len(), 1);
    let draft = &drafts[0];
    assert_eq!(draft.item_type, "journalArticle");
    assert_eq!(draft.title.as_deref(), Some("MapReduce: Simplified Data Processing"));
    assert_eq!(draft.date.as_deref(), Some("2008-01"));
    assert_eq!(draft.issue.as_deref(), Some("1"));
    assert_eq!(draft.creators.len(), 2);
    assert_eq!(draft.creators[0].last_name.as_deref(), Some("Dean"));
    assert_eq!(draft.tags.len(), 2);
    assert_eq!(draft.extra.as_deref(), Some("Citekey: dean2008"));
  }

  #[test]
  fn unknown_entry_type_becomes_document() {
    let source = "@artwork{x1,\n  title = {A Sculpture}\n}";
    let drafts = parse(source).unwrap();
    assert_eq!(drafts[0].item_type, "document");
  }
}
