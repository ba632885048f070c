//! Read-side quality checks.
//!
//! Every audit is a pure function over a [`Snapshot`], with a matching
//! method on [`Library`] that fetches the snapshot and applies it. Audits
//! only look at top-level items; attachments and notes surface through
//! their parents (and through [`orphaned_attachments`] when they have no
//! parent to surface through).
//!
//! Audits never mutate anything. They return the offending items and leave
//! the decision of what to do with them to the caller.
//!
//! # Examples
//!
//! ```no_run
//! # use curator::{client::Library, configuration::Config, prelude::*};
//! # async fn example() -> Result<()> {
//! let mut library = Library::new(Config::default())?;
//! for item in library.items_without_abstract().await? {
//!   println!("missing abstract: {}", item.data.title.as_deref().unwrap_or("(untitled)"));
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::{
  client::{Library, Snapshot},
  collection::Collection,
  item::Item,
  prelude::*,
};

/// Title fragments that mark an item as a stub needing real metadata.
const PLACEHOLDER_TITLES: &[&str] = &["untitled", "[no title]", "todo", "tbd"];

lazy_static! {
  /// Collapses whitespace and hyphens when normalizing journal names.
  static ref JOURNAL_SEPARATORS: Regex = Regex::new(r"[\s\-]+").unwrap();
}

/// Whether a field of an item is missing or empty, by serialized field name.
fn field_is_empty(item: &Item, field: &str) -> bool {
  let data = match serde_json::to_value(&item.data) {
    Ok(value) => value,
    Err(_) => return false,
  };
  match data.get(field) {
    None | Some(Value::Null) => true,
    Some(Value::String(s)) => s.is_empty(),
    Some(Value::Array(a)) => a.is_empty(),
    Some(_) => false,
  }
}

/// Items with no PDF among their attachments.
pub fn without_pdf(snapshot: &Snapshot) -> Vec<Item> {
  snapshot
    .parents
    .iter()
    .filter(|item| !snapshot.children_of(&item.key).iter().any(|c| c.is_pdf_attachment()))
    .cloned()
    .collect()
}

/// Items with no attachments at all.
pub fn without_attachments(snapshot: &Snapshot) -> Vec<Item> {
  snapshot
    .parents
    .iter()
    .filter(|item| !snapshot.children_of(&item.key).iter().any(|c| c.is_attachment()))
    .cloned()
    .collect()
}

/// Items that have at least one note.
pub fn with_notes(snapshot: &Snapshot) -> Vec<Item> {
  snapshot
    .parents
    .iter()
    .filter(|item| snapshot.children_of(&item.key).iter().any(|c| c.is_note()))
    .cloned()
    .collect()
}

/// Items with no tags.
pub fn without_tags(snapshot: &Snapshot) -> Vec<Item> {
  snapshot.parents.iter().filter(|item| item.data.tags.is_empty()).cloned().collect()
}

/// Items filed in no collection.
pub fn not_in_collection(snapshot: &Snapshot) -> Vec<Item> {
  snapshot.parents.iter().filter(|item| item.data.collections.is_empty()).cloned().collect()
}

/// Items where the named field is missing or empty.
pub fn without_field(snapshot: &Snapshot, field: &str) -> Vec<Item> {
  snapshot.parents.iter().filter(|item| field_is_empty(item, field)).cloned().collect()
}

/// Items of one type missing any of the named fields.
pub fn missing_required_fields(snapshot: &Snapshot, item_type: &str, fields: &[&str]) -> Vec<Item> {
  snapshot
    .parents
    .iter()
    .filter(|item| item.data.item_type == item_type)
    .filter(|item| fields.iter().any(|field| field_is_empty(item, field)))
    .cloned()
    .collect()
}

/// Preprints with no DOI, which may simply be unpublished.
pub fn preprints_without_doi(snapshot: &Snapshot) -> Vec<Item> {
  snapshot
    .parents
    .iter()
    .filter(|item| item.data.item_type == "preprint")
    .filter(|item| item.data.doi.as_deref().unwrap_or_default().is_empty())
    .cloned()
    .collect()
}

/// Items with no relation under the given predicate, e.g.
/// `dc:relation:cites`.
pub fn without_relation(snapshot: &Snapshot, predicate: &str) -> Vec<Item> {
  snapshot
    .parents
    .iter()
    .filter(|item| item.data.relations.get(predicate).is_empty())
    .cloned()
    .collect()
}

/// Groups items sharing a value in the named field.
///
/// Keys are lowercased before grouping, so `10.1145/X` and `10.1145/x`
/// count as the same DOI. Only groups with more than one member are
/// returned.
pub fn duplicates_by_field(snapshot: &Snapshot, field: &str) -> BTreeMap<String, Vec<Item>> {
  let mut groups: BTreeMap<String, Vec<Item>> = BTreeMap::new();
  for item in &snapshot.parents {
    let data = match serde_json::to_value(&item.data) {
      Ok(value) => value,
      Err(_) => continue,
    };
    if let Some(value) = data.get(field).and_then(|v| v.as_str()) {
      if !value.is_empty() {
        groups.entry(value.to_lowercase()).or_default().push(item.clone());
      }
    }
  }
  groups.retain(|_, items| items.len() > 1);
  groups
}

/// Items whose DOI fails format validation. Empty DOIs are not flagged.
pub fn invalid_doi(snapshot: &Snapshot) -> Vec<Item> {
  invalid_identifier_field(snapshot, |item| item.data.doi.as_deref(), crate::identifier::validate_doi)
}

/// Items whose ISBN fails format validation.
pub fn invalid_isbn(snapshot: &Snapshot) -> Vec<Item> {
  invalid_identifier_field(snapshot, |item| item.data.isbn.as_deref(), crate::identifier::validate_isbn)
}

/// Items whose ISSN fails format validation.
pub fn invalid_issn(snapshot: &Snapshot) -> Vec<Item> {
  invalid_identifier_field(snapshot, |item| item.data.issn.as_deref(), crate::identifier::validate_issn)
}

/// Items whose URL lacks an http(s) scheme.
pub fn broken_urls(snapshot: &Snapshot) -> Vec<Item> {
  invalid_identifier_field(snapshot, |item| item.data.url.as_deref(), crate::identifier::validate_url)
}

/// Shared shape of the invalid-identifier audits.
fn invalid_identifier_field(
  snapshot: &Snapshot,
  extract: impl Fn(&Item) -> Option<&str>,
  valid: impl Fn(&str) -> bool,
) -> Vec<Item> {
  snapshot
    .parents
    .iter()
    .filter(|item| match extract(item) {
      Some(value) if !value.is_empty() => !valid(value),
      _ => false,
    })
    .cloned()
    .collect()
}

/// Items whose named field contains any of the given fragments,
/// case-insensitively.
///
/// The field is looked up on the serialized data, so unmodeled fields work
/// too. Items where the field is absent or empty never match.
pub fn items_with_placeholder_text(
  snapshot: &Snapshot,
  field: &str,
  patterns: &[&str],
) -> Vec<Item> {
  snapshot
    .parents
    .iter()
    .filter(|item| {
      let data = match serde_json::to_value(&item.data) {
        Ok(value) => value,
        Err(_) => return false,
      };
      let value = data.get(field).and_then(Value::as_str).unwrap_or_default().to_lowercase();
      patterns.iter().any(|p| value.contains(&p.to_lowercase()))
    })
    .cloned()
    .collect()
}

/// Items whose title contains a placeholder like `untitled` or `TBD`.
pub fn placeholder_titles(snapshot: &Snapshot) -> Vec<Item> {
  items_with_placeholder_text(snapshot, "title", PLACEHOLDER_TITLES)
}

/// Author names that appear with more than one spelling.
///
/// Grouped by lowercased last name; only names with multiple distinct
/// `First Last` renderings are returned.
pub fn creator_name_variations(snapshot: &Snapshot) -> BTreeMap<String, Vec<String>> {
  let mut names: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
  for item in &snapshot.parents {
    for creator in &item.data.creators {
      if let (Some(first), Some(last)) = (creator.first_name.as_deref(), creator.last_name.as_deref())
      {
        if !first.is_empty() && !last.is_empty() {
          names.entry(last.to_lowercase()).or_default().insert(format!("{first} {last}"));
        }
      }
    }
  }
  names
    .into_iter()
    .filter(|(_, variants)| variants.len() > 1)
    .map(|(last, variants)| (last, variants.into_iter().collect()))
    .collect()
}

/// Journal names that appear with more than one spelling.
///
/// Normalization lowercases and collapses whitespace and hyphens, so
/// `Phys-Rev  Lett` and `phys rev lett` land in the same group.
pub fn journal_name_variations(snapshot: &Snapshot) -> BTreeMap<String, Vec<String>> {
  let mut journals: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
  for item in &snapshot.parents {
    if item.data.item_type != "journalArticle" {
      continue;
    }
    if let Some(journal) = item.data.publication_title.as_deref() {
      if !journal.is_empty() {
        let key = JOURNAL_SEPARATORS.replace_all(journal.trim().to_lowercase().as_str(), " ").into_owned();
        journals.entry(key).or_default().insert(journal.to_string());
      }
    }
  }
  journals
    .into_iter()
    .filter(|(_, variants)| variants.len() > 1)
    .map(|(key, variants)| (key, variants.into_iter().collect()))
    .collect()
}

/// Tags that look like typo'd or restyled copies of each other.
///
/// Similarity is normalized Levenshtein; 0.8 catches hyphen/underscore
/// variants and single-character typos without sweeping in unrelated tags.
pub fn similar_tags(tags: &[String], threshold: f64) -> BTreeMap<String, Vec<String>> {
  let mut result = BTreeMap::new();
  for tag in tags {
    let similar: Vec<String> = tags
      .iter()
      .filter(|other| *other != tag && strsim::normalized_levenshtein(tag, other) >= threshold)
      .cloned()
      .collect();
    if !similar.is_empty() {
      result.insert(tag.clone(), similar);
    }
  }
  result
}

/// Result of a required-fields check on one item.
#[derive(Debug, Clone)]
pub struct Completeness {
  /// The checked item's key.
  pub key:     String,
  /// The checked item's title, empty if unset.
  pub title:   String,
  /// Required fields that are missing or empty.
  pub missing: Vec<String>,
}

impl Completeness {
  /// Whether every required field was present.
  pub fn is_complete(&self) -> bool { self.missing.is_empty() }
}

/// Checks one item for the given required fields.
pub fn completeness(item: &Item, required: &[&str]) -> Completeness {
  Completeness {
    key:     item.key.clone(),
    title:   item.data.title.clone().unwrap_or_default(),
    missing: required
      .iter()
      .filter(|field| field_is_empty(item, field))
      .map(|field| field.to_string())
      .collect(),
  }
}

/// Attachments with no live parent: either standalone, or pointing at a key
/// that no longer exists.
pub fn orphaned_attachments(snapshot: &Snapshot) -> Vec<Item> {
  let parent_keys: BTreeSet<&str> = snapshot.parents.iter().map(|item| item.key.as_str()).collect();
  let mut orphans: Vec<Item> =
    snapshot.parents.iter().filter(|item| item.is_attachment()).cloned().collect();
  for (parent, children) in &snapshot.children {
    if !parent_keys.contains(parent.as_str()) {
      orphans.extend(children.iter().filter(|c| c.is_attachment()).cloned());
    }
  }
  orphans
}

/// Filters for [`search_advanced`]. All set filters must match.
#[derive(Debug, Default, Clone)]
pub struct SearchFilters {
  /// Restrict to one item type.
  pub item_type:  Option<String>,
  /// Restrict to items carrying this tag.
  pub tag:        Option<String>,
  /// Restrict to members of this collection key.
  pub collection: Option<String>,
  /// Restrict to items whose date starts with this year.
  pub year:       Option<i32>,
  /// Inclusive lower bound on the publication year.
  pub year_start: Option<i32>,
  /// Inclusive upper bound on the publication year.
  pub year_end:   Option<i32>,
  /// Case-insensitive title substring.
  pub query:      Option<String>,
}

/// Items whose title contains the query, case-insensitively.
pub fn search_by_title(snapshot: &Snapshot, query: &str) -> Vec<Item> {
  let needle = query.to_lowercase();
  snapshot
    .parents
    .iter()
    .filter(|item| {
      item.data.title.as_deref().unwrap_or_default().to_lowercase().contains(&needle)
    })
    .cloned()
    .collect()
}

/// Items with a creator whose first or last name contains the query.
pub fn search_by_author(snapshot: &Snapshot, name: &str) -> Vec<Item> {
  let needle = name.to_lowercase();
  snapshot
    .parents
    .iter()
    .filter(|item| {
      item.data.creators.iter().any(|c| {
        c.first_name.as_deref().unwrap_or_default().to_lowercase().contains(&needle)
          || c.last_name.as_deref().unwrap_or_default().to_lowercase().contains(&needle)
      })
    })
    .cloned()
    .collect()
}

/// Items whose abstract contains the query, case-insensitively.
pub fn search_by_abstract(snapshot: &Snapshot, query: &str) -> Vec<Item> {
  let needle = query.to_lowercase();
  snapshot
    .parents
    .iter()
    .filter(|item| {
      item.data.abstract_note.as_deref().unwrap_or_default().to_lowercase().contains(&needle)
    })
    .cloned()
    .collect()
}

/// Items whose date starts with the given year.
pub fn search_by_year(snapshot: &Snapshot, year: i32) -> Vec<Item> {
  let prefix = year.to_string();
  snapshot
    .parents
    .iter()
    .filter(|item| item.data.date.as_deref().unwrap_or_default().starts_with(&prefix))
    .cloned()
    .collect()
}

/// Items whose publication year falls in the inclusive range.
pub fn search_by_year_range(snapshot: &Snapshot, start: i32, end: i32) -> Vec<Item> {
  snapshot
    .parents
    .iter()
    .filter(|item| item.year().map(|y| start <= y && y <= end).unwrap_or(false))
    .cloned()
    .collect()
}

/// Items matching every set filter.
pub fn search_advanced(snapshot: &Snapshot, filters: &SearchFilters) -> Vec<Item> {
  snapshot
    .parents
    .iter()
    .filter(|item| {
      if let Some(item_type) = &filters.item_type {
        if &item.data.item_type != item_type {
          return false;
        }
      }
      if let Some(tag) = &filters.tag {
        if !item.data.tags.iter().any(|t| &t.tag == tag) {
          return false;
        }
      }
      if let Some(collection) = &filters.collection {
        if !item.data.collections.iter().any(|c| c == collection) {
          return false;
        }
      }
      if let Some(year) = filters.year {
        if !item.data.date.as_deref().unwrap_or_default().starts_with(&year.to_string()) {
          return false;
        }
      }
      if filters.year_start.is_some() || filters.year_end.is_some() {
        let Some(item_year) = item.year() else { return false };
        if filters.year_start.map(|start| item_year < start).unwrap_or(false) {
          return false;
        }
        if filters.year_end.map(|end| item_year > end).unwrap_or(false) {
          return false;
        }
      }
      if let Some(query) = &filters.query {
        let title = item.data.title.as_deref().unwrap_or_default().to_lowercase();
        if !title.contains(&query.to_lowercase()) {
          return false;
        }
      }
      true
    })
    .cloned()
    .collect()
}

impl Library {
  /// See [`search_by_title`].
  pub async fn search_by_title(&mut self, query: &str) -> Result<Vec<Item>> {
    Ok(search_by_title(self.snapshot().await?, query))
  }

  /// See [`search_by_author`].
  pub async fn search_by_author(&mut self, name: &str) -> Result<Vec<Item>> {
    Ok(search_by_author(self.snapshot().await?, name))
  }

  /// See [`search_by_abstract`].
  pub async fn search_by_abstract(&mut self, query: &str) -> Result<Vec<Item>> {
    Ok(search_by_abstract(self.snapshot().await?, query))
  }

  /// See [`search_by_year`].
  pub async fn search_by_year(&mut self, year: i32) -> Result<Vec<Item>> {
    Ok(search_by_year(self.snapshot().await?, year))
  }

  /// See [`search_by_year_range`].
  pub async fn search_by_year_range(&mut self, start: i32, end: i32) -> Result<Vec<Item>> {
    Ok(search_by_year_range(self.snapshot().await?, start, end))
  }

  /// See [`search_advanced`].
  pub async fn search_items(&mut self, filters: &SearchFilters) -> Result<Vec<Item>> {
    Ok(search_advanced(self.snapshot().await?, filters))
  }

  /// Server-side full-text search, covering indexed attachment content.
  pub async fn search_fulltext(&self, query: &str) -> Result<Vec<Item>> {
    self.fetch_item_pages("items", &[("q", query), ("qmode", "everything")]).await
  }

  /// The first item whose DOI matches, ignoring case and `doi.org`
  /// decoration.
  pub async fn find_by_doi(&mut self, doi: &str) -> Result<Option<Item>> {
    let wanted = crate::identifier::normalize_doi(doi).to_lowercase();
    Ok(
      self
        .snapshot()
        .await?
        .parents
        .iter()
        .find(|item| {
          item
            .data
            .doi
            .as_deref()
            .map(|d| crate::identifier::normalize_doi(d).to_lowercase() == wanted)
            .unwrap_or(false)
        })
        .cloned(),
    )
  }

  /// The first item whose ISBN matches after hyphen/space removal.
  pub async fn find_by_isbn(&mut self, isbn: &str) -> Result<Option<Item>> {
    let wanted = crate::identifier::normalize_isbn(isbn);
    Ok(
      self
        .snapshot()
        .await?
        .parents
        .iter()
        .find(|item| {
          item
            .data
            .isbn
            .as_deref()
            .map(|i| crate::identifier::normalize_isbn(i) == wanted)
            .unwrap_or(false)
        })
        .cloned(),
    )
  }

  /// See [`without_pdf`].
  pub async fn items_without_pdf(&mut self) -> Result<Vec<Item>> {
    Ok(without_pdf(self.snapshot().await?))
  }

  /// See [`without_attachments`].
  pub async fn items_without_attachments(&mut self) -> Result<Vec<Item>> {
    Ok(without_attachments(self.snapshot().await?))
  }

  /// See [`with_notes`].
  pub async fn items_with_notes(&mut self) -> Result<Vec<Item>> {
    Ok(with_notes(self.snapshot().await?))
  }

  /// See [`without_tags`].
  pub async fn items_without_tags(&mut self) -> Result<Vec<Item>> {
    Ok(without_tags(self.snapshot().await?))
  }

  /// See [`not_in_collection`].
  pub async fn items_not_in_collection(&mut self) -> Result<Vec<Item>> {
    Ok(not_in_collection(self.snapshot().await?))
  }

  /// See [`without_field`].
  pub async fn items_without_field(&mut self, field: &str) -> Result<Vec<Item>> {
    Ok(without_field(self.snapshot().await?, field))
  }

  /// See [`without_field`], specialized to the abstract.
  pub async fn items_without_abstract(&mut self) -> Result<Vec<Item>> {
    self.items_without_field("abstractNote").await
  }

  /// See [`missing_required_fields`].
  pub async fn items_missing_required_fields(
    &mut self,
    item_type: &str,
    fields: &[&str],
  ) -> Result<Vec<Item>> {
    Ok(missing_required_fields(self.snapshot().await?, item_type, fields))
  }

  /// See [`completeness`].
  pub async fn item_completeness(&self, key: &str, required: &[&str]) -> Result<Completeness> {
    Ok(completeness(&self.item(key).await?, required))
  }

  /// See [`preprints_without_doi`].
  pub async fn preprints_without_doi(&mut self) -> Result<Vec<Item>> {
    Ok(preprints_without_doi(self.snapshot().await?))
  }

  /// Items with no `dc:relation:cites` relation.
  pub async fn items_without_cites(&mut self) -> Result<Vec<Item>> {
    Ok(without_relation(self.snapshot().await?, "dc:relation:cites"))
  }

  /// Items with no `dc:relation:citedBy` relation.
  pub async fn items_without_cited_by(&mut self) -> Result<Vec<Item>> {
    Ok(without_relation(self.snapshot().await?, "dc:relation:citedBy"))
  }

  /// See [`duplicates_by_field`].
  pub async fn find_duplicates_by_field(
    &mut self,
    field: &str,
  ) -> Result<BTreeMap<String, Vec<Item>>> {
    Ok(duplicates_by_field(self.snapshot().await?, field))
  }

  /// Items sharing a DOI.
  pub async fn duplicate_dois(&mut self) -> Result<BTreeMap<String, Vec<Item>>> {
    self.find_duplicates_by_field("DOI").await
  }

  /// Items sharing a title.
  pub async fn duplicate_titles(&mut self) -> Result<BTreeMap<String, Vec<Item>>> {
    self.find_duplicates_by_field("title").await
  }

  /// See [`invalid_doi`].
  pub async fn items_with_invalid_doi(&mut self) -> Result<Vec<Item>> {
    Ok(invalid_doi(self.snapshot().await?))
  }

  /// See [`invalid_isbn`].
  pub async fn items_with_invalid_isbn(&mut self) -> Result<Vec<Item>> {
    Ok(invalid_isbn(self.snapshot().await?))
  }

  /// See [`invalid_issn`].
  pub async fn items_with_invalid_issn(&mut self) -> Result<Vec<Item>> {
    Ok(invalid_issn(self.snapshot().await?))
  }

  /// See [`broken_urls`].
  pub async fn items_with_broken_urls(&mut self) -> Result<Vec<Item>> {
    Ok(broken_urls(self.snapshot().await?))
  }

  /// See [`items_with_placeholder_text`].
  pub async fn items_with_placeholder_text(
    &mut self,
    field: &str,
    patterns: &[&str],
  ) -> Result<Vec<Item>> {
    Ok(items_with_placeholder_text(self.snapshot().await?, field, patterns))
  }

  /// See [`placeholder_titles`].
  pub async fn items_with_placeholder_titles(&mut self) -> Result<Vec<Item>> {
    Ok(placeholder_titles(self.snapshot().await?))
  }

  /// See [`creator_name_variations`].
  pub async fn find_creator_name_variations(&mut self) -> Result<BTreeMap<String, Vec<String>>> {
    Ok(creator_name_variations(self.snapshot().await?))
  }

  /// See [`journal_name_variations`].
  pub async fn find_journal_name_variations(&mut self) -> Result<BTreeMap<String, Vec<String>>> {
    Ok(journal_name_variations(self.snapshot().await?))
  }

  /// See [`similar_tags`], over every tag in the library.
  pub async fn find_similar_tags(
    &mut self,
    threshold: f64,
  ) -> Result<BTreeMap<String, Vec<String>>> {
    let tags: Vec<String> = self.all_tags().await?.into_iter().map(|t| t.tag).collect();
    Ok(similar_tags(&tags, threshold))
  }

  /// See [`orphaned_attachments`].
  pub async fn find_orphaned_attachments(&mut self) -> Result<Vec<Item>> {
    Ok(orphaned_attachments(self.snapshot().await?))
  }

  /// Collections containing no items.
  pub async fn empty_collections(&self) -> Result<Vec<Collection>> {
    Ok(self.all_collections().await?.into_iter().filter(|c| c.meta.num_items == 0).collect())
  }

  /// Collections containing exactly one item.
  pub async fn single_item_collections(&self) -> Result<Vec<Collection>> {
    Ok(self.all_collections().await?.into_iter().filter(|c| c.meta.num_items == 1).collect())
  }

  /// Items currently in the trash.
  pub async fn trash_items(&self) -> Result<Vec<Item>> {
    self.fetch_item_pages("items/trash", &[]).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::item::{Creator, Tag};

  fn article(key: &str, title: &str) -> Item {
    let mut item = Item { key: key.to_string(), ..Default::default() };
    item.data.item_type = "journalArticle".to_string();
    item.data.title = Some(title.to_string());
    item
  }

  fn attachment(key: &str, parent: Option<&str>, content_type: &str) -> Item {
    let mut item = Item { key: key.to_string(), ..Default::default() };
    item.data.item_type = "attachment".to_string();
    item.data.parent_item = parent.map(String::from);
    item.data.content_type = Some(content_type.to_string());
    item
  }

  fn snapshot_of(items: Vec<Item>) -> Snapshot {
    let mut parents = Vec::new();
    let mut children: std::collections::HashMap<String, Vec<Item>> = Default::default();
    for item in items {
      match item.data.parent_item.clone() {
        Some(parent) => children.entry(parent).or_default().push(item),
        None => parents.push(item),
      }
    }
    Snapshot { parents, children }
  }

  #[test]
  fn finds_items_without_pdf() {
    let snapshot = snapshot_of(vec![
      article("AAAAAAAA", "With PDF"),
      attachment("BBBBBBBB", Some("AAAAAAAA"), "application/pdf"),
      article("CCCCCCCC", "HTML only"),
      attachment("DDDDDDDD", Some("CCCCCCCC"), "text/html"),
      article("EEEEEEEE", "Bare"),
    ]);
    let missing: Vec<String> = without_pdf(&snapshot).into_iter().map(|i| i.key).collect();
    assert_eq!(missing, ["CCCCCCCC", "EEEEEEEE"]);
  }

  #[test]
  fn duplicate_grouping_is_case_insensitive() {
    let mut a = article("AAAAAAAA", "t");
    a.data.doi = Some("10.1145/X".to_string());
    let mut b = article("BBBBBBBB", "t");
    b.data.doi = Some("10.1145/x".to_string());
    let c = article("CCCCCCCC", "t");
    let snapshot = snapshot_of(vec![a, b, c]);

    let groups = duplicates_by_field(&snapshot, "DOI");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups["10.1145/x"].len(), 2);
  }

  #[test]
  fn flags_invalid_identifiers_but_not_empty_ones() {
    let mut bad = article("AAAAAAAA", "bad doi");
    bad.data.doi = Some("not-a-doi".to_string());
    let mut good = article("BBBBBBBB", "good doi");
    good.data.doi = Some("10.1145/1327452.1327492".to_string());
    let empty = article("CCCCCCCC", "no doi");
    let snapshot = snapshot_of(vec![bad, good, empty]);

    let flagged: Vec<String> = invalid_doi(&snapshot).into_iter().map(|i| i.key).collect();
    assert_eq!(flagged, ["AAAAAAAA"]);
  }

  #[test]
  fn detects_creator_variations() {
    let mut a = article("AAAAAAAA", "t");
    a.data.creators.push(Creator::author("John", "Smith"));
    let mut b = article("BBBBBBBB", "t");
    b.data.creators.push(Creator::author("J.", "Smith"));
    let mut c = article("CCCCCCCC", "t");
    c.data.creators.push(Creator::author("Ada", "Lovelace"));
    let snapshot = snapshot_of(vec![a, b, c]);

    let variations = creator_name_variations(&snapshot);
    assert_eq!(variations.len(), 1);
    assert_eq!(variations["smith"].len(), 2);
  }

  #[test]
  fn similar_tags_catches_near_misses() {
    let tags: Vec<String> =
      ["machine-learning", "machine_learning", "biology"].iter().map(|s| s.to_string()).collect();
    let similar = similar_tags(&tags, 0.8);
    assert!(similar.contains_key("machine-learning"));
    assert!(!similar.contains_key("biology"));
  }

  #[test]
  fn orphans_include_standalone_and_dangling() {
    let snapshot = snapshot_of(vec![
      article("AAAAAAAA", "parent"),
      attachment("BBBBBBBB", Some("AAAAAAAA"), "application/pdf"),
      attachment("CCCCCCCC", None, "application/pdf"),
      attachment("DDDDDDDD", Some("GONE0000"), "application/pdf"),
    ]);
    let orphans: Vec<String> = orphaned_attachments(&snapshot).into_iter().map(|i| i.key).collect();
    assert!(orphans.contains(&"CCCCCCCC".to_string()));
    assert!(orphans.contains(&"DDDDDDDD".to_string()));
    assert!(!orphans.contains(&"BBBBBBBB".to_string()));
  }

  #[test]
  fn completeness_lists_missing_fields() {
    let mut item = article("AAAAAAAA", "Has a title");
    item.data.doi = Some("10.1145/3".to_string());
    let report = completeness(&item, &["title", "DOI", "abstractNote", "date"]);
    assert!(!report.is_complete());
    assert_eq!(report.missing, ["abstractNote", "date"]);
  }

  #[test]
  fn placeholder_titles_are_flagged() {
    let snapshot = snapshot_of(vec![
      article("AAAAAAAA", "Untitled document"),
      article("BBBBBBBB", "A Real Title"),
      article("CCCCCCCC", "TBD"),
    ]);
    let flagged: Vec<String> = placeholder_titles(&snapshot).into_iter().map(|i| i.key).collect();
    assert_eq!(flagged, ["AAAAAAAA", "CCCCCCCC"]);
  }

  #[test]
  fn placeholder_text_checks_the_named_field() {
    let mut stub = article("AAAAAAAA", "A Real Title");
    stub.data.abstract_note = Some("TODO: write the abstract".to_string());
    let fine = article("BBBBBBBB", "Also Real");
    let snapshot = snapshot_of(vec![stub, fine]);

    let flagged: Vec<String> = items_with_placeholder_text(&snapshot, "abstractNote", &["todo"])
      .into_iter()
      .map(|i| i.key)
      .collect();
    assert_eq!(flagged, ["AAAAAAAA"]);
    // absent fields never match
    assert!(items_with_placeholder_text(&snapshot, "extra", &["todo"]).is_empty());
  }

  #[test]
  fn advanced_search_combines_filters() {
    let mut a = article("AAAAAAAA", "Deep Learning Survey");
    a.data.date = Some("2020-05".to_string());
    a.data.tags.push(Tag::new("ml"));
    let mut b = article("BBBBBBBB", "Deep Sea Biology");
    b.data.date = Some("2020".to_string());
    let mut c = article("CCCCCCCC", "Deep Learning Methods");
    c.data.date = Some("2015".to_string());
    c.data.tags.push(Tag::new("ml"));
    let snapshot = snapshot_of(vec![a, b, c]);

    let filters = SearchFilters {
      tag: Some("ml".to_string()),
      year_start: Some(2018),
      query: Some("deep learning".to_string()),
      ..Default::default()
    };
    let hits: Vec<String> =
      search_advanced(&snapshot, &filters).into_iter().map(|i| i.key).collect();
    assert_eq!(hits, ["AAAAAAAA"]);
  }

  #[test]
  fn title_and_author_search_are_case_insensitive() {
    let mut a = article("AAAAAAAA", "On Computable Numbers");
    a.data.creators.push(Creator::author("Alan", "Turing"));
    let snapshot = snapshot_of(vec![a]);

    assert_eq!(search_by_title(&snapshot, "computable").len(), 1);
    assert_eq!(search_by_author(&snapshot, "turing").len(), 1);
    assert_eq!(search_by_author(&snapshot, "lovelace").len(), 0);
  }

  #[test]
  fn without_tags_and_collections() {
    let mut tagged = article("AAAAAAAA", "tagged");
    tagged.data.tags.push(Tag::new("ml"));
    tagged.data.collections.push("COLL0001".to_string());
    let bare = article("BBBBBBBB", "bare");
    let snapshot = snapshot_of(vec![tagged, bare]);

    assert_eq!(without_tags(&snapshot).len(), 1);
    assert_eq!(not_in_collection(&snapshot).len(), 1);
    assert_eq!(without_field(&snapshot, "abstractNote").len(), 2);
  }
}
