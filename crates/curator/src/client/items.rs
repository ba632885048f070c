//! Item reads and mutations.
//!
//! Single-item writes go through [`Library::update_item`], which echoes the
//! item's version so the server can reject stale writes. Compound
//! operations ([`Library::merge_items`], [`Library::copy_item`]) are built
//! from the same primitives and tolerate partial failure on child items
//! rather than aborting midway.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::Library;
use crate::{
  error::CuratorError,
  item::{Item, ItemData, WriteResponse},
  prelude::*,
};

/// Field renames applied when converting between specific item types.
///
/// Each entry maps (from type, to type) to (old field, new field); a new
/// field of `extra` appends `old: value` to the extra field instead.
const CONVERSION_FIELD_MAP: &[(&str, &str, &str, &str)] = &[
  ("journalArticle", "bookSection", "publicationTitle", "bookTitle"),
  ("journalArticle", "bookSection", "journalAbbreviation", "bookAbbreviation"),
  ("book", "bookSection", "publicationTitle", "bookTitle"),
  ("conferencePaper", "journalArticle", "proceedingsTitle", "publicationTitle"),
  ("conferencePaper", "journalArticle", "conferenceName", "extra"),
];

/// Fields carried over unconditionally when converting item types.
const COMMON_FIELDS: &[&str] = &[
  "title",
  "creators",
  "date",
  "DOI",
  "ISBN",
  "ISSN",
  "url",
  "abstractNote",
  "tags",
  "collections",
  "relations",
  "extra",
  "language",
  "rights",
  "accessDate",
  "libraryCatalog",
  "callNumber",
  "archive",
  "archiveLocation",
];

/// Keys of objects removed from the library since a given version, as
/// reported by the `/deleted` endpoint.
#[derive(Debug, Deserialize)]
pub struct DeletedContent {
  #[serde(default)]
  pub items:       Vec<String>,
  #[serde(default)]
  pub collections: Vec<String>,
  #[serde(default)]
  pub searches:    Vec<String>,
  #[serde(default)]
  pub tags:        Vec<String>,
}

/// Target URIs of an item's `dc:relation:cites` / `dc:relation:citedBy`
/// relations.
#[derive(Debug, Default, Clone)]
pub struct Citations {
  /// What the item cites.
  pub cites:    Vec<String>,
  /// What cites the item.
  pub cited_by: Vec<String>,
}

impl Library {
  // --- reads ----------------------------------------------------------------

  /// Fetches every item in the library, attachments and notes included.
  pub async fn all_items(&self) -> Result<Vec<Item>> { self.fetch_item_pages("items", &[]).await }

  /// Fetches top-level items only.
  pub async fn top_items(&self) -> Result<Vec<Item>> {
    self.fetch_item_pages("items/top", &[]).await
  }

  /// Fetches one item by key.
  pub async fn item(&self, key: &str) -> Result<Item> {
    match self.get_json(&format!("items/{key}"), &[]).await {
      Err(CuratorError::Api { status: 404, .. }) =>
        Err(CuratorError::NotFound { kind: "item", key: key.to_string() }),
      other => other,
    }
  }

  /// Fetches the direct children (attachments and notes) of an item.
  pub async fn children(&self, key: &str) -> Result<Vec<Item>> {
    self.fetch_item_pages(&format!("items/{key}/children"), &[]).await
  }

  /// Fetches every item carrying a tag.
  pub async fn items_with_tag(&self, tag: &str) -> Result<Vec<Item>> {
    self.fetch_item_pages("items", &[("tag", tag)]).await
  }

  /// Fetches every top-level item of one type.
  pub async fn items_of_type(&self, item_type: &str) -> Result<Vec<Item>> {
    self.fetch_item_pages("items/top", &[("itemType", item_type)]).await
  }

  /// Quick-search over titles, creators, and years.
  pub async fn search(&self, query: &str) -> Result<Vec<Item>> {
    self.fetch_item_pages("items/top", &[("q", query)]).await
  }

  /// Keys of objects removed from the library since the given version.
  pub async fn deleted_since(&self, since: u64) -> Result<DeletedContent> {
    self.get_json("deleted", &[("since", &since.to_string())]).await
  }

  // --- writes ---------------------------------------------------------------

  /// Creates items from drafts. Drafts without a key are assigned fresh
  /// ones by the server.
  pub async fn create_items(&mut self, drafts: Vec<ItemData>) -> Result<WriteResponse> {
    debug!(count = drafts.len(), "creating items");
    self.post_json("items", &drafts).await
  }

  /// Creates one item and returns its new key.
  pub async fn create_item(&mut self, draft: ItemData) -> Result<String> {
    let response = self.create_items(vec![draft]).await?;
    response
      .created_keys()
      .into_iter()
      .next()
      .ok_or_else(|| first_failure(&response))
  }

  /// Submits an item's current data back to the server.
  ///
  /// # Errors
  ///
  /// Fails with [`CuratorError::Api`] if the server rejects the write, for
  /// example because the item changed since it was fetched.
  pub async fn update_item(&mut self, item: &Item) -> Result<()> {
    let mut data = item.data.clone();
    data.key = Some(item.key.clone());
    data.version = Some(item.version);
    let response: WriteResponse = self.post_json("items", &vec![data]).await?;
    if response.all_succeeded() {
      Ok(())
    } else {
      Err(first_failure(&response))
    }
  }

  /// Overwrites named fields on an item, leaving everything else intact.
  ///
  /// Unknown field names are passed through to the server, which validates
  /// them against the item's type.
  pub async fn update_item_fields(&mut self, key: &str, fields: &[(&str, Value)]) -> Result<()> {
    let mut item = self.item(key).await?;
    let mut data = serde_json::to_value(&item.data)?;
    for (field, value) in fields {
      data[*field] = value.clone();
    }
    item.data = serde_json::from_value(data)?;
    self.update_item(&item).await
  }

  /// Sets one string field on an item.
  pub async fn set_field(&mut self, key: &str, field: &str, value: &str) -> Result<()> {
    self.update_item_fields(key, &[(field, Value::String(value.to_string()))]).await
  }

  /// Clears one field on an item.
  pub async fn clear_field(&mut self, key: &str, field: &str) -> Result<()> {
    self.set_field(key, field, "").await
  }

  /// Moves an item to the trash.
  pub async fn trash_item(&mut self, key: &str) -> Result<()> {
    let mut item = self.item(key).await?;
    item.data.extra_fields.insert("deleted".to_string(), Value::from(1));
    self.update_item(&item).await
  }

  /// Restores an item from the trash.
  pub async fn restore_item(&mut self, key: &str) -> Result<()> {
    let mut item = self.item(key).await?;
    item.data.extra_fields.insert("deleted".to_string(), Value::from(0));
    self.update_item(&item).await
  }

  /// Permanently deletes an item.
  pub async fn delete_item(&mut self, key: &str) -> Result<()> {
    self.delete(&format!("items/{key}"), &[]).await
  }

  // --- compound operations --------------------------------------------------

  /// Duplicates an item together with its attachments and notes.
  ///
  /// The copy's title gets a ` (copy)` suffix. Children are recreated under
  /// the new key; a child that fails to copy is logged and skipped. File
  /// attachments reference the same stored file rather than duplicating it.
  pub async fn copy_item(&mut self, key: &str) -> Result<String> {
    let original = self.item(key).await?;
    let mut draft = original.data.as_draft();
    if let Some(title) = &draft.title {
      draft.title = Some(format!("{title} (copy)"));
    }
    let new_key = self.create_item(draft).await?;

    for child in self.children(key).await? {
      let mut child_draft = child.data.as_draft();
      child_draft.parent_item = Some(new_key.clone());
      if let Err(error) = self.create_item(child_draft).await {
        warn!(parent = key, child = %child.key, %error, "skipping child that failed to copy");
      }
    }
    Ok(new_key)
  }

  /// Changes an item's type in place.
  ///
  /// Fields common to most types are preserved; a few well-known pairs get
  /// field renames (e.g. `publicationTitle` becomes `bookTitle` going from
  /// `journalArticle` to `bookSection`). Type-specific fields with no
  /// mapping are dropped by the server. The item key does not change.
  pub async fn convert_item_type(&mut self, key: &str, new_type: &str) -> Result<()> {
    let mut item = self.item(key).await?;
    let old = serde_json::to_value(&item.data)?;
    let old_type = item.data.item_type.clone();
    if old_type == new_type {
      return Ok(());
    }

    let mut new_data = serde_json::Map::new();
    new_data.insert("itemType".to_string(), Value::String(new_type.to_string()));
    for field in COMMON_FIELDS {
      if let Some(value) = old.get(*field) {
        new_data.insert((*field).to_string(), value.clone());
      }
    }
    for (from, to, old_field, new_field) in CONVERSION_FIELD_MAP {
      if *from != old_type || *to != new_type {
        continue;
      }
      let Some(value) = old.get(*old_field) else { continue };
      if *new_field == "extra" {
        let line = format!("{old_field}: {}", value.as_str().unwrap_or_default());
        let extra = match new_data.get("extra").and_then(|v| v.as_str()) {
          Some(existing) if !existing.is_empty() => format!("{existing}\n{line}"),
          _ => line,
        };
        new_data.insert("extra".to_string(), Value::String(extra));
      } else {
        new_data.insert((*new_field).to_string(), value.clone());
      }
    }

    debug!(key, from = %old_type, to = new_type, "converting item type");
    item.data = serde_json::from_value(Value::Object(new_data))?;
    self.update_item(&item).await
  }

  /// Records a citation relation on an item.
  ///
  /// `relation_type` is typically `cites` or `citedBy`; it lands under the
  /// `dc:relation:<type>` predicate. The target is any URI the reference
  /// manager understands (a DOI URL or an item URI).
  pub async fn add_citation_relation(
    &mut self,
    key: &str,
    relation_type: &str,
    target_uri: &str,
  ) -> Result<()> {
    let mut item = self.item(key).await?;
    let predicate = format!("dc:relation:{relation_type}");
    if item.data.relations.add(&predicate, target_uri) {
      self.update_item(&item).await
    } else {
      Ok(())
    }
  }

  /// An item's citation relations, both directions.
  pub async fn citations(&self, key: &str) -> Result<Citations> {
    let item = self.item(key).await?;
    Ok(Citations {
      cites:    item.data.relations.get("dc:relation:cites").to_vec(),
      cited_by: item.data.relations.get("dc:relation:citedBy").to_vec(),
    })
  }

  /// Copies all relations from one item onto another, skipping targets the
  /// destination already has. Returns the number of relations added.
  pub async fn transfer_relations(&mut self, from_key: &str, to_key: &str) -> Result<usize> {
    let from = self.item(from_key).await?;
    let mut to = self.item(to_key).await?;
    let added = to.data.relations.merge_from(&from.data.relations);
    if added > 0 {
      self.update_item(&to).await?;
    }
    Ok(added)
  }

  /// Merges a duplicate into its canonical item.
  ///
  /// Tags and relations from the source are unioned onto the target, the
  /// source's attachments and notes are recreated under the target, and the
  /// source goes to the trash. Conflicting bibliographic fields keep the
  /// target's values. Returns counts of what moved.
  pub async fn merge_items(&mut self, source_key: &str, target_key: &str) -> Result<MergeReport> {
    let source = self.item(source_key).await?;
    let mut target = self.item(target_key).await?;
    let mut report = MergeReport::default();

    for tag in &source.data.tags {
      if !target.data.tags.iter().any(|t| t.tag == tag.tag) {
        target.data.tags.push(tag.clone());
        report.tags += 1;
      }
    }
    report.relations = target.data.relations.merge_from(&source.data.relations);
    self.update_item(&target).await?;

    for child in self.children(source_key).await? {
      let is_attachment = child.is_attachment();
      let mut draft = child.data.as_draft();
      draft.parent_item = Some(target_key.to_string());
      match self.create_item(draft).await {
        Ok(_) if is_attachment => report.attachments += 1,
        Ok(_) => report.notes += 1,
        Err(error) => {
          warn!(source = source_key, child = %child.key, %error, "skipping child during merge");
        },
      }
    }

    self.trash_item(source_key).await?;
    debug!(source = source_key, target = target_key, ?report, "merged items");
    Ok(report)
  }

  // --- batch operations -----------------------------------------------------

  /// Applies the same field updates to each of the given items.
  pub async fn batch_update_items(
    &mut self,
    keys: &[String],
    fields: &[(&str, Value)],
  ) -> super::BatchOutcome {
    let mut outcome = super::BatchOutcome::default();
    for key in keys {
      match self.update_item_fields(key, fields).await {
        Ok(()) => outcome.ok(key),
        Err(error) => outcome.err(key, &error),
      }
    }
    outcome
  }

  /// Moves each of the given items to the trash.
  pub async fn batch_trash_items(&mut self, keys: &[String]) -> super::BatchOutcome {
    let mut outcome = super::BatchOutcome::default();
    for key in keys {
      match self.trash_item(key).await {
        Ok(()) => outcome.ok(key),
        Err(error) => outcome.err(key, &error),
      }
    }
    outcome
  }
}

/// What a merge moved from the source to the target.
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeReport {
  /// Tags added to the target.
  pub tags:        usize,
  /// Relations added to the target.
  pub relations:   usize,
  /// Attachments recreated under the target.
  pub attachments: usize,
  /// Notes recreated under the target.
  pub notes:       usize,
}

/// Renders the first failed entry of a write as an API error.
fn first_failure(response: &WriteResponse) -> CuratorError {
  match response.failed.values().next() {
    Some(failure) =>
      CuratorError::Api { status: failure.code as u16, message: failure.message.clone() },
    None => CuratorError::Api { status: 0, message: "write reported no result".to_string() },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deleted_content_tolerates_missing_sections() {
    let parsed: DeletedContent = serde_json::from_str(r#"{"items":["ABCD2345"]}"#).unwrap();
    assert_eq!(parsed.items, vec!["ABCD2345".to_string()]);
    assert!(parsed.collections.is_empty());
    assert!(parsed.tags.is_empty());
  }
}
