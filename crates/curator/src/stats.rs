//! Library summaries and counts.
//!
//! Like the audits, the counting logic is pure over a [`Snapshot`], with
//! `Library` methods layered on top. Summary types are serializable so the
//! command line can emit them as JSON.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::{
  client::{Library, Snapshot},
  prelude::*,
};

/// Overall library statistics.
#[derive(Debug, Clone, Serialize)]
pub struct LibrarySummary {
  /// Number of items, attachments and notes included.
  pub total_items:   usize,
  /// Count per item type.
  pub item_types:    BTreeMap<String, usize>,
  /// Number of collections.
  pub collections:   usize,
  /// Number of distinct tags.
  pub tags:          usize,
  /// Earliest publication year among dated items.
  pub earliest_year: Option<i32>,
  /// Latest publication year among dated items.
  pub latest_year:   Option<i32>,
  /// Number of attachments.
  pub attachments:   usize,
  /// Number of notes.
  pub notes:         usize,
}

/// Attachment statistics.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentSummary {
  /// Number of attachments.
  pub total:           usize,
  /// Count per MIME type.
  pub by_content_type: BTreeMap<String, usize>,
  /// Count per link mode (`imported_file`, `linked_url`, …).
  pub by_link_mode:    BTreeMap<String, usize>,
  /// Stored-file bytes summed over attachments that report a size.
  pub total_size:      u64,
  /// Attachments with a stored file.
  pub with_file:       usize,
  /// Attachments without a stored file (linked URLs included).
  pub without_file:    usize,
}

/// Count of items per type, over every item in the snapshot.
pub fn items_per_type(snapshot: &Snapshot) -> BTreeMap<String, usize> {
  let mut counts = BTreeMap::new();
  for item in all(snapshot) {
    let key =
      if item.data.item_type.is_empty() { "unknown" } else { item.data.item_type.as_str() };
    *counts.entry(key.to_string()).or_insert(0) += 1;
  }
  counts
}

/// Count of top-level items per publication year. Items without a parsable
/// year land under `unknown`.
pub fn items_per_year(snapshot: &Snapshot) -> BTreeMap<String, usize> {
  let mut counts = BTreeMap::new();
  for item in &snapshot.parents {
    let key = match item.year() {
      Some(year) => year.to_string(),
      None => "unknown".to_string(),
    };
    *counts.entry(key).or_insert(0) += 1;
  }
  counts
}

/// Attachment counts grouped by content type and link mode, plus stored-file
/// totals.
///
/// The server reports a `fileSize` only for attachments that actually hold a
/// file; attachments without one (linked URLs, metadata-only stubs) count as
/// file-less.
pub fn attachment_summary(snapshot: &Snapshot) -> AttachmentSummary {
  let mut summary = AttachmentSummary {
    total:           0,
    by_content_type: BTreeMap::new(),
    by_link_mode:    BTreeMap::new(),
    total_size:      0,
    with_file:       0,
    without_file:    0,
  };
  for item in all(snapshot).filter(|i| i.is_attachment()) {
    summary.total += 1;
    let content_type = item.data.content_type.as_deref().unwrap_or("unknown");
    *summary.by_content_type.entry(content_type.to_string()).or_insert(0) += 1;
    let link_mode = item.data.link_mode.as_deref().unwrap_or("unknown");
    *summary.by_link_mode.entry(link_mode.to_string()).or_insert(0) += 1;
    let size = item.data.extra_fields.get("fileSize").and_then(Value::as_u64).unwrap_or(0);
    if size > 0 {
      summary.total_size += size;
      summary.with_file += 1;
    } else {
      summary.without_file += 1;
    }
  }
  summary
}

/// Every item in the snapshot, parents and children alike.
fn all(snapshot: &Snapshot) -> impl Iterator<Item = &crate::item::Item> {
  snapshot.parents.iter().chain(snapshot.children.values().flatten())
}

impl Library {
  /// See [`items_per_type`].
  pub async fn count_items_per_type(&mut self) -> Result<BTreeMap<String, usize>> {
    Ok(items_per_type(self.snapshot().await?))
  }

  /// See [`items_per_year`].
  pub async fn count_items_per_year(&mut self) -> Result<BTreeMap<String, usize>> {
    Ok(items_per_year(self.snapshot().await?))
  }

  /// Item count per collection, keyed by collection name.
  pub async fn count_items_per_collection(&self) -> Result<BTreeMap<String, u64>> {
    Ok(
      self
        .all_collections()
        .await?
        .into_iter()
        .map(|c| (c.data.name, c.meta.num_items))
        .collect(),
    )
  }

  /// Tag usage counts, most-used first.
  pub async fn tag_cloud(&self) -> Result<Vec<(String, u64)>> {
    let mut tags: Vec<(String, u64)> =
      self.all_tags().await?.into_iter().map(|t| (t.tag, t.meta.num_items)).collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(tags)
  }

  /// See [`attachment_summary`].
  pub async fn summarize_attachments(&mut self) -> Result<AttachmentSummary> {
    Ok(attachment_summary(self.snapshot().await?))
  }

  /// Gathers the overall library summary.
  pub async fn library_summary(&mut self) -> Result<LibrarySummary> {
    let collections = self.all_collections().await?.len();
    let tags = self.all_tags().await?.len();
    let snapshot = self.snapshot().await?;

    let years: Vec<i32> = snapshot.parents.iter().filter_map(|item| item.year()).collect();
    let total_children: usize = snapshot.children.values().map(Vec::len).sum();
    let attachments = all(snapshot).filter(|i| i.is_attachment()).count();
    let notes = all(snapshot).filter(|i| i.is_note()).count();

    Ok(LibrarySummary {
      total_items: snapshot.parents.len() + total_children,
      item_types: items_per_type(snapshot),
      collections,
      tags,
      earliest_year: years.iter().min().copied(),
      latest_year: years.iter().max().copied(),
      attachments,
      notes,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{client::Snapshot, item::Item};

  fn item(key: &str, item_type: &str, date: Option<&str>, parent: Option<&str>) -> Item {
    let mut item = Item { key: key.to_string(), ..Default::default() };
    item.data.item_type = item_type.to_string();
    item.data.date = date.map(String::from);
    item.data.parent_item = parent.map(String::from);
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
  fn counts_per_type_include_children() {
    let snapshot = snapshot_of(vec![
      item("AAAAAAAA", "journalArticle", Some("2021-03"), None),
      item("BBBBBBBB", "book", None, None),
      item("CCCCCCCC", "attachment", None, Some("AAAAAAAA")),
    ]);
    let counts = items_per_type(&snapshot);
    assert_eq!(counts["journalArticle"], 1);
    assert_eq!(counts["attachment"], 1);
  }

  #[test]
  fn counts_per_year_bucket_unknowns() {
    let snapshot = snapshot_of(vec![
      item("AAAAAAAA", "journalArticle", Some("2021-03-01"), None),
      item("BBBBBBBB", "journalArticle", Some("2021"), None),
      item("CCCCCCCC", "book", Some("in press"), None),
      item("DDDDDDDD", "book", None, None),
    ]);
    let counts = items_per_year(&snapshot);
    assert_eq!(counts["2021"], 2);
    assert_eq!(counts["unknown"], 2);
  }

  #[test]
  fn attachment_summary_groups_by_type_and_mode() {
    let mut pdf = item("BBBBBBBB", "attachment", None, Some("AAAAAAAA"));
    pdf.data.content_type = Some("application/pdf".to_string());
    pdf.data.link_mode = Some("imported_file".to_string());
    pdf.data.extra_fields.insert("fileSize".to_string(), Value::from(204800u64));
    let mut link = item("CCCCCCCC", "attachment", None, Some("AAAAAAAA"));
    link.data.link_mode = Some("linked_url".to_string());
    let snapshot =
      snapshot_of(vec![item("AAAAAAAA", "journalArticle", None, None), pdf, link]);

    let summary = attachment_summary(&snapshot);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.by_content_type["application/pdf"], 1);
    assert_eq!(summary.by_content_type["unknown"], 1);
    assert_eq!(summary.by_link_mode["linked_url"], 1);
    assert_eq!(summary.total_size, 204800);
    assert_eq!(summary.with_file, 1);
    assert_eq!(summary.without_file, 1);
  }
}
