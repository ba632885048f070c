//! Tag listing and library-wide tag edits.
//!
//! The server has no rename endpoint, so renames and merges rewrite the tag
//! list of every affected item. Those loops report per-item results through
//! [`BatchOutcome`] instead of aborting on the first failure, since a
//! half-renamed tag is recoverable by rerunning and an aborted loop is not.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::debug;

use super::{BatchOutcome, Library};
use crate::{item::Tag, prelude::*};

/// One entry of the library's tag list.
#[derive(Debug, Clone, Deserialize)]
pub struct TagInfo {
  /// The tag text.
  pub tag:  String,
  /// Usage counts.
  #[serde(default)]
  pub meta: TagMeta,
}

/// Server-computed tag usage.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TagMeta {
  /// Number of items carrying the tag.
  #[serde(rename = "numItems", default)]
  pub num_items: u64,
  /// Manual (0) or automatic (1).
  #[serde(rename = "type", default)]
  pub kind:      u8,
}

impl Library {
  /// Lists every tag in the library with its usage count.
  pub async fn all_tags(&self) -> Result<Vec<TagInfo>> { self.fetch_pages("tags", &[]).await }

  /// Adds tags to one item, skipping tags it already has.
  pub async fn add_tags_to_item(&mut self, key: &str, tags: &[String]) -> Result<()> {
    let mut item = self.item(key).await?;
    let mut changed = false;
    for tag in tags {
      if !item.data.tags.iter().any(|t| &t.tag == tag) {
        item.data.tags.push(Tag::new(tag.clone()));
        changed = true;
      }
    }
    if changed { self.update_item(&item).await } else { Ok(()) }
  }

  /// Removes tags from one item.
  pub async fn remove_tags_from_item(&mut self, key: &str, tags: &[String]) -> Result<()> {
    let mut item = self.item(key).await?;
    let before = item.data.tags.len();
    item.data.tags.retain(|t| !tags.contains(&t.tag));
    if item.data.tags.len() != before { self.update_item(&item).await } else { Ok(()) }
  }

  /// Renames a tag on every item carrying it.
  pub async fn rename_tag(&mut self, old_name: &str, new_name: &str) -> Result<BatchOutcome> {
    self.merge_tags(&[old_name.to_string()], new_name).await
  }

  /// Replaces every occurrence of the source tags with the target tag.
  ///
  /// An item carrying both a source tag and the target keeps a single copy
  /// of the target.
  pub async fn merge_tags(&mut self, sources: &[String], target: &str) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    let mut seen = BTreeSet::new();
    for source in sources {
      for item in self.items_with_tag(source).await? {
        if !seen.insert(item.key.clone()) {
          continue;
        }
        let mut item = item;
        item.data.tags.retain(|t| !sources.contains(&t.tag));
        if !item.data.tags.iter().any(|t| t.tag == target) {
          item.data.tags.push(Tag::new(target));
        }
        match self.update_item(&item).await {
          Ok(()) => outcome.ok(&item.key),
          Err(error) => outcome.err(&item.key, &error),
        }
      }
    }
    debug!(?sources, target, updated = outcome.succeeded.len(), "merged tags");
    Ok(outcome)
  }

  /// Removes a tag from every item carrying it.
  pub async fn remove_tag_everywhere(&mut self, tag: &str) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    for item in self.items_with_tag(tag).await? {
      let mut item = item;
      item.data.tags.retain(|t| t.tag != tag);
      match self.update_item(&item).await {
        Ok(()) => outcome.ok(&item.key),
        Err(error) => outcome.err(&item.key, &error),
      }
    }
    Ok(outcome)
  }

  /// Deletes tags from the library's tag list outright.
  ///
  /// The endpoint takes up to 50 tags joined with `||`.
  pub async fn purge_tags(&mut self, tags: &[String]) -> Result<()> {
    for chunk in tags.chunks(50) {
      let joined = chunk.join("||");
      self.delete("tags", &[("tag", &joined)]).await?;
    }
    Ok(())
  }

  /// Tags present in the library's tag list but carried by no item.
  pub async fn unused_tags(&self) -> Result<Vec<String>> {
    let listed: Vec<TagInfo> = self.all_tags().await?;
    let used: BTreeSet<String> = self
      .all_items()
      .await?
      .iter()
      .flat_map(|item| item.data.tags.iter().map(|t| t.tag.clone()))
      .collect();
    Ok(listed.into_iter().map(|t| t.tag).filter(|tag| !used.contains(tag)).collect())
  }

  /// Deletes every unused tag and returns what was removed.
  pub async fn delete_unused_tags(&mut self) -> Result<Vec<String>> {
    let unused = self.unused_tags().await?;
    if !unused.is_empty() {
      self.purge_tags(&unused).await?;
    }
    debug!(deleted = unused.len(), "purged unused tags");
    Ok(unused)
  }

  /// Adds tags to each of the given items.
  pub async fn batch_add_tags(&mut self, keys: &[String], tags: &[String]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for key in keys {
      match self.add_tags_to_item(key, tags).await {
        Ok(()) => outcome.ok(key),
        Err(error) => outcome.err(key, &error),
      }
    }
    outcome
  }

  /// Removes tags from each of the given items.
  pub async fn batch_remove_tags(&mut self, keys: &[String], tags: &[String]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for key in keys {
      match self.remove_tags_from_item(key, tags).await {
        Ok(()) => outcome.ok(key),
        Err(error) => outcome.err(key, &error),
      }
    }
    outcome
  }
}
