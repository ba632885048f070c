//! Child note creation, editing, and search.
//!
//! Note bodies are HTML. Operations that take a note key verify the item
//! really is a note before touching it, so a mistyped item key fails with
//! [`CuratorError::WrongItemType`] instead of silently overwriting a
//! bibliographic record.

use lazy_static::lazy_static;
use regex::Regex;

use super::Library;
use crate::{
  error::CuratorError,
  item::{Item, ItemData},
  prelude::*,
};

lazy_static! {
  /// Matches HTML tags, for plain-text search over note bodies.
  static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
}

/// Replaces HTML tags with spaces, leaving the text content.
pub(crate) fn strip_html(html: &str) -> String { HTML_TAG.replace_all(html, " ").into_owned() }

impl Library {
  /// The notes attached to one item.
  pub async fn notes_for_item(&self, key: &str) -> Result<Vec<Item>> {
    Ok(self.children(key).await?.into_iter().filter(Item::is_note).collect())
  }

  /// Every note in the library, standalone notes included.
  pub async fn all_notes(&self) -> Result<Vec<Item>> {
    self.fetch_item_pages("items", &[("itemType", "note")]).await
  }

  /// Attaches an HTML note to an item and returns the note's key.
  pub async fn attach_note(&mut self, parent_key: &str, html: &str) -> Result<String> {
    let mut draft = ItemData::new("note");
    draft.parent_item = Some(parent_key.to_string());
    draft.note = Some(html.to_string());
    self.create_item(draft).await
  }

  /// Replaces the body of an existing note.
  pub async fn update_note(&mut self, note_key: &str, html: &str) -> Result<()> {
    let mut note = self.expect_note(note_key).await?;
    note.data.note = Some(html.to_string());
    self.update_item(&note).await
  }

  /// Moves a note to the trash. The parent item is unaffected.
  pub async fn delete_note(&mut self, note_key: &str) -> Result<()> {
    self.expect_note(note_key).await?;
    self.trash_item(note_key).await
  }

  /// Case-insensitive plain-text search over every note body.
  ///
  /// Tags are stripped before matching, so a query never matches HTML
  /// markup.
  pub async fn search_notes(&self, query: &str) -> Result<Vec<Item>> {
    let needle = query.to_lowercase();
    Ok(
      self
        .all_notes()
        .await?
        .into_iter()
        .filter(|note| {
          let body = note.data.note.as_deref().unwrap_or_default();
          strip_html(body).to_lowercase().contains(&needle)
        })
        .collect(),
    )
  }

  /// Fetches an item and insists it is a note.
  async fn expect_note(&self, key: &str) -> Result<Item> {
    let item = self.item(key).await?;
    if item.is_note() {
      Ok(item)
    } else {
      Err(CuratorError::WrongItemType {
        key:      key.to_string(),
        expected: "note",
        actual:   item.data.item_type,
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strip_html_leaves_text() {
    assert_eq!(strip_html("<p>Hello <b>world</b></p>"), " Hello  world  ");
    assert_eq!(strip_html("no markup"), "no markup");
  }
}
