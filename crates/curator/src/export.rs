//! JSON and CSV export, with format dispatch over BibTeX too.
//!
//! Exports are string-producing: callers (usually the command line) decide
//! whether the result goes to a file or stdout. JSON round-trips through
//! [`import_items_json`]; CSV is a lossy flat projection meant for
//! spreadsheets.
//!
//! [`import_items_json`]: crate::client::Library::import_items_json

use std::{collections::HashMap, str::FromStr};

use csv::{QuoteStyle, WriterBuilder};
use serde_json::Value;
use tracing::warn;

use crate::{
  client::Library,
  error::CuratorError,
  item::{Item, ItemData},
  prelude::*,
};

/// Columns exported when the caller doesn't pick their own.
pub const DEFAULT_CSV_FIELDS: &[&str] = &[
  "title",
  "creator",
  "date",
  "itemType",
  "publicationTitle",
  "DOI",
  "url",
  "abstractNote",
  "tags",
];

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
  /// Native JSON, lossless.
  Json,
  /// Flat CSV with the default columns.
  Csv,
  /// BibTeX entries keyed by item key.
  Bibtex,
}

impl FromStr for ExportFormat {
  type Err = CuratorError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "json" => Ok(ExportFormat::Json),
      "csv" => Ok(ExportFormat::Csv),
      "bibtex" | "bib" => Ok(ExportFormat::Bibtex),
      other => Err(CuratorError::Config(format!("unknown export format: {other}"))),
    }
  }
}

/// Serializes items as pretty-printed JSON.
pub fn to_json(items: &[Item]) -> Result<String> { Ok(serde_json::to_string_pretty(items)?) }

/// Serializes items as CSV with every cell quoted.
///
/// The pseudo-field `creator` renders the creator list as
/// `Last, First; Last, First`; `tags` joins tag names with `; `. Any other
/// name indexes the item's serialized data, so unmodeled fields export
/// fine.
pub fn to_csv(items: &[Item], fields: &[&str]) -> Result<String> {
  let mut writer = WriterBuilder::new().quote_style(QuoteStyle::Always).from_writer(vec![]);
  writer.write_record(fields)?;

  for item in items {
    let data = serde_json::to_value(&item.data)?;
    let row: Vec<String> = fields.iter().map(|field| csv_cell(item, &data, field)).collect();
    writer.write_record(&row)?;
  }

  let bytes =
    writer.into_inner().map_err(|e| CuratorError::Config(format!("CSV buffer error: {e}")))?;
  Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Renders one CSV cell.
fn csv_cell(item: &Item, data: &Value, field: &str) -> String {
  match field {
    "creator" => item
      .data
      .creators
      .iter()
      .map(crate::item::Creator::display_name)
      .filter(|n| !n.is_empty())
      .collect::<Vec<_>>()
      .join("; "),
    "tags" => item.tag_names().join("; "),
    _ => match data.get(field) {
      Some(Value::String(s)) => s.clone(),
      Some(Value::Null) | None => String::new(),
      Some(other) => other.to_string(),
    },
  }
}

impl Library {
  /// Exports the given items in a format.
  ///
  /// BibTeX export pulls each item's first note out of the snapshot for
  /// the `annote` field.
  pub async fn export_items(&mut self, items: &[Item], format: ExportFormat) -> Result<String> {
    match format {
      ExportFormat::Json => to_json(items),
      ExportFormat::Csv => to_csv(items, DEFAULT_CSV_FIELDS),
      ExportFormat::Bibtex => {
        let snapshot = self.snapshot().await?;
        let notes_by_parent: HashMap<String, String> = items
          .iter()
          .filter_map(|item| {
            let note = snapshot.children_of(&item.key).iter().find(|c| c.is_note())?;
            Some((item.key.clone(), note.data.note.clone()?))
          })
          .collect();
        Ok(crate::bibtex::render(items, &notes_by_parent))
      },
    }
  }

  /// Exports every item in the library.
  pub async fn export_library(&mut self, format: ExportFormat) -> Result<String> {
    let items = self.snapshot().await?.parents.clone();
    self.export_items(&items, format).await
  }

  /// Exports the items of one collection.
  pub async fn export_collection(&mut self, key: &str, format: ExportFormat) -> Result<String> {
    let items = self.items_in_collection(key).await?;
    self.export_items(&items, format).await
  }

  /// Imports items from native JSON.
  ///
  /// Accepts either full items (`{"key": …, "data": {…}}`) or bare data
  /// objects, as a single object or an array. Parents are imported before
  /// children so attachments and notes find their parent. An entry whose
  /// key names an existing item updates it in place; everything else is
  /// created fresh. Returns the touched keys; entries that fail are logged
  /// and skipped.
  pub async fn import_items_json(&mut self, json: &str) -> Result<Vec<String>> {
    let parsed: Value = serde_json::from_str(json)?;
    let raw_items = match parsed {
      Value::Array(values) => values,
      single => vec![single],
    };

    let mut parents = Vec::new();
    let mut children = Vec::new();
    for raw in raw_items {
      let outer_key = raw.get("key").and_then(Value::as_str).map(String::from);
      let data_value = match raw.get("data") {
        Some(data) => data.clone(),
        None => raw,
      };
      let mut draft: ItemData = match serde_json::from_value(data_value) {
        Ok(data) => data,
        Err(error) => {
          warn!(%error, "skipping unparsable entry in JSON import");
          continue;
        },
      };
      if draft.key.is_none() {
        draft.key = outer_key;
      }
      if draft.parent_item.is_some() {
        children.push(draft);
      } else {
        parents.push(draft);
      }
    }

    let mut imported = Vec::new();
    for draft in parents.into_iter().chain(children) {
      match self.import_one(draft).await {
        Ok(key) => imported.push(key),
        Err(error) => warn!(%error, "skipping entry that failed to import"),
      }
    }
    Ok(imported)
  }

  /// Updates in place when the draft's key names an existing item,
  /// otherwise creates a fresh one.
  async fn import_one(&mut self, draft: ItemData) -> Result<String> {
    if let Some(key) = draft.key.clone() {
      if let Ok(mut existing) = self.item(&key).await {
        existing.data = draft;
        self.update_item(&existing).await?;
        return Ok(key);
      }
    }
    self.create_item(draft.as_draft()).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::item::{Creator, Tag};

  fn sample() -> Item {
    let mut item = Item { key: "AAAAAAAA".to_string(), ..Default::default() };
    item.data.item_type = "journalArticle".to_string();
    item.data.title = Some("A \"Quoted\" Title".to_string());
    item.data.date = Some("2020".to_string());
    item.data.creators.push(Creator::author("Ada", "Lovelace"));
    item.data.tags.push(Tag::new("computing"));
    item.data.tags.push(Tag::new("history"));
    item
  }

  #[test]
  fn csv_quotes_everything_and_joins_lists() {
    let csv = to_csv(&[sample()], &["title", "creator", "tags", "DOI"]).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next().unwrap(), "\"title\",\"creator\",\"tags\",\"DOI\"");
    let row = lines.next().unwrap();
    assert!(row.contains("\"Lovelace, Ada\""));
    assert!(row.contains("\"computing; history\""));
    assert!(row.ends_with("\"\""));
  }

  #[test]
  fn json_round_trips() {
    let json = to_json(&[sample()]).unwrap();
    let back: Vec<Item> = serde_json::from_str(&json).unwrap();
    assert_eq!(back[0].key, "AAAAAAAA");
    assert_eq!(back[0].data.tags.len(), 2);
  }

  #[test]
  fn format_parsing() {
    assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
    assert_eq!("bib".parse::<ExportFormat>().unwrap(), ExportFormat::Bibtex);
    assert!("yaml".parse::<ExportFormat>().is_err());
  }
}
