//! Integration tests for the library client.
//!
//! Everything that talks to the local API is `#[ignore]`d: run those with
//! `cargo test -- --ignored` against a scratch Zotero profile, never a real
//! library, since some of them write.

use anyhow::Result;
use curator::{
  client::Library,
  configuration::{Config, LibraryKind},
  export::ExportFormat,
  item::ItemData,
};
use tempfile::tempdir;
use tracing_test::traced_test;

fn live_library() -> Result<Library> { Ok(Library::new(Config::default())?) }

#[test]
fn config_round_trips_through_a_file() -> Result<()> {
  let dir = tempdir()?;
  let path = dir.path().join("config.toml");
  std::fs::write(&path, "library_kind = \"group\"\nlibrary_id = 4827351\ntimeout_secs = 5\n")?;

  let config = Config::from_file(&path)?;
  assert_eq!(config.library_kind, LibraryKind::Group);
  assert_eq!(config.library_prefix(), "groups/4827351");
  assert_eq!(config.timeout_secs, 5);
  // unspecified fields keep their defaults
  assert_eq!(config.base_url, "http://localhost:23119/api");
  Ok(())
}

#[tokio::test]
#[ignore = "needs a running Zotero with the local API enabled"]
async fn probe_reports_library_version() -> Result<()> {
  let library = live_library()?;
  let status = library.probe().await?;
  assert!(status.version > 0);
  Ok(())
}

#[tokio::test]
#[traced_test]
#[ignore = "needs a running Zotero with the local API enabled"]
async fn snapshot_is_reused_until_a_write() -> Result<()> {
  let mut library = live_library()?;
  let first = library.snapshot().await?.parents.len();
  // second call must hit the cache, not re-page the library
  let second = library.snapshot().await?.parents.len();
  assert_eq!(first, second);
  assert!(logs_contain("building library snapshot"));
  Ok(())
}

#[tokio::test]
#[ignore = "needs a running Zotero with the local API enabled; writes to it"]
async fn create_tag_and_trash_round_trip() -> Result<()> {
  let mut library = live_library()?;

  let mut draft = ItemData::new("journalArticle");
  draft.title = Some("curator integration scratch item".to_string());
  let key = library.create_item(draft).await?;

  library.add_tags_to_item(&key, &["curator-test".to_string()]).await?;
  let tagged = library.items_with_tag("curator-test").await?;
  assert!(tagged.iter().any(|item| item.key == key));

  library.trash_item(&key).await?;
  let trashed = library.trash_items().await?;
  assert!(trashed.iter().any(|item| item.key == key));
  Ok(())
}

#[tokio::test]
#[ignore = "needs a running Zotero with the local API enabled"]
async fn export_formats_agree_on_item_count() -> Result<()> {
  let mut library = live_library()?;
  let json = library.export_library(ExportFormat::Json).await?;
  let items: Vec<serde_json::Value> = serde_json::from_str(&json)?;

  let csv = library.export_library(ExportFormat::Csv).await?;
  // header plus one row per item
  assert_eq!(csv.lines().count(), items.len() + 1);
  Ok(())
}
