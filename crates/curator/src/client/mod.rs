//! HTTP client for the reference manager's local API.
//!
//! [`Library`] is the single handle all operations hang off of. It wraps a
//! [`reqwest::Client`] pointed at the local server (port 23119 by default)
//! and exposes the library's resources through submodule `impl` blocks:
//!
//! - [`items`]: item reads, creation, edits, merges, type conversion
//! - [`collections`]: collection tree reads and membership edits
//! - [`tags`]: tag listing, rename, merge, deletion
//! - [`notes`]: child note creation and editing
//! - [`attachments`]: file upload, download, and replacement
//!
//! # Snapshot cache
//!
//! Whole-library audits would otherwise re-page through every item per
//! question, so [`Library::snapshot`] fetches the full item list once and
//! memoizes it, grouped into parents and children. Every write clears the
//! cache; a snapshot is only ever stale with respect to edits made outside
//! this handle.
//!
//! # Examples
//!
//! ```no_run
//! # use curator::{client::Library, configuration::Config, prelude::*};
//! # async fn example() -> Result<()> {
//! let mut library = Library::new(Config::default())?;
//! let status = library.probe().await?;
//! println!("library at version {} with {} items", status.version, status.total_items);
//! # Ok(())
//! # }
//! ```

pub mod attachments;
pub mod collections;
pub mod items;
pub mod notes;
pub mod tags;

use std::collections::HashMap;

use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::{configuration::Config, error::CuratorError, item::Item, prelude::*};

/// Items fetched per page. The server caps responses at 100 regardless of
/// the requested limit.
const PAGE_SIZE: usize = 100;

/// Handle to one library on the local API.
pub struct Library {
  /// Connection settings.
  config:   Config,
  /// Shared HTTP client.
  client:   reqwest::Client,
  /// Memoized full item list, cleared on every write.
  snapshot: Option<Snapshot>,
}

/// A point-in-time view of every item in the library.
#[derive(Debug, Clone)]
pub struct Snapshot {
  /// Top-level items (no parent), in server order.
  pub parents:  Vec<Item>,
  /// Child items (attachments and notes) grouped by parent key.
  pub children: HashMap<String, Vec<Item>>,
}

impl Snapshot {
  /// Splits a raw item list into parents and children-by-parent.
  fn build(items: Vec<Item>) -> Self {
    let mut parents = Vec::new();
    let mut children: HashMap<String, Vec<Item>> = HashMap::new();
    for item in items {
      match item.data.parent_item.clone() {
        Some(parent) => children.entry(parent).or_default().push(item),
        None => parents.push(item),
      }
    }
    Self { parents, children }
  }

  /// Children of one parent, empty if it has none.
  pub fn children_of(&self, key: &str) -> &[Item] {
    self.children.get(key).map(Vec::as_slice).unwrap_or(&[])
  }
}

/// Library version and size, read from response headers.
#[derive(Debug, Clone, Copy)]
pub struct LibraryStatus {
  /// Current `Last-Modified-Version` of the library.
  pub version:     u64,
  /// Total number of items, including attachments and notes.
  pub total_items: u64,
}

/// Result of an operation applied per-key across a batch.
///
/// Batch operations never abort on a single failure; each key lands in one
/// of the two lists and the caller decides what a partial result means.
#[derive(Debug, Default)]
pub struct BatchOutcome {
  /// Keys the operation succeeded on.
  pub succeeded: Vec<String>,
  /// Keys the operation failed on, with the error rendered as text.
  pub failed:    Vec<(String, String)>,
}

impl BatchOutcome {
  /// Records one success.
  pub fn ok(&mut self, key: &str) { self.succeeded.push(key.to_string()); }

  /// Records one failure.
  pub fn err(&mut self, key: &str, error: &CuratorError) {
    self.failed.push((key.to_string(), error.to_string()));
  }

  /// Whether nothing failed.
  pub fn is_clean(&self) -> bool { self.failed.is_empty() }
}

impl Library {
  /// Creates a handle from connection settings.
  ///
  /// # Errors
  ///
  /// Returns an error if the underlying HTTP client cannot be constructed.
  pub fn new(config: Config) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(std::time::Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { config, client, snapshot: None })
  }

  /// The connection settings this handle was built with.
  pub fn config(&self) -> &Config { &self.config }

  /// Full URL for a path under this library's prefix.
  fn url(&self, path: &str) -> String {
    format!("{}/{}/{}", self.config.base_url, self.config.library_prefix(), path)
  }

  /// Reads the library version and item count without fetching any items.
  pub async fn probe(&self) -> Result<LibraryStatus> {
    let response = self.get_response("items", &[("limit", "1")]).await?;
    let version = header_u64(&response, "Last-Modified-Version").unwrap_or(0);
    let total_items = header_u64(&response, "Total-Results").unwrap_or(0);
    Ok(LibraryStatus { version, total_items })
  }

  /// Returns the cached whole-library view, fetching it on first use.
  pub async fn snapshot(&mut self) -> Result<&Snapshot> {
    let snapshot = match self.snapshot.take() {
      Some(snapshot) => snapshot,
      None => {
        debug!("building library snapshot");
        Snapshot::build(self.fetch_item_pages("items", &[]).await?)
      },
    };
    Ok(self.snapshot.insert(snapshot))
  }

  /// Drops the cached snapshot. Called internally after every write.
  pub fn invalidate(&mut self) { self.snapshot = None; }

  // --- request plumbing -----------------------------------------------------

  /// Sends a GET and maps non-success statuses to [`CuratorError::Api`].
  pub(crate) async fn get_response(
    &self,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<Response> {
    let url = self.url(path);
    trace!(%url, ?query, "GET");
    let response = self
      .client
      .get(&url)
      .header("Zotero-API-Key", &self.config.api_key)
      .query(query)
      .send()
      .await?;
    check(response).await
  }

  /// GETs a path and deserializes the JSON body.
  pub(crate) async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<T> {
    Ok(self.get_response(path, query).await?.json().await?)
  }

  /// POSTs a JSON body and deserializes the JSON response.
  pub(crate) async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
    &mut self,
    path: &str,
    body: &B,
  ) -> Result<T> {
    let url = self.url(path);
    trace!(%url, "POST");
    let response = self
      .client
      .post(&url)
      .header("Zotero-API-Key", &self.config.api_key)
      .json(body)
      .send()
      .await;
    self.invalidate();
    check(response?).await?.json().await.map_err(Into::into)
  }

  /// Sends a DELETE guarded by the library's current version.
  pub(crate) async fn delete(&mut self, path: &str, query: &[(&str, &str)]) -> Result<()> {
    let version = self.probe().await?.version;
    let url = self.url(path);
    debug!(%url, version, "DELETE");
    let response = self
      .client
      .delete(&url)
      .header("Zotero-API-Key", &self.config.api_key)
      .header("If-Unmodified-Since-Version", version)
      .query(query)
      .send()
      .await;
    self.invalidate();
    check(response?).await?;
    Ok(())
  }

  /// Fetches every page of a listing endpoint.
  ///
  /// Pages by `start`/`limit` and stops once a page comes back short, so a
  /// library that is an exact multiple of the page size costs one extra
  /// (empty) request and nothing more.
  pub(crate) async fn fetch_pages<T: DeserializeOwned>(
    &self,
    path: &str,
    extra: &[(&str, &str)],
  ) -> Result<Vec<T>> {
    let mut results = Vec::new();
    let mut start = 0usize;
    loop {
      let start_s = start.to_string();
      let limit_s = PAGE_SIZE.to_string();
      let mut query: Vec<(&str, &str)> = vec![("start", &start_s), ("limit", &limit_s)];
      query.extend_from_slice(extra);
      let page: Vec<T> = self.get_json(path, &query).await?;
      let got = page.len();
      trace!(path, start, got, "fetched page");
      results.extend(page);
      if got < PAGE_SIZE {
        break;
      }
      start += got;
    }
    debug!(path, total = results.len(), "fetched all pages");
    Ok(results)
  }

  /// Convenience wrapper over [`Library::fetch_pages`] for item listings.
  pub(crate) async fn fetch_item_pages(
    &self,
    path: &str,
    extra: &[(&str, &str)],
  ) -> Result<Vec<Item>> {
    self.fetch_pages(path, extra).await
  }
}

/// Parses a numeric response header.
fn header_u64(response: &Response, name: &str) -> Option<u64> {
  response.headers().get(name)?.to_str().ok()?.parse().ok()
}

/// Maps non-success responses to [`CuratorError::Api`] with the body text as
/// the message.
async fn check(response: Response) -> Result<Response> {
  let status = response.status();
  if status.is_success() {
    Ok(response)
  } else {
    let message = response.text().await.unwrap_or_default();
    Err(CuratorError::Api { status: status.as_u16(), message })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(key: &str, parent: Option<&str>) -> Item {
    let mut item = Item { key: key.to_string(), ..Default::default() };
    item.data.item_type = "journalArticle".to_string();
    item.data.parent_item = parent.map(String::from);
    item
  }

  #[test]
  fn snapshot_groups_children_by_parent() {
    let snapshot = Snapshot::build(vec![
      item("AAAAAAAA", None),
      item("BBBBBBBB", Some("AAAAAAAA")),
      item("CCCCCCCC", Some("AAAAAAAA")),
      item("DDDDDDDD", None),
    ]);
    assert_eq!(snapshot.parents.len(), 2);
    assert_eq!(snapshot.children_of("AAAAAAAA").len(), 2);
    assert!(snapshot.children_of("DDDDDDDD").is_empty());
  }

  #[test]
  fn batch_outcome_tracks_both_sides() {
    let mut outcome = BatchOutcome::default();
    outcome.ok("AAAAAAAA");
    outcome.err("BBBBBBBB", &CuratorError::NotFound { kind: "item", key: "BBBBBBBB".into() });
    assert!(!outcome.is_clean());
    assert_eq!(outcome.succeeded, ["AAAAAAAA"]);
    assert_eq!(outcome.failed[0].0, "BBBBBBBB");
  }
}
