//! Metadata fetch from public bibliographic services.
//!
//! Each service implements [`MetadataSource`]: identifier in, item draft
//! out. Routing from free-form input to the right source goes through
//! [`Identifier::parse`] — DOIs to CrossRef, arXiv ids to arXiv, ISBNs to
//! OpenLibrary.
//!
//! These talk to the public internet, unlike everything else in this
//! crate. Requests carry a 10 second timeout and are made once; a failed
//! fetch is returned to the caller rather than retried.
//!
//! # Examples
//!
//! ```no_run
//! # use curator::{client::Library, configuration::Config, prelude::*};
//! # async fn example() -> Result<()> {
//! let mut library = Library::new(Config::default())?;
//! let key = library.import_by_identifier("10.1038/nature12373").await?;
//! println!("created {key}");
//! # Ok(())
//! # }
//! ```

pub mod arxiv;
pub mod crossref;
pub mod openlibrary;

use async_trait::async_trait;
pub use arxiv::Arxiv;
pub use crossref::CrossRef;
pub use openlibrary::OpenLibrary;
use tracing::debug;

use crate::{client::Library, identifier::Identifier, item::ItemData, prelude::*};

/// Timeout for remote metadata requests.
pub(crate) const REMOTE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// A bibliographic metadata service.
#[async_trait]
pub trait MetadataSource: Send + Sync {
  /// Service name, for logs and diagnostics.
  fn name(&self) -> &'static str;

  /// Fetches metadata for an identifier and maps it to an item draft.
  async fn fetch(&self, id: &str) -> Result<ItemData>;
}

/// Builds a shared HTTP client for a metadata source.
pub(crate) fn remote_client() -> Result<reqwest::Client> {
  Ok(reqwest::Client::builder().timeout(REMOTE_TIMEOUT).build()?)
}

/// Fetches metadata for a classified identifier from its natural source.
pub async fn fetch_metadata(identifier: &Identifier) -> Result<ItemData> {
  let (source, id): (Box<dyn MetadataSource>, &str) = match identifier {
    Identifier::Doi(doi) => (Box::new(CrossRef::new()?), doi.as_str()),
    Identifier::Arxiv(id) => (Box::new(Arxiv::new()?), id.as_str()),
    Identifier::Isbn(isbn) => (Box::new(OpenLibrary::new()?), isbn.as_str()),
  };
  debug!(source = source.name(), id, "fetching remote metadata");
  source.fetch(id).await
}

impl Library {
  /// Fetches CrossRef metadata for a DOI and creates the item. Returns the
  /// new item's key.
  pub async fn import_by_doi(&mut self, doi: &str) -> Result<String> {
    let normalized = crate::identifier::normalize_doi(doi);
    let draft = CrossRef::new()?.fetch(&normalized).await?;
    self.create_item(draft).await
  }

  /// Fetches OpenLibrary metadata for an ISBN and creates the item.
  pub async fn import_by_isbn(&mut self, isbn: &str) -> Result<String> {
    let cleaned: String = isbn.chars().filter(|c| *c != '-' && *c != ' ').collect();
    let draft = OpenLibrary::new()?.fetch(&cleaned).await?;
    self.create_item(draft).await
  }

  /// Fetches arXiv metadata for an id and creates the item.
  pub async fn import_by_arxiv(&mut self, arxiv_id: &str) -> Result<String> {
    let normalized = crate::identifier::normalize_arxiv(arxiv_id);
    let draft = Arxiv::new()?.fetch(&normalized).await?;
    self.create_item(draft).await
  }

  /// Classifies free-form input and imports from whichever source it
  /// routes to.
  pub async fn import_by_identifier(&mut self, input: &str) -> Result<String> {
    let identifier = Identifier::parse(input)?;
    let draft = fetch_metadata(&identifier).await?;
    self.create_item(draft).await
  }
}
