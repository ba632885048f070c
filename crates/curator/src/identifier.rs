//! Identifier validation and routing.
//!
//! Format validation here is intentionally shallow: a DOI is checked against
//! the registration-agency pattern and an ISBN against its digit shape, but
//! no checksum or resolution is attempted. The audits built on these checks
//! flag entry mistakes (a URL pasted into the DOI field, a truncated ISBN),
//! and checksums would mostly flag legitimate identifiers typed from paper.
//!
//! [`Identifier`] classifies free-form input (a DOI, an arXiv id, or an
//! ISBN, with common prefixes stripped) so callers can route it to the
//! right metadata source.
//!
//! # Examples
//!
//! ```
//! use curator::identifier::{validate_doi, Identifier};
//!
//! assert!(validate_doi("10.1145/1327452.1327492"));
//! assert!(!validate_doi("not-a-doi"));
//!
//! let id = Identifier::parse("https://doi.org/10.1145/1327452.1327492")?;
//! assert!(matches!(id, Identifier::Doi(_)));
//! # Ok::<(), curator::prelude::CuratorError>(())
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::{error::CuratorError, prelude::*};

lazy_static! {
  /// DOI shape: registrant prefix `10.NNNN` through `10.NNNNNNNNN`, a
  /// slash, then the registrant-assigned suffix.
  static ref DOI: Regex = Regex::new(r"(?i)^10\.\d{4,9}/[-._;()/:A-Z0-9]+").unwrap();

  /// ISBN-10 after hyphen/space removal: nine digits plus a digit or `X`
  /// check character.
  static ref ISBN10: Regex = Regex::new(r"^\d{9}[\dX]$").unwrap();

  /// ISBN-13 after hyphen/space removal.
  static ref ISBN13: Regex = Regex::new(r"^\d{13}$").unwrap();

  /// ISSN: two groups of four, the last character may be `X`.
  static ref ISSN: Regex = Regex::new(r"^\d{4}-\d{3}[\dX]").unwrap();

  /// Minimal URL sanity: an http or https scheme.
  static ref HTTP_URL: Regex = Regex::new(r"^https?://").unwrap();

  /// Modern arXiv id, e.g. `2301.07041` or `2301.07041v2`.
  static ref ARXIV_NEW: Regex = Regex::new(r"^\d{4}\.\d{4,5}(v\d+)?$").unwrap();

  /// Pre-2007 arXiv id, e.g. `math/0307200v3`.
  static ref ARXIV_OLD: Regex = Regex::new(r"^[a-z-]+(\.[A-Z]{2})?/\d{7}(v\d+)?$").unwrap();
}

/// Whether a string looks like a DOI.
pub fn validate_doi(doi: &str) -> bool { DOI.is_match(doi) }

/// Whether a string looks like an ISBN-10 or ISBN-13. Hyphens and spaces
/// are ignored.
pub fn validate_isbn(isbn: &str) -> bool {
  let cleaned = normalize_isbn(isbn);
  match cleaned.len() {
    10 => ISBN10.is_match(&cleaned),
    13 => ISBN13.is_match(&cleaned),
    _ => false,
  }
}

/// Drops hyphens and spaces, uppercasing a trailing `x` check character.
pub fn normalize_isbn(input: &str) -> String {
  input.chars().filter(|c| *c != '-' && *c != ' ').map(|c| c.to_ascii_uppercase()).collect()
}

/// Whether a string looks like an ISSN.
pub fn validate_issn(issn: &str) -> bool { ISSN.is_match(issn) }

/// Whether a string looks like an http(s) URL.
pub fn validate_url(url: &str) -> bool { HTTP_URL.is_match(url) }

/// Strips `doi.org` URL and `doi:` prefixes, leaving the bare DOI.
pub fn normalize_doi(input: &str) -> String {
  let trimmed = input.trim();
  let stripped = trimmed
    .strip_prefix("https://doi.org/")
    .or_else(|| trimmed.strip_prefix("http://doi.org/"))
    .or_else(|| trimmed.strip_prefix("https://dx.doi.org/"))
    .or_else(|| trimmed.strip_prefix("http://dx.doi.org/"))
    .or_else(|| trimmed.strip_prefix("doi:"))
    .unwrap_or(trimmed);
  stripped.to_string()
}

/// Strips `arxiv.org` URL and `arXiv:` prefixes, leaving the bare id.
pub fn normalize_arxiv(input: &str) -> String {
  let trimmed = input.trim();
  let stripped = trimmed
    .strip_prefix("https://arxiv.org/abs/")
    .or_else(|| trimmed.strip_prefix("http://arxiv.org/abs/"))
    .or_else(|| trimmed.strip_prefix("arXiv:"))
    .or_else(|| trimmed.strip_prefix("arxiv:"))
    .unwrap_or(trimmed);
  stripped.to_string()
}

/// A classified identifier, ready to be routed to a metadata source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
  /// A DOI, with URL/`doi:` decoration stripped.
  Doi(String),
  /// An arXiv id, old or new style, with URL/`arXiv:` decoration stripped.
  Arxiv(String),
  /// An ISBN, with hyphens and spaces removed.
  Isbn(String),
}

impl Identifier {
  /// Classifies free-form input.
  ///
  /// # Errors
  ///
  /// Returns [`CuratorError::InvalidIdentifier`] when nothing matches and
  /// [`CuratorError::AmbiguousIdentifier`] when the input matches more than
  /// one format.
  pub fn parse(input: &str) -> Result<Self> {
    let mut matches = Vec::new();

    let doi = normalize_doi(input);
    if validate_doi(&doi) {
      matches.push(Identifier::Doi(doi));
    }
    let arxiv = normalize_arxiv(input);
    if ARXIV_NEW.is_match(&arxiv) || ARXIV_OLD.is_match(&arxiv) {
      matches.push(Identifier::Arxiv(arxiv));
    }
    if validate_isbn(input) {
      matches.push(Identifier::Isbn(normalize_isbn(input)));
    }

    match matches.len() {
      0 => Err(CuratorError::InvalidIdentifier(input.to_string())),
      1 => Ok(matches.remove(0)),
      _ => Err(CuratorError::AmbiguousIdentifier(
        matches.iter().map(|m| m.source_name().to_string()).collect(),
      )),
    }
  }

  /// Name of the format family, used in diagnostics.
  pub fn source_name(&self) -> &'static str {
    match self {
      Identifier::Doi(_) => "doi",
      Identifier::Arxiv(_) => "arxiv",
      Identifier::Isbn(_) => "isbn",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn doi_validation() {
    assert!(validate_doi("10.1145/1327452.1327492"));
    assert!(validate_doi("10.1038/s41586-021-03819-2"));
    // case-insensitive suffix
    assert!(validate_doi("10.1002/(SICI)1097-4628"));
    assert!(!validate_doi("11.1145/1327452"));
    assert!(!validate_doi("10.12/short-prefix"));
    assert!(!validate_doi("https://example.com"));
  }

  #[test]
  fn isbn_validation() {
    assert!(validate_isbn("0306406152"));
    assert!(validate_isbn("030640615X"));
    assert!(validate_isbn("978-0-306-40615-7"));
    assert!(validate_isbn("978 0 306 40615 7"));
    assert!(!validate_isbn("03064061"));
    assert!(!validate_isbn("abcdefghij"));
  }

  #[test]
  fn issn_and_url_validation() {
    assert!(validate_issn("2049-3630"));
    assert!(validate_issn("0028-083X"));
    assert!(!validate_issn("20493630"));
    assert!(validate_url("https://example.com/paper"));
    assert!(!validate_url("example.com/paper"));
  }

  #[test]
  fn doi_normalization() {
    assert_eq!(normalize_doi("https://doi.org/10.1145/3"), "10.1145/3");
    assert_eq!(normalize_doi("doi:10.1145/3"), "10.1145/3");
    assert_eq!(normalize_doi("  10.1145/3 "), "10.1145/3");
  }

  #[test]
  fn isbn_normalization() {
    assert_eq!(normalize_isbn("978-0-306-40615-7"), "9780306406157");
    assert_eq!(normalize_isbn("030640615x"), "030640615X");
  }

  #[test]
  fn identifier_routing() {
    assert_eq!(
      Identifier::parse("https://doi.org/10.1145/1327452.1327492").unwrap(),
      Identifier::Doi("10.1145/1327452.1327492".to_string())
    );
    assert_eq!(
      Identifier::parse("arXiv:2301.07041").unwrap(),
      Identifier::Arxiv("2301.07041".to_string())
    );
    assert_eq!(
      Identifier::parse("math/0307200v3").unwrap(),
      Identifier::Arxiv("math/0307200v3".to_string())
    );
    assert_eq!(
      Identifier::parse("978-0-306-40615-7").unwrap(),
      Identifier::Isbn("9780306406157".to_string())
    );
    assert!(matches!(
      Identifier::parse("not an identifier"),
      Err(CuratorError::InvalidIdentifier(_))
    ));
  }
}
