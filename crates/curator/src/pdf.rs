//! PDF content extraction.
//!
//! Pulls page text and document-info metadata out of PDF bytes with
//! [`lopdf`]. Extraction is best effort: pages whose content streams
//! cannot be decoded are skipped, and works only for text-based PDFs,
//! not scanned images.

use lopdf::Document;
use serde::Serialize;
use tracing::{debug, trace};

use crate::{client::Library, error::CuratorError, prelude::*};

/// Extracted text and metadata of one PDF.
#[derive(Debug, Serialize, Default)]
pub struct PdfContent {
  /// Document-info metadata.
  pub metadata: PdfMetadata,
  /// Per-page text, skipping pages that yielded none.
  pub pages:    Vec<PageContent>,
}

/// The document-info dictionary fields worth surfacing.
#[derive(Debug, Serialize, Default)]
pub struct PdfMetadata {
  /// Title.
  pub title:    Option<String>,
  /// Author.
  pub author:   Option<String>,
  /// Subject.
  pub subject:  Option<String>,
  /// Keywords.
  pub keywords: Option<String>,
}

/// Text of a single page.
#[derive(Debug, Serialize, Default)]
pub struct PageContent {
  /// 1-based page number.
  pub page_number: u32,
  /// Extracted text.
  pub text:        String,
}

impl PdfContent {
  /// All page text joined with blank lines.
  pub fn full_text(&self) -> String {
    self.pages.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join("\n\n")
  }
}

/// Parses PDF bytes into metadata and per-page text.
pub fn analyze(bytes: &[u8]) -> Result<PdfContent> {
  let doc = Document::load_mem(bytes)?;
  let metadata = extract_metadata(&doc);

  let mut pages = Vec::new();
  for page_number in doc.get_pages().keys() {
    match doc.extract_text(&[*page_number]) {
      Ok(text) => {
        let text = text.trim().to_string();
        if !text.is_empty() {
          pages.push(PageContent { page_number: *page_number, text });
        }
      },
      Err(e) => trace!(page = page_number, error = %e, "skipping undecodable page"),
    }
  }
  debug!(pages = pages.len(), "extracted pdf text");

  Ok(PdfContent { metadata, pages })
}

/// Reads the document-info dictionary, tolerating its absence.
fn extract_metadata(doc: &Document) -> PdfMetadata {
  let info = doc
    .trailer
    .get(b"Info")
    .ok()
    .and_then(|o| o.as_reference().ok())
    .and_then(|r| doc.get_object(r).ok())
    .and_then(|o| o.as_dict().ok());

  match info {
    Some(dict) => PdfMetadata {
      title:    info_string(dict, "Title"),
      author:   info_string(dict, "Author"),
      subject:  info_string(dict, "Subject"),
      keywords: info_string(dict, "Keywords"),
    },
    None => PdfMetadata::default(),
  }
}

/// Decodes a document-info string, handling the UTF-16BE BOM variant.
fn info_string(dict: &lopdf::Dictionary, key: &str) -> Option<String> {
  dict.get(key.as_bytes()).ok().and_then(|obj| obj.as_str().ok()).map(|bytes| {
    if bytes.starts_with(&[0xFE, 0xFF]) {
      let units: Vec<u16> =
        bytes[2..].chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect();
      String::from_utf16_lossy(&units)
    } else {
      String::from_utf8_lossy(bytes).into_owned()
    }
  })
}

impl Library {
  /// Downloads a PDF attachment and extracts its text and metadata.
  ///
  /// Fails when the key does not name an attachment or the attachment is
  /// not a PDF.
  pub async fn extract_text_from_pdf(&mut self, attachment_key: &str) -> Result<PdfContent> {
    let attachment = self.item(attachment_key).await?;
    if !attachment.is_attachment() {
      return Err(CuratorError::WrongItemType {
        key:      attachment_key.to_string(),
        expected: "attachment",
        actual:   attachment.data.item_type.clone(),
      });
    }
    if !attachment.is_pdf_attachment() {
      let content_type = attachment.data.content_type.unwrap_or_default();
      return Err(CuratorError::File(format!(
        "attachment {attachment_key} is not a PDF (content type: {content_type})"
      )));
    }

    let bytes = self.attachment_bytes(attachment_key).await?;
    analyze(&bytes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn utf16_info_strings_decode() {
    let mut dict = lopdf::Dictionary::new();
    // "Hi" as UTF-16BE with BOM.
    dict.set("Title", lopdf::Object::String(
      vec![0xFE, 0xFF, 0x00, b'H', 0x00, b'i'],
      lopdf::StringFormat::Literal,
    ));
    dict.set("Author", lopdf::Object::String(b"Ada Lovelace".to_vec(), lopdf::StringFormat::Literal));

    assert_eq!(info_string(&dict, "Title").as_deref(), Some("Hi"));
    assert_eq!(info_string(&dict, "Author").as_deref(), Some("Ada Lovelace"));
    assert_eq!(info_string(&dict, "Subject"), None);
  }

  #[test]
  fn garbage_bytes_fail_to_parse() {
    assert!(analyze(b"not a pdf at all").is_err());
  }

  #[test]
  fn full_text_joins_pages() {
    let content = PdfContent {
      metadata: PdfMetadata::default(),
      pages:    vec![
        PageContent { page_number: 1, text: "first".to_string() },
        PageContent { page_number: 2, text: "second".to_string() },
      ],
    };
    assert_eq!(content.full_text(), "first\n\nsecond");
  }
}
