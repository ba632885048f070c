//! Attachment metadata and file transfer.
//!
//! File content moves through `items/{key}/file`: a raw GET returns the
//! stored bytes, a raw POST with the content type replaces them. Uploads
//! happen in two steps — create the attachment item with the file's MD5 and
//! mtime, then push the bytes — so an interrupted upload leaves a visible
//! attachment with no file rather than an orphaned file.

use std::path::Path;

use md5::{Digest, Md5};
use tracing::debug;

use super::Library;
use crate::{
  error::CuratorError,
  item::{Item, ItemData},
  prelude::*,
};

/// Guesses a MIME type from a file extension. Falls back to a generic
/// binary type; the reference manager only treats `application/pdf`
/// specially.
fn content_type_for(path: &Path) -> &'static str {
  match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref() {
    Some("pdf") => "application/pdf",
    Some("txt") => "text/plain",
    Some("html") | Some("htm") => "text/html",
    Some("epub") => "application/epub+zip",
    Some("png") => "image/png",
    Some("jpg") | Some("jpeg") => "image/jpeg",
    _ => "application/octet-stream",
  }
}

/// File modification time in milliseconds since the epoch, when the
/// platform can report one.
fn mtime_millis(path: &Path) -> Option<i64> {
  let modified = std::fs::metadata(path).ok()?.modified().ok()?;
  let since_epoch = modified.duration_since(std::time::UNIX_EPOCH).ok()?;
  i64::try_from(since_epoch.as_millis()).ok()
}

/// Plain filename component of a path.
fn filename_of(path: &Path) -> String {
  path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Stored-file metadata of one attachment, as shown by
/// [`Library::attachment_info`].
#[derive(Debug, Clone)]
pub struct AttachmentInfo {
  /// Attachment item key.
  pub key:          String,
  /// Display title.
  pub title:        String,
  /// MIME type of the stored file.
  pub content_type: String,
  /// Stored filename.
  pub filename:     String,
  /// MD5 of the stored file.
  pub md5:          String,
}

impl Library {
  /// The attachments of one item.
  pub async fn attachments_for_item(&self, key: &str) -> Result<Vec<Item>> {
    Ok(self.children(key).await?.into_iter().filter(Item::is_attachment).collect())
  }

  /// File metadata for every attachment of an item.
  pub async fn attachment_info(&self, key: &str) -> Result<Vec<AttachmentInfo>> {
    Ok(
      self
        .attachments_for_item(key)
        .await?
        .into_iter()
        .map(|a| AttachmentInfo {
          key:          a.key,
          title:        a.data.title.unwrap_or_default(),
          content_type: a.data.content_type.unwrap_or_default(),
          filename:     a.data.filename.unwrap_or_default(),
          md5:          a.data.md5.unwrap_or_default(),
        })
        .collect(),
    )
  }

  /// The first PDF attachment of an item, if any.
  pub async fn find_pdf(&self, key: &str) -> Result<Option<Item>> {
    Ok(self.children(key).await?.into_iter().find(Item::is_pdf_attachment))
  }

  /// Attaches a URL to an item without storing any file.
  pub async fn attach_url(
    &mut self,
    parent_key: &str,
    url: &str,
    title: Option<&str>,
  ) -> Result<String> {
    let mut draft = ItemData::new("attachment");
    draft.link_mode = Some("linked_url".to_string());
    draft.parent_item = Some(parent_key.to_string());
    draft.title = Some(title.unwrap_or(url).to_string());
    draft.url = Some(url.to_string());
    self.create_item(draft).await
  }

  /// Uploads a PDF as a stored attachment and returns the attachment key.
  ///
  /// # Errors
  ///
  /// Fails with [`CuratorError::File`] when the path doesn't name a `.pdf`
  /// file, before anything is created.
  pub async fn upload_pdf(
    &mut self,
    parent_key: &str,
    path: &Path,
    title: Option<&str>,
  ) -> Result<String> {
    let is_pdf = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase)
      == Some("pdf".to_string());
    if !is_pdf {
      return Err(CuratorError::File(format!("not a PDF: {}", path.display())));
    }
    self.upload_file(parent_key, path, title).await
  }

  /// Uploads any file as a stored attachment and returns the attachment
  /// key.
  pub async fn upload_file(
    &mut self,
    parent_key: &str,
    path: &Path,
    title: Option<&str>,
  ) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let content_type = content_type_for(path);
    let filename = filename_of(path);

    let mut draft = ItemData::new("attachment");
    draft.link_mode = Some("imported_file".to_string());
    draft.parent_item = Some(parent_key.to_string());
    draft.title = Some(title.unwrap_or(&filename).to_string());
    draft.content_type = Some(content_type.to_string());
    draft.filename = Some(filename);
    draft.md5 = Some(hex::encode(Md5::digest(&bytes)));
    draft.mtime = mtime_millis(path);

    let attachment_key = self.create_item(draft).await?;
    self.send_file_bytes(&attachment_key, bytes, content_type).await?;
    debug!(parent = parent_key, key = %attachment_key, "uploaded attachment");
    Ok(attachment_key)
  }

  /// Downloads an attachment's stored file to a local path, creating
  /// parent directories as needed. Returns the number of bytes written.
  pub async fn download_attachment(&self, key: &str, destination: &Path) -> Result<usize> {
    self.expect_attachment(key).await?;
    let bytes = self.attachment_bytes(key).await?;
    if let Some(parent) = destination.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(destination, &bytes).await?;
    debug!(key, bytes = bytes.len(), destination = %destination.display(), "downloaded attachment");
    Ok(bytes.len())
  }

  /// Fetches an attachment's stored file into memory.
  pub async fn attachment_bytes(&self, key: &str) -> Result<Vec<u8>> {
    let response = self.get_response(&format!("items/{key}/file"), &[]).await?;
    Ok(response.bytes().await?.to_vec())
  }

  /// Replaces an attachment's stored file, updating its MD5, mtime,
  /// filename, and content type. Title, tags, and relations are preserved.
  pub async fn replace_attachment(&mut self, key: &str, path: &Path) -> Result<()> {
    let mut attachment = self.expect_attachment(key).await?;
    let bytes = tokio::fs::read(path).await?;
    let content_type = content_type_for(path);

    attachment.data.md5 = Some(hex::encode(Md5::digest(&bytes)));
    attachment.data.mtime = mtime_millis(path);
    attachment.data.filename = Some(filename_of(path));
    attachment.data.content_type = Some(content_type.to_string());
    self.update_item(&attachment).await?;

    self.send_file_bytes(key, bytes, content_type).await?;
    debug!(key, "replaced attachment file");
    Ok(())
  }

  /// Moves an attachment and its file to the trash. The parent item is
  /// unaffected.
  pub async fn delete_attachment(&mut self, key: &str) -> Result<()> {
    self.expect_attachment(key).await?;
    self.trash_item(key).await
  }

  /// Pushes raw file bytes to an attachment's file endpoint.
  async fn send_file_bytes(
    &mut self,
    key: &str,
    bytes: Vec<u8>,
    content_type: &str,
  ) -> Result<()> {
    let url = self.url(&format!("items/{key}/file"));
    let response = self
      .client
      .post(&url)
      .header("Zotero-API-Key", &self.config().api_key)
      .header("Content-Type", content_type)
      .header("If-None-Match", "*")
      .body(bytes)
      .send()
      .await;
    self.invalidate();
    let response = response?;
    let status = response.status();
    if status.is_success() {
      Ok(())
    } else {
      let message = response.text().await.unwrap_or_default();
      Err(CuratorError::Api { status: status.as_u16(), message })
    }
  }

  /// Fetches an item and insists it is an attachment.
  async fn expect_attachment(&self, key: &str) -> Result<Item> {
    let item = self.item(key).await?;
    if item.is_attachment() {
      Ok(item)
    } else {
      Err(CuratorError::WrongItemType {
        key:      key.to_string(),
        expected: "attachment",
        actual:   item.data.item_type,
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn content_type_guessing() {
    assert_eq!(content_type_for(Path::new("paper.PDF")), "application/pdf");
    assert_eq!(content_type_for(Path::new("notes.txt")), "text/plain");
    assert_eq!(content_type_for(Path::new("mystery")), "application/octet-stream");
  }
}
