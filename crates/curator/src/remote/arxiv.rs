//! arXiv metadata lookup over the Atom export API.
//!
//! The query endpoint returns an Atom feed with one `entry` per requested
//! identifier. We walk the XML with an element path stack and collect the
//! handful of fields the preprint draft needs.

use async_trait::async_trait;
use quick_xml::{events::Event, Reader};

use super::MetadataSource;
use crate::{error::CuratorError, item::{Creator, ItemData, Tag}, prelude::*};

/// arXiv Atom export endpoint.
const API_BASE: &str = "http://export.arxiv.org/api/query";

/// arXiv metadata source.
pub struct Arxiv {
  /// HTTP client with the remote timeout applied.
  client: reqwest::Client,
}

impl Arxiv {
  /// Creates the source with a fresh HTTP client.
  pub fn new() -> Result<Self> { Ok(Self { client: super::remote_client()? }) }
}

/// Collapses runs of whitespace (arXiv abstracts carry hard line wraps).
fn collapse_whitespace(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the Atom feed for a single entry into an item draft.
pub(crate) fn parse_feed(xml: &str, id: &str) -> Result<ItemData> {
  let mut reader = Reader::from_str(xml);
  let mut buf = Vec::new();
  let mut path_stack: Vec<String> = Vec::new();

  let mut draft = ItemData::new("preprint");
  draft.archive_id = Some(id.to_string());
  draft.url = Some(format!("https://arxiv.org/abs/{id}"));

  let mut in_entry = false;
  let mut found_entry = false;
  let mut journal_ref = None;

  loop {
    match reader.read_event_into(&mut buf) {
      Ok(Event::Start(ref e)) => {
        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        if name == "entry" {
          in_entry = true;
          found_entry = true;
        }
        path_stack.push(name);
      },
      Ok(Event::Empty(ref e)) if in_entry => {
        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        if name == "category" {
          for attr in e.attributes().flatten() {
            if attr.key.as_ref() == b"term" {
              let term = String::from_utf8_lossy(&attr.value).to_string();
              draft.tags.push(Tag::new(term));
            }
          }
        }
      },
      Ok(Event::Text(ref e)) if in_entry => {
        let text = e
          .unescape()
          .map_err(|e| CuratorError::Api { status: 0, message: e.to_string() })?
          .to_string();
        let text = text.trim().to_string();
        if text.is_empty() {
          continue;
        }
        match path_stack.join("/").as_str() {
          "feed/entry/title" => draft.title = Some(collapse_whitespace(&text)),
          "feed/entry/summary" => draft.abstract_note = Some(collapse_whitespace(&text)),
          "feed/entry/published" =>
            draft.date = text.get(..10).map(str::to_string).or(Some(text)),
          "feed/entry/author/name" =>
            draft.creators.extend(Creator::from_name(&text, "author")),
          "feed/entry/arxiv:doi" => draft.doi = Some(text),
          "feed/entry/arxiv:journal_ref" => journal_ref = Some(text),
          _ => {},
        }
      },
      Ok(Event::End(_)) => {
        if path_stack.pop().as_deref() == Some("entry") {
          in_entry = false;
        }
      },
      Ok(Event::Eof) => break,
      Err(e) => return Err(CuratorError::Api { status: 0, message: e.to_string() }),
      _ => {},
    }
    buf.clear();
  }

  if !found_entry || draft.title.is_none() {
    return Err(CuratorError::NotFound { kind: "arxiv entry", key: id.to_string() });
  }
  if let Some(journal) = journal_ref {
    draft.extra = Some(format!("Journal: {journal}"));
  }
  Ok(draft)
}

#[async_trait]
impl MetadataSource for Arxiv {
  fn name(&self) -> &'static str { "arxiv" }

  async fn fetch(&self, id: &str) -> Result<ItemData> {
    let response = self.client.get(API_BASE).query(&[("id_list", id)]).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(CuratorError::Api {
        status:  status.as_u16(),
        message: format!("arXiv lookup failed for {id}"),
      });
    }
    let xml = response.text().await?;
    parse_feed(&xml, id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <title>Attention Is All
 You Need</title>
    <summary>  The dominant sequence transduction models
are based on recurrent networks.  </summary>
    <published>2017-06-12T17:57:34Z</published>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <arxiv:doi xmlns:arxiv="http://arxiv.org/schemas/atom">10.48550/arXiv.1706.03762</arxiv:doi>
    <arxiv:journal_ref xmlns:arxiv="http://arxiv.org/schemas/atom">NeurIPS 2017</arxiv:journal_ref>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

  #[test]
  fn parses_entry() {
    let draft = parse_feed(FEED, "1706.03762").unwrap();
    assert_eq!(draft.item_type, "preprint");
    assert_eq!(draft.title.as_deref(), Some("Attention Is All You Need"));
    assert_eq!(draft.date.as_deref(), Some("2017-06-12"));
    assert_eq!(draft.creators.len(), 2);
    assert_eq!(draft.creators[0].last_name.as_deref(), Some("Vaswani"));
    assert_eq!(draft.doi.as_deref(), Some("10.48550/arXiv.1706.03762"));
    assert_eq!(draft.extra.as_deref(), Some("Journal: NeurIPS 2017"));
    assert_eq!(draft.url.as_deref(), Some("https://arxiv.org/abs/1706.03762"));
    assert_eq!(draft.tags.len(), 2);
    assert!(draft.abstract_note.as_deref().is_some_and(|a| !a.contains('\n')));
  }

  #[test]
  fn empty_feed_is_not_found() {
    let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#;
    assert!(matches!(parse_feed(xml, "0000.00000"), Err(CuratorError::NotFound { .. })));
  }
}
