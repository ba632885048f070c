//! Attachment transfer and PDF text extraction.

use std::path::PathBuf;

use super::*;

/// Arguments that can be used for the [`Commands::Attach`]
#[derive(Args)]
pub struct AttachArgs {
  /// Parent item key
  pub parent: String,

  /// PDF file to upload
  #[arg(long, required_unless_present = "url", conflicts_with = "url")]
  pub pdf: Option<PathBuf>,

  /// URL to attach as a link instead of uploading a file
  #[arg(long)]
  pub url: Option<String>,

  /// Attachment title; defaults to the file name or the URL
  #[arg(long)]
  pub title: Option<String>,
}

/// Arguments that can be used for the [`Commands::FetchFile`]
#[derive(Args)]
pub struct FetchFileArgs {
  /// Attachment key
  pub key: String,

  /// Where to write the file
  pub output: PathBuf,
}

/// Arguments that can be used for the [`Commands::ExtractText`]
#[derive(Args)]
pub struct ExtractTextArgs {
  /// PDF attachment key
  pub key: String,

  /// Also print the PDF's embedded metadata
  #[arg(long)]
  pub metadata: bool,
}

/// Function for the [`Commands::Attach`] in the CLI.
pub async fn attach<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  attach_args: AttachArgs,
) -> Result<()> {
  if let Some(url) = &attach_args.url {
    let key = library.attach_url(&attach_args.parent, url, attach_args.title.as_deref()).await?;
    return interaction
      .reply(ResponseContent::Success(&format!("Linked {url} as {key}")));
  }

  let path = attach_args
    .pdf
    .as_deref()
    .ok_or_else(|| CuratordError::Usage("nothing to attach".to_string()))?;
  interaction.reply(ResponseContent::Info(&format!("Uploading {}", path.display())))?;
  let key =
    library.upload_pdf(&attach_args.parent, path, attach_args.title.as_deref()).await?;
  interaction.reply(ResponseContent::Success(&format!("Uploaded as {key}")))
}

/// Function for the [`Commands::FetchFile`] in the CLI.
pub async fn fetch_file<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  fetch_args: FetchFileArgs,
) -> Result<()> {
  let bytes = library.download_attachment(&fetch_args.key, &fetch_args.output).await?;
  interaction.reply(ResponseContent::Success(&format!(
    "Wrote {bytes} bytes to {}",
    fetch_args.output.display()
  )))
}

/// Function for the [`Commands::ExtractText`] in the CLI.
pub async fn extract_text<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  extract_args: ExtractTextArgs,
) -> Result<()> {
  let content = library.extract_text_from_pdf(&extract_args.key).await?;
  if extract_args.metadata {
    if let Some(title) = &content.metadata.title {
      interaction.reply(ResponseContent::Info(&format!("Title:    {title}")))?;
    }
    if let Some(author) = &content.metadata.author {
      interaction.reply(ResponseContent::Info(&format!("Author:   {author}")))?;
    }
    if let Some(subject) = &content.metadata.subject {
      interaction.reply(ResponseContent::Info(&format!("Subject:  {subject}")))?;
    }
    if let Some(keywords) = &content.metadata.keywords {
      interaction.reply(ResponseContent::Info(&format!("Keywords: {keywords}")))?;
    }
  }
  interaction.reply(ResponseContent::Info(&format!(
    "Extracted text from {} pages",
    content.pages.len()
  )))?;
  println!("{}", content.full_text());
  Ok(())
}
