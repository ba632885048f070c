//! Import items by identifier or from a file.

use std::path::PathBuf;

use super::*;

/// Arguments that can be used for the [`Commands::Import`]
#[derive(Args)]
pub struct ImportArgs {
  /// DOI, arXiv id, or ISBN to fetch metadata for
  #[arg(required_unless_present_any = ["bibtex", "json"])]
  pub identifier: Option<String>,

  /// Path to a BibTeX file to import
  #[arg(long, conflicts_with_all = ["identifier", "json"])]
  pub bibtex: Option<PathBuf>,

  /// Path to a JSON file of item data to import
  #[arg(long, conflicts_with_all = ["identifier", "bibtex"])]
  pub json: Option<PathBuf>,
}

/// Function for the [`Commands::Import`] in the CLI.
pub async fn import<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  import_args: ImportArgs,
) -> Result<()> {
  if let Some(path) = &import_args.bibtex {
    let content = std::fs::read_to_string(path)?;
    interaction.reply(ResponseContent::Info(&format!("Importing {}", path.display())))?;
    let keys = library.import_from_bibtex(&content).await?;
    return interaction
      .reply(ResponseContent::Success(&format!("Imported {} items", keys.len())));
  }

  if let Some(path) = &import_args.json {
    let content = std::fs::read_to_string(path)?;
    interaction.reply(ResponseContent::Info(&format!("Importing {}", path.display())))?;
    let keys = library.import_items_json(&content).await?;
    return interaction
      .reply(ResponseContent::Success(&format!("Imported {} items", keys.len())));
  }

  let identifier = import_args
    .identifier
    .as_deref()
    .ok_or_else(|| CuratordError::Usage("nothing to import".to_string()))?;
  interaction.reply(ResponseContent::Info(&format!("Fetching metadata for {identifier}")))?;
  let key = library.import_by_identifier(identifier).await?;
  debug!(key, "imported item");
  let item = library.item(&key).await?;
  interaction.reply(ResponseContent::Item(&item))?;
  interaction.reply(ResponseContent::Success(&format!("Imported as {key}")))
}
