//! Connectivity check and library summary.

use super::*;

/// Function for the [`Commands::Status`] in the CLI.
pub async fn status<I: UserInteraction>(interaction: &I, library: &mut Library) -> Result<()> {
  let base_url = library.config().base_url.clone();
  let probe = match library.probe().await {
    Ok(probe) => probe,
    Err(e) => {
      interaction.reply(ResponseContent::Error(CuratordError::from(e)))?;
      return interaction.reply(ResponseContent::Info(&format!(
        "Could not reach the local API at {base_url}. Is Zotero running?"
      )));
    },
  };

  interaction.reply(ResponseContent::Success(&format!("Connected to {base_url}")))?;
  interaction.reply(ResponseContent::Info(&format!(
    "Library version {}, {} items",
    probe.version, probe.total_items
  )))?;

  let summary = library.library_summary().await?;
  debug!(?summary, "library summary");
  interaction.reply(ResponseContent::Info(&format!(
    "{} top-level items across {} collections, {} tags",
    summary.total_items - summary.attachments - summary.notes,
    summary.collections,
    summary.tags
  )))?;
  interaction.reply(ResponseContent::Info(&format!(
    "{} attachments, {} notes",
    summary.attachments, summary.notes
  )))?;
  if let (Some(earliest), Some(latest)) = (summary.earliest_year, summary.latest_year) {
    interaction
      .reply(ResponseContent::Info(&format!("Publication years {earliest}-{latest}")))?;
  }
  interaction.reply(ResponseContent::Counts(&summary.item_types))
}
