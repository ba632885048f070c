//! Tag housekeeping.

use curator::client::BatchOutcome;

use super::*;

/// Tag operations for the [`Commands::Tag`] subcommand.
#[derive(Subcommand)]
pub enum TagCommands {
  /// Rename a tag everywhere it appears
  Rename {
    /// Current tag
    old: String,
    /// New tag
    new: String,
  },

  /// Fold several tags into one
  Merge {
    /// Tags to fold away (at least one)
    #[arg(required = true)]
    sources: Vec<String>,
    /// Tag that replaces them
    #[arg(long)]
    into: String,
  },

  /// Remove a tag from every item and purge it
  Delete {
    /// Tag to remove
    tag: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
  },

  /// Delete tags no item uses anymore
  Prune {
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
  },
}

/// Function for the [`Commands::Tag`] in the CLI.
pub async fn tag<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  cmd: TagCommands,
) -> Result<()> {
  match cmd {
    TagCommands::Rename { old, new } => {
      let outcome = library.rename_tag(&old, &new).await?;
      report_outcome(interaction, &format!("Renamed '{old}' to '{new}'"), &outcome)
    },
    TagCommands::Merge { sources, into } => {
      let outcome = library.merge_tags(&sources, &into).await?;
      report_outcome(interaction, &format!("Merged {} tags into '{into}'", sources.len()), &outcome)
    },
    TagCommands::Delete { tag, yes } => {
      if !confirm_destructive(interaction, yes, &format!("Remove tag '{tag}' from every item?"))? {
        return interaction.reply(ResponseContent::Info("Aborted"));
      }
      let outcome = library.remove_tag_everywhere(&tag).await?;
      report_outcome(interaction, &format!("Removed '{tag}'"), &outcome)
    },
    TagCommands::Prune { yes } => {
      let unused = library.unused_tags().await?;
      if unused.is_empty() {
        return interaction.reply(ResponseContent::Success("No unused tags"));
      }
      interaction
        .reply(ResponseContent::Info(&format!("Unused tags: {}", unused.join(", "))))?;
      if !confirm_destructive(interaction, yes, &format!("Delete {} unused tags?", unused.len()))? {
        return interaction.reply(ResponseContent::Info("Aborted"));
      }
      let deleted = library.delete_unused_tags().await?;
      interaction
        .reply(ResponseContent::Success(&format!("Deleted {} unused tags", deleted.len())))
    },
  }
}

/// Summarizes a batch outcome, listing per-item failures.
fn report_outcome<I: UserInteraction>(
  interaction: &I,
  action: &str,
  outcome: &BatchOutcome,
) -> Result<()> {
  if outcome.is_clean() {
    interaction.reply(ResponseContent::Success(&format!(
      "{action} ({} items updated)",
      outcome.succeeded.len()
    )))
  } else {
    interaction.reply(ResponseContent::Info(&format!(
      "{action}: {} updated, {} failed",
      outcome.succeeded.len(),
      outcome.failed.len()
    )))?;
    for (key, error) in &outcome.failed {
      interaction.reply(ResponseContent::Info(&format!("  {key}: {error}")))?;
    }
    Ok(())
  }
}
