//! Item mutations.

use super::*;

/// Item operations for the [`Commands::Item`] subcommand.
#[derive(Subcommand)]
pub enum ItemCommands {
  /// Show an item's details
  Show {
    /// Item key
    key: String,
  },

  /// Merge one item into another: union tags and relations, move children,
  /// trash the source
  Merge {
    /// Item to fold away
    source: String,
    /// Item that survives
    target: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
  },

  /// Duplicate an item with its attachments and notes
  Copy {
    /// Item key
    key: String,
  },

  /// Change an item's type, carrying compatible fields over
  Convert {
    /// Item key
    key: String,
    /// Target item type, e.g. journalArticle
    to: String,
  },

  /// Move an item to the trash
  Delete {
    /// Item key
    key: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
  },

  /// Set a single field on an item
  SetField {
    /// Item key
    key: String,
    /// Field name, e.g. DOI
    field: String,
    /// New value
    value: String,
  },
}

/// Function for the [`Commands::Item`] in the CLI.
pub async fn item<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  cmd: ItemCommands,
) -> Result<()> {
  match cmd {
    ItemCommands::Show { key } => {
      let item = library.item(&key).await?;
      interaction.reply(ResponseContent::Item(&item))
    },
    ItemCommands::Merge { source, target, yes } => {
      if !confirm_destructive(
        interaction,
        yes,
        &format!("Merge {source} into {target}? The source moves to the trash."),
      )? {
        return interaction.reply(ResponseContent::Info("Aborted"));
      }
      let report = library.merge_items(&source, &target).await?;
      interaction.reply(ResponseContent::Success(&format!(
        "Merged {source} into {target}: {} tags, {} relations, {} attachments, {} notes",
        report.tags, report.relations, report.attachments, report.notes
      )))
    },
    ItemCommands::Copy { key } => {
      let new_key = library.copy_item(&key).await?;
      interaction.reply(ResponseContent::Success(&format!("Copied {key} to {new_key}")))
    },
    ItemCommands::Convert { key, to } => {
      library.convert_item_type(&key, &to).await?;
      interaction.reply(ResponseContent::Success(&format!("Converted {key} to {to}")))
    },
    ItemCommands::Delete { key, yes } => {
      if !confirm_destructive(interaction, yes, &format!("Move {key} to the trash?"))? {
        return interaction.reply(ResponseContent::Info("Aborted"));
      }
      library.trash_item(&key).await?;
      interaction.reply(ResponseContent::Success(&format!("Trashed {key}")))
    },
    ItemCommands::SetField { key, field, value } => {
      library.set_field(&key, &field, &value).await?;
      interaction.reply(ResponseContent::Success(&format!("Set {field} on {key}")))
    },
  }
}
