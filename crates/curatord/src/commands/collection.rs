//! Collection housekeeping.

use super::*;

/// Collection operations for the [`Commands::Collection`] subcommand.
#[derive(Subcommand)]
pub enum CollectionCommands {
  /// Create a collection, optionally under a parent
  Create {
    /// Collection name
    name: String,
    /// Parent collection key; top-level when omitted
    #[arg(long)]
    parent: Option<String>,
  },

  /// Rename a collection
  Rename {
    /// Collection key
    key: String,
    /// New name
    name: String,
  },

  /// Delete a collection (its items stay in the library)
  Delete {
    /// Collection key
    key: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
  },

  /// Move every item of the source collections into a target, then delete
  /// the sources
  Merge {
    /// Collections to fold away (at least one)
    #[arg(required = true)]
    sources: Vec<String>,
    /// Collection that receives their items
    #[arg(long)]
    into: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
  },

  /// Re-parent a collection
  Move {
    /// Collection key
    key: String,
    /// New parent collection key; moves to top level when omitted
    #[arg(long)]
    parent: Option<String>,
  },
}

/// Function for the [`Commands::Collection`] in the CLI.
pub async fn collection<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  cmd: CollectionCommands,
) -> Result<()> {
  match cmd {
    CollectionCommands::Create { name, parent } => {
      let key = library.create_collection(&name, parent.as_deref()).await?;
      interaction.reply(ResponseContent::Success(&format!("Created '{name}' ({key})")))
    },
    CollectionCommands::Rename { key, name } => {
      library.rename_collection(&key, &name).await?;
      interaction.reply(ResponseContent::Success(&format!("Renamed {key} to '{name}'")))
    },
    CollectionCommands::Delete { key, yes } => {
      let name = library.collection(&key).await?.data.name;
      if !confirm_destructive(interaction, yes, &format!("Delete collection '{name}'?"))? {
        return interaction.reply(ResponseContent::Info("Aborted"));
      }
      library.delete_collection(&key).await?;
      interaction.reply(ResponseContent::Success(&format!("Deleted '{name}'")))
    },
    CollectionCommands::Merge { sources, into, yes } => {
      if !confirm_destructive(
        interaction,
        yes,
        &format!("Merge {} collections into {into} and delete them?", sources.len()),
      )? {
        return interaction.reply(ResponseContent::Info("Aborted"));
      }
      let moved = library.merge_collections(&sources, &into).await?;
      interaction
        .reply(ResponseContent::Success(&format!("Moved {moved} items into {into}")))
    },
    CollectionCommands::Move { key, parent } => {
      library.move_collection(&key, parent.as_deref()).await?;
      let target = parent.as_deref().unwrap_or("top level");
      interaction.reply(ResponseContent::Success(&format!("Moved {key} under {target}")))
    },
  }
}
