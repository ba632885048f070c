//! Note management.

use super::*;

/// Note operations for the [`Commands::Note`] subcommand.
#[derive(Subcommand)]
pub enum NoteCommands {
  /// Attach a note to an item
  Add {
    /// Parent item key
    parent: String,
    /// Note text (HTML allowed)
    text: String,
  },

  /// Replace a note's content
  Update {
    /// Note key
    key: String,
    /// New note text (HTML allowed)
    text: String,
  },

  /// Delete a note
  Delete {
    /// Note key
    key: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
  },

  /// Search note text across the library
  Search {
    /// Text to look for (HTML is stripped before matching)
    query: String,
  },
}

/// Function for the [`Commands::Note`] in the CLI.
pub async fn note<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  cmd: NoteCommands,
) -> Result<()> {
  match cmd {
    NoteCommands::Add { parent, text } => {
      let key = library.attach_note(&parent, &text).await?;
      interaction.reply(ResponseContent::Success(&format!("Added note {key} to {parent}")))
    },
    NoteCommands::Update { key, text } => {
      library.update_note(&key, &text).await?;
      interaction.reply(ResponseContent::Success(&format!("Updated note {key}")))
    },
    NoteCommands::Delete { key, yes } => {
      if !confirm_destructive(interaction, yes, &format!("Delete note {key}?"))? {
        return interaction.reply(ResponseContent::Info("Aborted"));
      }
      library.delete_note(&key).await?;
      interaction.reply(ResponseContent::Success(&format!("Deleted note {key}")))
    },
    NoteCommands::Search { query } => {
      let notes = library.search_notes(&query).await?;
      if notes.is_empty() {
        interaction.reply(ResponseContent::Info("No notes found"))
      } else {
        interaction.reply(ResponseContent::Items(&notes))
      }
    },
  }
}
