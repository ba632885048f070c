//! Library statistics.

use super::*;

/// Arguments that can be used for the [`Commands::Stats`]
#[derive(Args)]
pub struct StatsArgs {
  /// Which breakdown to show
  #[arg(value_enum, default_value_t = StatsView::Summary)]
  pub view: StatsView,

  /// Emit the result as JSON instead of formatted text
  #[arg(long)]
  pub json: bool,
}

/// Available statistics breakdowns.
#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatsView {
  /// Headline numbers for the whole library
  Summary,
  /// Item counts per type
  Types,
  /// Item counts per publication year
  Years,
  /// Item counts per collection
  Collections,
  /// Tags ordered by usage
  Tags,
  /// Attachment counts by content type and link mode
  Attachments,
}

/// Function for the [`Commands::Stats`] in the CLI.
pub async fn stats<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  stats_args: StatsArgs,
) -> Result<()> {
  match stats_args.view {
    StatsView::Summary => {
      let summary = library.library_summary().await?;
      if stats_args.json {
        println!("{}", serde_json::to_string_pretty(&summary).map_err(curator::error::CuratorError::from)?);
        return Ok(());
      }
      interaction.reply(ResponseContent::Info(&format!(
        "{} items, {} attachments, {} notes",
        summary.total_items, summary.attachments, summary.notes
      )))?;
      interaction.reply(ResponseContent::Info(&format!(
        "{} collections, {} tags",
        summary.collections, summary.tags
      )))?;
      interaction.reply(ResponseContent::Counts(&summary.item_types))
    },
    StatsView::Types => {
      let counts = library.count_items_per_type().await?;
      interaction.reply(ResponseContent::Counts(&counts))
    },
    StatsView::Years => {
      let counts = library.count_items_per_year().await?;
      interaction.reply(ResponseContent::Counts(&counts))
    },
    StatsView::Collections => {
      let counts = library.count_items_per_collection().await?;
      let counts = counts.into_iter().map(|(name, n)| (name, n as usize)).collect();
      interaction.reply(ResponseContent::Counts(&counts))
    },
    StatsView::Tags => {
      let cloud = library.tag_cloud().await?;
      interaction.reply(ResponseContent::Info(&format!("{} tags", cloud.len())))?;
      for (tag, count) in cloud {
        interaction.reply(ResponseContent::Info(&format!("  {count:5}  {tag}")))?;
      }
      Ok(())
    },
    StatsView::Attachments => {
      let summary = library.summarize_attachments().await?;
      if stats_args.json {
        println!("{}", serde_json::to_string_pretty(&summary).map_err(curator::error::CuratorError::from)?);
        return Ok(());
      }
      interaction
        .reply(ResponseContent::Info(&format!("{} attachments", summary.total)))?;
      interaction.reply(ResponseContent::Info(&format!(
        "{} with stored files ({} bytes), {} without",
        summary.with_file, summary.total_size, summary.without_file
      )))?;
      interaction.reply(ResponseContent::Info("By content type:"))?;
      interaction.reply(ResponseContent::Counts(&summary.by_content_type))?;
      interaction.reply(ResponseContent::Info("By link mode:"))?;
      interaction.reply(ResponseContent::Counts(&summary.by_link_mode))
    },
  }
}
