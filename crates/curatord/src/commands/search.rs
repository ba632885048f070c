//! Search across the library.

use curator::audit::SearchFilters;

use super::*;

/// Arguments that can be used for the [`Commands::Search`]
#[derive(Args)]
pub struct SearchArgs {
  /// Title substring to search for (optional when filters are given)
  pub query: Option<String>,

  /// Filter by creator name
  #[arg(long)]
  pub author: Option<String>,

  /// Filter by item type, e.g. journalArticle
  #[arg(long = "type")]
  pub item_type: Option<String>,

  /// Filter by tag
  #[arg(long)]
  pub tag: Option<String>,

  /// Filter by collection key
  #[arg(long)]
  pub collection: Option<String>,

  /// Filter by exact publication year
  #[arg(long)]
  pub year: Option<i32>,

  /// Inclusive publication year lower bound
  #[arg(long)]
  pub from: Option<i32>,

  /// Inclusive publication year upper bound
  #[arg(long)]
  pub to: Option<i32>,

  /// Search indexed full text instead of metadata
  #[arg(long, conflicts_with_all = ["author", "item_type", "tag", "collection", "year", "from", "to"])]
  pub fulltext: bool,

  /// Show full details for each hit
  #[arg(long)]
  pub detailed: bool,
}

/// Function for the [`Commands::Search`] in the CLI.
pub async fn search<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  search_args: SearchArgs,
) -> Result<()> {
  let items = if search_args.fulltext {
    let query = search_args
      .query
      .as_deref()
      .ok_or_else(|| CuratordError::Usage("--fulltext needs a query".to_string()))?;
    library.search_fulltext(query).await?
  } else if let Some(author) = &search_args.author {
    let mut items = library.search_by_author(author).await?;
    if let Some(query) = &search_args.query {
      let needle = query.to_lowercase();
      items.retain(|item| {
        item.data.title.as_deref().unwrap_or_default().to_lowercase().contains(&needle)
      });
    }
    items
  } else {
    let filters = SearchFilters {
      item_type:  search_args.item_type.clone(),
      tag:        search_args.tag.clone(),
      collection: search_args.collection.clone(),
      year:       search_args.year,
      year_start: search_args.from,
      year_end:   search_args.to,
      query:      search_args.query.clone(),
    };
    library.search_items(&filters).await?
  };

  if items.is_empty() {
    return interaction.reply(ResponseContent::Info("No items found matching all criteria"));
  }

  if search_args.detailed {
    for item in &items {
      interaction.reply(ResponseContent::Item(item))?;
    }
    Ok(())
  } else {
    interaction.reply(ResponseContent::Items(&items))
  }
}
