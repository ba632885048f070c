//! Export the library or a collection.

use std::path::PathBuf;

use curator::export::ExportFormat;

use super::*;

/// Arguments that can be used for the [`Commands::Export`]
#[derive(Args)]
pub struct ExportArgs {
  /// Output format: json, csv, or bibtex
  #[arg(value_parser = clap::value_parser!(ExportFormat))]
  pub format: ExportFormat,

  /// Export only this collection (by key)
  #[arg(long)]
  pub collection: Option<String>,

  /// Write to this file instead of stdout
  #[arg(long, short)]
  pub output: Option<PathBuf>,
}

/// Function for the [`Commands::Export`] in the CLI.
pub async fn export<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  export_args: ExportArgs,
) -> Result<()> {
  let rendered = match &export_args.collection {
    Some(key) => library.export_collection(key, export_args.format).await?,
    None => library.export_library(export_args.format).await?,
  };

  match &export_args.output {
    Some(path) => {
      std::fs::write(path, &rendered)?;
      interaction
        .reply(ResponseContent::Success(&format!("Exported to {}", path.display())))
    },
    None => {
      println!("{rendered}");
      Ok(())
    },
  }
}
