//! Library health checks.

use std::collections::BTreeMap;

use super::*;

/// Arguments that can be used for the [`Commands::Audit`]
#[derive(Args)]
pub struct AuditArgs {
  /// Checks to run; all of them when none are given
  #[arg(value_enum)]
  pub checks: Vec<AuditCheck>,

  /// Similarity threshold for the similar-tags check (0.0-1.0)
  #[arg(long, default_value_t = 0.8)]
  pub threshold: f64,
}

/// One selectable health check.
#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AuditCheck {
  /// Items sharing a DOI or a title
  Duplicates,
  /// Top-level items without a PDF attachment
  MissingPdf,
  /// Malformed DOI/ISBN/ISSN values and non-http(s) URLs
  InvalidIds,
  /// Top-level items without tags
  Untagged,
  /// Top-level items in no collection
  Unfiled,
  /// Near-identical tag pairs
  SimilarTags,
  /// Items still carrying "Untitled"-style titles
  Placeholders,
  /// Attachments without a usable parent
  Orphans,
}

/// All checks, in report order.
const ALL_CHECKS: &[AuditCheck] = &[
  AuditCheck::Duplicates,
  AuditCheck::MissingPdf,
  AuditCheck::InvalidIds,
  AuditCheck::Untagged,
  AuditCheck::Unfiled,
  AuditCheck::SimilarTags,
  AuditCheck::Placeholders,
  AuditCheck::Orphans,
];

/// Function for the [`Commands::Audit`] in the CLI.
pub async fn audit<I: UserInteraction>(
  interaction: &I,
  library: &mut Library,
  audit_args: AuditArgs,
) -> Result<()> {
  let checks: Vec<AuditCheck> =
    if audit_args.checks.is_empty() { ALL_CHECKS.to_vec() } else { audit_args.checks };

  for check in checks {
    match check {
      AuditCheck::Duplicates => {
        let by_doi = library.duplicate_dois().await?;
        report_groups(interaction, "Duplicate DOIs", &by_doi)?;
        let by_title = library.duplicate_titles().await?;
        report_groups(interaction, "Duplicate titles", &by_title)?;
      },
      AuditCheck::MissingPdf => {
        let items = library.items_without_pdf().await?;
        report_items(interaction, "Items without a PDF", &items)?;
      },
      AuditCheck::InvalidIds => {
        let items = library.items_with_invalid_doi().await?;
        report_items(interaction, "Invalid DOIs", &items)?;
        let items = library.items_with_invalid_isbn().await?;
        report_items(interaction, "Invalid ISBNs", &items)?;
        let items = library.items_with_invalid_issn().await?;
        report_items(interaction, "Invalid ISSNs", &items)?;
        let items = library.items_with_broken_urls().await?;
        report_items(interaction, "Non-http(s) URLs", &items)?;
      },
      AuditCheck::Untagged => {
        let items = library.items_without_tags().await?;
        report_items(interaction, "Untagged items", &items)?;
      },
      AuditCheck::Unfiled => {
        let items = library.items_not_in_collection().await?;
        report_items(interaction, "Items in no collection", &items)?;
      },
      AuditCheck::SimilarTags => {
        let pairs = library.find_similar_tags(audit_args.threshold).await?;
        if pairs.is_empty() {
          interaction.reply(ResponseContent::Success("Similar tags: none"))?;
        } else {
          interaction
            .reply(ResponseContent::Info(&format!("Similar tags: {} groups", pairs.len())))?;
          for (tag, others) in &pairs {
            interaction
              .reply(ResponseContent::Info(&format!("  {tag} ~ {}", others.join(", "))))?;
          }
        }
      },
      AuditCheck::Placeholders => {
        let items = library.items_with_placeholder_titles().await?;
        report_items(interaction, "Placeholder titles", &items)?;
      },
      AuditCheck::Orphans => {
        let items = library.find_orphaned_attachments().await?;
        report_items(interaction, "Orphaned attachments", &items)?;
      },
    }
  }
  Ok(())
}

/// Prints one check's flat item list, or a green all-clear.
fn report_items<I: UserInteraction>(interaction: &I, label: &str, items: &[Item]) -> Result<()> {
  if items.is_empty() {
    interaction.reply(ResponseContent::Success(&format!("{label}: none")))
  } else {
    interaction.reply(ResponseContent::Info(label))?;
    interaction.reply(ResponseContent::Items(items))
  }
}

/// Prints one check's grouped results, or a green all-clear.
fn report_groups<I: UserInteraction>(
  interaction: &I,
  label: &str,
  groups: &BTreeMap<String, Vec<Item>>,
) -> Result<()> {
  if groups.is_empty() {
    interaction.reply(ResponseContent::Success(&format!("{label}: none")))
  } else {
    interaction.reply(ResponseContent::Info(label))?;
    interaction.reply(ResponseContent::Groups(groups))
  }
}
