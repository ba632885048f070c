//! User-facing output and prompts.
//!
//! Commands talk to the terminal through [`UserInteraction`] so tests can
//! swap in a scripted implementation. [`ConsoleInteraction`] is the real
//! one: colored output via `console`, prompts via `dialoguer`.

use std::collections::BTreeMap;

use console::style;
use curator::item::Item;
use dialoguer::{Confirm, Input};

use crate::error::{CuratordError, Result};

pub static INFO_PREFIX: &str = "ℹ ";
pub static WORKING_PREFIX: &str = "» ";
pub static SUCCESS_PREFIX: &str = "✓ ";
pub static ERROR_PREFIX: &str = "✗ ";
pub static WARNING_PREFIX: &str = "! ";
pub static PROMPT_PREFIX: &str = "❯ ";
pub static ITEM_PREFIX: &str = "├─";
pub static LAST_ITEM_PREFIX: &str = "└─";
pub static CONTINUE_PREFIX: &str = "│  ";

/// What a command wants shown to the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// Full detail view of a single item.
  Item(&'a Item),
  /// Summary list of items.
  Items(&'a [Item]),
  /// Grouped items, e.g. duplicates keyed by the shared field value.
  Groups(&'a BTreeMap<String, Vec<Item>>),
  /// Name/count pairs, e.g. items per type.
  Counts(&'a BTreeMap<String, usize>),
  /// A completed operation.
  Success(&'a str),
  /// A failed operation.
  Error(CuratordError),
  /// Neutral progress or context.
  Info(&'a str),
}

/// Terminal abstraction the commands are written against.
pub trait UserInteraction {
  /// Asks a yes/no question.
  fn confirm(&self, message: &str) -> Result<bool>;
  /// Asks for a line of input.
  fn prompt(&self, message: &str) -> Result<String>;
  /// Renders command output.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

/// The interactive console implementation.
pub struct ConsoleInteraction {
  /// When set, every prompt is skipped and answered with its default.
  accept_defaults: bool,
}

impl ConsoleInteraction {
  /// Creates a console interaction.
  pub fn new(accept_defaults: bool) -> Self { Self { accept_defaults } }

  /// One summary line per item: key, year, title.
  fn item_line(item: &Item, last: bool) -> String {
    let prefix = if last { LAST_ITEM_PREFIX } else { ITEM_PREFIX };
    let year = item.year().map(|y| y.to_string()).unwrap_or_else(|| "----".to_string());
    let title = item.data.title.as_deref().unwrap_or("(untitled)");
    format!("{} {} {} {}", prefix, style(&item.key).cyan(), style(year).dim(), title)
  }
}

impl UserInteraction for ConsoleInteraction {
  fn confirm(&self, message: &str) -> Result<bool> {
    if self.accept_defaults {
      return Ok(true);
    }
    Ok(Confirm::new()
      .with_prompt(format!("{} {}", style(PROMPT_PREFIX).yellow(), message))
      .default(true)
      .interact()?)
  }

  fn prompt(&self, message: &str) -> Result<String> {
    if self.accept_defaults {
      return Ok(String::new());
    }
    Ok(Input::new()
      .with_prompt(format!("{} {}", style(PROMPT_PREFIX).yellow(), message))
      .allow_empty(true)
      .interact_text()?)
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Item(item) => {
        println!("{} Item details", style(INFO_PREFIX).blue());
        println!("{} key:   {}", ITEM_PREFIX, style(&item.key).cyan());
        println!("{} type:  {}", ITEM_PREFIX, item.data.item_type);
        if let Some(title) = &item.data.title {
          println!("{} title: {}", ITEM_PREFIX, style(title).bold());
        }
        if !item.data.creators.is_empty() {
          let names: Vec<String> =
            item.data.creators.iter().map(|c| c.display_name()).collect();
          println!("{} by:    {}", ITEM_PREFIX, names.join("; "));
        }
        if let Some(date) = &item.data.date {
          println!("{} date:  {}", ITEM_PREFIX, date);
        }
        if let Some(doi) = &item.data.doi {
          println!("{} doi:   {}", ITEM_PREFIX, doi);
        }
        let tags = item.tag_names();
        if tags.is_empty() {
          println!("{} tags:  (none)", LAST_ITEM_PREFIX);
        } else {
          println!("{} tags:  {}", LAST_ITEM_PREFIX, tags.join(", "));
        }
        Ok(())
      },
      ResponseContent::Items(items) => {
        println!(
          "{} Found {} {}",
          style(INFO_PREFIX).blue(),
          style(items.len()).bold(),
          if items.len() == 1 { "item" } else { "items" }
        );
        for (i, item) in items.iter().enumerate() {
          println!("{}", Self::item_line(item, i + 1 == items.len()));
        }
        Ok(())
      },
      ResponseContent::Groups(groups) => {
        println!("{} {} groups", style(INFO_PREFIX).blue(), style(groups.len()).bold());
        for (value, items) in groups {
          println!("{} {}", ITEM_PREFIX, style(value).bold());
          for item in items {
            println!("{}{}", CONTINUE_PREFIX, Self::item_line(item, false));
          }
        }
        Ok(())
      },
      ResponseContent::Counts(counts) => {
        let width = counts.keys().map(String::len).max().unwrap_or(0);
        for (name, count) in counts {
          println!("{} {:width$}  {}", ITEM_PREFIX, name, style(count).bold());
        }
        Ok(())
      },
      ResponseContent::Success(message) => {
        println!("{} {}", style(SUCCESS_PREFIX).green(), message);
        Ok(())
      },
      ResponseContent::Error(error) => {
        eprintln!("{} {}", style(ERROR_PREFIX).red(), error);
        Ok(())
      },
      ResponseContent::Info(message) => {
        println!("{} {}", style(INFO_PREFIX).blue(), message);
        Ok(())
      },
    }
  }
}
