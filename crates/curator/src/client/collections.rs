//! Collection tree reads and membership edits.
//!
//! Membership lives on the item side (`data.collections`), so adding or
//! removing an item edits the item, not the collection. Structural edits
//! (create, rename, reparent, delete) go through the collection endpoints.

use tracing::{debug, warn};

use super::{BatchOutcome, Library};
use crate::{
  collection::{Collection, CollectionData, ParentCollection},
  error::CuratorError,
  item::{Item, WriteResponse},
  prelude::*,
};

impl Library {
  /// Fetches every collection in the library.
  pub async fn all_collections(&self) -> Result<Vec<Collection>> {
    self.fetch_pages("collections", &[]).await
  }

  /// Fetches one collection by key.
  pub async fn collection(&self, key: &str) -> Result<Collection> {
    match self.get_json(&format!("collections/{key}"), &[]).await {
      Err(CuratorError::Api { status: 404, .. }) =>
        Err(CuratorError::NotFound { kind: "collection", key: key.to_string() }),
      other => other,
    }
  }

  /// Finds a collection by exact name. Names are not unique; the first
  /// match in server order wins.
  pub async fn find_collection_by_name(&self, name: &str) -> Result<Option<Collection>> {
    Ok(self.all_collections().await?.into_iter().find(|c| c.data.name == name))
  }

  /// Fetches the top-level items of a collection.
  pub async fn items_in_collection(&self, key: &str) -> Result<Vec<Item>> {
    self.fetch_item_pages(&format!("collections/{key}/items/top"), &[]).await
  }

  /// Creates a collection, optionally nested, and returns its key.
  pub async fn create_collection(&mut self, name: &str, parent: Option<&str>) -> Result<String> {
    let draft = CollectionData {
      name: name.to_string(),
      parent: match parent {
        Some(key) => ParentCollection::Key(key.to_string()),
        None => ParentCollection::None,
      },
      ..Default::default()
    };
    let response: WriteResponse = self.post_json("collections", &vec![draft]).await?;
    response.created_keys().into_iter().next().ok_or_else(|| CuratorError::Api {
      status:  0,
      message: format!("collection '{name}' was not created"),
    })
  }

  /// Renames a collection in place.
  pub async fn rename_collection(&mut self, key: &str, new_name: &str) -> Result<()> {
    let mut collection = self.collection(key).await?;
    collection.data.name = new_name.to_string();
    self.update_collection(&collection).await
  }

  /// Reparents a collection, or makes it top-level when `new_parent` is
  /// `None`.
  pub async fn move_collection(&mut self, key: &str, new_parent: Option<&str>) -> Result<()> {
    let mut collection = self.collection(key).await?;
    collection.data.parent = match new_parent {
      Some(parent) => ParentCollection::Key(parent.to_string()),
      None => ParentCollection::None,
    };
    self.update_collection(&collection).await
  }

  /// Deletes a collection. Items in it are left alone, losing only the
  /// membership.
  pub async fn delete_collection(&mut self, key: &str) -> Result<()> {
    self.delete(&format!("collections/{key}"), &[]).await
  }

  /// Moves every item from the source collections into the target, then
  /// deletes the sources. Returns the number of items moved.
  pub async fn merge_collections(&mut self, sources: &[String], target: &str) -> Result<usize> {
    let mut moved = 0;
    for source in sources {
      for item in self.items_in_collection(source).await? {
        match self.add_item_to_collection(&item.key, target).await {
          Ok(()) => moved += 1,
          Err(error) => warn!(item = %item.key, %error, "skipping item during collection merge"),
        }
      }
    }
    for source in sources {
      if let Err(error) = self.delete_collection(source).await {
        warn!(collection = %source, %error, "failed to delete merged collection");
      }
    }
    debug!(?sources, target, moved, "merged collections");
    Ok(moved)
  }

  /// Adds an item to a collection, keeping its other memberships.
  pub async fn add_item_to_collection(&mut self, item_key: &str, collection: &str) -> Result<()> {
    let mut item = self.item(item_key).await?;
    if item.data.collections.iter().any(|c| c == collection) {
      return Ok(());
    }
    item.data.collections.push(collection.to_string());
    self.update_item(&item).await
  }

  /// Removes an item from a collection.
  pub async fn remove_item_from_collection(
    &mut self,
    item_key: &str,
    collection: &str,
  ) -> Result<()> {
    let mut item = self.item(item_key).await?;
    let before = item.data.collections.len();
    item.data.collections.retain(|c| c != collection);
    if item.data.collections.len() != before { self.update_item(&item).await } else { Ok(()) }
  }

  /// Moves an item into a collection, replacing all existing memberships.
  pub async fn move_item_to_collection(&mut self, item_key: &str, collection: &str) -> Result<()> {
    let mut item = self.item(item_key).await?;
    item.data.collections = vec![collection.to_string()];
    self.update_item(&item).await
  }

  /// Moves each of the given items into a collection.
  pub async fn batch_move_to_collection(
    &mut self,
    keys: &[String],
    collection: &str,
  ) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for key in keys {
      match self.move_item_to_collection(key, collection).await {
        Ok(()) => outcome.ok(key),
        Err(error) => outcome.err(key, &error),
      }
    }
    outcome
  }

  /// Submits a collection's current data back to the server.
  async fn update_collection(&mut self, collection: &Collection) -> Result<()> {
    let mut data = collection.data.clone();
    data.key = Some(collection.key.clone());
    data.version = Some(collection.version);
    let response: WriteResponse = self.post_json("collections", &vec![data]).await?;
    match response.failed.values().next() {
      None => Ok(()),
      Some(failure) =>
        Err(CuratorError::Api { status: failure.code as u16, message: failure.message.clone() }),
    }
  }
}
