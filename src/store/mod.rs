//! Item storage.
//!
//! The engine works against [`ItemStore`], a keyed in-memory view of every
//! item. Durable persistence is a separate adapter ([`sqlite::SqliteStore`])
//! written behind the sync worker, so a storage failure never loses the
//! in-memory state.

pub mod memory;
pub mod sqlite;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{Item, ItemKind};
use crate::error::StoreError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Keyed access to the full item set
pub trait ItemStore: Send {
    fn get(&self, id: &str) -> Option<&Item>;

    /// Every item, in no particular order
    fn all(&self) -> &[Item];

    /// Insert or replace by id
    fn upsert(&mut self, item: Item);

    fn remove(&mut self, id: &str) -> Option<Item>;

    fn len(&self) -> usize {
        self.all().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Durable write side used by the sync worker
pub trait Persistence: Send + Sync {
    fn save_items(&self, items: &[Item]) -> Result<(), StoreError>;

    fn delete_items(&self, ids: &[String]) -> Result<usize, StoreError>;
}

impl Persistence for SqliteStore {
    fn save_items(&self, items: &[Item]) -> Result<(), StoreError> {
        SqliteStore::save_items(self, items)
    }

    fn delete_items(&self, ids: &[String]) -> Result<usize, StoreError> {
        SqliteStore::delete_items(self, ids)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
}

/// Merge incoming content by id.
///
/// Unknown ids are added as-is (after repair). Known ids take the incoming
/// content fields but keep the stored progress and SRS state, so re-importing
/// a book never resets a learner. A content field the incoming record leaves
/// empty (or at its default) keeps the stored value, so partial records never
/// wipe content.
pub fn import_items(store: &mut dyn ItemStore, incoming: Vec<Item>) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for item in incoming {
        let merged = match store.get(&item.id) {
            Some(existing) => {
                summary.updated += 1;
                Item {
                    topic: non_empty(item.topic).unwrap_or_else(|| existing.topic.clone()),
                    kind: if item.kind == ItemKind::default() {
                        existing.kind
                    } else {
                        item.kind
                    },
                    book_id: item.book_id.or_else(|| existing.book_id.clone()),
                    prompt: non_empty(item.prompt).unwrap_or_else(|| existing.prompt.clone()),
                    correct_option: item.correct_option.or_else(|| existing.correct_option.clone()),
                    ..existing.clone()
                }
            }
            None => {
                summary.added += 1;
                item
            }
        };
        store.upsert(merged);
    }

    summary
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Remove every item belonging to a book, returning the removed ids
pub fn remove_book(store: &mut dyn ItemStore, book_id: &str) -> Vec<String> {
    let ids: Vec<String> = store
        .all()
        .iter()
        .filter(|i| i.book_id.as_deref() == Some(book_id))
        .map(|i| i.id.clone())
        .collect();

    for id in &ids {
        store.remove(id);
    }
    ids
}

/// Pick the fresher of two copies of the same item.
///
/// The copy with the later `lastAttemptedAt` wins outright; a copy that was
/// never attempted loses to one that was. On a tie the local copy is kept.
pub fn merge_remote(local: &Item, remote: &Item) -> Item {
    let remote_newer = match (local.last_attempted_at, remote.last_attempted_at) {
        (Some(l), Some(r)) => r > l,
        (None, Some(_)) => true,
        _ => false,
    };

    let mut winner = if remote_newer { remote.clone() } else { local.clone() };
    winner.normalize();
    winner
}

/// Fold a remote snapshot into the store, returning ids whose state changed
pub fn merge_snapshot(store: &mut dyn ItemStore, remote: Vec<Item>) -> Vec<String> {
    let mut changed = Vec::new();

    for remote_item in remote {
        let merged = match store.get(&remote_item.id) {
            Some(local) => {
                let merged = merge_remote(local, &remote_item);
                if &merged == local {
                    continue;
                }
                merged
            }
            None => remote_item,
        };
        changed.push(merged.id.clone());
        store.upsert(merged);
    }

    changed
}

/// Flat id -> item map, the shape items travel in across the sync boundary
pub fn to_keyed_map(items: &[Item]) -> BTreeMap<String, Item> {
    items.iter().map(|i| (i.id.clone(), i.clone())).collect()
}

/// Items from a keyed map; a record with a blank id takes its key
pub fn from_keyed_map(map: BTreeMap<String, Item>) -> Vec<Item> {
    map.into_iter()
        .map(|(key, mut item)| {
            if item.id.is_empty() {
                item.id = key;
            }
            item
        })
        .collect()
}
