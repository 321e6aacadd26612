use std::collections::HashMap;

use super::ItemStore;
use crate::domain::Item;

/// In-memory item store: a dense vector with an id index
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loaded items; later duplicates replace earlier ones
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut store = Self::new();
        for item in items {
            store.upsert(item);
        }
        store
    }
}

impl ItemStore for MemoryStore {
    fn get(&self, id: &str) -> Option<&Item> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    fn all(&self) -> &[Item] {
        &self.items
    }

    fn upsert(&mut self, mut item: Item) {
        item.normalize();
        match self.index.get(&item.id) {
            Some(&i) => self.items[i] = item,
            None => {
                self.index.insert(item.id.clone(), self.items.len());
                self.items.push(item);
            }
        }
    }

    fn remove(&mut self, id: &str) -> Option<Item> {
        let i = self.index.remove(id)?;
        let removed = self.items.swap_remove(i);
        if let Some(moved) = self.items.get(i) {
            self.index.insert(moved.id.clone(), i);
        }
        Some(removed)
    }
}
