//! # Pantry Storage Abstraction
//!
//! The core never touches global state: pantry persistence is an injected
//! interface with an in-memory fallback implementation. The database-backed
//! implementation lives in `db` and is swappable with this one behind the
//! same trait.

use crate::errors::AppResult;
use crate::pantry::{ItemSource, PantryItem, StorageLocation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Fields required to insert a pantry item; identity and insertion time are
/// assigned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPantryItem {
    pub ingredient_id: String,
    pub quantity: f64,
    pub unit: String,
    pub storage: StorageLocation,
    pub expiry_at: Option<DateTime<Utc>>,
    pub source: ItemSource,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update of a pantry item.
///
/// Absent fields are left untouched; the nested options on `expiry_at` and
/// `notes` distinguish "leave as is" from "clear the value".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PantryItemUpdate {
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub storage: Option<StorageLocation>,
    pub expiry_at: Option<Option<DateTime<Utc>>>,
    pub notes: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

/// Injected pantry persistence interface.
///
/// Implementations should be Send + Sync to allow sharing across async
/// tasks.
#[async_trait]
pub trait PantryStore: Send + Sync {
    /// Fetch one item by id
    async fn get(&self, id: &str) -> AppResult<Option<PantryItem>>;

    /// List all items, newest first
    async fn list(&self) -> AppResult<Vec<PantryItem>>;

    /// Insert a new item and return it with identity assigned
    async fn add(&self, item: NewPantryItem) -> AppResult<PantryItem>;

    /// Apply a partial update; returns false when the id is unknown
    async fn update(&self, id: &str, updates: PantryItemUpdate) -> AppResult<bool>;

    /// Remove an item; returns false when the id is unknown
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

/// Thread-safe in-memory pantry store.
///
/// The fallback implementation used when no database is configured; state
/// lives for the lifetime of the value and is shared across clones.
#[derive(Default)]
pub struct MemoryStore {
    items: Arc<RwLock<Vec<PantryItem>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

#[async_trait]
impl PantryStore for MemoryStore {
    async fn get(&self, id: &str) -> AppResult<Option<PantryItem>> {
        Ok(self.items.read().iter().find(|i| i.id == id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<PantryItem>> {
        Ok(self.items.read().clone())
    }

    async fn add(&self, item: NewPantryItem) -> AppResult<PantryItem> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = PantryItem {
            id: format!("mem-{}", id),
            ingredient_id: item.ingredient_id,
            quantity: item.quantity,
            unit: item.unit,
            storage: item.storage,
            expiry_at: item.expiry_at,
            source: item.source,
            added_at: Utc::now(),
            notes: item.notes,
            tags: item.tags,
        };
        debug!(item_id = %stored.id, ingredient_id = %stored.ingredient_id, "Adding pantry item");
        // Newest entries go first, matching list order
        self.items.write().insert(0, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &str, updates: PantryItemUpdate) -> AppResult<bool> {
        let mut items = self.items.write();
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };

        if let Some(quantity) = updates.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = updates.unit {
            item.unit = unit;
        }
        if let Some(storage) = updates.storage {
            item.storage = storage;
        }
        if let Some(expiry_at) = updates.expiry_at {
            item.expiry_at = expiry_at;
        }
        if let Some(notes) = updates.notes {
            item.notes = notes;
        }
        if let Some(tags) = updates.tags {
            item.tags = tags;
        }
        debug!(item_id = %id, "Updated pantry item");
        Ok(true)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|i| i.id != id);
        let removed = items.len() < before;
        debug!(item_id = %id, removed = removed, "Deleted pantry item");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(ingredient_id: &str, quantity: f64) -> NewPantryItem {
        NewPantryItem {
            ingredient_id: ingredient_id.to_string(),
            quantity,
            unit: "piece".to_string(),
            storage: StorageLocation::Fridge,
            expiry_at: None,
            source: ItemSource::Manual,
            notes: None,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let store = MemoryStore::new();
        let added = store.add(new_item("demo-1", 4.0)).await.unwrap();
        assert!(added.id.starts_with("mem-"));

        let fetched = store.get(&added.id).await.unwrap().unwrap();
        assert_eq!(fetched, added);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryStore::new();
        let first = store.add(new_item("demo-1", 1.0)).await.unwrap();
        let second = store.add(new_item("demo-2", 2.0)).await.unwrap();

        let items = store.list().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, second.id);
        assert_eq!(items[1].id, first.id);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        let added = store.add(new_item("demo-1", 4.0)).await.unwrap();

        let updated = store
            .update(
                &added.id,
                PantryItemUpdate {
                    quantity: Some(2.0),
                    notes: Some(Some("half used".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let fetched = store.get(&added.id).await.unwrap().unwrap();
        assert_eq!(fetched.quantity, 2.0);
        assert_eq!(fetched.notes.as_deref(), Some("half used"));
        // Untouched fields are preserved
        assert_eq!(fetched.unit, "piece");
        assert_eq!(fetched.storage, StorageLocation::Fridge);

        let missing = store
            .update("missing", PantryItemUpdate::default())
            .await
            .unwrap();
        assert!(!missing);
    }

    #[tokio::test]
    async fn test_update_can_clear_expiry() {
        let store = MemoryStore::new();
        let mut item = new_item("demo-1", 1.0);
        item.expiry_at = Some(Utc::now());
        let added = store.add(item).await.unwrap();

        store
            .update(
                &added.id,
                PantryItemUpdate {
                    expiry_at: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let fetched = store.get(&added.id).await.unwrap().unwrap();
        assert!(fetched.expiry_at.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let added = store.add(new_item("demo-1", 1.0)).await.unwrap();

        assert!(store.delete(&added.id).await.unwrap());
        assert!(!store.delete(&added.id).await.unwrap());
        assert!(store.is_empty());
    }
}
