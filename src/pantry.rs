//! # Pantry Holdings
//!
//! Pantry item model, expiry-status computation, and the availability
//! snapshot that feeds recipe evaluation.
//!
//! ## Features
//!
//! - `PantryItem` value type with storage location, source, and optional
//!   expiry timestamp
//! - Expiry status buckets computed from whole days until expiry
//! - Suggested expiry dates from the catalog's shelf-life defaults
//! - Snapshot aggregation of holdings into per-ingredient available
//!   quantities (last-seen entry wins over duplicates, no summation)
//! - Pantry list filtering by search text, category, storage, and expiry
//!   bucket

use crate::catalog::{CanonicalIngredient, IngredientCategory};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Where a pantry item is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageLocation {
    Room,
    Fridge,
    Freezer,
}

impl StorageLocation {
    /// Stable lower-case label, matching the external storage format
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageLocation::Room => "room",
            StorageLocation::Fridge => "fridge",
            StorageLocation::Freezer => "freezer",
        }
    }

    /// Parse a storage label from an external row, defaulting to fridge
    pub fn parse_lossy(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "room" => StorageLocation::Room,
            "freezer" => StorageLocation::Freezer,
            _ => StorageLocation::Fridge,
        }
    }
}

/// How a pantry item entered the pantry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Receipt,
    Manual,
}

impl ItemSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSource::Receipt => "receipt",
            ItemSource::Manual => "manual",
        }
    }

    /// Parse a source label from an external row, defaulting to manual
    pub fn parse_lossy(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "receipt" => ItemSource::Receipt,
            _ => ItemSource::Manual,
        }
    }
}

/// A quantity of a canonical ingredient held in storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItem {
    pub id: String,
    pub ingredient_id: String,
    pub quantity: f64,
    pub unit: String,
    pub storage: StorageLocation,
    pub expiry_at: Option<DateTime<Utc>>,
    pub source: ItemSource,
    pub added_at: DateTime<Utc>,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Expiry buckets for display and filtering, nearest deadline first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryStatus {
    Expired,
    ExpiresToday,
    ExpiringSoon,
    ExpiringWeek,
    Fresh,
    NoExpiry,
}

/// Bucket an optional expiry timestamp by whole days remaining from `now`.
///
/// Negative days are expired; up to one day counts as expiring today, up to
/// three as soon, up to seven as within the week.
pub fn expiry_status(expiry_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ExpiryStatus {
    let Some(expiry) = expiry_at else {
        return ExpiryStatus::NoExpiry;
    };

    let days = expiry.signed_duration_since(now).num_days();
    if days < 0 {
        ExpiryStatus::Expired
    } else if days <= 1 {
        ExpiryStatus::ExpiresToday
    } else if days <= 3 {
        ExpiryStatus::ExpiringSoon
    } else if days <= 7 {
        ExpiryStatus::ExpiringWeek
    } else {
        ExpiryStatus::Fresh
    }
}

/// Suggest an expiry date from the ingredient's shelf-life defaults for the
/// chosen storage location
pub fn suggested_expiry(
    ingredient: &CanonicalIngredient,
    storage: StorageLocation,
    added_at: DateTime<Utc>,
) -> DateTime<Utc> {
    let days = match storage {
        StorageLocation::Room => ingredient.shelf_life.room_days,
        StorageLocation::Fridge => ingredient.shelf_life.fridge_days,
        StorageLocation::Freezer => ingredient.shelf_life.freezer_days,
    };
    added_at + Duration::days(days as i64)
}

/// Available quantity of one canonical ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub quantity: f64,
    pub unit: String,
}

/// Mapping from canonical ingredient id to its available quantity
pub type AvailabilitySnapshot = HashMap<String, Availability>;

/// Aggregate current holdings into an availability snapshot.
///
/// When several pantry entries carry the same ingredient id, the last one
/// seen wins; quantities are not summed across entries.
pub fn availability_snapshot(items: &[PantryItem]) -> AvailabilitySnapshot {
    let mut available = AvailabilitySnapshot::new();
    for item in items {
        available.insert(
            item.ingredient_id.clone(),
            Availability {
                quantity: item.quantity,
                unit: item.unit.clone(),
            },
        );
    }
    debug!(
        items = items.len(),
        ingredients = available.len(),
        "Built availability snapshot"
    );
    available
}

/// Expiry bucket selection for pantry filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryFilter {
    /// Expiry within three days
    ExpiringSoon,
    /// Expiry in the past
    Expired,
    /// No expiry date set
    NoExpiry,
}

/// Filter over the pantry list.
///
/// Absent fields do not constrain. Search and category need the catalog to
/// resolve ingredient names, so filtering takes the catalog alongside the
/// items.
#[derive(Debug, Clone, Default)]
pub struct PantryFilter {
    /// Case-insensitive substring over ingredient name and synonyms
    pub search: Option<String>,
    pub category: Option<IngredientCategory>,
    pub storage: Option<StorageLocation>,
    pub expiry: Option<ExpiryFilter>,
}

impl PantryFilter {
    fn matches(
        &self,
        item: &PantryItem,
        ingredient: Option<&CanonicalIngredient>,
        now: DateTime<Utc>,
    ) -> bool {
        if let Some(query) = &self.search {
            let query = query.to_lowercase();
            let hit = ingredient.is_some_and(|i| {
                i.name.to_lowercase().contains(&query)
                    || i.synonyms.iter().any(|s| s.to_lowercase().contains(&query))
            });
            if !hit {
                return false;
            }
        }
        if let Some(category) = self.category {
            if ingredient.map(|i| i.category) != Some(category) {
                return false;
            }
        }
        if let Some(storage) = self.storage {
            if item.storage != storage {
                return false;
            }
        }
        if let Some(expiry) = self.expiry {
            let matches_expiry = match expiry {
                ExpiryFilter::ExpiringSoon => item
                    .expiry_at
                    .is_some_and(|e| e.signed_duration_since(now).num_days() <= 3),
                ExpiryFilter::Expired => item.expiry_at.is_some_and(|e| e < now),
                ExpiryFilter::NoExpiry => item.expiry_at.is_none(),
            };
            if !matches_expiry {
                return false;
            }
        }
        true
    }
}

/// Filter pantry items against the catalog, preserving item order
pub fn filter_pantry<'a>(
    items: &'a [PantryItem],
    catalog: &[CanonicalIngredient],
    filter: &PantryFilter,
    now: DateTime<Utc>,
) -> Vec<&'a PantryItem> {
    items
        .iter()
        .filter(|item| {
            let ingredient = catalog.iter().find(|i| i.id == item.ingredient_id);
            filter.matches(item, ingredient, now)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fallback_catalog;
    use chrono::TimeZone;

    fn item(id: &str, ingredient_id: &str, quantity: f64, unit: &str) -> PantryItem {
        PantryItem {
            id: id.to_string(),
            ingredient_id: ingredient_id.to_string(),
            quantity,
            unit: unit.to_string(),
            storage: StorageLocation::Fridge,
            expiry_at: None,
            source: ItemSource::Manual,
            added_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            notes: None,
            tags: vec![],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_expiry_status_buckets() {
        let now = now();
        assert_eq!(expiry_status(None, now), ExpiryStatus::NoExpiry);
        assert_eq!(
            expiry_status(Some(now - Duration::days(1)), now),
            ExpiryStatus::Expired
        );
        assert_eq!(
            expiry_status(Some(now + Duration::hours(6)), now),
            ExpiryStatus::ExpiresToday
        );
        assert_eq!(
            expiry_status(Some(now + Duration::days(1)), now),
            ExpiryStatus::ExpiresToday
        );
        assert_eq!(
            expiry_status(Some(now + Duration::days(3)), now),
            ExpiryStatus::ExpiringSoon
        );
        assert_eq!(
            expiry_status(Some(now + Duration::days(7)), now),
            ExpiryStatus::ExpiringWeek
        );
        assert_eq!(
            expiry_status(Some(now + Duration::days(30)), now),
            ExpiryStatus::Fresh
        );
    }

    #[test]
    fn test_suggested_expiry_per_storage() {
        let catalog = fallback_catalog();
        let chicken = catalog.iter().find(|i| i.id == "demo-2").unwrap();
        let added = now();

        assert_eq!(
            suggested_expiry(chicken, StorageLocation::Fridge, added),
            added + Duration::days(3)
        );
        assert_eq!(
            suggested_expiry(chicken, StorageLocation::Room, added),
            added
        );
        assert_eq!(
            suggested_expiry(chicken, StorageLocation::Freezer, added),
            added + Duration::days(270)
        );
    }

    #[test]
    fn test_snapshot_last_entry_wins() {
        let items = vec![
            item("a", "demo-1", 4.0, "piece"),
            item("b", "demo-3", 2.0, "cup"),
            item("c", "demo-1", 1.0, "piece"),
        ];

        let snapshot = availability_snapshot(&items);
        assert_eq!(snapshot.len(), 2);
        // Duplicate ingredient ids keep only the last-seen quantity
        assert_eq!(snapshot["demo-1"].quantity, 1.0);
        assert_eq!(snapshot["demo-3"].quantity, 2.0);
    }

    #[test]
    fn test_filter_by_search_and_category() {
        let catalog = fallback_catalog();
        let items = vec![
            item("a", "demo-1", 4.0, "piece"),
            item("b", "demo-2", 2.0, "piece"),
        ];

        let by_search = filter_pantry(
            &items,
            &catalog,
            &PantryFilter {
                search: Some("poultry".to_string()),
                ..Default::default()
            },
            now(),
        );
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].id, "b");

        let by_category = filter_pantry(
            &items,
            &catalog,
            &PantryFilter {
                category: Some(IngredientCategory::Vegetable),
                ..Default::default()
            },
            now(),
        );
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].id, "a");
    }

    #[test]
    fn test_filter_by_expiry_bucket() {
        let catalog = fallback_catalog();
        let now = now();

        let mut expired = item("a", "demo-1", 1.0, "piece");
        expired.expiry_at = Some(now - Duration::days(2));
        let mut soon = item("b", "demo-1", 1.0, "piece");
        soon.expiry_at = Some(now + Duration::days(2));
        let none = item("c", "demo-1", 1.0, "piece");

        let items = vec![expired, soon, none];

        let expired_only = filter_pantry(
            &items,
            &catalog,
            &PantryFilter {
                expiry: Some(ExpiryFilter::Expired),
                ..Default::default()
            },
            now,
        );
        assert_eq!(expired_only.len(), 1);
        assert_eq!(expired_only[0].id, "a");

        let soon_only = filter_pantry(
            &items,
            &catalog,
            &PantryFilter {
                expiry: Some(ExpiryFilter::ExpiringSoon),
                ..Default::default()
            },
            now,
        );
        // An already-expired item is also within three days
        assert_eq!(soon_only.len(), 2);

        let no_expiry = filter_pantry(
            &items,
            &catalog,
            &PantryFilter {
                expiry: Some(ExpiryFilter::NoExpiry),
                ..Default::default()
            },
            now,
        );
        assert_eq!(no_expiry.len(), 1);
        assert_eq!(no_expiry[0].id, "c");
    }
}
