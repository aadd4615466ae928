//! # Canonical Ingredient Catalog
//!
//! This module defines the canonical ingredient reference data that raw receipt
//! text and recipe requirements are resolved against, together with a
//! strongly-typed ingestion boundary for records coming from the external
//! catalog collaborator.
//!
//! ## Features
//!
//! - `CanonicalIngredient` value type with category, default unit, and
//!   shelf-life defaults per storage location
//! - Validating ingestion of loose external records (`RawIngredientRecord`)
//!   into the typed catalog, rejecting or defaulting malformed fields at the
//!   edge
//! - Catalog loading from a JSON file with environment-variable path override
//!   and a built-in fallback catalog for when no file is available

use crate::errors::{error_logging, AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{debug, info, warn};

/// Fixed ingredient categories used across the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Protein,
    Vegetable,
    Grain,
    Oil,
    Dairy,
    Fruit,
    Spice,
    Other,
}

impl IngredientCategory {
    /// Parse a category string from an external record.
    ///
    /// Unknown or empty categories fall back to `Other` rather than rejecting
    /// the whole record.
    pub fn parse_lossy(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "protein" => IngredientCategory::Protein,
            "vegetable" => IngredientCategory::Vegetable,
            "grain" => IngredientCategory::Grain,
            "oil" => IngredientCategory::Oil,
            "dairy" => IngredientCategory::Dairy,
            "fruit" => IngredientCategory::Fruit,
            "spice" => IngredientCategory::Spice,
            "other" => IngredientCategory::Other,
            other => {
                debug!(category = %other, "Unknown ingredient category, defaulting to 'other'");
                IngredientCategory::Other
            }
        }
    }

    /// Stable lower-case label, matching the external catalog's storage format
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Protein => "protein",
            IngredientCategory::Vegetable => "vegetable",
            IngredientCategory::Grain => "grain",
            IngredientCategory::Oil => "oil",
            IngredientCategory::Dairy => "dairy",
            IngredientCategory::Fruit => "fruit",
            IngredientCategory::Spice => "spice",
            IngredientCategory::Other => "other",
        }
    }
}

/// Default shelf life in days per storage location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfLife {
    pub room_days: u32,
    pub fridge_days: u32,
    pub freezer_days: u32,
}

/// A deduplicated, authoritative ingredient record.
///
/// Immutable reference data; lifecycle owned by the external catalog
/// collaborator. Synonym order is irrelevant for matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalIngredient {
    pub id: String,
    pub name: String,
    pub synonyms: Vec<String>,
    pub category: IngredientCategory,
    pub default_unit: String,
    /// g/mL for liquids, when known
    pub density: Option<f64>,
    pub shelf_life: ShelfLife,
}

/// Loose record shape as delivered by the external catalog collaborator.
///
/// Fields arrive untyped and partially absent; `ingest_record` is the only
/// path from this shape into `CanonicalIngredient`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawIngredientRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub synonyms: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub default_unit: Option<String>,
    #[serde(default)]
    pub density: Option<f64>,
    #[serde(default)]
    pub shelf_life_room_days: Option<i64>,
    #[serde(default)]
    pub shelf_life_fridge_days: Option<i64>,
    #[serde(default)]
    pub shelf_life_freezer_days: Option<i64>,
}

/// Validate and convert one external record into a `CanonicalIngredient`.
///
/// Rejects records with an empty id or name and records carrying negative
/// shelf-life values. Missing synonyms become an empty list, unknown
/// categories default to `Other`, and a missing default unit becomes "unit".
pub fn ingest_record(raw: &RawIngredientRecord) -> AppResult<CanonicalIngredient> {
    let id = raw.id.trim();
    if id.is_empty() {
        let err = AppError::Validation("catalog record is missing an id".to_string());
        error_logging::log_ingestion_error(&err, None, Some(&raw.name));
        return Err(err);
    }

    let name = raw.name.trim();
    if name.is_empty() {
        let err = AppError::Validation(format!("catalog record '{}' is missing a name", id));
        error_logging::log_ingestion_error(&err, Some(id), None);
        return Err(err);
    }

    let shelf_day = |value: Option<i64>, field: &str| -> AppResult<u32> {
        match value {
            None => Ok(0),
            Some(days) if days >= 0 => Ok(days as u32),
            Some(days) => {
                let err = AppError::Validation(format!(
                    "catalog record '{}' has negative {} ({})",
                    id, field, days
                ));
                error_logging::log_ingestion_error(&err, Some(id), Some(name));
                Err(err)
            }
        }
    };

    let shelf_life = ShelfLife {
        room_days: shelf_day(raw.shelf_life_room_days, "room shelf life")?,
        fridge_days: shelf_day(raw.shelf_life_fridge_days, "fridge shelf life")?,
        freezer_days: shelf_day(raw.shelf_life_freezer_days, "freezer shelf life")?,
    };

    Ok(CanonicalIngredient {
        id: id.to_string(),
        name: name.to_string(),
        synonyms: raw
            .synonyms
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        category: raw
            .category
            .as_deref()
            .map(IngredientCategory::parse_lossy)
            .unwrap_or(IngredientCategory::Other),
        default_unit: raw
            .default_unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or("unit")
            .to_string(),
        density: raw.density,
        shelf_life,
    })
}

/// Ingest a batch of external records, skipping the ones that fail validation.
///
/// Catalog iteration order is preserved, which matters for first-hit matching.
pub fn ingest_records(raws: &[RawIngredientRecord]) -> Vec<CanonicalIngredient> {
    let mut ingredients = Vec::with_capacity(raws.len());
    for raw in raws {
        match ingest_record(raw) {
            Ok(ingredient) => ingredients.push(ingredient),
            Err(e) => {
                warn!(error = %e, "Skipping malformed catalog record");
            }
        }
    }
    info!(
        accepted = ingredients.len(),
        rejected = raws.len() - ingredients.len(),
        "Catalog ingestion complete"
    );
    ingredients
}

/// Catalog file shape on disk
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CatalogFile {
    ingredients: Vec<RawIngredientRecord>,
}

/// Load the canonical ingredient catalog from a JSON file.
///
/// Tries `CATALOG_CONFIG_PATH` first, then a short list of conventional
/// locations. When no file is found or parseable, falls back to the built-in
/// demo catalog so parsing and matching keep working without external data.
pub fn load_catalog() -> Vec<CanonicalIngredient> {
    if let Ok(config_path) = std::env::var("CATALOG_CONFIG_PATH") {
        info!(
            "Loading ingredient catalog from environment variable: {}",
            config_path
        );
        match fs::read_to_string(&config_path) {
            Ok(content) => match serde_json::from_str::<CatalogFile>(&content) {
                Ok(file) => {
                    info!("Successfully loaded ingredient catalog from: {}", config_path);
                    return ingest_records(&file.ingredients);
                }
                Err(e) => {
                    warn!(
                        "Failed to parse ingredient catalog from '{}': {}. Falling back to default paths.",
                        config_path, e
                    );
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read ingredient catalog from '{}': {}. Falling back to default paths.",
                    config_path, e
                );
            }
        }
    }

    let possible_paths = [
        "/app/config/catalog.json", // Docker path
        "config/catalog.json",      // Local development path
        "../config/catalog.json",   // Test path
    ];

    for config_path in &possible_paths {
        match fs::read_to_string(config_path) {
            Ok(content) => match serde_json::from_str::<CatalogFile>(&content) {
                Ok(file) => {
                    info!(
                        "Successfully loaded ingredient catalog from fallback path: {}",
                        config_path
                    );
                    return ingest_records(&file.ingredients);
                }
                Err(e) => {
                    warn!(
                        "Failed to parse ingredient catalog at '{}': {}. Trying next path.",
                        config_path, e
                    );
                    continue;
                }
            },
            Err(_) => continue, // Try next path
        }
    }

    warn!("No ingredient catalog file found in any expected location. Using built-in fallback catalog.");
    fallback_catalog()
}

/// Built-in catalog used when the external catalog is unavailable
pub fn fallback_catalog() -> Vec<CanonicalIngredient> {
    vec![
        CanonicalIngredient {
            id: "demo-1".to_string(),
            name: "Tomato".to_string(),
            synonyms: vec!["tomatoes".to_string(), "roma tomato".to_string()],
            category: IngredientCategory::Vegetable,
            default_unit: "piece".to_string(),
            density: None,
            shelf_life: ShelfLife {
                room_days: 7,
                fridge_days: 14,
                freezer_days: 180,
            },
        },
        CanonicalIngredient {
            id: "demo-2".to_string(),
            name: "Chicken Breast".to_string(),
            synonyms: vec!["chicken".to_string(), "poultry".to_string()],
            category: IngredientCategory::Protein,
            default_unit: "piece".to_string(),
            density: None,
            shelf_life: ShelfLife {
                room_days: 0,
                fridge_days: 3,
                freezer_days: 270,
            },
        },
        CanonicalIngredient {
            id: "demo-3".to_string(),
            name: "Pasta".to_string(),
            synonyms: vec!["spaghetti".to_string(), "penne".to_string()],
            category: IngredientCategory::Grain,
            default_unit: "cup".to_string(),
            density: None,
            shelf_life: ShelfLife {
                room_days: 365,
                fridge_days: 365,
                freezer_days: 365,
            },
        },
        CanonicalIngredient {
            id: "demo-4".to_string(),
            name: "Olive Oil".to_string(),
            synonyms: vec!["extra virgin olive oil".to_string()],
            category: IngredientCategory::Oil,
            default_unit: "tablespoon".to_string(),
            density: None,
            shelf_life: ShelfLife {
                room_days: 730,
                fridge_days: 730,
                freezer_days: 730,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_record() -> RawIngredientRecord {
        RawIngredientRecord {
            id: "ing-1".to_string(),
            name: "Tomato".to_string(),
            synonyms: Some(vec!["tomatoes".to_string()]),
            category: Some("vegetable".to_string()),
            default_unit: Some("piece".to_string()),
            density: None,
            shelf_life_room_days: Some(7),
            shelf_life_fridge_days: Some(14),
            shelf_life_freezer_days: Some(180),
        }
    }

    #[test]
    fn test_ingest_valid_record() {
        let ingredient = ingest_record(&valid_record()).unwrap();
        assert_eq!(ingredient.id, "ing-1");
        assert_eq!(ingredient.name, "Tomato");
        assert_eq!(ingredient.category, IngredientCategory::Vegetable);
        assert_eq!(ingredient.default_unit, "piece");
        assert_eq!(ingredient.shelf_life.fridge_days, 14);
    }

    #[test]
    fn test_ingest_rejects_missing_identity() {
        let mut record = valid_record();
        record.id = "  ".to_string();
        assert!(ingest_record(&record).is_err());

        let mut record = valid_record();
        record.name = String::new();
        assert!(ingest_record(&record).is_err());
    }

    #[test]
    fn test_ingest_rejects_negative_shelf_life() {
        let mut record = valid_record();
        record.shelf_life_fridge_days = Some(-1);
        assert!(ingest_record(&record).is_err());
    }

    #[test]
    fn test_ingest_defaults_malformed_fields() {
        let mut record = valid_record();
        record.category = Some("cryogenic".to_string());
        record.default_unit = None;
        record.synonyms = None;
        record.shelf_life_room_days = None;

        let ingredient = ingest_record(&record).unwrap();
        assert_eq!(ingredient.category, IngredientCategory::Other);
        assert_eq!(ingredient.default_unit, "unit");
        assert!(ingredient.synonyms.is_empty());
        assert_eq!(ingredient.shelf_life.room_days, 0);
    }

    #[test]
    fn test_ingest_records_skips_bad_entries() {
        let mut bad = valid_record();
        bad.id = String::new();
        let ingredients = ingest_records(&[valid_record(), bad]);
        assert_eq!(ingredients.len(), 1);
    }

    #[test]
    fn test_category_round_trip() {
        for category in [
            IngredientCategory::Protein,
            IngredientCategory::Vegetable,
            IngredientCategory::Grain,
            IngredientCategory::Oil,
            IngredientCategory::Dairy,
            IngredientCategory::Fruit,
            IngredientCategory::Spice,
            IngredientCategory::Other,
        ] {
            assert_eq!(IngredientCategory::parse_lossy(category.as_str()), category);
        }
    }

    #[test]
    fn test_fallback_catalog_shape() {
        let catalog = fallback_catalog();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.iter().any(|i| i.name == "Chicken Breast"));
    }
}
