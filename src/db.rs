//! # Database-Backed Storage
//!
//! Postgres implementations of the pantry store plus typed row ingestion for
//! the catalog and recipe reference data. All external rows pass through the
//! catalog ingestion boundary before reaching the parsing and matching code.

use crate::catalog::{ingest_records, CanonicalIngredient, RawIngredientRecord};
use crate::config::DatabaseConfig;
use crate::errors::{error_logging, AppResult};
use crate::pantry::{ItemSource, PantryItem, StorageLocation};
use crate::recipe::{Difficulty, Nutrition, Recipe, RecipeRequirement, RecipeSource};
use crate::store::{NewPantryItem, PantryItemUpdate, PantryStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema");

    // Create canonical ingredient table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ingredient_canonical (
            id VARCHAR(64) PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            synonyms TEXT[] DEFAULT '{}',
            category VARCHAR(32),
            default_unit VARCHAR(50),
            density DOUBLE PRECISION,
            shelf_life_room_days INT,
            shelf_life_fridge_days INT,
            shelf_life_freezer_days INT
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create ingredient_canonical table")?;

    // Create pantry items table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS pantry_items (
            id BIGSERIAL PRIMARY KEY,
            ingredient_canonical_id VARCHAR(64) NOT NULL REFERENCES ingredient_canonical(id),
            quantity DOUBLE PRECISION NOT NULL,
            unit VARCHAR(50) NOT NULL,
            storage VARCHAR(10) NOT NULL,
            expiry_at TIMESTAMPTZ,
            source VARCHAR(10) NOT NULL,
            notes TEXT,
            tags TEXT[] DEFAULT '{}',
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create pantry_items table")?;

    // Create recipes table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS recipes (
            id VARCHAR(64) PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            cuisine VARCHAR(100) NOT NULL,
            steps TEXT[] DEFAULT '{}',
            yields INT NOT NULL,
            time_minutes INT NOT NULL,
            difficulty VARCHAR(10) NOT NULL,
            calories DOUBLE PRECISION NOT NULL DEFAULT 0,
            protein DOUBLE PRECISION NOT NULL DEFAULT 0,
            fat DOUBLE PRECISION NOT NULL DEFAULT 0,
            carbs DOUBLE PRECISION NOT NULL DEFAULT 0,
            source VARCHAR(16) NOT NULL DEFAULT 'imported'
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create recipes table")?;

    // Create recipe ingredients table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS recipe_ingredients (
            id BIGSERIAL PRIMARY KEY,
            recipe_id VARCHAR(64) NOT NULL REFERENCES recipes(id),
            ingredient_canonical_id VARCHAR(64) NOT NULL,
            quantity DOUBLE PRECISION NOT NULL,
            unit VARCHAR(50) NOT NULL,
            optional BOOLEAN NOT NULL DEFAULT FALSE,
            substitutions TEXT[] DEFAULT '{}'
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create recipe_ingredients table")?;

    // Create indexes for performance
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS pantry_items_ingredient_idx
         ON pantry_items(ingredient_canonical_id)",
    )
    .execute(pool)
    .await
    .context("Failed to create pantry_items ingredient index")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS recipe_ingredients_recipe_idx
         ON recipe_ingredients(recipe_id)",
    )
    .execute(pool)
    .await
    .context("Failed to create recipe_ingredients recipe index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Fetch the canonical ingredient catalog ordered by name.
///
/// Rows are converted through the ingestion boundary; malformed rows are
/// skipped rather than failing the whole fetch.
pub async fn list_canonical_ingredients(pool: &PgPool) -> Result<Vec<CanonicalIngredient>> {
    debug!("Fetching canonical ingredient catalog");

    let rows = sqlx::query(
        "SELECT id, name, synonyms, category, default_unit, density,
                shelf_life_room_days, shelf_life_fridge_days, shelf_life_freezer_days
         FROM ingredient_canonical ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .context("Failed to fetch canonical ingredients")?;

    let raws: Vec<RawIngredientRecord> = rows
        .iter()
        .map(|row| RawIngredientRecord {
            id: row.get(0),
            name: row.get(1),
            synonyms: row.get(2),
            category: row.get(3),
            default_unit: row.get(4),
            density: row.get(5),
            shelf_life_room_days: row.get::<Option<i32>, _>(6).map(i64::from),
            shelf_life_fridge_days: row.get::<Option<i32>, _>(7).map(i64::from),
            shelf_life_freezer_days: row.get::<Option<i32>, _>(8).map(i64::from),
        })
        .collect();

    Ok(ingest_records(&raws))
}

/// Fetch all recipes with their ingredient requirements, ordered by title
pub async fn list_recipes(pool: &PgPool) -> Result<Vec<Recipe>> {
    debug!("Fetching recipes");

    let ingredient_rows = sqlx::query(
        "SELECT recipe_id, ingredient_canonical_id, quantity, unit, optional, substitutions
         FROM recipe_ingredients ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("Failed to fetch recipe ingredients")?;

    let mut by_recipe: HashMap<String, Vec<RecipeRequirement>> = HashMap::new();
    for row in &ingredient_rows {
        let recipe_id: String = row.get(0);
        by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeRequirement {
                ingredient_id: row.get(1),
                quantity: row.get(2),
                unit: row.get(3),
                optional: row.get(4),
                substitutions: row.get::<Option<Vec<String>>, _>(5).unwrap_or_default(),
            });
    }

    let rows = sqlx::query(
        "SELECT id, title, cuisine, steps, yields, time_minutes, difficulty,
                calories, protein, fat, carbs, source
         FROM recipes ORDER BY title",
    )
    .fetch_all(pool)
    .await
    .context("Failed to fetch recipes")?;

    let recipes = rows
        .iter()
        .map(|row| {
            let id: String = row.get(0);
            let ingredients = by_recipe.remove(&id).unwrap_or_default();
            Recipe {
                title: row.get(1),
                cuisine: row.get(2),
                steps: row.get::<Option<Vec<String>>, _>(3).unwrap_or_default(),
                yields: row.get::<i32, _>(4).max(0) as u32,
                time_minutes: row.get::<i32, _>(5).max(0) as u32,
                difficulty: parse_difficulty(row.get(6)),
                nutrition: Nutrition {
                    calories: row.get(7),
                    protein: row.get(8),
                    fat: row.get(9),
                    carbs: row.get(10),
                },
                source: parse_recipe_source(row.get(11)),
                ingredients,
                id,
            }
        })
        .collect();

    Ok(recipes)
}

fn parse_difficulty(raw: String) -> Difficulty {
    match raw.to_lowercase().as_str() {
        "medium" => Difficulty::Medium,
        "hard" => Difficulty::Hard,
        _ => Difficulty::Easy,
    }
}

fn parse_recipe_source(raw: String) -> RecipeSource {
    match raw.to_lowercase().as_str() {
        "user" => RecipeSource::User,
        "community" => RecipeSource::Community,
        _ => RecipeSource::Imported,
    }
}

fn map_pantry_row(row: &PgRow) -> PantryItem {
    PantryItem {
        id: row.get::<i64, _>(0).to_string(),
        ingredient_id: row.get(1),
        quantity: row.get(2),
        unit: row.get(3),
        storage: StorageLocation::parse_lossy(&row.get::<String, _>(4)),
        expiry_at: row.get(5),
        source: ItemSource::parse_lossy(&row.get::<String, _>(6)),
        notes: row.get(7),
        tags: row.get::<Option<Vec<String>>, _>(8).unwrap_or_default(),
        added_at: row.get(9),
    }
}

const PANTRY_COLUMNS: &str = "id, ingredient_canonical_id, quantity, unit, storage, expiry_at,
                              source, notes, tags, created_at";

/// Postgres-backed pantry store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the database configuration and prepare the schema
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| {
                error_logging::log_database_error(&e, "connect", None);
                crate::errors::AppError::from(e)
            })?;

        init_database_schema(&pool)
            .await
            .map_err(crate::errors::AppError::from)?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PantryStore for PgStore {
    async fn get(&self, id: &str) -> AppResult<Option<PantryItem>> {
        // Ids handed out by this store are numeric; anything else cannot match
        let Ok(numeric_id) = id.parse::<i64>() else {
            return Ok(None);
        };

        let row = sqlx::query(&format!(
            "SELECT {} FROM pantry_items WHERE id = $1",
            PANTRY_COLUMNS
        ))
        .bind(numeric_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_pantry_row))
    }

    async fn list(&self) -> AppResult<Vec<PantryItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pantry_items ORDER BY created_at DESC",
            PANTRY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_pantry_row).collect())
    }

    async fn add(&self, item: NewPantryItem) -> AppResult<PantryItem> {
        debug!(ingredient_id = %item.ingredient_id, "Adding pantry item");

        let row = sqlx::query(&format!(
            "INSERT INTO pantry_items
                 (ingredient_canonical_id, quantity, unit, storage, expiry_at, source, notes, tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            PANTRY_COLUMNS
        ))
        .bind(&item.ingredient_id)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.storage.as_str())
        .bind(item.expiry_at)
        .bind(item.source.as_str())
        .bind(&item.notes)
        .bind(&item.tags)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_pantry_row(&row))
    }

    async fn update(&self, id: &str, updates: PantryItemUpdate) -> AppResult<bool> {
        let Some(mut item) = self.get(id).await? else {
            return Ok(false);
        };

        // Merge the partial update, then write the row back whole
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

        let numeric_id = match id.parse::<i64>() {
            Ok(v) => v,
            Err(_) => return Ok(false),
        };

        let result = sqlx::query(
            "UPDATE pantry_items
             SET quantity = $2, unit = $3, storage = $4, expiry_at = $5, notes = $6, tags = $7
             WHERE id = $1",
        )
        .bind(numeric_id)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.storage.as_str())
        .bind(item.expiry_at)
        .bind(&item.notes)
        .bind(&item.tags)
        .execute(&self.pool)
        .await?;

        debug!(item_id = %id, "Updated pantry item");
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let Ok(numeric_id) = id.parse::<i64>() else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM pantry_items WHERE id = $1")
            .bind(numeric_id)
            .execute(&self.pool)
            .await?;

        debug!(item_id = %id, removed = result.rows_affected() > 0, "Deleted pantry item");
        Ok(result.rows_affected() > 0)
    }
}
