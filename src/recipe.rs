//! # Recipe Model and Availability Evaluation
//!
//! This module holds the recipe reference model and the availability
//! evaluator that scores a recipe against a snapshot of current pantry
//! holdings.
//!
//! ## Features
//!
//! - Recipe and requirement value types mirroring the external recipe
//!   catalog
//! - `evaluate_availability`: match percentage and missing-ingredient list
//!   for a recipe given available quantities
//! - Recipe browsing filters (search, cuisine, difficulty, time, servings)
//!   with time-then-difficulty ordering
//!
//! Availability comparison is raw numeric comparison of quantities; unit
//! strings are carried for display only and are never converted. A
//! requirement in "kg" is not satisfied by a holding in "g" regardless of
//! magnitude.

use crate::pantry::AvailabilitySnapshot;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Recipe difficulty levels, ordered easiest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Where a recipe came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeSource {
    Imported,
    User,
    Community,
}

/// Per-serving nutrition summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

/// One ingredient requirement of a recipe.
///
/// Entity lifecycle owned by the external recipe catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRequirement {
    pub ingredient_id: String,
    pub quantity: f64,
    pub unit: String,
    pub optional: bool,
    #[serde(default)]
    pub substitutions: Vec<String>,
}

/// A recipe as delivered by the external recipe catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub cuisine: String,
    pub steps: Vec<String>,
    pub yields: u32,
    pub time_minutes: u32,
    pub difficulty: Difficulty,
    pub nutrition: Nutrition,
    pub source: RecipeSource,
    pub ingredients: Vec<RecipeRequirement>,
}

/// Result of scoring one recipe against pantry availability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeAvailability {
    /// True when nothing required is missing or insufficient
    pub can_make: bool,
    /// Missing or insufficient requirements, in recipe declaration order.
    /// Absent ingredients appear as their bare canonical id; insufficient
    /// ones as "<id> (need X U1, have Y U2)".
    pub missing_ingredients: Vec<String>,
    /// Share of non-optional requirements satisfiable, 0 to 100
    pub match_percentage: u8,
}

/// Score a recipe against a snapshot of available pantry quantities.
///
/// Only non-optional requirements count. A requirement is satisfied when its
/// ingredient id is present in the snapshot with `quantity >= required`,
/// compared numerically with no unit conversion.
///
/// A recipe with zero required ingredients reports a 0% match (not 100%)
/// while still being makeable.
///
/// Pure function of its two inputs.
pub fn evaluate_availability(
    recipe: &Recipe,
    available: &AvailabilitySnapshot,
) -> RecipeAvailability {
    let start_time = std::time::Instant::now();

    let mut missing: Vec<String> = Vec::new();
    let mut required = 0_u32;
    let mut satisfied = 0_u32;

    for requirement in recipe.ingredients.iter().filter(|r| !r.optional) {
        required += 1;
        match available.get(&requirement.ingredient_id) {
            Some(holding) => {
                if holding.quantity >= requirement.quantity {
                    satisfied += 1;
                } else {
                    missing.push(format!(
                        "{} (need {} {}, have {} {})",
                        requirement.ingredient_id,
                        requirement.quantity,
                        requirement.unit,
                        holding.quantity,
                        holding.unit
                    ));
                }
            }
            None => missing.push(requirement.ingredient_id.clone()),
        }
    }

    let match_percentage = if required > 0 {
        ((satisfied as f64 / required as f64) * 100.0).round() as u8
    } else {
        0
    };

    debug!(
        recipe_id = %recipe.id,
        required = required,
        satisfied = satisfied,
        match_percentage = match_percentage,
        "Evaluated recipe availability"
    );

    crate::observability::record_availability_metrics(start_time.elapsed(), missing.is_empty());

    RecipeAvailability {
        can_make: missing.is_empty(),
        missing_ingredients: missing,
        match_percentage,
    }
}

/// Browsing filter for the recipe list.
///
/// Absent fields do not constrain; ranges are inclusive.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Case-insensitive substring over title and cuisine
    pub search: Option<String>,
    pub cuisine: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub time_minutes: Option<(u32, u32)>,
    pub yields: Option<(u32, u32)>,
}

impl RecipeFilter {
    fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(query) = &self.search {
            let query = query.to_lowercase();
            if !recipe.title.to_lowercase().contains(&query)
                && !recipe.cuisine.to_lowercase().contains(&query)
            {
                return false;
            }
        }
        if let Some(cuisine) = &self.cuisine {
            if !recipe.cuisine.eq_ignore_ascii_case(cuisine) {
                return false;
            }
        }
        if let Some(difficulty) = self.difficulty {
            if recipe.difficulty != difficulty {
                return false;
            }
        }
        if let Some((min, max)) = self.time_minutes {
            if recipe.time_minutes < min || recipe.time_minutes > max {
                return false;
            }
        }
        if let Some((min, max)) = self.yields {
            if recipe.yields < min || recipe.yields > max {
                return false;
            }
        }
        true
    }
}

/// Built-in recipe list used when the external recipe catalog is unavailable
pub fn fallback_recipes() -> Vec<Recipe> {
    vec![Recipe {
        id: "demo-recipe-1".to_string(),
        title: "Simple Tomato Pasta".to_string(),
        cuisine: "Italian".to_string(),
        steps: vec![
            "Boil water and cook pasta according to package instructions".to_string(),
            "Dice tomatoes and saute in olive oil".to_string(),
            "Combine pasta with tomato sauce".to_string(),
            "Season with salt and pepper to taste".to_string(),
        ],
        yields: 4,
        time_minutes: 20,
        difficulty: Difficulty::Easy,
        nutrition: Nutrition {
            calories: 400.0,
            protein: 12.0,
            fat: 8.0,
            carbs: 70.0,
        },
        source: RecipeSource::Imported,
        ingredients: vec![
            RecipeRequirement {
                ingredient_id: "demo-1".to_string(),
                quantity: 4.0,
                unit: "piece".to_string(),
                optional: false,
                substitutions: vec![],
            },
            RecipeRequirement {
                ingredient_id: "demo-3".to_string(),
                quantity: 2.0,
                unit: "cup".to_string(),
                optional: false,
                substitutions: vec![],
            },
            RecipeRequirement {
                ingredient_id: "demo-4".to_string(),
                quantity: 2.0,
                unit: "tablespoon".to_string(),
                optional: false,
                substitutions: vec![],
            },
        ],
    }]
}

/// Filter recipes and order them quickest first, breaking ties easiest first
pub fn filter_recipes<'a>(recipes: &'a [Recipe], filter: &RecipeFilter) -> Vec<&'a Recipe> {
    let mut filtered: Vec<&Recipe> = recipes.iter().filter(|r| filter.matches(r)).collect();
    filtered.sort_by(|a, b| {
        a.time_minutes
            .cmp(&b.time_minutes)
            .then(a.difficulty.cmp(&b.difficulty))
    });
    filtered
}
