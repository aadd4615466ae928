//! # KitchenWise Core
//!
//! Pantry-and-recipe management core: parses grocery receipt lines coming
//! from an OCR collaborator, resolves them against a canonical ingredient
//! catalog, and scores recipes against current pantry holdings.

pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod line_parser;
pub mod matcher;
pub mod observability;
pub mod ocr;
pub mod pantry;
pub mod receipt;
pub mod recipe;
pub mod store;

// Re-export types for easier access
pub use line_parser::{LineParser, ParsedLine};
pub use matcher::{match_ingredient, Confidence, MatchedLineItem};
pub use recipe::{evaluate_availability, RecipeAvailability};
