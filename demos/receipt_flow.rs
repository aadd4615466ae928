//! # Receipt Flow Example
//!
//! This example demonstrates the full KitchenWise pipeline: a mocked OCR
//! scan is parsed line by line, matched against the ingredient catalog,
//! imported into the in-memory pantry store, and finally scored against a
//! recipe.

use kitchen_wise::catalog::load_catalog;
use kitchen_wise::line_parser::LineParser;
use kitchen_wise::ocr::MockOcrEngine;
use kitchen_wise::pantry::availability_snapshot;
use kitchen_wise::receipt::{pantry_draft, scan_receipt};
use kitchen_wise::recipe::{evaluate_availability, fallback_recipes};
use kitchen_wise::store::{MemoryStore, PantryStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    kitchen_wise::observability::init_tracing().ok();

    println!("🧾 KitchenWise Receipt Flow Example");
    println!("====================================\n");

    // Step 1: scan a receipt with the mock OCR engine
    println!("📷 Step 1: Scan Receipt");
    println!("-----------------------");

    let engine = MockOcrEngine::new();
    let parser = LineParser::new();
    let catalog = load_catalog();

    let receipt = scan_receipt(&engine, &[], &parser, &catalog).await?;
    println!(
        "Recognized {} items (overall confidence {:.0}%):",
        receipt.confidence_summary.items,
        receipt.confidence_summary.overall * 100.0
    );
    for item in &receipt.line_items {
        println!(
            "  {:<24} → {} {} {}",
            item.raw_text,
            item.parsed.quantity,
            item.parsed.unit,
            if item.is_matched() { "[matched]" } else { "[unmatched]" }
        );
    }

    // Step 2: import matched items into the pantry
    println!("\n🥫 Step 2: Import to Pantry");
    println!("---------------------------");

    let store = MemoryStore::new();
    for item in &receipt.line_items {
        if let Some(draft) = pantry_draft(item) {
            let added = store.add(draft).await?;
            println!("  Added {} ({} {})", added.ingredient_id, added.quantity, added.unit);
        }
    }

    // Step 3: score a recipe against current holdings
    println!("\n🍝 Step 3: Evaluate Recipe");
    println!("--------------------------");

    let pantry_items = store.list().await?;
    let available = availability_snapshot(&pantry_items);

    for recipe in fallback_recipes() {
        let result = evaluate_availability(&recipe, &available);
        println!(
            "  {}: {}% match, can make: {}",
            recipe.title, result.match_percentage, result.can_make
        );
        for missing in &result.missing_ingredients {
            println!("    missing: {}", missing);
        }
    }

    Ok(())
}
