//! # Receipt Processing Pipeline
//!
//! Turns recognized receipt lines into matched line items ready for review
//! and pantry import: each OCR line is parsed, resolved against the catalog,
//! and annotated with derived confidence.
//!
//! The pipeline is a per-line map with no cross-line state; lines can be
//! processed in any order or in parallel with identical results.

use crate::catalog::CanonicalIngredient;
use crate::errors::{error_logging, AppResult};
use crate::line_parser::LineParser;
use crate::matcher::{match_line, MatchedLineItem};
use crate::ocr::{OcrEngine, OcrLine};
use crate::pantry::{ItemSource, StorageLocation};
use crate::store::NewPantryItem;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Processing state of a scanned receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Aggregate recognition confidence over a receipt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceSummary {
    /// Mean per-line name confidence, 0 when the receipt has no lines
    pub overall: f64,
    /// Number of line items
    pub items: usize,
}

/// A processed receipt: its line items plus summary data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub line_items: Vec<MatchedLineItem>,
    pub confidence_summary: ConfidenceSummary,
    pub status: ScanStatus,
}

/// Parse and match a sequence of recognized lines against the catalog
pub fn process_lines(
    parser: &LineParser,
    lines: &[OcrLine],
    catalog: &[CanonicalIngredient],
) -> Vec<MatchedLineItem> {
    let items: Vec<MatchedLineItem> = lines
        .iter()
        .map(|line| match_line(&line.text, parser.parse(&line.text), line.confidence, catalog))
        .collect();

    let matched = items.iter().filter(|i| i.is_matched()).count();
    debug!(
        lines = lines.len(),
        matched = matched,
        unmatched = items.len() - matched,
        "Processed receipt lines"
    );
    items
}

/// Summarize per-line confidence for a processed receipt
pub fn confidence_summary(items: &[MatchedLineItem]) -> ConfidenceSummary {
    let overall = if items.is_empty() {
        0.0
    } else {
        items.iter().map(|i| i.confidence.name).sum::<f64>() / items.len() as f64
    };
    ConfidenceSummary {
        overall,
        items: items.len(),
    }
}

/// Run the full scan pipeline: recognize, parse, and match.
///
/// Recognition failures surface as errors; the parse and match stages are
/// total and cannot fail.
pub async fn scan_receipt(
    engine: &dyn OcrEngine,
    image_data: &[u8],
    parser: &LineParser,
    catalog: &[CanonicalIngredient],
) -> AppResult<Receipt> {
    let lines = match engine.recognize(image_data).await {
        Ok(lines) => lines,
        Err(e) => {
            error_logging::log_ocr_error(&e, "recognize", Some(image_data.len() as u64));
            return Err(e);
        }
    };
    let line_items = process_lines(parser, &lines, catalog);
    let summary = confidence_summary(&line_items);

    info!(
        items = summary.items,
        overall_confidence = summary.overall,
        "Receipt scan completed"
    );

    Ok(Receipt {
        line_items,
        confidence_summary: summary,
        status: ScanStatus::Completed,
    })
}

/// Build a pantry insertion from a matched line item.
///
/// Returns `None` for unmatched lines; those stay on the receipt for manual
/// review instead of entering the pantry. Receipt imports default to fridge
/// storage.
pub fn pantry_draft(item: &MatchedLineItem) -> Option<NewPantryItem> {
    let ingredient_id = item.canonical_id.clone()?;
    Some(NewPantryItem {
        ingredient_id,
        quantity: item.parsed.quantity,
        unit: item.parsed.unit.clone(),
        storage: StorageLocation::Fridge,
        expiry_at: None,
        source: ItemSource::Receipt,
        notes: Some("Added from receipt scan".to_string()),
        tags: vec![],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fallback_catalog;
    use crate::ocr::MockOcrEngine;

    #[test]
    fn test_process_lines_parses_and_matches() {
        let parser = LineParser::new();
        let catalog = fallback_catalog();
        let lines = MockOcrEngine::canned_lines();

        let items = process_lines(&parser, &lines, &catalog);
        assert_eq!(items.len(), 6);

        // "CHICKEN BREAST 2.5 LB" resolves to the chicken entry
        assert_eq!(items[0].canonical_id.as_deref(), Some("demo-2"));
        assert_eq!(items[0].parsed.quantity, 2.5);
        assert_eq!(items[0].parsed.unit, "lb");

        // "TOMATOES 6 UNITS" resolves through the synonym list
        assert_eq!(items[4].canonical_id.as_deref(), Some("demo-1"));

        // "BELL PEPPERS 4 UNITS" has no catalog entry and stays unmatched
        assert!(items[1].canonical_id.is_none());
    }

    #[test]
    fn test_confidence_summary_mean() {
        let parser = LineParser::new();
        let catalog = fallback_catalog();
        let lines = vec![
            OcrLine {
                text: "TOMATOES 2 UNITS".to_string(),
                confidence: 0.9,
            },
            OcrLine {
                text: "PASTA 1 UNIT".to_string(),
                confidence: 0.7,
            },
        ];

        let items = process_lines(&parser, &lines, &catalog);
        let summary = confidence_summary(&items);
        assert_eq!(summary.items, 2);
        assert!((summary.overall - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_summary_empty() {
        let summary = confidence_summary(&[]);
        assert_eq!(summary.items, 0);
        assert_eq!(summary.overall, 0.0);
    }

    #[tokio::test]
    async fn test_scan_receipt_end_to_end() {
        let engine = MockOcrEngine::new();
        let parser = LineParser::new();
        let catalog = fallback_catalog();

        let receipt = scan_receipt(&engine, &[], &parser, &catalog).await.unwrap();
        assert_eq!(receipt.status, ScanStatus::Completed);
        assert_eq!(receipt.confidence_summary.items, 6);
        assert!(receipt.confidence_summary.overall > 0.8);
    }

    #[test]
    fn test_pantry_draft_only_for_matched_lines() {
        let parser = LineParser::new();
        let catalog = fallback_catalog();
        let lines = MockOcrEngine::canned_lines();
        let items = process_lines(&parser, &lines, &catalog);

        let draft = pantry_draft(&items[0]).unwrap();
        assert_eq!(draft.ingredient_id, "demo-2");
        assert_eq!(draft.quantity, 2.5);
        assert_eq!(draft.storage, StorageLocation::Fridge);
        assert_eq!(draft.source, ItemSource::Receipt);
        assert_eq!(draft.notes.as_deref(), Some("Added from receipt scan"));

        // Unmatched bell peppers produce no draft
        assert!(pantry_draft(&items[1]).is_none());
    }
}
