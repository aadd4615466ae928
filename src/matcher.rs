//! # Ingredient Matching
//!
//! Resolves a parsed receipt-line name against the canonical ingredient
//! catalog and attaches a canonical identity and confidence to the line.
//!
//! Matching is case-insensitive substring containment against the canonical
//! name and every synonym; the first catalog entry that matches wins. There
//! is no scoring, ranking, or edit-distance fallback. A line that matches no
//! entry stays unmatched, which is a valid end state rather than an error.

use crate::catalog::CanonicalIngredient;
use crate::line_parser::ParsedLine;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Derived confidence share for the quantity field of a line
const QUANTITY_CONFIDENCE_FACTOR: f64 = 0.9;
/// Derived confidence share for the unit field of a line
const UNIT_CONFIDENCE_FACTOR: f64 = 0.85;

/// Per-field confidence for one matched line, each in [0, 1].
///
/// Quantity and unit confidence are fixed multiplicative fractions of the
/// OCR name confidence, not independently measured. This is a known
/// approximation carried over from the recognition layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub name: f64,
    pub quantity: f64,
    pub unit: f64,
}

impl Confidence {
    /// Derive the confidence triple from an OCR name confidence score
    pub fn from_name_confidence(name_confidence: f64) -> Self {
        let clamped = name_confidence.clamp(0.0, 1.0);
        Self {
            name: clamped,
            quantity: clamped * QUANTITY_CONFIDENCE_FACTOR,
            unit: clamped * UNIT_CONFIDENCE_FACTOR,
        }
    }
}

/// One parsed and matched row extracted from a scanned receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedLineItem {
    /// The OCR text the line was parsed from
    pub raw_text: String,
    /// Structured parse result
    pub parsed: ParsedLine,
    /// Canonical ingredient identity, when a catalog entry matched
    pub canonical_id: Option<String>,
    /// Per-field confidence derived from the OCR name confidence
    pub confidence: Confidence,
}

impl MatchedLineItem {
    /// Whether the line resolved to a canonical ingredient
    pub fn is_matched(&self) -> bool {
        self.canonical_id.is_some()
    }
}

/// Find the first catalog entry whose name or any synonym contains the
/// parsed name, case-insensitively.
///
/// Catalog iteration order decides ties; short names can substring-match
/// broadly, and the first hit is kept as is.
///
/// # Examples
///
/// ```rust
/// use kitchen_wise::catalog::fallback_catalog;
/// use kitchen_wise::matcher::match_ingredient;
///
/// let catalog = fallback_catalog();
/// let hit = match_ingredient("tomato", &catalog);
/// assert_eq!(hit.map(|i| i.id.as_str()), Some("demo-1"));
/// assert!(match_ingredient("xyz123", &catalog).is_none());
/// ```
pub fn match_ingredient<'a>(
    parsed_name: &str,
    catalog: &'a [CanonicalIngredient],
) -> Option<&'a CanonicalIngredient> {
    let needle = parsed_name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let hit = catalog.iter().find(|ingredient| {
        ingredient.name.to_lowercase().contains(&needle)
            || ingredient
                .synonyms
                .iter()
                .any(|synonym| synonym.to_lowercase().contains(&needle))
    });

    match hit {
        Some(ingredient) => {
            trace!(parsed_name = %parsed_name, canonical_id = %ingredient.id, "Ingredient matched");
        }
        None => {
            debug!(parsed_name = %parsed_name, "No catalog entry matched");
        }
    }
    hit
}

/// Attach a canonical identity and confidence to one parsed line.
///
/// `name_confidence` is the OCR recognition confidence for the source line.
pub fn match_line(
    raw_text: &str,
    parsed: ParsedLine,
    name_confidence: f64,
    catalog: &[CanonicalIngredient],
) -> MatchedLineItem {
    let start_time = std::time::Instant::now();

    let canonical_id = match_ingredient(&parsed.name, catalog).map(|i| i.id.clone());

    crate::observability::record_ingredient_match_metrics(
        start_time.elapsed(),
        canonical_id.is_some(),
    );

    MatchedLineItem {
        raw_text: raw_text.to_string(),
        parsed,
        canonical_id,
        confidence: Confidence::from_name_confidence(name_confidence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fallback_catalog;
    use crate::line_parser::LineParser;

    #[test]
    fn test_match_by_name_substring() {
        let catalog = fallback_catalog();
        let hit = match_ingredient("tomato", &catalog).unwrap();
        assert_eq!(hit.id, "demo-1");
    }

    #[test]
    fn test_match_by_synonym() {
        let catalog = fallback_catalog();
        let hit = match_ingredient("spaghetti", &catalog).unwrap();
        assert_eq!(hit.id, "demo-3");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let catalog = fallback_catalog();
        let hit = match_ingredient("CHICKEN", &catalog).unwrap();
        assert_eq!(hit.id, "demo-2");
    }

    #[test]
    fn test_no_match_returns_none() {
        let catalog = fallback_catalog();
        assert!(match_ingredient("xyz123", &catalog).is_none());
        assert!(match_ingredient("", &catalog).is_none());
        assert!(match_ingredient("   ", &catalog).is_none());
    }

    #[test]
    fn test_first_hit_wins() {
        let mut catalog = fallback_catalog();
        // Give a later entry an overlapping synonym; the earlier entry
        // must still win
        catalog[3].synonyms.push("tomato paste".to_string());
        let hit = match_ingredient("tomato", &catalog).unwrap();
        assert_eq!(hit.id, "demo-1");
    }

    #[test]
    fn test_confidence_derivation() {
        let confidence = Confidence::from_name_confidence(0.95);
        assert_eq!(confidence.name, 0.95);
        assert!((confidence.quantity - 0.855).abs() < 1e-9);
        assert!((confidence.unit - 0.8075).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let confidence = Confidence::from_name_confidence(1.7);
        assert_eq!(confidence.name, 1.0);
        let confidence = Confidence::from_name_confidence(-0.2);
        assert_eq!(confidence.name, 0.0);
        assert_eq!(confidence.quantity, 0.0);
    }

    #[test]
    fn test_match_line_end_to_end() {
        let parser = LineParser::new();
        let catalog = fallback_catalog();
        let raw = "CHICKEN BREAST 2.5 LB";

        let item = match_line(raw, parser.parse(raw), 0.95, &catalog);
        assert_eq!(item.raw_text, raw);
        assert_eq!(item.canonical_id.as_deref(), Some("demo-2"));
        assert!(item.is_matched());
        assert_eq!(item.parsed.quantity, 2.5);
    }

    #[test]
    fn test_match_line_unmatched_is_valid() {
        let parser = LineParser::new();
        let catalog = fallback_catalog();
        let raw = "PAPER TOWELS 1 UNIT";

        let item = match_line(raw, parser.parse(raw), 0.9, &catalog);
        assert!(!item.is_matched());
        assert_eq!(item.parsed.name, "PAPER TOWELS");
    }
}
