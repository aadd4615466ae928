//! # Receipt Line Parsing
//!
//! This module converts one raw OCR text line into a structured candidate
//! (name, quantity, unit, optional size descriptor).
//!
//! ## Features
//!
//! - Single left-to-right token scan with first-match-wins classification
//!   per token (numeric, then unit keyword, then size keyword, then name)
//! - Defaults instead of errors: a line with no recognizable quantity or
//!   unit parses to quantity 1 and unit "unit" with the whole line as name
//! - Unit and size keyword sets loadable from a JSON config file, with the
//!   built-in receipt vocabulary as fallback
//!
//! Tokens are classified independently; there is no lookahead or
//! backtracking, and a token consumed as quantity, unit, or size is never
//! reconsidered as part of the name. When several numeric tokens appear,
//! the last one wins and earlier ones are discarded.

use crate::errors::{AppError, AppResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use tracing::{debug, info, trace, warn};

lazy_static! {
    /// Optional-decimal non-negative number, ASCII digits only
    static ref NUMERIC_TOKEN: Regex =
        Regex::new(r"^\d+(\.\d+)?$").expect("Numeric token pattern should be valid");
}

/// A structured candidate parsed from one receipt line.
///
/// Derived, ephemeral data; created per OCR line and not persisted by the
/// core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLine {
    /// Free-text item name (space-joined residue tokens, trimmed)
    pub name: String,
    /// Parsed quantity, 1.0 when no numeric token was present
    pub quantity: f64,
    /// Normalized unit token, "unit" when no unit keyword was present
    pub unit: String,
    /// Size descriptor (e.g. "LARGE"), when present
    pub size_text: Option<String>,
}

/// Configuration options for line parsing
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum length for parsed item names (truncated at a word boundary
    /// if longer)
    pub max_name_length: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_name_length: 100,
        }
    }
}

impl ParserConfig {
    /// Validate parser configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.max_name_length == 0 {
            return Err(AppError::Config(
                "max_name_length must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Keyword vocabulary loaded from JSON
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeywordConfig {
    /// Recognized unit tokens, matched case-insensitively
    pub unit_keywords: Vec<String>,
    /// Alias normalization applied after a unit keyword matches
    /// (e.g. "lbs" -> "lb")
    pub unit_aliases: HashMap<String, String>,
    /// Recognized size tokens, matched case-insensitively
    pub size_keywords: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            unit_keywords: [
                "LB", "LBS", "KG", "G", "ML", "L", "CUP", "CUPS", "UNIT", "UNITS",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            unit_aliases: HashMap::from([
                ("lbs".to_string(), "lb".to_string()),
                ("units".to_string(), "unit".to_string()),
            ]),
            size_keywords: ["SMALL", "MEDIUM", "LARGE", "XL"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl KeywordConfig {
    /// Validate keyword configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.unit_keywords.is_empty() {
            return Err(AppError::Config(
                "unit_keywords cannot be empty".to_string(),
            ));
        }
        if self.size_keywords.is_empty() {
            return Err(AppError::Config(
                "size_keywords cannot be empty".to_string(),
            ));
        }

        let validate_tokens = |tokens: &[String], category: &str| -> AppResult<()> {
            for (i, token) in tokens.iter().enumerate() {
                if token.trim().is_empty() {
                    return Err(AppError::Config(format!(
                        "{}[{}] cannot be empty",
                        category, i
                    )));
                }
                if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
                    return Err(AppError::Config(format!(
                        "{}[{}] '{}' must be a single token",
                        category, i, token
                    )));
                }
            }
            Ok(())
        };

        validate_tokens(&self.unit_keywords, "unit_keywords")?;
        validate_tokens(&self.size_keywords, "size_keywords")?;
        Ok(())
    }
}

/// Load the keyword vocabulary from a JSON file.
///
/// Tries `KEYWORDS_CONFIG_PATH` first, then conventional locations. Falls
/// back to the built-in receipt vocabulary when no file is found.
pub fn load_keyword_config() -> KeywordConfig {
    if let Ok(config_path) = std::env::var("KEYWORDS_CONFIG_PATH") {
        info!(
            "Loading keyword config from environment variable: {}",
            config_path
        );
        match fs::read_to_string(&config_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!("Successfully loaded keyword config from: {}", config_path);
                    return config;
                }
                Err(e) => {
                    warn!(
                        "Failed to parse keyword config from '{}': {}. Falling back to default paths.",
                        config_path, e
                    );
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read keyword config from '{}': {}. Falling back to default paths.",
                    config_path, e
                );
            }
        }
    }

    let possible_paths = [
        "/app/config/keywords.json", // Docker path
        "config/keywords.json",      // Local development path
        "../config/keywords.json",   // Test path
    ];

    for config_path in &possible_paths {
        match fs::read_to_string(config_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(
                        "Successfully loaded keyword config from fallback path: {}",
                        config_path
                    );
                    return config;
                }
                Err(e) => {
                    warn!(
                        "Failed to parse keyword config at '{}': {}. Trying next path.",
                        config_path, e
                    );
                    continue;
                }
            },
            Err(_) => continue, // Try next path
        }
    }

    debug!("No keyword config file found, using built-in vocabulary");
    KeywordConfig::default()
}

/// Receipt line parser holding the keyword vocabulary and parse options
pub struct LineParser {
    units: HashSet<String>,
    aliases: HashMap<String, String>,
    sizes: HashSet<String>,
    config: ParserConfig,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    /// Create a parser with the built-in keyword vocabulary and default
    /// options
    pub fn new() -> Self {
        Self::from_keywords(KeywordConfig::default(), ParserConfig::default())
            .expect("Built-in keyword vocabulary should be valid")
    }

    /// Create a parser from an explicit keyword vocabulary and options
    pub fn from_keywords(keywords: KeywordConfig, config: ParserConfig) -> AppResult<Self> {
        keywords.validate()?;
        config.validate()?;

        Ok(Self {
            units: keywords
                .unit_keywords
                .iter()
                .map(|u| u.to_uppercase())
                .collect(),
            aliases: keywords
                .unit_aliases
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
                .collect(),
            sizes: keywords
                .size_keywords
                .iter()
                .map(|s| s.to_uppercase())
                .collect(),
            config,
        })
    }

    /// Create a parser from the keyword config file on disk
    pub fn from_config_file(config: ParserConfig) -> AppResult<Self> {
        Self::from_keywords(load_keyword_config(), config)
    }

    /// Parse one raw receipt line into a structured candidate.
    ///
    /// Total function: any input produces a `ParsedLine`. Absence of data
    /// defaults rather than errors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kitchen_wise::line_parser::LineParser;
    ///
    /// let parser = LineParser::new();
    /// let parsed = parser.parse("CHICKEN BREAST 2.5 LB");
    /// assert_eq!(parsed.name, "CHICKEN BREAST");
    /// assert_eq!(parsed.quantity, 2.5);
    /// assert_eq!(parsed.unit, "lb");
    /// ```
    pub fn parse(&self, raw: &str) -> ParsedLine {
        let start_time = std::time::Instant::now();

        let mut name_tokens: Vec<&str> = Vec::new();
        let mut quantity = 1.0_f64;
        let mut unit = "unit".to_string();
        let mut size_text: Option<String> = None;
        let mut saw_quantity = false;
        let mut saw_unit = false;

        for token in raw.split_whitespace() {
            let upper = token.to_uppercase();

            if NUMERIC_TOKEN.is_match(&upper) {
                // Last numeric token wins; earlier ones are discarded
                if let Ok(value) = upper.parse::<f64>() {
                    quantity = value;
                    saw_quantity = true;
                    continue;
                }
            }

            if self.units.contains(&upper) {
                let lowered = upper.to_lowercase();
                unit = self
                    .aliases
                    .get(&lowered)
                    .cloned()
                    .unwrap_or(lowered);
                saw_unit = true;
                continue;
            }

            if self.sizes.contains(&upper) {
                size_text = Some(upper);
                continue;
            }

            name_tokens.push(token);
        }

        let name = self.truncate_name(name_tokens.join(" ").trim().to_string());

        trace!(
            raw = %raw,
            name = %name,
            quantity = %quantity,
            unit = %unit,
            "Parsed receipt line"
        );

        crate::observability::record_line_parse_metrics(
            start_time.elapsed(),
            saw_quantity,
            saw_unit,
        );

        ParsedLine {
            name,
            quantity,
            unit,
            size_text,
        }
    }

    fn truncate_name(&self, name: String) -> String {
        if name.len() <= self.config.max_name_length {
            return name;
        }

        // Back off to a char boundary before slicing
        let mut limit = self.config.max_name_length;
        while !name.is_char_boundary(limit) {
            limit -= 1;
        }
        let truncated = name[..limit].to_string();
        // Cut at a word boundary when there is one
        let cut = match truncated.rfind(' ') {
            Some(last_space) => truncated[..last_space].to_string(),
            None => truncated,
        };
        warn!(
            "Item name truncated due to length limit ({} > {}): '{}' -> '{}'",
            name.len(),
            self.config.max_name_length,
            name,
            cut
        );
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity_and_unit() {
        let parser = LineParser::new();
        let parsed = parser.parse("CHICKEN BREAST 2.5 LB");
        assert_eq!(parsed.name, "CHICKEN BREAST");
        assert_eq!(parsed.quantity, 2.5);
        assert_eq!(parsed.unit, "lb");
        assert_eq!(parsed.size_text, None);
    }

    #[test]
    fn test_parse_unit_alias_normalization() {
        let parser = LineParser::new();
        let parsed = parser.parse("BELL PEPPERS 4 UNITS");
        assert_eq!(parsed.name, "BELL PEPPERS");
        assert_eq!(parsed.quantity, 4.0);
        assert_eq!(parsed.unit, "unit");

        let parsed = parser.parse("GROUND BEEF 3 LBS");
        assert_eq!(parsed.unit, "lb");
    }

    #[test]
    fn test_parse_defaults_when_nothing_recognized() {
        let parser = LineParser::new();
        let parsed = parser.parse("  FRESH BASIL BUNCH  ");
        assert_eq!(parsed.name, "FRESH BASIL BUNCH");
        assert_eq!(parsed.quantity, 1.0);
        assert_eq!(parsed.unit, "unit");
        assert_eq!(parsed.size_text, None);
    }

    #[test]
    fn test_parse_size_keyword() {
        let parser = LineParser::new();
        let parsed = parser.parse("EGGS LARGE 12 UNITS");
        assert_eq!(parsed.name, "EGGS");
        assert_eq!(parsed.quantity, 12.0);
        assert_eq!(parsed.unit, "unit");
        assert_eq!(parsed.size_text, Some("LARGE".to_string()));
    }

    #[test]
    fn test_parse_last_numeric_wins() {
        let parser = LineParser::new();
        let parsed = parser.parse("2 SODA PACK 6");
        // Earlier numeric tokens are discarded, not kept as name text
        assert_eq!(parsed.name, "SODA PACK");
        assert_eq!(parsed.quantity, 6.0);
    }

    #[test]
    fn test_parse_attached_unit_stays_in_name() {
        let parser = LineParser::new();
        // "500ML" is neither numeric nor a unit token on its own
        let parsed = parser.parse("OLIVE OIL 500ML");
        assert_eq!(parsed.name, "OLIVE OIL 500ML");
        assert_eq!(parsed.quantity, 1.0);
        assert_eq!(parsed.unit, "unit");
    }

    #[test]
    fn test_parse_empty_line() {
        let parser = LineParser::new();
        let parsed = parser.parse("");
        assert_eq!(parsed.name, "");
        assert_eq!(parsed.quantity, 1.0);
        assert_eq!(parsed.unit, "unit");
    }

    #[test]
    fn test_parse_is_referentially_transparent() {
        let parser = LineParser::new();
        assert_eq!(
            parser.parse("RICE WHITE 2 CUPS"),
            parser.parse("RICE WHITE 2 CUPS")
        );
    }

    #[test]
    fn test_keyword_config_validation() {
        let mut config = KeywordConfig::default();
        assert!(config.validate().is_ok());

        config.unit_keywords = vec![];
        assert!(config.validate().is_err());
        config = KeywordConfig::default();

        config.size_keywords = vec!["".to_string()];
        assert!(config.validate().is_err());
        config = KeywordConfig::default();

        config.unit_keywords.push("two words".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parser_config_validation() {
        let config = ParserConfig {
            max_name_length: 0,
        };
        assert!(config.validate().is_err());
        assert!(ParserConfig::default().validate().is_ok());
    }

    #[test]
    fn test_name_truncation_at_word_boundary() {
        let parser = LineParser::from_keywords(
            KeywordConfig::default(),
            ParserConfig {
                max_name_length: 10,
            },
        )
        .unwrap();
        let parsed = parser.parse("EXTRA LONG PRODUCT DESCRIPTION");
        assert!(parsed.name.len() <= 10);
        assert_eq!(parsed.name, "EXTRA");
    }
}
