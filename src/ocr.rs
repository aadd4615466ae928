//! # OCR Collaborator Boundary
//!
//! Text recognition itself lives outside this crate; the receipt pipeline
//! only sees a sequence of recognized lines with per-line confidence. This
//! module defines that boundary as an object-safe async trait plus a mock
//! engine for tests and development without a recognition backend.

use crate::errors::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One line of recognized text with its recognition confidence in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub text: String,
    pub confidence: f64,
}

/// Interface to the external text-recognition collaborator.
///
/// Engines should be Send + Sync to allow use across async tasks. Failures
/// surface as `AppError::Ocr`; the core is never invoked on failed scans.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize receipt text from captured image data
    async fn recognize(&self, image_data: &[u8]) -> AppResult<Vec<OcrLine>>;
}

/// Mock OCR engine for testing and development.
///
/// Returns a fixed six-line grocery receipt with realistic confidence
/// scores, regardless of input.
#[derive(Debug, Clone, Default)]
pub struct MockOcrEngine;

impl MockOcrEngine {
    pub fn new() -> Self {
        Self
    }

    /// The canned receipt lines this engine recognizes
    pub fn canned_lines() -> Vec<OcrLine> {
        vec![
            OcrLine {
                text: "CHICKEN BREAST 2.5 LB".to_string(),
                confidence: 0.95,
            },
            OcrLine {
                text: "BELL PEPPERS 4 UNITS".to_string(),
                confidence: 0.92,
            },
            OcrLine {
                text: "RICE WHITE 2 CUPS".to_string(),
                confidence: 0.88,
            },
            OcrLine {
                text: "OLIVE OIL 500ML".to_string(),
                confidence: 0.94,
            },
            OcrLine {
                text: "TOMATOES 6 UNITS".to_string(),
                confidence: 0.90,
            },
            OcrLine {
                text: "ONIONS 3 UNITS".to_string(),
                confidence: 0.87,
            },
        ]
    }
}

#[async_trait]
impl OcrEngine for MockOcrEngine {
    async fn recognize(&self, _image_data: &[u8]) -> AppResult<Vec<OcrLine>> {
        Ok(Self::canned_lines())
    }
}
