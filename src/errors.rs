//! # Application Error Types
//!
//! This module defines common error types used throughout the KitchenWise core.
//! It provides structured error handling for the catalog, storage, and receipt
//! processing components.
//!
//! The parsing, matching, and availability functions themselves are total and
//! never return errors; absent or malformed input degrades to documented
//! defaults instead. Errors here cover the surrounding layers: configuration,
//! catalog ingestion, storage, and the OCR collaborator.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Validation errors (catalog records, pantry input, etc.)
    Validation(String),
    /// Database operation errors
    Database(String),
    /// OCR collaborator errors
    Ocr(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            AppError::Database(msg) => write!(f, "[DATABASE] {}", msg),
            AppError::Ocr(msg) => write!(f, "[OCR] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::error;

    /// Log database operation errors with contextual information
    pub fn log_database_error(
        error: &impl std::fmt::Display,
        operation: &str,
        item_id: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            item_id = ?item_id,
            "Database operation failed"
        );
    }

    /// Log catalog ingestion errors with record context
    pub fn log_ingestion_error(
        error: &impl std::fmt::Display,
        record_id: Option<&str>,
        record_name: Option<&str>,
    ) {
        error!(
            error = %error,
            record_id = ?record_id,
            record_name = ?record_name,
            "Catalog record rejected"
        );
    }

    /// Log OCR collaborator errors with receipt context
    pub fn log_ocr_error(error: &impl std::fmt::Display, operation: &str, image_size: Option<u64>) {
        error!(
            error = %error,
            operation = %operation,
            image_size_bytes = ?image_size,
            "OCR processing failed"
        );
    }

}
