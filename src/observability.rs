//! # Observability
//!
//! Tracing setup and metrics recording for the core operations. Metrics go
//! through the `metrics` facade; installing a recorder/exporter is the
//! embedding service's concern.

use crate::errors::{AppError, AppResult};

/// Initialize structured logging with tracing.
///
/// Uses the `RUST_LOG` environment filter with an `info` default for this
/// crate. `LOG_FORMAT=pretty` selects human-readable output; anything else
/// logs JSON.
pub fn init_tracing() -> AppResult<()> {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(
            "kitchen_wise=info"
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid log directive: {}", e)))?,
        )
        .add_directive(
            "sqlx=warn"
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid log directive: {}", e)))?,
        );

    if std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()) == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()
            .map_err(|e| AppError::Internal(format!("Failed to initialize tracing: {}", e)))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()
            .map_err(|e| AppError::Internal(format!("Failed to initialize tracing: {}", e)))?;
    }

    tracing::info!("Tracing initialized");
    Ok(())
}

/// Record line parsing metrics
pub fn record_line_parse_metrics(
    duration: std::time::Duration,
    found_quantity: bool,
    found_unit: bool,
) {
    metrics::counter!("line_parse_total").increment(1);
    if found_quantity {
        metrics::counter!("line_parse_quantity_detected_total").increment(1);
    }
    if found_unit {
        metrics::counter!("line_parse_unit_detected_total").increment(1);
    }
    metrics::histogram!("line_parse_duration_seconds").record(duration.as_secs_f64());
}

/// Record ingredient matching metrics
pub fn record_ingredient_match_metrics(duration: std::time::Duration, matched: bool) {
    metrics::counter!("ingredient_match_total", "result" => if matched { "matched" } else { "unmatched" })
        .increment(1);
    metrics::histogram!("ingredient_match_duration_seconds").record(duration.as_secs_f64());
}

/// Record recipe availability evaluation metrics
pub fn record_availability_metrics(duration: std::time::Duration, can_make: bool) {
    metrics::counter!("recipe_evaluation_total", "result" => if can_make { "can_make" } else { "missing" })
        .increment(1);
    metrics::histogram!("recipe_evaluation_duration_seconds").record(duration.as_secs_f64());
}
