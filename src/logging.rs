//! Logging utilities for cartoframe.
//!
//! Structured `tracing` events for the significant steps of a session:
//! loading a dataset, reprojecting a frame, rendering and saving a figure.

use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::frame::GeoFrame;

/// Initialize the tracing subscriber with the given log level.
///
/// `RUST_LOG`, when set, takes precedence over `log_level`.
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed with warnings"
        );
    }
}

/// Run `f`, logging its duration under a fresh operation id.
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let operation_id = Uuid::new_v4();

    debug!(
        operation = operation,
        operation_id = %operation_id,
        "Starting operation"
    );

    let result = f();

    info!(
        operation = operation,
        operation_id = %operation_id,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log what a freshly loaded frame contains.
pub fn log_frame_stats(source: &str, frame: &GeoFrame, elapsed: Duration) {
    let columns = frame.column_names().join(", ");
    let bounds = frame
        .total_bounds()
        .map(|rect| {
            format!(
                "[{:.3}, {:.3}, {:.3}, {:.3}]",
                rect.min().x,
                rect.min().y,
                rect.max().x,
                rect.max().y
            )
        })
        .unwrap_or_else(|| "empty".to_string());

    info!(
        operation = "data_load",
        source = source,
        rows = frame.len(),
        columns = %columns,
        crs = %frame.crs(),
        bounds = %bounds,
        duration_ms = elapsed.as_secs_f64() * 1000.0,
        "Dataset loaded successfully"
    );
}

/// Log an error with context
pub fn log_error(error: &crate::error::CartoError, context: &str) {
    error!(
        error = %error,
        context = context,
        error_type = std::any::type_name_of_val(error),
        "Error occurred"
    );
}
