//! cartoframe - reprojection and map figures for world boundary data
//!
//! Loads the configured dataset and writes the walkthrough figures as PNG.

use tracing::{error, info};

use cartoframe::walkthrough;
use cartoframe::{init_tracing, log_error, Config, Result};

fn main() -> Result<()> {
    // Load configuration
    let config = Config::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?;

    init_tracing(&config.log_level);
    info!("Starting cartoframe v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let report = walkthrough::run(&config).map_err(|e| {
        log_error(&e, "walkthrough");
        e
    })?;

    info!(
        rows = report.rows,
        figures = report.figures.len(),
        output_dir = %config.output.dir.display(),
        "Walkthrough finished"
    );
    for path in &report.figures {
        info!("Wrote {}", path.display());
    }
    Ok(())
}
