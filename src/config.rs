//! Configuration management for cartoframe.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CartoError, Result};
use crate::projection::Projection;
use crate::render::colormap::{get_colormap, parse_hex_color};

/// Largest accepted figure side, in pixels.
pub const MAX_FIGURE_SIZE: u32 = 10_000;

/// Largest accepted marker radius, in pixels.
pub const MAX_MARKER_RADIUS: f64 = 100.0;

/// Command-line arguments for the walkthrough
#[derive(Parser, Debug)]
#[command(name = "cartoframe")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Packaged dataset name or path to a GeoJSON / Shapefile
    #[arg(short, long, env = "CARTOFRAME_DATASET")]
    pub dataset: Option<String>,

    /// Directory the figures are written to
    #[arg(short, long, env = "CARTOFRAME_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Figure width in pixels
    #[arg(long, env = "CARTOFRAME_WIDTH")]
    pub width: Option<u32>,

    /// Figure height in pixels
    #[arg(long, env = "CARTOFRAME_HEIGHT")]
    pub height: Option<u32>,

    /// Colormap used for choropleths
    #[arg(long, env = "CARTOFRAME_COLORMAP")]
    pub colormap: Option<String>,

    /// Projection for the per-geometry figure (e.g. albers_equal_area, epsg:3035)
    #[arg(long, env = "CARTOFRAME_PROJECTION")]
    pub projection: Option<String>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "CARTOFRAME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CARTOFRAME_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the PNG figures are written to
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Figure width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Figure height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Colormap for choropleth layers
    #[serde(default = "default_colormap")]
    pub colormap: String,

    /// Polygon outline colour, `#rrggbb[aa]`
    #[serde(default = "default_edge_color")]
    pub edge_color: String,

    /// Fill for rows whose value is missing or non-finite
    #[serde(default = "default_missing_color")]
    pub missing_color: String,

    /// Marker colour for centroid overlays
    #[serde(default = "default_centroid_color")]
    pub centroid_color: String,

    /// Marker radius in pixels
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f64,

    /// Projection name for the per-geometry figure, see [`Projection::from_name`]
    #[serde(default = "default_projection")]
    pub projection: String,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Dataset name or path
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Rendering configuration
    #[serde(default)]
    pub render: RenderConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Build the configuration from already parsed arguments
    pub fn from_args(args: Args) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(dataset) = args.dataset {
            config.dataset = dataset;
        }
        if let Some(dir) = args.output_dir {
            config.output.dir = dir;
        }
        if let Some(width) = args.width {
            config.output.width = width;
        }
        if let Some(height) = args.height {
            config.output.height = height;
        }
        if let Some(colormap) = args.colormap {
            config.render.colormap = colormap;
        }
        if let Some(projection) = args.projection {
            config.render.projection = projection;
        }
        if let Some(log_level) = args.log_level {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CartoError::Config {
            message: format!("Cannot read config file {}: {}", path.display(), e),
        })?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.dataset = other.dataset;
        self.output = other.output;
        self.render = other.render;
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.dataset.trim().is_empty() {
            return Err(CartoError::Config {
                message: "Dataset cannot be empty".to_string(),
            });
        }

        let sides = [self.output.width, self.output.height];
        if sides.iter().any(|&side| side == 0 || side > MAX_FIGURE_SIZE) {
            return Err(CartoError::Config {
                message: format!(
                    "Figure size must be within 1..={} pixels, got {}x{}",
                    MAX_FIGURE_SIZE, self.output.width, self.output.height
                ),
            });
        }

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(CartoError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        get_colormap(&self.render.colormap).map_err(|e| CartoError::Config {
            message: e.to_string(),
        })?;

        for color in [
            &self.render.edge_color,
            &self.render.missing_color,
            &self.render.centroid_color,
        ] {
            parse_hex_color(color).map_err(|e| CartoError::Config {
                message: e.to_string(),
            })?;
        }

        let radius = self.render.marker_radius;
        if !(radius > 0.0 && radius <= MAX_MARKER_RADIUS) {
            return Err(CartoError::Config {
                message: format!(
                    "Marker radius must be within (0, {}] pixels, got {}",
                    MAX_MARKER_RADIUS, radius
                ),
            });
        }

        self.projection().map_err(|e| CartoError::Config {
            message: e.to_string(),
        })?;

        Ok(())
    }

    /// The projection for the per-geometry figure, checked against PROJ.
    pub fn projection(&self) -> Result<Projection> {
        let projection = Projection::from_name(&self.render.projection)?;
        projection.crs()?;
        Ok(projection)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            output: OutputConfig::default(),
            render: RenderConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            colormap: default_colormap(),
            edge_color: default_edge_color(),
            missing_color: default_missing_color(),
            centroid_color: default_centroid_color(),
            marker_radius: default_marker_radius(),
            projection: default_projection(),
        }
    }
}

// Default value functions for serde
fn default_dataset() -> String {
    "world_lowres".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("figures")
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    500
}

fn default_colormap() -> String {
    "viridis".to_string()
}

fn default_edge_color() -> String {
    "#ffffff".to_string()
}

fn default_missing_color() -> String {
    "#d3d3d3".to_string()
}

fn default_centroid_color() -> String {
    "#ff0000".to_string()
}

fn default_marker_radius() -> f64 {
    3.0
}

fn default_projection() -> String {
    "albers_equal_area".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["cartoframe"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dataset, "world_lowres");
        assert_eq!(config.output.dir, PathBuf::from("figures"));
        assert_eq!((config.output.width, config.output.height), (1000, 500));
        assert_eq!(config.render.colormap, "viridis");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_merge() {
        let mut config1 = Config::default();
        let mut config2 = Config::default();

        config2.output.width = 640;
        config2.render.colormap = "plasma".to_string();

        config1.merge(config2);

        assert_eq!(config1.output.width, 640);
        assert_eq!(config1.render.colormap, "plasma");
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cartoframe.json");
        std::fs::write(
            &path,
            r#"{"output": {"width": 300, "height": 200}, "render": {"colormap": "magma"}}"#,
        )
        .unwrap();

        let config = Config::from_args(args(&[
            "--config",
            path.to_str().unwrap(),
            "--width",
            "800",
        ]))
        .unwrap();

        assert_eq!(config.output.width, 800);
        assert_eq!(config.output.height, 200);
        assert_eq!(config.render.colormap, "magma");
        // Sections missing from the file keep their defaults
        assert_eq!(config.dataset, "world_lowres");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::from_args(args(&["--config", "/nonexistent/cartoframe.json"]));
        assert!(matches!(result, Err(CartoError::Config { .. })));
    }

    #[test]
    fn test_config_validation() {
        // Valid config should pass
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.dataset = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.height = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.render.colormap = "jet".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.render.centroid_color = "red".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.render.marker_radius = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.width = MAX_FIGURE_SIZE + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_marker_radius_is_bounded() {
        let mut config = Config::default();
        for radius in [1e9, f64::INFINITY, f64::NAN, -1.0] {
            config.render.marker_radius = radius;
            assert!(
                matches!(config.validate(), Err(CartoError::Config { .. })),
                "radius {} accepted",
                radius
            );
        }
        config.render.marker_radius = MAX_MARKER_RADIUS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_projection_from_config() {
        let config = Config::default();
        assert_eq!(config.projection().unwrap(), Projection::albers_equal_area());

        let config = Config::from_args(args(&["--projection", "epsg:3035"])).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.projection().unwrap(), Projection::Epsg(3035));

        let config = Config::from_args(args(&["--projection", "robinson"])).unwrap();
        assert!(matches!(config.validate(), Err(CartoError::Config { .. })));

        let config = Config::from_args(args(&["--projection", "epsg:999999"])).unwrap();
        assert!(config.validate().is_err());
    }
}
