//! Test data generators.
//!
//! Small vector datasets and config files written into temporary directories.

use std::path::{Path, PathBuf};

/// Three rows: two countries and one with zero population.
pub const SMALL_WORLD: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature",
     "properties": {"name": "Westland", "pop_est": 1000000, "gdp_md_est": 50000.0},
     "geometry": {"type": "Polygon",
                  "coordinates": [[[-20, 10], [-5, 10], [-5, 30], [-20, 30], [-20, 10]]]}},
    {"type": "Feature",
     "properties": {"name": "Eastland", "pop_est": 4000000, "gdp_md_est": 20000.0},
     "geometry": {"type": "MultiPolygon",
                  "coordinates": [[[[10, -10], [30, -10], [30, 5], [10, 5], [10, -10]]],
                                  [[[35, 0], [40, 0], [40, 4], [35, 0]]]]}},
    {"type": "Feature",
     "properties": {"name": "Emptyland", "pop_est": 0, "gdp_md_est": 10.0},
     "geometry": {"type": "Polygon",
                  "coordinates": [[[100, -40], [110, -40], [110, -30], [100, -40]]]}}
  ]
}"#;

/// Write [`SMALL_WORLD`] into `dir` and return its path.
pub fn write_small_world(dir: &Path) -> PathBuf {
    let path = dir.join("small_world.geojson");
    std::fs::write(&path, SMALL_WORLD).unwrap();
    path
}

/// Write a JSON config pointing at `dataset` and `output_dir`.
pub fn write_config(dir: &Path, dataset: &Path, output_dir: &Path) -> PathBuf {
    let path = dir.join("cartoframe.json");
    let config = serde_json::json!({
        "dataset": dataset,
        "output": {"dir": output_dir, "width": 400, "height": 200},
        "render": {"colormap": "plasma", "marker_radius": 2.0},
        "log_level": "debug"
    });
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}
