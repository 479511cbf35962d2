//! The end-to-end session driven by the `cartoframe` binary.
//!
//! Loads the configured dataset, derives `gdp_pp`, and writes one figure per
//! reprojection style into the output directory.

use std::path::PathBuf;
use std::time::Instant;

use geo_types::Geometry;
use tracing::info;

use crate::config::Config;
use crate::crs::Crs;
use crate::data_loader::load_dataset;
use crate::error::Result;
use crate::frame::GeoFrame;
use crate::logging::{log_operation_end, log_operation_start, log_timed_operation};
use crate::projection::Projection;
use crate::render::{parse_hex_color, Figure, MarkerStyle, PolygonStyle};

/// Web Mercator spelled out the way plotting libraries usually print it. The
/// null grid keeps WGS84 longitude/latitude as they are on the sphere.
const WEB_MERCATOR_PROJ: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 \
                                 +y_0=0 +k=1 +units=m +nadgrids=@null +wktext +no_defs";

/// What a session produced.
#[derive(Debug, Clone)]
pub struct WalkthroughReport {
    pub rows: usize,
    pub figures: Vec<PathBuf>,
    /// Largest coordinate difference between the EPSG:3857 and PROJ string
    /// reprojections
    pub epsg_vs_proj_max_diff: f64,
}

/// Run every step of the session with `config`.
pub fn run(config: &Config) -> Result<WalkthroughReport> {
    let start = Instant::now();
    log_operation_start("walkthrough", Some(&config.dataset));

    let choropleth = choropleth_style(config)?;
    let (width, height) = (config.output.width, config.output.height);
    let mut figures = Vec::new();

    let mut world = load_dataset(&config.dataset)?;
    world.add_gdp_per_capita()?;

    // Native CRS choropleth
    let mut fig = Figure::new(width, height, None)?;
    fig.axes_mut(0)?.add_frame(&world, &choropleth)?;
    figures.push(save(&fig, config, "01_gdp_pp.png")?);

    // Projection object -> PROJ string -> CRS; drawn as plain coordinates on
    // the left and by an axes carrying the projection on the right
    let aeqd = Projection::azimuthal_equidistant();
    let aeqd_crs = Crs::from_proj_str(&aeqd.proj4_init()?)?;
    let world_aeqd = log_timed_operation("to_crs_aeqd", || world.to_crs(&aeqd_crs))?;
    let mut fig = Figure::subplots(width, height, vec![None, Some(aeqd.crs()?)])?;
    fig.axes_mut(0)?.add_frame(&world_aeqd, &choropleth)?;
    fig.axes_mut(1)?.add_frame(&world, &choropleth)?;
    figures.push(save(&fig, config, "02_aeqd.png")?);

    // EPSG code and the equivalent PROJ string
    let by_code = log_timed_operation("to_crs_epsg", || -> Result<GeoFrame> {
        world.to_crs(&Crs::from_epsg(3857)?)
    })?;
    let by_string = log_timed_operation("to_crs_proj", || -> Result<GeoFrame> {
        world.to_crs(&Crs::from_proj_str(WEB_MERCATOR_PROJ)?)
    })?;
    let epsg_vs_proj_max_diff = max_coordinate_diff(by_code.geometries(), by_string.geometries());
    info!(
        max_diff = epsg_vs_proj_max_diff,
        "EPSG:3857 and PROJ string reprojections compared"
    );
    let mut fig = Figure::subplots(width, height, vec![None, None])?;
    fig.axes_mut(0)?.add_frame(&by_code, &choropleth)?;
    fig.axes_mut(1)?.add_frame(&by_string, &choropleth)?;
    figures.push(save(&fig, config, "03_mercator.png")?);

    // One geometry at a time, then re-paired with the attribute rows
    let projection = config.projection()?;
    let world_projected = log_timed_operation("project_geometries", || -> Result<GeoFrame> {
        let geometries = world
            .geometries()
            .iter()
            .map(|geometry| projection.project_geometry(geometry, world.crs()))
            .collect::<Result<Vec<_>>>()?;
        world.select(&["gdp_pp"])?.with_geometries(geometries, projection.crs()?)
    })?;
    let mut fig = Figure::new(width, height, None)?;
    fig.axes_mut(0)?.add_frame(&world_projected, &choropleth)?;
    figures.push(save(&fig, config, "04_per_geometry.png")?);

    // Centroids drawn above the polygons
    let centroids = world.centroids();
    let markers = MarkerStyle {
        color: parse_hex_color(&config.render.centroid_color)?,
        radius: config.render.marker_radius,
        zorder: choropleth.zorder + 1,
    };
    let mut fig = Figure::new(width, height, None)?;
    let axes = fig.axes_mut(0)?;
    axes.add_frame(&world, &choropleth)?;
    axes.add_points(&centroids, &markers)?;
    figures.push(save(&fig, config, "05_centroids.png")?);

    log_operation_end("walkthrough", start, true);
    Ok(WalkthroughReport {
        rows: world.len(),
        figures,
        epsg_vs_proj_max_diff,
    })
}

fn choropleth_style(config: &Config) -> Result<PolygonStyle> {
    Ok(PolygonStyle {
        edge_color: Some(parse_hex_color(&config.render.edge_color)?),
        missing_color: parse_hex_color(&config.render.missing_color)?,
        ..PolygonStyle::choropleth("gdp_pp", config.render.colormap.clone())
    })
}

fn save(fig: &Figure, config: &Config, name: &str) -> Result<PathBuf> {
    let path = config.output.dir.join(name);
    fig.save(&path)?;
    Ok(path)
}

/// Largest absolute difference between matching finite coordinates.
///
/// Coordinates that are non-finite in both inputs are treated as equal; a
/// coordinate that is finite in only one counts as an infinite difference.
pub fn max_coordinate_diff(a: &[Geometry<f64>], b: &[Geometry<f64>]) -> f64 {
    use geo::CoordsIter;

    if a.len() != b.len() {
        return f64::INFINITY;
    }
    let mut max_diff: f64 = 0.0;
    for (ga, gb) in a.iter().zip(b) {
        if ga.coords_count() != gb.coords_count() {
            return f64::INFINITY;
        }
        for (ca, cb) in ga.coords_iter().zip(gb.coords_iter()) {
            for (va, vb) in [(ca.x, cb.x), (ca.y, cb.y)] {
                let diff = match (va.is_finite(), vb.is_finite()) {
                    (true, true) => (va - vb).abs(),
                    (false, false) => 0.0,
                    _ => f64::INFINITY,
                };
                max_diff = max_diff.max(diff);
            }
        }
    }
    max_diff
}
