//! # cartoframe
//!
//! Geometry collections with attributes, reprojection between coordinate
//! reference systems, and static map figures.
//!
//! ## Key Features
//!
//! - **Vector loading**: a packaged coarse world-boundaries sample, or any
//!   GeoJSON / Shapefile on disk, read into a [`GeoFrame`]
//! - **Reprojection**: target CRS given as a PROJ string, an EPSG code or a
//!   native [`Projection`], all normalized into one [`Crs`] value
//! - **Per-geometry projection**: reproject one geometry at a time and rebuild
//!   a frame in the original row order
//! - **Figures**: choropleths, side-by-side axes and z-ordered overlays
//!   written as PNG
//!
//! ## Architecture
//!
//! - **Data Layer**: [`data_loader`] and [`frame`]
//! - **Coordinate Layer**: [`crs`] and [`projection`], transformations by PROJ
//! - **Output Layer**: [`render`], rasterizing onto `image` buffers

pub mod config;
pub mod crs;
pub mod data_loader;
pub mod error;
pub mod frame;
pub mod logging;
pub mod projection;
pub mod render;
pub mod walkthrough;

pub use config::Config;
pub use crs::{Crs, Transformer};
pub use error::{CartoError, Result};
pub use frame::{Column, GeoFrame};
pub use logging::{
    init_tracing, log_error, log_frame_stats, log_operation_end, log_operation_start,
    log_timed_operation,
};
pub use projection::Projection;
pub use render::{Figure, MarkerStyle, PolygonStyle};
