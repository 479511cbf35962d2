//! Map rendering into raster images.
//!
//! This module provides colormaps, pixel-level drawing primitives and the
//! [`Figure`]/[`Axes`] model used to draw frames side by side.

pub mod colormap;
pub mod figure;
pub mod raster;

pub use colormap::{get_colormap, parse_hex_color, Colormap};
pub use figure::{Axes, Figure, Fill, MarkerStyle, PolygonStyle};
