//! Figures made of side-by-side map axes.
//!
//! A [`Figure`] is a row of [`Axes`]. Each axes may carry a projection, fixed
//! when the figure is built; layers added in another CRS are transformed into
//! it on the way in. An axes without a projection plots layer coordinates as
//! they are. Layers draw in ascending `zorder`, ties in insertion order.

use std::path::Path;

use geo_types::{Coord, Geometry, LineString, Polygon, Rect};
use image::{Rgba, RgbaImage};
use tracing::{debug, info};

use super::colormap::get_colormap;
use super::raster::{fill_circle, fill_polygon, stroke_polyline, PixelPoint};
use crate::crs::{Crs, Transformer};
use crate::error::{CartoError, Result};
use crate::frame::{finite_bounds, GeoFrame};

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const FRAME_COLOR: [u8; 4] = [96, 96, 96, 255];
/// Fraction of the data extent added on every side.
const EXTENT_PADDING: f64 = 0.03;
/// Pixels kept clear around each axes.
const AXES_MARGIN: u32 = 10;

/// How polygons are filled.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    /// No fill, outlines only
    None,
    /// One colour for every row
    Solid([u8; 4]),
    /// Colour each row by a float column through a named colormap
    Choropleth { column: String, colormap: String },
}

/// Style for polygon and line layers.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonStyle {
    pub fill: Fill,
    pub edge_color: Option<[u8; 4]>,
    pub edge_width: f64,
    /// Fill for rows whose choropleth value is not finite
    pub missing_color: [u8; 4],
    pub zorder: i32,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            fill: Fill::Solid([31, 119, 180, 255]),
            edge_color: Some([255, 255, 255, 255]),
            edge_width: 0.5,
            missing_color: [211, 211, 211, 255],
            zorder: 1,
        }
    }
}

impl PolygonStyle {
    pub fn choropleth(column: impl Into<String>, colormap: impl Into<String>) -> Self {
        Self {
            fill: Fill::Choropleth {
                column: column.into(),
                colormap: colormap.into(),
            },
            ..Self::default()
        }
    }
}

/// Style for point markers.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub color: [u8; 4],
    pub radius: f64,
    pub zorder: i32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: [255, 0, 0, 255],
            radius: 3.0,
            zorder: 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mark {
    /// Polygons filled with the row colour, lines stroked with it
    Shape {
        edge_color: Option<[u8; 4]>,
        edge_width: f64,
    },
    Marker { radius: f64 },
}

/// Geometries already in the axes' coordinates, with one colour per row.
#[derive(Debug, Clone)]
struct Layer {
    geometries: Vec<Geometry<f64>>,
    colors: Vec<Option<[u8; 4]>>,
    mark: Mark,
    zorder: i32,
}

/// One map panel.
#[derive(Debug, Clone)]
pub struct Axes {
    projection: Option<Crs>,
    layers: Vec<Layer>,
}

impl Axes {
    fn new(projection: Option<Crs>) -> Self {
        Self {
            projection,
            layers: Vec::new(),
        }
    }

    /// The CRS this axes draws in, if any.
    pub fn projection(&self) -> Option<&Crs> {
        self.projection.as_ref()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Data extent of all layers, padded, before fitting to the panel.
    pub fn extent(&self) -> Option<Rect<f64>> {
        let mut bounds: Option<Rect<f64>> = None;
        for layer in &self.layers {
            if let Some(rect) = finite_bounds(&layer.geometries) {
                bounds = Some(match bounds {
                    Some(b) => Rect::new(
                        Coord {
                            x: b.min().x.min(rect.min().x),
                            y: b.min().y.min(rect.min().y),
                        },
                        Coord {
                            x: b.max().x.max(rect.max().x),
                            y: b.max().y.max(rect.max().y),
                        },
                    ),
                    None => rect,
                });
            }
        }
        bounds.map(|b| {
            let pad_x = b.width().max(1e-9) * EXTENT_PADDING;
            let pad_y = b.height().max(1e-9) * EXTENT_PADDING;
            Rect::new(
                Coord {
                    x: b.min().x - pad_x,
                    y: b.min().y - pad_y,
                },
                Coord {
                    x: b.max().x + pad_x,
                    y: b.max().y + pad_y,
                },
            )
        })
    }

    /// Move geometries from `crs` into this axes' projection.
    fn adopt(&self, geometries: &[Geometry<f64>], crs: &Crs) -> Result<Vec<Geometry<f64>>> {
        match &self.projection {
            Some(target) if target != crs => {
                debug!("Transforming layer from {} to {}", crs, target);
                let transformer = Transformer::new(crs, target)?;
                Ok(geometries
                    .iter()
                    .map(|g| transformer.transform_geometry(g))
                    .collect())
            }
            _ => Ok(geometries.to_vec()),
        }
    }

    /// Draw a frame's geometries, filled solid or by one of its float columns.
    pub fn add_frame(&mut self, frame: &GeoFrame, style: &PolygonStyle) -> Result<()> {
        let colors = match &style.fill {
            Fill::None => vec![None; frame.len()],
            Fill::Solid(color) => vec![Some(*color); frame.len()],
            Fill::Choropleth { column, colormap } => {
                let values = frame.float_column(column)?;
                let colormap = get_colormap(colormap)?;
                let (min, max) = finite_range(values);
                debug!(
                    "Choropleth of {} with {} over [{}, {}]",
                    column,
                    colormap.name(),
                    min,
                    max
                );
                values
                    .iter()
                    .map(|&v| {
                        Some(if v.is_finite() {
                            colormap.map(v, min, max)
                        } else {
                            style.missing_color
                        })
                    })
                    .collect()
            }
        };
        self.push_shapes(frame.geometries(), frame.crs(), colors, style)
    }

    /// Draw bare geometries in `crs` with a solid fill or outlines only.
    pub fn add_geometries(
        &mut self,
        geometries: &[Geometry<f64>],
        crs: &Crs,
        style: &PolygonStyle,
    ) -> Result<()> {
        let color = match &style.fill {
            Fill::None => None,
            Fill::Solid(color) => Some(*color),
            Fill::Choropleth { .. } => {
                return Err(CartoError::Render {
                    message: "Choropleth fill needs a frame column; use add_frame".to_string(),
                })
            }
        };
        self.push_shapes(geometries, crs, vec![color; geometries.len()], style)
    }

    fn push_shapes(
        &mut self,
        geometries: &[Geometry<f64>],
        crs: &Crs,
        colors: Vec<Option<[u8; 4]>>,
        style: &PolygonStyle,
    ) -> Result<()> {
        let layer = Layer {
            geometries: self.adopt(geometries, crs)?,
            colors,
            mark: Mark::Shape {
                edge_color: style.edge_color,
                edge_width: style.edge_width,
            },
            zorder: style.zorder,
        };
        self.layers.push(layer);
        Ok(())
    }

    /// Draw the point content of a frame as circular markers.
    pub fn add_points(&mut self, frame: &GeoFrame, style: &MarkerStyle) -> Result<()> {
        let layer = Layer {
            geometries: self.adopt(frame.geometries(), frame.crs())?,
            colors: vec![Some(style.color); frame.len()],
            mark: Mark::Marker {
                radius: style.radius,
            },
            zorder: style.zorder,
        };
        self.layers.push(layer);
        Ok(())
    }

    fn render_into(&self, img: &mut RgbaImage, panel: PanelRect) {
        draw_frame(img, panel);
        let Some(extent) = self.extent() else {
            return;
        };
        let view = Viewport::fit(extent, panel);

        let mut ordered: Vec<&Layer> = self.layers.iter().collect();
        // Stable sort keeps insertion order among equal z-orders
        ordered.sort_by_key(|layer| layer.zorder);

        for layer in ordered {
            for (geometry, color) in layer.geometries.iter().zip(&layer.colors) {
                draw_geometry(img, &view, geometry, *color, layer.mark);
            }
        }
    }
}

/// A row of axes rendered into one image.
#[derive(Debug, Clone)]
pub struct Figure {
    width: u32,
    height: u32,
    axes: Vec<Axes>,
}

impl Figure {
    /// A figure with a single axes.
    pub fn new(width: u32, height: u32, projection: Option<Crs>) -> Result<Self> {
        Self::subplots(width, height, vec![projection])
    }

    /// Side-by-side axes, one per entry of `projections`.
    pub fn subplots(width: u32, height: u32, projections: Vec<Option<Crs>>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CartoError::InvalidParameter {
                param: "size".to_string(),
                message: format!("Figure size must be positive, got {}x{}", width, height),
            });
        }
        if projections.is_empty() {
            return Err(CartoError::InvalidParameter {
                param: "ncols".to_string(),
                message: "A figure needs at least one axes".to_string(),
            });
        }
        if width / projections.len() as u32 <= 2 * AXES_MARGIN || height <= 2 * AXES_MARGIN {
            return Err(CartoError::InvalidParameter {
                param: "size".to_string(),
                message: format!(
                    "{}x{} is too small for {} axes",
                    width,
                    height,
                    projections.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            axes: projections.into_iter().map(Axes::new).collect(),
        })
    }

    pub fn ncols(&self) -> usize {
        self.axes.len()
    }

    pub fn axes(&self, index: usize) -> Result<&Axes> {
        self.axes.get(index).ok_or_else(|| self.no_axes(index))
    }

    pub fn axes_mut(&mut self, index: usize) -> Result<&mut Axes> {
        let err = self.no_axes(index);
        self.axes.get_mut(index).ok_or(err)
    }

    fn no_axes(&self, index: usize) -> CartoError {
        CartoError::InvalidParameter {
            param: "axes".to_string(),
            message: format!("No axes {} in a figure with {}", index, self.axes.len()),
        }
    }

    /// Rasterize every axes into a new image.
    pub fn render(&self) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(self.width, self.height, Rgba(BACKGROUND));
        let column_width = self.width / self.axes.len() as u32;
        for (i, axes) in self.axes.iter().enumerate() {
            let panel = PanelRect {
                x: i as u32 * column_width + AXES_MARGIN,
                y: AXES_MARGIN,
                width: column_width - 2 * AXES_MARGIN,
                height: self.height - 2 * AXES_MARGIN,
            };
            axes.render_into(&mut img, panel);
        }
        img
    }

    /// Render and write a PNG, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let img = self.render();
        img.save_with_format(path, image::ImageFormat::Png)?;
        info!(
            path = %path.display(),
            width = self.width,
            height = self.height,
            axes = self.axes.len(),
            "Figure saved"
        );
        Ok(())
    }
}

/// Pixel rectangle of one axes.
#[derive(Debug, Clone, Copy)]
struct PanelRect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Maps data coordinates to pixels with equal scale on both axes.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    min_x: f64,
    max_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Viewport {
    fn fit(extent: Rect<f64>, panel: PanelRect) -> Self {
        let data_width = extent.width().max(f64::MIN_POSITIVE);
        let data_height = extent.height().max(f64::MIN_POSITIVE);
        let scale = (panel.width as f64 / data_width).min(panel.height as f64 / data_height);
        Self {
            min_x: extent.min().x,
            max_y: extent.max().y,
            scale,
            offset_x: panel.x as f64 + (panel.width as f64 - data_width * scale) / 2.0,
            offset_y: panel.y as f64 + (panel.height as f64 - data_height * scale) / 2.0,
        }
    }

    fn to_pixel(&self, coord: Coord<f64>) -> PixelPoint {
        (
            self.offset_x + (coord.x - self.min_x) * self.scale,
            self.offset_y + (self.max_y - coord.y) * self.scale,
        )
    }

    fn line(&self, line: &LineString<f64>) -> Vec<PixelPoint> {
        line.coords().map(|c| self.to_pixel(*c)).collect()
    }
}

fn finite_range(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

fn draw_frame(img: &mut RgbaImage, panel: PanelRect) {
    let (x0, y0) = (panel.x as f64, panel.y as f64);
    let (x1, y1) = (x0 + panel.width as f64, y0 + panel.height as f64);
    stroke_polyline(
        img,
        &[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)],
        FRAME_COLOR,
        1.0,
    );
}

fn draw_polygon(
    img: &mut RgbaImage,
    view: &Viewport,
    polygon: &Polygon<f64>,
    color: Option<[u8; 4]>,
    mark: Mark,
) {
    let rings: Vec<Vec<PixelPoint>> = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| view.line(ring))
        .collect();
    if let Some(color) = color {
        fill_polygon(img, &rings, color);
    }
    if let Mark::Shape {
        edge_color: Some(edge),
        edge_width,
    } = mark
    {
        for ring in &rings {
            stroke_polyline(img, ring, edge, edge_width);
        }
    }
}

fn draw_geometry(
    img: &mut RgbaImage,
    view: &Viewport,
    geometry: &Geometry<f64>,
    color: Option<[u8; 4]>,
    mark: Mark,
) {
    let point_radius = match mark {
        Mark::Marker { radius } => radius,
        Mark::Shape { edge_width, .. } => (edge_width * 2.0).max(1.5),
    };
    let line_color = match mark {
        Mark::Shape { edge_color, .. } => color.or(edge_color),
        Mark::Marker { .. } => color,
    };

    match geometry {
        Geometry::Point(point) => {
            if let Some(color) = color {
                let (x, y) = view.to_pixel(point.0);
                fill_circle(img, x, y, point_radius, color);
            }
        }
        Geometry::MultiPoint(points) => {
            for point in points {
                draw_geometry(img, view, &Geometry::Point(*point), color, mark);
            }
        }
        Geometry::Polygon(polygon) => draw_polygon(img, view, polygon, color, mark),
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons {
                draw_polygon(img, view, polygon, color, mark);
            }
        }
        Geometry::Rect(rect) => draw_polygon(img, view, &rect.to_polygon(), color, mark),
        Geometry::Triangle(triangle) => {
            draw_polygon(img, view, &triangle.to_polygon(), color, mark)
        }
        Geometry::LineString(line) => {
            if let Some(color) = line_color {
                stroke_polyline(img, &view.line(line), color, line_width(mark));
            }
        }
        Geometry::MultiLineString(lines) => {
            if let Some(color) = line_color {
                for line in lines {
                    stroke_polyline(img, &view.line(line), color, line_width(mark));
                }
            }
        }
        Geometry::Line(line) => {
            if let Some(color) = line_color {
                let points = [view.to_pixel(line.start), view.to_pixel(line.end)];
                stroke_polyline(img, &points, color, line_width(mark));
            }
        }
        Geometry::GeometryCollection(collection) => {
            for inner in collection {
                draw_geometry(img, view, inner, color, mark);
            }
        }
    }
}

fn line_width(mark: Mark) -> f64 {
    match mark {
        Mark::Shape { edge_width, .. } => edge_width.max(1.0),
        Mark::Marker { radius } => radius,
    }
}
