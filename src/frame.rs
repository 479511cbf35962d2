//! Tabular geometry collections.
//!
//! A [`GeoFrame`] pairs named attribute columns with one geometry per row and
//! a single collection-level [`Crs`]. Every geometry is expressed in that CRS;
//! reprojection produces a new frame whose geometries and label change
//! together.

use geo::{BoundingRect, Centroid};
use geo_types::{Coord, Geometry, GeometryCollection, Rect};
use std::collections::BTreeMap;
use tracing::debug;

use crate::crs::{Crs, Transformer};
use crate::error::{CartoError, Result};

/// A single attribute column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric values; missing entries are NaN
    Float(Vec<f64>),
    /// Text values
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Column::Float(values) => Some(values),
            Column::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Text(values) => Some(values),
            Column::Float(_) => None,
        }
    }

    fn dtype(&self) -> &'static str {
        match self {
            Column::Float(_) => "float64",
            Column::Text(_) => "text",
        }
    }
}

/// An ordered collection of rows, each with attributes and a geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFrame {
    columns: BTreeMap<String, Column>,
    /// insertion order of column names
    order: Vec<String>,
    geometries: Vec<Geometry<f64>>,
    crs: Crs,
}

impl GeoFrame {
    /// Create a frame with geometries only.
    pub fn new(geometries: Vec<Geometry<f64>>, crs: Crs) -> Self {
        GeoFrame {
            columns: BTreeMap::new(),
            order: Vec::new(),
            geometries,
            crs,
        }
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.order
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| CartoError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// A numeric column, or an error if it is missing or textual.
    pub fn float_column(&self, name: &str) -> Result<&[f64]> {
        self.column(name)?
            .as_float()
            .ok_or_else(|| CartoError::InvalidParameter {
                param: name.to_string(),
                message: "column is not numeric".to_string(),
            })
    }

    /// Add or replace a column. Its length must match the row count.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.insert_column(name, column)?;
        Ok(self)
    }

    /// Add or replace a column in place.
    pub fn insert_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if column.len() != self.len() {
            return Err(CartoError::LengthMismatch {
                expected: self.len(),
                actual: column.len(),
            });
        }
        if !self.columns.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Relabel the CRS without touching coordinates.
    pub fn set_crs(mut self, crs: Crs) -> Self {
        self.crs = crs;
        self
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        let mut out = GeoFrame::new(self.geometries.clone(), self.crs.clone());
        for &name in names {
            out.insert_column(name, self.column(name)?.clone())?;
        }
        Ok(out)
    }

    /// Elementwise `numerator / denominator` stored as `output`.
    ///
    /// Zero or missing denominators produce non-finite values; they are left
    /// for the renderer to handle.
    pub fn divide_columns(&mut self, numerator: &str, denominator: &str, output: &str) -> Result<()> {
        let ratio: Vec<f64> = self
            .float_column(numerator)?
            .iter()
            .zip(self.float_column(denominator)?)
            .map(|(n, d)| n / d)
            .collect();
        let non_finite = ratio.iter().filter(|v| !v.is_finite()).count();
        debug!(
            numerator = numerator,
            denominator = denominator,
            output = output,
            non_finite = non_finite,
            "Computed derived column"
        );
        self.insert_column(output, Column::Float(ratio))
    }

    /// Add `gdp_pp = gdp_md_est / pop_est`.
    pub fn add_gdp_per_capita(&mut self) -> Result<()> {
        self.divide_columns("gdp_md_est", "pop_est", "gdp_pp")
    }

    /// A new frame with every geometry transformed into `target`.
    ///
    /// Attributes are carried over unchanged and the CRS label is updated with
    /// the geometries. `self` is not modified. Points the target cannot
    /// represent become NaN; only building the PROJ operation can fail.
    pub fn to_crs(&self, target: &Crs) -> Result<GeoFrame> {
        let transformer = Transformer::new(&self.crs, target)?;
        let geometries = self
            .geometries
            .iter()
            .map(|g| transformer.transform_geometry(g))
            .collect();
        Ok(GeoFrame {
            columns: self.columns.clone(),
            order: self.order.clone(),
            geometries,
            crs: target.clone(),
        })
    }

    /// Rebuild the frame around new geometries, pairing row `i`'s attributes
    /// with `geometries[i]`.
    pub fn with_geometries(&self, geometries: Vec<Geometry<f64>>, crs: Crs) -> Result<Self> {
        if geometries.len() != self.len() {
            return Err(CartoError::LengthMismatch {
                expected: self.len(),
                actual: geometries.len(),
            });
        }
        Ok(GeoFrame {
            columns: self.columns.clone(),
            order: self.order.clone(),
            geometries,
            crs,
        })
    }

    /// One centroid per row; empty geometries yield an empty collection so the
    /// row count never changes.
    pub fn centroids(&self) -> GeoFrame {
        let geometries = self
            .geometries
            .iter()
            .map(|g| match g.centroid() {
                Some(point) => Geometry::Point(point),
                None => Geometry::GeometryCollection(GeometryCollection::default()),
            })
            .collect();
        GeoFrame {
            columns: self.columns.clone(),
            order: self.order.clone(),
            geometries,
            crs: self.crs.clone(),
        }
    }

    /// Bounding rectangle over all finite coordinates.
    pub fn total_bounds(&self) -> Option<Rect<f64>> {
        finite_bounds(&self.geometries)
    }

    /// Column names with their value types, in insertion order.
    pub fn schema(&self) -> Vec<(String, &'static str)> {
        self.order
            .iter()
            .filter_map(|name| self.columns.get(name).map(|c| (name.clone(), c.dtype())))
            .collect()
    }
}

/// Bounding rectangle over the finite coordinates of many geometries.
pub fn finite_bounds(geometries: &[Geometry<f64>]) -> Option<Rect<f64>> {
    let mut min = Coord {
        x: f64::INFINITY,
        y: f64::INFINITY,
    };
    let mut max = Coord {
        x: f64::NEG_INFINITY,
        y: f64::NEG_INFINITY,
    };
    let mut update = |c: Coord<f64>| {
        if c.x.is_finite() && c.y.is_finite() {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
    };
    for geometry in geometries {
        match geometry.bounding_rect() {
            // fast path when nothing is non-finite
            Some(rect) if rect.min().x.is_finite() && rect.max().x.is_finite()
                && rect.min().y.is_finite() && rect.max().y.is_finite() =>
            {
                update(rect.min());
                update(rect.max());
            }
            _ => {
                use geo::CoordsIter;
                geometry.coords_iter().for_each(&mut update);
            }
        }
    }
    (min.x <= max.x && min.y <= max.y).then(|| Rect::new(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{point, polygon, MultiPolygon};
    use pretty_assertions::assert_eq;

    fn square(x: f64, y: f64, size: f64) -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ])
    }

    fn sample() -> GeoFrame {
        GeoFrame::new(
            vec![square(0.0, 0.0, 2.0), square(10.0, 10.0, 4.0), square(-20.0, 5.0, 1.0)],
            Crs::wgs84(),
        )
        .with_column(
            "name",
            Column::Text(vec![Some("A".into()), Some("B".into()), None]),
        )
        .unwrap()
        .with_column("pop_est", Column::Float(vec![10.0, 0.0, 4.0]))
        .unwrap()
        .with_column("gdp_md_est", Column::Float(vec![50.0, 3.0, f64::NAN]))
        .unwrap()
    }

    #[test]
    fn test_gdp_per_capita() {
        let mut frame = sample();
        assert!(!frame.has_column("gdp_pp"));
        frame.add_gdp_per_capita().unwrap();
        let gdp_pp = frame.float_column("gdp_pp").unwrap();
        assert_eq!(gdp_pp.len(), frame.len());
        assert_eq!(gdp_pp[0], 5.0);
        assert!(gdp_pp[1].is_infinite());
        assert!(gdp_pp[2].is_nan());
        assert_eq!(
            frame.column_names(),
            &["name", "pop_est", "gdp_md_est", "gdp_pp"]
        );
    }

    #[test]
    fn test_divide_missing_or_text_column() {
        let mut frame = sample();
        assert!(matches!(
            frame.divide_columns("nope", "pop_est", "x"),
            Err(CartoError::ColumnNotFound { .. })
        ));
        assert!(frame.divide_columns("name", "pop_est", "x").is_err());
    }

    #[test]
    fn test_with_column_checks_length() {
        let frame = sample();
        let result = frame.with_column("short", Column::Float(vec![1.0]));
        assert!(matches!(
            result,
            Err(CartoError::LengthMismatch {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_to_crs_round_trip() {
        let frame = sample();
        let merc = frame.to_crs(&Crs::from_epsg(3857).unwrap()).unwrap();
        assert_eq!(merc.crs().epsg(), Some(3857));
        assert_eq!(frame.crs().epsg(), Some(4326));
        let back = merc.to_crs(&Crs::wgs84()).unwrap();
        for (a, b) in frame.geometries().iter().zip(back.geometries()) {
            use geo::CoordsIter;
            for (ca, cb) in a.coords_iter().zip(b.coords_iter()) {
                assert!((ca.x - cb.x).abs() < 1e-7 && (ca.y - cb.y).abs() < 1e-7);
            }
        }
        assert_eq!(back.column("name").unwrap(), frame.column("name").unwrap());
    }

    #[test]
    fn test_with_geometries_preserves_row_pairing() {
        let frame = sample();
        let reversed: Vec<_> = frame.geometries().iter().rev().cloned().collect();
        let rebuilt = frame.with_geometries(reversed.clone(), Crs::wgs84()).unwrap();
        assert_eq!(rebuilt.geometries(), reversed.as_slice());
        assert_eq!(rebuilt.column("name").unwrap(), frame.column("name").unwrap());

        let err = frame.with_geometries(reversed[..2].to_vec(), Crs::wgs84());
        assert!(matches!(err, Err(CartoError::LengthMismatch { .. })));
    }

    #[test]
    fn test_centroids() {
        let frame = GeoFrame::new(
            vec![
                square(0.0, 0.0, 2.0),
                Geometry::MultiPolygon(MultiPolygon(vec![])),
                point!(x: 3.0, y: 4.0).into(),
            ],
            Crs::wgs84(),
        );
        let centroids = frame.centroids();
        assert_eq!(centroids.len(), frame.len());
        assert_eq!(centroids.geometries()[0], Geometry::Point(point!(x: 1.0, y: 1.0)));
        assert!(matches!(
            centroids.geometries()[1],
            Geometry::GeometryCollection(_)
        ));
        assert_eq!(centroids.geometries()[2], Geometry::Point(point!(x: 3.0, y: 4.0)));
    }

    #[test]
    fn test_total_bounds_skips_non_finite() {
        let frame = GeoFrame::new(
            vec![
                square(0.0, 0.0, 2.0),
                point!(x: f64::NAN, y: 1.0).into(),
                point!(x: 5.0, y: -1.0).into(),
            ],
            Crs::wgs84(),
        );
        let bounds = frame.total_bounds().unwrap();
        assert_eq!(bounds.min(), Coord { x: 0.0, y: -1.0 });
        assert_eq!(bounds.max(), Coord { x: 5.0, y: 2.0 });
        assert!(GeoFrame::new(vec![], Crs::wgs84()).total_bounds().is_none());
    }

    #[test]
    fn test_select() {
        let frame = sample();
        let subset = frame.select(&["pop_est"]).unwrap();
        assert_eq!(subset.column_names(), &["pop_est"]);
        assert_eq!(subset.len(), 3);
        assert!(frame.select(&["missing"]).is_err());
        assert_eq!(
            subset.schema(),
            vec![("pop_est".to_string(), "float64")]
        );
    }
}
