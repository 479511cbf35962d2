//! Coordinate transformation between two CRS values.

use geo::MapCoords;
use geo_types::{Coord, Geometry};
use proj::Proj;
use tracing::debug;

use super::Crs;
use crate::error::{CartoError, Result};

/// Converts coordinates from a source CRS to a target CRS through PROJ.
///
/// Axis order is normalized for display: longitude (or easting) first.
/// Coordinates PROJ cannot represent in the target (Mercator poles, points
/// outside a projection's domain) become NaN rather than failing the whole
/// transformation.
pub struct Transformer {
    source: Crs,
    target: Crs,
    /// `None` when source and target are the same definition
    proj: Option<Proj>,
}

impl Transformer {
    pub fn new(source: &Crs, target: &Crs) -> Result<Self> {
        let proj = if source == target {
            None
        } else {
            let proj = Proj::new_known_crs(source.definition(), target.definition(), None)
                .map_err(|e| CartoError::Projection {
                    message: format!("no operation from {} to {}: {}", source, target, e),
                })?;
            debug!("Created transformation {} -> {}", source, target);
            Some(proj)
        };
        Ok(Transformer {
            source: source.clone(),
            target: target.clone(),
            proj,
        })
    }

    pub fn source(&self) -> &Crs {
        &self.source
    }

    pub fn target(&self) -> &Crs {
        &self.target
    }

    /// True when source and target share a definition.
    pub fn is_identity(&self) -> bool {
        self.proj.is_none()
    }

    pub fn transform_coord(&self, coord: Coord<f64>) -> Coord<f64> {
        let Some(proj) = &self.proj else {
            return coord;
        };
        match proj.convert((coord.x, coord.y)) {
            Ok((x, y)) => Coord { x, y },
            Err(_) => Coord {
                x: f64::NAN,
                y: f64::NAN,
            },
        }
    }

    pub fn transform_geometry(&self, geometry: &Geometry<f64>) -> Geometry<f64> {
        if self.is_identity() {
            return geometry.clone();
        }
        geometry.map_coords(|coord| self.transform_coord(coord))
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish()
    }
}
