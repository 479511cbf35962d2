//! Native cartographic projection objects.
//!
//! These play the role of a plotting library's projection classes: each one
//! knows its own parameters, exposes an equivalent PROJ4 string through
//! [`Projection::proj4_init`], and can reproject a single geometry at a time.
//! The PROJ4 string (or the EPSG code for [`Projection::Epsg`]) is the only
//! bridge between these objects and [`Crs`].

use geo_types::Geometry;

use crate::crs::{Crs, Transformer};
use crate::error::{CartoError, Result};

/// Degrees-to-meters factor on the WGS84 equator, used to make Plate Carree
/// emit degrees.
const WGS84_DEGREE_METERS: f64 = 6_378_137.0 * std::f64::consts::PI / 180.0;

/// A cartographic projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Geodetic longitude/latitude on WGS84
    Geodetic,
    /// Equirectangular projection with degree units
    PlateCarree { central_longitude: f64 },
    /// Mercator on the WGS84 ellipsoid
    Mercator {
        central_longitude: f64,
        latitude_true_scale: f64,
    },
    /// Azimuthal equidistant
    AzimuthalEquidistant {
        central_longitude: f64,
        central_latitude: f64,
    },
    /// Albers equal-area conic
    AlbersEqualArea {
        central_longitude: f64,
        central_latitude: f64,
        standard_parallels: (f64, f64),
    },
    /// Any registered EPSG CRS
    Epsg(u32),
}

impl Projection {
    pub fn plate_carree() -> Self {
        Projection::PlateCarree {
            central_longitude: 0.0,
        }
    }

    pub fn mercator() -> Self {
        Projection::Mercator {
            central_longitude: 0.0,
            latitude_true_scale: 0.0,
        }
    }

    pub fn azimuthal_equidistant() -> Self {
        Projection::AzimuthalEquidistant {
            central_longitude: 0.0,
            central_latitude: 0.0,
        }
    }

    pub fn albers_equal_area() -> Self {
        Projection::AlbersEqualArea {
            central_longitude: 0.0,
            central_latitude: 0.0,
            standard_parallels: (20.0, 50.0),
        }
    }

    /// Parse a projection name as used in configuration files.
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "geodetic" => Ok(Projection::Geodetic),
            "platecarree" | "plate_carree" => Ok(Projection::plate_carree()),
            "mercator" => Ok(Projection::mercator()),
            "azimuthalequidistant" | "azimuthal_equidistant" => {
                Ok(Projection::azimuthal_equidistant())
            }
            "albersequalarea" | "albers_equal_area" => Ok(Projection::albers_equal_area()),
            _ => match lower.strip_prefix("epsg:").map(str::parse::<u32>) {
                Some(Ok(code)) => Ok(Projection::Epsg(code)),
                _ => Err(CartoError::InvalidParameter {
                    param: "projection".to_string(),
                    message: format!("Unknown projection: {}", name),
                }),
            },
        }
    }

    /// The PROJ4 string equivalent of this projection.
    ///
    /// Fails only for an [`Projection::Epsg`] code PROJ does not know.
    pub fn proj4_init(&self) -> Result<String> {
        let proj = match *self {
            Projection::Geodetic => "+proj=longlat +ellps=WGS84 +no_defs".to_string(),
            Projection::PlateCarree { central_longitude } => format!(
                "+proj=eqc +ellps=WGS84 +lon_0={} +to_meter={} +no_defs",
                central_longitude, WGS84_DEGREE_METERS
            ),
            Projection::Mercator {
                central_longitude,
                latitude_true_scale,
            } => format!(
                "+proj=merc +ellps=WGS84 +lon_0={} +lat_ts={} +x_0=0 +y_0=0 +units=m +no_defs",
                central_longitude, latitude_true_scale
            ),
            Projection::AzimuthalEquidistant {
                central_longitude,
                central_latitude,
            } => format!(
                "+ellps=WGS84 +proj=aeqd +lon_0={} +lat_0={} +x_0=0 +y_0=0 +no_defs",
                central_longitude, central_latitude
            ),
            Projection::AlbersEqualArea {
                central_longitude,
                central_latitude,
                standard_parallels: (lat_1, lat_2),
            } => format!(
                "+ellps=WGS84 +proj=aea +lon_0={} +lat_0={} +x_0=0 +y_0=0 +lat_1={} +lat_2={} +no_defs",
                central_longitude, central_latitude, lat_1, lat_2
            ),
            // Legacy init form; `Crs::from_user_input` maps it to the EPSG entry
            Projection::Epsg(code) => {
                Crs::from_epsg(code)?;
                format!("+init=epsg:{}", code)
            }
        };
        Ok(proj)
    }

    /// The CRS this projection draws in.
    pub fn crs(&self) -> Result<Crs> {
        match *self {
            Projection::Epsg(code) => Crs::from_epsg(code),
            _ => Crs::from_proj_str(&self.proj4_init()?),
        }
    }

    /// Reproject one geometry from `src_crs` into this projection.
    ///
    /// There is no batch form: callers map this over a sequence and keep the
    /// results in the input order.
    pub fn project_geometry(&self, geometry: &Geometry<f64>, src_crs: &Crs) -> Result<Geometry<f64>> {
        let target = self.crs()?;
        Ok(Transformer::new(src_crs, &target)?.transform_geometry(geometry))
    }
}

impl TryFrom<&Projection> for Crs {
    type Error = CartoError;

    fn try_from(projection: &Projection) -> std::result::Result<Self, Self::Error> {
        projection.crs()
    }
}
