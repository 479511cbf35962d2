//! Vector dataset loading.
//!
//! This module resolves a dataset identifier, reads it into a [`GeoFrame`] and
//! sets the frame's native CRS. Packaged datasets are compiled into the binary
//! and looked up by name first; anything else is treated as a filesystem path.
//! GeoJSON and ESRI Shapefile are supported, chosen by file extension.

use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue};
use once_cell::sync::Lazy;
use shapefile::dbase::FieldValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::crs::Crs;
use crate::error::{CartoError, Result};
use crate::frame::{Column, GeoFrame};
use crate::logging::log_frame_stats;

/// Datasets shipped inside the binary, as GeoJSON text.
static PACKAGED_DATASETS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([(
        "world_lowres",
        include_str!("../data/world_lowres.geojson"),
    )])
});

/// Names of all packaged datasets.
pub fn available_datasets() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = PACKAGED_DATASETS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// GeoJSON text of a packaged dataset.
pub fn packaged_dataset(name: &str) -> Option<&'static str> {
    PACKAGED_DATASETS.get(name).copied()
}

/// Resolve a path to a readable file on disk.
pub fn resolve_dataset(name_or_path: &str) -> Result<PathBuf> {
    let path = PathBuf::from(name_or_path);
    if path.is_file() {
        Ok(path)
    } else {
        Err(CartoError::DatasetNotFound {
            name: name_or_path.to_string(),
        })
    }
}

/// Load a packaged dataset by name, or a vector file by path.
pub fn load_dataset(name_or_path: &str) -> Result<GeoFrame> {
    let start = Instant::now();
    if let Some(text) = packaged_dataset(name_or_path) {
        info!("Loading packaged dataset: {}", name_or_path);
        let frame = parse_geojson(text)?;
        log_frame_stats(name_or_path, &frame, start.elapsed());
        return Ok(frame);
    }

    let path = resolve_dataset(name_or_path)?;
    info!("Loading vector dataset: {}", path.display());

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let frame = match extension.as_deref() {
        Some("geojson") | Some("json") => load_geojson(&path)?,
        Some("shp") => load_shapefile(&path)?,
        _ => {
            return Err(CartoError::InvalidParameter {
                param: "dataset".to_string(),
                message: format!("Unsupported vector format: {}", path.display()),
            })
        }
    };

    if frame.is_empty() {
        warn!("Dataset {} contains no features", path.display());
    }
    log_frame_stats(&path.display().to_string(), &frame, start.elapsed());
    Ok(frame)
}

/// Read a GeoJSON file.
pub fn load_geojson(path: &Path) -> Result<GeoFrame> {
    if !path.exists() {
        return Err(CartoError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }
    let text = std::fs::read_to_string(path)?;
    parse_geojson(&text)
}

/// Parse GeoJSON text (a FeatureCollection, a single Feature, or a bare Geometry).
pub fn parse_geojson(text: &str) -> Result<GeoFrame> {
    let collection = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(feature) => FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        },
        GeoJson::Geometry(geometry) => FeatureCollection {
            bbox: None,
            features: vec![geojson::Feature {
                geometry: Some(geometry),
                ..Default::default()
            }],
            foreign_members: None,
        },
    };

    let crs = match collection.foreign_members.as_ref().and_then(legacy_crs_name) {
        Some(name) => {
            debug!("GeoJSON declares legacy crs member: {}", name);
            Crs::from_user_input(&name)?
        }
        None => Crs::wgs84(),
    };

    let mut geometries = Vec::with_capacity(collection.features.len());
    let mut rows: Vec<JsonObject> = Vec::with_capacity(collection.features.len());
    let mut names: Vec<String> = Vec::new();

    for feature in collection.features {
        let geometry = match feature.geometry {
            Some(geometry) => Geometry::<f64>::try_from(geometry)?,
            None => Geometry::GeometryCollection(GeometryCollection::default()),
        };
        geometries.push(geometry);

        let properties = feature.properties.unwrap_or_default();
        for key in properties.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
        rows.push(properties);
    }

    let mut frame = GeoFrame::new(geometries, crs);
    for name in names {
        let values: Vec<Option<&JsonValue>> = rows.iter().map(|row| row.get(&name)).collect();
        frame.insert_column(name, json_column(&values))?;
    }
    Ok(frame)
}

/// The `crs.properties.name` of a pre-RFC 7946 GeoJSON document.
fn legacy_crs_name(members: &JsonObject) -> Option<String> {
    members
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
        .map(str::to_string)
}

/// Numbers become a float column unless any value is text or boolean.
fn json_column(values: &[Option<&JsonValue>]) -> Column {
    let numeric = values.iter().all(|value| {
        matches!(value, None | Some(JsonValue::Null) | Some(JsonValue::Number(_)))
    });
    if numeric {
        Column::Float(
            values
                .iter()
                .map(|value| value.and_then(JsonValue::as_f64).unwrap_or(f64::NAN))
                .collect(),
        )
    } else {
        Column::Text(
            values
                .iter()
                .map(|value| match value {
                    None | Some(JsonValue::Null) => None,
                    Some(JsonValue::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                })
                .collect(),
        )
    }
}

/// Read an ESRI Shapefile with its `.dbf` attributes and optional `.prj`.
pub fn load_shapefile(path: &Path) -> Result<GeoFrame> {
    if !path.exists() {
        return Err(CartoError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }
    let mut shape_reader = shapefile::ShapeReader::from_path(path)?;
    let mut geometries = Vec::new();
    for result in shape_reader.iter_shapes() {
        let shape: shapefile::Shape = result?;
        geometries.push(shape_to_geometry(&shape)?);
    }
    debug!("Read {} shapes from {}", geometries.len(), path.display());

    let mut frame = GeoFrame::new(geometries, shapefile_crs(path)?);

    let dbf = path.with_extension("dbf");
    if !dbf.exists() {
        warn!("No .dbf next to {}, frame has no attributes", path.display());
        return Ok(frame);
    }
    let mut dbf_reader =
        shapefile::dbase::Reader::from_path(&dbf).map_err(shapefile::Error::from)?;
    let names: Vec<String> = dbf_reader
        .fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect();
    let records: Vec<shapefile::dbase::Record> =
        dbf_reader.read().map_err(shapefile::Error::from)?;
    if records.len() != frame.len() {
        return Err(CartoError::LengthMismatch {
            expected: frame.len(),
            actual: records.len(),
        });
    }

    for name in names {
        let values: Vec<Option<FieldValue>> = records
            .iter()
            .map(|record| record.get(&name).cloned())
            .collect();
        frame.insert_column(name, dbase_column(&values))?;
    }
    Ok(frame)
}

fn shape_points(points: &[shapefile::Point]) -> Vec<Coord<f64>> {
    points.iter().map(|p| Coord { x: p.x, y: p.y }).collect()
}

/// Convert a 2D shape. Inner rings attach to the outer ring preceding them.
fn shape_to_geometry(shape: &shapefile::Shape) -> Result<Geometry<f64>> {
    let geometry = match shape {
        shapefile::Shape::NullShape => Geometry::GeometryCollection(GeometryCollection::default()),
        shapefile::Shape::Point(p) => Geometry::Point(Point::new(p.x, p.y)),
        shapefile::Shape::Multipoint(mp) => Geometry::MultiPoint(MultiPoint(
            mp.points().iter().map(|p| Point::new(p.x, p.y)).collect(),
        )),
        shapefile::Shape::Polyline(pl) => {
            let mut lines: Vec<LineString<f64>> = pl
                .parts()
                .iter()
                .map(|part| LineString::new(shape_points(part)))
                .collect();
            if lines.len() == 1 {
                Geometry::LineString(lines.remove(0))
            } else {
                Geometry::MultiLineString(MultiLineString::new(lines))
            }
        }
        shapefile::Shape::Polygon(poly) => {
            let mut polygons: Vec<Polygon<f64>> = Vec::new();
            for ring in poly.rings() {
                let ring_line = LineString::new(shape_points(ring.points()));
                match ring {
                    shapefile::PolygonRing::Outer(_) => {
                        polygons.push(Polygon::new(ring_line, Vec::new()));
                    }
                    shapefile::PolygonRing::Inner(_) => match polygons.last_mut() {
                        Some(polygon) => polygon.interiors_push(ring_line),
                        None => {
                            return Err(CartoError::InvalidParameter {
                                param: "geometry".to_string(),
                                message: "polygon hole precedes its outer ring".to_string(),
                            })
                        }
                    },
                }
            }
            if polygons.len() == 1 {
                Geometry::Polygon(polygons.remove(0))
            } else {
                Geometry::MultiPolygon(MultiPolygon::new(polygons))
            }
        }
        other => {
            return Err(CartoError::InvalidParameter {
                param: "geometry".to_string(),
                message: format!("Unsupported shape type: {:?}", other.shapetype()),
            })
        }
    };
    Ok(geometry)
}

fn dbase_number(value: &FieldValue) -> Option<Option<f64>> {
    match value {
        FieldValue::Numeric(v) => Some(*v),
        FieldValue::Float(v) => Some(v.map(f64::from)),
        FieldValue::Integer(v) => Some(Some(f64::from(*v))),
        FieldValue::Double(v) => Some(Some(*v)),
        FieldValue::Currency(v) => Some(Some(*v)),
        _ => None,
    }
}

fn dbase_column(values: &[Option<FieldValue>]) -> Column {
    let numeric = values
        .iter()
        .all(|value| value.as_ref().map_or(true, |v| dbase_number(v).is_some()));
    if numeric {
        Column::Float(
            values
                .iter()
                .map(|value| {
                    value
                        .as_ref()
                        .and_then(dbase_number)
                        .flatten()
                        .unwrap_or(f64::NAN)
                })
                .collect(),
        )
    } else {
        Column::Text(
            values
                .iter()
                .map(|value| match value {
                    None => None,
                    Some(FieldValue::Character(s)) => s.clone(),
                    Some(FieldValue::Memo(s)) => Some(s.clone()),
                    Some(FieldValue::Logical(b)) => b.map(|b| b.to_string()),
                    Some(other) => dbase_number(other).flatten().map(|n| n.to_string()),
                })
                .collect(),
        )
    }
}

/// CRS from a sibling `.prj`, defaulting to WGS84. An EPSG authority wins;
/// otherwise PROJ reads the WKT itself.
fn shapefile_crs(path: &Path) -> Result<Crs> {
    let prj = path.with_extension("prj");
    let wkt = match std::fs::read_to_string(&prj) {
        Ok(wkt) => wkt,
        Err(_) => {
            debug!("No .prj next to {}, assuming EPSG:4326", path.display());
            return Ok(Crs::wgs84());
        }
    };
    match wkt_epsg_code(&wkt) {
        Some(code) => Crs::from_epsg(code),
        None => match Crs::from_wkt(&wkt) {
            Ok(crs) => Ok(crs),
            Err(e) => {
                warn!("Unreadable .prj in {} ({}), assuming EPSG:4326", prj.display(), e);
                Ok(Crs::wgs84())
            }
        },
    }
}

/// The outermost `AUTHORITY["EPSG","<code>"]` of a WKT string, which is the
/// last one in the text.
fn wkt_epsg_code(wkt: &str) -> Option<u32> {
    let compact: String = wkt.chars().filter(|c| !c.is_whitespace()).collect();
    let start = compact.rfind("AUTHORITY[\"EPSG\",\"")? + "AUTHORITY[\"EPSG\",\"".len();
    let rest = &compact[start..];
    let end = rest.find('"')?;
    if let Ok(code) = rest[..end].parse::<u32>() {
        return Some(code);
    }
    None
}
