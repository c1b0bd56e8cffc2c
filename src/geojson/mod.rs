// src/geojson/mod.rs
//! GeoJSON parsing into `geo_types` geometries

mod normalize;

pub use normalize::{flatten, normalize, read_file};

use crate::error::{GeotypeError, Result};
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde::Deserialize;
use serde_json::{Map, Value};

/// A single feature; `index` is its position in the source collection
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub index: usize,
    pub geometry: Option<Geometry<f64>>,
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    pub fn new(index: usize, geometry: Geometry<f64>) -> Self {
        Self {
            index,
            geometry: Some(geometry),
            properties: None,
        }
    }

    /// Copy of this feature carrying a different geometry
    pub fn with_geometry(&self, geometry: Geometry<f64>) -> Self {
        Self {
            index: self.index,
            geometry: Some(geometry),
            properties: self.properties.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Any top-level GeoJSON value
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJson {
    Feature(Feature),
    FeatureCollection(FeatureCollection),
    Geometry(Geometry<f64>),
}

/// Position with at least two ordinates; altitude and beyond are dropped
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(try_from = "Vec<f64>")]
struct Position(f64, f64);

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(values: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        match values.as_slice() {
            [x, y, ..] => Ok(Position(*x, *y)),
            _ => Err(format!("position needs at least 2 numbers, got {}", values.len())),
        }
    }
}

impl From<Position> for Coord<f64> {
    fn from(p: Position) -> Self {
        Coord { x: p.0, y: p.1 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Point {
        coordinates: Position,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<RawGeometry>,
    },
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawFeatureCollection {
    features: Vec<RawFeature>,
}

fn line(positions: Vec<Position>) -> LineString<f64> {
    LineString::new(positions.into_iter().map(Coord::from).collect())
}

fn polygon(mut rings: Vec<Vec<Position>>) -> Polygon<f64> {
    if rings.is_empty() {
        return Polygon::new(LineString::new(Vec::new()), Vec::new());
    }
    let exterior = line(rings.remove(0));
    Polygon::new(exterior, rings.into_iter().map(line).collect())
}

impl From<RawGeometry> for Geometry<f64> {
    fn from(raw: RawGeometry) -> Self {
        match raw {
            RawGeometry::Point { coordinates } => Geometry::Point(Point::from(Coord::from(coordinates))),
            RawGeometry::MultiPoint { coordinates } => Geometry::MultiPoint(MultiPoint::new(
                coordinates
                    .into_iter()
                    .map(|p| Point::from(Coord::from(p)))
                    .collect(),
            )),
            RawGeometry::LineString { coordinates } => Geometry::LineString(line(coordinates)),
            RawGeometry::MultiLineString { coordinates } => Geometry::MultiLineString(
                MultiLineString::new(coordinates.into_iter().map(line).collect()),
            ),
            RawGeometry::Polygon { coordinates } => Geometry::Polygon(polygon(coordinates)),
            RawGeometry::MultiPolygon { coordinates } => Geometry::MultiPolygon(MultiPolygon::new(
                coordinates.into_iter().map(polygon).collect(),
            )),
            RawGeometry::GeometryCollection { geometries } => Geometry::GeometryCollection(
                GeometryCollection(geometries.into_iter().map(Geometry::from).collect()),
            ),
        }
    }
}

impl RawFeature {
    fn into_feature(self, index: usize) -> Feature {
        Feature {
            index,
            geometry: self.geometry.map(Geometry::from),
            properties: self.properties,
        }
    }
}

fn invalid(kind: &str, e: serde_json::Error) -> GeotypeError {
    GeotypeError::Input(format!("invalid {}: {}", kind, e))
}

/// Parse a GeoJSON document, dispatching on its `type` member
pub fn parse(text: &str) -> Result<GeoJson> {
    let value: Value = serde_json::from_str(text)?;
    parse_value(value)
}

pub fn parse_value(value: Value) -> Result<GeoJson> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeotypeError::Input("GeoJSON object has no \"type\" member".to_string()))?
        .to_string();

    match kind.as_str() {
        "FeatureCollection" => {
            let raw: RawFeatureCollection =
                serde_json::from_value(value).map_err(|e| invalid(&kind, e))?;
            let features = raw
                .features
                .into_iter()
                .enumerate()
                .map(|(i, f)| f.into_feature(i))
                .collect();
            Ok(GeoJson::FeatureCollection(FeatureCollection::new(features)))
        }
        "Feature" => {
            let raw: RawFeature = serde_json::from_value(value).map_err(|e| invalid(&kind, e))?;
            Ok(GeoJson::Feature(raw.into_feature(0)))
        }
        "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "Polygon" | "MultiPolygon"
        | "GeometryCollection" => {
            let raw: RawGeometry = serde_json::from_value(value).map_err(|e| invalid(&kind, e))?;
            Ok(GeoJson::Geometry(raw.into()))
        }
        other => Err(GeotypeError::Input(format!("unknown GeoJSON type \"{}\"", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature_collection() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"a"},"geometry":{"type":"Point","coordinates":[1.5,2.5]}},
            {"type":"Feature","properties":null,"geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}}
        ]}"#;

        match parse(json).unwrap() {
            GeoJson::FeatureCollection(fc) => {
                assert_eq!(fc.len(), 2);
                assert_eq!(fc.features[0].geometry, Some(Geometry::Point(Point::new(1.5, 2.5))));
                assert_eq!(fc.features[1].index, 1);
                assert!(fc.features[1].properties.is_none());
            }
            other => panic!("expected collection, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_bare_geometry_with_altitude() {
        let json = r#"{"type":"Polygon","coordinates":[[[0,0,10],[1,0,10],[1,1,10],[0,0,10]]]}"#;
        match parse(json).unwrap() {
            GeoJson::Geometry(Geometry::Polygon(p)) => {
                assert_eq!(p.exterior().0.len(), 4);
                assert_eq!(p.exterior().0[1], Coord { x: 1.0, y: 0.0 });
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_null_geometry() {
        let json = r#"{"type":"Feature","properties":{},"geometry":null}"#;
        match parse(json).unwrap() {
            GeoJson::Feature(f) => assert!(f.geometry.is_none()),
            other => panic!("expected feature, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_short_position() {
        let json = r#"{"type":"Point","coordinates":[1]}"#;
        assert!(matches!(parse(json), Err(GeotypeError::Input(_))));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let json = r#"{"type":"Topology","objects":{}}"#;
        assert!(matches!(parse(json), Err(GeotypeError::Input(_))));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(parse("{\"type\": "), Err(GeotypeError::Json(_))));
    }
}
