// src/tiles/mod.rs
//! Web-mercator slippy tile coordinates, bounding boxes and tile coverage

mod cover;

pub use cover::cover;

use crate::error::{GeotypeError, Result};
use geo_types::{coord, Geometry, LineString, Polygon, Rect};
use std::fmt;
use std::str::FromStr;

/// Highest zoom whose tile indices still fit in `u32`
pub const MAX_ZOOM: u8 = 30;

/// Latitude limit of the web-mercator projection
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Geometry type a covered tile is tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    /// Kind of a geometry, or `None` for anything outside the six GeoJSON primitives
    pub fn of(geometry: &Geometry<f64>) -> Option<Self> {
        match geometry {
            Geometry::Point(_) => Some(GeometryKind::Point),
            Geometry::MultiPoint(_) => Some(GeometryKind::MultiPoint),
            Geometry::LineString(_) => Some(GeometryKind::LineString),
            Geometry::MultiLineString(_) => Some(GeometryKind::MultiLineString),
            Geometry::Polygon(_) => Some(GeometryKind::Polygon),
            Geometry::MultiPolygon(_) => Some(GeometryKind::MultiPolygon),
            Geometry::Line(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_)
            | Geometry::GeometryCollection(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of any `geo_types` geometry variant, for error messages
pub fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match GeometryKind::of(geometry) {
        Some(kind) => kind.name(),
        None => match geometry {
            Geometry::Line(_) => "Line",
            Geometry::Rect(_) => "Rect",
            Geometry::Triangle(_) => "Triangle",
            _ => "GeometryCollection",
        },
    }
}

/// A tile at a given zoom, optionally tagged with the geometry kind covering it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub z: u8,
    pub kind: Option<GeometryKind>,
}

impl Tile {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z, kind: None }
    }

    pub fn tagged(x: u32, y: u32, z: u8, kind: GeometryKind) -> Self {
        Self {
            x,
            y,
            z,
            kind: Some(kind),
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        tile_bbox(self.x, self.y, self.z)
    }
}

/// Geographic extent in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        let values = [min_lon, min_lat, max_lon, max_lat];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GeotypeError::Input(format!(
                "bounding box values must be finite: {:?}",
                values
            )));
        }
        if min_lon > max_lon || min_lat > max_lat {
            return Err(GeotypeError::Input(format!(
                "bounding box minimum exceeds maximum: {},{},{},{}",
                min_lon, min_lat, max_lon, max_lat
            )));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        }
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_lon, y: self.min_lat },
            coord! { x: self.max_lon, y: self.max_lat },
        )
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        self.to_rect().to_polygon()
    }

    /// Southern edge, west to east
    pub fn bottom_edge(&self) -> LineString<f64> {
        LineString::from(vec![(self.min_lon, self.min_lat), (self.max_lon, self.min_lat)])
    }

    /// Western edge, south to north
    pub fn left_edge(&self) -> LineString<f64> {
        LineString::from(vec![(self.min_lon, self.min_lat), (self.min_lon, self.max_lat)])
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.min_lon <= other.min_lon
            && self.min_lat <= other.min_lat
            && self.max_lon >= other.max_lon
            && self.max_lat >= other.max_lat
    }
}

impl FromStr for BoundingBox {
    type Err = GeotypeError;

    /// Parse `minX,minY,maxX,maxY`
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| GeotypeError::Input(format!("invalid bbox \"{}\": {}", s, e)))?;

        match values.as_slice() {
            [min_lon, min_lat, max_lon, max_lat] => {
                BoundingBox::new(*min_lon, *min_lat, *max_lon, *max_lat)
            }
            _ => Err(GeotypeError::Input(format!(
                "invalid bbox \"{}\": expected minX,minY,maxX,maxY",
                s
            ))),
        }
    }
}

/// A tile named on the command line as `x/y/z`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRef {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileRef {
    pub fn bbox(&self) -> BoundingBox {
        tile_bbox(self.x, self.y, self.z)
    }
}

impl FromStr for TileRef {
    type Err = GeotypeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| GeotypeError::Input(format!("invalid tile \"{}\": {}", s, reason));

        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 3 {
            return Err(invalid("expected x/y/z"));
        }

        let x = parts[0].parse::<u32>().map_err(|e| invalid(&e.to_string()))?;
        let y = parts[1].parse::<u32>().map_err(|e| invalid(&e.to_string()))?;
        let z = parts[2].parse::<u8>().map_err(|e| invalid(&e.to_string()))?;

        if z > MAX_ZOOM {
            return Err(invalid(&format!("zoom must be at most {}", MAX_ZOOM)));
        }
        let n = tile_count(z);
        if u64::from(x) >= n || u64::from(y) >= n {
            return Err(invalid(&format!("x and y must be below {} at zoom {}", n, z)));
        }

        Ok(TileRef { x, y, z })
    }
}

/// Number of tiles per axis at `zoom`
pub fn tile_count(zoom: u8) -> u64 {
    1u64 << zoom
}

/// Fractional tile position of a geographic point, before flooring
pub fn project(lon: f64, lat: f64, zoom: u8) -> (f64, f64) {
    let n = tile_count(zoom) as f64;
    let lon = lon.clamp(-180.0, 180.0);
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lon + 180.0) / 360.0 * n;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0 * n;
    (x, y)
}

/// Clamp a possibly out-of-range tile index onto the grid at `zoom`
pub(crate) fn clamp_index(v: i64, zoom: u8) -> u32 {
    v.clamp(0, tile_count(zoom) as i64 - 1) as u32
}

/// Tile containing a geographic point
pub fn point_to_tile(lon: f64, lat: f64, zoom: u8) -> (u32, u32) {
    let (x, y) = project(lon, lat, zoom);
    (
        clamp_index(x.floor() as i64, zoom),
        clamp_index(y.floor() as i64, zoom),
    )
}

/// Geographic extent of a tile
pub fn tile_bbox(x: u32, y: u32, zoom: u8) -> BoundingBox {
    let n = tile_count(zoom) as f64;
    let lon = |x: f64| x / n * 360.0 - 180.0;
    let lat = |y: f64| ((1.0 - 2.0 * y / n) * std::f64::consts::PI).sinh().atan().to_degrees();

    BoundingBox {
        min_lon: lon(x as f64),
        min_lat: lat(y as f64 + 1.0),
        max_lon: lon(x as f64 + 1.0),
        max_lat: lat(y as f64),
    }
}
