// src/geojson/normalize.rs
//! Coerce any GeoJSON value into a flat collection of simple features

use super::{parse, Feature, FeatureCollection, GeoJson};
use crate::error::{GeotypeError, Result};
use geo_types::Geometry;
use std::path::Path;

/// Wrap a bare geometry or single feature into a collection
pub fn normalize(geojson: GeoJson) -> FeatureCollection {
    match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(mut feature) => {
            feature.index = 0;
            FeatureCollection::new(vec![feature])
        }
        GeoJson::Geometry(geometry) => FeatureCollection::new(vec![Feature::new(0, geometry)]),
    }
}

fn explode(geometry: Geometry<f64>, out: &mut Vec<Geometry<f64>>) {
    match geometry {
        Geometry::MultiPoint(mp) => out.extend(mp.0.into_iter().map(Geometry::Point)),
        Geometry::MultiLineString(mls) => out.extend(mls.0.into_iter().map(Geometry::LineString)),
        Geometry::MultiPolygon(mp) => out.extend(mp.0.into_iter().map(Geometry::Polygon)),
        Geometry::GeometryCollection(gc) => {
            for part in gc.0 {
                explode(part, out);
            }
        }
        other => out.push(other),
    }
}

/// Split multi-part geometries and geometry collections into one feature per part.
///
/// Order is preserved and each part keeps the properties and source index of the
/// feature it came from. Features without geometry pass through untouched.
pub fn flatten(collection: FeatureCollection) -> FeatureCollection {
    let mut features = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        match feature.geometry {
            Some(ref geometry) => {
                let mut parts = Vec::new();
                explode(geometry.clone(), &mut parts);
                features.extend(parts.into_iter().map(|part| feature.with_geometry(part)));
            }
            None => features.push(feature),
        }
    }

    FeatureCollection::new(features)
}

/// Read, parse, normalize and flatten a GeoJSON file
pub fn read_file(path: &Path) -> Result<FeatureCollection> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        GeotypeError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read {}: {}", path.display(), e),
        ))
    })?;

    let geojson = parse(&contents)?;
    let collection = flatten(normalize(geojson));
    log::debug!(
        "loaded {} simple feature(s) from {}",
        collection.len(),
        path.display()
    );
    Ok(collection)
}
