// src/render/frame.rs
//! Resolve the geographic extent to render, clipping features to an explicit frame

use crate::config::FrameOverride;
use crate::error::{GeotypeError, Result};
use crate::geojson::{Feature, FeatureCollection};
use crate::tiles::{geometry_name, BoundingBox, GeometryKind};
use geo::{BooleanOps, BoundingRect, Intersects};
use geo_types::{Geometry, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon, Rect};
use log::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFrame {
    /// Features to rasterize, clipped when an explicit frame was given
    pub features: Vec<Feature>,
    /// Extent driving zoom selection
    pub bbox: BoundingBox,
    /// Frame the rendered grid must match exactly
    pub explicit: Option<FrameOverride>,
}

pub fn resolve(
    collection: &FeatureCollection,
    frame_override: Option<&FrameOverride>,
) -> Result<ResolvedFrame> {
    match frame_override {
        Some(frame) => {
            let bbox = frame.bbox();
            let features = clip_features(collection, &bbox)?;
            if features.is_empty() {
                info!("no features intersect the requested frame");
            }
            Ok(ResolvedFrame {
                features,
                bbox,
                explicit: Some(*frame),
            })
        }
        None => Ok(ResolvedFrame {
            features: collection.features.clone(),
            bbox: collection_bbox(collection)?,
            explicit: None,
        }),
    }
}

fn feature_geometry(feature: &Feature) -> Result<&Geometry<f64>> {
    feature
        .geometry
        .as_ref()
        .ok_or_else(|| GeotypeError::feature(feature.index, "geometry is null"))
}

/// Extent of every feature in the collection
pub fn collection_bbox(collection: &FeatureCollection) -> Result<BoundingBox> {
    if collection.is_empty() {
        return Err(GeotypeError::Geometry(
            "feature collection contains no features".to_string(),
        ));
    }

    let mut extent: Option<BoundingBox> = None;
    for feature in &collection.features {
        let geometry = feature_geometry(feature)?;
        let rect = geometry
            .bounding_rect()
            .ok_or_else(|| GeotypeError::feature(feature.index, "geometry has no coordinates"))?;
        let bbox = BoundingBox::from_rect(rect);

        extent = Some(match extent {
            None => bbox,
            Some(e) => BoundingBox {
                min_lon: e.min_lon.min(bbox.min_lon),
                min_lat: e.min_lat.min(bbox.min_lat),
                max_lon: e.max_lon.max(bbox.max_lon),
                max_lat: e.max_lat.max(bbox.max_lat),
            },
        });
    }

    extent.ok_or_else(|| GeotypeError::Geometry("feature collection has no extent".to_string()))
}

fn clip_features(collection: &FeatureCollection, bbox: &BoundingBox) -> Result<Vec<Feature>> {
    let mut clipped = Vec::with_capacity(collection.len());

    for feature in &collection.features {
        let geometry = feature_geometry(feature)?;
        match clip(geometry, bbox).map_err(|msg| GeotypeError::feature(feature.index, msg))? {
            Some(part) => {
                if GeometryKind::of(&part) != GeometryKind::of(geometry) {
                    debug!(
                        "feature #{} became {} after clipping",
                        feature.index,
                        geometry_name(&part)
                    );
                }
                clipped.push(feature.with_geometry(part));
            }
            None => debug!("feature #{} lies outside the frame", feature.index),
        }
    }

    Ok(clipped)
}

fn collapse_points(points: Vec<Point<f64>>) -> Option<Geometry<f64>> {
    match points.len() {
        0 => None,
        1 => points.into_iter().next().map(Geometry::Point),
        _ => Some(Geometry::MultiPoint(MultiPoint::new(points))),
    }
}

fn collapse_lines(lines: MultiLineString<f64>) -> Option<Geometry<f64>> {
    let mut lines: Vec<_> = lines.0.into_iter().filter(|l| !l.0.is_empty()).collect();
    match lines.len() {
        0 => None,
        1 => lines.pop().map(Geometry::LineString),
        _ => Some(Geometry::MultiLineString(MultiLineString::new(lines))),
    }
}

fn collapse_polygons(polygons: MultiPolygon<f64>) -> Option<Geometry<f64>> {
    let mut polygons: Vec<Polygon<f64>> = polygons
        .0
        .into_iter()
        .filter(|p| !p.exterior().0.is_empty())
        .collect();
    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(MultiPolygon::new(polygons))),
    }
}

/// Intersection of a geometry with the bbox; the result may be of a different kind
fn clip(geometry: &Geometry<f64>, bbox: &BoundingBox) -> std::result::Result<Option<Geometry<f64>>, String> {
    let rect: Rect<f64> = bbox.to_rect();
    let window = rect.to_polygon();

    // edges count as inside
    let clipped = match geometry {
        Geometry::Point(p) => p.intersects(&rect).then(|| Geometry::Point(*p)),
        Geometry::MultiPoint(mp) => {
            collapse_points(mp.0.iter().filter(|p| p.intersects(&rect)).copied().collect())
        }
        Geometry::LineString(ls) => {
            collapse_lines(window.clip(&MultiLineString::new(vec![ls.clone()]), false))
        }
        Geometry::MultiLineString(mls) => collapse_lines(window.clip(mls, false)),
        Geometry::Polygon(p) => collapse_polygons(p.intersection(&window)),
        Geometry::MultiPolygon(mp) => {
            collapse_polygons(mp.intersection(&MultiPolygon::new(vec![window])))
        }
        other => {
            return Err(format!(
                "unsupported geometry type {}",
                geometry_name(other)
            ))
        }
    };

    Ok(clipped)
}
