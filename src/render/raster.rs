// src/render/raster.rs
//! Per-feature tile coverage, tagged with the geometry kind

use crate::error::{GeotypeError, Result};
use crate::geojson::Feature;
use crate::tiles::{cover, geometry_name, GeometryKind, Tile};

/// Cover every feature at `zoom`, in input order.
///
/// Tiles are not deduplicated across features; overlaps are resolved when the
/// coverage index is built.
pub fn rasterize(features: &[Feature], zoom: u8) -> Result<Vec<Tile>> {
    let mut tiles = Vec::new();

    for feature in features {
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or_else(|| GeotypeError::feature(feature.index, "geometry is null"))?;
        let kind = GeometryKind::of(geometry).ok_or_else(|| {
            GeotypeError::feature(
                feature.index,
                format!("unsupported geometry type {}", geometry_name(geometry)),
            )
        })?;

        let covered = cover(geometry, zoom);
        log::debug!(
            "feature #{} ({}) covers {} tile(s) at zoom {}",
            feature.index,
            kind,
            covered.len(),
            zoom
        );
        tiles.extend(covered.into_iter().map(|(x, y)| Tile::tagged(x, y, zoom, kind)));
    }

    Ok(tiles)
}
