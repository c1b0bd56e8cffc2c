// src/render/zoom.rs
//! Zoom selection: the first zoom at which the data no longer fits the grid

use crate::config::RenderOptions;
use crate::tiles::{cover, BoundingBox, MAX_ZOOM};
use geo_types::{Geometry, LineString};
use log::{debug, warn};

/// Lowest zoom the automatic search starts from
pub const MIN_SEARCH_ZOOM: u8 = 3;
/// Highest zoom the automatic search will examine
pub const MAX_SEARCH_ZOOM: u8 = 27;
/// Grid width in tiles; each tile is drawn two characters wide
pub const GRID_WIDTH: u32 = 30;
pub const GRID_HEIGHT: u32 = 23;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomSelection {
    pub zoom: u8,
    /// Set when the search ran out of zoom levels without a fit
    pub approximate: bool,
}

fn span<F>(edge: LineString<f64>, zoom: u8, axis: F) -> u32
where
    F: Fn(&(u32, u32)) -> u32,
{
    let tiles = cover(&Geometry::LineString(edge), zoom);
    let min = tiles.iter().map(&axis).min().unwrap_or(0);
    let max = tiles.iter().map(&axis).max().unwrap_or(0);
    max - min
}

/// Tile-index span of the bbox's bottom edge (x) and left edge (y) at `zoom`
pub fn tile_span(bbox: &BoundingBox, zoom: u8) -> (u32, u32) {
    let diff_x = span(bbox.bottom_edge(), zoom, |t| t.0);
    let diff_y = span(bbox.left_edge(), zoom, |t| t.1);
    (diff_x, diff_y)
}

pub fn exceeds_grid(diff_x: u32, diff_y: u32) -> bool {
    diff_x > GRID_WIDTH || diff_y > GRID_HEIGHT
}

/// Search zooms upwards from 3 for the first whose span overflows the grid.
///
/// Reaching zoom 27 without overflow (e.g. a single point) returns 27 flagged
/// as approximate.
pub fn search_zoom(bbox: &BoundingBox) -> ZoomSelection {
    for zoom in MIN_SEARCH_ZOOM..=MAX_SEARCH_ZOOM {
        let (diff_x, diff_y) = tile_span(bbox, zoom);
        if exceeds_grid(diff_x, diff_y) {
            debug!("zoom {} spans {}x{} tiles", zoom, diff_x, diff_y);
            return ZoomSelection {
                zoom,
                approximate: false,
            };
        }
    }

    warn!(
        "extent too small to fill the grid below zoom {}; rendering at zoom {} (approximate)",
        MAX_SEARCH_ZOOM + 1,
        MAX_SEARCH_ZOOM
    );
    ZoomSelection {
        zoom: MAX_SEARCH_ZOOM,
        approximate: true,
    }
}

/// Pick the render zoom: fixed or searched, then shifted by the overzoom
pub fn select_zoom(bbox: &BoundingBox, options: &RenderOptions) -> ZoomSelection {
    let (base, approximate) = match options.fixed_zoom() {
        Some(zoom) => (i64::from(zoom), false),
        None => {
            let searched = search_zoom(bbox);
            (i64::from(searched.zoom), searched.approximate)
        }
    };

    let requested = base + i64::from(options.overzoom);
    let zoom = requested.clamp(0, i64::from(MAX_ZOOM)) as u8;
    if i64::from(zoom) != requested {
        warn!(
            "zoom {} is outside 0..={}; clamped to {}",
            requested, MAX_ZOOM, zoom
        );
    }

    ZoomSelection { zoom, approximate }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> BoundingBox {
        BoundingBox::new(min_lon, min_lat, max_lon, max_lat).unwrap()
    }

    #[test]
    fn test_search_returns_minimal_fitting_zoom() {
        let boxes = [
            bbox(-10.0, -10.0, 10.0, 10.0),
            bbox(-120.0, 20.0, -60.0, 50.0),
            bbox(8.0, 47.0, 8.5, 47.5),
            bbox(-179.0, -80.0, 179.0, 80.0),
            bbox(2.29, 48.85, 2.30, 48.86),
        ];

        for b in &boxes {
            let selection = search_zoom(b);
            assert!(!selection.approximate);
            let (dx, dy) = tile_span(b, selection.zoom);
            assert!(exceeds_grid(dx, dy), "{:?} does not overflow at {}", b, selection.zoom);
            if selection.zoom > MIN_SEARCH_ZOOM {
                let (dx, dy) = tile_span(b, selection.zoom - 1);
                assert!(!exceeds_grid(dx, dy), "{:?} already overflows at {}", b, selection.zoom - 1);
            }
        }
    }

    #[test]
    fn test_world_extent() {
        // 32 columns at zoom 5 is the first span wider than 30
        let selection = search_zoom(&bbox(-180.0, -85.0, 180.0, 85.0));
        assert_eq!(selection.zoom, 5);
        assert!(!selection.approximate);
    }

    #[test]
    fn test_search_is_monotonic_in_extent() {
        let nested = [
            bbox(7.0, 46.0, 7.01, 46.01),
            bbox(7.0, 46.0, 7.5, 46.5),
            bbox(6.0, 45.0, 9.0, 48.0),
            bbox(-10.0, 35.0, 30.0, 60.0),
            bbox(-170.0, -60.0, 170.0, 75.0),
        ];

        for pair in nested.windows(2) {
            let (inner, outer) = (&pair[0], &pair[1]);
            assert!(outer.contains(inner));
            assert!(search_zoom(outer).zoom <= search_zoom(inner).zoom);
        }
    }

    #[test]
    fn test_degenerate_extent_is_approximate() {
        let selection = search_zoom(&bbox(0.0, 0.0, 0.0, 0.0));
        assert_eq!(selection.zoom, MAX_SEARCH_ZOOM);
        assert!(selection.approximate);
    }

    #[test]
    fn test_fixed_zoom_skips_search() {
        let options = RenderOptions {
            zoom: Some(4),
            ..RenderOptions::default()
        };
        let selection = select_zoom(&bbox(0.0, 0.0, 0.0, 0.0), &options);
        assert_eq!(selection, ZoomSelection { zoom: 4, approximate: false });
    }

    #[test]
    fn test_overzoom_applies_after_selection() {
        let b = bbox(-10.0, -10.0, 10.0, 10.0);
        let searched = search_zoom(&b).zoom;

        let up = RenderOptions {
            overzoom: 2,
            ..RenderOptions::default()
        };
        assert_eq!(select_zoom(&b, &up).zoom, searched + 2);

        let down = RenderOptions {
            zoom: Some(5),
            overzoom: -3,
            ..RenderOptions::default()
        };
        assert_eq!(select_zoom(&b, &down).zoom, 2);
    }

    #[test]
    fn test_final_zoom_is_clamped() {
        let b = bbox(-10.0, -10.0, 10.0, 10.0);
        let low = RenderOptions {
            zoom: Some(2),
            overzoom: -5,
            ..RenderOptions::default()
        };
        assert_eq!(select_zoom(&b, &low).zoom, 0);

        let high = RenderOptions {
            zoom: Some(29),
            overzoom: 5,
            ..RenderOptions::default()
        };
        assert_eq!(select_zoom(&b, &high).zoom, MAX_ZOOM);
    }
}
