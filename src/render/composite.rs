// src/render/composite.rs
//! Compose covered tiles into a character grid

use crate::config::{FrameOverride, RenderOptions};
use crate::error::{GeotypeError, Result};
use crate::tiles::{point_to_tile, BoundingBox, GeometryKind, Tile, TileRef};
use crossterm::style::{Color, Stylize};
use std::collections::HashMap;

/// Largest number of cells a grid may hold before drawing is refused
pub const MAX_GRID_CELLS: u64 = 4_000_000;

/// Tile coordinate → kind of the last geometry that covered it
#[derive(Debug, Clone, Default)]
pub struct CoverageIndex {
    cells: HashMap<(u32, u32), GeometryKind>,
}

impl CoverageIndex {
    /// Build from tiles in rasterization order; later tiles overwrite earlier
    /// ones at the same coordinate.
    pub fn build<'a>(tiles: impl IntoIterator<Item = &'a Tile>) -> Self {
        let mut cells = HashMap::new();
        for tile in tiles {
            if let Some(kind) = tile.kind {
                cells.insert((tile.x, tile.y), kind);
            }
        }
        Self { cells }
    }

    pub fn get(&self, x: i64, y: i64) -> Option<GeometryKind> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        self.cells.get(&(x, y)).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Inclusive range of tile coordinates that gets drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl Frame {
    /// Bounds of the tiles, grown by `padding` on every side
    pub fn around(tiles: &[Tile], padding: i64) -> Option<Self> {
        let first = tiles.first()?;
        let mut frame = Frame {
            min_x: i64::from(first.x),
            min_y: i64::from(first.y),
            max_x: i64::from(first.x),
            max_y: i64::from(first.y),
        };
        for tile in &tiles[1..] {
            frame.min_x = frame.min_x.min(i64::from(tile.x));
            frame.min_y = frame.min_y.min(i64::from(tile.y));
            frame.max_x = frame.max_x.max(i64::from(tile.x));
            frame.max_y = frame.max_y.max(i64::from(tile.y));
        }

        frame.min_x = frame.min_x.saturating_sub(padding);
        frame.min_y = frame.min_y.saturating_sub(padding);
        frame.max_x = frame.max_x.saturating_add(padding);
        frame.max_y = frame.max_y.saturating_add(padding);
        Some(frame)
    }

    /// Frame for an explicit override at `zoom`
    pub fn explicit(frame_override: &FrameOverride, zoom: u8) -> Self {
        match frame_override {
            FrameOverride::BBox(bbox) => Frame::from_bbox(bbox, zoom),
            FrameOverride::Tile(tile) => Frame::from_tile(tile, zoom),
        }
    }

    /// Descendants of `tile` at `zoom`, or its ancestor when `zoom` is coarser
    pub fn from_tile(tile: &TileRef, zoom: u8) -> Self {
        let (x, y) = (i64::from(tile.x), i64::from(tile.y));
        if zoom >= tile.z {
            let dz = zoom - tile.z;
            Frame {
                min_x: x << dz,
                min_y: y << dz,
                max_x: ((x + 1) << dz) - 1,
                max_y: ((y + 1) << dz) - 1,
            }
        } else {
            let dz = tile.z - zoom;
            Frame {
                min_x: x >> dz,
                min_y: y >> dz,
                max_x: x >> dz,
                max_y: y >> dz,
            }
        }
    }

    /// Tiles between the bbox's top-left and bottom-right corners at `zoom`
    pub fn from_bbox(bbox: &BoundingBox, zoom: u8) -> Self {
        let (min_x, min_y) = point_to_tile(bbox.min_lon, bbox.max_lat, zoom);
        let (max_x, max_y) = point_to_tile(bbox.max_lon, bbox.min_lat, zoom);
        Frame {
            min_x: i64::from(min_x),
            min_y: i64::from(min_y),
            max_x: i64::from(max_x),
            max_y: i64::from(max_y),
        }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Columns; zero for an inverted frame
    pub fn width(&self) -> usize {
        usize::try_from(extent(self.min_x, self.max_x)).unwrap_or(usize::MAX)
    }

    pub fn height(&self) -> usize {
        usize::try_from(extent(self.min_y, self.max_y)).unwrap_or(usize::MAX)
    }

    pub fn cells(&self) -> u128 {
        u128::from(extent(self.min_x, self.max_x)) * u128::from(extent(self.min_y, self.max_y))
    }
}

fn extent(min: i64, max: i64) -> u64 {
    (i128::from(max) - i128::from(min) + 1).clamp(0, i128::from(u64::MAX)) as u64
}

const POLYGON_GLYPH: &str = "XX";
const LINE_GLYPH: &str = "==";
const POINT_GLYPH: &str = "@@";
const BLANK_GLYPH: &str = "  ";

/// Pre-rendered cell strings for each kind of cell
struct Palette {
    polygon: String,
    line: String,
    point: String,
    blank: String,
}

impl Palette {
    fn new(color: bool) -> Self {
        if !color {
            return Self {
                polygon: POLYGON_GLYPH.to_string(),
                line: LINE_GLYPH.to_string(),
                point: POINT_GLYPH.to_string(),
                blank: BLANK_GLYPH.to_string(),
            };
        }

        Self {
            polygon: POLYGON_GLYPH.with(Color::Green).on(Color::Green).to_string(),
            line: LINE_GLYPH.with(Color::Black).on(Color::Black).to_string(),
            point: POINT_GLYPH.with(Color::Red).on(Color::Red).to_string(),
            blank: BLANK_GLYPH.on(Color::Blue).to_string(),
        }
    }

    fn cell(&self, kind: Option<GeometryKind>) -> &str {
        match kind {
            Some(GeometryKind::Polygon) | Some(GeometryKind::MultiPolygon) => &self.polygon,
            Some(GeometryKind::LineString) | Some(GeometryKind::MultiLineString) => &self.line,
            Some(GeometryKind::Point) | Some(GeometryKind::MultiPoint) => &self.point,
            None => &self.blank,
        }
    }
}

/// Plain-text glyph for a cell, as drawn without colour
pub fn glyph(kind: Option<GeometryKind>) -> &'static str {
    match kind {
        Some(GeometryKind::Polygon) | Some(GeometryKind::MultiPolygon) => POLYGON_GLYPH,
        Some(GeometryKind::LineString) | Some(GeometryKind::MultiLineString) => LINE_GLYPH,
        Some(GeometryKind::Point) | Some(GeometryKind::MultiPoint) => POINT_GLYPH,
        None => BLANK_GLYPH,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub frame: Frame,
    pub text: String,
}

/// Determine the frame and draw it row by row.
///
/// With an explicit frame the grid is exactly its tile rectangle (no padding,
/// corner tiles always included) and tiles outside it are discarded.
/// Otherwise it is the padded bounds of all tiles. Frames above
/// [`MAX_GRID_CELLS`] are rejected before anything is allocated.
pub fn composite(
    tiles: &[Tile],
    zoom: u8,
    explicit: Option<&FrameOverride>,
    options: &RenderOptions,
) -> Result<Grid> {
    let (frame, index) = match explicit {
        Some(frame_override) => {
            let frame = Frame::explicit(frame_override, zoom);
            let index = CoverageIndex::build(
                tiles
                    .iter()
                    .filter(|t| frame.contains(i64::from(t.x), i64::from(t.y))),
            );
            (frame, index)
        }
        None => {
            let frame = Frame::around(tiles, options.frame_padding)
                .ok_or(GeotypeError::EmptyCoverage)?;
            (frame, CoverageIndex::build(tiles))
        }
    };

    log::debug!(
        "frame x {}..={} y {}..={} with {} covered cell(s)",
        frame.min_x,
        frame.max_x,
        frame.min_y,
        frame.max_y,
        index.len()
    );

    if frame.cells() > u128::from(MAX_GRID_CELLS) {
        return Err(GeotypeError::Input(format!(
            "frame of {}x{} tiles at zoom {} is too large to draw (limit {} cells)",
            extent(frame.min_x, frame.max_x),
            extent(frame.min_y, frame.max_y),
            zoom,
            MAX_GRID_CELLS
        )));
    }

    let palette = Palette::new(options.color);
    let mut text = String::with_capacity(frame.height() * (frame.width() * 2 + 1));
    for y in frame.min_y..=frame.max_y {
        for x in frame.min_x..=frame.max_x {
            text.push_str(palette.cell(index.get(x, y)));
        }
        text.push('\n');
    }

    Ok(Grid { frame, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> RenderOptions {
        RenderOptions {
            color: false,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_last_write_wins() {
        let tiles = vec![
            Tile::tagged(5, 5, 4, GeometryKind::LineString),
            Tile::tagged(5, 5, 4, GeometryKind::Polygon),
            Tile::tagged(6, 5, 4, GeometryKind::Polygon),
            Tile::tagged(6, 5, 4, GeometryKind::LineString),
        ];
        let index = CoverageIndex::build(&tiles);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(5, 5), Some(GeometryKind::Polygon));
        assert_eq!(index.get(6, 5), Some(GeometryKind::LineString));
        assert_eq!(index.get(-1, 5), None);
    }

    #[test]
    fn test_padded_frame_dimensions() {
        let tiles = vec![
            Tile::tagged(10, 20, 6, GeometryKind::Point),
            Tile::tagged(13, 21, 6, GeometryKind::Point),
        ];
        let grid = composite(&tiles, 6, None, &plain()).unwrap();

        assert_eq!(
            grid.frame,
            Frame {
                min_x: 9,
                min_y: 19,
                max_x: 14,
                max_y: 22
            }
        );
        let lines: Vec<&str> = grid.text.lines().collect();
        assert_eq!(lines.len(), grid.frame.height());
        assert!(lines.iter().all(|l| l.len() == 2 * grid.frame.width()));
        assert_eq!(lines[1], "  @@        ");
        assert_eq!(lines[2], "        @@  ");
    }

    #[test]
    fn test_custom_padding() {
        let tiles = vec![Tile::tagged(3, 3, 3, GeometryKind::Polygon)];
        let options = RenderOptions {
            frame_padding: 0,
            ..plain()
        };
        let grid = composite(&tiles, 3, None, &options).unwrap();
        assert_eq!(grid.text, "XX\n");
    }

    #[test]
    fn test_glyphs_distinguish_kinds_without_color() {
        let tiles = vec![
            Tile::tagged(0, 0, 2, GeometryKind::MultiPolygon),
            Tile::tagged(1, 0, 2, GeometryKind::MultiLineString),
            Tile::tagged(2, 0, 2, GeometryKind::MultiPoint),
        ];
        let options = RenderOptions {
            frame_padding: 0,
            ..plain()
        };
        let grid = composite(&tiles, 2, None, &options).unwrap();
        assert_eq!(grid.text, "XX==@@\n");

        let glyphs = [
            glyph(Some(GeometryKind::Polygon)),
            glyph(Some(GeometryKind::LineString)),
            glyph(Some(GeometryKind::Point)),
            glyph(None),
        ];
        for (i, a) in glyphs.iter().enumerate() {
            for b in &glyphs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_color_adds_escape_codes_only() {
        let tiles = vec![Tile::tagged(1, 1, 3, GeometryKind::Polygon)];
        let colored = composite(&tiles, 3, None, &RenderOptions::default()).unwrap();
        let plain = composite(&tiles, 3, None, &plain()).unwrap();

        assert!(colored.text.contains('\u{1b}'));
        assert!(!plain.text.contains('\u{1b}'));
        assert_eq!(colored.text.lines().count(), plain.text.lines().count());
        assert!(colored.text.contains("XX"));
    }

    #[test]
    fn test_explicit_frame_keeps_corners() {
        let bbox = BoundingBox::new(-10.0, -10.0, 10.0, 10.0).unwrap();
        // nothing rasterized at all
        let grid = composite(&[], 2, Some(&FrameOverride::BBox(bbox)), &plain()).unwrap();
        assert_eq!(
            grid.frame,
            Frame {
                min_x: 1,
                min_y: 1,
                max_x: 2,
                max_y: 2
            }
        );
        assert_eq!(grid.text, "    \n    \n");
    }

    #[test]
    fn test_explicit_frame_discards_outside_tiles_and_padding() {
        let bbox = BoundingBox::new(-10.0, -10.0, 10.0, 10.0).unwrap();
        let tiles = vec![
            Tile::tagged(2, 2, 2, GeometryKind::Point),
            Tile::tagged(0, 0, 2, GeometryKind::Polygon),
        ];
        let options = RenderOptions {
            frame_padding: 5,
            ..plain()
        };
        let grid = composite(&tiles, 2, Some(&FrameOverride::BBox(bbox)), &options).unwrap();
        assert_eq!(grid.text, "    \n  @@\n");
    }

    #[test]
    fn test_tile_frame_covers_only_its_children() {
        let tile = TileRef { x: 0, y: 0, z: 1 };
        assert_eq!(
            Frame::from_tile(&tile, 3),
            Frame {
                min_x: 0,
                min_y: 0,
                max_x: 3,
                max_y: 3
            }
        );

        // a line along the tile's eastern edge stays inside the 4x4 frame
        let tiles = vec![
            Tile::tagged(3, 0, 3, GeometryKind::LineString),
            Tile::tagged(4, 0, 3, GeometryKind::LineString),
        ];
        let grid = composite(&tiles, 3, Some(&FrameOverride::Tile(tile)), &plain()).unwrap();
        let lines: Vec<&str> = grid.text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "      ==");
    }

    #[test]
    fn test_tile_frame_at_coarser_zoom_is_ancestor() {
        let tile = TileRef { x: 3, y: 2, z: 2 };
        assert_eq!(
            Frame::from_tile(&tile, 1),
            Frame {
                min_x: 1,
                min_y: 1,
                max_x: 1,
                max_y: 1
            }
        );
    }

    #[test]
    fn test_huge_padding_is_rejected() {
        let tiles = vec![Tile::tagged(4, 4, 3, GeometryKind::Point)];
        let frame = Frame::around(&tiles, i64::MAX).unwrap();
        assert_eq!(frame.max_x, i64::MAX);
        assert!(frame.cells() > u128::from(MAX_GRID_CELLS));

        for padding in [i64::MAX, 1_000_000_000] {
            let options = RenderOptions {
                frame_padding: padding,
                ..plain()
            };
            let result = composite(&tiles, 3, None, &options);
            assert!(matches!(result, Err(GeotypeError::Input(_))), "{:?}", result);
        }
    }

    #[test]
    fn test_world_bbox_at_deep_zoom_is_rejected() {
        let world = BoundingBox::new(-180.0, -85.0, 180.0, 85.0).unwrap();
        let result = composite(&[], 30, Some(&FrameOverride::BBox(world)), &plain());
        assert!(matches!(result, Err(GeotypeError::Input(_))));
    }

    #[test]
    fn test_empty_coverage_without_frame() {
        let result = composite(&[], 3, None, &plain());
        assert!(matches!(result, Err(GeotypeError::EmptyCoverage)));
    }
}
