// src/tiles/cover.rs
//! Tile coverage of geometries at a fixed zoom

use super::{clamp_index, project};
use geo_types::{Coord, Geometry, LineString, Polygon};
use std::collections::BTreeSet;

type TileSet = BTreeSet<(u32, u32)>;

/// Tiles at `zoom` touched by `geometry`, sorted by (x, y) and without duplicates
pub fn cover(geometry: &Geometry<f64>, zoom: u8) -> Vec<(u32, u32)> {
    let mut tiles = TileSet::new();
    cover_into(geometry, zoom, &mut tiles);
    tiles.into_iter().collect()
}

fn cover_into(geometry: &Geometry<f64>, zoom: u8, tiles: &mut TileSet) {
    match geometry {
        Geometry::Point(p) => point_cover(p.0, zoom, tiles),
        Geometry::MultiPoint(mp) => {
            for p in &mp.0 {
                point_cover(p.0, zoom, tiles);
            }
        }
        Geometry::Line(l) => line_cover(&[l.start, l.end], zoom, tiles),
        Geometry::LineString(ls) => line_cover(&ls.0, zoom, tiles),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                line_cover(&ls.0, zoom, tiles);
            }
        }
        Geometry::Polygon(p) => polygon_cover(p, zoom, tiles),
        Geometry::MultiPolygon(mp) => {
            for p in &mp.0 {
                polygon_cover(p, zoom, tiles);
            }
        }
        Geometry::Rect(r) => polygon_cover(&r.to_polygon(), zoom, tiles),
        Geometry::Triangle(t) => polygon_cover(&t.to_polygon(), zoom, tiles),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                cover_into(g, zoom, tiles);
            }
        }
    }
}

fn insert(tiles: &mut TileSet, x: i64, y: i64, zoom: u8) {
    tiles.insert((clamp_index(x, zoom), clamp_index(y, zoom)));
}

fn point_cover(c: Coord<f64>, zoom: u8, tiles: &mut TileSet) {
    let (x, y) = project(c.x, c.y, zoom);
    insert(tiles, x.floor() as i64, y.floor() as i64, zoom);
}

fn line_cover(coords: &[Coord<f64>], zoom: u8, tiles: &mut TileSet) {
    let projected: Vec<(f64, f64)> = coords.iter().map(|c| project(c.x, c.y, zoom)).collect();

    if let Some(&(x, y)) = projected.first() {
        insert(tiles, x.floor() as i64, y.floor() as i64, zoom);
    }
    for pair in projected.windows(2) {
        walk_segment(pair[0], pair[1], zoom, tiles);
    }
}

/// Grid traversal from `a` to `b` in fractional tile space, visiting every tile
/// the segment passes through.
fn walk_segment(a: (f64, f64), b: (f64, f64), zoom: u8, tiles: &mut TileSet) {
    let (x0, y0) = a;
    let (x1, y1) = b;
    let dx = x1 - x0;
    let dy = y1 - y0;
    if dx == 0.0 && dy == 0.0 {
        return;
    }

    let sx: i64 = if dx > 0.0 { 1 } else { -1 };
    let sy: i64 = if dy > 0.0 { 1 } else { -1 };
    let mut x = x0.floor() as i64;
    let mut y = y0.floor() as i64;
    let end = (x1.floor() as i64, y1.floor() as i64);

    let mut t_max_x = if dx == 0.0 {
        f64::INFINITY
    } else {
        ((if dx > 0.0 { 1.0 } else { 0.0 } + x as f64 - x0) / dx).abs()
    };
    let mut t_max_y = if dy == 0.0 {
        f64::INFINITY
    } else {
        ((if dy > 0.0 { 1.0 } else { 0.0 } + y as f64 - y0) / dy).abs()
    };
    let t_dx = if dx == 0.0 { f64::INFINITY } else { (1.0 / dx).abs() };
    let t_dy = if dy == 0.0 { f64::INFINITY } else { (1.0 / dy).abs() };

    insert(tiles, x, y, zoom);
    while (t_max_x < 1.0 || t_max_y < 1.0) && (x, y) != end {
        if t_max_x < t_max_y {
            t_max_x += t_dx;
            x += sx;
        } else {
            t_max_y += t_dy;
            y += sy;
        }
        insert(tiles, x, y, zoom);
    }
}

fn ring_edges(ring: &[(f64, f64)]) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
    let closing = match (ring.first(), ring.last()) {
        (Some(&first), Some(&last)) if first != last => Some((last, first)),
        _ => None,
    };
    ring.windows(2).map(|w| (w[0], w[1])).chain(closing)
}

/// Ring boundaries plus every tile whose centre lies inside the polygon (even-odd rule)
fn polygon_cover(polygon: &Polygon<f64>, zoom: u8, tiles: &mut TileSet) {
    let rings: Vec<&LineString<f64>> = std::iter::once(polygon.exterior())
        .chain(polygon.interiors().iter())
        .filter(|ring| !ring.0.is_empty())
        .collect();

    for ring in &rings {
        line_cover(&ring.0, zoom, tiles);
    }

    let projected: Vec<Vec<(f64, f64)>> = rings
        .iter()
        .map(|ring| ring.0.iter().map(|c| project(c.x, c.y, zoom)).collect())
        .collect();

    let (min_y, max_y) = projected
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }

    let mut crossings: Vec<f64> = Vec::new();
    for row in (min_y.floor() as i64)..=(max_y.floor() as i64) {
        let cy = row as f64 + 0.5;
        crossings.clear();

        for ring in &projected {
            for ((ax, ay), (bx, by)) in ring_edges(ring) {
                if (ay <= cy) != (by <= cy) {
                    crossings.push(ax + (cy - ay) / (by - ay) * (bx - ax));
                }
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let first = (span[0] - 0.5).ceil() as i64;
            let last = (span[1] - 0.5).floor() as i64;
            for col in first..=last {
                insert(tiles, col, row, zoom);
            }
        }
    }
}
