// src/cli.rs
//! Command line interface

use crate::config::{FrameOverride, GeotypeConfig, RenderOptions};
use crate::tiles::{BoundingBox, TileRef};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "geotype",
    version,
    about = "Render GeoJSON as a grid of map tiles in the terminal"
)]
pub struct Cli {
    /// GeoJSON file (Feature, FeatureCollection or Geometry)
    pub file: PathBuf,

    /// Fixed tile zoom level, fractions truncated; zero or negative selects one automatically
    #[arg(short = 'z', long, allow_negative_numbers = true)]
    pub zoom: Option<f64>,

    /// Render exactly this extent and clip features to it
    #[arg(
        short = 'b',
        long,
        value_name = "minX,minY,maxX,maxY",
        allow_hyphen_values = true,
        conflicts_with = "tile"
    )]
    pub bbox: Option<BoundingBox>,

    /// Render exactly the extent of this tile and clip features to it
    #[arg(short = 't', long, value_name = "x/y/z")]
    pub tile: Option<TileRef>,

    /// Number of tiles to pad the sides of the frame (ignored with --bbox/--tile)
    #[arg(short = 'f', long, value_name = "TILES", allow_negative_numbers = true)]
    pub frame: Option<i64>,

    /// Zoom levels added to the selected zoom
    #[arg(short = 'm', long = "mod", value_name = "LEVELS", allow_negative_numbers = true)]
    pub overzoom: Option<i32>,

    /// Display plain ascii without colors
    #[arg(long = "nocolor")]
    pub no_color: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn frame_override(&self) -> Option<FrameOverride> {
        match (self.bbox, self.tile) {
            (Some(bbox), _) => Some(FrameOverride::BBox(bbox)),
            (None, Some(tile)) => Some(FrameOverride::Tile(tile)),
            (None, None) => None,
        }
    }

    /// Combine config file defaults with the flags; flags win
    pub fn render_options(&self, config: &GeotypeConfig, no_color_env: bool) -> RenderOptions {
        let base = config.base_options();
        RenderOptions {
            zoom: self.zoom.map(|z| z.trunc() as i32),
            frame_override: self.frame_override(),
            overzoom: self.overzoom.unwrap_or(base.overzoom),
            frame_padding: self.frame.unwrap_or(base.frame_padding),
            color: base.color && !self.no_color && !no_color_env,
        }
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
