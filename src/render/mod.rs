// src/render/mod.rs
//! Render pipeline: frame → zoom → rasterize → composite

pub mod composite;
pub mod frame;
pub mod raster;
pub mod zoom;

pub use composite::{CoverageIndex, Frame, Grid};
pub use frame::ResolvedFrame;
pub use zoom::ZoomSelection;

use crate::config::RenderOptions;
use crate::error::Result;
use crate::geojson::{self, FeatureCollection};
use log::info;
use std::path::Path;

/// Result of one render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    pub zoom: u8,
    /// Zoom came from an exhausted search rather than a fit
    pub approximate: bool,
    pub frame: Frame,
    pub text: String,
}

/// Render a flat feature collection
pub fn render(collection: &FeatureCollection, options: &RenderOptions) -> Result<Rendering> {
    let resolved = frame::resolve(collection, options.frame_override.as_ref())?;
    let selection = zoom::select_zoom(&resolved.bbox, options);
    info!(
        "rendering {} feature(s) at zoom {}{}",
        resolved.features.len(),
        selection.zoom,
        if selection.approximate { " (approximate)" } else { "" }
    );

    let tiles = raster::rasterize(&resolved.features, selection.zoom)?;
    let grid = composite::composite(
        &tiles,
        selection.zoom,
        resolved.explicit.as_ref(),
        options,
    )?;

    Ok(Rendering {
        zoom: selection.zoom,
        approximate: selection.approximate,
        frame: grid.frame,
        text: grid.text,
    })
}

/// Read a GeoJSON file and render it
pub fn render_file(path: &Path, options: &RenderOptions) -> Result<Rendering> {
    let collection = geojson::read_file(path)?;
    render(&collection, options)
}
