// src/lib.rs
//! geotype library
//!
//! Renders GeoJSON as a coarse grid of web-mercator tiles for quick visual
//! checks in a terminal.

pub mod cli;
pub mod config;
pub mod error;
pub mod geojson;
pub mod render;
pub mod tiles;

// Re-export main types for convenience
pub use config::{FrameOverride, RenderOptions};
pub use error::{GeotypeError, Result};
pub use render::{render, render_file, Rendering};
pub use tiles::{BoundingBox, GeometryKind, Tile, TileRef};
