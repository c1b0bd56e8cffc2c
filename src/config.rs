// src/config.rs
//! Render options and the optional user configuration file

use crate::error::{GeotypeError, Result};
use crate::tiles::{BoundingBox, TileRef};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_FRAME_PADDING: i64 = 1;

/// Explicit viewing frame requested by the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOverride {
    BBox(BoundingBox),
    Tile(TileRef),
}

impl FrameOverride {
    /// Geographic extent of the override
    pub fn bbox(&self) -> BoundingBox {
        match self {
            FrameOverride::BBox(bbox) => *bbox,
            FrameOverride::Tile(tile) => tile.bbox(),
        }
    }
}

/// Everything the render pipeline needs, built once by the CLI layer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Fixed zoom; `None` or a non-positive value selects automatically
    pub zoom: Option<i32>,
    pub frame_override: Option<FrameOverride>,
    pub overzoom: i32,
    /// Tiles of padding around the automatic frame
    pub frame_padding: i64,
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            zoom: None,
            frame_override: None,
            overzoom: 0,
            frame_padding: DEFAULT_FRAME_PADDING,
            color: true,
        }
    }
}

impl RenderOptions {
    /// Fixed zoom if one was given as a positive number
    pub fn fixed_zoom(&self) -> Option<i32> {
        self.zoom.filter(|z| *z > 0)
    }
}

/// Defaults read from `~/.config/geotype/config.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeotypeConfig {
    pub frame_padding: Option<i64>,
    pub color: Option<bool>,
    pub overzoom: Option<i32>,
}

impl GeotypeConfig {
    /// Load configuration from the user config file, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::get_config_path() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from a specific file; a missing file yields the defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| GeotypeError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| GeotypeError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Get config file path, if a home directory is known
    fn get_config_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
        Some(PathBuf::from(home).join(".config").join("geotype").join("config.json"))
    }

    /// Starting options before command line flags are applied
    pub fn base_options(&self) -> RenderOptions {
        let defaults = RenderOptions::default();
        RenderOptions {
            frame_padding: self.frame_padding.unwrap_or(defaults.frame_padding),
            color: self.color.unwrap_or(defaults.color),
            overzoom: self.overzoom.unwrap_or(defaults.overzoom),
            ..defaults
        }
    }
}
