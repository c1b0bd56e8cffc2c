// src/error.rs
//! Error types for geotype

use std::fmt;

pub type Result<T> = std::result::Result<T, GeotypeError>;

#[derive(Debug)]
pub enum GeotypeError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Valid JSON that is not usable GeoJSON, or a malformed bbox/tile argument
    Input(String),
    /// Unsupported or degenerate geometry
    Geometry(String),
    /// Nothing was rasterized and no explicit frame was requested
    EmptyCoverage,
    Config(String),
}

impl GeotypeError {
    /// Geometry error tagged with the index of the feature that caused it
    pub fn feature(index: usize, msg: impl fmt::Display) -> Self {
        GeotypeError::Geometry(format!("feature #{}: {}", index, msg))
    }
}

impl fmt::Display for GeotypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeotypeError::Io(e) => write!(f, "IO error: {}", e),
            GeotypeError::Json(e) => write!(f, "JSON error: {}", e),
            GeotypeError::Input(msg) => write!(f, "Input error: {}", msg),
            GeotypeError::Geometry(msg) => write!(f, "Geometry error: {}", msg),
            GeotypeError::EmptyCoverage => write!(f, "No tiles covered by the input geometry"),
            GeotypeError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for GeotypeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeotypeError::Io(e) => Some(e),
            GeotypeError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GeotypeError {
    fn from(error: std::io::Error) -> Self {
        GeotypeError::Io(error)
    }
}

impl From<serde_json::Error> for GeotypeError {
    fn from(error: serde_json::Error) -> Self {
        GeotypeError::Json(error)
    }
}
