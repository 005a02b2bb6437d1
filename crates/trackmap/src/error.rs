//! Error types for trackmap.
//!
//! Geometry and target extrapolation never fail. Errors only come from the
//! edges: reading files and parsing JSON/YAML.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackmapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid point: expected at least 2 coordinates, got {0}")]
    InvalidPoint(usize),
}

pub type Result<T> = std::result::Result<T, TrackmapError>;
