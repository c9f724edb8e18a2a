//! Blueprint documents: the unit of save and load.

use crate::path::Path;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

/// Blueprint persistence errors.
#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("Blueprint not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for blueprint persistence.
pub type BlueprintResult<T> = Result<T, BlueprintError>;

/// A persisted snapshot of a canvas: its paths, grid cell dimension and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub paths: Vec<Path>,
    pub grid_dimension: u32,
    pub canvas_size: Size,
}

impl Blueprint {
    pub fn new(paths: Vec<Path>, grid_dimension: u32, canvas_size: Size) -> Self {
        Self {
            paths,
            grid_dimension,
            canvas_size,
        }
    }

    pub fn point_count(&self) -> usize {
        self.paths.iter().map(Path::len).sum()
    }

    /// Total length of all paths.
    pub fn total_length(&self) -> f64 {
        self.paths.iter().map(Path::length).sum()
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON. Every path needs at least two points.
    pub fn from_json(json: &str) -> BlueprintResult<Self> {
        let blueprint: Self = serde_json::from_str(json)
            .map_err(|e| BlueprintError::Serialization(e.to_string()))?;
        blueprint.validate()?;
        Ok(blueprint)
    }

    fn validate(&self) -> BlueprintResult<()> {
        match self.paths.iter().position(|path| path.len() < 2) {
            Some(index) => Err(BlueprintError::Serialization(format!(
                "path {index} has {} point(s), expected at least 2",
                self.paths[index].len()
            ))),
            None => Ok(()),
        }
    }

    pub fn save(&self, path: &std::path::Path) -> BlueprintResult<()> {
        let json = self
            .to_json()
            .map_err(|e| BlueprintError::Serialization(e.to_string()))?;
        fs::write(path, json)
            .map_err(|e| BlueprintError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::info!("Saved blueprint with {} paths to {}", self.paths.len(), path.display());
        Ok(())
    }

    pub fn load(path: &std::path::Path) -> BlueprintResult<Self> {
        if !path.exists() {
            return Err(BlueprintError::NotFound(path.display().to_string()));
        }
        let json = fs::read_to_string(path)
            .map_err(|e| BlueprintError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let blueprint = Self::from_json(&json).map_err(|e| match e {
            BlueprintError::Serialization(msg) => {
                BlueprintError::Serialization(format!("Failed to parse {}: {}", path.display(), msg))
            }
            other => other,
        })?;
        log::info!("Loaded blueprint with {} paths from {}", blueprint.paths.len(), path.display());
        Ok(blueprint)
    }
}
