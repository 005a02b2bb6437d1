//! The map model: walls, obstacles, beacons and zones inside a boundary.
//!
//! `MapData` is the aggregate that gets saved and loaded. Coordinates are in
//! map units; `scale` map units correspond to one world unit (meter), and the
//! boundary origin is the world origin.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Line, Point, Polygon, Rect};
use crate::migrate;

/// Schema version written by this crate.
pub const CURRENT_VERSION: &str = "2";

/// Mounting height given to every beacon placed in the editor.
pub const BEACON_HEIGHT: f64 = 2.7;

/// A 3-component vector as stored in map files.
pub type Vec3 = [f64; 3];

/// A beacon.
///
/// A zero horizontal direction is a ceiling beacon radiating downward; a
/// non-zero horizontal direction is a wall beacon facing that way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSource {
    pub position: Vec3,
    pub direction: Vec3,
    /// Index into the backend's signal model table
    #[serde(default)]
    pub model_id: usize,
}

impl SignalSource {
    /// Ceiling-mounted beacon at `(x, y)` pointing straight down.
    pub fn ceiling(x: f64, y: f64) -> Self {
        Self {
            position: [x, y, BEACON_HEIGHT],
            direction: [0.0, 0.0, -1.0],
            model_id: 0,
        }
    }

    /// Wall-mounted beacon at `(x, y)` facing `angle` radians.
    pub fn wall(x: f64, y: f64, angle: f64) -> Self {
        Self {
            position: [x, y, BEACON_HEIGHT],
            direction: [angle.cos(), angle.sin(), 0.0],
            model_id: 0,
        }
    }

    #[inline]
    pub fn is_ceiling(&self) -> bool {
        self.direction[0] == 0.0 && self.direction[1] == 0.0
    }
}

/// A complete map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub version: String,
    pub boundary: Rect,
    pub scale: f64,
    pub walls: Vec<Line>,
    pub obstacles: Vec<Rect>,
    pub signal_sources: BTreeMap<String, SignalSource>,
    pub zones: BTreeMap<String, Polygon>,
}

/// Boundary of a freshly created map.
pub fn default_boundary() -> Rect {
    Rect::new(0.0, 0.0, 600.0, 600.0)
}

impl Default for MapData {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            boundary: default_boundary(),
            scale: 100.0,
            walls: Vec::new(),
            obstacles: Vec::new(),
            signal_sources: BTreeMap::new(),
            zones: BTreeMap::new(),
        }
    }
}

impl MapData {
    /// An empty map at the current schema version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a map of any known version, upgrading it to the current one.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        migrate::upgrade(value)
    }

    /// Load and upgrade a map file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Map coordinates to world coordinates (meters from the boundary origin).
    pub fn to_world(&self, point: Point) -> Point {
        let inv = 1.0 / self.scale;
        Point::new(inv * (point.x - self.boundary.x), inv * (point.y - self.boundary.y))
    }

    /// Beacons with positions converted to world units, as the tracking
    /// backend consumes them. Height is scaled but not offset.
    pub fn world_signal_sources(&self) -> BTreeMap<String, SignalSource> {
        let inv = 1.0 / self.scale;
        self.signal_sources
            .iter()
            .map(|(id, source)| {
                let [x, y, z] = source.position;
                let position = [
                    (x - self.boundary.x) * inv,
                    (y - self.boundary.y) * inv,
                    z * inv,
                ];
                (id.clone(), SignalSource { position, ..*source })
            })
            .collect()
    }

    /// ID of the first zone (in key order) containing a map-space point.
    pub fn zone_at(&self, point: Point) -> Option<&str> {
        self.zones
            .iter()
            .find(|(_, zone)| zone.contains(point))
            .map(|(id, _)| id.as_str())
    }
}
