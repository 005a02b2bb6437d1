//! Editor configuration.
//!
//! Config files are YAML. Every field has a default, so an empty file (or no
//! file at all) gives the stock editor behavior.
//!
//! ```yaml
//! snap_angle: 15
//! enable_snap_points: true
//! angle_snap_gate: end_x_unchanged
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Snapping and picking parameters for an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Wall angles are rounded to multiples of this many degrees.
    /// Zero or negative disables angle snapping.
    #[serde(default = "default_snap_angle")]
    pub snap_angle: f64,

    /// Snap new wall endpoints onto nearby existing endpoints
    #[serde(default = "default_enabled")]
    pub enable_snap_points: bool,

    /// Which walls are eligible for angle snapping after endpoint snapping
    #[serde(default)]
    pub angle_snap_gate: AngleSnapGate,

    /// Max distance (map units) for endpoint snapping
    #[serde(default = "default_endpoint_snap_distance")]
    pub endpoint_snap_distance: f64,

    /// Max distance (map units) for picking a wall to remove
    #[serde(default = "default_wall_pick_distance")]
    pub wall_pick_distance: f64,

    /// Second beacon click closer than this places a ceiling beacon
    #[serde(default = "default_beacon_angle_deadzone")]
    pub beacon_angle_deadzone: f64,
}

/// Condition under which a wall is angle-snapped after endpoint snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleSnapGate {
    /// Snap only if endpoint snapping left the end point's x coordinate as drawn.
    #[default]
    EndXUnchanged,
    /// Snap only if endpoint snapping moved neither endpoint.
    NoEndpointSnapped,
}

fn default_snap_angle() -> f64 {
    10.0
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint_snap_distance() -> f64 {
    10.0
}

fn default_wall_pick_distance() -> f64 {
    5.0
}

fn default_beacon_angle_deadzone() -> f64 {
    15.0
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_angle: default_snap_angle(),
            enable_snap_points: default_enabled(),
            angle_snap_gate: AngleSnapGate::default(),
            endpoint_snap_distance: default_endpoint_snap_distance(),
            wall_pick_distance: default_wall_pick_distance(),
            beacon_angle_deadzone: default_beacon_angle_deadzone(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a config from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Whether angle snapping is on at all.
    #[inline]
    pub fn angle_snapping(&self) -> bool {
        self.snap_angle > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_editor() {
        let config = EditorConfig::default();
        assert_eq!(config.snap_angle, 10.0);
        assert!(config.enable_snap_points);
        assert_eq!(config.angle_snap_gate, AngleSnapGate::EndXUnchanged);
        assert_eq!(config.endpoint_snap_distance, 10.0);
        assert_eq!(config.wall_pick_distance, 5.0);
        assert_eq!(config.beacon_angle_deadzone, 15.0);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(EditorConfig::from_yaml_str("").unwrap(), EditorConfig::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = EditorConfig::from_yaml_str(
            "snap_angle: 0\nangle_snap_gate: no_endpoint_snapped\n",
        )
        .unwrap();
        assert!(!config.angle_snapping());
        assert_eq!(config.angle_snap_gate, AngleSnapGate::NoEndpointSnapped);
        assert!(config.enable_snap_points);
    }

    #[test]
    fn bad_gate_is_an_error() {
        assert!(EditorConfig::from_yaml_str("angle_snap_gate: sometimes\n").is_err());
    }
}
