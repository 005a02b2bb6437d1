//! Map schema migration.
//!
//! Saved maps carry a `version` tag. Older files are upgraded one step at a
//! time until they reach the current shape:
//!
//! ```text
//!   "0" ──► "1" ──► "2" (MapData)
//!    │       │
//!    │       └─ zones added (empty if missing)
//!    └─ obstacles/signal_sources filled in, flat {x, y} beacons become
//!       ceiling beacons
//! ```
//!
//! Every step is a plain `From` conversion between typed shapes. A new schema
//! version adds one shape and one step; existing steps never change.
//! Upgrading only ever fills in defaults, it never rejects a map for missing
//! fields. An unrecognized version tag is read as the current shape. Only
//! malformed JSON and wrongly-typed fields are errors.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::{Line, Polygon, Rect};
use crate::map::{self, MapData, SignalSource};

/// Scale assumed for old maps that never stored one.
const LEGACY_SCALE: f64 = 1.0;

fn legacy_scale() -> f64 {
    LEGACY_SCALE
}

/// A beacon as found in version 0 files: either already structured or the
/// old flat `{x, y}` record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacySource {
    Structured(SignalSource),
    Flat { x: f64, y: f64 },
}

impl From<LegacySource> for SignalSource {
    fn from(source: LegacySource) -> Self {
        match source {
            LegacySource::Structured(source) => source,
            LegacySource::Flat { x, y } => SignalSource::ceiling(x, y),
        }
    }
}

/// Version "0": collections may be missing or null.
#[derive(Debug, Deserialize)]
struct MapV0 {
    #[serde(default)]
    boundary: Option<Rect>,
    #[serde(default = "legacy_scale")]
    scale: f64,
    #[serde(default)]
    walls: Option<Vec<Line>>,
    #[serde(default)]
    obstacles: Option<Vec<Rect>>,
    #[serde(default)]
    signal_sources: Option<BTreeMap<String, LegacySource>>,
}

/// Version "1": structured beacons, no zones yet.
#[derive(Debug, Deserialize)]
struct MapV1 {
    #[serde(default)]
    boundary: Option<Rect>,
    #[serde(default = "legacy_scale")]
    scale: f64,
    #[serde(default)]
    walls: Option<Vec<Line>>,
    #[serde(default)]
    obstacles: Option<Vec<Rect>>,
    #[serde(default)]
    signal_sources: Option<BTreeMap<String, SignalSource>>,
    #[serde(default)]
    zones: Option<BTreeMap<String, Polygon>>,
}

impl From<MapV0> for MapV1 {
    fn from(old: MapV0) -> Self {
        let signal_sources = old
            .signal_sources
            .unwrap_or_default()
            .into_iter()
            .map(|(id, source)| (id, SignalSource::from(source)))
            .collect();

        MapV1 {
            boundary: old.boundary,
            scale: old.scale,
            walls: old.walls,
            obstacles: Some(old.obstacles.unwrap_or_default()),
            signal_sources: Some(signal_sources),
            zones: None,
        }
    }
}

/// Version "2": the current layout, read with every field optional so a
/// hand-edited or partial file still loads.
#[derive(Debug, Deserialize)]
struct MapV2 {
    #[serde(default)]
    boundary: Option<Rect>,
    #[serde(default = "legacy_scale")]
    scale: f64,
    #[serde(default)]
    walls: Option<Vec<Line>>,
    #[serde(default)]
    obstacles: Option<Vec<Rect>>,
    #[serde(default)]
    signal_sources: Option<BTreeMap<String, SignalSource>>,
    #[serde(default)]
    zones: Option<BTreeMap<String, Polygon>>,
}

impl From<MapV1> for MapV2 {
    fn from(old: MapV1) -> Self {
        MapV2 {
            boundary: old.boundary,
            scale: old.scale,
            walls: old.walls,
            obstacles: old.obstacles,
            signal_sources: old.signal_sources,
            zones: Some(old.zones.unwrap_or_default()),
        }
    }
}

impl From<MapV2> for MapData {
    fn from(stored: MapV2) -> Self {
        MapData {
            version: map::CURRENT_VERSION.to_string(),
            boundary: stored.boundary.unwrap_or_else(map::default_boundary),
            scale: stored.scale,
            walls: stored.walls.unwrap_or_default(),
            obstacles: stored.obstacles.unwrap_or_default(),
            signal_sources: stored.signal_sources.unwrap_or_default(),
            zones: stored.zones.unwrap_or_default(),
        }
    }
}

/// A parsed map tagged with the schema version it was read as.
#[derive(Debug)]
enum VersionedMap {
    V0(MapV0),
    V1(MapV1),
    V2(MapV2),
}

impl VersionedMap {
    /// Unrecognized version tags are read as the current layout.
    fn parse(value: Value) -> Result<Self> {
        let version = match value.get("version") {
            None | Some(Value::Null) => "0".to_string(),
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => other.to_string(),
        };

        match version.as_str() {
            "0" => Ok(VersionedMap::V0(serde_json::from_value(value)?)),
            "1" => Ok(VersionedMap::V1(serde_json::from_value(value)?)),
            map::CURRENT_VERSION => Ok(VersionedMap::V2(serde_json::from_value(value)?)),
            unknown => {
                warn!(version = unknown, "unknown map version, reading as current");
                Ok(VersionedMap::V2(serde_json::from_value(value)?))
            }
        }
    }

    fn version(&self) -> &'static str {
        match self {
            VersionedMap::V0(_) => "0",
            VersionedMap::V1(_) => "1",
            VersionedMap::V2(_) => "2",
        }
    }

    /// Advance by exactly one schema version.
    fn step(self) -> Self {
        match self {
            VersionedMap::V0(old) => VersionedMap::V1(old.into()),
            VersionedMap::V1(old) => VersionedMap::V2(old.into()),
            current @ VersionedMap::V2(_) => current,
        }
    }
}

/// Upgrade a map of any version to the current `MapData`.
///
/// Missing fields are filled with defaults. Only malformed JSON or wrongly
/// typed fields are errors.
pub fn upgrade(value: Value) -> Result<MapData> {
    let mut map = VersionedMap::parse(value)?;
    loop {
        match map {
            VersionedMap::V2(data) => return Ok(data.into()),
            older => {
                let from = older.version();
                map = older.step();
                debug!(from, to = map.version(), "upgraded map schema");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_version_is_v0_and_upgrades_flat_beacons() {
        let map = upgrade(json!({
            "boundary": { "x": 0, "y": 0, "width": 300, "height": 200 },
            "walls": [[[0, 0], [10, 0]]],
            "signal_sources": { "1": { "x": 12.0, "y": 34.0 } }
        }))
        .unwrap();

        assert_eq!(map.version, "2");
        assert_eq!(map.boundary, Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(map.scale, 1.0);
        assert_eq!(map.walls, vec![Line::new(0.0, 0.0, 10.0, 0.0)]);
        assert!(map.obstacles.is_empty());
        assert!(map.zones.is_empty());

        let beacon = map.signal_sources["1"];
        assert_eq!(beacon.position, [12.0, 34.0, 2.7]);
        assert_eq!(beacon.direction, [0.0, 0.0, -1.0]);
        assert_eq!(beacon.model_id, 0);
    }

    #[test]
    fn v0_keeps_structured_beacons() {
        let map = upgrade(json!({
            "version": "0",
            "boundary": { "x": 0, "y": 0, "width": 600, "height": 600 },
            "scale": 50.0,
            "walls": [],
            "signal_sources": {
                "1": { "position": [1.0, 2.0, 1.5], "direction": [1.0, 0.0, 0.0], "model_id": 3 },
                "2": { "x": 5.0, "y": 6.0 }
            }
        }))
        .unwrap();

        assert_eq!(map.scale, 50.0);
        assert_eq!(map.signal_sources["1"].position, [1.0, 2.0, 1.5]);
        assert_eq!(map.signal_sources["1"].model_id, 3);
        assert_eq!(map.signal_sources["2"].position, [5.0, 6.0, 2.7]);
    }

    #[test]
    fn null_collections_are_filled() {
        let map = upgrade(json!({
            "version": null,
            "walls": null,
            "obstacles": null,
            "signal_sources": null
        }))
        .unwrap();

        assert!(map.walls.is_empty());
        assert!(map.obstacles.is_empty());
        assert!(map.signal_sources.is_empty());
        assert_eq!(map.boundary, map::default_boundary());
    }

    #[test]
    fn v1_gets_zones() {
        let map = upgrade(json!({
            "version": "1",
            "boundary": { "x": 0, "y": 0, "width": 600, "height": 600 },
            "scale": 100.0,
            "walls": [],
            "obstacles": [{ "x": 1, "y": 2, "width": 3, "height": 4 }],
            "signal_sources": {}
        }))
        .unwrap();

        assert_eq!(map.version, "2");
        assert_eq!(map.obstacles, vec![Rect::new(1.0, 2.0, 3.0, 4.0)]);
        assert!(map.zones.is_empty());
    }

    #[test]
    fn current_version_passes_through() {
        let mut current = MapData::new();
        current.walls.push(Line::new(1.0, 1.0, 2.0, 2.0));
        let value = serde_json::to_value(&current).unwrap();
        assert_eq!(upgrade(value).unwrap(), current);
    }

    #[test]
    fn current_version_fills_missing_fields() {
        let map = upgrade(json!({
            "version": "2",
            "boundary": { "x": 0, "y": 0, "width": 300, "height": 200 },
            "scale": 100.0,
            "walls": []
        }))
        .unwrap();

        assert_eq!(map.scale, 100.0);
        assert!(map.obstacles.is_empty());
        assert!(map.signal_sources.is_empty());
        assert!(map.zones.is_empty());

        let map = upgrade(json!({ "version": "2" })).unwrap();
        assert_eq!(map.boundary, map::default_boundary());
        assert_eq!(map.scale, 1.0);
        assert!(map.walls.is_empty());
    }

    #[test]
    fn unknown_version_reads_as_current() {
        let map = upgrade(json!({
            "version": "7",
            "walls": [[[0, 0], [5, 0]]],
            "zones": { "1": [[0, 0], [1, 0], [1, 1]] }
        }))
        .unwrap();
        assert_eq!(map.version, "2");
        assert_eq!(map.walls.len(), 1);
        assert!(map.zones.contains_key("1"));

        let map = upgrade(json!({ "version": 2, "scale": 20.0 })).unwrap();
        assert_eq!(map.version, "2");
        assert_eq!(map.scale, 20.0);
    }

    #[test]
    fn wrongly_typed_field_is_a_parse_error() {
        let err = upgrade(json!({ "version": "1", "walls": "nope" })).unwrap_err();
        assert!(matches!(err, crate::error::TrackmapError::Json(_)));
    }
}
