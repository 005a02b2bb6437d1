//! The editing session: owns one `MapData` and applies every edit to it.
//!
//! Snapping policy lives here. When a wall is committed:
//!
//! 1. **Endpoint snapping**: each endpoint is moved onto the closest
//!    existing wall endpoint within `endpoint_snap_distance`.
//! 2. **Angle snapping**: the wall's direction is rounded to a multiple of
//!    `snap_angle` degrees, keeping its start point and length. Only walls
//!    that pass the configured [`AngleSnapGate`] are angle-snapped.
//!
//! Walls and obstacles are removed with `swap_remove`, so removal is O(1) but
//! reorders what's left. Nothing downstream may rely on their order.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{AngleSnapGate, EditorConfig};
use crate::geometry::{
    closest_end_point, closest_point_on_line, contains_point, distance_sqr,
    round_angle_to, Line, Point, Polygon, Rect,
};
use crate::map::{MapData, SignalSource};

/// Callback fired with the full beacon collection after any beacon change.
pub type BeaconObserver = Box<dyn FnMut(&BTreeMap<String, SignalSource>) + Send>;

// ============================================================================
// ID ALLOCATION
// ============================================================================

/// Hands out string IDs ("1", "2", ...) for a keyed collection.
///
/// Scans upward from a running counter and skips keys already in use. The
/// counter only moves forward, so an ID freed below it is never handed out
/// again, while the ID the counter currently points at can be.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// First free ID at or above the counter.
    pub fn allocate<V>(&mut self, occupied: &BTreeMap<String, V>) -> String {
        while occupied.contains_key(&self.next.to_string()) {
            self.next += 1;
        }
        self.next.to_string()
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// A live map being edited.
pub struct EditorSession {
    map: MapData,
    config: EditorConfig,
    beacon_ids: IdAllocator,
    zone_ids: IdAllocator,
    on_beacons_changed: Option<BeaconObserver>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Start editing an empty map.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            map: MapData::new(),
            config,
            beacon_ids: IdAllocator::default(),
            zone_ids: IdAllocator::default(),
            on_beacons_changed: None,
        }
    }

    /// Register the beacon observer, replacing any previous one.
    pub fn on_beacons_changed<F>(&mut self, observer: F)
    where
        F: FnMut(&BTreeMap<String, SignalSource>) + Send + 'static,
    {
        self.on_beacons_changed = Some(Box::new(observer));
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    /// The map as it currently stands, ready to be saved.
    pub fn map(&self) -> &MapData {
        &self.map
    }

    pub fn into_map(self) -> MapData {
        self.map
    }

    /// Replace the edited map with an already-upgraded one.
    ///
    /// ID counters are kept; they skip whatever IDs the new map occupies.
    pub fn restore(&mut self, map: MapData) {
        self.map = map;
        self.notify_beacons();
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.map.scale = scale;
    }

    pub fn set_boundary(&mut self, boundary: Rect) {
        self.map.boundary = boundary;
    }

    // ------------------------------------------------------------------------
    // Walls
    // ------------------------------------------------------------------------

    /// Snap and append a wall. Returns the wall as stored.
    pub fn add_wall(&mut self, candidate: Line) -> Line {
        let mut wall = candidate;
        if self.config.enable_snap_points {
            wall = self.snap_wall_points(wall);
        }

        let gate_open = match self.config.angle_snap_gate {
            AngleSnapGate::EndXUnchanged => candidate.x2 == wall.x2,
            AngleSnapGate::NoEndpointSnapped => candidate == wall,
        };
        if self.config.angle_snapping() && gate_open {
            wall = snap_wall_angle(wall, self.config.snap_angle);
        }

        debug!(?candidate, ?wall, "adding wall");
        self.map.walls.push(wall);
        wall
    }

    /// Remove the first wall passing within `wall_pick_distance` of `point`.
    pub fn remove_wall_near(&mut self, point: Point) -> Option<Line> {
        let threshold = self.config.wall_pick_distance * self.config.wall_pick_distance;
        let index = self
            .map
            .walls
            .iter()
            .position(|wall| distance_sqr(closest_point_on_line(point, wall), point) < threshold)?;

        let removed = self.map.walls.swap_remove(index);
        debug!(?removed, "removed wall");
        Some(removed)
    }

    /// Move each endpoint onto the globally closest existing endpoint within
    /// the snap distance. The two endpoints are matched independently.
    fn snap_wall_points(&self, wall: Line) -> Line {
        let limit = self.config.endpoint_snap_distance * self.config.endpoint_snap_distance;

        let mut start = wall.start();
        let mut start_dist = limit;
        let mut end = wall.end();
        let mut end_dist = limit;

        for other in &self.map.walls {
            let m = closest_end_point(wall.start(), other);
            if m.dist_sqr < start_dist {
                start = m.point;
                start_dist = m.dist_sqr;
            }

            let m = closest_end_point(wall.end(), other);
            if m.dist_sqr < end_dist {
                end = m.point;
                end_dist = m.dist_sqr;
            }
        }

        Line::from_points(start, end)
    }

    // ------------------------------------------------------------------------
    // Beacons
    // ------------------------------------------------------------------------

    /// Place a beacon. `None` gives a ceiling beacon, `Some(angle)` (radians)
    /// a wall beacon facing that way. Returns the new beacon's ID.
    pub fn add_beacon(&mut self, position: Point, angle: Option<f64>) -> String {
        let id = self.beacon_ids.allocate(&self.map.signal_sources);
        let source = match angle {
            Some(angle) => SignalSource::wall(position.x, position.y, angle),
            None => SignalSource::ceiling(position.x, position.y),
        };

        debug!(%id, ceiling = angle.is_none(), "adding beacon");
        self.map.signal_sources.insert(id.clone(), source);
        self.notify_beacons();
        id
    }

    pub fn remove_beacon(&mut self, id: &str) -> Option<SignalSource> {
        let removed = self.map.signal_sources.remove(id);
        self.notify_beacons();
        removed
    }

    fn notify_beacons(&mut self) {
        if let Some(observer) = self.on_beacons_changed.as_mut() {
            observer(&self.map.signal_sources);
        }
    }

    // ------------------------------------------------------------------------
    // Obstacles & zones
    // ------------------------------------------------------------------------

    pub fn add_obstacle(&mut self, rect: Rect) {
        self.map.obstacles.push(rect);
    }

    /// Remove the first obstacle containing `point`.
    pub fn remove_obstacle(&mut self, point: Point) -> Option<Rect> {
        let index = self
            .map
            .obstacles
            .iter()
            .position(|obstacle| contains_point(obstacle, point))?;
        Some(self.map.obstacles.swap_remove(index))
    }

    /// Add a rectangular zone. Returns the new zone's ID.
    pub fn add_zone(&mut self, rect: Rect) -> String {
        let id = self.zone_ids.allocate(&self.map.zones);
        debug!(%id, "adding zone");
        self.map.zones.insert(id.clone(), Polygon::from(rect));
        id
    }
}

/// Round a wall's direction to the nearest `snap_angle` degrees, keeping its
/// start point and length.
fn snap_wall_angle(wall: Line, snap_angle: f64) -> Line {
    let angle = round_angle_to(wall.angle().to_degrees(), snap_angle).to_radians();
    let len = wall.length();

    Line::new(
        wall.x1,
        wall.y1,
        wall.x1 + len * angle.cos(),
        wall.y1 + len * angle.sin(),
    )
}
