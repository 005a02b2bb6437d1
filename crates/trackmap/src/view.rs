//! A viewing session over one tracking instance.
//!
//! Two inputs drive a `LiveView` independently: feed messages arriving
//! whenever the network delivers them (`apply`) and display frames at the
//! refresh rate (`frame`). Both run on the owner's thread; a host that splits
//! them across threads must put the view behind a lock.

use crate::feed::{ParticleSnapshot, UpdateMessage};
use crate::geometry::Point;
use crate::map::MapData;
use crate::target::{ParticleMode, Target};

/// Render-ready state of one target for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetFrame {
    pub location: Point,
    pub pose: f64,
    /// Mode of the latest sample, so renderers can style still targets apart.
    pub mode: ParticleMode,
    pub trail: Vec<Point>,
}

impl TargetFrame {
    fn capture(target: &Target) -> Self {
        Self {
            location: target.location(),
            pose: target.pose(),
            mode: target.state().mode,
            trail: target.trail().iter().copied().collect(),
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub time_ms: f64,
    /// The simulated entity (ground truth).
    pub target: TargetFrame,
    /// The tracking filter's estimate.
    pub estimate: TargetFrame,
    /// Particle snapshot, present only if it changed since the last frame.
    pub particles: Option<ParticleSnapshot>,
}

pub struct LiveView {
    map: MapData,
    target: Target,
    estimate: Target,
    particles: ParticleSnapshot,
    particles_changed: bool,
    stopped: bool,
}

impl LiveView {
    /// Both targets draw in map coordinates: world position times the map
    /// scale, offset by the boundary origin.
    pub fn new(map: MapData) -> Self {
        let offset = map.boundary.origin();
        let scale = map.scale;
        Self {
            target: Target::new(offset, scale),
            estimate: Target::new(offset, scale),
            map,
            particles: ParticleSnapshot::default(),
            particles_changed: false,
            stopped: false,
        }
    }

    pub fn map(&self) -> &MapData {
        &self.map
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn estimate(&self) -> &Target {
        &self.estimate
    }

    /// Route one feed message to the targets.
    pub fn apply(&mut self, msg: &UpdateMessage) {
        if let Some(tracking) = &msg.tracking {
            self.particles = tracking.snapshot.clone();
            self.particles_changed = true;
            self.estimate.update(tracking.estimate);
        }
        if let Some(state) = msg.sim_state {
            self.target.update(state);
        }
    }

    /// Advance both targets to `time_ms` and capture them.
    ///
    /// Returns `None` once the view has been stopped.
    pub fn frame(&mut self, time_ms: f64) -> Option<Frame> {
        if self.stopped {
            return None;
        }

        self.target.tick(time_ms);
        self.estimate.tick(time_ms);

        let particles = if self.particles_changed {
            self.particles_changed = false;
            Some(self.particles.clone())
        } else {
            None
        };

        Some(Frame {
            time_ms,
            target: TargetFrame::capture(&self.target),
            estimate: TargetFrame::capture(&self.estimate),
            particles,
        })
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// World coordinates of a point clicked on the map, e.g. for sending a
    /// simulated entity somewhere.
    pub fn screen_to_world(&self, point: Point) -> Point {
        self.map.to_world(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::TrackingUpdate;
    use crate::geometry::Rect;
    use crate::target::ParticleState;

    fn map() -> MapData {
        let mut map = MapData::new();
        map.boundary = Rect::new(10.0, 20.0, 600.0, 600.0);
        map.scale = 50.0;
        map
    }

    fn state(x: f64, vx: f64, mode: ParticleMode) -> ParticleState {
        ParticleState {
            position: Point::new(x, 0.0),
            velocity: Point::new(vx, 0.0),
            turn_rate: 0.0,
            pose: 0.0,
            mode,
        }
    }

    #[test]
    fn sim_state_drives_target() {
        let mut view = LiveView::new(map());
        view.apply(&UpdateMessage {
            tracking: None,
            sim_state: Some(state(1.0, 1.0, ParticleMode::Moving)),
        });

        let frame = view.frame(0.0).unwrap();
        assert_eq!(frame.target.location, Point::new(60.0, 20.0));
        assert_eq!(frame.target.trail.len(), 1);
        assert!(frame.estimate.trail.is_empty());
        assert!(frame.particles.is_none());

        let frame = view.frame(1000.0).unwrap();
        assert_eq!(frame.target.location, Point::new(110.0, 20.0));
    }

    #[test]
    fn tracking_updates_estimate_and_particles_once() {
        let mut view = LiveView::new(map());
        view.apply(&UpdateMessage {
            tracking: Some(TrackingUpdate {
                snapshot: ParticleSnapshot { stationary: vec![1.0, 1.0], moving: vec![] },
                estimate: state(2.0, 5.0, ParticleMode::Stationary),
            }),
            sim_state: None,
        });

        let frame = view.frame(0.0).unwrap();
        assert_eq!(frame.estimate.location, Point::new(110.0, 20.0));
        assert_eq!(frame.estimate.mode, ParticleMode::Stationary);
        assert_eq!(frame.particles.map(|p| p.len()), Some(1));

        let frame = view.frame(500.0).unwrap();
        assert!(frame.particles.is_none());
        assert_eq!(frame.estimate.location, Point::new(110.0, 20.0));
    }

    #[test]
    fn stopped_view_yields_no_frames() {
        let mut view = LiveView::new(map());
        assert!(view.frame(0.0).is_some());
        view.stop();
        assert!(view.is_stopped());
        assert!(view.frame(16.0).is_none());
    }

    #[test]
    fn screen_to_world_inverts_map_transform() {
        let view = LiveView::new(map());
        assert_eq!(view.screen_to_world(Point::new(110.0, 70.0)), Point::new(2.0, 1.0));
    }
}
