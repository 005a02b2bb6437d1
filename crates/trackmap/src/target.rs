//! Client-side extrapolation of a tracked target.
//!
//! The tracking backend sends a `ParticleState` whenever it has one, at an
//! irregular rate. The renderer wants a position every frame. A [`Target`]
//! bridges the two with constant-velocity dead reckoning:
//!
//! ```text
//!   update(state) ──► Idle ──tick(t)──► Extrapolating ──tick(t')──► ...
//!        ▲                                    │
//!        └────────────── update(state) ◄──────┘
//! ```
//!
//! The first `tick` after an `update` sets the extrapolation baseline; later
//! ticks move the clock forward and the reported location drifts along the
//! sample's velocity. `dt` is never clamped, so a stalled feed drifts without
//! bound until the next sample arrives.

use std::collections::VecDeque;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::trace;

use crate::geometry::Point;

/// Max number of points kept in a target's trail.
pub const TRAIL_CAPACITY: usize = 100;

/// Motion mode reported by the tracking filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ParticleMode {
    #[default]
    Stationary,
    Moving,
}

impl<'de> Deserialize<'de> for ParticleMode {
    /// Anything other than `"Stationary"` is treated as moving.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "Stationary" => ParticleMode::Stationary,
            _ => ParticleMode::Moving,
        })
    }
}

impl ParticleMode {
    /// Position after `dt` seconds of motion in this mode.
    #[inline]
    pub fn extrapolate(self, position: Point, velocity: Point, dt: f64) -> Point {
        match self {
            ParticleMode::Stationary => position,
            ParticleMode::Moving => Point::new(position.x + dt * velocity.x, position.y + dt * velocity.y),
        }
    }
}

/// One tracking sample, in world units (meters, meters per second, radians).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticleState {
    pub position: Point,
    pub velocity: Point,
    #[serde(default)]
    pub turn_rate: f64,
    #[serde(default)]
    pub pose: f64,
    pub mode: ParticleMode,
}

/// Where a target is in its update/tick cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPhase {
    /// A sample arrived and no frame has ticked since.
    Idle,
    /// At least one frame has ticked since the last sample.
    Extrapolating,
}

/// A tracked entity as drawn on screen.
///
/// `offset` and `scale` map world coordinates to screen coordinates and are
/// fixed for the target's lifetime.
#[derive(Debug, Clone)]
pub struct Target {
    offset: Point,
    scale: f64,
    state: ParticleState,
    baseline_ms: f64,
    current_ms: f64,
    needs_baseline: bool,
    trail: VecDeque<Point>,
}

impl Target {
    pub fn new(offset: Point, scale: f64) -> Self {
        Self {
            offset,
            scale,
            state: ParticleState::default(),
            baseline_ms: 0.0,
            current_ms: 0.0,
            needs_baseline: true,
            trail: VecDeque::with_capacity(TRAIL_CAPACITY + 1),
        }
    }

    /// Take a new sample. The newest sample replaces the old one outright.
    pub fn update(&mut self, state: ParticleState) {
        self.state = state;
        self.needs_baseline = true;

        let location = self.location();
        trace!(x = location.x, y = location.y, mode = ?state.mode, "target update");

        self.trail.push_back(location);
        if self.trail.len() > TRAIL_CAPACITY {
            self.trail.pop_front();
        }
    }

    /// Advance the frame clock to `time_ms`.
    pub fn tick(&mut self, time_ms: f64) {
        if self.needs_baseline {
            self.baseline_ms = time_ms;
            self.needs_baseline = false;
        }
        self.current_ms = time_ms;
    }

    /// Seconds of extrapolation applied to the current sample.
    fn elapsed_secs(&self) -> f64 {
        if self.needs_baseline {
            0.0
        } else {
            (self.current_ms - self.baseline_ms) / 1000.0
        }
    }

    /// Extrapolated screen position at the current frame time.
    pub fn location(&self) -> Point {
        let world = self
            .state
            .mode
            .extrapolate(self.state.position, self.state.velocity, self.elapsed_secs());
        Point::new(
            self.scale * world.x + self.offset.x,
            self.scale * world.y + self.offset.y,
        )
    }

    /// Heading of the last sample. Not extrapolated.
    #[inline]
    pub fn pose(&self) -> f64 {
        self.state.pose
    }

    #[inline]
    pub fn state(&self) -> &ParticleState {
        &self.state
    }

    pub fn phase(&self) -> TargetPhase {
        if self.needs_baseline {
            TargetPhase::Idle
        } else {
            TargetPhase::Extrapolating
        }
    }

    /// Screen positions at each recent update, oldest first.
    pub fn trail(&self) -> &VecDeque<Point> {
        &self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving(x: f64, y: f64, vx: f64, vy: f64) -> ParticleState {
        ParticleState {
            position: Point::new(x, y),
            velocity: Point::new(vx, vy),
            turn_rate: 0.0,
            pose: 0.5,
            mode: ParticleMode::Moving,
        }
    }

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn moving_target_extrapolates_linearly() {
        let scale = 100.0;
        let mut target = Target::new(Point::new(10.0, 20.0), scale);

        target.update(moving(0.0, 0.0, 1.0, 0.0));
        target.tick(0.0);
        target.tick(2000.0);

        assert!(approx(target.location(), Point::new(2.0 * scale + 10.0, 20.0)));
        assert_eq!(target.phase(), TargetPhase::Extrapolating);
    }

    #[test]
    fn first_tick_after_update_sets_baseline() {
        let mut target = Target::new(Point::default(), 1.0);
        target.update(moving(0.0, 0.0, 1.0, 1.0));
        assert_eq!(target.phase(), TargetPhase::Idle);

        // Baseline is the first frame after the sample, not time zero
        target.tick(5000.0);
        assert!(approx(target.location(), Point::new(0.0, 0.0)));
        target.tick(5500.0);
        assert!(approx(target.location(), Point::new(0.5, 0.5)));
    }

    #[test]
    fn location_before_any_tick_is_raw_sample() {
        let mut target = Target::new(Point::new(1.0, 1.0), 2.0);
        target.tick(0.0);
        target.tick(10_000.0);
        target.update(moving(3.0, 4.0, 100.0, 100.0));
        assert!(approx(target.location(), Point::new(7.0, 9.0)));
    }

    #[test]
    fn update_resets_extrapolation() {
        let mut target = Target::new(Point::default(), 1.0);
        target.update(moving(0.0, 0.0, 1.0, 0.0));
        target.tick(0.0);
        target.tick(1000.0);
        assert!(approx(target.location(), Point::new(1.0, 0.0)));

        target.update(moving(5.0, 0.0, -1.0, 0.0));
        assert!(approx(target.location(), Point::new(5.0, 0.0)));
        target.tick(1500.0);
        target.tick(2500.0);
        assert!(approx(target.location(), Point::new(4.0, 0.0)));
    }

    #[test]
    fn stationary_target_never_drifts() {
        let mut target = Target::new(Point::new(5.0, 5.0), 10.0);
        target.update(ParticleState {
            mode: ParticleMode::Stationary,
            ..moving(1.0, 2.0, 3.0, 4.0)
        });

        let first = target.location();
        for t in [0.0, 16.0, 1000.0, 60_000.0, 1e9] {
            target.tick(t);
            assert_eq!(target.location(), first);
        }
        assert_eq!(first, Point::new(15.0, 25.0));
    }

    #[test]
    fn stalled_feed_drifts_unbounded() {
        let mut target = Target::new(Point::default(), 1.0);
        target.update(moving(0.0, 0.0, 2.0, 0.0));
        target.tick(0.0);
        target.tick(3_600_000.0);
        assert!(approx(target.location(), Point::new(7200.0, 0.0)));
    }

    #[test]
    fn pose_is_not_extrapolated() {
        let mut target = Target::new(Point::default(), 1.0);
        target.update(ParticleState {
            turn_rate: 1.0,
            pose: 0.25,
            ..moving(0.0, 0.0, 1.0, 0.0)
        });
        target.tick(0.0);
        target.tick(10_000.0);
        assert_eq!(target.pose(), 0.25);
    }

    #[test]
    fn trail_is_bounded_fifo() {
        let mut target = Target::new(Point::default(), 1.0);
        for i in 0..250 {
            target.update(moving(i as f64, 0.0, 0.0, 0.0));
            assert!(target.trail().len() <= TRAIL_CAPACITY);
        }

        let trail = target.trail();
        assert_eq!(trail.len(), TRAIL_CAPACITY);
        assert_eq!(trail.front(), Some(&Point::new(150.0, 0.0)));
        assert_eq!(trail.back(), Some(&Point::new(249.0, 0.0)));
    }

    #[test]
    fn trail_records_screen_positions() {
        let mut target = Target::new(Point::new(100.0, 50.0), 10.0);
        target.update(moving(1.0, 2.0, 0.0, 0.0));
        assert_eq!(target.trail().back(), Some(&Point::new(110.0, 70.0)));
    }

    #[test]
    fn particle_state_wire_format() {
        let state: ParticleState = serde_json::from_str(
            r#"{"position":[1.0,2.0,0.0],"velocity":[0.5,0.0,0.0],"turn_rate":0.1,"pose":1.5,"mode":"Moving"}"#,
        )
        .unwrap();
        assert_eq!(state.position, Point::new(1.0, 2.0));
        assert_eq!(state.velocity, Point::new(0.5, 0.0));
        assert_eq!(state.mode, ParticleMode::Moving);

        let state: ParticleState = serde_json::from_str(
            r#"{"position":[0,0],"velocity":[0,0],"turn_rate":0,"pose":0,"mode":"Stationary"}"#,
        )
        .unwrap();
        assert_eq!(state.mode, ParticleMode::Stationary);
    }

    #[test]
    fn unknown_mode_reads_as_moving() {
        let state: ParticleState = serde_json::from_str(
            r#"{"position":[0,0],"velocity":[1,0],"mode":"Walking"}"#,
        )
        .unwrap();
        assert_eq!(state.mode, ParticleMode::Moving);
    }
}
