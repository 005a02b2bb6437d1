//! Live-feed message shapes sent by the tracking backend.
//!
//! Each message may carry a tracking update (a particle snapshot plus the
//! filter's estimate), the state of a simulated entity, or both.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Point;
use crate::target::ParticleState;

/// Sampled particle positions, split by mode.
///
/// Coordinates are flattened `x0, y0, x1, y1, ...` in world units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    #[serde(default)]
    pub stationary: Vec<f64>,
    #[serde(default)]
    pub moving: Vec<f64>,
}

impl ParticleSnapshot {
    pub fn stationary_points(&self) -> impl Iterator<Item = Point> + '_ {
        pairs(&self.stationary)
    }

    pub fn moving_points(&self) -> impl Iterator<Item = Point> + '_ {
        pairs(&self.moving)
    }

    pub fn len(&self) -> usize {
        (self.stationary.len() + self.moving.len()) / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A trailing odd coordinate is dropped.
fn pairs(coords: &[f64]) -> impl Iterator<Item = Point> + '_ {
    coords.chunks_exact(2).map(|c| Point::new(c[0], c[1]))
}

/// Output of the tracking filter for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub snapshot: ParticleSnapshot,
    pub estimate: ParticleState,
}

/// One message from the live feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TrackingUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_state: Option<ParticleState>,
}

impl UpdateMessage {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
