//! # trackmap
//!
//! Floor-plan maps for indoor tracking: geometry with snapping, an editing
//! session, versioned map files, and a live view that extrapolates tracked
//! targets between feed updates.
//!
//! ## Layout
//!
//! - `geometry` - points, segments, rects, polygons and the snapping math
//! - `map` - the saved map document and world/map coordinate conversion
//! - `migrate` - upgrading older map files to the current version
//! - `editor` - an editing session that owns a map and applies snapping
//! - `tools` - two-click editing tools on top of the session
//! - `target` - dead-reckoning of a tracked entity between samples
//! - `feed` / `view` - live-feed messages and the per-frame view they drive
//!
//! ## Rust Lesson: Serde Remote Shapes
//!
//! Map files store points as `[x, y]` arrays, not `{ "x": .., "y": .. }`
//! objects. Rather than hand-writing a `Serialize` impl, `Point` declares
//! `#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]` and lets serde go
//! through the conversion traits. The Rust type stays a named struct.

pub mod config;
pub mod editor;
pub mod error;
pub mod feed;
pub mod geometry;
pub mod map;
pub mod migrate;
pub mod target;
pub mod tools;
pub mod view;

// Re-export common types at crate root for convenience.
pub use config::{AngleSnapGate, EditorConfig};
pub use editor::{EditorSession, IdAllocator};
pub use error::{Result, TrackmapError};
pub use feed::{ParticleSnapshot, TrackingUpdate, UpdateMessage};
pub use geometry::{
    closest_end_point, closest_point_on_line, compute_rect, contains_point, distance_sqr,
    point_in_polygon, round_angle_to, Line, Point, Polygon, Rect,
};
pub use map::{MapData, SignalSource, CURRENT_VERSION};
pub use migrate::upgrade;
pub use target::{ParticleMode, ParticleState, Target, TargetPhase};
pub use tools::{EditTool, Preview, ToolEvent, ToolKind};
pub use view::{Frame, LiveView, TargetFrame};
