//! Click-driven editing tools.
//!
//! Most edits take two clicks: the first left click picks an anchor point,
//! the second commits an edit built from the anchor and the click. A right
//! click cancels a pending anchor; some tools also use it to delete.
//!
//! | Tool        | Second left click          | Right click (no anchor)   |
//! |-------------|----------------------------|---------------------------|
//! | `Walls`     | wall anchor → click        | remove wall near click    |
//! | `Beacons`   | beacon at anchor           | -                         |
//! | `Obstacles` | rect between clicks        | remove obstacle at click  |
//! | `Zones`     | zone between clicks        | -                         |
//! | `Boundary`  | boundary between clicks    | -                         |
//! | `Scale`     | scale = click distance     | -                         |

use serde::{Deserialize, Serialize};

use crate::editor::EditorSession;
use crate::geometry::{compute_rect, distance_sqr, Line, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Walls,
    Obstacles,
    Beacons,
    Zones,
    Scale,
    Boundary,
}

/// What a tool would commit if the mouse were clicked where it is now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preview {
    Wall(Line),
    Rect(Rect),
    CeilingBeacon(Point),
    WallBeacon { position: Point, angle: f64 },
    Scale(f64),
}

/// Result of feeding one click to a tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEvent {
    /// First click stored, waiting for the second.
    Anchored,
    /// The map was edited.
    Committed,
    /// A pending anchor was dropped.
    Cancelled,
    /// An existing entity was removed.
    Removed,
    /// The click had no effect.
    Ignored,
}

/// A tool and its pending anchor.
#[derive(Debug, Clone)]
pub struct EditTool {
    kind: ToolKind,
    anchor: Option<Point>,
}

impl EditTool {
    pub fn new(kind: ToolKind) -> Self {
        Self { kind, anchor: None }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    pub fn left_click(&mut self, session: &mut EditorSession, point: Point) -> ToolEvent {
        let Some(anchor) = self.anchor.take() else {
            self.anchor = Some(point);
            return ToolEvent::Anchored;
        };

        match self.kind {
            ToolKind::Walls => {
                session.add_wall(Line::from_points(anchor, point));
            }
            ToolKind::Beacons => {
                let angle = beacon_angle(session, anchor, point);
                session.add_beacon(anchor, angle);
            }
            ToolKind::Obstacles => session.add_obstacle(compute_rect(anchor, point)),
            ToolKind::Zones => {
                session.add_zone(compute_rect(anchor, point));
            }
            ToolKind::Boundary => session.set_boundary(compute_rect(anchor, point)),
            ToolKind::Scale => session.set_scale(anchor.distance(point)),
        }
        ToolEvent::Committed
    }

    pub fn right_click(&mut self, session: &mut EditorSession, point: Point) -> ToolEvent {
        let had_anchor = self.anchor.take().is_some();

        match self.kind {
            ToolKind::Walls if !had_anchor => match session.remove_wall_near(point) {
                Some(_) => ToolEvent::Removed,
                None => ToolEvent::Ignored,
            },
            // Obstacles cancel and delete on the same click
            ToolKind::Obstacles => match session.remove_obstacle(point) {
                Some(_) => ToolEvent::Removed,
                None if had_anchor => ToolEvent::Cancelled,
                None => ToolEvent::Ignored,
            },
            _ if had_anchor => ToolEvent::Cancelled,
            _ => ToolEvent::Ignored,
        }
    }

    /// What a second click at `mouse` would commit, if there is an anchor.
    pub fn preview(&self, session: &EditorSession, mouse: Point) -> Option<Preview> {
        let anchor = self.anchor?;
        Some(match self.kind {
            ToolKind::Walls => Preview::Wall(Line::from_points(anchor, mouse)),
            ToolKind::Obstacles | ToolKind::Zones | ToolKind::Boundary => {
                Preview::Rect(compute_rect(anchor, mouse))
            }
            ToolKind::Beacons => match beacon_angle(session, anchor, mouse) {
                Some(angle) => Preview::WallBeacon { position: anchor, angle },
                None => Preview::CeilingBeacon(anchor),
            },
            ToolKind::Scale => Preview::Scale(anchor.distance(mouse)),
        })
    }
}

/// A second click inside the deadzone means "ceiling beacon"; otherwise the
/// beacon faces the second click.
fn beacon_angle(session: &EditorSession, anchor: Point, aim: Point) -> Option<f64> {
    let deadzone = session.config().beacon_angle_deadzone;
    if distance_sqr(anchor, aim) < deadzone * deadzone {
        return None;
    }
    Some((aim.y - anchor.y).atan2(aim.x - anchor.x))
}
