//! Apply command: run an edit script through an editing session.
//!
//! A script is a YAML (or JSON) list of operations, applied in order:
//!
//! ```yaml
//! - op: set_boundary
//!   rect: { x: 0, y: 0, width: 800, height: 600 }
//! - op: add_wall
//!   wall: [[0, 0], [400, 3]]
//! - op: click
//!   tool: beacons
//!   at: [100, 100]
//! - op: click
//!   tool: beacons
//!   at: [100, 100]
//! ```
//!
//! `click` ops drive the same two-click tools an interactive editor would.
//! Switching to a different tool drops any pending first click.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use tracing::{debug, info, warn};

use trackmap::{EditTool, EditorConfig, EditorSession, Line, Point, Rect, ToolEvent, ToolKind};

use super::common::{read_map, write_map};

#[derive(Args)]
pub struct ApplyArgs {
    /// Map file to edit
    pub map: PathBuf,
    /// Edit script (YAML or JSON list of operations)
    pub script: PathBuf,
    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Editor config file (YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Override the wall angle snap interval in degrees (0 disables)
    #[arg(long)]
    pub snap_angle: Option<f64>,
    /// Disable endpoint snapping
    #[arg(long)]
    pub no_snap_points: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
}

/// One step of an edit script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    AddWall { wall: Line },
    RemoveWallNear { at: Point },
    /// `angle` in radians; omitted for a ceiling beacon.
    AddBeacon { at: Point, angle: Option<f64> },
    RemoveBeacon { id: String },
    AddObstacle { rect: Rect },
    RemoveObstacle { at: Point },
    AddZone { rect: Rect },
    SetScale { scale: f64 },
    SetBoundary { rect: Rect },
    Click {
        tool: ToolKind,
        #[serde(default)]
        button: MouseButton,
        at: Point,
    },
}

pub fn parse_script(content: &str) -> Result<Vec<EditOp>> {
    // JSON is a subset of YAML, so one parser covers both
    Ok(serde_yaml::from_str(content)?)
}

pub fn cmd_apply(args: &ApplyArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    if let Some(snap_angle) = args.snap_angle {
        config.snap_angle = snap_angle;
    }
    if args.no_snap_points {
        config.enable_snap_points = false;
    }

    let map = read_map(&args.map)?;
    let script = read_script(&args.script)?;

    let mut session = EditorSession::new(config);
    session.restore(map);

    let mut runner = ScriptRunner::default();
    for op in &script {
        runner.run(&mut session, op);
    }
    if let Some(at) = runner.pending() {
        warn!(x = at.x, y = at.y, "script ended with an unfinished two-click edit");
    }
    info!(ops = script.len(), walls = session.map().walls.len(), "applied edit script");

    write_map(args.output.as_deref(), &session.into_map())
}

fn read_script(path: &Path) -> Result<Vec<EditOp>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse_script(&content).with_context(|| format!("invalid edit script {}", path.display()))
}

/// Applies ops to a session, keeping the active tool between clicks.
#[derive(Default)]
pub struct ScriptRunner {
    tool: Option<EditTool>,
}

impl ScriptRunner {
    pub fn run(&mut self, session: &mut EditorSession, op: &EditOp) {
        match op {
            EditOp::AddWall { wall } => {
                session.add_wall(*wall);
            }
            EditOp::RemoveWallNear { at } => {
                if session.remove_wall_near(*at).is_none() {
                    warn!(x = at.x, y = at.y, "no wall near point");
                }
            }
            EditOp::AddBeacon { at, angle } => {
                session.add_beacon(*at, *angle);
            }
            EditOp::RemoveBeacon { id } => {
                if session.remove_beacon(id).is_none() {
                    warn!(%id, "no such beacon");
                }
            }
            EditOp::AddObstacle { rect } => session.add_obstacle(*rect),
            EditOp::RemoveObstacle { at } => {
                if session.remove_obstacle(*at).is_none() {
                    warn!(x = at.x, y = at.y, "no obstacle at point");
                }
            }
            EditOp::AddZone { rect } => {
                session.add_zone(*rect);
            }
            EditOp::SetScale { scale } => session.set_scale(*scale),
            EditOp::SetBoundary { rect } => session.set_boundary(*rect),
            EditOp::Click { tool, button, at } => {
                let event = self.click(session, *tool, *button, *at);
                debug!(?tool, ?button, ?event, "click");
            }
        }
    }

    fn click(
        &mut self,
        session: &mut EditorSession,
        kind: ToolKind,
        button: MouseButton,
        at: Point,
    ) -> ToolEvent {
        if self.tool.as_ref().map(EditTool::kind) != Some(kind) {
            self.tool = Some(EditTool::new(kind));
        }
        let tool = self.tool.get_or_insert_with(|| EditTool::new(kind));
        match button {
            MouseButton::Left => tool.left_click(session, at),
            MouseButton::Right => tool.right_click(session, at),
        }
    }

    /// The first click still waiting for its second, if any.
    pub fn pending(&self) -> Option<Point> {
        self.tool.as_ref().and_then(EditTool::anchor)
    }
}
