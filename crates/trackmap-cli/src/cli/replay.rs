//! Replay command: drive a live view from a recorded feed.
//!
//! The feed is JSON lines, one timestamped message per line:
//!
//! ```text
//! {"at": 0,   "message": {"sim_state": {...}}}
//! {"at": 250, "message": {"tracking": {...}}}
//! ```
//!
//! A virtual frame clock runs at `--fps`. Before each frame every message
//! stamped at or before the frame time is applied, then one JSON line is
//! written for the frame.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::info;

use trackmap::{Frame, LiveView, ParticleMode, TargetFrame, UpdateMessage};

use super::common::read_map;

#[derive(Args)]
pub struct ReplayArgs {
    /// Map file the feed was recorded against
    pub map: PathBuf,
    /// Feed file (JSON lines)
    pub feed: PathBuf,
    /// Frames per second of the virtual clock
    #[arg(long, default_value_t = 60.0)]
    pub fps: f64,
    /// Stop after this many milliseconds (default: last message time)
    #[arg(long)]
    pub until: Option<f64>,
}

/// One line of a recorded feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub at: f64,
    pub message: UpdateMessage,
}

#[derive(Serialize)]
struct TargetLine {
    x: f64,
    y: f64,
    pose: f64,
    mode: ParticleMode,
    trail: usize,
}

impl From<&TargetFrame> for TargetLine {
    fn from(frame: &TargetFrame) -> Self {
        Self {
            x: frame.location.x,
            y: frame.location.y,
            pose: frame.pose,
            mode: frame.mode,
            trail: frame.trail.len(),
        }
    }
}

#[derive(Serialize)]
struct FrameLine {
    time_ms: f64,
    target: TargetLine,
    estimate: TargetLine,
    #[serde(skip_serializing_if = "Option::is_none")]
    particles: Option<usize>,
}

impl From<&Frame> for FrameLine {
    fn from(frame: &Frame) -> Self {
        Self {
            time_ms: frame.time_ms,
            target: TargetLine::from(&frame.target),
            estimate: TargetLine::from(&frame.estimate),
            particles: frame.particles.as_ref().map(|p| p.len()),
        }
    }
}

/// Parse a JSON-lines feed, skipping blank lines. Events are ordered by time;
/// events with equal times keep their file order.
pub fn parse_feed(content: &str) -> Result<Vec<FeedEvent>> {
    let mut events = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: FeedEvent = serde_json::from_str(line)
            .with_context(|| format!("invalid feed event on line {}", i + 1))?;
        events.push(event);
    }
    events.sort_by(|a, b| a.at.total_cmp(&b.at));
    Ok(events)
}

/// Run the view over `events` and collect one frame per clock tick.
pub fn replay(view: &mut LiveView, events: &[FeedEvent], fps: f64, until: f64) -> Vec<Frame> {
    let period = 1000.0 / fps;
    let mut frames = Vec::new();
    let mut pending = events.iter().peekable();

    let mut tick: u64 = 0;
    loop {
        let time_ms = tick as f64 * period;
        if time_ms > until {
            break;
        }

        while let Some(event) = pending.next_if(|e| e.at <= time_ms) {
            view.apply(&event.message);
        }
        match view.frame(time_ms) {
            Some(frame) => frames.push(frame),
            None => break,
        }
        tick += 1;
    }

    view.stop();
    frames
}

/// The frame loop only terminates for a positive finite rate and a finite
/// end time.
fn check_clock(fps: f64, until: Option<f64>) -> Result<()> {
    if !(fps.is_finite() && fps > 0.0) {
        bail!("--fps must be a positive number, got {fps}");
    }
    if let Some(until) = until {
        if !until.is_finite() {
            bail!("--until must be a finite number of milliseconds, got {until}");
        }
    }
    Ok(())
}

pub fn cmd_replay(args: &ReplayArgs) -> Result<()> {
    check_clock(args.fps, args.until)?;

    let map = read_map(&args.map)?;
    let events = read_feed(&args.feed)?;
    let until = args
        .until
        .unwrap_or_else(|| events.last().map_or(0.0, |e| e.at));

    let mut view = LiveView::new(map);
    let frames = replay(&mut view, &events, args.fps, until);
    info!(events = events.len(), frames = frames.len(), "replayed feed");

    let mut out = BufWriter::new(io::stdout().lock());
    for frame in &frames {
        serde_json::to_writer(&mut out, &FrameLine::from(frame))?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn read_feed(path: &Path) -> Result<Vec<FeedEvent>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read feed {}", path.display()))?;
    parse_feed(&content).with_context(|| format!("invalid feed {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackmap::{MapData, ParticleMode, ParticleState, Point};

    fn sim(x: f64, vx: f64) -> UpdateMessage {
        UpdateMessage {
            tracking: None,
            sim_state: Some(ParticleState {
                position: Point::new(x, 0.0),
                velocity: Point::new(vx, 0.0),
                mode: ParticleMode::Moving,
                ..ParticleState::default()
            }),
        }
    }

    fn map() -> MapData {
        let mut map = MapData::new();
        map.scale = 10.0;
        map
    }

    #[test]
    fn feed_is_sorted_and_blank_lines_skipped() {
        let feed = r#"
{"at": 500, "message": {}}

{"at": 100, "message": {"sim_state": {"position": [1, 2], "velocity": [0, 0], "mode": "Stationary"}}}
"#;
        let events = parse_feed(feed).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].at, 100.0);
        assert!(events[0].message.sim_state.is_some());
    }

    #[test]
    fn bad_line_reports_line_number() {
        let err = parse_feed("{\"at\": 0, \"message\": {}}\nnot json\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn clock_rejects_non_finite_bounds() {
        assert!(check_clock(60.0, None).is_ok());
        assert!(check_clock(60.0, Some(500.0)).is_ok());
        assert!(check_clock(60.0, Some(f64::NAN)).is_err());
        assert!(check_clock(60.0, Some(f64::INFINITY)).is_err());
        assert!(check_clock(0.0, None).is_err());
        assert!(check_clock(f64::NAN, None).is_err());
    }

    #[test]
    fn frames_follow_virtual_clock() {
        let mut view = LiveView::new(map());
        let events = vec![FeedEvent { at: 0.0, message: sim(0.0, 1.0) }];

        let frames = replay(&mut view, &events, 10.0, 1000.0);
        assert_eq!(frames.len(), 11);
        assert_eq!(frames[0].target.location, Point::new(0.0, 0.0));

        let last = frames.last().unwrap();
        assert_eq!(last.time_ms, 1000.0);
        assert!((last.target.location.x - 10.0).abs() < 1e-9);
        assert!(view.is_stopped());
    }

    #[test]
    fn events_apply_at_first_frame_after_their_time() {
        let mut view = LiveView::new(map());
        let events = vec![
            FeedEvent { at: 0.0, message: sim(0.0, 0.0) },
            FeedEvent { at: 150.0, message: sim(5.0, 0.0) },
        ];

        let frames = replay(&mut view, &events, 10.0, 300.0);
        let xs: Vec<f64> = frames.iter().map(|f| f.target.location.x).collect();
        assert_eq!(xs, vec![0.0, 0.0, 50.0, 50.0]);
        assert_eq!(frames[3].target.trail.len(), 2);
    }
}
