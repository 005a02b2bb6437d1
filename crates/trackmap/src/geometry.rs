//! Core geometry types and the snapping primitives used by the map editor.
//!
//! Everything in this module is pure: no shared state, no side effects.
//! Distance comparisons work on *squared* distances so callers compare
//! against squared thresholds and never pay for a square root.
//!
//! ## Wire format
//!
//! Map files store points as `[x, y]` arrays and walls as `[[x1, y1], [x2, y2]]`.
//! The serde attributes below keep the Rust structs readable (`p.x`, `line.x1`)
//! while reading and writing that compact array form.

use serde::{Deserialize, Serialize};

use crate::error::TrackmapError;

/// A 2D point in map units.
///
/// Deserializes from any array with at least two numbers, so the 3-vectors
/// sent by the tracking backend read as their `x, y` components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A wall segment defined by two endpoints. Orientation matters: `x1, y1`
/// is the start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Point; 2]", into = "[Point; 2]")]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Axis-aligned rectangle. Used for obstacles and the map boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A closed region given by its vertices in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    pub outer: Vec<Point>,
}

/// The nearer endpoint of a line together with its squared distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndPointMatch {
    pub point: Point,
    pub dist_sqr: f64,
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        distance_sqr(*self, other).sqrt()
    }
}

impl TryFrom<Vec<f64>> for Point {
    type Error = TrackmapError;

    fn try_from(coords: Vec<f64>) -> Result<Self, Self::Error> {
        match coords.as_slice() {
            [x, y, ..] => Ok(Point::new(*x, *y)),
            _ => Err(TrackmapError::InvalidPoint(coords.len())),
        }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl Line {
    #[inline]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a line from its two endpoints.
    #[inline]
    pub fn from_points(start: Point, end: Point) -> Self {
        Self::new(start.x, start.y, end.x, end.y)
    }

    #[inline]
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    #[inline]
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Length of the line segment.
    #[inline]
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }

    /// Direction of the segment in radians, measured from +x towards +y.
    #[inline]
    pub fn angle(&self) -> f64 {
        (self.y2 - self.y1).atan2(self.x2 - self.x1)
    }
}

impl From<[Point; 2]> for Line {
    fn from([start, end]: [Point; 2]) -> Self {
        Line::from_points(start, end)
    }
}

impl From<Line> for [Point; 2] {
    fn from(line: Line) -> Self {
        [line.start(), line.end()]
    }
}

impl Rect {
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// The four corners starting at the origin: `(x, y)`, `(x + w, y)`,
    /// `(x + w, y + h)`, `(x, y + h)`. Clockwise on a y-down screen.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl Polygon {
    pub fn new(outer: Vec<Point>) -> Self {
        Self { outer }
    }

    /// Check if a point lies inside the polygon.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(point, &self.outer)
    }
}

impl From<Rect> for Polygon {
    fn from(rect: Rect) -> Self {
        Polygon::new(rect.corners().to_vec())
    }
}

// ============================================================================
// SNAPPING PRIMITIVES
// ============================================================================

/// Squared Euclidean distance between two points.
#[inline]
pub fn distance_sqr(a: Point, b: Point) -> f64 {
    (b.x - a.x) * (b.x - a.x) + (b.y - a.y) * (b.y - a.y)
}

/// Closest point to `point` on the *segment* `line`.
///
/// The projection parameter is clamped to `[0, 1]`, so a point beyond either
/// end maps onto that endpoint. A zero-length segment returns its start.
pub fn closest_point_on_line(point: Point, line: &Line) -> Point {
    let len_sqr = distance_sqr(line.start(), line.end());
    if len_sqr == 0.0 {
        return line.start();
    }

    let dx = line.x2 - line.x1;
    let dy = line.y2 - line.y1;

    let t = ((point.x - line.x1) * dx + (point.y - line.y1) * dy) / len_sqr;
    let t = t.clamp(0.0, 1.0);

    Point::new(line.x1 + t * dx, line.y1 + t * dy)
}

/// Whichever endpoint of `line` is nearer to `point`. Ties go to the end point.
pub fn closest_end_point(point: Point, line: &Line) -> EndPointMatch {
    let start_dist = distance_sqr(point, line.start());
    let end_dist = distance_sqr(point, line.end());
    if start_dist < end_dist {
        EndPointMatch { point: line.start(), dist_sqr: start_dist }
    } else {
        EndPointMatch { point: line.end(), dist_sqr: end_dist }
    }
}

/// Rounds an angle (in degrees) to the nearest multiple of `interval` degrees.
#[inline]
pub fn round_angle_to(angle: f64, interval: f64) -> f64 {
    (angle / interval).round() * interval
}

/// Rectangle spanned by two opposite corners, in either order.
///
/// The result is normalized: origin is the component-wise minimum and
/// width/height are never negative.
pub fn compute_rect(start: Point, end: Point) -> Rect {
    Rect {
        x: start.x.min(end.x),
        y: start.y.min(end.y),
        width: (start.x - end.x).abs(),
        height: (start.y - end.y).abs(),
    }
}

/// Inclusive point-in-rectangle test: points on any edge are inside.
#[inline]
pub fn contains_point(rect: &Rect, point: Point) -> bool {
    !(point.x < rect.x
        || point.y < rect.y
        || point.x > rect.x + rect.width
        || point.y > rect.y + rect.height)
}

/// Test if a point is inside a polygon using ray casting.
///
/// Casts a ray to the right and counts edge crossings.
/// Odd crossings = inside, even = outside.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);

        if ((yi > point.y) != (yj > point.y))
            && (point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi)
        {
            inside = !inside;
        }

        j = i;
    }

    inside
}

// ============================================================================
// TESTS
// ============================================================================
