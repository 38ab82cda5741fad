pub mod camera;
pub mod pick;
pub mod store;

/// Plan-view world coordinates, in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Stable identity of a wall, assigned by the store at creation and used
/// for scene back-references and deletion lookup. Comparing raw endpoint
/// coordinates instead would make delete-matching hostage to float
/// equality the moment snapping changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WallId(pub u64);

/// Derived polar form of a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub angle: f64,
    pub length: f64,
}

/// A committed wall. Immutable once created; `angle` and `length` are
/// cached at creation and stay consistent with the endpoints by
/// construction. The store never holds a wall with `length == 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wall {
    pub id: WallId,
    pub start: Point,
    pub end: Point,
    pub angle: f64,
    pub length: f64,
}

impl Wall {
    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }
}

/// Walls shorter than this are treated as accidental clicks and never
/// committed.
pub const MIN_WALL_LENGTH: f64 = 0.5;

/// Planar thickness of a wall, in world units.
pub const WALL_THICKNESS: f64 = 0.2;

/// Extrusion height of a wall in the 3D view.
pub const WALL_HEIGHT: f64 = 2.5;

/// Default snapping pitch of the plan grid.
pub const DEFAULT_GRID_SIZE: f64 = 0.5;

/// Rounds each coordinate independently to the nearest multiple of
/// `grid_size`. Passing `enabled = false` returns the point unchanged.
pub fn snap_to_grid(point: Point, grid_size: f64, enabled: bool) -> Point {
    if !enabled {
        return point;
    }
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Length and signed angle (atan2 convention, range (-pi, pi]) of the
/// segment from `start` to `end`. A degenerate segment yields
/// `{ angle: 0, length: 0 }`; callers must not persist it.
pub fn segment(start: Point, end: Point) -> Segment {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dx == 0.0 && dy == 0.0 {
        return Segment {
            angle: 0.0,
            length: 0.0,
        };
    }
    Segment {
        angle: dy.atan2(dx),
        length: (dx * dx + dy * dy).sqrt(),
    }
}
