use web_sys::{CanvasPattern, CanvasRenderingContext2d, HtmlCanvasElement};

use wallboard_shared::camera::{OrbitCamera, PlanCamera};
use wallboard_shared::store::WallStore;
use wallboard_shared::{Point, WallId, DEFAULT_GRID_SIZE};

use crate::scene::{Scene2d, Scene3d};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    TwoD,
    ThreeD,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::TwoD => "2D View",
            ViewMode::ThreeD => "3D View",
        }
    }
}

pub enum DrawMode {
    Idle,
    Drawing { anchor: Point },
}

/// One gesture state machine shared by both views. The 3D view constructs
/// it inert, so its pointer handlers fall through without duplicating a
/// no-op session implementation.
pub struct DrawSession {
    pub mode: DrawMode,
    enabled: bool,
}

impl DrawSession {
    pub fn new() -> Self {
        Self {
            mode: DrawMode::Idle,
            enabled: true,
        }
    }

    pub fn inert() -> Self {
        Self {
            mode: DrawMode::Idle,
            enabled: false,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.mode, DrawMode::Drawing { .. })
    }

    /// Idle -> Drawing. Ignored while already drawing or when the session
    /// is inert; out-of-state events are not errors.
    pub fn begin(&mut self, anchor: Point) {
        if self.enabled && !self.is_drawing() {
            self.mode = DrawMode::Drawing { anchor };
        }
    }

    pub fn anchor(&self) -> Option<Point> {
        match self.mode {
            DrawMode::Drawing { anchor } => Some(anchor),
            DrawMode::Idle => None,
        }
    }

    /// Drawing -> Idle, handing back the anchor of the finished gesture.
    pub fn finish(&mut self) -> Option<Point> {
        let anchor = self.anchor();
        self.mode = DrawMode::Idle;
        anchor
    }
}

impl Default for DrawSession {
    fn default() -> Self {
        Self::new()
    }
}

/// In-flight orbit drag on the 3D view. `travel` accumulates pointer
/// distance so a drag that ends on a wall is not mistaken for a
/// click-to-delete.
pub struct OrbitDrag {
    pub last_x: f64,
    pub last_y: f64,
    pub travel: f64,
}

/// The 2D view controller: orthographic camera, plan scene, the drawing
/// session, hover bookkeeping and the snapping settings.
pub struct View2d {
    pub camera: PlanCamera,
    pub scene: Scene2d,
    pub session: DrawSession,
    pub hovered: Option<WallId>,
    pub preview: Option<(Point, Point)>,
    pub grid_size: f64,
    pub snap_enabled: bool,
    pub synced: Option<u64>,
}

impl View2d {
    pub fn new(viewport_w: f64, viewport_h: f64) -> Self {
        Self {
            camera: PlanCamera::new(viewport_w, viewport_h),
            scene: Scene2d::baseline(),
            session: DrawSession::new(),
            hovered: None,
            preview: None,
            grid_size: DEFAULT_GRID_SIZE,
            snap_enabled: true,
            synced: None,
        }
    }

    pub fn snap(&self, point: Point) -> Point {
        wallboard_shared::snap_to_grid(point, self.grid_size, self.snap_enabled)
    }
}

/// The 3D view controller: perspective orbit camera and the solid scene.
/// Its session is inert; the 3D view deletes but never draws.
pub struct View3d {
    pub camera: OrbitCamera,
    pub scene: Scene3d,
    pub session: DrawSession,
    pub drag: Option<OrbitDrag>,
    pub synced: Option<u64>,
}

impl View3d {
    pub fn new(viewport_w: f64, viewport_h: f64) -> Self {
        Self {
            camera: OrbitCamera::new(viewport_w, viewport_h),
            scene: Scene3d::baseline(),
            session: DrawSession::inert(),
            drag: None,
            synced: None,
        }
    }
}

pub struct State {
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub store: WallStore,
    pub view2d: View2d,
    pub view3d: View3d,
    pub active: ViewMode,
    pub width: f64,
    pub height: f64,
    pub wall_pattern: Option<CanvasPattern>,
    /// Set by a pointerup that should swallow the click the browser fires
    /// right after it (a committed wall in 2D, a real orbit drag in 3D).
    pub suppress_click: bool,
}
