use nalgebra::{Point3, Vector3};

use crate::Point;

/// Orthographic plan camera for the 2D view. Maps plan coordinates (x
/// right, y up) onto the canvas; at zoom 1.0 the viewport spans
/// `FRUSTUM_HEIGHT` world units vertically.
#[derive(Debug, Clone, Copy)]
pub struct PlanCamera {
    zoom: f64,
    viewport_w: f64,
    viewport_h: f64,
}

impl PlanCamera {
    pub const MIN_ZOOM: f64 = 0.1;
    pub const MAX_ZOOM: f64 = 10.0;
    pub const DEFAULT_ZOOM: f64 = 0.7;
    pub const FRUSTUM_HEIGHT: f64 = 10.0;

    pub fn new(viewport_w: f64, viewport_h: f64) -> Self {
        Self {
            zoom: Self::DEFAULT_ZOOM,
            viewport_w,
            viewport_h,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_w = width;
        self.viewport_h = height;
    }

    /// Multiplies the zoom level, clamped to [`MIN_ZOOM`](Self::MIN_ZOOM)
    /// .. [`MAX_ZOOM`](Self::MAX_ZOOM).
    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    /// Canonical framing: 100% zoom, origin centered.
    pub fn zoom_fit(&mut self) {
        self.zoom = 1.0;
    }

    fn pixels_per_unit(&self) -> f64 {
        self.viewport_h / Self::FRUSTUM_HEIGHT * self.zoom
    }

    pub fn world_to_screen(&self, point: Point) -> (f64, f64) {
        let scale = self.pixels_per_unit();
        (
            self.viewport_w / 2.0 + point.x * scale,
            self.viewport_h / 2.0 - point.y * scale,
        )
    }

    pub fn screen_to_world(&self, x: f64, y: f64) -> Point {
        let scale = self.pixels_per_unit();
        Point::new(
            (x - self.viewport_w / 2.0) / scale,
            (self.viewport_h / 2.0 - y) / scale,
        )
    }
}

/// A picking ray in 3D world space.
#[derive(Debug, Clone, Copy)]
pub struct PickRay {
    pub origin: Point3<f64>,
    pub dir: Vector3<f64>,
}

/// Perspective camera for the 3D view, orbiting the origin. The eye sits
/// at spherical (yaw, pitch) on a radius scaled by the zoom factor; up is
/// +Y and the plan's y axis maps to world z.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    yaw: f64,
    pitch: f64,
    zoom: f64,
    viewport_w: f64,
    viewport_h: f64,
}

impl OrbitCamera {
    pub const MIN_ZOOM: f64 = 0.5;
    pub const MAX_ZOOM: f64 = 5.0;
    pub const BASE_RADIUS: f64 = 20.0;
    pub const FOV_Y: f64 = 75.0 * std::f64::consts::PI / 180.0;
    pub const NEAR: f64 = 0.1;

    const DEFAULT_YAW: f64 = std::f64::consts::FRAC_PI_4;
    // Eye direction (1, 1, 1): elevation atan(1 / sqrt(2)).
    const DEFAULT_PITCH: f64 = 0.6154797086703873;
    // Polar angle is capped at the horizon, so the eye never dips below
    // the ground plane.
    const MIN_PITCH: f64 = 0.05;
    const MAX_PITCH: f64 = std::f64::consts::FRAC_PI_2 - 0.02;

    pub fn new(viewport_w: f64, viewport_h: f64) -> Self {
        Self {
            yaw: Self::DEFAULT_YAW,
            pitch: Self::DEFAULT_PITCH,
            zoom: 1.0,
            viewport_w,
            viewport_h,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_w = width;
        self.viewport_h = height;
    }

    /// Dollies the eye along its direction by scaling the orbit radius,
    /// with the zoom factor clamped to [`MIN_ZOOM`](Self::MIN_ZOOM) ..
    /// [`MAX_ZOOM`](Self::MAX_ZOOM).
    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    /// Canonical framing: default orbit angles at 100% zoom.
    pub fn zoom_fit(&mut self) {
        self.zoom = 1.0;
        self.yaw = Self::DEFAULT_YAW;
        self.pitch = Self::DEFAULT_PITCH;
    }

    pub fn orbit(&mut self, delta_yaw: f64, delta_pitch: f64) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(Self::MIN_PITCH, Self::MAX_PITCH);
    }

    pub fn radius(&self) -> f64 {
        Self::BASE_RADIUS / self.zoom
    }

    pub fn eye(&self) -> Point3<f64> {
        let r = self.radius();
        Point3::new(
            r * self.pitch.cos() * self.yaw.cos(),
            r * self.pitch.sin(),
            r * self.pitch.cos() * self.yaw.sin(),
        )
    }

    fn basis(&self) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        let eye = self.eye();
        let forward = (Point3::origin() - eye).normalize();
        let right = forward.cross(&Vector3::y()).normalize();
        let up = right.cross(&forward);
        (forward, right, up)
    }

    fn focal(&self) -> f64 {
        1.0 / (Self::FOV_Y / 2.0).tan()
    }

    fn aspect(&self) -> f64 {
        self.viewport_w / self.viewport_h
    }

    /// Distance along the view direction; painter sorting keys off this.
    pub fn depth_of(&self, point: Point3<f64>) -> f64 {
        let (forward, _, _) = self.basis();
        forward.dot(&(point - self.eye()))
    }

    /// Projects a world point to canvas pixels. Points behind the near
    /// plane are culled.
    pub fn project(&self, point: Point3<f64>) -> Option<(f64, f64)> {
        let (forward, right, up) = self.basis();
        let rel = point - self.eye();
        let depth = forward.dot(&rel);
        if depth < Self::NEAR {
            return None;
        }
        let x_ndc = self.focal() / self.aspect() * (right.dot(&rel) / depth);
        let y_ndc = self.focal() * (up.dot(&rel) / depth);
        Some((
            (1.0 + x_ndc) * 0.5 * self.viewport_w,
            (1.0 - y_ndc) * 0.5 * self.viewport_h,
        ))
    }

    /// The world-space ray through a canvas pixel, for object picking.
    pub fn pick_ray(&self, x: f64, y: f64) -> PickRay {
        let (forward, right, up) = self.basis();
        let x_ndc = 2.0 * x / self.viewport_w - 1.0;
        let y_ndc = 1.0 - 2.0 * y / self.viewport_h;
        let dir = (forward
            + right * (x_ndc * self.aspect() / self.focal())
            + up * (y_ndc / self.focal()))
        .normalize();
        PickRay {
            origin: self.eye(),
            dir,
        }
    }
}

/// Lifts a plan point into 3D world space at the given height. Plan y
/// becomes world z, matching the extruded-box placement.
pub fn lift(point: Point, height: f64) -> Point3<f64> {
    Point3::new(point.x, height, point.y)
}
