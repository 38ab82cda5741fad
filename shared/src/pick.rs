use nalgebra::Vector3;

use crate::camera::PickRay;
use crate::{Point, Wall, WallId, WALL_HEIGHT, WALL_THICKNESS};

pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
        return p.distance_to(a);
    }
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Whether a plan-space point lies inside the wall's thin rectangle.
pub fn wall_contains_plan_point(wall: &Wall, point: Point) -> bool {
    distance_to_segment(point, wall.start, wall.end) <= WALL_THICKNESS / 2.0
}

/// Resolves the wall under a plan-space point. Walls are drawn in store
/// order, so the last match is the topmost one.
pub fn pick_wall_plan(walls: &[Wall], point: Point) -> Option<WallId> {
    walls
        .iter()
        .rev()
        .find(|wall| wall_contains_plan_point(wall, point))
        .map(|wall| wall.id)
}

/// Ray vs. the wall's extruded box, as a slab test in the wall's local
/// frame (x along the wall, y up, z across the thickness). Returns the
/// entry distance along the ray.
pub fn ray_hits_wall(ray: &PickRay, wall: &Wall) -> Option<f64> {
    let mid = wall.midpoint();
    let center = Vector3::new(mid.x, WALL_HEIGHT / 2.0, mid.y);

    // World -> local is a rotation about Y by +angle, undoing the box's
    // -angle placement rotation.
    let rotate = |v: Vector3<f64>| {
        let (sin, cos) = wall.angle.sin_cos();
        Vector3::new(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
    };
    let origin = rotate(ray.origin.coords - center);
    let dir = rotate(ray.dir);
    let half = [
        wall.length / 2.0,
        WALL_HEIGHT / 2.0,
        WALL_THICKNESS / 2.0,
    ];

    let mut t_min = 0.0_f64;
    let mut t_max = f64::INFINITY;
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < 1e-12 {
            if o.abs() > half[axis] {
                return None;
            }
            continue;
        }
        let t1 = (-half[axis] - o) / d;
        let t2 = (half[axis] - o) / d;
        let (near, far) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        t_min = t_min.max(near);
        t_max = t_max.min(far);
        if t_min > t_max {
            return None;
        }
    }
    Some(t_min)
}

/// Resolves the wall whose box the pick ray enters first.
pub fn pick_wall_solid(walls: &[Wall], ray: &PickRay) -> Option<WallId> {
    walls
        .iter()
        .filter_map(|wall| ray_hits_wall(ray, wall).map(|t| (t, wall.id)))
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WallStore;
    use nalgebra::Point3;

    fn store_with(segments: &[((f64, f64), (f64, f64))]) -> WallStore {
        let mut store = WallStore::new();
        for &((sx, sy), (ex, ey)) in segments {
            store
                .append(Point::new(sx, sy), Point::new(ex, ey))
                .unwrap();
        }
        store
    }

    #[test]
    fn plan_pick_hits_inside_the_thickness_band() {
        let store = store_with(&[((0.0, 0.0), (4.0, 0.0))]);
        let id = store.walls()[0].id;
        assert_eq!(pick_wall_plan(store.walls(), Point::new(2.0, 0.05)), Some(id));
        assert_eq!(pick_wall_plan(store.walls(), Point::new(2.0, 0.3)), None);
    }

    #[test]
    fn plan_pick_misses_past_the_end_cap() {
        let store = store_with(&[((0.0, 0.0), (4.0, 0.0))]);
        assert_eq!(pick_wall_plan(store.walls(), Point::new(4.5, 0.0)), None);
    }

    #[test]
    fn plan_pick_prefers_the_topmost_wall() {
        // Both walls cover the origin; the later one draws on top.
        let store = store_with(&[((-2.0, 0.0), (2.0, 0.0)), ((0.0, -2.0), (0.0, 2.0))]);
        let top = store.walls()[1].id;
        assert_eq!(pick_wall_plan(store.walls(), Point::new(0.0, 0.0)), Some(top));
    }

    #[test]
    fn vertical_ray_enters_the_box_roof() {
        let store = store_with(&[((-1.0, 0.0), (1.0, 0.0))]);
        let ray = PickRay {
            origin: Point3::new(0.0, 10.0, 0.0),
            dir: Vector3::new(0.0, -1.0, 0.0),
        };
        let t = ray_hits_wall(&ray, &store.walls()[0]).unwrap();
        approx::assert_relative_eq!(t, 10.0 - WALL_HEIGHT, epsilon = 1e-9);
    }

    #[test]
    fn vertical_ray_beside_the_box_misses() {
        let store = store_with(&[((-1.0, 0.0), (1.0, 0.0))]);
        let ray = PickRay {
            origin: Point3::new(0.0, 10.0, 1.0),
            dir: Vector3::new(0.0, -1.0, 0.0),
        };
        assert!(ray_hits_wall(&ray, &store.walls()[0]).is_none());
    }

    #[test]
    fn rotated_wall_is_hit_in_its_own_frame() {
        // Diagonal wall; a ray down onto its midpoint must still hit.
        let store = store_with(&[((0.0, 0.0), (2.0, 2.0))]);
        let ray = PickRay {
            origin: Point3::new(1.0, 10.0, 1.0),
            dir: Vector3::new(0.0, -1.0, 0.0),
        };
        assert!(ray_hits_wall(&ray, &store.walls()[0]).is_some());
    }

    #[test]
    fn solid_pick_returns_the_nearest_box() {
        let store = store_with(&[((-1.0, 4.0), (1.0, 4.0)), ((-1.0, 1.0), (1.0, 1.0))]);
        let near = store.walls()[1].id;
        let ray = PickRay {
            origin: Point3::new(0.0, 1.0, -5.0),
            dir: Vector3::new(0.0, 0.0, 1.0),
        };
        assert_eq!(pick_wall_solid(store.walls(), &ray), Some(near));
    }

    #[test]
    fn ray_from_inside_reports_zero_entry() {
        let store = store_with(&[((-1.0, 0.0), (1.0, 0.0))]);
        let ray = PickRay {
            origin: Point3::new(0.0, 1.0, 0.0),
            dir: Vector3::new(1.0, 0.0, 0.0),
        };
        assert_eq!(ray_hits_wall(&ray, &store.walls()[0]), Some(0.0));
    }
}
