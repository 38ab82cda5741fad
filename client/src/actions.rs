use wallboard_shared::camera::PickRay;
use wallboard_shared::pick::{pick_wall_plan, pick_wall_solid};
use wallboard_shared::store::WallStore;
use wallboard_shared::{segment, Point, Wall, WallId, MIN_WALL_LENGTH};

use crate::scene::HOVER_COLOR;
use crate::state::{View2d, View3d};

/// Idle -> Drawing on the 2D session: snap the pressed point and remember
/// it as the gesture anchor. No store effect.
pub fn pointer_down(view: &mut View2d, world: Point) {
    let snapped = view.snap(world);
    view.session.begin(snapped);
}

/// While drawing, replace the live preview with the segment from the
/// anchor to the snapped cursor. Returns false (and leaves no preview
/// behind) outside a drawing gesture.
pub fn pointer_move(view: &mut View2d, world: Point) -> bool {
    let Some(anchor) = view.session.anchor() else {
        return false;
    };
    view.preview = Some((anchor, view.snap(world)));
    true
}

/// Ends the gesture: preview dropped, anchor cleared, session back to
/// Idle. The wall is committed only past the anti-accidental-click
/// threshold; the committed record is handed back for the UI labels.
pub fn pointer_up(view: &mut View2d, store: &mut WallStore, world: Point) -> Option<Wall> {
    let snapped = view.snap(world);
    view.preview = None;
    let anchor = view.session.finish()?;
    if segment(anchor, snapped).length <= MIN_WALL_LENGTH {
        return None;
    }
    let id = store.append(anchor, snapped)?;
    store.get(id).copied()
}

/// Synchronous walls-changed fan-out: every view whose scene lags the
/// store revision gets one full rebuild, before the caller returns to the
/// event loop. Returns which views actually rebuilt.
pub fn sync_views(store: &WallStore, view2d: &mut View2d, view3d: &mut View3d) -> (bool, bool) {
    let revision = Some(store.revision());
    let stale_2d = view2d.synced != revision;
    if stale_2d {
        view2d.scene.rebuild(store);
        // Rebuilt sprites come back in the default color; hover
        // re-resolves on the next pointer move.
        view2d.hovered = None;
        view2d.synced = revision;
    }
    let stale_3d = view3d.synced != revision;
    if stale_3d {
        view3d.scene.rebuild(store);
        view3d.synced = revision;
    }
    (stale_2d, stale_3d)
}

/// Re-resolves the hover target on a plan pointer move. At most one wall
/// carries the highlight; the previous one is restored to its recorded
/// default. Returns whether anything changed. No-op mid-gesture.
pub fn hover_plan(view: &mut View2d, world: Point) -> bool {
    if view.session.is_drawing() {
        return false;
    }
    let walls: Vec<Wall> = view.scene.wall_sprites().map(|s| s.wall).collect();
    let hit = pick_wall_plan(&walls, world);
    if hit == view.hovered {
        return false;
    }
    if let Some(previous) = view.hovered.take() {
        for sprite in view.scene.wall_sprites_mut() {
            if sprite.wall.id == previous {
                sprite.color = sprite.default_color;
            }
        }
    }
    if let Some(id) = hit {
        for sprite in view.scene.wall_sprites_mut() {
            if sprite.wall.id == id {
                sprite.color = HOVER_COLOR;
            }
        }
    }
    view.hovered = hit;
    true
}

pub enum DeleteOutcome {
    /// Renderable and store record removed, views re-synced.
    Removed(Wall),
    /// The renderable pointed at a record the store no longer has, and the
    /// structural endpoint fallback missed too. Scene removal stands;
    /// the store is untouched. Diagnostic, not an error.
    Stale,
    /// Nothing under the pointer.
    Miss,
}

/// Click-to-delete in the 2D view.
pub fn delete_at_plan(
    store: &mut WallStore,
    view2d: &mut View2d,
    view3d: &mut View3d,
    world: Point,
) -> DeleteOutcome {
    let walls: Vec<Wall> = view2d.scene.wall_sprites().map(|s| s.wall).collect();
    match pick_wall_plan(&walls, world) {
        Some(id) => {
            let renderable = walls.iter().find(|w| w.id == id).copied();
            remove_wall(store, view2d, view3d, id, renderable)
        }
        None => DeleteOutcome::Miss,
    }
}

/// Click-to-delete in the 3D view, through the pick ray.
pub fn delete_at_solid(
    store: &mut WallStore,
    view2d: &mut View2d,
    view3d: &mut View3d,
    ray: &PickRay,
) -> DeleteOutcome {
    let walls: Vec<Wall> = view3d.scene.wall_solids().map(|s| s.wall).collect();
    match pick_wall_solid(&walls, ray) {
        Some(id) => {
            let renderable = walls.iter().find(|w| w.id == id).copied();
            remove_wall(store, view2d, view3d, id, renderable)
        }
        None => DeleteOutcome::Miss,
    }
}

fn remove_wall(
    store: &mut WallStore,
    view2d: &mut View2d,
    view3d: &mut View3d,
    id: WallId,
    renderable: Option<Wall>,
) -> DeleteOutcome {
    // The renderable goes first, the store record second; the rebuild that
    // follows makes the scenes authoritative again either way.
    view2d.scene.remove_wall(id);
    view3d.scene.remove_wall(id);
    if view2d.hovered == Some(id) {
        view2d.hovered = None;
    }

    let removed = store.remove(id).or_else(|| {
        // Stale back-reference: fall back to the endpoints the renderable
        // was built from.
        let wall = renderable?;
        let fallback = store.find_by_endpoints(wall.start, wall.end)?;
        store.remove(fallback)
    });
    match removed {
        Some(wall) => {
            sync_views(store, view2d, view3d);
            DeleteOutcome::Removed(wall)
        }
        None => DeleteOutcome::Stale,
    }
}

/// Empties the store and resets both scenes to their furniture baseline
/// before the rebuild, so a full clear cannot swallow grid, lights or
/// axes.
pub fn clear_walls(store: &mut WallStore, view2d: &mut View2d, view3d: &mut View3d) {
    store.clear();
    view2d.scene.reset_baseline();
    view2d.hovered = None;
    view2d.preview = None;
    view3d.scene.reset_baseline();
    sync_views(store, view2d, view3d);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Node3d, WALL_COLOR};
    fn ray_down_onto(x: f64, z: f64) -> PickRay {
        PickRay {
            origin: nalgebra::Point3::new(x, 50.0, z),
            dir: nalgebra::Vector3::new(0.0, -1.0, 0.0),
        }
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn fresh() -> (WallStore, View2d, View3d) {
        (
            WallStore::new(),
            View2d::new(800.0, 600.0),
            View3d::new(800.0, 600.0),
        )
    }

    fn drag(view: &mut View2d, store: &mut WallStore, from: Point, to: Point) -> Option<Wall> {
        pointer_down(view, from);
        pointer_move(view, to);
        pointer_up(view, store, to)
    }

    #[test]
    fn short_drag_is_discarded() {
        let (mut store, mut view2d, _view3d) = fresh();
        view2d.snap_enabled = false;
        let committed = drag(&mut view2d, &mut store, p(0.0, 0.0), p(0.0, 0.4));
        assert!(committed.is_none());
        assert!(store.is_empty());
        assert!(view2d.preview.is_none());
        assert!(!view2d.session.is_drawing());
    }

    #[test]
    fn long_drag_commits_exactly_one_wall() {
        let (mut store, mut view2d, _view3d) = fresh();
        view2d.snap_enabled = false;
        let committed = drag(&mut view2d, &mut store, p(0.0, 0.0), p(0.0, 0.6)).unwrap();
        assert_eq!(store.len(), 1);
        assert!((committed.length - 0.6).abs() < 1e-9);
        assert!(view2d.preview.is_none());
    }

    #[test]
    fn pointer_down_snaps_the_anchor() {
        let (_store, mut view2d, _view3d) = fresh();
        pointer_down(&mut view2d, p(1.3, -0.7));
        assert_eq!(view2d.session.anchor(), Some(p(1.5, -0.5)));
    }

    #[test]
    fn move_outside_a_gesture_leaves_no_preview() {
        let (_store, mut view2d, _view3d) = fresh();
        assert!(!pointer_move(&mut view2d, p(1.0, 1.0)));
        assert!(view2d.preview.is_none());
    }

    #[test]
    fn preview_tracks_the_snapped_cursor() {
        let (_store, mut view2d, _view3d) = fresh();
        pointer_down(&mut view2d, p(0.0, 0.0));
        pointer_move(&mut view2d, p(2.2, 0.1));
        assert_eq!(view2d.preview, Some((p(0.0, 0.0), p(2.0, 0.0))));
        pointer_move(&mut view2d, p(3.1, 0.1));
        assert_eq!(view2d.preview, Some((p(0.0, 0.0), p(3.0, 0.0))));
    }

    #[test]
    fn inert_session_never_enters_drawing() {
        let (_store, _view2d, mut view3d) = fresh();
        view3d.session.begin(p(0.0, 0.0));
        assert!(!view3d.session.is_drawing());
        assert!(view3d.session.finish().is_none());
    }

    #[test]
    fn one_append_rebuilds_each_view_exactly_once() {
        let (mut store, mut view2d, mut view3d) = fresh();
        sync_views(&store, &mut view2d, &mut view3d);

        store.append(p(0.0, 0.0), p(3.0, 0.0)).unwrap();
        assert_eq!(sync_views(&store, &mut view2d, &mut view3d), (true, true));
        assert_eq!(view2d.scene.wall_count(), 1);
        assert_eq!(view3d.scene.wall_count(), 1);

        // No further mutation, no further rebuilds.
        assert_eq!(sync_views(&store, &mut view2d, &mut view3d), (false, false));
    }

    #[test]
    fn deletion_round_trip_by_endpoints() {
        let (mut store, mut view2d, mut view3d) = fresh();
        let a = store.append(p(0.0, 0.0), p(2.0, 0.0)).unwrap();
        store.append(p(0.0, 1.0), p(2.0, 1.0)).unwrap();
        let c = store.append(p(0.0, 2.0), p(2.0, 2.0)).unwrap();
        sync_views(&store, &mut view2d, &mut view3d);

        // B is identified the way a UI would: by where it is.
        let b = store.find_by_endpoints(p(0.0, 1.0), p(2.0, 1.0)).unwrap();
        let outcome = delete_at_plan(&mut store, &mut view2d, &mut view3d, p(1.0, 1.0));
        assert!(matches!(outcome, DeleteOutcome::Removed(wall) if wall.id == b));

        let ids: Vec<_> = store.walls().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(view2d.scene.wall_count(), 2);
        assert_eq!(view3d.scene.wall_count(), 2);
    }

    #[test]
    fn solid_delete_through_the_pick_ray() {
        let (mut store, mut view2d, mut view3d) = fresh();
        store.append(p(-1.0, 0.0), p(1.0, 0.0)).unwrap();
        sync_views(&store, &mut view2d, &mut view3d);

        let outcome = delete_at_solid(&mut store, &mut view2d, &mut view3d, &ray_down_onto(0.0, 0.0));
        assert!(matches!(outcome, DeleteOutcome::Removed(_)));
        assert!(store.is_empty());
        assert_eq!(view3d.scene.wall_count(), 0);
    }

    #[test]
    fn delete_on_empty_space_is_a_miss() {
        let (mut store, mut view2d, mut view3d) = fresh();
        store.append(p(0.0, 0.0), p(2.0, 0.0)).unwrap();
        sync_views(&store, &mut view2d, &mut view3d);
        let outcome = delete_at_plan(&mut store, &mut view2d, &mut view3d, p(10.0, 10.0));
        assert!(matches!(outcome, DeleteOutcome::Miss));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn stale_renderable_falls_back_to_endpoint_match() {
        let (mut store, mut view2d, mut view3d) = fresh();
        let old = store.append(p(0.0, 0.0), p(2.0, 0.0)).unwrap();
        sync_views(&store, &mut view2d, &mut view3d);

        // The store record is replaced behind the scene's back; the sprite
        // now carries a dead id but live coordinates.
        store.remove(old);
        store.append(p(0.0, 0.0), p(2.0, 0.0)).unwrap();

        let outcome = delete_at_plan(&mut store, &mut view2d, &mut view3d, p(1.0, 0.0));
        assert!(matches!(outcome, DeleteOutcome::Removed(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn hover_highlights_at_most_one_wall() {
        let (mut store, mut view2d, mut view3d) = fresh();
        store.append(p(0.0, 0.0), p(2.0, 0.0)).unwrap();
        store.append(p(0.0, 1.0), p(2.0, 1.0)).unwrap();
        sync_views(&store, &mut view2d, &mut view3d);

        assert!(hover_plan(&mut view2d, p(1.0, 0.0)));
        let highlighted = |view: &View2d| {
            view.scene
                .wall_sprites()
                .filter(|s| s.color == HOVER_COLOR)
                .count()
        };
        assert_eq!(highlighted(&view2d), 1);

        assert!(hover_plan(&mut view2d, p(1.0, 1.0)));
        assert_eq!(highlighted(&view2d), 1);

        // Off all walls: highlight restored everywhere.
        assert!(hover_plan(&mut view2d, p(10.0, 10.0)));
        assert_eq!(highlighted(&view2d), 0);
        assert!(view2d.scene.wall_sprites().all(|s| s.color == WALL_COLOR));
        assert_eq!(view2d.hovered, None);
    }

    #[test]
    fn hover_is_suppressed_while_drawing() {
        let (mut store, mut view2d, _view3d) = fresh();
        store.append(p(0.0, 0.0), p(2.0, 0.0)).unwrap();
        view2d.scene.rebuild(&store);
        pointer_down(&mut view2d, p(5.0, 5.0));
        assert!(!hover_plan(&mut view2d, p(1.0, 0.0)));
        assert_eq!(view2d.hovered, None);
    }

    #[test]
    fn clear_empties_walls_and_keeps_furniture() {
        let (mut store, mut view2d, mut view3d) = fresh();
        store.append(p(0.0, 0.0), p(2.0, 0.0)).unwrap();
        sync_views(&store, &mut view2d, &mut view3d);
        hover_plan(&mut view2d, p(1.0, 0.0));

        clear_walls(&mut store, &mut view2d, &mut view3d);
        assert!(store.is_empty());
        assert_eq!(view2d.scene.wall_count(), 0);
        assert_eq!(view3d.scene.wall_count(), 0);
        assert_eq!(view2d.hovered, None);
        assert!(view3d
            .scene
            .nodes
            .iter()
            .any(|n| matches!(n, Node3d::DirectionalLight { .. })));
    }
}
