use crate::{segment, Point, Wall, WallId};

/// The single source of truth both views read. Insertion order is creation
/// order; geometry does not depend on it. Only the draw-session commit,
/// click-to-delete, and the clear commands mutate the store, and every
/// mutation bumps `revision` so the view synchronizer can tell which scenes
/// are stale.
#[derive(Debug, Default)]
pub struct WallStore {
    walls: Vec<Wall>,
    next_id: u64,
    revision: u64,
}

impl WallStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    /// Monotonic change counter. Bumped once per mutation, including
    /// `clear` on an already-empty store.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: WallId) -> Option<&Wall> {
        self.walls.iter().find(|wall| wall.id == id)
    }

    /// Derives angle/length, assigns a fresh id and appends. Degenerate
    /// segments are refused so the `length > 0` invariant holds for every
    /// stored wall.
    pub fn append(&mut self, start: Point, end: Point) -> Option<WallId> {
        let seg = segment(start, end);
        if seg.length == 0.0 {
            return None;
        }
        let id = WallId(self.next_id);
        self.next_id += 1;
        self.walls.push(Wall {
            id,
            start,
            end,
            angle: seg.angle,
            length: seg.length,
        });
        self.revision += 1;
        Some(id)
    }

    /// Removes the wall with the given id, returning it. A miss is not an
    /// error; the caller decides whether to fall back or drop the request.
    pub fn remove(&mut self, id: WallId) -> Option<Wall> {
        let index = self.walls.iter().position(|wall| wall.id == id)?;
        let wall = self.walls.remove(index);
        self.revision += 1;
        Some(wall)
    }

    /// Exact structural match on both endpoints. Fallback path only: ids
    /// are the deletion identity, but a stale scene back-reference can
    /// still be resolved through the coordinates it was built from.
    pub fn find_by_endpoints(&self, start: Point, end: Point) -> Option<WallId> {
        self.walls
            .iter()
            .find(|wall| wall.start == start && wall.end == end)
            .map(|wall| wall.id)
    }

    pub fn clear(&mut self) {
        self.walls.clear();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn append_assigns_ids_in_creation_order() {
        let mut store = WallStore::new();
        let a = store.append(p(0.0, 0.0), p(1.0, 0.0)).unwrap();
        let b = store.append(p(1.0, 0.0), p(1.0, 2.0)).unwrap();
        assert!(a < b);
        assert_eq!(store.walls()[0].id, a);
        assert_eq!(store.walls()[1].id, b);
    }

    #[test]
    fn append_refuses_degenerate_segments() {
        let mut store = WallStore::new();
        assert_eq!(store.append(p(1.0, 1.0), p(1.0, 1.0)), None);
        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn every_mutation_bumps_revision_once() {
        let mut store = WallStore::new();
        let id = store.append(p(0.0, 0.0), p(2.0, 0.0)).unwrap();
        assert_eq!(store.revision(), 1);
        store.remove(id);
        assert_eq!(store.revision(), 2);
        store.clear();
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn remove_middle_preserves_order() {
        let mut store = WallStore::new();
        let a = store.append(p(0.0, 0.0), p(1.0, 0.0)).unwrap();
        let b = store.append(p(0.0, 1.0), p(1.0, 1.0)).unwrap();
        let c = store.append(p(0.0, 2.0), p(1.0, 2.0)).unwrap();
        assert!(store.remove(b).is_some());
        let ids: Vec<_> = store.walls().iter().map(|wall| wall.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn remove_unknown_id_is_a_noop() {
        let mut store = WallStore::new();
        store.append(p(0.0, 0.0), p(1.0, 0.0));
        let before = store.revision();
        assert!(store.remove(WallId(999)).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn endpoint_lookup_finds_the_structural_match() {
        let mut store = WallStore::new();
        store.append(p(0.0, 0.0), p(1.0, 0.0));
        let b = store.append(p(0.0, 1.0), p(3.0, 1.0)).unwrap();
        assert_eq!(store.find_by_endpoints(p(0.0, 1.0), p(3.0, 1.0)), Some(b));
        assert_eq!(store.find_by_endpoints(p(0.0, 1.0), p(3.0, 1.5)), None);
    }

    #[test]
    fn cached_fields_match_endpoints() {
        let mut store = WallStore::new();
        let id = store.append(p(0.0, 0.0), p(3.0, 4.0)).unwrap();
        let wall = store.get(id).unwrap();
        assert_eq!(wall.length, 5.0);
        assert_eq!(wall.angle, 4.0_f64.atan2(3.0));
    }
}
