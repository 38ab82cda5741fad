use wallboard_shared::store::WallStore;
use wallboard_shared::Wall;

pub const WALL_COLOR: &str = "#333333";
pub const HOVER_COLOR: &str = "#ff6600";
pub const PREVIEW_COLOR: &str = "#6666ff";
pub const BACKGROUND_2D: &str = "#f5f5f5";
pub const BACKGROUND_3D: &str = "#f0f0f0";
pub const GRID_MAJOR: &str = "#aaaaaa";
pub const GRID_MINOR: &str = "#dddddd";

pub const GRID_EXTENT: f64 = 40.0;
pub const GRID_DIVISIONS: u32 = 40;
pub const AXES_LENGTH: f64 = 10.0;

/// A wall's renderable in the plan view. Carries the originating wall
/// record (its id is the hit-test back-reference) and the current fill,
/// which hover swaps between the default and highlight colors.
pub struct WallSprite {
    pub wall: Wall,
    pub color: &'static str,
    pub default_color: &'static str,
}

/// Plan-scene members, tagged so rebuilds and clears can filter by kind
/// instead of inspecting runtime types.
pub enum Node2d {
    Grid,
    Wall(WallSprite),
}

pub struct Scene2d {
    pub nodes: Vec<Node2d>,
}

impl Scene2d {
    /// The fixed furniture every rebuild preserves: just the grid.
    pub fn baseline() -> Self {
        Self {
            nodes: vec![Node2d::Grid],
        }
    }

    pub fn reset_baseline(&mut self) {
        *self = Self::baseline();
    }

    /// Full rebuild from the store: wall sprites are discarded and
    /// reconstructed, furniture stays. No incremental diffing; wall counts
    /// are small and correctness wins.
    pub fn rebuild(&mut self, store: &WallStore) {
        self.nodes.retain(|node| !matches!(node, Node2d::Wall(_)));
        for wall in store.walls() {
            self.nodes.push(Node2d::Wall(WallSprite {
                wall: *wall,
                color: WALL_COLOR,
                default_color: WALL_COLOR,
            }));
        }
    }

    pub fn wall_sprites(&self) -> impl Iterator<Item = &WallSprite> {
        self.nodes.iter().filter_map(|node| match node {
            Node2d::Wall(sprite) => Some(sprite),
            _ => None,
        })
    }

    pub fn wall_sprites_mut(&mut self) -> impl Iterator<Item = &mut WallSprite> {
        self.nodes.iter_mut().filter_map(|node| match node {
            Node2d::Wall(sprite) => Some(sprite),
            _ => None,
        })
    }

    pub fn wall_count(&self) -> usize {
        self.wall_sprites().count()
    }

    pub fn remove_wall(&mut self, id: wallboard_shared::WallId) {
        self.nodes
            .retain(|node| !matches!(node, Node2d::Wall(sprite) if sprite.wall.id == id));
    }
}

/// A wall's renderable in the 3D view: the extruded box placement is fully
/// derived from the wall record at draw time.
pub struct WallSolid {
    pub wall: Wall,
}

/// Solid-scene members. Lights and helpers are scene furniture like the
/// grid, so a store clear can reset to baseline without losing them.
pub enum Node3d {
    Grid,
    Axes,
    AmbientLight { intensity: f64 },
    DirectionalLight { intensity: f64, direction: [f64; 3] },
    Wall(WallSolid),
}

pub struct Scene3d {
    pub nodes: Vec<Node3d>,
}

impl Scene3d {
    /// Grid, ambient light, directional light and the axes helper; the
    /// light placement mirrors the eye's home diagonal.
    pub fn baseline() -> Self {
        Self {
            nodes: vec![
                Node3d::Grid,
                Node3d::AmbientLight { intensity: 0.5 },
                Node3d::DirectionalLight {
                    intensity: 0.8,
                    direction: [-1.0, -1.0, -1.0],
                },
                Node3d::Axes,
            ],
        }
    }

    pub fn reset_baseline(&mut self) {
        *self = Self::baseline();
    }

    pub fn rebuild(&mut self, store: &WallStore) {
        self.nodes.retain(|node| !matches!(node, Node3d::Wall(_)));
        for wall in store.walls() {
            self.nodes.push(Node3d::Wall(WallSolid { wall: *wall }));
        }
    }

    pub fn wall_solids(&self) -> impl Iterator<Item = &WallSolid> {
        self.nodes.iter().filter_map(|node| match node {
            Node3d::Wall(solid) => Some(solid),
            _ => None,
        })
    }

    pub fn wall_count(&self) -> usize {
        self.wall_solids().count()
    }

    pub fn remove_wall(&mut self, id: wallboard_shared::WallId) {
        self.nodes
            .retain(|node| !matches!(node, Node3d::Wall(solid) if solid.wall.id == id));
    }

    pub fn lighting(&self) -> (f64, f64, [f64; 3]) {
        let mut ambient = 0.0;
        let mut diffuse = 0.0;
        let mut direction = [0.0, -1.0, 0.0];
        for node in &self.nodes {
            match node {
                Node3d::AmbientLight { intensity } => ambient = *intensity,
                Node3d::DirectionalLight {
                    intensity,
                    direction: dir,
                } => {
                    diffuse = *intensity;
                    direction = *dir;
                }
                _ => {}
            }
        }
        (ambient, diffuse, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallboard_shared::Point;

    fn store_with_walls(count: usize) -> WallStore {
        let mut store = WallStore::new();
        for i in 0..count {
            let y = i as f64;
            store
                .append(Point::new(0.0, y), Point::new(2.0, y))
                .unwrap();
        }
        store
    }

    #[test]
    fn rebuild_mirrors_the_store_exactly() {
        let store = store_with_walls(3);
        let mut scene = Scene2d::baseline();
        scene.rebuild(&store);
        let ids: Vec<_> = scene.wall_sprites().map(|s| s.wall.id).collect();
        let expected: Vec<_> = store.walls().iter().map(|w| w.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn rebuild_is_not_cumulative() {
        let store = store_with_walls(2);
        let mut scene = Scene3d::baseline();
        scene.rebuild(&store);
        scene.rebuild(&store);
        assert_eq!(scene.wall_count(), 2);
    }

    #[test]
    fn rebuild_resets_hover_colors() {
        let store = store_with_walls(1);
        let mut scene = Scene2d::baseline();
        scene.rebuild(&store);
        scene.wall_sprites_mut().for_each(|s| s.color = HOVER_COLOR);
        scene.rebuild(&store);
        assert!(scene.wall_sprites().all(|s| s.color == WALL_COLOR));
    }

    #[test]
    fn solid_baseline_furniture_survives_rebuilds_and_clear() {
        let mut store = store_with_walls(2);
        let mut scene = Scene3d::baseline();
        scene.rebuild(&store);
        store.clear();
        scene.reset_baseline();
        scene.rebuild(&store);

        assert_eq!(scene.wall_count(), 0);
        assert!(scene.nodes.iter().any(|n| matches!(n, Node3d::Grid)));
        assert!(scene.nodes.iter().any(|n| matches!(n, Node3d::Axes)));
        assert!(scene
            .nodes
            .iter()
            .any(|n| matches!(n, Node3d::AmbientLight { .. })));
        assert!(scene
            .nodes
            .iter()
            .any(|n| matches!(n, Node3d::DirectionalLight { .. })));
    }

    #[test]
    fn plan_grid_survives_rebuilds() {
        let store = store_with_walls(1);
        let mut scene = Scene2d::baseline();
        scene.rebuild(&store);
        assert!(scene.nodes.iter().any(|n| matches!(n, Node2d::Grid)));
    }
}
