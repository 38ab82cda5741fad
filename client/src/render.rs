use nalgebra::{Point3, Vector3};
use web_sys::{CanvasPattern, CanvasRenderingContext2d};

use wallboard_shared::camera::{lift, OrbitCamera, PlanCamera};
use wallboard_shared::{segment, Point, Wall, WALL_HEIGHT, WALL_THICKNESS};

use crate::scene::{
    Node2d, Node3d, AXES_LENGTH, BACKGROUND_2D, BACKGROUND_3D, GRID_DIVISIONS, GRID_EXTENT,
    GRID_MAJOR, GRID_MINOR, PREVIEW_COLOR,
};
use crate::state::{State, View2d, View3d, ViewMode};

// Flat fill of the extruded boxes when the wall texture is unavailable;
// the directional light scales it per face.
const WALL_BASE_RGB: [f64; 3] = [205.0, 199.0, 189.0];

pub fn render(state: &mut State) {
    match state.active {
        ViewMode::TwoD => render_plan(&state.ctx, &state.view2d, state.width, state.height),
        ViewMode::ThreeD => render_solid(
            &state.ctx,
            &state.view3d,
            state.width,
            state.height,
            state.wall_pattern.as_ref(),
        ),
    }
}

fn fill_quad(ctx: &CanvasRenderingContext2d, quad: &[(f64, f64); 4]) {
    ctx.begin_path();
    ctx.move_to(quad[0].0, quad[0].1);
    for corner in &quad[1..] {
        ctx.line_to(corner.0, corner.1);
    }
    ctx.close_path();
    ctx.fill();
}

fn stroke_line(ctx: &CanvasRenderingContext2d, from: (f64, f64), to: (f64, f64)) {
    ctx.begin_path();
    ctx.move_to(from.0, from.1);
    ctx.line_to(to.0, to.1);
    ctx.stroke();
}

pub fn render_plan(ctx: &CanvasRenderingContext2d, view: &View2d, width: f64, height: f64) {
    ctx.set_fill_style_str(BACKGROUND_2D);
    ctx.fill_rect(0.0, 0.0, width, height);

    for node in &view.scene.nodes {
        match node {
            Node2d::Grid => draw_plan_grid(ctx, &view.camera),
            Node2d::Wall(sprite) => {
                draw_plan_wall(ctx, &view.camera, &sprite.wall, sprite.color)
            }
        }
    }

    if let Some((start, end)) = view.preview {
        let seg = segment(start, end);
        if seg.length > 0.0 {
            draw_plan_rect(ctx, &view.camera, start, end, seg.angle, seg.length, PREVIEW_COLOR);
        }
    }
}

fn draw_plan_grid(ctx: &CanvasRenderingContext2d, camera: &PlanCamera) {
    let half = GRID_EXTENT / 2.0;
    let step = GRID_EXTENT / GRID_DIVISIONS as f64;
    ctx.set_line_width(1.0);
    for i in 0..=GRID_DIVISIONS {
        let coord = -half + i as f64 * step;
        let color = if i == GRID_DIVISIONS / 2 {
            GRID_MAJOR
        } else {
            GRID_MINOR
        };
        ctx.set_stroke_style_str(color);
        stroke_line(
            ctx,
            camera.world_to_screen(Point::new(coord, -half)),
            camera.world_to_screen(Point::new(coord, half)),
        );
        stroke_line(
            ctx,
            camera.world_to_screen(Point::new(-half, coord)),
            camera.world_to_screen(Point::new(half, coord)),
        );
    }
}

fn draw_plan_wall(ctx: &CanvasRenderingContext2d, camera: &PlanCamera, wall: &Wall, color: &str) {
    draw_plan_rect(ctx, camera, wall.start, wall.end, wall.angle, wall.length, color);
}

/// A wall as the plan sees it: a thin rectangle centered on the segment
/// midpoint, rotated by its angle.
fn draw_plan_rect(
    ctx: &CanvasRenderingContext2d,
    camera: &PlanCamera,
    start: Point,
    end: Point,
    angle: f64,
    length: f64,
    color: &str,
) {
    let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
    let (sin, cos) = angle.sin_cos();
    let along = (cos * length / 2.0, sin * length / 2.0);
    let across = (-sin * WALL_THICKNESS / 2.0, cos * WALL_THICKNESS / 2.0);
    let corner = |sa: f64, sc: f64| {
        camera.world_to_screen(Point::new(
            mid.x + sa * along.0 + sc * across.0,
            mid.y + sa * along.1 + sc * across.1,
        ))
    };
    ctx.set_fill_style_str(color);
    fill_quad(ctx, &[corner(1.0, 1.0), corner(1.0, -1.0), corner(-1.0, -1.0), corner(-1.0, 1.0)]);
}

pub fn render_solid(
    ctx: &CanvasRenderingContext2d,
    view: &View3d,
    width: f64,
    height: f64,
    pattern: Option<&CanvasPattern>,
) {
    ctx.set_fill_style_str(BACKGROUND_3D);
    ctx.fill_rect(0.0, 0.0, width, height);

    let (ambient, diffuse, light_dir) = view.scene.lighting();

    for node in &view.scene.nodes {
        match node {
            Node3d::Grid => draw_solid_grid(ctx, &view.camera),
            Node3d::Axes => draw_axes(ctx, &view.camera),
            _ => {}
        }
    }

    // Painter's order: farthest wall first, keyed on camera-space midpoint
    // depth.
    let mut walls: Vec<(&Wall, f64)> = view
        .scene
        .wall_solids()
        .map(|solid| {
            let mid = solid.wall.midpoint();
            let depth = view.camera.depth_of(lift(mid, WALL_HEIGHT / 2.0));
            (&solid.wall, depth)
        })
        .collect();
    walls.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    for (wall, _) in walls {
        draw_wall_box(ctx, &view.camera, wall, pattern, ambient, diffuse, light_dir);
    }
}

fn draw_solid_grid(ctx: &CanvasRenderingContext2d, camera: &OrbitCamera) {
    let half = GRID_EXTENT / 2.0;
    let step = GRID_EXTENT / GRID_DIVISIONS as f64;
    ctx.set_line_width(1.0);
    for i in 0..=GRID_DIVISIONS {
        let coord = -half + i as f64 * step;
        let color = if i == GRID_DIVISIONS / 2 {
            GRID_MAJOR
        } else {
            GRID_MINOR
        };
        ctx.set_stroke_style_str(color);
        project_line(
            ctx,
            camera,
            Point3::new(coord, 0.0, -half),
            Point3::new(coord, 0.0, half),
        );
        project_line(
            ctx,
            camera,
            Point3::new(-half, 0.0, coord),
            Point3::new(half, 0.0, coord),
        );
    }
}

fn draw_axes(ctx: &CanvasRenderingContext2d, camera: &OrbitCamera) {
    let origin = Point3::origin();
    let axes = [
        (Point3::new(AXES_LENGTH, 0.0, 0.0), "#ff0000"),
        (Point3::new(0.0, AXES_LENGTH, 0.0), "#00ff00"),
        (Point3::new(0.0, 0.0, AXES_LENGTH), "#0000ff"),
    ];
    ctx.set_line_width(2.0);
    for (tip, color) in axes {
        ctx.set_stroke_style_str(color);
        project_line(ctx, camera, origin, tip);
    }
}

fn project_line(
    ctx: &CanvasRenderingContext2d,
    camera: &OrbitCamera,
    from: Point3<f64>,
    to: Point3<f64>,
) {
    if let (Some(a), Some(b)) = (camera.project(from), camera.project(to)) {
        stroke_line(ctx, a, b);
    }
}

fn draw_wall_box(
    ctx: &CanvasRenderingContext2d,
    camera: &OrbitCamera,
    wall: &Wall,
    pattern: Option<&CanvasPattern>,
    ambient: f64,
    diffuse: f64,
    light_dir: [f64; 3],
) {
    let mid = wall.midpoint();
    let center = lift(mid, WALL_HEIGHT / 2.0).coords;
    let (sin, cos) = wall.angle.sin_cos();
    // Local frame: x along the wall, y up, z across the thickness. The
    // box is the local cuboid rotated about Y by -angle, same placement
    // as the plan rectangle.
    let ux = Vector3::new(cos, 0.0, sin) * (wall.length / 2.0);
    let uy = Vector3::new(0.0, 1.0, 0.0) * (WALL_HEIGHT / 2.0);
    let uz = Vector3::new(-sin, 0.0, cos) * (WALL_THICKNESS / 2.0);

    let light = Vector3::new(light_dir[0], light_dir[1], light_dir[2]).normalize();
    let eye = camera.eye();

    // Six faces as (outward normal axis, sign); corners wind cyclically in
    // the other two axes.
    let faces: [(Vector3<f64>, [Vector3<f64>; 4]); 6] = [
        (ux, [ux + uy + uz, ux + uy - uz, ux - uy - uz, ux - uy + uz]),
        (-ux, [-ux + uy + uz, -ux + uy - uz, -ux - uy - uz, -ux - uy + uz]),
        (uy, [ux + uy + uz, ux + uy - uz, -ux + uy - uz, -ux + uy + uz]),
        (-uy, [ux - uy + uz, ux - uy - uz, -ux - uy - uz, -ux - uy + uz]),
        (uz, [ux + uy + uz, -ux + uy + uz, -ux - uy + uz, ux - uy + uz]),
        (-uz, [ux + uy - uz, -ux + uy - uz, -ux - uy - uz, ux - uy - uz]),
    ];

    for (normal_axis, offsets) in faces {
        let normal = normal_axis.normalize();
        let centroid = Point3::from(center + normal_axis);
        if normal.dot(&(eye - centroid)) <= 0.0 {
            continue;
        }
        let mut quad = [(0.0, 0.0); 4];
        let mut visible = true;
        for (slot, offset) in quad.iter_mut().zip(offsets) {
            match camera.project(Point3::from(center + offset)) {
                Some(projected) => *slot = projected,
                None => {
                    visible = false;
                    break;
                }
            }
        }
        if !visible {
            continue;
        }

        match pattern {
            Some(pattern) => {
                // Texture is decorative; drawn slightly translucent like
                // the flat-shaded fallback never is.
                ctx.set_fill_style_canvas_pattern(pattern);
                ctx.set_global_alpha(0.9);
                fill_quad(ctx, &quad);
                ctx.set_global_alpha(1.0);
            }
            None => {
                let shade = (ambient + diffuse * normal.dot(&-light).max(0.0)).min(1.0);
                let fill = format!(
                    "rgb({}, {}, {})",
                    (WALL_BASE_RGB[0] * shade).round() as u8,
                    (WALL_BASE_RGB[1] * shade).round() as u8,
                    (WALL_BASE_RGB[2] * shade).round() as u8,
                );
                ctx.set_fill_style_str(&fill);
                fill_quad(ctx, &quad);
            }
        }
    }
}
