use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Element, Event, HtmlButtonElement, HtmlCanvasElement,
    HtmlImageElement, HtmlInputElement, MouseEvent, PointerEvent,
};

use wallboard_shared::store::WallStore;

use crate::actions::{
    clear_walls, delete_at_plan, delete_at_solid, hover_plan, pointer_down, pointer_move,
    pointer_up, sync_views, DeleteOutcome,
};
use crate::dom::{
    active_zoom, event_to_screen, get_element, resize_canvas, set_canvas_mode, update_view_label,
    update_wall_count, update_wall_length, update_zoom_label,
};
use crate::render::render;
use crate::state::{OrbitDrag, State, View2d, View3d, ViewMode};

/// Screen-pixel yaw/pitch sensitivity of the orbit drag.
const ORBIT_SPEED: f64 = 0.01;
/// An orbit drag below this much accumulated pointer travel still counts
/// as a click.
const CLICK_SLOP: f64 = 5.0;

const WALL_TEXTURE_URL: &str = "/wall-texture.jpg";

fn document_ready_state(document: &web_sys::Document) -> Option<String> {
    js_sys::Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() == Some("complete") {
        started.set(true);
        return start_app();
    }

    let onload_started = started.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

fn zoom_active(state: &mut State, factor: f64) {
    match state.active {
        ViewMode::TwoD => state.view2d.camera.zoom_by(factor),
        ViewMode::ThreeD => state.view3d.camera.zoom_by(factor),
    }
}

fn start_app() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let canvas: HtmlCanvasElement = get_element(&document, "canvas")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let toggle_button: HtmlButtonElement = get_element(&document, "toggleViewsBtn")?;
    let zoom_in_button: HtmlButtonElement = get_element(&document, "zoomInBtn")?;
    let zoom_out_button: HtmlButtonElement = get_element(&document, "zoomOutBtn")?;
    let zoom_fit_button: HtmlButtonElement = get_element(&document, "zoomFitBtn")?;
    let delete_all_button: HtmlButtonElement = get_element(&document, "deleteAllBtn")?;
    let new_drawing_button: HtmlButtonElement = get_element(&document, "newDrawing")?;
    let snap_input: HtmlInputElement = get_element(&document, "snapToggle")?;
    let view_label: Element = get_element(&document, "view-mode")?;
    let count_label: Element = get_element(&document, "walls-count")?;
    let length_label: Element = get_element(&document, "wall-length")?;
    let zoom_label: Element = get_element(&document, "zoom-level")?;

    let state = Rc::new(RefCell::new(State {
        canvas: canvas.clone(),
        ctx,
        store: WallStore::new(),
        view2d: View2d::new(0.0, 0.0),
        view3d: View3d::new(0.0, 0.0),
        active: ViewMode::TwoD,
        width: 0.0,
        height: 0.0,
        wall_pattern: None,
        suppress_click: false,
    }));

    {
        let mut state = state.borrow_mut();
        let state = &mut *state;
        state.view2d.snap_enabled = snap_input.checked();
        sync_views(&state.store, &mut state.view2d, &mut state.view3d);
        resize_canvas(&window, state);
        update_view_label(&view_label, state.active);
        update_wall_count(&count_label, &state.store);
        update_wall_length(&length_label, 0.0);
        update_zoom_label(&zoom_label, active_zoom(state));
        set_canvas_mode(&state.canvas, state.active, false);
    }

    // Optional wall texture for the 3D view; until it loads (or if it never
    // does) the boxes are flat-shaded.
    {
        let image = HtmlImageElement::new()?;
        let texture_state = state.clone();
        let image_cb = image.clone();
        let onload = Closure::<dyn FnMut()>::new(move || {
            let mut state = texture_state.borrow_mut();
            match state
                .ctx
                .create_pattern_with_html_image_element(&image_cb, "repeat")
            {
                Ok(Some(pattern)) => {
                    state.wall_pattern = Some(pattern);
                }
                _ => {
                    web_sys::console::warn_1(
                        &"Wall texture pattern unavailable, keeping flat shading".into(),
                    );
                }
            }
        });
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        let onerror = Closure::<dyn FnMut()>::new(move || {
            web_sys::console::warn_1(
                &"Wall texture failed to load, keeping flat shading".into(),
            );
        });
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        image.set_src(WALL_TEXTURE_URL);
    }

    {
        let down_state = state.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            event.prevent_default();
            let mut state = down_state.borrow_mut();
            let state = &mut *state;
            let Some((sx, sy)) = event_to_screen(&state.canvas, &event) else {
                return;
            };
            match state.active {
                ViewMode::TwoD => {
                    let world = state.view2d.camera.screen_to_world(sx, sy);
                    pointer_down(&mut state.view2d, world);
                }
                ViewMode::ThreeD => {
                    state.view3d.drag = Some(OrbitDrag {
                        last_x: sx,
                        last_y: sy,
                        travel: 0.0,
                    });
                    set_canvas_mode(&state.canvas, state.active, true);
                }
            }
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let move_state = state.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut state = move_state.borrow_mut();
            let state = &mut *state;
            let Some((sx, sy)) = event_to_screen(&state.canvas, &event) else {
                return;
            };
            match state.active {
                ViewMode::TwoD => {
                    let world = state.view2d.camera.screen_to_world(sx, sy);
                    let drawing = pointer_move(&mut state.view2d, world);
                    if !drawing {
                        hover_plan(&mut state.view2d, world);
                    }
                }
                ViewMode::ThreeD => {
                    let deltas = state.view3d.drag.as_mut().map(|drag| {
                        let dx = sx - drag.last_x;
                        let dy = sy - drag.last_y;
                        drag.travel += dx.abs() + dy.abs();
                        drag.last_x = sx;
                        drag.last_y = sy;
                        (dx, dy)
                    });
                    if let Some((dx, dy)) = deltas {
                        state
                            .view3d
                            .camera
                            .orbit(dx * ORBIT_SPEED, dy * ORBIT_SPEED);
                    }
                }
            }
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let up_state = state.clone();
        let count_label = count_label.clone();
        let length_label = length_label.clone();
        let onstop = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut state = up_state.borrow_mut();
            let state = &mut *state;
            let Some((sx, sy)) = event_to_screen(&state.canvas, &event) else {
                return;
            };
            match state.active {
                ViewMode::TwoD => {
                    let world = state.view2d.camera.screen_to_world(sx, sy);
                    if let Some(wall) = pointer_up(&mut state.view2d, &mut state.store, world) {
                        state.suppress_click = true;
                        sync_views(&state.store, &mut state.view2d, &mut state.view3d);
                        update_wall_count(&count_label, &state.store);
                        update_wall_length(&length_label, wall.length);
                    }
                }
                ViewMode::ThreeD => {
                    if let Some(drag) = state.view3d.drag.take() {
                        if drag.travel > CLICK_SLOP {
                            state.suppress_click = true;
                        }
                    }
                    set_canvas_mode(&state.canvas, state.active, false);
                }
            }
        });
        canvas.add_event_listener_with_callback("pointerup", onstop.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback("pointerleave", onstop.as_ref().unchecked_ref())?;
        onstop.forget();
    }

    {
        let click_state = state.clone();
        let count_label = count_label.clone();
        let onclick = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let mut state = click_state.borrow_mut();
            let state = &mut *state;
            if state.suppress_click {
                state.suppress_click = false;
                return;
            }
            let Some((sx, sy)) = event_to_screen(&state.canvas, &event) else {
                return;
            };
            let outcome = match state.active {
                ViewMode::TwoD => {
                    let world = state.view2d.camera.screen_to_world(sx, sy);
                    delete_at_plan(&mut state.store, &mut state.view2d, &mut state.view3d, world)
                }
                ViewMode::ThreeD => {
                    let ray = state.view3d.camera.pick_ray(sx, sy);
                    delete_at_solid(&mut state.store, &mut state.view2d, &mut state.view3d, &ray)
                }
            };
            match outcome {
                DeleteOutcome::Removed(_) => {
                    update_wall_count(&count_label, &state.store);
                }
                DeleteOutcome::Stale => {
                    web_sys::console::warn_1(
                        &"Clicked a wall with no store record, ignoring".into(),
                    );
                }
                DeleteOutcome::Miss => {}
            }
        });
        canvas.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let zoom_state = state.clone();
        let zoom_label = zoom_label.clone();
        let onwheel = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let wheel_event = match event.dyn_into::<web_sys::WheelEvent>() {
                Ok(event) => event,
                Err(_) => return,
            };
            wheel_event.prevent_default();
            let factor = if wheel_event.delta_y() > 0.0 { 0.9 } else { 1.1 };
            let mut state = zoom_state.borrow_mut();
            let state = &mut *state;
            zoom_active(state, factor);
            update_zoom_label(&zoom_label, active_zoom(state));
        });
        canvas.add_event_listener_with_callback("wheel", onwheel.as_ref().unchecked_ref())?;
        onwheel.forget();
    }

    {
        let resize_state = state.clone();
        let resize_window = window.clone();
        let onresize = Closure::<dyn FnMut()>::new(move || {
            let mut state = resize_state.borrow_mut();
            resize_canvas(&resize_window, &mut state);
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    {
        let toggle_state = state.clone();
        let view_label = view_label.clone();
        let zoom_label = zoom_label.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = toggle_state.borrow_mut();
            let state = &mut *state;
            state.active = match state.active {
                ViewMode::TwoD => ViewMode::ThreeD,
                ViewMode::ThreeD => ViewMode::TwoD,
            };
            sync_views(&state.store, &mut state.view2d, &mut state.view3d);
            update_view_label(&view_label, state.active);
            update_zoom_label(&zoom_label, active_zoom(state));
            set_canvas_mode(&state.canvas, state.active, false);
            web_sys::console::log_1(&format!("Switched to {}", state.active.label()).into());
        });
        toggle_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let zoom_state = state.clone();
        let zoom_label = zoom_label.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = zoom_state.borrow_mut();
            let state = &mut *state;
            zoom_active(state, 1.2);
            update_zoom_label(&zoom_label, active_zoom(state));
        });
        zoom_in_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let zoom_state = state.clone();
        let zoom_label = zoom_label.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = zoom_state.borrow_mut();
            let state = &mut *state;
            zoom_active(state, 0.8);
            update_zoom_label(&zoom_label, active_zoom(state));
        });
        zoom_out_button
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let zoom_state = state.clone();
        let zoom_label = zoom_label.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = zoom_state.borrow_mut();
            let state = &mut *state;
            match state.active {
                ViewMode::TwoD => state.view2d.camera.zoom_fit(),
                ViewMode::ThreeD => state.view3d.camera.zoom_fit(),
            }
            update_zoom_label(&zoom_label, active_zoom(state));
        });
        zoom_fit_button
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    // "Delete all" and "New drawing" do the same thing to the wall list;
    // the latter exists as its own entry point in the toolbar.
    for button in [&delete_all_button, &new_drawing_button] {
        let clear_state = state.clone();
        let count_label = count_label.clone();
        let length_label = length_label.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = clear_state.borrow_mut();
            let state = &mut *state;
            clear_walls(&mut state.store, &mut state.view2d, &mut state.view3d);
            update_wall_count(&count_label, &state.store);
            update_wall_length(&length_label, 0.0);
            web_sys::console::log_1(&"Cleared all walls".into());
        });
        button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let snap_state = state.clone();
        let snap_input_cb = snap_input.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = snap_state.borrow_mut();
            state.view2d.snap_enabled = snap_input_cb.checked();
        });
        snap_input.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    // Cooperative repaint: handlers only mutate state, and each tick of the
    // host scheduler re-renders whichever view is active.
    {
        let frame_state = state.clone();
        let frame_window = window.clone();
        let frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let frame_cb = frame.clone();
        *frame.borrow_mut() = Some(Closure::new(move || {
            {
                let mut state = frame_state.borrow_mut();
                render(&mut state);
            }
            if let Some(callback) = frame_cb.borrow().as_ref() {
                let _ = frame_window.request_animation_frame(callback.as_ref().unchecked_ref());
            }
        }));
        if let Some(callback) = frame.borrow().as_ref() {
            window.request_animation_frame(callback.as_ref().unchecked_ref())?;
        };
    }

    web_sys::console::log_1(&"Wallboard ready".into());
    Ok(())
}
