use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, MouseEvent, Window};

use wallboard_shared::store::WallStore;

use crate::render::render;
use crate::state::{State, ViewMode};

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

/// Pointer position in CSS pixels relative to the canvas origin.
pub fn event_to_screen(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Option<(f64, f64)> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    Some((
        event.client_x() as f64 - rect.left(),
        event.client_y() as f64 - rect.top(),
    ))
}

pub fn set_canvas_mode(canvas: &HtmlCanvasElement, view: ViewMode, dragging: bool) {
    let cursor = match view {
        ViewMode::TwoD => "crosshair",
        ViewMode::ThreeD => {
            if dragging {
                "grabbing"
            } else {
                "grab"
            }
        }
    };
    if let Ok(element) = canvas.clone().dyn_into::<HtmlElement>() {
        let _ = element.style().set_property("cursor", cursor);
    }
}

pub fn update_view_label(label: &Element, view: ViewMode) {
    label.set_text_content(Some(view.label()));
}

pub fn update_wall_count(label: &Element, store: &WallStore) {
    label.set_text_content(Some(&format!("Walls: {}", store.len())));
}

pub fn update_wall_length(label: &Element, length: f64) {
    label.set_text_content(Some(&format!("{length:.2}m")));
}

pub fn update_zoom_label(label: &Element, zoom: f64) {
    label.set_text_content(Some(&format!("{}%", (zoom * 100.0).round())));
}

/// Zoom of whichever camera the active view owns.
pub fn active_zoom(state: &State) -> f64 {
    match state.active {
        ViewMode::TwoD => state.view2d.camera.zoom(),
        ViewMode::ThreeD => state.view3d.camera.zoom(),
    }
}

pub fn resize_canvas(window: &Window, state: &mut State) {
    let rect = state.canvas.get_bounding_client_rect();
    let dpr = window.device_pixel_ratio();
    state.canvas.set_width((rect.width() * dpr) as u32);
    state.canvas.set_height((rect.height() * dpr) as u32);
    let _ = state.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    state.width = rect.width();
    state.height = rect.height();
    state.view2d.camera.set_viewport(rect.width(), rect.height());
    state.view3d.camera.set_viewport(rect.width(), rect.height());
    render(state);
}
