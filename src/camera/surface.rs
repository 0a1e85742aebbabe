//! Render surfaces: where the live camera is written every frame.

use wasm_bindgen::JsValue;
use web_sys::HtmlElement;

use super::transform::Camera;

/// Receives the live camera on every change, bypassing observable state.
pub trait RenderSurface {
    fn apply_camera(&mut self, camera: &Camera);
}

/// A DOM element whose CSS `transform` follows the camera.
pub struct ElementSurface {
    element: HtmlElement,
}

impl ElementSurface {
    /// Wrap `element` and pin its transform origin to the top-left corner.
    pub fn new(element: HtmlElement) -> Self {
        if let Err(err) = element.style().set_property("transform-origin", "0 0") {
            log_style_error("transform-origin", &err);
        }
        Self { element }
    }
}

impl RenderSurface for ElementSurface {
    fn apply_camera(&mut self, camera: &Camera) {
        let css = camera.css_transform();
        if let Err(err) = self.element.style().set_property("transform", &css) {
            log_style_error("transform", &err);
        }
    }
}

fn log_style_error(property: &str, err: &JsValue) {
    tracing::warn!(property, error = ?err, "failed to write render surface style");
}
