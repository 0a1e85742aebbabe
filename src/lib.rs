//! Infinite Canvas - WASM Module
//!
//! Core of an infinite, zoomable canvas of nodes arranged as a forest under
//! a fixed origin. Compiled to WebAssembly and exposed to JavaScript via
//! wasm-bindgen.
//!
//! # Architecture
//!
//! - `camera`: screen ⇄ canvas transform, elastic zoom, fly-to, snap-back
//! - `animation`: frame clock and debounce timers
//! - `graph`: node records and the parent/child forest (petgraph StableGraph)
//! - `layout`: continuous force-directed layout and child placement
//! - `spatial`: R-tree over node rectangles and edge hit-testing
//! - `engine`: the per-frame pipeline tying it all together

use js_sys::Float64Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

pub mod animation;
pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod history;
pub mod layout;
pub mod spatial;

use camera::{Camera, ElementSurface, WheelInput};
use config::CanvasConfig;
use engine::{CanvasEngine, PersistedLayout};
use geometry::{Point, Size};
use graph::{NodeId, NodeKind, ParentRef};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Plain JS objects (not `Map`s) for structs, including flattened ones.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| JsError::new(&err.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsError> {
    serde_wasm_bindgen::from_value(value).map_err(|err| JsError::new(&err.to_string()))
}

fn kind_from_js(kind: JsValue) -> Result<NodeKind, JsError> {
    if kind.is_undefined() || kind.is_null() {
        Ok(NodeKind::Unknown)
    } else {
        from_js(kind)
    }
}

/// Main entry point for the canvas engine.
///
/// This struct wraps the internal CanvasEngine and provides the public API
/// exposed to JavaScript. Node ids are strings; `"root"` names the canvas
/// root wherever a parent is expected.
#[wasm_bindgen]
pub struct InfiniteCanvasWasm {
    engine: CanvasEngine,
}

#[wasm_bindgen]
impl InfiniteCanvasWasm {
    /// Create an empty canvas with default tuning.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: CanvasEngine::default(),
        }
    }

    /// Create an empty canvas. `config` may be partial; missing fields use
    /// the defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<InfiniteCanvasWasm, JsError> {
        let config: CanvasConfig = from_js(config)?;
        Ok(Self {
            engine: CanvasEngine::new(config),
        })
    }

    /// Load a persisted `{camera, nodes, nextZIndex}` layout.
    #[wasm_bindgen(js_name = fromLayout)]
    pub fn from_layout(config: JsValue, layout: JsValue) -> Result<InfiniteCanvasWasm, JsError> {
        let config: CanvasConfig = if config.is_undefined() || config.is_null() {
            CanvasConfig::default()
        } else {
            from_js(config)?
        };
        let layout: PersistedLayout = from_js(layout)?;
        Ok(Self {
            engine: CanvasEngine::from_layout(config, layout)?,
        })
    }

    // =========================================================================
    // Mounting
    // =========================================================================

    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.engine.set_viewport(Size::new(width, height));
    }

    /// Drive `element`'s CSS transform from the live camera.
    #[wasm_bindgen(js_name = attachElement)]
    pub fn attach_element(&mut self, element: HtmlElement) {
        self.engine.attach_surface(Box::new(ElementSurface::new(element)));
    }

    /// Stop all animation and timers. Call when the view unmounts.
    pub fn teardown(&mut self) {
        self.engine.teardown();
    }

    /// Run one frame. Returns true if another frame should be requested.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        self.engine.frame(now_ms)
    }

    // =========================================================================
    // Input
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub fn wheel(
        &mut self,
        delta_x: f64,
        delta_y: f64,
        cursor_x: f64,
        cursor_y: f64,
        ctrl: bool,
        meta: bool,
        shift: bool,
        now_ms: f64,
    ) {
        let input = WheelInput {
            delta_x,
            delta_y,
            cursor: Point::new(cursor_x, cursor_y),
            ctrl,
            meta,
            shift,
        };
        self.engine.wheel(input, now_ms);
    }

    /// Returns `{kind: "node", id}` or `{kind: "canvas"}`.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<JsValue, JsError> {
        let target = self.engine.pointer_down(Point::new(x, y));
        to_js(&target)
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64, now_ms: f64) {
        self.engine.pointer_move(Point::new(x, y), now_ms);
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.engine.pointer_up();
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.engine.pointer_leave();
    }

    // =========================================================================
    // Camera
    // =========================================================================

    /// Camera as currently drawn, `{x, y, z}`.
    #[wasm_bindgen(js_name = liveCamera)]
    pub fn live_camera(&self) -> Result<JsValue, JsError> {
        to_js(&self.engine.camera().live())
    }

    /// Camera as last committed, `{x, y, z}`.
    #[wasm_bindgen(js_name = committedCamera)]
    pub fn committed_camera(&self) -> Result<JsValue, JsError> {
        to_js(&self.engine.camera().committed())
    }

    /// Commits since the last call: `[{camera, reason}]`.
    #[wasm_bindgen(js_name = drainCommits)]
    pub fn drain_commits(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.engine.drain_commits())
    }

    #[wasm_bindgen(js_name = cssTransform)]
    pub fn css_transform(&self) -> String {
        self.engine.camera().live().css_transform()
    }

    /// `[x, y]` in canvas space.
    #[wasm_bindgen(js_name = screenToCanvas)]
    pub fn screen_to_canvas(&self, x: f64, y: f64) -> Float64Array {
        let p = self.engine.camera().screen_to_canvas(Point::new(x, y));
        Float64Array::from(&[p.x, p.y][..])
    }

    /// `[x, y]` in screen space.
    #[wasm_bindgen(js_name = canvasToScreen)]
    pub fn canvas_to_screen(&self, x: f64, y: f64) -> Float64Array {
        let p = self.engine.camera().canvas_to_screen(Point::new(x, y));
        Float64Array::from(&[p.x, p.y][..])
    }

    #[wasm_bindgen(js_name = flyTo)]
    pub fn fly_to(&mut self, x: f64, y: f64, z: f64, now_ms: f64) {
        self.engine.fly_to(Camera::new(x, y, z), now_ms);
    }

    /// Returns false before the viewport is known or with no nodes.
    #[wasm_bindgen(js_name = fitToContent)]
    pub fn fit_to_content(&mut self, now_ms: f64) -> bool {
        self.engine.fit_to_content(now_ms).is_some()
    }

    #[wasm_bindgen(js_name = focusNode)]
    pub fn focus_node(&mut self, id: &str, now_ms: f64) -> Result<bool, JsError> {
        Ok(self.engine.focus_node(&NodeId::from(id), now_ms)?.is_some())
    }

    #[wasm_bindgen(js_name = navigateBack)]
    pub fn navigate_back(&mut self, now_ms: f64) -> bool {
        self.engine.navigate_back(now_ms).is_some()
    }

    #[wasm_bindgen(js_name = resetCamera)]
    pub fn reset_camera(&mut self, x: f64, y: f64, z: f64) {
        self.engine.reset_camera(Camera::new(x, y, z));
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Returns true if the layout is now running.
    #[wasm_bindgen(js_name = toggleLayout)]
    pub fn toggle_layout(&mut self) -> bool {
        self.engine.toggle_layout() == layout::LayoutState::Running
    }

    #[wasm_bindgen(js_name = isLayoutRunning)]
    pub fn is_layout_running(&self) -> bool {
        self.engine.layout().is_running()
    }

    #[wasm_bindgen(js_name = layoutFaster)]
    pub fn layout_faster(&mut self) -> f64 {
        self.engine.layout_faster()
    }

    #[wasm_bindgen(js_name = layoutSlower)]
    pub fn layout_slower(&mut self) -> f64 {
        self.engine.layout_slower()
    }

    /// Layout moves since the last call: `[{id, dx, dy}]`.
    #[wasm_bindgen(js_name = drainMoves)]
    pub fn drain_moves(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.engine.drain_moves())
    }

    #[wasm_bindgen(js_name = pinNode)]
    pub fn pin_node(&mut self, id: &str) {
        self.engine.pin(NodeId::from(id));
    }

    #[wasm_bindgen(js_name = unpinNode)]
    pub fn unpin_node(&mut self, id: &str) {
        self.engine.unpin(&NodeId::from(id));
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.engine.tree().len()
    }

    /// All nodes in insertion order.
    #[wasm_bindgen(js_name = getNodes)]
    pub fn get_nodes(&self) -> Result<JsValue, JsError> {
        let nodes: Vec<_> = self.engine.tree().iter().collect();
        to_js(&nodes)
    }

    /// Ids of the nodes overlapping the screen, for render culling.
    #[wasm_bindgen(js_name = visibleNodes)]
    pub fn visible_nodes(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.engine.visible_nodes())
    }

    /// Add a child at the placement heuristic's spot. Returns its top-left
    /// `[x, y]`.
    #[wasm_bindgen(js_name = addChild)]
    pub fn add_child(
        &mut self,
        parent: &str,
        id: &str,
        width: f64,
        height: f64,
        kind: JsValue,
    ) -> Result<Float64Array, JsError> {
        let kind = kind_from_js(kind)?;
        let p = self.engine.add_child(
            ParentRef::from(parent),
            NodeId::from(id),
            Size::new(width, height),
            kind,
        )?;
        Ok(Float64Array::from(&[p.x, p.y][..]))
    }

    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, id: &str) -> Result<(), JsError> {
        self.engine.remove_node(&NodeId::from(id))?;
        Ok(())
    }

    /// Restore the last removed node. Returns its id.
    #[wasm_bindgen(js_name = undoRemove)]
    pub fn undo_remove(&mut self) -> Result<String, JsError> {
        Ok(self.engine.undo_remove()?.0)
    }

    #[wasm_bindgen(js_name = setParent)]
    pub fn set_parent(&mut self, id: &str, parent: &str) -> Result<(), JsError> {
        self.engine.set_parent(&NodeId::from(id), ParentRef::from(parent))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, id: &str, x: f64, y: f64) -> Result<(), JsError> {
        self.engine.set_position(&NodeId::from(id), x, y)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = bringToFront)]
    pub fn bring_to_front(&mut self, id: &str) -> Result<u32, JsError> {
        Ok(self.engine.bring_to_front(&NodeId::from(id))?)
    }

    // =========================================================================
    // Edge hover
    // =========================================================================

    #[wasm_bindgen(js_name = setEdgeHoverEnabled)]
    pub fn set_edge_hover_enabled(&mut self, enabled: bool) {
        self.engine.set_edge_hover_enabled(enabled);
    }

    /// `{parentId, childId, point: {x, y}}` or `null`.
    #[wasm_bindgen(js_name = hoveredEdge)]
    pub fn hovered_edge(&self) -> Result<JsValue, JsError> {
        to_js(&self.engine.hovered_edge())
    }

    /// Split the hovered connector with a new node. Returns its top-left
    /// `{x, y}`, or `null` if nothing was hovered.
    #[wasm_bindgen(js_name = insertOnHoveredEdge)]
    pub fn insert_on_hovered_edge(
        &mut self,
        id: &str,
        width: f64,
        height: f64,
        kind: JsValue,
    ) -> Result<JsValue, JsError> {
        let kind = kind_from_js(kind)?;
        let placed = self
            .engine
            .insert_on_hovered_edge(NodeId::from(id), Size::new(width, height), kind)?;
        to_js(&placed)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// `{camera, nodes, nextZIndex}`.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        to_js(&self.engine.snapshot())
    }

    pub fn restore(&mut self, layout: JsValue) -> Result<(), JsError> {
        let layout: PersistedLayout = from_js(layout)?;
        self.engine.restore(layout)?;
        Ok(())
    }
}

impl Default for InfiniteCanvasWasm {
    fn default() -> Self {
        Self::new()
    }
}
