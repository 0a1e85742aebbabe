//! CanvasEngine - the node tree plus everything that moves it or the view.
//!
//! Owns the camera controller, the force layout, the spatial index, the
//! edge hit-tester and the two history stacks (camera navigation and
//! removal undo). The host feeds it input events and calls [`CanvasEngine::frame`]
//! once per display refresh; each frame runs camera → layout → spatial
//! refresh → edge hover, in that order.

use serde::{Deserialize, Serialize};

use crate::animation::FrameLoop;
use crate::camera::{Camera, CameraCommit, CameraController, RenderSurface, WheelInput};
use crate::config::{CanvasConfig, NAVIGATION_HISTORY_LIMIT, UNDO_HISTORY_LIMIT};
use crate::error::{Error, Result};
use crate::geometry::{Bounds, Point, Size};
use crate::graph::{Node, NodeId, NodeKind, NodeMove, NodeTree, ParentRef, RemovedNode};
use crate::history::BoundedStack;
use crate::layout::{ForceLayout, LayoutState, place_child};
use crate::spatial::{EdgeHitTester, HoveredEdge, SpatialIndex};

/// Saved canvas state, produced and consumed as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLayout {
    pub camera: Camera,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub next_z_index: u32,
}

impl PersistedLayout {
    /// Reject non-finite geometry, negative sizes and a non-positive zoom.
    pub fn validate(&self) -> Result<()> {
        let camera = &self.camera;
        if !(camera.x.is_finite() && camera.y.is_finite() && camera.z.is_finite() && camera.z > 0.0) {
            return Err(Error::InvalidLayout(format!(
                "camera ({}, {}, {}) is not a usable view",
                camera.x, camera.y, camera.z
            )));
        }
        for node in &self.nodes {
            let finite = [node.x, node.y, node.width, node.height].iter().all(|v| v.is_finite());
            if !finite || node.width < 0.0 || node.height < 0.0 {
                return Err(Error::InvalidLayout(format!("node {} has invalid geometry", node.id)));
            }
        }
        Ok(())
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum PointerTarget {
    Node(NodeId),
    Canvas,
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    Pan { last: Point },
    Drag { id: NodeId, last: Point },
}

pub struct CanvasEngine {
    config: CanvasConfig,
    tree: NodeTree,
    camera: CameraController,
    layout: ForceLayout,
    layout_clock: FrameLoop,
    spatial: SpatialIndex,
    spatial_dirty: bool,
    hover: EdgeHitTester,
    navigation: BoundedStack<Camera>,
    undo: BoundedStack<RemovedNode>,
    gesture: Gesture,
    moves: Vec<NodeMove>,
}

impl CanvasEngine {
    pub fn new(config: CanvasConfig) -> Self {
        Self::with_parts(config, NodeTree::new(), Camera::IDENTITY)
    }

    /// Rebuild from a saved layout.
    pub fn from_layout(config: CanvasConfig, layout: PersistedLayout) -> Result<Self> {
        layout.validate()?;
        let mut tree = NodeTree::from_nodes(layout.nodes);
        tree.reserve_z_index(layout.next_z_index);
        Ok(Self::with_parts(config, tree, layout.camera))
    }

    fn with_parts(config: CanvasConfig, tree: NodeTree, camera: Camera) -> Self {
        tracing::info!(nodes = tree.len(), "canvas engine created");
        Self {
            camera: CameraController::with_camera(config.camera.clone(), camera),
            layout: ForceLayout::new(config.force.clone()),
            layout_clock: FrameLoop::new(),
            spatial: SpatialIndex::new(),
            spatial_dirty: true,
            hover: EdgeHitTester::new(),
            navigation: BoundedStack::new(NAVIGATION_HISTORY_LIMIT),
            undo: BoundedStack::new(UNDO_HISTORY_LIMIT),
            gesture: Gesture::Idle,
            moves: Vec::new(),
            tree,
            config,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn layout(&self) -> &ForceLayout {
        &self.layout
    }

    pub fn hovered_edge(&self) -> Option<&HoveredEdge> {
        self.hover.hovered()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_navigate_back(&self) -> bool {
        !self.navigation.is_empty()
    }

    /// Camera commits since the last call.
    pub fn drain_commits(&mut self) -> Vec<CameraCommit> {
        self.camera.drain_commits()
    }

    /// Ids of the nodes overlapping the visible canvas area. Empty before
    /// the viewport is known.
    pub fn visible_nodes(&mut self) -> Vec<NodeId> {
        let Some(view) = self.camera.visible_canvas_bounds() else {
            return Vec::new();
        };
        self.refresh_spatial();
        self.spatial.intersecting(&view).into_iter().cloned().collect()
    }

    /// Layout moves applied since the last call, in the order applied.
    pub fn drain_moves(&mut self) -> Vec<NodeMove> {
        std::mem::take(&mut self.moves)
    }

    // =========================================================================
    // Mounting
    // =========================================================================

    pub fn set_viewport(&mut self, viewport: Size) {
        self.camera.set_viewport(viewport);
    }

    pub fn attach_surface(&mut self, surface: Box<dyn RenderSurface>) {
        self.camera.attach_surface(surface);
    }

    /// Stop every loop and timer. Safe to call more than once.
    pub fn teardown(&mut self) {
        self.camera.teardown();
        self.camera.detach_surface();
        self.layout.stop();
        self.layout.clear_pins();
        self.layout_clock.cancel();
        self.hover.set_enabled(false);
        self.hover.pointer_leave();
        self.gesture = Gesture::Idle;
        tracing::info!("canvas engine torn down");
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Run one frame. Returns true if the host should schedule another.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let camera_busy = self.camera.frame(now_ms);

        if self.layout.is_running() {
            self.layout_clock.start(now_ms);
            if let Some(dt) = self.layout_clock.advance(now_ms) {
                let moves = self.layout.tick(&self.tree, dt);
                if !moves.is_empty() {
                    self.tree.apply_moves(&moves);
                    self.moves.extend(moves);
                    self.spatial_dirty = true;
                }
            }
        } else {
            self.layout_clock.cancel();
        }

        self.refresh_spatial();
        self.hover
            .update(&self.tree, &self.spatial, &self.camera.live(), &self.config.edge_hover);

        camera_busy || self.layout.is_running()
    }

    fn refresh_spatial(&mut self) {
        if self.spatial_dirty {
            self.spatial.rebuild(self.tree.iter());
            self.spatial_dirty = false;
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn wheel(&mut self, input: WheelInput, now_ms: f64) {
        self.camera.wheel(input, now_ms);
    }

    /// Start a drag on the node under `screen`, or a pan on empty canvas.
    pub fn pointer_down(&mut self, screen: Point) -> PointerTarget {
        self.refresh_spatial();
        let canvas = self.camera.screen_to_canvas(screen);
        self.hover.pointer_move(screen);
        self.hover.set_dragging(true);

        match self.spatial.node_at(canvas).cloned() {
            Some(id) => {
                if let Err(err) = self.tree.bring_to_front(&id) {
                    tracing::warn!(%err, "drag target vanished");
                }
                self.spatial_dirty = true;
                self.layout.pin(id.clone());
                self.gesture = Gesture::Drag {
                    id: id.clone(),
                    last: screen,
                };
                PointerTarget::Node(id)
            }
            None => {
                self.gesture = Gesture::Pan { last: screen };
                PointerTarget::Canvas
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Point, now_ms: f64) {
        self.hover.pointer_move(screen);
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Pan { last } => {
                let delta = *last - screen;
                *last = screen;
                self.camera.pan(delta, now_ms);
            }
            Gesture::Drag { id, last } => {
                let delta = (screen - *last) / self.camera.live().z;
                *last = screen;
                let id = id.clone();
                if let Some(node) = self.tree.get(&id) {
                    let (x, y) = (node.x + delta.x, node.y + delta.y);
                    if self.tree.set_position(&id, x, y).is_ok() {
                        self.spatial_dirty = true;
                    }
                }
            }
        }
    }

    pub fn pointer_up(&mut self) {
        if let Gesture::Drag { id, .. } = &self.gesture {
            self.layout.unpin(id);
        }
        self.gesture = Gesture::Idle;
        self.hover.set_dragging(false);
    }

    pub fn pointer_leave(&mut self) {
        self.hover.pointer_leave();
    }

    pub fn set_edge_hover_enabled(&mut self, enabled: bool) {
        self.hover.set_enabled(enabled);
    }

    // =========================================================================
    // Layout control
    // =========================================================================

    pub fn toggle_layout(&mut self) -> LayoutState {
        self.layout.toggle()
    }

    pub fn layout_faster(&mut self) -> f64 {
        self.layout.faster()
    }

    pub fn layout_slower(&mut self) -> f64 {
        self.layout.slower()
    }

    pub fn pin(&mut self, id: NodeId) {
        self.layout.pin(id);
    }

    pub fn unpin(&mut self, id: &NodeId) {
        self.layout.unpin(id);
    }

    // =========================================================================
    // Tree mutations
    // =========================================================================

    /// Create `id` under `parent` at the placement heuristic's spot.
    /// Returns the new node's top-left corner.
    pub fn add_child(
        &mut self,
        parent: ParentRef,
        id: NodeId,
        size: Size,
        kind: NodeKind,
    ) -> Result<Point> {
        let top_left = place_child(&self.tree, &parent, size, &self.config.placement)?;
        let mut node = Node::new(id, parent, top_left.x, top_left.y, size.width, size.height)
            .with_kind(kind);
        node.z_index = self.tree.next_z_index();
        tracing::debug!(id = %node.id, parent = %node.parent_id, "adding child");
        self.tree.insert(node)?;
        self.spatial_dirty = true;
        Ok(top_left)
    }

    /// Remove `id`; its children move up to its parent. Undoable.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<()> {
        let removed = self.tree.remove(id)?;
        tracing::debug!(%id, children = removed.children.len(), "removed node");
        self.layout.unpin(id);
        if matches!(&self.gesture, Gesture::Drag { id: dragged, .. } if dragged == id) {
            self.gesture = Gesture::Idle;
            self.hover.set_dragging(false);
        }
        self.undo.push(removed);
        self.hover.invalidate();
        self.spatial_dirty = true;
        Ok(())
    }

    /// Put the most recently removed node back. Returns its id.
    pub fn undo_remove(&mut self) -> Result<NodeId> {
        let removed = self.undo.pop().ok_or(Error::NothingToUndo)?;
        let id = removed.node.id.clone();
        self.tree.restore(removed)?;
        tracing::debug!(%id, "restored node");
        self.hover.invalidate();
        self.spatial_dirty = true;
        Ok(id)
    }

    pub fn set_parent(&mut self, id: &NodeId, parent: ParentRef) -> Result<()> {
        self.tree.set_parent(id, parent)?;
        self.hover.invalidate();
        Ok(())
    }

    pub fn set_position(&mut self, id: &NodeId, x: f64, y: f64) -> Result<()> {
        self.tree.set_position(id, x, y)?;
        self.spatial_dirty = true;
        Ok(())
    }

    pub fn bring_to_front(&mut self, id: &NodeId) -> Result<u32> {
        let z = self.tree.bring_to_front(id)?;
        self.spatial_dirty = true;
        Ok(z)
    }

    /// Split the hovered connector with a new node centered on the hover
    /// point. Returns the new node's top-left, or `None` if nothing is
    /// hovered.
    pub fn insert_on_hovered_edge(
        &mut self,
        id: NodeId,
        size: Size,
        kind: NodeKind,
    ) -> Result<Option<Point>> {
        let Some(edge) = self.hover.hovered().cloned() else {
            return Ok(None);
        };
        // The hover is from the last frame; the tree may have changed since.
        let still_linked = self
            .tree
            .get(&edge.child_id)
            .is_some_and(|child| child.parent_id == edge.parent_id);
        if !still_linked {
            self.hover.invalidate();
            return Ok(None);
        }
        let mut node = Node::new(id.clone(), edge.parent_id.clone(), 0.0, 0.0, size.width, size.height)
            .with_kind(kind);
        node.set_center(edge.point);
        node.z_index = self.tree.next_z_index();
        let top_left = Point::new(node.x, node.y);

        self.tree.insert(node)?;
        self.tree.set_parent(&edge.child_id, ParentRef::Node(id.clone()))?;
        tracing::debug!(%id, parent = %edge.parent_id, child = %edge.child_id, "inserted node on edge");
        self.hover.pointer_leave();
        self.spatial_dirty = true;
        Ok(Some(top_left))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Fly to `target`, remembering where we were.
    pub fn fly_to(&mut self, target: Camera, now_ms: f64) {
        self.navigation.push(self.camera.live());
        self.camera.fly_to(target, now_ms);
    }

    /// Fit every node on screen. `None` before mount or with no nodes.
    pub fn fit_to_content(&mut self, now_ms: f64) -> Option<Camera> {
        let bounds = self.tree.bounds()?;
        self.fit_bounds(&bounds, now_ms)
    }

    /// Fit a single node on screen.
    pub fn focus_node(&mut self, id: &NodeId, now_ms: f64) -> Result<Option<Camera>> {
        let bounds = self
            .tree
            .get(id)
            .map(Node::bounds)
            .ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        Ok(self.fit_bounds(&bounds, now_ms))
    }

    /// Fly back to the camera before the last programmatic jump.
    pub fn navigate_back(&mut self, now_ms: f64) -> Option<Camera> {
        let target = self.navigation.pop()?;
        self.camera.fly_to(target, now_ms);
        Some(target)
    }

    fn fit_bounds(&mut self, bounds: &Bounds, now_ms: f64) -> Option<Camera> {
        let target = self.camera.fit_camera(bounds)?;
        self.fly_to(target, now_ms);
        Some(target)
    }

    /// Jump without animation. Commits immediately.
    pub fn reset_camera(&mut self, camera: Camera) {
        self.camera.reset(camera);
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Current state as plain data, with the committed camera.
    pub fn snapshot(&self) -> PersistedLayout {
        PersistedLayout {
            camera: self.camera.committed(),
            nodes: self.tree.iter().cloned().collect(),
            next_z_index: self.tree.next_z_index(),
        }
    }

    /// Replace the whole canvas and clear both histories. An invalid layout
    /// leaves the current state untouched.
    pub fn restore(&mut self, layout: PersistedLayout) -> Result<()> {
        layout.validate()?;
        let mut tree = NodeTree::from_nodes(layout.nodes);
        tree.reserve_z_index(layout.next_z_index);
        tracing::info!(nodes = tree.len(), "restoring layout");
        self.tree = tree;
        self.camera.reset(layout.camera);
        self.layout.clear_pins();
        self.navigation.clear();
        self.undo.clear();
        self.gesture = Gesture::Idle;
        self.hover.set_dragging(false);
        self.hover.invalidate();
        self.moves.clear();
        self.spatial_dirty = true;
        Ok(())
    }
}

impl Default for CanvasEngine {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}
