//! CameraController - pan, zoom and animated transitions.
//!
//! The controller keeps two cameras:
//! - `live`: changes on every input event and animation frame and is written
//!   straight to the render surface.
//! - `committed`: the observable camera. It only catches up with `live` when
//!   an animation completes, after an idle window following the last input,
//!   or on an explicit reset. Each catch-up is queued as a [`CameraCommit`].

use serde::Serialize;

use crate::animation::{Animate, Debounce, FrameLoop, Progress};
use crate::config::{CameraConfig, FLY_TO_POSITION_EPSILON, FLY_TO_ZOOM_EPSILON};
use crate::geometry::{Bounds, Point, Size};

use super::fit::fit_camera;
use super::surface::RenderSurface;
use super::transform::Camera;
use super::zoom::{elastic_zoom, is_comfortable, wheel_zoom, zoom_about};

/// How plain wheel events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InputDevice {
    /// Plain wheel zooms.
    Mouse,
    /// Plain wheel pans.
    Trackpad,
}

/// A wheel event in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    /// Horizontal scroll in pixels.
    pub delta_x: f64,
    /// Vertical scroll in pixels. Positive scrolls down (zooms out).
    pub delta_y: f64,
    /// Pointer position in screen space.
    pub cursor: Point,
    /// Ctrl held, or a trackpad pinch reported as ctrl+wheel.
    pub ctrl: bool,
    /// Meta (Cmd) held. Zooms like ctrl.
    pub meta: bool,
    /// Shift held. Turns a mouse wheel into a horizontal pan.
    pub shift: bool,
}

impl WheelInput {
    pub fn new(delta_x: f64, delta_y: f64, cursor: Point) -> Self {
        Self {
            delta_x,
            delta_y,
            cursor,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }
}

/// Why the observable camera changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommitReason {
    AnimationComplete,
    Idle,
    Reset,
}

/// The observable camera caught up with the live one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraCommit {
    /// The newly committed camera.
    pub camera: Camera,
    /// What triggered the commit.
    pub reason: CommitReason,
}

#[derive(Debug, Clone, Copy)]
struct Flight {
    target: Camera,
    speed: f64,
}

/// One fly-to frame: exponential smoothing with an exact snap at the end.
struct FlightStep<'a> {
    camera: &'a mut Camera,
    flight: Flight,
}

impl Animate for FlightStep<'_> {
    fn step(&mut self, dt: f64) -> Progress {
        let alpha = 1.0 - (-self.flight.speed * dt).exp();
        *self.camera = self.camera.lerp(&self.flight.target, alpha);
        if self.camera.offset_distance(&self.flight.target) < FLY_TO_POSITION_EPSILON
            && self.camera.zoom_distance(&self.flight.target) < FLY_TO_ZOOM_EPSILON
        {
            *self.camera = self.flight.target;
            Progress::Settled
        } else {
            Progress::Running
        }
    }
}

pub struct CameraController {
    config: CameraConfig,
    committed: Camera,
    live: Camera,
    flight: Option<Flight>,
    frame: FrameLoop,
    settle: Debounce,
    snap_back: Debounce,
    zoom_anchor: Option<Point>,
    device: InputDevice,
    viewport: Option<Size>,
    surface: Option<Box<dyn RenderSurface>>,
    commits: Vec<CameraCommit>,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self::with_camera(config, Camera::IDENTITY)
    }

    /// Start from a previously persisted camera.
    pub fn with_camera(config: CameraConfig, camera: Camera) -> Self {
        let settle = Debounce::new(config.settle_ms);
        let snap_back = Debounce::new(config.snap_back_delay_ms);
        let camera = Self::sanitize(&config, camera);
        Self {
            config,
            committed: camera,
            live: camera,
            flight: None,
            frame: FrameLoop::new(),
            settle,
            snap_back,
            zoom_anchor: None,
            device: InputDevice::Mouse,
            viewport: None,
            surface: None,
            commits: Vec::new(),
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Camera as currently drawn.
    pub fn live(&self) -> Camera {
        self.live
    }

    /// Camera as last committed to observable state.
    pub fn committed(&self) -> Camera {
        self.committed
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn input_device(&self) -> InputDevice {
        self.device
    }

    pub fn is_animating(&self) -> bool {
        self.flight.is_some()
    }

    /// Target of the running fly-to, if any.
    pub fn flight_target(&self) -> Option<Camera> {
        self.flight.map(|f| f.target)
    }

    /// Take the commits queued since the last call.
    pub fn drain_commits(&mut self) -> Vec<CameraCommit> {
        std::mem::take(&mut self.commits)
    }

    /// True while an animation or a debounce timer needs the frame clock.
    pub fn needs_frame(&self) -> bool {
        self.frame.is_scheduled() || self.settle.is_armed() || self.snap_back.is_armed()
    }

    // =========================================================================
    // Mounting
    // =========================================================================

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = Some(viewport);
    }

    pub fn viewport(&self) -> Option<Size> {
        self.viewport
    }

    /// Attach a render surface and bring it up to date.
    pub fn attach_surface(&mut self, mut surface: Box<dyn RenderSurface>) {
        surface.apply_camera(&self.live);
        self.surface = Some(surface);
    }

    pub fn detach_surface(&mut self) -> Option<Box<dyn RenderSurface>> {
        self.surface.take()
    }

    /// Stop every pending frame and timer. The live camera is committed so
    /// nothing observed is lost.
    pub fn teardown(&mut self) {
        self.frame.cancel();
        self.flight = None;
        self.settle.clear();
        self.snap_back.clear();
        if self.live != self.committed {
            self.commit(CommitReason::Reset);
        }
    }

    // =========================================================================
    // Coordinates
    // =========================================================================

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        self.live.screen_to_canvas(screen)
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        self.live.canvas_to_screen(canvas)
    }

    /// Canvas-space rectangle currently on screen, `None` before mount.
    pub fn visible_canvas_bounds(&self) -> Option<Bounds> {
        let viewport = self.viewport?;
        let top_left = self.screen_to_canvas(Point::ORIGIN);
        Some(Bounds::new(
            top_left.x,
            top_left.y,
            viewport.width / self.live.z,
            viewport.height / self.live.z,
        ))
    }

    // =========================================================================
    // Direct manipulation
    // =========================================================================

    /// Route a wheel event to pan or zoom.
    ///
    /// A mouse wheel never reports both axes at once, so the first event that
    /// does switches to trackpad mode for the rest of the session.
    pub fn wheel(&mut self, input: WheelInput, now_ms: f64) {
        if self.device == InputDevice::Mouse && input.delta_x != 0.0 && input.delta_y != 0.0 {
            self.device = InputDevice::Trackpad;
            tracing::debug!("two-axis wheel event, switching to trackpad input");
        }

        if input.ctrl || input.meta {
            self.zoom_at(input.cursor, input.delta_y, self.config.pinch_sensitivity, now_ms);
            return;
        }

        match self.device {
            InputDevice::Trackpad => {
                self.pan(Point::new(input.delta_x, input.delta_y), now_ms);
            }
            InputDevice::Mouse if input.shift => {
                self.pan(Point::new(input.delta_y, 0.0), now_ms);
            }
            InputDevice::Mouse => {
                self.zoom_at(input.cursor, input.delta_y, self.config.wheel_sensitivity, now_ms);
            }
        }
    }

    /// Move the view by a screen-space scroll delta (content moves the
    /// opposite way).
    ///
    /// During a fly-to the target moves too, scaled by target zoom over live
    /// zoom, so the animation keeps heading for the spot the user dragged.
    pub fn pan(&mut self, delta: Point, now_ms: f64) {
        self.live.x -= delta.x;
        self.live.y -= delta.y;
        if let Some(flight) = self.flight.as_mut() {
            let ratio = flight.target.z / self.live.z;
            flight.target.x -= delta.x * ratio;
            flight.target.y -= delta.y * ratio;
        } else {
            self.settle.arm(now_ms);
        }
        self.write_surface();
    }

    /// Zoom by a wheel delta keeping the canvas point under `cursor` fixed.
    pub fn zoom_at(&mut self, cursor: Point, delta: f64, sensitivity: f64, now_ms: f64) {
        self.cancel_flight();

        let z = elastic_zoom(wheel_zoom(self.live.z, delta, sensitivity), &self.config);
        self.live = zoom_about(&self.live, cursor, z);
        self.zoom_anchor = Some(cursor);

        if is_comfortable(z, &self.config) {
            self.snap_back.clear();
        } else {
            self.snap_back.arm(now_ms);
        }
        self.settle.arm(now_ms);
        self.write_surface();
    }

    // =========================================================================
    // Animated transitions
    // =========================================================================

    /// Animate to `target` at the default fly-to speed.
    pub fn fly_to(&mut self, target: Camera, now_ms: f64) {
        let speed = self.config.fly_to_speed;
        self.fly_to_with_speed(target, speed, now_ms);
    }

    /// Animate to `target` with smoothing rate `speed` (1/s).
    ///
    /// Zooms outside the comfortable range are pulled back in around the
    /// viewport center.
    pub fn fly_to_with_speed(&mut self, target: Camera, speed: f64, now_ms: f64) {
        let target = self.comfortable(target);
        tracing::debug!(x = target.x, y = target.y, z = target.z, speed, "fly-to");
        self.settle.clear();
        self.snap_back.clear();
        self.flight = Some(Flight { target, speed });
        self.frame.start(now_ms);
    }

    /// Fly to the camera that fits `bounds`. No-op before the viewport is known.
    pub fn fit_to(&mut self, bounds: &Bounds, now_ms: f64) -> Option<Camera> {
        let target = self.fit_camera(bounds)?;
        self.fly_to(target, now_ms);
        Some(target)
    }

    /// The camera that would fit `bounds`, without moving.
    pub fn fit_camera(&self, bounds: &Bounds) -> Option<Camera> {
        let viewport = self.viewport?;
        let max_zoom = self.config.fit_max_zoom.min(self.config.max_zoom);
        fit_camera(bounds, viewport, self.config.fit_padding, max_zoom)
    }

    /// Jump to `camera` immediately and commit it.
    pub fn reset(&mut self, camera: Camera) {
        self.cancel_flight();
        self.settle.clear();
        self.snap_back.clear();
        self.live = Self::sanitize(&self.config, camera);
        self.write_surface();
        self.commit(CommitReason::Reset);
    }

    /// Advance animations and timers by one frame. Returns true if another
    /// frame is needed.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if self.settle.fire_if_due(now_ms) && self.flight.is_none() && self.live != self.committed
        {
            self.commit(CommitReason::Idle);
        }

        if self.snap_back.fire_if_due(now_ms) {
            self.start_snap_back(now_ms);
        }

        if let Some(flight) = self.flight {
            let mut step = FlightStep {
                camera: &mut self.live,
                flight,
            };
            let running = self.frame.drive(now_ms, &mut step);
            self.write_surface();
            if !running {
                self.flight = None;
                tracing::debug!(z = self.live.z, "fly-to complete");
                self.commit(CommitReason::AnimationComplete);
            }
        }

        self.needs_frame()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn start_snap_back(&mut self, now_ms: f64) {
        let z = self.live.z.clamp(self.config.min_zoom, self.config.max_zoom);
        if z == self.live.z {
            return;
        }
        let anchor = self
            .zoom_anchor
            .or_else(|| self.viewport_center())
            .unwrap_or(Point::ORIGIN);
        let target = zoom_about(&self.live, anchor, z);
        tracing::debug!(from = self.live.z, to = z, "snapping zoom back into range");
        let speed = self.config.snap_back_speed;
        self.fly_to_with_speed(target, speed, now_ms);
    }

    fn comfortable(&self, target: Camera) -> Camera {
        let z = target.z.clamp(self.config.min_zoom, self.config.max_zoom);
        if z == target.z {
            return target;
        }
        let anchor = self.viewport_center().unwrap_or(Point::ORIGIN);
        zoom_about(&target, anchor, z)
    }

    fn viewport_center(&self) -> Option<Point> {
        self.viewport
            .map(|v| Point::new(v.width / 2.0, v.height / 2.0))
    }

    fn cancel_flight(&mut self) {
        self.flight = None;
        self.frame.cancel();
    }

    fn commit(&mut self, reason: CommitReason) {
        self.committed = self.live;
        tracing::debug!(?reason, x = self.live.x, y = self.live.y, z = self.live.z, "camera committed");
        self.commits.push(CameraCommit {
            camera: self.live,
            reason,
        });
    }

    fn write_surface(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.apply_camera(&self.live);
        }
    }

    fn sanitize(config: &CameraConfig, camera: Camera) -> Camera {
        let z = if camera.z.is_finite() {
            camera.z.clamp(config.hard_min_zoom(), config.hard_max_zoom())
        } else {
            1.0
        };
        let x = if camera.x.is_finite() { camera.x } else { 0.0 };
        let y = if camera.y.is_finite() { camera.y } else { 0.0 };
        Camera::new(x, y, z)
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingSurface(Rc<RefCell<Vec<Camera>>>);

    impl RenderSurface for RecordingSurface {
        fn apply_camera(&mut self, camera: &Camera) {
            self.0.borrow_mut().push(*camera);
        }
    }

    fn run_frames(controller: &mut CameraController, mut now: f64, step: f64) -> f64 {
        let mut frames = 0;
        while controller.frame(now) {
            now += step;
            frames += 1;
            assert!(frames < 10_000, "controller never settled");
        }
        now
    }

    #[test]
    fn test_zoom_keeps_cursor_fixed() {
        let mut camera = CameraController::default();
        let cursor = Point::new(320.0, 240.0);
        let before = camera.screen_to_canvas(cursor);
        camera.zoom_at(cursor, -120.0, 0.0015, 0.0);
        let after = camera.screen_to_canvas(cursor);
        assert!(camera.live().z > 1.0);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_live_written_to_surface_commit_deferred() {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let mut camera = CameraController::default();
        camera.attach_surface(Box::new(RecordingSurface(frames.clone())));
        camera.pan(Point::new(10.0, 5.0), 0.0);
        camera.pan(Point::new(10.0, 5.0), 16.0);

        assert_eq!(frames.borrow().last(), Some(&Camera::new(-20.0, -10.0, 1.0)));
        assert_eq!(camera.committed(), Camera::IDENTITY);
        assert!(camera.drain_commits().is_empty());

        // Still inside the idle window.
        camera.frame(200.0);
        assert_eq!(camera.committed(), Camera::IDENTITY);

        camera.frame(16.0 + CameraConfig::default().settle_ms);
        assert_eq!(camera.committed(), Camera::new(-20.0, -10.0, 1.0));
        let commits = camera.drain_commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].reason, CommitReason::Idle);
        assert!(!camera.needs_frame());
    }

    #[test]
    fn test_fly_to_snaps_exactly_and_commits() {
        let mut camera = CameraController::default();
        let target = Camera::new(-500.0, 300.0, 1.5);
        camera.fly_to(target, 0.0);
        assert!(camera.is_animating());
        run_frames(&mut camera, 0.0, 16.0);

        assert_eq!(camera.live(), target);
        assert_eq!(camera.committed(), target);
        let commits = camera.drain_commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].reason, CommitReason::AnimationComplete);
    }

    #[test]
    fn test_fly_to_approaches_monotonically() {
        let mut camera = CameraController::default();
        let target = Camera::new(1000.0, 0.0, 1.0);
        camera.fly_to(target, 0.0);
        let mut now = 0.0;
        let mut last = camera.live().offset_distance(&target);
        while camera.frame(now) {
            now += 16.0;
            let d = camera.live().offset_distance(&target);
            assert!(d <= last);
            last = d;
        }
        assert_eq!(camera.live().offset_distance(&target), 0.0);
    }

    #[test]
    fn test_trackpad_detection_is_one_way() {
        let mut camera = CameraController::default();
        let cursor = Point::new(100.0, 100.0);

        camera.wheel(WheelInput::new(0.0, -100.0, cursor), 0.0);
        assert_eq!(camera.input_device(), InputDevice::Mouse);
        assert!(camera.live().z > 1.0);

        camera.reset(Camera::IDENTITY);
        camera.wheel(WheelInput::new(3.0, 4.0, cursor), 10.0);
        assert_eq!(camera.input_device(), InputDevice::Trackpad);
        assert_eq!(camera.live(), Camera::new(-3.0, -4.0, 1.0));

        // Plain vertical scroll now pans instead of zooming.
        camera.wheel(WheelInput::new(0.0, 10.0, cursor), 20.0);
        assert_eq!(camera.input_device(), InputDevice::Trackpad);
        assert_eq!(camera.live(), Camera::new(-3.0, -14.0, 1.0));
    }

    #[test]
    fn test_ctrl_wheel_always_zooms() {
        let mut camera = CameraController::default();
        camera.wheel(WheelInput::new(1.0, 1.0, Point::ORIGIN), 0.0);
        let mut pinch = WheelInput::new(0.0, -10.0, Point::ORIGIN);
        pinch.ctrl = true;
        let z = camera.live().z;
        camera.wheel(pinch, 10.0);
        assert!(camera.live().z > z);
    }

    #[test]
    fn test_overshoot_snaps_back_into_range() {
        let config = CameraConfig::default();
        let mut camera = CameraController::default();
        let cursor = Point::new(400.0, 300.0);
        let anchor = camera.screen_to_canvas(cursor);

        let mut now = 0.0;
        for _ in 0..40 {
            camera.zoom_at(cursor, -500.0, config.wheel_sensitivity, now);
            now += 16.0;
            assert!(camera.live().z < config.hard_max_zoom());
        }
        assert!(camera.live().z > config.max_zoom);

        run_frames(&mut camera, now, 16.0);
        assert!((camera.committed().z - config.max_zoom).abs() < 1e-12);
        // Snap-back stays anchored on the last zoom cursor.
        let after = camera.screen_to_canvas(cursor);
        assert!((after.x - anchor.x).abs() < 1.0);
        assert!((after.y - anchor.y).abs() < 1.0);
    }

    #[test]
    fn test_zoom_out_from_overshoot_steps_from_current_zoom() {
        let config = CameraConfig::default();
        let mut camera = CameraController::default();
        let cursor = Point::new(400.0, 300.0);
        for i in 0..40 {
            camera.zoom_at(cursor, -500.0, config.wheel_sensitivity, i as f64);
        }
        let z = camera.live().z;
        assert!(z > config.max_zoom);

        camera.zoom_at(cursor, 100.0, config.wheel_sensitivity, 40.0);
        let expected = elastic_zoom(wheel_zoom(z, 100.0, config.wheel_sensitivity), &config);
        assert_eq!(camera.live().z, expected);
        // A 15% tick moves the zoom by roughly 15%, even deep in the band.
        assert!(z - camera.live().z > 0.3);
    }

    #[test]
    fn test_snap_back_timer_rearms() {
        let config = CameraConfig::default();
        let mut camera = CameraController::default();
        for i in 0..30 {
            camera.zoom_at(Point::ORIGIN, 2000.0, config.wheel_sensitivity, i as f64);
        }
        assert!(camera.live().z < config.min_zoom);
        // Another zoom just before the deadline pushes it out.
        camera.frame(29.0 + config.snap_back_delay_ms - 1.0);
        assert!(!camera.is_animating());
        let almost_due = 29.0 + config.snap_back_delay_ms - 1.0;
        camera.zoom_at(Point::ORIGIN, 10.0, config.wheel_sensitivity, almost_due);
        camera.frame(29.0 + config.snap_back_delay_ms + 10.0);
        assert!(!camera.is_animating());
        camera.frame(29.0 + 2.0 * config.snap_back_delay_ms);
        assert!(camera.is_animating());
    }

    #[test]
    fn test_pan_during_flight_shifts_target() {
        let mut camera = CameraController::default();
        camera.fly_to(Camera::new(0.0, 0.0, 2.0), 0.0);
        camera.pan(Point::new(10.0, 0.0), 0.0);
        // live is at zoom 1, target at zoom 2: the target moves twice as far.
        assert_eq!(camera.flight_target(), Some(Camera::new(-20.0, 0.0, 2.0)));
        assert_eq!(camera.live(), Camera::new(-10.0, 0.0, 1.0));
    }

    #[test]
    fn test_fit_requires_viewport() {
        let mut camera = CameraController::default();
        let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(camera.fit_to(&bounds, 0.0), None);
        assert!(camera.visible_canvas_bounds().is_none());

        camera.set_viewport(Size::new(800.0, 600.0));
        let target = camera.fit_to(&bounds, 0.0).unwrap();
        assert_eq!(target.z, 1.0);
        run_frames(&mut camera, 0.0, 16.0);
        assert_eq!(camera.committed(), target);
    }

    #[test]
    fn test_reset_commits_immediately() {
        let mut camera = CameraController::default();
        camera.fly_to(Camera::new(100.0, 100.0, 1.2), 0.0);
        camera.reset(Camera::new(5.0, 5.0, 0.5));
        assert!(!camera.is_animating());
        assert_eq!(camera.committed(), Camera::new(5.0, 5.0, 0.5));
        assert_eq!(camera.drain_commits()[0].reason, CommitReason::Reset);
        assert!(!camera.needs_frame());
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let mut camera = CameraController::default();
        camera.fly_to(Camera::new(100.0, 0.0, 1.0), 0.0);
        camera.zoom_at(Point::ORIGIN, -5000.0, 0.0015, 0.0);
        camera.teardown();
        assert!(!camera.needs_frame());
        assert_eq!(camera.committed(), camera.live());
    }
}
