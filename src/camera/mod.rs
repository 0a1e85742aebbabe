//! Camera: the canvas ⇄ screen transform and everything that moves it.
//!
//! - `transform`: the `{x, y, z}` camera and the conversion pair
//! - `zoom`: wheel response, elastic clamp, cursor-anchored zoom
//! - `fit`: fit-to-bounds
//! - `controller`: input handling, fly-to, snap-back, live/committed state
//! - `surface`: where the live camera is written each frame

mod controller;
mod fit;
mod surface;
mod transform;
mod zoom;

pub use controller::{CameraCommit, CameraController, CommitReason, InputDevice, WheelInput};
pub use fit::fit_camera;
pub use surface::{ElementSurface, RenderSurface};
pub use transform::{Camera, canvas_to_screen, screen_to_canvas};
pub use zoom::{elastic_clamp, elastic_zoom, is_comfortable, wheel_zoom, zoom_about};
