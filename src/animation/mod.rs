//! Frame-driven animation scaffolding shared by the camera and the layout
//! engine: a cancellable per-frame loop with a capped time step, and
//! debounce timers on the same clock.

mod debounce;
mod frame_loop;

pub use debounce::Debounce;
pub use frame_loop::{Animate, FrameLoop, Progress};
