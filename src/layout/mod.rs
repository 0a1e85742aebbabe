//! Layout: the continuous force simulation and the placement heuristic for
//! new children.

mod body;
mod force;
mod placement;

pub use body::{Body, build_bodies, compute_masses};
pub use force::{ForceLayout, LayoutState, compute_forces, integrate};
pub use placement::{child_center, choose_angle, place_child};
