//! Bodies: the per-tick physics view of the node tree.
//!
//! Rebuilt from scratch every tick. Index 0 is always the fixed root at the
//! origin; the rest follow node insertion order.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::geometry::Point;
use crate::graph::{NodeId, NodeTree, ParentRef};

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// `None` for the root.
    pub id: Option<NodeId>,
    pub center: Point,
    /// Half width and half height.
    pub half: Point,
    /// Index of the parent body. `None` for the root and for orphans.
    pub parent: Option<usize>,
    pub fixed: bool,
    pub pinned: bool,
    pub mass: f64,
}

impl Body {
    pub fn root(radius: f64) -> Self {
        Self {
            id: None,
            center: Point::ORIGIN,
            half: Point::new(radius, radius),
            parent: None,
            fixed: true,
            pinned: false,
            mass: 1.0,
        }
    }

    /// Whether the integrator may move this body.
    #[inline]
    pub fn is_movable(&self) -> bool {
        !self.fixed && !self.pinned
    }
}

/// Build bodies for every node plus the root.
pub fn build_bodies(tree: &NodeTree, pinned: &IndexSet<NodeId>, root_radius: f64) -> Vec<Body> {
    let mut bodies = Vec::with_capacity(tree.len() + 1);
    bodies.push(Body::root(root_radius));

    let slots: HashMap<&NodeId, usize> = tree.ids().enumerate().map(|(i, id)| (id, i + 1)).collect();

    for node in tree.iter() {
        let parent = match &node.parent_id {
            ParentRef::Root => Some(0),
            ParentRef::Node(pid) => slots.get(pid).copied(),
        };
        bodies.push(Body {
            id: Some(node.id.clone()),
            center: node.center(),
            half: Point::new(node.width / 2.0, node.height / 2.0),
            parent,
            fixed: false,
            pinned: pinned.contains(&node.id),
            mass: 1.0,
        });
    }

    compute_masses(&mut bodies);
    bodies
}

/// Mass = 1 + number of descendants.
///
/// Each non-fixed body adds one to every ancestor on its chain. The walk is
/// bounded by the body count so a corrupt parent chain can't loop forever.
pub fn compute_masses(bodies: &mut [Body]) {
    for body in bodies.iter_mut() {
        body.mass = 1.0;
    }
    let limit = bodies.len();
    for i in 0..bodies.len() {
        if bodies[i].fixed {
            continue;
        }
        let mut cursor = bodies[i].parent;
        let mut steps = 0;
        while let Some(p) = cursor {
            if steps >= limit {
                tracing::warn!("parent chain longer than the tree, stopping mass walk");
                break;
            }
            bodies[p].mass += 1.0;
            cursor = bodies[p].parent;
            steps += 1;
        }
    }
}
