//! Continuous force-directed layout.
//!
//! Each tick:
//! 1. Rebuild bodies from the tree (fixed root at the origin)
//! 2. Repel every overlapping pair of padded rectangles
//! 3. Pull children that drifted past the target distance back toward
//!    their parent, with a weaker reaction on the parent
//! 4. Integrate: divide by subtree mass, cap to a uniform speed, drop
//!    negligible moves
//!
//! The output is one batch of `NodeMove`s for the host to apply at once.
//! Pinned bodies (being dragged) and the root exert forces but never move.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::body::{Body, build_bodies};
use crate::config::{COINCIDENT_DISTANCE, DEFAULT_SPEED_MULTIPLIER, ForceConfig, MIN_DISPLACEMENT, NEGLIGIBLE_FORCE};
use crate::geometry::Point;
use crate::graph::{NodeId, NodeMove, NodeTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutState {
    Stopped,
    Running,
}

pub struct ForceLayout {
    config: ForceConfig,
    state: LayoutState,
    speed_multiplier: f64,
    pinned: IndexSet<NodeId>,
}

impl ForceLayout {
    pub fn new(config: ForceConfig) -> Self {
        Self {
            config,
            state: LayoutState::Stopped,
            speed_multiplier: DEFAULT_SPEED_MULTIPLIER,
            pinned: IndexSet::new(),
        }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LayoutState::Running
    }

    pub fn start(&mut self) {
        if self.state != LayoutState::Running {
            tracing::debug!("force layout started");
            self.state = LayoutState::Running;
        }
    }

    pub fn stop(&mut self) {
        if self.state != LayoutState::Stopped {
            tracing::debug!("force layout stopped");
            self.state = LayoutState::Stopped;
        }
    }

    pub fn toggle(&mut self) -> LayoutState {
        match self.state {
            LayoutState::Running => self.stop(),
            LayoutState::Stopped => self.start(),
        }
        self.state
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Double the simulation speed, up to the configured maximum.
    pub fn faster(&mut self) -> f64 {
        self.speed_multiplier = (self.speed_multiplier * 2.0).min(self.config.max_speed_multiplier);
        tracing::debug!(multiplier = self.speed_multiplier, "layout speed");
        self.speed_multiplier
    }

    /// Halve the simulation speed, down to the configured minimum.
    pub fn slower(&mut self) -> f64 {
        self.speed_multiplier = (self.speed_multiplier / 2.0).max(self.config.min_speed_multiplier);
        tracing::debug!(multiplier = self.speed_multiplier, "layout speed");
        self.speed_multiplier
    }

    // =========================================================================
    // Pins
    // =========================================================================

    pub fn pin(&mut self, id: NodeId) {
        self.pinned.insert(id);
    }

    pub fn unpin(&mut self, id: &NodeId) {
        self.pinned.shift_remove(id);
    }

    pub fn is_pinned(&self, id: &NodeId) -> bool {
        self.pinned.contains(id)
    }

    pub fn clear_pins(&mut self) {
        self.pinned.clear();
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advance by a frame of `dt` seconds. Returns no moves while stopped.
    pub fn tick(&self, tree: &NodeTree, dt: f64) -> Vec<NodeMove> {
        if !self.is_running() || !(dt > 0.0) {
            return Vec::new();
        }
        let sim_dt = dt * self.speed_multiplier;
        let bodies = build_bodies(tree, &self.pinned, self.config.root_radius);
        let forces = compute_forces(&bodies, &self.config);
        let moves = integrate(&bodies, &forces, sim_dt, &self.config);
        tracing::trace!(dt = sim_dt, bodies = bodies.len(), moves = moves.len(), "layout tick");
        moves
    }
}

/// Accumulated force on every body.
pub fn compute_forces(bodies: &[Body], config: &ForceConfig) -> Vec<Point> {
    let mut forces = vec![Point::ORIGIN; bodies.len()];
    apply_repulsion(bodies, &mut forces, config);
    apply_attraction(bodies, &mut forces, config);
    forces
}

fn apply_repulsion(bodies: &[Body], forces: &mut [Point], config: &ForceConfig) {
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let a = &bodies[i];
            let b = &bodies[j];
            let delta = b.center - a.center;
            let overlap_x = a.half.x + b.half.x + config.padding - delta.x.abs();
            let overlap_y = a.half.y + b.half.y + config.padding - delta.y.abs();
            if overlap_x <= 0.0 || overlap_y <= 0.0 {
                continue;
            }

            // Coincident centers: push the lower index left, the higher right.
            let direction = if delta.length() < COINCIDENT_DISTANCE {
                Point::new(1.0, 0.0)
            } else {
                delta / delta.length()
            };
            let push = direction * (overlap_x.min(overlap_y) * config.repulsion_strength);
            forces[i] -= push;
            forces[j] += push;
        }
    }
}

fn apply_attraction(bodies: &[Body], forces: &mut [Point], config: &ForceConfig) {
    for (i, body) in bodies.iter().enumerate() {
        if body.fixed {
            continue;
        }
        let Some(p) = body.parent else {
            continue;
        };
        let delta = bodies[p].center - body.center;
        let distance = delta.length();
        if distance <= config.target_distance {
            continue;
        }
        let Some(direction) = delta.normalized() else {
            continue;
        };
        let pull = direction * ((distance - config.target_distance) * config.attraction_strength);
        forces[i] += pull;
        forces[p] -= pull * config.parent_pull_fraction;
    }
}

/// Turn forces into displacements for the movable bodies.
pub fn integrate(bodies: &[Body], forces: &[Point], dt: f64, config: &ForceConfig) -> Vec<NodeMove> {
    let cap = config.max_speed * dt;
    bodies
        .iter()
        .zip(forces)
        .filter(|(body, _)| body.is_movable())
        .filter_map(|(body, &force)| {
            if force.length() < NEGLIGIBLE_FORCE {
                return None;
            }
            let mut step = force / body.mass.max(1.0) * dt;
            let length = step.length();
            if length > cap {
                step = step * (cap / length);
            }
            if step.length() < MIN_DISPLACEMENT {
                return None;
            }
            Some(NodeMove {
                id: body.id.clone()?,
                dx: step.x,
                dy: step.y,
            })
        })
        .collect()
}
