//! NodeTree - the parent/child forest of canvas nodes.
//!
//! Records live in an `IndexMap` so iteration follows insertion order, which
//! is the order layout and hit-testing break ties in. Topology is mirrored in
//! a petgraph `StableGraph` with one vertex for the canvas root and one per
//! node, edges pointing parent → child. Orphans (nodes whose parent id names
//! nothing) have no incoming edge.

use indexmap::IndexMap;
use petgraph::Directed;
use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;

use super::node::{Node, NodeId, NodeMove, ParentRef};
use crate::error::{Error, Result};
use crate::geometry::{Bounds, Point};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Vertex {
    Root,
    Node(NodeId),
}

/// Everything needed to put a removed node back.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    /// Position in insertion order at removal time.
    pub order: usize,
    /// Children that were re-parented to the removed node's parent.
    pub children: Vec<NodeId>,
}

pub struct NodeTree {
    nodes: IndexMap<NodeId, Node>,
    graph: StableGraph<Vertex, (), Directed>,
    index: IndexMap<NodeId, NodeIndex>,
    root: NodeIndex,
    next_z: u32,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    pub fn new() -> Self {
        let mut graph = StableGraph::new();
        let root = graph.add_node(Vertex::Root);
        Self {
            nodes: IndexMap::new(),
            graph,
            index: IndexMap::new(),
            root,
            next_z: 1,
        }
    }

    /// Build from a loaded list. Lenient: duplicates are dropped, missing
    /// parents leave the node orphaned, and a node whose parent link would
    /// close a cycle is re-parented to the root.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut tree = Self::new();

        for node in nodes {
            if node.id.is_reserved() {
                tracing::warn!(id = %node.id, "skipping node with reserved id");
                continue;
            }
            if tree.nodes.contains_key(&node.id) {
                tracing::warn!(id = %node.id, "skipping duplicate node");
                continue;
            }
            let idx = tree.graph.add_node(Vertex::Node(node.id.clone()));
            tree.index.insert(node.id.clone(), idx);
            tree.next_z = tree.next_z.max(node.z_index.saturating_add(1));
            tree.nodes.insert(node.id.clone(), node);
        }

        let ids: Vec<NodeId> = tree.nodes.keys().cloned().collect();
        for id in ids {
            let Some(parent) = tree.nodes.get(&id).map(|n| n.parent_id.clone()) else {
                continue;
            };
            let child_idx = tree.index[&id];
            match parent {
                ParentRef::Root => {
                    tree.graph.add_edge(tree.root, child_idx, ());
                }
                ParentRef::Node(parent_id) => match tree.index.get(&parent_id).copied() {
                    Some(parent_idx) => {
                        if parent_idx == child_idx
                            || has_path_connecting(&tree.graph, child_idx, parent_idx, None)
                        {
                            tracing::warn!(id = %id, parent = %parent_id, "parent cycle, attaching to root");
                            tree.graph.add_edge(tree.root, child_idx, ());
                            if let Some(node) = tree.nodes.get_mut(&id) {
                                node.parent_id = ParentRef::Root;
                            }
                        } else {
                            tree.graph.add_edge(parent_idx, child_idx, ());
                        }
                    }
                    None => {
                        tracing::warn!(id = %id, parent = %parent_id, "orphaned parent reference");
                    }
                },
            }
        }

        tree
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Direct children of `parent`, in insertion order.
    pub fn children<'a>(&'a self, parent: &'a ParentRef) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.values().filter(move |n| &n.parent_id == parent)
    }

    /// Center of `parent`: the origin for the root.
    pub fn parent_center(&self, parent: &ParentRef) -> Option<Point> {
        match parent {
            ParentRef::Root => Some(Point::ORIGIN),
            ParentRef::Node(id) => self.nodes.get(id).map(Node::center),
        }
    }

    /// Union of every node's rectangle.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::union_all(self.nodes.values().map(Node::bounds))
    }

    /// The z-index the next raised or created node should take.
    pub fn next_z_index(&self) -> u32 {
        self.next_z
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Never hand out a z-index below `z`.
    pub fn reserve_z_index(&mut self, z: u32) {
        self.next_z = self.next_z.max(z);
    }

    /// Insert a new node. Its parent must already exist.
    pub fn insert(&mut self, node: Node) -> Result<()> {
        if node.id.is_reserved() {
            return Err(Error::ReservedId);
        }
        if self.nodes.contains_key(&node.id) {
            return Err(Error::DuplicateNode(node.id));
        }
        let parent_idx = self.parent_index(&node.parent_id)?;

        let idx = self.graph.add_node(Vertex::Node(node.id.clone()));
        self.graph.add_edge(parent_idx, idx, ());
        self.index.insert(node.id.clone(), idx);
        self.next_z = self.next_z.max(node.z_index.saturating_add(1));
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Remove a node. Its children move up to its parent.
    pub fn remove(&mut self, id: &NodeId) -> Result<RemovedNode> {
        let order = self
            .nodes
            .get_index_of(id)
            .ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        let idx = self.index[id];

        let parent_idx = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .next()
            .map(|e| e.source());
        let child_indices: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect();

        let Some(node) = self.nodes.shift_remove(id) else {
            return Err(Error::NodeNotFound(id.clone()));
        };
        self.index.shift_remove(id);
        self.graph.remove_node(idx);

        let mut children = Vec::with_capacity(child_indices.len());
        for child_idx in child_indices {
            if let Some(parent_idx) = parent_idx {
                self.graph.add_edge(parent_idx, child_idx, ());
            }
            if let Some(Vertex::Node(child_id)) = self.graph.node_weight(child_idx) {
                if let Some(child) = self.nodes.get_mut(child_id) {
                    child.parent_id = node.parent_id.clone();
                }
                children.push(child_id.clone());
            }
        }
        children.sort_by_key(|c| self.nodes.get_index_of(c));

        Ok(RemovedNode { node, order, children })
    }

    /// Put a removed node back at its old position and reclaim the children
    /// that still hang where it left them.
    pub fn restore(&mut self, removed: RemovedNode) -> Result<()> {
        let RemovedNode { mut node, order, children } = removed;
        if self.nodes.contains_key(&node.id) {
            return Err(Error::DuplicateNode(node.id));
        }
        let parent_idx = match self.parent_index(&node.parent_id) {
            Ok(idx) => idx,
            Err(_) => {
                tracing::warn!(id = %node.id, parent = %node.parent_id, "parent gone, restoring under root");
                node.parent_id = ParentRef::Root;
                self.root
            }
        };

        let id = node.id.clone();
        let idx = self.graph.add_node(Vertex::Node(id.clone()));
        self.graph.add_edge(parent_idx, idx, ());
        let at = order.min(self.nodes.len());
        self.nodes.shift_insert(at, id.clone(), node.clone());
        self.index.insert(id.clone(), idx);

        for child_id in children {
            let still_there = self
                .nodes
                .get(&child_id)
                .is_some_and(|c| c.parent_id == node.parent_id);
            if still_there {
                self.relink(&child_id, ParentRef::Node(id.clone()))?;
            }
        }
        Ok(())
    }

    /// Move `id` under `parent`, refusing moves that would make a node its
    /// own ancestor.
    pub fn set_parent(&mut self, id: &NodeId, parent: ParentRef) -> Result<()> {
        let &idx = self.index.get(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        let parent_idx = self.parent_index(&parent)?;
        if parent_idx == idx || has_path_connecting(&self.graph, idx, parent_idx, None) {
            return Err(Error::WouldCreateCycle {
                node: id.clone(),
                parent: parent.node().cloned().unwrap_or_else(|| id.clone()),
            });
        }
        self.relink(id, parent)
    }

    pub fn set_position(&mut self, id: &NodeId, x: f64, y: f64) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    /// Apply a batch of layout deltas. Unknown ids are skipped.
    pub fn apply_moves(&mut self, moves: &[NodeMove]) -> usize {
        let mut applied = 0;
        for m in moves {
            if let Some(node) = self.nodes.get_mut(&m.id) {
                node.x += m.dx;
                node.y += m.dy;
                applied += 1;
            } else {
                tracing::warn!(id = %m.id, "move for unknown node");
            }
        }
        applied
    }

    /// Raise `id` above every other node. Returns its new z-index.
    pub fn bring_to_front(&mut self, id: &NodeId) -> Result<u32> {
        let z = self.next_z;
        let node = self.nodes.get_mut(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        node.z_index = z;
        self.next_z = z.saturating_add(1);
        Ok(z)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn parent_index(&self, parent: &ParentRef) -> Result<NodeIndex> {
        match parent {
            ParentRef::Root => Ok(self.root),
            ParentRef::Node(pid) => self
                .index
                .get(pid)
                .copied()
                .ok_or_else(|| Error::ParentNotFound(pid.clone())),
        }
    }

    fn relink(&mut self, id: &NodeId, parent: ParentRef) -> Result<()> {
        let &idx = self.index.get(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        let parent_idx = self.parent_index(&parent)?;
        let incoming: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.id())
            .collect();
        for edge in incoming {
            self.graph.remove_edge(edge);
        }
        self.graph.add_edge(parent_idx, idx, ());
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent_id = parent;
        }
        Ok(())
    }
}
