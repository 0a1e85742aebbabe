//! Node types.
//!
//! A node is a rectangle on the canvas with a place in the parent/child
//! forest. Each node has:
//! - A stable string identifier chosen by the host
//! - A parent reference: the canvas root or another node
//! - Top-left position and size in canvas units
//! - A stacking order (`zIndex`)
//! - A kind tag owned by the host's node-type system

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::geometry::{Bounds, Point};

/// Sentinel used for the canvas root in `parentId`.
pub const ROOT_ID: &str = "root";

/// Stable node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the id reserved by the root sentinel.
    pub fn is_reserved(&self) -> bool {
        self.0 == ROOT_ID
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where a node hangs in the forest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentRef {
    /// The fixed canvas root at the origin.
    Root,
    Node(NodeId),
}

impl ParentRef {
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            ParentRef::Root => None,
            ParentRef::Node(id) => Some(id),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, ParentRef::Root)
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::Root => f.write_str(ROOT_ID),
            ParentRef::Node(id) => id.fmt(f),
        }
    }
}

impl From<NodeId> for ParentRef {
    fn from(id: NodeId) -> Self {
        ParentRef::Node(id)
    }
}

impl From<&str> for ParentRef {
    fn from(id: &str) -> Self {
        if id == ROOT_ID {
            ParentRef::Root
        } else {
            ParentRef::Node(NodeId::from(id))
        }
    }
}

impl Serialize for ParentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParentRef::Root => serializer.serialize_str(ROOT_ID),
            ParentRef::Node(id) => serializer.serialize_str(id.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for ParentRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ParentRef::from(raw.as_str()))
    }
}

/// Node variants, flattened into the node record under a `type` tag. Only
/// the host cares which one a node is.
///
/// A record with no `type`, or one this crate does not know, reads as
/// `Unknown` so plain positional records always load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    Terminal {
        #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },
    Markdown {
        #[serde(default)]
        content: String,
    },
    #[default]
    Unknown,
}

/// The variant fields a flattened node record may carry.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawKind {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawKind::deserialize(deserializer)?;
        Ok(match raw.kind.as_deref() {
            Some("terminal") => NodeKind::Terminal { session_id: raw.session_id },
            Some("markdown") => NodeKind::Markdown {
                content: raw.content.unwrap_or_default(),
            },
            _ => NodeKind::Unknown,
        })
    }
}

/// A positioned node in the forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub parent_id: ParentRef,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub z_index: u32,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn new(
        id: impl Into<NodeId>,
        parent_id: ParentRef,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id,
            x,
            y,
            width,
            height,
            z_index: 0,
            kind: NodeKind::Unknown,
        }
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Move so the node's center lands on `center`.
    pub fn set_center(&mut self, center: Point) {
        self.x = center.x - self.width / 2.0;
        self.y = center.y - self.height / 2.0;
    }
}

/// A batched position delta produced by the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMove {
    /// Node to move.
    pub id: NodeId,
    /// Canvas-space x offset.
    pub dx: f64,
    /// Canvas-space y offset.
    pub dy: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new("term-1");
        assert_eq!(id.as_str(), "term-1");
        assert_eq!(format!("{}", id), "term-1");
        assert!(NodeId::from("root").is_reserved());
    }

    #[test]
    fn test_parent_ref_from_str() {
        assert_eq!(ParentRef::from("root"), ParentRef::Root);
        assert_eq!(ParentRef::from("a"), ParentRef::Node(NodeId::from("a")));
        assert_eq!(ParentRef::Root.to_string(), "root");
    }

    #[test]
    fn test_center_and_bounds() {
        let mut node = Node::new("a", ParentRef::Root, 10.0, 20.0, 100.0, 50.0);
        assert_eq!(node.center(), Point::new(60.0, 45.0));
        node.set_center(Point::ORIGIN);
        assert_eq!(node.bounds(), Bounds::new(-50.0, -25.0, 100.0, 50.0));
    }

    #[test]
    fn test_serialized_shape() {
        let node = Node::new("a", ParentRef::Root, 1.0, 2.0, 3.0, 4.0).with_kind(NodeKind::Terminal {
            session_id: Some("s1".into()),
        });
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["parentId"], "root");
        assert_eq!(json["zIndex"], 0);
        assert_eq!(json["type"], "terminal");
        assert_eq!(json["sessionId"], "s1");
    }

    #[test]
    fn test_unknown_kind_and_missing_fields() {
        let node: Node = serde_json::from_str(
            r#"{"id":"b","parentId":"a","x":0,"y":0,"width":10,"height":10,"type":"whiteboard"}"#,
        )
        .unwrap();
        assert_eq!(node.parent_id, ParentRef::Node(NodeId::from("a")));
        assert_eq!(node.kind, NodeKind::Unknown);
        assert_eq!(node.z_index, 0);
    }

    #[test]
    fn test_record_without_type_loads_as_unknown() {
        let node: Node =
            serde_json::from_str(r#"{"id":"a","parentId":"root","x":0,"y":0,"width":10,"height":10}"#).unwrap();
        assert_eq!(node.parent_id, ParentRef::Root);
        assert_eq!(node.kind, NodeKind::Unknown);

        let markdown: Node = serde_json::from_str(
            r#"{"id":"m","parentId":"root","x":0,"y":0,"width":10,"height":10,"type":"markdown","content":"hi"}"#,
        )
        .unwrap();
        assert_eq!(markdown.kind, NodeKind::Markdown { content: "hi".into() });
    }
}
