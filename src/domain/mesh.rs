//! Computational mesh model
//!
//! The unstructured triangular mesh read from `fort.14`: node coordinates
//! with bathymetric depth, element connectivity, and the boundary table
//! (preserved verbatim so a written mesh round-trips).

use crate::domain::errors::GridError;
use crate::domain::ids::NodeId;
use serde::{Deserialize, Serialize};

/// A mesh node: horizontal position and bathymetric depth
///
/// Depth is positive downward, so a water-surface elevation plus the depth
/// gives total water column height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

/// A triangular element referencing three nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub nodes: [NodeId; 3],
}

/// The computational mesh
///
/// Nodes are stored in id order; `NodeId` 1 is `nodes[0]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    /// Mesh name from the fort.14 header line
    pub name: String,
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    /// Boundary table lines after the element block, kept verbatim
    pub boundary_lines: Vec<String>,
}

impl Mesh {
    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Looks up a node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Bathymetric depth of every node, in id order
    pub fn depths(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.depth).collect()
    }

    /// Checks that every element references an existing node
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DanglingNode`] for the first out-of-range
    /// reference found.
    pub fn validate(&self) -> Result<(), GridError> {
        for (e, element) in self.elements.iter().enumerate() {
            for node in element.nodes {
                if node.index() >= self.nodes.len() {
                    return Err(GridError::DanglingNode {
                        element: e + 1,
                        node: node.get(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Finds the node closest to (x, y) by Euclidean distance
    ///
    /// Linear scan; meshes are read once per campaign so this is not on a
    /// hot path. Returns `None` for an empty mesh.
    pub fn nearest_node(&self, x: f64, y: f64) -> Option<NodeId> {
        let mut best: Option<(usize, f64)> = None;
        for (i, node) in self.nodes.iter().enumerate() {
            let d2 = (node.x - x).powi(2) + (node.y - y).powi(2);
            match best {
                Some((_, b)) if b <= d2 => {}
                _ => best = Some((i, d2)),
            }
        }
        best.map(|(i, _)| NodeId::from_index(i))
    }
}
