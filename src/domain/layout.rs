//! Tidy top-down tree layout
//!
//! Leaves take consecutive horizontal slots in left-to-right order and every
//! operator sits midway between its first and last child. Subtrees therefore
//! occupy disjoint slot ranges, which keeps nodes of the same depth apart.
//! Depth maps linearly onto the vertical extent, root at the top.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::Hierarchy;
use crate::domain::LayoutNode;

/// Drawable area, margins excluded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Node with its computed position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub label: String,
    pub is_operator: bool,
    pub has_children: bool,
    pub depth: usize,
    pub position: Point,
}

impl PositionedNode {
    pub fn tooltip(&self) -> String {
        if self.is_operator {
            format!("Operator: {}", self.label)
        } else {
            format!("Value: {}", self.label)
        }
    }
}

/// Parent → child connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub source: Point,
    pub target: Point,
}

impl Link {
    /// Cubic curve from parent to child, ending `inset` above the child centre
    /// so the arrow marker stays visible.
    pub fn path_data(&self, inset: f64) -> String {
        let mid_y = (self.source.y + self.target.y) / 2.0;
        format!(
            "M{},{} C{},{} {},{} {},{}",
            fmt_coord(self.source.x),
            fmt_coord(self.source.y),
            fmt_coord(self.source.x),
            fmt_coord(mid_y),
            fmt_coord(self.target.x),
            fmt_coord(mid_y),
            fmt_coord(self.target.x),
            fmt_coord(self.target.y - inset),
        )
    }
}

/// Geometry of a whole diagram, independent of any drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub extent: Extent,
    /// Pre-order, root first
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<Link>,
}

impl Diagram {
    pub fn root(&self) -> Option<&PositionedNode> {
        self.nodes.first()
    }
}

/// Assign positions to every node of `hierarchy`.
#[instrument(level = "debug", skip(hierarchy), fields(nodes = hierarchy.len()))]
pub fn tidy_layout(hierarchy: &mut Hierarchy, extent: Extent) {
    // Slot coordinates first, children before parents.
    let mut slots: HashMap<Index, f64> = HashMap::with_capacity(hierarchy.len());
    let mut next_leaf = 0usize;
    for (idx, node) in hierarchy.iter_postorder() {
        let slot = match (node.children.first(), node.children.last()) {
            (Some(first), Some(last)) => {
                let first = slots.get(first).copied().unwrap_or_default();
                let last = slots.get(last).copied().unwrap_or_default();
                (first + last) / 2.0
            }
            _ => {
                let slot = next_leaf as f64;
                next_leaf += 1;
                slot
            }
        };
        slots.insert(idx, slot);
    }

    let leaves = next_leaf.max(1) as f64;
    let max_depth = hierarchy.max_depth();
    debug!("layout: {} leaves, max depth {}", next_leaf, max_depth);

    for (idx, slot) in slots {
        if let Some(node) = hierarchy.get_node_mut(idx) {
            // Half a slot of padding on both sides; a lone node is centred.
            node.data.x = (slot + 0.5) / leaves * extent.width;
            node.data.y = if max_depth == 0 {
                0.0
            } else {
                node.data.depth as f64 / max_depth as f64 * extent.height
            };
        }
    }
}

/// Lay out `root` within `extent` and collect positioned nodes and links.
pub fn compute(root: &LayoutNode, extent: Extent) -> Diagram {
    let mut hierarchy = Hierarchy::from_layout(root);
    tidy_layout(&mut hierarchy, extent);

    let nodes = hierarchy
        .iter()
        .map(|(_, node)| PositionedNode {
            label: node.data.label.clone(),
            is_operator: node.data.is_operator,
            has_children: !node.is_leaf(),
            depth: node.data.depth,
            position: Point {
                x: node.data.x,
                y: node.data.y,
            },
        })
        .collect();

    let links = hierarchy
        .links()
        .into_iter()
        .filter_map(|(parent, child)| {
            let source = hierarchy.get_node(parent)?;
            let target = hierarchy.get_node(child)?;
            Some(Link {
                source: Point {
                    x: source.data.x,
                    y: source.data.y,
                },
                target: Point {
                    x: target.data.x,
                    y: target.data.y,
                },
            })
        })
        .collect();

    Diagram {
        extent,
        nodes,
        links,
    }
}

/// Round to two decimals and drop trailing zeros.
pub fn fmt_coord(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{}", rounded)
}
