use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::LayoutNode;

/// Payload of a hierarchy node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub label: String,
    pub is_operator: bool,
    /// Distance from the root, root is 0
    pub depth: usize,
    /// Horizontal position, assigned by the layout
    pub x: f64,
    /// Vertical position, assigned by the layout
    pub y: f64,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in left-to-right order
    pub children: Vec<Index>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-based hierarchy built from a [`LayoutNode`] tree.
///
/// Carries parent links and depths so the layout can walk it iteratively
/// and the renderer can enumerate parent-child links.
#[derive(Debug)]
pub struct Hierarchy {
    arena: Arena<TreeNode>,
    root: Option<Index>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Build a hierarchy mirroring `root`, children kept in order.
    #[instrument(level = "debug", skip(root), fields(label = %root.label))]
    pub fn from_layout(root: &LayoutNode) -> Self {
        let mut hierarchy = Self::new();
        let mut pending: Vec<(&LayoutNode, Option<Index>, usize)> = vec![(root, None, 0)];
        while let Some((node, parent, depth)) = pending.pop() {
            let data = NodeData {
                label: node.label.clone(),
                is_operator: node.is_operator,
                depth,
                x: 0.0,
                y: 0.0,
            };
            let idx = hierarchy.insert_node(data, parent);
            // Reserve child slots in order; the stack pops them left first.
            for child in node.children.iter().rev() {
                pending.push((child, Some(idx), depth + 1));
            }
        }
        hierarchy
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal, left to right.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Post-order traversal, children before parents.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Deepest node depth (root only → 0).
    pub fn max_depth(&self) -> usize {
        self.iter().map(|(_, node)| node.data.depth).max().unwrap_or(0)
    }

    /// Parent-child pairs in pre-order of the child.
    pub fn links(&self) -> Vec<(Index, Index)> {
        self.iter()
            .filter_map(|(idx, node)| node.parent.map(|parent| (parent, idx)))
            .collect()
    }

    /// Leaf labels in left-to-right order.
    pub fn leaf_labels(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.data.label.clone())
            .collect()
    }
}

pub struct TreeIterator<'a> {
    arena: &'a Hierarchy,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a Hierarchy) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a Hierarchy,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a Hierarchy) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
