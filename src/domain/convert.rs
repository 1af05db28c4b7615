//! Parse tree → layout hierarchy conversion

use termtree::Tree;
use tracing::instrument;

use crate::domain::{LayoutNode, ParseTreeNode};

/// Convert a parse tree into the uniform layout hierarchy.
///
/// Operands become childless nodes labelled with their value; operators keep
/// their symbol and convert `left` then `right`. Child order drives
/// left-to-right placement in the diagram.
#[instrument(level = "trace", skip(tree))]
pub fn to_layout(tree: &ParseTreeNode) -> LayoutNode {
    match tree {
        ParseTreeNode::Operand(value) => LayoutNode::leaf(value.clone()),
        ParseTreeNode::Operator {
            symbol,
            left,
            right,
        } => LayoutNode {
            label: symbol.clone(),
            is_operator: true,
            children: vec![to_layout(left), to_layout(right)],
        },
    }
}

impl From<&ParseTreeNode> for LayoutNode {
    fn from(tree: &ParseTreeNode) -> Self {
        to_layout(tree)
    }
}

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeDisplay for LayoutNode {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(self.label.clone()).with_leaves(leaves)
    }
}
