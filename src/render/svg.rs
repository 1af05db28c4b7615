//! SVG diagram renderer
//!
//! Thin adapter: [`layout::compute`] decides where things go, the renderer
//! only maps the positioned diagram onto surface elements.

use tracing::{debug, instrument};

use crate::config::CanvasConfig;
use crate::domain::layout::{self, Diagram, PositionedNode};
use crate::domain::LayoutNode;
use crate::render::surface::{DiagramSurface, NodeElement, SvgElement};

pub const DIAGRAM_TITLE: &str = "Parse Tree Visualization";

/// Colours, sizes and timings of the drawn diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramStyle {
    pub node_radius: f64,
    pub hover_radius: f64,
    pub operator_fill: &'static str,
    pub operator_hover_fill: &'static str,
    pub operand_fill: &'static str,
    pub operand_hover_fill: &'static str,
    /// Node outline, indexed by depth
    pub stroke_palette: [&'static str; 5],
    pub stroke_width: f64,
    pub link_color: &'static str,
    pub link_width: f64,
    /// Gap between edge end and child centre, room for the arrowhead
    pub arrow_inset: f64,
    pub label_offset: f64,
    pub font_size: f64,
    pub title_color: &'static str,
    pub hover_in_ms: u32,
    pub hover_out_ms: u32,
}

impl Default for DiagramStyle {
    fn default() -> Self {
        Self {
            node_radius: 10.0,
            hover_radius: 15.0,
            operator_fill: "#ff8c00",
            operator_hover_fill: "#ff6600",
            operand_fill: "#4682b4",
            operand_hover_fill: "#3498db",
            stroke_palette: ["#2c3e50", "#3498db", "#2ecc71", "#9b59b6", "#e74c3c"],
            stroke_width: 2.0,
            link_color: "#999",
            link_width: 1.5,
            arrow_inset: 10.0,
            label_offset: 20.0,
            font_size: 12.0,
            title_color: "#2c3e50",
            hover_in_ms: 200,
            hover_out_ms: 500,
        }
    }
}

impl DiagramStyle {
    pub fn stroke_for_depth(&self, depth: usize) -> &'static str {
        self.stroke_palette[depth % self.stroke_palette.len()]
    }

    fn node_element(&self, node: &PositionedNode) -> NodeElement {
        let (fill, hover_fill) = if node.is_operator {
            (self.operator_fill, self.operator_hover_fill)
        } else {
            (self.operand_fill, self.operand_hover_fill)
        };
        NodeElement {
            position: node.position,
            label: node.label.clone(),
            is_operator: node.is_operator,
            has_children: node.has_children,
            fill,
            hover_fill,
            stroke: self.stroke_for_depth(node.depth),
            label_y: if node.has_children {
                -self.label_offset
            } else {
                self.label_offset
            },
            tooltip: node.tooltip(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagramRenderer {
    canvas: CanvasConfig,
    style: DiagramStyle,
}

impl DiagramRenderer {
    pub fn new(canvas: CanvasConfig) -> Self {
        Self {
            canvas,
            style: DiagramStyle::default(),
        }
    }

    pub fn with_style(mut self, style: DiagramStyle) -> Self {
        self.style = style;
        self
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    /// Lay out `root` and draw it, replacing whatever `surface` held.
    #[instrument(level = "debug", skip_all, fields(root = %root.label))]
    pub fn render(&self, root: &LayoutNode, surface: &mut DiagramSurface) -> Diagram {
        surface.reset(self.canvas, self.style);
        let diagram = layout::compute(root, self.canvas.extent());
        self.draw(&diagram, surface);
        debug!(
            "rendered {} nodes, {} edges",
            diagram.nodes.len(),
            diagram.links.len()
        );
        diagram
    }

    /// Paint order: marker, edges, nodes, title.
    fn draw(&self, diagram: &Diagram, surface: &mut DiagramSurface) {
        surface.push(SvgElement::ArrowMarker);
        for link in &diagram.links {
            surface.push(SvgElement::Edge {
                path: link.path_data(self.style.arrow_inset),
            });
        }
        for node in &diagram.nodes {
            surface.push(SvgElement::Node(self.style.node_element(node)));
        }
        surface.push(SvgElement::Title {
            x: diagram.extent.width / 2.0,
            y: -self.canvas.margin_top / 2.0,
            text: DIAGRAM_TITLE.to_string(),
        });
    }
}
