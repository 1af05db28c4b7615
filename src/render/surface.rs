//! Diagram drawing target
//!
//! A [`DiagramSurface`] is the region one diagram is drawn into. It holds a
//! flat list of elements in paint order and serializes them to SVG.

use std::fmt::Write;

use crate::config::CanvasConfig;
use crate::domain::layout::fmt_coord;
use crate::domain::Point;
use crate::render::html::escape;
use crate::render::svg::DiagramStyle;

/// Drawn node: circle plus label, with hover appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeElement {
    pub position: Point,
    pub label: String,
    pub is_operator: bool,
    pub has_children: bool,
    pub fill: &'static str,
    pub hover_fill: &'static str,
    pub stroke: &'static str,
    /// Label offset from the node centre
    pub label_y: f64,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SvgElement {
    ArrowMarker,
    Edge { path: String },
    Node(NodeElement),
    Title { x: f64, y: f64, text: String },
}

/// Drawing target for exactly one diagram at a time.
#[derive(Debug, Clone, Default)]
pub struct DiagramSurface {
    canvas: CanvasConfig,
    style: DiagramStyle,
    elements: Vec<SvgElement>,
}

impl DiagramSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every element, keeping the frame.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Clear and set the frame for the next diagram.
    pub fn reset(&mut self, canvas: CanvasConfig, style: DiagramStyle) {
        self.clear();
        self.canvas = canvas;
        self.style = style;
    }

    pub fn push(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeElement> {
        self.elements.iter().filter_map(|e| match e {
            SvgElement::Node(node) => Some(node),
            _ => None,
        })
    }

    pub fn edge_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, SvgElement::Edge { .. }))
            .count()
    }

    /// Serialize as a standalone SVG document; empty surfaces yield an empty frame.
    pub fn to_svg(&self) -> String {
        let canvas = &self.canvas;
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="parse-tree" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = fmt_coord(canvas.width),
            h = fmt_coord(canvas.height),
        );
        if self.elements.is_empty() {
            svg.push_str("</svg>\n");
            return svg;
        }

        let _ = writeln!(svg, "<style>{}</style>", self.stylesheet());
        let _ = writeln!(
            svg,
            r#"<g transform="translate({},{})">"#,
            fmt_coord(canvas.margin_left),
            fmt_coord(canvas.margin_top)
        );
        for element in &self.elements {
            self.write_element(&mut svg, element);
        }
        svg.push_str("</g>\n");
        svg.push_str(concat!(
            r#"<g class="tooltip" pointer-events="none">"#,
            r##"<rect rx="4" ry="4" fill="#2c3e50"/>"##,
            r##"<text x="6" y="16" font-size="12px" fill="#fff"></text>"##,
            "</g>\n"
        ));
        let _ = writeln!(svg, "<script><![CDATA[{}]]></script>", TOOLTIP_SCRIPT);
        svg.push_str("</svg>\n");
        svg
    }

    fn stylesheet(&self) -> String {
        let style = &self.style;
        format!(
            ".node circle {{ fill: var(--fill); transition: r {out}ms ease, fill {out}ms ease; }} \
             .node:hover circle {{ r: {hover}px; fill: var(--hover-fill); transition-duration: {in_}ms; }} \
             .tooltip {{ opacity: 0; transition: opacity {out}ms; }} \
             .tooltip.visible {{ opacity: 0.9; transition-duration: {in_}ms; }}",
            out = style.hover_out_ms,
            in_ = style.hover_in_ms,
            hover = fmt_coord(style.hover_radius),
        )
    }

    fn write_element(&self, svg: &mut String, element: &SvgElement) {
        let style = &self.style;
        match element {
            SvgElement::ArrowMarker => {
                let _ = writeln!(
                    svg,
                    r#"<defs><marker id="arrowhead" viewBox="0 -5 10 10" refX="18" refY="0" orient="auto" markerWidth="6" markerHeight="6"><path d="M 0,-5 L 10,0 L 0,5" fill="{}"/></marker></defs>"#,
                    style.link_color
                );
            }
            SvgElement::Edge { path } => {
                let _ = writeln!(
                    svg,
                    r#"<path class="link" d="{}" fill="none" stroke="{}" stroke-width="{}" marker-end="url(#arrowhead)"/>"#,
                    path,
                    style.link_color,
                    fmt_coord(style.link_width)
                );
            }
            SvgElement::Node(node) => {
                let kind = if node.has_children { "node--internal" } else { "node--leaf" };
                let tooltip = escape(&node.tooltip);
                let weight = if node.is_operator { "bold" } else { "normal" };
                let _ = writeln!(
                    svg,
                    r#"<g class="node {kind}" transform="translate({x},{y})" data-tooltip="{tooltip}" style="--fill:{fill};--hover-fill:{hover}">"#,
                    x = fmt_coord(node.position.x),
                    y = fmt_coord(node.position.y),
                    fill = node.fill,
                    hover = node.hover_fill,
                );
                let _ = writeln!(svg, "<title>{tooltip}</title>");
                let _ = writeln!(
                    svg,
                    r#"<circle r="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
                    fmt_coord(style.node_radius),
                    node.fill,
                    node.stroke,
                    fmt_coord(style.stroke_width)
                );
                let _ = writeln!(
                    svg,
                    r#"<text dy=".35em" y="{}" text-anchor="middle" font-size="{}px" font-weight="{}">{}</text>"#,
                    fmt_coord(node.label_y),
                    fmt_coord(style.font_size),
                    weight,
                    escape(&node.label)
                );
                svg.push_str("</g>\n");
            }
            SvgElement::Title { x, y, text } => {
                let _ = writeln!(
                    svg,
                    r#"<text class="title" x="{}" y="{}" text-anchor="middle" font-size="16px" font-weight="bold" fill="{}">{}</text>"#,
                    fmt_coord(*x),
                    fmt_coord(*y),
                    style.title_color,
                    escape(text)
                );
            }
        }
    }
}

// The native <title> tooltip stays as fallback when scripts are disabled.
const TOOLTIP_SCRIPT: &str = r#"
(function () {
  var svg = document.querySelector('svg.parse-tree');
  if (!svg) return;
  var tip = svg.querySelector('.tooltip');
  var text = tip.querySelector('text');
  var box = tip.querySelector('rect');
  function place(evt) {
    var p = svg.createSVGPoint();
    p.x = evt.clientX;
    p.y = evt.clientY;
    p = p.matrixTransform(svg.getScreenCTM().inverse());
    tip.setAttribute('transform', 'translate(' + (p.x + 10) + ',' + (p.y - 28) + ')');
  }
  svg.querySelectorAll('.node').forEach(function (node) {
    var title = node.querySelector('title');
    if (title) node.removeChild(title);
    node.addEventListener('mouseover', function (evt) {
      text.textContent = node.getAttribute('data-tooltip');
      var b = text.getBBox();
      box.setAttribute('width', b.width + 12);
      box.setAttribute('height', b.height + 8);
      place(evt);
      tip.classList.add('visible');
    });
    node.addEventListener('mousemove', place);
    node.addEventListener('mouseout', function () {
      tip.classList.remove('visible');
    });
  });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_surface_when_serializing_then_bare_frame() {
        let surface = DiagramSurface::new();

        let svg = surface.to_svg();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="1000" height="400""#));
        assert!(!svg.contains("<script>"));
    }

    #[test]
    fn given_elements_when_cleared_then_surface_is_empty() {
        let mut surface = DiagramSurface::new();
        surface.push(SvgElement::ArrowMarker);
        surface.push(SvgElement::Edge {
            path: "M0,0 C0,1 1,1 1,2".into(),
        });
        assert_eq!(surface.element_count(), 2);
        assert_eq!(surface.edge_count(), 1);

        surface.clear();

        assert!(surface.is_empty());
    }

    #[test]
    fn given_node_with_markup_label_when_serializing_then_escaped() {
        let mut surface = DiagramSurface::new();
        surface.push(SvgElement::Node(NodeElement {
            position: Point { x: 1.0, y: 2.0 },
            label: "<b>".into(),
            is_operator: false,
            has_children: false,
            fill: "#4682b4",
            hover_fill: "#3498db",
            stroke: "#2c3e50",
            label_y: 20.0,
            tooltip: "Value: <b>".into(),
        }));

        let svg = surface.to_svg();

        assert!(svg.contains("&lt;b&gt;"));
        assert!(!svg.contains("<b>"));
        assert!(svg.contains(r#"data-tooltip="Value: &lt;b&gt;""#));
    }
}
