//! Results view: what the user sees after a submission
//!
//! Holds status, body lines, postfix and tree listings and the diagram
//! surface. Every update replaces the previous content wholesale.

use std::fmt::Write;

use tracing::{debug, instrument};

use crate::domain::{to_layout, ConnectionState, FailureReport, LayoutNode, ParseSuccess};
use crate::render::html::escape;
use crate::render::{DiagramRenderer, DiagramSurface};

pub const STATUS_PROCESSING: &str = "Processing...";
pub const STATUS_VALID: &str = "Valid expression";
pub const STATUS_INVALID: &str = "Invalid expression";
pub const STATUS_UNREACHABLE: &str = "Error: Cannot connect to API server";

/// Kind of content currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewKind {
    #[default]
    Hidden,
    Processing,
    Valid,
    Invalid,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct ResultsView {
    pub kind: ViewKind,
    pub status: String,
    pub body: Vec<String>,
    pub result: Option<f64>,
    /// Reverse-Polish tokens of the last valid expression
    pub postfix: Vec<String>,
    /// Pretty JSON of the postfix sequence, `[]` when none
    pub postfix_json: String,
    /// Pretty JSON of the parse tree, `{}` when none
    pub tree_json: String,
    pub tree: Option<LayoutNode>,
    pub report: Option<FailureReport>,
    pub diagram_visible: bool,
    pub surface: DiagramSurface,
    renderer: DiagramRenderer,
}

impl ResultsView {
    pub fn new(renderer: DiagramRenderer) -> Self {
        Self {
            postfix_json: "[]".into(),
            tree_json: "{}".into(),
            renderer,
            ..Self::default()
        }
    }

    pub fn is_visible(&self) -> bool {
        self.kind != ViewKind::Hidden
    }

    pub fn begin_processing(&mut self) {
        self.kind = ViewKind::Processing;
        self.status = STATUS_PROCESSING.into();
        self.body.clear();
    }

    #[instrument(level = "debug", skip_all, fields(result = success.result))]
    pub fn show_success(&mut self, success: &ParseSuccess) {
        self.kind = ViewKind::Valid;
        self.status = STATUS_VALID.into();
        self.body = vec![format!("Result: {}", success.result)];
        self.result = Some(success.result);
        self.report = None;
        self.postfix = success.postfix.clone();
        self.postfix_json =
            serde_json::to_string_pretty(&success.postfix).unwrap_or_else(|_| "[]".into());
        self.tree_json =
            serde_json::to_string_pretty(&success.tree).unwrap_or_else(|_| "{}".into());

        let layout = to_layout(&success.tree);
        self.renderer.render(&layout, &mut self.surface);
        self.tree = Some(layout);
        self.diagram_visible = true;
        debug!("diagram holds {} elements", self.surface.element_count());
    }

    /// Semantic rejection: explanation shown, previous diagram removed.
    pub fn show_rejection(&mut self, report: &FailureReport) {
        self.kind = ViewKind::Invalid;
        self.status = STATUS_INVALID.into();
        self.body = report.lines();
        self.clear_results();
        self.report = Some(report.clone());
    }

    pub fn show_connection_error(&mut self, report: &FailureReport) {
        self.kind = ViewKind::Error;
        self.status = format!("Error connecting to API: {}", report.message);
        self.body = report.remediation.clone();
        self.report = Some(report.clone());
    }

    /// Direct probe failure: troubleshooting steps for an unreachable server.
    pub fn show_unreachable(&mut self, report: &FailureReport) {
        self.kind = ViewKind::Error;
        self.status = STATUS_UNREACHABLE.into();
        self.body = report.remediation.clone();
        self.report = Some(report.clone());
    }

    fn clear_results(&mut self) {
        self.result = None;
        self.postfix.clear();
        self.postfix_json = "[]".into();
        self.tree_json = "{}".into();
        self.tree = None;
        self.surface.clear();
        self.diagram_visible = false;
    }

    /// Self-contained HTML report of the view, the indicator and the log.
    pub fn to_html(&self, state: &ConnectionState, log: &[String]) -> String {
        let mut page = String::new();
        page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        page.push_str("<title>BODMAS Parser Report</title>\n");
        let _ = writeln!(page, "<style>{}</style>", PAGE_CSS);
        page.push_str("</head>\n<body>\n<h1>BODMAS Parser</h1>\n");

        let _ = writeln!(
            page,
            r#"<p id="connection-status" class="{}">{}</p>"#,
            state.status.css_class(),
            escape(&state.message)
        );

        if self.is_visible() {
            let class = match self.kind {
                ViewKind::Valid => "success",
                ViewKind::Processing => "status-processing",
                _ => "error",
            };
            page.push_str("<section id=\"result-section\">\n");
            let _ = writeln!(
                page,
                r#"<div id="validation-status"><span class="{}">{}</span></div>"#,
                class,
                escape(&self.status)
            );
            page.push_str("<div id=\"result\">\n");
            for line in &self.body {
                let _ = writeln!(page, "<p>{}</p>", escape(line));
            }
            page.push_str("</div>\n");
            let _ = writeln!(
                page,
                "<h2>Postfix</h2>\n<pre id=\"postfix\">{}</pre>",
                escape(&self.postfix_json)
            );
            let _ = writeln!(
                page,
                "<h2>Parse tree</h2>\n<pre id=\"parse-tree-json\">{}</pre>",
                escape(&self.tree_json)
            );
            if self.diagram_visible && !self.surface.is_empty() {
                page.push_str("<div id=\"tree-visualization\">\n");
                page.push_str(&self.surface.to_svg());
                page.push_str("</div>\n");
            }
            page.push_str("</section>\n");
        }

        page.push_str("<h2>Debug log</h2>\n<div id=\"debug-info\">\n");
        for line in log {
            let _ = writeln!(page, "<div>{}</div>", escape(line));
        }
        page.push_str("</div>\n</body>\n</html>\n");
        page
    }
}

const PAGE_CSS: &str = "body { font-family: sans-serif; margin: 2em; color: #2c3e50; } \
.status-connected { color: #2ecc71; } \
.status-disconnected { color: #e74c3c; } \
.status-processing { color: #3498db; } \
.success { color: #2ecc71; font-weight: bold; } \
.error { color: #e74c3c; font-weight: bold; } \
pre { background: #f5f5f5; padding: 1em; } \
#debug-info { font-family: monospace; font-size: 12px; }";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;
    use crate::domain::{Endpoint, ParseTreeNode};

    fn view() -> ResultsView {
        ResultsView::new(DiagramRenderer::new(CanvasConfig::default()))
    }

    fn success() -> ParseSuccess {
        ParseSuccess {
            result: 23.0,
            postfix: vec!["3".into(), "4".into(), "5".into(), "*".into(), "+".into()],
            tree: ParseTreeNode::operator(
                "+",
                ParseTreeNode::operand("3"),
                ParseTreeNode::operator("*", ParseTreeNode::operand("4"), ParseTreeNode::operand("5")),
            ),
            input_expression: Some("3+4*5".into()),
        }
    }

    #[test]
    fn given_new_view_then_hidden_with_empty_listings() {
        let view = view();

        assert!(!view.is_visible());
        assert_eq!(view.postfix_json, "[]");
        assert_eq!(view.tree_json, "{}");
    }

    #[test]
    fn given_success_when_showing_then_result_and_diagram() {
        let mut view = view();
        view.begin_processing();
        assert_eq!(view.status, "Processing...");

        view.show_success(&success());

        assert_eq!(view.status, "Valid expression");
        assert_eq!(view.body, vec!["Result: 23".to_string()]);
        assert!(view.postfix_json.contains("\"*\""));
        assert!(view.tree_json.contains("\"operator\": \"+\""));
        assert!(view.diagram_visible);
        assert_eq!(view.surface.nodes().count(), 5);
    }

    #[test]
    fn given_previous_diagram_when_rejected_then_diagram_cleared_and_hidden() {
        let mut view = view();
        view.show_success(&success());

        view.show_rejection(&FailureReport::explain("Consecutive operators found"));

        assert_eq!(view.status, "Invalid expression");
        assert!(view.surface.is_empty());
        assert!(!view.diagram_visible);
        assert_eq!(view.postfix_json, "[]");
        assert_eq!(view.tree_json, "{}");
        assert_eq!(view.result, None);
        assert_eq!(view.body[0], "Consecutive operators found");
    }

    #[test]
    fn given_connectivity_failure_when_showing_then_status_names_cause() {
        let mut view = view();
        let backend = Endpoint::default();

        view.show_connection_error(&FailureReport::connectivity("HTTP error! Status: 500", &backend));

        assert_eq!(view.status, "Error connecting to API: HTTP error! Status: 500");
        assert_eq!(
            view.body,
            vec!["Make sure the API server is running at http://127.0.0.1:8000".to_string()]
        );
    }

    #[test]
    fn given_valid_view_when_rendering_html_then_contains_indicator_svg_and_log() {
        let mut view = view();
        view.show_success(&success());

        let html = view.to_html(
            &ConnectionState::connected("Connected"),
            &["[10:00:00] <ok>".to_string()],
        );

        assert!(html.contains(r#"class="status-connected">Connected</p>"#));
        assert!(html.contains("<svg"));
        assert!(html.contains("Result: 23"));
        assert!(html.contains("[10:00:00] &lt;ok&gt;"));
    }

    #[test]
    fn given_rejected_view_when_rendering_html_then_no_svg() {
        let mut view = view();
        view.show_success(&success());
        view.show_rejection(&FailureReport::explain("Division by zero"));

        let html = view.to_html(&ConnectionState::disconnected("Error: boom"), &[]);

        assert!(!html.contains("<svg"));
        assert!(html.contains("status-disconnected"));
        assert!(html.contains("Cannot divide a number by zero."));
    }
}
