//! Domain entities: core data structures

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use url::Url;

use crate::domain::DomainError;

/// Built-in backend address, used until configuration says otherwise.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Base address of an HTTP service (the evaluation backend or the page origin).
///
/// Resolved once at startup and handed to every service by value, so a
/// request always sees the address it was built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    /// Parse an absolute `http`/`https` address.
    pub fn parse(address: &str) -> Result<Self, DomainError> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidEndpoint {
                address: address.to_string(),
                reason: "address is empty".into(),
            });
        }
        let base = Url::parse(trimmed).map_err(|e| DomainError::InvalidEndpoint {
            address: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(DomainError::InvalidEndpoint {
                address: trimmed.to_string(),
                reason: format!("unsupported scheme '{}'", base.scheme()),
            });
        }
        Ok(Self { base })
    }

    /// Append path segments (percent-encoded) to the base address.
    ///
    /// A trailing slash on the base is ignored, so `http://host/` and
    /// `http://host` both yield `http://host/ping` for `["ping"]`.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn as_str(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BACKEND_URL).expect("default backend address is a valid URL"),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse tree returned by the evaluation service.
///
/// On the wire an operand is a bare string and an operator is an object
/// `{operator, left, right}`; [`ParseTreeNode::from_wire`] is the only place
/// that turns the untagged form into this sum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTreeNode {
    Operand(String),
    Operator {
        symbol: String,
        left: Box<ParseTreeNode>,
        right: Box<ParseTreeNode>,
    },
}

impl ParseTreeNode {
    pub fn operand(value: impl Into<String>) -> Self {
        Self::Operand(value.into())
    }

    pub fn operator(symbol: impl Into<String>, left: ParseTreeNode, right: ParseTreeNode) -> Self {
        Self::Operator {
            symbol: symbol.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Decode the wire representation.
    ///
    /// Operands may be strings or JSON numbers. Anything else, as well as an
    /// operator object missing `operator`, `left` or `right`, is a
    /// [`DomainError::MalformedTree`] naming the offending JSON path.
    pub fn from_wire(value: &Value) -> Result<Self, DomainError> {
        Self::decode(value, "$")
    }

    fn decode(value: &Value, path: &str) -> Result<Self, DomainError> {
        match value {
            Value::String(s) => Ok(Self::Operand(s.clone())),
            Value::Number(n) => Ok(Self::Operand(n.to_string())),
            Value::Object(map) => {
                let symbol = match map.get("operator") {
                    Some(Value::String(s)) if !s.is_empty() => s.clone(),
                    Some(Value::String(_)) => {
                        return Err(DomainError::malformed(path, "operator symbol is empty"))
                    }
                    Some(_) => {
                        return Err(DomainError::malformed(path, "operator symbol is not a string"))
                    }
                    None => return Err(DomainError::malformed(path, "missing 'operator'")),
                };
                let left = map
                    .get("left")
                    .ok_or_else(|| DomainError::malformed(path, "operator is missing 'left'"))?;
                let right = map
                    .get("right")
                    .ok_or_else(|| DomainError::malformed(path, "operator is missing 'right'"))?;
                Ok(Self::Operator {
                    symbol,
                    left: Box::new(Self::decode(left, &format!("{path}.left"))?),
                    right: Box::new(Self::decode(right, &format!("{path}.right"))?),
                })
            }
            Value::Null => Err(DomainError::malformed(path, "node is null")),
            Value::Bool(_) => Err(DomainError::malformed(path, "node is a boolean")),
            Value::Array(_) => Err(DomainError::malformed(
                path,
                "node is an array; operators take exactly two children",
            )),
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator { .. })
    }

    /// Number of levels, a lone operand has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Operand(_) => 1,
            Self::Operator { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Self::Operand(_) => 1,
            Self::Operator { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }
}

// Serializes back into the wire shape, keys in `operator, left, right` order.
impl Serialize for ParseTreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Operand(value) => serializer.serialize_str(value),
            Self::Operator {
                symbol,
                left,
                right,
            } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("operator", symbol)?;
                map.serialize_entry("left", left)?;
                map.serialize_entry("right", right)?;
                map.end()
            }
        }
    }
}

/// Uniform hierarchy node consumed by the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutNode {
    /// Operator symbol or operand value
    pub label: String,
    pub is_operator: bool,
    /// Ordered children, empty for operands
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            is_operator: false,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Successful evaluation returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseSuccess {
    pub result: f64,
    /// Reverse-Polish token sequence, for display only
    pub postfix: Vec<String>,
    pub tree: ParseTreeNode,
    /// Expression as echoed back by the backend, if it did
    pub input_expression: Option<String>,
}

/// Tri-state connection indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Checking,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    /// CSS class used by the report page.
    pub fn css_class(&self) -> &'static str {
        match self {
            ConnectionStatus::Checking => "status-processing",
            ConnectionStatus::Connected => "status-connected",
            ConnectionStatus::Disconnected => "status-disconnected",
        }
    }
}

/// Connection indicator value with its display message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub message: String,
}

impl ConnectionState {
    pub fn checking() -> Self {
        Self {
            status: ConnectionStatus::Checking,
            message: "Checking connection...".into(),
        }
    }

    pub fn connected(message: impl Into<String>) -> Self {
        Self {
            status: ConnectionStatus::Connected,
            message: message.into(),
        }
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            message: message.into(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::checking()
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
