//! Input normalization
//!
//! The entry point accepts source text, a single node, a single path, or a
//! sequence of nodes or paths. [`Input`] names those shapes; [`normalize`]
//! turns any of them into the ordered path list a collection is built from.
//!
//! Classification is by tag, never by probing: a value that is not a string
//! and not a JSON object is rejected before any field is looked at.

use serde_json::{Map, Value};
use treeshift_ast::{Node, NodePath, NodeSnapshot, Parser};

use crate::core::error::{CoreError, Result};

/// A value handed to the entry point
#[derive(Debug, Clone)]
pub enum Input {
    /// Source text to parse
    Text(String),
    Node(Node),
    Nodes(Vec<Node>),
    Path(NodePath),
    Paths(Vec<NodePath>),
    /// Anything else; `kind` names what was given
    Unsupported { kind: &'static str },
}

impl Input {
    /// Classify a JSON value.
    ///
    /// Strings are source text. An object with a string `kind` field is a
    /// node; an array whose every element is such an object is a node
    /// sequence (the empty array included). Everything else is unsupported.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(source) => Input::Text(source),
            Value::Object(map) if is_node_object(&map) => match node_from_object(map) {
                Some(node) => Input::Node(node),
                None => Input::Unsupported { kind: "object" },
            },
            Value::Object(_) => Input::Unsupported { kind: "object" },
            Value::Array(items) => {
                let mut nodes = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(map) if is_node_object(&map) => match node_from_object(map) {
                            Some(node) => nodes.push(node),
                            None => return Input::Unsupported { kind: "array" },
                        },
                        _ => return Input::Unsupported { kind: "array" },
                    }
                }
                Input::Nodes(nodes)
            }
            Value::Number(_) => Input::Unsupported { kind: "number" },
            Value::Bool(_) => Input::Unsupported { kind: "boolean" },
            Value::Null => Input::Unsupported { kind: "null" },
        }
    }

    /// Short name of the shape, for logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Input::Text(_) => "source text",
            Input::Node(_) => "node",
            Input::Nodes(_) => "node sequence",
            Input::Path(_) => "path",
            Input::Paths(_) => "path sequence",
            Input::Unsupported { kind } => *kind,
        }
    }
}

fn is_node_object(map: &Map<String, Value>) -> bool {
    matches!(map.get("kind"), Some(Value::String(_)))
}

fn node_from_object(map: Map<String, Value>) -> Option<Node> {
    serde_json::from_value::<NodeSnapshot>(Value::Object(map))
        .ok()
        .map(|snapshot| Node::from_snapshot(&snapshot))
}

/// Turn an input into the ordered list of paths a collection wraps.
///
/// Text is parsed into a single root path. Nodes become root paths of their
/// own. Paths are kept as they are: no copies, no reordering, no
/// deduplication.
pub fn normalize(input: Input, parser: &dyn Parser) -> Result<Vec<NodePath>> {
    tracing::trace!(input = input.kind(), "normalizing input");
    match input {
        Input::Text(source) => {
            let root = parser.parse(&source)?;
            Ok(vec![NodePath::root(root)])
        }
        Input::Node(node) => Ok(vec![NodePath::root(node)]),
        Input::Nodes(nodes) => Ok(nodes.into_iter().map(NodePath::root).collect()),
        Input::Path(path) => Ok(vec![path]),
        Input::Paths(paths) => Ok(paths),
        Input::Unsupported { kind } => Err(CoreError::invalid_input(kind)),
    }
}

impl From<&str> for Input {
    fn from(source: &str) -> Self {
        Input::Text(source.to_string())
    }
}

impl From<String> for Input {
    fn from(source: String) -> Self {
        Input::Text(source)
    }
}

impl From<&String> for Input {
    fn from(source: &String) -> Self {
        Input::Text(source.clone())
    }
}

impl From<Node> for Input {
    fn from(node: Node) -> Self {
        Input::Node(node)
    }
}

impl From<&Node> for Input {
    fn from(node: &Node) -> Self {
        Input::Node(node.clone())
    }
}

impl From<Vec<Node>> for Input {
    fn from(nodes: Vec<Node>) -> Self {
        Input::Nodes(nodes)
    }
}

impl From<&[Node]> for Input {
    fn from(nodes: &[Node]) -> Self {
        Input::Nodes(nodes.to_vec())
    }
}

impl From<NodePath> for Input {
    fn from(path: NodePath) -> Self {
        Input::Path(path)
    }
}

impl From<&NodePath> for Input {
    fn from(path: &NodePath) -> Self {
        Input::Path(path.clone())
    }
}

impl From<Vec<NodePath>> for Input {
    fn from(paths: Vec<NodePath>) -> Self {
        Input::Paths(paths)
    }
}

impl From<&[NodePath]> for Input {
    fn from(paths: &[NodePath]) -> Self {
        Input::Paths(paths.to_vec())
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Input::from_value(value)
    }
}

macro_rules! unsupported_from {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl From<$ty> for Input {
                fn from(_: $ty) -> Self {
                    Input::Unsupported { kind: $kind }
                }
            }
        )*
    };
}

unsupported_from! {
    i32 => "number",
    i64 => "number",
    u32 => "number",
    u64 => "number",
    usize => "number",
    f64 => "number",
    bool => "boolean",
    () => "null",
}
