//! Document tree nodes.
//!
//! A document is a single `doc` root owning an ordered sequence of block
//! nodes; each node may recursively own further block or inline children
//! per its content model. Nodes carry a type tag resolved against the
//! schema registry and an attribute map validated by that type.
//!
//! ## Position addressing
//!
//! Positions are integers into the flattened token stream: every element
//! contributes an open and a close boundary token (+1 each), text nodes
//! contribute their length in Unicode scalar values. Atom leaves are
//! elements with empty content, so their size is 2. The root contributes
//! no boundary tokens; valid positions run `0..=doc.content_size()`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute map. Values are JSON so the registry stays uniform; the
/// schema validates them at parse time and at mutation time.
pub type AttrMap = BTreeMap<String, Value>;

/// A mark applied to inline content (link, strong, em, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub attrs: AttrMap,
}

impl Mark {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs: AttrMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub attrs: AttrMap,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    /// Create an element node.
    pub fn element(type_name: impl Into<String>, attrs: AttrMap, content: Vec<Node>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
            marks: Vec::new(),
            content,
            text: None,
        }
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            type_name: "text".to_string(),
            attrs: AttrMap::new(),
            marks: Vec::new(),
            content: Vec::new(),
            text: Some(text.into()),
        }
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    /// Size of this node in the flattened address space.
    pub fn node_size(&self) -> usize {
        match &self.text {
            Some(text) => text.chars().count(),
            None => self.content_size() + 2,
        }
    }

    /// Size of this node's content (sum of child sizes).
    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::node_size).sum()
    }

    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    /// Concatenated text of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.push_text(out);
        }
    }

    /// String attribute accessor.
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(Value::as_str)
    }

    /// Unsigned integer attribute accessor.
    pub fn attr_u64(&self, name: &str) -> Option<u64> {
        self.attrs.get(name).and_then(Value::as_u64)
    }

    /// Visit every descendant in document (pre-)order together with the
    /// position of its opening boundary. The visitor returns `false` to
    /// short-circuit the whole traversal.
    pub fn descendants<F>(&self, f: &mut F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        self.descendants_inner(0, f);
    }

    fn descendants_inner<F>(&self, base: usize, f: &mut F) -> bool
    where
        F: FnMut(&Node, usize) -> bool,
    {
        let mut pos = base;
        for child in &self.content {
            if !f(child, pos) {
                return false;
            }
            if !child.is_text() && !child.descendants_inner(pos + 1, f) {
                return false;
            }
            pos += child.node_size();
        }
        true
    }

    /// The node whose opening boundary sits exactly at `pos`, at any
    /// depth. Text nodes are returned when `pos` falls at their start.
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        self.node_at_inner(pos, 0)
    }

    fn node_at_inner(&self, pos: usize, base: usize) -> Option<&Node> {
        let mut cur = base;
        for child in &self.content {
            if pos == cur {
                return Some(child);
            }
            let end = cur + child.node_size();
            if pos < end {
                if child.is_text() {
                    return None;
                }
                return child.node_at_inner(pos, cur + 1);
            }
            cur = end;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str) -> Node {
        Node::element("paragraph", AttrMap::new(), vec![Node::text(text)])
    }

    fn doc(children: Vec<Node>) -> Node {
        Node::element("doc", AttrMap::new(), children)
    }

    #[test]
    fn test_node_sizes() {
        assert_eq!(Node::text("hello").node_size(), 5);
        assert_eq!(para("hello").node_size(), 7);
        assert_eq!(
            Node::element("horizontalRule", AttrMap::new(), vec![]).node_size(),
            2
        );
        assert_eq!(doc(vec![para("ab"), para("cd")]).content_size(), 8);
    }

    #[test]
    fn test_text_content() {
        let d = doc(vec![para("hello "), para("world")]);
        assert_eq!(d.text_content(), "hello world");
    }

    #[test]
    fn test_descendants_positions() {
        let d = doc(vec![para("ab"), para("cd")]);
        let mut seen = Vec::new();
        d.descendants(&mut |node, pos| {
            seen.push((node.type_name.clone(), pos));
            true
        });
        assert_eq!(
            seen,
            vec![
                ("paragraph".to_string(), 0),
                ("text".to_string(), 1),
                ("paragraph".to_string(), 4),
                ("text".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_descendants_short_circuit() {
        let d = doc(vec![para("ab"), para("cd")]);
        let mut count = 0;
        d.descendants(&mut |_, _| {
            count += 1;
            count < 2
        });
        assert_eq!(count, 2);
    }

    #[test]
    fn test_node_at() {
        let d = doc(vec![para("ab"), para("cd")]);
        assert_eq!(d.node_at(0).map(|n| n.type_name.as_str()), Some("paragraph"));
        assert_eq!(d.node_at(4).map(|n| n.type_name.as_str()), Some("paragraph"));
        assert_eq!(d.node_at(1).and_then(|n| n.text.as_deref()), Some("ab"));
        assert!(d.node_at(2).is_none());
    }
}
