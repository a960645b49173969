//! Node type registry.
//!
//! The schema is resolved once at startup: a table of node types and mark
//! types keyed by name, in declaration order. Every parse and render
//! decision dispatches through it — there is no type-specific branching
//! anywhere else.

mod content;
pub mod html;
mod marks;
mod node_types;

pub use content::ContentModel;
pub use marks::MarkType;
pub use node_types::{NodeType, ParseRule};

use crate::error::SchemaError;
use crate::node::{AttrMap, Node};
use crate::raw::RawElement;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Node group: which content-model group names a type answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Group {
    Block,
    Inline,
    /// Only reachable by explicit name (list items, table rows/cells,
    /// figcaption, the root).
    None,
}

/// One table-of-contents entry.
///
/// `level` is normalized against the minimum heading level present and
/// capped at 3; `text` is stored entity-escaped; `id` is a unique slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocItem {
    pub level: u8,
    pub text: String,
    pub id: String,
}

/// Read the validated `items` attribute off a tableOfContents node.
pub fn toc_items_from_node(node: &Node) -> Vec<TocItem> {
    node.attrs
        .get("items")
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_default()
}

pub fn toc_items_to_value(items: &[TocItem]) -> Value {
    serde_json::to_value(items).unwrap_or(Value::Array(Vec::new()))
}

/// The resolved registry.
pub struct Schema {
    nodes: Vec<NodeType>,
    marks: Vec<MarkType>,
    node_index: BTreeMap<&'static str, usize>,
    mark_index: BTreeMap<&'static str, usize>,
}

impl Schema {
    /// The editor's node and mark set.
    pub fn editor_default() -> Self {
        Self::build(node_types::default_nodes(), marks::default_marks())
    }

    fn build(nodes: Vec<NodeType>, marks: Vec<MarkType>) -> Self {
        let node_index = nodes
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name, i))
            .collect();
        let mark_index = marks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name, i))
            .collect();
        Self {
            nodes,
            marks,
            node_index,
            mark_index,
        }
    }

    pub fn node_type(&self, name: &str) -> Option<&NodeType> {
        self.node_index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn mark_type(&self, name: &str) -> Option<&MarkType> {
        self.mark_index.get(name).map(|&i| &self.marks[i])
    }

    pub fn nodes(&self) -> &[NodeType] {
        &self.nodes
    }

    pub fn marks(&self) -> &[MarkType] {
        &self.marks
    }

    pub fn group_of(&self, type_name: &str) -> Option<Group> {
        self.node_type(type_name).map(|t| t.group)
    }

    /// First node type whose parse rules match the element, in
    /// declaration order.
    pub fn match_element(&self, element: &RawElement) -> Option<(&NodeType, &ParseRule)> {
        for ty in &self.nodes {
            for rule in &ty.parse_rules {
                if rule.matches(element) {
                    return Some((ty, rule));
                }
            }
        }
        None
    }

    /// Mark type matching the element's tag.
    pub fn match_mark(&self, element: &RawElement) -> Option<&MarkType> {
        self.marks
            .iter()
            .find(|m| m.parse_tags.contains(&element.tag.as_str()))
    }

    /// Run attributes through the owning type's mutation-time sanitizer.
    /// Types without one accept no attributes; rejected values are
    /// dropped, never kept unsanitized.
    pub fn sanitize_attrs(&self, type_name: &str, attrs: &AttrMap) -> AttrMap {
        let Some(ty) = self.node_type(type_name) else {
            return AttrMap::new();
        };
        let Some(sanitize) = ty.sanitize_attr else {
            return AttrMap::new();
        };
        let mut out = AttrMap::new();
        for (name, value) in attrs {
            if let Some(sane) = sanitize(name, value) {
                out.insert(name.clone(), sane);
            }
        }
        out
    }

    /// Validate a subtree: known types, content models, known marks.
    pub fn validate_node(&self, node: &Node) -> Result<(), SchemaError> {
        for mark in &node.marks {
            if self.mark_type(&mark.type_name).is_none() {
                return Err(SchemaError::UnknownMarkType(mark.type_name.clone()));
            }
        }

        if node.is_text() {
            if node.type_name != "text" {
                return Err(SchemaError::UnexpectedText(node.type_name.clone()));
            }
            if !node.content.is_empty() {
                return Err(SchemaError::InvalidContent {
                    node: "text".to_string(),
                    detail: "text nodes cannot have children".to_string(),
                });
            }
            return Ok(());
        }

        let ty = self
            .node_type(&node.type_name)
            .ok_or_else(|| SchemaError::UnknownNodeType(node.type_name.clone()))?;

        let child_names: Vec<&str> = node.content.iter().map(|c| c.type_name.as_str()).collect();
        if !ty.content.matches(&child_names, self) {
            return Err(SchemaError::InvalidContent {
                node: node.type_name.clone(),
                detail: format!("children [{}]", child_names.join(", ")),
            });
        }

        for child in &node.content {
            self.validate_node(child)?;
        }
        Ok(())
    }

    /// Create an empty node of a type, recursively filling required
    /// content so it satisfies its own model.
    pub fn make_empty(&self, type_name: &str) -> Result<Node, SchemaError> {
        let ty = self
            .node_type(type_name)
            .ok_or_else(|| SchemaError::UnknownNodeType(type_name.to_string()))?;

        let mut content = Vec::new();
        if ty.content.requires_content() {
            if let Some(filler) = ty.content.filler_type(self) {
                content.push(self.make_empty(filler)?);
            }
        }
        Ok(Node::element(ty.name, AttrMap::new(), content))
    }
}

/// A JSON-shaped node description, the argument of content insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub attrs: AttrMap,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<NodeSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<crate::node::Mark>,
}

impl NodeSpec {
    pub fn node(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs: AttrMap::new(),
            content: Vec::new(),
            text: None,
            marks: Vec::new(),
        }
    }

    pub fn text_node(text: impl Into<String>) -> Self {
        Self {
            type_name: "text".to_string(),
            attrs: AttrMap::new(),
            content: Vec::new(),
            text: Some(text.into()),
            marks: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    pub fn with_content(mut self, content: Vec<NodeSpec>) -> Self {
        self.content = content;
        self
    }

    pub fn with_marks(mut self, marks: Vec<crate::node::Mark>) -> Self {
        self.marks = marks;
        self
    }

    /// Materialize into a validated node: attributes sanitized, required
    /// content filled, content model enforced.
    pub fn materialize(&self, schema: &Schema) -> Result<Node, SchemaError> {
        if let Some(text) = &self.text {
            if self.type_name != "text" {
                return Err(SchemaError::UnexpectedText(self.type_name.clone()));
            }
            for mark in &self.marks {
                if schema.mark_type(&mark.type_name).is_none() {
                    return Err(SchemaError::UnknownMarkType(mark.type_name.clone()));
                }
            }
            return Ok(Node::text(text).with_marks(self.marks.clone()));
        }

        let ty = schema
            .node_type(&self.type_name)
            .ok_or_else(|| SchemaError::UnknownNodeType(self.type_name.clone()))?;

        let attrs = schema.sanitize_attrs(ty.name, &self.attrs);

        let mut content = self
            .content
            .iter()
            .map(|c| c.materialize(schema))
            .collect::<Result<Vec<_>, _>>()?;

        if content.is_empty() && ty.content.requires_content() {
            if let Some(filler) = ty.content.filler_type(schema) {
                content.push(schema.make_empty(filler)?);
            }
        }

        let node = Node::element(ty.name, attrs, content);
        let child_names: Vec<&str> = node.content.iter().map(|c| c.type_name.as_str()).collect();
        if !ty.content.matches(&child_names, schema) {
            return Err(SchemaError::InvalidContent {
                node: ty.name.to_string(),
                detail: format!("children [{}]", child_names.join(", ")),
            });
        }
        Ok(node)
    }
}
