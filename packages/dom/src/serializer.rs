//! Canonical HTML serialization.
//!
//! Serialization is the single escaping point: text and attribute values
//! are entity-escaped here unless a node type marked them pre-escaped
//! (values that were sanitized into escaped form at the attribute
//! boundary). The output contains no inter-block whitespace, so parsing
//! it back reconstructs an equivalent tree.

use crate::node::Node;
use crate::schema::html::{HtmlText, HtmlTree};
use crate::schema::Schema;
use vellum_common::{escape_html_attr, escape_html_text};

/// Tags that close themselves.
const VOID_TAGS: [&str; 3] = ["img", "br", "hr"];

/// Serialize a document tree to its canonical HTML string.
pub fn serialize_document(schema: &Schema, doc: &Node) -> String {
    let mut out = String::new();
    for child in &doc.content {
        serialize_node(schema, child, &mut out);
    }
    out
}

fn serialize_node(schema: &Schema, node: &Node, out: &mut String) {
    if let Some(text) = &node.text {
        let rendered: Vec<_> = node
            .marks
            .iter()
            .filter_map(|mark| {
                schema
                    .mark_type(&mark.type_name)
                    .map(|ty| (ty.render)(mark))
            })
            .collect();

        for (tag, attrs) in &rendered {
            push_open_tag(out, tag, attrs);
        }
        out.push_str(&escape_html_text(text));
        for (tag, _) in rendered.iter().rev() {
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        return;
    }

    match schema.node_type(&node.type_name) {
        Some(ty) => {
            let tree = (ty.render)(node);
            emit_tree(schema, node, &tree, out);
        }
        // Unknown type: degrade to its content
        None => {
            for child in &node.content {
                serialize_node(schema, child, out);
            }
        }
    }
}

fn emit_tree(schema: &Schema, node: &Node, tree: &HtmlTree, out: &mut String) {
    match tree {
        HtmlTree::Hole => {
            for child in &node.content {
                serialize_node(schema, child, out);
            }
        }
        HtmlTree::Text(text) => out.push_str(&escape_text(text)),
        HtmlTree::Element {
            tag,
            attrs,
            children,
        } => {
            push_open_tag(out, tag, attrs);
            if children.is_empty() && VOID_TAGS.contains(&tag.as_str()) {
                return;
            }
            for child in children {
                emit_tree(schema, node, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn push_open_tag(out: &mut String, tag: &str, attrs: &[(String, HtmlText)]) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');
}

fn escape_attr(value: &HtmlText) -> String {
    match value {
        HtmlText::Plain(v) => escape_html_attr(v),
        HtmlText::PreEscaped(v) => v.clone(),
    }
}

fn escape_text(value: &HtmlText) -> String {
    match value {
        HtmlText::Plain(v) => escape_html_text(v),
        HtmlText::PreEscaped(v) => v.clone(),
    }
}
