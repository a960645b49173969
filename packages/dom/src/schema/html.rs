//! Render-tree types.
//!
//! Node types produce an `HtmlTree` describing their canonical HTML; the
//! serializer walks it, escaping `Plain` strings and emitting `PreEscaped`
//! ones verbatim. Pre-escaped values exist because sanitized attributes
//! (`alt`, TOC item text) are stored entity-escaped on the node, and
//! escaping them again would break round-trips.

/// A string destined for HTML output.
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlText {
    /// Escaped by the serializer.
    Plain(String),
    /// Emitted verbatim; must already be entity-escaped.
    PreEscaped(String),
}

/// Canonical HTML shape of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlTree {
    Element {
        tag: String,
        attrs: Vec<(String, HtmlText)>,
        children: Vec<HtmlTree>,
    },
    Text(HtmlText),
    /// Children slot: the serializer substitutes the node's serialized
    /// content here.
    Hole,
}

pub fn el(
    tag: impl Into<String>,
    attrs: Vec<(String, HtmlText)>,
    children: Vec<HtmlTree>,
) -> HtmlTree {
    HtmlTree::Element {
        tag: tag.into(),
        attrs,
        children,
    }
}

pub fn attr(name: impl Into<String>, value: impl Into<String>) -> (String, HtmlText) {
    (name.into(), HtmlText::Plain(value.into()))
}

pub fn pre_attr(name: impl Into<String>, value: impl Into<String>) -> (String, HtmlText) {
    (name.into(), HtmlText::PreEscaped(value.into()))
}

pub fn text(value: impl Into<String>) -> HtmlTree {
    HtmlTree::Text(HtmlText::Plain(value.into()))
}

pub fn pre_text(value: impl Into<String>) -> HtmlTree {
    HtmlTree::Text(HtmlText::PreEscaped(value.into()))
}
