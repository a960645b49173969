//! Raw element tree.
//!
//! An intermediate, schema-unaware tree built from the token stream. The
//! parser matches schema parse rules against it; attribute parse rules
//! get query access (`attr`, `find`, `find_all`, `text_content`) the way
//! the original boundary inspected matched markup.

use crate::tokenizer::{close_tag_name, parse_tag, tokenize, HtmlToken};
use vellum_common::decode_entities;

/// Elements that never have a closing tag.
const VOID_TAGS: [&str; 6] = ["img", "br", "hr", "input", "meta", "link"];

#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    Element(RawElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<RawNode>,
}

impl RawElement {
    /// First value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|v| v.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// First descendant with the given tag, depth-first.
    pub fn find(&self, tag: &str) -> Option<&RawElement> {
        for child in &self.children {
            if let RawNode::Element(el) = child {
                if el.tag == tag {
                    return Some(el);
                }
                if let Some(found) = el.find(tag) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// All descendants with the given tag, in document order.
    pub fn find_all<'a>(&'a self, tag: &str, out: &mut Vec<&'a RawElement>) {
        for child in &self.children {
            if let RawNode::Element(el) = child {
                if el.tag == tag {
                    out.push(el);
                }
                el.find_all(tag, out);
            }
        }
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                RawNode::Text(text) => out.push_str(text),
                RawNode::Element(el) => el.push_text(out),
            }
        }
    }
}

/// Build the raw tree for an HTML string. Unclosed elements are closed at
/// end of input; mismatched closing tags pop to the nearest matching open
/// element or are dropped.
pub fn parse_raw(source: &str) -> Vec<RawNode> {
    let mut roots: Vec<RawNode> = Vec::new();
    let mut stack: Vec<RawElement> = Vec::new();

    fn append(roots: &mut Vec<RawNode>, stack: &mut [RawElement], node: RawNode) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }

    for (token, span) in tokenize(source) {
        match token {
            Ok(HtmlToken::OpenTag) => {
                let tag = parse_tag(&source[span]);
                let element = RawElement {
                    tag: tag.name,
                    attrs: tag.attrs,
                    children: Vec::new(),
                };
                if tag.self_closing || VOID_TAGS.contains(&element.tag.as_str()) {
                    append(&mut roots, &mut stack, RawNode::Element(element));
                } else {
                    stack.push(element);
                }
            }
            Ok(HtmlToken::CloseTag) => {
                let name = close_tag_name(&source[span]);
                if let Some(open_at) = stack.iter().rposition(|el| el.tag == name) {
                    while stack.len() > open_at {
                        if let Some(closed) = stack.pop() {
                            append(&mut roots, &mut stack, RawNode::Element(closed));
                        }
                    }
                }
                // No matching open tag: drop the stray close
            }
            Ok(HtmlToken::Text) => {
                append(
                    &mut roots,
                    &mut stack,
                    RawNode::Text(decode_entities(&source[span])),
                );
            }
            Ok(HtmlToken::Comment) | Ok(HtmlToken::Declaration) => {}
            Err(()) => {
                // Unlexable span (stray '<') degrades to text
                append(
                    &mut roots,
                    &mut stack,
                    RawNode::Text(source[span].to_string()),
                );
            }
        }
    }

    while let Some(unclosed) = stack.pop() {
        append(&mut roots, &mut stack, RawNode::Element(unclosed));
    }

    roots
}
