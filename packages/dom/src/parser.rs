//! Schema-driven HTML parsing.
//!
//! The raw tree is matched against the registry's parse rules. Unknown
//! markup degrades instead of erroring: dangerous elements are dropped,
//! unmatched containers are traversed transparently, stray inline content
//! is wrapped in paragraphs where the context allows it. Attribute
//! extraction runs through each type's sanitizers, so a bad attribute
//! yields a safe default, never a parse failure.

use crate::error::ParseResult;
use crate::node::{AttrMap, Mark, Node};
use crate::raw::{parse_raw, RawElement, RawNode};
use crate::schema::{ContentModel, Group, NodeType, ParseRule, Schema};

/// Elements that are never parsed, including their content.
const DANGEROUS_TAGS: [&str; 7] = [
    "script", "style", "iframe", "object", "embed", "noscript", "template",
];

/// Parse an HTML string into a document tree. An empty or unusable input
/// yields a document holding one empty paragraph.
pub fn parse_document(schema: &Schema, html: &str) -> ParseResult<Node> {
    let parser = Parser { schema };
    let raw = parse_raw(html);

    let doc_model = ContentModel::parse("block+");
    let mut children = parser.parse_children(&doc_model, &raw);
    if children.is_empty() {
        children.push(Node::element("paragraph", AttrMap::new(), Vec::new()));
    }

    let doc = Node::element("doc", AttrMap::new(), children);
    schema.validate_node(&doc)?;
    Ok(doc)
}

struct Parser<'a> {
    schema: &'a Schema,
}

impl<'a> Parser<'a> {
    /// Parse raw children against a content model.
    fn parse_children(&self, model: &ContentModel, nodes: &[RawNode]) -> Vec<Node> {
        if model.only_text() {
            let text: String = nodes
                .iter()
                .map(|n| match n {
                    RawNode::Text(t) => t.clone(),
                    RawNode::Element(el) => el.text_content(),
                })
                .collect();
            if text.is_empty() {
                return Vec::new();
            }
            return vec![Node::text(text)];
        }

        if model.accepts_inline() {
            let parsed = self.parse_inline(nodes, &[]);
            return merge_text_nodes(parsed);
        }

        self.parse_block_like(model, nodes)
    }

    fn parse_block_like(&self, model: &ContentModel, nodes: &[RawNode]) -> Vec<Node> {
        // Stray inline content is wrapped in paragraphs only where the
        // model can hold one
        let wrap_inline = model.accepts("paragraph", self.schema);

        let mut out = Vec::new();
        let mut pending: Vec<Node> = Vec::new();

        let flush = |pending: &mut Vec<Node>, out: &mut Vec<Node>| {
            if pending.is_empty() {
                return;
            }
            let inline = merge_text_nodes(std::mem::take(pending));
            out.push(Node::element("paragraph", AttrMap::new(), inline));
        };

        for raw in nodes {
            match raw {
                RawNode::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() && wrap_inline {
                        pending.push(Node::text(trimmed));
                    }
                }
                RawNode::Element(element) => {
                    if DANGEROUS_TAGS.contains(&element.tag.as_str()) {
                        continue;
                    }

                    match self.schema.match_element(element) {
                        Some((ty, rule)) if model.accepts(ty.name, self.schema) => {
                            flush(&mut pending, &mut out);
                            if let Some(node) = self.parse_matched(ty, rule, element) {
                                out.push(node);
                            }
                        }
                        Some((ty, _))
                            if wrap_inline && ty.group == Group::Inline =>
                        {
                            pending.extend(self.parse_inline(
                                std::slice::from_ref(raw),
                                &[],
                            ));
                        }
                        _ if wrap_inline
                            && self.schema.match_mark(element).is_some() =>
                        {
                            pending.extend(self.parse_inline(
                                std::slice::from_ref(raw),
                                &[],
                            ));
                        }
                        _ => {
                            // Transparent container (div/section/tbody/...)
                            // or a matched type this model can't hold:
                            // traverse its children in the same context
                            flush(&mut pending, &mut out);
                            out.extend(self.parse_block_like(model, &element.children));
                        }
                    }
                }
            }
        }

        flush(&mut pending, &mut out);
        out
    }

    /// Parse one element a rule matched into its node.
    fn parse_matched(
        &self,
        ty: &NodeType,
        rule: &ParseRule,
        element: &RawElement,
    ) -> Option<Node> {
        let attrs = ty
            .parse_attrs
            .map(|parse| parse(element))
            .unwrap_or_default();

        let mut content = if ty.content.is_empty() {
            Vec::new()
        } else if let Some(content_tag) = rule.content_tag {
            let source = element.find(content_tag);
            if ty.content.only_text() {
                let text = source
                    .map(RawElement::text_content)
                    .unwrap_or_else(|| element.text_content());
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![Node::text(text)]
                }
            } else {
                // Content lives in a single designated child element
                source
                    .and_then(|content_el| {
                        let (cty, crule) = self.schema.match_element(content_el)?;
                        self.parse_matched(cty, crule, content_el)
                    })
                    .map(|node| vec![node])
                    .unwrap_or_default()
            }
        } else {
            self.parse_children(&ty.content, &element.children)
        };

        if content.is_empty() && ty.content.requires_content() {
            let filler = ty.content.filler_type(self.schema)?;
            content.push(self.schema.make_empty(filler).ok()?);
        }

        let node = Node::element(ty.name, attrs, content);
        let child_names: Vec<&str> =
            node.content.iter().map(|c| c.type_name.as_str()).collect();
        if !ty.content.matches(&child_names, self.schema) {
            // A node we can't make well-formed is dropped whole
            return None;
        }
        Some(node)
    }

    /// Parse inline content, threading the active mark set.
    fn parse_inline(&self, nodes: &[RawNode], marks: &[Mark]) -> Vec<Node> {
        let mut out = Vec::new();

        for raw in nodes {
            match raw {
                RawNode::Text(text) => {
                    let text = normalize_inline_whitespace(text);
                    if !text.is_empty() {
                        out.push(Node::text(text).with_marks(marks.to_vec()));
                    }
                }
                RawNode::Element(element) => {
                    if DANGEROUS_TAGS.contains(&element.tag.as_str()) {
                        continue;
                    }

                    if let Some(mark_type) = self.schema.match_mark(element) {
                        let inner_marks = match (mark_type.parse_attrs)(element) {
                            Some(attrs) => {
                                let mut inner = marks.to_vec();
                                inner.push(Mark {
                                    type_name: mark_type.name.to_string(),
                                    attrs,
                                });
                                inner
                            }
                            // Rejected mark (e.g. unsafe href): the text
                            // survives, the mark does not
                            None => marks.to_vec(),
                        };
                        out.extend(self.parse_inline(&element.children, &inner_marks));
                        continue;
                    }

                    match self.schema.match_element(element) {
                        Some((ty, _))
                            if ty.group == Group::Inline && ty.content.is_empty() =>
                        {
                            let attrs = ty
                                .parse_attrs
                                .map(|parse| parse(element))
                                .unwrap_or_default();
                            out.push(Node::element(ty.name, attrs, Vec::new()));
                        }
                        // Block structure inside inline context, and
                        // unknown elements: traverse transparently
                        _ => {
                            out.extend(self.parse_inline(&element.children, marks));
                        }
                    }
                }
            }
        }

        out
    }
}

/// Collapse whitespace runs that contain a newline (pretty-printing
/// artifacts) to a single space; drop runs that are nothing else.
fn normalize_inline_whitespace(text: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c.is_whitespace() {
            in_run = true;
        } else {
            if in_run {
                if !out.is_empty() {
                    out.push(' ');
                }
                in_run = false;
            }
            out.push(c);
        }
    }
    out
}

/// Merge adjacent text nodes carrying identical marks.
fn merge_text_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    for node in nodes {
        if let (Some(last), Some(text)) = (out.last_mut(), node.text.as_deref()) {
            if last.is_text() && last.marks == node.marks {
                if let Some(last_text) = &mut last.text {
                    last_text.push_str(text);
                    continue;
                }
            }
        }
        out.push(node);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::toc_items_from_node;
    use serde_json::Value;

    fn schema() -> Schema {
        Schema::editor_default()
    }

    #[test]
    fn test_parse_basic_blocks() {
        let s = schema();
        let doc = parse_document(&s, "<h2 id=\"intro\">Intro</h2><p>Hello <strong>world</strong></p>").unwrap();
        assert_eq!(doc.content.len(), 2);

        let heading = &doc.content[0];
        assert_eq!(heading.type_name, "heading");
        assert_eq!(heading.attr_u64("level"), Some(2));
        assert_eq!(heading.attr_str("id"), Some("intro"));

        let para = &doc.content[1];
        assert_eq!(para.content.len(), 2);
        assert_eq!(para.content[0].text.as_deref(), Some("Hello "));
        assert_eq!(para.content[1].marks[0].type_name, "strong");
    }

    #[test]
    fn test_parse_empty_input() {
        let s = schema();
        let doc = parse_document(&s, "").unwrap();
        assert_eq!(doc.content.len(), 1);
        assert_eq!(doc.content[0].type_name, "paragraph");
    }

    #[test]
    fn test_script_dropped() {
        let s = schema();
        let doc = parse_document(&s, "<p>a</p><script>alert(1)</script><p>b</p>").unwrap();
        assert_eq!(doc.content.len(), 2);
        assert_eq!(doc.text_content(), "ab");
    }

    #[test]
    fn test_figure_attrs_sanitized() {
        let s = schema();
        let doc = parse_document(
            &s,
            "<figure><img src=\"javascript:alert(1)\" alt=\"x\"><figcaption>cap</figcaption></figure>",
        )
        .unwrap();
        let figure = &doc.content[0];
        assert_eq!(figure.type_name, "figure");
        assert_eq!(figure.attrs.get("src"), Some(&Value::Null));
        assert_eq!(figure.content[0].type_name, "figcaption");
        assert_eq!(figure.content[0].text_content(), "cap");
    }

    #[test]
    fn test_figure_without_caption_filled() {
        let s = schema();
        let doc = parse_document(&s, "<figure><img src=\"/a.png\"></figure>").unwrap();
        let figure = &doc.content[0];
        assert_eq!(figure.content.len(), 1);
        assert_eq!(figure.content[0].type_name, "figcaption");
    }

    #[test]
    fn test_unsafe_link_mark_rejected() {
        let s = schema();
        let doc =
            parse_document(&s, "<p><a href=\"javascript:alert(1)\">text</a></p>").unwrap();
        let text = &doc.content[0].content[0];
        assert_eq!(text.text.as_deref(), Some("text"));
        assert!(text.marks.is_empty());
    }

    #[test]
    fn test_safe_link_mark_kept() {
        let s = schema();
        let doc = parse_document(&s, "<p><a href=\"https://example.com\">text</a></p>").unwrap();
        let text = &doc.content[0].content[0];
        assert_eq!(text.marks[0].type_name, "link");
        assert_eq!(
            text.marks[0].attrs.get("href").and_then(Value::as_str),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_toc_block_parsed_as_atom() {
        let s = schema();
        let html = concat!(
            "<div class=\"toc-block\"><p class=\"toc-title\"><strong>Table of Contents</strong></p>",
            "<ul><li data-level=\"0\"><a href=\"#one\">One</a></li>",
            "<li data-level=\"1\"><a href=\"#two\">Two</a></li>",
            "<li data-level=\"0\"><a href=\"https://evil.com\">Bad</a></li></ul></div>"
        );
        let doc = parse_document(&s, html).unwrap();
        assert_eq!(doc.content.len(), 1);
        let toc = &doc.content[0];
        assert_eq!(toc.type_name, "tableOfContents");

        let items = toc_items_from_node(toc);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "one");
        assert_eq!(items[1].level, 1);
    }

    #[test]
    fn test_toc_legacy_padding_levels() {
        let s = schema();
        let html = concat!(
            "<div class=\"toc-block\"><ul>",
            "<li style=\"padding-left: 2.5rem\"><a href=\"#deep\">Deep</a></li>",
            "</ul></div>"
        );
        let doc = parse_document(&s, html).unwrap();
        let items = toc_items_from_node(&doc.content[0]);
        assert_eq!(items[0].level, 2);
    }

    #[test]
    fn test_transparent_containers() {
        let s = schema();
        let doc = parse_document(&s, "<div><section><p>inner</p></section></div>").unwrap();
        assert_eq!(doc.content.len(), 1);
        assert_eq!(doc.content[0].type_name, "paragraph");
    }

    #[test]
    fn test_table_with_tbody() {
        let s = schema();
        let html = "<table><tbody><tr><th>h</th><td>c</td></tr></tbody></table>";
        let doc = parse_document(&s, html).unwrap();
        let table = &doc.content[0];
        assert_eq!(table.type_name, "table");
        assert_eq!(table.content.len(), 1);
        let row = &table.content[0];
        assert_eq!(row.content[0].type_name, "tableHeader");
        assert_eq!(row.content[1].type_name, "tableCell");
        // Cell content is wrapped in paragraphs
        assert_eq!(row.content[1].content[0].type_name, "paragraph");
    }

    #[test]
    fn test_code_block_text() {
        let s = schema();
        let doc =
            parse_document(&s, "<pre><code>let x = 1 &lt; 2;</code></pre>").unwrap();
        let code = &doc.content[0];
        assert_eq!(code.type_name, "codeBlock");
        assert_eq!(code.text_content(), "let x = 1 < 2;");
    }
}
