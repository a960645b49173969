//! Node type definitions.
//!
//! Each type declares its content model, structural flags, parse rules
//! (which source tags map to it), attribute extraction (routed through
//! the sanitizers), mutation-time attribute sanitization, and its
//! canonical render shape.

use super::content::ContentModel;
use super::html::{attr, el, pre_attr, pre_text, text, HtmlTree};
use super::{toc_items_from_node, Group, TocItem};
use crate::node::{AttrMap, Node};
use crate::raw::RawElement;
use serde_json::Value;
use vellum_common::{
    escape_html_text, sanitize_alt_text, validate_image_src, validate_toc_href,
};

pub struct NodeType {
    pub name: &'static str,
    pub group: Group,
    pub content: ContentModel,
    pub draggable: bool,
    pub selectable: bool,
    pub atom: bool,
    pub isolating: bool,

    /// Source tags/structures that map to this node on import.
    pub parse_rules: Vec<ParseRule>,

    /// Extract attributes from a matched element. Every externally
    /// supplied value must pass through `vellum_common::sanitize` here.
    pub parse_attrs: Option<fn(&RawElement) -> AttrMap>,

    /// Sanitize one attribute being set through a transaction. `None`
    /// rejects the value (the attribute keeps its previous/default value).
    pub sanitize_attr: Option<fn(&str, &Value) -> Option<Value>>,

    /// Canonical HTML shape; `Hole` marks the children slot.
    pub render: fn(&Node) -> HtmlTree,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseRule {
    pub tag: &'static str,
    /// Required class on the matched element.
    pub class: Option<&'static str>,
    /// Element the node's content is read from (instead of the match
    /// itself), e.g. the `<code>` inside a `<pre>`.
    pub content_tag: Option<&'static str>,
}

impl ParseRule {
    fn tag(tag: &'static str) -> Self {
        Self {
            tag,
            class: None,
            content_tag: None,
        }
    }

    pub fn matches(&self, element: &RawElement) -> bool {
        element.tag == self.tag
            && self
                .class
                .map(|class| element.has_class(class))
                .unwrap_or(true)
    }
}

impl NodeType {
    fn new(
        name: &'static str,
        group: Group,
        content: &str,
        render: fn(&Node) -> HtmlTree,
    ) -> Self {
        Self {
            name,
            group,
            content: ContentModel::parse(content),
            draggable: false,
            selectable: true,
            atom: false,
            isolating: false,
            parse_rules: Vec::new(),
            parse_attrs: None,
            sanitize_attr: None,
            render,
        }
    }

    fn rules(mut self, rules: Vec<ParseRule>) -> Self {
        self.parse_rules = rules;
        self
    }

    fn tags(self, tags: &[&'static str]) -> Self {
        let rules = tags.iter().map(|&tag| ParseRule::tag(tag)).collect();
        self.rules(rules)
    }

    fn parse_attrs(mut self, f: fn(&RawElement) -> AttrMap) -> Self {
        self.parse_attrs = Some(f);
        self
    }

    fn sanitize(mut self, f: fn(&str, &Value) -> Option<Value>) -> Self {
        self.sanitize_attr = Some(f);
        self
    }

    fn atom(mut self) -> Self {
        self.atom = true;
        self
    }

    fn draggable(mut self) -> Self {
        self.draggable = true;
        self
    }

    fn not_selectable(mut self) -> Self {
        self.selectable = false;
        self
    }

    fn isolating(mut self) -> Self {
        self.isolating = true;
        self
    }
}

// --- renders -------------------------------------------------------------

fn render_none(_node: &Node) -> HtmlTree {
    HtmlTree::Hole
}

fn render_paragraph(_node: &Node) -> HtmlTree {
    el("p", vec![], vec![HtmlTree::Hole])
}

fn heading_level(node: &Node) -> u8 {
    node.attr_u64("level").unwrap_or(1).clamp(1, 6) as u8
}

fn render_heading(node: &Node) -> HtmlTree {
    let mut attrs = Vec::new();
    if let Some(id) = node.attr_str("id").filter(|id| !id.is_empty()) {
        attrs.push(attr("id", id));
    }
    el(format!("h{}", heading_level(node)), attrs, vec![HtmlTree::Hole])
}

fn render_bullet_list(_node: &Node) -> HtmlTree {
    el("ul", vec![], vec![HtmlTree::Hole])
}

fn render_ordered_list(_node: &Node) -> HtmlTree {
    el("ol", vec![], vec![HtmlTree::Hole])
}

fn render_list_item(_node: &Node) -> HtmlTree {
    el("li", vec![], vec![HtmlTree::Hole])
}

fn render_blockquote(_node: &Node) -> HtmlTree {
    el("blockquote", vec![], vec![HtmlTree::Hole])
}

fn render_code_block(_node: &Node) -> HtmlTree {
    el("pre", vec![], vec![el("code", vec![], vec![HtmlTree::Hole])])
}

fn render_horizontal_rule(_node: &Node) -> HtmlTree {
    el("hr", vec![], vec![])
}

fn render_hard_break(_node: &Node) -> HtmlTree {
    el("br", vec![], vec![])
}

/// Figure: when `src` failed validation the image is omitted entirely —
/// never a broken or unsafe tag — while the caption slot still renders.
fn render_figure(node: &Node) -> HtmlTree {
    let src = node
        .attr_str("src")
        .filter(|s| !s.is_empty())
        .and_then(validate_image_src);

    let mut children = Vec::new();
    if let Some(src) = src {
        // `alt` is stored entity-escaped; emit verbatim
        let alt = node.attr_str("alt").unwrap_or("");
        children.push(el(
            "img",
            vec![
                attr("src", src),
                pre_attr("alt", alt),
                attr("class", "figure-image"),
            ],
            vec![],
        ));
    }
    children.push(HtmlTree::Hole);

    el("figure", vec![attr("class", "image-figure")], children)
}

fn render_figcaption(_node: &Node) -> HtmlTree {
    el(
        "figcaption",
        vec![
            attr("class", "figure-caption"),
            attr("data-placeholder", "Click to add caption..."),
        ],
        vec![HtmlTree::Hole],
    )
}

/// Table of contents: nesting and bullet styling derive purely from the
/// structural `level`, carried as `data-level` on each item.
fn render_toc(node: &Node) -> HtmlTree {
    let items = toc_items_from_node(node);

    let list_items = items
        .iter()
        .map(|item| {
            el(
                "li",
                vec![
                    attr("class", "toc-item"),
                    attr("data-level", item.level.min(3).to_string()),
                ],
                vec![el(
                    "a",
                    vec![
                        attr("href", format!("#{}", item.id)),
                        attr("data-toc-link", item.id.clone()),
                    ],
                    // Item text is stored entity-escaped
                    vec![pre_text(item.text.clone())],
                )],
            )
        })
        .collect();

    el(
        "div",
        vec![attr("class", "toc-block")],
        vec![
            el(
                "p",
                vec![attr("class", "toc-title")],
                vec![el("strong", vec![], vec![text("Table of Contents")])],
            ),
            el("ul", vec![attr("class", "toc-list")], list_items),
        ],
    )
}

fn render_table(_node: &Node) -> HtmlTree {
    el("table", vec![], vec![HtmlTree::Hole])
}

fn render_table_row(_node: &Node) -> HtmlTree {
    el("tr", vec![], vec![HtmlTree::Hole])
}

fn render_table_header(_node: &Node) -> HtmlTree {
    el("th", vec![], vec![HtmlTree::Hole])
}

fn render_table_cell(_node: &Node) -> HtmlTree {
    el("td", vec![], vec![HtmlTree::Hole])
}

// --- attribute extraction ------------------------------------------------

fn parse_heading_attrs(element: &RawElement) -> AttrMap {
    let mut attrs = AttrMap::new();

    let level = element
        .tag
        .strip_prefix('h')
        .and_then(|l| l.parse::<u64>().ok())
        .unwrap_or(1)
        .clamp(1, 6);
    attrs.insert("level".to_string(), Value::from(level));

    if let Some(id) = element.attr("id").filter(|id| is_valid_anchor_id(id)) {
        attrs.insert("id".to_string(), Value::String(id.to_string()));
    }

    attrs
}

fn parse_figure_attrs(element: &RawElement) -> AttrMap {
    let mut attrs = AttrMap::new();
    let img = element.find("img");

    let src = img
        .and_then(|img| img.attr("src"))
        .and_then(validate_image_src);
    attrs.insert(
        "src".to_string(),
        src.map(Value::String).unwrap_or(Value::Null),
    );

    let alt = img
        .and_then(|img| img.attr("alt"))
        .map(sanitize_alt_text)
        .unwrap_or_default();
    attrs.insert("alt".to_string(), Value::String(alt));

    attrs
}

fn parse_toc_attrs(element: &RawElement) -> AttrMap {
    let mut items = Vec::new();
    let mut list_items = Vec::new();
    element.find_all("li", &mut list_items);

    for li in list_items {
        let Some(link) = li.find("a") else { continue };

        // Only valid internal anchors become items
        let Some(href) = link.attr("href").and_then(validate_toc_href) else {
            continue;
        };

        let level = li
            .attr("data-level")
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or_else(|| legacy_level_from_padding(li));

        items.push(TocItem {
            level: level.min(3),
            text: escape_html_text(&link.text_content()),
            id: href.trim_start_matches('#').to_string(),
        });
    }

    let mut attrs = AttrMap::new();
    attrs.insert(
        "items".to_string(),
        serde_json::to_value(items).unwrap_or(Value::Array(Vec::new())),
    );
    attrs
}

/// Legacy persisted content encoded TOC nesting in padding-left values.
/// Kept only as a fallback when `data-level` is absent.
fn legacy_level_from_padding(li: &RawElement) -> u8 {
    let style = li.attr("style").unwrap_or("");
    if style.contains("3.75") {
        3
    } else if style.contains("2.5") {
        2
    } else if style.contains("1.25") {
        1
    } else {
        0
    }
}

// --- mutation-time sanitization ------------------------------------------

fn is_valid_anchor_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn sanitize_heading_attr(name: &str, value: &Value) -> Option<Value> {
    match name {
        "level" => {
            let level = value.as_u64()?.clamp(1, 6);
            Some(Value::from(level))
        }
        "id" => match value {
            Value::Null => Some(Value::Null),
            Value::String(id) if is_valid_anchor_id(id) => Some(value.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn sanitize_figure_attr(name: &str, value: &Value) -> Option<Value> {
    match name {
        "src" => match value {
            Value::Null => Some(Value::Null),
            Value::String(src) => Some(
                validate_image_src(src)
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            ),
            _ => None,
        },
        "alt" => value
            .as_str()
            .map(|alt| Value::String(sanitize_alt_text(alt))),
        _ => None,
    }
}

fn sanitize_toc_attr(name: &str, value: &Value) -> Option<Value> {
    if name != "items" {
        return None;
    }
    let items: Vec<TocItem> = serde_json::from_value(value.clone()).ok()?;
    let sane: Vec<TocItem> = items
        .into_iter()
        .filter(|item| is_valid_anchor_id(&item.id))
        .map(|mut item| {
            item.level = item.level.min(3);
            if item.text.contains('<') || item.text.contains('>') {
                item.text = escape_html_text(&item.text);
            }
            item
        })
        .collect();
    serde_json::to_value(sane).ok()
}

// --- registry ------------------------------------------------------------

pub fn default_nodes() -> Vec<NodeType> {
    vec![
        NodeType::new("doc", Group::None, "block+", render_none),
        NodeType::new("text", Group::Inline, "", render_none),
        NodeType::new("paragraph", Group::Block, "inline*", render_paragraph)
            .tags(&["p"]),
        NodeType::new("heading", Group::Block, "inline*", render_heading)
            .tags(&["h1", "h2", "h3", "h4", "h5", "h6"])
            .parse_attrs(parse_heading_attrs)
            .sanitize(sanitize_heading_attr),
        NodeType::new("blockquote", Group::Block, "block+", render_blockquote)
            .tags(&["blockquote"]),
        NodeType::new("bulletList", Group::Block, "listItem+", render_bullet_list)
            .tags(&["ul"]),
        NodeType::new("orderedList", Group::Block, "listItem+", render_ordered_list)
            .tags(&["ol"]),
        NodeType::new("listItem", Group::None, "block+", render_list_item)
            .tags(&["li"]),
        NodeType::new("codeBlock", Group::Block, "text*", render_code_block).rules(vec![
            ParseRule {
                tag: "pre",
                class: None,
                content_tag: Some("code"),
            },
        ]),
        NodeType::new(
            "horizontalRule",
            Group::Block,
            "",
            render_horizontal_rule,
        )
        .tags(&["hr"])
        .atom(),
        NodeType::new("hardBreak", Group::Inline, "", render_hard_break)
            .tags(&["br"])
            .atom()
            .not_selectable(),
        // Table of contents must be matched before any generic container
        // handling sees its inner list
        NodeType::new("tableOfContents", Group::Block, "", render_toc)
            .rules(vec![
                ParseRule {
                    tag: "nav",
                    class: Some("toc-block"),
                    content_tag: None,
                },
                ParseRule {
                    tag: "div",
                    class: Some("toc-block"),
                    content_tag: None,
                },
            ])
            .parse_attrs(parse_toc_attrs)
            .sanitize(sanitize_toc_attr)
            .atom()
            .draggable(),
        NodeType::new("figure", Group::Block, "figcaption", render_figure)
            .rules(vec![ParseRule {
                tag: "figure",
                class: None,
                content_tag: Some("figcaption"),
            }])
            .parse_attrs(parse_figure_attrs)
            .sanitize(sanitize_figure_attr)
            .draggable()
            .isolating(),
        NodeType::new("figcaption", Group::None, "inline*", render_figcaption)
            .tags(&["figcaption"])
            .not_selectable(),
        NodeType::new("table", Group::Block, "tableRow+", render_table).tags(&["table"]),
        NodeType::new(
            "tableRow",
            Group::None,
            "(tableHeader | tableCell)+",
            render_table_row,
        )
        .tags(&["tr"]),
        NodeType::new("tableHeader", Group::None, "block+", render_table_header)
            .tags(&["th"]),
        NodeType::new("tableCell", Group::None, "block+", render_table_cell)
            .tags(&["td"]),
    ]
}
