//! # Heading-ID / Table-of-Contents Deriver
//!
//! Collects headings in document order, assigns stable collision-free
//! slug ids, and materializes a TOC block whose entries stay consistent
//! with the anchors written back onto the headings — both in one
//! transaction.
//!
//! The id rules (candidate, fallback, first-free suffix) are shared with
//! the persisted-HTML path in `vellum_dom::process`, so the two sides
//! derive identical anchors.

use crate::editor::Editor;
use crate::interact::Layout;
use crate::EditorError;
use serde_json::Value;
use std::collections::HashSet;
use vellum_common::{
    assign_unique_id, escape_html_text, generate_heading_id, FALLBACK_HEADING_ID,
};
use vellum_dom::schema::toc_items_to_value;
use vellum_dom::{AttrMap, Mark, Node, NodeSpec, TocItem};

/// Scroll offset applied inside an editor container.
const EDITOR_SCROLL_OFFSET: f64 = 20.0;

/// Scroll offset applied for window-level scrolling.
const WINDOW_SCROLL_OFFSET: f64 = 100.0;

/// A heading with its assigned unique id and position.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingEntry {
    pub level: u8,
    pub text: String,
    pub id: String,
    pub pos: usize,
}

/// Collect all headings in document order, assigning each its unique id:
/// the existing id when present, the slug of its text otherwise, with
/// `"heading"` as the all-stripped fallback, disambiguated by the first
/// free `-1`, `-2`, ... suffix.
pub fn collect_headings(doc: &Node) -> Vec<HeadingEntry> {
    let mut used: HashSet<String> = HashSet::new();
    let mut headings = Vec::new();

    doc.descendants(&mut |node, pos| {
        if node.type_name == "heading" {
            let text = node.text_content();
            let candidate = match node.attr_str("id").filter(|id| !id.is_empty()) {
                Some(id) => id.to_string(),
                None => {
                    let slug = generate_heading_id(&text);
                    if slug.is_empty() {
                        FALLBACK_HEADING_ID.to_string()
                    } else {
                        slug
                    }
                }
            };
            let id = assign_unique_id(&candidate, &mut used);

            headings.push(HeadingEntry {
                level: node.attr_u64("level").unwrap_or(1).clamp(1, 6) as u8,
                text: if text.is_empty() {
                    "Untitled".to_string()
                } else {
                    text
                },
                id,
                pos,
            });
        }
        true
    });

    headings
}

/// Normalize heading levels for display: the shallowest heading becomes
/// level 0, capped at 3. Item text is stored entity-escaped.
pub fn toc_items(headings: &[HeadingEntry]) -> Vec<TocItem> {
    let min_level = headings.iter().map(|h| h.level).min().unwrap_or(1);
    headings
        .iter()
        .map(|h| TocItem {
            level: (h.level - min_level).min(3),
            text: escape_html_text(&h.text),
            id: h.id.clone(),
        })
        .collect()
}

/// Insert a TOC block at the caret.
///
/// Assigns every heading its id and inserts the block in one transaction.
/// The id write-back runs in reverse document order — setting attributes
/// does not shift positions, but a single transaction must not assume
/// that for any future edit that does.
///
/// Without headings, inserts an explanatory placeholder paragraph.
pub fn insert_toc_block(editor: &mut Editor) -> Result<(), EditorError> {
    let headings = collect_headings(editor.doc());
    let caret = editor.selection().head;

    if headings.is_empty() {
        let placeholder = NodeSpec::node("paragraph").with_content(vec![NodeSpec::text_node(
            "Add headings to your document to generate a table of contents.",
        )
        .with_marks(vec![Mark::new("em")])]);
        editor
            .chain()
            .focus()
            .insert_content_at(caret, placeholder)
            .run()?;
        return Ok(());
    }

    let items = toc_items(&headings);

    let mut chain = editor.chain().focus();
    for heading in headings.iter().rev() {
        let mut attrs = AttrMap::new();
        attrs.insert("id".to_string(), Value::String(heading.id.clone()));
        chain = chain.set_node_attrs(heading.pos, attrs);
    }

    let spec =
        NodeSpec::node("tableOfContents").with_attr("items", toc_items_to_value(&items));
    chain.insert_content_at(caret, spec).run()?;
    Ok(())
}

/// Position of the heading with the given id, short-circuiting the
/// traversal at the first match.
pub fn find_heading_by_id(doc: &Node, id: &str) -> Option<usize> {
    let mut found = None;
    doc.descendants(&mut |node, pos| {
        if node.type_name == "heading" && node.attr_str("id") == Some(id) {
            found = Some(pos);
            return false;
        }
        true
    });
    found
}

/// A click on an in-document link.
#[derive(Debug, Clone, Copy)]
pub struct LinkClick<'a> {
    pub href: Option<&'a str>,
    pub toc_link: Option<&'a str>,
}

/// Where the host should smooth-scroll after a handled link click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollCommand {
    /// Scroll the nearest scrollable editor container.
    Editor { top: f64 },
    /// No editor container: fall back to window-level scrolling.
    Window { top: f64 },
}

/// Intercept a TOC/anchor link click: locate the heading, move the
/// selection just inside it, and compute the scroll target. Returns
/// `None` (default navigation) when the link is not an internal anchor
/// or no heading matches.
pub fn handle_link_click(
    editor: &mut Editor,
    click: LinkClick<'_>,
    layout: &dyn Layout,
) -> Result<Option<ScrollCommand>, EditorError> {
    let heading_id = click
        .toc_link
        .or_else(|| click.href.and_then(|href| href.strip_prefix('#')));
    let Some(heading_id) = heading_id.filter(|id| !id.is_empty()) else {
        return Ok(None);
    };

    let Some(pos) = find_heading_by_id(editor.doc(), heading_id) else {
        return Ok(None);
    };

    editor.chain().focus().set_text_selection(pos + 1).run()?;

    let coords = layout.coords_at_pos(pos);
    let command = match layout.editor_rect() {
        Some(rect) => ScrollCommand::Editor {
            top: layout.scroll_top() + (coords.top - rect.top) - EDITOR_SCROLL_OFFSET,
        },
        None => ScrollCommand::Window {
            top: coords.top - WINDOW_SCROLL_OFFSET,
        },
    };
    Ok(Some(command))
}

/// Focus a heading at a known position and compute a window scroll.
pub fn scroll_to_heading(
    editor: &mut Editor,
    pos: usize,
    layout: &dyn Layout,
) -> Result<ScrollCommand, EditorError> {
    editor.chain().focus().set_text_selection(pos + 1).run()?;
    let coords = layout.coords_at_pos(pos);
    Ok(ScrollCommand::Window {
        top: coords.top - WINDOW_SCROLL_OFFSET,
    })
}
