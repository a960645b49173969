//! # Link Editing
//!
//! Link insertion/removal over the current selection, gated by the
//! protocol allow-list. The only externally visible effect is the link
//! mark with a validated `href`; rejected input produces a human-readable
//! error and no mutation.

use crate::editor::Editor;
use crate::EditorError;
use serde_json::Value;
use thiserror::Error;
use vellum_common::{extract_protocol, is_valid_url};
use vellum_dom::{Mark, Node};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    #[error("Protocol \"{0}\" is not allowed. Use http, https, mailto, tel, or internal anchors (#).")]
    DisallowedProtocol(String),

    #[error("Invalid URL format")]
    InvalidFormat,
}

/// Link modal state (transient UI state, like the slash menu).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkModal {
    pub show: bool,
    pub url: String,
}

impl LinkModal {
    /// Open with the current link's href prefilled, if the caret is in one.
    pub fn open(&mut self, editor: &Editor) {
        self.url = current_link_href(editor).unwrap_or_default();
        self.show = true;
    }

    pub fn close(&mut self) {
        self.show = false;
        self.url.clear();
    }
}

/// href of the link mark at the caret, if any.
pub fn current_link_href(editor: &Editor) -> Option<String> {
    let doc = editor.doc();
    let resolved = doc.resolve(editor.selection().head);
    let parent = resolved.parent();
    let offset = resolved.parent_offset;

    let mut cur = 0usize;
    for child in &parent.content {
        let end = cur + child.node_size();
        if child.is_text() && cur <= offset && offset <= end {
            if let Some(mark) = child.marks.iter().find(|m| m.type_name == "link") {
                return mark
                    .attrs
                    .get("href")
                    .and_then(Value::as_str)
                    .map(String::from);
            }
        }
        cur = end;
    }
    None
}

/// Expand a caret position to the contiguous run of text carrying a mark
/// of the given type. `None` when the position touches no such mark.
pub fn extend_mark_range(doc: &Node, pos: usize, type_name: &str) -> Option<(usize, usize)> {
    let resolved = doc.try_resolve(pos)?;
    let parent = resolved.parent();
    let offset = resolved.parent_offset;
    let content_start = resolved.start(resolved.depth());

    let has_mark =
        |node: &Node| node.is_text() && node.marks.iter().any(|m| m.type_name == type_name);

    // Locate a marked text child touching the position
    let mut bounds = Vec::new();
    let mut cur = 0usize;
    for child in &parent.content {
        let end = cur + child.node_size();
        bounds.push((cur, end));
        cur = end;
    }
    let index = parent
        .content
        .iter()
        .enumerate()
        .find(|(i, child)| {
            let (start, end) = bounds[*i];
            has_mark(child) && start <= offset && offset <= end
        })
        .map(|(i, _)| i)?;

    let mut first = index;
    while first > 0 && has_mark(&parent.content[first - 1]) {
        first -= 1;
    }
    let mut last = index;
    while last + 1 < parent.content.len() && has_mark(&parent.content[last + 1]) {
        last += 1;
    }

    Some((
        content_start + bounds[first].0,
        content_start + bounds[last].1,
    ))
}

/// Apply a link mark to the current selection after validation.
///
/// An empty URL removes the link instead; an invalid one yields a
/// [`LinkError`] and the document is untouched.
pub fn set_link(editor: &mut Editor, url: &str) -> Result<(), EditorError> {
    if url.is_empty() {
        return remove_link(editor);
    }

    if !is_valid_url(url) {
        let error = match extract_protocol(url) {
            Some(protocol) => LinkError::DisallowedProtocol(protocol),
            None => LinkError::InvalidFormat,
        };
        return Err(error.into());
    }

    let selection = editor.selection();
    let range = if selection.is_caret() {
        extend_mark_range(editor.doc(), selection.head, "link")
    } else {
        Some((selection.from(), selection.to()))
    };
    let Some((from, to)) = range else {
        return Ok(());
    };

    let mark = Mark::new("link").with_attr("href", Value::String(url.to_string()));
    editor.chain().focus().add_mark(from, to, mark).run()?;
    Ok(())
}

/// Remove the link mark from the current selection (or the link run
/// under the caret).
pub fn remove_link(editor: &mut Editor) -> Result<(), EditorError> {
    let selection = editor.selection();
    let range = if selection.is_caret() {
        extend_mark_range(editor.doc(), selection.head, "link")
    } else {
        Some((selection.from(), selection.to()))
    };
    let Some((from, to)) = range else {
        return Ok(());
    };

    editor.chain().focus().remove_mark(from, to, "link").run()?;
    Ok(())
}
