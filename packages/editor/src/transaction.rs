//! # Transaction Engine
//!
//! Position-addressed structural edits, committed atomically.
//!
//! ## Design
//!
//! 1. **Validated**: every operation re-checks the touched content models
//! 2. **Atomic**: operations apply to a working tree; the editor commits
//!    only when the whole batch succeeded, so a failed operation leaves
//!    no partial structure observable
//! 3. **Sequential**: each operation sees the tree as left by the
//!    previous one, so reverse-document-order batches keep earlier
//!    positions valid
//! 4. **Remappable**: committed transactions yield a [`PositionMap`] so
//!    stale positions held elsewhere can be carried across the edit

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vellum_dom::{AttrMap, Group, Mark, Node, NodeSpec, Schema, SchemaError};

/// Caret/range selection over document positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn caret(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn range(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_caret(&self) -> bool {
        self.anchor == self.head
    }
}

/// One structural operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Insert materialized content. Inline content lands at the exact
    /// position (splitting text); block content lands at the nearest
    /// boundary of the closest ancestor that accepts it.
    InsertContentAt { pos: usize, spec: NodeSpec },

    /// Delete `from..to`. The range must not partially cover an element.
    DeleteRange { from: usize, to: usize },

    /// Delete `from..to`, then insert content at `from`.
    ReplaceRange {
        from: usize,
        to: usize,
        spec: NodeSpec,
    },

    /// Merge sanitized attributes onto the node starting at `pos`.
    SetNodeAttrs { pos: usize, attrs: AttrMap },

    /// Change the type of the node starting at `pos`, keeping children.
    SetNodeMarkup {
        pos: usize,
        type_name: String,
        attrs: AttrMap,
    },

    /// Apply a mark over an inline range.
    AddMark { from: usize, to: usize, mark: Mark },

    /// Remove marks of a type over an inline range.
    RemoveMark {
        from: usize,
        to: usize,
        type_name: String,
    },

    /// Move the caret.
    SetTextSelection { pos: usize },

    /// Request editor focus.
    Focus,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransactionError {
    #[error("invalid range {from}..{to}: {detail}")]
    InvalidRange {
        from: usize,
        to: usize,
        detail: String,
    },

    #[error("no node starts at position {0}")]
    NoNodeAt(usize),

    #[error("mark {0} failed validation")]
    InvalidMark(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Maps positions captured before a transaction onto the committed tree.
#[derive(Debug, Clone, Default)]
pub struct PositionMap {
    steps: Vec<StepMap>,
}

#[derive(Debug, Clone, Copy)]
pub struct StepMap {
    pub start: usize,
    pub old_len: usize,
    pub new_len: usize,
}

impl PositionMap {
    pub fn from_steps(steps: Vec<StepMap>) -> Self {
        Self { steps }
    }

    pub fn map(&self, pos: usize) -> usize {
        self.steps.iter().fold(pos, |p, step| map_step(p, step))
    }

    /// Whether the transaction changed document structure at all.
    pub fn changed(&self) -> bool {
        !self.steps.is_empty()
    }
}

fn map_step(pos: usize, step: &StepMap) -> usize {
    if pos <= step.start {
        pos
    } else if pos >= step.start + step.old_len {
        pos + step.new_len - step.old_len
    } else {
        // Inside the replaced range: collapse to its end
        step.start + step.new_len
    }
}

/// A working tree plus the bookkeeping of applying operations to it.
pub struct Transaction<'s> {
    schema: &'s Schema,
    pub doc: Node,
    pub selection: Selection,
    pub focused: bool,
    steps: Vec<StepMap>,
}

impl<'s> Transaction<'s> {
    pub fn new(schema: &'s Schema, doc: Node, selection: Selection) -> Self {
        Self {
            schema,
            doc,
            selection,
            focused: false,
            steps: Vec::new(),
        }
    }

    pub fn steps(&self) -> &[StepMap] {
        &self.steps
    }

    /// Decompose into (tree, selection, focus request, steps).
    pub fn into_parts(self) -> (Node, Selection, bool, Vec<StepMap>) {
        (self.doc, self.selection, self.focused, self.steps)
    }

    pub fn apply(&mut self, op: &Op) -> Result<(), TransactionError> {
        match op {
            Op::InsertContentAt { pos, spec } => self.insert_content_at(*pos, spec),
            Op::DeleteRange { from, to } => self.delete_range(*from, *to, true),
            Op::ReplaceRange { from, to, spec } => {
                // The insert both restores validity and fills the hole, so
                // the delete half must not pad an emptied parent
                self.delete_range(*from, *to, false)?;
                self.insert_content_at(*from, spec)
            }
            Op::SetNodeAttrs { pos, attrs } => self.set_node_attrs(*pos, attrs),
            Op::SetNodeMarkup {
                pos,
                type_name,
                attrs,
            } => self.set_node_markup(*pos, type_name, attrs),
            Op::AddMark { from, to, mark } => self.add_mark(*from, *to, mark),
            Op::RemoveMark {
                from,
                to,
                type_name,
            } => self.remove_mark(*from, *to, type_name),
            Op::SetTextSelection { pos } => {
                let clamped = (*pos).min(self.doc.content_size());
                self.selection = Selection::caret(clamped);
                Ok(())
            }
            Op::Focus => {
                self.focused = true;
                Ok(())
            }
        }
    }

    fn record_step(&mut self, start: usize, old_len: usize, new_len: usize) {
        let step = StepMap {
            start,
            old_len,
            new_len,
        };
        self.selection = Selection::range(
            map_step(self.selection.anchor, &step),
            map_step(self.selection.head, &step),
        );
        self.steps.push(step);
    }

    fn insert_content_at(&mut self, pos: usize, spec: &NodeSpec) -> Result<(), TransactionError> {
        let node = spec.materialize(self.schema)?;
        let inline =
            node.is_text() || self.schema.group_of(&node.type_name) == Some(Group::Inline);

        if inline {
            self.insert_inline(pos, node)
        } else {
            self.insert_block(pos, node)
        }
    }

    fn insert_inline(&mut self, pos: usize, node: Node) -> Result<(), TransactionError> {
        let (path, offset) = {
            let resolved = self.doc.resolve(pos);
            let parent_type = self
                .schema
                .node_type(&resolved.parent().type_name)
                .ok_or_else(|| SchemaError::UnknownNodeType(resolved.parent().type_name.clone()))?;
            if !parent_type.content.accepts_inline() {
                return Err(TransactionError::InvalidRange {
                    from: pos,
                    to: pos,
                    detail: "inline content is not allowed here".to_string(),
                });
            }
            (resolved.parent_path().to_vec(), resolved.parent_offset)
        };

        let size = node.node_size();
        let parent = node_mut_by_path(&mut self.doc, &path);
        split_text_at(parent, offset);
        let index = child_index_at(parent, offset);
        parent.content.insert(index, node);
        normalize_inline(&mut parent.content);

        self.validate_at(&path)?;
        self.record_step(pos, 0, size);
        Ok(())
    }

    fn insert_block(&mut self, pos: usize, node: Node) -> Result<(), TransactionError> {
        let (path, index, content_start) = {
            let resolved = self.doc.resolve(pos);

            let mut target = None;
            for depth in (0..=resolved.depth()).rev() {
                let ancestor = resolved.node(depth);
                let ty = self
                    .schema
                    .node_type(&ancestor.type_name)
                    .ok_or_else(|| SchemaError::UnknownNodeType(ancestor.type_name.clone()))?;
                if ty.content.accepts(&node.type_name, self.schema) {
                    target = Some(depth);
                    break;
                }
            }

            let Some(depth) = target else {
                return Err(TransactionError::InvalidRange {
                    from: pos,
                    to: pos,
                    detail: format!("no ancestor accepts a {} here", node.type_name),
                });
            };

            // At the target depth the position is a child boundary; when
            // it sits inside a deeper child, insert after that child
            let index = if depth == resolved.depth() {
                resolved.index(depth)
            } else {
                resolved.index(depth) + 1
            };

            (resolved.path_to(depth).to_vec(), index, resolved.start(depth))
        };

        let size = node.node_size();
        let parent = node_mut_by_path(&mut self.doc, &path);
        let abs = parent.child_start(index, content_start);
        parent.content.insert(index, node);

        self.validate_at(&path)?;
        self.record_step(abs, 0, size);
        Ok(())
    }

    fn delete_range(
        &mut self,
        from: usize,
        to: usize,
        fill_and_validate: bool,
    ) -> Result<(), TransactionError> {
        if from > to {
            return Err(TransactionError::InvalidRange {
                from,
                to,
                detail: "backwards range".to_string(),
            });
        }
        if from == to {
            return Ok(());
        }

        let (path, from_off, to_off, content_start) = {
            let rfrom = self.doc.resolve(from);
            let rto = self.doc.resolve(to);
            if rfrom.parent_path() != rto.parent_path() {
                return Err(TransactionError::InvalidRange {
                    from,
                    to,
                    detail: "range crosses node boundaries".to_string(),
                });
            }
            (
                rfrom.parent_path().to_vec(),
                rfrom.parent_offset,
                rto.parent_offset,
                rfrom.start(rfrom.depth()),
            )
        };

        let schema = self.schema;
        let parent = node_mut_by_path(&mut self.doc, &path);
        let old_children = std::mem::take(&mut parent.content);
        let mut new_children = Vec::with_capacity(old_children.len());
        let mut cur = 0usize;

        for child in old_children {
            let size = child.node_size();
            let start = cur;
            let end = cur + size;
            cur = end;

            if end <= from_off || start >= to_off {
                new_children.push(child);
                continue;
            }
            if start >= from_off && end <= to_off {
                continue; // fully covered
            }

            // Partial coverage is only meaningful for text
            let Some(text) = &child.text else {
                parent.content = new_children;
                return Err(TransactionError::InvalidRange {
                    from,
                    to,
                    detail: format!("range partially covers a {} node", child.type_name),
                });
            };

            let chars: Vec<char> = text.chars().collect();
            let keep_head = from_off.saturating_sub(start).min(chars.len());
            let keep_tail_from = to_off.saturating_sub(start).min(chars.len());
            let mut kept: String = chars[..keep_head].iter().collect();
            kept.extend(&chars[keep_tail_from..]);
            if !kept.is_empty() {
                new_children.push(Node::text(kept).with_marks(child.marks.clone()));
            }
        }

        parent.content = new_children;
        normalize_inline(&mut parent.content);

        // A model that requires content gets an empty filler back instead
        // of committing an invalid parent (deleting the last block leaves
        // one empty paragraph)
        let mut filler_step = None;
        if fill_and_validate && parent.content.is_empty() {
            if let Some(ty) = schema.node_type(&parent.type_name) {
                if ty.content.requires_content() {
                    if let Some(filler) = ty.content.filler_type(schema) {
                        let node = schema.make_empty(filler)?;
                        filler_step = Some((content_start, node.node_size()));
                        parent.content.push(node);
                    }
                }
            }
        }

        if fill_and_validate {
            self.validate_at(&path)?;
        }
        self.record_step(from, to - from, 0);
        if let Some((start, size)) = filler_step {
            self.record_step(start, 0, size);
        }
        Ok(())
    }

    fn set_node_attrs(&mut self, pos: usize, attrs: &AttrMap) -> Result<(), TransactionError> {
        let path = node_path_at(&self.doc, pos).ok_or(TransactionError::NoNodeAt(pos))?;
        let schema = self.schema;
        let node = node_mut_by_path(&mut self.doc, &path);
        if node.is_text() {
            return Err(TransactionError::NoNodeAt(pos));
        }

        // Rejected values are dropped here, never stored unsanitized
        let type_name = node.type_name.clone();
        let sanitized = schema.sanitize_attrs(&type_name, attrs);
        for (name, value) in sanitized {
            node.attrs.insert(name, value);
        }
        Ok(())
    }

    fn set_node_markup(
        &mut self,
        pos: usize,
        type_name: &str,
        attrs: &AttrMap,
    ) -> Result<(), TransactionError> {
        let path = node_path_at(&self.doc, pos).ok_or(TransactionError::NoNodeAt(pos))?;
        let schema = self.schema;

        let new_type = schema
            .node_type(type_name)
            .ok_or_else(|| SchemaError::UnknownNodeType(type_name.to_string()))?;

        let node = node_mut_by_path(&mut self.doc, &path);
        if node.is_text() {
            return Err(TransactionError::NoNodeAt(pos));
        }

        let child_names: Vec<&str> = node.content.iter().map(|c| c.type_name.as_str()).collect();
        if !new_type.content.matches(&child_names, schema) {
            return Err(SchemaError::InvalidContent {
                node: type_name.to_string(),
                detail: format!("cannot hold [{}]", child_names.join(", ")),
            }
            .into());
        }

        node.type_name = new_type.name.to_string();
        node.attrs = schema.sanitize_attrs(new_type.name, attrs);

        // The parent must still accept the converted node
        if path.is_empty() {
            return Ok(());
        }
        self.validate_at(&path[..path.len() - 1])
    }

    fn add_mark(&mut self, from: usize, to: usize, mark: &Mark) -> Result<(), TransactionError> {
        let mark_type = self
            .schema
            .mark_type(&mark.type_name)
            .ok_or_else(|| SchemaError::UnknownMarkType(mark.type_name.clone()))?;
        if !(mark_type.validate)(mark) {
            return Err(TransactionError::InvalidMark(mark.type_name.clone()));
        }

        self.mark_range(from, to, |node| {
            node.marks.retain(|m| m.type_name != mark.type_name);
            node.marks.push(mark.clone());
        })
    }

    fn remove_mark(
        &mut self,
        from: usize,
        to: usize,
        type_name: &str,
    ) -> Result<(), TransactionError> {
        self.mark_range(from, to, |node| {
            node.marks.retain(|m| m.type_name != type_name);
        })
    }

    fn mark_range(
        &mut self,
        from: usize,
        to: usize,
        mut apply: impl FnMut(&mut Node),
    ) -> Result<(), TransactionError> {
        if from >= to {
            return Ok(());
        }

        let (path, from_off, to_off) = {
            let rfrom = self.doc.resolve(from);
            let rto = self.doc.resolve(to);
            if rfrom.parent_path() != rto.parent_path() {
                return Err(TransactionError::InvalidRange {
                    from,
                    to,
                    detail: "mark range crosses node boundaries".to_string(),
                });
            }
            (
                rfrom.parent_path().to_vec(),
                rfrom.parent_offset,
                rto.parent_offset,
            )
        };

        let parent = node_mut_by_path(&mut self.doc, &path);
        split_text_at(parent, from_off);
        split_text_at(parent, to_off);

        let mut cur = 0usize;
        for child in &mut parent.content {
            let start = cur;
            cur += child.node_size();
            if start >= from_off && cur <= to_off && child.is_text() {
                apply(child);
            }
        }
        normalize_inline(&mut parent.content);
        Ok(())
    }

    fn validate_at(&self, path: &[usize]) -> Result<(), TransactionError> {
        let node = node_by_path(&self.doc, path);
        let ty = self
            .schema
            .node_type(&node.type_name)
            .ok_or_else(|| SchemaError::UnknownNodeType(node.type_name.clone()))?;
        let child_names: Vec<&str> = node.content.iter().map(|c| c.type_name.as_str()).collect();
        if !ty.content.matches(&child_names, self.schema) {
            return Err(SchemaError::InvalidContent {
                node: node.type_name.clone(),
                detail: format!("children [{}]", child_names.join(", ")),
            }
            .into());
        }
        Ok(())
    }
}

fn node_by_path<'n>(root: &'n Node, path: &[usize]) -> &'n Node {
    let mut node = root;
    for &index in path {
        node = &node.content[index];
    }
    node
}

fn node_mut_by_path<'n>(root: &'n mut Node, path: &[usize]) -> &'n mut Node {
    let mut node = root;
    for &index in path {
        node = &mut node.content[index];
    }
    node
}

/// Child-index path of the node whose opening boundary is exactly `pos`.
pub fn node_path_at(doc: &Node, pos: usize) -> Option<Vec<usize>> {
    let resolved = doc.try_resolve(pos)?;
    let parent = resolved.parent();
    let index = resolved.parent_index();
    if index >= parent.child_count() {
        return None;
    }
    let child_off: usize = parent.content[..index].iter().map(Node::node_size).sum();
    if child_off != resolved.parent_offset {
        return None; // inside a text node
    }
    let mut path = resolved.parent_path().to_vec();
    path.push(index);
    Some(path)
}

/// Ensure a child boundary exists at `offset`, splitting a text child.
fn split_text_at(parent: &mut Node, offset: usize) {
    let mut cur = 0usize;
    for index in 0..parent.content.len() {
        if cur == offset {
            return;
        }
        let size = parent.content[index].node_size();
        if offset < cur + size {
            let within = offset - cur;
            let Some(text) = parent.content[index].text.clone() else {
                return; // boundary inside a non-text child is left alone
            };
            let marks = parent.content[index].marks.clone();
            let head: String = text.chars().take(within).collect();
            let tail: String = text.chars().skip(within).collect();
            parent.content[index] = Node::text(head).with_marks(marks.clone());
            parent
                .content
                .insert(index + 1, Node::text(tail).with_marks(marks));
            return;
        }
        cur += size;
    }
}

/// Child index at a content offset (after any needed text split).
fn child_index_at(parent: &Node, offset: usize) -> usize {
    let mut cur = 0usize;
    for (index, child) in parent.content.iter().enumerate() {
        if cur >= offset {
            return index;
        }
        cur += child.node_size();
    }
    parent.content.len()
}

/// Merge adjacent text nodes with identical marks; drop empty text nodes.
fn normalize_inline(children: &mut Vec<Node>) {
    let old = std::mem::take(children);
    for node in old {
        if node.text.as_deref() == Some("") {
            continue;
        }
        if let (Some(last), Some(text)) = (children.last_mut(), node.text.as_deref()) {
            if last.is_text() && last.marks == node.marks {
                if let Some(last_text) = &mut last.text {
                    last_text.push_str(text);
                    continue;
                }
            }
        }
        children.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::editor_default()
    }

    fn doc_from(schema: &Schema, html: &str) -> Node {
        vellum_dom::parse_document(schema, html).unwrap()
    }

    #[test]
    fn test_position_map() {
        let map = PositionMap {
            steps: vec![StepMap {
                start: 4,
                old_len: 0,
                new_len: 2,
            }],
        };
        assert_eq!(map.map(3), 3);
        assert_eq!(map.map(4), 4);
        assert_eq!(map.map(5), 7);

        let del = PositionMap {
            steps: vec![StepMap {
                start: 2,
                old_len: 3,
                new_len: 0,
            }],
        };
        assert_eq!(del.map(1), 1);
        assert_eq!(del.map(3), 2); // inside the deleted range
        assert_eq!(del.map(6), 3);
    }

    #[test]
    fn test_insert_inline_text() {
        let s = schema();
        let doc = doc_from(&s, "<p>ab</p>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(2));
        tr.apply(&Op::InsertContentAt {
            pos: 2,
            spec: NodeSpec::text_node("X"),
        })
        .unwrap();
        assert_eq!(tr.doc.text_content(), "aXb");
        // Caret at 2 stays put (insert biases after it)
        assert_eq!(tr.selection.head, 2);
    }

    #[test]
    fn test_insert_block_at_boundary() {
        let s = schema();
        let doc = doc_from(&s, "<p>ab</p><p>cd</p>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(0));
        tr.apply(&Op::InsertContentAt {
            pos: 4,
            spec: NodeSpec::node("horizontalRule"),
        })
        .unwrap();
        assert_eq!(tr.doc.content[1].type_name, "horizontalRule");
        assert_eq!(tr.doc.content.len(), 3);
    }

    #[test]
    fn test_insert_block_from_inside_paragraph() {
        // A block inserted at a position inside a textblock lands after it
        let s = schema();
        let doc = doc_from(&s, "<p>ab</p><p>cd</p>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(2));
        tr.apply(&Op::InsertContentAt {
            pos: 2,
            spec: NodeSpec::node("horizontalRule"),
        })
        .unwrap();
        assert_eq!(tr.doc.content[0].type_name, "paragraph");
        assert_eq!(tr.doc.content[1].type_name, "horizontalRule");
        assert_eq!(tr.doc.content[2].text_content(), "cd");
    }

    #[test]
    fn test_delete_text_range() {
        let s = schema();
        let doc = doc_from(&s, "<p>hello world</p>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(12));
        tr.apply(&Op::DeleteRange { from: 6, to: 12 }).unwrap();
        assert_eq!(tr.doc.text_content(), "hello");
        // Selection remapped into the shrunk paragraph
        assert_eq!(tr.selection.head, 6);
    }

    #[test]
    fn test_delete_whole_block() {
        let s = schema();
        let doc = doc_from(&s, "<p>ab</p><hr><p>cd</p>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(0));
        tr.apply(&Op::DeleteRange { from: 4, to: 6 }).unwrap();
        assert_eq!(tr.doc.content.len(), 2);
        assert_eq!(tr.doc.text_content(), "abcd");
    }

    #[test]
    fn test_delete_last_block_leaves_empty_paragraph() {
        let s = schema();
        let doc = doc_from(&s, "<p>ab</p>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(0));
        tr.apply(&Op::DeleteRange { from: 0, to: 4 }).unwrap();
        assert_eq!(tr.doc.content.len(), 1);
        assert_eq!(tr.doc.content[0].type_name, "paragraph");
        assert_eq!(tr.doc.content[0].content.len(), 0);
    }

    #[test]
    fn test_delete_rejects_partial_element_coverage() {
        let s = schema();
        let doc = doc_from(&s, "<p>ab</p><p>cd</p>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(0));
        // 2..6 would cut across the paragraph boundary
        let err = tr.apply(&Op::DeleteRange { from: 2, to: 6 }).unwrap_err();
        assert!(matches!(err, TransactionError::InvalidRange { .. }));
    }

    #[test]
    fn test_set_node_attrs_sanitized() {
        let s = schema();
        let doc = doc_from(&s, "<h2>Title</h2>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(0));

        let mut attrs = AttrMap::new();
        attrs.insert("id".to_string(), serde_json::json!("my-title"));
        attrs.insert("onclick".to_string(), serde_json::json!("alert(1)"));
        tr.apply(&Op::SetNodeAttrs { pos: 0, attrs }).unwrap();

        let heading = &tr.doc.content[0];
        assert_eq!(heading.attr_str("id"), Some("my-title"));
        assert!(heading.attrs.get("onclick").is_none());
    }

    #[test]
    fn test_set_node_markup_paragraph_to_heading() {
        let s = schema();
        let doc = doc_from(&s, "<p>Title</p>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(1));

        let mut attrs = AttrMap::new();
        attrs.insert("level".to_string(), serde_json::json!(2));
        tr.apply(&Op::SetNodeMarkup {
            pos: 0,
            type_name: "heading".to_string(),
            attrs,
        })
        .unwrap();

        let heading = &tr.doc.content[0];
        assert_eq!(heading.type_name, "heading");
        assert_eq!(heading.attr_u64("level"), Some(2));
        assert_eq!(heading.text_content(), "Title");
    }

    #[test]
    fn test_set_node_markup_rejects_incompatible_content() {
        let s = schema();
        let doc = doc_from(&s, "<p>Text</p>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(1));
        let err = tr
            .apply(&Op::SetNodeMarkup {
                pos: 0,
                type_name: "bulletList".to_string(),
                attrs: AttrMap::new(),
            })
            .unwrap_err();
        assert!(matches!(err, TransactionError::Schema(_)));
    }

    #[test]
    fn test_add_and_remove_mark() {
        let s = schema();
        let doc = doc_from(&s, "<p>hello world</p>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(0));

        tr.apply(&Op::AddMark {
            from: 1,
            to: 6,
            mark: Mark::new("strong"),
        })
        .unwrap();
        assert_eq!(tr.doc.content[0].content.len(), 2);
        assert_eq!(tr.doc.content[0].content[0].marks[0].type_name, "strong");

        tr.apply(&Op::RemoveMark {
            from: 1,
            to: 6,
            type_name: "strong".to_string(),
        })
        .unwrap();
        assert_eq!(tr.doc.content[0].content.len(), 1);
        assert!(tr.doc.content[0].content[0].marks.is_empty());
    }

    #[test]
    fn test_add_mark_rejects_unsafe_link() {
        let s = schema();
        let doc = doc_from(&s, "<p>click</p>");
        let mut tr = Transaction::new(&s, doc, Selection::caret(0));
        let err = tr
            .apply(&Op::AddMark {
                from: 1,
                to: 6,
                mark: Mark::new("link")
                    .with_attr("href", serde_json::json!("javascript:alert(1)")),
            })
            .unwrap_err();
        assert_eq!(err, TransactionError::InvalidMark("link".to_string()));
    }

    #[test]
    fn test_node_path_at() {
        let s = schema();
        let doc = doc_from(&s, "<p>ab</p><p>cd</p>");
        assert_eq!(node_path_at(&doc, 0), Some(vec![0]));
        assert_eq!(node_path_at(&doc, 4), Some(vec![1]));
        assert_eq!(node_path_at(&doc, 1), Some(vec![0, 0]));
        assert_eq!(node_path_at(&doc, 2), None);
    }
}
