//! # Editor
//!
//! Ties a document to its selection, typed side-state, undo history, and
//! the chainable transaction surface. Consumers never touch the tree
//! directly: every mutation is a [`Chain`] that commits one atomic,
//! validated transaction — the only place stale positions get remapped.

use crate::document::Document;
use crate::effects::PostEffectEngine;
use crate::interact::BlockHandle;
use crate::slash::SlashMenuState;
use crate::transaction::{Op, PositionMap, Selection, Transaction};
use crate::undo_stack::{Snapshot, UndoStack};
use crate::EditorError;
use std::sync::Arc;
use vellum_dom::{AttrMap, Mark, Node, NodeSpec, Schema};

pub struct Editor {
    document: Document,
    selection: Selection,
    focused: bool,

    /// Slash-menu state. Transient UI state, not content: it lives here,
    /// typed, instead of in the document tree.
    pub slash_menu: SlashMenuState,

    /// Hover block-handle state.
    pub block_handle: BlockHandle,

    undo: UndoStack,
    effects: PostEffectEngine,
}

impl Editor {
    pub fn new(document: Document) -> Self {
        let initial = document.tree().content_size().min(1);
        Self {
            document,
            selection: Selection::caret(initial),
            focused: false,
            slash_menu: SlashMenuState::default(),
            block_handle: BlockHandle::new(),
            undo: UndoStack::new(),
            effects: PostEffectEngine::new(),
        }
    }

    pub fn from_html(schema: Arc<Schema>, html: &str) -> Result<Self, EditorError> {
        Ok(Self::new(Document::from_html(schema, html)?))
    }

    pub fn empty(schema: Arc<Schema>) -> Self {
        Self::new(Document::empty(schema))
    }

    pub fn doc(&self) -> &Node {
        self.document.tree()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        self.document.schema()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn version(&self) -> u64 {
        self.document.version
    }

    pub fn to_html(&self) -> String {
        self.document.to_html()
    }

    pub fn save(&mut self) -> Result<(), EditorError> {
        self.document.save()
    }

    /// Start a command chain. Nothing happens until `run()`.
    pub fn chain(&mut self) -> Chain<'_> {
        Chain {
            editor: self,
            ops: Vec::new(),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let current = Snapshot {
            tree: self.doc().clone(),
            selection: self.selection,
        };
        match self.undo.undo(current) {
            Some(previous) => {
                self.document.commit(previous.tree);
                self.selection = self.clamp(previous.selection);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = Snapshot {
            tree: self.doc().clone(),
            selection: self.selection,
        };
        match self.undo.redo(current) {
            Some(next) => {
                self.document.commit(next.tree);
                self.selection = self.clamp(next.selection);
                true
            }
            None => false,
        }
    }

    /// Text of the current textblock before the caret.
    pub fn text_before_cursor(&self) -> String {
        let resolved = self.doc().resolve(self.selection.head);
        let parent = resolved.parent();
        let offset = resolved.parent_offset;

        let mut out = String::new();
        let mut cur = 0usize;
        for child in &parent.content {
            let size = child.node_size();
            if let Some(text) = &child.text {
                if cur + size <= offset {
                    out.push_str(text);
                } else if cur < offset {
                    out.extend(text.chars().take(offset - cur));
                    break;
                } else {
                    break;
                }
            } else if cur + size > offset {
                break;
            }
            cur += size;
        }
        out
    }

    /// Insert plain text at the caret and move the caret past it.
    pub fn insert_text(&mut self, text: &str) -> Result<(), EditorError> {
        if text.is_empty() {
            return Ok(());
        }
        let head = self.selection.head;
        let len = text.chars().count();
        self.chain()
            .insert_content_at(head, NodeSpec::text_node(text))
            .set_text_selection(head + len)
            .run()?;
        Ok(())
    }

    /// Delete one character before the caret. Crossing a block boundary
    /// is a structural join, out of scope here — it becomes a no-op.
    pub fn delete_backward(&mut self) -> Result<(), EditorError> {
        let head = self.selection.head;
        if head == 0 {
            return Ok(());
        }
        match self.chain().delete_range(head - 1, head).run() {
            Ok(_) => Ok(()),
            Err(EditorError::Transaction(
                crate::transaction::TransactionError::InvalidRange { .. },
            )) => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn clamp(&self, selection: Selection) -> Selection {
        let max = self.doc().content_size();
        Selection::range(selection.anchor.min(max), selection.head.min(max))
    }

    fn run_post_effects(&mut self) {
        let schema = self.schema().clone();
        let ops = self.effects.analyze_all(self.doc(), &schema);
        if ops.is_empty() {
            return;
        }

        let mut tr = Transaction::new(&schema, self.doc().clone(), self.selection);
        for op in &ops {
            if let Err(error) = tr.apply(op) {
                tracing::warn!(%error, "post-effect rejected");
                return;
            }
        }
        if &tr.doc != self.doc() {
            self.document.commit(tr.doc);
        }
    }
}

/// Chainable builder over one atomic transaction. A chain that is never
/// run has no document effect.
pub struct Chain<'a> {
    editor: &'a mut Editor,
    ops: Vec<Op>,
}

impl<'a> Chain<'a> {
    pub fn focus(mut self) -> Self {
        self.ops.push(Op::Focus);
        self
    }

    pub fn insert_content_at(mut self, pos: usize, spec: NodeSpec) -> Self {
        self.ops.push(Op::InsertContentAt { pos, spec });
        self
    }

    pub fn delete_range(mut self, from: usize, to: usize) -> Self {
        self.ops.push(Op::DeleteRange { from, to });
        self
    }

    pub fn replace_range(mut self, from: usize, to: usize, spec: NodeSpec) -> Self {
        self.ops.push(Op::ReplaceRange { from, to, spec });
        self
    }

    pub fn set_node_attrs(mut self, pos: usize, attrs: AttrMap) -> Self {
        self.ops.push(Op::SetNodeAttrs { pos, attrs });
        self
    }

    pub fn set_node_markup(mut self, pos: usize, type_name: &str, attrs: AttrMap) -> Self {
        self.ops.push(Op::SetNodeMarkup {
            pos,
            type_name: type_name.to_string(),
            attrs,
        });
        self
    }

    pub fn add_mark(mut self, from: usize, to: usize, mark: Mark) -> Self {
        self.ops.push(Op::AddMark { from, to, mark });
        self
    }

    pub fn remove_mark(mut self, from: usize, to: usize, type_name: &str) -> Self {
        self.ops.push(Op::RemoveMark {
            from,
            to,
            type_name: type_name.to_string(),
        });
        self
    }

    pub fn set_text_selection(mut self, pos: usize) -> Self {
        self.ops.push(Op::SetTextSelection { pos });
        self
    }

    /// Commit the accumulated operations as one transaction. On any
    /// failure the document is untouched.
    pub fn run(self) -> Result<PositionMap, EditorError> {
        if self.ops.is_empty() {
            return Ok(PositionMap::default());
        }

        let schema = self.editor.schema().clone();
        let mut tr = Transaction::new(
            &schema,
            self.editor.doc().clone(),
            self.editor.selection,
        );

        for op in &self.ops {
            if let Err(error) = tr.apply(op) {
                tracing::debug!(%error, "transaction rejected");
                return Err(error.into());
            }
        }

        let (new_doc, selection, focused, steps) = tr.into_parts();
        let changed = &new_doc != self.editor.doc();
        let map = PositionMap::from_steps(steps);

        if changed {
            self.editor.undo.push(Snapshot {
                tree: self.editor.doc().clone(),
                selection: self.editor.selection,
            });
            self.editor.document.commit(new_doc);
        }

        self.editor.selection = self.editor.clamp(selection);
        if focused {
            self.editor.focused = true;
        }

        if changed {
            self.editor.run_post_effects();
        }

        Ok(map)
    }
}
