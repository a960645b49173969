//! # Vellum Editor
//!
//! Core document editing engine for Vellum.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ dom: HTML ⇄ tree, positions, registry       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + transactions   │
//! │  - Load/save documents                      │
//! │  - Chainable, validated atomic edits        │
//! │  - Slash palette, TOC deriver, block ops    │
//! │  - Undo/redo, post-commit effects           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ service: save scheduling + image upload     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is source of truth**: HTML is a derived, sanitized view
//! 2. **Transactions are the only mutation path**: they validate content
//!    models and remap positions; direct tree edits don't exist
//! 3. **Side-state is typed**: slash menu, block handle, and link modal
//!    state are plain fields, not a string-keyed storage bag
//! 4. **Interaction logic is injected**: layout/scroll come in through
//!    traits so every state machine tests off-browser
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vellum_dom::{NodeSpec, Schema};
//! use vellum_editor::Editor;
//!
//! let schema = Arc::new(Schema::editor_default());
//! let mut editor = Editor::from_html(schema, "<p>Hello</p>")?;
//!
//! editor
//!     .chain()
//!     .focus()
//!     .insert_content_at(7, NodeSpec::node("horizontalRule"))
//!     .run()?;
//!
//! let html = editor.to_html();
//! ```

pub mod blocks;
mod document;
mod editor;
mod effects;
mod errors;
pub mod interact;
pub mod keymap;
pub mod links;
pub mod slash;
pub mod toc;
mod transaction;
mod undo_stack;

pub use document::Document;
pub use editor::{Chain, Editor};
pub use effects::{PostEffect, PostEffectEngine, RefreshTocItems};
pub use errors::EditorError;
pub use links::{LinkError, LinkModal};
pub use slash::{
    filter_slash_commands, CommandAction, KeyOutcome, SlashCommandItem, SlashKey,
    SlashMenuState, DEFAULT_SLASH_COMMANDS,
};
pub use toc::{HeadingEntry, LinkClick, ScrollCommand};
pub use transaction::{Op, PositionMap, Selection, StepMap, Transaction, TransactionError};
pub use undo_stack::{Snapshot, UndoStack};

// Re-export common types for convenience
pub use vellum_dom::{Node, NodeSpec, Schema, TocItem};
