//! # Document Handle
//!
//! A Document represents one post's content tree and its editing state.
//! Documents can be:
//! - **Memory-backed**: temporary, for tests or in-memory editing
//! - **File-backed**: persisted to disk as canonical HTML
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Parse → Edit → Serialize → Save
//!   ↓      ↓       ↓        ↓         ↓
//! HTML   Tree  Transactions HTML    File
//! ```
//!
//! All mutation goes through the transaction engine; `commit` is the only
//! way a new tree replaces the current one.

use crate::EditorError;
use std::path::PathBuf;
use std::sync::Arc;
use vellum_dom::{parse_document, serialize_document, Node, Schema};

/// Editable document
pub struct Document {
    /// Current version number (increments on each committed transaction)
    pub version: u64,

    schema: Arc<Schema>,

    /// Backing storage strategy
    storage: DocumentStorage,
}

/// Storage backend for document
enum DocumentStorage {
    /// In-memory only (tests, temp docs)
    Memory { tree: Node },

    /// File-backed (single-user editing)
    File {
        path: PathBuf,
        tree: Node,
        dirty: bool,
    },
}

impl Document {
    /// Create a document from persisted HTML (memory-backed)
    pub fn from_html(schema: Arc<Schema>, html: &str) -> Result<Self, EditorError> {
        let tree = parse_document(&schema, html)?;
        Ok(Self {
            version: 0,
            schema,
            storage: DocumentStorage::Memory { tree },
        })
    }

    /// Create an empty document (one empty paragraph)
    pub fn empty(schema: Arc<Schema>) -> Self {
        let tree = parse_document(&schema, "")
            .unwrap_or_else(|_| Node::element("doc", Default::default(), Vec::new()));
        Self {
            version: 0,
            schema,
            storage: DocumentStorage::Memory { tree },
        }
    }

    /// Load a document from a file (file-backed)
    pub fn load(schema: Arc<Schema>, path: PathBuf) -> Result<Self, EditorError> {
        let html = std::fs::read_to_string(&path)?;
        let tree = parse_document(&schema, &html)?;
        Ok(Self {
            version: 0,
            schema,
            storage: DocumentStorage::File {
                path,
                tree,
                dirty: false,
            },
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Current tree
    pub fn tree(&self) -> &Node {
        match &self.storage {
            DocumentStorage::Memory { tree } => tree,
            DocumentStorage::File { tree, .. } => tree,
        }
    }

    /// Replace the tree with a committed transaction result
    pub fn commit(&mut self, new_tree: Node) {
        self.version += 1;
        match &mut self.storage {
            DocumentStorage::Memory { tree } => *tree = new_tree,
            DocumentStorage::File { tree, dirty, .. } => {
                *tree = new_tree;
                *dirty = true;
            }
        }
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            DocumentStorage::Memory { .. } => false,
        }
    }

    /// Serialize the current tree to canonical HTML
    pub fn to_html(&self) -> String {
        serialize_document(&self.schema, self.tree())
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        let html = self.to_html();
        match &mut self.storage {
            DocumentStorage::File { path, dirty, .. } => {
                std::fs::write(path, html)?;
                *dirty = false;
                Ok(())
            }
            DocumentStorage::Memory { .. } => Err(EditorError::NotFileBacked),
        }
    }
}
