//! # Vellum DOM
//!
//! Document tree, position addressing, and the HTML boundary.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ tokenizer/raw: HTML text → raw element tree │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ parser: raw tree + schema rules → Node tree │
//! │  - attribute sanitization at every boundary │
//! │  - unknown/dangerous markup degrades safely │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ node/position: tree reads + flat addressing │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ serializer: Node tree → canonical HTML      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! `parse(serialize(tree))` reconstructs an equivalent tree for every
//! registered node type; the editor and the persisted-HTML content
//! processor both build on this crate so their derived heading ids agree.

pub mod error;
pub mod node;
pub mod parser;
pub mod position;
pub mod process;
pub mod raw;
pub mod schema;
pub mod serializer;
pub mod tokenizer;
pub mod visitor;

pub use error::{ParseError, ParseResult, SchemaError};
pub use node::{AttrMap, Mark, Node};
pub use parser::parse_document;
pub use position::ResolvedPos;
pub use process::{extract_headings, process_content_for_display, ExtractedHeading};
pub use schema::{Group, NodeSpec, NodeType, Schema, TocItem};
pub use serializer::serialize_document;
pub use visitor::{walk_node, walk_node_mut, Visitor, VisitorMut};
