//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] vellum_dom::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transaction error: {0}")]
    Transaction(#[from] crate::transaction::TransactionError),

    #[error("Schema error: {0}")]
    Schema(#[from] vellum_dom::SchemaError),

    #[error("{0}")]
    Link(#[from] crate::links::LinkError),

    #[error("Document is not file-backed")]
    NotFileBacked,
}
