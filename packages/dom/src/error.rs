use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("parsed document violates a content model: {0}")]
    InvalidStructure(#[from] SchemaError),
}

/// Registry-level violations.
///
/// Attribute-level rejections never produce these: a bad attribute
/// degrades to its safe default. These are for structural problems —
/// unknown types and content-model violations — which reject the whole
/// operation that introduced them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("unknown mark type: {0}")]
    UnknownMarkType(String),

    #[error("invalid content for {node}: {detail}")]
    InvalidContent { node: String, detail: String },

    #[error("text is not allowed on node type {0}")]
    UnexpectedText(String),
}
