//! Persisted-content processing.
//!
//! The server-side half of heading-id derivation: the same candidate and
//! disambiguation rules the editor's TOC deriver applies to the live
//! tree, applied to a persisted HTML string. Both paths produce identical
//! ids for identical content.

use crate::error::ParseResult;
use crate::node::Node;
use crate::parser::parse_document;
use crate::schema::Schema;
use crate::serializer::serialize_document;
use crate::visitor::{walk_node, walk_node_mut, Visitor, VisitorMut};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use vellum_common::{assign_unique_id, generate_heading_id, FALLBACK_HEADING_ID};

/// A heading found in persisted content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedHeading {
    pub level: u8,
    pub text: String,
    pub id: String,
}

/// The id a heading gets: its existing id when present, otherwise the
/// slug of its text, falling back to `"heading"` when the slug is empty.
fn heading_candidate(node: &Node) -> String {
    if let Some(id) = node.attr_str("id").filter(|id| !id.is_empty()) {
        return id.to_string();
    }
    let slug = generate_heading_id(&node.text_content());
    if slug.is_empty() {
        FALLBACK_HEADING_ID.to_string()
    } else {
        slug
    }
}

struct HeadingIdAssigner {
    used: HashSet<String>,
}

impl VisitorMut for HeadingIdAssigner {
    fn visit_node_mut(&mut self, node: &mut Node) {
        if node.type_name == "heading" {
            let candidate = heading_candidate(node);
            let unique = assign_unique_id(&candidate, &mut self.used);
            node.attrs.insert("id".to_string(), Value::String(unique));
        }
        walk_node_mut(self, node);
    }
}

/// Process persisted HTML so every heading carries a unique id, enabling
/// TOC navigation on the rendered page.
pub fn process_content_for_display(schema: &Schema, html: &str) -> ParseResult<String> {
    if html.is_empty() {
        return Ok(String::new());
    }

    let mut doc = parse_document(schema, html)?;
    let mut assigner = HeadingIdAssigner {
        used: HashSet::new(),
    };
    assigner.visit_node_mut(&mut doc);

    Ok(serialize_document(schema, &doc))
}

struct HeadingCollector {
    used: HashSet<String>,
    headings: Vec<ExtractedHeading>,
}

impl Visitor for HeadingCollector {
    fn visit_node(&mut self, node: &Node) {
        if node.type_name == "heading" {
            let candidate = heading_candidate(node);
            let id = assign_unique_id(&candidate, &mut self.used);
            let text = node.text_content();
            self.headings.push(ExtractedHeading {
                level: node.attr_u64("level").unwrap_or(1).clamp(1, 6) as u8,
                text: if text.is_empty() {
                    "Untitled".to_string()
                } else {
                    text
                },
                id,
            });
        }
        walk_node(self, node);
    }
}

/// Extract the headings of persisted HTML, with the ids they would get.
pub fn extract_headings(schema: &Schema, html: &str) -> ParseResult<Vec<ExtractedHeading>> {
    if html.is_empty() {
        return Ok(Vec::new());
    }

    let doc = parse_document(schema, html)?;
    let mut collector = HeadingCollector {
        used: HashSet::new(),
        headings: Vec::new(),
    };
    collector.visit_node(&doc);
    Ok(collector.headings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::editor_default()
    }

    #[test]
    fn test_ids_assigned() {
        let s = schema();
        let html = "<h1>Hello World</h1><p>text</p><h2>Details</h2>";
        let out = process_content_for_display(&s, html).unwrap();
        assert!(out.contains("<h1 id=\"hello-world\">"));
        assert!(out.contains("<h2 id=\"details\">"));
    }

    #[test]
    fn test_duplicate_headings_disambiguated() {
        let s = schema();
        let html = "<h2>Introduction</h2><h2>Introduction</h2>";
        let headings = extract_headings(&s, html).unwrap();
        assert_eq!(headings[0].id, "introduction");
        assert_eq!(headings[1].id, "introduction-1");
    }

    #[test]
    fn test_existing_ids_kept() {
        let s = schema();
        let html = "<h2 id=\"custom\">Title</h2>";
        let out = process_content_for_display(&s, html).unwrap();
        assert!(out.contains("id=\"custom\""));
    }

    #[test]
    fn test_empty_heading_falls_back() {
        let s = schema();
        let headings = extract_headings(&s, "<h2>!!!</h2>").unwrap();
        assert_eq!(headings[0].id, "heading");
        assert_eq!(headings[0].text, "!!!");
    }

    #[test]
    fn test_empty_input() {
        let s = schema();
        assert_eq!(process_content_for_display(&s, "").unwrap(), "");
        assert!(extract_headings(&s, "").unwrap().is_empty());
    }

    #[test]
    fn test_agrees_with_itself_after_processing() {
        let s = schema();
        let html = "<h2>Intro</h2><h2>Intro</h2>";
        let processed = process_content_for_display(&s, html).unwrap();
        let headings = extract_headings(&s, &processed).unwrap();
        assert_eq!(headings[0].id, "intro");
        assert_eq!(headings[1].id, "intro-1");
    }
}
