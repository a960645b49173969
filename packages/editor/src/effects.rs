//! # Post-Effect System
//!
//! Committed transactions trigger cascading effects to keep derived
//! structure consistent. For example:
//! - Structural edits around headings → refresh heading ids
//! - Heading changes → refresh the `items` of any TOC block
//!
//! Post-effects are:
//! - **Deterministic**: the same tree always produces the same effects
//! - **Convergent**: applying an effect's output produces no further ops
//! - **Minimal**: only attributes that actually differ are rewritten

use crate::toc::{collect_headings, toc_items};
use crate::transaction::Op;
use vellum_dom::schema::{toc_items_from_node, toc_items_to_value};
use vellum_dom::{AttrMap, Node, Schema};

/// Post-effect that can be triggered by a committed transaction
pub trait PostEffect: std::fmt::Debug {
    /// Inspect the committed tree and generate follow-up operations
    fn analyze(&self, doc: &Node, schema: &Schema) -> Vec<Op>;
}

/// Keep heading anchors and TOC entries consistent after edits.
///
/// Does nothing while the document has no TOC block; once one exists,
/// every heading keeps a stable unique id and the block's `items`
/// attribute follows the heading set.
#[derive(Debug)]
pub struct RefreshTocItems;

impl PostEffect for RefreshTocItems {
    fn analyze(&self, doc: &Node, _schema: &Schema) -> Vec<Op> {
        let mut toc_positions = Vec::new();
        doc.descendants(&mut |node, pos| {
            if node.type_name == "tableOfContents" {
                toc_positions.push((pos, toc_items_from_node(node)));
            }
            true
        });
        if toc_positions.is_empty() {
            return Vec::new();
        }

        let headings = collect_headings(doc);
        let items = toc_items(&headings);

        let mut ops = Vec::new();

        // Setting attributes does not shift positions; reverse order is
        // kept anyway so the batch stays valid if it ever does
        for heading in headings.iter().rev() {
            let current = doc.node_at(heading.pos).and_then(|n| n.attr_str("id"));
            if current != Some(heading.id.as_str()) {
                let mut attrs = AttrMap::new();
                attrs.insert(
                    "id".to_string(),
                    serde_json::Value::String(heading.id.clone()),
                );
                ops.push(Op::SetNodeAttrs {
                    pos: heading.pos,
                    attrs,
                });
            }
        }

        for (pos, current_items) in toc_positions.iter().rev() {
            if current_items != &items {
                let mut attrs = AttrMap::new();
                attrs.insert("items".to_string(), toc_items_to_value(&items));
                ops.push(Op::SetNodeAttrs { pos: *pos, attrs });
            }
        }

        ops
    }
}

/// Post-effect engine that runs all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![Box::new(RefreshTocItems)],
        }
    }

    /// Collect follow-up operations from every effect
    pub fn analyze_all(&self, doc: &Node, schema: &Schema) -> Vec<Op> {
        self.effects
            .iter()
            .flat_map(|effect| effect.analyze(doc, schema))
            .collect()
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}
